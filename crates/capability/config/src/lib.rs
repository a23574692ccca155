//! 应用运行配置加载。

use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

/// 配置加载错误。
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env: {0}")]
    Missing(String),
    #[error("invalid value for {0}: {1}")]
    Invalid(String, String),
    #[error("token file {path}: {reason}")]
    TokenFile { path: String, reason: String },
}

/// InfluxDB 访问令牌。
///
/// Debug 输出只包含长度，令牌原文不会进入日志。
#[derive(Clone, PartialEq, Eq)]
pub struct InfluxToken(String);

impl InfluxToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// 从文件读取令牌（去掉末尾空白/换行）。
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        if !path.exists() {
            return Err(ConfigError::TokenFile {
                path: display,
                reason: "no such file".to_string(),
            });
        }
        let raw = std::fs::read_to_string(path).map_err(|err| ConfigError::TokenFile {
            path: display.clone(),
            reason: err.to_string(),
        })?;
        let token = raw.trim_end();
        if token.is_empty() {
            return Err(ConfigError::TokenFile {
                path: display,
                reason: "file is empty".to_string(),
            });
        }
        Ok(Self(token.to_string()))
    }

    pub fn secret(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for InfluxToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InfluxToken(<redacted, {} bytes>)", self.0.len())
    }
}

/// 应用运行配置（启动时解析一次，之后只读）。
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub nats_uri: String,
    /// 设备过滤；None 表示订阅全部设备。
    pub target_device: Option<String>,
    pub influx_url: String,
    pub influx_token_file: PathBuf,
    pub influx_token: InfluxToken,
    pub influx_org: String,
    pub influx_bucket: String,
}

impl AppConfig {
    /// 从环境变量读取配置。
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 从任意键值来源读取配置（测试不依赖进程环境）。
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let nats_uri = read_required(&lookup, "NATS_URI")?;
        let target_device = read_device_filter(&lookup, "TARGET_DEVICE")?;
        let influx_url = read_required(&lookup, "INFLUXDB_URL")?;
        let influx_token_file = PathBuf::from(read_required(&lookup, "INFLUXDB_TOKEN_FILE")?);
        let influx_token = InfluxToken::from_file(&influx_token_file)?;
        let influx_org = read_required(&lookup, "INFLUXDB_ORG")?;
        let influx_bucket = read_required(&lookup, "INFLUXDB_BUCKET")?;

        Ok(Self {
            nats_uri,
            target_device,
            influx_url,
            influx_token_file,
            influx_token,
            influx_org,
            influx_bucket,
        })
    }
}

fn read_required<F>(lookup: &F, key: &str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(ConfigError::Missing(key.to_string())),
    }
}

/// 设备 ID 会拼进 NATS subject，只能是单个 token。
fn read_device_filter<F>(lookup: &F, key: &str) -> Result<Option<String>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = match lookup(key) {
        Some(value) => value.trim().to_string(),
        None => return Ok(None),
    };
    if value.is_empty() || value == "*" {
        return Ok(None);
    }
    if value
        .chars()
        .any(|ch| matches!(ch, '.' | '*' | '>') || ch.is_whitespace())
    {
        return Err(ConfigError::Invalid(key.to_string(), value));
    }
    Ok(Some(value))
}
