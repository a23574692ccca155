//! InfluxDB v2 存储实现
//!
//! - `GET  /ping`：启动时连通性检查
//! - `POST /api/v2/write?org=..&bucket=..&precision=ns`：写入单行 line protocol
//!
//! 超时与重试沿用 reqwest 默认行为，本层不做重试。

use crate::error::StorageError;
use crate::line_protocol::encode_point;
use crate::traits::PointStore;
use async_trait::async_trait;
use domain::Point;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use std::fmt;
use tracing::info;

/// InfluxDB 连接参数
#[derive(Clone)]
pub struct InfluxSettings {
    pub url: String,
    pub org: String,
    pub bucket: String,
    pub token: String,
}

impl fmt::Debug for InfluxSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InfluxSettings")
            .field("url", &self.url)
            .field("org", &self.org)
            .field("bucket", &self.bucket)
            .field("token_len", &self.token.len())
            .finish()
    }
}

/// InfluxDB 点位存储
///
/// 内部持有 reqwest::Client（连接池），可在多个消息处理间共享。
#[derive(Debug, Clone)]
pub struct InfluxPointStore {
    client: reqwest::Client,
    settings: InfluxSettings,
}

impl InfluxPointStore {
    /// 构造存储（不做网络访问）
    pub fn new(settings: InfluxSettings) -> Result<Self, StorageError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|err| StorageError::Connect(err.to_string()))?;
        Ok(Self { client, settings })
    }

    /// 构造存储并 ping 一次，失败视为连接错误
    pub async fn connect(settings: InfluxSettings) -> Result<Self, StorageError> {
        let store = Self::new(settings)?;
        if let Err(err) = store.ping().await {
            return Err(StorageError::Connect(err.to_string()));
        }
        info!(
            target: "bridge.storage",
            url = %store.settings.url,
            "influx_ping_ok"
        );
        Ok(store)
    }

    pub fn settings(&self) -> &InfluxSettings {
        &self.settings
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.settings.url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl PointStore for InfluxPointStore {
    async fn ping(&self) -> Result<(), StorageError> {
        let response = self.client.get(self.endpoint("/ping")).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(StorageError::Rejected {
            status: status.as_u16(),
            body,
        })
    }

    async fn write_point(&self, point: &Point) -> Result<(), StorageError> {
        let response = self
            .client
            .post(self.endpoint("/api/v2/write"))
            .query(&[
                ("org", self.settings.org.as_str()),
                ("bucket", self.settings.bucket.as_str()),
                ("precision", "ns"),
            ])
            .header(AUTHORIZATION, format!("Token {}", self.settings.token))
            .header(CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(encode_point(point))
            .send()
            .await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(StorageError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}
