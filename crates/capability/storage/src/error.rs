//! 存储层错误类型
//!
//! - 连接错误：启动时 ping 失败
//! - 请求错误：网络层失败（连接中断、超时等）
//! - 拒绝：InfluxDB 返回非 2xx（鉴权、schema 冲突等）

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("connect error: {0}")]
    Connect(String),
    #[error("request error: {0}")]
    Request(String),
    #[error("rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<reqwest::Error> for StorageError {
    fn from(err: reqwest::Error) -> Self {
        Self::Request(err.to_string())
    }
}
