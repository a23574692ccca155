use async_trait::async_trait;
use domain::RawMessage;
use futures::StreamExt;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// 统计消息的 subject 前缀。
pub const STATISTICS_SUBJECT_PREFIX: &str = "sensor.statistics";

/// 采集错误。
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("connect error: {0}")]
    Connect(String),
    #[error("subscribe error: {0}")]
    Subscribe(String),
    #[error("handler error: {0}")]
    Handler(String),
    #[error("source error: {0}")]
    Source(String),
}

/// RawMessage 处理器。
#[async_trait]
pub trait RawMessageHandler: Send + Sync {
    async fn handle(&self, message: RawMessage) -> Result<(), IngestError>;
}

/// 采集源抽象。
#[async_trait]
pub trait Source: Send + Sync {
    async fn run(&self, handler: Arc<dyn RawMessageHandler>) -> Result<(), IngestError>;
}

/// 订阅 subject：指定设备或 `*` 通配全部设备。
pub fn statistics_subject(device_filter: Option<&str>) -> String {
    format!(
        "{}.{}",
        STATISTICS_SUBJECT_PREFIX,
        device_filter.unwrap_or("*")
    )
}

/// 交给处理器处理单条消息；失败只影响本条消息。
///
/// 返回该消息是否处理成功。
pub async fn dispatch(handler: &dyn RawMessageHandler, message: RawMessage) -> bool {
    let subject = message.subject.clone();
    match handler.handle(message).await {
        Ok(()) => true,
        Err(err) => {
            debug!(target: "bridge.ingest", subject = %subject, error = %err, "message_dropped");
            false
        }
    }
}

/// NATS 采集源配置。
#[derive(Debug, Clone)]
pub struct NatsSourceConfig {
    pub server: String,
    pub device_filter: Option<String>,
}

impl NatsSourceConfig {
    pub fn subject(&self) -> String {
        statistics_subject(self.device_filter.as_deref())
    }
}

/// NATS 采集源。
///
/// 重连由 async-nats 客户端负责，本层只持有一个订阅。
/// 消息在订阅循环内逐条串行处理：写库慢会推迟后续消息。
#[derive(Debug, Clone)]
pub struct NatsSource {
    client: async_nats::Client,
    subject: String,
}

impl NatsSource {
    /// 建立连接；首次连接失败直接返回错误。
    pub async fn connect(config: &NatsSourceConfig) -> Result<Self, IngestError> {
        let client = async_nats::ConnectOptions::new()
            .name("sensor-bridge")
            .event_callback(|event| async move { log_connection_event(&event) })
            .connect(config.server.as_str())
            .await
            .map_err(|err| IngestError::Connect(err.to_string()))?;
        info!(target: "bridge.ingest", server = %config.server, "nats_connected");
        Ok(Self {
            client,
            subject: config.subject(),
        })
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }
}

#[async_trait]
impl Source for NatsSource {
    async fn run(&self, handler: Arc<dyn RawMessageHandler>) -> Result<(), IngestError> {
        let mut subscriber = self
            .client
            .subscribe(self.subject.clone())
            .await
            .map_err(|err| IngestError::Subscribe(err.to_string()))?;
        info!(target: "bridge.ingest", subject = %self.subject, "subscribed");

        while let Some(message) = subscriber.next().await {
            let raw = RawMessage {
                subject: message.subject.to_string(),
                payload: message.payload.to_vec(),
                received_at_ms: now_epoch_ms(),
            };
            dispatch(handler.as_ref(), raw).await;
        }

        Err(IngestError::Source(format!(
            "subscription to {} closed",
            self.subject
        )))
    }
}

fn log_connection_event(event: &async_nats::Event) {
    match event {
        async_nats::Event::Connected => {
            info!(target: "bridge.ingest", event = %event, "nats_event")
        }
        async_nats::Event::Disconnected | async_nats::Event::LameDuckMode => {
            warn!(target: "bridge.ingest", event = %event, "nats_event")
        }
        async_nats::Event::SlowConsumer(sid) => {
            warn!(target: "bridge.ingest", sid = sid, "nats_slow_consumer")
        }
        async_nats::Event::ServerError(err) => {
            error!(target: "bridge.ingest", error = %err, "nats_server_error")
        }
        async_nats::Event::ClientError(err) => {
            error!(target: "bridge.ingest", error = %err, "nats_client_error")
        }
        other => info!(target: "bridge.ingest", event = %other, "nats_event"),
    }
}

fn now_epoch_ms() -> i64 {
    let now = std::time::SystemTime::now();
    let duration = now
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    duration.as_millis() as i64
}
