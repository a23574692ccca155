//! 采集链路装配模块
//!
//! 将采集源（NATS 订阅）、报文映射与写入器组装为完整链路：
//! 消息 -> JSON 解析 -> Point 映射 -> 写入 InfluxDB -> 记录结果。
//!
//! 每条消息独立处理，任何一步失败都只丢弃该消息，订阅继续。
//! 处理在订阅循环内串行进行，写库耗时会直接推迟后续消息（背压）。

use bridge_ingest::{IngestError, RawMessageHandler, Source};
use bridge_normalize::{NormalizeError, decode_message};
use bridge_pipeline::SinkWriter;
use bridge_storage::PointStore;
use bridge_telemetry::{
    new_message_id, record_decode_failure, record_message_received, record_parse_failure,
    record_point_mapped, record_write_failure, record_write_latency_ms, record_write_success,
};
use domain::RawMessage;
use std::sync::Arc;
use tracing::{Instrument, info, warn};

/// 统计消息处理器
///
/// 实现 `RawMessageHandler`，串起映射（Point Mapper）与写入（Sink Writer）。
pub struct StatisticsHandler {
    /// 写入器，内部存储句柄只读共享
    sink: SinkWriter,
}

impl StatisticsHandler {
    pub fn new(store: Arc<dyn PointStore>) -> Self {
        Self {
            sink: SinkWriter::new(store),
        }
    }

    async fn process(&self, message: RawMessage) -> Result<(), IngestError> {
        let raw_payload = String::from_utf8_lossy(&message.payload).to_string();
        info!(
            target: "bridge.ingest",
            subject = %message.subject,
            payload = %raw_payload,
            received_at_ms = message.received_at_ms,
            "message_received"
        );

        // 1. JSON 解析 + 结构校验，映射为 Point
        let point = match decode_message(&message.payload) {
            Ok(point) => point,
            Err(NormalizeError::Parse(err)) => {
                record_parse_failure();
                warn!(
                    target: "bridge.ingest",
                    subject = %message.subject,
                    payload = %raw_payload,
                    error = %err,
                    "payload_parse_failed"
                );
                return Err(IngestError::Handler(format!("invalid payload: {err}")));
            }
            Err(NormalizeError::Decode(err)) => {
                record_decode_failure();
                warn!(
                    target: "bridge.ingest",
                    subject = %message.subject,
                    payload = %raw_payload,
                    error = %err,
                    "point_decode_failed"
                );
                return Err(IngestError::Handler(err.to_string()));
            }
        };
        record_point_mapped();

        // 2. 写入；结果日志由 SinkWriter 输出
        match self.sink.write(&point).await {
            Ok(result) => {
                record_write_success();
                record_write_latency_ms(result.elapsed_ms);
                Ok(())
            }
            Err(err) => {
                record_write_failure();
                Err(IngestError::Handler(err.to_string()))
            }
        }
    }
}

#[async_trait::async_trait]
impl RawMessageHandler for StatisticsHandler {
    async fn handle(&self, message: RawMessage) -> Result<(), IngestError> {
        record_message_received();
        let span = tracing::info_span!(
            "message",
            message_id = %new_message_id(),
            subject = %message.subject
        );
        self.process(message).instrument(span).await
    }
}

/// 启动采集任务
///
/// 订阅在任务内一直持有，直到总线关闭订阅或任务被中止。
pub fn spawn_ingest(
    source: Arc<dyn Source>,
    store: Arc<dyn PointStore>,
) -> tokio::task::JoinHandle<Result<(), IngestError>> {
    let handler = Arc::new(StatisticsHandler::new(store));
    tokio::spawn(async move {
        let result = source.run(handler).await;
        if let Err(err) = &result {
            warn!(target: "bridge.ingest", error = %err, "ingest_stopped");
        }
        result
    })
}
