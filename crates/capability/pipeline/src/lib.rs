//! 点位写入（Sink Writer）。
//!
//! 对 `PointStore::write_point` 的薄封装：每个点位写一次，成功/失败都记日志。
//! 失败的点位不重试、不缓存，直接丢弃。

use bridge_storage::{PointStore, StorageError};
use domain::Point;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// 写入结果。
#[derive(Debug, Clone)]
pub struct WriteResult {
    pub measurement: String,
    pub elapsed_ms: u64,
}

/// 写入错误。
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("write {measurement} failed: {source}")]
    Sink {
        measurement: String,
        #[source]
        source: StorageError,
    },
}

/// 单点写入器，存储句柄在各消息处理间只读共享。
#[derive(Clone)]
pub struct SinkWriter {
    store: Arc<dyn PointStore>,
}

impl SinkWriter {
    pub fn new(store: Arc<dyn PointStore>) -> Self {
        Self { store }
    }

    pub async fn write(&self, point: &Point) -> Result<WriteResult, WriteError> {
        let started_at = Instant::now();
        let outcome = self.store.write_point(point).await;
        let elapsed_ms = started_at.elapsed().as_millis() as u64;

        match outcome {
            Ok(()) => {
                info!(
                    target: "bridge.sink",
                    measurement = %point.measurement(),
                    device = %point.device(),
                    sensor_type = %point.sensor_type(),
                    point = %point,
                    elapsed_ms = elapsed_ms,
                    "point_written"
                );
                Ok(WriteResult {
                    measurement: point.measurement().to_string(),
                    elapsed_ms,
                })
            }
            Err(err) => {
                error!(
                    target: "bridge.sink",
                    measurement = %point.measurement(),
                    device = %point.device(),
                    sensor_type = %point.sensor_type(),
                    point = %point,
                    error = %err,
                    "point_write_failed"
                );
                Err(WriteError::Sink {
                    measurement: point.measurement().to_string(),
                    source: err,
                })
            }
        }
    }
}
