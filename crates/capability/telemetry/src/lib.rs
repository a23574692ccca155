//! 追踪初始化、消息 ID 与采集计数器。

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::{EnvFilter, fmt};

/// 计数器快照。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub messages_received: u64,
    pub parse_failures: u64,
    pub decode_failures: u64,
    pub points_mapped: u64,
    pub write_success: u64,
    pub write_failure: u64,
    pub write_latency_ms_total: u64,
    pub write_latency_ms_count: u64,
}

impl MetricsSnapshot {
    /// 平均写入延迟（毫秒），无样本时为 None。
    pub fn avg_write_latency_ms(&self) -> Option<u64> {
        if self.write_latency_ms_count == 0 {
            return None;
        }
        Some(self.write_latency_ms_total / self.write_latency_ms_count)
    }
}

/// 进程级计数器。
pub struct TelemetryMetrics {
    messages_received: AtomicU64,
    parse_failures: AtomicU64,
    decode_failures: AtomicU64,
    points_mapped: AtomicU64,
    write_success: AtomicU64,
    write_failure: AtomicU64,
    write_latency_ms_total: AtomicU64,
    write_latency_ms_count: AtomicU64,
}

impl TelemetryMetrics {
    pub fn new() -> Self {
        Self {
            messages_received: AtomicU64::new(0),
            parse_failures: AtomicU64::new(0),
            decode_failures: AtomicU64::new(0),
            points_mapped: AtomicU64::new(0),
            write_success: AtomicU64::new(0),
            write_failure: AtomicU64::new(0),
            write_latency_ms_total: AtomicU64::new(0),
            write_latency_ms_count: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            messages_received: self.messages_received.load(Ordering::Relaxed),
            parse_failures: self.parse_failures.load(Ordering::Relaxed),
            decode_failures: self.decode_failures.load(Ordering::Relaxed),
            points_mapped: self.points_mapped.load(Ordering::Relaxed),
            write_success: self.write_success.load(Ordering::Relaxed),
            write_failure: self.write_failure.load(Ordering::Relaxed),
            write_latency_ms_total: self.write_latency_ms_total.load(Ordering::Relaxed),
            write_latency_ms_count: self.write_latency_ms_count.load(Ordering::Relaxed),
        }
    }
}

impl Default for TelemetryMetrics {
    fn default() -> Self {
        Self::new()
    }
}

static METRICS: OnceLock<TelemetryMetrics> = OnceLock::new();

/// 获取全局计数器实例。
pub fn metrics() -> &'static TelemetryMetrics {
    METRICS.get_or_init(TelemetryMetrics::new)
}

/// 初始化 tracing（默认 info，可用 RUST_LOG 覆盖）。
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(true).try_init();
}

/// 为单条入站消息生成 message_id。
pub fn new_message_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// 记录收到的消息数。
pub fn record_message_received() {
    metrics().messages_received.fetch_add(1, Ordering::Relaxed);
}

/// 记录 JSON 解析失败次数。
pub fn record_parse_failure() {
    metrics().parse_failures.fetch_add(1, Ordering::Relaxed);
}

/// 记录报文校验失败次数。
pub fn record_decode_failure() {
    metrics().decode_failures.fetch_add(1, Ordering::Relaxed);
}

pub fn record_point_mapped() {
    metrics().points_mapped.fetch_add(1, Ordering::Relaxed);
}

pub fn record_write_success() {
    metrics().write_success.fetch_add(1, Ordering::Relaxed);
}

pub fn record_write_failure() {
    metrics().write_failure.fetch_add(1, Ordering::Relaxed);
}

/// 记录写入延迟（毫秒）。
pub fn record_write_latency_ms(latency_ms: u64) {
    let metrics = metrics();
    metrics
        .write_latency_ms_total
        .fetch_add(latency_ms, Ordering::Relaxed);
    metrics
        .write_latency_ms_count
        .fetch_add(1, Ordering::Relaxed);
}
