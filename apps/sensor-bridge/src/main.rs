//! 传感器统计桥接服务：NATS `sensor.statistics.*` -> InfluxDB v2。

mod ingest;

use bridge_config::AppConfig;
use bridge_ingest::{NatsSource, NatsSourceConfig};
use bridge_storage::{InfluxPointStore, InfluxSettings};
use bridge_telemetry::{init_tracing, metrics};
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 加载本地 .env（如存在），便于直接 cargo run 启动
    dotenvy::dotenv().ok();
    // 先初始化日志，配置错误也需要输出
    init_tracing();

    // 配置只解析一次，之后只读传递
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, "config_invalid");
            return Err(err.into());
        }
    };
    log_config(&config);

    // InfluxDB：构造客户端并 ping，失败即退出
    let store = InfluxPointStore::connect(InfluxSettings {
        url: config.influx_url.clone(),
        org: config.influx_org.clone(),
        bucket: config.influx_bucket.clone(),
        token: config.influx_token.secret().to_string(),
    })
    .await
    .inspect_err(|err| error!(error = %err, url = %config.influx_url, "influx_connect_failed"))?;

    // NATS：首次连接失败即退出
    let source = NatsSource::connect(&NatsSourceConfig {
        server: config.nats_uri.clone(),
        device_filter: config.target_device.clone(),
    })
    .await
    .inspect_err(|err| error!(error = %err, server = %config.nats_uri, "nats_connect_failed"))?;
    info!(subject = %source.subject(), "ingest source: nats");

    // 信号处理器安装失败不能当作正常退出
    let shutdown =
        shutdown_signal().inspect_err(|err| error!(error = %err, "signal_handler_failed"))?;

    let mut ingest = ingest::spawn_ingest(Arc::new(source), Arc::new(store));

    let outcome = tokio::select! {
        joined = &mut ingest => Some(joined),
        signal = shutdown => {
            info!(signal, "shutdown signal received");
            None
        }
    };
    log_metrics();

    match outcome {
        None => {
            ingest.abort();
            Ok(())
        }
        Some(Ok(result)) => Ok(result?),
        Some(Err(err)) => Err(err.into()),
    }
}

/// 安装退出信号：Ctrl-C（SIGINT）与 SIGTERM。
///
/// 处理器在调用时同步注册，返回的 future 在收到任一信号时完成。
#[cfg(unix)]
fn shutdown_signal() -> std::io::Result<impl Future<Output = &'static str>> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;
    Ok(async move {
        tokio::select! {
            _ = interrupt.recv() => "SIGINT",
            _ = terminate.recv() => "SIGTERM",
        }
    })
}

#[cfg(not(unix))]
fn shutdown_signal() -> std::io::Result<impl Future<Output = &'static str>> {
    Ok(async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => "ctrl_c",
            Err(err) => {
                error!(error = %err, "signal_handler_failed");
                std::future::pending().await
            }
        }
    })
}

/// 输出生效配置；令牌只输出长度。
fn log_config(config: &AppConfig) {
    info!(
        nats_uri = %config.nats_uri,
        target_device = config.target_device.as_deref().unwrap_or("*"),
        influx_url = %config.influx_url,
        influx_org = %config.influx_org,
        influx_bucket = %config.influx_bucket,
        influx_token_file = %config.influx_token_file.display(),
        influx_token_len = config.influx_token.len(),
        "config loaded"
    );
}

fn log_metrics() {
    let snapshot = metrics().snapshot();
    info!(
        messages_received = snapshot.messages_received,
        parse_failures = snapshot.parse_failures,
        decode_failures = snapshot.decode_failures,
        points_mapped = snapshot.points_mapped,
        write_success = snapshot.write_success,
        write_failure = snapshot.write_failure,
        avg_write_latency_ms = ?snapshot.avg_write_latency_ms(),
        "ingest metrics"
    );
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn sigterm_completes_shutdown() {
        let shutdown = shutdown_signal().expect("install");

        let status = std::process::Command::new("sh")
            .arg("-c")
            .arg(format!("kill -TERM {}", std::process::id()))
            .status()
            .expect("kill");
        assert!(status.success());

        let signal = tokio::time::timeout(Duration::from_secs(5), shutdown)
            .await
            .expect("signal within timeout");
        assert_eq!(signal, "SIGTERM");
    }
}
