//! 从标准输入逐行读取告警 JSON 并写入告警 topic
//!
//! ```bash
//! echo '{"type":"price_spike","symbol":"XYZ","delta":0.42}' | send-alert
//! ```

use anyhow::Context;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use alert_explainer::config::KafkaSettings;
use alert_explainer::kafka::{build_kafka_producer, publish_alert};
use alert_explainer::logging::{LogConfig, init_logging};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    init_logging(LogConfig::from_env())
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {}", e))?;

    let mut settings = KafkaSettings::default();
    if let Ok(bootstrap) = std::env::var("KAFKA_BOOTSTRAP_SERVERS") {
        settings.bootstrap_servers = bootstrap;
    }
    if let Ok(topic) = std::env::var("KAFKA_TOPIC") {
        settings.topic = topic;
    }

    let producer = build_kafka_producer(&settings).context("failed to create Kafka producer")?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut sent = 0u64;
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if serde_json::from_str::<serde_json::Value>(line).is_err() {
            // 仍然发送：消费端需要能处理非法载荷
            warn!(payload = %line, "Sending payload that is not valid JSON");
        }
        publish_alert(&producer, &settings.topic, line, Duration::from_secs(5)).await?;
        sent += 1;
    }

    info!(sent = sent, topic = %settings.topic, "Alerts sent");
    Ok(())
}
