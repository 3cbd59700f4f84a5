//! Kafka 生产者构建器
//!
//! 用于向告警 topic 写入告警，供 `send-alert` 工具和集成测试使用

use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord};
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{ExplainerError, Result};
use crate::kafka::producer_config::KafkaProducerConfig;

/// 构建 Kafka 生产者
pub fn build_kafka_producer(config: &dyn KafkaProducerConfig) -> Result<FutureProducer> {
    let mut client_config = ClientConfig::new();
    client_config
        .set("bootstrap.servers", config.kafka_bootstrap())
        .set("message.timeout.ms", config.message_timeout_ms().to_string())
        .set("enable.idempotence", config.enable_idempotence().to_string())
        .set("compression.type", config.compression_type())
        .set("linger.ms", config.linger_ms().to_string());

    // 幂等性要求 acks=all
    if config.enable_idempotence() {
        client_config.set("acks", "all");
    }

    let producer: FutureProducer = client_config.create()?;

    info!(
        bootstrap = %config.kafka_bootstrap(),
        timeout_ms = config.message_timeout_ms(),
        idempotence = config.enable_idempotence(),
        "Kafka producer created"
    );

    Ok(producer)
}

/// 发送一条告警并等待 broker 确认
pub async fn publish_alert(
    producer: &FutureProducer,
    topic: &str,
    payload: &str,
    queue_timeout: Duration,
) -> Result<()> {
    let record: FutureRecord<'_, (), str> = FutureRecord::to(topic).payload(payload);

    producer
        .send(record, queue_timeout)
        .await
        .map_err(|(err, _message)| {
            ExplainerError::broker(format!("failed to publish alert to {}: {}", topic, err))
        })?;

    debug!(topic = %topic, bytes = payload.len(), "Alert published");
    Ok(())
}
