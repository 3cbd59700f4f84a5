//! Kafka 消费者构建器

use rdkafka::config::ClientConfig;
use rdkafka::consumer::{Consumer, StreamConsumer};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{ExplainerError, Result};
use crate::kafka::consumer_config::KafkaConsumerConfig;

/// 构建 Kafka 消费者
///
/// 连接或认证失败在此处返回 `Broker` 错误，调用方应视为启动失败
pub fn build_kafka_consumer(config: &dyn KafkaConsumerConfig) -> Result<StreamConsumer> {
    let consumer: StreamConsumer = ClientConfig::new()
        .set("bootstrap.servers", config.kafka_bootstrap())
        .set("group.id", config.consumer_group())
        .set("enable.partition.eof", "false")
        .set("session.timeout.ms", config.session_timeout_ms().to_string())
        .set("enable.auto.commit", config.enable_auto_commit().to_string())
        .set(
            "enable.auto.offset.store",
            config.enable_auto_offset_store().to_string(),
        )
        .set("auto.offset.reset", config.auto_offset_reset())
        .set(
            "fetch.message.max.bytes",
            config.fetch_message_max_bytes().to_string(),
        )
        .create()?;

    info!(
        bootstrap = %config.kafka_bootstrap(),
        group_id = %config.consumer_group(),
        auto_offset_reset = %config.auto_offset_reset(),
        auto_offset_store = config.enable_auto_offset_store(),
        "Kafka consumer created"
    );

    Ok(consumer)
}

/// 订阅 topic 并等待 partition assignment
///
/// 订阅失败是致命错误。等待超时不是：assignment 会在后续 `recv` 驱动的
/// rebalance 中完成，这里只记录告警并返回当前分配到的分区数
pub async fn subscribe_and_wait_for_assignment(
    consumer: &StreamConsumer,
    topic: &str,
    max_wait_seconds: u64,
) -> Result<usize> {
    consumer.subscribe(&[topic]).map_err(|err| {
        ExplainerError::broker(format!("failed to subscribe to topic {}: {}", topic, err))
    })?;
    info!(topic = %topic, "Subscribed to Kafka topic");

    for attempt in 1..=max_wait_seconds {
        tokio::time::sleep(Duration::from_secs(1)).await;

        match consumer.assignment() {
            Ok(assignment) if assignment.count() > 0 => {
                info!(
                    topic = %topic,
                    partition_count = assignment.count(),
                    attempts = attempt,
                    "Consumer assigned to partitions"
                );
                return Ok(assignment.count());
            }
            Ok(_) => {
                debug!(
                    attempt = attempt,
                    max_attempts = max_wait_seconds,
                    "Waiting for partition assignment"
                );
            }
            Err(err) => {
                debug!(error = %err, attempt = attempt, "Failed to read consumer assignment");
            }
        }
    }

    warn!(
        topic = %topic,
        waited_secs = max_wait_seconds,
        "No partitions assigned yet, continuing; assignment will complete on the first poll"
    );
    Ok(0)
}
