//! 基于 `StreamConsumer` 的告警来源

use async_trait::async_trait;
use chrono::DateTime;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::message::Message;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::CommitMode;
use crate::error::{ExplainerError, Result};
use crate::source::{AlertSource, RawAlert};

const BROKER_ERROR_BACKOFF: Duration = Duration::from_secs(1);

/// Kafka 告警来源
///
/// 持有唯一的长连接消费者。`CommitMode::Auto` 下 offset 在 poll 后自动存储，
/// 与处理结果无关；`CommitMode::AfterReport` 下只在 `acknowledge` 时存储
pub struct KafkaAlertSource {
    consumer: StreamConsumer,
    commit_mode: CommitMode,
}

impl KafkaAlertSource {
    pub fn new(consumer: StreamConsumer, commit_mode: CommitMode) -> Self {
        Self {
            consumer,
            commit_mode,
        }
    }
}

/// 把消息体解码为 UTF-8 文本；tombstone（无消息体）按反序列化错误处理
fn decode_payload(payload: Option<&[u8]>) -> Result<String> {
    match payload {
        Some(bytes) => Ok(std::str::from_utf8(bytes)?.to_string()),
        None => Err(ExplainerError::deserialization("empty payload")),
    }
}

/// 提交的是下一条待消费的位置
fn next_offset(record: &RawAlert) -> i64 {
    record.offset + 1
}

#[async_trait]
impl AlertSource for KafkaAlertSource {
    async fn next_record(&mut self) -> Option<Result<RawAlert>> {
        let message = match self.consumer.recv().await {
            Ok(message) => message,
            Err(err) => {
                warn!(error = %err, "Kafka receive error");
                // librdkafka 会自行重连，这里避免在持续故障时空转
                tokio::time::sleep(BROKER_ERROR_BACKOFF).await;
                return Some(Err(ExplainerError::from(err)));
            }
        };

        let topic = message.topic().to_string();
        let partition = message.partition();
        let offset = message.offset();
        debug!(topic = %topic, partition, offset, "Received Kafka message");

        let payload = match decode_payload(message.payload()) {
            Ok(payload) => payload,
            Err(err) => return Some(Err(err)),
        };

        let timestamp = message
            .timestamp()
            .to_millis()
            .and_then(DateTime::from_timestamp_millis);

        Some(Ok(RawAlert {
            payload,
            topic,
            partition,
            offset,
            timestamp,
        }))
    }

    async fn acknowledge(&mut self, record: &RawAlert) -> Result<()> {
        if self.commit_mode == CommitMode::AfterReport {
            self.consumer
                .store_offset(&record.topic, record.partition, next_offset(record))?;
        }
        Ok(())
    }
}
