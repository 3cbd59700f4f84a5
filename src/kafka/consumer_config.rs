//! Kafka 消费者配置 Trait
//!
//! 定义告警消费者需要的配置接口，默认值对应单消费者、自动提交的部署方式

/// Kafka 消费者配置 Trait
pub trait KafkaConsumerConfig: Send + Sync {
    /// Kafka Bootstrap Servers 地址
    fn kafka_bootstrap(&self) -> &str;

    /// Consumer Group ID
    fn consumer_group(&self) -> &str;

    /// 告警 Topic 名称
    fn kafka_topic(&self) -> &str;

    /// 会话超时（毫秒），默认 30000
    fn session_timeout_ms(&self) -> u64 {
        30000
    }

    /// 是否自动提交 offset，默认 true
    fn enable_auto_commit(&self) -> bool {
        true
    }

    /// poll 后是否自动存储 offset，默认 true
    ///
    /// 关闭后只有显式 `store_offset` 的位置才会被自动提交
    fn enable_auto_offset_store(&self) -> bool {
        true
    }

    /// 组内无已提交 offset 时的起始位置，默认 "latest"
    fn auto_offset_reset(&self) -> &str {
        "latest"
    }

    /// 最大消息大小（字节），默认 1MB
    fn fetch_message_max_bytes(&self) -> usize {
        1024 * 1024
    }
}
