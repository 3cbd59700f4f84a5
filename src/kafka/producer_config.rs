//! Kafka 生产者配置 Trait

/// Kafka 生产者配置 Trait
pub trait KafkaProducerConfig: Send + Sync {
    /// Kafka Bootstrap Servers 地址
    fn kafka_bootstrap(&self) -> &str;

    /// 消息超时时间（毫秒），默认 5000
    fn message_timeout_ms(&self) -> u64 {
        5000
    }

    /// 是否启用幂等性，默认 true
    fn enable_idempotence(&self) -> bool {
        true
    }

    /// 压缩类型，默认 "none"
    /// 可选值: "none", "gzip", "snappy", "lz4", "zstd"
    fn compression_type(&self) -> &str {
        "none"
    }

    /// 批量发送延迟（毫秒），默认 5ms
    fn linger_ms(&self) -> u64 {
        5
    }
}
