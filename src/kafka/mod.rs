//! Kafka 工具模块
//!
//! 告警消费者、告警来源实现，以及用于回放告警的生产者

pub mod consumer_builder;
pub mod consumer_config;
pub mod producer_builder;
pub mod producer_config;
pub mod source;

pub use consumer_builder::{build_kafka_consumer, subscribe_and_wait_for_assignment};
pub use consumer_config::KafkaConsumerConfig;
pub use producer_builder::{build_kafka_producer, publish_alert};
pub use producer_config::KafkaProducerConfig;
pub use source::KafkaAlertSource;
