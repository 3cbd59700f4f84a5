//! 重试策略模块
//!
//! 只用于模型调用；Kafka 的重连由 librdkafka 自行处理

pub mod exponential;
pub mod fixed;

pub use exponential::ExponentialBackoffPolicy;
pub use fixed::FixedRetryPolicy;

use std::time::Duration;

use crate::error::ExplainerError;

/// 重试策略 trait
///
/// `attempt` 为已完成的尝试次数（首次失败后为 1）
pub trait RetryPolicy: Send + Sync {
    fn should_retry(&self, attempt: usize, error: &ExplainerError) -> bool {
        attempt < self.max_attempts() && error.is_retryable()
    }

    fn backoff_duration(&self, attempt: usize) -> Duration;

    fn max_attempts(&self) -> usize;
}
