use super::RetryPolicy;
use crate::config::RetryConfig;
use rand::Rng;
use std::time::Duration;

/// 指数退避重试策略
#[derive(Debug, Clone)]
pub struct ExponentialBackoffPolicy {
    max_attempts: usize,
    base_delay: Duration,
    max_delay: Duration,
    jitter: bool,
}

impl ExponentialBackoffPolicy {
    pub fn new(max_attempts: usize, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            max_delay,
            jitter: false,
        }
    }

    /// 在 [delay/2, delay] 区间内随机化等待时间
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_millis(config.base_delay_ms),
            Duration::from_millis(config.max_delay_ms),
        )
        .with_jitter(config.jitter)
    }
}

impl RetryPolicy for ExponentialBackoffPolicy {
    fn backoff_duration(&self, attempt: usize) -> Duration {
        let exponent = attempt.saturating_sub(1).min(10) as u32;
        let delay_ms = (self.base_delay.as_millis() as u64).saturating_mul(1 << exponent);
        let delay = Duration::from_millis(delay_ms).min(self.max_delay);

        if self.jitter && !delay.is_zero() {
            let half = delay.as_millis() as u64 / 2;
            let jittered = rand::thread_rng().gen_range(half..=delay.as_millis() as u64);
            Duration::from_millis(jittered)
        } else {
            delay
        }
    }

    fn max_attempts(&self) -> usize {
        self.max_attempts
    }
}
