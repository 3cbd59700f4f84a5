//! 错误类型转换实现
//!
//! 将第三方库错误映射到 `ExplainerError` 的封闭类别

use super::ExplainerError;
use std::time::Duration;

impl From<serde_json::Error> for ExplainerError {
    fn from(err: serde_json::Error) -> Self {
        ExplainerError::deserialization(err.to_string())
    }
}

impl From<std::str::Utf8Error> for ExplainerError {
    fn from(err: std::str::Utf8Error) -> Self {
        ExplainerError::deserialization(format!("payload is not valid UTF-8: {}", err))
    }
}

impl From<toml::de::Error> for ExplainerError {
    fn from(err: toml::de::Error) -> Self {
        ExplainerError::configuration(format!("invalid config file: {}", err))
    }
}

impl From<rdkafka::error::KafkaError> for ExplainerError {
    fn from(err: rdkafka::error::KafkaError) -> Self {
        ExplainerError::broker(err.to_string())
    }
}

impl From<reqwest::Error> for ExplainerError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            // reqwest 不携带超时时长，由调用方通过 `with_timeout` 补全
            return ExplainerError::Timeout(Duration::ZERO);
        }
        match err.status() {
            Some(status) => ExplainerError::remote_status(status.as_u16(), err.to_string()),
            None => ExplainerError::remote_call(err.to_string()),
        }
    }
}

impl ExplainerError {
    /// 为超时错误补全实际配置的超时时长
    pub fn with_timeout(self, timeout: Duration) -> Self {
        match self {
            ExplainerError::Timeout(_) => ExplainerError::Timeout(timeout),
            other => other,
        }
    }
}
