//! 告警解释服务统一错误类型

use super::code::ErrorKind;
use std::time::Duration;
use thiserror::Error;

/// 告警解释服务统一错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExplainerError {
    /// 配置错误
    #[error("configuration error: {0}")]
    Configuration(String),

    /// 反序列化错误
    #[error("invalid alert payload: {0}")]
    Deserialization(String),

    /// 模型 API 调用错误
    #[error("{}", remote_call_message(.status, .reason))]
    RemoteCall {
        status: Option<u16>,
        reason: String,
    },

    /// 模型 API 调用超时
    #[error("model request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// Kafka 错误
    #[error("broker error: {0}")]
    Broker(String),
}

fn remote_call_message(status: &Option<u16>, reason: &str) -> String {
    match status {
        Some(status) => format!("model request failed with HTTP {}: {}", status, reason),
        None => format!("model request failed: {}", reason),
    }
}

impl ExplainerError {
    /// 创建配置错误
    pub fn configuration(reason: impl Into<String>) -> Self {
        ExplainerError::Configuration(reason.into())
    }

    /// 创建反序列化错误
    pub fn deserialization(reason: impl Into<String>) -> Self {
        ExplainerError::Deserialization(reason.into())
    }

    /// 创建远程调用错误（无 HTTP 状态，例如传输层失败）
    pub fn remote_call(reason: impl Into<String>) -> Self {
        ExplainerError::RemoteCall {
            status: None,
            reason: reason.into(),
        }
    }

    /// 创建带 HTTP 状态码的远程调用错误
    pub fn remote_status(status: u16, reason: impl Into<String>) -> Self {
        ExplainerError::RemoteCall {
            status: Some(status),
            reason: reason.into(),
        }
    }

    /// 创建 Kafka 错误
    pub fn broker(reason: impl Into<String>) -> Self {
        ExplainerError::Broker(reason.into())
    }

    /// 获取错误类别
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExplainerError::Configuration(_) => ErrorKind::Configuration,
            ExplainerError::Deserialization(_) => ErrorKind::Deserialization,
            ExplainerError::RemoteCall { .. } | ExplainerError::Timeout(_) => ErrorKind::RemoteCall,
            ExplainerError::Broker(_) => ErrorKind::Broker,
        }
    }

    /// 判断是否为可重试的错误
    ///
    /// 超时、无状态码的传输失败、429 与 5xx 可重试；其余不重试
    pub fn is_retryable(&self) -> bool {
        match self {
            ExplainerError::Timeout(_) => true,
            ExplainerError::RemoteCall { status: None, .. } => true,
            ExplainerError::RemoteCall {
                status: Some(status),
                ..
            } => *status == 429 || (500..600).contains(status),
            _ => false,
        }
    }
}

/// 结果类型别名
pub type Result<T> = std::result::Result<T, ExplainerError>;
