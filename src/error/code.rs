//! 错误类别定义
//!
//! 每条记录的失败都落入以下封闭集合之一，便于单独测试各类失败路径

use serde::{Deserialize, Serialize};
use std::fmt;

/// 错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// 启动配置错误（缺少凭据等），致命
    Configuration,
    /// 告警载荷不是合法 JSON / UTF-8，跳过当前记录
    Deserialization,
    /// 模型 API 调用失败（网络、认证、配额、超时、响应格式）
    RemoteCall,
    /// Kafka 连接或订阅错误
    Broker,
}

impl ErrorKind {
    /// 获取错误类别的英文标识符
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Configuration => "CONFIGURATION_ERROR",
            ErrorKind::Deserialization => "DESERIALIZATION_ERROR",
            ErrorKind::RemoteCall => "REMOTE_CALL_ERROR",
            ErrorKind::Broker => "BROKER_ERROR",
        }
    }

    /// 是否只影响单条记录（循环继续）
    pub fn is_per_record(&self) -> bool {
        matches!(self, ErrorKind::Deserialization | ErrorKind::RemoteCall)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
