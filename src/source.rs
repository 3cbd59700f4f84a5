//! 告警来源抽象
//!
//! 编排循环只依赖 `AlertSource`，生产环境由 Kafka 实现，测试使用内存实现

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;

use crate::error::Result;

/// 一条从 broker 取出的原始告警
///
/// 只在一次循环迭代内持有，处理完即丢弃
#[derive(Debug, Clone, PartialEq)]
pub struct RawAlert {
    pub payload: String,
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
    pub timestamp: Option<DateTime<Utc>>,
}

impl RawAlert {
    /// 构建不带 broker 位置信息的告警（用于测试和本地回放）
    pub fn detached(payload: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
            topic: String::new(),
            partition: -1,
            offset: -1,
            timestamp: None,
        }
    }
}

/// 告警来源
#[async_trait]
pub trait AlertSource: Send {
    /// 等待下一条记录
    ///
    /// * `None` - 来源已耗尽（只有有限来源会出现）
    /// * `Some(Err(_))` - 当前记录无法解码，或 broker 报错
    async fn next_record(&mut self) -> Option<Result<RawAlert>>;

    /// 记录已成功报告
    async fn acknowledge(&mut self, _record: &RawAlert) -> Result<()> {
        Ok(())
    }
}

/// 内存告警来源，按顺序产出预置的记录
#[derive(Debug, Default)]
pub struct MemorySource {
    records: VecDeque<Result<RawAlert>>,
    acknowledged: Vec<RawAlert>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从原始载荷列表构建
    pub fn from_payloads<I, S>(payloads: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut source = Self::new();
        for payload in payloads {
            source.push(RawAlert::detached(payload));
        }
        source
    }

    pub fn push(&mut self, record: RawAlert) {
        self.records.push_back(Ok(record));
    }

    pub fn push_error(&mut self, err: crate::error::ExplainerError) {
        self.records.push_back(Err(err));
    }

    /// 已确认的记录
    pub fn acknowledged(&self) -> &[RawAlert] {
        &self.acknowledged
    }
}

#[async_trait]
impl AlertSource for MemorySource {
    async fn next_record(&mut self) -> Option<Result<RawAlert>> {
        self.records.pop_front()
    }

    async fn acknowledge(&mut self, record: &RawAlert) -> Result<()> {
        self.acknowledged.push(record.clone());
        Ok(())
    }
}
