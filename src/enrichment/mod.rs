//! 告警解释（模型调用）模块
//!
//! `Explainer` 是编排循环与托管模型之间的接缝：生产环境使用 `GeminiClient`，
//! 外层可叠加 `RetryingExplainer` 实现超时后的有界重试

pub mod gemini;
pub mod retrying;

pub use gemini::GeminiClient;
pub use retrying::RetryingExplainer;

use async_trait::async_trait;
use std::fmt;

use crate::error::{ExplainerError, Result};
use crate::prompt::PromptContext;

/// 模型返回的告警解释
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Explanation {
    text: String,
}

impl Explanation {
    /// 规整模型输出：去掉空行和首尾空白，最多保留 `max_lines` 行
    pub fn from_completion(completion: &str, max_lines: usize) -> Result<Self> {
        let lines: Vec<&str> = completion
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .take(max_lines)
            .collect();

        if lines.is_empty() {
            return Err(ExplainerError::remote_call("empty completion"));
        }

        Ok(Self {
            text: lines.join("\n"),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn line_count(&self) -> usize {
        self.text.lines().count()
    }
}

impl fmt::Display for Explanation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// 告警解释器
#[async_trait]
pub trait Explainer: Send + Sync {
    async fn explain(&self, prompt: &PromptContext) -> Result<Explanation>;
}
