//! 告警解释提示词模板
//!
//! 固定前言 + 原始告警文本 + 固定结尾。告警文本按原样单次插入，
//! 不做转义，也不会对插入后的内容再次做占位符替换

/// 模板前言
const PREAMBLE: &str =
    "You are an intelligent trading assistant. Explain this anomaly alert JSON in simple terms:";

/// 模板结尾
const SUFFIX: &str = "Be concise, max 3 lines.";

/// 渲染后的提示词
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptContext {
    text: String,
}

impl PromptContext {
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

/// 提示词模板
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    preamble: String,
    suffix: String,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptTemplate {
    pub fn new() -> Self {
        Self {
            preamble: PREAMBLE.to_string(),
            suffix: SUFFIX.to_string(),
        }
    }

    /// 渲染提示词，`alert_json` 为未解析的原始载荷文本
    pub fn render(&self, alert_json: &str) -> PromptContext {
        let mut text =
            String::with_capacity(self.preamble.len() + alert_json.len() + self.suffix.len() + 4);
        text.push('\n');
        text.push_str(&self.preamble);
        text.push('\n');
        text.push_str(alert_json);
        text.push_str("\n\n");
        text.push_str(&self.suffix);
        text.push('\n');
        PromptContext { text }
    }
}
