//! 服务配置
//!
//! 加载顺序：内置默认值 → `ALERT_EXPLAINER_CONFIG` 指向的 TOML 文件 → 环境变量覆盖 →
//! 必需的模型凭据 `GEMINI_API_KEY`。配置在启动时构建一次，之后不再修改

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::error::{ExplainerError, Result};
use crate::kafka::{KafkaConsumerConfig, KafkaProducerConfig};

/// 配置文件路径环境变量
pub const CONFIG_PATH_ENV: &str = "ALERT_EXPLAINER_CONFIG";
/// 模型凭据环境变量
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub kafka: KafkaSettings,
    pub model: ModelConfig,
    pub retry: RetryConfig,
    pub pipeline: PipelineConfig,
}

/// Offset 提交方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitMode {
    /// poll 之后自动提交，与处理结果无关（至多一次）
    #[default]
    Auto,
    /// 仅在报告成功输出后才存储 offset（至少一次，可能重复解释）
    AfterReport,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct KafkaSettings {
    pub bootstrap_servers: String,
    pub group_id: String,
    pub topic: String,
    pub auto_offset_reset: String,
    pub commit_mode: CommitMode,
    pub session_timeout_ms: u64,
    pub assignment_wait_secs: u64,
}

impl Default for KafkaSettings {
    fn default() -> Self {
        Self {
            bootstrap_servers: "localhost:9092".to_string(),
            group_id: "langchain-gemini".to_string(),
            topic: "alerts".to_string(),
            auto_offset_reset: "latest".to_string(),
            commit_mode: CommitMode::Auto,
            session_timeout_ms: 30000,
            assignment_wait_secs: 10,
        }
    }
}

impl KafkaConsumerConfig for KafkaSettings {
    fn kafka_bootstrap(&self) -> &str {
        &self.bootstrap_servers
    }

    fn consumer_group(&self) -> &str {
        &self.group_id
    }

    fn kafka_topic(&self) -> &str {
        &self.topic
    }

    fn session_timeout_ms(&self) -> u64 {
        self.session_timeout_ms
    }

    fn auto_offset_reset(&self) -> &str {
        &self.auto_offset_reset
    }

    fn enable_auto_offset_store(&self) -> bool {
        self.commit_mode == CommitMode::Auto
    }
}

impl KafkaProducerConfig for KafkaSettings {
    fn kafka_bootstrap(&self) -> &str {
        &self.bootstrap_servers
    }
}

/// 模型调用配置
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ModelConfig {
    /// 只从环境变量读取，不参与序列化
    #[serde(skip)]
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub endpoint: String,
    pub timeout_secs: u64,
    pub max_output_lines: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "models/gemini-1.5-flash-latest".to_string(),
            temperature: 0.3,
            endpoint: "https://generativelanguage.googleapis.com".to_string(),
            timeout_secs: 30,
            max_output_lines: 3,
        }
    }
}

impl fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("endpoint", &self.endpoint)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_output_lines", &self.max_output_lines)
            .finish()
    }
}

impl ModelConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// 模型调用重试配置
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// 总尝试次数（含首次）
    pub max_attempts: usize,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 500,
            max_delay_ms: 8000,
            jitter: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub separator_width: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { separator_width: 60 }
    }
}

impl AppConfig {
    /// 从进程环境加载配置
    pub fn from_env() -> Result<Self> {
        let file_contents = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Some(std::fs::read_to_string(&path).map_err(|e| {
                ExplainerError::configuration(format!("failed to read {}: {}", path, e))
            })?),
            Err(_) => None,
        };
        Self::from_sources(file_contents.as_deref(), |key| std::env::var(key).ok())
    }

    /// 从配置文件内容和变量查找函数加载配置
    ///
    /// `lookup` 通常是 `std::env::var`，测试中替换为固定表
    pub fn from_sources<F>(file_contents: Option<&str>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config: AppConfig = match file_contents {
            Some(contents) => toml::from_str(contents)?,
            None => AppConfig::default(),
        };

        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = non_empty("KAFKA_BOOTSTRAP_SERVERS") {
            config.kafka.bootstrap_servers = v;
        }
        if let Some(v) = non_empty("KAFKA_GROUP_ID") {
            config.kafka.group_id = v;
        }
        if let Some(v) = non_empty("KAFKA_TOPIC") {
            config.kafka.topic = v;
        }
        if let Some(v) = non_empty("GEMINI_MODEL") {
            config.model.model = v;
        }
        if let Some(v) = non_empty("GEMINI_ENDPOINT") {
            config.model.endpoint = v;
        }

        config.model.api_key = non_empty(API_KEY_ENV)
            .map(|v| v.trim().to_string())
            .ok_or_else(|| ExplainerError::configuration(format!("{} not set", API_KEY_ENV)))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.model.temperature) {
            return Err(ExplainerError::configuration(format!(
                "temperature must be within 0.0..=2.0, got {}",
                self.model.temperature
            )));
        }
        if self.model.max_output_lines == 0 {
            return Err(ExplainerError::configuration(
                "max_output_lines must be at least 1",
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err(ExplainerError::configuration(
                "retry.max_attempts must be at least 1",
            ));
        }
        if self.kafka.topic.is_empty() || self.kafka.group_id.is_empty() {
            return Err(ExplainerError::configuration(
                "kafka topic and group_id must not be empty",
            ));
        }
        match self.kafka.auto_offset_reset.as_str() {
            "latest" | "earliest" => Ok(()),
            other => Err(ExplainerError::configuration(format!(
                "unsupported auto_offset_reset: {}",
                other
            ))),
        }
    }
}
