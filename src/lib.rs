//! Alert Explainer
//!
//! Consumes anomaly alerts from a Kafka topic, asks a hosted Gemini model for a short
//! natural-language explanation of each one, and prints the alert with its explanation.
//!
//! The pipeline is strictly sequential: one record is pulled, parsed, explained and
//! reported before the next one is awaited.

pub mod config;
pub mod enrichment;
pub mod error;
pub mod kafka;
pub mod logging;
pub mod pipeline;
pub mod prompt;
pub mod report;
pub mod retry;
pub mod source;

// Re-exports
pub use config::{AppConfig, CommitMode, KafkaSettings, ModelConfig, PipelineConfig, RetryConfig};
pub use enrichment::{Explainer, Explanation, GeminiClient, RetryingExplainer};
pub use error::{ErrorKind, ExplainerError, Result};
pub use pipeline::{AlertPipeline, PipelineStats};
pub use prompt::{PromptContext, PromptTemplate};
pub use report::{Report, Reporter};
pub use retry::{ExponentialBackoffPolicy, FixedRetryPolicy, RetryPolicy};
pub use source::{AlertSource, MemorySource, RawAlert};
