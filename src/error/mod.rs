//! 错误处理模块
//!
//! 所有失败被归入封闭的类别集合：配置 / 反序列化 / 远程调用 / Kafka。
//! 前两类之外的错误只在启动阶段出现

pub mod code;
pub mod conversions;
pub mod explainer_error;

pub use code::ErrorKind;
pub use explainer_error::{ExplainerError, Result};
