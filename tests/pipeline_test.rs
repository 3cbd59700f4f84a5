//! 编排循环集成测试
//!
//! 使用内存来源和假解释器驱动完整的 解析 → 渲染 → 解释 → 输出 流程，
//! 输出写入 `Vec<u8>` 以便断言

use alert_explainer::{
    AlertPipeline, ExplainerError, Explainer, Explanation, MemorySource, PipelineStats,
    PromptContext, RawAlert, Reporter, Result,
};
use async_trait::async_trait;
use std::sync::Mutex;

const SCENARIO_A: &str = r#"{"type":"price_spike","symbol":"XYZ","delta":0.42}"#;

/// 总是返回同一段解释，并记录收到的提示词
struct FixedExplainer {
    completion: String,
    prompts: Mutex<Vec<String>>,
}

impl FixedExplainer {
    fn new(completion: &str) -> Self {
        Self {
            completion: completion.to_string(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Explainer for FixedExplainer {
    async fn explain(&self, prompt: &PromptContext) -> Result<Explanation> {
        self.prompts
            .lock()
            .unwrap()
            .push(prompt.as_str().to_string());
        Explanation::from_completion(&self.completion, 3)
    }
}

/// 总是失败的解释器
struct FailingExplainer;

#[async_trait]
impl Explainer for FailingExplainer {
    async fn explain(&self, _prompt: &PromptContext) -> Result<Explanation> {
        Err(ExplainerError::remote_status(503, "model overloaded"))
    }
}

/// 对包含 "fail" 的载荷失败，其余成功
struct SelectiveExplainer;

#[async_trait]
impl Explainer for SelectiveExplainer {
    async fn explain(&self, prompt: &PromptContext) -> Result<Explanation> {
        if prompt.as_str().contains("fail") {
            Err(ExplainerError::remote_call("connection reset"))
        } else {
            Explanation::from_completion("Looks routine.", 3)
        }
    }
}

async fn run_pipeline<E: Explainer>(
    source: MemorySource,
    explainer: E,
) -> (String, AlertPipeline<MemorySource, E, Vec<u8>>) {
    let reporter = Reporter::new(Vec::new(), 60);
    let mut pipeline = AlertPipeline::new(source, explainer, reporter);
    pipeline
        .run(std::future::pending::<()>())
        .await
        .expect("writing to a Vec never fails");
    let output = String::from_utf8(pipeline.reporter().get_ref().clone()).unwrap();
    (output, pipeline)
}

fn explanation_lines(output: &str) -> Vec<&str> {
    output
        .split("Explanation:\n")
        .nth(1)
        .expect("explanation header")
        .lines()
        .take_while(|line| !line.starts_with('='))
        .collect()
}

/// 场景 A：合法告警输出格式化 JSON 和不超过 3 行的解释
#[tokio::test]
async fn test_valid_alert_is_reported() {
    let explainer = FixedExplainer::new(
        "XYZ rose 42% against its recent average.\nThis may be a price spike worth reviewing.\nNo action taken yet.\nIgnored fourth line.",
    );
    let source = MemorySource::from_payloads([SCENARIO_A]);
    let (output, pipeline) = run_pipeline(source, explainer).await;

    let pretty = "{\n  \"type\": \"price_spike\",\n  \"symbol\": \"XYZ\",\n  \"delta\": 0.42\n}";
    assert!(output.starts_with("Raw Alert:\n"));
    assert!(output.contains(pretty), "output was:\n{}", output);

    let lines = explanation_lines(&output);
    assert!(!lines.is_empty());
    assert!(lines.len() <= 3);
    assert!(!output.contains("Ignored fourth line."));
    assert!(output.contains(&"=".repeat(60)));

    assert_eq!(
        pipeline.stats(),
        PipelineStats {
            received: 1,
            explained: 1,
            failed: 0,
            broker_errors: 0,
        }
    );

    // 提示词由原始文本渲染，而不是重新序列化的对象
    let prompts = pipeline.explainer().prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains(SCENARIO_A));
}

/// 场景 B：非法 JSON 只输出一行包含解析原因的诊断
#[tokio::test]
async fn test_malformed_payload_emits_single_diagnostic() {
    let source = MemorySource::from_payloads(["not valid json"]);
    let (output, pipeline) = run_pipeline(source, FixedExplainer::new("unused")).await;

    assert_eq!(output.lines().count(), 1);
    assert!(output.starts_with("Failed to process message: invalid alert payload:"));
    assert!(output.contains("expected ident"));
    assert!(!output.contains("Explanation:"));
    assert!(pipeline.explainer().prompts().is_empty());
    assert_eq!(pipeline.stats().failed, 1);
}

/// 模型调用失败：一行诊断，不输出解释，循环继续
#[tokio::test]
async fn test_remote_failure_emits_single_diagnostic() {
    let source = MemorySource::from_payloads([SCENARIO_A]);
    let (output, pipeline) = run_pipeline(source, FailingExplainer).await;

    assert_eq!(
        output,
        "Failed to process message: model request failed with HTTP 503: model overloaded\n"
    );
    assert_eq!(pipeline.stats().explained, 0);
    assert_eq!(pipeline.stats().failed, 1);
}

/// 失败不会中断循环，后续记录照常处理
#[tokio::test]
async fn test_loop_continues_after_failures() {
    let source = MemorySource::from_payloads([
        "not valid json",
        r#"{"symbol":"AAA","note":"fail"}"#,
        r#"{"symbol":"BBB"}"#,
    ]);
    let (output, pipeline) = run_pipeline(source, SelectiveExplainer).await;

    let diagnostics: Vec<&str> = output
        .lines()
        .filter(|line| line.starts_with("Failed to process message:"))
        .collect();
    assert_eq!(diagnostics.len(), 2);
    assert!(diagnostics[1].contains("connection reset"));
    assert_eq!(output.matches("Raw Alert:").count(), 1);
    assert!(output.contains("\"BBB\""));

    assert_eq!(
        pipeline.stats(),
        PipelineStats {
            received: 3,
            explained: 1,
            failed: 2,
            broker_errors: 0,
        }
    );
}

/// 同一载荷重复投递产生两份独立且形状相同的报告
#[tokio::test]
async fn test_redelivery_produces_two_reports() {
    let source = MemorySource::from_payloads([SCENARIO_A, SCENARIO_A]);
    let (output, pipeline) = run_pipeline(source, FixedExplainer::new("Spike.")).await;

    let blocks: Vec<&str> = output
        .split_inclusive(&format!("{}\n\n", "=".repeat(60)))
        .collect();
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0], blocks[1]);
    assert_eq!(pipeline.stats().explained, 2);
}

/// 只有成功输出的记录会被确认
#[tokio::test]
async fn test_only_reported_records_are_acknowledged() {
    let mut source = MemorySource::new();
    source.push(RawAlert {
        payload: r#"{"id":1}"#.to_string(),
        topic: "alerts".to_string(),
        partition: 0,
        offset: 10,
        timestamp: None,
    });
    source.push(RawAlert {
        payload: r#"{"id":2,"fail":true}"#.to_string(),
        topic: "alerts".to_string(),
        partition: 0,
        offset: 11,
        timestamp: None,
    });
    source.push(RawAlert {
        payload: "{broken".to_string(),
        topic: "alerts".to_string(),
        partition: 0,
        offset: 12,
        timestamp: None,
    });

    let (_output, pipeline) = run_pipeline(source, SelectiveExplainer).await;

    let acknowledged: Vec<i64> = pipeline
        .source()
        .acknowledged()
        .iter()
        .map(|r| r.offset)
        .collect();
    assert_eq!(acknowledged, vec![10]);
}

/// 来源层的解码错误计为失败记录；broker 错误只记日志
#[tokio::test]
async fn test_source_errors() {
    let mut source = MemorySource::new();
    source.push_error(ExplainerError::deserialization("payload is not valid UTF-8"));
    source.push_error(ExplainerError::broker("transport failure"));
    source.push(RawAlert::detached(SCENARIO_A));

    let (output, pipeline) = run_pipeline(source, FixedExplainer::new("Spike.")).await;

    let diagnostics: Vec<&str> = output
        .lines()
        .filter(|line| line.starts_with("Failed to process message:"))
        .collect();
    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics[0].contains("not valid UTF-8"));
    assert!(!output.contains("transport failure"));

    assert_eq!(
        pipeline.stats(),
        PipelineStats {
            received: 2,
            explained: 1,
            failed: 1,
            broker_errors: 1,
        }
    );
}

/// 非记录级错误（如配置错误）不输出诊断，循环继续
#[tokio::test]
async fn test_non_record_errors_do_not_print_diagnostics() {
    let mut source = MemorySource::new();
    source.push_error(ExplainerError::configuration("consumer misconfigured"));
    source.push(RawAlert::detached(SCENARIO_A));

    let (output, pipeline) = run_pipeline(source, FixedExplainer::new("Spike.")).await;

    assert!(!output.contains("Failed to process message"));
    assert!(!output.contains("consumer misconfigured"));
    assert_eq!(pipeline.stats().explained, 1);
    assert_eq!(pipeline.stats().broker_errors, 1);
}

/// 关闭信号在 Idle 状态立即生效
#[tokio::test]
async fn test_shutdown_stops_idle_loop() {
    let source = MemorySource::from_payloads([SCENARIO_A]);
    let reporter = Reporter::new(Vec::new(), 60);
    let mut pipeline = AlertPipeline::new(source, FixedExplainer::new("Spike."), reporter);

    let stats = pipeline.run(async {}).await.unwrap();
    assert_eq!(stats, PipelineStats::default());
    assert!(pipeline.reporter().get_ref().is_empty());
}

/// `process` 可以脱离循环单独调用
#[tokio::test]
async fn test_process_returns_typed_errors() {
    let pipeline = AlertPipeline::new(
        MemorySource::new(),
        FailingExplainer,
        Reporter::new(Vec::new(), 60),
    );

    let err = pipeline.process("[1, 2").await.unwrap_err();
    assert_eq!(err.kind(), alert_explainer::ErrorKind::Deserialization);

    let err = pipeline.process("[1, 2]").await.unwrap_err();
    assert_eq!(err.kind(), alert_explainer::ErrorKind::RemoteCall);
}
