//! 告警解释编排循环
//!
//! 状态机只有两个状态：
//! - Idle：等待来源的下一条记录（此时可被关闭信号打断）
//! - Processing：解析 → 渲染提示词 → 调用模型 → 输出，完成前不可取消
//!
//! 每次迭代互不相关，不保留跨迭代状态（统计计数除外）

use serde_json::Value;
use std::future::Future;
use std::io::{self, Write};
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

use crate::enrichment::Explainer;
use crate::error::{ExplainerError, Result};
use crate::prompt::PromptTemplate;
use crate::report::{Report, Reporter};
use crate::source::{AlertSource, RawAlert};

/// 运行统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// 收到的记录数（含无法解码的记录）
    pub received: u64,
    /// 成功输出解释的记录数
    pub explained: u64,
    /// 输出了失败诊断的记录数
    pub failed: u64,
    /// 不对应具体记录的错误次数（broker 错误等）
    pub broker_errors: u64,
}

/// 告警解释管道
pub struct AlertPipeline<S, E, W: Write> {
    source: S,
    explainer: E,
    template: PromptTemplate,
    reporter: Reporter<W>,
    stats: PipelineStats,
}

impl<S, E, W> AlertPipeline<S, E, W>
where
    S: AlertSource,
    E: Explainer,
    W: Write,
{
    pub fn new(source: S, explainer: E, reporter: Reporter<W>) -> Self {
        Self {
            source,
            explainer,
            template: PromptTemplate::new(),
            reporter,
            stats: PipelineStats::default(),
        }
    }

    /// 处理一条原始告警
    ///
    /// 提示词由原始文本渲染，而不是解析后的对象
    pub async fn process(&self, raw: &str) -> Result<Report> {
        let alert: Value = serde_json::from_str(raw)?;
        let prompt = self.template.render(raw);
        let explanation = self.explainer.explain(&prompt).await?;
        Ok(Report { alert, explanation })
    }

    /// 处理来源产出的一项并写出结果
    ///
    /// 只有标准输出写失败才返回错误
    pub async fn handle(&mut self, item: Result<RawAlert>) -> io::Result<()> {
        let record = match item {
            Ok(record) => record,
            Err(err) if !err.kind().is_per_record() => {
                self.stats.broker_errors += 1;
                error!(kind = %err.kind(), error = %err, "Source error while waiting for alerts");
                return Ok(());
            }
            Err(err) => {
                self.stats.received += 1;
                return self.fail(&err);
            }
        };

        self.stats.received += 1;
        let span = info_span!(
            "alert",
            record_id = %Uuid::new_v4(),
            topic = %record.topic,
            partition = record.partition,
            offset = record.offset
        );

        async {
            let result = self.process(&record.payload).await;
            match result {
                Ok(report) => {
                    self.reporter.report(&report)?;
                    self.stats.explained += 1;
                    debug!(lines = report.explanation.line_count(), "Alert explained");

                    if let Err(err) = self.source.acknowledge(&record).await {
                        warn!(error = %err, "Failed to store offset for processed alert");
                    }
                    Ok::<(), io::Error>(())
                }
                Err(err) => self.fail(&err),
            }
        }
        .instrument(span)
        .await
    }

    fn fail(&mut self, err: &ExplainerError) -> io::Result<()> {
        self.stats.failed += 1;
        warn!(kind = %err.kind(), error = %err, "Failed to process alert");
        self.reporter.failure(err)
    }

    /// 运行循环，直到来源耗尽或 `shutdown` 完成
    ///
    /// 关闭信号只在 Idle 状态生效，正在处理的记录会先处理完
    pub async fn run<F>(&mut self, shutdown: F) -> io::Result<PipelineStats>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            let item = tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("Shutdown signal received, stopping alert pipeline");
                    break;
                }
                item = self.source.next_record() => item,
            };

            match item {
                Some(item) => self.handle(item).await?,
                None => {
                    info!("Alert source exhausted");
                    break;
                }
            }
        }

        info!(
            received = self.stats.received,
            explained = self.stats.explained,
            failed = self.stats.failed,
            broker_errors = self.stats.broker_errors,
            "Alert pipeline stopped"
        );
        Ok(self.stats)
    }

    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    pub fn explainer(&self) -> &E {
        &self.explainer
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn reporter(&self) -> &Reporter<W> {
        &self.reporter
    }
}
