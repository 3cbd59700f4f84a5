use anyhow::Context;
use tracing::{error, info};

use alert_explainer::config::AppConfig;
use alert_explainer::enrichment::{GeminiClient, RetryingExplainer};
use alert_explainer::kafka::{
    KafkaAlertSource, build_kafka_consumer, subscribe_and_wait_for_assignment,
};
use alert_explainer::logging::{LogConfig, init_logging};
use alert_explainer::pipeline::AlertPipeline;
use alert_explainer::report::Reporter;
use alert_explainer::retry::ExponentialBackoffPolicy;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    init_logging(LogConfig::from_env())
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {}", e))?;

    // 缺少凭据时在连接 broker 之前退出
    let config = AppConfig::from_env().inspect_err(|err| {
        error!(error = %err, "Invalid configuration, refusing to start");
    })?;

    let gemini = GeminiClient::new(&config.model)?;
    info!(model = %config.model.model, url = %gemini.url(), "Gemini client ready");
    let explainer =
        RetryingExplainer::new(gemini, ExponentialBackoffPolicy::from_config(&config.retry));

    let consumer = build_kafka_consumer(&config.kafka).context("failed to create Kafka consumer")?;
    subscribe_and_wait_for_assignment(
        &consumer,
        &config.kafka.topic,
        config.kafka.assignment_wait_secs,
    )
    .await
    .context("failed to subscribe to alerts topic")?;

    let source = KafkaAlertSource::new(consumer, config.kafka.commit_mode);
    let reporter = Reporter::stdout(config.pipeline.separator_width);
    let mut pipeline = AlertPipeline::new(source, explainer, reporter);

    info!(
        topic = %config.kafka.topic,
        group_id = %config.kafka.group_id,
        commit_mode = ?config.kafka.commit_mode,
        "Gemini alert summarizer is now running"
    );

    let stats = pipeline.run(shutdown_signal()).await?;
    info!(
        explained = stats.explained,
        failed = stats.failed,
        "Gemini alert summarizer exited"
    );
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        // 无法监听信号时只能依赖外部终止进程
        error!(error = %err, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}
