//! 带重试的解释器包装

use async_trait::async_trait;
use tracing::warn;

use super::{Explainer, Explanation};
use crate::error::Result;
use crate::prompt::PromptContext;
use crate::retry::RetryPolicy;

/// 按 `RetryPolicy` 重试可重试错误的解释器
///
/// 重试耗尽或遇到不可重试错误时返回最后一次的错误，由编排循环输出一行诊断
pub struct RetryingExplainer<E, P> {
    inner: E,
    policy: P,
}

impl<E, P> RetryingExplainer<E, P>
where
    E: Explainer,
    P: RetryPolicy,
{
    pub fn new(inner: E, policy: P) -> Self {
        Self { inner, policy }
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }
}

#[async_trait]
impl<E, P> Explainer for RetryingExplainer<E, P>
where
    E: Explainer,
    P: RetryPolicy,
{
    async fn explain(&self, prompt: &PromptContext) -> Result<Explanation> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.inner.explain(prompt).await {
                Ok(explanation) => return Ok(explanation),
                Err(err) if self.policy.should_retry(attempt, &err) => {
                    let delay = self.policy.backoff_duration(attempt);
                    warn!(
                        attempt = attempt,
                        max_attempts = self.policy.max_attempts(),
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Model call failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExplainerError;
    use crate::prompt::PromptTemplate;
    use crate::retry::FixedRetryPolicy;
    use std::sync::Mutex;
    use std::time::Duration;

    /// 按顺序返回预置结果的解释器
    struct ScriptedExplainer {
        results: Mutex<Vec<Result<Explanation>>>,
        calls: Mutex<usize>,
    }

    impl ScriptedExplainer {
        fn new(mut results: Vec<Result<Explanation>>) -> Self {
            results.reverse();
            Self {
                results: Mutex::new(results),
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl Explainer for ScriptedExplainer {
        async fn explain(&self, _prompt: &PromptContext) -> Result<Explanation> {
            *self.calls.lock().unwrap() += 1;
            self.results
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Err(ExplainerError::remote_call("script exhausted")))
        }
    }

    fn ok(text: &str) -> Result<Explanation> {
        Explanation::from_completion(text, 3)
    }

    #[tokio::test]
    async fn test_retries_transient_then_succeeds() {
        let inner = ScriptedExplainer::new(vec![
            Err(ExplainerError::remote_status(503, "busy")),
            Err(ExplainerError::Timeout(Duration::from_secs(1))),
            ok("fine"),
        ]);
        let explainer =
            RetryingExplainer::new(inner, FixedRetryPolicy::new(3, Duration::from_millis(1)));

        let prompt = PromptTemplate::new().render("{}");
        let explanation = explainer.explain(&prompt).await.unwrap();
        assert_eq!(explanation.as_str(), "fine");
        assert_eq!(explainer.inner().calls(), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let inner = ScriptedExplainer::new(vec![
            Err(ExplainerError::remote_status(500, "a")),
            Err(ExplainerError::remote_status(500, "b")),
            ok("too late"),
        ]);
        let explainer =
            RetryingExplainer::new(inner, FixedRetryPolicy::new(2, Duration::from_millis(1)));

        let prompt = PromptTemplate::new().render("{}");
        let err = explainer.explain(&prompt).await.unwrap_err();
        assert_eq!(err, ExplainerError::remote_status(500, "b"));
        assert_eq!(explainer.inner().calls(), 2);
    }

    #[tokio::test]
    async fn test_permanent_error_not_retried() {
        let inner = ScriptedExplainer::new(vec![Err(ExplainerError::remote_status(
            403,
            "API key not valid",
        ))]);
        let explainer =
            RetryingExplainer::new(inner, FixedRetryPolicy::new(5, Duration::from_millis(1)));

        let prompt = PromptTemplate::new().render("{}");
        assert!(explainer.explain(&prompt).await.is_err());
        assert_eq!(explainer.inner().calls(), 1);
    }
}
