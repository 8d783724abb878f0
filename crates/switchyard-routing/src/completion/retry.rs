use super::LlmBackend;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use switchyard_core::{CompletionRequest, LlmResponse, SwitchyardError, SwitchyardResult};
use tracing::{info, warn};

/// Type alias for the injectable sleep function used in tests.
#[cfg(test)]
type SleepFn = Box<
    dyn Fn(u64) -> std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send>> + Send + Sync,
>;

/// Retry behaviour of a single completion client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Maximum number of retries after the first attempt.
    pub max_retries: u32,
    /// Base delay in milliseconds for exponential backoff.
    pub backoff_base_ms: u64,
    /// Maximum delay in milliseconds (cap for exponential backoff).
    pub backoff_max_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_base_ms: 500,
            backoff_max_ms: 30_000,
        }
    }
}

/// Determines whether an error is transient and worth retrying.
///
/// Only [`SwitchyardError::Http`] is considered. When the message carries a
/// status code, either after an `"... API error "` prefix or at its very
/// start, the code decides: 429, 401, 408 and 5xx retry, everything else
/// does not. The response body after the code is never inspected.
/// Messages without a code (transport failures) retry on timeouts and
/// connection errors.
pub fn is_retryable(err: &SwitchyardError) -> bool {
    let SwitchyardError::Http(msg) = err else {
        return false;
    };

    if let Some(status) = status_code(msg) {
        return matches!(status, 401 | 408 | 429 | 500..=599);
    }

    let lower = msg.to_lowercase();
    lower.contains("timeout")
        || lower.contains("timed out")
        || lower.contains("connection")
        || lower.contains("5xx")
}

/// Extract the HTTP status code the backends place in their error messages.
fn status_code(msg: &str) -> Option<u16> {
    let rest = match msg.split_once("API error ") {
        Some((_, rest)) => rest,
        None => msg,
    };
    let token: String = rest.chars().take_while(char::is_ascii_digit).collect();
    if token.len() != 3 {
        return None;
    }
    token.parse().ok().filter(|code| (100..=599).contains(code))
}

/// Computes the backoff delay for a given attempt using exponential backoff
/// capped at `backoff_max_ms`.
fn compute_backoff(policy: &RetryPolicy, attempt: u32) -> u64 {
    let delay = policy
        .backoff_base_ms
        .saturating_mul(2u64.saturating_pow(attempt));
    delay.min(policy.backoff_max_ms)
}

/// Wraps one backend and retries transient failures with exponential backoff.
///
/// This is the only place a completion call is retried; the router above it
/// moves straight to its fallback when the wrapped call finally fails.
pub struct RetryingBackend {
    inner: Arc<dyn LlmBackend>,
    policy: RetryPolicy,
    /// Injectable sleep function for testing (allows skipping real delays).
    #[cfg(test)]
    sleep_fn: Option<SleepFn>,
}

impl RetryingBackend {
    pub fn new(inner: Arc<dyn LlmBackend>, policy: RetryPolicy) -> Self {
        Self {
            inner,
            policy,
            #[cfg(test)]
            sleep_fn: None,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    async fn do_sleep(&self, ms: u64) {
        #[cfg(test)]
        if let Some(ref f) = self.sleep_fn {
            f(ms).await;
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(ms)).await;
    }

    /// Drive `op` through the retry policy.
    async fn with_retries<T, F, Fut>(&self, what: &'static str, op: F) -> SwitchyardResult<T>
    where
        F: Fn() -> Fut + Send + Sync,
        Fut: std::future::Future<Output = SwitchyardResult<T>> + Send,
        T: Send,
    {
        let mut attempt = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    if !is_retryable(&e) {
                        warn!(op = what, attempt, error = %e, "Non-retryable error");
                        return Err(e);
                    }
                    if attempt >= self.policy.max_retries {
                        warn!(op = what, attempt, error = %e, "Retries exhausted");
                        return Err(e);
                    }
                    let delay = compute_backoff(&self.policy, attempt);
                    info!(
                        op = what,
                        attempt,
                        delay_ms = delay,
                        error = %e,
                        "Retryable error, backing off"
                    );
                    self.do_sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

#[async_trait]
impl LlmBackend for RetryingBackend {
    async fn chat(&self, request: &CompletionRequest) -> SwitchyardResult<LlmResponse> {
        let inner = &self.inner;
        self.with_retries("chat", || inner.chat(request)).await
    }

    async fn embed(&self, text: &str) -> SwitchyardResult<Vec<f32>> {
        let inner = &self.inner;
        self.with_retries("embed", || inner.embed(text)).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// A mock backend that returns a sequence of results.
    struct MockBackend {
        results: tokio::sync::Mutex<Vec<SwitchyardResult<LlmResponse>>>,
        call_count: AtomicU32,
    }

    impl MockBackend {
        fn new(results: Vec<SwitchyardResult<LlmResponse>>) -> Arc<Self> {
            Arc::new(Self {
                results: tokio::sync::Mutex::new(results),
                call_count: AtomicU32::new(0),
            })
        }

        fn calls(&self) -> u32 {
            self.call_count.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LlmBackend for MockBackend {
        async fn chat(&self, _request: &CompletionRequest) -> SwitchyardResult<LlmResponse> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            let mut results = self.results.lock().await;
            if results.is_empty() {
                Err(SwitchyardError::Http("MockBackend: no more results".into()))
            } else {
                results.remove(0)
            }
        }
    }

    fn instant(inner: Arc<MockBackend>) -> RetryingBackend {
        RetryingBackend {
            inner,
            policy: RetryPolicy {
                max_retries: 3,
                backoff_base_ms: 0,
                backoff_max_ms: 0,
            },
            sleep_fn: Some(Box::new(|_| Box::pin(async {}))),
        }
    }

    #[tokio::test]
    async fn retry_succeeds_on_second_try() {
        let mock = MockBackend::new(vec![
            Err(SwitchyardError::Http("429 Too Many Requests".into())),
            Ok(LlmResponse::Done("ok".into())),
        ]);
        let backend = instant(mock.clone());

        let resp = backend.chat(&CompletionRequest::default()).await.unwrap();
        assert_eq!(resp, LlmResponse::Done("ok".into()));
        assert_eq!(mock.calls(), 2);
    }

    #[tokio::test]
    async fn retries_exhausted_returns_last_error() {
        let mock = MockBackend::new(vec![
            Err(SwitchyardError::Http("500 Internal Server Error".into())),
            Err(SwitchyardError::Http("502 Bad Gateway".into())),
            Err(SwitchyardError::Http("503 Service Unavailable".into())),
            Err(SwitchyardError::Http("504 Gateway Timeout".into())),
        ]);
        let backend = instant(mock.clone());

        let err = backend.chat(&CompletionRequest::default()).await.unwrap_err();
        assert!(err.to_string().contains("504"), "got: {err}");
        assert_eq!(mock.calls(), 4);
    }

    #[tokio::test]
    async fn non_retryable_returns_immediately() {
        let mock = MockBackend::new(vec![
            Err(SwitchyardError::Http("400 Bad Request".into())),
            Ok(LlmResponse::Done("should not reach".into())),
        ]);
        let backend = instant(mock.clone());

        assert!(backend.chat(&CompletionRequest::default()).await.is_err());
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test]
    async fn unsupported_embed_is_not_retried() {
        let mock = MockBackend::new(vec![]);
        let backend = instant(mock);
        let err = backend.embed("hello").await.unwrap_err();
        assert!(matches!(err, SwitchyardError::Unsupported(_)));
    }

    #[tokio::test]
    async fn backoff_delays_follow_policy() {
        let mock = MockBackend::new(vec![
            Err(SwitchyardError::Http("503".into())),
            Err(SwitchyardError::Http("503".into())),
            Ok(LlmResponse::Done("ok".into())),
        ]);
        let delays = Arc::new(std::sync::Mutex::new(Vec::new()));
        let recorded = delays.clone();
        let backend = RetryingBackend {
            inner: mock,
            policy: RetryPolicy {
                max_retries: 5,
                backoff_base_ms: 100,
                backoff_max_ms: 150,
            },
            sleep_fn: Some(Box::new(move |ms| {
                recorded.lock().unwrap().push(ms);
                Box::pin(async {})
            })),
        };

        backend.chat(&CompletionRequest::default()).await.unwrap();
        assert_eq!(*delays.lock().unwrap(), vec![100, 150]);
    }

    #[test]
    fn backoff_computation() {
        let policy = RetryPolicy {
            max_retries: 5,
            backoff_base_ms: 500,
            backoff_max_ms: 30_000,
        };

        assert_eq!(compute_backoff(&policy, 0), 500);
        assert_eq!(compute_backoff(&policy, 1), 1000);
        assert_eq!(compute_backoff(&policy, 2), 2000);
        assert_eq!(compute_backoff(&policy, 5), 16000);
        assert_eq!(compute_backoff(&policy, 6), 30_000); // capped at max
        assert_eq!(compute_backoff(&policy, 64), 30_000);
    }

    #[test]
    fn is_retryable_classification() {
        assert!(is_retryable(&SwitchyardError::Http("429 Too Many Requests".into())));
        assert!(is_retryable(&SwitchyardError::Http("401 Unauthorized".into())));
        assert!(is_retryable(&SwitchyardError::Http("timeout waiting for response".into())));
        assert!(is_retryable(&SwitchyardError::Http("502 Bad Gateway".into())));
        assert!(is_retryable(&SwitchyardError::Http("5xx class error".into())));

        assert!(!is_retryable(&SwitchyardError::Http("400 Bad Request".into())));
        assert!(!is_retryable(&SwitchyardError::Unsupported("embeddings".into())));
    }

    #[test]
    fn is_retryable_reads_status_not_body() {
        let busy = SwitchyardError::Http(
            "OpenAI API error 503 Service Unavailable: upstream rejected 400 requests".into(),
        );
        assert!(is_retryable(&busy));

        let bad = SwitchyardError::Http(
            "Claude API error 400 Bad Request: try again after 503 clears".into(),
        );
        assert!(!is_retryable(&bad));

        let not_found = SwitchyardError::Http("Embedding API error 404 Not Found: timeout".into());
        assert!(!is_retryable(&not_found));

        let transport = SwitchyardError::Http(
            "error sending request for url (http://127.0.0.1:40001/v1/messages): operation timed out"
                .into(),
        );
        assert!(is_retryable(&transport));
    }
}
