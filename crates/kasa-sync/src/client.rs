//! # Sync Client
//!
//! Pushes committed sales to the remote ledger. This crate never touches
//! local state: it takes a payload, makes a bounded number of attempts,
//! and reports what happened. Deciding what a failure means for the
//! stored record is the engine's job.

use std::future::Future;
use std::sync::Arc;

use tracing::{debug, warn};
use url::Url;

use crate::auth::TokenProvider;
use crate::config::SyncConfig;
use crate::error::{FailureKind, SyncError, SyncResult};
use crate::payload::{ApiErrorBody, SaleRequest, SaleResponse};
use crate::retry::RetryPolicy;

// =============================================================================
// Endpoint Abstraction
// =============================================================================

/// A remote endpoint that accepts sale submissions.
///
/// The HTTP implementation is [`HttpSaleEndpoint`]; tests substitute
/// scripted fakes.
pub trait SaleEndpoint: Send + Sync {
    fn submit(
        &self,
        request: &SaleRequest,
        token: &str,
    ) -> impl Future<Output = SyncResult<SaleResponse>> + Send;
}

/// Shared endpoints delegate to the inner implementation, so tests and
/// callers can hand out `Arc`-wrapped endpoints freely.
impl<E: SaleEndpoint> SaleEndpoint for Arc<E> {
    async fn submit(&self, request: &SaleRequest, token: &str) -> SyncResult<SaleResponse> {
        (**self).submit(request, token).await
    }
}

// =============================================================================
// HTTP Endpoint
// =============================================================================

/// JSON-over-HTTPS sale endpoint.
#[derive(Debug, Clone)]
pub struct HttpSaleEndpoint {
    client: reqwest::Client,
    sale_url: Url,
}

impl HttpSaleEndpoint {
    pub fn new(config: &SyncConfig) -> SyncResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| SyncError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            sale_url: config.sale_url()?,
        })
    }
}

impl SaleEndpoint for HttpSaleEndpoint {
    async fn submit(&self, request: &SaleRequest, token: &str) -> SyncResult<SaleResponse> {
        let response = self
            .client
            .post(self.sale_url.clone())
            .bearer_auth(token)
            // The invoice number makes replays safe: the server treats a
            // repeated key as the same sale.
            .header("Idempotency-Key", &request.invoice_number)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            response
                .json::<SaleResponse>()
                .await
                .map_err(|e| SyncError::InvalidResponse(e.to_string()))
        } else {
            let raw = response.text().await.unwrap_or_default();
            let body = serde_json::from_str::<ApiErrorBody>(&raw)
                .ok()
                .filter(|b| !b.message.is_empty())
                .map(|b| b.message)
                .unwrap_or(raw);
            Err(SyncError::Http {
                status: status.as_u16(),
                body,
            })
        }
    }
}

// =============================================================================
// Push Outcome
// =============================================================================

/// Result of one call to [`SyncClient::push`].
#[derive(Debug, Clone)]
pub enum PushOutcome {
    /// The remote ledger accepted the sale.
    Accepted {
        remote_id: String,
        invoice_url: Option<String>,
    },
    /// The attempt budget is spent or the failure was terminal.
    Failed(SyncFailure),
}

/// Details of a failed push.
#[derive(Debug, Clone)]
pub struct SyncFailure {
    pub kind: FailureKind,
    /// Requests actually made before giving up.
    pub attempts: u32,
    pub message: String,
}

// =============================================================================
// Sync Client
// =============================================================================

/// Drives one sale push through the retry policy.
#[derive(Clone)]
pub struct SyncClient<E> {
    endpoint: E,
    tokens: Arc<dyn TokenProvider>,
    policy: RetryPolicy,
}

impl<E: SaleEndpoint> SyncClient<E> {
    pub fn new(endpoint: E, tokens: Arc<dyn TokenProvider>, policy: RetryPolicy) -> Self {
        Self {
            endpoint,
            tokens,
            policy,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Push one sale.
    ///
    /// Retries only retryable failures, up to the policy's attempt
    /// budget. Terminal and auth failures stop immediately. Never
    /// returns an `Err`: every outcome, including total failure, is a
    /// [`PushOutcome`] for the caller to record.
    pub async fn push(&self, request: &SaleRequest) -> PushOutcome {
        let mut attempts = 0u32;
        loop {
            attempts += 1;
            // Token is fetched per attempt so a refresh between retries
            // takes effect.
            let token = self.tokens.token();
            match self.endpoint.submit(request, &token).await {
                Ok(response) => {
                    debug!(
                        invoice_number = %request.invoice_number,
                        remote_id = %response.id,
                        attempts,
                        "sale accepted"
                    );
                    return PushOutcome::Accepted {
                        remote_id: response.id,
                        invoice_url: response.invoice_url,
                    };
                }
                Err(err) => {
                    let kind = err.classify();
                    let budget_left = attempts < self.policy.max_attempts;
                    if kind != FailureKind::Retryable || !budget_left {
                        warn!(
                            invoice_number = %request.invoice_number,
                            attempts,
                            kind = ?kind,
                            error = %err,
                            "sale push failed"
                        );
                        return PushOutcome::Failed(SyncFailure {
                            kind,
                            attempts,
                            message: err.to_string(),
                        });
                    }
                    let delay = self.policy.delay_for(attempts + 1);
                    debug!(
                        invoice_number = %request.invoice_number,
                        attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "retrying sale push"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticTokenProvider;
    use crate::retry::Backoff;
    use chrono::Utc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    fn request() -> SaleRequest {
        SaleRequest {
            location_id: "loc-1".into(),
            contact_id: "cust-1".into(),
            transaction_date: Utc::now(),
            invoice_number: "INV-20260829-TEST0001".into(),
            subtotal: "30.00".into(),
            discount: "0.00".into(),
            shipping: "0.00".into(),
            order_tax: "0.00".into(),
            total: "30.00".into(),
            lines: vec![],
            payments: vec![],
        }
    }

    /// Pops a scripted result per call, counts calls.
    struct ScriptedEndpoint {
        script: Mutex<Vec<SyncResult<SaleResponse>>>,
        calls: AtomicU32,
    }

    impl ScriptedEndpoint {
        fn new(mut script: Vec<SyncResult<SaleResponse>>) -> Self {
            script.reverse();
            Self {
                script: Mutex::new(script),
                calls: AtomicU32::new(0),
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl SaleEndpoint for ScriptedEndpoint {
        async fn submit(&self, _request: &SaleRequest, _token: &str) -> SyncResult<SaleResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.script
                .lock()
                .unwrap()
                .pop()
                .expect("script exhausted")
        }
    }

    fn accepted(id: &str) -> SyncResult<SaleResponse> {
        Ok(SaleResponse {
            id: id.into(),
            invoice_url: None,
        })
    }

    fn http(status: u16) -> SyncResult<SaleResponse> {
        Err(SyncError::Http {
            status,
            body: "server error".to_string(),
        })
    }

    fn client(endpoint: Arc<ScriptedEndpoint>, policy: RetryPolicy) -> SyncClient<Arc<ScriptedEndpoint>> {
        SyncClient::new(endpoint, Arc::new(StaticTokenProvider::new("tok")), policy)
    }

    #[tokio::test]
    async fn test_first_attempt_success() {
        let endpoint = Arc::new(ScriptedEndpoint::new(vec![accepted("remote-1")]));
        let client = client(endpoint.clone(), RetryPolicy::default());

        match client.push(&request()).await {
            PushOutcome::Accepted { remote_id, .. } => assert_eq!(remote_id, "remote-1"),
            other => panic!("expected acceptance, got {other:?}"),
        }
        assert_eq!(endpoint.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retryable_failure_exhausts_budget() {
        let endpoint = Arc::new(ScriptedEndpoint::new(vec![http(500), http(502), http(503)]));
        let client = client(endpoint.clone(), RetryPolicy::default());

        match client.push(&request()).await {
            PushOutcome::Failed(failure) => {
                assert_eq!(failure.kind, FailureKind::Retryable);
                assert_eq!(failure.attempts, 3);
                assert!(failure.message.contains("503"));
            }
            other => panic!("expected failure, got {other:?}"),
        }
        assert_eq!(endpoint.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_mid_budget() {
        let endpoint = Arc::new(ScriptedEndpoint::new(vec![
            Err(SyncError::Transport("connection refused".into())),
            http(500),
            accepted("remote-9"),
        ]));
        let client = client(endpoint.clone(), RetryPolicy::default());

        match client.push(&request()).await {
            PushOutcome::Accepted { remote_id, .. } => assert_eq!(remote_id, "remote-9"),
            other => panic!("expected acceptance, got {other:?}"),
        }
        assert_eq!(endpoint.calls(), 3);
    }

    #[tokio::test]
    async fn test_auth_failure_stops_immediately() {
        let endpoint = Arc::new(ScriptedEndpoint::new(vec![http(401)]));
        let client = client(endpoint.clone(), RetryPolicy::default());

        match client.push(&request()).await {
            PushOutcome::Failed(failure) => {
                assert_eq!(failure.kind, FailureKind::AuthRequired);
                assert_eq!(failure.attempts, 1);
            }
            other => panic!("expected failure, got {other:?}"),
        }
        assert_eq!(endpoint.calls(), 1);
    }

    #[tokio::test]
    async fn test_terminal_failure_stops_immediately() {
        let endpoint = Arc::new(ScriptedEndpoint::new(vec![http(422)]));
        let client = client(endpoint.clone(), RetryPolicy::default());

        match client.push(&request()).await {
            PushOutcome::Failed(failure) => {
                assert_eq!(failure.kind, FailureKind::Terminal);
                assert_eq!(failure.attempts, 1);
            }
            other => panic!("expected failure, got {other:?}"),
        }
        assert_eq!(endpoint.calls(), 1);
    }

    #[tokio::test]
    async fn test_no_retry_policy_makes_one_request() {
        let endpoint = Arc::new(ScriptedEndpoint::new(vec![http(500)]));
        let client = client(endpoint.clone(), RetryPolicy::no_retry());

        match client.push(&request()).await {
            PushOutcome::Failed(failure) => assert_eq!(failure.attempts, 1),
            other => panic!("expected failure, got {other:?}"),
        }
        assert_eq!(endpoint.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_linear_policy_waits_between_attempts() {
        let endpoint = Arc::new(ScriptedEndpoint::new(vec![http(500), accepted("r")]));
        let policy = RetryPolicy::new(3, Duration::from_secs(2), Backoff::Linear);
        let client = client(endpoint.clone(), policy);

        let start = tokio::time::Instant::now();
        client.push(&request()).await;
        assert_eq!(start.elapsed(), Duration::from_secs(2));
        assert_eq!(endpoint.calls(), 2);
    }
}
