//! Client layer: posts panel actions, retries transient failures and maps transport ↔ domain.

mod retry;
#[cfg(test)]
pub(crate) mod testing;

use std::error::Error as StdError;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use crate::config::Settings;
use crate::domain::{
    Action, AddOrder, ApiKey, BalanceResponse, CancelItem, OrderId, OrderReply, OrderResponse,
    Orders, RefillResponse, Service, StatusResponse, ValidationError,
};
use crate::transport::TransportError;

pub use retry::RetryPolicy;

/// Default panel endpoint used when none is configured.
pub const DEFAULT_ENDPOINT: &str = "https://smmkings.com/api/v2";

const DEFAULT_USER_AGENT: &str = concat!("smm-panel/", env!("CARGO_PKG_VERSION"));

/// Dry-run order ids are `unix_seconds % DRY_RUN_ORDER_MODULUS`; they are not unique.
const DRY_RUN_ORDER_MODULUS: u64 = 10_000_000;

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, Clone)]
struct HttpResponse {
    status: u16,
    body: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Class of a failed HTTP exchange that produced no response.
pub enum FailureKind {
    Timeout,
    Connect,
    Other,
}

impl FailureKind {
    pub fn is_transient(self) -> bool {
        matches!(self, Self::Timeout | Self::Connect)
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Timeout => "timeout",
            Self::Connect => "connect",
            Self::Other => "other",
        })
    }
}

#[derive(Debug)]
struct TransportFailure {
    kind: FailureKind,
    source: Box<dyn StdError + Send + Sync>,
}

impl From<reqwest::Error> for TransportFailure {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            FailureKind::Timeout
        } else if err.is_connect()
            || (err.is_request() && err.status().is_none())
            || dropped_connection(&err)
        {
            FailureKind::Connect
        } else {
            FailureKind::Other
        };
        Self {
            kind,
            source: Box::new(err),
        }
    }
}

/// A pooled connection closed or reset by the peer after it was established.
fn dropped_connection(err: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(err) = current {
        if let Some(io) = err.downcast_ref::<std::io::Error>() {
            if matches!(
                io.kind(),
                std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::BrokenPipe
                    | std::io::ErrorKind::UnexpectedEof
            ) {
                return true;
            }
        }
        current = err.source();
    }
    false
}

trait HttpTransport: Send + Sync {
    fn post_form<'a>(
        &'a self,
        url: &'a str,
        params: Vec<(String, String)>,
    ) -> BoxFuture<'a, Result<HttpResponse, TransportFailure>>;
}

#[derive(Debug, Clone)]
struct ReqwestTransport {
    client: reqwest::Client,
}

impl HttpTransport for ReqwestTransport {
    fn post_form<'a>(
        &'a self,
        url: &'a str,
        params: Vec<(String, String)>,
    ) -> BoxFuture<'a, Result<HttpResponse, TransportFailure>> {
        Box::pin(async move {
            let response = self.client.post(url).form(&params).send().await?;
            let status = response.status().as_u16();
            let body = response.text().await?;
            Ok(HttpResponse { status, body })
        })
    }
}

trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration) -> BoxFuture<'_, ()>;
}

#[derive(Debug, Clone, Copy)]
struct TokioSleeper;

impl Sleeper for TokioSleeper {
    fn sleep(&self, duration: Duration) -> BoxFuture<'_, ()> {
        Box::pin(tokio::time::sleep(duration))
    }
}

#[derive(Debug, thiserror::Error)]
/// Errors returned by [`SmmClient`].
///
/// Transport failures and HTTP statuses are kept apart from panel-signalled errors
/// and from responses that do not match the expected shape.
pub enum SmmError {
    /// The HTTP exchange failed without a response (DNS, TLS, timeouts, etc).
    #[error("transport error ({kind}): {source}")]
    Transport {
        kind: FailureKind,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    /// Non-successful HTTP status code returned by the server.
    #[error("unexpected HTTP status: {status}")]
    HttpStatus { status: u16, body: Option<String> },

    /// The panel answered with a top-level `error` message.
    #[error("panel error: {message}")]
    Api { message: String },

    /// Response body could not be parsed as the expected shape.
    #[error("parse error: {0}")]
    Parse(#[source] Box<dyn StdError + Send + Sync>),

    /// One of the domain constructors rejected an invalid value.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A network action was attempted without an API key.
    #[error("no API key configured (set SMM_API_KEY)")]
    MissingApiKey,

    /// The configured endpoint is not a valid URL.
    #[error("invalid endpoint {endpoint}: {source}")]
    InvalidEndpoint {
        endpoint: String,
        #[source]
        source: url::ParseError,
    },
}

impl SmmError {
    /// Whether the failure is eligible for retry: timeouts, connection errors and HTTP 5xx.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport { kind, .. } => kind.is_transient(),
            Self::HttpStatus { status, .. } => (500..=599).contains(status),
            _ => false,
        }
    }
}

fn decode_error(err: TransportError) -> SmmError {
    match err {
        TransportError::Panel { message } => SmmError::Api { message },
        other => SmmError::Parse(Box::new(other)),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Raw reply to a panel action.
pub struct ActionReply {
    /// Response body as returned by the panel.
    pub body: String,
    /// Wall-clock time of the successful HTTP attempt. Advisory only.
    pub elapsed: Duration,
}

impl ActionReply {
    /// Parse the body as loosely typed JSON.
    pub fn json(&self) -> Result<serde_json::Value, SmmError> {
        serde_json::from_str(&self.body).map_err(|err| SmmError::Parse(Box::new(err)))
    }
}

#[derive(Debug, Clone)]
/// Builder for [`SmmClient`].
pub struct SmmClientBuilder {
    api_key: Option<ApiKey>,
    endpoint: String,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    dry_run: bool,
    retry: RetryPolicy,
}

impl Default for SmmClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SmmClientBuilder {
    /// Create a builder with the default endpoint, no API key and the default retry policy.
    pub fn new() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            timeout: None,
            user_agent: None,
            dry_run: false,
            retry: RetryPolicy::default(),
        }
    }

    pub fn api_key(mut self, api_key: ApiKey) -> Self {
        self.api_key = Some(api_key);
        self
    }

    /// Override the panel endpoint URL.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set an HTTP client timeout applied to each request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the HTTP `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Simulate order placement locally instead of calling `add`.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Build a [`SmmClient`].
    pub fn build(self) -> Result<SmmClient, SmmError> {
        url::Url::parse(&self.endpoint).map_err(|source| SmmError::InvalidEndpoint {
            endpoint: self.endpoint.clone(),
            source,
        })?;

        let mut builder = reqwest::Client::builder()
            .user_agent(self.user_agent.unwrap_or_else(|| DEFAULT_USER_AGENT.to_owned()));
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().map_err(|err| SmmError::Transport {
            kind: FailureKind::Other,
            source: Box::new(err),
        })?;

        Ok(SmmClient {
            api_key: self.api_key,
            endpoint: self.endpoint,
            dry_run: self.dry_run,
            retry: self.retry,
            http: Arc::new(ReqwestTransport { client }),
            sleeper: Arc::new(TokioSleeper),
        })
    }
}

#[derive(Clone)]
/// High-level panel client.
///
/// Every action is a form-encoded POST to a single endpoint carrying `key` and
/// `action`. Transient failures are retried according to the [`RetryPolicy`];
/// everything else is returned to the caller immediately.
pub struct SmmClient {
    api_key: Option<ApiKey>,
    endpoint: String,
    dry_run: bool,
    retry: RetryPolicy,
    http: Arc<dyn HttpTransport>,
    sleeper: Arc<dyn Sleeper>,
}

impl SmmClient {
    /// Create a client using the default endpoint.
    ///
    /// For more customization, use [`SmmClient::builder`].
    pub fn new(api_key: ApiKey) -> Self {
        Self {
            api_key: Some(api_key),
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            dry_run: false,
            retry: RetryPolicy::default(),
            http: Arc::new(ReqwestTransport {
                client: reqwest::Client::new(),
            }),
            sleeper: Arc::new(TokioSleeper),
        }
    }

    /// Start building a client with custom settings.
    pub fn builder() -> SmmClientBuilder {
        SmmClientBuilder::new()
    }

    /// Build a client from process settings.
    pub fn from_settings(settings: &Settings) -> Result<Self, SmmError> {
        let mut builder = SmmClientBuilder::new()
            .endpoint(settings.api_url.clone())
            .timeout(settings.timeout)
            .dry_run(settings.dry_run)
            .retry_policy(settings.retry);
        if let Some(api_key) = settings.api_key.clone() {
            builder = builder.api_key(api_key);
        }
        builder.build()
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Post one panel action and return the raw body.
    ///
    /// `key` and `action` are injected ahead of `params`. Timeouts, connection
    /// errors and HTTP 5xx are retried; after the last attempt the last error is
    /// returned.
    pub async fn call_action(
        &self,
        action: Action,
        params: Vec<(String, String)>,
    ) -> Result<ActionReply, SmmError> {
        let api_key = self.api_key.as_ref().ok_or(SmmError::MissingApiKey)?;

        let mut form = Vec::with_capacity(params.len() + 2);
        form.push((ApiKey::FIELD.to_owned(), api_key.as_str().to_owned()));
        form.push((Action::FIELD.to_owned(), action.as_str().to_owned()));
        form.extend(params);

        let attempts = self.retry.attempts();
        let mut attempt = 0;
        loop {
            match self.post_once(action, form.clone()).await {
                Ok(reply) => return Ok(reply),
                Err(err) if err.is_transient() && attempt + 1 < attempts => {
                    let delay = self.retry.delay_for(attempt);
                    tracing::warn!(
                        %action,
                        attempt = attempt + 1,
                        attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "transient failure, retrying"
                    );
                    self.sleeper.sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn post_once(
        &self,
        action: Action,
        form: Vec<(String, String)>,
    ) -> Result<ActionReply, SmmError> {
        let started = Instant::now();
        let response = self
            .http
            .post_form(&self.endpoint, form)
            .await
            .map_err(|failure| SmmError::Transport {
                kind: failure.kind,
                source: failure.source,
            })?;
        let elapsed = started.elapsed();

        if !(200..=299).contains(&response.status) {
            let body = if response.body.trim().is_empty() {
                None
            } else {
                Some(response.body)
            };
            return Err(SmmError::HttpStatus {
                status: response.status,
                body,
            });
        }

        tracing::debug!(
            %action,
            status = response.status,
            elapsed_ms = elapsed.as_millis() as u64,
            "panel action completed"
        );
        Ok(ActionReply {
            body: response.body,
            elapsed,
        })
    }

    pub(crate) async fn pause(&self, duration: Duration) {
        self.sleeper.sleep(duration).await;
    }

    /// List the services offered by the panel.
    pub async fn services(&self) -> Result<Vec<Service>, SmmError> {
        let reply = self
            .call_action(Action::Services, crate::transport::encode_services_form())
            .await?;
        crate::transport::decode_services_json_response(&reply.body).map_err(decode_error)
    }

    /// Place an order.
    ///
    /// In dry-run mode nothing is sent: a local id derived from the current time is
    /// returned with [`OrderResponse::simulated`] set. Such ids are not unique.
    pub async fn add_order(&self, request: AddOrder) -> Result<OrderResponse, SmmError> {
        if self.dry_run {
            return Ok(simulate_order(&request));
        }

        let reply = self
            .call_action(Action::Add, crate::transport::encode_add_order_form(&request))
            .await?;
        crate::transport::decode_add_order_json_response(&reply.body).map_err(decode_error)
    }

    /// Fetch the status of one order or a batch of orders.
    ///
    /// An `error` reported for an order is data, not a failure.
    pub async fn status(&self, request: Orders) -> Result<OrderReply<StatusResponse>, SmmError> {
        let reply = self
            .call_action(Action::Status, crate::transport::encode_status_form(&request))
            .await?;
        let decoded = match &request {
            Orders::One(_) => crate::transport::decode_status_json_response(&reply.body)
                .map(OrderReply::Single),
            Orders::Many(orders) => {
                crate::transport::decode_status_batch_json_response(orders, &reply.body)
                    .map(OrderReply::Batch)
            }
        };
        decoded.map_err(decode_error)
    }

    /// Fetch the status of a single order.
    pub async fn order_status(&self, order: OrderId) -> Result<StatusResponse, SmmError> {
        let reply = self
            .call_action(
                Action::Status,
                crate::transport::encode_status_form(&Orders::one(order)),
            )
            .await?;
        crate::transport::decode_status_json_response(&reply.body).map_err(decode_error)
    }

    /// Request a refill for one order or a batch of orders.
    pub async fn refill(&self, request: Orders) -> Result<OrderReply<RefillResponse>, SmmError> {
        let reply = self
            .call_action(Action::Refill, crate::transport::encode_refill_form(&request))
            .await?;
        crate::transport::decode_refill_json_response(&request, &reply.body).map_err(decode_error)
    }

    /// Fetch the account balance.
    pub async fn balance(&self) -> Result<BalanceResponse, SmmError> {
        let reply = self
            .call_action(Action::Balance, crate::transport::encode_balance_form())
            .await?;
        crate::transport::decode_balance_json_response(&reply.body).map_err(decode_error)
    }

    /// Request cancellation of one or more orders. Results are keyed by order id.
    pub async fn cancel(
        &self,
        request: Orders,
    ) -> Result<std::collections::BTreeMap<OrderId, CancelItem>, SmmError> {
        let reply = self
            .call_action(Action::Cancel, crate::transport::encode_cancel_form(&request))
            .await?;
        crate::transport::decode_cancel_json_response(&reply.body).map_err(decode_error)
    }
}

fn simulate_order(request: &AddOrder) -> OrderResponse {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default();
    let order = OrderId::new(now % DRY_RUN_ORDER_MODULUS);
    tracing::info!(
        service = %request.service(),
        link = request.link().as_str(),
        quantity = ?request.quantity(),
        %order,
        "dry run: synthesized order id, nothing sent to the panel"
    );
    OrderResponse {
        order,
        simulated: true,
    }
}
