use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use url::Url;

use super::headers::HeaderSet;
use super::token::TokenStore;
use super::{ApiClientError, TallyClient};

/// Default per-request timeout. Every call is bounded so a stalled peer
/// cannot block the caller indefinitely.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Currency recorded on bookings when none is configured.
const DEFAULT_CURRENCY: &str = "points";

/// Builder for [`TallyClient`] instances.
///
/// # Defaults
///
/// - request timeout: 30 seconds
/// - TLS certificate/host verification: **on** (see
///   [`danger_accept_invalid_certs`](Self::danger_accept_invalid_certs))
/// - user agent: `tally-client/<crate version>`
/// - booking currency: `points`
///
/// # Example
///
/// ```rust,no_run
/// use std::time::Duration;
/// use tally_client::TallyClient;
///
/// # fn example() -> Result<(), tally_client::ApiClientError> {
/// let client = TallyClient::builder("https://api.example.com")
///     .with_timeout(Duration::from_secs(10))
///     .with_currency("coins")
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TallyClientBuilder {
    base_url: String,
    timeout: Duration,
    accept_invalid_certs: bool,
    user_agent: String,
    currency: String,
}

impl TallyClientBuilder {
    pub(crate) fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
            accept_invalid_certs: false,
            user_agent: format!("tally-client/{}", env!("CARGO_PKG_VERSION")),
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the `User-Agent` sent with every request.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Sets the currency recorded on bookings.
    #[must_use]
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    /// Disables TLS certificate and hostname verification.
    ///
    /// Off by default. Only intended for talking to development servers
    /// with self-signed certificates; never enable this against
    /// production hosts.
    #[must_use]
    pub fn danger_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// Fails when the base URL does not parse or the underlying reqwest
    /// client cannot be constructed.
    pub fn build(self) -> Result<TallyClient, ApiClientError> {
        let Self {
            base_url,
            timeout,
            accept_invalid_certs,
            user_agent,
            currency,
        } = self;

        let base_url = Url::parse(&base_url)?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .danger_accept_invalid_certs(accept_invalid_certs)
            .build()?;

        Ok(TallyClient {
            http,
            base_url,
            currency,
            headers: Arc::new(RwLock::new(HeaderSet::default())),
            tokens: TokenStore::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_build_with_defaults() {
        let builder = TallyClientBuilder::new("https://api.example.com");
        assert_eq!(builder.timeout, DEFAULT_TIMEOUT);
        assert!(!builder.accept_invalid_certs);
        assert_eq!(builder.currency, "points");

        let client = builder.build().expect("buildable client");
        assert_eq!(client.base_url.as_str(), "https://api.example.com/");
    }

    #[test]
    fn should_reject_invalid_base_url() {
        let result = TallyClient::builder("not a url").build();
        assert!(matches!(result, Err(ApiClientError::UrlError(_))));
    }

    #[test]
    fn should_apply_custom_settings() {
        let builder = TallyClient::builder("https://api.example.com")
            .with_timeout(Duration::from_secs(5))
            .with_user_agent("custom/1.0")
            .with_currency("coins")
            .danger_accept_invalid_certs(true);

        assert_eq!(builder.timeout, Duration::from_secs(5));
        assert_eq!(builder.user_agent, "custom/1.0");
        assert_eq!(builder.currency, "coins");
        assert!(builder.accept_invalid_certs);
    }
}
