use std::sync::Arc;

use http::{HeaderValue, Method, StatusCode};
use http::header::{HeaderMap, HeaderName};
use tokio::sync::RwLock;
use tracing::{debug, warn};
use url::Url;

mod builder;
pub use self::builder::TallyClientBuilder;

mod auth;
pub use self::auth::{Credentials, GrantType, SecureString};

mod token;
pub use self::token::BearerToken;
use self::token::TokenStore;

mod headers;
use self::headers::HeaderSet;

mod flat_json;

mod endpoints;

mod error;
pub use self::error::ApiClientError;

/// Stateful authenticated REST client for the Tally platform.
///
/// One client owns one underlying [`reqwest::Client`], a mutable header
/// set, and the bearer token slot. Clones share all three, and every
/// state mutation (`authenticate`, `set_access_token`, `set_header`,
/// `reset_header`) is serialized against request construction behind
/// async locks, so a clone per task is safe.
///
/// # Example
///
/// ```rust,no_run
/// use tally_client::{Credentials, TallyClient};
///
/// # async fn example() -> Result<(), tally_client::ApiClientError> {
/// let client = TallyClient::builder("https://api.example.com").build()?;
///
/// let credentials = Credentials::password("client-id", "client-secret", "user@example.com", "pw");
/// client.authenticate(&credentials).await?;
///
/// let response = client.get_user("42").await?;
/// println!("{}", response.body());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TallyClient {
    http: reqwest::Client,
    base_url: Url,
    currency: String,
    headers: Arc<RwLock<HeaderSet>>,
    tokens: TokenStore,
}

/// Outcome of a resource call whose transport leg succeeded.
///
/// HTTP-level failures (4xx/5xx) still produce an `ApiResponse`; only
/// transport failures surface as [`ApiClientError`]. Interpreting the
/// status and parsing the body is the caller's job.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: StatusCode,
    body: String,
}

impl ApiResponse {
    /// HTTP status code of the response.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Response body as an opaque string.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Consumes the response, returning the body.
    pub fn into_body(self) -> String {
        self.body
    }
}

impl TallyClient {
    /// Starts building a client for the given base URL.
    pub fn builder(base_url: impl Into<String>) -> TallyClientBuilder {
        TallyClientBuilder::new(base_url)
    }

    /// Replaces the entire header set with exactly one header.
    ///
    /// # Errors
    ///
    /// Fails when the name or value is not a valid HTTP header.
    pub async fn set_header(&self, name: &str, value: &str) -> Result<(), ApiClientError> {
        let name = HeaderName::from_bytes(name.as_bytes())?;
        let value = HeaderValue::from_str(value)?;
        debug!(header = %name, "replacing header set");
        self.headers.write().await.set(name, value);
        Ok(())
    }

    /// Restores the canonical default header set:
    /// `Content-Type: application/json`.
    pub async fn reset_header(&self) {
        debug!("resetting header set to application/json");
        self.headers.write().await.reset();
    }

    /// Issues an authenticated GET against `base + path`.
    ///
    /// # Errors
    ///
    /// Fails with [`ApiClientError::NotAuthenticated`] before any token
    /// is stored, or with a transport/decode error.
    pub async fn get(&self, path: &str) -> Result<ApiResponse, ApiClientError> {
        self.request(Method::GET, path, None).await
    }

    /// Issues an authenticated POST with a caller-supplied body.
    ///
    /// The body's content type comes from the current header set, which
    /// defaults to JSON.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`get`](Self::get).
    pub async fn post(&self, path: &str, body: String) -> Result<ApiResponse, ApiClientError> {
        self.request(Method::POST, path, Some(body)).await
    }

    /// Issues an authenticated DELETE with an empty body.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`get`](Self::get).
    pub async fn delete(&self, path: &str) -> Result<ApiResponse, ApiClientError> {
        self.request(Method::DELETE, path, None).await
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<String>,
    ) -> Result<ApiResponse, ApiClientError> {
        let Some(token) = self.tokens.get().await else {
            return Err(ApiClientError::NotAuthenticated);
        };
        let url = join_url(token.base_url(), path)?;

        let mut headers = HeaderMap::new();
        self.headers.read().await.apply(&mut headers);

        let mut request = self
            .http
            .request(method.clone(), url.clone())
            .headers(headers)
            .bearer_auth(token.access_token());
        if let Some(body) = body {
            request = request.body(body);
        }

        debug!(%method, %url, "sending request");
        let response = request.send().await?;
        let status = response.status();
        let body = accumulate_body(response).await?;
        debug!(%status, bytes = body.len(), "response received");

        Ok(ApiResponse { status, body })
    }
}

/// Joins a base URL and a request path, tolerating stray slashes on
/// either side.
fn join_url(base: &Url, path: &str) -> Result<Url, ApiClientError> {
    let raw = format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    Ok(raw.parse::<Url>()?)
}

/// Accumulates the response body from the byte stream into one buffer.
///
/// A zero-length chunk is logged and skipped rather than failing the
/// call; a body that is not UTF-8 is a decode error.
async fn accumulate_body(mut response: reqwest::Response) -> Result<String, ApiClientError> {
    let mut buffer = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        if chunk.is_empty() {
            warn!("response stream produced an empty chunk");
            continue;
        }
        buffer.extend_from_slice(&chunk);
    }
    Ok(String::from_utf8(buffer)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base(raw: &str) -> Url {
        Url::parse(raw).expect("valid url")
    }

    #[test]
    fn should_join_base_and_path() {
        let url = join_url(&base("https://api.example.com"), "/2/users/42").expect("joinable");
        assert_eq!(url.as_str(), "https://api.example.com/2/users/42");
    }

    #[test]
    fn should_tolerate_slash_mismatches() {
        let url = join_url(&base("https://api.example.com/"), "2/users").expect("joinable");
        assert_eq!(url.as_str(), "https://api.example.com/2/users");

        let url = join_url(&base("https://api.example.com/v1/"), "/2/users").expect("joinable");
        assert_eq!(url.as_str(), "https://api.example.com/v1/2/users");
    }

    #[test]
    fn should_keep_query_strings_intact() {
        let url = join_url(
            &base("https://api.example.com"),
            "/2/catalog/messages?keys=welcome",
        )
        .expect("joinable");
        assert_eq!(url.query(), Some("keys=welcome"));
    }

    #[tokio::test]
    async fn should_fail_resource_calls_before_authentication() {
        let client = TallyClient::builder("https://api.example.invalid")
            .build()
            .expect("buildable client");

        let error = client.get("/2/users/42").await.expect_err("no token yet");
        assert!(matches!(error, ApiClientError::NotAuthenticated));
    }
}
