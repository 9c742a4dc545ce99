//! # tally-client
//!
//! Async REST client for the Tally rewards platform.
//!
//! The client negotiates an OAuth2 bearer token against the platform's
//! `/oauth/token` endpoint (password or client-credentials grant), then
//! threads that token, a mutable header set, and the base URL into every
//! resource call. Resource responses come back as opaque strings for the
//! caller to interpret; the only response parsing done here is the
//! minimal flat key/value extraction needed to pull `access_token` out
//! of the token endpoint's reply.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use tally_client::{Credentials, TallyClient};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), tally_client::ApiClientError> {
//! let client = TallyClient::builder("https://api.example.com").build()?;
//!
//! // Password grant; use Credentials::client_credentials for M2M.
//! let credentials = Credentials::password(
//!     "client-id",
//!     "client-secret",
//!     "user@example.com",
//!     "user-password",
//! );
//! client.authenticate(&credentials).await?;
//!
//! // Named operations wrap get/post/delete with path and body binding.
//! let user = client.get_user("42").await?;
//! println!("{}", user.body());
//!
//! client.post_booking("42", 50, "Welcome bonus").await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Error handling
//!
//! All operations return [`ApiClientError`], which keeps configuration
//! errors (raised before any network call), transport failures, and
//! protocol failures (host reached, expected field absent) distinct.
//! Nothing is retried internally.
//!
//! ## Concurrency
//!
//! [`TallyClient`] is cheap to clone; clones share the token slot and
//! header set behind async locks. All calls are bounded by the
//! configured request timeout.

mod client;

pub use self::client::{
    ApiClientError, ApiResponse, BearerToken, Credentials, GrantType, SecureString, TallyClient,
    TallyClientBuilder,
};
