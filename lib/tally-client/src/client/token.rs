//! Bearer token storage shared across clones of the client.

use std::fmt;
use std::sync::Arc;

use tokio::sync::RwLock;
use url::Url;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// An opaque bearer token together with the base URL it is valid against.
///
/// No expiry is tracked: the token endpoint here reports lifetimes, but
/// invalidation is the caller's responsibility (re-authenticate on 401).
/// The token value is zeroed from memory on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct BearerToken {
    access_token: String,
    #[zeroize(skip)]
    base_url: Url,
}

impl BearerToken {
    /// Creates a token bound to the given base URL.
    pub fn new(access_token: impl Into<String>, base_url: Url) -> Self {
        Self {
            access_token: access_token.into(),
            base_url,
        }
    }

    /// Returns the raw token value.
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Returns the base URL resource calls are issued against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerToken")
            .field("access_token", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Process-wide token slot, mutated only by successful authentication
/// (or an explicit [`set`](TokenStore::set)). Last write wins.
#[derive(Debug, Clone, Default)]
pub(crate) struct TokenStore {
    inner: Arc<RwLock<Option<BearerToken>>>,
}

impl TokenStore {
    /// Returns the current token, or `None` before any authentication.
    pub(crate) async fn get(&self) -> Option<BearerToken> {
        let guard = self.inner.read().await;
        guard.clone()
    }

    /// Unconditionally overwrites the stored token. No shape validation.
    pub(crate) async fn set(&self, token: BearerToken) {
        let mut guard = self.inner.write().await;
        *guard = Some(token);
    }
}
