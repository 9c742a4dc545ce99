//! The mutable header set attached to every request.

use http::HeaderValue;
use http::header::{CONTENT_TYPE, HeaderMap, HeaderName};

/// Canonical default header value installed by a reset.
fn default_content_type() -> HeaderValue {
    HeaderValue::from_static("application/json")
}

/// Request headers with replace-not-append semantics.
///
/// Whatever was last set is what every request carries; there is no
/// merging across calls. `HeaderMap::insert` keeps the invariant that
/// exactly one `Content-Type` is active after each change.
#[derive(Debug, Clone)]
pub(crate) struct HeaderSet {
    headers: HeaderMap,
}

impl HeaderSet {
    /// Clears the set and installs exactly one header.
    pub(crate) fn set(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.clear();
        self.headers.insert(name, value);
    }

    /// Restores the canonical default: `Content-Type: application/json`.
    pub(crate) fn reset(&mut self) {
        self.headers.clear();
        self.headers.insert(CONTENT_TYPE, default_content_type());
    }

    /// Copies the current set into a request header map.
    pub(crate) fn apply(&self, target: &mut HeaderMap) {
        for (name, value) in &self.headers {
            target.insert(name.clone(), value.clone());
        }
    }
}

impl Default for HeaderSet {
    fn default() -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, default_content_type());
        Self { headers }
    }
}
