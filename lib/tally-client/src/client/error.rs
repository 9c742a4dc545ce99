use std::fmt::Debug;

/// Errors that can occur when using the [`TallyClient`](super::TallyClient).
///
/// The four failure classes of the client are kept distinct and
/// inspectable rather than collapsed into a boolean: configuration
/// errors are raised before any network I/O, transport errors carry the
/// native [`reqwest::Error`], protocol errors mean the host answered but
/// without the expected field, and decode errors cover a body that is
/// not valid UTF-8.
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum ApiClientError {
    /// Transport failure from the underlying reqwest client.
    ///
    /// Connection, resolution, TLS, and timeout failures all surface
    /// here with reqwest's own diagnostics.
    Transport(reqwest::Error),

    /// URL parsing error when constructing the base or request URL.
    UrlError(url::ParseError),

    /// Invalid HTTP header name passed to `set_header`.
    InvalidHeaderName(http::header::InvalidHeaderName),

    /// Invalid HTTP header value passed to `set_header`.
    InvalidHeaderValue(http::header::InvalidHeaderValue),

    /// Form encoding of the token request body failed.
    FormEncoding(serde_urlencoded::ser::Error),

    /// The accumulated response body is not valid UTF-8.
    BodyDecode(std::string::FromUtf8Error),

    /// Grant type string is not one of `password` or `client_credentials`.
    ///
    /// Raised while building [`Credentials`](super::Credentials), before
    /// the transport is ever invoked.
    #[display("Unsupported grant type: {grant_type:?}")]
    #[from(skip)]
    UnsupportedGrantType {
        /// The unrecognized grant type that was provided.
        grant_type: String,
    },

    /// Credentials are missing a field the grant type requires.
    #[display("Incomplete credentials: {reason}")]
    #[from(skip)]
    IncompleteCredentials {
        /// Which field is missing and for which grant.
        reason: String,
    },

    /// The token endpoint answered, but no `access_token` was present.
    ///
    /// Distinct from [`Transport`](Self::Transport): the host was
    /// reached and the exchange completed.
    #[display("Token endpoint returned no access_token in: {body}")]
    #[from(skip)]
    MissingAccessToken {
        /// The response body that lacked the token.
        body: String,
    },

    /// A resource call was issued before any token was stored.
    #[display("No access token stored: authenticate first")]
    NotAuthenticated,
}
