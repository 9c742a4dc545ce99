//! Credentials, grant types, and token acquisition.

use std::fmt;
use std::str::FromStr;

use http::HeaderValue;
use http::header::{CONTENT_TYPE, HeaderMap};
use serde::Serialize;
use tracing::debug;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::error::ApiClientError;
use super::flat_json;
use super::token::BearerToken;
use super::{TallyClient, accumulate_body};

/// Path of the OAuth2 token endpoint, relative to the base URL.
const TOKEN_ENDPOINT: &str = "/oauth/token";

/// The OAuth2 flow variant used to obtain a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum GrantType {
    /// Resource owner password credentials grant.
    #[display("password")]
    Password,
    /// Client credentials grant (machine-to-machine).
    #[display("client_credentials")]
    ClientCredentials,
}

impl FromStr for GrantType {
    type Err = ApiClientError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "password" => Ok(Self::Password),
            "client_credentials" => Ok(Self::ClientCredentials),
            _ => Err(ApiClientError::UnsupportedGrantType {
                grant_type: raw.to_string(),
            }),
        }
    }
}

/// Secure wrapper for sensitive string data, zeroed from memory on drop.
///
/// Credentials are redacted in debug output and masked in display so
/// they never land in logs in full.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SecureString(String);

impl SecureString {
    /// Creates a new secure string from the provided value.
    pub fn new(value: String) -> Self {
        Self(value)
    }

    /// Returns a reference to the inner value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Masks sensitive data for display purposes.
    ///
    /// Counts characters, not bytes, so multibyte values never split
    /// mid-character.
    fn mask_sensitive(value: &str) -> String {
        let count = value.chars().count();
        if count <= 8 {
            "***".to_string()
        } else {
            let head: String = value.chars().take(4).collect();
            let tail: String = value.chars().skip(count - 4).collect();
            format!("{head}...{tail}")
        }
    }
}

impl fmt::Debug for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecureString")
            .field("value", &"[REDACTED]")
            .finish()
    }
}

impl fmt::Display for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Self::mask_sensitive(&self.0))
    }
}

impl From<String> for SecureString {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for SecureString {
    fn from(value: &str) -> Self {
        Self::new(value.to_string())
    }
}

/// Username/password pair for the password grant.
#[derive(Debug, Clone)]
struct UserCredentials {
    username: String,
    password: SecureString,
}

/// Immutable credentials handed to [`TallyClient::authenticate`].
#[derive(Clone)]
pub struct Credentials {
    grant_type: GrantType,
    client_id: String,
    client_secret: SecureString,
    user: Option<UserCredentials>,
}

impl Credentials {
    /// Password grant credentials.
    pub fn password(
        client_id: impl Into<String>,
        client_secret: impl Into<SecureString>,
        username: impl Into<String>,
        password: impl Into<SecureString>,
    ) -> Self {
        Self {
            grant_type: GrantType::Password,
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            user: Some(UserCredentials {
                username: username.into(),
                password: password.into(),
            }),
        }
    }

    /// Client credentials grant.
    pub fn client_credentials(
        client_id: impl Into<String>,
        client_secret: impl Into<SecureString>,
    ) -> Self {
        Self {
            grant_type: GrantType::ClientCredentials,
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            user: None,
        }
    }

    /// Builds credentials from a raw grant type string, as read from
    /// configuration.
    ///
    /// # Errors
    ///
    /// Fails with [`ApiClientError::UnsupportedGrantType`] for anything
    /// other than `password` or `client_credentials`, and with
    /// [`ApiClientError::IncompleteCredentials`] when the password grant
    /// lacks a username or password. Both are raised before any network
    /// call is made.
    pub fn new(
        grant_type: &str,
        client_id: impl Into<String>,
        client_secret: impl Into<SecureString>,
        username: Option<String>,
        password: Option<String>,
    ) -> Result<Self, ApiClientError> {
        let grant_type = GrantType::from_str(grant_type)?;
        match grant_type {
            GrantType::ClientCredentials => Ok(Self::client_credentials(client_id, client_secret)),
            GrantType::Password => {
                let username = username.ok_or_else(|| ApiClientError::IncompleteCredentials {
                    reason: "password grant requires a username".to_string(),
                })?;
                let password = password.ok_or_else(|| ApiClientError::IncompleteCredentials {
                    reason: "password grant requires a password".to_string(),
                })?;
                Ok(Self::password(client_id, client_secret, username, password))
            }
        }
    }

    /// The grant type these credentials authenticate with.
    pub fn grant_type(&self) -> GrantType {
        self.grant_type
    }

    /// URL-encoded token request body. Field order is fixed by the
    /// endpoint: grant-specific fields first, then `scope=all`, then the
    /// client pair for the password grant.
    pub(crate) fn form_body(&self) -> Result<String, ApiClientError> {
        let encoded = match (&self.grant_type, &self.user) {
            (GrantType::Password, Some(user)) => serde_urlencoded::to_string(PasswordGrantForm {
                grant_type: "password",
                username: &user.username,
                password: user.password.as_str(),
                scope: "all",
                client_id: &self.client_id,
                client_secret: self.client_secret.as_str(),
            })?,
            _ => serde_urlencoded::to_string(ClientCredentialsForm {
                grant_type: "client_credentials",
                scope: "all",
                client_id: &self.client_id,
                client_secret: self.client_secret.as_str(),
            })?,
        };
        Ok(encoded)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("grant_type", &self.grant_type)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("username", &self.user.as_ref().map(|u| &u.username))
            .finish()
    }
}

#[derive(Serialize)]
struct PasswordGrantForm<'a> {
    grant_type: &'static str,
    username: &'a str,
    password: &'a str,
    scope: &'static str,
    client_id: &'a str,
    client_secret: &'a str,
}

#[derive(Serialize)]
struct ClientCredentialsForm<'a> {
    grant_type: &'static str,
    scope: &'static str,
    client_id: &'a str,
    client_secret: &'a str,
}

impl TallyClient {
    /// Exchanges credentials for a bearer token at `<base>/oauth/token`.
    ///
    /// On success the token is stored (overwriting any previous one)
    /// together with the base URL used for subsequent resource calls,
    /// and also returned to the caller. Nothing is retried here; the
    /// caller decides whether to re-authenticate on failure.
    ///
    /// The request always goes out as
    /// `Content-Type: application/x-www-form-urlencoded`, independent of
    /// the current header set, which still contributes any other headers.
    ///
    /// # Errors
    ///
    /// - [`ApiClientError::Transport`] when the host cannot be reached.
    /// - [`ApiClientError::MissingAccessToken`] when the host answered
    ///   but the body carried no `access_token` field.
    pub async fn authenticate(
        &self,
        credentials: &Credentials,
    ) -> Result<BearerToken, ApiClientError> {
        let token_url = super::join_url(&self.base_url, TOKEN_ENDPOINT)?;
        let body = credentials.form_body()?;

        let mut headers = HeaderMap::new();
        self.headers.read().await.apply(&mut headers);
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );

        debug!(url = %token_url, grant_type = %credentials.grant_type(), "requesting access token");
        let response = self
            .http
            .post(token_url)
            .headers(headers)
            .body(body)
            .send()
            .await?;
        let status = response.status();
        let body = accumulate_body(response).await?;
        debug!(%status, "token endpoint answered");

        let access_token = flat_json::tokenize(&body).lookup("access_token").to_string();
        if access_token.is_empty() {
            return Err(ApiClientError::MissingAccessToken { body });
        }

        let token = BearerToken::new(access_token, self.base_url.clone());
        self.tokens.set(token.clone()).await;
        Ok(token)
    }

    /// Installs an externally obtained token and the base URL it is
    /// valid against, bypassing the token endpoint.
    ///
    /// # Errors
    ///
    /// Fails with [`ApiClientError::UrlError`] when `base_url` does not
    /// parse.
    pub async fn set_access_token(
        &self,
        access_token: impl Into<String>,
        base_url: &str,
    ) -> Result<(), ApiClientError> {
        let base_url = url::Url::parse(base_url)?;
        self.tokens
            .set(BearerToken::new(access_token, base_url))
            .await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_parse_known_grant_types() {
        assert_eq!(
            "password".parse::<GrantType>().expect("known grant"),
            GrantType::Password
        );
        assert_eq!(
            "client_credentials"
                .parse::<GrantType>()
                .expect("known grant"),
            GrantType::ClientCredentials
        );
    }

    #[test]
    fn should_reject_unrecognized_grant_type() {
        let result = Credentials::new("authorization_code", "cid", "secret", None, None);
        match result.expect_err("unknown grant must fail") {
            ApiClientError::UnsupportedGrantType { grant_type } => {
                assert_eq!(grant_type, "authorization_code");
            }
            other => panic!("expected UnsupportedGrantType, got {other}"),
        }
    }

    #[test]
    fn should_require_user_pair_for_password_grant() {
        let result = Credentials::new("password", "cid", "secret", None, None);
        match result.expect_err("missing username must fail") {
            ApiClientError::IncompleteCredentials { reason } => {
                assert!(reason.contains("username"));
            }
            other => panic!("expected IncompleteCredentials, got {other}"),
        }
    }

    #[test]
    fn should_encode_password_grant_body_in_endpoint_order() {
        let credentials = Credentials::password("cid", "cs", "alice", "s3cret");
        let body = credentials.form_body().expect("encodable form");
        insta::assert_snapshot!(
            body,
            @"grant_type=password&username=alice&password=s3cret&scope=all&client_id=cid&client_secret=cs"
        );
    }

    #[test]
    fn should_encode_client_credentials_body_in_endpoint_order() {
        let credentials = Credentials::client_credentials("cid", "cs");
        let body = credentials.form_body().expect("encodable form");
        insta::assert_snapshot!(
            body,
            @"grant_type=client_credentials&scope=all&client_id=cid&client_secret=cs"
        );
    }

    #[test]
    fn should_url_encode_reserved_characters_in_form_fields() {
        let credentials = Credentials::password("cid", "c&s", "alice@example.com", "p=w");
        let body = credentials.form_body().expect("encodable form");
        insta::assert_snapshot!(
            body,
            @"grant_type=password&username=alice%40example.com&password=p%3Dw&scope=all&client_id=cid&client_secret=c%26s"
        );
    }

    #[test]
    fn should_redact_secrets_in_debug_output() {
        let credentials = Credentials::password("cid", "super-secret", "alice", "hunter2222");
        let debug_str = format!("{credentials:?}");
        assert!(debug_str.contains("[REDACTED]"));
        assert!(!debug_str.contains("super-secret"));
        assert!(!debug_str.contains("hunter2222"));
    }

    #[test]
    fn should_mask_secure_string_display() {
        assert_eq!(SecureString::from("short").to_string(), "***");
        assert_eq!(
            SecureString::from("very-secret-token-12345").to_string(),
            "very...2345"
        );
    }

    #[test]
    fn should_mask_multibyte_secrets_on_char_boundaries() {
        // 'é' straddles the fourth byte; slicing by bytes would panic.
        assert_eq!(SecureString::from("abcéfghijkl").to_string(), "abcé...ijkl");
        assert_eq!(SecureString::from("ünïcödé-tökén").to_string(), "ünïc...ökén");
        // Nine multibyte chars is over the threshold even though short in chars.
        assert_eq!(SecureString::from("ééééééééé").to_string(), "éééé...éééé");
    }
}
