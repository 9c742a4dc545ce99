//! Named resource operations of the Tally API.
//!
//! Each operation is a thin parameter-binding wrapper over
//! [`get`](super::TallyClient::get), [`post`](super::TallyClient::post)
//! or [`delete`](super::TallyClient::delete): it builds the resource
//! path (percent-encoding caller-supplied segments) and, for writes,
//! a JSON body via `serde_json` so embedded quotes or control
//! characters in user-supplied text cannot corrupt the request.

use jiff::Timestamp;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use serde_json::json;

use super::{ApiClientError, ApiResponse, TallyClient};

/// Characters escaped in user-supplied path segments: controls plus
/// everything that would terminate or restructure the path.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

fn encode_segment(raw: &str) -> String {
    utf8_percent_encode(raw, SEGMENT).to_string()
}

/// Current time as `YYYY-MM-DDThh:mm:ssZ`, always UTC.
fn utc_timestamp() -> String {
    Timestamp::now().strftime("%Y-%m-%dT%H:%M:%SZ").to_string()
}

fn comment_body(text: &str, time: &str) -> String {
    json!({ "text": text, "time": time }).to_string()
}

fn new_user_body(email: &str, password: &str) -> String {
    json!({
        "relation": "moderated",
        "public": false,
        "email": email,
        "password": password,
    })
    .to_string()
}

fn booking_body(desc: &str, points: i64, currency: &str, time: &str) -> String {
    json!({
        "time": time,
        "text": desc,
        "earned": points,
        "currency": currency,
        "kind": "booking",
    })
    .to_string()
}

impl TallyClient {
    /// Creates a user: `POST /2/users`.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`post`](Self::post).
    pub async fn create_user(
        &self,
        email: &str,
        password: &str,
    ) -> Result<ApiResponse, ApiClientError> {
        self.post("/2/users", new_user_body(email, password)).await
    }

    /// Fetches a user: `GET /2/users/{user_id}`.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`get`](Self::get).
    pub async fn get_user(&self, user_id: &str) -> Result<ApiResponse, ApiClientError> {
        self.get(&format!("/2/users/{}", encode_segment(user_id)))
            .await
    }

    /// Fetches catalog messages: `GET /2/catalog/messages?keys={key}`.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`get`](Self::get).
    pub async fn get_catalog(&self, key: &str) -> Result<ApiResponse, ApiClientError> {
        let query = serde_urlencoded::to_string([("keys", key)])?;
        self.get(&format!("/2/catalog/messages?{query}")).await
    }

    /// Posts a comment on a challenge:
    /// `POST /2/challenges/{challenge_id}/comments`.
    ///
    /// The body carries the text and the current UTC timestamp.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`post`](Self::post).
    pub async fn post_comment(
        &self,
        challenge_id: &str,
        text: &str,
    ) -> Result<ApiResponse, ApiClientError> {
        let path = format!("/2/challenges/{}/comments", encode_segment(challenge_id));
        self.post(&path, comment_body(text, &utc_timestamp()))
            .await
    }

    /// Books points for a user: `POST /2/users/{user_id}/bookings`.
    ///
    /// `points` lands in the body as a bare numeric literal; the
    /// currency is the one configured on the builder.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`post`](Self::post).
    pub async fn post_booking(
        &self,
        user_id: &str,
        points: i64,
        desc: &str,
    ) -> Result<ApiResponse, ApiClientError> {
        let path = format!("/2/users/{}/bookings", encode_segment(user_id));
        let body = booking_body(desc, points, &self.currency, &utc_timestamp());
        self.post(&path, body).await
    }

    /// Deletes a user: `DELETE /2/users/{user_id}`, empty body.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`delete`](Self::delete).
    pub async fn delete_user(&self, user_id: &str) -> Result<ApiResponse, ApiClientError> {
        self.delete(&format!("/2/users/{}", encode_segment(user_id)))
            .await
    }
}

#[cfg(test)]
mod tests {
    use regex::Regex;

    use super::*;

    #[test]
    fn should_format_utc_timestamps() {
        let pattern =
            Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}Z$").expect("valid pattern");
        assert!(pattern.is_match(&utc_timestamp()));
    }

    #[test]
    fn should_keep_booking_points_as_bare_number() {
        let body = booking_body("Welcome bonus", 50, "points", "2024-03-01T12:00:00Z");
        assert!(body.contains(r#""earned":50"#));
        assert!(!body.contains(r#""earned":"50""#));
    }

    #[test]
    fn should_build_booking_body() {
        let body = booking_body("Welcome bonus", 50, "points", "2024-03-01T12:00:00Z");
        insta::assert_snapshot!(
            body,
            @r#"{"currency":"points","earned":50,"kind":"booking","text":"Welcome bonus","time":"2024-03-01T12:00:00Z"}"#
        );
    }

    #[test]
    fn should_substitute_caller_arguments_into_user_body() {
        let body = new_user_body("alice@example.com", "hunter2");
        assert!(body.contains(r#""email":"alice@example.com""#));
        assert!(body.contains(r#""password":"hunter2""#));
        assert!(body.contains(r#""relation":"moderated""#));
        assert!(body.contains(r#""public":false"#));
    }

    #[test]
    fn should_escape_embedded_quotes_in_comment_text() {
        let body = comment_body(r#"say "hi" to everyone"#, "2024-03-01T12:00:00Z");
        let parsed: serde_json::Value =
            serde_json::from_str(&body).expect("templated body stays valid JSON");
        assert_eq!(parsed["text"], r#"say "hi" to everyone"#);
    }

    #[test]
    fn should_percent_encode_path_segments() {
        assert_eq!(encode_segment("plain-id-42"), "plain-id-42");
        assert_eq!(encode_segment("a/b c"), "a%2Fb%20c");
        assert_eq!(encode_segment("x?y"), "x%3Fy");
    }
}
