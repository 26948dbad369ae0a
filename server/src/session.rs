//! Signed session cookies binding a browser to a username
//!
//! token format: base64url(json claims) "." base64url(hmac_sha256(json))

use axum::http::header::COOKIE;
use axum::http::HeaderMap;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use log::warn;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;
use time::OffsetDateTime;

type HmacSha256 = Hmac<Sha256>;

pub const SESSION_COOKIE: &str = "killword_session";

/// Sessions older than this are treated as logged out
pub const SESSION_MAX_AGE_SECS: i64 = 12 * 60 * 60;

/// Clock drift tolerated for sessions stamped slightly in the future
const CLOCK_SKEW_SECS: i64 = 60;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("failed to encode session: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("session key rejected by hmac")]
    InvalidKey,
}

/// Who a request is made on behalf of
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub username: String,
    pub is_admin: bool,
    pub issued_at: i64,
}

impl Session {
    pub fn new(username: &str, is_admin: bool) -> Self {
        Self {
            username: username.to_string(),
            is_admin,
            issued_at: OffsetDateTime::now_utc().unix_timestamp(),
        }
    }

    /// True once the session is older than `max_age_secs` at time `now`
    pub fn is_expired(&self, now: i64, max_age_secs: i64) -> bool {
        let age = now - self.issued_at;
        age > max_age_secs || age < -CLOCK_SKEW_SECS
    }
}

/// Signs and verifies session tokens with one process-wide key
#[derive(Clone)]
pub struct SessionKeys {
    key: Vec<u8>,
    max_age_secs: i64,
}

impl SessionKeys {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            key: secret.to_vec(),
            max_age_secs: SESSION_MAX_AGE_SECS,
        }
    }

    pub fn with_max_age(mut self, max_age_secs: i64) -> Self {
        self.max_age_secs = max_age_secs;
        self
    }

    pub fn max_age_secs(&self) -> i64 {
        self.max_age_secs
    }

    /// Fresh random key; sessions die with the process, like the game state
    pub fn random() -> Self {
        let mut key = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut key);
        Self::new(&key)
    }

    fn mac(&self) -> Result<HmacSha256, SessionError> {
        HmacSha256::new_from_slice(&self.key).map_err(|_| SessionError::InvalidKey)
    }

    pub fn issue(&self, session: &Session) -> Result<String, SessionError> {
        let payload = serde_json::to_vec(session)?;
        let mut mac = self.mac()?;
        mac.update(&payload);
        let signature = mac.finalize().into_bytes();

        Ok(format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(&payload),
            URL_SAFE_NO_PAD.encode(signature)
        ))
    }

    /// Returns the session if the token is well formed, correctly signed
    /// and not expired
    pub fn verify(&self, token: &str) -> Option<Session> {
        let (payload, signature) = token.split_once('.')?;
        let payload = URL_SAFE_NO_PAD.decode(payload).ok()?;
        let signature = URL_SAFE_NO_PAD.decode(signature).ok()?;

        let mut mac = self.mac().ok()?;
        mac.update(&payload);
        if mac.verify_slice(&signature).is_err() {
            warn!("Rejected session token with a bad signature");
            return None;
        }

        let session: Session = serde_json::from_slice(&payload).ok()?;
        let now = OffsetDateTime::now_utc().unix_timestamp();
        if session.is_expired(now, self.max_age_secs) {
            warn!("Rejected expired session for {}", session.username);
            return None;
        }
        Some(session)
    }

    /// Reads and verifies the session cookie from request headers
    pub fn session_from_headers(&self, headers: &HeaderMap) -> Option<Session> {
        let token = cookie_value(headers, SESSION_COOKIE)?;
        self.verify(&token)
    }
}

/// Finds a cookie by name across all `Cookie` headers
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

pub fn session_cookie(token: &str, max_age_secs: i64) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE, token, max_age_secs
    )
}

pub fn clear_session_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn keys() -> SessionKeys {
        SessionKeys::new(b"test-secret")
    }

    #[test]
    fn test_issue_and_verify() {
        let session = Session::new("alice", false);
        let token = keys().issue(&session).unwrap();

        assert_eq!(keys().verify(&token), Some(session));
    }

    #[test]
    fn test_admin_flag_survives() {
        let token = keys().issue(&Session::new("boss", true)).unwrap();
        let session = keys().verify(&token).unwrap();
        assert!(session.is_admin);
        assert_eq!(session.username, "boss");
    }

    #[test]
    fn test_wrong_key_rejected() {
        let token = keys().issue(&Session::new("alice", false)).unwrap();
        assert_eq!(SessionKeys::new(b"other-secret").verify(&token), None);
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let keys = keys();
        let token = keys.issue(&Session::new("alice", false)).unwrap();
        let (_, signature) = token.split_once('.').unwrap();

        let forged = Session::new("alice", true);
        let forged_payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&forged).unwrap());
        let forged_token = format!("{}.{}", forged_payload, signature);

        assert_eq!(keys.verify(&forged_token), None);
    }

    #[test]
    fn test_expired_session_rejected() {
        let keys = keys();
        let mut stale = Session::new("alice", false);
        stale.issued_at -= SESSION_MAX_AGE_SECS + 1;
        let token = keys.issue(&stale).unwrap();

        assert_eq!(keys.verify(&token), None);
        let lenient = keys.clone().with_max_age(2 * SESSION_MAX_AGE_SECS);
        assert!(lenient.verify(&token).is_some());
    }

    #[test]
    fn test_future_session_rejected() {
        let keys = keys();
        let mut early = Session::new("alice", false);
        early.issued_at += 10 * CLOCK_SKEW_SECS;
        let token = keys.issue(&early).unwrap();

        assert_eq!(keys.verify(&token), None);
    }

    #[test]
    fn test_session_expiry_boundary() {
        let session = Session {
            username: "alice".to_string(),
            is_admin: false,
            issued_at: 1_000,
        };
        assert!(!session.is_expired(1_000 + 100, 100));
        assert!(session.is_expired(1_000 + 101, 100));
        assert!(!session.is_expired(1_000 - CLOCK_SKEW_SECS, 100));
    }

    #[test]
    fn test_empty_secret_still_signs() {
        let keys = SessionKeys::new(b"");
        let token = keys.issue(&Session::new("alice", false)).unwrap();
        assert_eq!(keys.verify(&token).unwrap().username, "alice");
    }

    #[test]
    fn test_malformed_tokens_rejected() {
        let keys = keys();
        assert_eq!(keys.verify(""), None);
        assert_eq!(keys.verify("no-dot"), None);
        assert_eq!(keys.verify("!!!.???"), None);
    }

    #[test]
    fn test_random_keys_differ() {
        let token = SessionKeys::random()
            .issue(&Session::new("alice", false))
            .unwrap();
        assert_eq!(SessionKeys::random().verify(&token), None);
    }

    #[test]
    fn test_cookie_value_parsing() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; killword_session=abc.def; other=1"),
        );

        assert_eq!(cookie_value(&headers, SESSION_COOKIE).as_deref(), Some("abc.def"));
        assert_eq!(cookie_value(&headers, "theme").as_deref(), Some("dark"));
        assert_eq!(cookie_value(&headers, "missing"), None);
    }

    #[test]
    fn test_session_from_headers() {
        let keys = keys();
        let token = keys.issue(&Session::new("alice", false)).unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!("{}={}", SESSION_COOKIE, token)).unwrap(),
        );

        let session = keys.session_from_headers(&headers).unwrap();
        assert_eq!(session.username, "alice");
        assert_eq!(keys.session_from_headers(&HeaderMap::new()), None);
    }

    #[test]
    fn test_cookie_strings() {
        assert!(session_cookie("t", 60).starts_with("killword_session=t;"));
        assert!(session_cookie("t", 60).contains("HttpOnly"));
        assert!(session_cookie("t", 60).ends_with("Max-Age=60"));
        assert!(clear_session_cookie().contains("Max-Age=0"));
    }
}
