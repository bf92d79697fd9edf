//! Session state and the login handshake.
//!
//! Two login shapes exist:
//! - **Anonymous** (empty username): a bare `login` call, allowed when the
//!   server runs without admin accounts. Returns the session token in
//!   `session`.
//! - **Credentialed**: a `salt` challenge call first (per-user salt,
//!   PBKDF2 round count, random per-session seed, plus the token the
//!   session will use), then `login` with the computed hash.
//!
//! The whole handshake runs under one async mutex per client instance.
//! Concurrent callers that arrive while a handshake is in flight park on
//! the lock and then hit the fast path, so a burst of first calls
//! produces exactly one wire exchange. The guard drops on every exit
//! path, so a failed handshake can never wedge later logins.

use tokio::sync::Mutex;

use crate::error::{ApiError, Result};
use crate::hash::session_login_hash;
use crate::json::{opt_bool, opt_i64, opt_str, req_str};
use crate::transport::Transport;

/// Current session: token plus logged-in flag.
///
/// Invariant: `token` is non-empty exactly when `authenticated` is true.
#[derive(Debug, Default)]
struct Session {
    token: String,
    authenticated: bool,
}

/// Executes and serializes the login handshake.
pub(crate) struct Authenticator {
    username: String,
    password: String,
    session: Mutex<Session>,
}

impl Authenticator {
    pub(crate) fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            session: Mutex::new(Session::default()),
        }
    }

    /// Return the live session token, performing the handshake if needed.
    ///
    /// Fast path: already authenticated, no I/O. Otherwise runs the
    /// anonymous or credentialed handshake while holding the session
    /// lock. Any failure clears the session before propagating.
    pub(crate) async fn ensure_logged_in(&self, transport: &Transport) -> Result<String> {
        let mut session = self.session.lock().await;

        if session.authenticated && !session.token.is_empty() {
            return Ok(session.token.clone());
        }

        // Stale state from an earlier failure must not leak into the
        // handshake.
        *session = Session::default();

        let outcome = if self.username.is_empty() {
            self.login_anonymous(transport).await
        } else {
            self.login_credentialed(transport).await
        };

        match outcome {
            Ok(token) => {
                session.token = token.clone();
                session.authenticated = true;
                tracing::debug!("session established");
                Ok(token)
            }
            Err(err) => {
                *session = Session::default();
                tracing::warn!(error = %err, "login failed");
                Err(err)
            }
        }
    }

    /// Drop the current session so the next call performs a fresh login.
    pub(crate) async fn invalidate(&self) {
        *self.session.lock().await = Session::default();
    }

    async fn login_anonymous(&self, transport: &Transport) -> Result<String> {
        let resp = transport.call("login", &[], None).await?;
        if !opt_bool(&resp, "success", false) {
            return Err(ApiError::auth("server rejected anonymous login"));
        }
        let token = req_str(&resp, "session")?.to_string();
        if token.is_empty() {
            return Err(ApiError::auth("anonymous login returned an empty session"));
        }
        Ok(token)
    }

    async fn login_credentialed(&self, transport: &Transport) -> Result<String> {
        let challenge = transport
            .call("salt", &[("username", self.username.clone())], None)
            .await?;

        // No salt in the challenge means the username is unknown; the
        // server does not say so any louder than this.
        let salt = match opt_str(&challenge, "salt") {
            Some(s) if !s.is_empty() => s.to_string(),
            _ => {
                return Err(ApiError::auth(format!(
                    "unknown username `{}`",
                    self.username
                )))
            }
        };
        let token = req_str(&challenge, "ses")?.to_string();
        let rounds = opt_i64(&challenge, "pbkdf2_rounds").unwrap_or(0).max(0) as u32;
        let seed = opt_str(&challenge, "rnd").unwrap_or_default().to_string();

        let hashed = session_login_hash(&self.password, &salt, rounds, &seed);

        let resp = transport
            .call(
                "login",
                &[
                    ("username", self.username.clone()),
                    ("password", hashed),
                ],
                Some(&token),
            )
            .await?;

        if !opt_bool(&resp, "success", false) {
            return Err(ApiError::auth("server rejected credentials"));
        }
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use wiremock::matchers::{body_string_contains, method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn transport_for(server: &MockServer) -> Transport {
        Transport::new(format!("{}/x", server.uri())).unwrap()
    }

    #[tokio::test]
    async fn anonymous_login_skips_the_challenge() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(query_param("a", "salt"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(query_param("a", "login"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"success": true, "session": "anon-tok"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let auth = Authenticator::new("", "");
        let token = auth.ensure_logged_in(&transport_for(&server)).await.unwrap();
        assert_eq!(token, "anon-tok");
    }

    #[tokio::test]
    async fn anonymous_rejection_is_an_authentication_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(query_param("a", "login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": false})))
            .mount(&server)
            .await;

        let auth = Authenticator::new("", "");
        let err = auth
            .ensure_logged_in(&transport_for(&server))
            .await
            .unwrap_err();
        assert!(err.is_authentication());
    }

    #[tokio::test]
    async fn credentialed_login_submits_the_expected_hash() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(query_param("a", "salt"))
            .and(body_string_contains("username=admin"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ses": "tok-1",
                "salt": "somesalt",
                "pbkdf2_rounds": 10000,
                "rnd": "rnd12345",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let expected = session_login_hash("secretpw", "somesalt", 10_000, "rnd12345");
        Mock::given(method("POST"))
            .and(query_param("a", "login"))
            .and(body_string_contains(format!("password={expected}")))
            .and(body_string_contains("ses=tok-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .expect(1)
            .mount(&server)
            .await;

        let auth = Authenticator::new("admin", "secretpw");
        let token = auth.ensure_logged_in(&transport_for(&server)).await.unwrap();
        assert_eq!(token, "tok-1");
    }

    #[tokio::test]
    async fn missing_salt_means_unknown_username() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(query_param("a", "salt"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ses": "t"})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(query_param("a", "login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .expect(0)
            .mount(&server)
            .await;

        let auth = Authenticator::new("nobody", "pw");
        let err = auth
            .ensure_logged_in(&transport_for(&server))
            .await
            .unwrap_err();
        assert!(err.is_authentication());
    }

    #[tokio::test]
    async fn fast_path_reuses_the_token_without_io() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(query_param("a", "login"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"success": true, "session": "tok"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let auth = Authenticator::new("", "");
        let transport = transport_for(&server);
        let first = auth.ensure_logged_in(&transport).await.unwrap();
        let second = auth.ensure_logged_in(&transport).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_handshake() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(query_param("a", "salt"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"ses": "tok", "salt": "s", "pbkdf2_rounds": 0, "rnd": "r"}))
                    .set_delay(std::time::Duration::from_millis(50)),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(query_param("a", "login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .expect(1)
            .mount(&server)
            .await;

        let auth = Arc::new(Authenticator::new("admin", "pw"));
        let transport = Arc::new(transport_for(&server));

        let (a, b) = tokio::join!(
            {
                let auth = auth.clone();
                let transport = transport.clone();
                async move { auth.ensure_logged_in(&transport).await }
            },
            {
                let auth = auth.clone();
                let transport = transport.clone();
                async move { auth.ensure_logged_in(&transport).await }
            }
        );
        assert_eq!(a.unwrap(), "tok");
        assert_eq!(b.unwrap(), "tok");
    }

    #[tokio::test]
    async fn failure_clears_state_and_the_next_call_retries() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(query_param("a", "salt"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ses": "tok", "salt": "s", "pbkdf2_rounds": 0, "rnd": "r",
            })))
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(query_param("a", "login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": false})))
            .expect(2)
            .mount(&server)
            .await;

        let auth = Authenticator::new("admin", "badpw");
        let transport = transport_for(&server);
        assert!(auth.ensure_logged_in(&transport).await.is_err());
        // Not wedged: the gate was released and a fresh handshake runs.
        assert!(auth.ensure_logged_in(&transport).await.is_err());
    }

    #[tokio::test]
    async fn invalidate_forces_a_fresh_handshake() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(query_param("a", "login"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"success": true, "session": "tok"})),
            )
            .expect(2)
            .mount(&server)
            .await;

        let auth = Authenticator::new("", "");
        let transport = transport_for(&server);
        auth.ensure_logged_in(&transport).await.unwrap();
        auth.invalidate().await;
        auth.ensure_logged_in(&transport).await.unwrap();
    }
}
