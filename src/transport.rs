//! Wire transport: one POST per API action.
//!
//! Every server operation is selected by an `a=<action>` query parameter
//! on a single endpoint URL, with form-encoded parameters in the body.
//! Once a session exists its token rides along as `ses`. The transport
//! parses the JSON body and hands it back untouched; application-level
//! failure flags (`{"success": false}` and friends) are the caller's
//! business.

use std::time::Duration;

use serde_json::Value;

use crate::error::{ApiError, Result};

/// Default per-request timeout.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// HTTP transport bound to one server endpoint.
pub struct Transport {
    base_url: String,
    http: reqwest::Client,
}

impl Transport {
    /// Create a transport for the given endpoint URL
    /// (e.g. `http://backup.example:55414/x`).
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            base_url: base_url.into(),
            http,
        })
    }

    /// Issue one action call.
    ///
    /// Appends `ses=<token>` to the body when a non-empty token is given.
    /// Non-2xx statuses become [`ApiError::Http`]; a 2xx body that is not
    /// JSON becomes [`ApiError::DataIntegrity`].
    pub async fn call(
        &self,
        action: &str,
        params: &[(&str, String)],
        session_token: Option<&str>,
    ) -> Result<Value> {
        let mut body: Vec<(&str, &str)> = params
            .iter()
            .map(|(k, v)| (*k, v.as_str()))
            .collect();
        if let Some(token) = session_token {
            if !token.is_empty() {
                body.push(("ses", token));
            }
        }

        tracing::debug!(action, params = body.len(), "api call");

        let resp = self
            .http
            .post(&self.base_url)
            .query(&[("a", action)])
            .form(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            tracing::warn!(action, %status, "api call rejected");
            return Err(ApiError::Http { status });
        }

        let text = resp.text().await?;
        serde_json::from_str(&text)
            .map_err(|_| ApiError::shape(format!("action `{action}`: body is not JSON")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn transport_for(server: &MockServer) -> Transport {
        Transport::new(format!("{}/x", server.uri())).unwrap()
    }

    #[tokio::test]
    async fn posts_action_and_form_params() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(query_param("a", "status"))
            .and(body_string_contains("clientid=7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let t = transport_for(&server).await;
        let v = t
            .call("status", &[("clientid", "7".into())], None)
            .await
            .unwrap();
        assert_eq!(v["ok"], json!(true));
    }

    #[tokio::test]
    async fn attaches_session_token_when_present() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("ses=tok123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let t = transport_for(&server).await;
        t.call("usage", &[], Some("tok123")).await.unwrap();
    }

    #[tokio::test]
    async fn empty_token_is_not_sent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("ses="))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let t = transport_for(&server).await;
        t.call("status", &[], Some("")).await.unwrap();
    }

    #[tokio::test]
    async fn non_success_status_is_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let t = transport_for(&server).await;
        let err = t.call("status", &[], None).await.unwrap_err();
        assert!(matches!(err, ApiError::Http { status } if status.as_u16() == 500));
    }

    #[tokio::test]
    async fn garbage_body_is_data_integrity() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let t = transport_for(&server).await;
        let err = t.call("status", &[], None).await.unwrap_err();
        assert!(matches!(err, ApiError::DataIntegrity { .. }));
    }
}
