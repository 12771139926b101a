//! HTTP client for the remote token introspection provider.

use serde_json::Value;
use tracing::debug;

use cerberus_core::{AuthError, AuthResult, BoxFuture, TipGrant};

use crate::config::IntrospectionConfig;

const SERVICE: &str = "tip";

/// Remote introspection interface.
///
/// Implementations resolve one raw token value to a grant, mapping provider
/// failures onto the standard error taxonomy: an error envelope in the body
/// means the token is invalid, transport and status failures mean the
/// provider itself is unavailable, and an unparsable success body is a
/// broken contract.
pub trait TipClient: Send + Sync {
    /// Introspects one raw token value.
    fn introspect<'a>(&'a self, token: &'a str) -> BoxFuture<'a, AuthResult<TipGrant>>;
}

/// Reqwest-based client speaking the provider's JSON contract.
#[derive(Debug, Clone)]
pub struct HttpTipClient {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpTipClient {
    /// Builds a client for the configured provider.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Remote`] if the underlying HTTP client cannot
    /// be constructed.
    pub fn new(config: &IntrospectionConfig) -> AuthResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| AuthError::remote(SERVICE, format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            endpoint: config.endpoint_url(),
        })
    }

    async fn introspect_token(&self, token: &str) -> AuthResult<TipGrant> {
        debug!(remote_service = SERVICE, "Introspecting token");

        let response = self
            .http
            .post(&self.endpoint)
            .json(&serde_json::json!({ "token": token }))
            .send()
            .await
            .map_err(|e| AuthError::remote(SERVICE, e.to_string()))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| AuthError::remote(SERVICE, e.to_string()))?;

        let body: Value = match serde_json::from_slice(&bytes) {
            Ok(value) => value,
            Err(e) if status.is_success() => {
                return Err(AuthError::contract(format!(
                    "introspection response is not JSON: {e}"
                )));
            }
            Err(_) => {
                return Err(AuthError::remote(
                    SERVICE,
                    format!("introspection failed with status {status}"),
                ));
            }
        };

        // An error envelope identifies the token as invalid regardless of
        // the HTTP status the provider chose.
        if let Some(message) = body.pointer("/error/message").and_then(Value::as_str) {
            return Err(AuthError::token_invalid(message));
        }

        if !status.is_success() {
            return Err(AuthError::remote(
                SERVICE,
                format!("introspection failed with status {status}"),
            ));
        }

        serde_json::from_value(body)
            .map_err(|e| AuthError::contract(format!("malformed introspection grant: {e}")))
    }
}

impl TipClient for HttpTipClient {
    fn introspect<'a>(&'a self, token: &'a str) -> BoxFuture<'a, AuthResult<TipGrant>> {
        Box::pin(self.introspect_token(token))
    }
}
