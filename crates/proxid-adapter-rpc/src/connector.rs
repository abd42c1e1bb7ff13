//! RPC transport.
//!
//! JSON-over-HTTP calls against the backend's management API, shaped as
//! `GET /json/{manager}/{method}?{query}` for reads and
//! `POST /json/{manager}/{method}` with a JSON body for the rest. Every call
//! authenticates with HTTP basic auth; a per-connector in-memory cookie store
//! keeps session affinity with the backend across calls for the lifetime of
//! the process. The backend should be considered unreliable: timeouts are
//! short and callers decide how much of an outage they tolerate.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::config::RpcConfig;
use crate::error::{RpcError, RpcResult};

/// Connect timeout per call.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(1);

/// Overall timeout per call.
const TIMEOUT: Duration = Duration::from_secs(15);

/// Response field marking a remote-reported application error.
const ERROR_ID_FIELD: &str = "errorId";

/// Response field carrying the remote error message.
const ERROR_MESSAGE_FIELD: &str = "message";

/// RPC call operations as the adapter consumes them.
#[async_trait]
pub trait RpcTransport: Send + Sync {
    /// Issues a read call with query-encoded parameters.
    async fn get(&self, manager: &str, method: &str, params: &[(String, Value)])
        -> RpcResult<Value>;

    /// Issues a call with a JSON request body.
    async fn post(&self, manager: &str, method: &str, params: &Value) -> RpcResult<Value>;
}

/// RPC transport backed by `reqwest`.
pub struct RpcConnector {
    config: RpcConfig,
    client: reqwest::Client,
}

impl RpcConnector {
    /// Creates a new connector with its own cookie store.
    ///
    /// ## Errors
    ///
    /// Returns `RpcError::Http` if the HTTP client cannot be constructed.
    pub fn new(config: RpcConfig) -> RpcResult<Self> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(TIMEOUT)
            .build()?;

        Ok(Self { config, client })
    }

    async fn parse(response: reqwest::Response) -> RpcResult<Value> {
        let value: Value = response.error_for_status()?.json().await?;
        check_remote_error(&value)?;
        Ok(value)
    }
}

#[async_trait]
impl RpcTransport for RpcConnector {
    async fn get(
        &self,
        manager: &str,
        method: &str,
        params: &[(String, Value)],
    ) -> RpcResult<Value> {
        let url = format!(
            "{}?{}",
            self.config.call_url(manager, method),
            encode_query(params)
        );

        let started = Instant::now();
        let response = self
            .client
            .get(&url)
            .basic_auth(&self.config.user, Some(&self.config.password))
            .send()
            .await?;
        let result = Self::parse(response).await;

        debug!(url = %url, elapsed_ms = started.elapsed().as_millis() as u64, "rpc get");
        result
    }

    async fn post(&self, manager: &str, method: &str, params: &Value) -> RpcResult<Value> {
        let url = self.config.call_url(manager, method);

        let started = Instant::now();
        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.user, Some(&self.config.password))
            .json(params)
            .send()
            .await?;
        let result = Self::parse(response).await;

        debug!(url = %url, elapsed_ms = started.elapsed().as_millis() as u64, "rpc post");
        result
    }
}

/// Fails when a parsed response is a remote-reported application error.
///
/// The backend signals errors as a JSON object carrying an error-identifier
/// field; every other response shape passes through unvalidated.
fn check_remote_error(value: &Value) -> RpcResult<()> {
    if let Value::Object(object) = value {
        if object.contains_key(ERROR_ID_FIELD) {
            let message = object
                .get(ERROR_MESSAGE_FIELD)
                .and_then(Value::as_str)
                .unwrap_or("unspecified backend error");
            return Err(RpcError::remote(message));
        }
    }
    Ok(())
}

/// Encodes call parameters as a query string.
///
/// Array-valued parameters become repeated unindexed keys (`k=a&k=b`) —
/// the array convention the backend's API expects; indexed keys (`k[0]=a`)
/// are never produced.
fn encode_query(params: &[(String, Value)]) -> String {
    let mut pairs: Vec<String> = Vec::new();

    for (key, value) in params {
        match value {
            Value::Array(items) => {
                pairs.extend(items.iter().map(|item| encode_pair(key, item)));
            }
            other => pairs.push(encode_pair(key, other)),
        }
    }

    pairs.join("&")
}

fn encode_pair(key: &str, value: &Value) -> String {
    let text = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    format!("{}={}", urlencoding::encode(key), urlencoding::encode(&text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn arrays_encode_as_repeated_unindexed_keys() {
        let params = vec![
            ("user".to_string(), json!(42)),
            ("attrNames".to_string(), json!(["a", "b"])),
        ];

        let query = encode_query(&params);
        assert_eq!(query, "user=42&attrNames=a&attrNames=b");

        // Round-trip: parsing yields two repeated same-named entries.
        let parsed: Vec<(&str, &str)> = query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .collect();
        assert_eq!(
            parsed,
            vec![("user", "42"), ("attrNames", "a"), ("attrNames", "b")]
        );
        assert!(!query.contains("%5B"), "indexed keys must not be produced");
    }

    #[test]
    fn values_are_percent_encoded() {
        let params = vec![(
            "extLogin".to_string(),
            json!("user name@example.org"),
        )];

        assert_eq!(encode_query(&params), "extLogin=user%20name%40example.org");
    }

    #[test]
    fn remote_error_objects_are_detected() {
        let err = check_remote_error(&json!({
            "errorId": "1907",
            "name": "UserNotExistsException",
            "message": "User not found by ext login",
        }))
        .unwrap_err();

        assert!(err.is_remote_error());
        assert!(err.to_string().contains("User not found by ext login"));
    }

    #[test]
    fn non_error_shapes_pass_through() {
        assert!(check_remote_error(&json!({"id": 1})).is_ok());
        assert!(check_remote_error(&json!([1, 2, 3])).is_ok());
        assert!(check_remote_error(&json!("ok")).is_ok());
        assert!(check_remote_error(&Value::Null).is_ok());
    }

    #[test]
    fn remote_error_without_message_still_fails() {
        let err = check_remote_error(&json!({"errorId": "77"})).unwrap_err();
        assert!(err.to_string().contains("unspecified backend error"));
    }
}
