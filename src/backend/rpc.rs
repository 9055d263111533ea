//! JSON-RPC backend
//!
//! Talks JSON-RPC 2.0 over HTTP POST to the chain node, the signing
//! daemon and the compiler service. Transactions are signed by the signer
//! and then broadcast through the chain node.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, instrument};
use url::Url;

use super::{Backend, Compiled, Query, TxReceipt, TxRequest};
use crate::config::Endpoints;
use crate::error::EpmError;

/// Default timeout for a single request (30 seconds)
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Blocking JSON-RPC client for the three backend services
#[derive(Debug, Clone)]
pub struct RpcBackend {
    /// Shared HTTP client (connection pooling)
    http_client: reqwest::blocking::Client,
    endpoints: Endpoints,
    chain_id: String,
}

impl RpcBackend {
    /// Build the client; no connection is made until the first call
    pub fn new(endpoints: Endpoints, chain_id: impl Into<String>) -> Result<Self, EpmError> {
        let http_client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .user_agent(concat!("epm/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| EpmError::Transport {
                endpoint: "client".to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            http_client,
            endpoints,
            chain_id: chain_id.into(),
        })
    }

    /// Use this chain ID when signing (after discovery)
    pub fn set_chain_id(&mut self, chain_id: impl Into<String>) {
        self.chain_id = chain_id.into();
    }

    #[instrument(skip(self, endpoint, params), fields(endpoint = %endpoint))]
    fn call(&self, endpoint: &Url, method: &str, params: Value) -> Result<Value, EpmError> {
        debug!("Sending RPC request");
        let transport = |e: reqwest::Error| EpmError::Transport {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        };

        let response: Value = self
            .http_client
            .post(endpoint.clone())
            .json(&envelope(method, params))
            .send()
            .map_err(transport)?
            .error_for_status()
            .map_err(transport)?
            .json()
            .map_err(transport)?;

        decode_response(method, response)
    }

    fn call_as<T: DeserializeOwned>(
        &self,
        endpoint: &Url,
        method: &str,
        params: Value,
    ) -> Result<T, EpmError> {
        Ok(serde_json::from_value(self.call(endpoint, method, params)?)?)
    }
}

/// Request body for `method`
pub fn envelope(method: &str, params: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": "epm",
        "method": method,
        "params": params,
    })
}

/// Extract `result` from a response, turning an `error` member into an error
pub fn decode_response(method: &str, mut response: Value) -> Result<Value, EpmError> {
    if let Some(error) = response.get("error").filter(|e| !e.is_null()) {
        return Err(EpmError::Rpc {
            method: method.to_string(),
            code: error.get("code").and_then(Value::as_i64).unwrap_or(0),
            message: error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_string(),
        });
    }

    match response.get_mut("result").map(Value::take) {
        Some(result) => Ok(result),
        None => Err(EpmError::Rpc {
            method: method.to_string(),
            code: 0,
            message: "response has no result".to_string(),
        }),
    }
}

impl Backend for RpcBackend {
    fn chain_id(&self) -> Result<String, EpmError> {
        let status = self.call(&self.endpoints.chain, "status", json!({}))?;
        status
            .get("chain_id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| EpmError::FieldNotFound {
                field: "chain_id".to_string(),
            })
    }

    fn compile(&self, name: &str, source: &str) -> Result<Compiled, EpmError> {
        self.call_as(
            &self.endpoints.compiler,
            "compile",
            json!({ "name": name, "source": source }),
        )
    }

    fn transact(&self, request: &TxRequest) -> Result<TxReceipt, EpmError> {
        let signed = self.call(
            &self.endpoints.signer,
            "sign",
            json!({ "chain_id": self.chain_id, "request": request }),
        )?;
        self.call_as(
            &self.endpoints.chain,
            "broadcast_tx",
            json!({ "tx": signed, "wait": request.wait }),
        )
    }

    fn simulate_call(&self, from: &str, to: &str, data: &str) -> Result<String, EpmError> {
        let result = self.call(
            &self.endpoints.chain,
            "call",
            json!({ "from": from, "to": to, "data": data }),
        )?;
        Ok(result
            .get("return")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string())
    }

    fn query(&self, query: &Query) -> Result<Value, EpmError> {
        let (method, params) = match query {
            Query::Account { address } => ("get_account", json!({ "address": address })),
            Query::Name { name } => ("get_name", json!({ "name": name })),
            Query::Validators { height } => ("list_validators", json!({ "height": height })),
        };
        self.call(&self.endpoints.chain, method, params)
    }

    fn dump_state(&self) -> Result<Value, EpmError> {
        self.call(&self.endpoints.chain, "dump_state", json!({}))
    }

    fn restore_state(&self, state: &Value) -> Result<String, EpmError> {
        let result = self.call(
            &self.endpoints.chain,
            "restore_state",
            json!({ "state": state }),
        )?;
        Ok(match result {
            Value::String(s) => s,
            other => other.to_string(),
        })
    }
}
