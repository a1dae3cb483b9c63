//! JSON-RPC client for the membership read
//!
//! This module provides the one chain interaction the gate needs:
//! - `balanceOf(address)` on the lock contract via `eth_call`
//! - `eth_chainId` for health reporting

use crate::abi;
use crate::{GateError, Result};
use ethereum_types::{Address, U256};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use url::Url;

/// Boxed future returned by [`MembershipQuery`]
pub type QueryFuture<'a> = Pin<Box<dyn Future<Output = Result<U256>> + Send + 'a>>;

/// Source of lock balances
pub trait MembershipQuery: Send + Sync {
    /// Number of keys `owner` holds on `lock`
    fn balance_of<'a>(&'a self, lock: &'a Address, owner: &'a Address) -> QueryFuture<'a>;
}

/// JSON-RPC request envelope
#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    method: &'a str,
    params: serde_json::Value,
    id: u64,
}

/// JSON-RPC error object
#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// JSON-RPC response envelope
#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<serde_json::Value>,
    error: Option<RpcErrorObject>,
}

/// Read-only client bound to one endpoint and chain
#[derive(Debug)]
pub struct RpcClient {
    endpoint: Url,
    chain_id: u64,
    client: reqwest::Client,
    next_id: AtomicU64,
}

impl RpcClient {
    /// Create a new RPC client
    pub fn new(endpoint: Url, chain_id: u64) -> Self {
        Self {
            endpoint,
            chain_id,
            client: reqwest::Client::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Endpoint this client talks to
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Chain id this client was configured for
    pub fn configured_chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Issue a JSON-RPC call and return its `result` field
    async fn call(&self, method: &str, params: serde_json::Value) -> Result<serde_json::Value> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
        };

        tracing::debug!(method, endpoint = %self.endpoint, "rpc call");

        let response: RpcResponse = self
            .client
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(error) = response.error {
            return Err(GateError::rpc(error.code, error.message));
        }

        response
            .result
            .ok_or_else(|| GateError::decode(format!("no result in {} response", method)))
    }

    /// Get the lock balance of `owner`
    pub async fn get_lock_balance(&self, lock: &Address, owner: &Address) -> Result<U256> {
        let result = self
            .call(
                "eth_call",
                serde_json::json!([{
                    "to": format!("{:?}", lock),
                    "data": abi::encode_balance_of(owner),
                }, "latest"]),
            )
            .await?;

        let data = result
            .as_str()
            .ok_or_else(|| GateError::decode("eth_call result is not a string"))?;

        abi::decode_uint256(data)
    }

    /// Get the chain id reported by the node
    pub async fn chain_id(&self) -> Result<u64> {
        let result = self.call("eth_chainId", serde_json::json!([])).await?;
        let hex_id = result
            .as_str()
            .ok_or_else(|| GateError::decode("eth_chainId result is not a string"))?;

        u64::from_str_radix(hex_id.trim_start_matches("0x"), 16)
            .map_err(|_| GateError::decode(format!("invalid chain id: {}", hex_id)))
    }
}

impl MembershipQuery for RpcClient {
    fn balance_of<'a>(&'a self, lock: &'a Address, owner: &'a Address) -> QueryFuture<'a> {
        Box::pin(self.get_lock_balance(lock, owner))
    }
}
