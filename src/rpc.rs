use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};

/// Minimal Ethereum JSON-RPC client: read-only `eth_call` against the latest block.
pub struct RpcClient {
    api_url: String,
    client: reqwest::Client,
    next_id: AtomicU64,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<String>,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

impl RpcClient {
    pub fn new(api_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self::with_client(api_url, client))
    }

    pub fn with_client(api_url: &str, client: reqwest::Client) -> Self {
        Self {
            api_url: crate::utils::remove_trailing_slash(api_url),
            client,
            next_id: AtomicU64::new(1),
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn build_call_body(&self, to: &str, data: &[u8]) -> serde_json::Value {
        json!({
            "jsonrpc": "2.0",
            "id": self.next_id.fetch_add(1, Ordering::Relaxed),
            "method": "eth_call",
            "params": [
                { "to": to, "data": format!("0x{}", hex::encode(data)) },
                "latest"
            ],
        })
    }

    /// Execute a read-only call of `data` on contract `to` and return the raw result bytes.
    pub async fn eth_call(&self, to: &str, data: &[u8]) -> Result<Vec<u8>> {
        let body = self.build_call_body(to, data);
        let response = self.client.post(&self.api_url).json(&body).send().await?;
        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(anyhow!("rate_limited"));
        }
        let text = response.text().await?;
        let parsed: RpcResponse = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Invalid JSON-RPC response from {}: {}", self.api_url, e))?;
        parse_call_result(parsed)
    }
}

fn parse_call_result(response: RpcResponse) -> Result<Vec<u8>> {
    if let Some(err) = response.error {
        return Err(anyhow!("eth_call failed ({}): {}", err.code, err.message));
    }
    let result = response
        .result
        .ok_or_else(|| anyhow!("eth_call returned neither result nor error"))?;
    let hex_str = result.strip_prefix("0x").unwrap_or(&result);
    hex::decode(hex_str).map_err(|e| anyhow!("eth_call returned invalid hex: {}", e))
}
