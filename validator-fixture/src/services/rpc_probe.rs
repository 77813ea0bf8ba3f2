//! JSON-RPC liveness probe
//!
//! Issues a single `getVersion` call against the validator's HTTP endpoint.
//! Only success or failure matters to the waiter; the reported version is
//! kept as detail for the "RPC is ready" log line.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use url::Url;

use crate::error::{FixtureError, FixtureResult};
use crate::traits::LivenessProbe;
use shared::{NotReadyReason, ReadinessCheck, SharedError};

#[derive(Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'a str,
    id: u64,
    method: &'a str,
}

#[derive(Deserialize)]
struct JsonRpcResponse<T> {
    result: Option<T>,
    error: Option<JsonRpcErrorObject>,
}

#[derive(Deserialize)]
struct JsonRpcErrorObject {
    code: i64,
    message: String,
}

/// Version information reported by the validator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcVersion {
    #[serde(rename = "solana-core")]
    pub solana_core: String,
    #[serde(rename = "feature-set", default)]
    pub feature_set: Option<u64>,
}

impl fmt::Display for RpcVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.feature_set {
            Some(feature_set) => write!(f, "solana-core {} (feature-set {})", self.solana_core, feature_set),
            None => write!(f, "solana-core {}", self.solana_core),
        }
    }
}

/// Liveness probe backed by a JSON-RPC `getVersion` request
pub struct RpcLivenessProbe {
    client: Client,
    url: Url,
}

impl RpcLivenessProbe {
    /// Create a probe whose individual requests give up after `request_timeout`
    pub fn new(url: Url, request_timeout: Duration) -> FixtureResult<Self> {
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| FixtureError::config(format!("http client: {e}")))?;

        Ok(Self { client, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl LivenessProbe for RpcLivenessProbe {
    async fn check(&self) -> ReadinessCheck {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id: 1,
            method: "getVersion",
        };

        let response = match self.client.post(self.url.clone()).json(&request).send().await {
            Ok(response) => response,
            Err(e) => return ReadinessCheck::NotReady(classify(&e)),
        };

        let status = response.status();
        if !status.is_success() {
            return ReadinessCheck::NotReady(NotReadyReason::Network(format!("HTTP {status}")));
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return ReadinessCheck::NotReady(classify(&e)),
        };

        match decode_version(&body) {
            Ok(version) => ReadinessCheck::Ready {
                detail: version.to_string(),
            },
            Err(e) => ReadinessCheck::NotReady(NotReadyReason::Malformed(e.to_string())),
        }
    }

    fn endpoint(&self) -> String {
        self.url.to_string()
    }
}

/// Decode a `getVersion` response body
pub(crate) fn decode_version(body: &str) -> FixtureResult<RpcVersion> {
    let response: JsonRpcResponse<RpcVersion> = serde_json::from_str(body)?;

    if let Some(error) = response.error {
        return Err(SharedError::ProtocolError {
            message: format!("JSON-RPC error {}: {}", error.code, error.message),
        }
        .into());
    }

    response.result.ok_or_else(|| {
        SharedError::ProtocolError {
            message: "response has neither result nor error".to_string(),
        }
        .into()
    })
}

fn classify(err: &reqwest::Error) -> NotReadyReason {
    if err.is_timeout() {
        NotReadyReason::Timeout
    } else if err.is_connect() {
        NotReadyReason::ConnectionRefused
    } else if err.is_decode() {
        NotReadyReason::Malformed(err.to_string())
    } else {
        NotReadyReason::Network(err.to_string())
    }
}
