//! Thin HTTP client for the node API.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use accredit_core::Address;

/// Header the node reads the caller identity from.
const CALLER_HEADER: &str = "x-caller";

#[derive(Deserialize)]
struct ErrorResponse {
    code: String,
    error: String,
}

pub struct NodeClient {
    endpoint: String,
    caller: Option<Address>,
    http: reqwest::Client,
}

impl NodeClient {
    pub fn new(endpoint: &str, caller: Option<Address>) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            caller,
            http: reqwest::Client::new(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/api/v1/{}", self.endpoint, path.trim_start_matches('/'))
    }

    /// The caller identity, required by every mutating route.
    pub fn caller(&self) -> anyhow::Result<Address> {
        self.caller
            .ok_or_else(|| anyhow::anyhow!("this command needs --caller <ADDRESS>"))
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> anyhow::Result<T> {
        self.send(self.http.get(self.url(path))).await
    }

    pub async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> anyhow::Result<T> {
        let mut req = self.http.post(self.url(path));
        if let Some(body) = body {
            req = req.json(body);
        }
        self.send(req).await
    }

    pub async fn put<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> anyhow::Result<T> {
        self.send(self.http.put(self.url(path)).json(body)).await
    }

    async fn send<T: DeserializeOwned>(&self, mut req: reqwest::RequestBuilder) -> anyhow::Result<T> {
        if let Some(caller) = &self.caller {
            req = req.header(CALLER_HEADER, caller.to_hex());
        }

        let resp = req.send().await.map_err(|e| {
            anyhow::anyhow!(
                "could not reach node at {}: {}\nIs the node running? Start it with: accredit-node",
                self.endpoint,
                e
            )
        })?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp.json().await?);
        }
        if let Ok(err) = resp.json::<ErrorResponse>().await {
            anyhow::bail!("{} (HTTP {}): {}", err.code, status, err.error);
        }
        anyhow::bail!("request failed (HTTP {})", status)
    }
}
