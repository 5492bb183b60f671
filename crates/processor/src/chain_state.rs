use anyhow::{anyhow, Context};
use futures::future::BoxFuture;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tao_data::{decode_hex, encode_hex};
use tracing::warn;
use url::Url;


/// Read access to chain storage at a given block
pub trait ChainState: Send + Sync {
    fn storage<'a>(&'a self, block_hash: &'a str, key: &'a [u8]) -> BoxFuture<'a, anyhow::Result<Option<Vec<u8>>>>;
}


impl<T: ChainState + ?Sized> ChainState for Arc<T> {
    fn storage<'a>(&'a self, block_hash: &'a str, key: &'a [u8]) -> BoxFuture<'a, anyhow::Result<Option<Vec<u8>>>> {
        self.as_ref().storage(block_hash, key)
    }
}


/// [ChainState] backed by the node's `state_getStorage` JSON-RPC method
#[derive(Clone)]
pub struct RpcChainState {
    http: reqwest::Client,
    url: Url
}


#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<String>,
    error: Option<RpcError>
}


#[derive(Deserialize, Debug)]
struct RpcError {
    code: i64,
    message: String
}


impl RpcChainState {
    pub fn new(url: Url) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(20))
            .build()
            .context("failed to build http client")?;
        Ok(Self {
            http,
            url
        })
    }

    pub async fn get_storage(&self, block_hash: &str, key: &[u8]) -> anyhow::Result<Option<Vec<u8>>> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "state_getStorage",
            "params": [encode_hex(key), block_hash]
        });

        let retry_schedule = [0, 100, 200, 500, 1000, 2000];
        let mut retry_attempt = 0;
        loop {
            let error = match self.try_get_storage(&body).await {
                Ok(RpcResponse { error: Some(err), .. }) => return Err(anyhow!(
                    "state_getStorage failed with code {}: {}",
                    err.code,
                    err.message
                )),
                Ok(RpcResponse { result: Some(hex), .. }) => {
                    let value = decode_hex(&hex).context("invalid storage value")?;
                    return Ok(Some(value))
                },
                Ok(RpcResponse { result: None, .. }) => return Ok(None),
                Err(err) => err
            };

            if retry_attempt >= retry_schedule.len() {
                return Err(error.context(format!("storage read at block {} failed", block_hash)))
            }

            let pause = retry_schedule[retry_attempt];
            warn!(
                url = %self.url,
                error = ?error,
                "storage read failed, will retry in {} ms",
                pause
            );
            retry_attempt += 1;
            tokio::time::sleep(Duration::from_millis(pause)).await;
        }
    }

    async fn try_get_storage(&self, body: &serde_json::Value) -> anyhow::Result<RpcResponse> {
        let res = self.http.post(self.url.clone()).json(body).send().await?;
        let status = res.status();
        if !status.is_success() {
            let text = res.text().await.unwrap_or_default();
            return Err(anyhow!("got HTTP {}: {}", status.as_u16(), text))
        }
        let response = res.json().await?;
        Ok(response)
    }
}


impl ChainState for RpcChainState {
    fn storage<'a>(&'a self, block_hash: &'a str, key: &'a [u8]) -> BoxFuture<'a, anyhow::Result<Option<Vec<u8>>>> {
        Box::pin(self.get_storage(block_hash, key))
    }
}
