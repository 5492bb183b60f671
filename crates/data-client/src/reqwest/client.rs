use crate::reqwest::lines::LineStream;
use crate::{BlockStreamRequest, BlockStreamResponse, DataClient};
use anyhow::{anyhow, Context};
use futures::future::BoxFuture;
use futures::StreamExt;
use reqwest::{Client, IntoUrl, Request, Response, Url};
use serde_json::json;
use std::error::Error;
use std::fmt::{Debug, Formatter};
use std::future::Future;
use std::io::ErrorKind;
use std::time::Duration;
use tao_primitives::{BlockNumber, BlockRef};
use tracing::{debug, instrument, warn};


pub fn default_http_client() -> anyhow::Result<Client> {
    Client::builder()
        .read_timeout(Duration::from_secs(20))
        .connect_timeout(Duration::from_secs(20))
        .gzip(true)
        .build()
        .context("failed to build http client")
}


/// Event and call names the archive should include into the block stream
#[derive(Clone, Debug, Default)]
pub struct ItemSelection {
    pub events: Vec<String>,
    pub calls: Vec<String>
}


#[derive(Clone)]
pub struct ReqwestDataClient {
    http: Client,
    url: Url,
    selection: ItemSelection
}


impl Debug for ReqwestDataClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestDataClient")
            .field("url", &self.url.as_str())
            .finish()
    }
}


impl ReqwestDataClient {
    pub fn from_url(url: impl IntoUrl, selection: ItemSelection) -> anyhow::Result<Self> {
        let http = default_http_client()?;
        Self::new(http, url, selection)
    }

    pub fn new(http: Client, url: impl IntoUrl, selection: ItemSelection) -> anyhow::Result<Self> {
        Ok(Self {
            http,
            url: url.into_url().context("invalid data source url")?,
            selection
        })
    }

    fn request_body(&self, req: &BlockStreamRequest) -> serde_json::Value {
        let mut body = json!({
            "type": "substrate",
            "fromBlock": req.first_block,
            "fields": {
                "block": {
                    "hash": true,
                    "parentHash": true,
                    "specVersion": true,
                    "timestamp": true
                },
                "event": {
                    "id": true,
                    "name": true,
                    "args": true
                },
                "call": {
                    "id": true,
                    "name": true,
                    "args": true,
                    "success": true
                }
            },
            "events": [{"name": self.selection.events}],
            "calls": [{"name": self.selection.calls}],
            "includeAllBlocks": true
        });

        if let Some(parent_hash) = req.parent_block_hash.as_ref() {
            body["parentBlockHash"] = parent_hash.clone().into();
        }

        body
    }

    #[instrument(level = "debug", skip_all, err(Debug), fields(
        url = %self.url.as_str(),
        first_block = %req.first_block,
        parent_block_hash = %req.parent_block_hash.as_deref().unwrap_or("None")
    ))]
    pub async fn stream(&self, req: BlockStreamRequest) -> anyhow::Result<BlockStreamResponse> {
        let mut url = self.url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("data source url {} can't be a base", self.url))?
            .push("finalized-stream");

        let http_req = self.http
            .post(url)
            .json(&self.request_body(&req))
            .build()?;

        debug!("send request");

        self.with_retries(&http_req, |res| async {
            Ok(match res.status().as_u16() {
                200 => {
                    let finalized_head = extract_finalized_head(&res)?;
                    let blocks = LineStream::new(res.bytes_stream()).boxed();
                    BlockStreamResponse::Stream {
                        finalized_head,
                        blocks
                    }
                },
                204 => {
                    BlockStreamResponse::Empty {
                        finalized_head: extract_finalized_head(&res)?
                    }
                },
                409 => return Err(anyhow!(
                    "block {} is not a child of {}, finalized chain is expected to be stable",
                    req.first_block,
                    req.parent_block_hash.as_deref().unwrap_or("None")
                )),
                status if status < 300 => return Err(
                    anyhow!("unexpected success response status - {}", status)
                ),
                _ => return Err(response_error(res).await)
            })
        }).await
    }

    async fn with_retries<R, F, Fut>(
        &self,
        req: &Request,
        mut cb: F
    ) -> anyhow::Result<R>
    where
        F: FnMut(Response) -> Fut,
        Fut: Future<Output=anyhow::Result<R>>
    {
        let mut retry_attempt = 0;
        let retry_schedule = [0, 100, 200, 500, 1000, 2000];
        loop {
            let attempt = req.try_clone().ok_or_else(|| anyhow!("request body is not cloneable"))?;
            let retry_error = match self.http.execute(attempt).await {
                Ok(res) => match res.status().as_u16() {
                    429 | 502 | 503 | 504 | 524 => response_error(res).await,
                    _ => match cb(res).await {
                        Ok(res) => return Ok(res),
                        Err(err) => if is_retryable(err.as_ref()) {
                            err
                        } else {
                            return Err(err)
                        }
                    }
                },
                Err(err) if err.is_timeout() || err.is_connect() || err.is_request() => {
                    anyhow!(err)
                },
                Err(err) => return Err(err.into())
            };

            if retry_attempt >= retry_schedule.len() {
                return Err(retry_error)
            }

            let pause = retry_schedule[retry_attempt];

            warn!(
                url = %req.url().as_str(),
                error = ?retry_error,
                "http request failed, will retry in {} ms",
                pause
            );

            retry_attempt += 1;
            futures_timer::Delay::new(Duration::from_millis(pause)).await;
        }
    }
}


fn extract_finalized_head(res: &Response) -> anyhow::Result<Option<BlockRef>> {
    let number = res.headers()
        .get("x-sqd-finalized-head-number")
        .map(|v| -> anyhow::Result<BlockNumber> {
            Ok(v.to_str()?.parse()?)
        })
        .transpose()
        .context("invalid x-sqd-finalized-head-number header")?;

    let hash = res.headers()
        .get("x-sqd-finalized-head-hash")
        .map(|v| v.to_str())
        .transpose()
        .context("invalid x-sqd-finalized-head-hash header")?;

    match (number, hash) {
        (Some(number), Some(hash)) => Ok(Some(BlockRef::new(number, hash))),
        (None, None) => Ok(None),
        (Some(_), None) => Err(anyhow!(
            "x-sqd-finalized-head-number header is present, but x-sqd-finalized-head-hash is not"
        )),
        (None, Some(_)) => Err(anyhow!(
            "x-sqd-finalized-head-hash header is present, but x-sqd-finalized-head-number is not"
        ))
    }
}


async fn response_error(response: Response) -> anyhow::Error {
    let status = response.status().as_u16();
    if let Ok(text) = response.text().await {
        anyhow!("got HTTP {}: {}", status, text)
    } else {
        anyhow!("got HTTP {}", status)
    }
}


pub(crate) fn is_retryable(err: &(dyn Error + 'static)) -> bool {
    if let Some(io_err) = err.downcast_ref::<std::io::Error>() {
        is_retryable_io(io_err)
    } else {
        err.source().map(is_retryable).unwrap_or(false)
    }
}


fn is_retryable_io(err: &std::io::Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::ConnectionReset | ErrorKind::ConnectionAborted | ErrorKind::TimedOut
    )
}


impl DataClient for ReqwestDataClient {
    fn stream(&self, req: BlockStreamRequest) -> BoxFuture<'_, anyhow::Result<BlockStreamResponse>> {
        Box::pin(self.stream(req))
    }
}
