use crate::types::{DataEvent, DataSource};
use anyhow::{anyhow, Context};
use bytes::Bytes;
use futures::future::BoxFuture;
use futures::stream::BoxStream;
use futures::{FutureExt, Stream, StreamExt};
use std::future::Future;
use std::pin::Pin;
use std::task::Poll;
use std::time::Duration;
use tao_data_client::{BlockStreamRequest, BlockStreamResponse, DataClient};
use tao_primitives::{Block, BlockNumber, BlockRef};
use tokio::time::Sleep;
use tracing::warn;


struct Endpoint<C> {
    client: C,
    state: EndpointState,
    error_counter: usize
}


enum EndpointState {
    Ready,
    Req {
        req: BlockStreamRequest,
        future: BoxFuture<'static, anyhow::Result<BlockStreamResponse>>
    },
    Stream {
        req: BlockStreamRequest,
        blocks: BoxStream<'static, anyhow::Result<Bytes>>
    },
    Backoff(Pin<Box<Sleep>>)
}


/// Sequential finalized block stream over a set of equivalent endpoints.
///
/// All endpoints are polled, the first one to deliver the next expected block wins.
/// Blocks are guaranteed to be gap-free and linked by parent hash.
pub struct StandardDataSource<C, F> {
    endpoints: Vec<Endpoint<C>>,
    state: DataSourceState<F>
}


struct DataSourceState<F> {
    parse: F,
    finalized_head: Option<BlockRef>,
    position: BlockStreamRequest,
    head_poll_interval: Duration
}


impl<F> DataSourceState<F> {
    fn poll_endpoint<B, C>(
        &mut self,
        ep: &mut Endpoint<C>,
        cx: &mut std::task::Context<'_>
    ) -> Poll<DataEvent<B>>
    where
        B: Block,
        C: DataClient + Clone + 'static,
        F: Fn(Bytes) -> anyhow::Result<B>
    {
        loop {
            match &mut ep.state {
                EndpointState::Ready => {
                    let req = self.position.clone();
                    let client = ep.client.clone();
                    let future = {
                        let req = req.clone();
                        async move { client.stream(req).await }.boxed()
                    };
                    ep.state = EndpointState::Req {
                        req,
                        future
                    }
                },
                EndpointState::Req { req, future } => {
                    match future.poll_unpin(cx) {
                        Poll::Ready(Ok(BlockStreamResponse::Stream { finalized_head, blocks })) => {
                            ep.error_counter = 0;
                            ep.state = EndpointState::Stream {
                                req: req.clone(),
                                blocks
                            };
                            if let Some(head) = self.on_new_finalized_head(finalized_head) {
                                return Poll::Ready(DataEvent::FinalizedHead(head))
                            }
                        },
                        Poll::Ready(Ok(BlockStreamResponse::Empty { finalized_head })) => {
                            ep.error_counter = 0;
                            ep.state = EndpointState::Backoff(
                                Box::pin(tokio::time::sleep(self.head_poll_interval))
                            );
                            if let Some(head) = self.on_new_finalized_head(finalized_head) {
                                return Poll::Ready(DataEvent::FinalizedHead(head))
                            }
                            return Poll::Ready(DataEvent::MaybeOnHead)
                        },
                        Poll::Ready(Err(err)) => ep.on_error(err),
                        Poll::Pending => return Poll::Pending
                    }
                },
                EndpointState::Stream { req, blocks } => {
                    if req.first_block < self.position.first_block {
                        // another endpoint is ahead, this stream will only deliver duplicates
                        ep.state = EndpointState::Ready;
                        continue
                    }
                    match blocks.poll_next_unpin(cx) {
                        Poll::Ready(None) => {
                            ep.error_counter = 0;
                            ep.state = EndpointState::Ready;
                        },
                        Poll::Ready(Some(Ok(bytes))) => {
                            let parsed = (self.parse)(bytes).context("failed to parse a block");
                            match parsed.and_then(|block| self.accept_new_block(block)) {
                                Ok(Some(block)) => {
                                    req.first_block = self.position.first_block;
                                    return Poll::Ready(DataEvent::Block(block))
                                },
                                Ok(None) => {},
                                Err(err) => ep.on_error(err)
                            }
                        },
                        Poll::Ready(Some(Err(err))) => ep.on_error(err),
                        Poll::Pending => return Poll::Pending
                    }
                },
                EndpointState::Backoff(sleep) => {
                    match sleep.as_mut().poll(cx) {
                        Poll::Ready(_) => ep.state = EndpointState::Ready,
                        Poll::Pending => return Poll::Pending
                    }
                }
            }
        }
    }

    fn accept_new_block<B: Block>(&mut self, block: B) -> anyhow::Result<Option<B>> {
        if block.number() < self.position.first_block {
            return Ok(None)
        }

        if block.number() > self.position.first_block {
            return Err(anyhow!(
                "data source skipped blocks: expected {}, but got {}",
                self.position.first_block,
                block.number()
            ))
        }

        if let Some(parent_hash) = self.position.parent_block_hash.as_mut() {
            if block.parent_hash() != parent_hash.as_str() {
                return Err(anyhow!(
                    "chain continuity was violated between {} and {}#{}",
                    parent_hash,
                    block.number(),
                    block.hash()
                ))
            }
            parent_hash.clear();
            parent_hash.push_str(block.hash());
        } else {
            self.position.parent_block_hash = Some(block.hash().to_string());
        }
        self.position.first_block = block.number() + 1;

        Ok(Some(block))
    }

    fn on_new_finalized_head(&mut self, new_head: Option<BlockRef>) -> Option<BlockRef> {
        let new_head = new_head?;

        let is_behind = self.finalized_head
            .as_ref()
            .map_or(false, |current| current.number >= new_head.number);

        if is_behind {
            return None
        }

        self.finalized_head = Some(new_head.clone());
        Some(new_head)
    }
}


impl<C: DataClient> Endpoint<C> {
    fn on_error(&mut self, error: anyhow::Error) {
        let backoff = [0, 100, 200, 500, 1000, 2000, 5000, 10000];
        let pause = backoff[std::cmp::min(self.error_counter, backoff.len() - 1)];
        if pause > 0 {
            warn!(
                error =? error,
                data_source =? self.client,
                "data ingestion error, will disable the data source for {} ms",
                pause
            )
        } else {
            warn!(
                error =? error,
                data_source =? self.client,
                "data ingestion error",
            )
        }
        self.state = if pause > 0 {
            let sleep = tokio::time::sleep(Duration::from_millis(pause));
            EndpointState::Backoff(Box::pin(sleep))
        } else {
            EndpointState::Ready
        };
        self.error_counter += 1;
    }
}


impl<B, C, F> StandardDataSource<C, F>
where
    B: Block,
    C: DataClient + Clone + 'static,
    F: Fn(Bytes) -> anyhow::Result<B>
{
    pub fn new(clients: Vec<C>, parse: F) -> Self {
        let endpoints = clients.into_iter().map(|client| {
            Endpoint {
                client,
                error_counter: 0,
                state: EndpointState::Ready
            }
        }).collect();

        let state = DataSourceState {
            parse,
            finalized_head: None,
            position: BlockStreamRequest {
                first_block: 0,
                parent_block_hash: None
            },
            head_poll_interval: Duration::from_secs(2)
        };

        Self {
            endpoints,
            state
        }
    }

    fn poll_next_event(&mut self, cx: &mut std::task::Context<'_>) -> Poll<DataEvent<B>> {
        for ep in self.endpoints.iter_mut() {
            let event = self.state.poll_endpoint(ep, cx);
            if event.is_ready() {
                return event
            }
        }
        Poll::Pending
    }
}


impl<B, C, F> Stream for StandardDataSource<C, F>
where
    B: Block,
    C: DataClient + Clone + Unpin + 'static,
    F: Fn(Bytes) -> anyhow::Result<B> + Unpin
{
    type Item = DataEvent<B>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut std::task::Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().poll_next_event(cx).map(Some)
    }
}


impl<B, C, F> DataSource for StandardDataSource<C, F>
where
    B: Block,
    C: DataClient + Clone + Unpin + 'static,
    F: Fn(Bytes) -> anyhow::Result<B> + Unpin
{
    type Block = B;

    fn set_position(&mut self, next_block: BlockNumber, parent_block_hash: Option<String>) {
        self.state.position.first_block = next_block;
        self.state.position.parent_block_hash = parent_block_hash;
        self.state.finalized_head = None;
        for ep in self.endpoints.iter_mut() {
            ep.state = EndpointState::Ready;
        }
    }

    fn get_next_block(&self) -> BlockNumber {
        self.state.position.first_block
    }
}
