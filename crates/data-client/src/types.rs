use bytes::Bytes;
use futures::future::BoxFuture;
use futures::stream::BoxStream;
use std::fmt::Debug;
use tao_primitives::{BlockNumber, BlockRef};


#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BlockStreamRequest {
    pub first_block: BlockNumber,
    pub parent_block_hash: Option<String>
}


pub enum BlockStreamResponse {
    /// JSON encoded blocks, one per item, in ascending order
    Stream {
        finalized_head: Option<BlockRef>,
        blocks: BoxStream<'static, anyhow::Result<Bytes>>
    },
    /// Requested position is above the available head
    Empty {
        finalized_head: Option<BlockRef>
    }
}


pub trait DataClient: Debug + Send + Sync {
    fn stream(&self, req: BlockStreamRequest) -> BoxFuture<'_, anyhow::Result<BlockStreamResponse>>;
}
