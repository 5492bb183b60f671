use futures::Stream;
use tao_primitives::{Block, BlockNumber, BlockRef};


pub enum DataEvent<B> {
    FinalizedHead(BlockRef),
    Block(B),
    /// The stream caught up with the head known to the endpoint
    MaybeOnHead
}


pub trait DataSource: Stream<Item = DataEvent<Self::Block>> + Unpin {
    type Block: Block;

    fn set_position(&mut self, next_block: BlockNumber, parent_block_hash: Option<String>);

    fn get_next_block(&self) -> BlockNumber;
}
