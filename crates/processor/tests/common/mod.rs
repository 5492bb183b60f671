#![allow(dead_code)]

use codec::Encode;
use futures::future::BoxFuture;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tao_codec::VersionedCodec;
use tao_data::substrate::{Block, BlockHeader, Call, Event};
use tao_primitives::{BlockNumber, BlockRef, Netuid};
use tao_processor::chain_state::ChainState;
use tao_processor::processor::{BlockProcessor, ProcessorSettings};
use tao_processor::ss58::{AddressEncoder, Ss58};
use tao_store::{BlockTx, Storage};


pub const ALICE: [u8; 32] = [1; 32];
pub const BOB: [u8; 32] = [2; 32];
pub const CHARLIE: [u8; 32] = [3; 32];
pub const DAVE: [u8; 32] = [4; 32];


pub fn address(account: &[u8; 32]) -> String {
    Ss58::default().encode(account)
}


/// Serves `SubtensorModule.Burn` values, absent netuids read as no value
#[derive(Default)]
pub struct MockChainState {
    burn: Mutex<HashMap<Netuid, u64>>,
    reads: AtomicUsize
}


impl MockChainState {
    pub fn set_burn(&self, netuid: Netuid, value: u64) {
        self.burn.lock().unwrap().insert(netuid, value);
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}


impl ChainState for MockChainState {
    fn storage<'a>(&'a self, _block_hash: &'a str, key: &'a [u8]) -> BoxFuture<'a, anyhow::Result<Option<Vec<u8>>>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let netuid = u16::from_le_bytes([key[32], key[33]]);
        let value = self.burn.lock().unwrap().get(&netuid).map(|v| v.encode());
        Box::pin(async move { Ok(value) })
    }
}


pub type TestProcessor = BlockProcessor<Arc<MockChainState>, Ss58>;


pub fn processor(chain: Arc<MockChainState>, tracked_netuids: Vec<Netuid>) -> TestProcessor {
    processor_with_interval(chain, tracked_netuids, 50).unwrap()
}


pub fn processor_with_interval(
    chain: Arc<MockChainState>,
    tracked_netuids: Vec<Netuid>,
    resync_interval: u64
) -> anyhow::Result<TestProcessor> {
    BlockProcessor::new(
        VersionedCodec::new(),
        chain,
        Ss58::default(),
        ProcessorSettings {
            resync_interval,
            tracked_netuids
        }
    )
}


pub fn header(height: BlockNumber) -> BlockHeader {
    BlockHeader {
        height,
        hash: format!("0x{:064x}", height),
        parent_hash: format!("0x{:064x}", height.saturating_sub(1)),
        spec_name: Some("node-subtensor".to_string()),
        spec_version: 120,
        timestamp: 1_680_000_000_000 + height * 12_000
    }
}


pub fn block(height: BlockNumber, events: Vec<Event>) -> Block {
    Block {
        header: header(height),
        events,
        calls: Vec::new()
    }
}


pub fn event(id: &str, name: &str, args: Vec<u8>) -> Event {
    Event {
        id: id.to_string(),
        index: 0,
        name: name.to_string(),
        args,
        extrinsic_index: None
    }
}


pub fn transfer(id: &str, from: [u8; 32], to: [u8; 32], amount: u64) -> Event {
    event(id, "Balances.Transfer", (from, to, amount).encode())
}


pub fn call(id: &str, name: &str, args: Vec<u8>, success: bool) -> Call {
    Call {
        id: id.to_string(),
        extrinsic_index: 0,
        address: Vec::new(),
        name: name.to_string(),
        args,
        success
    }
}


pub async fn process(processor: &mut TestProcessor, storage: &dyn Storage, block: &Block) -> anyhow::Result<()> {
    let mut tx = BlockTx::new(storage, BlockRef::new(block.header.height, &block.header.hash));
    processor.process_block(block, &mut tx).await?;
    tx.commit()?;
    processor.confirm();
    Ok(())
}
