mod common;

use codec::Encode;
use common::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tao_codec::{MalformedPayload, Payload, UnsupportedVersion};
use tao_primitives::{BlockNumber, BlockRef, Netuid};
use tao_store::{
    BlockTx, Burn, ChangeSet, Coldkey, EntityKind, EntityStore, Hotkey, MemoryStorage, NeuronRegistered, Storage,
    Transfer
};


/// Rejects the first commit
#[derive(Default)]
struct FailingOnceStorage {
    inner: MemoryStorage,
    failed: AtomicBool
}


impl Storage for FailingOnceStorage {
    fn get(&self, kind: EntityKind, id: &str) -> anyhow::Result<Option<Vec<u8>>> {
        self.inner.get(kind, id)
    }

    fn find_latest(&self, kind: EntityKind, netuid: Netuid) -> anyhow::Result<Option<(BlockNumber, String)>> {
        self.inner.find_latest(kind, netuid)
    }

    fn count(&self, kind: EntityKind) -> anyhow::Result<usize> {
        self.inner.count(kind)
    }

    fn get_cursor(&self) -> anyhow::Result<Option<BlockRef>> {
        self.inner.get_cursor()
    }

    fn commit(&self, changes: ChangeSet) -> anyhow::Result<()> {
        if !self.failed.swap(true, Ordering::SeqCst) {
            anyhow::bail!("store unavailable")
        }
        self.inner.commit(changes)
    }
}


fn balance(storage: &dyn Storage, account: &[u8; 32]) -> i128 {
    let tx = BlockTx::new(storage, BlockRef::default());
    tx.get::<Coldkey>(&address(account)).unwrap().map_or(0, |c| c.balance)
}


fn burn_rows(storage: &dyn Storage) -> usize {
    storage.count(EntityKind::Burn).unwrap()
}


#[tokio::test]
async fn transfer_moves_balance_and_records_row() {
    let storage = MemoryStorage::new();
    let mut processor = processor(Arc::new(MockChainState::default()), vec![]);

    let block = block(1000, vec![transfer("1000-0", ALICE, BOB, 500)]);
    process(&mut processor, &storage, &block).await.unwrap();

    assert_eq!(balance(&storage, &ALICE), -500);
    assert_eq!(balance(&storage, &BOB), 500);

    let tx = BlockTx::new(&storage as &dyn Storage, BlockRef::default());
    let row: Transfer = tx.get("1000-0").unwrap().unwrap();
    assert_eq!(row.amount, 500);
    assert_eq!(row.block_num, 1000);
    assert_eq!(row.block_hash, block.header.hash);
    assert_eq!(row.from, address(&ALICE));
    assert_eq!(row.to, address(&BOB));
    assert_eq!(storage.count(EntityKind::Transfer).unwrap(), 1);

    let alice: Coldkey = tx.get(&address(&ALICE)).unwrap().unwrap();
    assert_eq!(alice.block_num, 1000);
}


#[tokio::test]
async fn balances_are_conserved() {
    let storage = MemoryStorage::new();
    let mut processor = processor(Arc::new(MockChainState::default()), vec![]);
    let accounts = [ALICE, BOB, CHARLIE, DAVE];

    for height in 1..40u64 {
        let events = (0..3u64).map(|i| {
            let from = accounts[((height + i) % 4) as usize];
            let to = accounts[((height * 3 + i + 1) % 4) as usize];
            transfer(&format!("{}-{}", height, i), from, to, height * 1000 + i)
        }).collect();
        process(&mut processor, &storage, &block(height, events)).await.unwrap();
    }

    let total: i128 = accounts.iter().map(|a| balance(&storage, a)).sum();
    assert_eq!(total, 0);
    assert_eq!(storage.count(EntityKind::Transfer).unwrap(), 39 * 3);
}


#[tokio::test]
async fn replayed_block_does_not_duplicate_transfers() {
    let storage = MemoryStorage::new();
    let mut processor = processor(Arc::new(MockChainState::default()), vec![]);

    let block = block(7, vec![
        transfer("7-0", ALICE, BOB, 10),
        transfer("7-1", BOB, CHARLIE, 5)
    ]);
    process(&mut processor, &storage, &block).await.unwrap();
    process(&mut processor, &storage, &block).await.unwrap();

    assert_eq!(storage.count(EntityKind::Transfer).unwrap(), 2);
    let tx = BlockTx::new(&storage as &dyn Storage, BlockRef::default());
    assert!(tx.get::<Transfer>("7-0").unwrap().is_some());
    assert!(tx.get::<Transfer>("7-1").unwrap().is_some());
}


#[tokio::test]
async fn transfers_apply_in_event_order() {
    let storage = MemoryStorage::new();
    let mut processor = processor(Arc::new(MockChainState::default()), vec![]);
    let header = header(3);

    let mut tx = BlockTx::new(&storage as &dyn Storage, BlockRef::new(3, &header.hash));
    tx.save(&Coldkey {
        id: address(&ALICE),
        balance: 1000,
        block_num: 2
    }).unwrap();

    processor.process_event(&header, &transfer("3-0", ALICE, BOB, 300), &mut tx).unwrap();
    let alice: Coldkey = tx.get_or_create(&address(&ALICE)).unwrap();
    assert_eq!(alice.balance, 1000 - 300);

    processor.process_event(&header, &transfer("3-1", ALICE, CHARLIE, 200), &mut tx).unwrap();
    let alice: Coldkey = tx.get_or_create(&address(&ALICE)).unwrap();
    assert_eq!(alice.balance, 1000 - 300 - 200);

    tx.commit().unwrap();
    assert_eq!(balance(&storage, &ALICE), 500);
    assert_eq!(balance(&storage, &BOB), 300);
    assert_eq!(balance(&storage, &CHARLIE), 200);
}


#[tokio::test]
async fn self_transfer_keeps_balance() {
    let storage = MemoryStorage::new();
    let mut processor = processor(Arc::new(MockChainState::default()), vec![]);
    process(&mut processor, &storage, &block(1, vec![transfer("1-0", ALICE, ALICE, 42)])).await.unwrap();
    assert_eq!(balance(&storage, &ALICE), 0);
}


#[tokio::test]
async fn anomalous_burn_is_dropped() {
    let storage = MemoryStorage::new();
    let chain = Arc::new(MockChainState::default());
    let mut processor = processor(chain.clone(), vec![1]);

    chain.set_burn(1, 5);
    process(&mut processor, &storage, &block(50, vec![])).await.unwrap();
    assert_eq!(burn_rows(&storage), 1);

    chain.set_burn(1, 10_000_000_000_000_000_000);
    process(&mut processor, &storage, &block(100, vec![])).await.unwrap();
    assert_eq!(burn_rows(&storage), 1);

    // the cache still holds 5, so going back to it is not a change
    chain.set_burn(1, 5);
    process(&mut processor, &storage, &block(150, vec![])).await.unwrap();
    assert_eq!(burn_rows(&storage), 1);

    chain.set_burn(1, 9_999_999_999_999_999_999);
    process(&mut processor, &storage, &block(200, vec![])).await.unwrap();
    assert_eq!(burn_rows(&storage), 2);

    let tx = BlockTx::new(&storage as &dyn Storage, BlockRef::default());
    let latest: Burn = tx.find_latest(1).unwrap().unwrap();
    assert_eq!(latest.id, "200-1");
    assert_eq!(latest.amount, 9_999_999_999_999_999_999);
}


#[tokio::test]
async fn unchanged_burn_is_recorded_once() {
    let storage = MemoryStorage::new();
    let chain = Arc::new(MockChainState::default());
    chain.set_burn(11, 1_000);
    let mut processor = processor(chain.clone(), vec![11]);

    for i in 1..=100 {
        process(&mut processor, &storage, &block(i * 50, vec![])).await.unwrap();
    }

    assert_eq!(chain.reads(), 100);
    assert_eq!(burn_rows(&storage), 1);
}


#[tokio::test]
async fn resync_only_runs_on_interval() {
    let storage = MemoryStorage::new();
    let chain = Arc::new(MockChainState::default());
    let mut processor = processor(chain.clone(), vec![1, 3, 11, 21]);

    for height in 1..50 {
        process(&mut processor, &storage, &block(height, vec![])).await.unwrap();
    }
    assert_eq!(chain.reads(), 0);

    // absent storage values fall back to the default burn
    process(&mut processor, &storage, &block(50, vec![])).await.unwrap();
    assert_eq!(chain.reads(), 4);
    assert_eq!(burn_rows(&storage), 4);

    let tx = BlockTx::new(&storage as &dyn Storage, BlockRef::default());
    let row: Burn = tx.get("50-21").unwrap().unwrap();
    assert_eq!(row.amount, 1_000_000_000);
    assert_eq!(row.netuid, 21);
}


#[tokio::test]
async fn cache_is_loaded_from_store_once() {
    let storage = MemoryStorage::new();
    {
        let mut tx = BlockTx::new(&storage as &dyn Storage, BlockRef::new(10, "0x0a"));
        tx.save(&Burn {
            id: "10-3".to_string(),
            block_num: 10,
            timestamp: 0,
            amount: 7,
            netuid: 3
        }).unwrap();
        tx.commit().unwrap();
    }

    let chain = Arc::new(MockChainState::default());
    chain.set_burn(3, 7);
    let mut processor = processor(chain, vec![3]);

    for i in 1..=5 {
        process(&mut processor, &storage, &block(i * 50, vec![])).await.unwrap();
    }

    assert_eq!(processor.cache().loads(), 1);
    assert_eq!(burn_rows(&storage), 1);
}


#[tokio::test]
async fn difficulty_set_is_recorded_unconditionally() {
    let storage = MemoryStorage::new();
    let mut processor = processor(Arc::new(MockChainState::default()), vec![]);

    let difficulty = |id: &str, value: u64| {
        event(id, Payload::DifficultySet.name(), (21u16, value).encode())
    };

    process(&mut processor, &storage, &block(77, vec![
        difficulty("77-0", 10_000_000_000),
        difficulty("77-1", 10_000_000_000)
    ])).await.unwrap();

    assert_eq!(burn_rows(&storage), 2);
    let tx = BlockTx::new(&storage as &dyn Storage, BlockRef::default());
    let row: Burn = tx.get("77-77-0").unwrap().unwrap();
    assert_eq!(row.netuid, 21);
    assert_eq!(row.amount, 10_000_000_000);
    assert_eq!(row.block_num, 77);
    assert!(tx.find_latest::<Burn>(21).unwrap().is_some());
}


#[tokio::test]
async fn neuron_registration_creates_hotkey() {
    let storage = MemoryStorage::new();
    let mut processor = processor(Arc::new(MockChainState::default()), vec![]);

    let registered = event(
        "12-4",
        Payload::NeuronRegistered.name(),
        (3u16, 17u16, DAVE).encode()
    );
    process(&mut processor, &storage, &block(12, vec![registered])).await.unwrap();

    let tx = BlockTx::new(&storage as &dyn Storage, BlockRef::default());
    let hotkey: Hotkey = tx.get(&address(&DAVE)).unwrap().unwrap();
    let row: NeuronRegistered = tx.get("12-4").unwrap().unwrap();
    assert_eq!(row.netuid, 3);
    assert_eq!(row.uid, 17);
    assert_eq!(row.hotkey, hotkey.id);
    assert_eq!(row.block_num, 12);
}


#[tokio::test]
async fn observed_payloads_do_not_write() {
    let storage = MemoryStorage::new();
    let mut processor = processor(Arc::new(MockChainState::default()), vec![]);

    let mut block = block(9, vec![
        event("9-0", Payload::WeightsSet.name(), (1u16, 2u16).encode()),
        event("9-1", Payload::StakeAdded.name(), (BOB, 100u64).encode()),
        event("9-2", "System.ExtrinsicSuccess", vec![0xff])
    ]);
    block.calls.push(call("9-000001", Payload::AddStake.name(), (BOB, 100u64).encode(), true));
    block.calls.push(call("9-000002", Payload::AddStake.name(), vec![0xff], false));

    process(&mut processor, &storage, &block).await.unwrap();

    for kind in EntityKind::ALL {
        assert_eq!(storage.count(kind).unwrap(), 0, "{} rows", kind);
    }
    assert_eq!(storage.get_cursor().unwrap().map(|c| c.number), Some(9));
}


#[tokio::test]
async fn unknown_spec_version_is_fatal() {
    let storage = MemoryStorage::new();
    let mut processor = processor(Arc::new(MockChainState::default()), vec![]);

    let mut block = block(5, vec![transfer("5-0", ALICE, BOB, 1)]);
    block.header.spec_version = 119;

    let err = process(&mut processor, &storage, &block).await.unwrap_err();
    assert_eq!(
        err.downcast_ref::<UnsupportedVersion>(),
        Some(&UnsupportedVersion {
            payload: Payload::BalancesTransfer,
            spec_version: 119
        })
    );
    assert_eq!(storage.get_cursor().unwrap(), None);
    assert_eq!(storage.count(EntityKind::Coldkey).unwrap(), 0);
}


#[tokio::test]
async fn malformed_payload_is_fatal() {
    let storage = MemoryStorage::new();
    let mut processor = processor(Arc::new(MockChainState::default()), vec![]);

    let mut args = (ALICE, BOB, 1u64).encode();
    args.push(0);
    let block = block(6, vec![
        transfer("6-0", ALICE, BOB, 1),
        event("6-1", Payload::BalancesTransfer.name(), args)
    ]);

    let err = process(&mut processor, &storage, &block).await.unwrap_err();
    assert!(err.downcast_ref::<MalformedPayload>().is_some());
    assert_eq!(storage.count(EntityKind::Transfer).unwrap(), 0);
}


#[tokio::test]
async fn retried_block_after_failed_commit_records_burn() {
    let storage = FailingOnceStorage::default();
    let chain = Arc::new(MockChainState::default());
    chain.set_burn(1, 777);
    let mut processor = processor(chain, vec![1]);

    let resync = block(50, vec![]);
    assert!(process(&mut processor, &storage, &resync).await.is_err());
    assert_eq!(burn_rows(&storage), 0);

    process(&mut processor, &storage, &resync).await.unwrap();
    assert_eq!(burn_rows(&storage), 1);

    let tx = BlockTx::new(&storage as &dyn Storage, BlockRef::default());
    let row: Burn = tx.get("50-1").unwrap().unwrap();
    assert_eq!(row.amount, 777);

    // the confirmed value suppresses the next identical read
    process(&mut processor, &storage, &block(100, vec![])).await.unwrap();
    assert_eq!(burn_rows(&storage), 1);
}


#[test]
fn zero_resync_interval_is_rejected() {
    let chain = Arc::new(MockChainState::default());
    assert!(processor_with_interval(chain.clone(), vec![1], 0).is_err());
    assert!(processor_with_interval(chain, vec![1], 1).is_ok());
}
