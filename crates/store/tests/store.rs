use proptest::prelude::{prop, ProptestConfig};
use proptest::proptest;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tao_primitives::{BlockNumber, BlockRef, Netuid};
use tao_store::{BlockTx, Burn, Coldkey, EntityKind, EntityStore, MemoryStorage, RocksStorage, Storage};


fn burn(netuid: Netuid, block: BlockNumber, id: &str, amount: i128) -> Burn {
    Burn {
        id: id.to_string(),
        block_num: block,
        timestamp: block * 12000,
        amount,
        netuid
    }
}


fn block(number: BlockNumber) -> BlockRef {
    BlockRef::new(number, &format!("0x{:x}", number))
}


fn check_read_your_writes(storage: &dyn Storage) -> anyhow::Result<()> {
    let mut tx = BlockTx::new(storage, block(1));

    let mut alice: Coldkey = tx.get_or_create("alice")?;
    assert_eq!(alice.balance, 0);
    assert!(tx.get::<Coldkey>("alice")?.is_none());

    alice.balance -= 10;
    tx.save(&alice)?;
    let mut alice: Coldkey = tx.get_or_create("alice")?;
    assert_eq!(alice.balance, -10);
    alice.balance -= 5;
    tx.save(&alice)?;

    // nothing is visible before commit
    assert!(storage.get(EntityKind::Coldkey, "alice")?.is_none());
    assert_eq!(storage.get_cursor()?, None);

    tx.commit()?;

    let tx = BlockTx::new(storage, block(2));
    assert_eq!(tx.get::<Coldkey>("alice")?.map(|c| c.balance), Some(-15));
    assert_eq!(storage.count(EntityKind::Coldkey)?, 1);
    assert_eq!(storage.get_cursor()?, Some(block(1)));
    Ok(())
}


fn check_find_latest(storage: &dyn Storage) -> anyhow::Result<()> {
    let mut tx = BlockTx::new(storage, block(10));
    tx.save(&burn(1, 9, "9-1", 100))?;
    tx.save(&burn(1, 10, "10-1", 200))?;
    tx.save(&burn(3, 11, "11-3", 300))?;
    assert_eq!(tx.find_latest::<Burn>(1)?.map(|b| b.amount), Some(200));
    tx.commit()?;

    let mut tx = BlockTx::new(storage, block(11));
    assert_eq!(tx.find_latest::<Burn>(1)?.map(|b| b.amount), Some(200));
    assert_eq!(tx.find_latest::<Burn>(3)?.map(|b| b.amount), Some(300));
    assert!(tx.find_latest::<Burn>(2)?.is_none());

    // pending rows win over stored ones
    tx.save(&burn(1, 11, "11-1", 400))?;
    assert_eq!(tx.find_latest::<Burn>(1)?.map(|b| b.amount), Some(400));

    // a stored row beats an older pending one
    tx.save(&burn(3, 5, "5-3", 1))?;
    assert_eq!(tx.find_latest::<Burn>(3)?.map(|b| b.amount), Some(300));
    tx.commit()?;

    assert_eq!(storage.count(EntityKind::Burn)?, 5);
    Ok(())
}


fn check_moved_series_row(storage: &dyn Storage) -> anyhow::Result<()> {
    let mut tx = BlockTx::new(storage, block(1));
    tx.save(&burn(21, 50, "x", 1))?;
    tx.commit()?;

    let mut tx = BlockTx::new(storage, block(2));
    tx.save(&burn(21, 5, "x", 2))?;
    tx.save(&burn(21, 20, "y", 3))?;
    tx.commit()?;

    let tx = BlockTx::new(storage, block(3));
    assert_eq!(tx.find_latest::<Burn>(21)?.map(|b| b.id), Some("y".to_string()));
    Ok(())
}


#[test]
fn memory_storage() -> anyhow::Result<()> {
    check_read_your_writes(&MemoryStorage::new())?;
    check_find_latest(&MemoryStorage::new())?;
    check_moved_series_row(&MemoryStorage::new())
}


#[test]
fn rocks_storage() -> anyhow::Result<()> {
    for check in [check_read_your_writes, check_find_latest, check_moved_series_row] {
        let db_dir = tempfile::tempdir()?;
        let storage = RocksStorage::open(db_dir.path())?;
        check(&storage)?;
    }
    Ok(())
}


#[test]
fn rocks_storage_survives_reopen() -> anyhow::Result<()> {
    let db_dir = tempfile::tempdir()?;
    {
        let storage = RocksStorage::open(db_dir.path())?;
        let mut tx = BlockTx::new(&storage, block(7));
        tx.save(&burn(11, 7, "7-11", 42))?;
        tx.commit()?;
    }
    let storage = RocksStorage::open(db_dir.path())?;
    assert_eq!(storage.get_cursor()?, Some(block(7)));
    let tx = BlockTx::new(&storage, block(8));
    assert_eq!(tx.find_latest::<Burn>(11)?.map(|b| b.amount), Some(42));
    Ok(())
}


#[test]
fn latest_row_matches_model() {
    let db_dir = tempfile::tempdir().unwrap();
    let rocks = RocksStorage::open(db_dir.path()).unwrap();
    let memory = MemoryStorage::new();
    let runs = AtomicU64::new(0);

    let writes = prop::collection::vec((0..4u16, 0..50u64), 1..30);

    proptest!(ProptestConfig::with_cases(32), |(writes in writes)| {
        let mut model: HashMap<Netuid, (BlockNumber, String)> = HashMap::new();
        let run = runs.fetch_add(1, Ordering::SeqCst) + 1;

        for storage in [&rocks as &dyn Storage, &memory] {
            let mut tx = BlockTx::new(storage, block(run));
            for (i, (netuid, block_num)) in writes.iter().copied().enumerate() {
                let id = format!("{}-{}-{}", run, netuid, i);
                tx.save(&burn(netuid, run * 100 + block_num, &id, i as i128)).unwrap();
            }
            tx.commit().unwrap();
        }

        for (i, (netuid, block_num)) in writes.iter().copied().enumerate() {
            let id = format!("{}-{}-{}", run, netuid, i);
            let key = (run * 100 + block_num, id);
            let entry = model.entry(netuid).or_insert_with(|| key.clone());
            if key > *entry {
                *entry = key
            }
        }

        for netuid in 0..4u16 {
            let tx = BlockTx::new(&rocks as &dyn Storage, block(run));
            let from_rocks = tx.find_latest::<Burn>(netuid).unwrap();
            let tx = BlockTx::new(&memory as &dyn Storage, block(run));
            let from_memory = tx.find_latest::<Burn>(netuid).unwrap();
            assert_eq!(from_rocks, from_memory);
            if let Some((block_num, id)) = model.get(&netuid) {
                let latest = from_rocks.unwrap();
                assert_eq!(&latest.id, id);
                assert_eq!(latest.block_num, *block_num);
            }
        }
    });
}
