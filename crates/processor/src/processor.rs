use crate::anomaly::is_anomalous;
use crate::cache::{Metric, RunningStateCache};
use crate::chain_state::ChainState;
use crate::metrics;
use crate::ss58::AddressEncoder;
use anyhow::{bail, ensure, Context};
use tao_codec::{AddStake, DifficultySet, Payload, PayloadKind, StakeAdded, StorageEntry, VersionedCodec, WeightsSet};
use tao_data::substrate::{Block, BlockHeader, Call, Event};
use tao_primitives::Netuid;
use tao_store::{Burn, Coldkey, EntityStore, Hotkey, NeuronRegistered, Transfer};
use tracing::{debug, info, instrument};


#[derive(Debug, Clone)]
pub struct ProcessorSettings {
    /// Tracked metrics are synced from chain state on heights divisible by this
    pub resync_interval: u64,
    pub tracked_netuids: Vec<Netuid>
}


impl Default for ProcessorSettings {
    fn default() -> Self {
        Self {
            resync_interval: 50,
            tracked_netuids: vec![1, 3, 11, 21]
        }
    }
}


/// Turns blocks into entity mutations.
///
/// Blocks must be fed strictly in order, the running state depends on it.
pub struct BlockProcessor<CS, AE> {
    codec: VersionedCodec,
    chain_state: CS,
    addresses: AE,
    cache: RunningStateCache,
    settings: ProcessorSettings
}


impl<CS: ChainState, AE: AddressEncoder> BlockProcessor<CS, AE> {
    pub fn new(
        codec: VersionedCodec,
        chain_state: CS,
        addresses: AE,
        settings: ProcessorSettings
    ) -> anyhow::Result<Self> {
        ensure!(settings.resync_interval > 0, "resync interval must be positive");
        Ok(Self {
            codec,
            chain_state,
            addresses,
            cache: RunningStateCache::new(),
            settings
        })
    }

    pub fn cache(&self) -> &RunningStateCache {
        &self.cache
    }

    /// To be called once the writes of the last processed block are durable
    pub fn confirm(&mut self) {
        self.cache.confirm()
    }

    /// Pre-hooks first, then events, then calls, each in chain order.
    ///
    /// Any error leaves the store in an unspecified state and must abort the block.
    /// Running state changes stay pending until [BlockProcessor::confirm].
    #[instrument(name = "block", skip_all, fields(height = block.header.height))]
    pub async fn process_block<S: EntityStore>(&mut self, block: &Block, store: &mut S) -> anyhow::Result<()> {
        self.cache.discard();

        if block.header.height % self.settings.resync_interval == 0 {
            self.resync_burn(&block.header, store).await?;
        }

        for event in block.events.iter() {
            self.process_event(&block.header, event, store).with_context(|| {
                format!("failed to process event {} ({})", event.id, event.name)
            })?;
        }

        for call in block.calls.iter() {
            self.process_call(&block.header, call).with_context(|| {
                format!("failed to process call {} ({})", call.id, call.name)
            })?;
        }

        Ok(())
    }

    pub fn process_event<S: EntityStore>(
        &mut self,
        header: &BlockHeader,
        event: &Event,
        store: &mut S
    ) -> anyhow::Result<()> {
        let Some(payload) = Payload::from_name(PayloadKind::Event, &event.name) else {
            return Ok(())
        };
        let spec_version = header.spec_version;
        match payload {
            Payload::BalancesTransfer => {
                let transfer = self.codec.decode_as(spec_version, &event.args)?;
                self.on_transfer(header, event, transfer, store)
            },
            Payload::NeuronRegistered => {
                let registration = self.codec.decode_as(spec_version, &event.args)?;
                self.on_neuron_registered(header, event, registration, store)
            },
            Payload::DifficultySet => {
                let difficulty = self.codec.decode_as(spec_version, &event.args)?;
                self.on_difficulty_set(header, event, difficulty, store)
            },
            Payload::WeightsSet => {
                let WeightsSet { netuid, uid } = self.codec.decode_as(spec_version, &event.args)?;
                debug!(netuid, uid, "weights set");
                Ok(())
            },
            Payload::StakeAdded => {
                let StakeAdded { hotkey, amount } = self.codec.decode_as(spec_version, &event.args)?;
                debug!(hotkey = %self.addresses.encode(&hotkey), amount = %amount, "stake added");
                Ok(())
            },
            Payload::AddStake | Payload::Burn => bail!("{} is not an event", payload)
        }
    }

    /// Calls are only observed, they never change the state
    pub fn process_call(&self, header: &BlockHeader, call: &Call) -> anyhow::Result<()> {
        if !call.success {
            return Ok(())
        }
        match Payload::from_name(PayloadKind::Call, &call.name) {
            Some(Payload::AddStake) => {
                let AddStake { hotkey, amount_staked } = self.codec.decode_as(header.spec_version, &call.args)?;
                debug!(
                    hotkey = %self.addresses.encode(&hotkey),
                    amount_staked = %amount_staked,
                    "add_stake call"
                );
            },
            Some(payload) => bail!("{} is not a call", payload),
            None => {}
        }
        Ok(())
    }

    fn on_transfer<S: EntityStore>(
        &mut self,
        header: &BlockHeader,
        event: &Event,
        transfer: tao_codec::Transfer,
        store: &mut S
    ) -> anyhow::Result<()> {
        let amount = i128::try_from(transfer.amount)?;
        let from_id = self.addresses.encode(&transfer.from);
        let to_id = self.addresses.encode(&transfer.to);

        let mut from: Coldkey = store.get_or_create(&from_id)?;
        from.balance -= amount;
        from.block_num = header.height;
        store.save(&from)?;

        let mut to: Coldkey = store.get_or_create(&to_id)?;
        to.balance += amount;
        to.block_num = header.height;
        store.save(&to)?;

        store.save(&Transfer {
            id: event.id.clone(),
            block_hash: header.hash.clone(),
            amount: transfer.amount,
            block_num: header.height,
            timestamp: header.timestamp,
            from: from_id,
            to: to_id
        })?;

        metrics::TRANSFERS.inc();
        Ok(())
    }

    fn on_neuron_registered<S: EntityStore>(
        &mut self,
        header: &BlockHeader,
        event: &Event,
        registration: tao_codec::NeuronRegistered,
        store: &mut S
    ) -> anyhow::Result<()> {
        let hotkey: Hotkey = store.get_or_create(&self.addresses.encode(&registration.hotkey))?;
        store.save(&hotkey)?;

        store.save(&NeuronRegistered {
            id: event.id.clone(),
            block_num: header.height,
            timestamp: header.timestamp,
            netuid: registration.netuid,
            uid: registration.uid,
            hotkey: hotkey.id.clone()
        })?;

        info!(
            netuid = registration.netuid,
            uid = registration.uid,
            hotkey = %hotkey.id,
            "neuron registered"
        );
        metrics::NEURON_REGISTRATIONS.inc();
        Ok(())
    }

    /// Difficulty goes into the burn series unconditionally
    fn on_difficulty_set<S: EntityStore>(
        &mut self,
        header: &BlockHeader,
        event: &Event,
        difficulty: DifficultySet,
        store: &mut S
    ) -> anyhow::Result<()> {
        store.save(&Burn {
            id: format!("{}-{}", header.height, event.id),
            block_num: header.height,
            timestamp: header.timestamp,
            amount: i128::try_from(difficulty.difficulty)?,
            netuid: difficulty.netuid
        })?;

        info!(
            netuid = difficulty.netuid,
            difficulty = %difficulty.difficulty,
            "difficulty set"
        );
        metrics::BURN_CHANGES.inc();
        Ok(())
    }

    async fn resync_burn<S: EntityStore>(&mut self, header: &BlockHeader, store: &mut S) -> anyhow::Result<()> {
        debug!("syncing burn");

        let entry = StorageEntry::of(Payload::Burn).context("burn is not a storage item")?;

        for netuid in self.settings.tracked_netuids.iter().copied() {
            let key = entry.map_key(&netuid);
            let raw = self.chain_state.storage(&header.hash, &key).await.with_context(|| {
                format!("failed to read burn of netuid {}", netuid)
            })?;
            let tao_codec::Burn(value) = self.codec.decode_storage_as(header.spec_version, raw.as_deref())?;
            let value = i128::try_from(value)?;

            if self.cache.get(store, Metric::Burn, netuid)? == Some(value) {
                continue
            }

            if is_anomalous(value) {
                info!(
                    netuid,
                    value = %value,
                    "skipping burn update, the value is in the anomaly denylist"
                );
                metrics::ANOMALIES_SKIPPED.inc();
                continue
            }

            store.save(&Burn {
                id: format!("{}-{}", header.height, netuid),
                block_num: header.height,
                timestamp: header.timestamp,
                amount: value,
                netuid
            })?;
            self.cache.set(Metric::Burn, netuid, value);

            info!(netuid, value = %value, "new burn amount");
            metrics::BURN_CHANGES.inc();
        }

        Ok(())
    }
}
