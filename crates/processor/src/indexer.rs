use crate::chain_state::ChainState;
use crate::metrics;
use crate::processor::BlockProcessor;
use crate::progress::Progress;
use crate::ss58::AddressEncoder;
use futures::StreamExt;
use std::future::Future;
use std::time::{Duration, Instant};
use tao_data::substrate::Block;
use tao_data_source::{DataEvent, DataSource};
use tao_primitives::{BlockNumber, BlockRef};
use tao_store::{BlockTx, Storage};
use tracing::{debug, info};


const REPORT_INTERVAL: Duration = Duration::from_secs(5);


/// Feeds finalized blocks through a [BlockProcessor], one store commit per block
pub struct Indexer<DS, S, CS, AE> {
    data_source: DS,
    storage: S,
    processor: BlockProcessor<CS, AE>,
    progress: Progress,
    last_report: Instant
}


impl<DS, S, CS, AE> Indexer<DS, S, CS, AE>
where
    DS: DataSource<Block = Block>,
    S: Storage,
    CS: ChainState,
    AE: AddressEncoder
{
    pub fn new(data_source: DS, storage: S, processor: BlockProcessor<CS, AE>) -> Self {
        Self {
            data_source,
            storage,
            processor,
            progress: Progress::new(10, Duration::from_secs(1)),
            last_report: Instant::now()
        }
    }

    /// Runs until the data source ends or `shutdown` resolves.
    ///
    /// Shutdown is only observed between blocks.
    pub async fn run<F>(&mut self, first_block: BlockNumber, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()>
    {
        match self.storage.get_cursor()? {
            Some(cursor) => {
                info!("resuming after block {}", cursor);
                self.data_source.set_position(cursor.number + 1, Some(cursor.hash));
            },
            None => {
                info!("starting from block {}", first_block);
                self.data_source.set_position(first_block, None);
            }
        }

        tokio::pin!(shutdown);

        loop {
            let event = tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("shutdown requested");
                    return Ok(())
                },
                event = self.data_source.next() => event
            };

            match event {
                Some(DataEvent::Block(block)) => self.handle_block(block).await?,
                Some(DataEvent::FinalizedHead(head)) => {
                    debug!("new finalized head {}", head)
                },
                Some(DataEvent::MaybeOnHead) => {},
                None => return Ok(())
            }
        }
    }

    async fn handle_block(&mut self, block: Block) -> anyhow::Result<()> {
        let block_ref = BlockRef::new(block.header.height, &block.header.hash);

        let mut tx = BlockTx::new(&self.storage, block_ref);
        self.processor.process_block(&block, &mut tx).await?;
        let rows = tx.pending();
        tx.commit()?;
        self.processor.confirm();

        debug!(height = block.header.height, rows, "block committed");

        metrics::LAST_BLOCK.set(block.header.height as i64);
        self.progress.set_current_value(block.header.height);
        self.maybe_report();
        Ok(())
    }

    fn maybe_report(&mut self) {
        if self.last_report.elapsed() < REPORT_INTERVAL || !self.progress.has_news() {
            return
        }
        let speed = self.progress.speed();
        metrics::PROGRESS.set(speed);
        info!(
            "last block: {}, progress: {} blocks/sec",
            self.progress.get_current_value().unwrap_or_default(),
            speed.round() as u64
        );
        self.last_report = Instant::now();
    }
}
