mod cli;
mod server;


use bytes::Bytes;
use clap::Parser;
use cli::Cli;
use std::sync::Arc;
use tao_codec::{Payload, PayloadKind};
use tao_data::substrate::Block;
use tao_data_client::reqwest::{default_http_client, ItemSelection, ReqwestDataClient};
use tao_data_source::StandardDataSource;
use tao_processor::chain_state::RpcChainState;
use tao_processor::config::ProcessorConfig;
use tao_processor::indexer::Indexer;
use tao_processor::metrics::register_metrics;
use tao_processor::processor::{BlockProcessor, ProcessorSettings};
use tao_processor::ss58::Ss58;
use tao_store::{MemoryStorage, RocksStorage, Storage};
use tracing::{error, info, warn};


fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    init_tracing(args.json_log);

    let result = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(args));

    if let Err(err) = result {
        error!(error =? err, "indexer stopped");
        std::process::exit(1)
    }
    Ok(())
}


async fn run(args: Cli) -> anyhow::Result<()> {
    let config = match args.config.as_ref() {
        Some(file) => ProcessorConfig::read_config_file(file)?,
        None => ProcessorConfig::default()
    };
    let codec = config.build_codec()?;

    if let Some(port) = args.prom_port {
        let mut registry = prometheus_client::registry::Registry::default();
        register_metrics(&mut registry);
        tokio::spawn(async move {
            if let Err(err) = server::run_server(registry, port).await {
                error!(error =? err, "metrics server failed")
            }
        });
    }

    let selection = ItemSelection {
        events: Payload::names(PayloadKind::Event),
        calls: Payload::names(PayloadKind::Call)
    };
    let http = default_http_client()?;
    let clients = args.src.iter()
        .map(|url| ReqwestDataClient::new(http.clone(), url.clone(), selection.clone()))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let data_source = StandardDataSource::new(clients, |bytes: Bytes| Block::from_json_bytes(&bytes));

    let storage: Arc<dyn Storage> = match args.database_dir.as_ref() {
        Some(dir) => Arc::new(RocksStorage::open(dir)?),
        None => {
            warn!("no database directory given, indexed data will be kept in memory");
            Arc::new(MemoryStorage::new())
        }
    };

    let processor = BlockProcessor::new(
        codec,
        RpcChainState::new(args.rpc.clone())?,
        Ss58::new(config.ss58_prefix),
        ProcessorSettings {
            resync_interval: config.resync_interval,
            tracked_netuids: config.tracked_netuids.clone()
        }
    )?;

    let mut indexer = Indexer::new(data_source, storage, processor);
    indexer.run(args.first_block, shutdown_signal()).await?;

    info!("bye");
    Ok(())
}


fn init_tracing(json_log: bool) {
    use std::io::IsTerminal;

    let env_filter = tracing_subscriber::EnvFilter::builder().parse_lossy(
        std::env::var(tracing_subscriber::EnvFilter::DEFAULT_ENV)
            .unwrap_or("info".to_string()),
    );

    if std::io::stdout().is_terminal() && !json_log {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .compact()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .json()
            .with_current_span(false)
            .init();
    }
}


async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
