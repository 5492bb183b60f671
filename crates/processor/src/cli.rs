use clap::Parser;
use tao_primitives::BlockNumber;
use url::Url;


#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// URL of the archive data service, can be repeated
    #[arg(short, long, value_name = "URL", required = true)]
    pub src: Vec<Url>,

    /// Chain node JSON-RPC endpoint for storage reads
    #[arg(long, value_name = "URL")]
    pub rpc: Url,

    /// Database directory, data is kept in memory when omitted
    #[arg(long = "db", value_name = "DIR")]
    pub database_dir: Option<String>,

    /// First block to process when the database is empty
    #[arg(long, value_name = "N", env = "PROCESSOR_BLOCK_START", default_value_t = 0)]
    pub first_block: BlockNumber,

    /// Processor config file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<String>,

    /// Port to use for built-in prometheus metrics server
    #[arg(long)]
    pub prom_port: Option<u16>,

    /// Whether the logs should be structured in JSON format
    #[arg(long)]
    pub json_log: bool
}
