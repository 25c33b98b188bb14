use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

use dfusion_orderbook::aggregate::PairRow;
use dfusion_orderbook::exchange::{BatchExchangeContract, Network};
use dfusion_orderbook::logging::setup_logging;
use dfusion_orderbook::reader::{read_instance_from_chain, DEFAULT_PAGE_SIZE};
use dfusion_orderbook::{
    aggregate, count_orders_per_pair, load_from_file, log_orders, read_instance, write_instance,
    Instance, PairCount, RpcClient, TokenInfo, TokenQuantity, TokenRegistry,
};

#[derive(Parser, Debug)]
#[command(
    name = "dfusion-orderbook",
    version,
    about = "Read, cap and summarise dFusion batch auction order books"
)]
struct Cli {
    /// JSON-RPC endpoint of an Ethereum node
    #[arg(long, env = "NODE_URL", global = true)]
    node_url: Option<String>,
    #[arg(long, default_value = "mainnet", global = true)]
    network: Network,
    /// Exchange contract address, overriding the network default
    #[arg(long, global = true)]
    contract: Option<String>,
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE, global = true)]
    page_size: u16,
    /// JSON file of token overrides: { "T0001": { "alias": "WETH", "decimals": 18 } }
    #[arg(long, global = true)]
    tokens: Option<PathBuf>,
    /// Bare level (`debug`) or full filter directives
    #[arg(long, env = "RUST_LOG", default_value = "info", global = true)]
    log_level: String,
    #[arg(long, default_value_t = false, global = true)]
    log_json: bool,
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Read the current order book from chain and write instance-<batch>.json
    Fetch {
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// Cap the orders of an instance file and print summaries
    Inspect { instance: PathBuf },
}

#[derive(Serialize)]
struct InspectExport {
    orders: usize,
    pairs: Vec<PairCount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    executed: Option<ExecutedExport>,
}

#[derive(Serialize)]
struct ExecutedExport {
    executed_orders: u64,
    token_amounts_sold: BTreeMap<String, TokenQuantity>,
    token_amounts_bought: BTreeMap<String, TokenQuantity>,
    pairs: Vec<PairRow>,
}

fn load_registry(path: Option<&Path>) -> Result<TokenRegistry> {
    let registry = TokenRegistry::with_defaults();
    match path {
        Some(path) => {
            let overrides: BTreeMap<String, Option<TokenInfo>> = load_from_file(path)?;
            Ok(registry.with_overrides(overrides))
        }
        None => Ok(registry),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(&cli.log_level, cli.log_json);

    let registry = load_registry(cli.tokens.as_deref())?;

    match &cli.cmd {
        Cmd::Fetch { out_dir } => fetch(&cli, &registry, out_dir).await,
        Cmd::Inspect { instance } => inspect(&registry, instance),
    }
}

async fn fetch(cli: &Cli, registry: &TokenRegistry, out_dir: &Path) -> Result<()> {
    let node_url = cli
        .node_url
        .as_deref()
        .ok_or_else(|| anyhow!("--node-url (or NODE_URL) is required for fetch"))?;
    let rpc = RpcClient::new(node_url)?;
    let exchange = match &cli.contract {
        Some(address) => BatchExchangeContract::new(rpc, address),
        None => BatchExchangeContract::for_network(rpc, cli.network),
    };
    info!(network = %cli.network, contract = exchange.address(), "reading order book");

    let (batch_id, instance) = read_instance_from_chain(&exchange, cli.page_size).await?;
    let path = write_instance(&instance, out_dir, batch_id)
        .with_context(|| format!("writing instance of batch {}", batch_id))?;
    log_orders(&instance.orders, registry);
    println!("{}", path.display());
    Ok(())
}

fn inspect(registry: &TokenRegistry, path: &Path) -> Result<()> {
    let instance: Instance = read_instance(path)?;
    log_orders(&instance.orders, registry);

    let executed = if instance.has_executions() {
        let totals = aggregate(&instance.orders, registry)?;
        Some(ExecutedExport {
            executed_orders: totals.executed_orders(),
            pairs: totals.pair_rows(),
            token_amounts_sold: totals.token_amounts_sold,
            token_amounts_bought: totals.token_amounts_bought,
        })
    } else {
        None
    };

    let export = InspectExport {
        orders: instance.orders.len(),
        pairs: count_orders_per_pair(&instance.orders, registry),
        executed,
    };
    println!("{}", serde_json::to_string_pretty(&export)?);
    Ok(())
}
