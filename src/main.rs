mod config;

use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use wraith_config::{ConnectedWallet, FlowDef, WalletInfo, WalletType};
use wraith_engine::{ChannelNotifier, ExecutionEvent, FlowEngine, RunStatus};
use wraith_flow::Flow;

use crate::config::WraithConfig;

/// Wraith - run Web3 automation flows on behalf of a wallet
#[derive(Parser)]
#[command(name = "wraith")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Path to the data directory (default: ~/.wraith)
  #[arg(long, global = true)]
  data_dir: Option<PathBuf>,

  /// Primary wallet address the run executes for
  #[arg(long, global = true)]
  wallet: Option<String>,

  /// Wallet extension type (phantom, metamask, rabby, coinbase)
  #[arg(long, global = true, default_value = "phantom", value_parser = parse_wallet_type)]
  wallet_type: WalletType,

  /// Additional connected wallet address (repeatable)
  #[arg(long = "extra-wallet", global = true)]
  extra_wallets: Vec<String>,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Run a flow or a single node
  Run {
    #[command(subcommand)]
    target: RunTarget,
  },

  /// Print the order nodes of a flow would run in
  Order {
    /// Path to the flow file (JSON)
    flow_file: PathBuf,
  },
}

#[derive(Subcommand)]
enum RunTarget {
  /// Run an entire flow
  Flow {
    /// Path to the flow file (JSON)
    flow_file: PathBuf,
  },

  /// Run a single node from a flow, with upstream outputs read from stdin
  Node {
    /// Path to the flow file (JSON)
    flow_file: PathBuf,

    /// The node ID to execute
    #[arg(long)]
    node: String,
  },
}

fn parse_wallet_type(s: &str) -> Result<WalletType, String> {
  serde_json::from_value(serde_json::Value::String(s.to_lowercase()))
    .map_err(|_| format!("unknown wallet type '{}'", s))
}

fn main() -> Result<()> {
  tracing_subscriber::registry()
    .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
    .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();

  let cli = Cli::parse();

  let data_dir = match cli.data_dir.clone() {
    Some(dir) => dir,
    None => dirs::home_dir()
      .context("could not determine home directory")?
      .join(".wraith"),
  };

  match cli.command {
    Some(Commands::Run { ref target }) => {
      let config = WraithConfig::load(&data_dir)?;
      debug!(data_dir = %data_dir.display(), ?config, "config loaded");
      let wallet = wallet_info(&cli)?;
      let rt = tokio::runtime::Runtime::new()?;
      match target {
        RunTarget::Flow { flow_file } => rt.block_on(run_flow(flow_file, wallet, &config)),
        RunTarget::Node { flow_file, node } => {
          rt.block_on(run_node(flow_file, node, wallet, &config))
        }
      }?;
    }
    Some(Commands::Order { ref flow_file }) => print_order(flow_file)?,
    None => {
      println!("wraith - use --help to see available commands");
    }
  }

  Ok(())
}

fn wallet_info(cli: &Cli) -> Result<WalletInfo> {
  let Some(address) = cli.wallet.clone() else {
    bail!("--wallet is required to run a flow");
  };

  let mut wallets = Vec::new();
  if !cli.extra_wallets.is_empty() {
    wallets.push(ConnectedWallet {
      address: address.clone(),
      wallet_type: cli.wallet_type,
      label: Some("primary".to_string()),
    });
    wallets.extend(cli.extra_wallets.iter().map(|extra| ConnectedWallet {
      address: extra.clone(),
      wallet_type: cli.wallet_type,
      label: None,
    }));
  }

  Ok(WalletInfo::new(address, cli.wallet_type).with_wallets(wallets))
}

fn read_flow(flow_file: &Path) -> Result<FlowDef> {
  let content = std::fs::read_to_string(flow_file)
    .with_context(|| format!("failed to read flow file: {}", flow_file.display()))?;
  serde_json::from_str(&content)
    .with_context(|| format!("failed to parse flow file: {}", flow_file.display()))
}

fn print_order(flow_file: &Path) -> Result<()> {
  let flow = Flow::from_def(read_flow(flow_file)?).context("invalid flow")?;
  let order = flow.execution_order().context("flow cannot be ordered")?;

  for (i, node_id) in order.iter().enumerate() {
    if let Some(node) = flow.get_node(node_id) {
      println!("{:>3}. {} ({}, {})", i + 1, node.node_id, node.node_type, node.label);
    }
  }
  Ok(())
}

/// Cancel the run on Ctrl-C.
fn cancel_on_interrupt() -> CancellationToken {
  let cancel = CancellationToken::new();
  let token = cancel.clone();
  tokio::spawn(async move {
    if tokio::signal::ctrl_c().await.is_ok() {
      eprintln!("Interrupted, cancelling run...");
      token.cancel();
    }
  });
  cancel
}

async fn run_flow(flow_file: &Path, wallet: WalletInfo, config: &WraithConfig) -> Result<()> {
  let def = read_flow(flow_file)?;
  eprintln!(
    "Loaded flow: {} ({} nodes)",
    def.name.as_deref().unwrap_or("Untitled Flow"),
    def.nodes.len()
  );

  let (tx, rx) = mpsc::unbounded_channel();
  let progress = tokio::spawn(print_progress(rx));

  let engine = FlowEngine::with_notifier(
    config.engine_config(),
    config.capabilities(),
    ChannelNotifier::new(tx),
  );
  let result = engine
    .start_run(def, wallet, cancel_on_interrupt())
    .await;

  // Dropping the engine closes the event channel
  drop(engine);
  let _ = progress.await;

  let record = result.context("flow run rejected")?;
  println!("{}", serde_json::to_string_pretty(&record)?);

  if record.overall_status == RunStatus::Failed {
    bail!(
      "run {} failed: {} of {} nodes failed",
      record.id,
      record.error_count,
      record.results.len()
    );
  }
  Ok(())
}

async fn run_node(
  flow_file: &Path,
  node_id: &str,
  wallet: WalletInfo,
  config: &WraithConfig,
) -> Result<()> {
  let flow = Flow::from_def(read_flow(flow_file)?).context("invalid flow")?;
  let node = flow
    .get_node(node_id)
    .with_context(|| format!("node '{}' not found in flow", node_id))?;
  eprintln!("Running node: {} (type: {})", node.node_id, node.node_type);

  let payload = read_payload_from_stdin()?;

  let engine = FlowEngine::new(config.engine_config(), config.capabilities());
  let result = engine
    .execute_node(&flow, node_id, payload, &wallet, cancel_on_interrupt())
    .await
    .context("node execution rejected")?;

  println!("{}", serde_json::to_string_pretty(&result)?);

  if let Some(error) = result.error {
    bail!("node {} failed: {}", node_id, error);
  }
  Ok(())
}

async fn print_progress(mut rx: mpsc::UnboundedReceiver<ExecutionEvent>) {
  while let Some(event) = rx.recv().await {
    match event {
      ExecutionEvent::RunStarted {
        run_id, node_count, ..
      } => eprintln!("Run {} started ({} nodes)", run_id, node_count),
      ExecutionEvent::NodeStarted {
        node_id, node_type, ..
      } => eprintln!("  > {} ({})", node_id, node_type),
      ExecutionEvent::NodeCompleted {
        node_id,
        duration_ms,
        ..
      } => eprintln!("  ✓ {} ({} ms)", node_id, duration_ms),
      ExecutionEvent::NodeFailed { node_id, error, .. } => {
        eprintln!("  ✗ {}: {}", node_id, error)
      }
      ExecutionEvent::NodeSkipped {
        node_id, reason, ..
      } => eprintln!("  - {} skipped: {}", node_id, reason),
      ExecutionEvent::RunHalted { reason, .. } => eprintln!("Run halted: {}", reason),
      ExecutionEvent::RunFinished {
        status,
        success_count,
        error_count,
        skipped_count,
        ..
      } => eprintln!(
        "Run finished: {:?} ({} succeeded, {} failed, {} skipped)",
        status, success_count, error_count, skipped_count
      ),
    }
  }
}

fn read_payload_from_stdin() -> Result<serde_json::Value> {
  use std::io::IsTerminal;

  if io::stdin().is_terminal() {
    return Ok(serde_json::json!({}));
  }

  let mut input = String::new();
  io::stdin()
    .read_to_string(&mut input)
    .context("failed to read payload from stdin")?;

  if input.trim().is_empty() {
    Ok(serde_json::json!({}))
  } else {
    serde_json::from_str(&input).context("failed to parse payload JSON from stdin")
  }
}
