//! UTXO Gateway CLI
//!
//! Operator interface to the gateway core: mint and check addresses, resolve
//! transactions and blocks, and send payments through the configured node.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::{style, Term};
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use utxo_gateway::prelude::{
    AttemptReceiver, CoinGateway, Environment, GatewayConfig, IntegerConverter, Transaction,
    TransactionAttempt,
};
use utxo_gateway::utils::constants::{DEFAULT_CURRENCY, ENV_CONFIG};

/// UTXO Gateway CLI - coin handling for a UTXO payment gateway
#[derive(Parser)]
#[command(name = "utxo-gateway")]
#[command(version = utxo_gateway::VERSION)]
#[command(about = "Command-line interface for the UTXO gateway core", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to the JSON configuration file
    #[arg(short, long, env = ENV_CONFIG)]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new receiving address
    NewAddress,

    /// Check whether the node accepts an address
    Validate {
        /// Address to check
        address: String,
    },

    /// Resolve a transaction
    Tx {
        /// Transaction ID
        id: String,
    },

    /// Resolve every transaction of a block
    Block {
        /// Block height
        height: u64,
    },

    /// Wallet-relative amount of a transaction
    Amount {
        /// Transaction ID
        id: String,
    },

    /// Height of the best chain
    Height,

    /// Send a payment
    Send {
        /// Funding address; receives the change
        #[arg(long)]
        from: String,

        /// Receiver as ADDRESS=AMOUNT (repeatable)
        #[arg(long = "to", required = true, value_parser = parse_receiver)]
        to: Vec<AttemptReceiver>,

        /// Network fee in coins
        #[arg(long)]
        fee: Decimal,

        /// Currency tag
        #[arg(long, default_value = DEFAULT_CURRENCY)]
        currency: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Convert between coins and minor units
    #[command(subcommand)]
    Convert(ConvertCommands),
}

#[derive(Subcommand)]
enum ConvertCommands {
    /// Coins to minor units
    ToInt {
        /// Amount in coins
        amount: Decimal,
    },

    /// Minor units to coins
    ToDecimal {
        /// Amount in minor units
        #[arg(allow_negative_numbers = true)]
        amount: i64,
    },
}

impl Commands {
    /// Whether the operator must confirm before anything is broadcast.
    ///
    /// Only `--yes` skips the prompt; `--json` changes the output format, not
    /// the confirmation.
    fn requires_confirmation(&self) -> bool {
        matches!(self, Commands::Send { yes: false, .. })
    }
}

fn parse_receiver(s: &str) -> Result<AttemptReceiver, String> {
    let (address, amount) = s
        .split_once('=')
        .ok_or_else(|| format!("expected ADDRESS=AMOUNT, got {}", s))?;
    if address.is_empty() {
        return Err(format!("missing address in {}", s));
    }
    let amount: Decimal = amount
        .parse()
        .map_err(|e| format!("invalid amount {}: {}", amount, e))?;
    Ok(AttemptReceiver::new(address, amount))
}

// ═══════════════════════════════════════════════════════════════════════════════
// MAIN
// ═══════════════════════════════════════════════════════════════════════════════

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let term = Term::stdout();

    if let Err(e) = run(&cli, &term).await {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(cli: &Cli, term: &Term) -> anyhow::Result<()> {
    let config = load_config(cli)?;
    init_logging(config.environment);

    if let Commands::Convert(cmd) = &cli.command {
        return cmd_convert(cli, &config, cmd, term);
    }

    let gateway = CoinGateway::connect(&config)?;

    match &cli.command {
        Commands::NewAddress => {
            let address = gateway.create_address().await?;
            output(cli, term, &address, || {
                format!("{} New address: {}", style("✓").green(), style(&address).yellow())
            })
        }

        Commands::Validate { address } => {
            let valid = gateway.validate_address(address).await?;
            output(cli, term, &valid, || {
                if valid {
                    format!("{} {} is valid", style("✓").green(), address)
                } else {
                    format!("{} {} is not valid", style("✗").red(), address)
                }
            })
        }

        Commands::Tx { id } => {
            let tx = gateway.get_transaction_by_tx(id).await?;
            output(cli, term, &tx, || format_transaction(&tx))
        }

        Commands::Block { height } => {
            let spinner = create_spinner(&format!("Resolving block {}...", height));
            let result = gateway.get_transactions_of_block(*height).await;
            spinner.finish_and_clear();
            let txs = result?;

            output(cli, term, &txs, || {
                let mut lines = vec![format!(
                    "{} Block {}: {} transactions",
                    style("→").cyan(),
                    height,
                    txs.len()
                )];
                lines.extend(txs.iter().map(format_transaction));
                lines.join("\n")
            })
        }

        Commands::Amount { id } => {
            let amount = gateway.get_amount_of_transaction(id).await?;
            output(cli, term, &amount, || format!("  Amount: {}", style(amount).green()))
        }

        Commands::Height => {
            let height = gateway.get_height_of_highest_block().await?;
            output(cli, term, &height, || format!("  Height: {}", style(height).green()))
        }

        Commands::Send {
            from,
            to,
            fee,
            currency,
            ..
        } => {
            let attempt = TransactionAttempt::new(from.as_str(), to.clone(), *fee, currency.as_str());

            if cli.command.requires_confirmation() {
                let prompt = Term::stderr();
                prompt.write_line(&format!("{} Sending from {}", style("→").cyan(), from))?;
                for receiver in &attempt.receivers {
                    prompt.write_line(&format!(
                        "    {} {} {}",
                        receiver.address, receiver.amount, currency
                    ))?;
                }
                prompt.write_line(&format!("    fee {} {}", fee, currency))?;

                let confirmed = Confirm::new()
                    .with_prompt("Broadcast this transaction?")
                    .default(false)
                    .interact_on(&prompt)?;
                if !confirmed {
                    anyhow::bail!("aborted");
                }
            }

            let spinner = create_spinner("Broadcasting...");
            let result = gateway.send(&attempt).await;
            spinner.finish_and_clear();

            let tx = match result {
                Err(e) if e.is_funding_shortfall() => {
                    anyhow::bail!("{} (code {})", e, e.code())
                }
                other => other?,
            };
            output(cli, term, &tx, || {
                format!("{} Sent\n{}", style("✓").green(), format_transaction(&tx))
            })
        }

        Commands::Convert(_) => Ok(()),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// COMMAND HANDLERS
// ═══════════════════════════════════════════════════════════════════════════════

fn cmd_convert(
    cli: &Cli,
    config: &GatewayConfig,
    cmd: &ConvertCommands,
    term: &Term,
) -> anyhow::Result<()> {
    let converter = IntegerConverter::from_config(config)?;

    match cmd {
        ConvertCommands::ToInt { amount } => {
            let units = converter.to_integer(*amount)?;
            output(cli, term, &units, || units.to_string())
        }
        ConvertCommands::ToDecimal { amount } => {
            let coins = converter.to_decimal(*amount);
            output(cli, term, &coins, || coins.to_string())
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// HELPERS
// ═══════════════════════════════════════════════════════════════════════════════

fn load_config(cli: &Cli) -> anyhow::Result<GatewayConfig> {
    let config = match &cli.config {
        Some(path) => GatewayConfig::load(path)?,
        None => GatewayConfig::default(),
    };
    Ok(config.with_env_overrides()?)
}

fn init_logging(environment: Environment) {
    let Some(level) = environment.default_log_directive() else {
        return;
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn output<T: Serialize>(
    cli: &Cli,
    term: &Term,
    value: &T,
    human: impl FnOnce() -> String,
) -> anyhow::Result<()> {
    let text = if cli.json {
        serde_json::to_string_pretty(value)?
    } else {
        human()
    };
    term.write_line(&text)?;
    Ok(())
}

fn format_transaction(tx: &Transaction) -> String {
    let mut lines = vec![format!("  {}", style(&tx.tx).yellow())];
    for sender in &tx.senders {
        lines.push(format!("    from {}", sender.address));
    }
    for receiver in &tx.receivers {
        lines.push(format!("    to   {} {}", receiver.address, receiver.amount));
    }
    lines.join("\n")
}

fn create_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(template) = ProgressStyle::default_spinner()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
        .template("{spinner:.cyan} {msg}")
    {
        spinner.set_style(template);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));
    spinner
}
