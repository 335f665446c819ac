//! lockstake CLI
//!
//! Command-line interface over a lockstake ledger snapshot file.

mod config;
mod demo;

use anyhow::Context;
use clap::{Parser, Subcommand};
use crate::config::{CliConfig, LogFormat, LoggingConfig};
use lockstake_ledger::{
    Address, Balance, BasisPoints, Clock, Custody, LedgerSnapshot, LockDays, PositionId, SolvencyReport,
    StakingEngine, SystemClock, Tier, Timestamp,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "lockstake")]
#[command(version)]
#[command(about = "Time-locked staking ledger", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "lockstake.toml", env = "LOCKSTAKE_CONFIG")]
    config: PathBuf,

    /// Ledger snapshot file (overrides the configured one)
    #[arg(short, long, global = true)]
    state: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new ledger file
    Init {
        /// Admin address (hex)
        #[arg(long)]
        admin: Option<Address>,

        /// Initial interest reserve
        #[arg(long)]
        reserve: Option<Balance>,

        /// Overwrite an existing ledger
        #[arg(long)]
        force: bool,
    },

    /// Lock value into a tier
    Deposit {
        #[arg(long)]
        caller: Address,

        /// Lock duration in days
        #[arg(long)]
        days: LockDays,

        /// Amount to lock
        #[arg(long)]
        value: Balance,
    },

    /// Close a position and pay it out
    Close {
        #[arg(long)]
        caller: Address,

        #[arg(long)]
        id: PositionId,
    },

    /// Override a position's unlock time (admin)
    ChangeUnlock {
        #[arg(long)]
        caller: Address,

        #[arg(long)]
        id: PositionId,

        /// New unlock time, Unix seconds
        #[arg(long, allow_hyphen_values = true)]
        unlock_at: Timestamp,
    },

    /// Create or update a tier (admin)
    ModifyTier {
        #[arg(long)]
        caller: Address,

        #[arg(long)]
        days: LockDays,

        /// Rate in basis points
        #[arg(long)]
        rate: BasisPoints,
    },

    /// Add to the interest reserve (admin)
    Fund {
        #[arg(long)]
        caller: Address,

        #[arg(long)]
        amount: Balance,
    },

    /// List configured tiers
    Tiers,

    /// Show the rate for a lock duration
    Rate {
        #[arg(long)]
        days: LockDays,
    },

    /// Show a position
    Position {
        #[arg(long)]
        id: PositionId,
    },

    /// List positions created by an address
    Positions {
        #[arg(long)]
        address: Address,
    },

    /// Show ledger totals and solvency
    Status,

    /// Show recorded events
    Events {
        /// First sequence number to show
        #[arg(long, default_value_t = 0)]
        since: u64,
    },

    /// Replay the seed scenario in memory
    Demo,

    /// Print the effective configuration
    Config,
}

#[derive(Serialize)]
struct RateOutput {
    lock_period_days: LockDays,
    rate_basis_points: BasisPoints,
}

#[derive(Serialize)]
struct StatusOutput<'a> {
    admin: Address,
    current_position_id: PositionId,
    tiers: Vec<Tier>,
    custody: &'a Custody,
    solvency: SolvencyReport,
    event_count: usize,
}

fn init_logging(logging: &LoggingConfig, verbose: bool) {
    let default_level = if verbose { "debug" } else { logging.level.as_str() };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let registry = tracing_subscriber::registry().with(env_filter);
    match logging.format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Text => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}

fn expand_path(path: &Path) -> PathBuf {
    if let Some(rest) = path.to_str().and_then(|p| p.strip_prefix("~/")) {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    path.to_path_buf()
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn open_ledger(path: &Path) -> anyhow::Result<StakingEngine> {
    let snapshot = LedgerSnapshot::load(path)
        .with_context(|| format!("failed to load ledger {} (run `lockstake init` first)", path.display()))?;
    Ok(StakingEngine::restore(snapshot, SystemClock)?)
}

/// Load, mutate, save
fn with_ledger<T>(
    path: &Path,
    op: impl FnOnce(&mut StakingEngine) -> lockstake_ledger::Result<T>,
) -> anyhow::Result<T> {
    let mut engine = open_ledger(path)?;
    let result = op(&mut engine)?;
    engine.snapshot().save(path)?;
    Ok(result)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = CliConfig::load(&expand_path(&cli.config))?;
    init_logging(&config.logging, cli.verbose);

    let state = expand_path(cli.state.as_deref().unwrap_or_else(|| Path::new(&config.ledger.state_file)));

    match cli.command {
        Commands::Init { admin, reserve, force } => {
            if state.exists() && !force {
                anyhow::bail!("ledger {} already exists (use --force to replace it)", state.display());
            }

            let admin = match admin {
                Some(admin) => admin,
                None => config
                    .ledger
                    .admin
                    .as_deref()
                    .context("no admin given (use --admin or [ledger] admin)")?
                    .parse()?,
            };
            let reserve = reserve.unwrap_or(Balance::from(config.ledger.initial_reserve));

            let engine = StakingEngine::with_system_clock(admin, reserve, config.engine.clone())?;
            engine.snapshot().save(&state)?;

            tracing::info!("Ledger created at {}", state.display());
            print_json(&engine.snapshot())?;
        }

        Commands::Deposit { caller, days, value } => {
            let position = with_ledger(&state, |e| {
                let id = e.deposit(caller, days, value)?;
                Ok(e.position(id))
            })?;
            print_json(&position)?;
        }

        Commands::Close { caller, id } => {
            let payout = with_ledger(&state, |e| e.close_position(caller, id))?;
            print_json(&payout)?;
        }

        Commands::ChangeUnlock { caller, id, unlock_at } => {
            let position = with_ledger(&state, |e| {
                e.change_unlock_date(caller, id, unlock_at)?;
                Ok(e.position(id))
            })?;
            print_json(&position)?;
        }

        Commands::ModifyTier { caller, days, rate } => {
            let tiers = with_ledger(&state, |e| {
                e.modify_tier(caller, days, rate)?;
                Ok(e.tiers())
            })?;
            print_json(&tiers)?;
        }

        Commands::Fund { caller, amount } => {
            let custody = with_ledger(&state, |e| {
                e.fund_reserve(caller, amount)?;
                Ok(e.custody().clone())
            })?;
            print_json(&custody)?;
        }

        Commands::Tiers => {
            print_json(&open_ledger(&state)?.tiers())?;
        }

        Commands::Rate { days } => {
            let rate_basis_points = open_ledger(&state)?.rate_for(days)?;
            print_json(&RateOutput { lock_period_days: days, rate_basis_points })?;
        }

        Commands::Position { id } => {
            print_json(&open_ledger(&state)?.position(id))?;
        }

        Commands::Positions { address } => {
            print_json(&open_ledger(&state)?.positions_for(&address))?;
        }

        Commands::Status => {
            let engine = open_ledger(&state)?;
            print_json(&StatusOutput {
                admin: engine.admin(),
                current_position_id: engine.current_position_id(),
                tiers: engine.tiers(),
                custody: engine.custody(),
                solvency: engine.solvency(),
                event_count: engine.events().len(),
            })?;
        }

        Commands::Events { since } => {
            print_json(open_ledger(&state)?.events_since(since))?;
        }

        Commands::Demo => {
            let report = demo::run(config.engine.clone(), SystemClock.now())?;
            print_json(&report)?;
        }

        Commands::Config => {
            print!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
