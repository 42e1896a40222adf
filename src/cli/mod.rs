use clap::{Parser, Subcommand};
use concord::RequirementMode;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

pub mod actions;
pub mod config;
pub mod init;
pub mod status;
pub mod store;
pub mod version;

use config::{ConcordConfig, LoggingConfig};

#[derive(Parser)]
#[command(name = "concord")]
#[command(author = "Concord Project")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "M-of-N multi-owner wallet", long_about = None)]
pub struct Cli {
    /// Path to config file (default: <data dir>/concord/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to wallet state file (overrides the config file)
    #[arg(long, global = true)]
    pub state: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new wallet
    Init {
        /// Owner address (0x-prefixed hex) or label; repeat for each owner
        #[arg(long = "owner", required = true)]
        owners: Vec<String>,

        /// Required approvals (default: owners - 1 under UNDER, owners under EQUAL)
        #[arg(long)]
        requirement: Option<usize>,

        /// Requirement mode: under or equal
        #[arg(long, default_value = "under")]
        mode: RequirementMode,

        /// Label the wallet address is derived from (default: from config)
        #[arg(long)]
        name: Option<String>,

        /// Overwrite an existing wallet
        #[arg(long)]
        force: bool,
    },

    /// Add value to the wallet pool
    Deposit {
        /// Sender address or label
        #[arg(long)]
        from: String,

        /// Amount to deposit
        amount: u128,
    },

    /// Propose a transfer or call to an external destination
    Submit {
        /// Acting owner
        #[arg(long = "as")]
        owner: String,

        /// Destination address or label
        #[arg(long)]
        to: String,

        /// Value to send
        #[arg(long, default_value_t = 0)]
        value: u128,

        /// Call payload as hex
        #[arg(long)]
        data: Option<String>,
    },

    /// Propose a change to the owner set or quorum policy
    Govern {
        /// Acting owner
        #[arg(long = "as")]
        owner: String,

        #[command(subcommand)]
        action: GovernAction,
    },

    /// Approve a proposal (executes it once the quorum is met)
    Confirm {
        /// Acting owner
        #[arg(long = "as")]
        owner: String,

        /// Proposal id
        id: u64,
    },

    /// Withdraw an approval
    Revoke {
        /// Acting owner
        #[arg(long = "as")]
        owner: String,

        /// Proposal id
        id: u64,
    },

    /// Retry execution of a proposal that meets the quorum
    Execute {
        /// Acting owner
        #[arg(long = "as")]
        owner: String,

        /// Proposal id
        id: u64,
    },

    /// List proposals
    List {
        /// 1-based rank of the first proposal to show
        #[arg(long, default_value_t = 1)]
        offset: usize,

        /// Maximum number of proposals to show
        #[arg(long, default_value_t = 20)]
        limit: usize,

        /// Only pending proposals
        #[arg(long, conflicts_with = "executed")]
        pending: bool,

        /// Only executed proposals
        #[arg(long)]
        executed: bool,

        /// Machine-readable output
        #[arg(long)]
        json: bool,
    },

    /// Show owners, policy and balance
    Status {
        /// Machine-readable output
        #[arg(long)]
        json: bool,
    },

    /// Show the event log
    Log {
        /// Only events about this proposal
        #[arg(long)]
        proposal: Option<u64>,

        /// Only events by this address or label
        #[arg(long)]
        actor: Option<String>,

        /// Only the most recent N events
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Display version information
    Version,
}

#[derive(Subcommand)]
pub enum GovernAction {
    /// Add an owner
    AddOwner {
        /// Address or label
        owner: String,
    },

    /// Remove an owner
    RemoveOwner {
        /// Address or label
        owner: String,
    },

    /// Replace an owner
    ChangeOwner {
        /// Current owner
        old: String,

        /// Replacement
        new: String,
    },

    /// Change the required approval count
    SetRequirement {
        /// Required approvals
        requirement: usize,

        /// Requirement mode: under or equal
        #[arg(long, default_value = "under")]
        mode: RequirementMode,
    },
}

/// Install the tracing subscriber. `RUST_LOG` wins over the config level.
fn init_tracing(logging: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    match &logging.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| format!("Failed to open log file '{}': {}", path.display(), e))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

pub fn execute(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = ConcordConfig::resolve(cli.config.as_deref())?;
    init_tracing(&config.logging)?;

    let state_path = cli
        .state
        .unwrap_or_else(|| config.wallet.state_path.clone());

    match cli.command {
        Commands::Init {
            owners,
            requirement,
            mode,
            name,
            force,
        } => init::execute(
            &config,
            &state_path,
            init::InitArgs {
                owners,
                requirement,
                mode,
                name,
                force,
            },
        ),
        Commands::Deposit { from, amount } => actions::deposit(&state_path, &from, amount),
        Commands::Submit {
            owner,
            to,
            value,
            data,
        } => actions::submit(&state_path, &owner, &to, value, data.as_deref()),
        Commands::Govern { owner, action } => actions::govern(&state_path, &owner, action),
        Commands::Confirm { owner, id } => actions::confirm(&state_path, &owner, id),
        Commands::Revoke { owner, id } => actions::revoke(&state_path, &owner, id),
        Commands::Execute { owner, id } => actions::execute(&state_path, &owner, id),
        Commands::List {
            offset,
            limit,
            pending,
            executed,
            json,
        } => status::list(&state_path, offset, limit, pending, executed, json),
        Commands::Status { json } => status::execute(&state_path, json),
        Commands::Log {
            proposal,
            actor,
            limit,
        } => status::log(&state_path, proposal, actor.as_deref(), limit),
        Commands::Version => {
            version::execute();
            Ok(())
        }
    }
}
