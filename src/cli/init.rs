//! `concord init`: create a wallet and its config file.

use super::config::{config_path_for_state, ConcordConfig};
use super::store::{StoreError, WalletState};
use concord::wallet::QuorumPolicy;
use concord::{Address, RequirementMode, Wallet};
use std::path::Path;
use tracing::info;

pub struct InitArgs {
    pub owners: Vec<String>,
    pub requirement: Option<usize>,
    pub mode: RequirementMode,
    pub name: Option<String>,
    pub force: bool,
}

pub fn execute(
    config: &ConcordConfig,
    state_path: &Path,
    args: InitArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    if state_path.exists() && !args.force {
        return Err(StoreError::AlreadyExists(state_path.to_path_buf()).into());
    }

    let owners = args
        .owners
        .iter()
        .map(|o| Address::parse_or_derive(o))
        .collect::<Result<Vec<_>, _>>()?;

    let name = args.name.unwrap_or_else(|| config.wallet.name.clone());
    let address = Address::from_label(&name);

    // Without an explicit requirement, take the strictest one the mode admits.
    let requirement = args
        .requirement
        .unwrap_or_else(|| QuorumPolicy::default_requirement(args.mode, owners.len()));
    let wallet = Wallet::with_policy(address, &owners, requirement, args.mode)?;

    println!("🔐 Wallet created: {}", wallet.address());
    println!(
        "   Owners: {}  Requirement: {} ({})",
        wallet.owner_count(),
        wallet.requirement(),
        wallet.quorum_mode()
    );

    WalletState::new(wallet).save(state_path)?;
    println!("   State: {}", state_path.display());

    let config_path = config_path_for_state(state_path);
    if !config_path.exists() {
        if name == config.wallet.name && state_path == config.wallet.state_path {
            ConcordConfig::create_default(&config_path, state_path)?;
        } else {
            let mut written = config.clone();
            written.wallet.state_path = state_path.to_path_buf();
            written.wallet.name = name;
            written.save(&config_path)?;
        }
        info!(path = %config_path.display(), "config written");
        println!("   Config: {}", config_path.display());
    }

    Ok(())
}
