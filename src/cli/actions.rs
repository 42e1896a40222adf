//! State-changing commands: deposit, submit, govern, confirm, revoke, execute.
//!
//! Each command loads the snapshot, runs one wallet operation and saves the
//! snapshot only if the operation succeeded.

use super::store::WalletState;
use super::GovernAction;
use concord::wallet::Confirmation;
use concord::{Address, Amount, ExecutionOutcome, GovernanceOp, ProposalId};
use std::path::Path;

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn address(input: &str) -> Result<Address, Box<dyn std::error::Error>> {
    Ok(Address::parse_or_derive(input)?)
}

fn print_outcome(id: ProposalId, outcome: &ExecutionOutcome) {
    match outcome {
        ExecutionOutcome::Executed => println!("✅ Proposal #{} executed", id),
        ExecutionOutcome::Failed(reason) => {
            println!("❌ Proposal #{} failed: {}", id, reason);
            println!("   It stays pending; retry with `concord execute`.");
        }
    }
}

fn print_confirmation(id: ProposalId, confirmation: &Confirmation, requirement: usize) {
    println!(
        "👍 Proposal #{}: {} of {} approvals",
        id, confirmation.approvals, requirement
    );
    if let Some(outcome) = &confirmation.execution {
        print_outcome(id, outcome);
    }
}

pub fn deposit(state_path: &Path, from: &str, amount: Amount) -> CliResult {
    let mut state = WalletState::load(state_path)?;
    let balance = state.wallet.deposit(address(from)?, amount)?;
    state.save(state_path)?;

    println!("💰 Deposited {}; balance is now {}", amount, balance);
    Ok(())
}

/// Submit a proposal and report the immediate confirmation outcome.
fn submit_proposal(
    state_path: &Path,
    owner: &str,
    destination: Option<Address>,
    value: Amount,
    payload: Vec<u8>,
) -> CliResult {
    let caller = address(owner)?;
    let mut state = WalletState::load(state_path)?;
    let (wallet, mut dispatcher) = state.parts();

    let destination = destination.unwrap_or_else(|| wallet.address());
    let submission = wallet.submit_transaction(&caller, destination, value, payload, &mut dispatcher)?;
    let approvals = wallet.confirmation_count(submission.id)?;
    let requirement = wallet.requirement();
    state.save(state_path)?;

    println!("📝 Proposal #{} submitted", submission.id);
    println!("   {} of {} approvals", approvals, requirement);
    if let Some(outcome) = &submission.execution {
        print_outcome(submission.id, outcome);
    }
    Ok(())
}

pub fn submit(state_path: &Path, owner: &str, to: &str, value: Amount, data: Option<&str>) -> CliResult {
    let payload = match data {
        Some(hex_data) => hex::decode(hex_data.trim_start_matches("0x"))
            .map_err(|e| format!("Invalid --data hex: {}", e))?,
        None => Vec::new(),
    };
    submit_proposal(state_path, owner, Some(address(to)?), value, payload)
}

pub fn govern(state_path: &Path, owner: &str, action: GovernAction) -> CliResult {
    let op = match action {
        GovernAction::AddOwner { owner } => GovernanceOp::AddOwner {
            owner: address(&owner)?,
        },
        GovernAction::RemoveOwner { owner } => GovernanceOp::RemoveOwner {
            owner: address(&owner)?,
        },
        GovernAction::ChangeOwner { old, new } => GovernanceOp::ChangeOwner {
            old: address(&old)?,
            new: address(&new)?,
        },
        GovernAction::SetRequirement { requirement, mode } => {
            GovernanceOp::SetRequirement { mode, requirement }
        }
    };

    println!("🏛  Governance: {}", op);
    submit_proposal(state_path, owner, None, 0, op.encode()?)
}

pub fn confirm(state_path: &Path, owner: &str, id: ProposalId) -> CliResult {
    let caller = address(owner)?;
    let mut state = WalletState::load(state_path)?;
    let (wallet, mut dispatcher) = state.parts();

    let confirmation = wallet.confirm_transaction(&caller, id, &mut dispatcher)?;
    let requirement = wallet.requirement();
    state.save(state_path)?;

    print_confirmation(id, &confirmation, requirement);
    Ok(())
}

pub fn revoke(state_path: &Path, owner: &str, id: ProposalId) -> CliResult {
    let caller = address(owner)?;
    let mut state = WalletState::load(state_path)?;
    state.wallet.revoke_confirmation(&caller, id)?;
    let approvals = state.wallet.confirmation_count(id)?;
    state.save(state_path)?;

    println!("↩️  Approval revoked; proposal #{} has {} approvals", id, approvals);
    Ok(())
}

pub fn execute(state_path: &Path, owner: &str, id: ProposalId) -> CliResult {
    let caller = address(owner)?;
    let mut state = WalletState::load(state_path)?;
    let (wallet, mut dispatcher) = state.parts();

    let outcome = wallet.execute_transaction(&caller, id, &mut dispatcher)?;
    state.save(state_path)?;

    print_outcome(id, &outcome);
    Ok(())
}
