//! Read-only commands: status, list, log.

use super::store::WalletState;
use concord::wallet::{format_event_log, query_events, EventQuery};
use concord::{Address, Amount, Proposal, ProposalId, TxFilter, Wallet};
use serde::Serialize;
use std::path::Path;

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Serialize)]
struct StatusView {
    address: String,
    balance: Amount,
    owners: Vec<String>,
    requirement: usize,
    mode: String,
    proposals: usize,
    pending: usize,
    payouts: Vec<PayoutView>,
}

#[derive(Serialize)]
struct PayoutView {
    destination: String,
    total: Amount,
}

#[derive(Serialize)]
struct ProposalView {
    id: ProposalId,
    destination: String,
    value: Amount,
    payload: String,
    executed: bool,
    approvals: usize,
    approvers: Vec<String>,
}

impl ProposalView {
    fn new(wallet: &Wallet, proposal: &Proposal) -> Self {
        let approvers = wallet.confirmers_of(proposal.id).unwrap_or_default();
        Self {
            id: proposal.id,
            destination: proposal.destination.to_string(),
            value: proposal.value,
            payload: hex::encode(&proposal.payload),
            executed: proposal.executed,
            approvals: approvers.len(),
            approvers: approvers.iter().map(Address::to_string).collect(),
        }
    }
}

/// Show owners, policy, balance and payouts
pub fn execute(state_path: &Path, json: bool) -> CliResult {
    let state = WalletState::load(state_path)?;
    let wallet = &state.wallet;
    let pending = wallet
        .list_by_filter(1, usize::MAX, TxFilter::PENDING)
        .len();

    if json {
        let view = StatusView {
            address: wallet.address().to_string(),
            balance: wallet.balance(),
            owners: wallet.owners().iter().map(Address::to_string).collect(),
            requirement: wallet.requirement(),
            mode: wallet.quorum_mode().to_string(),
            proposals: wallet.proposal_count(),
            pending,
            payouts: state
                .payouts
                .iter()
                .map(|(destination, total)| PayoutView {
                    destination: destination.to_string(),
                    total: *total,
                })
                .collect(),
        };
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    println!("📊 Concord Wallet Status");
    println!();
    println!("  Address: {}", wallet.address());
    println!("  Balance: {}", wallet.balance());
    println!(
        "  Requirement: {} of {} ({})",
        wallet.requirement(),
        wallet.owner_count(),
        wallet.quorum_mode()
    );
    println!(
        "  Proposals: {} ({} pending)",
        wallet.proposal_count(),
        pending
    );
    println!();
    println!("  Owners:");
    for owner in wallet.owners() {
        println!("    {}", owner);
    }
    if !state.payouts.is_empty() {
        println!();
        println!("  Payouts:");
        for (destination, total) in &state.payouts {
            println!("    {} ← {}", destination, total);
        }
    }

    Ok(())
}

/// List proposals, one page at a time
pub fn list(
    state_path: &Path,
    offset: usize,
    limit: usize,
    pending: bool,
    executed: bool,
    json: bool,
) -> CliResult {
    let state = WalletState::load(state_path)?;
    let wallet = &state.wallet;

    // No flag means both
    let filter = if pending || executed {
        TxFilter {
            include_pending: pending,
            include_executed: executed,
        }
    } else {
        TxFilter::ALL
    };

    let views: Vec<ProposalView> = wallet
        .list_by_filter(offset, limit, filter)
        .iter()
        .map(|p| ProposalView::new(wallet, p))
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&views)?);
        return Ok(());
    }

    if views.is_empty() {
        println!("No proposals.");
        return Ok(());
    }

    for view in &views {
        let status = if view.executed { "executed" } else { "pending" };
        println!(
            "#{:<4} {:<8} {} → {}  ({}/{} approvals)",
            view.id,
            status,
            view.value,
            view.destination,
            view.approvals,
            wallet.requirement()
        );
    }

    Ok(())
}

/// Show the event log
pub fn log(
    state_path: &Path,
    proposal: Option<ProposalId>,
    actor: Option<&str>,
    limit: Option<usize>,
) -> CliResult {
    let state = WalletState::load(state_path)?;
    let query = EventQuery {
        proposal,
        actor: actor.map(Address::parse_or_derive).transpose()?,
        limit,
    };

    let events = query_events(state.wallet.events(), &query);
    println!("{}", format_event_log(&events));
    Ok(())
}
