//! Wallet notifications.
//!
//! Every observable outcome is appended to the wallet's event log:
//! - Append-only, in the order the outcomes happened
//! - Failed operations append nothing, except an execution attempt, which
//!   records [`WalletEvent::Failed`] with the reason
//! - Persisted with the wallet snapshot

use super::quorum::RequirementMode;
use super::{Amount, ProposalId};
use crate::address::Address;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WalletEvent {
    Deposited {
        sender: Address,
        amount: Amount,
    },
    Submitted {
        owner: Address,
        id: ProposalId,
        destination: Address,
        value: Amount,
        payload: Vec<u8>,
    },
    Confirmed {
        owner: Address,
        id: ProposalId,
    },
    Revoked {
        owner: Address,
        id: ProposalId,
    },
    Executed {
        owner: Address,
        id: ProposalId,
    },
    Failed {
        owner: Address,
        id: ProposalId,
        reason: String,
    },
    OwnerAdded {
        owner: Address,
    },
    OwnerRemoved {
        owner: Address,
    },
    RequirementChanged {
        mode: RequirementMode,
        requirement: usize,
    },
}

impl WalletEvent {
    /// Proposal this event concerns, if any.
    pub fn proposal(&self) -> Option<ProposalId> {
        match self {
            Self::Submitted { id, .. }
            | Self::Confirmed { id, .. }
            | Self::Revoked { id, .. }
            | Self::Executed { id, .. }
            | Self::Failed { id, .. } => Some(*id),
            _ => None,
        }
    }

    /// Address that acted, if any.
    pub fn actor(&self) -> Option<Address> {
        match self {
            Self::Deposited { sender, .. } => Some(*sender),
            Self::Submitted { owner, .. }
            | Self::Confirmed { owner, .. }
            | Self::Revoked { owner, .. }
            | Self::Executed { owner, .. }
            | Self::Failed { owner, .. } => Some(*owner),
            _ => None,
        }
    }
}

impl fmt::Display for WalletEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deposited { sender, amount } => {
                write!(f, "deposit of {} from {}", amount, sender.short())
            }
            Self::Submitted {
                owner,
                id,
                destination,
                value,
                ..
            } => write!(
                f,
                "#{} submitted by {}: {} to {}",
                id,
                owner.short(),
                value,
                destination.short()
            ),
            Self::Confirmed { owner, id } => write!(f, "#{} confirmed by {}", id, owner.short()),
            Self::Revoked { owner, id } => write!(f, "#{} revoked by {}", id, owner.short()),
            Self::Executed { owner, id } => write!(f, "#{} executed by {}", id, owner.short()),
            Self::Failed { owner, id, reason } => {
                write!(f, "#{} failed for {}: {}", id, owner.short(), reason)
            }
            Self::OwnerAdded { owner } => write!(f, "owner added: {}", owner),
            Self::OwnerRemoved { owner } => write!(f, "owner removed: {}", owner),
            Self::RequirementChanged { mode, requirement } => {
                write!(f, "requirement changed to {} ({})", requirement, mode)
            }
        }
    }
}

/// Filters for [`query_events`].
#[derive(Debug, Clone, Default)]
pub struct EventQuery {
    /// Only events about this proposal.
    pub proposal: Option<ProposalId>,
    /// Only events by this actor.
    pub actor: Option<Address>,
    /// Keep only the most recent `limit` matches.
    pub limit: Option<usize>,
}

/// Filter the log, oldest first.
pub fn query_events<'a>(events: &'a [WalletEvent], query: &EventQuery) -> Vec<&'a WalletEvent> {
    let mut matched: Vec<&WalletEvent> = events
        .iter()
        .filter(|event| {
            if let Some(id) = query.proposal {
                if event.proposal() != Some(id) {
                    return false;
                }
            }
            if let Some(actor) = query.actor {
                if event.actor() != Some(actor) {
                    return false;
                }
            }
            true
        })
        .collect();

    if let Some(limit) = query.limit {
        let skip = matched.len().saturating_sub(limit);
        matched.drain(..skip);
    }

    matched
}

/// Render the log for terminal output.
pub fn format_event_log(events: &[&WalletEvent]) -> String {
    if events.is_empty() {
        return "No events recorded.".to_string();
    }

    events
        .iter()
        .map(|event| format!("• {}", event))
        .collect::<Vec<_>>()
        .join("\n")
}
