//! Confirmation tracker.
//!
//! Per-proposal approver sets, insertion-ordered. Mutators take the
//! proposal record itself, so a set can only ever be created for a proposal
//! that exists; the tracker never controls the proposal's lifecycle.

use super::error::{WalletError, WalletResult};
use super::ledger::Proposal;
use super::ProposalId;
use crate::address::Address;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Approvals keyed by proposal id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationTracker {
    approvals: BTreeMap<ProposalId, Vec<Address>>,
}

impl ConfirmationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `owner`'s approval and return the new approval count.
    pub fn confirm(&mut self, proposal: &Proposal, owner: Address) -> WalletResult<usize> {
        if proposal.executed {
            return Err(WalletError::ProposalAlreadyExecuted(proposal.id));
        }

        let approvers = self.approvals.entry(proposal.id).or_default();
        if approvers.contains(&owner) {
            return Err(WalletError::AlreadyConfirmed {
                id: proposal.id,
                owner,
            });
        }
        approvers.push(owner);
        Ok(approvers.len())
    }

    /// Withdraw `owner`'s approval and return the new approval count.
    pub fn revoke(&mut self, proposal: &Proposal, owner: &Address) -> WalletResult<usize> {
        if proposal.executed {
            return Err(WalletError::ProposalAlreadyExecuted(proposal.id));
        }

        let not_confirmed = WalletError::NotConfirmed {
            id: proposal.id,
            owner: *owner,
        };
        let approvers = self
            .approvals
            .get_mut(&proposal.id)
            .ok_or_else(|| not_confirmed.clone())?;
        let index = approvers
            .iter()
            .position(|a| a == owner)
            .ok_or(not_confirmed)?;
        approvers.remove(index);
        Ok(approvers.len())
    }

    pub fn approval_count(&self, id: ProposalId) -> usize {
        self.approvals.get(&id).map_or(0, Vec::len)
    }

    /// Approvers in the order they confirmed.
    pub fn approvers(&self, id: ProposalId) -> &[Address] {
        self.approvals.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_approved(&self, id: ProposalId, owner: &Address) -> bool {
        self.approvers(id).contains(owner)
    }
}
