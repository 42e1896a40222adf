//! Read-only views over the wallet.
//!
//! Nothing here mutates state, so repeating a query against an unchanged
//! wallet always returns the same answer.

use super::error::WalletResult;
use super::events::WalletEvent;
use super::ledger::{Proposal, ProposalLedger};
use super::quorum::RequirementMode;
use super::{Amount, ProposalId, Wallet};
use crate::address::Address;

/// Which proposals [`list_by_filter`] includes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxFilter {
    pub include_pending: bool,
    pub include_executed: bool,
}

impl TxFilter {
    pub const ALL: TxFilter = TxFilter {
        include_pending: true,
        include_executed: true,
    };
    pub const PENDING: TxFilter = TxFilter {
        include_pending: true,
        include_executed: false,
    };
    pub const EXECUTED: TxFilter = TxFilter {
        include_pending: false,
        include_executed: true,
    };

    fn admits(&self, proposal: &Proposal) -> bool {
        if proposal.executed {
            self.include_executed
        } else {
            self.include_pending
        }
    }
}

/// Page through proposals matching `filter`, ascending by id.
///
/// `offset` is the 1-based rank within the filtered sequence (0 is treated
/// as 1). At most `limit` proposals are returned; an offset past the end of
/// the filtered sequence yields an empty page.
pub fn list_by_filter(
    ledger: &ProposalLedger,
    offset: usize,
    limit: usize,
    filter: TxFilter,
) -> Vec<Proposal> {
    ledger
        .iter()
        .filter(|p| filter.admits(p))
        .skip(offset.max(1) - 1)
        .take(limit)
        .cloned()
        .collect()
}

impl Wallet {
    /// The wallet's own address (the governance destination).
    pub fn address(&self) -> Address {
        self.address
    }

    pub fn balance(&self) -> Amount {
        self.balance
    }

    pub fn is_owner(&self, owner: &Address) -> bool {
        self.owners.is_member(owner)
    }

    pub fn owner_count(&self) -> usize {
        self.owners.count()
    }

    /// Owners in enumeration order.
    pub fn owners(&self) -> &[Address] {
        self.owners.list()
    }

    pub fn proposal_exists(&self, id: ProposalId) -> bool {
        self.ledger.exists(id)
    }

    pub fn proposal_count(&self) -> usize {
        self.ledger.count()
    }

    pub fn get_proposal(&self, id: ProposalId) -> WalletResult<&Proposal> {
        self.ledger.get(id)
    }

    /// Whether the proposal currently has enough approvals to execute.
    pub fn is_confirmed(&self, id: ProposalId) -> WalletResult<bool> {
        Ok(self.policy.is_satisfied(self.confirmation_count(id)?))
    }

    pub fn confirmed_by_owner(&self, id: ProposalId, owner: &Address) -> WalletResult<bool> {
        self.ledger.get(id)?;
        Ok(self.confirmations.has_approved(id, owner))
    }

    pub fn confirmation_count(&self, id: ProposalId) -> WalletResult<usize> {
        self.ledger.get(id)?;
        Ok(self.confirmations.approval_count(id))
    }

    /// Approvers in the order they confirmed.
    pub fn confirmers_of(&self, id: ProposalId) -> WalletResult<&[Address]> {
        self.ledger.get(id)?;
        Ok(self.confirmations.approvers(id))
    }

    pub fn quorum_mode(&self) -> RequirementMode {
        self.policy.mode()
    }

    pub fn requirement(&self) -> usize {
        self.policy.requirement()
    }

    /// See [`list_by_filter`].
    pub fn list_by_filter(&self, offset: usize, limit: usize, filter: TxFilter) -> Vec<Proposal> {
        list_by_filter(&self.ledger, offset, limit, filter)
    }

    /// Notifications recorded so far, oldest first.
    pub fn events(&self) -> &[WalletEvent] {
        &self.events
    }

    /// Drain the notification log.
    pub fn take_events(&mut self) -> Vec<WalletEvent> {
        std::mem::take(&mut self.events)
    }
}
