//! Proposal ledger.
//!
//! Append-only record of proposals. Ids start at 1 and are assigned
//! sequentially; nothing is ever removed, so `id == index + 1` always holds.

use super::error::{WalletError, WalletResult};
use super::{Amount, ProposalId};
use crate::address::Address;
use serde::{Deserialize, Serialize};

/// A recorded intent to perform an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    pub destination: Address,
    pub value: Amount,
    pub payload: Vec<u8>,
    pub executed: bool,
}

/// Append-only proposal storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalLedger {
    proposals: Vec<Proposal>,
}

impl ProposalLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new proposal and return its id.
    pub fn submit(
        &mut self,
        destination: Address,
        value: Amount,
        payload: Vec<u8>,
    ) -> WalletResult<ProposalId> {
        if destination.is_zero() {
            return Err(WalletError::InvalidArgument(
                "destination must not be the zero address".to_string(),
            ));
        }

        let id = self.proposals.len() as ProposalId + 1;
        self.proposals.push(Proposal {
            id,
            destination,
            value,
            payload,
            executed: false,
        });
        Ok(id)
    }

    pub fn get(&self, id: ProposalId) -> WalletResult<&Proposal> {
        id.checked_sub(1)
            .and_then(|index| self.proposals.get(index as usize))
            .ok_or(WalletError::ProposalNotFound(id))
    }

    pub fn exists(&self, id: ProposalId) -> bool {
        self.get(id).is_ok()
    }

    pub fn count(&self) -> usize {
        self.proposals.len()
    }

    /// Whether every stored proposal sits at `id == index + 1`.
    pub fn is_sequential(&self) -> bool {
        self.proposals
            .iter()
            .zip(1..)
            .all(|(proposal, id)| proposal.id == id)
    }

    /// All proposals in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Proposal> {
        self.proposals.iter()
    }

    /// Flip `executed` to true. Only the execution engine calls this.
    pub(crate) fn mark_executed(&mut self, id: ProposalId) -> WalletResult<()> {
        let proposal = id
            .checked_sub(1)
            .and_then(|index| self.proposals.get_mut(index as usize))
            .ok_or(WalletError::ProposalNotFound(id))?;
        if proposal.executed {
            return Err(WalletError::ProposalAlreadyExecuted(id));
        }
        proposal.executed = true;
        Ok(())
    }
}
