//! Outbound call seam.
//!
//! Executing a non-governance proposal hands an [`OutboundCall`] to a
//! [`Dispatcher`]. The dispatcher may call back into the wallet before
//! returning, but only through a [`Reentry`] handle that acts as the call's
//! destination. The destination can do whatever that address could do from
//! outside: deposit, act as an owner if it is one, and nothing more. It can
//! never act as the wallet itself, so governance stays behind proposals.

use super::error::WalletResult;
use super::{Amount, Confirmation, ExecutionOutcome, ProposalId, RequirementMode, Submission, Wallet};
use crate::address::Address;
use std::ops::Deref;
use thiserror::Error;

/// A single external invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundCall {
    /// Proposal being executed.
    pub proposal: ProposalId,
    /// Owner whose action triggered the execution.
    pub executor: Address,
    pub destination: Address,
    pub value: Amount,
    pub payload: Vec<u8>,
}

/// External call failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("call to {destination} rejected: {reason}")]
    Rejected { destination: Address, reason: String },

    #[error("destination {0} is unreachable")]
    Unreachable(Address),
}

/// Performs external calls on behalf of the wallet.
pub trait Dispatcher {
    /// Invoke `call.destination` with `call.value` and `call.payload`.
    ///
    /// `call.value` has already been debited from the wallet balance and is
    /// refunded if this returns an error.
    fn dispatch(&mut self, wallet: Reentry<'_>, call: &OutboundCall) -> Result<(), DispatchError>;
}

/// Accepts every call without side effects.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopDispatcher;

impl Dispatcher for NoopDispatcher {
    fn dispatch(&mut self, _wallet: Reentry<'_>, _call: &OutboundCall) -> Result<(), DispatchError> {
        Ok(())
    }
}

/// The wallet as seen by a callee during an outbound call.
///
/// Every mutation is made with the callee's own address as the caller.
/// Reads go through `Deref`.
pub struct Reentry<'a> {
    wallet: &'a mut Wallet,
    caller: Address,
}

impl<'a> Reentry<'a> {
    pub(crate) fn new(wallet: &'a mut Wallet, caller: Address) -> Self {
        Self { wallet, caller }
    }

    /// Address every call through this handle is made as.
    pub fn caller(&self) -> Address {
        self.caller
    }

    pub fn deposit(&mut self, amount: Amount) -> WalletResult<Amount> {
        self.wallet.deposit(self.caller, amount)
    }

    pub fn submit_transaction<D: Dispatcher + ?Sized>(
        &mut self,
        destination: Address,
        value: Amount,
        payload: Vec<u8>,
        dispatcher: &mut D,
    ) -> WalletResult<Submission> {
        self.wallet
            .submit_transaction(&self.caller, destination, value, payload, dispatcher)
    }

    pub fn confirm_transaction<D: Dispatcher + ?Sized>(
        &mut self,
        id: ProposalId,
        dispatcher: &mut D,
    ) -> WalletResult<Confirmation> {
        self.wallet.confirm_transaction(&self.caller, id, dispatcher)
    }

    pub fn revoke_confirmation(&mut self, id: ProposalId) -> WalletResult<()> {
        self.wallet.revoke_confirmation(&self.caller, id)
    }

    pub fn execute_transaction<D: Dispatcher + ?Sized>(
        &mut self,
        id: ProposalId,
        dispatcher: &mut D,
    ) -> WalletResult<ExecutionOutcome> {
        self.wallet.execute_transaction(&self.caller, id, dispatcher)
    }

    pub fn add_owner(&mut self, owner: Address) -> WalletResult<()> {
        self.wallet.add_owner(&self.caller, owner)
    }

    pub fn remove_owner(&mut self, owner: Address) -> WalletResult<()> {
        self.wallet.remove_owner(&self.caller, owner)
    }

    pub fn change_owner(&mut self, old: Address, new: Address) -> WalletResult<()> {
        self.wallet.change_owner(&self.caller, old, new)
    }

    pub fn change_requirement(
        &mut self,
        mode: RequirementMode,
        requirement: usize,
    ) -> WalletResult<()> {
        self.wallet.change_requirement(&self.caller, mode, requirement)
    }
}

impl Deref for Reentry<'_> {
    type Target = Wallet;

    fn deref(&self) -> &Wallet {
        self.wallet
    }
}
