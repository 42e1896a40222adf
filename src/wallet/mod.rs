//! Multi-owner wallet: M-of-N proposal, approval and execution engine.
//!
//! Lifecycle of a proposal:
//! 1. An owner submits it; the submission counts as that owner's approval
//! 2. Other owners confirm (or revoke) their approvals
//! 3. After every confirmation, if the quorum policy is satisfied, the
//!    wallet attempts execution
//! 4. Success marks the proposal executed (terminal). Failure leaves it
//!    pending with its approvals intact, so it can be retried
//!
//! Proposals addressed to the wallet itself carry a [`GovernanceOp`] and
//! amend the owner set or the quorum policy. Everything else goes out
//! through a [`Dispatcher`].
//!
//! Reentrancy: the dispatcher calls back in through a [`Reentry`] handle
//! that acts as the call's destination, never as the wallet or as another
//! owner. While a proposal's external call is running, the proposal is held
//! in an in-progress set. Nested execute, confirm or revoke on that proposal
//! fail with [`WalletError::ExecutionInProgress`], so a proposal executes at
//! most once no matter what the callee does.

pub mod confirmations;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod governance;
pub mod ledger;
pub mod mock;
pub mod owners;
pub mod query;
pub mod quorum;

#[cfg(test)]
mod proptests;

pub use confirmations::ConfirmationTracker;
pub use dispatch::{DispatchError, Dispatcher, NoopDispatcher, OutboundCall, Reentry};
pub use error::{ErrorClass, ExecutionFailure, WalletError, WalletResult};
pub use events::{format_event_log, query_events, EventQuery, WalletEvent};
pub use governance::GovernanceOp;
pub use ledger::{Proposal, ProposalLedger};
pub use owners::OwnerRegistry;
pub use query::TxFilter;
pub use quorum::{QuorumPolicy, RequirementMode};

use crate::address::Address;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// Sequential proposal identifier, starting at 1.
pub type ProposalId = u64;

/// Value held by the wallet and moved by proposals.
pub type Amount = u128;

/// Result of an execution attempt that passed its preconditions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    Executed,
    Failed(ExecutionFailure),
}

impl ExecutionOutcome {
    pub fn is_executed(&self) -> bool {
        matches!(self, Self::Executed)
    }
}

/// Result of a successful confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    /// Approval count after this confirmation.
    pub approvals: usize,
    /// Outcome of the execution attempt, if the quorum was met.
    pub execution: Option<ExecutionOutcome>,
}

/// Result of a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub id: ProposalId,
    /// Outcome of the immediate execution attempt, if the submitter's
    /// approval alone met the quorum.
    pub execution: Option<ExecutionOutcome>,
}

/// The wallet engine. Owns every registry; there is no other mutation path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    address: Address,
    owners: OwnerRegistry,
    policy: QuorumPolicy,
    ledger: ProposalLedger,
    confirmations: ConfirmationTracker,
    #[serde(default)]
    balance: Amount,
    #[serde(default)]
    events: Vec<WalletEvent>,
    #[serde(skip)]
    in_flight: BTreeSet<ProposalId>,
}

impl Wallet {
    /// Create a wallet with the default policy: `UNDER`, `owners - 1` approvals.
    pub fn new(address: Address, owners: &[Address]) -> WalletResult<Self> {
        Self::build(address, owners, QuorumPolicy::default_for)
    }

    /// Create a wallet with an explicit policy.
    pub fn with_policy(
        address: Address,
        owners: &[Address],
        requirement: usize,
        mode: RequirementMode,
    ) -> WalletResult<Self> {
        Self::build(address, owners, |count| {
            QuorumPolicy::new(mode, requirement, count)
        })
    }

    /// Re-check the structural invariants of a wallet restored from a
    /// snapshot: a usable address, a valid owner set that excludes the wallet,
    /// and a policy that fits the owner count.
    pub fn check_integrity(&self) -> WalletResult<()> {
        if self.address.is_zero() {
            return Err(WalletError::InvalidArgument(
                "wallet address must not be the zero address".to_string(),
            ));
        }
        let owners = OwnerRegistry::from_owners(self.owners.list())?;
        if owners.is_member(&self.address) {
            return Err(WalletError::InvalidOwner(self.address));
        }
        QuorumPolicy::validate(self.policy.mode(), self.policy.requirement(), owners.count())?;
        if !self.ledger.is_sequential() {
            return Err(WalletError::InvalidArgument(
                "proposal ids are not sequential".to_string(),
            ));
        }
        Ok(())
    }

    fn build(
        address: Address,
        owners: &[Address],
        policy: impl FnOnce(usize) -> WalletResult<QuorumPolicy>,
    ) -> WalletResult<Self> {
        if address.is_zero() {
            return Err(WalletError::InvalidArgument(
                "wallet address must not be the zero address".to_string(),
            ));
        }

        let owners = OwnerRegistry::from_owners(owners)?;
        if owners.is_member(&address) {
            return Err(WalletError::InvalidOwner(address));
        }
        let policy = policy(owners.count())?;

        info!(
            wallet = %address,
            owners = owners.count(),
            requirement = policy.requirement(),
            mode = %policy.mode(),
            "wallet created"
        );

        Ok(Self {
            address,
            owners,
            policy,
            ledger: ProposalLedger::new(),
            confirmations: ConfirmationTracker::new(),
            balance: 0,
            events: Vec::new(),
            in_flight: BTreeSet::new(),
        })
    }

    /// Add value to the pool. Open to anyone. Returns the new balance.
    pub fn deposit(&mut self, sender: Address, amount: Amount) -> WalletResult<Amount> {
        if amount == 0 {
            return Err(WalletError::InvalidArgument(
                "deposit amount must be positive".to_string(),
            ));
        }
        self.balance = self.balance.checked_add(amount).ok_or_else(|| {
            WalletError::InvalidArgument("deposit would overflow the balance".to_string())
        })?;

        info!(sender = %sender, amount, balance = self.balance, "deposit received");
        self.events.push(WalletEvent::Deposited { sender, amount });
        Ok(self.balance)
    }

    /// Submit a proposal. The submitter's approval is recorded immediately,
    /// and the proposal executes at once if that alone meets the quorum.
    pub fn submit_transaction<D: Dispatcher + ?Sized>(
        &mut self,
        caller: &Address,
        destination: Address,
        value: Amount,
        payload: Vec<u8>,
        dispatcher: &mut D,
    ) -> WalletResult<Submission> {
        self.require_owner(caller)?;
        let id = self.ledger.submit(destination, value, payload.clone())?;

        info!(
            proposal = id,
            owner = %caller,
            destination = %destination,
            value,
            "proposal submitted"
        );
        self.events.push(WalletEvent::Submitted {
            owner: *caller,
            id,
            destination,
            value,
            payload,
        });

        let confirmation = self.confirm_and_try(caller, id, dispatcher)?;
        Ok(Submission {
            id,
            execution: confirmation.execution,
        })
    }

    /// Approve a proposal, then attempt execution if the quorum is met.
    pub fn confirm_transaction<D: Dispatcher + ?Sized>(
        &mut self,
        caller: &Address,
        id: ProposalId,
        dispatcher: &mut D,
    ) -> WalletResult<Confirmation> {
        self.require_owner(caller)?;
        self.confirm_and_try(caller, id, dispatcher)
    }

    /// Withdraw an approval from a pending proposal.
    pub fn revoke_confirmation(&mut self, caller: &Address, id: ProposalId) -> WalletResult<()> {
        self.require_owner(caller)?;
        let proposal = self.ledger.get(id)?;
        if self.in_flight.contains(&id) {
            warn!(proposal = id, owner = %caller, "revoke rejected during execution");
            return Err(WalletError::ExecutionInProgress(id));
        }
        let approvals = self.confirmations.revoke(proposal, caller)?;

        debug!(proposal = id, owner = %caller, approvals, "approval revoked");
        self.events.push(WalletEvent::Revoked { owner: *caller, id });
        Ok(())
    }

    /// Retry execution of a proposal that already meets the quorum.
    pub fn execute_transaction<D: Dispatcher + ?Sized>(
        &mut self,
        caller: &Address,
        id: ProposalId,
        dispatcher: &mut D,
    ) -> WalletResult<ExecutionOutcome> {
        self.require_owner(caller)?;
        self.try_execute(caller, id, dispatcher)
    }

    /// Governance: add an owner. Only the wallet itself may call this.
    pub fn add_owner(&mut self, caller: &Address, owner: Address) -> WalletResult<()> {
        self.require_self(caller)?;
        self.apply_governance(&GovernanceOp::AddOwner { owner })
    }

    /// Governance: remove an owner. Only the wallet itself may call this.
    pub fn remove_owner(&mut self, caller: &Address, owner: Address) -> WalletResult<()> {
        self.require_self(caller)?;
        self.apply_governance(&GovernanceOp::RemoveOwner { owner })
    }

    /// Governance: replace an owner. Only the wallet itself may call this.
    pub fn change_owner(&mut self, caller: &Address, old: Address, new: Address) -> WalletResult<()> {
        self.require_self(caller)?;
        self.apply_governance(&GovernanceOp::ChangeOwner { old, new })
    }

    /// Governance: change the quorum policy. Only the wallet itself may call this.
    pub fn change_requirement(
        &mut self,
        caller: &Address,
        mode: RequirementMode,
        requirement: usize,
    ) -> WalletResult<()> {
        self.require_self(caller)?;
        self.apply_governance(&GovernanceOp::SetRequirement { mode, requirement })
    }

    fn confirm_and_try<D: Dispatcher + ?Sized>(
        &mut self,
        caller: &Address,
        id: ProposalId,
        dispatcher: &mut D,
    ) -> WalletResult<Confirmation> {
        let proposal = self.ledger.get(id)?;
        if self.in_flight.contains(&id) {
            warn!(proposal = id, owner = %caller, "confirmation rejected during execution");
            return Err(WalletError::ExecutionInProgress(id));
        }
        let approvals = self.confirmations.confirm(proposal, *caller)?;

        debug!(proposal = id, owner = %caller, approvals, "approval granted");
        self.events.push(WalletEvent::Confirmed { owner: *caller, id });

        let execution = if self.policy.is_satisfied(approvals) {
            Some(self.try_execute(caller, id, dispatcher)?)
        } else {
            None
        };

        Ok(Confirmation {
            approvals,
            execution,
        })
    }

    fn try_execute<D: Dispatcher + ?Sized>(
        &mut self,
        executor: &Address,
        id: ProposalId,
        dispatcher: &mut D,
    ) -> WalletResult<ExecutionOutcome> {
        let proposal = self.ledger.get(id)?;
        if proposal.executed {
            return Err(WalletError::ProposalAlreadyExecuted(id));
        }
        if self.in_flight.contains(&id) {
            warn!(proposal = id, executor = %executor, "nested execution rejected");
            return Err(WalletError::ExecutionInProgress(id));
        }
        let approvals = self.confirmations.approval_count(id);
        if !self.policy.is_satisfied(approvals) {
            return Err(WalletError::QuorumNotMet {
                id,
                approvals,
                requirement: self.policy.requirement(),
            });
        }

        let call = OutboundCall {
            proposal: id,
            executor: *executor,
            destination: proposal.destination,
            value: proposal.value,
            payload: proposal.payload.clone(),
        };

        self.in_flight.insert(id);
        let result = if call.destination == self.address {
            self.apply_self_call(&call)
        } else {
            self.call_external(&call, dispatcher)
        };
        self.in_flight.remove(&id);

        match result {
            Ok(()) => {
                self.ledger.mark_executed(id)?;
                info!(proposal = id, executor = %executor, "proposal executed");
                self.events.push(WalletEvent::Executed {
                    owner: *executor,
                    id,
                });
                Ok(ExecutionOutcome::Executed)
            }
            Err(failure) => {
                warn!(proposal = id, executor = %executor, %failure, "proposal execution failed");
                self.events.push(WalletEvent::Failed {
                    owner: *executor,
                    id,
                    reason: failure.to_string(),
                });
                Ok(ExecutionOutcome::Failed(failure))
            }
        }
    }

    fn call_external<D: Dispatcher + ?Sized>(
        &mut self,
        call: &OutboundCall,
        dispatcher: &mut D,
    ) -> Result<(), ExecutionFailure> {
        if call.value > self.balance {
            return Err(ExecutionFailure::InsufficientBalance {
                required: call.value,
                available: self.balance,
            });
        }

        // Debit before the call; refund only if the call fails.
        self.balance -= call.value;
        if let Err(e) = dispatcher.dispatch(Reentry::new(self, call.destination), call) {
            self.balance = self.balance.saturating_add(call.value);
            return Err(ExecutionFailure::Dispatch(e));
        }
        Ok(())
    }

    /// Governance calls move no value; a self-addressed proposal carrying
    /// value fails instead of executing.
    fn apply_self_call(&mut self, call: &OutboundCall) -> Result<(), ExecutionFailure> {
        if call.value > 0 {
            return Err(ExecutionFailure::ValueToWallet(call.value));
        }
        let op = GovernanceOp::decode(&call.payload).map_err(ExecutionFailure::Payload)?;
        self.apply_governance(&op)
            .map_err(ExecutionFailure::Governance)
    }

    /// Apply a governance operation atomically: either every registry change
    /// and its events land, or nothing does.
    fn apply_governance(&mut self, op: &GovernanceOp) -> WalletResult<()> {
        match op {
            GovernanceOp::AddOwner { owner } => {
                let mut next = self.owners.clone();
                next.add(*owner)?;
                self.ensure_not_self(owner)?;
                self.commit_owners(next)?;
                self.events.push(WalletEvent::OwnerAdded { owner: *owner });
            }
            GovernanceOp::RemoveOwner { owner } => {
                let mut next = self.owners.clone();
                next.remove(owner)?;
                self.commit_owners(next)?;
                self.events.push(WalletEvent::OwnerRemoved { owner: *owner });
            }
            GovernanceOp::ChangeOwner { old, new } => {
                let mut next = self.owners.clone();
                next.replace(old, *new)?;
                self.ensure_not_self(new)?;
                self.owners = next;
                self.events.push(WalletEvent::OwnerRemoved { owner: *old });
                self.events.push(WalletEvent::OwnerAdded { owner: *new });
            }
            GovernanceOp::SetRequirement { mode, requirement } => {
                self.policy
                    .set_requirement(*mode, *requirement, self.owners.count())?;
                self.events.push(WalletEvent::RequirementChanged {
                    mode: *mode,
                    requirement: *requirement,
                });
            }
        }

        info!(wallet = %self.address, %op, "governance change applied");
        Ok(())
    }

    fn commit_owners(&mut self, next: OwnerRegistry) -> WalletResult<()> {
        self.policy.check_owner_count(next.count())?;
        self.owners = next;
        Ok(())
    }

    fn ensure_not_self(&self, owner: &Address) -> WalletResult<()> {
        if *owner == self.address {
            return Err(WalletError::InvalidOwner(*owner));
        }
        Ok(())
    }

    fn require_owner(&self, caller: &Address) -> WalletResult<()> {
        if !self.owners.is_member(caller) {
            return Err(WalletError::OnlyOwner(*caller));
        }
        Ok(())
    }

    fn require_self(&self, caller: &Address) -> WalletResult<()> {
        if *caller != self.address {
            return Err(WalletError::OnlyWallet);
        }
        Ok(())
    }
}
