//! Concord - M-of-N Multi-Owner Wallet Engine
//!
//! A fixed set of owners jointly controls a value pool and the capability to
//! invoke external actions. Every action is a proposal that runs only once
//! enough distinct owners have approved it.
//!
//! Key principles:
//! - Only owners may propose, confirm, revoke or execute
//! - Owner set and quorum policy change only through approved proposals
//!   addressed to the wallet itself
//! - A proposal executes at most once, even under reentrant dispatch
//! - Failed executions leave the proposal pending and retryable

pub mod address;
pub mod serialization;
pub mod wallet;

pub use address::Address;
pub use wallet::{
    Amount, Confirmation, Dispatcher, ExecutionOutcome, GovernanceOp, Proposal, ProposalId,
    Reentry, RequirementMode, Submission, TxFilter, Wallet, WalletError, WalletEvent,
    WalletResult,
};
