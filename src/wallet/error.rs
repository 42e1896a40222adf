//! Wallet error taxonomy.
//!
//! Errors fall into three classes:
//! - Authorization: the caller lacks the capability.
//! - Validation: the request is malformed or currently inapplicable. On the
//!   governance path these become the proposal's failure reason instead of
//!   aborting the confirming owner's call.
//! - State: the proposal is not in a state that allows the operation.

use super::dispatch::DispatchError;
use super::quorum::RequirementMode;
use super::{Amount, ProposalId};
use crate::address::Address;
use crate::serialization::SerializationError;
use thiserror::Error;

/// Error class, see module docs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Authorization,
    Validation,
    State,
}

/// Wallet operation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalletError {
    #[error("caller {0} is not an owner")]
    OnlyOwner(Address),

    #[error("operation may only be invoked by the wallet itself")]
    OnlyWallet,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid owner address: {0}")]
    InvalidOwner(Address),

    #[error("owner {0} already exists")]
    OwnerAlreadyExists(Address),

    #[error("owner {0} does not exist")]
    OwnerDoesNotExist(Address),

    #[error("invalid requirement {requirement} ({mode}) for {owners} owners")]
    InvalidRequirement {
        mode: RequirementMode,
        requirement: usize,
        owners: usize,
    },

    #[error("proposal {0} does not exist")]
    ProposalNotFound(ProposalId),

    #[error("proposal {0} was already executed")]
    ProposalAlreadyExecuted(ProposalId),

    #[error("proposal {id} already confirmed by {owner}")]
    AlreadyConfirmed { id: ProposalId, owner: Address },

    #[error("proposal {id} not confirmed by {owner}")]
    NotConfirmed { id: ProposalId, owner: Address },

    #[error("proposal {id} has {approvals} of {requirement} required approvals")]
    QuorumNotMet {
        id: ProposalId,
        approvals: usize,
        requirement: usize,
    },

    #[error("proposal {0} is being executed")]
    ExecutionInProgress(ProposalId),
}

impl WalletError {
    /// Classify this error.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::OnlyOwner(_) | Self::OnlyWallet => ErrorClass::Authorization,
            Self::InvalidArgument(_)
            | Self::InvalidOwner(_)
            | Self::OwnerAlreadyExists(_)
            | Self::OwnerDoesNotExist(_)
            | Self::InvalidRequirement { .. } => ErrorClass::Validation,
            Self::ProposalNotFound(_)
            | Self::ProposalAlreadyExecuted(_)
            | Self::AlreadyConfirmed { .. }
            | Self::NotConfirmed { .. }
            | Self::QuorumNotMet { .. }
            | Self::ExecutionInProgress(_) => ErrorClass::State,
        }
    }
}

/// Wallet result type.
pub type WalletResult<T> = Result<T, WalletError>;

/// Why an execution attempt that met its preconditions did not go through.
///
/// This is reported as the proposal's outcome, never as the caller's error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionFailure {
    #[error("governance operation rejected: {0}")]
    Governance(WalletError),

    #[error("governance payload does not decode: {0}")]
    Payload(SerializationError),

    #[error("governance proposals cannot carry value ({0} attached)")]
    ValueToWallet(Amount),

    #[error("insufficient balance: {required} required, {available} available")]
    InsufficientBalance { required: Amount, available: Amount },

    #[error(transparent)]
    Dispatch(DispatchError),
}
