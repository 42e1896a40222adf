//! Governance operations.
//!
//! A proposal whose destination is the wallet's own address carries a
//! CBOR-encoded [`GovernanceOp`] as its payload. It is decoded once when the
//! proposal executes; anything that does not decode fails the execution.

use super::quorum::RequirementMode;
use crate::address::Address;
use crate::serialization::{from_cbor, to_cbor, SerializationError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Self-amending operations on the owner set and quorum policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GovernanceOp {
    AddOwner {
        owner: Address,
    },
    RemoveOwner {
        owner: Address,
    },
    ChangeOwner {
        old: Address,
        new: Address,
    },
    SetRequirement {
        mode: RequirementMode,
        requirement: usize,
    },
}

impl GovernanceOp {
    /// Encode as a proposal payload.
    pub fn encode(&self) -> Result<Vec<u8>, SerializationError> {
        to_cbor(self)
    }

    /// Decode a proposal payload.
    pub fn decode(payload: &[u8]) -> Result<Self, SerializationError> {
        from_cbor(payload)
    }
}

impl fmt::Display for GovernanceOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AddOwner { owner } => write!(f, "add owner {}", owner),
            Self::RemoveOwner { owner } => write!(f, "remove owner {}", owner),
            Self::ChangeOwner { old, new } => write!(f, "change owner {} -> {}", old, new),
            Self::SetRequirement { mode, requirement } => {
                write!(f, "set requirement {} ({})", requirement, mode)
            }
        }
    }
}
