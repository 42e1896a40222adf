//! Quorum policy: how many approvals a proposal needs, and how that number
//! may relate to the owner count.

use super::error::{WalletError, WalletResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Constraint between requirement and owner count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequirementMode {
    /// `requirement < owners`: at least one owner can always be missing.
    Under,
    /// `requirement <= owners`: unanimity is allowed.
    Equal,
}

impl RequirementMode {
    fn admits(self, requirement: usize, owners: usize) -> bool {
        match self {
            Self::Under => requirement < owners,
            Self::Equal => requirement <= owners,
        }
    }
}

impl fmt::Display for RequirementMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Under => write!(f, "UNDER"),
            Self::Equal => write!(f, "EQUAL"),
        }
    }
}

impl FromStr for RequirementMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "under" => Ok(Self::Under),
            "equal" => Ok(Self::Equal),
            other => Err(format!(
                "unknown requirement mode '{}', expected 'under' or 'equal'",
                other
            )),
        }
    }
}

/// Required approval count plus its mode.
///
/// Invariant: `requirement >= 1` and `mode` admits `requirement` against the
/// current owner count. Every constructor and mutator checks it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuorumPolicy {
    requirement: usize,
    mode: RequirementMode,
}

impl QuorumPolicy {
    /// Build a validated policy.
    pub fn new(mode: RequirementMode, requirement: usize, owners: usize) -> WalletResult<Self> {
        Self::validate(mode, requirement, owners)?;
        Ok(Self { requirement, mode })
    }

    /// `UNDER` with `owners - 1` approvals.
    pub fn default_for(owners: usize) -> WalletResult<Self> {
        Self::new(
            RequirementMode::Under,
            Self::default_requirement(RequirementMode::Under, owners),
            owners,
        )
    }

    /// Largest requirement `mode` admits: `owners - 1` under `UNDER`,
    /// `owners` under `EQUAL`.
    pub fn default_requirement(mode: RequirementMode, owners: usize) -> usize {
        match mode {
            RequirementMode::Under => owners.saturating_sub(1),
            RequirementMode::Equal => owners,
        }
    }

    /// Check a candidate pairing against an owner count.
    pub fn validate(mode: RequirementMode, requirement: usize, owners: usize) -> WalletResult<()> {
        if requirement >= 1 && mode.admits(requirement, owners) {
            Ok(())
        } else {
            Err(WalletError::InvalidRequirement {
                mode,
                requirement,
                owners,
            })
        }
    }

    /// Re-check the stored pairing against a new owner count.
    pub fn check_owner_count(&self, owners: usize) -> WalletResult<()> {
        Self::validate(self.mode, self.requirement, owners)
    }

    /// Replace both fields, or neither.
    pub fn set_requirement(
        &mut self,
        mode: RequirementMode,
        requirement: usize,
        owners: usize,
    ) -> WalletResult<()> {
        Self::validate(mode, requirement, owners)?;
        self.mode = mode;
        self.requirement = requirement;
        Ok(())
    }

    pub fn is_satisfied(&self, approvals: usize) -> bool {
        approvals >= self.requirement
    }

    pub fn requirement(&self) -> usize {
        self.requirement
    }

    pub fn mode(&self) -> RequirementMode {
        self.mode
    }
}
