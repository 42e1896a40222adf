//! Owner registry.
//!
//! Ordered set of owner addresses. Enumeration order is insertion order;
//! removal keeps the relative order of the remaining owners so queries are
//! reproducible.

use super::error::{WalletError, WalletResult};
use crate::address::Address;
use serde::{Deserialize, Serialize};

/// Ordered, duplicate-free set of owners.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerRegistry {
    owners: Vec<Address>,
}

impl OwnerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from an ordered list, rejecting zero and duplicate entries.
    pub fn from_owners(owners: &[Address]) -> WalletResult<Self> {
        let mut registry = Self::new();
        for owner in owners {
            registry.add(*owner)?;
        }
        Ok(registry)
    }

    /// Append an owner.
    pub fn add(&mut self, owner: Address) -> WalletResult<()> {
        if owner.is_zero() {
            return Err(WalletError::InvalidOwner(owner));
        }
        if self.is_member(&owner) {
            return Err(WalletError::OwnerAlreadyExists(owner));
        }
        self.owners.push(owner);
        Ok(())
    }

    /// Remove an owner, compacting the order.
    ///
    /// The caller is responsible for re-validating the quorum policy against
    /// the new count before committing the change.
    pub fn remove(&mut self, owner: &Address) -> WalletResult<()> {
        let index = self
            .position(owner)
            .ok_or(WalletError::OwnerDoesNotExist(*owner))?;
        self.owners.remove(index);
        Ok(())
    }

    /// Swap `old` for `new` in place. The count does not change.
    pub fn replace(&mut self, old: &Address, new: Address) -> WalletResult<()> {
        let index = self
            .position(old)
            .ok_or(WalletError::OwnerDoesNotExist(*old))?;
        if new.is_zero() {
            return Err(WalletError::InvalidOwner(new));
        }
        if self.is_member(&new) {
            return Err(WalletError::OwnerAlreadyExists(new));
        }
        self.owners[index] = new;
        Ok(())
    }

    pub fn is_member(&self, owner: &Address) -> bool {
        self.owners.contains(owner)
    }

    pub fn count(&self) -> usize {
        self.owners.len()
    }

    /// Owners in enumeration order.
    pub fn list(&self) -> &[Address] {
        &self.owners
    }

    fn position(&self, owner: &Address) -> Option<usize> {
        self.owners.iter().position(|o| o == owner)
    }
}
