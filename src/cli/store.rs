//! On-disk wallet state for the CLI.
//!
//! The snapshot is a single CBOR file holding the wallet plus the payout
//! ledger that the CLI dispatcher credits. Writes go to a sibling temp file
//! that is renamed over the snapshot, so an interrupted write never leaves a
//! half-written state behind.

use concord::serialization::{from_cbor, to_cbor, SerializationError};
use concord::wallet::{DispatchError, Dispatcher, OutboundCall, Reentry};
use concord::{Address, Amount, Wallet, WalletError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Snapshot store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no wallet at '{0}' (run `concord init` first)")]
    NotInitialized(PathBuf),

    #[error("a wallet already exists at '{0}' (use --force to overwrite)")]
    AlreadyExists(PathBuf),

    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Serialization(#[from] SerializationError),

    #[error("wallet state at '{path}' is invalid: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: WalletError,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Everything the CLI persists between invocations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletState {
    pub wallet: Wallet,

    /// Value delivered to each destination by executed proposals.
    #[serde(default)]
    pub payouts: BTreeMap<Address, Amount>,
}

impl WalletState {
    pub fn new(wallet: Wallet) -> Self {
        Self {
            wallet,
            payouts: BTreeMap::new(),
        }
    }

    /// Load an existing snapshot and re-check its owners and policy.
    pub fn load(path: &Path) -> StoreResult<Self> {
        if !path.exists() {
            return Err(StoreError::NotInitialized(path.to_path_buf()));
        }
        let bytes = fs::read(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let state: Self = from_cbor(&bytes)?;
        state
            .wallet
            .check_integrity()
            .map_err(|source| StoreError::Invalid {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(state)
    }

    /// Write the snapshot, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> StoreResult<()> {
        let io_err = |source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let bytes = to_cbor(self)?;
        let tmp = path.with_extension("cbor.tmp");
        fs::write(&tmp, bytes).map_err(io_err)?;
        fs::rename(&tmp, path).map_err(io_err)?;

        debug!(path = %path.display(), "wallet state saved");
        Ok(())
    }

    /// Split into the wallet and a dispatcher that credits the payout ledger.
    pub fn parts(&mut self) -> (&mut Wallet, PayoutDispatcher<'_>) {
        (
            &mut self.wallet,
            PayoutDispatcher {
                payouts: &mut self.payouts,
            },
        )
    }
}

/// Credits the value of every outbound call to its destination.
pub struct PayoutDispatcher<'a> {
    payouts: &'a mut BTreeMap<Address, Amount>,
}

impl Dispatcher for PayoutDispatcher<'_> {
    fn dispatch(&mut self, _wallet: Reentry<'_>, call: &OutboundCall) -> Result<(), DispatchError> {
        let credited = self.payouts.entry(call.destination).or_insert(0);
        *credited = credited
            .checked_add(call.value)
            .ok_or_else(|| DispatchError::Rejected {
                destination: call.destination,
                reason: "payout total overflows".to_string(),
            })?;

        debug!(
            proposal = call.proposal,
            destination = %call.destination,
            value = call.value,
            payload_len = call.payload.len(),
            "payout credited"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn two_of_three() -> Wallet {
        Wallet::new(
            Address::from_label("wallet"),
            &[
                Address::from_label("alice"),
                Address::from_label("bob"),
                Address::from_label("carol"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_load_missing_state() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("wallet.cbor");
        assert!(matches!(
            WalletState::load(&path),
            Err(StoreError::NotInitialized(_))
        ));
    }

    #[test]
    fn test_save_and_load_state() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("wallet.cbor");

        let mut state = WalletState::new(two_of_three());
        state.wallet.deposit(Address::from_label("donor"), 50).unwrap();
        state.save(&path).unwrap();

        let loaded = WalletState::load(&path).unwrap();
        assert_eq!(loaded.wallet.balance(), 50);
        assert_eq!(loaded.wallet.owner_count(), 3);
        assert_eq!(loaded.wallet.events().len(), 1);
        assert!(!path.with_extension("cbor.tmp").exists());
    }

    #[test]
    fn test_payouts_credited_on_execution() {
        let mut state = WalletState::new(two_of_three());
        let alice = Address::from_label("alice");
        let bob = Address::from_label("bob");
        let shop = Address::from_label("shop");

        let (wallet, mut dispatcher) = state.parts();
        wallet.deposit(alice, 100).unwrap();
        let id = wallet
            .submit_transaction(&alice, shop, 40, vec![], &mut dispatcher)
            .unwrap()
            .id;
        wallet.confirm_transaction(&bob, id, &mut dispatcher).unwrap();

        assert_eq!(state.payouts.get(&shop), Some(&40));
        assert_eq!(state.wallet.balance(), 60);
    }

    #[test]
    fn test_tampered_state_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("wallet.cbor");

        let state = WalletState::new(two_of_three());
        let mut value = serde_json::to_value(&state).unwrap();
        value["wallet"]["owners"]["owners"][2] = value["wallet"]["owners"]["owners"][0].clone();
        fs::write(&path, to_cbor(&value).unwrap()).unwrap();

        assert!(matches!(
            WalletState::load(&path),
            Err(StoreError::Invalid {
                source: WalletError::OwnerAlreadyExists(_),
                ..
            })
        ));

        let mut value = serde_json::to_value(&state).unwrap();
        value["wallet"]["policy"]["requirement"] = serde_json::json!(0);
        fs::write(&path, to_cbor(&value).unwrap()).unwrap();

        assert!(matches!(
            WalletState::load(&path),
            Err(StoreError::Invalid {
                source: WalletError::InvalidRequirement { .. },
                ..
            })
        ));
    }

    #[test]
    fn test_corrupt_state_fails() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("wallet.cbor");
        fs::write(&path, [0xff, 0x00]).unwrap();
        assert!(matches!(
            WalletState::load(&path),
            Err(StoreError::Serialization(_))
        ));
    }
}
