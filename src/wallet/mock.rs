//! Mock dispatcher for testing.
//!
//! Records every outbound call and rejects calls to destinations marked
//! with [`RecordingDispatcher::reject`].

use super::dispatch::{DispatchError, Dispatcher, OutboundCall, Reentry};
use crate::address::Address;
use std::collections::BTreeSet;

/// Recording dispatcher for tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingDispatcher {
    calls: Vec<OutboundCall>,
    rejecting: BTreeSet<Address>,
}

impl RecordingDispatcher {
    /// Create new recorder that accepts everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make calls to `destination` fail.
    pub fn reject(&mut self, destination: Address) {
        self.rejecting.insert(destination);
    }

    /// Make calls to `destination` succeed again.
    pub fn accept(&mut self, destination: &Address) {
        self.rejecting.remove(destination);
    }

    /// Successful calls, in order.
    pub fn calls(&self) -> &[OutboundCall] {
        &self.calls
    }

    pub fn call_count(&self) -> usize {
        self.calls.len()
    }
}

impl Dispatcher for RecordingDispatcher {
    fn dispatch(&mut self, _wallet: Reentry<'_>, call: &OutboundCall) -> Result<(), DispatchError> {
        if self.rejecting.contains(&call.destination) {
            return Err(DispatchError::Rejected {
                destination: call.destination,
                reason: "destination reverted".to_string(),
            });
        }
        self.calls.push(call.clone());
        Ok(())
    }
}
