//! Single-slot deferred fault store.
//!
//! An error raised by an observer callback cannot be returned from the
//! middle of a socket drain, so each listener parks it here. The slot holds
//! at most one fault: the first one wins, later callbacks are suppressed
//! while it is occupied, and `pump()` drains it at its next safe point.

use super::error::Error;

#[derive(Debug, Default)]
pub(crate) struct FaultSlot {
    fault: Option<Error>,
}

impl FaultSlot {
    /// Store a fault. A slot that is already occupied keeps its original
    /// fault; the new one is dropped.
    pub(crate) fn set(&mut self, err: Error) {
        if self.fault.is_none() {
            self.fault = Some(err);
        }
    }

    /// Whether a fault is waiting to be drained. Delivery is suppressed
    /// while this returns true.
    pub(crate) fn is_set(&self) -> bool {
        self.fault.is_some()
    }

    /// Drain the slot.
    pub(crate) fn take(&mut self) -> Option<Error> {
        self.fault.take()
    }
}
