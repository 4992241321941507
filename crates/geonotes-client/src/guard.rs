// ABOUTME: Re-entrancy guard for user-triggered actions (save, delete, refresh)
// ABOUTME: A trigger stays disabled while its ticket is alive

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Gate for one user-facing action.
///
/// Clone it into whatever renders the trigger; `is_busy` drives the disabled
/// state and `try_begin` refuses a second submission while the first is in
/// flight.
#[derive(Debug, Clone, Default)]
pub struct ActionGuard {
    busy: Arc<AtomicBool>,
}

/// Proof that the action is running. Dropping it re-enables the trigger,
/// including on early return or panic.
#[derive(Debug)]
pub struct ActionTicket {
    busy: Arc<AtomicBool>,
}

impl ActionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_begin(&self) -> Option<ActionTicket> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| ActionTicket {
                busy: Arc::clone(&self.busy),
            })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

impl Drop for ActionTicket {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}
