//! The run-wide cancellation cell.
//!
//! A `CancelCell` is a write-once-wins signal: the first task to fire it
//! decides the fate of the whole run, carrying either a fatal error or a
//! clean completion. Later fires are dropped silently. Every walker task
//! consults [`CancelCell::is_fired`] before scheduling new work, and the
//! orchestrating caller blocks on [`CancelCell::wait`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex};

use super::CountError;

#[derive(Debug, Default)]
struct CellState {
    fired: bool,
    cause: Option<CountError>,
}

/// Write-once cancellation signal shared by all walker tasks.
///
/// The single-assignment state lives behind a mutex; an atomic mirror keeps
/// the hot-path `is_fired` check lock-free.
#[derive(Debug, Default)]
pub struct CancelCell {
    fired: AtomicBool,
    state: Mutex<CellState>,
    signalled: Condvar,
}

impl CancelCell {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire the cell with a cause: `Some(err)` for a fatal error, `None`
    /// for clean completion.
    ///
    /// Returns `true` if this call won the write; a cell that already fired
    /// drops the new cause and returns `false`.
    pub fn fire(&self, cause: Option<CountError>) -> bool {
        let mut state = self.state.lock().unwrap();
        if state.fired {
            log::trace!("cancellation already signalled, dropping later cause");
            return false;
        }
        state.fired = true;
        state.cause = cause;
        self.fired.store(true, Ordering::Release);
        self.signalled.notify_all();
        true
    }

    /// Whether the cell has fired, with either outcome.
    #[must_use]
    pub fn is_fired(&self) -> bool {
        self.fired.load(Ordering::Acquire)
    }

    /// Block until the cell fires and take the cause.
    ///
    /// Intended for the single orchestrating caller; the cause is moved out,
    /// so a second wait on the same cell observes a clean completion.
    pub fn wait(&self) -> Option<CountError> {
        let mut state = self.state.lock().unwrap();
        while !state.fired {
            state = self.signalled.wait(state).unwrap();
        }
        state.cause.take()
    }
}
