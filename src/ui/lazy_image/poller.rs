// SPDX-License-Identifier: MPL-2.0
//! Load-completion polling.
//!
//! The load event only says the intrinsic size is known. Whether the image
//! is fully decoded is a separate flag, filled in by a background decode.
//! The poller checks that flag once when the load event arrives and then on
//! every tick of a timer subscription that only exists while a poll is
//! pending.

use std::sync::{Arc, Mutex};

use iced::widget::image::Handle;

use crate::domain::PollInterval;
use crate::error::LoadError;

/// Identifies one load cycle. Results carrying an older id are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct LoadId(u64);

impl LoadId {
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone)]
pub enum DecodeState {
    Pending,
    Decoded(Handle),
    Failed(LoadError),
}

/// Shared completeness flag of one image.
///
/// Cloned handles observe the same state: the decoder writes, the poller
/// reads.
#[derive(Debug, Clone)]
pub struct Completeness {
    state: Arc<Mutex<DecodeState>>,
}

impl Completeness {
    #[must_use]
    pub fn pending() -> Self {
        Self::with_state(DecodeState::Pending)
    }

    /// Already complete, e.g. served from the decoded cache.
    #[must_use]
    pub fn decoded(handle: Handle) -> Self {
        Self::with_state(DecodeState::Decoded(handle))
    }

    fn with_state(state: DecodeState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn complete(&self, handle: Handle) {
        self.set(DecodeState::Decoded(handle));
    }

    pub fn fail(&self, error: LoadError) {
        self.set(DecodeState::Failed(error));
    }

    fn set(&self, state: DecodeState) {
        // Mutex poisoned: the write is lost and `check` reports a failure.
        if let Ok(mut guard) = self.state.lock() {
            *guard = state;
        }
    }

    /// Snapshot of the current state. A poisoned lock reads as a failure.
    #[must_use]
    pub fn check(&self) -> DecodeState {
        match self.state.lock() {
            Ok(guard) => guard.clone(),
            Err(_) => DecodeState::Failed(LoadError::Decode("Lock poisoned".to_string())),
        }
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        matches!(self.check(), DecodeState::Decoded(_))
    }
}

impl Default for Completeness {
    fn default() -> Self {
        Self::pending()
    }
}

#[derive(Debug, Clone)]
pub struct PendingPoll {
    pub load_id: LoadId,
    completeness: Completeness,
    polls: u32,
}

/// Outcome of a completeness check.
#[derive(Debug, Clone)]
pub enum PollStatus {
    /// No poll is pending.
    Idle,
    /// Still decoding; check again on the next tick.
    Waiting,
    Ready {
        load_id: LoadId,
        handle: Handle,
        /// Timer ticks it took (0 when complete at load time).
        polls: u32,
    },
    Failed {
        load_id: LoadId,
        error: LoadError,
    },
}

/// Holds at most one pending completeness poll.
#[derive(Debug, Clone, Default)]
pub struct Poller {
    pending: Option<PendingPoll>,
    interval: PollInterval,
}

impl Poller {
    #[must_use]
    pub fn new(interval: PollInterval) -> Self {
        Self {
            pending: None,
            interval,
        }
    }

    #[must_use]
    pub fn interval(&self) -> PollInterval {
        self.interval
    }

    pub fn set_interval(&mut self, interval: PollInterval) {
        self.interval = interval;
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.pending.is_some()
    }

    #[must_use]
    pub fn pending_load(&self) -> Option<LoadId> {
        self.pending.as_ref().map(|p| p.load_id)
    }

    /// Starts waiting for `load_id` and checks it right away.
    ///
    /// Any earlier pending poll is dropped first.
    pub fn start(&mut self, load_id: LoadId, completeness: Completeness) -> PollStatus {
        self.pending = Some(PendingPoll {
            load_id,
            completeness,
            polls: 0,
        });
        self.check()
    }

    /// Timer callback: counts the tick and checks again.
    pub fn tick(&mut self) -> PollStatus {
        match self.pending.as_mut() {
            Some(pending) => {
                pending.polls = pending.polls.saturating_add(1);
                self.check()
            }
            None => PollStatus::Idle,
        }
    }

    /// Drops the pending poll. Returns its load id, if any.
    pub fn cancel(&mut self) -> Option<LoadId> {
        self.pending.take().map(|p| p.load_id)
    }

    fn check(&mut self) -> PollStatus {
        let Some(pending) = self.pending.as_ref() else {
            return PollStatus::Idle;
        };

        match pending.completeness.check() {
            DecodeState::Pending => PollStatus::Waiting,
            DecodeState::Decoded(handle) => {
                let load_id = pending.load_id;
                let polls = pending.polls;
                self.pending = None;
                PollStatus::Ready {
                    load_id,
                    handle,
                    polls,
                }
            }
            DecodeState::Failed(error) => {
                let load_id = pending.load_id;
                self.pending = None;
                PollStatus::Failed { load_id, error }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel() -> Handle {
        Handle::from_rgba(1, 1, vec![0; 4])
    }

    #[test]
    fn poisoned_flag_reads_as_failure_even_after_complete() {
        let completeness = Completeness::pending();
        let shared = completeness.clone();
        let _ = std::thread::spawn(move || {
            let _guard = shared.state.lock();
            panic!("decoder thread died");
        })
        .join();

        completeness.complete(pixel());
        assert!(matches!(completeness.check(), DecodeState::Failed(LoadError::Decode(_))));

        let mut poller = Poller::default();
        assert!(matches!(
            poller.start(LoadId::default(), completeness),
            PollStatus::Failed { .. }
        ));
        assert!(!poller.is_active());
    }

    #[test]
    fn complete_at_load_time_is_ready_immediately() {
        let mut poller = Poller::default();
        let status = poller.start(LoadId::default(), Completeness::decoded(pixel()));

        assert!(matches!(status, PollStatus::Ready { polls: 0, .. }));
        assert!(!poller.is_active());
    }

    #[test]
    fn pending_completeness_waits_until_flipped() {
        let mut poller = Poller::default();
        let completeness = Completeness::pending();
        let id = LoadId::default().next();

        assert!(matches!(poller.start(id, completeness.clone()), PollStatus::Waiting));
        assert!(poller.is_active());
        assert!(matches!(poller.tick(), PollStatus::Waiting));

        completeness.complete(pixel());
        match poller.tick() {
            PollStatus::Ready { load_id, polls, .. } => {
                assert_eq!(load_id, id);
                assert_eq!(polls, 2);
            }
            other => panic!("expected ready, got {other:?}"),
        }
        assert!(!poller.is_active());
    }

    #[test]
    fn failure_resolves_the_poll() {
        let mut poller = Poller::default();
        let completeness = Completeness::pending();
        poller.start(LoadId::default(), completeness.clone());

        completeness.fail(LoadError::Decode("truncated".into()));
        assert!(matches!(poller.tick(), PollStatus::Failed { .. }));
        assert!(matches!(poller.tick(), PollStatus::Idle));
    }

    #[test]
    fn cancel_silences_later_completion() {
        let mut poller = Poller::default();
        let completeness = Completeness::pending();
        let id = LoadId::default().next();
        poller.start(id, completeness.clone());

        assert_eq!(poller.cancel(), Some(id));
        completeness.complete(pixel());
        assert!(matches!(poller.tick(), PollStatus::Idle));
        assert_eq!(poller.cancel(), None);
    }

    #[test]
    fn start_replaces_previous_poll() {
        let mut poller = Poller::default();
        let first = Completeness::pending();
        let second = Completeness::pending();
        let first_id = LoadId::default().next();
        let second_id = first_id.next();

        poller.start(first_id, first.clone());
        poller.start(second_id, second);
        first.complete(pixel());

        assert!(matches!(poller.tick(), PollStatus::Waiting));
        assert_eq!(poller.pending_load(), Some(second_id));
    }

    #[test]
    fn interval_defaults_to_fifty_ms() {
        assert_eq!(Poller::default().interval().as_millis(), 50);
    }
}
