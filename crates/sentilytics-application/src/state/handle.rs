//! Observable state cell shared by every application component.

use sentilytics_core::state::{AppState, Operation, StateAction};
use sentilytics_core::{Result, SentilyticsError};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;

struct Inner {
    tx: watch::Sender<AppState>,
    next_ticket: AtomicU64,
}

/// Cloneable handle to the current [`AppState`] snapshot.
///
/// Writers go through [`StateHandle::dispatch`], which runs the reducer and
/// notifies subscribers. Readers either clone a snapshot or subscribe to a
/// `watch` receiver.
#[derive(Clone)]
pub struct StateHandle {
    inner: Arc<Inner>,
}

impl StateHandle {
    pub fn new() -> Self {
        Self::with_state(AppState::new())
    }

    pub fn with_state(initial: AppState) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self {
            inner: Arc::new(Inner {
                tx,
                next_ticket: AtomicU64::new(1),
            }),
        }
    }

    /// Applies `action` to the current snapshot.
    pub fn dispatch(&self, action: StateAction) {
        self.inner.tx.send_modify(|state| {
            let current = std::mem::take(state);
            *state = current.reduce(action);
        });
    }

    pub fn snapshot(&self) -> AppState {
        self.inner.tx.borrow().clone()
    }

    /// Reads from the current snapshot without cloning all of it.
    pub fn read<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        f(&self.inner.tx.borrow())
    }

    /// Epoch of the current session, for tagging session-scoped results.
    pub fn session_epoch(&self) -> u64 {
        self.read(|state| state.session_epoch)
    }

    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.inner.tx.subscribe()
    }

    /// Claims the busy state for `operation`.
    ///
    /// Fails with `Busy` when another operation holds it. The returned guard
    /// releases the claim when dropped, whatever path the caller takes.
    pub fn try_begin(&self, operation: Operation) -> Result<BusyGuard> {
        let ticket = self.inner.next_ticket.fetch_add(1, Ordering::Relaxed);
        let mut holder = None;
        let mut session_epoch = 0;

        // Check and claim under the same borrow so two callers cannot both win
        let claimed = self.inner.tx.send_if_modified(|state| {
            if let Some(current) = state.busy.operation() {
                holder = Some(current);
                return false;
            }
            session_epoch = state.session_epoch;
            let current = std::mem::take(state);
            *state = current.reduce(StateAction::OperationStarted { operation, ticket });
            true
        });

        if !claimed {
            let holder = holder.unwrap_or(operation);
            tracing::debug!(
                requested = %operation,
                holder = %holder,
                "[StateHandle] Rejected operation while busy"
            );
            return Err(SentilyticsError::Busy { operation: holder });
        }

        tracing::debug!(operation = %operation, ticket, "[StateHandle] Busy state acquired");
        Ok(BusyGuard {
            state: self.clone(),
            operation,
            ticket,
            session_epoch,
        })
    }
}

impl Default for StateHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Holds the busy state until dropped.
#[must_use = "the busy state is released as soon as the guard is dropped"]
pub struct BusyGuard {
    state: StateHandle,
    operation: Operation,
    ticket: u64,
    session_epoch: u64,
}

impl BusyGuard {
    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn ticket(&self) -> u64 {
        self.ticket
    }

    /// Session epoch at the moment the busy state was claimed.
    pub fn session_epoch(&self) -> u64 {
        self.session_epoch
    }

    /// Whether the session that claimed the busy state is still current.
    pub fn session_is_current(&self) -> bool {
        self.state.read(|state| state.is_current(self.session_epoch))
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.state.dispatch(StateAction::OperationFinished {
            ticket: self.ticket,
        });
        tracing::debug!(
            operation = %self.operation,
            ticket = self.ticket,
            "[StateHandle] Busy state released"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentilytics_core::state::{BusyState, Notice};

    #[test]
    fn test_dispatch_updates_snapshot() {
        let state = StateHandle::new();
        state.dispatch(StateAction::NoticePosted(Notice::info("hello")));
        assert_eq!(state.snapshot().notices.len(), 1);
        assert_eq!(state.read(|s| s.notices[0].message.clone()), "hello");
    }

    #[test]
    fn test_busy_guard_rejects_second_operation() {
        let state = StateHandle::new();
        let guard = state.try_begin(Operation::Analysis).unwrap();
        assert!(state.snapshot().is_busy());

        let err = state.try_begin(Operation::Upload).err().unwrap();
        assert_eq!(
            err,
            SentilyticsError::Busy {
                operation: Operation::Analysis
            }
        );

        drop(guard);
        assert_eq!(state.snapshot().busy, BusyState::Idle);
        assert!(state.try_begin(Operation::Upload).is_ok());
    }

    #[test]
    fn test_tickets_are_unique() {
        let state = StateHandle::new();
        let first = state.try_begin(Operation::Upload).unwrap().ticket();
        let second = state.try_begin(Operation::Upload).unwrap().ticket();
        assert_ne!(first, second);
    }

    #[test]
    fn test_guard_notices_session_change() {
        let state = StateHandle::new();
        let guard = state.try_begin(Operation::Analysis).unwrap();
        assert_eq!(guard.session_epoch(), state.session_epoch());
        assert!(guard.session_is_current());

        state.dispatch(StateAction::SessionCleared);
        assert!(!guard.session_is_current());
        assert_ne!(guard.session_epoch(), state.session_epoch());
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let state = StateHandle::new();
        let mut rx = state.subscribe();

        let guard = state.try_begin(Operation::Upload).unwrap();
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_busy());

        drop(guard);
        rx.changed().await.unwrap();
        assert!(!rx.borrow_and_update().is_busy());
    }
}
