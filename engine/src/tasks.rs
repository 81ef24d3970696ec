//! Background requests.
//!
//! Each effect runs as one spawned task that reports back with exactly one
//! [`Event`] through the completion channel. The report is owned by a
//! [`CompletionGuard`]: if the task ends without reporting (panic, abort,
//! runtime shutdown), the guard's drop sends a failure instead, so the
//! `loading`/`submitting` flags are always released while the dashboard is
//! alive. Once the dashboard is gone the channel is closed and every report
//! is dropped silently. Reports carry the epoch they were spawned in, so a
//! report from before an unmount is discarded after a remount.

use tokio::sync::mpsc;
use tracing::{debug, warn};

use userdash_client::BackendClient;
use userdash_types::NewUser;

use crate::state::{DashboardError, Snapshot};
use crate::update::Event;

/// A report from a background task.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Completion {
    pub(crate) epoch: u64,
    pub(crate) event: Event,
}

pub(crate) struct CompletionGuard {
    tx: Option<mpsc::UnboundedSender<Completion>>,
    epoch: u64,
    fallback: Option<Event>,
}

impl CompletionGuard {
    pub(crate) fn new(tx: mpsc::UnboundedSender<Completion>, epoch: u64, fallback: Event) -> Self {
        Self {
            tx: Some(tx),
            epoch,
            fallback: Some(fallback),
        }
    }

    pub(crate) fn complete(mut self, event: Event) {
        self.fallback = None;
        if let Some(tx) = self.tx.take() {
            deliver(&tx, self.epoch, event);
        }
    }
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        if let (Some(tx), Some(fallback)) = (self.tx.take(), self.fallback.take()) {
            if tx.is_closed() {
                return;
            }
            warn!("Background request ended without reporting; releasing its flag");
            deliver(&tx, self.epoch, fallback);
        }
    }
}

fn deliver(tx: &mpsc::UnboundedSender<Completion>, epoch: u64, event: Event) {
    // Unbounded: a report that releases `loading`/`submitting` is never
    // dropped for lack of capacity, only when the receiver is gone.
    if tx.send(Completion { epoch, event }).is_err() {
        debug!("Dashboard no longer listening; dropping completion");
    }
}

/// Fetch status and users concurrently. Both requests finish before the
/// joined outcome is reported.
pub(crate) async fn load(client: BackendClient, guard: CompletionGuard) {
    let (status, users) = tokio::join!(client.status(), client.list_users());

    let outcome = match (status, users) {
        (Ok(status), Ok(users)) => Ok(Snapshot { status, users }),
        (status, users) => {
            if let Err(err) = &status {
                warn!(%err, "Error fetching backend status");
            }
            if let Err(err) = &users {
                warn!(%err, "Error fetching users");
            }
            Err(DashboardError::FetchFailed)
        }
    };

    guard.complete(Event::LoadFinished(outcome));
}

pub(crate) async fn create(client: BackendClient, new_user: NewUser, guard: CompletionGuard) {
    let outcome = match client.create_user(&new_user).await {
        Ok(user) => Ok(user),
        Err(err) => {
            warn!(%err, "Error creating user");
            Err(DashboardError::CreateFailed)
        }
    };

    guard.complete(Event::CreateFinished(outcome));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load_failed() -> Event {
        Event::LoadFinished(Err(DashboardError::FetchFailed))
    }

    #[test]
    fn complete_sends_event_once() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let guard = CompletionGuard::new(tx, 3, load_failed());
        guard.complete(Event::FocusNext);
        assert_eq!(
            rx.try_recv().unwrap(),
            Completion {
                epoch: 3,
                event: Event::FocusNext
            }
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn drop_without_complete_sends_fallback() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        drop(CompletionGuard::new(
            tx,
            0,
            Event::CreateFinished(Err(DashboardError::CreateFailed)),
        ));
        assert_eq!(
            rx.try_recv().unwrap().event,
            Event::CreateFinished(Err(DashboardError::CreateFailed))
        );
    }

    #[test]
    fn reports_are_never_dropped_for_capacity() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        for epoch in 0..64 {
            drop(CompletionGuard::new(tx.clone(), epoch, load_failed()));
        }
        let mut received = 0;
        while let Ok(completion) = rx.try_recv() {
            assert_eq!(completion.event, load_failed());
            received += 1;
        }
        assert_eq!(received, 64);
    }

    #[test]
    fn closed_channel_is_a_no_op() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        CompletionGuard::new(tx.clone(), 0, load_failed()).complete(Event::FocusNext);
        drop(CompletionGuard::new(tx, 0, load_failed()));
    }
}
