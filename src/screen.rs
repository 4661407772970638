//! Per-screen request state machine.
//!
//! ```text
//!            begin()              settle(Ok)
//!   Idle ─────────────▶ Pending ─────────────▶ Success(T)
//!                          │
//!                          │     settle(Err)
//!                          └──────────────────▶ Failure
//! ```
//!
//! Every [`begin`](Screen::begin) issues a [`Ticket`] stamped with a
//! monotonically increasing sequence number. [`settle`](Screen::settle)
//! only applies a result whose ticket is the latest one issued; anything
//! older is dropped as [`Outcome::Stale`], so a slow earlier response can
//! never overwrite the state produced by a newer one.
//!
//! The lock is held only for the state swap, never across an `.await`, so
//! requests from the same screen may interleave freely.

use parking_lot::Mutex;
use serde::Serialize;

use crate::error::Failure;

/// Observable state of a screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum ScreenState<T> {
    Idle,
    Pending,
    Success(T),
    Failure(Failure),
}

impl<T> ScreenState<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, ScreenState::Pending)
    }

    pub fn is_settled(&self) -> bool {
        matches!(self, ScreenState::Success(_) | ScreenState::Failure(_))
    }
}

/// Result of one submit or refresh, as seen by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// Required input was missing; nothing was sent.
    Rejected,
    /// The screen already had a request in flight; nothing was sent.
    Busy,
    /// A newer request was issued while this one was in flight; its result
    /// was discarded.
    Stale,
    Success(T),
    Failure(Failure),
}

impl<T> Outcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn success(self) -> Option<T> {
        match self {
            Outcome::Success(value) => Some(value),
            _ => None,
        }
    }
}

/// Proof that a request was started. Consumed by [`Screen::settle`], so a
/// request can settle at most once.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a ticket must be settled or the screen stays pending"]
pub struct Ticket(u64);

impl Ticket {
    pub fn seq(&self) -> u64 {
        self.0
    }
}

struct Inner<T> {
    state: ScreenState<T>,
    issued: u64,
}

pub struct Screen<T> {
    name: &'static str,
    inner: Mutex<Inner<T>>,
}

impl<T: Clone> Screen<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            inner: Mutex::new(Inner {
                state: ScreenState::Idle,
                issued: 0,
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn state(&self) -> ScreenState<T> {
        self.inner.lock().state.clone()
    }

    pub fn is_pending(&self) -> bool {
        self.inner.lock().state.is_pending()
    }

    /// Move to `Pending` and issue a fresh ticket, regardless of any request
    /// already in flight.
    pub fn begin(&self) -> Ticket {
        let mut inner = self.inner.lock();
        inner.issued += 1;
        inner.state = ScreenState::Pending;
        tracing::debug!(screen = self.name, seq = inner.issued, "request started");
        Ticket(inner.issued)
    }

    /// Like [`begin`](Self::begin), but refuses while a request is pending.
    pub fn try_begin(&self) -> Option<Ticket> {
        let mut inner = self.inner.lock();
        if inner.state.is_pending() {
            return None;
        }
        inner.issued += 1;
        inner.state = ScreenState::Pending;
        tracing::debug!(screen = self.name, seq = inner.issued, "request started");
        Some(Ticket(inner.issued))
    }

    /// Apply a result if `ticket` is still the latest one issued.
    pub fn settle(&self, ticket: Ticket, result: Result<T, Failure>) -> Outcome<T> {
        let mut inner = self.inner.lock();
        if ticket.0 != inner.issued {
            tracing::debug!(
                screen = self.name,
                seq = ticket.0,
                latest = inner.issued,
                "discarding stale response"
            );
            return Outcome::Stale;
        }
        match result {
            Ok(value) => {
                inner.state = ScreenState::Success(value.clone());
                Outcome::Success(value)
            }
            Err(failure) => {
                tracing::warn!(screen = self.name, kind = ?failure.kind, "request failed");
                inner.state = ScreenState::Failure(failure.clone());
                Outcome::Failure(failure)
            }
        }
    }

    /// Back to `Idle`. Any request still in flight becomes stale.
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        inner.issued += 1;
        inner.state = ScreenState::Idle;
    }
}
