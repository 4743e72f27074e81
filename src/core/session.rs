//! Injected session context.
//!
//! The workflow never reads ambient credential state; it receives a
//! [`Session`] holding the opaque bearer token plus the single capability
//! it may exercise: invalidating the session when the service reports 401.
//! Discarding the credential and re-authenticating is the owning
//! collaborator's job.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Read-only session context with an invalidate capability.
#[derive(Debug, Default)]
pub struct Session {
    token: String,
    invalidations: AtomicUsize,
}

impl Session {
    /// Wrap an opaque bearer credential.
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into(), invalidations: AtomicUsize::new(0) }
    }

    /// The bearer credential to attach to outgoing requests.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Mark the session invalid. Called when a request comes back 401; the
    /// workflow instance is abandoned afterwards.
    pub fn invalidate(&self) {
        self.invalidations.fetch_add(1, Ordering::SeqCst);
        tracing::warn!("Session invalidated; workflow abandoned");
    }

    /// Whether the session has been invalidated.
    pub fn is_invalidated(&self) -> bool {
        self.invalidations.load(Ordering::SeqCst) > 0
    }

    /// How many times `invalidate` was called.
    pub fn invalidation_count(&self) -> usize {
        self.invalidations.load(Ordering::SeqCst)
    }
}
