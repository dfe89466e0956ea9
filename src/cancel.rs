//! Cooperative cancellation for long-running wiki operations
//!
//! Hierarchy walks check the token before each ancestor lookup and the
//! auto-linker before each candidate term. A link-graph swap never observes
//! it: the delete and insert commit together or not at all.

use crate::wiki::{WikiError, WikiResult};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared stop flag; every clone sees the same state
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// `Err(Cancelled)` once cancellation has been requested
    pub fn check(&self) -> WikiResult<()> {
        if self.is_cancelled() {
            Err(WikiError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Check an optional token; no token never cancels
pub(crate) fn check(token: Option<&CancellationToken>) -> WikiResult<()> {
    token.map_or(Ok(()), CancellationToken::check)
}
