use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::core::errors::{PgpVaultError, Result};
use crate::core::traits::storage::Storage;

/// Cancellation signal shared between the host and a running request.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Everything a single request may touch outside its own frame.
///
/// The host hands one of these to every handler: the storage view for
/// this mount and the request's cancellation token.
pub struct RequestContext<'a> {
    storage: &'a dyn Storage,
    cancel: CancellationToken,
}

impl<'a> RequestContext<'a> {
    pub fn new(storage: &'a dyn Storage) -> Self {
        Self {
            storage,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(storage: &'a dyn Storage, cancel: CancellationToken) -> Self {
        Self { storage, cancel }
    }

    pub fn storage(&self) -> &'a dyn Storage {
        self.storage
    }

    /// Fail with `Cancelled` once the host has given up on the request.
    pub fn check_cancelled(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            Err(PgpVaultError::Cancelled)
        } else {
            Ok(())
        }
    }
}
