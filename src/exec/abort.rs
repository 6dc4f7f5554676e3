// src/exec/abort.rs

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared abort-on-error policy.
///
/// Every [`ProcessRunner`](super::ProcessRunner) built from clones of the
/// same flag observes a `set()` made through any of them. The flag is
/// one-way: once set it stays set for the lifetime of the handle.
#[derive(Debug, Clone, Default)]
pub struct AbortFlag(Arc<AtomicBool>);

impl AbortFlag {
    pub fn new(initially_set: bool) -> Self {
        Self(Arc::new(AtomicBool::new(initially_set)))
    }

    pub fn set(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
