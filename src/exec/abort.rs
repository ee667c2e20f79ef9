// src/exec/abort.rs

//! Shared abort signal used by the fail-fast policy.

use std::sync::Arc;

use tokio::sync::watch;

/// One-shot broadcast flag shared by every leaf of a pipeline.
///
/// Any clone can trigger it; every clone observes it. Once triggered it stays
/// triggered.
#[derive(Debug, Clone)]
pub struct AbortSignal {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
}

impl AbortSignal {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            tx: Arc::new(tx),
            rx,
        }
    }

    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    /// Resolve once the signal has been triggered (immediately if it already
    /// was).
    pub async fn triggered(&mut self) {
        let closed = self.rx.wait_for(|aborted| *aborted).await.is_err();
        if closed {
            // Unreachable while we hold `tx`, but never resolve spuriously.
            std::future::pending::<()>().await;
        }
    }
}

impl Default for AbortSignal {
    fn default() -> Self {
        Self::new()
    }
}
