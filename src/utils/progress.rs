//! Progress reporting for long-running syntheses.
//!
//! Engines emit [`ProgressUpdate`]s through a [`ProgressSink`]. Sinks are
//! fire-and-forget: reporting must return immediately, and a slow or absent
//! consumer never stalls the pipeline.
//!
//! # Usage
//!
//! ```ignore
//! use pubmed_synth::utils::ChannelProgress;
//!
//! let (tx, mut rx) = tokio::sync::mpsc::channel(64);
//! let engine = SynthesisEngine::new(llm, source, config).with_progress(ChannelProgress::new(tx));
//! tokio::spawn(async move {
//!     while let Some(update) = rx.recv().await {
//!         eprintln!("[{:?}] {}", update.phase, update.message);
//!     }
//! });
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::models::ProgressUpdate;

/// Receiver of progress updates
///
/// Implementations must not block.
pub trait ProgressSink: Send + Sync {
    fn report(&self, update: ProgressUpdate);
}

impl<F> ProgressSink for F
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: ProgressUpdate) {
        self(update)
    }
}

/// Forwards updates into a bounded channel, dropping them when it is full
#[derive(Debug, Clone)]
pub struct ChannelProgress {
    tx: mpsc::Sender<ProgressUpdate>,
    dropped: Arc<AtomicUsize>,
}

impl ChannelProgress {
    /// Wrap the sending half of a channel
    pub fn new(tx: mpsc::Sender<ProgressUpdate>) -> Self {
        Self {
            tx,
            dropped: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of updates dropped because the channel was full or closed
    pub fn dropped(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl ProgressSink for ChannelProgress {
    fn report(&self, update: ProgressUpdate) {
        if self.tx.try_send(update).is_err() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
    }
}

/// Optional sink held by an engine; reporting without a sink is a no-op
#[derive(Clone, Default)]
pub(crate) struct Progress {
    sink: Option<Arc<dyn ProgressSink>>,
}

impl Progress {
    pub(crate) fn new(sink: Arc<dyn ProgressSink>) -> Self {
        Self { sink: Some(sink) }
    }

    pub(crate) fn report(&self, update: ProgressUpdate) {
        if let Some(sink) = &self.sink {
            sink.report(update);
        }
    }
}

impl std::fmt::Debug for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Progress")
            .field("attached", &self.sink.is_some())
            .finish()
    }
}
