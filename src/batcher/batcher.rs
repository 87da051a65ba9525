use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info};

use super::timer::DebounceTimer;
use crate::kernel::event::Event;

/// Coalesces drops that arrive close together into one composition request.
///
/// The window is a trailing debounce: every submission restarts it, and when
/// it finally lapses the reactor receives `Event::BatchDue(seq)`. Only the
/// sequence number of the latest submission can release the batch, so a timer
/// that fired just before a re-arm is ignored.
pub struct ActionBatcher {
    window: Duration,
    pending: Vec<String>,
    active_modifications: Vec<String>,
    timer: DebounceTimer,
    seq: u64,
    tx: mpsc::Sender<Event>,
}

impl ActionBatcher {
    pub fn new(window: Duration, tx: mpsc::Sender<Event>) -> Self {
        Self {
            window,
            pending: Vec::new(),
            active_modifications: Vec::new(),
            timer: DebounceTimer::new(),
            seq: 0,
            tx,
        }
    }

    pub fn submit(&mut self, text: impl Into<String>) {
        let text = text.into();
        debug!("Batching action: {}", text);
        self.pending.push(text);

        self.seq += 1;
        let seq = self.seq;
        let tx = self.tx.clone();
        self.timer.arm(self.window, async move {
            let _ = tx.send(Event::BatchDue(seq)).await;
        });
    }

    /// Releases the pending batch if `seq` belongs to the latest submission.
    pub fn fire(&mut self, seq: u64) -> Option<Vec<String>> {
        if seq != self.seq {
            info!("Discarded stale batch timer {} (current {})", seq, self.seq);
            return None;
        }
        if self.pending.is_empty() {
            return None;
        }

        let batch = std::mem::take(&mut self.pending);
        self.active_modifications.extend(batch.iter().cloned());
        info!("Processing batched actions: {:?}", batch);
        Some(batch)
    }

    pub fn pending(&self) -> &[String] {
        &self.pending
    }

    /// Every phrase ever dispatched, oldest first.
    pub fn active_modifications(&self) -> &[String] {
        &self.active_modifications
    }
}
