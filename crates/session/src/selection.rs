//! Current garment selection, shareable across threads.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde::Serialize;

use fitroom_common::error::{FitroomError, FitroomResult};

const NONE: usize = usize::MAX;

/// Whether a garment is being overlaid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PreviewState {
    /// No garment selected; frames pass through unchanged.
    Idle,
    /// A garment is selected and composited every tick.
    Previewing { index: usize },
}

/// Cloneable handle to the selection of one session.
///
/// Every clone refers to the same slot, so the UI thread can select while a
/// worker thread reads the selection once per tick.
#[derive(Debug, Clone)]
pub struct SelectionHandle {
    slot: Arc<AtomicUsize>,
    available: usize,
}

impl SelectionHandle {
    /// A handle over a wardrobe of `available` items, starting Idle.
    pub fn new(available: usize) -> Self {
        Self {
            slot: Arc::new(AtomicUsize::new(NONE)),
            available,
        }
    }

    /// Select garment `index`. Out-of-range indices are rejected and the
    /// previous selection is kept.
    pub fn select(&self, index: usize) -> FitroomResult<()> {
        if index >= self.available {
            return Err(FitroomError::SelectionOutOfRange {
                index,
                available: self.available,
            });
        }
        self.slot.store(index, Ordering::Release);
        Ok(())
    }

    /// Remove the garment; subsequent ticks pass frames through.
    pub fn clear(&self) {
        self.slot.store(NONE, Ordering::Release);
    }

    pub fn current(&self) -> Option<usize> {
        match self.slot.load(Ordering::Acquire) {
            NONE => None,
            index => Some(index),
        }
    }

    pub fn state(&self) -> PreviewState {
        match self.current() {
            Some(index) => PreviewState::Previewing { index },
            None => PreviewState::Idle,
        }
    }

    /// Number of selectable garments.
    pub fn available(&self) -> usize {
        self.available
    }
}
