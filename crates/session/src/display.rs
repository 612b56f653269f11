//! Display sinks and the latest-wins frame handoff.

use std::sync::Arc;

use tokio::sync::watch;

use fitroom_compositor::Frame;

/// Receives one frame per successful tick.
pub trait DisplaySink {
    fn show(&mut self, frame: Frame);
}

impl<F: FnMut(Frame)> DisplaySink for F {
    fn show(&mut self, frame: Frame) {
        self(frame)
    }
}

/// Create a single-slot frame channel.
///
/// The sender half is a [`DisplaySink`]; every `show` overwrites the slot,
/// so a slow reader only ever sees the newest frame.
pub fn frame_slot() -> (FrameSlotSender, FrameSlotReceiver) {
    let (tx, rx) = watch::channel(None);
    (FrameSlotSender { tx }, FrameSlotReceiver { rx })
}

/// Producer side of [`frame_slot`].
#[derive(Debug)]
pub struct FrameSlotSender {
    tx: watch::Sender<Option<Arc<Frame>>>,
}

impl DisplaySink for FrameSlotSender {
    fn show(&mut self, frame: Frame) {
        self.tx.send_replace(Some(Arc::new(frame)));
    }
}

/// Consumer side of [`frame_slot`].
#[derive(Debug, Clone)]
pub struct FrameSlotReceiver {
    rx: watch::Receiver<Option<Arc<Frame>>>,
}

impl FrameSlotReceiver {
    /// The newest frame, if one arrived since the last call.
    pub fn take_new(&mut self) -> Option<Arc<Frame>> {
        match self.rx.has_changed() {
            Ok(true) => self.rx.borrow_and_update().clone(),
            _ => None,
        }
    }

    /// The newest frame regardless of whether it was seen before.
    pub fn latest(&self) -> Option<Arc<Frame>> {
        self.rx.borrow().clone()
    }

    /// Whether the producer is gone.
    pub fn is_closed(&self) -> bool {
        self.rx.has_changed().is_err()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn solid(value: u8) -> Frame {
        Frame::from_pixel(2, 2, Rgb([value, value, value]))
    }

    #[test]
    fn test_slot_starts_empty() {
        let (_tx, mut rx) = frame_slot();
        assert!(rx.take_new().is_none());
        assert!(rx.latest().is_none());
    }

    #[test]
    fn test_latest_wins() {
        let (mut tx, mut rx) = frame_slot();
        tx.show(solid(1));
        tx.show(solid(2));
        tx.show(solid(3));

        let frame = rx.take_new().unwrap();
        assert_eq!(frame.get_pixel(0, 0), &Rgb([3, 3, 3]));
        assert!(rx.take_new().is_none());
        assert!(rx.latest().is_some());
    }

    #[test]
    fn test_closed_after_sender_drop() {
        let (tx, rx) = frame_slot();
        assert!(!rx.is_closed());
        drop(tx);
        assert!(rx.is_closed());
    }

    #[test]
    fn test_closure_sink() {
        let mut seen = Vec::new();
        {
            let mut sink = |frame: Frame| seen.push(frame.get_pixel(1, 1)[0]);
            sink.show(solid(9));
            sink.show(solid(4));
        }
        assert_eq!(seen, vec![9, 4]);
    }

    #[test]
    fn test_dyn_sink_forwards() {
        let (mut tx, mut rx) = frame_slot();
        let sink: &mut dyn DisplaySink = &mut tx;
        sink.show(solid(9));
        assert_eq!(rx.take_new().unwrap().get_pixel(1, 1), &Rgb([9, 9, 9]));
    }
}
