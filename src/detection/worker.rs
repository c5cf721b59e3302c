use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use super::{DetectionOutcome, Detector, FrameSlot};
use crate::log_debug;

/// Handle to the background thread that runs the detector one frame at a time.
pub struct FrameWorker<F> {
    slot: Arc<FrameSlot<F>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl<F> FrameWorker<F> {
    pub fn slot(&self) -> Arc<FrameSlot<F>> {
        Arc::clone(&self.slot)
    }

    /// Stop taking frames and wait for the detector to be released.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.slot.close();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log_debug("frame worker panicked during shutdown");
            }
        }
    }
}

impl<F> Drop for FrameWorker<F> {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Results still waiting for the session. Past this the worker blocks and the
/// slot drops stale frames instead.
pub const RESULT_BACKLOG: usize = 1;

/// Channel for worker results, sized so outcomes never pile up behind the session.
pub fn outcome_channel() -> (Sender<DetectionOutcome>, Receiver<DetectionOutcome>) {
    bounded(RESULT_BACKLOG)
}

/// Read the label list, then move the detector onto its own thread.
///
/// Returns the worker handle and the detector's labels (unfiltered).
pub fn spawn_frame_worker<D: Detector>(
    mut detector: D,
    results: Sender<DetectionOutcome>,
) -> (FrameWorker<D::Frame>, Vec<String>) {
    let labels = detector.labels();
    let slot = Arc::new(FrameSlot::new());
    let worker_slot = Arc::clone(&slot);
    let handle = thread::spawn(move || {
        let mut frames_processed: u64 = 0;
        while let Some(frame) = worker_slot.take() {
            let started = Instant::now();
            match detector.detect(frame) {
                Ok(outcome) => {
                    frames_processed += 1;
                    tracing::debug!(
                        target: "sightline::detection",
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        frames_processed,
                        "frame analyzed"
                    );
                    if results.send(outcome).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    // No retry: the next frame supersedes this one.
                    log_debug(&format!("detector failed on frame: {err:#}"));
                }
            }
        }
        detector.close();
        log_debug(&format!(
            "frame worker exiting (processed={frames_processed}, dropped={})",
            worker_slot.dropped_frames()
        ));
    });
    (
        FrameWorker {
            slot,
            handle: Some(handle),
        },
        labels,
    )
}
