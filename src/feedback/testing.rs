//! Recording engines shared by unit tests across the crate.

use anyhow::{bail, Result};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::{HapticActuator, OverlaySink, QueueMode, SpeechEngine};
use crate::detection::BoundingBox;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SpokenUtterance {
    pub(crate) text: String,
    pub(crate) queue: QueueMode,
    pub(crate) utterance_id: String,
}

#[derive(Clone, Default)]
pub(crate) struct RecordingSpeech {
    pub(crate) spoken: Arc<Mutex<Vec<SpokenUtterance>>>,
    pub(crate) speaking: Arc<AtomicBool>,
    pub(crate) stopped: Arc<AtomicBool>,
    pub(crate) fail: bool,
}

impl RecordingSpeech {
    pub(crate) fn texts(&self) -> Vec<String> {
        self.spoken
            .lock()
            .unwrap()
            .iter()
            .map(|utterance| utterance.text.clone())
            .collect()
    }

    pub(crate) fn set_speaking(&self, speaking: bool) {
        self.speaking.store(speaking, Ordering::SeqCst);
    }
}

impl SpeechEngine for RecordingSpeech {
    fn speak(&mut self, text: &str, queue: QueueMode, utterance_id: &str) -> Result<()> {
        if self.fail {
            bail!("engine offline");
        }
        self.spoken.lock().unwrap().push(SpokenUtterance {
            text: text.to_string(),
            queue,
            utterance_id: utterance_id.to_string(),
        });
        Ok(())
    }

    fn is_speaking(&self) -> bool {
        self.speaking.load(Ordering::SeqCst)
    }

    fn stop(&mut self) {
        self.stopped.store(true, Ordering::SeqCst);
    }
}

#[derive(Clone, Default)]
pub(crate) struct RecordingHaptics {
    pub(crate) pulses: Arc<Mutex<Vec<(u8, u64)>>>,
}

impl RecordingHaptics {
    pub(crate) fn pulses(&self) -> Vec<(u8, u64)> {
        self.pulses.lock().unwrap().clone()
    }
}

impl HapticActuator for RecordingHaptics {
    fn vibrate(&mut self, intensity: u8, duration_ms: u64) -> Result<()> {
        self.pulses.lock().unwrap().push((intensity, duration_ms));
        Ok(())
    }
}

#[derive(Clone, Default)]
pub(crate) struct RecordingOverlay {
    pub(crate) frames: Arc<Mutex<Vec<(Vec<String>, u64)>>>,
    pub(crate) clears: Arc<AtomicUsize>,
}

impl RecordingOverlay {
    pub(crate) fn frames(&self) -> Vec<(Vec<String>, u64)> {
        self.frames.lock().unwrap().clone()
    }

    pub(crate) fn clears(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }
}

impl OverlaySink for RecordingOverlay {
    fn show(&mut self, boxes: &[BoundingBox], inference_ms: u64) {
        let labels = boxes.iter().map(|bbox| bbox.class_name.clone()).collect();
        self.frames.lock().unwrap().push((labels, inference_ms));
    }

    fn clear(&mut self) {
        self.clears.fetch_add(1, Ordering::SeqCst);
    }
}
