//! Engine implementations that forward feedback to the host as events.

use anyhow::{anyhow, Result};
use crossbeam_channel::Sender;
use std::sync::{Arc, Mutex};

use super::protocol::IpcEvent;
use super::writer::WriterMessage;
use crate::detection::{BoundingBox, DetectionOutcome, Detector};
use crate::feedback::{HapticActuator, OverlaySink, QueueMode, SpeechEngine};
use crate::lock_or_recover;

fn forward(events: &Sender<WriterMessage>, event: IpcEvent) -> Result<()> {
    events
        .send(WriterMessage::Event(event))
        .map_err(|_| anyhow!("host event writer has shut down"))
}

/// Id of the most recent utterance the host has not reported back on.
///
/// Shared between the session thread (which speaks) and the command reader
/// (which sees `utterance_done`), so `is_speaking` answers without a round trip.
#[derive(Debug, Default)]
pub(crate) struct SpeakingState {
    current: Mutex<Option<String>>,
}

impl SpeakingState {
    pub(crate) fn begin(&self, utterance_id: &str) {
        *lock_or_recover(&self.current, "speaking_state.begin") = Some(utterance_id.to_string());
    }

    /// Clear the state if `utterance_id` is the one in flight. Returns true when cleared.
    pub(crate) fn finish(&self, utterance_id: &str) -> bool {
        let mut current = lock_or_recover(&self.current, "speaking_state.finish");
        if current.as_deref() == Some(utterance_id) {
            *current = None;
            return true;
        }
        false
    }

    pub(crate) fn clear(&self) {
        *lock_or_recover(&self.current, "speaking_state.clear") = None;
    }

    pub(crate) fn is_active(&self) -> bool {
        lock_or_recover(&self.current, "speaking_state.is_active").is_some()
    }
}

pub(crate) struct HostSpeech {
    events: Sender<WriterMessage>,
    speaking: Arc<SpeakingState>,
}

impl HostSpeech {
    pub(crate) fn new(events: Sender<WriterMessage>, speaking: Arc<SpeakingState>) -> Self {
        Self { events, speaking }
    }
}

impl SpeechEngine for HostSpeech {
    fn speak(&mut self, text: &str, queue: QueueMode, utterance_id: &str) -> Result<()> {
        // Mark first: the host may report completion before `forward` returns.
        self.speaking.begin(utterance_id);
        let sent = forward(
            &self.events,
            IpcEvent::Speak {
                utterance_id: utterance_id.to_string(),
                text: text.to_string(),
                queue,
            },
        );
        if sent.is_err() {
            self.speaking.finish(utterance_id);
        }
        sent
    }

    fn is_speaking(&self) -> bool {
        self.speaking.is_active()
    }

    fn stop(&mut self) {
        self.speaking.clear();
        let _ = forward(&self.events, IpcEvent::StopSpeech);
    }
}

pub(crate) struct HostHaptics {
    events: Sender<WriterMessage>,
}

impl HostHaptics {
    pub(crate) fn new(events: Sender<WriterMessage>) -> Self {
        Self { events }
    }
}

impl HapticActuator for HostHaptics {
    fn vibrate(&mut self, intensity: u8, duration_ms: u64) -> Result<()> {
        forward(
            &self.events,
            IpcEvent::Vibrate {
                intensity,
                duration_ms,
            },
        )
    }
}

pub(crate) struct HostOverlay {
    events: Sender<WriterMessage>,
}

impl HostOverlay {
    pub(crate) fn new(events: Sender<WriterMessage>) -> Self {
        Self { events }
    }
}

impl OverlaySink for HostOverlay {
    fn show(&mut self, boxes: &[BoundingBox], inference_ms: u64) {
        let _ = forward(
            &self.events,
            IpcEvent::Overlay {
                boxes: boxes.to_vec(),
                inference_ms,
            },
        );
    }

    fn clear(&mut self) {
        let _ = forward(&self.events, IpcEvent::OverlayClear);
    }
}

/// The host runs inference itself; frames arrive already decoded into boxes.
pub(crate) struct HostDetector {
    labels: Vec<String>,
}

impl HostDetector {
    pub(crate) fn new(labels: Vec<String>) -> Self {
        Self { labels }
    }
}

impl Detector for HostDetector {
    type Frame = DetectionOutcome;

    fn detect(&mut self, frame: DetectionOutcome) -> Result<DetectionOutcome> {
        Ok(frame)
    }

    fn labels(&self) -> Vec<String> {
        self.labels.clone()
    }
}
