//! Speech and vibration output behind engine traits.
//!
//! The session turns every decision into a [`FeedbackRequest`] and hands it to a
//! [`FeedbackChannel`]. Engines that were unavailable at startup are simply absent;
//! requests for them become no-ops.

mod channel;
mod cooldown;
#[cfg(test)]
pub(crate) mod testing;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::detection::BoundingBox;

pub use channel::FeedbackChannel;
pub use cooldown::Cooldown;

/// Intensity used when a pulse has no directional meaning.
pub const DEFAULT_PULSE_INTENSITY: u8 = 255;

/// Whether a new utterance interrupts the one playing or waits behind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueMode {
    Flush,
    Enqueue,
}

/// Which confirmation an utterance gates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmKind {
    Mode,
    Target,
}

impl ConfirmKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ConfirmKind::Mode => "MODE_CONFIRM",
            ConfirmKind::Target => "TARGET_CONFIRM",
        }
    }

    fn from_str(raw: &str) -> Option<Self> {
        match raw {
            "MODE_CONFIRM" => Some(ConfirmKind::Mode),
            "TARGET_CONFIRM" => Some(ConfirmKind::Target),
            _ => None,
        }
    }
}

/// Correlation key of a confirmation utterance.
///
/// `seq` increases with every confirmation the state machine issues, so a late
/// completion from an earlier round never matches the one currently pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UtteranceTag {
    pub kind: ConfirmKind,
    pub seq: u64,
}

impl UtteranceTag {
    pub fn new(kind: ConfirmKind, seq: u64) -> Self {
        Self { kind, seq }
    }

    /// Parse the wire id (`MODE_CONFIRM#4`). A bare kind parses with `seq = 0`.
    pub fn parse(id: &str) -> Option<Self> {
        let (kind, seq) = match id.split_once('#') {
            Some((kind, seq)) => (kind, seq.parse().ok()?),
            None => (id, 0),
        };
        ConfirmKind::from_str(kind).map(|kind| Self { kind, seq })
    }
}

impl fmt::Display for UtteranceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.kind.as_str(), self.seq)
    }
}

/// One unit of output for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedbackRequest {
    Speak {
        text: String,
        queue: QueueMode,
        tag: Option<UtteranceTag>,
    },
    Vibrate {
        intensity: u8,
        duration_ms: u64,
    },
}

impl FeedbackRequest {
    /// Untagged utterance that interrupts whatever is playing.
    pub fn say(text: impl Into<String>) -> Self {
        FeedbackRequest::Speak {
            text: text.into(),
            queue: QueueMode::Flush,
            tag: None,
        }
    }

    pub fn say_tagged(text: impl Into<String>, tag: UtteranceTag) -> Self {
        FeedbackRequest::Speak {
            text: text.into(),
            queue: QueueMode::Flush,
            tag: Some(tag),
        }
    }

    pub fn pulse(intensity: u8, duration_ms: u64) -> Self {
        FeedbackRequest::Vibrate {
            intensity,
            duration_ms,
        }
    }

    pub fn spoken_text(&self) -> Option<&str> {
        match self {
            FeedbackRequest::Speak { text, .. } => Some(text),
            FeedbackRequest::Vibrate { .. } => None,
        }
    }
}

/// Text-to-speech engine. Completion arrives separately, keyed by `utterance_id`.
pub trait SpeechEngine: Send {
    fn speak(&mut self, text: &str, queue: QueueMode, utterance_id: &str) -> Result<()>;
    fn is_speaking(&self) -> bool;
    fn stop(&mut self);
}

/// Fire-and-forget vibration motor.
pub trait HapticActuator: Send {
    fn vibrate(&mut self, intensity: u8, duration_ms: u64) -> Result<()>;
}

/// Consumer of the raw per-frame boxes, e.g. a camera preview overlay.
pub trait OverlaySink: Send {
    fn show(&mut self, boxes: &[BoundingBox], inference_ms: u64);
    fn clear(&mut self);
}
