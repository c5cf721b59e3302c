//! JSON-lines protocol spoken with the host platform.
//!
//! The host owns the camera, the touch surface, the TTS engine, and the vibration
//! motor. It forwards their inputs as commands and renders the events it gets
//! back. One JSON object per line in both directions.

use serde::{Deserialize, Serialize};

use crate::detection::BoundingBox;
use crate::feedback::QueueMode;
use crate::interaction::InteractionSnapshot;

// ============================================================================
// IPC Events (Rust → host)
// ============================================================================

/// Serialized with an `"event"` tag field for type discrimination.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum IpcEvent {
    /// Sent once on startup
    #[serde(rename = "capabilities")]
    Capabilities {
        session_id: String,
        version: String,
        labels: Vec<String>,
        hold_threshold_ms: u64,
        surface_width: f32,
        #[serde(skip_serializing_if = "Option::is_none")]
        confirm_timeout_ms: Option<u64>,
    },

    /// Speak `text`; report back with `utterance_done`/`utterance_error`
    #[serde(rename = "speak")]
    Speak {
        utterance_id: String,
        text: String,
        queue: QueueMode,
    },

    #[serde(rename = "stop_speech")]
    StopSpeech,

    #[serde(rename = "vibrate")]
    Vibrate { intensity: u8, duration_ms: u64 },

    /// Boxes to draw over the camera preview
    #[serde(rename = "overlay")]
    Overlay {
        boxes: Vec<BoundingBox>,
        inference_ms: u64,
    },

    #[serde(rename = "overlay_clear")]
    OverlayClear,

    /// Reply to `get_state`
    #[serde(rename = "state")]
    State {
        #[serde(flatten)]
        snapshot: InteractionSnapshot,
    },

    /// Error (recoverable or fatal)
    #[serde(rename = "error")]
    Error { message: String, recoverable: bool },
}

// ============================================================================
// IPC Commands (host → Rust)
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "cmd")]
pub enum IpcCommand {
    #[serde(rename = "pointer_down")]
    PointerDown { x: f32, y: f32 },

    #[serde(rename = "pointer_move")]
    PointerMove { x: f32, y: f32 },

    #[serde(rename = "pointer_up")]
    PointerUp { x: f32, y: f32 },

    /// Touch surface size changed (rotation, split screen)
    #[serde(rename = "surface")]
    Surface {
        width: f32,
        #[serde(default)]
        height: Option<f32>,
    },

    /// Detector output for one camera frame
    #[serde(rename = "frame")]
    Frame {
        boxes: Vec<BoundingBox>,
        #[serde(default)]
        inference_ms: u64,
    },

    /// Detector ran and found nothing
    #[serde(rename = "empty_frame")]
    EmptyFrame,

    /// TTS engine finished initializing
    #[serde(rename = "speech_ready")]
    SpeechReady,

    #[serde(rename = "utterance_done")]
    UtteranceDone { utterance_id: String },

    #[serde(rename = "utterance_error")]
    UtteranceError { utterance_id: String },

    /// Request a `state` event
    #[serde(rename = "get_state")]
    GetState,

    #[serde(rename = "shutdown")]
    Shutdown,
}
