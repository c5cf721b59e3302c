//! Detector-facing types and the frame pipeline that feeds the session.
//!
//! The detector itself (model loading, inference) lives outside this crate and plugs
//! in through [`Detector`]. Frames reach it through a drop-latest [`FrameSlot`] and
//! results travel back to the session thread over a one-deep channel.

mod labels;
mod slot;
mod worker;

use anyhow::Result;
use serde::{Deserialize, Serialize};

pub use labels::{filter_labels, load_labels_file, parse_labels, spoken_label};
pub use slot::FrameSlot;
pub use worker::{outcome_channel, spawn_frame_worker, FrameWorker, RESULT_BACKLOG};

/// One detected object in one frame, in normalized image coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub cx: f32,
    pub cy: f32,
    pub w: f32,
    pub h: f32,
    #[serde(alias = "cls_name", alias = "clsName")]
    pub class_name: String,
    #[serde(alias = "cnf", default)]
    pub confidence: f32,
}

impl BoundingBox {
    /// Build a box from its corners; center and size are derived.
    pub fn from_corners(
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        class_name: impl Into<String>,
        confidence: f32,
    ) -> Self {
        Self {
            x1,
            y1,
            x2,
            y2,
            cx: (x1 + x2) / 2.0,
            cy: (y1 + y2) / 2.0,
            w: x2 - x1,
            h: y2 - y1,
            class_name: class_name.into(),
            confidence,
        }
    }

    /// Build a box from its center and size; corners are derived.
    pub fn from_center(
        cx: f32,
        cy: f32,
        w: f32,
        h: f32,
        class_name: impl Into<String>,
        confidence: f32,
    ) -> Self {
        Self {
            x1: cx - w / 2.0,
            y1: cy - h / 2.0,
            x2: cx + w / 2.0,
            y2: cy + h / 2.0,
            cx,
            cy,
            w,
            h,
            class_name: class_name.into(),
            confidence,
        }
    }

    /// Horizontal distance from the middle of the frame.
    pub fn center_offset(&self) -> f32 {
        (0.5 - self.cx).abs()
    }
}

/// Result of running the detector over one frame.
#[derive(Debug, Clone, PartialEq)]
pub enum DetectionOutcome {
    Detections {
        boxes: Vec<BoundingBox>,
        inference_ms: u64,
    },
    Empty,
}

/// External object detector. `Frame` is whatever the capture side hands over.
pub trait Detector: Send + 'static {
    type Frame: Send + 'static;

    fn detect(&mut self, frame: Self::Frame) -> Result<DetectionOutcome>;

    /// Ordered class labels, consulted once at startup.
    fn labels(&self) -> Vec<String>;

    /// Release model resources. Called once from the worker on teardown.
    fn close(&mut self) {}
}
