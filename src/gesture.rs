//! Tap vs. hold classification for the single-finger touch surface.
//!
//! A pointer-down arms [`TimerKey::Hold`]; the dispatcher calls
//! [`GestureRecognizer::on_hold_timer`] when that deadline passes. A pointer-up before
//! then is a tap, split by which half of the surface was touched.

use std::time::{Duration, Instant};

use crate::timers::{TimerKey, TimerTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerAction {
    Down,
    Move,
    Up,
}

/// Raw pointer sample from the touch surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub action: PointerAction,
    pub x: f32,
    pub y: f32,
    pub at: Instant,
}

impl PointerEvent {
    pub fn new(action: PointerAction, x: f32, y: f32, at: Instant) -> Self {
        Self { action, x, y, at }
    }
}

/// Recognized gesture, before the state machine gives it a meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    TapLeft,
    TapRight,
    Hold,
}

#[derive(Debug, Clone, Copy)]
struct Press {
    started_at: Instant,
    hold_fired: bool,
}

#[derive(Debug)]
pub struct GestureRecognizer {
    hold_threshold: Duration,
    surface_width: f32,
    press: Option<Press>,
}

impl GestureRecognizer {
    pub fn new(hold_threshold: Duration, surface_width: f32) -> Self {
        Self {
            hold_threshold,
            surface_width,
            press: None,
        }
    }

    pub fn surface_width(&self) -> f32 {
        self.surface_width
    }

    /// Non-positive widths are ignored; the previous width stays in effect.
    pub fn set_surface_width(&mut self, width: f32) {
        if width.is_finite() && width > 0.0 {
            self.surface_width = width;
        }
    }

    pub fn is_pressed(&self) -> bool {
        self.press.is_some()
    }

    pub fn on_pointer(&mut self, event: PointerEvent, timers: &mut TimerTable) -> Option<Gesture> {
        match event.action {
            PointerAction::Down => {
                self.press = Some(Press {
                    started_at: event.at,
                    hold_fired: false,
                });
                timers.arm(TimerKey::Hold, event.at, self.hold_threshold);
                None
            }
            PointerAction::Move => None,
            PointerAction::Up => {
                timers.cancel(TimerKey::Hold);
                let press = self.press.take()?;
                if press.hold_fired {
                    return None;
                }
                let held = event.at.saturating_duration_since(press.started_at);
                if held > self.hold_threshold {
                    return None;
                }
                Some(self.tap_side(event.x))
            }
        }
    }

    /// Called when [`TimerKey::Hold`] expires. Fires at most once per press.
    pub fn on_hold_timer(&mut self) -> Option<Gesture> {
        let press = self.press.as_mut()?;
        if press.hold_fired {
            return None;
        }
        press.hold_fired = true;
        Some(Gesture::Hold)
    }

    /// Drop any in-flight press, e.g. on teardown.
    pub fn reset(&mut self, timers: &mut TimerTable) {
        self.press = None;
        timers.cancel(TimerKey::Hold);
    }

    fn tap_side(&self, x: f32) -> Gesture {
        if x < self.surface_width / 2.0 {
            Gesture::TapLeft
        } else {
            Gesture::TapRight
        }
    }
}
