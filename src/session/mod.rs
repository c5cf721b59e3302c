//! The single logical UI thread.
//!
//! [`Session`] owns every piece of mutable interaction state: the gesture
//! recognizer, the state machine, the detection router, the timer table, and the
//! feedback channel. Inputs from the host, detection results from the worker, and
//! timer deadlines are all funneled into it by [`run_session`], so state is only
//! ever touched from one thread.

mod dispatch;

use crossbeam_channel::Sender;
use std::time::{Duration, Instant};

use crate::config::{AppConfig, InteractionTimings, RouterConfig, DEFAULT_SURFACE_WIDTH};
use crate::detection::{BoundingBox, DetectionOutcome};
use crate::feedback::{FeedbackChannel, FeedbackRequest, OverlaySink};
use crate::gesture::{Gesture, GestureRecognizer, PointerEvent};
use crate::interaction::{InteractionMachine, InteractionSnapshot};
use crate::router::DetectionRouter;
use crate::timers::{TimerKey, TimerTable};
use crate::{log_debug, log_debug_content};

pub use dispatch::run_session;

/// Upper bound on how long a blocked caller waits for a state reply.
pub const STATE_QUERY_TIMEOUT: Duration = Duration::from_secs(1);

/// Everything a session needs from configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionSettings {
    pub timings: InteractionTimings,
    pub router: RouterConfig,
    pub surface_width: f32,
}

impl SessionSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            timings: config.interaction_timings(),
            router: config.router_config(),
            surface_width: config.surface_width,
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            timings: InteractionTimings::default(),
            router: RouterConfig::default(),
            surface_width: DEFAULT_SURFACE_WIDTH,
        }
    }
}

/// Speech engine notifications, keyed by the id the channel assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechEvent {
    Finished { utterance_id: String },
    Failed { utterance_id: String },
}

impl SpeechEvent {
    pub fn utterance_id(&self) -> &str {
        match self {
            SpeechEvent::Finished { utterance_id } | SpeechEvent::Failed { utterance_id } => {
                utterance_id
            }
        }
    }
}

/// Messages the host side sends to the session thread.
#[derive(Debug)]
pub enum SessionInput {
    Pointer(PointerEvent),
    SurfaceResized { width: f32 },
    /// The speech engine finished initializing; greet the user.
    SpeechReady,
    Speech(SpeechEvent),
    QueryState(Sender<InteractionSnapshot>),
    Shutdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionControl {
    Continue,
    Exit,
}

/// Counters reported when the session ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub gestures: u64,
    pub frames_routed: u64,
    pub frames_gated: u64,
    /// Detection frames that a newer outcome replaced before they were routed.
    pub frames_superseded: u64,
    pub empty_frames: u64,
}

pub struct Session {
    recognizer: GestureRecognizer,
    machine: InteractionMachine,
    router: DetectionRouter,
    timers: TimerTable,
    feedback: FeedbackChannel,
    overlay: Option<Box<dyn OverlaySink>>,
    stats: SessionStats,
    closed: bool,
}

impl Session {
    pub fn new(
        settings: SessionSettings,
        labels: Vec<String>,
        feedback: FeedbackChannel,
        overlay: Option<Box<dyn OverlaySink>>,
    ) -> Self {
        Self {
            recognizer: GestureRecognizer::new(
                settings.timings.hold_threshold,
                settings.surface_width,
            ),
            machine: InteractionMachine::new(labels, settings.timings),
            router: DetectionRouter::new(settings.router),
            timers: TimerTable::new(),
            feedback,
            overlay,
            stats: SessionStats::default(),
            closed: false,
        }
    }

    pub fn snapshot(&self) -> InteractionSnapshot {
        self.machine.snapshot()
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    pub fn handle_input(&mut self, input: SessionInput, now: Instant) -> SessionControl {
        match input {
            SessionInput::Pointer(event) => self.handle_pointer(event, now),
            SessionInput::SurfaceResized { width } => self.recognizer.set_surface_width(width),
            SessionInput::SpeechReady => {
                let greeting = self.machine.greeting();
                self.feedback.dispatch(greeting);
            }
            SessionInput::Speech(event) => self.handle_speech(event, now),
            SessionInput::QueryState(reply) => {
                if reply.send(self.snapshot()).is_err() {
                    log_debug("state query dropped before reply");
                }
            }
            SessionInput::Shutdown => return SessionControl::Exit,
        }
        SessionControl::Continue
    }

    /// `now` drives the state machine's timers; the recognizer uses the event's own timestamp.
    pub fn handle_pointer(&mut self, event: PointerEvent, now: Instant) {
        if let Some(gesture) = self.recognizer.on_pointer(event, &mut self.timers) {
            self.apply_gesture(gesture, now);
        }
    }

    pub fn handle_speech(&mut self, event: SpeechEvent, now: Instant) {
        if let SpeechEvent::Failed { utterance_id } = &event {
            tracing::warn!(
                target: "sightline::session",
                utterance_id = %utterance_id,
                "speech engine reported a failed utterance"
            );
        }
        let requests = self
            .machine
            .on_utterance_finished(event.utterance_id(), now, &mut self.timers);
        self.feedback.dispatch_all(requests);
    }

    pub fn handle_detection(&mut self, outcome: DetectionOutcome, now: Instant) {
        match outcome {
            DetectionOutcome::Empty => self.clear_overlay(),
            DetectionOutcome::Detections {
                boxes,
                inference_ms,
            } => self.route_frame(&boxes, inference_ms, now),
        }
    }

    /// Account for an outcome that a newer one replaced. Its boxes are never routed,
    /// but an empty frame still clears the overlay.
    pub fn skip_detection(&mut self, outcome: DetectionOutcome) {
        match outcome {
            DetectionOutcome::Empty => self.clear_overlay(),
            DetectionOutcome::Detections { .. } => self.stats.frames_superseded += 1,
        }
    }

    /// Fire every timer whose deadline is at or before `now`.
    pub fn handle_timers(&mut self, now: Instant) {
        while let Some(key) = self.timers.pop_expired(now) {
            tracing::debug!(target: "sightline::session", timer = key.label(), "timer fired");
            match key {
                TimerKey::Hold => {
                    if let Some(gesture) = self.recognizer.on_hold_timer() {
                        self.apply_gesture(gesture, now);
                    }
                }
                TimerKey::TargetPromptDelay
                | TimerKey::TargetPromptAnnounce
                | TimerKey::ConfirmTimeout => {
                    let requests = self.machine.on_timer(key, now, &mut self.timers);
                    self.feedback.dispatch_all(requests);
                }
            }
        }
    }

    /// Dispose of timers and silence speech. Safe to call more than once.
    pub fn shutdown(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.recognizer.reset(&mut self.timers);
        self.machine.shutdown(&mut self.timers);
        self.timers.cancel_all();
        self.feedback.stop_speech();
        log_debug(&format!("session closed: {:?}", self.stats));
    }

    fn clear_overlay(&mut self) {
        self.stats.empty_frames += 1;
        if let Some(overlay) = self.overlay.as_mut() {
            overlay.clear();
        }
    }

    fn apply_gesture(&mut self, gesture: Gesture, now: Instant) {
        self.stats.gestures += 1;
        tracing::debug!(target: "sightline::session", ?gesture, "gesture recognized");
        let requests = self.machine.handle_gesture(gesture, now, &mut self.timers);
        self.feedback.dispatch_all(requests);
    }

    fn route_frame(&mut self, boxes: &[BoundingBox], inference_ms: u64, now: Instant) {
        let snapshot = self.machine.snapshot();
        if !DetectionRouter::accepts(&snapshot) {
            self.stats.frames_gated += 1;
            return;
        }
        self.stats.frames_routed += 1;
        if let Some(overlay) = self.overlay.as_mut() {
            overlay.show(boxes, inference_ms);
        }
        let speaking = self.feedback.is_speaking();
        let requests = self.router.route(&snapshot, boxes, now, speaking);
        if !requests.is_empty() {
            log_debug_content(&format!(
                "frame feedback ({inference_ms}ms): {:?}",
                requests
                    .iter()
                    .filter_map(FeedbackRequest::spoken_text)
                    .collect::<Vec<_>>()
            ));
        }
        self.feedback.dispatch_all(requests);
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.shutdown();
    }
}
