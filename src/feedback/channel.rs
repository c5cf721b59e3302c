use super::{FeedbackRequest, HapticActuator, QueueMode, SpeechEngine};
use crate::{log_debug, log_debug_content};

pub struct FeedbackChannel {
    speech: Option<Box<dyn SpeechEngine>>,
    haptics: Option<Box<dyn HapticActuator>>,
    next_utterance: u64,
    speech_missing_logged: bool,
    haptics_missing_logged: bool,
}

impl FeedbackChannel {
    pub fn new(
        speech: Option<Box<dyn SpeechEngine>>,
        haptics: Option<Box<dyn HapticActuator>>,
    ) -> Self {
        if speech.is_none() {
            tracing::warn!(target: "sightline::feedback", "speech engine unavailable");
        }
        if haptics.is_none() {
            tracing::warn!(target: "sightline::feedback", "haptic actuator unavailable");
        }
        Self {
            speech,
            haptics,
            next_utterance: 0,
            speech_missing_logged: false,
            haptics_missing_logged: false,
        }
    }

    pub fn has_speech(&self) -> bool {
        self.speech.is_some()
    }

    pub fn is_speaking(&self) -> bool {
        self.speech
            .as_ref()
            .is_some_and(|engine| engine.is_speaking())
    }

    pub fn dispatch_all(&mut self, requests: impl IntoIterator<Item = FeedbackRequest>) {
        for request in requests {
            self.dispatch(request);
        }
    }

    pub fn dispatch(&mut self, request: FeedbackRequest) {
        match request {
            FeedbackRequest::Speak { text, queue, tag } => {
                let utterance_id = match tag {
                    Some(tag) => tag.to_string(),
                    None => {
                        self.next_utterance += 1;
                        format!("u{}", self.next_utterance)
                    }
                };
                self.speak(&text, queue, &utterance_id);
            }
            FeedbackRequest::Vibrate {
                intensity,
                duration_ms,
            } => self.vibrate(intensity, duration_ms),
        }
    }

    pub fn stop_speech(&mut self) {
        if let Some(engine) = self.speech.as_mut() {
            engine.stop();
        }
    }

    fn speak(&mut self, text: &str, queue: QueueMode, utterance_id: &str) {
        let Some(engine) = self.speech.as_mut() else {
            if !self.speech_missing_logged {
                log_debug("speech requested but no engine is available; dropping");
                self.speech_missing_logged = true;
            }
            return;
        };
        log_debug_content(&format!("speak [{utterance_id}] {queue:?}: {text}"));
        if let Err(err) = engine.speak(text, queue, utterance_id) {
            log_debug(&format!("speech engine rejected utterance {utterance_id}: {err:#}"));
        }
    }

    fn vibrate(&mut self, intensity: u8, duration_ms: u64) {
        let Some(actuator) = self.haptics.as_mut() else {
            if !self.haptics_missing_logged {
                log_debug("vibration requested but no actuator is available; dropping");
                self.haptics_missing_logged = true;
            }
            return;
        };
        if let Err(err) = actuator.vibrate(intensity, duration_ms) {
            log_debug(&format!("haptic actuator failed: {err:#}"));
        }
    }
}
