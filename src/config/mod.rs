//! Command-line parsing and validation helpers.

mod defaults;
#[cfg(test)]
mod tests;
mod validation;

use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::time::Duration;

pub use defaults::{
    DEFAULT_CONFIRM_TIMEOUT_MS, DEFAULT_GENERAL_PULSE_MS, DEFAULT_HOLD_THRESHOLD_MS,
    DEFAULT_LABEL_DENYLIST, DEFAULT_SPEAK_COOLDOWN_MS, DEFAULT_SURFACE_WIDTH,
    DEFAULT_TARGET_ANNOUNCE_MS, DEFAULT_TARGET_PROMPT_DELAY_MS, DEFAULT_TARGET_PULSE_MS,
};

/// CLI options for the Sightline host runtime.
#[derive(Debug, Parser, Clone)]
#[command(about = "Sightline assistive detection feedback", author, version)]
pub struct AppConfig {
    /// Press duration that turns a touch into a hold (milliseconds)
    #[arg(long = "hold-threshold-ms", default_value_t = DEFAULT_HOLD_THRESHOLD_MS)]
    pub hold_threshold_ms: u64,

    /// Delay between a confirmed specific mode and the target prompt (milliseconds)
    #[arg(
        long = "target-prompt-delay-ms",
        default_value_t = DEFAULT_TARGET_PROMPT_DELAY_MS
    )]
    pub target_prompt_delay_ms: u64,

    /// Delay between the target prompt and the first label announcement (milliseconds)
    #[arg(long = "target-announce-ms", default_value_t = DEFAULT_TARGET_ANNOUNCE_MS)]
    pub target_announce_ms: u64,

    /// Minimum gap between two detection announcements (milliseconds)
    #[arg(long = "speak-cooldown-ms", default_value_t = DEFAULT_SPEAK_COOLDOWN_MS)]
    pub speak_cooldown_ms: u64,

    /// Vibration length used alongside general-mode announcements (milliseconds)
    #[arg(long = "general-pulse-ms", default_value_t = DEFAULT_GENERAL_PULSE_MS)]
    pub general_pulse_ms: u64,

    /// Vibration length of target-tracking pulses (milliseconds)
    #[arg(long = "target-pulse-ms", default_value_t = DEFAULT_TARGET_PULSE_MS)]
    pub target_pulse_ms: u64,

    /// Settle a confirmation whose speech never completes after this long (0 disables)
    #[arg(long = "confirm-timeout-ms", default_value_t = DEFAULT_CONFIRM_TIMEOUT_MS)]
    pub confirm_timeout_ms: u64,

    /// Initial width of the touch surface, used to split left/right taps
    #[arg(long = "surface-width", default_value_t = DEFAULT_SURFACE_WIDTH)]
    pub surface_width: f32,

    /// Label file (one label per line, or YAML with a `names` list/map)
    #[arg(long = "labels", env = "SIGHTLINE_LABELS")]
    pub labels_path: Option<PathBuf>,

    /// Extra label to hide from target selection (repeatable)
    #[arg(long = "ignore-label", action = ArgAction::Append, value_name = "LABEL")]
    pub ignore_labels: Vec<String>,

    /// Do not apply the built-in label denylist
    #[arg(long = "no-default-denylist", default_value_t = false)]
    pub no_default_denylist: bool,

    /// Enable file logging (debug)
    #[arg(long = "logs", env = "SIGHTLINE_LOGS", default_value_t = false)]
    pub logs: bool,

    /// Disable all file logging (overrides --logs and log env vars)
    #[arg(long = "no-logs", env = "SIGHTLINE_NO_LOGS", default_value_t = false)]
    pub no_logs: bool,

    /// Allow logging spoken text and label names (debug log only)
    #[arg(
        long = "log-content",
        env = "SIGHTLINE_LOG_CONTENT",
        default_value_t = false
    )]
    pub log_content: bool,

    /// Enable verbose timing logs
    #[arg(long)]
    pub log_timings: bool,
}

/// Timer lengths consumed by the gesture recognizer and the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InteractionTimings {
    pub hold_threshold: Duration,
    pub target_prompt_delay: Duration,
    pub target_announce_delay: Duration,
    pub confirm_timeout: Option<Duration>,
}

impl Default for InteractionTimings {
    fn default() -> Self {
        Self {
            hold_threshold: Duration::from_millis(DEFAULT_HOLD_THRESHOLD_MS),
            target_prompt_delay: Duration::from_millis(DEFAULT_TARGET_PROMPT_DELAY_MS),
            target_announce_delay: Duration::from_millis(DEFAULT_TARGET_ANNOUNCE_MS),
            confirm_timeout: Some(Duration::from_millis(DEFAULT_CONFIRM_TIMEOUT_MS)),
        }
    }
}

/// Tunables for per-frame feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouterConfig {
    pub speak_cooldown: Duration,
    pub general_pulse: Duration,
    pub target_pulse: Duration,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            speak_cooldown: Duration::from_millis(DEFAULT_SPEAK_COOLDOWN_MS),
            general_pulse: Duration::from_millis(DEFAULT_GENERAL_PULSE_MS),
            target_pulse: Duration::from_millis(DEFAULT_TARGET_PULSE_MS),
        }
    }
}
