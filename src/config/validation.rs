use super::defaults::{
    DEFAULT_LABEL_DENYLIST, MAX_CONFIRM_TIMEOUT_MS, MAX_HOLD_THRESHOLD_MS, MAX_IGNORE_LABELS,
    MAX_LABEL_BYTES, MAX_PROMPT_DELAY_MS, MAX_PULSE_MS, MAX_SPEAK_COOLDOWN_MS,
    MIN_HOLD_THRESHOLD_MS,
};
use super::{AppConfig, InteractionTimings, RouterConfig};
use anyhow::{bail, Context, Result};
use clap::Parser;
use std::time::Duration;

impl AppConfig {
    /// Parse CLI arguments and validate them right away.
    pub fn parse_args() -> Result<Self> {
        let mut config = Self::parse();
        config.validate()?;
        Ok(config)
    }

    /// Check CLI values and normalize paths.
    pub fn validate(&mut self) -> Result<()> {
        if !(MIN_HOLD_THRESHOLD_MS..=MAX_HOLD_THRESHOLD_MS).contains(&self.hold_threshold_ms) {
            bail!(
                "--hold-threshold-ms must be between {MIN_HOLD_THRESHOLD_MS} and {MAX_HOLD_THRESHOLD_MS}, got {}",
                self.hold_threshold_ms
            );
        }
        if self.target_prompt_delay_ms > MAX_PROMPT_DELAY_MS {
            bail!(
                "--target-prompt-delay-ms must be at most {MAX_PROMPT_DELAY_MS}, got {}",
                self.target_prompt_delay_ms
            );
        }
        if self.target_announce_ms > MAX_PROMPT_DELAY_MS {
            bail!(
                "--target-announce-ms must be at most {MAX_PROMPT_DELAY_MS}, got {}",
                self.target_announce_ms
            );
        }
        if self.speak_cooldown_ms > MAX_SPEAK_COOLDOWN_MS {
            bail!(
                "--speak-cooldown-ms must be at most {MAX_SPEAK_COOLDOWN_MS}, got {}",
                self.speak_cooldown_ms
            );
        }
        if self.general_pulse_ms == 0 || self.general_pulse_ms > MAX_PULSE_MS {
            bail!(
                "--general-pulse-ms must be between 1 and {MAX_PULSE_MS}, got {}",
                self.general_pulse_ms
            );
        }
        if self.target_pulse_ms == 0 || self.target_pulse_ms > MAX_PULSE_MS {
            bail!(
                "--target-pulse-ms must be between 1 and {MAX_PULSE_MS}, got {}",
                self.target_pulse_ms
            );
        }
        if self.confirm_timeout_ms > MAX_CONFIRM_TIMEOUT_MS {
            bail!(
                "--confirm-timeout-ms must be at most {MAX_CONFIRM_TIMEOUT_MS} (0 disables), got {}",
                self.confirm_timeout_ms
            );
        }
        if !self.surface_width.is_finite() || self.surface_width <= 0.0 {
            bail!(
                "--surface-width must be a positive number, got {}",
                self.surface_width
            );
        }

        if self.ignore_labels.len() > MAX_IGNORE_LABELS {
            bail!(
                "--ignore-label repeated too many times (max {MAX_IGNORE_LABELS}, got {})",
                self.ignore_labels.len()
            );
        }
        for label in &mut self.ignore_labels {
            let trimmed = label.trim();
            if trimmed.is_empty() || trimmed.len() > MAX_LABEL_BYTES {
                bail!("--ignore-label values must be 1..={MAX_LABEL_BYTES} bytes");
            }
            if trimmed.chars().any(char::is_control) {
                bail!("--ignore-label must not contain control characters");
            }
            *label = trimmed.to_string();
        }

        if let Some(path) = &mut self.labels_path {
            if !path.is_file() {
                bail!("--labels path '{}' is not a readable file", path.display());
            }
            // Store a canonical path so log lines are unambiguous.
            *path = path
                .canonicalize()
                .with_context(|| format!("failed to canonicalize labels path '{}'", path.display()))?;
        }

        Ok(())
    }

    /// Snapshot the timer lengths for the recognizer and state machine.
    pub fn interaction_timings(&self) -> InteractionTimings {
        InteractionTimings {
            hold_threshold: Duration::from_millis(self.hold_threshold_ms),
            target_prompt_delay: Duration::from_millis(self.target_prompt_delay_ms),
            target_announce_delay: Duration::from_millis(self.target_announce_ms),
            confirm_timeout: (self.confirm_timeout_ms > 0)
                .then(|| Duration::from_millis(self.confirm_timeout_ms)),
        }
    }

    /// Snapshot the per-frame feedback settings.
    pub fn router_config(&self) -> RouterConfig {
        RouterConfig {
            speak_cooldown: Duration::from_millis(self.speak_cooldown_ms),
            general_pulse: Duration::from_millis(self.general_pulse_ms),
            target_pulse: Duration::from_millis(self.target_pulse_ms),
        }
    }

    /// Labels removed from the selectable target list.
    pub fn label_denylist(&self) -> Vec<String> {
        let mut denylist: Vec<String> = if self.no_default_denylist {
            Vec::new()
        } else {
            DEFAULT_LABEL_DENYLIST
                .iter()
                .map(|label| (*label).to_string())
                .collect()
        };
        for label in &self.ignore_labels {
            if !denylist.iter().any(|known| known.eq_ignore_ascii_case(label)) {
                denylist.push(label.clone());
            }
        }
        denylist
    }
}
