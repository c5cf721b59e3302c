pub const DEFAULT_HOLD_THRESHOLD_MS: u64 = 1500;
pub const MIN_HOLD_THRESHOLD_MS: u64 = 200;
pub const MAX_HOLD_THRESHOLD_MS: u64 = 5000;

pub const DEFAULT_TARGET_PROMPT_DELAY_MS: u64 = 2000;
pub const DEFAULT_TARGET_ANNOUNCE_MS: u64 = 3000;
pub const MAX_PROMPT_DELAY_MS: u64 = 30_000;

pub const DEFAULT_SPEAK_COOLDOWN_MS: u64 = 1000;
pub const MAX_SPEAK_COOLDOWN_MS: u64 = 60_000;

pub const DEFAULT_GENERAL_PULSE_MS: u64 = 200;
pub const DEFAULT_TARGET_PULSE_MS: u64 = 100;
pub const MAX_PULSE_MS: u64 = 2000;

/// 0 disables the fallback.
pub const DEFAULT_CONFIRM_TIMEOUT_MS: u64 = 6000;
pub const MAX_CONFIRM_TIMEOUT_MS: u64 = 60_000;

pub const DEFAULT_SURFACE_WIDTH: f32 = 1080.0;

/// Labels the detector knows about but that make poor navigation targets.
pub const DEFAULT_LABEL_DENYLIST: &[&str] = &[
    "bath unit",
    "sideboard",
    "couch",
    "shower cabinet",
    "dining table",
];

pub const MAX_IGNORE_LABELS: usize = 256;
pub const MAX_LABEL_BYTES: usize = 128;
