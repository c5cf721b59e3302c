//! Mode and target selection driven by taps, holds, and speech completions.
//!
//! The reachable states form a closed [`Phase`] enum. The flag view other
//! components read ([`InteractionSnapshot`]) is derived from the phase, so
//! combinations like "awaiting confirmation while detection is enabled" cannot be
//! represented.

mod machine;

use serde::Serialize;

use crate::feedback::UtteranceTag;

pub use machine::InteractionMachine;

pub const ROOT_PROMPT: &str = "Tap the screen to switch between modes. Hold to confirm selection.";
pub const RETURN_PROMPT: &str =
    "Returned to main menu. Tap to switch between modes. Hold to confirm selection.";
pub const TARGET_PROMPT: &str = "Tap to choose the object you want to navigate to.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AppMode {
    None,
    General,
    Specific,
}

/// A mode the user can actually confirm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveMode {
    General,
    Specific,
}

impl ActiveMode {
    pub fn name(self) -> &'static str {
        match self {
            ActiveMode::General => "General",
            ActiveMode::Specific => "Specific",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            ActiveMode::General => ActiveMode::Specific,
            ActiveMode::Specific => ActiveMode::General,
        }
    }

    pub fn as_app_mode(self) -> AppMode {
        match self {
            ActiveMode::General => AppMode::General,
            ActiveMode::Specific => AppMode::Specific,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleDirection {
    Previous,
    Next,
}

/// A gesture after the current phase has given it a meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureEvent {
    ModeToggleTap,
    LabelCycleTap(CycleDirection),
    HoldConfirm,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// Main menu; taps move the mode cursor.
    Menu,
    /// Mode chosen, waiting for its confirmation utterance to finish.
    ModePending { mode: ActiveMode, tag: UtteranceTag },
    ActiveGeneral,
    /// Specific mode confirmed; the target prompt is scheduled.
    AwaitingTargetPrompt,
    SelectingTarget,
    /// Target chosen, waiting for its confirmation utterance to finish.
    TargetPending { target: String, tag: UtteranceTag },
    ActiveSpecific { target: String },
}

impl Phase {
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Menu => "menu",
            Phase::ModePending { .. } => "mode_pending",
            Phase::ActiveGeneral => "active_general",
            Phase::AwaitingTargetPrompt => "awaiting_target_prompt",
            Phase::SelectingTarget => "selecting_target",
            Phase::TargetPending { .. } => "target_pending",
            Phase::ActiveSpecific { .. } => "active_specific",
        }
    }

    pub fn current_mode(&self) -> AppMode {
        match self {
            Phase::Menu => AppMode::None,
            Phase::ModePending { mode, .. } => mode.as_app_mode(),
            Phase::ActiveGeneral => AppMode::General,
            Phase::AwaitingTargetPrompt
            | Phase::SelectingTarget
            | Phase::TargetPending { .. }
            | Phase::ActiveSpecific { .. } => AppMode::Specific,
        }
    }

    pub fn detection_enabled(&self) -> bool {
        match self {
            Phase::Menu | Phase::ModePending { .. } | Phase::TargetPending { .. } => false,
            Phase::ActiveGeneral
            | Phase::AwaitingTargetPrompt
            | Phase::SelectingTarget
            | Phase::ActiveSpecific { .. } => true,
        }
    }

    pub fn target(&self) -> Option<&str> {
        match self {
            Phase::TargetPending { target, .. } | Phase::ActiveSpecific { target } => {
                Some(target)
            }
            _ => None,
        }
    }

    pub fn pending_tag(&self) -> Option<UtteranceTag> {
        match self {
            Phase::ModePending { tag, .. } | Phase::TargetPending { tag, .. } => Some(*tag),
            _ => None,
        }
    }
}

/// Read-only view of the interaction state for the router and the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InteractionSnapshot {
    pub phase: &'static str,
    pub current_mode: AppMode,
    pub selected_mode: AppMode,
    pub target_object: Option<String>,
    pub current_label_index: usize,
    pub label_count: usize,
    pub selecting_target: bool,
    pub awaiting_target_confirmation: bool,
    pub detection_enabled: bool,
}
