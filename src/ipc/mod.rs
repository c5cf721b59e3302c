//! JSON IPC mode for the host platform.
//!
//! The host (camera, touch surface, TTS, vibrator) talks to the core over a
//! JSON-lines protocol on stdin/stdout.
//!
//! Architecture:
//! - Stdin reader thread: decodes commands, feeds the session, publishes frames
//! - Frame worker: drop-latest slot in front of the detector
//! - Session thread: all interaction state, timers, and feedback decisions
//! - Writer thread: serializes events back to the host in order
//!
//! Protocol:
//! - Each line is a JSON object
//! - Events (Rust → host): {"event": "...", ...}
//! - Commands (host → Rust): {"cmd": "...", ...}

mod host;
mod protocol;
mod session;
mod writer;


pub use protocol::{IpcCommand, IpcEvent};
pub use session::run_ipc_mode;
