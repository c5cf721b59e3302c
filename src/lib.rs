pub mod app;
pub mod config;
pub mod detection;
pub mod feedback;
pub mod gesture;
pub mod interaction;
pub mod ipc;
mod lock;
pub mod router;
pub mod session;
mod telemetry;
pub mod timers;

pub use app::{
    crash_log_path, init_logging, log_debug, log_debug_content, log_file_path, log_panic,
};
pub(crate) use lock::lock_or_recover;
