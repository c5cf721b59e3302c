//! Sightline host entrypoint.
//!
//! Speaks the JSON-lines protocol on stdin/stdout: the host forwards touch,
//! detector, and speech-engine events; Sightline answers with speech, vibration,
//! and overlay events.

use anyhow::Result;
use sightline::config::AppConfig;
use sightline::{init_logging, log_debug, log_debug_content, log_file_path, log_panic};
use std::panic;

fn install_panic_hook() {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        log_panic(info);
        let location = info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());
        log_debug(&format!("panic at {location}"));
        log_debug_content(&format!("panic: {info}"));
        previous(info);
    }));
}

fn main() -> Result<()> {
    let config = AppConfig::parse_args()?;
    init_logging(&config);
    install_panic_hook();
    log_debug("=== Sightline Started ===");
    log_debug(&format!("Log file: {:?}", log_file_path()));

    sightline::ipc::run_ipc_mode(config)
}
