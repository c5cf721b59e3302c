//! Structured JSON event sink.
//!
//! Only Sightline's own targets are recorded. `--log-timings` opens up the
//! debug events that carry per-frame timings and drop counts.

use crate::config::AppConfig;
use std::env;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing::Level;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Layer;

static TRACING_INIT: OnceLock<()> = OnceLock::new();

/// Event targets, and whether their debug events are per-frame timing data.
const EVENT_TARGETS: [(&str, bool); 6] = [
    ("sightline::interaction", false),
    ("sightline::feedback", false),
    ("sightline::ipc", true),
    ("sightline::session", true),
    ("sightline::router", true),
    ("sightline::detection", true),
];

pub(crate) fn tracing_log_path() -> PathBuf {
    env::var("SIGHTLINE_TRACE_LOG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| env::temp_dir().join("sightline_trace.jsonl"))
}

fn event_filter(log_timings: bool) -> Targets {
    EVENT_TARGETS
        .iter()
        .fold(Targets::new(), |targets, &(target, per_frame)| {
            let level = if log_timings && per_frame {
                Level::DEBUG
            } else {
                Level::INFO
            };
            targets.with_target(target, level)
        })
}

/// Install the JSON trace sink once; later calls are no-ops.
pub(crate) fn init_tracing(config: &AppConfig) {
    let enabled = (config.logs || config.log_timings) && !config.no_logs;
    if !enabled {
        return;
    }

    let _ = TRACING_INIT.get_or_init(|| {
        let file = match OpenOptions::new()
            .create(true)
            .append(true)
            .open(tracing_log_path())
        {
            Ok(file) => file,
            Err(_) => return,
        };
        let events = tracing_subscriber::fmt::layer()
            .json()
            .with_timer(UtcTime::rfc_3339())
            .with_writer(file)
            .with_target(true)
            .with_current_span(false)
            .with_span_list(false)
            .with_filter(event_filter(config.log_timings));
        let subscriber = tracing_subscriber::registry().with(events);
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}
