use anyhow::{Context, Result};
use crossbeam_channel::{bounded, unbounded, Sender};
use std::io::{self, BufRead, BufReader, Write};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use super::host::{HostDetector, HostHaptics, HostOverlay, HostSpeech, SpeakingState};
use super::protocol::{IpcCommand, IpcEvent};
use super::writer::{spawn_writer_thread, WriterMessage};
use crate::config::AppConfig;
use crate::detection::{
    filter_labels, load_labels_file, outcome_channel, spawn_frame_worker, DetectionOutcome,
    FrameSlot,
};
use crate::feedback::FeedbackChannel;
use crate::gesture::{PointerAction, PointerEvent};
use crate::session::{
    run_session, Session, SessionInput, SessionSettings, SessionStats, SpeechEvent,
    STATE_QUERY_TIMEOUT,
};
use crate::{log_debug, log_debug_content};

// ============================================================================
// Entry Points
// ============================================================================

/// Serve the host over stdin/stdout until `shutdown` or stdin EOF.
pub fn run_ipc_mode(config: AppConfig) -> Result<()> {
    log_debug("Starting JSON IPC mode");
    let stats = run_ipc_session(&config, BufReader::new(io::stdin()), io::stdout())?;
    log_debug(&format!("IPC mode exiting: {stats:?}"));
    Ok(())
}

/// Wire a session to an arbitrary line reader and event writer.
pub(super) fn run_ipc_session<R, W>(
    config: &AppConfig,
    input: R,
    output: W,
) -> Result<SessionStats>
where
    R: BufRead + Send + 'static,
    W: Write + Send + 'static,
{
    let raw_labels = match &config.labels_path {
        Some(path) => load_labels_file(path)
            .with_context(|| format!("failed to load labels from {}", path.display()))?,
        None => {
            tracing::warn!(
                target: "sightline::ipc",
                "no --labels file; target selection will offer nothing"
            );
            Vec::new()
        }
    };

    let (event_tx, event_rx) = unbounded();
    let writer = spawn_writer_thread(output, event_rx);

    let (results_tx, results_rx) = outcome_channel();
    let (worker, raw_labels) = spawn_frame_worker(HostDetector::new(raw_labels), results_tx);
    let labels = filter_labels(raw_labels, &config.label_denylist());
    log_debug(&format!("{} selectable labels", labels.len()));

    let settings = SessionSettings::from_config(config);
    send_event(
        &event_tx,
        IpcEvent::Capabilities {
            session_id: session_id(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            labels: labels.clone(),
            hold_threshold_ms: config.hold_threshold_ms,
            surface_width: settings.surface_width,
            confirm_timeout_ms: settings
                .timings
                .confirm_timeout
                .map(|timeout| timeout.as_millis() as u64),
        },
    );

    let speaking = Arc::new(SpeakingState::default());
    let feedback = FeedbackChannel::new(
        Some(Box::new(HostSpeech::new(
            event_tx.clone(),
            Arc::clone(&speaking),
        ))),
        Some(Box::new(HostHaptics::new(event_tx.clone()))),
    );
    let mut session = Session::new(
        settings,
        labels,
        feedback,
        Some(Box::new(HostOverlay::new(event_tx.clone()))),
    );

    let (input_tx, input_rx) = unbounded();
    let _reader = spawn_command_reader(
        input,
        CommandRoute {
            session: input_tx,
            frames: worker.slot(),
            speaking,
            events: event_tx.clone(),
        },
    );

    let stats = run_session(&mut session, &input_rx, &results_rx);
    drop(session);
    // Disconnect results first so a worker blocked on a full channel can exit.
    drop(results_rx);
    let dropped = worker.slot().dropped_frames();
    worker.shutdown();
    tracing::info!(
        target: "sightline::ipc",
        frames_routed = stats.frames_routed,
        frames_gated = stats.frames_gated,
        frames_superseded = stats.frames_superseded,
        frames_dropped = dropped,
        "session finished"
    );

    let _ = event_tx.send(WriterMessage::Shutdown);
    if writer.join().is_err() {
        log_debug("event writer panicked");
    }
    Ok(stats)
}

fn session_id() -> String {
    format!(
        "{:x}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis()
    )
}

pub(super) fn send_event(events: &Sender<WriterMessage>, event: IpcEvent) {
    if events.send(WriterMessage::Event(event)).is_err() {
        log_debug("event dropped: writer already stopped");
    }
}

// ============================================================================
// Stdin Reader Thread
// ============================================================================

/// Where each decoded command goes.
pub(super) struct CommandRoute {
    pub(super) session: Sender<SessionInput>,
    pub(super) frames: Arc<FrameSlot<DetectionOutcome>>,
    pub(super) speaking: Arc<SpeakingState>,
    pub(super) events: Sender<WriterMessage>,
}

/// Continue reading after this command?
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ReadFlow {
    Continue,
    Stop,
}

fn spawn_command_reader<R>(input: R, route: CommandRoute) -> thread::JoinHandle<()>
where
    R: BufRead + Send + 'static,
{
    thread::spawn(move || {
        for line in input.lines() {
            let line = match line {
                Ok(l) => l,
                Err(_) => break,
            };

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            match serde_json::from_str::<IpcCommand>(trimmed) {
                Ok(cmd) => {
                    if route_command(cmd, &route) == ReadFlow::Stop {
                        break;
                    }
                }
                Err(e) => {
                    send_event(
                        &route.events,
                        IpcEvent::Error {
                            message: format!("Invalid command: {e}"),
                            recoverable: true,
                        },
                    );
                }
            }
        }

        // Dropping `route` disconnects the session's input channel.
        log_debug("Stdin reader thread exiting");
    })
}

/// Translate one host command into session input, worker frames, or a reply.
pub(super) fn route_command(cmd: IpcCommand, route: &CommandRoute) -> ReadFlow {
    let now = Instant::now();
    let input = match cmd {
        IpcCommand::PointerDown { x, y } => pointer(PointerAction::Down, x, y, now),
        IpcCommand::PointerMove { x, y } => pointer(PointerAction::Move, x, y, now),
        IpcCommand::PointerUp { x, y } => pointer(PointerAction::Up, x, y, now),
        IpcCommand::Surface { width, .. } => SessionInput::SurfaceResized { width },
        IpcCommand::Frame {
            boxes,
            inference_ms,
        } => {
            publish_frame(
                route,
                DetectionOutcome::Detections {
                    boxes,
                    inference_ms,
                },
            );
            return ReadFlow::Continue;
        }
        IpcCommand::EmptyFrame => {
            publish_frame(route, DetectionOutcome::Empty);
            return ReadFlow::Continue;
        }
        IpcCommand::SpeechReady => SessionInput::SpeechReady,
        IpcCommand::UtteranceDone { utterance_id } => {
            route.speaking.finish(&utterance_id);
            SessionInput::Speech(SpeechEvent::Finished { utterance_id })
        }
        IpcCommand::UtteranceError { utterance_id } => {
            route.speaking.finish(&utterance_id);
            SessionInput::Speech(SpeechEvent::Failed { utterance_id })
        }
        IpcCommand::GetState => {
            reply_with_state(route);
            return ReadFlow::Continue;
        }
        IpcCommand::Shutdown => {
            let _ = route.session.send(SessionInput::Shutdown);
            return ReadFlow::Stop;
        }
    };
    if route.session.send(input).is_err() {
        log_debug("session has exited; stopping command reader");
        return ReadFlow::Stop;
    }
    ReadFlow::Continue
}

fn pointer(action: PointerAction, x: f32, y: f32, at: Instant) -> SessionInput {
    SessionInput::Pointer(PointerEvent::new(action, x, y, at))
}

fn publish_frame(route: &CommandRoute, frame: DetectionOutcome) {
    let before = route.frames.dropped_frames();
    if !route.frames.publish(frame) {
        log_debug("frame arrived after worker shutdown; ignored");
        return;
    }
    if route.frames.dropped_frames() > before {
        tracing::debug!(
            target: "sightline::ipc",
            dropped = before + 1,
            "replaced a frame the detector had not reached"
        );
    }
}

fn reply_with_state(route: &CommandRoute) {
    let (reply_tx, reply_rx) = bounded(1);
    if route.session.send(SessionInput::QueryState(reply_tx)).is_err() {
        return;
    }
    match reply_rx.recv_timeout(STATE_QUERY_TIMEOUT) {
        Ok(snapshot) => {
            log_debug_content(&format!("state reply: {snapshot:?}"));
            send_event(&route.events, IpcEvent::State { snapshot });
        }
        Err(_) => send_event(
            &route.events,
            IpcEvent::Error {
                message: "state unavailable".to_string(),
                recoverable: true,
            },
        ),
    }
}
