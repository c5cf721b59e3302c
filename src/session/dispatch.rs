use crossbeam_channel::{at, never, select, Receiver};
use std::time::Instant;

use super::{Session, SessionControl, SessionInput, SessionStats};
use crate::detection::DetectionOutcome;
use crate::log_debug;

/// Drive `session` until a shutdown request or until its input channel disconnects.
///
/// The loop blocks on whichever comes first: a host input, a detection result,
/// or the earliest armed timer deadline. With no timer armed it waits on a
/// `never()` receiver, so an idle session costs nothing.
pub fn run_session(
    session: &mut Session,
    inputs: &Receiver<SessionInput>,
    results: &Receiver<DetectionOutcome>,
) -> SessionStats {
    let closed_results = never::<DetectionOutcome>();
    let mut results_open = true;
    loop {
        let timer_rx = match session.next_deadline() {
            Some(deadline) => at(deadline),
            None => never(),
        };
        let results_rx = if results_open {
            results
        } else {
            &closed_results
        };
        select! {
            recv(inputs) -> input => match input {
                Ok(input) => {
                    if session.handle_input(input, Instant::now()) == SessionControl::Exit {
                        log_debug("session shutdown requested");
                        break;
                    }
                }
                Err(_) => {
                    log_debug("session input channel disconnected, exiting");
                    break;
                }
            },
            recv(results_rx) -> outcome => match outcome {
                Ok(outcome) => {
                    let newest = newest_outcome(session, outcome, results);
                    session.handle_detection(newest, Instant::now());
                }
                Err(_) => {
                    tracing::warn!(
                        target: "sightline::session",
                        "detection results closed; continuing without detection"
                    );
                    results_open = false;
                }
            },
            recv(timer_rx) -> _ => {
                // A release queued before the deadline must end the press before Hold fires.
                if drain_inputs(session, inputs) == SessionControl::Exit {
                    log_debug("session shutdown requested");
                    break;
                }
                session.handle_timers(Instant::now());
            }
        }
    }
    session.shutdown();
    session.stats()
}

/// Collapse any queued results down to the newest one.
pub(super) fn newest_outcome(
    session: &mut Session,
    first: DetectionOutcome,
    results: &Receiver<DetectionOutcome>,
) -> DetectionOutcome {
    let mut newest = first;
    while let Ok(next) = results.try_recv() {
        session.skip_detection(std::mem::replace(&mut newest, next));
    }
    newest
}

/// Apply every input that is already queued, stopping early on shutdown.
pub(super) fn drain_inputs(
    session: &mut Session,
    inputs: &Receiver<SessionInput>,
) -> SessionControl {
    while let Ok(input) = inputs.try_recv() {
        if session.handle_input(input, Instant::now()) == SessionControl::Exit {
            return SessionControl::Exit;
        }
    }
    SessionControl::Continue
}
