use crossbeam_channel::{Receiver, RecvTimeoutError};
use std::io::Write;
use std::thread;
use std::time::Duration;

use super::protocol::IpcEvent;
use crate::log_debug;

const WRITER_RECV_TIMEOUT_MS: u64 = 50;

#[derive(Debug, Clone)]
pub(crate) enum WriterMessage {
    Event(IpcEvent),
    /// Everything queued before this has been written; stop.
    Shutdown,
}

/// Serialize events onto `out`, one JSON object per line, in the order received.
pub(crate) fn spawn_writer_thread<W>(
    mut out: W,
    rx: Receiver<WriterMessage>,
) -> thread::JoinHandle<()>
where
    W: Write + Send + 'static,
{
    thread::spawn(move || {
        let mut written: u64 = 0;
        let mut dirty = false;
        loop {
            match rx.recv_timeout(Duration::from_millis(WRITER_RECV_TIMEOUT_MS)) {
                Ok(WriterMessage::Event(event)) => match serde_json::to_string(&event) {
                    Ok(json) => {
                        if writeln!(out, "{json}").is_err() {
                            log_debug("host output closed; writer exiting");
                            break;
                        }
                        written += 1;
                        dirty = true;
                        // Drained the backlog: make the batch visible to the host.
                        if rx.is_empty() {
                            let _ = out.flush();
                            dirty = false;
                        }
                    }
                    Err(err) => log_debug(&format!("failed to encode event: {err}")),
                },
                Ok(WriterMessage::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) => {
                    if dirty {
                        let _ = out.flush();
                        dirty = false;
                    }
                }
            }
        }
        let _ = out.flush();
        log_debug(&format!("event writer exiting after {written} events"));
    })
}
