//! Async stream line readers (non-UTF8-safe).
//!
//! External tools can emit non-UTF8 bytes on stdout/stderr, and
//! `BufReader::lines()` stops on invalid UTF-8. Lines are read as bytes and
//! decoded lossily instead.
//!
//! Both readers feed one channel. A single forwarder stamps sequence
//! numbers, so numbering follows the order lines were received.

use sbarc_core::{OutputEvent, StreamChannel};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

pub(crate) type RawLine = (StreamChannel, String);

pub(crate) fn spawn_stream_reader(
    stream: impl AsyncRead + Unpin + Send + 'static,
    channel: StreamChannel,
    lines: mpsc::UnboundedSender<RawLine>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut reader = BufReader::new(stream);
        let mut buf: Vec<u8> = Vec::with_capacity(1024);

        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break, // EOF
                Ok(_) => {
                    if buf.last() == Some(&b'\n') {
                        buf.pop();
                        if buf.last() == Some(&b'\r') {
                            buf.pop();
                        }
                    }

                    let line = String::from_utf8_lossy(&buf).into_owned();
                    if lines.send((channel, line)).is_err() {
                        // Forwarder is gone; nobody is listening anymore.
                        break;
                    }
                }
                Err(e) => {
                    debug!(stream = channel.as_str(), error = %e, "stream reader exiting due to read error");
                    break;
                }
            }
        }

        debug!(stream = channel.as_str(), "stream reader task exiting");
    })
}

/// Stamp raw lines with sequence numbers and forward them as events.
///
/// `next` holds the next sequence number to assign. It is bumped before
/// each send, so after the task ends (or is aborted) it is the sequence
/// the terminal event should take.
pub(crate) fn spawn_forwarder(
    mut lines: mpsc::UnboundedReceiver<RawLine>,
    events: mpsc::UnboundedSender<OutputEvent>,
    next: Arc<AtomicU64>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some((channel, text)) = lines.recv().await {
            let sequence = next.fetch_add(1, Ordering::SeqCst);
            if events.send(OutputEvent::line(sequence, channel, text)).is_err() {
                break;
            }
        }
    })
}
