//! Per-connection session loop.
//!
//! Drives one connection through the cycle: read frame, decode, detect,
//! visualize, respond. Strict request/response order: exactly one command
//! is written per successfully decoded frame, and nothing is ever sent
//! unprompted. The loop ends on a clean peer close (success) or on the
//! first transport or decode failure (a single bad frame ends the
//! connection rather than being skipped).

use std::io::{Read, Write};

use thiserror::Error;

use crate::codec::{decode_frame, DecodeError};
use crate::detect::RedDetector;
use crate::protocol::{read_message, write_message, Command, ProtocolError};
use crate::viz::Visualizer;

/// Terminal failure of one session. Fatal to the connection only; the
/// listener logs it and keeps serving.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("transport failed: {0}")]
    Transport(#[from] ProtocolError),

    #[error("frame rejected: {0}")]
    Decode(#[from] DecodeError),
}

/// Serve one connection until the peer closes it.
///
/// Returns the number of frames answered. Visualization failures are
/// logged and never abort the session.
pub fn run_session<S: Read + Write>(
    stream: &mut S,
    detector: &RedDetector,
    viz: &mut dyn Visualizer,
) -> Result<u64, SessionError> {
    let mut frames = 0u64;
    loop {
        let payload = match read_message(stream)? {
            Some(payload) => payload,
            None => return Ok(frames),
        };

        let frame = decode_frame(&payload)?;
        let detection = detector.detect(&frame);
        let command = Command::from_detection(detection.has_red);
        log::debug!(
            "frame {}: {}x{}, red_ratio={:.4} -> {}",
            frames,
            frame.width(),
            frame.height(),
            detection.red_ratio,
            command
        );

        if let Err(err) = viz.render(&frame, &detection.mask, command) {
            log::warn!("visualization failed, session continues: {:#}", err);
        }

        write_message(stream, command.as_bytes())?;
        frames += 1;
    }
}
