//! Wire framing and the command vocabulary.
//!
//! Frame format (both directions, symmetric):
//! ```text
//! +----------------+------------------+
//! | Length (u32 LE)|     Payload      |
//! +----------------+------------------+
//! |    4 bytes     |   Length bytes   |
//! ```
//!
//! No magic number, no checksum, no version field. The client payload is a
//! compressed still image; the server payload is the ASCII bytes of a
//! command token, with no trailing terminator.

use std::io::{self, Read, Write};

use thiserror::Error;

/// Length prefix size in bytes.
pub const LENGTH_PREFIX_BYTES: usize = 4;

const COMMAND_IDLE: &str = "idle";
const COMMAND_MOVE_RED: &str = "movered";

/// The two-valued output vocabulary sent back to the actuator peer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Idle,
    MoveRed,
}

impl Command {
    /// Map a detection signal to a command. Total and pure.
    pub fn from_detection(has_red: bool) -> Self {
        if has_red {
            Command::MoveRed
        } else {
            Command::Idle
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Command::Idle => COMMAND_IDLE,
            Command::MoveRed => COMMAND_MOVE_RED,
        }
    }

    /// Wire bytes of the token, without terminator.
    pub fn as_bytes(self) -> &'static [u8] {
        self.as_str().as_bytes()
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by the framing layer.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The peer closed the stream inside a message. Distinct from a clean
    /// close between messages, which is not an error.
    #[error("truncated message: expected {expected} bytes, got {got}")]
    Truncated { expected: usize, got: usize },

    #[error("stream i/o failed: {0}")]
    Io(#[from] io::Error),
}

/// Read one length-prefixed message.
///
/// Returns `Ok(None)` when the stream reaches EOF before any byte of a new
/// message arrives (clean end of session). EOF after a partial prefix or
/// mid-payload yields [`ProtocolError::Truncated`].
///
/// No upper bound is enforced on the declared length; an oversized length
/// from a slow peer blocks the read. Known limitation of the protocol.
pub fn read_message<R: Read>(reader: &mut R) -> Result<Option<Vec<u8>>, ProtocolError> {
    let mut prefix = [0u8; LENGTH_PREFIX_BYTES];
    let got = read_until_eof(reader, &mut prefix)?;
    if got == 0 {
        return Ok(None);
    }
    if got < LENGTH_PREFIX_BYTES {
        return Err(ProtocolError::Truncated {
            expected: LENGTH_PREFIX_BYTES,
            got,
        });
    }

    let length = u32::from_le_bytes(prefix) as usize;
    let mut payload = vec![0u8; length];
    let got = read_until_eof(reader, &mut payload)?;
    if got < length {
        return Err(ProtocolError::Truncated {
            expected: length,
            got,
        });
    }
    Ok(Some(payload))
}

/// Write one length-prefixed message as a single logical buffer.
///
/// `write_all` retries partial writes until the full buffer is transmitted
/// or the stream reports an unrecoverable error.
pub fn write_message<W: Write>(writer: &mut W, payload: &[u8]) -> Result<(), ProtocolError> {
    let mut buf = Vec::with_capacity(LENGTH_PREFIX_BYTES + payload.len());
    buf.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    buf.extend_from_slice(payload);
    writer.write_all(&buf)?;
    writer.flush()?;
    Ok(())
}

/// Fill `buf`, stopping early only at EOF. Returns the bytes actually read.
fn read_until_eof<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize, ProtocolError> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err.into()),
        }
    }
    Ok(filled)
}
