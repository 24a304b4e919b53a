//! Submission frames
//!
//! Every notification travels as `[command][u32 BE length][payload]`.
//! Frames carry their own length so a batch is just frames written back to
//! back, with no separator and no trailer.

use crate::error::{WireError, WireResult};
use crate::payload::Payload;

/// Command byte of the legacy "enhanced notification" frame
pub const ENHANCED_NOTIFICATION_COMMAND: u8 = 2;

/// Command byte + 4-byte length prefix
pub const FRAME_HEADER_LEN: usize = 5;

/// One decoded submission frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub command: u8,
    pub payload: Vec<u8>,
}

impl Frame {
    /// Frame a payload with the enhanced notification command
    pub fn notification(payload: impl Into<Vec<u8>>) -> Self {
        Self {
            command: ENHANCED_NOTIFICATION_COMMAND,
            payload: payload.into(),
        }
    }

    /// Size of this frame on the wire
    pub fn encoded_len(&self) -> usize {
        FRAME_HEADER_LEN + self.payload.len()
    }
}

/// Encode payloads, in order, into one contiguous buffer of frames.
///
/// An empty input yields an empty buffer. Encoding `[a, b]` yields exactly
/// the encoding of `[a]` followed by the encoding of `[b]`.
pub fn encode_frames<P: Payload>(payloads: &[P]) -> WireResult<Vec<u8>> {
    let packaged: Vec<_> = payloads.iter().map(Payload::packaged).collect();
    let total: usize = packaged
        .iter()
        .map(|bytes| FRAME_HEADER_LEN + bytes.len())
        .sum();

    let mut buf = Vec::with_capacity(total);
    for bytes in &packaged {
        let length =
            u32::try_from(bytes.len()).map_err(|_| WireError::PayloadTooLarge(bytes.len()))?;
        buf.push(ENHANCED_NOTIFICATION_COMMAND);
        buf.extend_from_slice(&length.to_be_bytes());
        buf.extend_from_slice(bytes);
    }
    Ok(buf)
}

/// Split a buffer of concatenated frames back into frames.
///
/// Any command other than [`ENHANCED_NOTIFICATION_COMMAND`] is rejected, as
/// is a header or payload cut short by the end of the buffer.
pub fn decode_frames(mut bytes: &[u8]) -> WireResult<Vec<Frame>> {
    let mut frames = Vec::new();

    while !bytes.is_empty() {
        if bytes.len() < FRAME_HEADER_LEN {
            return Err(WireError::Truncated {
                needed: FRAME_HEADER_LEN,
                available: bytes.len(),
            });
        }

        let command = bytes[0];
        if command != ENHANCED_NOTIFICATION_COMMAND {
            return Err(WireError::UnknownCommand(command));
        }

        let length = u32::from_be_bytes([bytes[1], bytes[2], bytes[3], bytes[4]]) as usize;
        let body = &bytes[FRAME_HEADER_LEN..];
        if body.len() < length {
            return Err(WireError::Truncated {
                needed: length,
                available: body.len(),
            });
        }

        frames.push(Frame {
            command,
            payload: body[..length].to_vec(),
        });
        bytes = &body[length..];
    }

    Ok(frames)
}
