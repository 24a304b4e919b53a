//! Feedback records
//!
//! The feedback service streams fixed 38-byte records and then closes the
//! connection. There is no count, no terminator and no framing beyond the
//! record size itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Size of one feedback record on the wire
pub const FEEDBACK_RECORD_LEN: usize = 38;

/// Size of a device token
pub const DEVICE_TOKEN_LEN: usize = 32;

const TOKEN_OFFSET: usize = FEEDBACK_RECORD_LEN - DEVICE_TOKEN_LEN;

/// A device token the gateway could no longer deliver to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeedbackRecord {
    /// Seconds since the epoch at which the token was marked invalid
    pub timestamp: u32,
    /// Token length announced on the wire (not checked against the token)
    pub token_length: u16,
    /// Device token as 64 lowercase hex characters
    pub token: String,
}

impl FeedbackRecord {
    /// Decode one record.
    ///
    /// The token is always the trailing 32 bytes, whatever `token_length` says.
    pub fn decode(chunk: &[u8; FEEDBACK_RECORD_LEN]) -> Self {
        Self {
            timestamp: u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]),
            token_length: u16::from_be_bytes([chunk[4], chunk[5]]),
            token: hex::encode(&chunk[TOKEN_OFFSET..]),
        }
    }

    /// Whether the announced token length matches the 32 bytes actually read
    pub fn has_expected_token_length(&self) -> bool {
        usize::from(self.token_length) == DEVICE_TOKEN_LEN
    }

    /// When the device token was marked invalid
    pub fn marked_invalid_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(i64::from(self.timestamp), 0).unwrap_or(DateTime::UNIX_EPOCH)
    }
}
