use thiserror::Error;

/// Errors raised while encoding or decoding wire bytes
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WireError {
    #[error("Payload of {0} bytes does not fit a 32-bit length prefix")]
    PayloadTooLarge(usize),

    #[error("Truncated frame: need {needed} bytes, {available} available")]
    Truncated { needed: usize, available: usize },

    #[error("Unknown frame command: {0}")]
    UnknownCommand(u8),
}

pub type WireResult<T> = std::result::Result<T, WireError>;
