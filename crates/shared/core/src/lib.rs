//! Pushgate Core
//!
//! Pure wire types for the legacy binary push gateway.
//! This crate contains no async, no I/O, and is 100% unit testable.
//!
//! ## Wire formats
//!
//! ```text
//! Submission (per notification):
//! ┌─────────┬────────────────┬──────────────────┐
//! │ command │ length (u32 BE)│ payload          │
//! │ 1 byte  │ 4 bytes        │ `length` bytes   │
//! └─────────┴────────────────┴──────────────────┘
//!
//! Feedback (per record, 38 bytes):
//! ┌──────────────────┬─────────────────┬────────────────┐
//! │ timestamp (u32)  │ token len (u16) │ device token   │
//! │ 4 bytes          │ 2 bytes         │ 32 bytes       │
//! └──────────────────┴─────────────────┴────────────────┘
//! ```

pub mod endpoint;
pub mod error;
pub mod feedback;
pub mod frame;
pub mod payload;

pub use endpoint::{
    Endpoint, FEEDBACK_PORT, GATEWAY_PORT, PRODUCTION_GATEWAY_HOST, SANDBOX_GATEWAY_HOST,
};
pub use error::{WireError, WireResult};
pub use feedback::{DEVICE_TOKEN_LEN, FEEDBACK_RECORD_LEN, FeedbackRecord};
pub use frame::{ENHANCED_NOTIFICATION_COMMAND, FRAME_HEADER_LEN, Frame, decode_frames, encode_frames};
pub use payload::Payload;
