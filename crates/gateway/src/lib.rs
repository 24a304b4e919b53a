//! Pushgate Gateway
//!
//! Client for the legacy binary push gateway. Provides:
//! - Per-application TLS identities (client certificate + RSA key from PEM)
//! - Connection factory (rustls over tokio TCP, behind a `Connector` trait)
//! - Notification sender (binary frames, one write per batch)
//! - Feedback reader (38-byte records until end of stream)
//!
//! ## Architecture
//!
//! ```text
//!   PushClient
//!   ├── IdentityRegistry ── AppId → Identity { host, port, Credentials }
//!   └── Connector ───────── open / open_feedback
//!             │
//!    ┌────────▼────────┐            ┌──────────────────────┐
//!    │ send            │──frames──▶ │ gateway:2195         │
//!    │ feedback        │◀─records── │ feedback:2196        │
//!    └─────────────────┘            └──────────────────────┘
//! ```
//!
//! Every call is one connection: connect, handshake, write or read until the
//! end, close. Nothing is pooled and nothing is retried.

pub mod client;
pub mod config;
pub mod connection;
pub mod error;
pub mod feedback;
pub mod identity;
pub mod sender;


// Re-export commonly used types
pub use client::PushClient;
pub use config::{ApplicationConfig, DefaultApplicationConfig, GatewayConfig, TlsConfig};
pub use connection::{Connector, EncryptedStream, TlsConnector, TlsSession};
pub use error::{ErrorKind, PushError, PushResult};
pub use identity::{AppId, Credentials, Identity, IdentityRegistry};
pub use pushgate_core::{Endpoint, FeedbackRecord, Payload};
