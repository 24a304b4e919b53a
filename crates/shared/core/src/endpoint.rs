use serde::{Deserialize, Serialize};
use std::fmt;

/// Submission gateway used for development builds
pub const SANDBOX_GATEWAY_HOST: &str = "gateway.sandbox.push.apple.com";

/// Submission gateway used for production builds
pub const PRODUCTION_GATEWAY_HOST: &str = "gateway.push.apple.com";

/// Well-known submission port
pub const GATEWAY_PORT: u16 = 2195;

/// Well-known feedback port
pub const FEEDBACK_PORT: u16 = 2196;

/// Host/port pair addressing one gateway service
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Submission endpoint for the sandbox or production environment
    pub fn gateway(sandbox: bool) -> Self {
        let host = if sandbox {
            SANDBOX_GATEWAY_HOST
        } else {
            PRODUCTION_GATEWAY_HOST
        };
        Self::new(host, GATEWAY_PORT)
    }

    /// Feedback endpoint paired with a submission host.
    ///
    /// The feedback host is the gateway host with every `gateway` segment
    /// replaced by `feedback`. The port is always [`FEEDBACK_PORT`].
    pub fn feedback_for(gateway_host: &str) -> Self {
        Self::new(gateway_host.replace("gateway", "feedback"), FEEDBACK_PORT)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}
