//! Gateway Configuration
//!
//! Configuration types for building a client from caller-supplied settings
//! (typically JSON the caller loaded itself).

use pushgate_core::{GATEWAY_PORT, SANDBOX_GATEWAY_HOST};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Settings of the reserved default application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultApplicationConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// PEM bundle with certificate and key (none: default stays unconfigured)
    #[serde(default)]
    pub pem: Option<PathBuf>,

    #[serde(default)]
    pub passphrase: Option<String>,
}

fn default_host() -> String {
    SANDBOX_GATEWAY_HOST.to_string()
}

fn default_port() -> u16 {
    GATEWAY_PORT
}

impl Default for DefaultApplicationConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            pem: None,
            passphrase: None,
        }
    }
}

/// A named application to register
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    pub id: String,

    pub pem: PathBuf,

    #[serde(default)]
    pub passphrase: Option<String>,

    /// Use the sandbox gateway instead of production
    #[serde(default)]
    pub sandbox: bool,
}

/// TLS connector settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TlsConfig {
    /// Trust the bundled webpki root set
    #[serde(default = "default_use_webpki_roots")]
    pub use_webpki_roots: bool,

    /// Additional PEM files with trusted root certificates
    #[serde(default)]
    pub extra_root_certificates: Vec<PathBuf>,

    /// Deadline for TCP connect plus TLS handshake (none: wait indefinitely)
    #[serde(default)]
    pub connect_timeout_ms: Option<u64>,

    /// Hostname to socket address overrides
    #[serde(default)]
    pub resolve: HashMap<String, SocketAddr>,
}

fn default_use_webpki_roots() -> bool {
    true
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            use_webpki_roots: default_use_webpki_roots(),
            extra_root_certificates: Vec::new(),
            connect_timeout_ms: None,
            resolve: HashMap::new(),
        }
    }
}

/// Root gateway configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default)]
    pub default_application: DefaultApplicationConfig,

    #[serde(default)]
    pub applications: Vec<ApplicationConfig>,

    #[serde(default)]
    pub tls: TlsConfig,
}

impl GatewayConfig {
    /// Parse configuration from a JSON document
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
