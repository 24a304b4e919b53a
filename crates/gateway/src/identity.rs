//! Per-application TLS identities
//!
//! Every application is bound to one client certificate/key pair and one
//! submission endpoint. The reserved default application always exists;
//! named applications are added by registration and never removed.

use crate::error::{PushError, PushResult};
use log::{debug, warn};
use openssl::pkey::{Id, PKey, Private};
use openssl::x509::X509;
use pushgate_core::Endpoint;
use rustls::pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Application identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AppId {
    /// The reserved default application
    Default,
    Named(String),
}

impl From<&str> for AppId {
    fn from(name: &str) -> Self {
        AppId::Named(name.to_string())
    }
}

impl From<String> for AppId {
    fn from(name: String) -> Self {
        AppId::Named(name)
    }
}

impl From<&AppId> for AppId {
    fn from(id: &AppId) -> Self {
        id.clone()
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppId::Default => f.write_str("default"),
            AppId::Named(name) => f.write_str(name),
        }
    }
}

/// Client certificate and RSA private key parsed from one PEM bundle.
///
/// Both halves are parsed together, so a `Credentials` value always holds a
/// matching pair. The key is kept as unencrypted PKCS#8 DER for rustls.
#[derive(Clone)]
pub struct Credentials {
    certificate: CertificateDer<'static>,
    private_key: Vec<u8>,
    subject: String,
}

impl Credentials {
    /// Read and parse a PEM file holding the certificate and its key
    pub fn from_pem_file(pem_path: Option<&Path>, passphrase: Option<&str>) -> PushResult<Self> {
        let path = match pem_path {
            Some(path) if !path.as_os_str().is_empty() => path,
            _ => {
                return Err(PushError::Configuration(
                    "the path to the pem file is not set".to_string(),
                ));
            }
        };
        if !path.exists() {
            return Err(PushError::Configuration(format!(
                "the pem file does not exist: {}",
                path.display()
            )));
        }

        let pem = std::fs::read(path).map_err(|e| {
            PushError::Configuration(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_pem(&pem, passphrase)
    }

    /// Parse a PEM bundle holding the certificate and its key.
    ///
    /// The key may be unencrypted or encrypted with `passphrase`, either in
    /// the traditional `Proc-Type: 4,ENCRYPTED` form or as PKCS#8.
    pub fn from_pem(pem: &[u8], passphrase: Option<&str>) -> PushResult<Self> {
        let certificate = X509::from_pem(pem)
            .map_err(|e| PushError::Crypto(format!("invalid certificate: {}", e)))?;
        let private_key = Self::parse_private_key(pem, passphrase)?;

        if private_key.id() != Id::RSA {
            return Err(PushError::Crypto("private key is not an RSA key".to_string()));
        }
        if !certificate.public_key()?.public_eq(&private_key) {
            return Err(PushError::Crypto(
                "private key does not match the certificate".to_string(),
            ));
        }

        let subject = certificate
            .subject_name()
            .entries()
            .map(|entry| entry.data().to_string())
            .collect::<Result<Vec<_>, _>>()?
            .join(", ");

        Ok(Self {
            certificate: CertificateDer::from(certificate.to_der()?),
            private_key: private_key.private_key_to_pkcs8()?,
            subject,
        })
    }

    fn parse_private_key(pem: &[u8], passphrase: Option<&str>) -> PushResult<PKey<Private>> {
        // An empty passphrase makes an encrypted key fail instead of prompting on a tty
        PKey::private_key_from_pem_passphrase(pem, passphrase.unwrap_or_default().as_bytes())
            .map_err(|e| PushError::Crypto(format!("cannot decrypt private key: {}", e)))
    }

    pub fn certificate(&self) -> CertificateDer<'static> {
        self.certificate.clone()
    }

    pub fn private_key(&self) -> PrivateKeyDer<'static> {
        PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(self.private_key.clone()))
    }

    /// Certificate subject, for logging
    pub fn subject(&self) -> &str {
        &self.subject
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("subject", &self.subject)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// Endpoint and credentials of one application
#[derive(Debug, Clone)]
pub struct Identity {
    host: String,
    port: u16,
    credentials: Option<Credentials>,
}

impl Identity {
    /// Identity without credentials, addressing the sandbox or production gateway
    pub fn new(sandbox: bool) -> Self {
        let Endpoint { host, port } = Endpoint::gateway(sandbox);
        Self {
            host,
            port,
            credentials: None,
        }
    }

    fn with_credentials(sandbox: bool, credentials: Credentials) -> Self {
        Self {
            credentials: Some(credentials),
            ..Self::new(sandbox)
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    /// Credentials, or a configuration error if none were loaded yet
    pub fn require_credentials(&self) -> PushResult<&Credentials> {
        self.credentials.as_ref().ok_or_else(|| {
            PushError::Configuration(format!(
                "no certificate configured for {}:{}",
                self.host, self.port
            ))
        })
    }

    /// Submission endpoint
    pub fn gateway_endpoint(&self) -> Endpoint {
        Endpoint::new(self.host.clone(), self.port)
    }

    /// Feedback endpoint, derived from the submission host
    pub fn feedback_endpoint(&self) -> Endpoint {
        Endpoint::feedback_for(&self.host)
    }
}

/// Registry of application identities.
///
/// Mutators take `&mut self`, so configuration must finish before the
/// registry is shared with concurrent senders.
#[derive(Clone)]
pub struct IdentityRegistry {
    identities: HashMap<AppId, Identity>,
    default_pem: Option<PathBuf>,
    default_passphrase: Option<String>,
}

impl IdentityRegistry {
    /// Registry holding only the default application, on the sandbox gateway
    /// and without a certificate
    pub fn new() -> Self {
        let mut identities = HashMap::new();
        identities.insert(AppId::Default, Identity::new(true));
        Self {
            identities,
            default_pem: None,
            default_passphrase: None,
        }
    }

    /// Register a named application.
    ///
    /// Fails with `Configuration` if the PEM path is empty or missing, or if
    /// the name is already registered, and with `Crypto` if the certificate
    /// or key cannot be parsed.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        pem_path: impl AsRef<Path>,
        passphrase: Option<&str>,
        sandbox: bool,
    ) -> PushResult<()> {
        let id = AppId::Named(name.into());
        if self.identities.contains_key(&id) {
            return Err(PushError::Configuration(format!(
                "application already registered: {}",
                id
            )));
        }

        let credentials = Credentials::from_pem_file(Some(pem_path.as_ref()), passphrase)?;
        debug!(
            "Registered application {} ({}) on {}",
            id,
            credentials.subject(),
            Endpoint::gateway(sandbox)
        );
        self.identities
            .insert(id, Identity::with_credentials(sandbox, credentials));
        Ok(())
    }

    /// Set the default PEM path and try to reload the default certificate.
    ///
    /// Load failures are logged and the previous certificate/key stay in use.
    pub fn set_default_pem(&mut self, pem_path: impl Into<PathBuf>) {
        self.default_pem = Some(pem_path.into());
        self.reload_default_quietly();
    }

    /// Set the default passphrase and try to reload the default certificate.
    ///
    /// Load failures are logged and the previous certificate/key stay in use.
    pub fn set_default_passphrase(&mut self, passphrase: Option<String>) {
        self.default_passphrase = passphrase;
        self.reload_default_quietly();
    }

    /// Set both the default PEM path and passphrase, then reload.
    ///
    /// Load failures are logged and the previous certificate/key stay in use.
    pub fn set_default_certificate(
        &mut self,
        pem_path: impl Into<PathBuf>,
        passphrase: Option<String>,
    ) {
        self.default_pem = Some(pem_path.into());
        self.default_passphrase = passphrase;
        self.reload_default_quietly();
    }

    /// Like [`set_default_certificate`](Self::set_default_certificate), but
    /// returns the load failure. The previous certificate/key stay in use on
    /// failure.
    pub fn try_set_default_certificate(
        &mut self,
        pem_path: impl Into<PathBuf>,
        passphrase: Option<String>,
    ) -> PushResult<()> {
        self.default_pem = Some(pem_path.into());
        self.default_passphrase = passphrase;
        self.reload_default()
    }

    pub fn set_default_host(&mut self, host: impl Into<String>) {
        self.default_identity_mut().host = host.into();
    }

    pub fn set_default_port(&mut self, port: u16) {
        self.default_identity_mut().port = port;
    }

    /// Look up the identity of an application
    pub fn resolve(&self, id: &AppId) -> PushResult<&Identity> {
        self.identities
            .get(id)
            .ok_or_else(|| PushError::UnknownApplication(id.to_string()))
    }

    pub fn contains(&self, id: &AppId) -> bool {
        self.identities.contains_key(id)
    }

    /// Number of applications, the default one included (never zero)
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.identities.len()
    }

    fn reload_default(&mut self) -> PushResult<()> {
        let credentials = Credentials::from_pem_file(
            self.default_pem.as_deref(),
            self.default_passphrase.as_deref(),
        )?;
        debug!("Loaded default certificate ({})", credentials.subject());
        self.default_identity_mut().credentials = Some(credentials);
        Ok(())
    }

    fn reload_default_quietly(&mut self) {
        if let Err(e) = self.reload_default() {
            warn!("Default certificate not updated: {}", e);
        }
    }

    fn default_identity_mut(&mut self) -> &mut Identity {
        self.identities
            .entry(AppId::Default)
            .or_insert_with(|| Identity::new(true))
    }
}

impl fmt::Debug for IdentityRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityRegistry")
            .field("identities", &self.identities)
            .field("default_pem", &self.default_pem)
            .finish_non_exhaustive()
    }
}

impl Default for IdentityRegistry {
    fn default() -> Self {
        Self::new()
    }
}
