//! rustls-backed connector
//!
//! Server certificates are checked against the webpki root set plus any
//! configured extra roots. The identity's certificate/key is offered as
//! TLS client authentication. Sessions are TLS 1.2, which is what the
//! gateway speaks.

use crate::config::TlsConfig;
use crate::connection::{Connector, EncryptedStream};
use crate::error::{PushError, PushResult};
use crate::identity::Credentials;
use async_trait::async_trait;
use log::debug;
use openssl::x509::X509;
use pushgate_core::Endpoint;
use rustls::RootCertStore;
use rustls::crypto::CryptoProvider;
use rustls::pki_types::{CertificateDer, ServerName};
use std::collections::HashMap;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream;

/// Connector opening one TCP connection and TLS session per call
#[derive(Debug, Clone)]
pub struct TlsConnector {
    provider: Arc<CryptoProvider>,
    roots: Arc<RootCertStore>,
    connect_timeout: Option<Duration>,
    resolve: HashMap<String, SocketAddr>,
}

impl TlsConnector {
    /// Connector trusting the webpki roots, without deadline or overrides
    pub fn new() -> Self {
        let mut roots = RootCertStore::empty();
        roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
        Self::with_roots(roots)
    }

    fn with_roots(roots: RootCertStore) -> Self {
        Self {
            provider: Arc::new(rustls::crypto::ring::default_provider()),
            roots: Arc::new(roots),
            connect_timeout: None,
            resolve: HashMap::new(),
        }
    }

    /// Build a connector from configuration, reading extra root PEM files
    pub fn from_config(config: &TlsConfig) -> PushResult<Self> {
        let mut connector = if config.use_webpki_roots {
            Self::new()
        } else {
            Self::with_roots(RootCertStore::empty())
        };

        for path in &config.extra_root_certificates {
            let pem = std::fs::read(path).map_err(|e| {
                PushError::Configuration(format!("cannot read {}: {}", path.display(), e))
            })?;
            for certificate in X509::stack_from_pem(&pem)? {
                connector.add_root_certificate(CertificateDer::from(certificate.to_der()?))?;
            }
        }

        connector.connect_timeout = config.connect_timeout_ms.map(Duration::from_millis);
        connector.resolve = config.resolve.clone();
        Ok(connector)
    }

    /// Trust an additional root certificate
    pub fn add_root_certificate(&mut self, certificate: CertificateDer<'static>) -> PushResult<()> {
        Arc::make_mut(&mut self.roots)
            .add(certificate)
            .map_err(|e| PushError::Tls(format!("invalid root certificate: {}", e)))
    }

    /// Bound TCP connect plus TLS handshake
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Pin `host` to a socket address.
    ///
    /// The connection goes to `addr` (its port included) while SNI and
    /// certificate verification still use `host`.
    pub fn with_resolved_address(mut self, host: impl Into<String>, addr: SocketAddr) -> Self {
        self.resolve.insert(host.into(), addr);
        self
    }

    // TLS 1.2 only: under 1.3 the client handshake completes before the server
    // checks the client certificate, so a rejection would surface after the write.
    fn client_config(&self, credentials: &Credentials) -> PushResult<rustls::ClientConfig> {
        rustls::ClientConfig::builder_with_provider(self.provider.clone())
            .with_protocol_versions(&[&rustls::version::TLS12])
            .map_err(|e| PushError::Tls(e.to_string()))?
            .with_root_certificates(self.roots.clone())
            .with_client_auth_cert(vec![credentials.certificate()], credentials.private_key())
            .map_err(|e| PushError::Tls(format!("client certificate rejected: {}", e)))
    }

    async fn handshake(
        &self,
        endpoint: &Endpoint,
        credentials: &Credentials,
    ) -> PushResult<TlsSession> {
        let server_name = ServerName::try_from(endpoint.host.clone())
            .map_err(|e| PushError::Tls(format!("invalid server name {}: {}", endpoint.host, e)))?;
        let config = self.client_config(credentials)?;

        let tcp = match self.resolve.get(&endpoint.host) {
            Some(addr) => TcpStream::connect(*addr).await,
            None => TcpStream::connect((endpoint.host.as_str(), endpoint.port)).await,
        }
        .map_err(|e| PushError::Network(format!("connect to {} failed: {}", endpoint, e)))?;
        tcp.set_nodelay(true)
            .map_err(|e| PushError::Network(e.to_string()))?;
        debug!("Connected to {}, starting TLS handshake", endpoint);

        let stream = tokio_rustls::TlsConnector::from(Arc::new(config))
            .connect(server_name, tcp)
            .await
            .map_err(|e| PushError::Tls(format!("handshake with {} failed: {}", endpoint, e)))?;
        debug!("TLS session established with {}", endpoint);

        Ok(TlsSession {
            stream,
            peer: endpoint.to_string(),
        })
    }
}

impl Default for TlsConnector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Connector for TlsConnector {
    async fn connect(
        &self,
        endpoint: &Endpoint,
        credentials: &Credentials,
    ) -> PushResult<Box<dyn EncryptedStream>> {
        let session = match self.connect_timeout {
            Some(timeout) => tokio::time::timeout(timeout, self.handshake(endpoint, credentials))
                .await
                .map_err(|_| {
                    PushError::Network(format!("connect to {} timed out after {:?}", endpoint, timeout))
                })??,
            None => self.handshake(endpoint, credentials).await?,
        };
        Ok(Box::new(session))
    }
}

/// An established TLS session over TCP
pub struct TlsSession {
    stream: TlsStream<TcpStream>,
    peer: String,
}

impl TlsSession {
    fn network_error(&self, op: &str, e: io::Error) -> PushError {
        PushError::Network(format!("{} {} failed: {}", op, self.peer, e))
    }
}

#[async_trait]
impl EncryptedStream for TlsSession {
    async fn write(&mut self, bytes: &[u8]) -> PushResult<()> {
        if let Err(e) = self.stream.write_all(bytes).await {
            return Err(self.network_error("write to", e));
        }
        if let Err(e) = self.stream.flush().await {
            return Err(self.network_error("flush to", e));
        }
        Ok(())
    }

    async fn read_exactly(&mut self, buf: &mut [u8]) -> PushResult<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.stream.read(&mut buf[filled..]).await {
                Ok(0) => break,
                Ok(n) => filled += n,
                // Peer closed the socket without close_notify
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
                Err(e) => return Err(self.network_error("read from", e)),
            }
        }
        Ok(filled)
    }

    async fn close(&mut self) -> PushResult<()> {
        if let Err(e) = self.stream.shutdown().await {
            return Err(self.network_error("close", e));
        }
        Ok(())
    }
}
