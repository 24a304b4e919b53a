//! Connection abstraction layer
//!
//! One call opens one TCP connection and one TLS session; the caller owns it
//! and must close it on every exit path. The traits keep the sender and the
//! feedback reader independent of the TLS stack, so tests can swap in an
//! in-memory connector.

pub mod tls;

pub use tls::{TlsConnector, TlsSession};

use crate::error::PushResult;
use crate::identity::{Credentials, Identity};
use async_trait::async_trait;
use log::warn;
use pushgate_core::Endpoint;

/// Bidirectional encrypted byte stream
#[async_trait]
pub trait EncryptedStream: Send {
    /// Write all bytes and flush them to the peer
    async fn write(&mut self, bytes: &[u8]) -> PushResult<()>;

    /// Fill `buf` from the stream.
    ///
    /// Returns `buf.len()` unless the stream ended first, in which case the
    /// number of bytes read before the end is returned (0 at end-of-stream).
    async fn read_exactly(&mut self, buf: &mut [u8]) -> PushResult<usize>;

    /// End the TLS session and the underlying socket
    async fn close(&mut self) -> PushResult<()>;
}

/// Opens encrypted connections on behalf of an identity
#[async_trait]
pub trait Connector: Send + Sync {
    /// Connect to `endpoint` and complete a TLS handshake presenting `credentials`
    async fn connect(
        &self,
        endpoint: &Endpoint,
        credentials: &Credentials,
    ) -> PushResult<Box<dyn EncryptedStream>>;

    /// Open a connection to the identity's submission endpoint
    async fn open(&self, identity: &Identity) -> PushResult<Box<dyn EncryptedStream>> {
        let credentials = identity.require_credentials()?;
        self.connect(&identity.gateway_endpoint(), credentials).await
    }

    /// Open a connection to the feedback service paired with the identity's host
    async fn open_feedback(&self, identity: &Identity) -> PushResult<Box<dyn EncryptedStream>> {
        let credentials = identity.require_credentials()?;
        self.connect(&identity.feedback_endpoint(), credentials).await
    }
}

/// Close a stream, logging rather than propagating a failed close
pub(crate) async fn close_quietly(stream: &mut dyn EncryptedStream, purpose: &str) {
    if let Err(e) = stream.close().await {
        warn!("Failed to close {} connection: {}", purpose, e);
    }
}
