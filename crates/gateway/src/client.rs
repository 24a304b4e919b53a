//! Push client
//!
//! Owns the identity registry and a connector. Configuration methods take
//! `&mut self`; sending and feedback take `&self`, so a configured client
//! can be shared (e.g. behind an `Arc`) by concurrent tasks.

use crate::config::GatewayConfig;
use crate::connection::{Connector, TlsConnector};
use crate::error::PushResult;
use crate::feedback::read_feedback;
use crate::identity::{AppId, IdentityRegistry};
use crate::sender::send_notifications;
use pushgate_core::{FeedbackRecord, Payload};
use std::path::{Path, PathBuf};

/// Client for the binary push gateway and its feedback service
#[derive(Debug)]
pub struct PushClient<C = TlsConnector> {
    registry: IdentityRegistry,
    connector: C,
}

impl PushClient<TlsConnector> {
    /// Client trusting the webpki roots, with an unconfigured default application
    pub fn new() -> Self {
        Self::with_connector(TlsConnector::new())
    }

    /// Build a client from configuration.
    ///
    /// Unlike the interactive default-certificate setters, a PEM configured
    /// here that fails to load is reported as an error.
    pub fn from_config(config: &GatewayConfig) -> PushResult<Self> {
        let mut client = Self::with_connector(TlsConnector::from_config(&config.tls)?);

        let default = &config.default_application;
        client.set_default_host(default.host.clone());
        client.set_default_port(default.port);
        if let Some(pem) = &default.pem {
            client
                .registry
                .try_set_default_certificate(pem.clone(), default.passphrase.clone())?;
        }

        for app in &config.applications {
            client.register(
                app.id.clone(),
                &app.pem,
                app.passphrase.as_deref(),
                app.sandbox,
            )?;
        }

        Ok(client)
    }
}

impl Default for PushClient<TlsConnector> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Connector> PushClient<C> {
    pub fn with_connector(connector: C) -> Self {
        Self {
            registry: IdentityRegistry::new(),
            connector,
        }
    }

    pub fn registry(&self) -> &IdentityRegistry {
        &self.registry
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Register a named application bound to its own certificate and gateway
    pub fn register(
        &mut self,
        name: impl Into<String>,
        pem_path: impl AsRef<Path>,
        passphrase: Option<&str>,
        sandbox: bool,
    ) -> PushResult<()> {
        self.registry.register(name, pem_path, passphrase, sandbox)
    }

    pub fn has_application(&self, app: impl Into<AppId>) -> bool {
        self.registry.contains(&app.into())
    }

    /// See [`IdentityRegistry::set_default_pem`]
    pub fn set_default_pem(&mut self, pem_path: impl Into<PathBuf>) {
        self.registry.set_default_pem(pem_path);
    }

    /// See [`IdentityRegistry::set_default_passphrase`]
    pub fn set_default_passphrase(&mut self, passphrase: Option<String>) {
        self.registry.set_default_passphrase(passphrase);
    }

    /// See [`IdentityRegistry::set_default_certificate`]
    pub fn set_default_certificate(
        &mut self,
        pem_path: impl Into<PathBuf>,
        passphrase: Option<String>,
    ) {
        self.registry.set_default_certificate(pem_path, passphrase);
    }

    /// See [`IdentityRegistry::try_set_default_certificate`]
    pub fn try_set_default_certificate(
        &mut self,
        pem_path: impl Into<PathBuf>,
        passphrase: Option<String>,
    ) -> PushResult<()> {
        self.registry.try_set_default_certificate(pem_path, passphrase)
    }

    pub fn set_default_host(&mut self, host: impl Into<String>) {
        self.registry.set_default_host(host);
    }

    pub fn set_default_port(&mut self, port: u16) {
        self.registry.set_default_port(port);
    }

    /// Send a batch of notifications as concatenated frames in one write
    pub async fn send<P>(&self, app: impl Into<AppId>, payloads: &[P]) -> PushResult<()>
    where
        P: Payload + Sync,
    {
        send_notifications(&self.registry, &self.connector, &app.into(), payloads).await
    }

    /// Send one notification
    pub async fn send_one<P>(&self, app: impl Into<AppId>, payload: &P) -> PushResult<()>
    where
        P: Payload + Sync,
    {
        self.send(app, std::slice::from_ref(payload)).await
    }

    /// Drain the feedback service for an application
    pub async fn feedback(&self, app: impl Into<AppId>) -> PushResult<Vec<FeedbackRecord>> {
        read_feedback(&self.registry, &self.connector, &app.into()).await
    }
}
