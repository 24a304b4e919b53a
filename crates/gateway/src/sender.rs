//! Notification sender
//!
//! resolve identity → encode frames → open connection → one write → close.
//! Frames are encoded in memory before connecting, so a batch either goes
//! out as a single write or the call fails without sending anything.

use crate::connection::{Connector, close_quietly};
use crate::error::PushResult;
use crate::identity::{AppId, IdentityRegistry};
use log::{debug, info};
use pushgate_core::{Payload, encode_frames};

/// Send a batch of notifications for one application over one connection
pub async fn send_notifications<P>(
    registry: &IdentityRegistry,
    connector: &dyn Connector,
    app: &AppId,
    payloads: &[P],
) -> PushResult<()>
where
    P: Payload + Sync,
{
    let identity = registry.resolve(app)?;
    let frames = encode_frames(payloads)?;
    debug!(
        "Encoded {} notification(s) for {} ({} bytes)",
        payloads.len(),
        app,
        frames.len()
    );

    let mut stream = connector.open(identity).await?;
    let written = stream.write(&frames).await;
    close_quietly(stream.as_mut(), "gateway").await;
    written?;

    info!(
        "Sent {} notification(s) for {} to {}",
        payloads.len(),
        app,
        identity.gateway_endpoint()
    );
    Ok(())
}

/// Send a single notification
pub async fn send_notification<P>(
    registry: &IdentityRegistry,
    connector: &dyn Connector,
    app: &AppId,
    payload: &P,
) -> PushResult<()>
where
    P: Payload + Sync,
{
    send_notifications(registry, connector, app, std::slice::from_ref(payload)).await
}
