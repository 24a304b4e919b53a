//! Feedback reader
//!
//! Drains the feedback service: fixed 38-byte records until the service
//! closes the stream. A short trailing chunk ends the drain without error.

use crate::connection::{Connector, EncryptedStream, close_quietly};
use crate::error::PushResult;
use crate::identity::{AppId, IdentityRegistry};
use log::{debug, info, warn};
use pushgate_core::{DEVICE_TOKEN_LEN, FEEDBACK_RECORD_LEN, FeedbackRecord};

/// Read every feedback record the service has for one application
pub async fn read_feedback(
    registry: &IdentityRegistry,
    connector: &dyn Connector,
    app: &AppId,
) -> PushResult<Vec<FeedbackRecord>> {
    let identity = registry.resolve(app)?;
    let mut stream = connector.open_feedback(identity).await?;
    let drained = drain_records(stream.as_mut()).await;
    close_quietly(stream.as_mut(), "feedback").await;
    let records = drained?;

    info!(
        "Read {} feedback record(s) for {} from {}",
        records.len(),
        app,
        identity.feedback_endpoint()
    );
    Ok(records)
}

async fn drain_records(stream: &mut dyn EncryptedStream) -> PushResult<Vec<FeedbackRecord>> {
    let mut records = Vec::new();
    let mut chunk = [0u8; FEEDBACK_RECORD_LEN];

    loop {
        let read = stream.read_exactly(&mut chunk).await?;
        if read < FEEDBACK_RECORD_LEN {
            if read > 0 {
                warn!("Discarding {} trailing feedback byte(s)", read);
            }
            break;
        }

        let record = FeedbackRecord::decode(&chunk);
        if !record.has_expected_token_length() {
            warn!(
                "Feedback record announces a {}-byte token, reading {} bytes",
                record.token_length, DEVICE_TOKEN_LEN
            );
        }
        debug!("Feedback: {} invalid since {}", record.token, record.timestamp);
        records.push(record);
    }

    Ok(records)
}
