//! Sending `m.room.message` events with client-chosen transaction IDs.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use serde::Serialize;
use tracing::info;

use crate::error::{FixtureError, FixtureResult};
use crate::session::{rejection_body, HomeserverClient, Session};
use crate::wire::MessageContent;

const TEXT_TXN_PREFIX: &str = "msg";
const LOCATION_TXN_PREFIX: &str = "loc";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MessageType {
    #[serde(rename = "m.text")]
    Text,
    #[serde(rename = "m.location")]
    Location,
}

/// A message as it is put on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub room_id: String,
    pub txn_id: String,
    pub msg_type: MessageType,
    pub body: String,
    pub geo_uri: Option<String>,
}

impl OutboundMessage {
    pub fn text(
        room_id: impl Into<String>,
        txn_id: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            room_id: room_id.into(),
            txn_id: txn_id.into(),
            msg_type: MessageType::Text,
            body: body.into(),
            geo_uri: None,
        }
    }

    /// Location message. Coordinates are copied verbatim, the server is the
    /// only one validating them.
    pub fn location(
        room_id: impl Into<String>,
        txn_id: impl Into<String>,
        lat: &str,
        lon: &str,
    ) -> Self {
        Self {
            room_id: room_id.into(),
            txn_id: txn_id.into(),
            msg_type: MessageType::Location,
            body: format!("Location: {lat}, {lon}"),
            geo_uri: Some(format!("geo:{lat},{lon}")),
        }
    }

    pub(crate) fn content(&self) -> MessageContent<'_> {
        MessageContent {
            msgtype: self.msg_type,
            body: &self.body,
            geo_uri: self.geo_uri.as_deref(),
        }
    }
}

/// Hands out transaction IDs of the form `{prefix}{unix_millis}.{sequence}`.
///
/// The sequence keeps IDs distinct when several sends share a millisecond.
#[derive(Debug, Default)]
pub struct TxnIdGenerator {
    sequence: AtomicU64,
}

impl TxnIdGenerator {
    pub fn next(&self, prefix: &str) -> String {
        self.next_at(prefix, Utc::now().timestamp_millis())
    }

    pub fn next_at(&self, prefix: &str, unix_millis: i64) -> String {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        format!("{prefix}{unix_millis}.{sequence}")
    }
}

impl HomeserverClient {
    pub async fn send_message(
        &self,
        session: &Session,
        room_id: &str,
        body: &str,
    ) -> FixtureResult<OutboundMessage> {
        let message = OutboundMessage::text(room_id, self.txn_ids.next(TEXT_TXN_PREFIX), body);
        self.send(session, message).await
    }

    pub async fn send_location(
        &self,
        session: &Session,
        room_id: &str,
        lat: &str,
        lon: &str,
    ) -> FixtureResult<OutboundMessage> {
        let txn_id = self.txn_ids.next(LOCATION_TXN_PREFIX);
        let message = OutboundMessage::location(room_id, txn_id, lat, lon);
        self.send(session, message).await
    }

    /// Deliver a prepared message. Retrying with the same `txn_id` is
    /// idempotent on the server side.
    pub async fn send(
        &self,
        session: &Session,
        message: OutboundMessage,
    ) -> FixtureResult<OutboundMessage> {
        let url = self.room_endpoint(
            &message.room_id,
            &format!(
                "/send/m.room.message/{}",
                urlencoding::encode(&message.txn_id)
            ),
        );

        let response = self.put(session, url).json(&message.content()).send().await?;

        if let Some(body) = rejection_body(response).await {
            return Err(FixtureError::Send {
                room_id: message.room_id,
                txn_id: message.txn_id,
                body,
            });
        }

        info!(
            user = %session.user_id(),
            room_id = %message.room_id,
            txn_id = %message.txn_id,
            msg_type = ?message.msg_type,
            "sent message"
        );
        Ok(message)
    }
}
