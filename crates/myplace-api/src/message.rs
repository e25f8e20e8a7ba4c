// ── Wire envelope ──
//
// Every outgoing message is `{"uuid": "...", "body": "<json string>"}`.
// The body is the command batch serialized *to a string*, not nested JSON.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::command::CommandBatch;
use crate::error::Error;

/// Outgoing message frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub uuid: String,
    pub body: String,
}

impl Envelope {
    /// Wrap a batch with a fresh message identifier.
    pub fn wrap(batch: &CommandBatch) -> Result<Self, Error> {
        Ok(Self {
            uuid: Uuid::new_v4().to_string(),
            body: serde_json::to_string(batch)?,
        })
    }

    pub fn to_text(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(self)?)
    }
}

/// What a successful [`send`](crate::HubClient::send) produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Fire-and-forget: the message left the socket, nothing was awaited.
    Sent,
    /// The decoded JSON reply frame.
    Message(serde_json::Value),
}

impl Reply {
    /// The reply payload, if one was awaited.
    pub fn into_message(self) -> Option<serde_json::Value> {
        match self {
            Self::Sent => None,
            Self::Message(value) => Some(value),
        }
    }
}

/// Decode a reply text frame. Non-JSON text is a data error, never retried.
pub(crate) fn decode_reply(text: &str) -> Result<serde_json::Value, Error> {
    serde_json::from_str(text).map_err(|e| Error::Deserialization {
        message: e.to_string(),
        body: text.to_owned(),
    })
}
