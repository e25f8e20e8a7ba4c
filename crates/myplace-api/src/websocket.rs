//! One WebSocket exchange with the hub.
//!
//! A fresh connection is opened per exchange, authenticated with
//! `client_id` / `password` upgrade headers, used for exactly one outgoing
//! text frame and at most one reply, then closed. The stream is owned by
//! this function's frame, so cancellation (the caller's future being
//! dropped) tears the socket down as well.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use secrecy::{ExposeSecret, SecretString};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{self, ClientRequestBuilder, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use url::Url;

use crate::error::Error;
use crate::message::{Reply, decode_reply};
use crate::transport::TransportConfig;

type HubStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Upper bound on the polite close handshake once the exchange is over.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

/// Identity presented on every connection attempt.
pub(crate) struct Handshake<'a> {
    pub url: &'a Url,
    pub client_id: &'a str,
    pub secret: &'a SecretString,
}

/// Connect, send `text`, optionally read one reply, close.
pub(crate) async fn exchange(
    handshake: &Handshake<'_>,
    text: &str,
    await_reply: bool,
    config: &TransportConfig,
) -> Result<Reply, Error> {
    let mut ws = connect(handshake, config.connect_timeout).await?;

    let outcome = talk(&mut ws, text, await_reply, config.reply_timeout).await;

    // Release the session on every path; a failed close changes nothing
    // about the outcome of the exchange.
    match tokio::time::timeout(CLOSE_TIMEOUT, ws.close(None)).await {
        Ok(Ok(())) => tracing::trace!("WebSocket closed"),
        Ok(Err(e)) => tracing::trace!(error = %e, "WebSocket close failed"),
        Err(_) => tracing::trace!("WebSocket close timed out"),
    }

    outcome
}

async fn connect(handshake: &Handshake<'_>, timeout: Duration) -> Result<HubStream, Error> {
    tracing::debug!(url = %handshake.url, "Connecting to hub WebSocket");

    let uri: tungstenite::http::Uri = handshake
        .url
        .as_str()
        .parse()
        .map_err(|e: tungstenite::http::uri::InvalidUri| Error::Connect(e.to_string()))?;

    let request = ClientRequestBuilder::new(uri)
        .with_header("client_id", handshake.client_id)
        .with_header("password", handshake.secret.expose_secret());

    let (ws, _response) = tokio::time::timeout(timeout, tokio_tungstenite::connect_async(request))
        .await
        .map_err(|_| Error::Timeout {
            stage: "connect",
            timeout_ms: millis(timeout),
        })?
        .map_err(|e| Error::Connect(e.to_string()))?;

    Ok(ws)
}

async fn talk(
    ws: &mut HubStream,
    text: &str,
    await_reply: bool,
    reply_timeout: Duration,
) -> Result<Reply, Error> {
    ws.send(Message::text(text))
        .await
        .map_err(|e| Error::Connect(format!("send failed: {e}")))?;

    if !await_reply {
        return Ok(Reply::Sent);
    }

    let deadline = tokio::time::Instant::now() + reply_timeout;

    loop {
        let frame = tokio::time::timeout_at(deadline, ws.next())
            .await
            .map_err(|_| Error::Timeout {
                stage: "reply",
                timeout_ms: millis(reply_timeout),
            })?;

        match frame {
            Some(Ok(Message::Text(text))) => {
                return decode_reply(text.as_str()).map(Reply::Message);
            }
            Some(Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_))) => {
                // tungstenite answers pings itself
                tracing::trace!("WebSocket control frame while awaiting reply");
            }
            Some(Ok(Message::Binary(_))) => {
                return Err(Error::MalformedMessage("binary frame instead of text".into()));
            }
            Some(Ok(Message::Close(frame))) => {
                let detail = frame.map_or_else(
                    || "no payload".to_owned(),
                    |cf| format!("code {}: {}", cf.code, cf.reason),
                );
                return Err(Error::MalformedMessage(format!(
                    "closed before reply ({detail})"
                )));
            }
            Some(Err(e)) => return Err(Error::Connect(e.to_string())),
            None => {
                return Err(Error::MalformedMessage("stream ended before reply".into()));
            }
        }
    }
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
