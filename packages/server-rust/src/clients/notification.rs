//! Notification queue publisher.
//!
//! Email dispatch is fire-and-forget: the gateway frames a publish
//! envelope onto the notification broker's TCP endpoint and never waits
//! for a reply. A single background writer task owns the connection and
//! redials it on failure; callers only touch a bounded in-process queue,
//! so a slow broker backpressures instead of blocking request handlers on
//! socket I/O.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::SinkExt;
use lexgate_core::messages::notification::SendEmailRequest;
use lexgate_core::rpc::{encode_body, encode_frame, CallMetadata};
use lexgate_core::RequestContext;
use serde::{Deserialize, Serialize};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_util::codec::{Framed, LengthDelimitedCodec};
use tracing::{debug, warn};

use super::{ClientError, NotificationApi};

/// Publish failure surfaced to the orchestrator.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// The writer task is gone; nothing will drain the queue.
    #[error("notification publisher is disconnected")]
    Disconnected,
    /// The in-process queue stayed full for the whole send timeout.
    #[error("notification queue is full")]
    Timeout,
}

/// One message on the broker wire: routing key plus tracing headers plus
/// an opaque `MsgPack` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishEnvelope {
    pub queue: String,
    pub headers: CallMetadata,
    #[serde(with = "serde_bytes_vec")]
    pub body: Vec<u8>,
}

mod serde_bytes_vec {
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_bytes(bytes)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Vec<u8>, D::Error> {
        struct V;
        impl serde::de::Visitor<'_> for V {
            type Value = Vec<u8>;
            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("byte array")
            }
            fn visit_bytes<E: serde::de::Error>(self, v: &[u8]) -> Result<Vec<u8>, E> {
                Ok(v.to_vec())
            }
            fn visit_byte_buf<E: serde::de::Error>(self, v: Vec<u8>) -> Result<Vec<u8>, E> {
                Ok(v)
            }
        }
        de.deserialize_byte_buf(V)
    }
}

/// Broker connection settings.
#[derive(Debug, Clone)]
pub struct NotificationConfig {
    /// `host:port` of the notification broker.
    pub addr: String,
    /// Routing key email envelopes are published under.
    pub queue: String,
    /// In-process queue depth before publishers start waiting.
    pub buffer: usize,
    /// How long a publisher waits for queue space.
    pub send_timeout: Duration,
}

/// Handle used by the orchestrator; cheap to clone.
#[derive(Debug, Clone)]
pub struct NotificationClient {
    tx: mpsc::Sender<PublishEnvelope>,
    queue: String,
    send_timeout: Duration,
}

impl NotificationClient {
    /// Spawns the background writer and returns the publish handle.
    #[must_use]
    pub fn start(config: NotificationConfig) -> Self {
        let (tx, rx) = mpsc::channel(config.buffer.max(1));
        let client = Self {
            tx,
            queue: config.queue.clone(),
            send_timeout: config.send_timeout,
        };
        tokio::spawn(run_publisher(config, rx));
        client
    }

    /// Test constructor: publishes into the given channel, no writer task.
    #[cfg(test)]
    pub(crate) fn for_channel(tx: mpsc::Sender<PublishEnvelope>, queue: &str) -> Self {
        Self {
            tx,
            queue: queue.to_string(),
            send_timeout: Duration::from_millis(50),
        }
    }

    async fn publish(&self, envelope: PublishEnvelope) -> Result<(), PublishError> {
        match tokio::time::timeout(self.send_timeout, self.tx.send(envelope)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(_)) => Err(PublishError::Disconnected),
            Err(_) => Err(PublishError::Timeout),
        }
    }
}

#[async_trait]
impl NotificationApi for NotificationClient {
    async fn send_email(
        &self,
        ctx: &RequestContext,
        req: SendEmailRequest,
    ) -> Result<(), ClientError> {
        let body = encode_body(&req)?;
        self.publish(PublishEnvelope {
            queue: self.queue.clone(),
            headers: CallMetadata::from_context(ctx),
            body,
        })
        .await?;
        Ok(())
    }
}

const RECONNECT_DELAY: Duration = Duration::from_secs(2);

/// Owns the broker connection. Envelopes that fail mid-write are dropped;
/// email delivery is at-most-once by contract.
async fn run_publisher(config: NotificationConfig, mut rx: mpsc::Receiver<PublishEnvelope>) {
    let mut conn: Option<Framed<TcpStream, LengthDelimitedCodec>> = None;

    while let Some(envelope) = rx.recv().await {
        if conn.is_none() {
            match TcpStream::connect(&config.addr).await {
                Ok(stream) => {
                    debug!(addr = %config.addr, "notification broker connected");
                    conn = Some(Framed::new(stream, LengthDelimitedCodec::new()));
                }
                Err(err) => {
                    warn!(addr = %config.addr, error = %err, "notification broker unreachable, dropping envelope");
                    tokio::time::sleep(RECONNECT_DELAY).await;
                    continue;
                }
            }
        }

        let frame = match encode_frame(&envelope) {
            Ok(frame) => frame,
            Err(err) => {
                warn!(error = %err, "failed to encode publish envelope");
                continue;
            }
        };

        if let Some(framed) = conn.as_mut() {
            if let Err(err) = framed.send(frame).await {
                warn!(addr = %config.addr, error = %err, "notification publish failed, reconnecting");
                conn = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexgate_core::messages::notification::EmailKind;
    use lexgate_core::rpc::decode_body;

    fn ctx() -> RequestContext {
        RequestContext {
            request_id: "req-5".to_string(),
            client_ip: "10.0.0.1".to_string(),
            device: "cli".to_string(),
            accept_language: "en".to_string(),
            claims: None,
        }
    }

    #[tokio::test]
    async fn send_email_publishes_an_envelope_with_headers() {
        let (tx, mut rx) = mpsc::channel(4);
        let client = NotificationClient::for_channel(tx, "emails");

        client
            .send_email(
                &ctx(),
                SendEmailRequest {
                    email: "a@b.c".to_string(),
                    kind: EmailKind::EmailConfirmation,
                    action_uuid: "uuid-1".to_string(),
                },
            )
            .await
            .unwrap();

        let envelope = rx.recv().await.unwrap();
        assert_eq!(envelope.queue, "emails");
        assert_eq!(envelope.headers.request_id, "req-5");
        let body: SendEmailRequest = decode_body(&envelope.body).unwrap();
        assert_eq!(body.email, "a@b.c");
    }

    #[tokio::test]
    async fn full_queue_times_out_instead_of_blocking() {
        let (tx, _rx) = mpsc::channel(1);
        let client = NotificationClient::for_channel(tx, "emails");
        let req = SendEmailRequest {
            email: "a@b.c".to_string(),
            kind: EmailKind::ResetPassword,
            action_uuid: "uuid-2".to_string(),
        };

        client.send_email(&ctx(), req.clone()).await.unwrap();
        let err = client.send_email(&ctx(), req).await.unwrap_err();
        assert!(matches!(err, ClientError::Publish(PublishError::Timeout)));
    }

    #[tokio::test]
    async fn dropped_writer_surfaces_disconnected() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let client = NotificationClient::for_channel(tx, "emails");
        let err = client
            .send_email(
                &ctx(),
                SendEmailRequest {
                    email: "a@b.c".to_string(),
                    kind: EmailKind::ResetPassword,
                    action_uuid: "uuid-3".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClientError::Publish(PublishError::Disconnected)
        ));
    }
}
