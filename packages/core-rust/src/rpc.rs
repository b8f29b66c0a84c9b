//! Wire envelope for downstream RPC calls.
//!
//! Every downstream service speaks the same length-delimited `MsgPack`
//! protocol: a [`RpcRequest`] frame out, a matching [`RpcResponse`] frame
//! back. Typed request/response bodies (see [`crate::messages`]) are
//! encoded as nested `MsgPack` inside the envelope, so the transport layer
//! never needs to know the per-service schemas.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Status code carried by a failed RPC, mirroring the gRPC code set the
/// downstream services use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RpcCode {
    InvalidArgument,
    NotFound,
    AlreadyExists,
    PermissionDenied,
    Unauthenticated,
    DeadlineExceeded,
    Unavailable,
    Internal,
}

impl RpcCode {
    /// Wire/log name of the code.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RpcCode::InvalidArgument => "invalid_argument",
            RpcCode::NotFound => "not_found",
            RpcCode::AlreadyExists => "already_exists",
            RpcCode::PermissionDenied => "permission_denied",
            RpcCode::Unauthenticated => "unauthenticated",
            RpcCode::DeadlineExceeded => "deadline_exceeded",
            RpcCode::Unavailable => "unavailable",
            RpcCode::Internal => "internal",
        }
    }
}

/// Error returned by a downstream service or by the transport itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("rpc error: code = {code:?} desc = {message}")]
pub struct RpcError {
    /// Status code reported by the remote (or synthesized locally for
    /// transport failures, always one of `unavailable`/`deadline_exceeded`/
    /// `internal`).
    pub code: RpcCode,
    /// Remote error description. Logged internally, never exposed to the
    /// HTTP caller except through the explicit `already_exists` re-mapping.
    pub message: String,
}

impl RpcError {
    /// Builds an error with the given code and message.
    pub fn new(code: RpcCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Synthesizes a transport-level error (dial failure, broken channel).
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(RpcCode::Unavailable, message)
    }
}

/// Per-call metadata attached by the upstream client before dispatch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallMetadata {
    /// Correlation token for cross-service tracing.
    pub request_id: String,
    /// Caller locale, forwarded so downstream services can localize.
    pub accept_language: String,
}

impl CallMetadata {
    /// Builds metadata from a request context.
    #[must_use]
    pub fn from_context(ctx: &crate::RequestContext) -> Self {
        Self {
            request_id: ctx.request_id.clone(),
            accept_language: ctx.accept_language.clone(),
        }
    }
}

/// One outbound call frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcRequest {
    /// Channel-local call id; the response echoes it back.
    pub id: u64,
    /// Qualified method name, e.g. `user.CreateUser`.
    pub method: String,
    /// Tracing and locale metadata.
    pub metadata: CallMetadata,
    /// `MsgPack`-encoded typed request body.
    #[serde(with = "serde_bytes_vec")]
    pub body: Vec<u8>,
}

/// One inbound response frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcResponse {
    /// Call id this response answers.
    pub id: u64,
    /// `MsgPack`-encoded typed response body on success.
    #[serde(with = "serde_bytes_vec", default)]
    pub body: Vec<u8>,
    /// Error reported by the remote, if the call failed.
    pub error: Option<RpcError>,
}

/// Compact byte-array encoding for body payloads.
///
/// `Vec<u8>` would otherwise serialize as a `MsgPack` array of integers;
/// this forces the `bin` format family.
mod serde_bytes_vec {
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_bytes(bytes)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Vec<u8>, D::Error> {
        struct BytesVisitor;

        impl serde::de::Visitor<'_> for BytesVisitor {
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

        de.deserialize_byte_buf(BytesVisitor)
    }
}

/// Encodes a typed body into the nested payload format.
///
/// # Errors
///
/// Returns an encode error if the value cannot be serialized.
pub fn encode_body<T: Serialize>(value: &T) -> Result<Vec<u8>, rmp_serde::encode::Error> {
    rmp_serde::to_vec_named(value)
}

/// Decodes a typed body from the nested payload format.
///
/// # Errors
///
/// Returns a decode error if the payload does not match the expected schema.
pub fn decode_body<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, rmp_serde::decode::Error> {
    rmp_serde::from_slice(bytes)
}

/// Encodes an envelope frame for the wire.
///
/// # Errors
///
/// Returns an encode error if the frame cannot be serialized.
pub fn encode_frame<T: Serialize>(frame: &T) -> Result<bytes::Bytes, rmp_serde::encode::Error> {
    rmp_serde::to_vec_named(frame).map(bytes::Bytes::from)
}

/// Decodes an envelope frame from the wire.
///
/// # Errors
///
/// Returns a decode error if the frame is malformed.
pub fn decode_frame<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, rmp_serde::decode::Error> {
    rmp_serde::from_slice(bytes)
}
