//! Codec trait and implementations for serializing/deserializing messages.
//!
//! A "codec" (coder/decoder) converts between Rust types and raw bytes.
//! The protocol layer doesn't care HOW messages are serialized — it just
//! needs something that implements the [`Codec`] trait.
//!
//! Currently we provide [`JsonCodec`] (human-readable, great for
//! debugging). A binary codec could be added behind its own feature flag
//! without changing any other code.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// `Send + Sync + 'static` — safe to share between threads and store in
/// long-lived async tasks. `encode`/`decode` are generic over any
/// `Serialize`/`DeserializeOwned` type.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

/// A [`Codec`] that uses JSON (via `serde_json`). Behind the `json`
/// feature flag (enabled by default).
///
/// ```rust
/// use parlor_protocol::{JsonCodec, Codec, Envelope, Payload, SystemMessage, Channel};
///
/// let codec = JsonCodec;
///
/// let envelope = Envelope {
///     seq: 1,
///     timestamp: 5000,
///     channel: Channel::ReliableOrdered,
///     payload: Payload::System(SystemMessage::Heartbeat { client_time: 5000 }),
/// };
///
/// let bytes = codec.encode(&envelope).unwrap();
/// let decoded: Envelope = codec.decode(&bytes).unwrap();
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
