//! Codec trait and implementations for putting envelopes on the wire.
//!
//! A codec turns an [`Envelope`] into the bytes of one transport frame
//! and back. The rest of the protocol never looks at bytes, so swapping
//! the textual form only means swapping the codec.
//!
//! The round-trip law every codec must honour:
//!
//! ```text
//! decode(encode(x)) == x     for every valid envelope x
//! ```

use crate::{Envelope, ProtocolError};

/// Encodes envelopes to frame bytes and decodes them back.
///
/// `Send + Sync + 'static` because one codec instance is shared by every
/// connection task the server spawns.
pub trait Codec: Send + Sync + 'static {
    /// Serializes an envelope into the bytes of one frame.
    ///
    /// # Errors
    /// Returns [`ProtocolError::MalformedEnvelope`] if the envelope does
    /// not pass [`Envelope::validate`], so invalid trees never reach the
    /// wire.
    fn encode(&self, envelope: &Envelope) -> Result<Vec<u8>, ProtocolError>;

    /// Parses one frame into an envelope.
    ///
    /// # Errors
    /// Returns [`ProtocolError::MalformedEnvelope`] when the bytes are not
    /// well-formed text of the expected shape.
    fn decode(&self, data: &[u8]) -> Result<Envelope, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that writes envelopes as JSON text (via `serde_json`).
///
/// The wire form of a `buy` request looks like:
///
/// ```json
/// {"tag":"buy",
///  "attributes":{"gold":"300","settlement":"settlement:3","unit":"unit:12"},
///  "children":[{"tag":"goods","attributes":{"amount":"50","type":"CLOTH"}}]}
/// ```
///
/// This is behind the `json` feature flag (enabled by default).
///
/// ## Example
///
/// ```rust
/// use colonia_protocol::{Codec, Envelope, JsonCodec};
///
/// let codec = JsonCodec;
/// let envelope = Envelope::new("disbandUnit").with_attribute("unit", "unit:7");
///
/// let bytes = codec.encode(&envelope).unwrap();
/// let decoded = codec.decode(&bytes).unwrap();
/// assert_eq!(envelope, decoded);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode(&self, envelope: &Envelope) -> Result<Vec<u8>, ProtocolError> {
        envelope.validate()?;
        serde_json::to_vec(envelope).map_err(ProtocolError::Encode)
    }

    fn decode(&self, data: &[u8]) -> Result<Envelope, ProtocolError> {
        let envelope: Envelope = serde_json::from_slice(data)
            .map_err(|e| ProtocolError::MalformedEnvelope(e.to_string()))?;
        envelope.validate()?;
        Ok(envelope)
    }
}
