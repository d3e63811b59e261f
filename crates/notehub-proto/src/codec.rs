//! JSON codec between [`Envelope`]s and WebSocket frames.
//!
//! The stream carries one envelope per text frame. Binary, ping, and
//! close frames are handled by the connection loops, not here.

use tokio_tungstenite::tungstenite::Message;

use notehub_core::AppResult;

use crate::envelope::Envelope;

/// Encode an envelope into a WebSocket text frame.
pub fn encode(envelope: &Envelope) -> AppResult<Message> {
    let json = serde_json::to_string(envelope)?;
    Ok(Message::Text(json.into()))
}

/// Decode an envelope from the text content of a frame.
pub fn decode(text: &str) -> AppResult<Envelope> {
    serde_json::from_str(text).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::Payload;

    #[test]
    fn test_encode_decode_roundtrip() {
        let env = Envelope::message("alice", "hello");
        let frame = encode(&env).expect("encode");
        let Message::Text(text) = frame else {
            panic!("expected text frame");
        };
        let parsed = decode(&text).expect("decode");
        assert_eq!(parsed, env);
    }

    #[test]
    fn test_decode_rejects_malformed_frame() {
        let err = decode("{not json").expect_err("should fail");
        assert_eq!(err.kind, notehub_core::error::ErrorKind::Serialization);
    }

    #[test]
    fn test_decode_chunk_frame() {
        let env = Envelope::chunk("bob", "dog_2.jpg", vec![9, 8, 7], ".jpg");
        let Message::Text(text) = encode(&env).expect("encode") else {
            panic!("expected text frame");
        };
        let parsed = decode(&text).expect("decode");
        assert!(matches!(parsed.payload, Some(Payload::Chunk { .. })));
    }
}
