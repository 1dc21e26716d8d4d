//! JSON codec for socket frames.

use crate::error::RealtimeError;

use super::types::{InboundChat, OutboundFrame};

/// Decodes a chat frame.
///
/// Anything other than a JSON object with a string or `null` `message`
/// field is a decode error, as is a frame longer than `max_len` bytes.
pub fn decode_chat(raw: &str, max_len: usize) -> Result<InboundChat, RealtimeError> {
    if raw.len() > max_len {
        return Err(RealtimeError::Decode(format!(
            "frame of {} bytes exceeds limit of {max_len}",
            raw.len()
        )));
    }
    serde_json::from_str(raw).map_err(|e| RealtimeError::Decode(e.to_string()))
}

/// Serializes a frame for the socket.
pub fn encode_frame(frame: &OutboundFrame) -> Result<String, RealtimeError> {
    Ok(serde_json::to_string(frame)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIMIT: usize = 1024;

    #[test]
    fn test_decode_valid_chat() {
        let chat = decode_chat(r#"{"message":"hi"}"#, LIMIT).unwrap();
        assert_eq!(chat.message, "hi");
        assert!(!chat.is_blank());
    }

    #[test]
    fn test_decode_ignores_extra_fields() {
        let chat = decode_chat(r#"{"message":"hi","client_id":7}"#, LIMIT).unwrap();
        assert_eq!(chat.message, "hi");
    }

    #[test]
    fn test_decode_rejects_malformed() {
        for raw in [
            "not json",
            "{",
            "[]",
            r#"{"text":"hi"}"#,
            r#"{"message":42}"#,
        ] {
            let err = decode_chat(raw, LIMIT).unwrap_err();
            assert!(matches!(err, RealtimeError::Decode(_)), "raw: {raw}");
            assert_eq!(err.client_message(), "Invalid data format.");
        }
    }

    #[test]
    fn test_decode_rejects_oversize() {
        let raw = format!(r#"{{"message":"{}"}}"#, "x".repeat(LIMIT));
        assert!(matches!(
            decode_chat(&raw, LIMIT),
            Err(RealtimeError::Decode(_))
        ));
    }

    #[test]
    fn test_blank_detection() {
        assert!(decode_chat(r#"{"message":""}"#, LIMIT).unwrap().is_blank());
        assert!(decode_chat(r#"{"message":"  \n\t"}"#, LIMIT).unwrap().is_blank());
    }

    #[test]
    fn test_null_message_is_blank() {
        let chat = decode_chat(r#"{"message":null}"#, LIMIT).unwrap();
        assert_eq!(chat.message, "");
        assert!(chat.is_blank());
    }

    #[test]
    fn test_encode_frames() {
        let chat = OutboundFrame::ChatMessage {
            message: "hi".into(),
            sender: "alice".into(),
            timestamp: "2024-05-01T10:00:00.000000+00:00".into(),
        };
        let value: serde_json::Value =
            serde_json::from_str(&encode_frame(&chat).unwrap()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "type": "chat.message",
                "message": "hi",
                "sender": "alice",
                "timestamp": "2024-05-01T10:00:00.000000+00:00",
            })
        );

        let error = encode_frame(&OutboundFrame::error("Invalid data format.")).unwrap();
        assert_eq!(error, r#"{"type":"error","message":"Invalid data format."}"#);

        let count = encode_frame(&OutboundFrame::UnreadMessageUpdate { count: 1 }).unwrap();
        assert_eq!(count, r#"{"type":"unread_message_update","count":1}"#);

        let count = encode_frame(&OutboundFrame::UnreadNotificationUpdate { count: 0 }).unwrap();
        assert_eq!(count, r#"{"type":"unread_notification_update","count":0}"#);
    }
}
