//! Event-queue value helpers
//!
//! The event-queue transport carries u32 fields as 4-byte big-endian
//! binary blobs instead of native LLSD integers. Receiving viewers decode
//! them that way, so the quirk is part of the wire contract.

use crate::error::{LlsdError, ValueError};
use crate::types::Value;

/// Lowers a u32 to the 4-byte big-endian `Binary` form used in
/// event-queue maps.
pub fn encode_u32_to_binary(value: u32) -> Value {
    Value::Binary(value.to_be_bytes().to_vec())
}

/// Recovers a u32 from its event-queue `Binary` form.
pub fn decode_u32_from_binary(value: &Value) -> Result<u32, ValueError> {
    match value {
        Value::Binary(bytes) if bytes.len() == 4 => {
            Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
        }
        Value::Binary(bytes) => Err(ValueError::ParseFailed {
            target: "u32",
            input: format!("binary blob of {} bytes", bytes.len()),
        }),
        other => Err(ValueError::TypeMismatch {
            expected: "binary",
            found: other.type_name(),
        }),
    }
}

/// Wraps an event-queue body in the `{message, body}` envelope the
/// long-poll response carries.
pub fn envelope(message_name: &str, body: Value) -> Value {
    let mut map = crate::types::ValueMap::new();
    map.insert("message", message_name);
    map.insert("body", body);
    Value::Map(map)
}

/// Pulls the body back out of an event-queue envelope, checking the
/// message name.
pub fn open_envelope(value: &Value, message_name: &str) -> Result<Value, LlsdError> {
    let map = match value {
        Value::Map(map) => map,
        _ => return Err(LlsdError::MissingRoot),
    };
    match map.get("message") {
        Some(Value::String(name)) if name == message_name => {}
        _ => return Err(LlsdError::UnexpectedElement("message".to_string())),
    }
    map.get("body")
        .cloned()
        .ok_or_else(|| LlsdError::UnexpectedElement("body".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_u32_binary_round_trip() {
        for v in [0u32, 1, 0xDEAD_BEEF, u32::MAX] {
            let encoded = encode_u32_to_binary(v);
            assert_eq!(decode_u32_from_binary(&encoded).unwrap(), v);
        }
    }

    #[test]
    fn test_u32_binary_is_big_endian() {
        match encode_u32_to_binary(0x0102_0304) {
            Value::Binary(bytes) => assert_eq!(bytes, vec![1, 2, 3, 4]),
            other => panic!("expected binary, got {other:?}"),
        }
    }

    #[test]
    fn test_wrong_width_rejected() {
        assert!(decode_u32_from_binary(&Value::Binary(vec![1, 2])).is_err());
        assert!(decode_u32_from_binary(&Value::Integer(5)).is_err());
    }

    #[test]
    fn test_envelope_round_trip() {
        let body = Value::Integer(7);
        let wrapped = envelope("TestMessage", body.clone());
        assert_eq!(open_envelope(&wrapped, "TestMessage").unwrap(), body);
        assert!(open_envelope(&wrapped, "OtherMessage").is_err());
    }
}
