//! UDP message codec layer
//!
//! Every wire message is a plain struct with a symmetric
//! `serialize`/`decode` pair over the packet cursors, plus an optional
//! event-queue form that lowers the same message to an LLSD value tree.
//! Message structs are transient: constructed, encoded or decoded, then
//! dropped. Nothing here touches the circuit or transport.

pub mod buffer;
pub mod eqg;
pub mod inventory;

pub use buffer::{PacketReader, PacketWriter};

use crate::error::{CodecError, CodecResult};
use crate::types::Value;

/// Frequency class of a message number, which decides how the opcode is
/// framed on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageFrequency {
    /// Single-byte opcode, 1..=254.
    High,
    /// `0xFF` then a one-byte opcode.
    Medium,
    /// `0xFF 0xFF` then a big-endian u16 opcode.
    Low,
}

/// Opcode registry for the messages this crate speaks. Numbers come from
/// the legacy message template and are fixed for all time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    UpdateCreateInventoryItem,
    MoveInventoryItem,
    CopyInventoryItem,
    RemoveInventoryItem,
    CreateInventoryFolder,
    UpdateInventoryFolder,
    MoveInventoryFolder,
    RemoveInventoryFolder,
    FetchInventory,
    FetchInventoryReply,
    BulkUpdateInventory,
}

impl MessageType {
    pub fn message_number(self) -> u16 {
        match self {
            MessageType::UpdateCreateInventoryItem => 267,
            MessageType::MoveInventoryItem => 268,
            MessageType::CopyInventoryItem => 269,
            MessageType::RemoveInventoryItem => 270,
            MessageType::CreateInventoryFolder => 273,
            MessageType::UpdateInventoryFolder => 274,
            MessageType::MoveInventoryFolder => 275,
            MessageType::RemoveInventoryFolder => 276,
            MessageType::FetchInventory => 279,
            MessageType::FetchInventoryReply => 280,
            MessageType::BulkUpdateInventory => 281,
        }
    }

    pub fn frequency(self) -> MessageFrequency {
        // Everything in the inventory family is Low frequency.
        MessageFrequency::Low
    }

    pub fn from_number(number: u16) -> Option<Self> {
        Some(match number {
            267 => MessageType::UpdateCreateInventoryItem,
            268 => MessageType::MoveInventoryItem,
            269 => MessageType::CopyInventoryItem,
            270 => MessageType::RemoveInventoryItem,
            273 => MessageType::CreateInventoryFolder,
            274 => MessageType::UpdateInventoryFolder,
            275 => MessageType::MoveInventoryFolder,
            276 => MessageType::RemoveInventoryFolder,
            279 => MessageType::FetchInventory,
            280 => MessageType::FetchInventoryReply,
            281 => MessageType::BulkUpdateInventory,
            _ => return None,
        })
    }

    /// Writes the framed opcode for this message.
    pub fn write_id(self, writer: &mut PacketWriter) {
        let number = self.message_number();
        match self.frequency() {
            MessageFrequency::High => writer.write_u8(number as u8),
            MessageFrequency::Medium => {
                writer.write_u8(0xFF);
                writer.write_u8(number as u8);
            }
            MessageFrequency::Low => {
                writer.write_u8(0xFF);
                writer.write_u8(0xFF);
                writer.write_bytes(&number.to_be_bytes());
            }
        }
    }

    /// Reads a framed opcode and resolves it against the registry.
    pub fn read_id(reader: &mut PacketReader) -> CodecResult<Self> {
        let first = reader.read_u8()?;
        let number = if first != 0xFF {
            first as u16
        } else {
            let second = reader.read_u8()?;
            if second != 0xFF {
                second as u16
            } else {
                let bytes = reader.read_bytes(2)?;
                u16::from_be_bytes([bytes[0], bytes[1]])
            }
        };
        MessageType::from_number(number).ok_or(CodecError::UnknownMessage { number })
    }
}

/// The codec contract every wire message implements.
pub trait Message: Sized {
    const TYPE: MessageType;

    /// Writes the message body (opcode excluded) to the cursor.
    fn serialize(&self, writer: &mut PacketWriter) -> CodecResult<()>;

    /// Reads the message body (opcode already consumed) from the cursor.
    fn decode(reader: &mut PacketReader) -> CodecResult<Self>;

    /// The event-queue LLSD form, for messages that have one.
    fn serialize_eqg(&self) -> Option<Value> {
        None
    }
}

/// Frames a message with its opcode, producing a complete payload for the
/// circuit layer.
pub fn serialize_with_id<M: Message>(message: &M) -> CodecResult<Vec<u8>> {
    let mut writer = PacketWriter::with_capacity(64);
    M::TYPE.write_id(&mut writer);
    message.serialize(&mut writer)?;
    Ok(writer.into_bytes())
}

/// Consumes the opcode, checks it against `M`, and decodes the body.
pub fn decode_with_id<M: Message>(data: &[u8]) -> CodecResult<M> {
    let mut reader = PacketReader::new(data);
    let found = MessageType::read_id(&mut reader)?;
    if found != M::TYPE {
        return Err(CodecError::MessageDecode {
            reason: format!(
                "expected message {} but found {}",
                M::TYPE.message_number(),
                found.message_number()
            ),
        });
    }
    M::decode(&mut reader)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_registry_round_trips() {
        for ty in [
            MessageType::UpdateCreateInventoryItem,
            MessageType::MoveInventoryItem,
            MessageType::CopyInventoryItem,
            MessageType::RemoveInventoryItem,
            MessageType::CreateInventoryFolder,
            MessageType::UpdateInventoryFolder,
            MessageType::MoveInventoryFolder,
            MessageType::RemoveInventoryFolder,
            MessageType::FetchInventory,
            MessageType::FetchInventoryReply,
            MessageType::BulkUpdateInventory,
        ] {
            assert_eq!(MessageType::from_number(ty.message_number()), Some(ty));
        }
        assert_eq!(MessageType::from_number(9999), None);
    }

    #[test]
    fn test_low_frequency_framing() {
        let mut w = PacketWriter::new();
        MessageType::CreateInventoryFolder.write_id(&mut w);
        let bytes = w.into_bytes();
        assert_eq!(bytes, vec![0xFF, 0xFF, 0x01, 0x11]); // 273 big-endian

        let mut r = PacketReader::new(&bytes);
        assert_eq!(
            MessageType::read_id(&mut r).unwrap(),
            MessageType::CreateInventoryFolder
        );
    }

    #[test]
    fn test_unknown_opcode_rejected() {
        let bytes = [0xFF, 0xFF, 0x27, 0x0F]; // 9999
        let mut r = PacketReader::new(&bytes);
        assert!(matches!(
            MessageType::read_id(&mut r),
            Err(CodecError::UnknownMessage { number: 9999 })
        ));
    }
}
