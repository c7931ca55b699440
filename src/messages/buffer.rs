//! Packet cursors for the UDP wire format
//!
//! All multi-byte integers are little-endian on the wire. Strings are
//! length-prefixed with a single byte and carry a trailing NUL inside the
//! counted region, which decode strips. Underrun is a caller error and
//! fails hard; there is no partial-read recovery at this layer.

use bytes::BufMut;
use byteorder::{ByteOrder, LittleEndian};
use uuid::Uuid;

use crate::error::{CodecError, CodecResult};
use crate::types::{Quaternion, Vector3};

pub struct PacketReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> PacketReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn take(&mut self, n: usize) -> CodecResult<&'a [u8]> {
        if self.remaining() < n {
            return Err(CodecError::ShortBuffer {
                needed: n,
                offset: self.pos,
                remaining: self.remaining(),
            });
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn read_u8(&mut self) -> CodecResult<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_i8(&mut self) -> CodecResult<i8> {
        Ok(self.take(1)?[0] as i8)
    }

    pub fn read_bool(&mut self) -> CodecResult<bool> {
        Ok(self.read_u8()? != 0)
    }

    pub fn read_u16(&mut self) -> CodecResult<u16> {
        Ok(LittleEndian::read_u16(self.take(2)?))
    }

    pub fn read_u32(&mut self) -> CodecResult<u32> {
        Ok(LittleEndian::read_u32(self.take(4)?))
    }

    pub fn read_i32(&mut self) -> CodecResult<i32> {
        Ok(LittleEndian::read_i32(self.take(4)?))
    }

    pub fn read_u64(&mut self) -> CodecResult<u64> {
        Ok(LittleEndian::read_u64(self.take(8)?))
    }

    pub fn read_i64(&mut self) -> CodecResult<i64> {
        Ok(LittleEndian::read_i64(self.take(8)?))
    }

    pub fn read_f32(&mut self) -> CodecResult<f32> {
        Ok(LittleEndian::read_f32(self.take(4)?))
    }

    pub fn read_f64(&mut self) -> CodecResult<f64> {
        Ok(LittleEndian::read_f64(self.take(8)?))
    }

    pub fn read_uuid(&mut self) -> CodecResult<Uuid> {
        let bytes = self.take(16)?;
        let mut arr = [0u8; 16];
        arr.copy_from_slice(bytes);
        Ok(Uuid::from_bytes(arr))
    }

    pub fn read_vector3(&mut self) -> CodecResult<Vector3> {
        let bytes = self.take(12)?;
        Vector3::from_bytes(bytes, 0)
    }

    pub fn read_quaternion_normalized(&mut self) -> CodecResult<Quaternion> {
        let bytes = self.take(12)?;
        Quaternion::from_bytes(bytes, 0, true)
    }

    pub fn read_bytes(&mut self, len: usize) -> CodecResult<Vec<u8>> {
        Ok(self.take(len)?.to_vec())
    }

    /// Reads a `StringLen8` field: one length byte, then that many bytes
    /// with any trailing NULs stripped.
    pub fn read_string8(&mut self) -> CodecResult<String> {
        let len = self.read_u8()? as usize;
        let mut bytes = self.take(len)?;
        while let [head @ .., 0] = bytes {
            bytes = head;
        }
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    /// Reads a `StringLen16` field (two-byte little-endian length prefix).
    pub fn read_string16(&mut self) -> CodecResult<String> {
        let len = self.read_u16()? as usize;
        let mut bytes = self.take(len)?;
        while let [head @ .., 0] = bytes {
            bytes = head;
        }
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }
}

#[derive(Debug, Default)]
pub struct PacketWriter {
    buf: Vec<u8>,
}

impl PacketWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn write_u8(&mut self, v: u8) {
        self.buf.put_u8(v);
    }

    pub fn write_i8(&mut self, v: i8) {
        self.buf.put_i8(v);
    }

    pub fn write_bool(&mut self, v: bool) {
        self.buf.put_u8(v as u8);
    }

    pub fn write_u16(&mut self, v: u16) {
        self.buf.put_u16_le(v);
    }

    pub fn write_u32(&mut self, v: u32) {
        self.buf.put_u32_le(v);
    }

    pub fn write_i32(&mut self, v: i32) {
        self.buf.put_i32_le(v);
    }

    pub fn write_u64(&mut self, v: u64) {
        self.buf.put_u64_le(v);
    }

    pub fn write_i64(&mut self, v: i64) {
        self.buf.put_i64_le(v);
    }

    pub fn write_f32(&mut self, v: f32) {
        self.buf.put_f32_le(v);
    }

    pub fn write_f64(&mut self, v: f64) {
        self.buf.put_f64_le(v);
    }

    pub fn write_uuid(&mut self, v: Uuid) {
        self.buf.put_slice(v.as_bytes());
    }

    pub fn write_vector3(&mut self, v: Vector3) -> CodecResult<()> {
        let mut bytes = [0u8; 12];
        v.to_bytes(&mut bytes, 0)?;
        self.buf.put_slice(&bytes);
        Ok(())
    }

    pub fn write_quaternion_normalized(&mut self, v: Quaternion) -> CodecResult<()> {
        let mut bytes = [0u8; 12];
        v.to_bytes_normalized(&mut bytes, 0)?;
        self.buf.put_slice(&bytes);
        Ok(())
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.put_slice(bytes);
    }

    /// Writes a `StringLen8` field including its trailing NUL; the counted
    /// region is limited to 255 bytes.
    pub fn write_string8(&mut self, s: &str) -> CodecResult<()> {
        let bytes = s.as_bytes();
        if bytes.len() + 1 > 255 {
            return Err(CodecError::StringTooLong {
                len: bytes.len(),
                limit: 254,
            });
        }
        self.buf.put_u8((bytes.len() + 1) as u8);
        self.buf.put_slice(bytes);
        self.buf.put_u8(0);
        Ok(())
    }

    pub fn write_string16(&mut self, s: &str) -> CodecResult<()> {
        let bytes = s.as_bytes();
        if bytes.len() + 1 > 65_535 {
            return Err(CodecError::StringTooLong {
                len: bytes.len(),
                limit: 65_534,
            });
        }
        self.buf.put_u16_le((bytes.len() + 1) as u16);
        self.buf.put_slice(bytes);
        self.buf.put_u8(0);
        Ok(())
    }

    /// Writes a repeated-section count; the protocol caps every repeated
    /// section at 255 entries.
    pub fn write_count(&mut self, count: usize) -> CodecResult<()> {
        if count > 255 {
            return Err(CodecError::RepeatOverflow { count });
        }
        self.buf.put_u8(count as u8);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UuidExt;

    #[test]
    fn test_integers_round_trip_little_endian() {
        let mut w = PacketWriter::new();
        w.write_u32(0x0102_0304);
        w.write_i32(-5);
        w.write_u64(0x0A0B_0C0D_0E0F_1011);
        assert_eq!(&w.as_bytes()[0..4], &[0x04, 0x03, 0x02, 0x01]);

        let bytes = w.into_bytes();
        let mut r = PacketReader::new(&bytes);
        assert_eq!(r.read_u32().unwrap(), 0x0102_0304);
        assert_eq!(r.read_i32().unwrap(), -5);
        assert_eq!(r.read_u64().unwrap(), 0x0A0B_0C0D_0E0F_1011);
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn test_string8_round_trip_with_nul() {
        let mut w = PacketWriter::new();
        w.write_string8("Test").unwrap();
        let bytes = w.into_bytes();
        // Length byte counts the NUL.
        assert_eq!(bytes[0], 5);
        assert_eq!(*bytes.last().unwrap(), 0);

        let mut r = PacketReader::new(&bytes);
        assert_eq!(r.read_string8().unwrap(), "Test");
    }

    #[test]
    fn test_string8_length_limit() {
        // 254 content bytes + NUL is exactly what the length byte can carry.
        let mut w = PacketWriter::new();
        assert!(w.write_string8(&"x".repeat(255)).is_err());
        assert!(w.write_string8(&"x".repeat(254)).is_ok());
        let bytes = w.into_bytes();
        assert_eq!(bytes[0], 255);

        let mut r = PacketReader::new(&bytes);
        assert_eq!(r.read_string8().unwrap(), "x".repeat(254));
    }

    #[test]
    fn test_uuid_round_trip() {
        let id = Uuid::random();
        let mut w = PacketWriter::new();
        w.write_uuid(id);
        let bytes = w.into_bytes();
        let mut r = PacketReader::new(&bytes);
        assert_eq!(r.read_uuid().unwrap(), id);
    }

    #[test]
    fn test_underrun_fails() {
        let bytes = [1u8, 2];
        let mut r = PacketReader::new(&bytes);
        assert!(matches!(
            r.read_u32(),
            Err(CodecError::ShortBuffer {
                needed: 4,
                offset: 0,
                remaining: 2
            })
        ));
    }

    #[test]
    fn test_count_limit() {
        let mut w = PacketWriter::new();
        assert!(w.write_count(255).is_ok());
        assert!(matches!(
            w.write_count(256),
            Err(CodecError::RepeatOverflow { count: 256 })
        ));
    }
}
