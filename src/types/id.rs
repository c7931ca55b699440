//! UUID wire helpers
//!
//! UUIDs go over the wire in RFC 4122 byte order, which `uuid::Uuid` already
//! uses internally, so no per-field swapping is needed here. `Uuid::nil()` is
//! the null-identity sentinel throughout the protocol; presence checks are
//! `!id.is_nil()` rather than an `Option`.

use uuid::Uuid;

use crate::error::CodecResult;
use crate::types::date::ensure;

pub trait UuidExt: Sized {
    /// Folds the 16 bytes into 32 bits by summing the four little-endian u32
    /// chunks (the legacy "LLChecksum" used by inventory CRCs).
    fn crc(&self) -> u32;

    fn write_to(&self, buf: &mut [u8], pos: usize) -> CodecResult<()>;

    fn read_from(buf: &[u8], pos: usize) -> CodecResult<Self>;

    fn random() -> Self;
}

impl UuidExt for Uuid {
    fn crc(&self) -> u32 {
        let b = self.as_bytes();
        let mut sum = 0u32;
        for chunk in b.chunks_exact(4) {
            sum = sum.wrapping_add(u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));
        }
        sum
    }

    fn write_to(&self, buf: &mut [u8], pos: usize) -> CodecResult<()> {
        ensure(buf.len(), pos, 16)?;
        buf[pos..pos + 16].copy_from_slice(self.as_bytes());
        Ok(())
    }

    fn read_from(buf: &[u8], pos: usize) -> CodecResult<Uuid> {
        ensure(buf.len(), pos, 16)?;
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&buf[pos..pos + 16]);
        Ok(Uuid::from_bytes(bytes))
    }

    fn random() -> Uuid {
        Uuid::new_v4()
    }
}
