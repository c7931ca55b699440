//! Bit-level packer for compact binary fields
//!
//! Used by terrain patches and texture-parameter blocks whose layouts are
//! defined down to the bit. The cursor is bit-granular; bits are emitted
//! MSB-first within each output byte regardless of host endianness.
//!
//! Multi-byte primitives go through two steps: the value is first lowered to
//! its little-endian byte representation, then each of those bytes has its
//! significant low bits emitted MSB-first. Both steps are wire-mandated;
//! changing either silently corrupts terrain and texture-entry data.

use crate::error::{CodecError, CodecResult};

/// Widest single pack/unpack operation in bits.
const MAX_BITS: usize = 32;

#[derive(Debug, Clone, Default)]
pub struct BitPacker {
    data: Vec<u8>,
    /// Cursor in bits; shared by pack and unpack.
    bit_pos: usize,
    /// High-water mark of written bits.
    bit_length: usize,
}

impl BitPacker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            data: Vec::with_capacity(bytes),
            bit_pos: 0,
            bit_length: 0,
        }
    }

    /// Wraps an existing buffer for unpacking, cursor at the start.
    pub fn from_bytes(data: Vec<u8>) -> Self {
        let bit_length = data.len() * 8;
        Self {
            data,
            bit_pos: 0,
            bit_length,
        }
    }

    /// Total bits written (or wrapped).
    pub fn bit_length(&self) -> usize {
        self.bit_length
    }

    pub fn bit_pos(&self) -> usize {
        self.bit_pos
    }

    pub fn is_byte_aligned(&self) -> bool {
        self.bit_pos % 8 == 0
    }

    /// Rewinds the cursor to the start, e.g. to unpack what was just packed.
    pub fn reset(&mut self) {
        self.bit_pos = 0;
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    fn push_bit(&mut self, set: bool) {
        let byte_index = self.bit_pos / 8;
        if byte_index >= self.data.len() {
            self.data.push(0);
        }
        if set {
            self.data[byte_index] |= 0x80 >> (self.bit_pos % 8);
        }
        self.bit_pos += 1;
        if self.bit_pos > self.bit_length {
            self.bit_length = self.bit_pos;
        }
    }

    fn pull_bit(&mut self) -> CodecResult<bool> {
        if self.bit_pos >= self.bit_length {
            return Err(CodecError::ShortBuffer {
                needed: 1,
                offset: self.bit_pos,
                remaining: 0,
            });
        }
        let byte_index = self.bit_pos / 8;
        let set = self.data[byte_index] & (0x80 >> (self.bit_pos % 8)) != 0;
        self.bit_pos += 1;
        Ok(set)
    }

    /// Packs the low `count` bits of `value`. The value is lowered to
    /// little-endian bytes; each byte contributes its significant low bits
    /// MSB-first.
    pub fn pack_bits(&mut self, value: u32, count: usize) -> CodecResult<()> {
        if count == 0 || count > MAX_BITS {
            return Err(CodecError::BitWidth { width: count });
        }
        let bytes = value.to_le_bytes();
        let mut remaining = count;
        for byte in bytes {
            let chunk = remaining.min(8);
            for i in (0..chunk).rev() {
                self.push_bit(byte & (1 << i) != 0);
            }
            remaining -= chunk;
            if remaining == 0 {
                break;
            }
        }
        Ok(())
    }

    pub fn pack_bits_signed(&mut self, value: i32, count: usize) -> CodecResult<()> {
        self.pack_bits(value as u32, count)
    }

    pub fn pack_byte(&mut self, value: u8) -> CodecResult<()> {
        self.pack_bits(value as u32, 8)
    }

    /// Packs a full 32-bit float through its little-endian byte form.
    pub fn pack_float(&mut self, value: f32) -> CodecResult<()> {
        self.pack_bits(value.to_bits(), 32)
    }

    /// Unpacks `count` bits written by `pack_bits`.
    pub fn unpack_unsigned_bits(&mut self, count: usize) -> CodecResult<u32> {
        if count == 0 || count > MAX_BITS {
            return Err(CodecError::BitWidth { width: count });
        }
        let mut bytes = [0u8; 4];
        let mut remaining = count;
        for byte in bytes.iter_mut() {
            let chunk = remaining.min(8);
            for i in (0..chunk).rev() {
                if self.pull_bit()? {
                    *byte |= 1 << i;
                }
            }
            remaining -= chunk;
            if remaining == 0 {
                break;
            }
        }
        Ok(u32::from_le_bytes(bytes))
    }

    /// Unpacks `count` bits and sign-extends from bit `count - 1`.
    pub fn unpack_signed_bits(&mut self, count: usize) -> CodecResult<i32> {
        let raw = self.unpack_unsigned_bits(count)?;
        if count < 32 && raw & (1 << (count - 1)) != 0 {
            Ok((raw | (u32::MAX << count)) as i32)
        } else {
            Ok(raw as i32)
        }
    }

    pub fn unpack_float(&mut self) -> CodecResult<f32> {
        Ok(f32::from_bits(self.unpack_unsigned_bits(32)?))
    }

    /// Fixed-point quantization: clamp into the representable range, offset
    /// signed values into the unsigned domain, scale by the fractional width
    /// and pack as the smallest of 8/16/32 bits that fits.
    pub fn pack_fixed(
        &mut self,
        value: f32,
        is_signed: bool,
        int_bits: usize,
        frac_bits: usize,
    ) -> CodecResult<()> {
        let unsigned_bits = int_bits + frac_bits;
        let total_bits = unsigned_bits + usize::from(is_signed);
        if total_bits > 31 {
            return Err(CodecError::BitWidth { width: total_bits });
        }
        let max = (1u32 << int_bits) as f32;
        let min = if is_signed { -max } else { 0.0 };
        let mut fixed = value.clamp(min, max);
        if is_signed {
            fixed += max;
        }
        fixed *= (1u32 << frac_bits) as f32;
        let width = if total_bits <= 8 {
            8
        } else if total_bits <= 16 {
            16
        } else {
            32
        };
        self.pack_bits(fixed as u32, width)
    }

    pub fn unpack_fixed(
        &mut self,
        is_signed: bool,
        int_bits: usize,
        frac_bits: usize,
    ) -> CodecResult<f32> {
        let unsigned_bits = int_bits + frac_bits;
        let total_bits = unsigned_bits + usize::from(is_signed);
        if total_bits > 31 {
            return Err(CodecError::BitWidth { width: total_bits });
        }
        let width = if total_bits <= 8 {
            8
        } else if total_bits <= 16 {
            16
        } else {
            32
        };
        let mut fixed = self.unpack_unsigned_bits(width)? as f32;
        fixed /= (1u32 << frac_bits) as f32;
        if is_signed {
            fixed -= (1u32 << int_bits) as f32;
        }
        Ok(fixed)
    }

    fn require_aligned(&self) -> CodecResult<()> {
        if !self.is_byte_aligned() {
            return Err(CodecError::BitAlignment { bit: self.bit_pos });
        }
        Ok(())
    }

    /// Byte-aligned raw append; fails on a misaligned cursor.
    pub fn pack_bytes(&mut self, bytes: &[u8]) -> CodecResult<()> {
        self.require_aligned()?;
        let byte_pos = self.bit_pos / 8;
        let end = byte_pos + bytes.len();
        if self.data.len() < end {
            self.data.resize(end, 0);
        }
        self.data[byte_pos..end].copy_from_slice(bytes);
        self.bit_pos += bytes.len() * 8;
        self.bit_length = self.bit_length.max(self.bit_pos);
        Ok(())
    }

    pub fn pack_uuid(&mut self, id: uuid::Uuid) -> CodecResult<()> {
        self.pack_bytes(id.as_bytes())
    }

    pub fn pack_string(&mut self, s: &str) -> CodecResult<()> {
        self.pack_bytes(s.as_bytes())
    }

    /// Copies exactly the source packer's written bit length, not a full
    /// byte multiple.
    pub fn pack_from(&mut self, src: &BitPacker) -> CodecResult<()> {
        for bit in 0..src.bit_length {
            let set = src.data[bit / 8] & (0x80 >> (bit % 8)) != 0;
            self.push_bit(set);
        }
        Ok(())
    }

    pub fn unpack_bytes(&mut self, len: usize) -> CodecResult<Vec<u8>> {
        self.require_aligned()?;
        let byte_pos = self.bit_pos / 8;
        let available = self.bit_length / 8;
        if byte_pos + len > available {
            return Err(CodecError::ShortBuffer {
                needed: len,
                offset: byte_pos,
                remaining: available.saturating_sub(byte_pos),
            });
        }
        let out = self.data[byte_pos..byte_pos + len].to_vec();
        self.bit_pos += len * 8;
        Ok(out)
    }

    pub fn unpack_uuid(&mut self) -> CodecResult<uuid::Uuid> {
        let bytes = self.unpack_bytes(16)?;
        let mut arr = [0u8; 16];
        arr.copy_from_slice(&bytes);
        Ok(uuid::Uuid::from_bytes(arr))
    }
}
