//! Geometric wire types: Vector3, Vector4, Quaternion
//!
//! Components are f64 in memory; the wire form is always little-endian f32,
//! matching legacy simulator traffic. Quaternions additionally carry a
//! 12-byte normalized encoding that drops W and reconstructs it from the
//! unit-quaternion constraint on decode.

use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};
use std::str::FromStr;

use byteorder::{ByteOrder, LittleEndian};
use serde::{Deserialize, Serialize};

use crate::error::{CodecError, CodecResult, ValueError};
use crate::types::date::ensure;

/// Squared-norm threshold below which a quaternion cannot be normalized.
const DEGENERATE_EPSILON: f64 = 1.0e-12;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub const ZERO: Vector3 = Vector3 { x: 0.0, y: 0.0, z: 0.0 };
    pub const UNIT_X: Vector3 = Vector3 { x: 1.0, y: 0.0, z: 0.0 };
    pub const UNIT_Y: Vector3 = Vector3 { x: 0.0, y: 1.0, z: 0.0 };
    pub const UNIT_Z: Vector3 = Vector3 { x: 0.0, y: 0.0, z: 1.0 };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn length_squared(&self) -> f64 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    pub fn length(&self) -> f64 {
        self.length_squared().sqrt()
    }

    pub fn dot(&self, other: &Vector3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(&self, other: &Vector3) -> Vector3 {
        Vector3 {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    /// Unit vector in the same direction; the zero vector stays zero.
    pub fn normalized(&self) -> Vector3 {
        let len_sq = self.length_squared();
        if len_sq < DEGENERATE_EPSILON {
            return Vector3::ZERO;
        }
        *self / len_sq.sqrt()
    }

    pub fn lerp(&self, other: &Vector3, t: f64) -> Vector3 {
        *self + (*other - *self) * t
    }

    /// Writes the 12-byte wire form (3 x little-endian f32) at `pos`.
    pub fn to_bytes(&self, buf: &mut [u8], pos: usize) -> CodecResult<()> {
        ensure(buf.len(), pos, 12)?;
        LittleEndian::write_f32(&mut buf[pos..], self.x as f32);
        LittleEndian::write_f32(&mut buf[pos + 4..], self.y as f32);
        LittleEndian::write_f32(&mut buf[pos + 8..], self.z as f32);
        Ok(())
    }

    pub fn from_bytes(buf: &[u8], pos: usize) -> CodecResult<Self> {
        ensure(buf.len(), pos, 12)?;
        Ok(Vector3 {
            x: LittleEndian::read_f32(&buf[pos..]) as f64,
            y: LittleEndian::read_f32(&buf[pos + 4..]) as f64,
            z: LittleEndian::read_f32(&buf[pos + 8..]) as f64,
        })
    }
}

impl Add for Vector3 {
    type Output = Vector3;
    fn add(self, rhs: Vector3) -> Vector3 {
        Vector3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vector3 {
    type Output = Vector3;
    fn sub(self, rhs: Vector3) -> Vector3 {
        Vector3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Neg for Vector3 {
    type Output = Vector3;
    fn neg(self) -> Vector3 {
        Vector3::new(-self.x, -self.y, -self.z)
    }
}

impl Mul<f64> for Vector3 {
    type Output = Vector3;
    fn mul(self, rhs: f64) -> Vector3 {
        Vector3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Div<f64> for Vector3 {
    type Output = Vector3;
    fn div(self, rhs: f64) -> Vector3 {
        Vector3::new(self.x / rhs, self.y / rhs, self.z / rhs)
    }
}

impl fmt::Display for Vector3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}, {}, {}>", self.x, self.y, self.z)
    }
}

impl FromStr for Vector3 {
    type Err = ValueError;

    /// Parses the scripting text form `<x, y, z>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = parse_angle_list(s, 3).ok_or_else(|| ValueError::ParseFailed {
            target: "Vector3",
            input: s.to_string(),
        })?;
        Ok(Vector3::new(parts[0], parts[1], parts[2]))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector4 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Vector4 {
    pub const ZERO: Vector4 = Vector4 { x: 0.0, y: 0.0, z: 0.0, w: 0.0 };

    pub fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    /// Writes the 16-byte wire form (4 x little-endian f32) at `pos`.
    pub fn to_bytes(&self, buf: &mut [u8], pos: usize) -> CodecResult<()> {
        ensure(buf.len(), pos, 16)?;
        LittleEndian::write_f32(&mut buf[pos..], self.x as f32);
        LittleEndian::write_f32(&mut buf[pos + 4..], self.y as f32);
        LittleEndian::write_f32(&mut buf[pos + 8..], self.z as f32);
        LittleEndian::write_f32(&mut buf[pos + 12..], self.w as f32);
        Ok(())
    }

    pub fn from_bytes(buf: &[u8], pos: usize) -> CodecResult<Self> {
        ensure(buf.len(), pos, 16)?;
        Ok(Vector4 {
            x: LittleEndian::read_f32(&buf[pos..]) as f64,
            y: LittleEndian::read_f32(&buf[pos + 4..]) as f64,
            z: LittleEndian::read_f32(&buf[pos + 8..]) as f64,
            w: LittleEndian::read_f32(&buf[pos + 12..]) as f64,
        })
    }
}

impl fmt::Display for Vector4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}, {}, {}, {}>", self.x, self.y, self.z, self.w)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quaternion {
    pub const IDENTITY: Quaternion = Quaternion { x: 0.0, y: 0.0, z: 0.0, w: 1.0 };

    pub fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    pub fn from_axis_angle(axis: Vector3, angle: f64) -> Self {
        let axis = axis.normalized();
        let half = angle * 0.5;
        let s = half.sin();
        Quaternion {
            x: axis.x * s,
            y: axis.y * s,
            z: axis.z * s,
            w: half.cos(),
        }
    }

    pub fn length_squared(&self) -> f64 {
        self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w
    }

    pub fn length(&self) -> f64 {
        self.length_squared().sqrt()
    }

    pub fn conjugate(&self) -> Quaternion {
        Quaternion::new(-self.x, -self.y, -self.z, self.w)
    }

    /// Fails on a degenerate (near-zero) quaternion; the wire encoding
    /// depends on a valid unit quaternion existing.
    pub fn normalized(&self) -> CodecResult<Quaternion> {
        let norm_sq = self.length_squared();
        if norm_sq < DEGENERATE_EPSILON {
            return Err(CodecError::DegenerateQuaternion { norm_sq });
        }
        let inv = 1.0 / norm_sq.sqrt();
        Ok(Quaternion::new(
            self.x * inv,
            self.y * inv,
            self.z * inv,
            self.w * inv,
        ))
    }

    /// 12-byte wire form: normalize, flip into the positive-W hemisphere,
    /// then write X/Y/Z as little-endian f32. W is reconstructed on decode.
    pub fn to_bytes_normalized(&self, buf: &mut [u8], pos: usize) -> CodecResult<()> {
        ensure(buf.len(), pos, 12)?;
        let mut q = self.normalized()?;
        if q.w < 0.0 {
            q = Quaternion::new(-q.x, -q.y, -q.z, -q.w);
        }
        LittleEndian::write_f32(&mut buf[pos..], q.x as f32);
        LittleEndian::write_f32(&mut buf[pos + 4..], q.y as f32);
        LittleEndian::write_f32(&mut buf[pos + 8..], q.z as f32);
        Ok(())
    }

    /// 16-byte wire form with all four components, no normalization.
    pub fn to_bytes(&self, buf: &mut [u8], pos: usize) -> CodecResult<()> {
        ensure(buf.len(), pos, 16)?;
        LittleEndian::write_f32(&mut buf[pos..], self.x as f32);
        LittleEndian::write_f32(&mut buf[pos + 4..], self.y as f32);
        LittleEndian::write_f32(&mut buf[pos + 8..], self.z as f32);
        LittleEndian::write_f32(&mut buf[pos + 12..], self.w as f32);
        Ok(())
    }

    /// The caller selects the encoding via `normalized`; it is never inferred
    /// from the buffer length. `normalized` reads 12 bytes and reconstructs
    /// W as `sqrt(max(0, 1 - x^2 - y^2 - z^2))`, otherwise 16 bytes are read.
    pub fn from_bytes(buf: &[u8], pos: usize, normalized: bool) -> CodecResult<Self> {
        if normalized {
            ensure(buf.len(), pos, 12)?;
            let x = LittleEndian::read_f32(&buf[pos..]) as f64;
            let y = LittleEndian::read_f32(&buf[pos + 4..]) as f64;
            let z = LittleEndian::read_f32(&buf[pos + 8..]) as f64;
            let w = (1.0 - x * x - y * y - z * z).max(0.0).sqrt();
            Ok(Quaternion::new(x, y, z, w))
        } else {
            ensure(buf.len(), pos, 16)?;
            Ok(Quaternion::new(
                LittleEndian::read_f32(&buf[pos..]) as f64,
                LittleEndian::read_f32(&buf[pos + 4..]) as f64,
                LittleEndian::read_f32(&buf[pos + 8..]) as f64,
                LittleEndian::read_f32(&buf[pos + 12..]) as f64,
            ))
        }
    }
}

impl Mul for Quaternion {
    type Output = Quaternion;
    fn mul(self, r: Quaternion) -> Quaternion {
        Quaternion {
            x: self.w * r.x + self.x * r.w + self.y * r.z - self.z * r.y,
            y: self.w * r.y - self.x * r.z + self.y * r.w + self.z * r.x,
            z: self.w * r.z + self.x * r.y - self.y * r.x + self.z * r.w,
            w: self.w * r.w - self.x * r.x - self.y * r.y - self.z * r.z,
        }
    }
}

impl fmt::Display for Quaternion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}, {}, {}, {}>", self.x, self.y, self.z, self.w)
    }
}

impl FromStr for Quaternion {
    type Err = ValueError;

    /// Parses the scripting text form `<x, y, z, w>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = parse_angle_list(s, 4).ok_or_else(|| ValueError::ParseFailed {
            target: "Quaternion",
            input: s.to_string(),
        })?;
        Ok(Quaternion::new(parts[0], parts[1], parts[2], parts[3]))
    }
}

/// Parses `<a, b, ...>` with exactly `expected` comma-separated components.
fn parse_angle_list(s: &str, expected: usize) -> Option<Vec<f64>> {
    let inner = s.trim().strip_prefix('<')?.strip_suffix('>')?;
    let parts: Option<Vec<f64>> = inner.split(',').map(|p| p.trim().parse().ok()).collect();
    let parts = parts?;
    (parts.len() == expected).then_some(parts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector3_wire_round_trip() {
        let v = Vector3::new(128.5, -3.25, 4096.0);
        let mut buf = [0u8; 12];
        v.to_bytes(&mut buf, 0).unwrap();
        assert_eq!(Vector3::from_bytes(&buf, 0).unwrap(), v);
    }

    #[test]
    fn test_vector3_wire_is_little_endian_f32() {
        let v = Vector3::new(1.0, 0.0, 0.0);
        let mut buf = [0u8; 12];
        v.to_bytes(&mut buf, 0).unwrap();
        assert_eq!(&buf[0..4], &1.0f32.to_le_bytes());
    }

    #[test]
    fn test_vector3_parse_round_trip() {
        let v = Vector3::new(1.5, -2.0, 0.25);
        let parsed: Vector3 = v.to_string().parse().unwrap();
        assert_eq!(parsed, v);
        assert!("<1, 2>".parse::<Vector3>().is_err());
        assert!("1, 2, 3".parse::<Vector3>().is_err());
    }

    #[test]
    fn test_quaternion_normalized_round_trip() {
        let q = Quaternion::from_axis_angle(Vector3::new(0.3, -0.2, 0.9), 1.1);
        let mut buf = [0u8; 12];
        q.to_bytes_normalized(&mut buf, 0).unwrap();
        let decoded = Quaternion::from_bytes(&buf, 0, true).unwrap();
        assert!((decoded.x - q.x).abs() < 1e-6);
        assert!((decoded.y - q.y).abs() < 1e-6);
        assert!((decoded.z - q.z).abs() < 1e-6);
        assert!((decoded.w - q.w).abs() < 1e-6);
    }

    #[test]
    fn test_quaternion_negative_w_canonicalized() {
        let q = Quaternion::from_axis_angle(Vector3::UNIT_Z, 0.8);
        let flipped = Quaternion::new(-q.x, -q.y, -q.z, -q.w);
        let mut buf = [0u8; 12];
        flipped.to_bytes_normalized(&mut buf, 0).unwrap();
        let decoded = Quaternion::from_bytes(&buf, 0, true).unwrap();
        // The decoded value is the positive-W representative, i.e. -flipped.
        assert!((decoded.x - q.x).abs() < 1e-6);
        assert!((decoded.w - q.w).abs() < 1e-6);
        assert!(decoded.w >= 0.0);
    }

    #[test]
    fn test_quaternion_degenerate_rejected() {
        let q = Quaternion::new(0.0, 0.0, 0.0, 0.0);
        let mut buf = [0u8; 12];
        assert!(matches!(
            q.to_bytes_normalized(&mut buf, 0),
            Err(CodecError::DegenerateQuaternion { .. })
        ));
    }

    #[test]
    fn test_quaternion_unnormalized_round_trip() {
        let q = Quaternion::new(0.5, -0.25, 0.125, -2.0);
        let mut buf = [0u8; 16];
        q.to_bytes(&mut buf, 0).unwrap();
        assert_eq!(Quaternion::from_bytes(&buf, 0, false).unwrap(), q);
    }

    #[test]
    fn test_vector_arithmetic() {
        let a = Vector3::new(1.0, 2.0, 3.0);
        let b = Vector3::new(-1.0, 0.5, 2.0);
        assert_eq!(a + b, Vector3::new(0.0, 2.5, 5.0));
        assert_eq!(a.dot(&b), 6.0);
        assert_eq!(Vector3::UNIT_X.cross(&Vector3::UNIT_Y), Vector3::UNIT_Z);
        assert_eq!(Vector3::ZERO.normalized(), Vector3::ZERO);
    }

    #[test]
    fn test_vector4_wire_round_trip() {
        let v = Vector4::new(1.0, 2.0, -3.0, 0.5);
        let mut buf = [0u8; 16];
        v.to_bytes(&mut buf, 0).unwrap();
        assert_eq!(Vector4::from_bytes(&buf, 0).unwrap(), v);
    }
}
