//! Color types with [0,1] double components and byte-scaled wire accessors

use serde::{Deserialize, Serialize};

use crate::error::CodecResult;
use crate::types::date::ensure;

fn clamp01(v: f64) -> f64 {
    v.clamp(0.0, 1.0)
}

fn to_byte(v: f64) -> u8 {
    (clamp01(v) * 255.0).round() as u8
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub const BLACK: Color = Color { r: 0.0, g: 0.0, b: 0.0 };
    pub const WHITE: Color = Color { r: 1.0, g: 1.0, b: 1.0 };

    /// Components are clamped to [0,1] on construction.
    pub fn new(r: f64, g: f64, b: f64) -> Self {
        Self {
            r: clamp01(r),
            g: clamp01(g),
            b: clamp01(b),
        }
    }

    pub fn from_bytes_rgb(buf: &[u8], pos: usize) -> CodecResult<Self> {
        ensure(buf.len(), pos, 3)?;
        Ok(Self::new(
            buf[pos] as f64 / 255.0,
            buf[pos + 1] as f64 / 255.0,
            buf[pos + 2] as f64 / 255.0,
        ))
    }

    pub fn to_bytes_rgb(&self, buf: &mut [u8], pos: usize) -> CodecResult<()> {
        ensure(buf.len(), pos, 3)?;
        buf[pos] = self.r_byte();
        buf[pos + 1] = self.g_byte();
        buf[pos + 2] = self.b_byte();
        Ok(())
    }

    pub fn r_byte(&self) -> u8 {
        to_byte(self.r)
    }

    pub fn g_byte(&self) -> u8 {
        to_byte(self.g)
    }

    pub fn b_byte(&self) -> u8 {
        to_byte(self.b)
    }

    pub fn lerp(&self, other: &Color, t: f64) -> Color {
        Color::new(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorAlpha {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Default for ColorAlpha {
    fn default() -> Self {
        ColorAlpha { r: 0.0, g: 0.0, b: 0.0, a: 1.0 }
    }
}

impl ColorAlpha {
    pub const WHITE: ColorAlpha = ColorAlpha { r: 1.0, g: 1.0, b: 1.0, a: 1.0 };

    pub fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self {
            r: clamp01(r),
            g: clamp01(g),
            b: clamp01(b),
            a: clamp01(a),
        }
    }

    pub fn from_color(c: Color, a: f64) -> Self {
        Self::new(c.r, c.g, c.b, a)
    }

    pub fn color(&self) -> Color {
        Color::new(self.r, self.g, self.b)
    }

    pub fn from_bytes_rgba(buf: &[u8], pos: usize) -> CodecResult<Self> {
        ensure(buf.len(), pos, 4)?;
        Ok(Self::new(
            buf[pos] as f64 / 255.0,
            buf[pos + 1] as f64 / 255.0,
            buf[pos + 2] as f64 / 255.0,
            buf[pos + 3] as f64 / 255.0,
        ))
    }

    pub fn to_bytes_rgba(&self, buf: &mut [u8], pos: usize) -> CodecResult<()> {
        ensure(buf.len(), pos, 4)?;
        buf[pos] = to_byte(self.r);
        buf[pos + 1] = to_byte(self.g);
        buf[pos + 2] = to_byte(self.b);
        buf[pos + 3] = to_byte(self.a);
        Ok(())
    }

    pub fn a_byte(&self) -> u8 {
        to_byte(self.a)
    }

    pub fn lerp(&self, other: &ColorAlpha, t: f64) -> ColorAlpha {
        ColorAlpha::new(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
            self.a + (other.a - self.a) * t,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamped_on_construction() {
        let c = Color::new(1.5, -0.25, 0.5);
        assert_eq!(c.r, 1.0);
        assert_eq!(c.g, 0.0);
        assert_eq!(c.b, 0.5);
    }

    #[test]
    fn test_byte_scaling() {
        assert_eq!(Color::WHITE.r_byte(), 255);
        assert_eq!(Color::BLACK.r_byte(), 0);
        assert_eq!(Color::new(0.5, 0.0, 0.0).r_byte(), 128);
    }

    #[test]
    fn test_rgba_wire_round_trip() {
        let c = ColorAlpha::new(0.25, 0.5, 0.75, 1.0);
        let mut buf = [0u8; 4];
        c.to_bytes_rgba(&mut buf, 0).unwrap();
        let back = ColorAlpha::from_bytes_rgba(&buf, 0).unwrap();
        assert!((back.r - c.r).abs() < 1.0 / 255.0);
        assert!((back.a - c.a).abs() < 1.0 / 255.0);
    }

    #[test]
    fn test_lerp_endpoints() {
        let a = Color::BLACK;
        let b = Color::WHITE;
        assert_eq!(a.lerp(&b, 0.0), a);
        assert_eq!(a.lerp(&b, 1.0), b);
    }
}
