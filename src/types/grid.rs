//! Grid coordinates: GridVector (region meters) and ParcelID
//!
//! A region handle packs a grid cell's meter coordinates into 64 bits with
//! X in the high half and Y in the low half. Map tiles address regions at
//! power-of-two zoom levels, aligned via `align_to_zoomlevel`.

use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

use byteorder::{ByteOrder, LittleEndian};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValueError;

/// Edge length of one grid cell in meters.
pub const REGION_SIZE: u32 = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridVector {
    pub x: u32,
    pub y: u32,
}

impl GridVector {
    pub const ZERO: GridVector = GridVector { x: 0, y: 0 };

    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Meter coordinates of the grid cell `(grid_x, grid_y)`.
    pub fn from_grid_coord(grid_x: u32, grid_y: u32) -> Self {
        Self {
            x: grid_x * REGION_SIZE,
            y: grid_y * REGION_SIZE,
        }
    }

    pub fn from_region_handle(handle: u64) -> Self {
        Self {
            x: (handle >> 32) as u32,
            y: handle as u32,
        }
    }

    pub fn region_handle(&self) -> u64 {
        ((self.x as u64) << 32) | self.y as u64
    }

    pub fn grid_x(&self) -> u32 {
        self.x / REGION_SIZE
    }

    pub fn grid_y(&self) -> u32 {
        self.y / REGION_SIZE
    }

    /// Rounds down to the map-tile boundary for `zoomlevel` (1-based; each
    /// level doubles the tile edge).
    pub fn align_to_zoomlevel(&self, zoomlevel: u32) -> GridVector {
        let tile = (REGION_SIZE as u64) << (zoomlevel.saturating_sub(1) as u64);
        GridVector {
            x: ((self.x as u64 / tile) * tile) as u32,
            y: ((self.y as u64 / tile) * tile) as u32,
        }
    }

    /// Chebyshev distance in meters, used for neighbor-range checks.
    pub fn distance(&self, other: &GridVector) -> u32 {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        dx.max(dy)
    }
}

impl Add for GridVector {
    type Output = GridVector;
    fn add(self, rhs: GridVector) -> GridVector {
        GridVector::new(self.x.wrapping_add(rhs.x), self.y.wrapping_add(rhs.y))
    }
}

impl Sub for GridVector {
    type Output = GridVector;
    fn sub(self, rhs: GridVector) -> GridVector {
        GridVector::new(self.x.wrapping_sub(rhs.x), self.y.wrapping_sub(rhs.y))
    }
}

impl fmt::Display for GridVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

impl FromStr for GridVector {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fail = || ValueError::ParseFailed {
            target: "GridVector",
            input: s.to_string(),
        };
        let (x, y) = s.split_once(',').ok_or_else(fail)?;
        Ok(GridVector::new(
            x.trim().parse().map_err(|_| fail())?,
            y.trim().parse().map_err(|_| fail())?,
        ))
    }
}

/// Global parcel identifier: region handle plus parcel-local meter offsets,
/// packed into a 16-byte UUID-shaped blob for the remote-parcel capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ParcelID {
    pub region_handle: u64,
    pub x: u32,
    pub y: u32,
}

impl ParcelID {
    pub fn new(region_handle: u64, x: u32, y: u32) -> Self {
        Self { region_handle, x, y }
    }

    pub fn location(&self) -> GridVector {
        GridVector::from_region_handle(self.region_handle)
    }

    pub fn to_uuid(&self) -> Uuid {
        let mut bytes = [0u8; 16];
        LittleEndian::write_u64(&mut bytes[0..8], self.region_handle);
        LittleEndian::write_u32(&mut bytes[8..12], self.x);
        LittleEndian::write_u32(&mut bytes[12..16], self.y);
        Uuid::from_bytes(bytes)
    }

    pub fn from_uuid(id: Uuid) -> Self {
        let bytes = id.as_bytes();
        Self {
            region_handle: LittleEndian::read_u64(&bytes[0..8]),
            x: LittleEndian::read_u32(&bytes[8..12]),
            y: LittleEndian::read_u32(&bytes[12..16]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_handle_split() {
        let v = GridVector::from_region_handle(0x0001_0000_0002_0000);
        assert_eq!(v.x, 0x0001_0000);
        assert_eq!(v.y, 0x0002_0000);
        assert_eq!(v.region_handle(), 0x0001_0000_0002_0000);
    }

    #[test]
    fn test_grid_coords() {
        let v = GridVector::from_grid_coord(1000, 1001);
        assert_eq!(v.x, 256_000);
        assert_eq!(v.grid_x(), 1000);
        assert_eq!(v.grid_y(), 1001);
    }

    #[test]
    fn test_zoomlevel_alignment() {
        let v = GridVector::new(256_000 + 255, 512_000 + 300);
        assert_eq!(v.align_to_zoomlevel(1), GridVector::new(256_000, 512_256));
        // Level 2 tiles are 512m, level 3 tiles 1024m.
        assert_eq!(v.align_to_zoomlevel(2).x % 512, 0);
        assert_eq!(v.align_to_zoomlevel(3).x % 1024, 0);
        assert!(v.align_to_zoomlevel(3).x <= v.x);
    }

    #[test]
    fn test_parse_round_trip() {
        let v = GridVector::new(256_000, 512_000);
        assert_eq!(v.to_string().parse::<GridVector>().unwrap(), v);
        assert!("oops".parse::<GridVector>().is_err());
    }

    #[test]
    fn test_parcel_id_uuid_round_trip() {
        let p = ParcelID::new(0x0001_0000_0002_0000, 128, 192);
        assert_eq!(ParcelID::from_uuid(p.to_uuid()), p);
    }

    #[test]
    fn test_distance() {
        let a = GridVector::new(0, 0);
        let b = GridVector::new(512, 256);
        assert_eq!(a.distance(&b), 512);
    }
}
