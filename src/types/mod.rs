//! Protocol data types
//!
//! These types provide exact binary compatibility with the legacy simulator
//! protocol while leveraging Rust's type system for safety.

pub mod agent;
pub mod color;
pub mod containers;
pub mod date;
pub mod grid;
pub mod id;
pub mod inventory;
pub mod math;
pub mod value;

pub use agent::{Uei, Ugi, Ugui};
pub use color::{Color, ColorAlpha};
pub use containers::{FromValue, MarkCursor, ValueArray, ValueMap};
pub use date::Date;
pub use grid::{GridVector, ParcelID, REGION_SIZE};
pub use id::UuidExt;
pub use inventory::{
    AssetType, FolderType, InventoryFolder, InventoryItem, InventoryPermissions, InventoryType,
    SaleType, SALE_TYPE_CRC_SALT,
};
pub use math::{Quaternion, Vector3, Vector4};
pub use value::{LslType, Value, ValueType};
