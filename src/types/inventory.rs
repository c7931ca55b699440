//! Inventory protocol enums, permission masks and record types
//!
//! Wire values follow the legacy message template: asset/inventory/folder
//! types travel as i8, sale type as u8, permission masks as u32. Unknown
//! incoming values fall back to the `Unknown`/`None` variants instead of
//! failing, matching how live grids tolerate newer asset types.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::id::UuidExt;

/// Odd constant folded into the item checksum for the sale type.
pub const SALE_TYPE_CRC_SALT: u32 = 0x0707_3096;

macro_rules! wire_enum_i8 {
    ($(#[$meta:meta])* $name:ident { $($variant:ident = $value:expr => $label:expr),+ $(,)? } fallback $fallback:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn to_i8(self) -> i8 {
                match self {
                    $($name::$variant => $value),+
                }
            }

            pub fn from_i8(value: i8) -> Self {
                match value {
                    $($value => $name::$variant,)+
                    _ => $name::$fallback,
                }
            }

            /// Lowercase protocol name used in LLSD payloads.
            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }
    };
}

wire_enum_i8! {
    /// Type of the asset an inventory item points at.
    AssetType {
        Unknown = -1 => "unknown",
        Texture = 0 => "texture",
        Sound = 1 => "sound",
        CallingCard = 2 => "callcard",
        Landmark = 3 => "landmark",
        Clothing = 5 => "clothing",
        Object = 6 => "object",
        Notecard = 7 => "notecard",
        Folder = 8 => "folder",
        LslText = 10 => "lsltext",
        LslBytecode = 11 => "lslbyte",
        TextureTga = 12 => "txtr_tga",
        Bodypart = 13 => "bodypart",
        SoundWav = 17 => "snd_wav",
        ImageTga = 18 => "img_tga",
        ImageJpeg = 19 => "jpeg",
        Animation = 20 => "animatn",
        Gesture = 21 => "gesture",
        Simstate = 22 => "simstate",
        Link = 24 => "link",
        LinkFolder = 25 => "link_f",
        Mesh = 49 => "mesh",
        Settings = 56 => "settings",
        Material = 57 => "material",
    }
    fallback Unknown
}

wire_enum_i8! {
    /// Viewer-side classification of an inventory item.
    InventoryType {
        Unknown = -1 => "unknown",
        Texture = 0 => "texture",
        Sound = 1 => "sound",
        CallingCard = 2 => "callcard",
        Landmark = 3 => "landmark",
        Object = 6 => "object",
        Notecard = 7 => "notecard",
        Category = 8 => "category",
        RootCategory = 9 => "root",
        Lsl = 10 => "script",
        Snapshot = 15 => "snapshot",
        Attachment = 17 => "attach",
        Wearable = 18 => "wearable",
        Animation = 19 => "animation",
        Gesture = 20 => "gesture",
        Mesh = 22 => "mesh",
        Settings = 25 => "settings",
        Material = 26 => "material",
    }
    fallback Unknown
}

wire_enum_i8! {
    /// System folder classification; `None` for plain user folders.
    FolderType {
        None = -1 => "-",
        Texture = 0 => "texture",
        Sound = 1 => "sound",
        CallingCard = 2 => "callcard",
        Landmark = 3 => "landmark",
        Clothing = 5 => "clothing",
        Object = 6 => "object",
        Notecard = 7 => "notecard",
        Root = 8 => "root_inv",
        LslText = 10 => "lsltext",
        BodyPart = 13 => "bodypart",
        Trash = 14 => "trash",
        Snapshot = 15 => "snapshot",
        LostAndFound = 16 => "lstndfnd",
        Animation = 20 => "animatn",
        Gesture = 21 => "gesture",
        Favorites = 23 => "favorite",
        CurrentOutfit = 46 => "current",
        Outfit = 47 => "outfit",
        MyOutfits = 48 => "my_otfts",
        Mesh = 49 => "mesh",
        Inbox = 50 => "inbox",
        Outbox = 51 => "outbox",
        BasicRoot = 52 => "basic_rt",
        Settings = 56 => "settings",
        Suitcase = 100 => "suitcase",
    }
    fallback None
}

/// How an object is offered for sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SaleType {
    #[default]
    Not = 0,
    Original = 1,
    Copy = 2,
    Contents = 3,
}

impl SaleType {
    pub const ALL: &'static [SaleType] =
        &[SaleType::Not, SaleType::Original, SaleType::Copy, SaleType::Contents];

    pub fn to_u8(self) -> u8 {
        self as u8
    }

    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => SaleType::Original,
            2 => SaleType::Copy,
            3 => SaleType::Contents,
            _ => SaleType::Not,
        }
    }
}

bitflags! {
    /// Permission masks carried on every inventory item.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct InventoryPermissions: u32 {
        const TRANSFER = 1 << 13;
        const MODIFY = 1 << 14;
        const COPY = 1 << 15;
        const EXPORT = 1 << 16;
        const MOVE = 1 << 19;
        const DAMAGE = 1 << 20;
        const ALL = 0x7FFF_FFFF;
    }
}

impl Default for InventoryPermissions {
    fn default() -> Self {
        InventoryPermissions::ALL
    }
}

/// One inventory item as carried by the UDP inventory messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub item_id: Uuid,
    pub folder_id: Uuid,
    pub creator_id: Uuid,
    pub owner_id: Uuid,
    pub group_id: Uuid,
    pub base_mask: InventoryPermissions,
    pub owner_mask: InventoryPermissions,
    pub group_mask: InventoryPermissions,
    pub everyone_mask: InventoryPermissions,
    pub next_owner_mask: InventoryPermissions,
    pub group_owned: bool,
    pub asset_id: Uuid,
    pub asset_type: AssetType,
    pub inv_type: InventoryType,
    pub flags: u32,
    pub sale_type: SaleType,
    pub sale_price: i32,
    pub name: String,
    pub description: String,
    pub creation_date: i32,
}

impl Default for InventoryItem {
    fn default() -> Self {
        Self {
            item_id: Uuid::nil(),
            folder_id: Uuid::nil(),
            creator_id: Uuid::nil(),
            owner_id: Uuid::nil(),
            group_id: Uuid::nil(),
            base_mask: InventoryPermissions::ALL,
            owner_mask: InventoryPermissions::ALL,
            group_mask: InventoryPermissions::empty(),
            everyone_mask: InventoryPermissions::empty(),
            next_owner_mask: InventoryPermissions::ALL,
            group_owned: false,
            asset_id: Uuid::nil(),
            asset_type: AssetType::Unknown,
            inv_type: InventoryType::Unknown,
            flags: 0,
            sale_type: SaleType::Not,
            sale_price: 0,
            name: String::new(),
            description: String::new(),
            creation_date: 0,
        }
    }
}

impl InventoryItem {
    /// Legacy item CRC written into every item block. The receiving viewer
    /// uses it for cache diagnostics; decode never validates it.
    pub fn checksum(&self) -> u32 {
        let mut crc = self.asset_id.crc();
        crc = crc.wrapping_add(self.folder_id.crc());
        crc = crc.wrapping_add(self.item_id.crc());
        crc = crc.wrapping_add(self.creator_id.crc());
        crc = crc.wrapping_add(self.owner_id.crc());
        crc = crc.wrapping_add(self.group_id.crc());
        crc = crc.wrapping_add(self.owner_mask.bits());
        crc = crc.wrapping_add(self.next_owner_mask.bits());
        crc = crc.wrapping_add(self.everyone_mask.bits());
        crc = crc.wrapping_add(self.group_mask.bits());
        crc = crc.wrapping_add(self.flags);
        crc = crc.wrapping_add(self.inv_type.to_i8() as u32);
        crc = crc.wrapping_add(self.asset_type.to_i8() as u32);
        crc = crc.wrapping_add(self.creation_date as u32);
        crc = crc.wrapping_add(self.sale_price as u32);
        crc = crc.wrapping_add((self.sale_type.to_u8() as u32).wrapping_mul(SALE_TYPE_CRC_SALT));
        crc
    }
}

/// One inventory folder as carried by the UDP inventory messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryFolder {
    pub folder_id: Uuid,
    pub parent_id: Uuid,
    pub folder_type: FolderType,
    pub name: String,
}

impl Default for InventoryFolder {
    fn default() -> Self {
        Self {
            folder_id: Uuid::nil(),
            parent_id: Uuid::nil(),
            folder_type: FolderType::None,
            name: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folder_type_round_trips_all_values() {
        for &ft in FolderType::ALL {
            assert_eq!(FolderType::from_i8(ft.to_i8()), ft);
        }
    }

    #[test]
    fn test_asset_type_fallback() {
        assert_eq!(AssetType::from_i8(99), AssetType::Unknown);
        assert_eq!(AssetType::from_i8(0), AssetType::Texture);
        assert_eq!(AssetType::Mesh.to_i8(), 49);
    }

    #[test]
    fn test_sale_type_round_trip() {
        for &st in SaleType::ALL {
            assert_eq!(SaleType::from_u8(st.to_u8()), st);
        }
        assert_eq!(SaleType::from_u8(200), SaleType::Not);
    }

    #[test]
    fn test_checksum_sensitive_to_sale_type() {
        let mut item = InventoryItem {
            item_id: Uuid::random(),
            asset_id: Uuid::random(),
            ..InventoryItem::default()
        };
        let base = item.checksum();
        item.sale_type = SaleType::Copy;
        assert_eq!(
            item.checksum().wrapping_sub(base),
            2u32.wrapping_mul(SALE_TYPE_CRC_SALT)
        );
    }

    #[test]
    fn test_checksum_of_defaults_is_mask_sum() {
        let item = InventoryItem::default();
        // All-nil UUIDs contribute nothing; the masks and type bytes remain.
        let expected = InventoryPermissions::ALL
            .bits()
            .wrapping_mul(2)
            .wrapping_add((-1i8) as u32) // inv_type
            .wrapping_add((-1i8) as u32); // asset_type
        assert_eq!(item.checksum(), expected);
    }
}
