//! Inventory message family (Low frequency)
//!
//! Field order and widths in every `serialize`/`decode` pair follow the
//! legacy message template byte for byte. Item blocks end with the legacy
//! CRC, which is written on encode and consumed-but-ignored on decode.
//! `UpdateCreateInventoryItem` and `BulkUpdateInventory` also have
//! event-queue forms where u32 fields travel as big-endian binary blobs.

use uuid::Uuid;

use crate::error::CodecResult;
use crate::messages::buffer::{PacketReader, PacketWriter};
use crate::messages::eqg::{encode_u32_to_binary, envelope};
use crate::messages::{Message, MessageType};
use crate::types::{
    AssetType, FolderType, InventoryFolder, InventoryItem, InventoryPermissions, InventoryType,
    SaleType, Value, ValueArray, ValueMap,
};

/// An inventory item plus the callback handle the viewer attached to the
/// request that produced it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ItemBlock {
    pub callback_id: u32,
    pub item: InventoryItem,
}

/// Writes the shared trailing fields of an item block: creator through
/// creation date, then the CRC.
fn write_item_tail(writer: &mut PacketWriter, item: &InventoryItem) -> CodecResult<()> {
    writer.write_uuid(item.creator_id);
    writer.write_uuid(item.owner_id);
    writer.write_uuid(item.group_id);
    writer.write_u32(item.base_mask.bits());
    writer.write_u32(item.owner_mask.bits());
    writer.write_u32(item.group_mask.bits());
    writer.write_u32(item.everyone_mask.bits());
    writer.write_u32(item.next_owner_mask.bits());
    writer.write_bool(item.group_owned);
    writer.write_uuid(item.asset_id);
    writer.write_i8(item.asset_type.to_i8());
    writer.write_i8(item.inv_type.to_i8());
    writer.write_u32(item.flags);
    writer.write_u8(item.sale_type.to_u8());
    writer.write_i32(item.sale_price);
    writer.write_string8(&item.name)?;
    writer.write_string8(&item.description)?;
    writer.write_i32(item.creation_date);
    writer.write_u32(item.checksum());
    Ok(())
}

fn read_item_tail(reader: &mut PacketReader, item: &mut InventoryItem) -> CodecResult<()> {
    item.creator_id = reader.read_uuid()?;
    item.owner_id = reader.read_uuid()?;
    item.group_id = reader.read_uuid()?;
    item.base_mask = InventoryPermissions::from_bits_retain(reader.read_u32()?);
    item.owner_mask = InventoryPermissions::from_bits_retain(reader.read_u32()?);
    item.group_mask = InventoryPermissions::from_bits_retain(reader.read_u32()?);
    item.everyone_mask = InventoryPermissions::from_bits_retain(reader.read_u32()?);
    item.next_owner_mask = InventoryPermissions::from_bits_retain(reader.read_u32()?);
    item.group_owned = reader.read_bool()?;
    item.asset_id = reader.read_uuid()?;
    item.asset_type = AssetType::from_i8(reader.read_i8()?);
    item.inv_type = InventoryType::from_i8(reader.read_i8()?);
    item.flags = reader.read_u32()?;
    item.sale_type = SaleType::from_u8(reader.read_u8()?);
    item.sale_price = reader.read_i32()?;
    item.name = reader.read_string8()?;
    item.description = reader.read_string8()?;
    item.creation_date = reader.read_i32()?;
    // Legacy CRC. Consumed, never validated.
    let _crc = reader.read_u32()?;
    Ok(())
}

fn write_folder_block(writer: &mut PacketWriter, folder: &InventoryFolder) -> CodecResult<()> {
    writer.write_uuid(folder.folder_id);
    writer.write_uuid(folder.parent_id);
    writer.write_i8(folder.folder_type.to_i8());
    writer.write_string8(&folder.name)
}

fn read_folder_block(reader: &mut PacketReader) -> CodecResult<InventoryFolder> {
    Ok(InventoryFolder {
        folder_id: reader.read_uuid()?,
        parent_id: reader.read_uuid()?,
        folder_type: FolderType::from_i8(reader.read_i8()?),
        name: reader.read_string8()?,
    })
}

/// The shared trailing keys of an item block in event-queue form. Masks,
/// flags and the CRC travel as big-endian binary blobs.
fn item_tail_eqg(map: &mut ValueMap, item: &InventoryItem) {
    map.insert("CreatorID", item.creator_id);
    map.insert("OwnerID", item.owner_id);
    map.insert("GroupID", item.group_id);
    map.insert("BaseMask", encode_u32_to_binary(item.base_mask.bits()));
    map.insert("OwnerMask", encode_u32_to_binary(item.owner_mask.bits()));
    map.insert("GroupMask", encode_u32_to_binary(item.group_mask.bits()));
    map.insert(
        "EveryoneMask",
        encode_u32_to_binary(item.everyone_mask.bits()),
    );
    map.insert(
        "NextOwnerMask",
        encode_u32_to_binary(item.next_owner_mask.bits()),
    );
    map.insert("GroupOwned", item.group_owned);
    map.insert("AssetID", item.asset_id);
    map.insert("Type", item.asset_type.to_i8() as i32);
    map.insert("InvType", item.inv_type.to_i8() as i32);
    map.insert("Flags", encode_u32_to_binary(item.flags));
    map.insert("SaleType", item.sale_type.to_u8() as i32);
    map.insert("SalePrice", item.sale_price);
    map.insert("Name", item.name.as_str());
    map.insert("Description", item.description.as_str());
    map.insert("CreationDate", item.creation_date);
    map.insert("CRC", encode_u32_to_binary(item.checksum()));
}

/// Pushes a newly created or updated item to the viewer (267).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UpdateCreateInventoryItem {
    pub agent_id: Uuid,
    pub sim_approved: bool,
    pub transaction_id: Uuid,
    pub items: Vec<ItemBlock>,
}

impl Message for UpdateCreateInventoryItem {
    const TYPE: MessageType = MessageType::UpdateCreateInventoryItem;

    fn serialize(&self, writer: &mut PacketWriter) -> CodecResult<()> {
        writer.write_uuid(self.agent_id);
        writer.write_bool(self.sim_approved);
        writer.write_uuid(self.transaction_id);
        writer.write_count(self.items.len())?;
        for block in &self.items {
            writer.write_uuid(block.item.item_id);
            writer.write_uuid(block.item.folder_id);
            writer.write_u32(block.callback_id);
            write_item_tail(writer, &block.item)?;
        }
        Ok(())
    }

    fn decode(reader: &mut PacketReader) -> CodecResult<Self> {
        let agent_id = reader.read_uuid()?;
        let sim_approved = reader.read_bool()?;
        let transaction_id = reader.read_uuid()?;
        let count = reader.read_u8()? as usize;
        let mut items = Vec::with_capacity(count);
        for _ in 0..count {
            let mut item = InventoryItem {
                item_id: reader.read_uuid()?,
                folder_id: reader.read_uuid()?,
                ..InventoryItem::default()
            };
            let callback_id = reader.read_u32()?;
            read_item_tail(reader, &mut item)?;
            items.push(ItemBlock { callback_id, item });
        }
        Ok(Self {
            agent_id,
            sim_approved,
            transaction_id,
            items,
        })
    }

    fn serialize_eqg(&self) -> Option<Value> {
        let mut agent = ValueMap::new();
        agent.insert("AgentID", self.agent_id);
        agent.insert("SimApproved", self.sim_approved);
        agent.insert("TransactionID", self.transaction_id);
        let mut agent_data = ValueArray::new();
        agent_data.push(agent);

        let mut inventory_data = ValueArray::new();
        for block in &self.items {
            let mut entry = ValueMap::new();
            entry.insert("ItemID", block.item.item_id);
            entry.insert("FolderID", block.item.folder_id);
            entry.insert("CallbackID", encode_u32_to_binary(block.callback_id));
            item_tail_eqg(&mut entry, &block.item);
            inventory_data.push(entry);
        }

        let mut body = ValueMap::new();
        body.insert("AgentData", agent_data);
        body.insert("InventoryData", inventory_data);
        Some(envelope("UpdateCreateInventoryItem", Value::Map(body)))
    }
}

/// Moves items between folders, optionally renaming them (268).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MoveInventoryItem {
    pub agent_id: Uuid,
    pub session_id: Uuid,
    pub stamp: bool,
    pub items: Vec<MoveItemBlock>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MoveItemBlock {
    pub item_id: Uuid,
    pub folder_id: Uuid,
    pub new_name: String,
}

impl Message for MoveInventoryItem {
    const TYPE: MessageType = MessageType::MoveInventoryItem;

    fn serialize(&self, writer: &mut PacketWriter) -> CodecResult<()> {
        writer.write_uuid(self.agent_id);
        writer.write_uuid(self.session_id);
        writer.write_bool(self.stamp);
        writer.write_count(self.items.len())?;
        for block in &self.items {
            writer.write_uuid(block.item_id);
            writer.write_uuid(block.folder_id);
            writer.write_string8(&block.new_name)?;
        }
        Ok(())
    }

    fn decode(reader: &mut PacketReader) -> CodecResult<Self> {
        let agent_id = reader.read_uuid()?;
        let session_id = reader.read_uuid()?;
        let stamp = reader.read_bool()?;
        let count = reader.read_u8()? as usize;
        let mut items = Vec::with_capacity(count);
        for _ in 0..count {
            items.push(MoveItemBlock {
                item_id: reader.read_uuid()?,
                folder_id: reader.read_uuid()?,
                new_name: reader.read_string8()?,
            });
        }
        Ok(Self {
            agent_id,
            session_id,
            stamp,
            items,
        })
    }
}

/// Copies items into a new folder (269).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CopyInventoryItem {
    pub agent_id: Uuid,
    pub session_id: Uuid,
    pub items: Vec<CopyItemBlock>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CopyItemBlock {
    pub callback_id: u32,
    pub old_agent_id: Uuid,
    pub old_item_id: Uuid,
    pub new_folder_id: Uuid,
    pub new_name: String,
}

impl Message for CopyInventoryItem {
    const TYPE: MessageType = MessageType::CopyInventoryItem;

    fn serialize(&self, writer: &mut PacketWriter) -> CodecResult<()> {
        writer.write_uuid(self.agent_id);
        writer.write_uuid(self.session_id);
        writer.write_count(self.items.len())?;
        for block in &self.items {
            writer.write_u32(block.callback_id);
            writer.write_uuid(block.old_agent_id);
            writer.write_uuid(block.old_item_id);
            writer.write_uuid(block.new_folder_id);
            writer.write_string8(&block.new_name)?;
        }
        Ok(())
    }

    fn decode(reader: &mut PacketReader) -> CodecResult<Self> {
        let agent_id = reader.read_uuid()?;
        let session_id = reader.read_uuid()?;
        let count = reader.read_u8()? as usize;
        let mut items = Vec::with_capacity(count);
        for _ in 0..count {
            items.push(CopyItemBlock {
                callback_id: reader.read_u32()?,
                old_agent_id: reader.read_uuid()?,
                old_item_id: reader.read_uuid()?,
                new_folder_id: reader.read_uuid()?,
                new_name: reader.read_string8()?,
            });
        }
        Ok(Self {
            agent_id,
            session_id,
            items,
        })
    }
}

/// Deletes items (270).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RemoveInventoryItem {
    pub agent_id: Uuid,
    pub session_id: Uuid,
    pub item_ids: Vec<Uuid>,
}

impl Message for RemoveInventoryItem {
    const TYPE: MessageType = MessageType::RemoveInventoryItem;

    fn serialize(&self, writer: &mut PacketWriter) -> CodecResult<()> {
        writer.write_uuid(self.agent_id);
        writer.write_uuid(self.session_id);
        writer.write_count(self.item_ids.len())?;
        for &id in &self.item_ids {
            writer.write_uuid(id);
        }
        Ok(())
    }

    fn decode(reader: &mut PacketReader) -> CodecResult<Self> {
        let agent_id = reader.read_uuid()?;
        let session_id = reader.read_uuid()?;
        let count = reader.read_u8()? as usize;
        let mut item_ids = Vec::with_capacity(count);
        for _ in 0..count {
            item_ids.push(reader.read_uuid()?);
        }
        Ok(Self {
            agent_id,
            session_id,
            item_ids,
        })
    }
}

/// Creates a single folder (273). This message carries exactly one folder
/// block, not a counted list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CreateInventoryFolder {
    pub agent_id: Uuid,
    pub session_id: Uuid,
    pub folder: InventoryFolder,
}

impl Message for CreateInventoryFolder {
    const TYPE: MessageType = MessageType::CreateInventoryFolder;

    fn serialize(&self, writer: &mut PacketWriter) -> CodecResult<()> {
        writer.write_uuid(self.agent_id);
        writer.write_uuid(self.session_id);
        write_folder_block(writer, &self.folder)
    }

    fn decode(reader: &mut PacketReader) -> CodecResult<Self> {
        Ok(Self {
            agent_id: reader.read_uuid()?,
            session_id: reader.read_uuid()?,
            folder: read_folder_block(reader)?,
        })
    }
}

/// Renames or retypes folders (274).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UpdateInventoryFolder {
    pub agent_id: Uuid,
    pub session_id: Uuid,
    pub folders: Vec<InventoryFolder>,
}

impl Message for UpdateInventoryFolder {
    const TYPE: MessageType = MessageType::UpdateInventoryFolder;

    fn serialize(&self, writer: &mut PacketWriter) -> CodecResult<()> {
        writer.write_uuid(self.agent_id);
        writer.write_uuid(self.session_id);
        writer.write_count(self.folders.len())?;
        for folder in &self.folders {
            write_folder_block(writer, folder)?;
        }
        Ok(())
    }

    fn decode(reader: &mut PacketReader) -> CodecResult<Self> {
        let agent_id = reader.read_uuid()?;
        let session_id = reader.read_uuid()?;
        let count = reader.read_u8()? as usize;
        let mut folders = Vec::with_capacity(count);
        for _ in 0..count {
            folders.push(read_folder_block(reader)?);
        }
        Ok(Self {
            agent_id,
            session_id,
            folders,
        })
    }
}

/// Reparents folders (275).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MoveInventoryFolder {
    pub agent_id: Uuid,
    pub session_id: Uuid,
    pub stamp: bool,
    pub folders: Vec<MoveFolderBlock>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MoveFolderBlock {
    pub folder_id: Uuid,
    pub parent_id: Uuid,
}

impl Message for MoveInventoryFolder {
    const TYPE: MessageType = MessageType::MoveInventoryFolder;

    fn serialize(&self, writer: &mut PacketWriter) -> CodecResult<()> {
        writer.write_uuid(self.agent_id);
        writer.write_uuid(self.session_id);
        writer.write_bool(self.stamp);
        writer.write_count(self.folders.len())?;
        for block in &self.folders {
            writer.write_uuid(block.folder_id);
            writer.write_uuid(block.parent_id);
        }
        Ok(())
    }

    fn decode(reader: &mut PacketReader) -> CodecResult<Self> {
        let agent_id = reader.read_uuid()?;
        let session_id = reader.read_uuid()?;
        let stamp = reader.read_bool()?;
        let count = reader.read_u8()? as usize;
        let mut folders = Vec::with_capacity(count);
        for _ in 0..count {
            folders.push(MoveFolderBlock {
                folder_id: reader.read_uuid()?,
                parent_id: reader.read_uuid()?,
            });
        }
        Ok(Self {
            agent_id,
            session_id,
            stamp,
            folders,
        })
    }
}

/// Deletes folders (276).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RemoveInventoryFolder {
    pub agent_id: Uuid,
    pub session_id: Uuid,
    pub folder_ids: Vec<Uuid>,
}

impl Message for RemoveInventoryFolder {
    const TYPE: MessageType = MessageType::RemoveInventoryFolder;

    fn serialize(&self, writer: &mut PacketWriter) -> CodecResult<()> {
        writer.write_uuid(self.agent_id);
        writer.write_uuid(self.session_id);
        writer.write_count(self.folder_ids.len())?;
        for &id in &self.folder_ids {
            writer.write_uuid(id);
        }
        Ok(())
    }

    fn decode(reader: &mut PacketReader) -> CodecResult<Self> {
        let agent_id = reader.read_uuid()?;
        let session_id = reader.read_uuid()?;
        let count = reader.read_u8()? as usize;
        let mut folder_ids = Vec::with_capacity(count);
        for _ in 0..count {
            folder_ids.push(reader.read_uuid()?);
        }
        Ok(Self {
            agent_id,
            session_id,
            folder_ids,
        })
    }
}

/// Requests full item records by ID (279).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FetchInventory {
    pub agent_id: Uuid,
    pub session_id: Uuid,
    pub items: Vec<FetchItemBlock>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FetchItemBlock {
    pub owner_id: Uuid,
    pub item_id: Uuid,
}

impl Message for FetchInventory {
    const TYPE: MessageType = MessageType::FetchInventory;

    fn serialize(&self, writer: &mut PacketWriter) -> CodecResult<()> {
        writer.write_uuid(self.agent_id);
        writer.write_uuid(self.session_id);
        writer.write_count(self.items.len())?;
        for block in &self.items {
            writer.write_uuid(block.owner_id);
            writer.write_uuid(block.item_id);
        }
        Ok(())
    }

    fn decode(reader: &mut PacketReader) -> CodecResult<Self> {
        let agent_id = reader.read_uuid()?;
        let session_id = reader.read_uuid()?;
        let count = reader.read_u8()? as usize;
        let mut items = Vec::with_capacity(count);
        for _ in 0..count {
            items.push(FetchItemBlock {
                owner_id: reader.read_uuid()?,
                item_id: reader.read_uuid()?,
            });
        }
        Ok(Self {
            agent_id,
            session_id,
            items,
        })
    }
}

/// Answers `FetchInventory` with full item records (280).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FetchInventoryReply {
    pub agent_id: Uuid,
    pub items: Vec<InventoryItem>,
}

impl Message for FetchInventoryReply {
    const TYPE: MessageType = MessageType::FetchInventoryReply;

    fn serialize(&self, writer: &mut PacketWriter) -> CodecResult<()> {
        writer.write_uuid(self.agent_id);
        writer.write_count(self.items.len())?;
        for item in &self.items {
            writer.write_uuid(item.item_id);
            writer.write_uuid(item.folder_id);
            write_item_tail(writer, item)?;
        }
        Ok(())
    }

    fn decode(reader: &mut PacketReader) -> CodecResult<Self> {
        let agent_id = reader.read_uuid()?;
        let count = reader.read_u8()? as usize;
        let mut items = Vec::with_capacity(count);
        for _ in 0..count {
            let mut item = InventoryItem {
                item_id: reader.read_uuid()?,
                folder_id: reader.read_uuid()?,
                ..InventoryItem::default()
            };
            read_item_tail(reader, &mut item)?;
            items.push(item);
        }
        Ok(Self { agent_id, items })
    }
}

/// Pushes folder and item changes in bulk, typically after an object or
/// folder is delivered (281). Note the item block puts CallbackID between
/// ItemID and FolderID, unlike 267.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BulkUpdateInventory {
    pub agent_id: Uuid,
    pub transaction_id: Uuid,
    pub folders: Vec<InventoryFolder>,
    pub items: Vec<ItemBlock>,
}

impl Message for BulkUpdateInventory {
    const TYPE: MessageType = MessageType::BulkUpdateInventory;

    fn serialize(&self, writer: &mut PacketWriter) -> CodecResult<()> {
        writer.write_uuid(self.agent_id);
        writer.write_uuid(self.transaction_id);
        writer.write_count(self.folders.len())?;
        for folder in &self.folders {
            write_folder_block(writer, folder)?;
        }
        writer.write_count(self.items.len())?;
        for block in &self.items {
            writer.write_uuid(block.item.item_id);
            writer.write_u32(block.callback_id);
            writer.write_uuid(block.item.folder_id);
            write_item_tail(writer, &block.item)?;
        }
        Ok(())
    }

    fn decode(reader: &mut PacketReader) -> CodecResult<Self> {
        let agent_id = reader.read_uuid()?;
        let transaction_id = reader.read_uuid()?;
        let folder_count = reader.read_u8()? as usize;
        let mut folders = Vec::with_capacity(folder_count);
        for _ in 0..folder_count {
            folders.push(read_folder_block(reader)?);
        }
        let item_count = reader.read_u8()? as usize;
        let mut items = Vec::with_capacity(item_count);
        for _ in 0..item_count {
            let item_id = reader.read_uuid()?;
            let callback_id = reader.read_u32()?;
            let mut item = InventoryItem {
                item_id,
                folder_id: reader.read_uuid()?,
                ..InventoryItem::default()
            };
            read_item_tail(reader, &mut item)?;
            items.push(ItemBlock { callback_id, item });
        }
        Ok(Self {
            agent_id,
            transaction_id,
            folders,
            items,
        })
    }

    fn serialize_eqg(&self) -> Option<Value> {
        let mut agent = ValueMap::new();
        agent.insert("AgentID", self.agent_id);
        agent.insert("TransactionID", self.transaction_id);
        let mut agent_data = ValueArray::new();
        agent_data.push(agent);

        let mut folder_data = ValueArray::new();
        for folder in &self.folders {
            let mut entry = ValueMap::new();
            entry.insert("FolderID", folder.folder_id);
            entry.insert("ParentID", folder.parent_id);
            entry.insert("Type", folder.folder_type.to_i8() as i32);
            entry.insert("Name", folder.name.as_str());
            folder_data.push(entry);
        }

        let mut item_data = ValueArray::new();
        for block in &self.items {
            let mut entry = ValueMap::new();
            entry.insert("ItemID", block.item.item_id);
            entry.insert("CallbackID", encode_u32_to_binary(block.callback_id));
            entry.insert("FolderID", block.item.folder_id);
            item_tail_eqg(&mut entry, &block.item);
            item_data.push(entry);
        }

        let mut body = ValueMap::new();
        body.insert("AgentData", agent_data);
        body.insert("FolderData", folder_data);
        body.insert("ItemData", item_data);
        Some(envelope("BulkUpdateInventory", Value::Map(body)))
    }
}
