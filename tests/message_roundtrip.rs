//! End-to-end codec tests over framed message payloads.

use slmsg_rust::messages::inventory::{
    BulkUpdateInventory, CopyInventoryItem, CopyItemBlock, CreateInventoryFolder, FetchInventory,
    FetchInventoryReply, FetchItemBlock, ItemBlock, MoveFolderBlock, MoveInventoryFolder,
    MoveInventoryItem, MoveItemBlock, RemoveInventoryFolder, RemoveInventoryItem,
    UpdateCreateInventoryItem, UpdateInventoryFolder,
};
use slmsg_rust::messages::{decode_with_id, serialize_with_id, Message, MessageType};
use slmsg_rust::types::{
    AssetType, FolderType, InventoryFolder, InventoryItem, InventoryType, SaleType, UuidExt,
};
use slmsg_rust::{PacketReader, PacketWriter};
use uuid::Uuid;

fn sample_item(name: &str) -> InventoryItem {
    InventoryItem {
        item_id: Uuid::random(),
        folder_id: Uuid::random(),
        creator_id: Uuid::random(),
        owner_id: Uuid::random(),
        asset_id: Uuid::random(),
        asset_type: AssetType::Texture,
        inv_type: InventoryType::Texture,
        sale_type: SaleType::Copy,
        sale_price: 10,
        name: name.to_string(),
        description: "sample".to_string(),
        creation_date: 1_600_000_000,
        ..InventoryItem::default()
    }
}

#[test]
fn create_folder_scenario() {
    let msg = CreateInventoryFolder {
        agent_id: Uuid::random(),
        session_id: Uuid::random(),
        folder: InventoryFolder {
            folder_id: Uuid::random(),
            parent_id: Uuid::random(),
            folder_type: FolderType::Texture,
            name: "Test".to_string(),
        },
    };
    let payload = serialize_with_id(&msg).unwrap();
    assert_eq!(&payload[..4], &[0xFF, 0xFF, 0x01, 0x11]);

    let decoded: CreateInventoryFolder = decode_with_id(&payload).unwrap();
    assert_eq!(decoded.folder.name, "Test");
    assert_eq!(decoded, msg);
}

#[test]
fn create_folder_round_trips_every_folder_type() {
    for &folder_type in FolderType::ALL {
        let msg = CreateInventoryFolder {
            agent_id: Uuid::random(),
            session_id: Uuid::random(),
            folder: InventoryFolder {
                folder_id: Uuid::random(),
                parent_id: Uuid::nil(),
                folder_type,
                name: "Test".to_string(),
            },
        };
        let payload = serialize_with_id(&msg).unwrap();
        let decoded: CreateInventoryFolder = decode_with_id(&payload).unwrap();
        assert_eq!(decoded.folder.folder_type, folder_type);
    }
}

#[test]
fn maximal_repeat_count_round_trips() {
    let msg = RemoveInventoryItem {
        agent_id: Uuid::random(),
        session_id: Uuid::random(),
        item_ids: (0..255).map(|_| Uuid::random()).collect(),
    };
    let payload = serialize_with_id(&msg).unwrap();
    let decoded: RemoveInventoryItem = decode_with_id(&payload).unwrap();
    assert_eq!(decoded.item_ids.len(), 255);
    assert_eq!(decoded, msg);
}

#[test]
fn maximal_item_list_round_trips() {
    let msg = FetchInventoryReply {
        agent_id: Uuid::random(),
        items: (0..255)
            .map(|i| {
                let mut item = sample_item(&format!("item {i}"));
                item.flags = rand::random::<u32>();
                item
            })
            .collect(),
    };
    let payload = serialize_with_id(&msg).unwrap();
    let decoded: FetchInventoryReply = decode_with_id(&payload).unwrap();
    assert_eq!(decoded, msg);
}

#[test]
fn maximal_item_sections_round_trip() {
    fn check<M: Message + PartialEq + std::fmt::Debug>(msg: M) {
        let payload = serialize_with_id(&msg).unwrap();
        let decoded: M = decode_with_id(&payload).unwrap();
        assert_eq!(decoded, msg);
    }

    let blocks: Vec<ItemBlock> = (0..255)
        .map(|i| ItemBlock {
            callback_id: i,
            item: sample_item(&format!("item {i}")),
        })
        .collect();

    check(UpdateCreateInventoryItem {
        agent_id: Uuid::random(),
        sim_approved: false,
        transaction_id: Uuid::random(),
        items: blocks.clone(),
    });
    check(BulkUpdateInventory {
        agent_id: Uuid::random(),
        transaction_id: Uuid::random(),
        folders: (0..255)
            .map(|i| InventoryFolder {
                folder_id: Uuid::random(),
                parent_id: Uuid::random(),
                folder_type: FolderType::Object,
                name: format!("folder {i}"),
            })
            .collect(),
        items: blocks,
    });
    check(MoveInventoryItem {
        agent_id: Uuid::random(),
        session_id: Uuid::random(),
        stamp: true,
        items: (0..255)
            .map(|i| MoveItemBlock {
                item_id: Uuid::random(),
                folder_id: Uuid::random(),
                new_name: format!("moved {i}"),
            })
            .collect(),
    });
    check(CopyInventoryItem {
        agent_id: Uuid::random(),
        session_id: Uuid::random(),
        items: (0..255)
            .map(|i| CopyItemBlock {
                callback_id: i,
                old_agent_id: Uuid::random(),
                old_item_id: Uuid::random(),
                new_folder_id: Uuid::random(),
                new_name: format!("copy {i}"),
            })
            .collect(),
    });
    check(FetchInventory {
        agent_id: Uuid::random(),
        session_id: Uuid::random(),
        items: (0..255)
            .map(|_| FetchItemBlock {
                owner_id: Uuid::random(),
                item_id: Uuid::random(),
            })
            .collect(),
    });
}

#[test]
fn maximal_folder_sections_round_trip() {
    fn check<M: Message + PartialEq + std::fmt::Debug>(msg: M) {
        let payload = serialize_with_id(&msg).unwrap();
        let decoded: M = decode_with_id(&payload).unwrap();
        assert_eq!(decoded, msg);
    }

    check(UpdateInventoryFolder {
        agent_id: Uuid::random(),
        session_id: Uuid::random(),
        folders: (0..255)
            .map(|i| InventoryFolder {
                folder_id: Uuid::random(),
                parent_id: Uuid::random(),
                folder_type: FolderType::None,
                name: format!("renamed {i}"),
            })
            .collect(),
    });
    check(MoveInventoryFolder {
        agent_id: Uuid::random(),
        session_id: Uuid::random(),
        stamp: false,
        folders: (0..255)
            .map(|_| MoveFolderBlock {
                folder_id: Uuid::random(),
                parent_id: Uuid::random(),
            })
            .collect(),
    });
    check(RemoveInventoryFolder {
        agent_id: Uuid::random(),
        session_id: Uuid::random(),
        folder_ids: (0..255).map(|_| Uuid::random()).collect(),
    });
}

#[test]
fn bulk_update_checksum_occupies_four_bytes() {
    let item = sample_item("crc probe");
    let msg = BulkUpdateInventory {
        agent_id: Uuid::random(),
        transaction_id: Uuid::random(),
        folders: vec![],
        items: vec![ItemBlock {
            callback_id: 0,
            item: item.clone(),
        }],
    };

    let mut with_crc = PacketWriter::new();
    msg.serialize(&mut with_crc).unwrap();
    let bytes = with_crc.into_bytes();

    // The trailing four bytes are the item CRC.
    let crc_offset = bytes.len() - 4;
    let wire_crc = u32::from_le_bytes(bytes[crc_offset..].try_into().unwrap());
    assert_eq!(wire_crc, item.checksum());

    // A mismatching CRC never changes decoded fields.
    let mut corrupted = bytes.clone();
    corrupted[crc_offset] ^= 0xA5;
    let mut reader = PacketReader::new(&corrupted);
    let decoded = BulkUpdateInventory::decode(&mut reader).unwrap();
    assert_eq!(reader.remaining(), 0);
    assert_eq!(decoded, msg);
}

#[test]
fn wrong_opcode_is_rejected() {
    let msg = RemoveInventoryItem {
        agent_id: Uuid::random(),
        session_id: Uuid::random(),
        item_ids: vec![],
    };
    let payload = serialize_with_id(&msg).unwrap();
    assert!(decode_with_id::<CreateInventoryFolder>(&payload).is_err());
}

#[test]
fn truncated_payload_is_rejected() {
    let msg = UpdateCreateInventoryItem {
        agent_id: Uuid::random(),
        sim_approved: true,
        transaction_id: Uuid::random(),
        items: vec![ItemBlock {
            callback_id: 3,
            item: sample_item("short"),
        }],
    };
    let payload = serialize_with_id(&msg).unwrap();
    assert!(decode_with_id::<UpdateCreateInventoryItem>(&payload[..payload.len() - 5]).is_err());
}

#[test]
fn every_registered_number_resolves() {
    for number in [267, 268, 269, 270, 273, 274, 275, 276, 279, 280, 281] {
        let ty = MessageType::from_number(number).unwrap();
        assert_eq!(ty.message_number(), number);
    }
}
