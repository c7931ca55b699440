//! Cross-codec LLSD tests: the XML and binary forms must agree on the
//! value model, and the event-queue forms must survive both.

use slmsg_rust::caps::{parse_llsd_request, LLSD_BINARY_CONTENT_TYPE, LLSD_XML_CONTENT_TYPE};
use slmsg_rust::llsd;
use slmsg_rust::messages::inventory::{BulkUpdateInventory, ItemBlock};
use slmsg_rust::messages::Message;
use slmsg_rust::types::{Date, InventoryItem, UuidExt, Value, ValueArray, ValueMap};
use url::Url;
use uuid::Uuid;

fn sample_tree() -> Value {
    let mut inner = ValueMap::new();
    inner.insert("id", Uuid::random());
    inner.insert("when", Date::from_unix_time(1_173_983_418));
    inner.insert("where", Url::parse("http://grid.example.com/region/5").unwrap());
    inner.insert("payload", vec![0u8, 1, 2, 253, 254, 255]);

    let mut arr = ValueArray::new();
    arr.push(inner);
    arr.push(true);
    arr.push(-40i32);
    arr.push(2.5f64);
    arr.push("text with <angle> brackets & ampersands");
    arr.push(Value::Undef);

    let mut root = ValueMap::new();
    root.insert("events", arr);
    Value::Map(root)
}

#[test]
fn xml_and_binary_agree() {
    let tree = sample_tree();
    let xml = llsd::xml::serialize(&tree).unwrap();
    let bin = llsd::binary::serialize(&tree);
    assert_eq!(llsd::xml::deserialize(&xml).unwrap(), tree);
    assert_eq!(llsd::binary::deserialize(&bin).unwrap(), tree);
}

#[test]
fn eqg_form_survives_both_codecs() {
    let msg = BulkUpdateInventory {
        agent_id: Uuid::random(),
        transaction_id: Uuid::random(),
        folders: vec![],
        items: vec![ItemBlock {
            callback_id: 0xCAFE_F00D,
            item: InventoryItem {
                item_id: Uuid::random(),
                name: "delivered object".to_string(),
                ..InventoryItem::default()
            },
        }],
    };
    let tree = msg.serialize_eqg().unwrap();

    let xml = llsd::xml::serialize(&tree).unwrap();
    assert_eq!(llsd::xml::deserialize(&xml).unwrap(), tree);

    let bin = llsd::binary::serialize(&tree);
    assert_eq!(llsd::binary::deserialize(&bin).unwrap(), tree);
}

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[test]
fn capability_request_accepts_both_encodings() {
    init_logging();
    let mut map = ValueMap::new();
    map.insert("folder_id", Uuid::random());
    map.insert("fetch_folders", true);
    let tree = Value::Map(map.clone());

    let xml = llsd::xml::serialize(&tree).unwrap();
    let from_xml = parse_llsd_request(LLSD_XML_CONTENT_TYPE, &xml).unwrap();
    assert_eq!(from_xml, map);

    let bin = llsd::binary::serialize(&tree);
    let from_bin = parse_llsd_request(LLSD_BINARY_CONTENT_TYPE, &bin).unwrap();
    assert_eq!(from_bin, map);
}

#[test]
fn map_insertion_order_is_stable_across_codecs() {
    let mut map = ValueMap::new();
    map.insert("zulu", 1i32);
    map.insert("alpha", 2i32);
    map.insert("mike", 3i32);
    let tree = Value::Map(map);

    for decoded in [
        llsd::xml::deserialize(&llsd::xml::serialize(&tree).unwrap()).unwrap(),
        llsd::binary::deserialize(&llsd::binary::serialize(&tree)).unwrap(),
    ] {
        match decoded {
            Value::Map(m) => {
                let keys: Vec<&str> = m.keys().collect();
                assert_eq!(keys, vec!["zulu", "alpha", "mike"]);
            }
            other => panic!("expected map, got {other:?}"),
        }
    }
}
