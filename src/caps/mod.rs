//! Capability boundary
//!
//! Thin glue between the HTTP capability framework (an external
//! collaborator) and the value model. A handler receives the parsed LLSD
//! request body as a map and answers with a value tree; the framework owns
//! routing, sessions and the actual HTTP server. The collaborator traits
//! below are the contracts this crate calls out through; their
//! implementations live with the simulator services.

use tracing::debug;
use uuid::Uuid;

use crate::error::CapError;
use crate::llsd;
use crate::types::{AssetType, InventoryFolder, InventoryItem, Value, ValueMap};

pub const LLSD_XML_CONTENT_TYPE: &str = "application/llsd+xml";
pub const LLSD_BINARY_CONTENT_TYPE: &str = "application/llsd+binary";

/// Parses a capability request body by content type. The root must be a
/// map; anything else is a caller format error, not a crash.
pub fn parse_llsd_request(content_type: &str, body: &[u8]) -> Result<ValueMap, CapError> {
    // Content types may carry parameters ("; charset=utf-8").
    let base = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    let value = match base.as_str() {
        LLSD_XML_CONTENT_TYPE | "application/xml" | "text/xml" => {
            llsd::xml::deserialize(body)?
        }
        LLSD_BINARY_CONTENT_TYPE => llsd::binary::deserialize(body)?,
        other => return Err(CapError::UnsupportedMediaType(other.to_string())),
    };
    match value {
        Value::Map(map) => Ok(map),
        other => {
            debug!(root = other.type_name(), "capability request root is not a map");
            Err(CapError::BadRequest)
        }
    }
}

/// Serializes a capability response body as LLSD-XML.
pub fn serialize_llsd_response(value: &Value) -> Result<Vec<u8>, CapError> {
    Ok(llsd::xml::serialize(value)?)
}

/// One granted HTTP endpoint. The capability framework routes a request to
/// the handler whose `name` matches the grant.
pub trait CapabilityHandler {
    fn name(&self) -> &'static str;

    fn handle(&self, request: &ValueMap) -> Result<Value, CapError>;
}

/// An asset as exchanged with the asset store.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetData {
    pub id: Uuid,
    pub asset_type: AssetType,
    pub name: String,
    pub data: Vec<u8>,
}

/// Asset persistence, implemented by the simulator's asset service.
pub trait AssetStore {
    fn store(&self, asset: AssetData) -> Result<(), CapError>;

    fn try_get(&self, id: Uuid) -> Option<AssetData>;
}

/// Inventory persistence, implemented by the inventory service.
pub trait InventoryStore {
    fn create_folder(&self, agent_id: Uuid, folder: InventoryFolder) -> Result<(), CapError>;

    fn update_folder(&self, agent_id: Uuid, folder: InventoryFolder) -> Result<(), CapError>;

    fn remove_folder(&self, agent_id: Uuid, folder_id: Uuid) -> Result<(), CapError>;

    fn create_item(&self, agent_id: Uuid, item: InventoryItem) -> Result<(), CapError>;

    fn update_item(&self, agent_id: Uuid, item: InventoryItem) -> Result<(), CapError>;

    fn remove_item(&self, agent_id: Uuid, item_id: Uuid) -> Result<(), CapError>;

    fn try_get_item(&self, agent_id: Uuid, item_id: Uuid) -> Option<InventoryItem>;
}

/// Region and parcel lookup, implemented by the scene service.
pub trait SceneLookup {
    fn region_name(&self, region_handle: u64) -> Option<String>;

    fn parcel_owner(&self, region_handle: u64, x: u32, y: u32) -> Option<Uuid>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xml_body(inner: &str) -> Vec<u8> {
        format!("<llsd>{inner}</llsd>").into_bytes()
    }

    #[test]
    fn test_parse_xml_request() {
        let body = xml_body("<map><key>item_id</key><integer>3</integer></map>");
        let map = parse_llsd_request(LLSD_XML_CONTENT_TYPE, &body).unwrap();
        assert_eq!(map.try_get::<i32>("item_id"), Some(3));
    }

    #[test]
    fn test_content_type_parameters_tolerated() {
        let body = xml_body("<map/>");
        let result = parse_llsd_request("application/llsd+xml; charset=utf-8", &body);
        assert!(result.is_ok());
    }

    #[test]
    fn test_non_map_root_is_bad_request() {
        let body = xml_body("<array><integer>1</integer></array>");
        let err = parse_llsd_request(LLSD_XML_CONTENT_TYPE, &body).unwrap_err();
        assert!(matches!(err, CapError::BadRequest));
        assert_eq!(err.http_status(), 400);
    }

    #[test]
    fn test_unknown_content_type_is_415() {
        let err = parse_llsd_request("application/json", b"{}").unwrap_err();
        assert!(matches!(err, CapError::UnsupportedMediaType(_)));
        assert_eq!(err.http_status(), 415);
    }

    #[test]
    fn test_binary_request() {
        let mut map = ValueMap::new();
        map.insert("folder_id", Uuid::nil());
        let body = llsd::binary::serialize(&Value::Map(map));
        let parsed = parse_llsd_request(LLSD_BINARY_CONTENT_TYPE, &body).unwrap();
        assert_eq!(parsed.try_get::<Uuid>("folder_id"), Some(Uuid::nil()));
    }
}
