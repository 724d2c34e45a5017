//! Reader for Tiled's JSON tileset export (`.tsj` / `.json`).
//!
//! Only the fields the schema parser consumes are read; everything else in the
//! document is ignored. Geometry stays optional so that missing fields are
//! reported by the parser as schema errors, not as JSON errors.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::catalog::AnimationCatalog;
use crate::error::LoadError;
use crate::property::{ImageInfo, PropertyMap, PropertyValue, SheetTree};

#[derive(Debug, Clone, Deserialize)]
pub struct TilesetDocument {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub tilewidth: Option<i64>,
    #[serde(default)]
    pub tileheight: Option<i64>,
    #[serde(default)]
    pub columns: Option<i64>,
    #[serde(default)]
    pub tilecount: Option<i64>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub imagewidth: Option<i64>,
    #[serde(default)]
    pub imageheight: Option<i64>,
    #[serde(default)]
    pub properties: Vec<PropertyDocument>,
    #[serde(default)]
    pub tiles: Vec<TileDocument>,
}

/// One entry of a `properties` array.
#[derive(Debug, Clone, Deserialize)]
pub struct PropertyDocument {
    pub name: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    /// Custom class name for `class` properties.
    #[serde(default)]
    pub propertytype: Option<String>,
    #[serde(default)]
    pub value: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TileDocument {
    pub id: u32,
    #[serde(default)]
    pub properties: Vec<PropertyDocument>,
}

impl TilesetDocument {
    /// Convert into the typed tree the schema parser reads. `fallback_name`
    /// is used when the document carries no `name`.
    pub fn into_tree(self, fallback_name: &str) -> SheetTree {
        let name = self
            .name
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| fallback_name.to_string());

        let image = self.image.map(|source| ImageInfo {
            source,
            width: self.imagewidth,
            height: self.imageheight,
        });

        let mut tiles = BTreeMap::new();
        for tile in self.tiles {
            let block = convert_properties(&name, tile.properties);
            tiles.insert(tile.id, block);
        }

        SheetTree {
            properties: convert_properties(&name, self.properties),
            name,
            tile_width: self.tilewidth,
            tile_height: self.tileheight,
            columns: self.columns,
            tile_count: self.tilecount,
            image,
            tiles,
        }
    }
}

fn convert_properties(sheet: &str, properties: Vec<PropertyDocument>) -> PropertyMap {
    let mut map = PropertyMap::new();
    for prop in properties {
        match convert_property(&prop) {
            Some(value) => map.insert(prop.name, value),
            None => log::warn!(
                "Sheet '{}': property '{}' has an unsupported value {}",
                sheet,
                prop.name,
                prop.value
            ),
        }
    }
    map
}

fn convert_property(prop: &PropertyDocument) -> Option<PropertyValue> {
    match prop.kind.as_deref() {
        Some("int") | Some("object") => prop.value.as_i64().map(PropertyValue::Int),
        Some("float") => prop.value.as_f64().map(PropertyValue::Float),
        Some("bool") => prop.value.as_bool().map(PropertyValue::Bool),
        Some("class") => match &prop.value {
            Value::Object(members) => Some(PropertyValue::Class {
                class: prop.propertytype.clone(),
                members: convert_members(members),
            }),
            // Tiled omits `value` for a class left at its defaults.
            Value::Null => Some(PropertyValue::Class {
                class: prop.propertytype.clone(),
                members: PropertyMap::new(),
            }),
            _ => None,
        },
        _ => convert_value(&prop.value),
    }
}

fn convert_members(members: &serde_json::Map<String, Value>) -> PropertyMap {
    let mut map = PropertyMap::new();
    for (name, value) in members {
        if let Some(converted) = convert_value(value) {
            map.insert(name.clone(), converted);
        }
    }
    map
}

/// Untyped JSON value, as found inside class members.
fn convert_value(value: &Value) -> Option<PropertyValue> {
    match value {
        Value::Bool(b) => Some(PropertyValue::Bool(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Some(PropertyValue::Int(i)),
            None => n.as_f64().map(PropertyValue::Float),
        },
        Value::String(s) => Some(PropertyValue::String(s.clone())),
        Value::Object(members) => Some(PropertyValue::Class {
            class: None,
            members: convert_members(members),
        }),
        Value::Null | Value::Array(_) => None,
    }
}

/// Parse a tileset document from a JSON string.
pub fn parse_sheet_json(raw: &str, fallback_name: &str) -> Result<SheetTree, serde_json::Error> {
    let doc: TilesetDocument = serde_json::from_str(raw)?;
    Ok(doc.into_tree(fallback_name))
}

/// Read a tileset JSON file into a property tree. The file stem names the
/// sheet when the document does not.
pub fn load_sheet_from_path(path: &Path) -> Result<SheetTree, LoadError> {
    let raw = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let stem = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("sheet");
    parse_sheet_json(&raw, stem).map_err(|source| LoadError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Read a tileset JSON file and build its catalog.
pub fn load_catalog_from_path(path: &Path) -> Result<AnimationCatalog, LoadError> {
    let tree = load_sheet_from_path(path)?;
    let catalog = AnimationCatalog::from_tree(&tree)?;
    log::info!(
        "Loaded sheet '{}' from {} ({} clips)",
        catalog.sheet().name,
        path.display(),
        catalog.len()
    );
    Ok(catalog)
}
