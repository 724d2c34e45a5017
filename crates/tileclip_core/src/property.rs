//! Typed property tree consumed by the schema parser.
//!
//! This is the ingestion boundary of the crate: a sheet's geometry plus its
//! nested key/value properties, already deserialized by some external reader.
//! Values keep the types the authoring tool gave them; the `as_*` accessors
//! are lenient because hand-edited tilesets frequently store numbers as
//! strings or integers as floats.

use std::collections::BTreeMap;

/// A single property value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    String(String),
    /// A class-typed property: a named record of nested members.
    Class {
        class: Option<String>,
        members: PropertyMap,
    },
}

impl PropertyValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::Float(v) if v.is_finite() => Some(v.trunc() as i64),
            Self::String(s) => s.trim().parse::<i64>().ok().or_else(|| {
                s.trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .map(|v| v.trunc() as i64)
            }),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) if v.is_finite() => Some(*v),
            Self::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            Self::Int(v) => Some(*v != 0),
            Self::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => Some(true),
                "false" | "0" | "no" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// Members of a class-typed value.
    pub fn as_class(&self) -> Option<&PropertyMap> {
        match self {
            Self::Class { members, .. } => Some(members),
            _ => None,
        }
    }

    /// Class name (`propertytype` in Tiled) of a class-typed value.
    pub fn class_name(&self) -> Option<&str> {
        match self {
            Self::Class { class, .. } => class.as_deref(),
            _ => None,
        }
    }

    /// Lossy string form of a primitive value, used for descriptive metadata.
    pub fn to_display_string(&self) -> Option<String> {
        match self {
            Self::Int(v) => Some(v.to_string()),
            Self::Float(v) => Some(v.to_string()),
            Self::Bool(v) => Some(v.to_string()),
            Self::String(s) => Some(s.clone()),
            Self::Class { .. } => None,
        }
    }
}

/// Ordered list of named properties. Order is preserved as authored; when a
/// name repeats, the last occurrence wins on lookup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyMap {
    entries: Vec<(String, PropertyValue)>,
}

impl PropertyMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: PropertyValue) {
        self.entries.push((name.into(), value));
    }

    /// Builder-style insert, handy when assembling trees in code.
    pub fn with(mut self, name: impl Into<String>, value: PropertyValue) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.entries
            .iter()
            .rev()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Image metadata attached to a sheet. Only the pixel size is consumed, to
/// cross-check the declared tile count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageInfo {
    pub source: String,
    pub width: Option<i64>,
    pub height: Option<i64>,
}

/// The raw, already-parsed description of one sprite sheet.
///
/// Geometry fields are optional here so that the parser, not the reader,
/// decides what is missing or invalid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetTree {
    pub name: String,
    pub tile_width: Option<i64>,
    pub tile_height: Option<i64>,
    pub columns: Option<i64>,
    pub tile_count: Option<i64>,
    pub image: Option<ImageInfo>,
    pub properties: PropertyMap,
    /// Per-tile property blocks keyed by local tile id (GID).
    pub tiles: BTreeMap<u32, PropertyMap>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lenient_numeric_accessors() {
        assert_eq!(PropertyValue::Int(7).as_i64(), Some(7));
        assert_eq!(PropertyValue::Float(7.9).as_i64(), Some(7));
        assert_eq!(PropertyValue::String(" 12 ".into()).as_i64(), Some(12));
        assert_eq!(PropertyValue::String("2.5".into()).as_i64(), Some(2));
        assert_eq!(PropertyValue::String("2.5".into()).as_f64(), Some(2.5));
        assert_eq!(PropertyValue::Bool(true).as_i64(), None);
        assert_eq!(PropertyValue::Float(f64::NAN).as_f64(), None);
    }

    #[test]
    fn lenient_bool_accessor() {
        assert_eq!(PropertyValue::Bool(true).as_bool(), Some(true));
        assert_eq!(PropertyValue::String("False".into()).as_bool(), Some(false));
        assert_eq!(PropertyValue::Int(0).as_bool(), Some(false));
        assert_eq!(PropertyValue::String("maybe".into()).as_bool(), None);
    }

    #[test]
    fn last_duplicate_wins() {
        let map = PropertyMap::new()
            .with("stopGID", PropertyValue::Int(3))
            .with("stopGID", PropertyValue::Int(5));
        assert_eq!(map.get("stopGID"), Some(&PropertyValue::Int(5)));
        assert_eq!(map.len(), 2);
        assert!(map.get("startGID").is_none());
    }

    #[test]
    fn class_accessors() {
        let value = PropertyValue::Class {
            class: Some("animation".into()),
            members: PropertyMap::new().with("stopGID", PropertyValue::Int(1)),
        };
        assert_eq!(value.class_name(), Some("animation"));
        assert_eq!(value.as_class().map(PropertyMap::len), Some(1));
        assert_eq!(value.to_display_string(), None);
        assert!(PropertyValue::Int(1).as_class().is_none());
    }
}
