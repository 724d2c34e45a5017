//! Schema parser: property tree -> sheet geometry, sheet defaults, partial
//! clip records and per-tile override blocks.
//!
//! Every clip attribute is parsed into an `Option` so that the catalog can
//! tell "authored" apart from "inherit from the sheet". Nothing is merged here.
//!
//! Recognized sheet-level keys (primitive values):
//! `animation-ticks`, `animation-update-rate`, `animation-width`,
//! `animation-height`, `multidirectional`, `inverted`. Any other primitive key
//! is kept as descriptive metadata on [`TileSheet::custom`].
//!
//! Clip blocks are class-typed properties (class `animation`, or untyped) whose
//! name is `animation-<clip>` or `animation-<clip>=<direction>`.

use std::collections::{BTreeMap, HashMap};

use glam::UVec2;

use crate::direction::{split_directional_name, Direction};
use crate::error::SchemaError;
use crate::property::{PropertyMap, PropertyValue, SheetTree};
use crate::sheet::TileSheet;

const CLIP_PREFIX: &str = "animation-";
const CLIP_CLASS: &str = "animation";

/// Composite clip identity: base name plus optional facing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClipKey {
    pub name: String,
    pub direction: Option<Direction>,
}

impl ClipKey {
    pub fn new(name: impl Into<String>, direction: Option<Direction>) -> Self {
        Self {
            name: name.into(),
            direction,
        }
    }

    /// Decompose an authored property name (`animation-walk=n`).
    pub fn from_property_name(raw: &str) -> Self {
        let stripped = raw.strip_prefix(CLIP_PREFIX).unwrap_or(raw);
        let (name, direction) = split_directional_name(stripped);
        Self::new(name, direction)
    }
}

impl std::fmt::Display for ClipKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.direction {
            Some(dir) => write!(f, "{}={}", self.name, dir),
            None => f.write_str(&self.name),
        }
    }
}

/// Sheet-wide fallback values inherited by every clip.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetDefaults {
    pub ticks: Option<u32>,
    pub update_rate: Option<u32>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub multidirectional: bool,
    pub inverted: bool,
}

/// A clip exactly as authored. `None` means "not declared on the clip".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialAnimationDef {
    pub start_gid: Option<i64>,
    pub stop_gid: Option<i64>,
    pub ticks: Option<u32>,
    pub update_rate: Option<u32>,
    pub ticks_multiplier: Option<f64>,
    pub update_rate_multiplier: Option<f64>,
    pub is_permanent: Option<bool>,
    pub is_default: Option<bool>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub inverted: Option<bool>,
    pub looping: Option<bool>,
}

/// Tile-specific exception for one clip. An empty authored block suppresses
/// the clip at that tile.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TileClipOverride {
    pub suppressed: bool,
    pub ticks_multiplier: Option<f64>,
    pub update_rate_multiplier: Option<f64>,
}

/// Sparse GID -> per-clip override table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TileOverrides {
    by_gid: HashMap<u32, Vec<(ClipKey, TileClipOverride)>>,
}

impl TileOverrides {
    pub fn insert(&mut self, gid: u32, key: ClipKey, record: TileClipOverride) {
        self.by_gid.entry(gid).or_default().push((key, record));
    }

    /// Override for `key` at `gid`. An exact (name, direction) match wins over
    /// a direction-less block naming the same clip.
    pub fn get(&self, gid: u32, key: &ClipKey) -> Option<&TileClipOverride> {
        let records = self.by_gid.get(&gid)?;
        records
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .or_else(|| {
                records
                    .iter()
                    .rev()
                    .find(|(k, _)| k.name == key.name && k.direction.is_none())
            })
            .map(|(_, record)| record)
    }

    pub fn is_empty(&self) -> bool {
        self.by_gid.is_empty()
    }

    pub fn len(&self) -> usize {
        self.by_gid.values().map(Vec::len).sum()
    }
}

/// Output of [`parse_sheet`], input of the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSheet {
    pub sheet: TileSheet,
    pub defaults: SheetDefaults,
    /// Clips in authored order; later duplicates replace earlier ones.
    pub clips: Vec<(ClipKey, PartialAnimationDef)>,
    pub tile_overrides: TileOverrides,
}

/// Parse a sheet's property tree.
///
/// Fails only when `tilewidth`, `tileheight` or `columns` is absent or not
/// positive. Everything else is tolerated: unknown keys are skipped, bad
/// values are dropped with a warning so that defaults apply.
pub fn parse_sheet(tree: &SheetTree) -> Result<ParsedSheet, SchemaError> {
    let tile_width = required_geometry(&tree.name, "tilewidth", tree.tile_width)?;
    let tile_height = required_geometry(&tree.name, "tileheight", tree.tile_height)?;
    let columns = required_geometry(&tree.name, "columns", tree.columns)?;

    let tile_count = effective_tile_count(tree, tile_width, tile_height, columns);

    let mut defaults = SheetDefaults::default();
    let mut custom = BTreeMap::new();
    let mut clips: Vec<(ClipKey, PartialAnimationDef)> = Vec::new();

    for (name, value) in tree.properties.iter() {
        if let Some(members) = value.as_class() {
            if !is_clip_class(value) {
                log::debug!(
                    "Sheet '{}': skipping class property '{}' of class {:?}",
                    tree.name,
                    name,
                    value.class_name()
                );
                continue;
            }
            let key = ClipKey::from_property_name(name);
            let def = parse_clip(&tree.name, &key, members);
            if let Some(existing) = clips.iter_mut().find(|(k, _)| *k == key) {
                log::warn!(
                    "Sheet '{}': clip '{}' declared twice; keeping the later block",
                    tree.name,
                    key
                );
                existing.1 = def;
            } else {
                clips.push((key, def));
            }
            continue;
        }

        match name {
            "animation-ticks" => defaults.ticks = positive_u32(&tree.name, name, value),
            "animation-update-rate" => {
                defaults.update_rate = positive_u32(&tree.name, name, value)
            }
            "animation-width" => defaults.width = positive_u32(&tree.name, name, value),
            "animation-height" => defaults.height = positive_u32(&tree.name, name, value),
            "multidirectional" => {
                defaults.multidirectional = bool_or_warn(&tree.name, name, value).unwrap_or(false)
            }
            "inverted" => {
                defaults.inverted = bool_or_warn(&tree.name, name, value).unwrap_or(false)
            }
            _ => {
                if let Some(text) = value.to_display_string() {
                    custom.insert(name.to_string(), text);
                }
            }
        }
    }

    let mut tile_overrides = TileOverrides::default();
    for (&gid, properties) in &tree.tiles {
        for (name, value) in properties.iter() {
            let Some(members) = value.as_class() else {
                continue;
            };
            if !is_clip_class(value) {
                continue;
            }
            let key = ClipKey::from_property_name(name);
            tile_overrides.insert(gid, key, parse_tile_override(&tree.name, members));
        }
    }

    let sheet = TileSheet {
        name: tree.name.clone(),
        tile_size: UVec2::new(tile_width, tile_height),
        columns,
        tile_count,
        image_source: tree.image.as_ref().map(|image| image.source.clone()),
        custom,
    };

    log::debug!(
        "Parsed sheet '{}': {} clips, {} tile overrides, tile_count={:?}",
        sheet.name,
        clips.len(),
        tile_overrides.len(),
        sheet.tile_count
    );

    Ok(ParsedSheet {
        sheet,
        defaults,
        clips,
        tile_overrides,
    })
}

fn required_geometry(
    sheet: &str,
    field: &'static str,
    value: Option<i64>,
) -> Result<u32, SchemaError> {
    let value = value.ok_or_else(|| SchemaError::MissingGeometry {
        sheet: sheet.to_string(),
        field,
    })?;
    if value <= 0 {
        return Err(SchemaError::NonPositiveGeometry {
            sheet: sheet.to_string(),
            field,
            value,
        });
    }
    u32::try_from(value).map_err(|_| SchemaError::NonPositiveGeometry {
        sheet: sheet.to_string(),
        field,
        value,
    })
}

/// Declared tile count, capped by what the image can actually hold. Falls
/// back to the image capacity when the count is not declared.
fn effective_tile_count(
    tree: &SheetTree,
    tile_width: u32,
    tile_height: u32,
    columns: u32,
) -> Option<u32> {
    let declared = tree
        .tile_count
        .filter(|&count| count > 0)
        .and_then(|count| u32::try_from(count).ok());

    let capacity = tree.image.as_ref().and_then(|image| {
        let width = u32::try_from(image.width?).ok()?;
        let height = u32::try_from(image.height?).ok()?;
        let image_columns = (width / tile_width).min(columns);
        let rows = height / tile_height;
        Some(image_columns.saturating_mul(rows))
    });

    match (declared, capacity) {
        (Some(count), Some(cap)) if cap > 0 && count > cap => {
            log::warn!(
                "Sheet '{}': tilecount {} exceeds image capacity {}; clamping",
                tree.name,
                count,
                cap
            );
            Some(cap)
        }
        (Some(count), _) => Some(count),
        (None, Some(cap)) if cap > 0 => Some(cap),
        _ => {
            log::warn!(
                "Sheet '{}': no tilecount or image size; GIDs will not be bounds-checked",
                tree.name
            );
            None
        }
    }
}

fn is_clip_class(value: &PropertyValue) -> bool {
    match value.class_name() {
        None => true,
        Some(class) => class == CLIP_CLASS,
    }
}

fn parse_clip(sheet: &str, key: &ClipKey, members: &PropertyMap) -> PartialAnimationDef {
    let mut def = PartialAnimationDef::default();
    for (name, value) in members.iter() {
        match name {
            "startGID" => def.start_gid = int_or_warn(sheet, name, value),
            "stopGID" => def.stop_gid = int_or_warn(sheet, name, value),
            "ticks" | "animation-ticks" => def.ticks = positive_u32(sheet, name, value),
            "update-rate" | "animation-update-rate" => {
                def.update_rate = positive_u32(sheet, name, value)
            }
            "ticks-multiplier" => def.ticks_multiplier = multiplier(sheet, name, value),
            "update-rate-multiplier" | "animation-update-rate-multiplier" => {
                def.update_rate_multiplier = multiplier(sheet, name, value)
            }
            "isPermanent" => def.is_permanent = bool_or_warn(sheet, name, value),
            "isDefault" => def.is_default = bool_or_warn(sheet, name, value),
            "animation-width" | "width" => def.width = positive_u32(sheet, name, value),
            "animation-height" | "height" => def.height = positive_u32(sheet, name, value),
            "inverted" => def.inverted = bool_or_warn(sheet, name, value),
            "loop" | "isLooping" => def.looping = bool_or_warn(sheet, name, value),
            _ => log::trace!("Sheet '{}': clip '{}' ignores key '{}'", sheet, key, name),
        }
    }
    def
}

fn parse_tile_override(sheet: &str, members: &PropertyMap) -> TileClipOverride {
    let mut record = TileClipOverride {
        suppressed: members.is_empty(),
        ..TileClipOverride::default()
    };
    for (name, value) in members.iter() {
        match name {
            "ticks-multiplier" => record.ticks_multiplier = multiplier(sheet, name, value),
            "update-rate-multiplier" | "animation-update-rate-multiplier" => {
                record.update_rate_multiplier = multiplier(sheet, name, value)
            }
            _ => {}
        }
    }
    record
}

fn int_or_warn(sheet: &str, key: &str, value: &PropertyValue) -> Option<i64> {
    let parsed = value.as_i64();
    if parsed.is_none() {
        log::warn!("Sheet '{}': '{}' is not an integer ({:?})", sheet, key, value);
    }
    parsed
}

fn bool_or_warn(sheet: &str, key: &str, value: &PropertyValue) -> Option<bool> {
    let parsed = value.as_bool();
    if parsed.is_none() {
        log::warn!("Sheet '{}': '{}' is not a bool ({:?})", sheet, key, value);
    }
    parsed
}

fn positive_u32(sheet: &str, key: &str, value: &PropertyValue) -> Option<u32> {
    match value.as_i64() {
        Some(v) if v > 0 => u32::try_from(v).ok(),
        _ => {
            log::warn!(
                "Sheet '{}': '{}' must be a positive integer ({:?}); ignoring",
                sheet,
                key,
                value
            );
            None
        }
    }
}

fn multiplier(sheet: &str, key: &str, value: &PropertyValue) -> Option<f64> {
    match value.as_f64() {
        Some(v) if v > 0.0 => Some(v),
        _ => {
            log::warn!(
                "Sheet '{}': '{}' must be a positive number ({:?}); ignoring",
                sheet,
                key,
                value
            );
            None
        }
    }
}
