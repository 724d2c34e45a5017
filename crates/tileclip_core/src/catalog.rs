//! Animation catalog: the per-sheet table of fully materialized clips.
//!
//! Built once from a [`ParsedSheet`] by [`AnimationCatalog::resolve_defaults`],
//! immutable afterwards and shared between entities behind an `Arc`. Sheet
//! defaults are applied only to attributes a clip left unset, so precedence is
//! always clip > sheet > built-in.
//!
//! Authored data is tolerated rather than rejected: a missing `startGID` means
//! 0, an inverted range collapses to one frame at `startGID`, and a range that
//! runs past the end of the sheet is clamped.

use std::collections::HashMap;

use glam::UVec2;

use crate::direction::Direction;
use crate::error::SchemaError;
use crate::property::SheetTree;
use crate::schema::{
    parse_sheet, ClipKey, ParsedSheet, PartialAnimationDef, SheetDefaults, TileOverrides,
};
use crate::sheet::TileSheet;

/// A clip record with every attribute decided.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationDef {
    pub key: ClipKey,
    pub start_gid: u32,
    pub stop_gid: u32,
    /// Total clip duration base, spread across frames.
    pub ticks: Option<u32>,
    /// Per-frame duration base. Takes precedence over `ticks` when present.
    pub update_rate: Option<u32>,
    pub ticks_multiplier: f64,
    pub update_rate_multiplier: f64,
    pub is_permanent: bool,
    pub is_default: bool,
    /// Frame block size in tiles (width x height).
    pub footprint: UVec2,
    pub inverted: bool,
    /// Explicit looping flag, when the clip declares one.
    pub looping: Option<bool>,
}

impl AnimationDef {
    /// Tiles covered by one logical frame.
    pub fn block_size(&self) -> u32 {
        self.footprint.x.saturating_mul(self.footprint.y).max(1)
    }
}

#[derive(Debug, Clone, Default)]
struct ClipVariants {
    base: Option<AnimationDef>,
    directional: [Option<AnimationDef>; 4],
}

impl ClipVariants {
    fn slot_mut(&mut self, direction: Option<Direction>) -> &mut Option<AnimationDef> {
        match direction {
            Some(dir) => &mut self.directional[dir.index()],
            None => &mut self.base,
        }
    }

    fn get(&self, direction: Option<Direction>) -> Option<&AnimationDef> {
        match direction {
            Some(dir) => self.directional[dir.index()].as_ref(),
            None => self.base.as_ref(),
        }
    }
}

/// Immutable per-sheet clip table.
#[derive(Debug, Clone)]
pub struct AnimationCatalog {
    sheet: TileSheet,
    multidirectional: bool,
    clips: HashMap<String, ClipVariants>,
    tile_overrides: TileOverrides,
    default_clip: Option<String>,
}

impl AnimationCatalog {
    /// Parse a property tree and materialize its clips.
    pub fn from_tree(tree: &SheetTree) -> Result<Self, SchemaError> {
        Ok(Self::resolve_defaults(parse_sheet(tree)?))
    }

    /// Merge sheet defaults into every clip attribute left unset, normalize
    /// ranges against the sheet bounds, and freeze the result.
    pub fn resolve_defaults(parsed: ParsedSheet) -> Self {
        let ParsedSheet {
            sheet,
            defaults,
            clips: partials,
            tile_overrides,
        } = parsed;

        let mut clips: HashMap<String, ClipVariants> = HashMap::new();
        let mut default_clip: Option<String> = None;

        for (key, partial) in partials {
            let Some(def) = materialize(&sheet, &defaults, key, &partial) else {
                continue;
            };
            if def.is_default {
                match &default_clip {
                    Some(existing) if *existing != def.key.name => log::warn!(
                        "Sheet '{}': clips '{}' and '{}' are both marked isDefault; keeping '{}'",
                        sheet.name,
                        existing,
                        def.key.name,
                        existing
                    ),
                    Some(_) => {}
                    None => default_clip = Some(def.key.name.clone()),
                }
            }
            let direction = def.key.direction;
            let variants = clips.entry(def.key.name.clone()).or_default();
            *variants.slot_mut(direction) = Some(def);
        }

        if defaults.multidirectional {
            check_direction_coverage(&sheet.name, &clips);
        }

        log::debug!(
            "Catalog '{}' ready: {} clip names, default={:?}",
            sheet.name,
            clips.len(),
            default_clip
        );

        Self {
            sheet,
            multidirectional: defaults.multidirectional,
            clips,
            tile_overrides,
            default_clip,
        }
    }

    /// Exact lookup by base name and optional direction.
    pub fn lookup(&self, name: &str, direction: Option<Direction>) -> Option<&AnimationDef> {
        self.clips.get(name)?.get(direction)
    }

    /// Directions available for `name`, in lexical order.
    pub fn directions(&self, name: &str) -> Vec<Direction> {
        match self.clips.get(name) {
            Some(variants) => Direction::ALL
                .into_iter()
                .filter(|dir| variants.directional[dir.index()].is_some())
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.clips.contains_key(name)
    }

    /// Clip base names, sorted.
    pub fn clip_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.clips.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Every clip record, sorted by name then direction (undirected first).
    pub fn iter(&self) -> impl Iterator<Item = &AnimationDef> {
        self.clip_names().into_iter().flat_map(move |name| {
            let variants = &self.clips[name];
            std::iter::once(variants.base.as_ref())
                .chain(variants.directional.iter().map(Option::as_ref))
                .flatten()
        })
    }

    /// Number of clip records (each direction counts separately).
    pub fn len(&self) -> usize {
        self.clips
            .values()
            .map(|v| v.base.is_some() as usize + v.directional.iter().flatten().count())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    pub fn sheet(&self) -> &TileSheet {
        &self.sheet
    }

    pub fn is_multidirectional(&self) -> bool {
        self.multidirectional
    }

    pub fn tile_overrides(&self) -> &TileOverrides {
        &self.tile_overrides
    }

    /// Name of the clip marked `isDefault`, if any.
    pub fn default_clip_name(&self) -> Option<&str> {
        self.default_clip.as_deref()
    }
}

fn materialize(
    sheet: &TileSheet,
    defaults: &SheetDefaults,
    key: ClipKey,
    partial: &PartialAnimationDef,
) -> Option<AnimationDef> {
    let start_gid = match partial.start_gid.unwrap_or(0) {
        v if v < 0 => {
            log::warn!(
                "Sheet '{}': clip '{}' has negative startGID {}; using 0",
                sheet.name,
                key,
                v
            );
            0
        }
        v => u32::try_from(v).unwrap_or(u32::MAX),
    };

    let mut stop_gid = match partial.stop_gid {
        Some(v) if v >= i64::from(start_gid) => u32::try_from(v).unwrap_or(u32::MAX),
        Some(v) => {
            log::warn!(
                "Sheet '{}': clip '{}' has stopGID {} < startGID {}; using a single frame",
                sheet.name,
                key,
                v,
                start_gid
            );
            start_gid
        }
        None => {
            log::warn!(
                "Sheet '{}': clip '{}' has no stopGID; using a single frame",
                sheet.name,
                key
            );
            start_gid
        }
    };

    if let Some(count) = sheet.tile_count {
        if start_gid >= count {
            log::warn!(
                "Sheet '{}': clip '{}' starts at GID {} beyond tile count {}; dropping it",
                sheet.name,
                key,
                start_gid,
                count
            );
            return None;
        }
        if stop_gid >= count {
            log::warn!(
                "Sheet '{}': clip '{}' stopGID {} beyond tile count {}; clamping",
                sheet.name,
                key,
                stop_gid,
                count
            );
            stop_gid = count - 1;
        }
    }

    Some(AnimationDef {
        start_gid,
        stop_gid,
        ticks: partial.ticks.or(defaults.ticks),
        update_rate: partial.update_rate.or(defaults.update_rate),
        ticks_multiplier: partial.ticks_multiplier.unwrap_or(1.0),
        update_rate_multiplier: partial.update_rate_multiplier.unwrap_or(1.0),
        is_permanent: partial.is_permanent.unwrap_or(false),
        is_default: partial.is_default.unwrap_or(false),
        footprint: UVec2::new(
            partial.width.or(defaults.width).unwrap_or(1),
            partial.height.or(defaults.height).unwrap_or(1),
        ),
        inverted: partial.inverted.unwrap_or(defaults.inverted),
        looping: partial.looping,
        key,
    })
}

fn check_direction_coverage(sheet: &str, clips: &HashMap<String, ClipVariants>) {
    for (name, variants) in clips {
        if variants.directional.iter().all(Option::is_none) {
            continue;
        }
        let missing: Vec<&str> = Direction::ALL
            .iter()
            .filter(|dir| variants.directional[dir.index()].is_none())
            .map(|dir| dir.tag())
            .collect();
        if !missing.is_empty() {
            log::warn!(
                "Sheet '{}': multidirectional clip '{}' is missing directions [{}]",
                sheet,
                name,
                missing.join(", ")
            );
        }
    }
}
