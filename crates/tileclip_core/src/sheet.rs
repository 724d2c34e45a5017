//! Tile-sheet geometry.
//!
//! GIDs are zero-based and row-major by `columns`. The image itself is never
//! sampled here; only its tile grid matters.

use std::collections::BTreeMap;

use glam::UVec2;

/// Validated geometry and metadata of one sprite sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct TileSheet {
    pub name: String,
    pub tile_size: UVec2,
    pub columns: u32,
    /// Number of addressable tiles, when known. `None` means the sheet declared
    /// neither a tile count nor an image size, so GIDs cannot be bounds-checked.
    pub tile_count: Option<u32>,
    pub image_source: Option<String>,
    /// Primitive sheet properties the parser does not interpret, kept verbatim.
    pub custom: BTreeMap<String, String>,
}

/// Pixel rectangle of one tile inside the sheet image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRect {
    pub origin: UVec2,
    pub size: UVec2,
}

impl TileSheet {
    /// Whether `gid` addresses a tile of this sheet.
    pub fn contains(&self, gid: u32) -> bool {
        match self.tile_count {
            Some(count) => gid < count,
            None => true,
        }
    }

    /// Number of tile rows, when the tile count is known.
    pub fn rows(&self) -> Option<u32> {
        self.tile_count.map(|count| count.div_ceil(self.columns))
    }

    /// Column/row cell of a GID.
    pub fn cell(&self, gid: u32) -> UVec2 {
        UVec2::new(gid % self.columns, gid / self.columns)
    }

    /// Pixel rectangle of `gid`, or `None` when it lies outside the sheet.
    pub fn source_rect(&self, gid: u32) -> Option<TileRect> {
        if !self.contains(gid) {
            return None;
        }
        Some(TileRect {
            origin: self.cell(gid) * self.tile_size,
            size: self.tile_size,
        })
    }
}
