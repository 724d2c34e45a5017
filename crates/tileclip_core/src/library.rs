//! Library of loaded sheet catalogs.
//!
//! Holds one shared [`AnimationCatalog`] per sheet name so that every entity
//! using a sheet points at the same immutable table.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::catalog::{AnimationCatalog, AnimationDef};
use crate::error::LoadError;
use crate::tiled_json::load_catalog_from_path;

#[derive(Debug, Clone, Default)]
pub struct CatalogLibrary {
    /// sheet name -> catalog
    catalogs: HashMap<String, Arc<AnimationCatalog>>,
}

impl CatalogLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a tileset JSON file and register its catalog under the sheet name.
    /// Returns the sheet name.
    pub fn load_file(&mut self, path: &Path) -> Result<String, LoadError> {
        let catalog = load_catalog_from_path(path)?;
        let name = catalog.sheet().name.clone();
        self.insert(catalog);
        Ok(name)
    }

    /// Register a catalog, replacing any previous one with the same sheet name.
    pub fn insert(&mut self, catalog: AnimationCatalog) -> Arc<AnimationCatalog> {
        let name = catalog.sheet().name.clone();
        let shared = Arc::new(catalog);
        if self.catalogs.insert(name.clone(), Arc::clone(&shared)).is_some() {
            log::info!("Replaced catalog '{}'", name);
        }
        shared
    }

    pub fn get(&self, sheet: &str) -> Option<Arc<AnimationCatalog>> {
        self.catalogs.get(sheet).cloned()
    }

    pub fn remove(&mut self, sheet: &str) -> Option<Arc<AnimationCatalog>> {
        self.catalogs.remove(sheet)
    }

    pub fn clear(&mut self) {
        self.catalogs.clear();
    }

    pub fn len(&self) -> usize {
        self.catalogs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalogs.is_empty()
    }

    /// Sheet names, sorted.
    pub fn sheet_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.catalogs.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Find an undirected or directional clip by name. If `sheet` is given,
    /// only that sheet is searched; otherwise sheets are searched in name order
    /// and the first match wins.
    pub fn find_clip(&self, sheet: Option<&str>, name: &str) -> Option<&AnimationDef> {
        if let Some(sheet) = sheet {
            return self.catalogs.get(sheet).and_then(|c| first_variant(c, name));
        }
        self.sheet_names()
            .into_iter()
            .find_map(|sheet| first_variant(&self.catalogs[sheet], name))
    }
}

fn first_variant<'a>(catalog: &'a AnimationCatalog, name: &str) -> Option<&'a AnimationDef> {
    catalog.iter().find(|def| def.key.name == name)
}
