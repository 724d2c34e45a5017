pub mod catalog;
pub mod direction;
pub mod error;
pub mod library;
pub mod policy;
pub mod property;
pub mod resolver;
pub mod scheduler;
pub mod schema;
pub mod sheet;
pub mod tiled_json;
pub mod time;

pub use catalog::{AnimationCatalog, AnimationDef};
pub use direction::Direction;
pub use error::{ConfigError, LoadError, ResolveError, SchemaError};
pub use library::CatalogLibrary;
pub use policy::{load_policy_from_path, FrameLayout, PlaybackPolicy};
pub use property::{ImageInfo, PropertyMap, PropertyValue, SheetTree};
pub use resolver::{ClipEnd, ClipResolver, Frame, ResolvedClip};
pub use scheduler::{
    Advance, AnimationCursor, PlaybackRate, PlaybackScheduler, PlaybackState, RequestOutcome,
};
pub use schema::{parse_sheet, ClipKey, ParsedSheet};
pub use sheet::{TileRect, TileSheet};
pub use tiled_json::{load_catalog_from_path, load_sheet_from_path};
pub use time::StepClock;
