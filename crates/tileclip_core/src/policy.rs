//! Engine-level playback policy.
//!
//! Sheet data leaves a few decisions open: which direction to use when a
//! multidirectional clip lacks the requested one, which clips loop, which clip
//! is the idle fallback when none is marked `isDefault`. The consuming engine
//! supplies those answers here, either in code or from a JSON file:
//!
//! ```json
//! {
//!   "direction_fallback": ["s", "e"],
//!   "default_clip_name": "idle",
//!   "held_clips": ["death"],
//!   "loop_overrides": { "attack-meele": false },
//!   "fallback_update_rate": 10,
//!   "frame_layout": "packed"
//! }
//! ```
//!
//! Every field is optional.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::direction::Direction;
use crate::error::ConfigError;

/// How multi-tile frame blocks are laid out on the sheet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameLayout {
    /// Blocks are consecutive runs of `width * height` GIDs.
    #[default]
    Packed,
    /// Blocks sit side by side along a row band `height` rows tall. Frames
    /// advance by `width`; crossing into the next band skips `height - 1` rows.
    Grid,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlaybackPolicy {
    /// Directions tried, in order, after the requested direction and the
    /// caller's facing fallback. Lexical order is the final fallback.
    #[serde(default = "default_direction_fallback")]
    pub direction_fallback: Vec<Direction>,
    /// Idle clip used when no clip is marked `isDefault`.
    #[serde(default = "default_clip_name")]
    pub default_clip_name: String,
    /// Clips that hold their final frame instead of looping or returning to idle.
    #[serde(default = "default_held_clips")]
    pub held_clips: Vec<String>,
    /// Forced looping flag per clip name, for non-permanent clips.
    #[serde(default)]
    pub loop_overrides: BTreeMap<String, bool>,
    /// Per-frame duration when neither clip nor sheet declares a timing base.
    #[serde(default = "default_fallback_update_rate")]
    pub fallback_update_rate: u32,
    #[serde(default)]
    pub frame_layout: FrameLayout,
}

impl Default for PlaybackPolicy {
    fn default() -> Self {
        Self {
            direction_fallback: default_direction_fallback(),
            default_clip_name: default_clip_name(),
            held_clips: default_held_clips(),
            loop_overrides: BTreeMap::new(),
            fallback_update_rate: default_fallback_update_rate(),
            frame_layout: FrameLayout::default(),
        }
    }
}

impl PlaybackPolicy {
    pub fn is_held(&self, name: &str) -> bool {
        self.held_clips.iter().any(|held| held == name)
    }

    pub fn loop_override(&self, name: &str) -> Option<bool> {
        self.loop_overrides.get(name).copied()
    }
}

/// Load a playback policy from a JSON file.
pub fn load_policy_from_path(path: &Path) -> Result<PlaybackPolicy, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let policy: PlaybackPolicy =
        serde_json::from_str(&raw).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?;
    validate_policy(&policy)?;
    Ok(policy)
}

pub fn validate_policy(policy: &PlaybackPolicy) -> Result<(), ConfigError> {
    if policy.fallback_update_rate == 0 {
        return Err(ConfigError::Invalid(
            "fallback_update_rate must be > 0".to_string(),
        ));
    }
    if policy.default_clip_name.trim().is_empty() {
        return Err(ConfigError::Invalid(
            "default_clip_name is empty".to_string(),
        ));
    }
    let mut seen = HashSet::new();
    for dir in &policy.direction_fallback {
        if !seen.insert(*dir) {
            return Err(ConfigError::Invalid(format!(
                "direction_fallback lists '{}' twice",
                dir
            )));
        }
    }
    Ok(())
}

fn default_direction_fallback() -> Vec<Direction> {
    vec![Direction::South]
}

fn default_clip_name() -> String {
    "idle".to_string()
}

fn default_held_clips() -> Vec<String> {
    vec!["death".to_string()]
}

const fn default_fallback_update_rate() -> u32 {
    10
}
