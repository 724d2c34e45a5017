//! Clip resolver: turns a play request into a concrete, timed frame list.
//!
//! Resolution is stateless and deterministic. Durations are recomputed from
//! integer bounds on every call, so repeated resolution never accumulates
//! rounding drift.
//!
//! Direction lookup order for `resolve(name, direction, facing_fallback)`:
//!
//! 1. the requested direction (or the undirected clip when none is requested)
//! 2. `facing_fallback`
//! 3. the policy's `direction_fallback` list
//! 4. the first lexically available direction (`e`, `n`, `s`, `w`)
//! 5. the undirected clip
//!
//! Per-tile override blocks are consulted after lookup, frame by frame.

use crate::catalog::{AnimationCatalog, AnimationDef};
use crate::direction::Direction;
use crate::error::ResolveError;
use crate::policy::{FrameLayout, PlaybackPolicy};
use crate::schema::ClipKey;
use crate::sheet::TileSheet;

/// What happens when playback reaches the last frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipEnd {
    /// Wrap to frame 0.
    Loop,
    /// Stay on the last frame.
    Hold,
    /// Hand control back to the idle clip.
    ReturnToIdle,
}

/// One displayed tile and how long it stays on screen, in ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub gid: u32,
    pub duration: u64,
}

/// Immutable, fully timed clip ready for playback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedClip {
    key: ClipKey,
    frames: Vec<Frame>,
    total_duration: u64,
    is_permanent: bool,
    is_default: bool,
    end: ClipEnd,
}

impl ResolvedClip {
    /// A looping single-frame clip showing `gid`. Used as the idle fallback of
    /// sheets without any idle clip.
    pub fn still(name: impl Into<String>, gid: u32) -> Self {
        Self {
            key: ClipKey::new(name, None),
            frames: vec![Frame { gid, duration: 1 }],
            total_duration: 1,
            is_permanent: false,
            is_default: true,
            end: ClipEnd::Loop,
        }
    }

    pub fn key(&self) -> &ClipKey {
        &self.key
    }

    pub fn name(&self) -> &str {
        &self.key.name
    }

    pub fn direction(&self) -> Option<Direction> {
        self.key.direction
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// GID shown at frame `index`.
    pub fn gid(&self, index: usize) -> Option<u32> {
        self.frames.get(index).map(|frame| frame.gid)
    }

    pub fn gids(&self) -> Vec<u32> {
        self.frames.iter().map(|frame| frame.gid).collect()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Duration of one full pass, in ticks.
    pub fn total_duration(&self) -> u64 {
        self.total_duration
    }

    pub fn is_permanent(&self) -> bool {
        self.is_permanent
    }

    pub fn is_default(&self) -> bool {
        self.is_default
    }

    pub fn end(&self) -> ClipEnd {
        self.end
    }

    /// Ticks from the start of the clip to the start of frame `index`.
    pub fn offset_of(&self, index: usize) -> u64 {
        total_ticks(&self.frames[..index.min(self.frames.len())])
    }

    /// Same frames, with the permanence and end behaviour of another clip.
    pub fn with_terminal_of(mut self, other: &ResolvedClip) -> Self {
        self.is_permanent = other.is_permanent;
        self.end = other.end;
        self
    }
}

/// Stateless resolver parameterized by the engine's playback policy.
#[derive(Debug, Clone, Default)]
pub struct ClipResolver {
    policy: PlaybackPolicy,
}

impl ClipResolver {
    pub fn new(policy: PlaybackPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &PlaybackPolicy {
        &self.policy
    }

    /// Resolve `name` (optionally facing `direction`) into a timed clip.
    pub fn resolve(
        &self,
        catalog: &AnimationCatalog,
        name: &str,
        direction: Option<Direction>,
        facing_fallback: Option<Direction>,
    ) -> Result<ResolvedClip, ResolveError> {
        let unknown = || ResolveError::UnknownAnimation {
            name: name.to_string(),
            direction,
        };

        let def = self
            .find_def(catalog, name, direction, facing_fallback)
            .ok_or_else(unknown)?;

        let sheet = catalog.sheet();
        let overrides = catalog.tile_overrides();

        let gids: Vec<u32> = self
            .enumerate_gids(def, sheet)
            .into_iter()
            .filter(|&gid| {
                let suppressed = overrides
                    .get(gid, &def.key)
                    .is_some_and(|record| record.suppressed);
                if suppressed {
                    log::debug!("Clip '{}' skips suppressed tile {}", def.key, gid);
                }
                !suppressed
            })
            .collect();

        if gids.is_empty() {
            log::warn!(
                "Clip '{}' on sheet '{}' is suppressed on every tile",
                def.key,
                sheet.name
            );
            return Err(unknown());
        }

        let durations = self.frame_durations(def, gids.len());
        let frames: Vec<Frame> = gids
            .into_iter()
            .zip(durations)
            .map(|(gid, duration)| {
                let duration = match overrides.get(gid, &def.key) {
                    Some(record) => {
                        let multiplier = if def.update_rate.is_some() || def.ticks.is_none() {
                            record.update_rate_multiplier.or(record.ticks_multiplier)
                        } else {
                            record.ticks_multiplier.or(record.update_rate_multiplier)
                        };
                        match multiplier {
                            Some(m) => scale_ticks(duration, m),
                            None => duration,
                        }
                    }
                    None => duration,
                };
                Frame { gid, duration }
            })
            .collect();

        let total_duration = total_ticks(&frames);

        Ok(ResolvedClip {
            key: def.key.clone(),
            frames,
            total_duration,
            is_permanent: def.is_permanent,
            is_default: def.is_default,
            end: self.clip_end(def),
        })
    }

    /// Resolve the idle clip: the one marked `isDefault`, else the policy's
    /// default name, else a still of GID 0. Idle always loops.
    pub fn resolve_idle(
        &self,
        catalog: &AnimationCatalog,
        facing: Option<Direction>,
    ) -> ResolvedClip {
        let name = catalog.default_clip_name().or_else(|| {
            catalog
                .contains_name(&self.policy.default_clip_name)
                .then_some(self.policy.default_clip_name.as_str())
        });

        match name.map(|name| self.resolve(catalog, name, facing, None)) {
            Some(Ok(mut clip)) => {
                clip.end = ClipEnd::Loop;
                clip
            }
            Some(Err(err)) => {
                log::warn!("Idle clip unavailable ({}); using a still frame", err);
                ResolvedClip::still(self.policy.default_clip_name.clone(), 0)
            }
            None => ResolvedClip::still(self.policy.default_clip_name.clone(), 0),
        }
    }

    /// Catalog record chosen for a request, following the fallback order.
    pub fn find_def<'a>(
        &self,
        catalog: &'a AnimationCatalog,
        name: &str,
        direction: Option<Direction>,
        facing_fallback: Option<Direction>,
    ) -> Option<&'a AnimationDef> {
        let candidates = std::iter::once(direction)
            .chain(facing_fallback.map(Some))
            .chain(self.policy.direction_fallback.iter().copied().map(Some))
            .chain(Direction::ALL.into_iter().map(Some))
            .chain(std::iter::once(None));

        for candidate in candidates {
            if let Some(def) = catalog.lookup(name, candidate) {
                if candidate != direction {
                    log::debug!(
                        "Clip '{}' requested as {:?}; falling back to '{}'",
                        name,
                        direction,
                        def.key
                    );
                }
                return Some(def);
            }
        }
        None
    }

    /// Tile GIDs of `def` in playback order.
    pub fn enumerate_gids(&self, def: &AnimationDef, sheet: &TileSheet) -> Vec<u32> {
        let mut gids = match self.policy.frame_layout {
            FrameLayout::Packed => {
                let stride = def.block_size() as usize;
                (def.start_gid..=def.stop_gid).step_by(stride).collect::<Vec<_>>()
            }
            FrameLayout::Grid => grid_gids(def, sheet.columns),
        };
        if def.inverted {
            gids.reverse();
        }
        gids
    }

    /// Per-frame durations for `count` frames of `def`.
    ///
    /// With an update rate every frame lasts `rate * multiplier`. With only a
    /// tick budget, `ticks * multiplier` is split evenly (rounding down) and the
    /// last frame takes the remainder. No frame is shorter than one tick.
    pub fn frame_durations(&self, def: &AnimationDef, count: usize) -> Vec<u64> {
        if count == 0 {
            return Vec::new();
        }
        if let Some(rate) = def.update_rate {
            let per_frame = scale_ticks(u64::from(rate), def.update_rate_multiplier);
            return vec![per_frame; count];
        }
        if let Some(ticks) = def.ticks {
            let count_u64 = count as u64;
            let total = scale_ticks(u64::from(ticks), def.ticks_multiplier).max(count_u64);
            let per_frame = total / count_u64;
            let mut durations = vec![per_frame; count];
            durations[count - 1] = total - per_frame * (count_u64 - 1);
            return durations;
        }
        let per_frame = scale_ticks(
            u64::from(self.policy.fallback_update_rate),
            def.update_rate_multiplier,
        );
        vec![per_frame; count]
    }

    fn clip_end(&self, def: &AnimationDef) -> ClipEnd {
        let held = self.policy.is_held(&def.key.name);
        if def.is_permanent {
            return if held { ClipEnd::Hold } else { ClipEnd::ReturnToIdle };
        }
        match def
            .looping
            .or_else(|| self.policy.loop_override(&def.key.name))
        {
            Some(true) => ClipEnd::Loop,
            Some(false) => ClipEnd::Hold,
            None if held => ClipEnd::Hold,
            None => ClipEnd::Loop,
        }
    }
}

/// Resolve with the default policy.
pub fn resolve(
    catalog: &AnimationCatalog,
    name: &str,
    direction: Option<Direction>,
    facing_fallback: Option<Direction>,
) -> Result<ResolvedClip, ResolveError> {
    ClipResolver::default().resolve(catalog, name, direction, facing_fallback)
}

/// `base * multiplier`, rounded down, never below one tick.
fn scale_ticks(base: u64, multiplier: f64) -> u64 {
    // Nudge before flooring so 0.1-style multipliers do not lose a tick to
    // binary representation error.
    let scaled = (base as f64 * multiplier + 1e-9).floor();
    if scaled.is_finite() && scaled >= 1.0 {
        scaled as u64
    } else {
        1
    }
}

/// Sum of frame durations, saturating at `u64::MAX`.
fn total_ticks(frames: &[Frame]) -> u64 {
    frames
        .iter()
        .fold(0u64, |total, frame| total.saturating_add(frame.duration))
}

fn grid_gids(def: &AnimationDef, columns: u32) -> Vec<u32> {
    let width = def.footprint.x.max(1);
    let band_skip = columns.saturating_mul(def.footprint.y.max(1) - 1);
    let mut gids = Vec::new();
    let mut gid = def.start_gid;
    while gid <= def.stop_gid {
        gids.push(gid);
        let mut next = gid.saturating_add(width);
        if next / columns != gid / columns {
            next = next.saturating_add(band_skip);
        }
        if next == gid {
            break;
        }
        gid = next;
    }
    gids
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::{PropertyMap, PropertyValue, SheetTree};
    use pretty_assertions::assert_eq;

    fn clip(members: PropertyMap) -> PropertyValue {
        PropertyValue::Class {
            class: Some("animation".to_string()),
            members,
        }
    }

    fn range(start: i64, stop: i64) -> PropertyMap {
        PropertyMap::new()
            .with("startGID", PropertyValue::Int(start))
            .with("stopGID", PropertyValue::Int(stop))
    }

    fn catalog(properties: PropertyMap) -> AnimationCatalog {
        AnimationCatalog::from_tree(&SheetTree {
            name: "test".to_string(),
            tile_width: Some(32),
            tile_height: Some(32),
            columns: Some(8),
            tile_count: Some(88),
            properties,
            ..SheetTree::default()
        })
        .expect("valid sheet")
    }

    #[test]
    fn forward_and_inverted_enumeration() {
        let forward = catalog(PropertyMap::new().with("animation-walk", clip(range(10, 13))));
        let clip_fwd = resolve(&forward, "walk", None, None).expect("walk");
        assert_eq!(clip_fwd.gids(), vec![10, 11, 12, 13]);

        let inverted = catalog(
            PropertyMap::new()
                .with("inverted", PropertyValue::Bool(true))
                .with("animation-walk", clip(range(10, 13))),
        );
        let clip_inv = resolve(&inverted, "walk", None, None).expect("walk");
        assert_eq!(clip_inv.gids(), vec![13, 12, 11, 10]);
    }

    #[test]
    fn frame_count_follows_block_stride() {
        for (start, stop, width, height) in [(0, 7, 1, 1), (0, 7, 2, 1), (4, 21, 2, 2), (3, 3, 3, 1)] {
            let cat = catalog(
                PropertyMap::new()
                    .with("animation-width", PropertyValue::Int(width))
                    .with("animation-height", PropertyValue::Int(height))
                    .with("animation-run", clip(range(start, stop))),
            );
            let resolved = resolve(&cat, "run", None, None).expect("run");
            let expected = ((stop - start) / (width * height) + 1) as usize;
            assert_eq!(resolved.len(), expected, "range {start}..={stop} block {width}x{height}");
            assert!(resolved.frames().iter().all(|f| f.gid < 88));
        }
    }

    #[test]
    fn ticks_are_spread_with_remainder_on_last_frame() {
        let cat = catalog(
            PropertyMap::new()
                .with("animation-ticks", PropertyValue::Int(200))
                .with(
                    "animation-attack",
                    clip(range(0, 3).with("ticks-multiplier", PropertyValue::Float(0.5))),
                )
                .with("animation-idle", clip(range(4, 6))),
        );
        let attack = resolve(&cat, "attack", None, None).expect("attack");
        assert_eq!(attack.total_duration(), 100);
        let durations: Vec<u64> = attack.frames().iter().map(|f| f.duration).collect();
        assert_eq!(durations, vec![25, 25, 25, 25]);

        let idle = resolve(&cat, "idle", None, None).expect("idle");
        let durations: Vec<u64> = idle.frames().iter().map(|f| f.duration).collect();
        assert_eq!(durations, vec![66, 66, 68]);
        assert_eq!(idle.total_duration(), 200);
    }

    #[test]
    fn update_rate_wins_over_ticks() {
        let cat = catalog(
            PropertyMap::new()
                .with("animation-ticks", PropertyValue::Int(200))
                .with("animation-update-rate", PropertyValue::Int(10))
                .with(
                    "animation-damaged",
                    clip(range(0, 2).with(
                        "animation-update-rate-multiplier",
                        PropertyValue::Float(2.5),
                    )),
                ),
        );
        let damaged = resolve(&cat, "damaged", None, None).expect("damaged");
        assert!(damaged.frames().iter().all(|f| f.duration == 25));
        assert_eq!(damaged.total_duration(), 75);
    }

    #[test]
    fn fallback_rate_used_without_timing() {
        let cat = catalog(PropertyMap::new().with("animation-idle", clip(range(0, 1))));
        let idle = resolve(&cat, "idle", None, None).expect("idle");
        assert_eq!(idle.frames()[0].duration, 10);
    }

    #[test]
    fn tiny_tick_budget_still_gives_every_frame_a_tick() {
        let cat = catalog(
            PropertyMap::new()
                .with("animation-ticks", PropertyValue::Int(2))
                .with("animation-walk", clip(range(0, 4))),
        );
        let walk = resolve(&cat, "walk", None, None).expect("walk");
        assert!(walk.frames().iter().all(|f| f.duration >= 1));
        assert_eq!(walk.total_duration(), 5);
    }

    #[test]
    fn missing_start_resolves_from_zero() {
        let cat = catalog(PropertyMap::new().with(
            "animation-idle",
            clip(PropertyMap::new().with("stopGID", PropertyValue::Int(3))),
        ));
        let idle = resolve(&cat, "idle", None, None).expect("idle");
        assert_eq!(idle.gids(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn unknown_name_is_an_error() {
        let mut props = PropertyMap::new();
        for (i, name) in ["idle", "walk", "attack-meele", "damaged", "death"]
            .iter()
            .enumerate()
        {
            let start = (i * 8) as i64;
            props.insert(format!("animation-{name}"), clip(range(start, start + 3)));
        }
        let cat = catalog(props);
        assert_eq!(
            resolve(&cat, "fly", None, None),
            Err(ResolveError::UnknownAnimation {
                name: "fly".to_string(),
                direction: None,
            })
        );
        assert!(resolve(&cat, "attack-meele", None, None).is_ok());
    }

    #[test]
    fn resolution_is_deterministic() {
        let cat = catalog(
            PropertyMap::new()
                .with("animation-ticks", PropertyValue::Int(97))
                .with("animation-walk", clip(range(8, 14))),
        );
        let a = resolve(&cat, "walk", None, None).expect("walk");
        let b = resolve(&cat, "walk", None, None).expect("walk");
        assert_eq!(a, b);
    }

    fn directional_catalog() -> AnimationCatalog {
        catalog(
            PropertyMap::new()
                .with("multidirectional", PropertyValue::Bool(true))
                .with("animation-walk=n", clip(range(0, 1)))
                .with("animation-walk=w", clip(range(2, 3)))
                .with("animation-walk=e", clip(range(4, 5)))
                .with("animation-death=w", clip(range(6, 7)))
                .with("animation-death=n", clip(range(8, 9)))
                .with("animation-blink", clip(range(10, 11))),
        )
    }

    #[test]
    fn exact_direction_is_preferred() {
        let cat = directional_catalog();
        let walk = resolve(&cat, "walk", Some(Direction::West), None).expect("walk");
        assert_eq!(walk.direction(), Some(Direction::West));
        assert_eq!(walk.gids(), vec![2, 3]);
    }

    #[test]
    fn missing_direction_uses_facing_then_policy_then_lexical() {
        let cat = directional_catalog();

        // South is missing; facing fallback North exists.
        let walk = resolve(&cat, "walk", Some(Direction::South), Some(Direction::North))
            .expect("walk");
        assert_eq!(walk.direction(), Some(Direction::North));

        // No facing; policy prefers South (missing), lexical first is East.
        let walk = resolve(&cat, "walk", Some(Direction::South), None).expect("walk");
        assert_eq!(walk.direction(), Some(Direction::East));

        // death has only n and w; lexical first is North.
        let death = resolve(&cat, "death", None, None).expect("death");
        assert_eq!(death.direction(), Some(Direction::North));

        let resolver = ClipResolver::new(PlaybackPolicy {
            direction_fallback: vec![Direction::West],
            ..PlaybackPolicy::default()
        });
        let death = resolver
            .resolve(&cat, "death", Some(Direction::South), None)
            .expect("death");
        assert_eq!(death.direction(), Some(Direction::West));
    }

    #[test]
    fn undirected_clip_serves_directional_requests() {
        let cat = directional_catalog();
        let blink = resolve(&cat, "blink", Some(Direction::East), None).expect("blink");
        assert_eq!(blink.direction(), None);
        assert_eq!(blink.gids(), vec![10, 11]);
    }

    #[test]
    fn clip_end_rules() {
        let cat = catalog(
            PropertyMap::new()
                .with("animation-walk", clip(range(0, 1)))
                .with(
                    "animation-attack",
                    clip(range(2, 3).with("isPermanent", PropertyValue::Bool(true))),
                )
                .with(
                    "animation-death",
                    clip(range(4, 5).with("isPermanent", PropertyValue::Bool(true))),
                )
                .with(
                    "animation-jump",
                    clip(range(6, 7).with("loop", PropertyValue::Bool(false))),
                )
                .with("animation-blink", clip(range(8, 9))),
        );
        let resolver = ClipResolver::new(PlaybackPolicy {
            loop_overrides: [("blink".to_string(), false)].into_iter().collect(),
            ..PlaybackPolicy::default()
        });
        let end = |name: &str| resolver.resolve(&cat, name, None, None).expect(name).end();
        assert_eq!(end("walk"), ClipEnd::Loop);
        assert_eq!(end("attack"), ClipEnd::ReturnToIdle);
        assert_eq!(end("death"), ClipEnd::Hold);
        assert_eq!(end("jump"), ClipEnd::Hold);
        assert_eq!(end("blink"), ClipEnd::Hold);
    }

    #[test]
    fn tile_overrides_suppress_and_rescale_frames() {
        let mut tree = SheetTree {
            name: "microwave".to_string(),
            tile_width: Some(80),
            tile_height: Some(80),
            columns: Some(15),
            tile_count: Some(75),
            properties: PropertyMap::new()
                .with("animation-update-rate", PropertyValue::Int(8))
                .with("animation-attack", clip(range(10, 14)))
                .with("animation-idle", clip(range(45, 49))),
            ..SheetTree::default()
        };
        tree.tiles
            .insert(14, PropertyMap::new().with("animation-attack", clip(PropertyMap::new())));
        tree.tiles.insert(
            46,
            PropertyMap::new().with(
                "animation-idle",
                clip(PropertyMap::new().with(
                    "animation-update-rate-multiplier",
                    PropertyValue::Float(3.0),
                )),
            ),
        );
        let cat = AnimationCatalog::from_tree(&tree).expect("valid sheet");

        let attack = resolve(&cat, "attack", None, None).expect("attack");
        assert_eq!(attack.gids(), vec![10, 11, 12, 13]);

        let idle = resolve(&cat, "idle", None, None).expect("idle");
        let durations: Vec<u64> = idle.frames().iter().map(|f| f.duration).collect();
        assert_eq!(durations, vec![8, 24, 8, 8, 8]);
    }

    #[test]
    fn fully_suppressed_clip_is_unknown() {
        let mut tree = SheetTree {
            name: "s".to_string(),
            tile_width: Some(16),
            tile_height: Some(16),
            columns: Some(4),
            tile_count: Some(16),
            properties: PropertyMap::new().with("animation-pose", clip(range(5, 5))),
            ..SheetTree::default()
        };
        tree.tiles
            .insert(5, PropertyMap::new().with("animation-pose", clip(PropertyMap::new())));
        let cat = AnimationCatalog::from_tree(&tree).expect("valid sheet");
        assert!(matches!(
            resolve(&cat, "pose", None, None),
            Err(ResolveError::UnknownAnimation { .. })
        ));
    }

    #[test]
    fn grid_layout_skips_row_bands() {
        let cat = catalog(
            PropertyMap::new()
                .with("animation-width", PropertyValue::Int(2))
                .with("animation-height", PropertyValue::Int(2))
                .with("animation-run", clip(range(4, 23))),
        );
        let resolver = ClipResolver::new(PlaybackPolicy {
            frame_layout: FrameLayout::Grid,
            ..PlaybackPolicy::default()
        });
        let run = resolver.resolve(&cat, "run", None, None).expect("run");
        // 8 columns: blocks at 4, 6, then the next band starts two rows down.
        assert_eq!(run.gids(), vec![4, 6, 16, 18, 20, 22]);
    }

    #[test]
    fn idle_prefers_marked_default_then_policy_name_then_still() {
        let marked = catalog(
            PropertyMap::new()
                .with("animation-idle", clip(range(0, 1)))
                .with(
                    "animation-rest",
                    clip(
                        range(2, 3)
                            .with("isDefault", PropertyValue::Bool(true))
                            .with("isPermanent", PropertyValue::Bool(true)),
                    ),
                ),
        );
        let resolver = ClipResolver::default();
        let idle = resolver.resolve_idle(&marked, None);
        assert_eq!(idle.name(), "rest");
        assert_eq!(idle.end(), ClipEnd::Loop);

        let named = catalog(PropertyMap::new().with("animation-idle", clip(range(0, 1))));
        assert_eq!(resolver.resolve_idle(&named, None).gids(), vec![0, 1]);

        let bare = catalog(PropertyMap::new().with("animation-walk", clip(range(4, 5))));
        let still = resolver.resolve_idle(&bare, None);
        assert_eq!(still.gids(), vec![0]);
        assert_eq!(still.end(), ClipEnd::Loop);
    }

    #[test]
    fn huge_multiplier_saturates_instead_of_overflowing() {
        let cat = catalog(
            PropertyMap::new()
                .with("animation-update-rate", PropertyValue::Int(10))
                .with(
                    "animation-stall",
                    clip(range(0, 1).with("update-rate-multiplier", PropertyValue::Float(1e18))),
                ),
        );
        let stall = resolve(&cat, "stall", None, None).expect("stall");
        assert_eq!(stall.frames()[0].duration, 10_000_000_000_000_000_000);
        assert_eq!(stall.total_duration(), u64::MAX);
        assert_eq!(stall.offset_of(2), u64::MAX);
        assert_eq!(stall.offset_of(1), 10_000_000_000_000_000_000);
    }

    #[test]
    fn offset_of_sums_previous_durations() {
        let cat = catalog(
            PropertyMap::new()
                .with("animation-ticks", PropertyValue::Int(10))
                .with("animation-walk", clip(range(0, 2))),
        );
        let walk = resolve(&cat, "walk", None, None).expect("walk");
        assert_eq!(walk.offset_of(0), 0);
        assert_eq!(walk.offset_of(2), 6);
        assert_eq!(walk.offset_of(3), 10);
    }
}
