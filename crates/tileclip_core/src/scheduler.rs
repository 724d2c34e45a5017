//! Playback scheduler: the per-entity animation state machine.
//!
//! ```text
//!            request(clip)                 request(permanent clip)
//!   Idle ───────────────────► Playing ───────────────────────────► Locked
//!    ▲                          │  ▲                                  │
//!    │        reset()           │  └── request(other) restarts        │
//!    └──────────────────────────┴──────────────────────────────────────┘
//!                    terminal frame of a permanent clip, or reset()
//! ```
//!
//! All timing is integer ticks. A [`PlaybackRate`] scales incoming `dt` in
//! percent; elapsed time is stored pre-scaled so fractional rates never lose
//! time between ticks. `advance` is bounded: a looping clip reduces long `dt`
//! values modulo its cycle length instead of stepping frame by frame.

use std::sync::Arc;

use crate::catalog::AnimationCatalog;
use crate::direction::Direction;
use crate::error::ResolveError;
use crate::resolver::{ClipEnd, ClipResolver, ResolvedClip};

/// Fixed-point scale of [`PlaybackRate`]: 100 means 1x.
const RATE_SCALE: u64 = 100;

/// Playback speed in percent. `NORMAL` is 100; `PAUSED` freezes the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlaybackRate(u32);

impl PlaybackRate {
    pub const NORMAL: Self = Self(100);
    pub const PAUSED: Self = Self(0);

    pub fn from_percent(percent: u32) -> Self {
        Self(percent)
    }

    /// Nearest whole percent of `multiplier`. Negative or NaN becomes paused.
    pub fn from_multiplier(multiplier: f64) -> Self {
        if !multiplier.is_finite() || multiplier <= 0.0 {
            return Self::PAUSED;
        }
        let percent = (multiplier * RATE_SCALE as f64).round();
        Self(percent.min(u32::MAX as f64) as u32)
    }

    pub fn percent(self) -> u32 {
        self.0
    }
}

impl Default for PlaybackRate {
    fn default() -> Self {
        Self::NORMAL
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// Showing the idle clip.
    Idle,
    /// Showing a requested, interruptible clip.
    Playing,
    /// Showing a permanent clip; requests are ignored until it ends.
    Locked,
}

/// Result of a play request that was not rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// A different clip started at frame 0.
    Started,
    /// The active clip was requested again and restarted at frame 0.
    Restarted,
    /// A permanent clip holds the lock; nothing changed.
    Ignored,
}

/// What happened during one `advance` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Advance {
    /// Frame steps taken, counting wraps.
    pub frames_advanced: u64,
    /// Full passes completed by a looping clip.
    pub loops: u64,
    /// A non-looping clip played past its last frame.
    pub finished: bool,
    /// The lock was released and the cursor went back to idle.
    pub returned_to_idle: bool,
}

/// Position of one entity inside its current clip.
#[derive(Debug, Clone)]
pub struct AnimationCursor {
    clip: Arc<ResolvedClip>,
    frame_index: usize,
    /// Time spent on the current frame, in ticks x `RATE_SCALE`.
    elapsed: u64,
    locked: bool,
    finished: bool,
}

impl AnimationCursor {
    fn start(clip: Arc<ResolvedClip>, locked: bool) -> Self {
        Self {
            clip,
            frame_index: 0,
            elapsed: 0,
            locked,
            finished: false,
        }
    }

    pub fn clip(&self) -> &ResolvedClip {
        &self.clip
    }

    pub fn frame_index(&self) -> usize {
        self.frame_index
    }

    /// Whole ticks spent on the current frame.
    pub fn elapsed_ticks(&self) -> u64 {
        self.elapsed / RATE_SCALE
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn current_gid(&self) -> u32 {
        self.clip
            .gid(self.frame_index)
            .or_else(|| self.clip.frames().last().map(|frame| frame.gid))
            .unwrap_or(0)
    }
}

/// Drives one entity's animation from play requests and simulation ticks.
#[derive(Debug, Clone)]
pub struct PlaybackScheduler {
    catalog: Arc<AnimationCatalog>,
    resolver: Arc<ClipResolver>,
    idle_clip: Arc<ResolvedClip>,
    cursor: AnimationCursor,
    state: PlaybackState,
    facing: Option<Direction>,
    rate: PlaybackRate,
}

impl PlaybackScheduler {
    /// New scheduler in `Idle`, facing nowhere in particular.
    pub fn new(catalog: Arc<AnimationCatalog>, resolver: Arc<ClipResolver>) -> Self {
        let idle_clip = Arc::new(resolver.resolve_idle(&catalog, None));
        let cursor = AnimationCursor::start(Arc::clone(&idle_clip), false);
        Self {
            catalog,
            resolver,
            idle_clip,
            cursor,
            state: PlaybackState::Idle,
            facing: None,
            rate: PlaybackRate::NORMAL,
        }
    }

    /// Scheduler using the default playback policy.
    pub fn with_default_policy(catalog: Arc<AnimationCatalog>) -> Self {
        Self::new(catalog, Arc::new(ClipResolver::default()))
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn cursor(&self) -> &AnimationCursor {
        &self.cursor
    }

    pub fn current_clip(&self) -> &ResolvedClip {
        self.cursor.clip()
    }

    /// GID to render this tick.
    pub fn current_frame(&self) -> u32 {
        self.cursor.current_gid()
    }

    pub fn frame_index(&self) -> usize {
        self.cursor.frame_index
    }

    pub fn is_at_first_frame(&self) -> bool {
        self.cursor.frame_index == 0
    }

    pub fn is_at_final_frame(&self) -> bool {
        self.cursor.frame_index + 1 >= self.cursor.clip.len()
    }

    pub fn facing(&self) -> Option<Direction> {
        self.facing
    }

    pub fn rate(&self) -> PlaybackRate {
        self.rate
    }

    pub fn set_rate(&mut self, rate: PlaybackRate) {
        self.rate = rate;
    }

    pub fn catalog(&self) -> &Arc<AnimationCatalog> {
        &self.catalog
    }

    /// Ask for clip `name`, optionally facing `direction`.
    ///
    /// Ignored while a permanent clip is playing. An unknown clip is reported
    /// and leaves the scheduler exactly as it was. A requested direction also
    /// becomes the entity's facing.
    pub fn request(
        &mut self,
        name: &str,
        direction: Option<Direction>,
    ) -> Result<RequestOutcome, ResolveError> {
        if self.state == PlaybackState::Locked {
            log::debug!(
                "Request '{}' ignored: '{}' is locked",
                name,
                self.cursor.clip.key()
            );
            return Ok(RequestOutcome::Ignored);
        }

        let clip = self
            .resolver
            .resolve(&self.catalog, name, direction, self.facing)?;

        let outcome = if self.state == PlaybackState::Playing && self.cursor.clip.key() == clip.key()
        {
            RequestOutcome::Restarted
        } else {
            RequestOutcome::Started
        };

        let locked = clip.is_permanent();
        self.state = if locked {
            PlaybackState::Locked
        } else {
            PlaybackState::Playing
        };
        log::debug!("Playing '{}' ({:?}, {:?})", clip.key(), self.state, outcome);
        self.cursor = AnimationCursor::start(Arc::new(clip), locked);

        if let Some(dir) = direction {
            if self.facing != Some(dir) {
                self.facing = Some(dir);
                self.refresh_idle();
            }
        }
        Ok(outcome)
    }

    /// Return to idle unless a permanent clip holds the lock. Returns whether
    /// the scheduler is now idle.
    pub fn stop(&mut self) -> bool {
        match self.state {
            PlaybackState::Locked => false,
            PlaybackState::Idle => true,
            PlaybackState::Playing => {
                self.enter_idle();
                true
            }
        }
    }

    /// Unconditionally drop the current clip (including a lock) and go idle.
    /// Meant for level changes and respawns.
    pub fn reset(&mut self) {
        self.enter_idle();
    }

    /// Turn the entity. The active clip is re-resolved for the new facing and
    /// keeps its frame position. The lock state and the way the clip ends stay
    /// those of the clip that was requested, whatever the new variant declares.
    /// If the clip has no usable variant the current one keeps playing.
    pub fn set_facing(&mut self, direction: Direction) {
        if self.facing == Some(direction) {
            return;
        }
        self.facing = Some(direction);
        self.refresh_idle();

        let replacement = match self.state {
            PlaybackState::Idle => Some(Arc::clone(&self.idle_clip)),
            PlaybackState::Playing | PlaybackState::Locked => {
                let name = self.cursor.clip.name().to_string();
                match self
                    .resolver
                    .resolve(&self.catalog, &name, Some(direction), None)
                {
                    Ok(clip) => Some(Arc::new(clip.with_terminal_of(&self.cursor.clip))),
                    Err(err) => {
                        log::debug!("Facing change kept '{}': {}", name, err);
                        None
                    }
                }
            }
        };

        if let Some(clip) = replacement {
            if clip.key() == self.cursor.clip.key() {
                return;
            }
            let last = clip.len().saturating_sub(1);
            let frame_index = self.cursor.frame_index.min(last);
            let max_elapsed = clip.frames()[frame_index]
                .duration
                .saturating_mul(RATE_SCALE)
                .saturating_sub(1);
            self.cursor.elapsed = self.cursor.elapsed.min(max_elapsed);
            self.cursor.frame_index = frame_index;
            self.cursor.clip = clip;
        }
    }

    /// Advance by `dt` ticks and return the GID to render.
    pub fn tick(&mut self, dt: u64) -> u32 {
        self.advance(dt);
        self.current_frame()
    }

    /// Advance by `dt` ticks, reporting frame changes, wraps and endings.
    pub fn advance(&mut self, dt: u64) -> Advance {
        let mut out = Advance::default();
        if self.cursor.finished {
            return out;
        }
        let scaled = dt.saturating_mul(u64::from(self.rate.percent()));
        if scaled == 0 {
            return out;
        }
        self.cursor.elapsed = self.cursor.elapsed.saturating_add(scaled);

        if self.active_end() == ClipEnd::Loop {
            self.settle_looping(&mut out);
            return out;
        }

        let clip = Arc::clone(&self.cursor.clip);
        loop {
            let duration = clip.frames()[self.cursor.frame_index]
                .duration
                .saturating_mul(RATE_SCALE);
            if self.cursor.elapsed < duration {
                break;
            }
            self.cursor.elapsed -= duration;

            if self.cursor.frame_index + 1 < clip.len() {
                self.cursor.frame_index += 1;
                out.frames_advanced += 1;
                continue;
            }

            out.finished = true;
            match clip.end() {
                ClipEnd::ReturnToIdle => {
                    let leftover = self.cursor.elapsed;
                    log::debug!("'{}' finished; returning to idle", clip.key());
                    self.enter_idle();
                    out.returned_to_idle = true;
                    self.cursor.elapsed = leftover;
                    self.settle_looping(&mut out);
                }
                ClipEnd::Hold | ClipEnd::Loop => {
                    self.cursor.elapsed = 0;
                    self.cursor.finished = true;
                }
            }
            break;
        }
        out
    }

    fn active_end(&self) -> ClipEnd {
        match self.state {
            PlaybackState::Idle => ClipEnd::Loop,
            PlaybackState::Playing | PlaybackState::Locked => self.cursor.clip.end(),
        }
    }

    /// Place a looping cursor whose `elapsed` may span several frames or
    /// cycles onto the right frame.
    fn settle_looping(&mut self, out: &mut Advance) {
        let clip = Arc::clone(&self.cursor.clip);
        let cycle = clip.total_duration().saturating_mul(RATE_SCALE).max(1);
        let start_index = self.cursor.frame_index;
        let mut position = clip
            .offset_of(start_index)
            .saturating_mul(RATE_SCALE)
            .saturating_add(self.cursor.elapsed);

        let loops = position / cycle;
        position %= cycle;

        let mut index = 0;
        for frame in clip.frames() {
            let duration = frame.duration.saturating_mul(RATE_SCALE);
            if position < duration {
                break;
            }
            position -= duration;
            index += 1;
        }
        let index = index.min(clip.len().saturating_sub(1));

        let len = clip.len() as u64;
        out.loops += loops;
        out.frames_advanced += (loops * len + index as u64).saturating_sub(start_index as u64);
        self.cursor.frame_index = index;
        self.cursor.elapsed = position;
    }

    fn enter_idle(&mut self) {
        self.state = PlaybackState::Idle;
        self.cursor = AnimationCursor::start(Arc::clone(&self.idle_clip), false);
    }

    fn refresh_idle(&mut self) {
        self.idle_clip = Arc::new(self.resolver.resolve_idle(&self.catalog, self.facing));
    }
}
