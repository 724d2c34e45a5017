//! Request scripts: a JSON list of play requests and time steps replayed
//! against one scheduler.
//!
//! ```json
//! {
//!   "tick_hz": 60,
//!   "steps": [
//!     { "request": "walk", "direction": "n", "ticks": 40 },
//!     { "facing": "w", "ticks": 10, "repeat": 3 },
//!     { "request": "attack", "wall_ms": 250 },
//!     { "rate": 0.5, "ticks": 20 },
//!     { "reset": true }
//!   ]
//! }
//! ```
//!
//! Within a step, actions apply in the order reset, rate, facing, stop,
//! request. Time then advances `repeat` times by `ticks` (or by the ticks
//! `wall_ms` of real time amounts to at `tick_hz`).

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tileclip_core::{
    AnimationCatalog, ClipResolver, Direction, PlaybackRate, PlaybackScheduler, StepClock,
};

#[derive(Debug, Deserialize, Clone)]
pub struct RequestScript {
    #[serde(default = "default_tick_hz")]
    pub tick_hz: u32,
    pub steps: Vec<ScriptStep>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ScriptStep {
    #[serde(default)]
    pub reset: bool,
    #[serde(default)]
    pub rate: Option<f64>,
    #[serde(default)]
    pub facing: Option<Direction>,
    #[serde(default)]
    pub stop: bool,
    #[serde(default)]
    pub request: Option<String>,
    #[serde(default)]
    pub direction: Option<Direction>,
    #[serde(default)]
    pub ticks: u64,
    #[serde(default)]
    pub wall_ms: Option<u64>,
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

/// One line of playback output, emitted after every advance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceLine {
    pub tick: u64,
    pub gid: u32,
    pub clip: String,
    pub frame: usize,
    pub state: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<String>,
}

pub fn load_script_from_path(path: &Path) -> Result<RequestScript, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let script: RequestScript = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse script JSON {}: {e}", path.display()))?;
    validate_script(&script)?;
    Ok(script)
}

fn validate_script(script: &RequestScript) -> Result<(), String> {
    if script.tick_hz == 0 {
        return Err("Script validation failed: tick_hz must be > 0".to_string());
    }
    if script.steps.is_empty() {
        return Err("Script validation failed: steps list is empty".to_string());
    }
    if let Some(i) = script
        .steps
        .iter()
        .position(|step| step.direction.is_some() && step.request.is_none())
    {
        return Err(format!(
            "Script validation failed: step {i} has a direction but no request"
        ));
    }
    Ok(())
}

/// Replay `script` against a fresh scheduler and collect the trace.
pub fn run_script(
    catalog: Arc<AnimationCatalog>,
    resolver: Arc<ClipResolver>,
    script: &RequestScript,
) -> Vec<TraceLine> {
    let mut scheduler = PlaybackScheduler::new(catalog, resolver);
    let mut clock = StepClock::from_hz(script.tick_hz);
    let mut trace = Vec::new();
    let mut tick = 0u64;

    for (index, step) in script.steps.iter().enumerate() {
        let mut events = Vec::new();

        if step.reset {
            scheduler.reset();
            events.push("reset".to_string());
        }
        if let Some(rate) = step.rate {
            scheduler.set_rate(PlaybackRate::from_multiplier(rate));
        }
        if let Some(facing) = step.facing {
            scheduler.set_facing(facing);
        }
        if step.stop && !scheduler.stop() {
            events.push("stop ignored (locked)".to_string());
        }
        if let Some(name) = &step.request {
            match scheduler.request(name, step.direction) {
                Ok(outcome) => events.push(format!("{name}: {outcome:?}")),
                Err(err) => {
                    log::warn!("Step {}: {}", index, err);
                    events.push(err.to_string());
                }
            }
        }

        for _ in 0..step.repeat.max(1) {
            let dt = match step.wall_ms {
                Some(ms) => clock.feed(Duration::from_millis(ms)),
                None => step.ticks,
            };
            let advance = scheduler.advance(dt);
            tick += dt;

            if advance.loops > 0 {
                events.push(format!("looped x{}", advance.loops));
            }
            if advance.returned_to_idle {
                events.push("returned to idle".to_string());
            } else if advance.finished {
                events.push("finished".to_string());
            }

            trace.push(TraceLine {
                tick,
                gid: scheduler.current_frame(),
                clip: scheduler.current_clip().key().to_string(),
                frame: scheduler.frame_index(),
                state: format!("{:?}", scheduler.state()),
                events: std::mem::take(&mut events),
            });
        }
    }
    trace
}

const fn default_tick_hz() -> u32 {
    60
}

const fn default_repeat() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};
    use tileclip_core::{PlaybackPolicy, PropertyMap, PropertyValue, SheetTree};

    fn temp_file_path(name_hint: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "tileclip_script_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    fn clip(start: i64, stop: i64, permanent: bool) -> PropertyValue {
        PropertyValue::Class {
            class: Some("animation".to_string()),
            members: PropertyMap::new()
                .with("startGID", PropertyValue::Int(start))
                .with("stopGID", PropertyValue::Int(stop))
                .with("isPermanent", PropertyValue::Bool(permanent)),
        }
    }

    fn catalog() -> Arc<AnimationCatalog> {
        let tree = SheetTree {
            name: "hero".to_string(),
            tile_width: Some(16),
            tile_height: Some(16),
            columns: Some(8),
            tile_count: Some(32),
            properties: PropertyMap::new()
                .with("animation-update-rate", PropertyValue::Int(4))
                .with("animation-idle", clip(0, 1, false))
                .with("animation-walk", clip(8, 11, false))
                .with("animation-attack", clip(16, 17, true)),
            ..SheetTree::default()
        };
        Arc::new(AnimationCatalog::from_tree(&tree).expect("valid sheet"))
    }

    fn resolver() -> Arc<ClipResolver> {
        Arc::new(ClipResolver::new(PlaybackPolicy::default()))
    }

    #[test]
    fn script_file_parses() {
        let path = temp_file_path("parse");
        fs::write(
            &path,
            r#"{
              "steps": [
                { "request": "walk", "direction": "north", "ticks": 4, "repeat": 3 },
                { "facing": "w", "wall_ms": 50 }
              ]
            }"#,
        )
        .expect("write script file");

        let script = load_script_from_path(&path).expect("script should load");
        assert_eq!(script.tick_hz, 60);
        assert_eq!(script.steps.len(), 2);
        assert_eq!(script.steps[0].direction, Some(Direction::North));
        assert_eq!(script.steps[1].repeat, 1);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn empty_script_is_rejected() {
        let path = temp_file_path("empty");
        fs::write(&path, r#"{ "steps": [] }"#).expect("write script file");
        let err = load_script_from_path(&path).expect_err("empty steps");
        assert!(err.contains("steps list is empty"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn attack_interrupts_walk_and_returns_to_idle() {
        let script = RequestScript {
            tick_hz: 60,
            steps: vec![
                ScriptStep {
                    request: Some("walk".to_string()),
                    ticks: 4,
                    repeat: 2,
                    ..ScriptStep::default()
                },
                ScriptStep {
                    request: Some("attack".to_string()),
                    ticks: 4,
                    repeat: 1,
                    ..ScriptStep::default()
                },
                ScriptStep {
                    request: Some("walk".to_string()),
                    ticks: 4,
                    repeat: 1,
                    ..ScriptStep::default()
                },
            ],
        };
        let trace = run_script(catalog(), resolver(), &script);
        let gids: Vec<u32> = trace.iter().map(|line| line.gid).collect();
        assert_eq!(gids, vec![9, 10, 17, 0]);
        assert_eq!(trace[3].state, "Idle");
        assert!(trace[3].events.iter().any(|e| e.contains("Ignored")));
        assert!(trace[3].events.iter().any(|e| e == "returned to idle"));
    }

    #[test]
    fn unknown_request_is_reported_not_fatal() {
        let script = RequestScript {
            tick_hz: 60,
            steps: vec![ScriptStep {
                request: Some("fly".to_string()),
                ticks: 4,
                repeat: 1,
                ..ScriptStep::default()
            }],
        };
        let trace = run_script(catalog(), resolver(), &script);
        assert_eq!(trace[0].clip, "idle");
        assert!(trace[0].events[0].contains("unknown animation 'fly'"));
    }

    #[test]
    fn runs_are_deterministic() {
        let script = RequestScript {
            tick_hz: 30,
            steps: vec![
                ScriptStep {
                    request: Some("walk".to_string()),
                    wall_ms: Some(17),
                    repeat: 50,
                    ..ScriptStep::default()
                },
                ScriptStep {
                    request: Some("attack".to_string()),
                    rate: Some(1.5),
                    ticks: 1,
                    repeat: 20,
                    ..ScriptStep::default()
                },
            ],
        };
        let a = run_script(catalog(), resolver(), &script);
        let b = run_script(catalog(), resolver(), &script);
        assert_eq!(a, b);
    }
}
