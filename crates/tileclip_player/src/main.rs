mod cli;
mod script;

use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use tileclip_core::{load_catalog_from_path, load_policy_from_path, ClipResolver, PlaybackPolicy};

use crate::cli::{Cli, Commands};

fn main() -> Result<(), String> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let policy = match &cli.policy {
        Some(path) => load_policy_from_path(path).map_err(|e| e.to_string())?,
        None => PlaybackPolicy::default(),
    };
    let resolver = ClipResolver::new(policy);

    match cli.command {
        Commands::Inspect { sheet } => inspect(&sheet, &resolver),
        Commands::Play {
            sheet,
            script,
            json,
        } => play(&sheet, &script, resolver, json),
    }
}

fn inspect(sheet_path: &Path, resolver: &ClipResolver) -> Result<(), String> {
    let catalog = load_catalog_from_path(sheet_path).map_err(|e| e.to_string())?;
    let sheet = catalog.sheet();

    println!(
        "sheet '{}': {}x{} tiles, {} columns, {} tiles{}",
        sheet.name,
        sheet.tile_size.x,
        sheet.tile_size.y,
        sheet.columns,
        sheet
            .tile_count
            .map_or_else(|| "unknown".to_string(), |count| count.to_string()),
        if catalog.is_multidirectional() {
            ", multidirectional"
        } else {
            ""
        }
    );
    for (key, value) in &sheet.custom {
        println!("  {key} = {value}");
    }
    let idle = resolver.resolve_idle(&catalog, None);
    println!("idle: {} {:?}", idle.key(), idle.gids());

    for def in catalog.iter() {
        match resolver.resolve(&catalog, &def.key.name, def.key.direction, None) {
            Ok(clip) => {
                let durations: Vec<u64> = clip.frames().iter().map(|f| f.duration).collect();
                println!(
                    "{:<24} gids {:?} ticks {:?} total {} end {:?}{}",
                    def.key.to_string(),
                    clip.gids(),
                    durations,
                    clip.total_duration(),
                    clip.end(),
                    if clip.is_permanent() { " permanent" } else { "" }
                );
            }
            Err(err) => println!("{:<24} {}", def.key.to_string(), err),
        }
    }
    Ok(())
}

fn play(
    sheet_path: &Path,
    script_path: &Path,
    resolver: ClipResolver,
    json: bool,
) -> Result<(), String> {
    let catalog = load_catalog_from_path(sheet_path).map_err(|e| e.to_string())?;
    let script = script::load_script_from_path(script_path)?;

    log::info!(
        "Playing {} steps against '{}'",
        script.steps.len(),
        catalog.sheet().name
    );
    let trace = script::run_script(Arc::new(catalog), Arc::new(resolver), &script);

    for line in &trace {
        if json {
            let encoded = serde_json::to_string(line).map_err(|e| e.to_string())?;
            println!("{encoded}");
        } else {
            println!(
                "t={:<6} gid={:<4} {:<16} frame {:<3} {:<8} {}",
                line.tick,
                line.gid,
                line.clip,
                line.frame,
                line.state,
                line.events.join("; ")
            );
        }
    }
    Ok(())
}
