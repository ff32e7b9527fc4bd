#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless runner for the Shadow Signal guard simulation.
//!
//! Loads a level, drives the world with a fixed timestep and logs guard
//! telemetry, mirroring the HUD of an interactive frontend.

mod level_file;

use std::{path::PathBuf, time::Duration};

use anyhow::{bail, Context, Result};
use clap::Parser;
use shadow_signal_core::{Command, Event, LevelLayout, NoiseSource, Vec2};
use shadow_signal_world::{self as world, query, World};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Radius of noises injected with `--noise`.
const SCRIPTED_NOISE_RADIUS: f32 = 150.0;
/// Lifetime of noises injected with `--noise`, in seconds.
const SCRIPTED_NOISE_TTL: f32 = 1.0;

/// Command line arguments of the headless runner.
#[derive(Debug, Parser)]
#[command(name = "shadow-signal", about = "Runs guard AI against a level headlessly")]
struct Args {
    /// TOML level file; the bundled test level is used when omitted.
    #[arg(long)]
    level: Option<PathBuf>,
    /// Number of fixed ticks to simulate.
    #[arg(long, default_value_t = 600)]
    ticks: u64,
    /// Duration of a tick in milliseconds.
    #[arg(long = "dt-ms", default_value_t = 16)]
    dt_ms: u64,
    /// Tick at which the player ducks into cover.
    #[arg(long = "hide-at-tick")]
    hide_at_tick: Option<u64>,
    /// Scripted noise emitted before the first tick, as `x,y`.
    #[arg(long, value_parser = parse_point)]
    noise: Vec<Vec2>,
    /// Rock thrown by the player before the first tick, as `x,y`.
    #[arg(long, value_parser = parse_point)]
    rock: Option<Vec2>,
    /// Number of ticks between telemetry reports.
    #[arg(long = "report-every", default_value_t = 60)]
    report_every: u64,
}

fn parse_point(value: &str) -> Result<Vec2, String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected `x,y`, got `{value}`"))?;
    let x: f32 = x.trim().parse().map_err(|err| format!("invalid x: {err}"))?;
    let y: f32 = y.trim().parse().map_err(|err| format!("invalid y: {err}"))?;
    if !(x.is_finite() && y.is_finite()) {
        return Err(format!("point `{value}` is not finite"));
    }
    Ok(Vec2::new(x, y))
}

/// Entry point for the Shadow Signal command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let layout = match &args.level {
        Some(path) => level_file::load(path)
            .with_context(|| format!("loading level {}", path.display()))?,
        None => level_file::builtin().context("loading bundled test level")?,
    };

    run(&args, layout)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn run(args: &Args, layout: LevelLayout) -> Result<()> {
    if args.dt_ms == 0 {
        bail!("--dt-ms must be greater than zero");
    }

    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(&mut world, Command::LoadLevel { layout }, &mut events);
    if let Some(Event::LevelRejected { reason }) = events.first() {
        bail!("level rejected: {reason}");
    }

    for &position in &args.noise {
        world::apply(
            &mut world,
            Command::EmitNoise {
                position,
                radius: SCRIPTED_NOISE_RADIUS,
                time_to_live: SCRIPTED_NOISE_TTL,
                source: NoiseSource::Scripted,
            },
            &mut events,
        );
    }
    if let Some(target) = args.rock {
        world::apply(&mut world, Command::ThrowRock { target }, &mut events);
    }
    log_events(&events);

    let dt = Duration::from_millis(args.dt_ms);
    for tick in 1..=args.ticks {
        events.clear();
        if args.hide_at_tick == Some(tick) {
            world::apply(
                &mut world,
                Command::SetPlayerHidden { hidden: true },
                &mut events,
            );
        }
        world::apply(&mut world, Command::Tick { dt }, &mut events);
        log_events(&events);

        if args.report_every > 0 && tick % args.report_every == 0 {
            report(&world, tick);
        }
        if let Some(guard) = query::last_capture(&world) {
            let name = query::guard_snapshot(&world, guard).map_or("?", |guard| guard.name.as_str());
            warn!(tick, guard = name, "player_captured");
            break;
        }
    }

    report(&world, query::tick_index(&world));
    Ok(())
}

fn log_events(events: &[Event]) {
    for event in events {
        match event {
            Event::TimeAdvanced { .. } => {}
            Event::RockThrowRejected { reason } => warn!(?reason, "rock_throw_rejected"),
            other => debug!(event = ?other, "world_event"),
        }
    }
}

fn report(world: &World, tick: u64) {
    let threat = query::threat(world);
    info!(
        tick,
        level = query::level_name(world).unwrap_or("-"),
        threat = threat.ratio,
        threat_level = ?threat.level,
        noises = query::noise_events(world).len(),
        "threat"
    );
    for guard in query::guard_snapshots(world) {
        info!(
            guard = %guard.name,
            state = guard.state.label(),
            detection = guard.detection,
            sees = guard.sees,
            in_range = guard.in_range,
            in_fov = guard.in_fov,
            los = guard.has_line_of_sight,
            x = guard.position.x,
            y = guard.position.y,
            "guard"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn points_parse_from_comma_pairs() {
        assert_eq!(parse_point("12.5, -3"), Ok(Vec2::new(12.5, -3.0)));
        assert!(parse_point("12.5").is_err());
        assert!(parse_point("x,1").is_err());
        assert!(parse_point("inf,1").is_err());
    }

    #[test]
    fn args_accept_repeated_noises() {
        let args = Args::try_parse_from([
            "shadow-signal",
            "--noise",
            "1,2",
            "--noise",
            "3,4",
            "--hide-at-tick",
            "30",
        ])
        .expect("arguments parse");
        assert_eq!(args.noise, vec![Vec2::new(1.0, 2.0), Vec2::new(3.0, 4.0)]);
        assert_eq!(args.hide_at_tick, Some(30));
        assert_eq!(args.ticks, 600);
    }

    #[test]
    fn headless_run_over_test_level_succeeds() {
        let args = Args::try_parse_from(["shadow-signal", "--ticks", "120", "--rock", "700,300"])
            .expect("arguments parse");
        assert!(run(&args, LevelLayout::test_level()).is_ok());
    }
}
