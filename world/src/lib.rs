#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative level state for the Shadow Signal guard simulation.
//!
//! The [`World`] owns the obstacles, hide spots, noise bus, player proxy, and
//! guards of the loaded level. Every mutation goes through [`apply`]; reads go
//! through the functions in [`query`].

use shadow_signal_core::{
    Command, Event, GuardId, GuardSnapshot, LevelLayout, Obstacle, ObstacleKind, PlayerSnapshot,
    PlayerState, Rect, ThrowRejection, Vec2,
};
use shadow_signal_system_guard_ai::{Guard, GuardTuning, TickContext};
use shadow_signal_system_movement::resolve_move;
use shadow_signal_system_noise::{radio_recipients, NoiseBus, RadioListener, RockThrower};
use tracing::{debug, info, warn};

/// Represents the authoritative state of the loaded level.
#[derive(Debug)]
pub struct World {
    layout: Option<LevelLayout>,
    tuning: GuardTuning,
    obstacles: Vec<Obstacle>,
    hide_spots: Vec<Rect>,
    player: PlayerSnapshot,
    guards: Vec<Guard>,
    snapshots: Vec<GuardSnapshot>,
    noise: NoiseBus,
    rock: RockThrower,
    last_capture_by: Option<GuardId>,
    tick_index: u64,
}

impl World {
    /// Creates an empty world using the default guard tuning.
    #[must_use]
    pub fn new() -> Self {
        Self::with_tuning(GuardTuning::default())
    }

    /// Creates an empty world whose guards start from `tuning`.
    #[must_use]
    pub fn with_tuning(tuning: GuardTuning) -> Self {
        Self {
            layout: None,
            tuning: tuning.sanitized(),
            obstacles: Vec::new(),
            hide_spots: Vec::new(),
            player: PlayerSnapshot {
                rect: Rect::default(),
                hidden: false,
                state: PlayerState::Normal,
            },
            guards: Vec::new(),
            snapshots: Vec::new(),
            noise: NoiseBus::new(),
            rock: RockThrower::default(),
            last_capture_by: None,
            tick_index: 0,
        }
    }

    fn load(&mut self, layout: LevelLayout) {
        self.guards = layout
            .guards
            .iter()
            .enumerate()
            .map(|(index, config)| Guard::new(GuardId::new(index as u32), config, &self.tuning))
            .collect();
        self.layout = Some(layout);
        self.last_capture_by = None;
        self.noise = NoiseBus::new();
        self.restore_initial_state();
    }

    fn restore_initial_state(&mut self) {
        let Some(layout) = self.layout.as_ref() else {
            return;
        };

        self.obstacles = layout.obstacles();
        self.hide_spots = layout.hide_spots.clone();
        self.player = PlayerSnapshot {
            rect: layout.player_spawn,
            hidden: false,
            state: PlayerState::Normal,
        };
        self.noise.clear();
        self.rock.reset();
        for guard in &mut self.guards {
            guard.reset();
        }
        self.snapshots = self.guards.iter().map(Guard::snapshot).collect();
    }

    fn player_is_free(&self) -> bool {
        self.player.state == PlayerState::Normal
    }

    fn tick(&mut self, dt: f32, out_events: &mut Vec<Event>) {
        self.rock.tick(dt);
        if self.player.state == PlayerState::Captured {
            return;
        }

        let player = self.player;
        let ctx = TickContext {
            dt,
            player: &player,
            obstacles: &self.obstacles,
            hide_spots: &self.hide_spots,
            noise: &self.noise,
        };

        let mut radio: Vec<(GuardId, Vec2)> = Vec::new();
        for (guard, snapshot) in self.guards.iter_mut().zip(self.snapshots.iter_mut()) {
            let report = guard.update(&ctx, out_events);
            *snapshot = guard.snapshot();

            if let Some(position) = report.radio {
                radio.push((guard.id(), position));
            }
            if report.captured && self.player.state != PlayerState::Captured {
                self.player.state = PlayerState::Captured;
                self.last_capture_by = Some(guard.id());
                out_events.push(Event::PlayerCaptured { guard: guard.id() });
                info!(guard = guard.id().get(), name = guard.name(), "player_captured");
            }
        }

        self.deliver_radio(&radio, out_events);

        let mut expired = Vec::new();
        self.noise.advance(dt, &mut expired);
        for noise in expired {
            debug!(noise = noise.get(), "noise_expired");
            out_events.push(Event::NoiseExpired { noise });
        }
    }

    fn deliver_radio(&mut self, alerts: &[(GuardId, Vec2)], out_events: &mut Vec<Event>) {
        for &(source, position) in alerts {
            let Some(sender) = self.guards.iter().find(|guard| guard.id() == source) else {
                continue;
            };
            let origin = sender.center();
            let radius = sender.tuning().radio_radius;
            let listeners = self.guards.iter().map(|guard| RadioListener {
                guard: guard.id(),
                position: guard.center(),
                state: guard.state(),
            });
            let recipients = radio_recipients(source, origin, radius, listeners);

            for recipient in recipients {
                let Some(index) = self.guards.iter().position(|guard| guard.id() == recipient)
                else {
                    continue;
                };
                self.guards[index].receive_radio_alert(position, out_events);
                self.snapshots[index] = self.guards[index].snapshot();
                out_events.push(Event::RadioAlertReceived {
                    guard: recipient,
                    from: source,
                });
                debug!(
                    guard = recipient.get(),
                    from = source.get(),
                    "radio_alert_received"
                );
            }
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::LoadLevel { layout } => {
            if let Err(reason) = layout.validate() {
                warn!(level = %layout.name, error = %reason, "level_rejected");
                out_events.push(Event::LevelRejected { reason });
                return;
            }
            info!(
                level = %layout.name,
                guards = layout.guards.len(),
                obstacles = layout.walls.len() + layout.doors.len(),
                "level_loaded"
            );
            let guards = layout.guards.len();
            world.load(layout);
            out_events.push(Event::LevelLoaded { guards });
        }
        Command::ResetLevel => {
            if world.layout.is_none() {
                return;
            }
            world.restore_initial_state();
            info!("level_reset");
            out_events.push(Event::LevelReset);
        }
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            out_events.push(Event::TimeAdvanced { dt });
            world.tick(dt.as_secs_f32(), out_events);
        }
        Command::EmitNoise {
            position,
            radius,
            time_to_live,
            source,
        } => {
            if let Some(noise) = world.noise.emit(position, radius, time_to_live, source) {
                out_events.push(Event::NoiseEmitted { noise, position });
            }
        }
        Command::ThrowRock { target } => {
            if !world.player_is_free() {
                out_events.push(Event::RockThrowRejected {
                    reason: ThrowRejection::PlayerUnavailable,
                });
                return;
            }
            let origin = world.player.rect.center();
            match world.rock.throw(origin, target, &mut world.noise) {
                Ok((noise, position)) => {
                    debug!(noise = noise.get(), x = position.x, y = position.y, "rock_thrown");
                    out_events.push(Event::NoiseEmitted { noise, position });
                }
                Err(reason) => out_events.push(Event::RockThrowRejected { reason }),
            }
        }
        Command::MovePlayer { delta } => {
            if world.player_is_free() {
                let _ = resolve_move(&mut world.player.rect, delta, &world.obstacles);
            }
        }
        Command::PlacePlayer { center } => {
            if world.player.state != PlayerState::Captured && center.is_finite() {
                world.player.rect = world.player.rect.centered_on(center);
            }
        }
        Command::SetPlayerHidden { hidden } => {
            if world.player.state == PlayerState::Captured || world.player.hidden == hidden {
                return;
            }
            world.player.hidden = hidden;
            world.player.state = if hidden {
                PlayerState::Hidden
            } else {
                PlayerState::Normal
            };
            out_events.push(Event::PlayerHiddenChanged { hidden });
        }
        Command::SetDoorState { obstacle, state } => {
            let Some(door) = world
                .obstacles
                .iter_mut()
                .find(|candidate| candidate.id == obstacle && candidate.is_door())
            else {
                return;
            };
            if door.kind == (ObstacleKind::Door { state }) {
                return;
            }
            door.kind = ObstacleKind::Door { state };
            out_events.push(Event::DoorStateChanged { obstacle, state });
        }
    }
}

/// Query functions that expose read-only views into the world.
pub mod query {
    use super::World;
    use shadow_signal_core::{
        GuardId, GuardSnapshot, GuardState, NoiseEvent, Obstacle, PlayerSnapshot, Rect, Threat,
        ThreatLevel,
    };

    /// Per-guard telemetry in guard creation order.
    #[must_use]
    pub fn guard_snapshots(world: &World) -> &[GuardSnapshot] {
        &world.snapshots
    }

    /// Telemetry of a single guard.
    #[must_use]
    pub fn guard_snapshot(world: &World, guard: GuardId) -> Option<&GuardSnapshot> {
        world
            .snapshots
            .iter()
            .find(|snapshot| snapshot.guard_id == guard)
    }

    /// Aggregated threat meter.
    ///
    /// The ratio is one while any guard chases, otherwise the highest detection.
    #[must_use]
    pub fn threat(world: &World) -> Threat {
        let chasing = world
            .snapshots
            .iter()
            .any(|snapshot| snapshot.state == GuardState::Chase);
        let ratio = if chasing {
            1.0
        } else {
            world
                .snapshots
                .iter()
                .map(|snapshot| snapshot.detection)
                .fold(0.0, f32::max)
        };
        Threat {
            ratio,
            level: ThreatLevel::from_ratio(ratio),
        }
    }

    /// Current state of the player proxy.
    #[must_use]
    pub fn player(world: &World) -> PlayerSnapshot {
        world.player
    }

    /// Live noise events, oldest first.
    #[must_use]
    pub fn noise_events(world: &World) -> &[NoiseEvent] {
        world.noise.events()
    }

    /// Most recent live noise event.
    #[must_use]
    pub fn active_noise(world: &World) -> Option<&NoiseEvent> {
        world.noise.active()
    }

    /// Static obstacles of the loaded level.
    #[must_use]
    pub fn obstacles(world: &World) -> &[Obstacle] {
        &world.obstacles
    }

    /// Hide spots of the loaded level.
    #[must_use]
    pub fn hide_spots(world: &World) -> &[Rect] {
        &world.hide_spots
    }

    /// Guard that made the most recent capture.
    #[must_use]
    pub fn last_capture(world: &World) -> Option<GuardId> {
        world.last_capture_by
    }

    /// Name of the loaded level, if any.
    #[must_use]
    pub fn level_name(world: &World) -> Option<&str> {
        world.layout.as_ref().map(|layout| layout.name.as_str())
    }

    /// Number of ticks processed since the world was created.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use shadow_signal_core::{DoorState, NoiseSource};

    use super::*;

    fn loaded() -> World {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::LoadLevel {
                layout: LevelLayout::test_level(),
            },
            &mut events,
        );
        assert_eq!(events, vec![Event::LevelLoaded { guards: 1 }]);
        world
    }

    #[test]
    fn load_builds_level_state() {
        let world = loaded();

        assert_eq!(query::obstacles(&world).len(), 5);
        assert_eq!(query::hide_spots(&world).len(), 2);
        assert_eq!(query::guard_snapshots(&world).len(), 1);
        assert_eq!(query::player(&world).rect, Rect::new(120.0, 120.0, 22.0, 22.0));
        assert_eq!(query::level_name(&world), Some("Test Level"));
    }

    #[test]
    fn invalid_layout_keeps_previous_level() {
        let mut world = loaded();
        let mut layout = LevelLayout::test_level();
        layout.width = -1.0;

        let mut events = Vec::new();
        apply(&mut world, Command::LoadLevel { layout }, &mut events);

        assert!(matches!(events.as_slice(), [Event::LevelRejected { .. }]));
        assert_eq!(query::guard_snapshots(&world).len(), 1);
    }

    #[test]
    fn hidden_player_cannot_move_or_throw() {
        let mut world = loaded();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SetPlayerHidden { hidden: true },
            &mut events,
        );
        apply(
            &mut world,
            Command::MovePlayer {
                delta: Vec2::new(10.0, 0.0),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::ThrowRock {
                target: Vec2::new(200.0, 200.0),
            },
            &mut events,
        );

        assert_eq!(query::player(&world).rect.x, 120.0);
        assert_eq!(query::player(&world).state, PlayerState::Hidden);
        assert_eq!(
            events,
            vec![
                Event::PlayerHiddenChanged { hidden: true },
                Event::RockThrowRejected {
                    reason: ThrowRejection::PlayerUnavailable
                },
            ]
        );
    }

    #[test]
    fn emitted_noise_expires_after_its_lifetime() {
        let mut world = loaded();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::EmitNoise {
                position: Vec2::new(100.0, 100.0),
                radius: 10.0,
                time_to_live: 0.2,
                source: NoiseSource::Scripted,
            },
            &mut events,
        );
        assert_eq!(query::noise_events(&world).len(), 1);

        for _ in 0..3 {
            apply(
                &mut world,
                Command::Tick {
                    dt: Duration::from_millis(100),
                },
                &mut events,
            );
        }

        assert!(query::noise_events(&world).is_empty());
        assert!(events
            .iter()
            .any(|event| matches!(event, Event::NoiseExpired { .. })));
        assert_eq!(query::tick_index(&world), 3);
    }

    #[test]
    fn door_state_changes_are_reported_once() {
        let mut layout = LevelLayout::test_level();
        layout.doors = vec![Rect::new(600.0, 20.0, 10.0, 100.0)];
        let mut world = World::new();
        let mut events = Vec::new();
        apply(&mut world, Command::LoadLevel { layout }, &mut events);
        let door = query::obstacles(&world)
            .iter()
            .find(|obstacle| obstacle.is_door())
            .map(|obstacle| obstacle.id)
            .expect("door obstacle");

        events.clear();
        for _ in 0..2 {
            apply(
                &mut world,
                Command::SetDoorState {
                    obstacle: door,
                    state: DoorState::Open,
                },
                &mut events,
            );
        }

        assert_eq!(
            events,
            vec![Event::DoorStateChanged {
                obstacle: door,
                state: DoorState::Open
            }]
        );
        assert!(!query::obstacles(&world)
            .iter()
            .find(|obstacle| obstacle.id == door)
            .is_some_and(Obstacle::blocks));
    }
}
