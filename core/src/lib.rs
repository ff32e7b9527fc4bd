#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Shadow Signal guard simulation.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and the pure perception and movement systems.
//! Adapters submit [`Command`] values describing desired mutations, the world
//! executes those commands via its `apply` entry point, and then broadcasts
//! [`Event`] values describing what changed. Geometry is expressed with
//! axis-aligned [`Rect`] values and [`glam::Vec2`] points.

use std::{collections::HashSet, time::Duration};

pub use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Returns `value` when it is finite, otherwise `fallback`.
#[must_use]
pub fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

/// Returns `value` when it is finite and strictly positive, otherwise `fallback`.
#[must_use]
pub fn positive_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        fallback
    }
}

/// Axis-aligned rectangle anchored at its top-left corner.
///
/// Every physical body in the simulation is a rectangle. A rectangle whose
/// size is zero, negative, or non-finite is inert: it never overlaps, never
/// blocks, and never moves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Horizontal coordinate of the left edge.
    pub x: f32,
    /// Vertical coordinate of the top edge.
    pub y: f32,
    /// Horizontal extent.
    pub w: f32,
    /// Vertical extent.
    pub h: f32,
}

impl Rect {
    /// Creates a rectangle from its top-left corner and size.
    #[must_use]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Creates a rectangle of the provided size centred on `center`.
    #[must_use]
    pub fn from_center(center: Vec2, w: f32, h: f32) -> Self {
        Self::new(center.x - w * 0.5, center.y - h * 0.5, w, h)
    }

    /// Reports whether the rectangle has a finite origin and a strictly positive size.
    #[must_use]
    pub fn is_solid(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.w.is_finite()
            && self.h.is_finite()
            && self.w > 0.0
            && self.h > 0.0
    }

    /// Top-left corner of the rectangle.
    #[must_use]
    pub const fn origin(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Geometric centre of the rectangle.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w * 0.5, self.y + self.h * 0.5)
    }

    /// Coordinate of the right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    /// Coordinate of the bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// Returns a copy of the rectangle moved so that its centre lies on `center`.
    #[must_use]
    pub fn centered_on(&self, center: Vec2) -> Self {
        Self::from_center(center, self.w, self.h)
    }

    /// Returns a copy shrunk by `amount` on every side.
    #[must_use]
    pub fn inset(&self, amount: f32) -> Self {
        Self::new(
            self.x + amount,
            self.y + amount,
            self.w - amount * 2.0,
            self.h - amount * 2.0,
        )
    }
}

/// Builds the four walls that enclose a level of the provided dimensions.
#[must_use]
pub fn outer_walls(width: f32, height: f32, thickness: f32) -> [Rect; 4] {
    [
        Rect::new(0.0, 0.0, width, thickness),
        Rect::new(0.0, height - thickness, width, thickness),
        Rect::new(0.0, 0.0, thickness, height),
        Rect::new(width - thickness, 0.0, thickness, height),
    ]
}

/// Unique identifier assigned to an obstacle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObstacleId(u32);

impl ObstacleId {
    /// Creates a new obstacle identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Whether a door currently blocks movement and sight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DoorState {
    /// The door is shut and behaves like a wall.
    Locked,
    /// The door is open and ignored by collision and line of sight.
    Open,
}

/// Classification of a static obstacle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Permanent wall segment.
    Wall,
    /// Door that may be toggled by an interaction system.
    Door {
        /// Current state of the door.
        state: DoorState,
    },
}

/// Static rectangular obstacle placed in the level.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    /// Identifier assigned when the level was loaded.
    pub id: ObstacleId,
    /// Footprint occupied by the obstacle.
    pub rect: Rect,
    /// Whether the obstacle is a wall or a door.
    pub kind: ObstacleKind,
}

impl Obstacle {
    /// Creates a plain wall obstacle.
    #[must_use]
    pub const fn wall(id: ObstacleId, rect: Rect) -> Self {
        Self {
            id,
            rect,
            kind: ObstacleKind::Wall,
        }
    }

    /// Creates a door obstacle in the provided state.
    #[must_use]
    pub const fn door(id: ObstacleId, rect: Rect, state: DoorState) -> Self {
        Self {
            id,
            rect,
            kind: ObstacleKind::Door { state },
        }
    }

    /// Reports whether the obstacle currently blocks movement and sight.
    ///
    /// Open doors and inert rectangles never block.
    #[must_use]
    pub fn blocks(&self) -> bool {
        let open = matches!(
            self.kind,
            ObstacleKind::Door {
                state: DoorState::Open
            }
        );
        !open && self.rect.is_solid()
    }

    /// Reports whether the obstacle is a door.
    #[must_use]
    pub const fn is_door(&self) -> bool {
        matches!(self.kind, ObstacleKind::Door { .. })
    }
}

/// Unique identifier assigned to a noise event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NoiseId(u64);

impl NoiseId {
    /// Creates a new noise identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

/// Origin of a noise event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoiseSource {
    /// Impact of a rock thrown by the player.
    Rock,
    /// Noise injected directly by an adapter or script.
    Scripted,
}

/// Timed, radius-bounded stimulus that guards may hear.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NoiseEvent {
    /// Identifier allocated by the noise bus.
    pub id: NoiseId,
    /// World-space centre of the noise.
    pub position: Vec2,
    /// Distance within which guards hear the noise.
    pub radius: f32,
    /// Seconds remaining before the noise expires.
    pub time_to_live: f32,
    /// What produced the noise.
    pub source: NoiseSource,
}

/// Unique identifier assigned to a guard.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GuardId(u32);

impl GuardId {
    /// Creates a new guard identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Tactical behaviour state of a guard.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GuardState {
    /// Walking the authored waypoint loop.
    #[default]
    Patrol,
    /// Checking out a noise, a radio report, or a half-glimpsed player.
    Investigate,
    /// Pursuing a fully detected player.
    Chase,
    /// Working through a search plan after losing the player.
    Search,
    /// Heading back to the patrol route.
    Return,
}

impl GuardState {
    /// Upper-case label used by debug overlays and logs.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Patrol => "PATROL",
            Self::Investigate => "INVESTIGATE",
            Self::Chase => "CHASE",
            Self::Search => "SEARCH",
            Self::Return => "RETURN",
        }
    }
}

/// Behavioural archetype that scales a guard's base tuning.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardArchetype {
    /// Unmodified tuning.
    #[default]
    Standard,
    /// Slow, long-sighted guard with a narrow cone.
    Sentry,
    /// Fast guard with a wide but short cone.
    Hunter,
}

/// Multipliers applied by a [`GuardArchetype`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArchetypeScale {
    /// Multiplier applied to every movement speed.
    pub speed: f32,
    /// Multiplier applied to the vision range.
    pub vision_range: f32,
    /// Multiplier applied to the field of view.
    pub field_of_view: f32,
}

impl GuardArchetype {
    /// Multipliers this archetype applies to base tuning.
    #[must_use]
    pub const fn scale(&self) -> ArchetypeScale {
        match self {
            Self::Standard => ArchetypeScale {
                speed: 1.0,
                vision_range: 1.0,
                field_of_view: 1.0,
            },
            Self::Sentry => ArchetypeScale {
                speed: 0.8,
                vision_range: 1.25,
                field_of_view: 0.75,
            },
            Self::Hunter => ArchetypeScale {
                speed: 1.2,
                vision_range: 0.85,
                field_of_view: 1.25,
            },
        }
    }
}

/// Optional per-guard tuning values authored in level data.
///
/// Missing or non-finite values fall back to the shared defaults.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardOverrides {
    /// Walking speed while patrolling or investigating.
    pub patrol_speed: Option<f32>,
    /// Running speed while chasing.
    pub chase_speed: Option<f32>,
    /// Speed while searching or returning.
    pub return_speed: Option<f32>,
    /// Maximum sighting distance.
    pub vision_range: Option<f32>,
    /// Full field of view in degrees.
    pub fov_deg: Option<f32>,
    /// Distance at which a target point counts as reached.
    pub waypoint_reach_distance: Option<f32>,
}

/// Level-authored description of a guard slot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GuardConfig {
    /// Display name, unique within a level.
    pub name: String,
    /// Archetype scaling the guard's tuning.
    #[serde(default)]
    pub archetype: GuardArchetype,
    /// Spawn rectangle of the guard body.
    pub rect: Rect,
    /// Ordered, cyclic patrol waypoints.
    #[serde(default)]
    pub waypoints: Vec<Vec2>,
    /// Initial facing in radians.
    #[serde(default)]
    pub facing: f32,
    /// Per-guard tuning overrides.
    #[serde(default)]
    pub overrides: GuardOverrides,
}

/// Reasons a level layout is rejected.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LevelValidationError {
    /// The level bounds are not finite positive numbers.
    #[error("level bounds must be finite and positive")]
    InvalidBounds,
    /// The player spawn rectangle has no usable area.
    #[error("player spawn rectangle must have a positive finite size")]
    InvalidPlayerSpawn,
    /// A guard body rectangle has no usable area.
    #[error("guard `{name}` has no usable body rectangle")]
    InvalidGuardBody {
        /// Name of the offending guard.
        name: String,
    },
    /// Two guards share a name.
    #[error("guard name `{name}` is used more than once")]
    DuplicateGuardName {
        /// Name that appears more than once.
        name: String,
    },
}

/// Static description of a playable level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelLayout {
    /// Human readable level name.
    pub name: String,
    /// Width of the level in world units.
    pub width: f32,
    /// Height of the level in world units.
    pub height: f32,
    /// Thickness of the generated border walls, if any.
    #[serde(default)]
    pub border_thickness: Option<f32>,
    /// Rectangle the player occupies on spawn and retry.
    pub player_spawn: Rect,
    /// Interior wall rectangles.
    #[serde(default)]
    pub walls: Vec<Rect>,
    /// Door rectangles; every door starts locked.
    #[serde(default)]
    pub doors: Vec<Rect>,
    /// Rectangles the player may hide in.
    #[serde(default)]
    pub hide_spots: Vec<Rect>,
    /// Guard slots in creation order.
    #[serde(default)]
    pub guards: Vec<GuardConfig>,
}

impl LevelLayout {
    /// Checks that the layout can be simulated.
    pub fn validate(&self) -> Result<(), LevelValidationError> {
        if !(self.width.is_finite() && self.height.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
        {
            return Err(LevelValidationError::InvalidBounds);
        }

        if !self.player_spawn.is_solid() {
            return Err(LevelValidationError::InvalidPlayerSpawn);
        }

        let mut names = HashSet::new();
        for guard in &self.guards {
            if !guard.rect.is_solid() {
                return Err(LevelValidationError::InvalidGuardBody {
                    name: guard.name.clone(),
                });
            }
            if !names.insert(guard.name.as_str()) {
                return Err(LevelValidationError::DuplicateGuardName {
                    name: guard.name.clone(),
                });
            }
        }

        Ok(())
    }

    /// Materialises the obstacle list: border walls, interior walls, then doors.
    #[must_use]
    pub fn obstacles(&self) -> Vec<Obstacle> {
        let border = self
            .border_thickness
            .filter(|thickness| thickness.is_finite() && *thickness > 0.0)
            .map(|thickness| outer_walls(self.width, self.height, thickness));

        let walls = border
            .into_iter()
            .flatten()
            .chain(self.walls.iter().copied())
            .map(|rect| (rect, ObstacleKind::Wall));
        let doors = self.doors.iter().map(|rect| {
            (
                *rect,
                ObstacleKind::Door {
                    state: DoorState::Locked,
                },
            )
        });

        walls
            .chain(doors)
            .enumerate()
            .map(|(index, (rect, kind))| Obstacle {
                id: ObstacleId::new(index as u32),
                rect,
                kind,
            })
            .collect()
    }

    /// Compact test level: a single guard looping around an interior wall.
    #[must_use]
    pub fn test_level() -> Self {
        Self {
            name: "Test Level".to_owned(),
            width: 1024.0,
            height: 768.0,
            border_thickness: Some(20.0),
            player_spawn: Rect::new(120.0, 120.0, 22.0, 22.0),
            walls: vec![Rect::new(480.0, 220.0, 25.0, 320.0)],
            doors: Vec::new(),
            hide_spots: vec![
                Rect::new(220.0, 520.0, 50.0, 50.0),
                Rect::new(720.0, 560.0, 50.0, 50.0),
            ],
            guards: vec![GuardConfig {
                name: "Guard 1".to_owned(),
                archetype: GuardArchetype::Standard,
                rect: Rect::new(760.0, 160.0, 28.0, 28.0),
                waypoints: vec![
                    Vec2::new(820.0, 160.0),
                    Vec2::new(820.0, 420.0),
                    Vec2::new(640.0, 420.0),
                    Vec2::new(640.0, 160.0),
                ],
                facing: 0.0,
                overrides: GuardOverrides::default(),
            }],
        }
    }
}

/// High-level state of the player as observed by the guards.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerState {
    /// Free to move and visible to guards.
    #[default]
    Normal,
    /// Tucked into a hide spot.
    Hidden,
    /// Caught by a guard; the simulation is frozen until reset.
    Captured,
}

/// Read-only view of the player proxy.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    /// Body rectangle of the player.
    pub rect: Rect,
    /// Whether the player is currently hidden from sight.
    pub hidden: bool,
    /// High-level player state.
    pub state: PlayerState,
}

/// Read-only telemetry describing a guard after its latest update.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GuardSnapshot {
    /// Identifier of the guard.
    pub guard_id: GuardId,
    /// Display name of the guard.
    pub name: String,
    /// Current behaviour state.
    pub state: GuardState,
    /// Detection scalar in `[0, 1]`.
    pub detection: f32,
    /// Whether the guard currently sees the player.
    pub sees: bool,
    /// Whether the player is within vision range.
    pub in_range: bool,
    /// Whether the player is within the field of view.
    pub in_fov: bool,
    /// Whether the segment to the player is unobstructed.
    pub has_line_of_sight: bool,
    /// Centre of the guard body.
    pub position: Vec2,
    /// Facing angle in radians, normalised to `(-π, π]`.
    pub facing: f32,
    /// Point the guard is currently walking toward, if any.
    pub target: Option<Vec2>,
}

/// Coarse threat indicator derived from the guards' detection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThreatLevel {
    /// No guard is close to spotting the player.
    #[default]
    Clear,
    /// At least one guard is growing suspicious.
    Suspicious,
    /// A guard has (almost) confirmed the player.
    Alert,
}

impl ThreatLevel {
    /// Ratio at or above which the threat is [`ThreatLevel::Suspicious`].
    pub const SUSPICIOUS_THRESHOLD: f32 = 0.35;
    /// Ratio at or above which the threat is [`ThreatLevel::Alert`].
    pub const ALERT_THRESHOLD: f32 = 0.95;

    /// Classifies a threat ratio in `[0, 1]`.
    #[must_use]
    pub fn from_ratio(ratio: f32) -> Self {
        if ratio >= Self::ALERT_THRESHOLD {
            Self::Alert
        } else if ratio >= Self::SUSPICIOUS_THRESHOLD {
            Self::Suspicious
        } else {
            Self::Clear
        }
    }
}

/// Aggregated threat meter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Threat {
    /// One when any guard is chasing, otherwise the highest detection.
    pub ratio: f32,
    /// Classification of [`Threat::ratio`].
    pub level: ThreatLevel,
}

/// Reasons a rock throw request is ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThrowRejection {
    /// The previous throw is still cooling down.
    CoolingDown,
    /// The player is hidden or captured.
    PlayerUnavailable,
    /// The requested target is not a finite point.
    InvalidTarget,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replaces the current level with the provided layout.
    LoadLevel {
        /// Layout to instantiate.
        layout: LevelLayout,
    },
    /// Restores the loaded level to its initial state.
    ResetLevel,
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Adds a noise event to the bus.
    EmitNoise {
        /// Centre of the noise.
        position: Vec2,
        /// Audible radius.
        radius: f32,
        /// Lifetime in seconds.
        time_to_live: f32,
        /// What produced the noise.
        source: NoiseSource,
    },
    /// Throws a rock from the player toward `target`.
    ThrowRock {
        /// Requested landing point; clamped to the maximum throw range.
        target: Vec2,
    },
    /// Moves the player by `delta`, resolving collisions against obstacles.
    MovePlayer {
        /// Requested displacement.
        delta: Vec2,
    },
    /// Teleports the player so that its centre lies on `center`.
    PlacePlayer {
        /// New centre of the player body.
        center: Vec2,
    },
    /// Hides or reveals the player.
    SetPlayerHidden {
        /// Whether the player should be hidden.
        hidden: bool,
    },
    /// Opens or locks a door.
    SetDoorState {
        /// Door to update.
        obstacle: ObstacleId,
        /// Desired state.
        state: DoorState,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that a level was instantiated.
    LevelLoaded {
        /// Number of guards created for the level.
        guards: usize,
    },
    /// Reports that a level layout was refused and the previous level kept.
    LevelRejected {
        /// Why the layout was refused.
        reason: LevelValidationError,
    },
    /// Confirms that the level returned to its initial state.
    LevelReset,
    /// Confirms that a noise was added to the bus.
    NoiseEmitted {
        /// Identifier allocated for the noise.
        noise: NoiseId,
        /// Centre of the noise.
        position: Vec2,
    },
    /// Reports that a noise reached the end of its lifetime.
    NoiseExpired {
        /// Identifier of the expired noise.
        noise: NoiseId,
    },
    /// Reports that a rock throw request was ignored.
    RockThrowRejected {
        /// Why the throw was ignored.
        reason: ThrowRejection,
    },
    /// Reports that a guard reacted to a noise.
    NoiseHeard {
        /// Guard that heard the noise.
        guard: GuardId,
        /// Noise that was heard.
        noise: NoiseId,
    },
    /// Announces a guard behaviour transition.
    GuardStateChanged {
        /// Guard that transitioned.
        guard: GuardId,
        /// State before the transition.
        from: GuardState,
        /// State after the transition.
        to: GuardState,
    },
    /// Announces that a guard confirmed the player and radioed nearby guards.
    RadioAlertRaised {
        /// Guard that raised the alert.
        guard: GuardId,
        /// Player position reported over the radio.
        position: Vec2,
    },
    /// Confirms that a guard received a radio alert.
    RadioAlertReceived {
        /// Guard that received the alert.
        guard: GuardId,
        /// Guard that raised the alert.
        from: GuardId,
    },
    /// Reports that the player was caught.
    PlayerCaptured {
        /// Guard that made the capture.
        guard: GuardId,
    },
    /// Reports that the player's hidden flag changed.
    PlayerHiddenChanged {
        /// New value of the flag.
        hidden: bool,
    },
    /// Reports that a door changed state.
    DoorStateChanged {
        /// Door that changed.
        obstacle: ObstacleId,
        /// New state of the door.
        state: DoorState,
    },
}
