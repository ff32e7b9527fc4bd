#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Noise and radio propagation between the player and the guards.
//!
//! The [`NoiseBus`] owns every live [`NoiseEvent`]. Emitters push events onto
//! it, guards read it during their update, and the world ages it once per
//! tick after every guard has listened. Radio alerts are not stored: the
//! guard that confirms the player asks [`radio_recipients`] who is close
//! enough to receive the report.

use shadow_signal_core::{
    positive_or, GuardId, GuardState, NoiseEvent, NoiseId, NoiseSource, ThrowRejection, Vec2,
};

/// Ordered collection of live noise events.
#[derive(Debug, Default)]
pub struct NoiseBus {
    events: Vec<NoiseEvent>,
    next_id: u64,
}

impl NoiseBus {
    /// Creates an empty noise bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a noise to the bus and returns its identifier.
    ///
    /// Noises with a non-finite centre or a non-positive radius or lifetime
    /// are dropped and yield `None`.
    pub fn emit(
        &mut self,
        position: Vec2,
        radius: f32,
        time_to_live: f32,
        source: NoiseSource,
    ) -> Option<NoiseId> {
        if !position.is_finite()
            || positive_or(radius, 0.0) == 0.0
            || positive_or(time_to_live, 0.0) == 0.0
        {
            return None;
        }

        let id = NoiseId::new(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        self.events.push(NoiseEvent {
            id,
            position,
            radius,
            time_to_live,
            source,
        });
        Some(id)
    }

    /// Ages every event by `dt` seconds and drops those whose lifetime ran out.
    ///
    /// Identifiers of the dropped events are appended to `expired`.
    pub fn advance(&mut self, dt: f32, expired: &mut Vec<NoiseId>) {
        let dt = dt.max(0.0);
        self.events.retain_mut(|event| {
            event.time_to_live -= dt;
            if event.time_to_live > 0.0 {
                true
            } else {
                expired.push(event.id);
                false
            }
        });
    }

    /// Live events, oldest first.
    #[must_use]
    pub fn events(&self) -> &[NoiseEvent] {
        &self.events
    }

    /// Most recently emitted event that is still live.
    #[must_use]
    pub fn active(&self) -> Option<&NoiseEvent> {
        self.events.last()
    }

    /// Newest event audible from `listener` that is newer than `heard`.
    ///
    /// Identifiers grow monotonically, so passing the last noise a guard
    /// reacted to guarantees it never reacts to the same noise twice.
    #[must_use]
    pub fn fresh_audible(&self, listener: Vec2, heard: Option<NoiseId>) -> Option<&NoiseEvent> {
        self.events
            .iter()
            .rev()
            .take_while(|event| heard.map_or(true, |heard| event.id > heard))
            .find(|event| hears(listener, event))
    }

    /// Removes every live event. Identifiers keep increasing afterwards.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

/// Reports whether a listener at `listener` hears `event`.
#[must_use]
pub fn hears(listener: Vec2, event: &NoiseEvent) -> bool {
    listener.distance(event.position) <= event.radius
}

/// Position and state of a guard that may receive a radio alert.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RadioListener {
    /// Identifier of the listening guard.
    pub guard: GuardId,
    /// Centre of the listening guard.
    pub position: Vec2,
    /// Behaviour state of the listening guard.
    pub state: GuardState,
}

/// Selects the guards that receive a radio alert raised by `source` at `origin`.
///
/// The source itself and guards already chasing are skipped. Recipients are
/// returned in listener order.
#[must_use]
pub fn radio_recipients<I>(source: GuardId, origin: Vec2, radius: f32, listeners: I) -> Vec<GuardId>
where
    I: IntoIterator<Item = RadioListener>,
{
    listeners
        .into_iter()
        .filter(|listener| listener.guard != source)
        .filter(|listener| listener.state != GuardState::Chase)
        .filter(|listener| listener.position.distance(origin) <= radius)
        .map(|listener| listener.guard)
        .collect()
}

/// Tuning for thrown rocks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RockTuning {
    /// Farthest a rock lands from the thrower.
    pub max_throw_range: f32,
    /// Audible radius of the impact.
    pub noise_radius: f32,
    /// Lifetime of the impact noise in seconds.
    pub noise_time_to_live: f32,
    /// Seconds between throws.
    pub cooldown: f32,
}

impl Default for RockTuning {
    fn default() -> Self {
        Self {
            max_throw_range: 250.0,
            noise_radius: 120.0,
            noise_time_to_live: 0.7,
            cooldown: 0.45,
        }
    }
}

/// Player-side emitter that turns rock throws into noise events.
#[derive(Debug)]
pub struct RockThrower {
    tuning: RockTuning,
    cooldown_remaining: f32,
}

impl RockThrower {
    /// Creates a thrower that is ready to throw.
    #[must_use]
    pub const fn new(tuning: RockTuning) -> Self {
        Self {
            tuning,
            cooldown_remaining: 0.0,
        }
    }

    /// Counts the cooldown down by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        self.cooldown_remaining = (self.cooldown_remaining - dt.max(0.0)).max(0.0);
    }

    /// Whether the cooldown has elapsed.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.cooldown_remaining <= 0.0
    }

    /// Makes the thrower ready again.
    pub fn reset(&mut self) {
        self.cooldown_remaining = 0.0;
    }

    /// Throws a rock from `origin` toward `target` and emits its impact noise.
    ///
    /// The landing point is pulled back onto the maximum throw range when the
    /// target lies farther away.
    pub fn throw(
        &mut self,
        origin: Vec2,
        target: Vec2,
        bus: &mut NoiseBus,
    ) -> Result<(NoiseId, Vec2), ThrowRejection> {
        if !self.is_ready() {
            return Err(ThrowRejection::CoolingDown);
        }
        if !(origin.is_finite() && target.is_finite()) {
            return Err(ThrowRejection::InvalidTarget);
        }

        let offset = target - origin;
        let landing = if offset.length() > self.tuning.max_throw_range {
            origin + offset.normalize_or_zero() * self.tuning.max_throw_range
        } else {
            target
        };

        let noise = bus
            .emit(
                landing,
                self.tuning.noise_radius,
                self.tuning.noise_time_to_live,
                NoiseSource::Rock,
            )
            .ok_or(ThrowRejection::InvalidTarget)?;
        self.cooldown_remaining = self.tuning.cooldown;
        Ok((noise, landing))
    }
}

impl Default for RockThrower {
    fn default() -> Self {
        Self::new(RockTuning::default())
    }
}
