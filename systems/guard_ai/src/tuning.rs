use shadow_signal_core::{positive_or, GuardArchetype, GuardOverrides};
use shadow_signal_system_visibility::LosTuning;

/// Largest number of sweep points a search plan may contain.
pub const MAX_SWEEP_COUNT: usize = 8;

/// Numeric tuning shared by every guard.
///
/// Level data may override a handful of these per guard through
/// [`GuardOverrides`]; the rest are global. Values are resolved once when a
/// guard is constructed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GuardTuning {
    /// Walking speed while patrolling or investigating, in units per second.
    pub patrol_speed: f32,
    /// Running speed while chasing.
    pub chase_speed: f32,
    /// Speed while searching or returning to the route.
    pub return_speed: f32,
    /// Maximum sighting distance.
    pub vision_range: f32,
    /// Full field of view in radians.
    pub field_of_view: f32,
    /// Distance below which a target point counts as reached.
    pub waypoint_reach_distance: f32,
    /// Per-tick displacement below which a moving guard counts as stalled.
    pub stuck_move_threshold: f32,
    /// Seconds a guard may stay stalled before skipping its current point.
    pub stuck_advance_delay: f32,
    /// Seconds of continuous sighting needed to go from zero to full detection.
    pub detection_rise_time: f32,
    /// Seconds for full detection to decay to zero without a sighting.
    pub detection_decay_time: f32,
    /// Seconds for full detection to decay to zero while the player hides.
    pub hidden_decay_time: f32,
    /// Seconds a chasing guard keeps pursuing after losing sight.
    pub chase_memory: f32,
    /// Seconds spent looking around at an investigated point.
    pub investigate_pause: f32,
    /// Seconds a guard may spend travelling a single investigate, search, or
    /// return leg before giving up on it.
    pub leg_timeout: f32,
    /// Seconds spent looking around at each search point.
    pub search_pause: f32,
    /// Rotation speed while looking around, in radians per second.
    pub scan_rate: f32,
    /// Number of sweep points appended to a search plan.
    pub search_sweep_count: usize,
    /// Distance of sweep points from the last-seen position.
    pub search_sweep_radius: f32,
    /// Share of the field of view covered by the sweep arc.
    pub search_sweep_arc_fraction: f32,
    /// Hide spots farther than this from the last-seen position are not searched.
    pub hide_spot_search_radius: f32,
    /// Range of the radio used to report a confirmed sighting.
    pub radio_radius: f32,
    /// Detection a guard is raised to when it receives a radio alert.
    pub radio_detection_floor: f32,
    /// Tolerances for line-of-sight checks.
    pub los: LosTuning,
}

impl Default for GuardTuning {
    fn default() -> Self {
        Self {
            patrol_speed: 90.0,
            chase_speed: 140.0,
            return_speed: 100.0,
            vision_range: 320.0,
            field_of_view: 80f32.to_radians(),
            waypoint_reach_distance: 8.0,
            stuck_move_threshold: 0.5,
            stuck_advance_delay: 0.35,
            detection_rise_time: 0.8,
            detection_decay_time: 1.6,
            hidden_decay_time: 3.2,
            chase_memory: 0.35,
            investigate_pause: 2.0,
            leg_timeout: 8.0,
            search_pause: 1.2,
            scan_rate: 1.6,
            search_sweep_count: 3,
            search_sweep_radius: 96.0,
            search_sweep_arc_fraction: 0.75,
            hide_spot_search_radius: 180.0,
            radio_radius: 480.0,
            radio_detection_floor: 0.35,
            los: LosTuning::default(),
        }
    }
}

impl GuardTuning {
    /// Applies per-guard overrides and archetype multipliers on top of `self`.
    ///
    /// Invalid override values are ignored and the result is sanitised.
    #[must_use]
    pub fn resolve(&self, overrides: &GuardOverrides, archetype: GuardArchetype) -> Self {
        let base = self.sanitized();
        let pick = |value: Option<f32>, fallback: f32| positive_or(value.unwrap_or(fallback), fallback);
        let scale = archetype.scale();

        let field_of_view = overrides
            .fov_deg
            .map(f32::to_radians)
            .map_or(base.field_of_view, |fov| positive_or(fov, base.field_of_view));

        Self {
            patrol_speed: pick(overrides.patrol_speed, base.patrol_speed) * scale.speed,
            chase_speed: pick(overrides.chase_speed, base.chase_speed) * scale.speed,
            return_speed: pick(overrides.return_speed, base.return_speed) * scale.speed,
            vision_range: pick(overrides.vision_range, base.vision_range) * scale.vision_range,
            field_of_view: (field_of_view * scale.field_of_view).min(std::f32::consts::TAU),
            waypoint_reach_distance: pick(
                overrides.waypoint_reach_distance,
                base.waypoint_reach_distance,
            ),
            ..base
        }
    }

    /// Replaces non-finite or out-of-range values with the defaults and clamps
    /// the search plan shape.
    #[must_use]
    pub fn sanitized(&self) -> Self {
        let defaults = Self::default();
        let fraction = if self.search_sweep_arc_fraction.is_finite()
            && self.search_sweep_arc_fraction > 0.0
        {
            self.search_sweep_arc_fraction.min(1.0)
        } else {
            defaults.search_sweep_arc_fraction
        };
        let floor = if self.radio_detection_floor.is_finite() {
            self.radio_detection_floor.clamp(0.0, 1.0)
        } else {
            defaults.radio_detection_floor
        };

        Self {
            patrol_speed: positive_or(self.patrol_speed, defaults.patrol_speed),
            chase_speed: positive_or(self.chase_speed, defaults.chase_speed),
            return_speed: positive_or(self.return_speed, defaults.return_speed),
            vision_range: positive_or(self.vision_range, defaults.vision_range),
            field_of_view: positive_or(self.field_of_view, defaults.field_of_view)
                .min(std::f32::consts::TAU),
            waypoint_reach_distance: positive_or(
                self.waypoint_reach_distance,
                defaults.waypoint_reach_distance,
            ),
            stuck_move_threshold: positive_or(
                self.stuck_move_threshold,
                defaults.stuck_move_threshold,
            ),
            stuck_advance_delay: positive_or(
                self.stuck_advance_delay,
                defaults.stuck_advance_delay,
            ),
            detection_rise_time: positive_or(
                self.detection_rise_time,
                defaults.detection_rise_time,
            ),
            detection_decay_time: positive_or(
                self.detection_decay_time,
                defaults.detection_decay_time,
            ),
            hidden_decay_time: positive_or(self.hidden_decay_time, defaults.hidden_decay_time),
            chase_memory: positive_or(self.chase_memory, defaults.chase_memory),
            investigate_pause: positive_or(self.investigate_pause, defaults.investigate_pause),
            leg_timeout: positive_or(self.leg_timeout, defaults.leg_timeout),
            search_pause: positive_or(self.search_pause, defaults.search_pause),
            scan_rate: positive_or(self.scan_rate, defaults.scan_rate),
            search_sweep_count: self.search_sweep_count.clamp(1, MAX_SWEEP_COUNT),
            search_sweep_radius: positive_or(
                self.search_sweep_radius,
                defaults.search_sweep_radius,
            ),
            search_sweep_arc_fraction: fraction,
            hide_spot_search_radius: positive_or(
                self.hide_spot_search_radius,
                defaults.hide_spot_search_radius,
            ),
            radio_radius: positive_or(self.radio_radius, defaults.radio_radius),
            radio_detection_floor: floor,
            los: LosTuning::new(self.los.epsilon, self.los.edge_inset),
        }
    }
}
