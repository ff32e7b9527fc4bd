use shadow_signal_core::{
    Event, GuardConfig, GuardId, GuardSnapshot, GuardState, NoiseId, Obstacle, PlayerSnapshot,
    Rect, Vec2,
};
use shadow_signal_system_movement::approach;
use shadow_signal_system_noise::NoiseBus;
use shadow_signal_system_visibility::{
    assess_vision, normalize_angle, rects_overlap, VisionCone, VisionReport,
};
use tracing::debug;

use crate::{
    build_search_plan, movement_goal, next_state, state_speed, Bearings, GuardTuning, Perception,
    SearchPlan,
};

/// Level state lent to a guard for one update.
#[derive(Clone, Copy, Debug)]
pub struct TickContext<'a> {
    /// Seconds of simulated time elapsed this tick.
    pub dt: f32,
    /// Player as it was at the start of the tick.
    pub player: &'a PlayerSnapshot,
    /// Static obstacles of the level.
    pub obstacles: &'a [Obstacle],
    /// Hide spots of the level.
    pub hide_spots: &'a [Rect],
    /// Live noise events.
    pub noise: &'a NoiseBus,
}

/// What a guard update produced besides events.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GuardReport {
    /// Vision results evaluated this tick.
    pub vision: VisionReport,
    /// Player position to broadcast over the radio, when detection saturated this tick.
    pub radio: Option<Vec2>,
    /// Whether the guard caught the player this tick.
    ///
    /// The guard emits no event for a capture; the caller decides which guard
    /// of the tick gets the credit.
    pub captured: bool,
}

/// A single travel-then-look-around assignment.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Leg {
    target: Vec2,
    pause: f32,
    elapsed: f32,
    phase: LegPhase,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum LegPhase {
    Travelling,
    Scanning { remaining: f32 },
    Done,
}

impl Leg {
    const fn new(target: Vec2, pause: f32) -> Self {
        Self {
            target,
            pause,
            elapsed: 0.0,
            phase: LegPhase::Travelling,
        }
    }

    fn is_done(&self) -> bool {
        self.phase == LegPhase::Done
    }
}

/// A guard agent: perception, detection, and tactical behaviour.
#[derive(Clone, Debug)]
pub struct Guard {
    id: GuardId,
    name: String,
    tuning: GuardTuning,
    spawn: Rect,
    spawn_facing: f32,
    waypoints: Vec<Vec2>,
    body: Rect,
    facing: f32,
    waypoint_index: usize,
    state: GuardState,
    detection: f32,
    last_seen: Option<Vec2>,
    last_seen_facing: f32,
    unseen_for: f32,
    heard: Option<NoiseId>,
    leg: Option<Leg>,
    search: Option<SearchPlan>,
    stuck_for: f32,
    scan_direction: f32,
    target: Option<Vec2>,
    vision: VisionReport,
}

impl Guard {
    /// Creates a guard from its level configuration.
    ///
    /// `defaults` supplies every value the configuration does not override.
    #[must_use]
    pub fn new(id: GuardId, config: &GuardConfig, defaults: &GuardTuning) -> Self {
        let tuning = defaults.resolve(&config.overrides, config.archetype);
        let waypoints: Vec<Vec2> = config
            .waypoints
            .iter()
            .copied()
            .filter(|point| point.is_finite())
            .collect();
        let spawn_facing = normalize_angle(config.facing);

        Self {
            id,
            name: config.name.clone(),
            tuning,
            spawn: config.rect,
            spawn_facing,
            waypoints,
            body: config.rect,
            facing: spawn_facing,
            waypoint_index: 0,
            state: GuardState::Patrol,
            detection: 0.0,
            last_seen: None,
            last_seen_facing: spawn_facing,
            unseen_for: 0.0,
            heard: None,
            leg: None,
            search: None,
            stuck_for: 0.0,
            scan_direction: 1.0,
            target: None,
            vision: VisionReport::default(),
        }
    }

    /// Restores the guard to its spawn pose and initial state.
    pub fn reset(&mut self) {
        self.body = self.spawn;
        self.facing = self.spawn_facing;
        self.waypoint_index = 0;
        self.state = GuardState::Patrol;
        self.detection = 0.0;
        self.last_seen = None;
        self.last_seen_facing = self.spawn_facing;
        self.unseen_for = 0.0;
        self.heard = None;
        self.leg = None;
        self.search = None;
        self.stuck_for = 0.0;
        self.scan_direction = 1.0;
        self.target = None;
        self.vision = VisionReport::default();
    }

    /// Identifier of the guard.
    #[must_use]
    pub const fn id(&self) -> GuardId {
        self.id
    }

    /// Display name of the guard.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current behaviour state.
    #[must_use]
    pub const fn state(&self) -> GuardState {
        self.state
    }

    /// Detection scalar in `[0, 1]`.
    #[must_use]
    pub const fn detection(&self) -> f32 {
        self.detection
    }

    /// Body rectangle of the guard.
    #[must_use]
    pub const fn body(&self) -> &Rect {
        &self.body
    }

    /// Centre of the guard body.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.body.center()
    }

    /// Facing angle in radians.
    #[must_use]
    pub const fn facing(&self) -> f32 {
        self.facing
    }

    /// Where the guard last saw the player.
    #[must_use]
    pub const fn last_seen(&self) -> Option<Vec2> {
        self.last_seen
    }

    /// Active search plan, while searching.
    #[must_use]
    pub fn search_plan(&self) -> Option<&SearchPlan> {
        self.search.as_ref()
    }

    /// Point the guard is walking toward.
    #[must_use]
    pub const fn target(&self) -> Option<Vec2> {
        self.target
    }

    /// Resolved tuning of this guard.
    #[must_use]
    pub const fn tuning(&self) -> &GuardTuning {
        &self.tuning
    }

    /// Telemetry describing the guard after its latest update.
    #[must_use]
    pub fn snapshot(&self) -> GuardSnapshot {
        GuardSnapshot {
            guard_id: self.id,
            name: self.name.clone(),
            state: self.state,
            detection: self.detection,
            sees: self.vision.sees,
            in_range: self.vision.in_range,
            in_fov: self.vision.in_fov,
            has_line_of_sight: self.vision.has_line_of_sight,
            position: self.center(),
            facing: self.facing,
            target: self.target,
        }
    }

    /// Advances the guard by one tick.
    ///
    /// Vision and hearing use the pose the guard had at the start of the tick.
    /// The behaviour state is then updated, the guard moves toward the target
    /// of its (new) state, and its timers advance.
    pub fn update(&mut self, ctx: &TickContext<'_>, out: &mut Vec<Event>) -> GuardReport {
        let dt = ctx.dt.max(0.0);
        let player_hidden = ctx.player.hidden;
        let player_center = ctx.player.rect.center();

        let cone = VisionCone {
            origin: self.center(),
            facing: self.facing,
            range: self.tuning.vision_range,
            field_of_view: self.tuning.field_of_view,
        };
        self.vision = assess_vision(
            &cone,
            player_center,
            player_hidden,
            ctx.obstacles,
            &self.tuning.los,
        );
        self.integrate_detection(dt, player_hidden);

        if self.vision.sees {
            self.last_seen = Some(player_center);
            self.last_seen_facing = self.facing;
            self.unseen_for = 0.0;
        } else {
            self.unseen_for += dt;
        }

        let fresh_noise = ctx
            .noise
            .fresh_audible(self.center(), self.heard)
            .map(|event| (event.id, event.position));
        if let Some((noise, _)) = fresh_noise {
            self.heard = Some(noise);
        }
        let heard_noise = fresh_noise.filter(|_| self.state != GuardState::Chase);

        let perception = Perception {
            player_hidden,
            sees_player: self.vision.sees,
            detection: self.detection,
            contact_lost: self.unseen_for > self.tuning.chase_memory,
            has_last_seen: self.last_seen.is_some(),
            heard_noise: heard_noise.is_some(),
            investigation_finished: self.state == GuardState::Investigate && self.leg_done(),
            search_exhausted: self
                .search
                .as_ref()
                .map_or(self.state == GuardState::Search, SearchPlan::is_exhausted),
            arrived: self.state == GuardState::Return && self.leg_done(),
        };

        let mut report = GuardReport {
            vision: self.vision,
            ..GuardReport::default()
        };

        let next = next_state(self.state, &perception);
        if let Some((noise, position)) = heard_noise {
            out.push(Event::NoiseHeard {
                guard: self.id,
                noise,
            });
            debug!(guard = self.id.get(), noise = noise.get(), "noise_heard");
            if next == GuardState::Investigate {
                self.leg = Some(Leg::new(position, self.tuning.investigate_pause));
            }
        }

        if next != self.state {
            let investigate_target = heard_noise
                .map(|(_, position)| position)
                .or(self.last_seen)
                .unwrap_or_else(|| self.center());
            self.enter(next, investigate_target, ctx, out);
            if next == GuardState::Chase {
                report.radio = Some(player_center);
                out.push(Event::RadioAlertRaised {
                    guard: self.id,
                    position: player_center,
                });
            }
        } else if self.state == GuardState::Investigate && self.vision.sees {
            if let Some(last_seen) = self.last_seen {
                self.leg = Some(Leg::new(last_seen, self.tuning.investigate_pause));
            }
        }

        self.act(dt, player_center, ctx);

        if self.state == GuardState::Chase
            && !player_hidden
            && rects_overlap(&self.body, &ctx.player.rect)
        {
            report.captured = true;
        }

        report
    }

    /// Pushes the guard into an investigation of a position reported over the radio.
    ///
    /// Detection is raised to the radio floor. The facing is left alone and
    /// becomes the seed direction of any search that follows. Chasing guards
    /// ignore radio alerts.
    pub fn receive_radio_alert(&mut self, position: Vec2, out: &mut Vec<Event>) {
        if self.state == GuardState::Chase || !position.is_finite() {
            return;
        }

        self.detection = self.detection.max(self.tuning.radio_detection_floor);
        if self.state == GuardState::Investigate {
            self.leg = Some(Leg::new(position, self.tuning.investigate_pause));
            self.stuck_for = 0.0;
        } else {
            self.transition(GuardState::Investigate, out);
            self.search = None;
            self.leg = Some(Leg::new(position, self.tuning.investigate_pause));
        }
        self.target = Some(position);
        self.last_seen_facing = self.facing;
    }

    fn integrate_detection(&mut self, dt: f32, player_hidden: bool) {
        let delta = if player_hidden {
            -dt / self.tuning.hidden_decay_time
        } else if self.vision.sees {
            dt / self.tuning.detection_rise_time
        } else {
            -dt / self.tuning.detection_decay_time
        };
        self.detection = (self.detection + delta).clamp(0.0, 1.0);
    }

    fn leg_done(&self) -> bool {
        self.leg.map_or(true, |leg| leg.is_done())
    }

    fn transition(&mut self, next: GuardState, out: &mut Vec<Event>) {
        let from = self.state;
        if from == next {
            return;
        }
        self.state = next;
        self.stuck_for = 0.0;
        out.push(Event::GuardStateChanged {
            guard: self.id,
            from,
            to: next,
        });
        debug!(
            guard = self.id.get(),
            from = from.label(),
            to = next.label(),
            detection = self.detection,
            "guard_state_changed"
        );
    }

    fn enter(
        &mut self,
        next: GuardState,
        investigate_target: Vec2,
        ctx: &TickContext<'_>,
        out: &mut Vec<Event>,
    ) {
        self.transition(next, out);
        self.search = None;

        match next {
            GuardState::Patrol | GuardState::Chase => {
                self.leg = None;
            }
            GuardState::Investigate => {
                let keep = self
                    .leg
                    .is_some_and(|leg| leg.target == investigate_target);
                if !keep {
                    self.leg = Some(Leg::new(investigate_target, self.tuning.investigate_pause));
                }
            }
            GuardState::Search => {
                let last_seen = self.last_seen.unwrap_or_else(|| self.center());
                let plan = build_search_plan(
                    last_seen,
                    self.last_seen_facing,
                    self.tuning.field_of_view,
                    ctx.hide_spots,
                    ctx.obstacles,
                    &self.tuning,
                );
                self.leg = plan
                    .current()
                    .map(|point| Leg::new(point, self.tuning.search_pause));
                self.search = Some(plan);
            }
            GuardState::Return => {
                let home = self.nearest_route_point();
                self.leg = Some(Leg::new(home, 0.0));
            }
        }
    }

    fn nearest_route_point(&mut self) -> Vec2 {
        let center = self.center();
        let nearest = self
            .waypoints
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.distance(center).total_cmp(&b.distance(center)));
        match nearest {
            Some((index, point)) => {
                self.waypoint_index = index;
                *point
            }
            None => self.spawn.center(),
        }
    }

    fn act(&mut self, dt: f32, player_center: Vec2, ctx: &TickContext<'_>) {
        let speed = state_speed(self.state, &self.tuning);
        let bearings = Bearings {
            player: player_center,
            waypoint: self.waypoints.get(self.waypoint_index).copied(),
            home: self.spawn.center(),
            leg: self.leg.map(|leg| leg.target),
        };
        let goal = movement_goal(self.state, &bearings);

        match self.state {
            GuardState::Patrol => self.patrol(goal, dt, speed, ctx.obstacles),
            GuardState::Chase => {
                self.target = goal;
                if let Some(goal) = goal {
                    // Stalls are ignored: a pinned chaser keeps pushing while it
                    // sees the player and falls back on chase memory otherwise.
                    let _ = self.travel(goal, speed, dt, ctx.obstacles);
                }
            }
            GuardState::Investigate | GuardState::Return => {
                self.drive_leg(goal, dt, speed, ctx.obstacles);
            }
            GuardState::Search => {
                self.drive_leg(goal, dt, speed, ctx.obstacles);
                if self.leg_done() {
                    if let Some(plan) = self.search.as_mut() {
                        plan.advance();
                        self.leg = plan
                            .current()
                            .map(|point| Leg::new(point, self.tuning.search_pause));
                    }
                }
            }
        }
    }

    fn patrol(&mut self, goal: Option<Vec2>, dt: f32, speed: f32, obstacles: &[Obstacle]) {
        let Some(goal) = goal else {
            self.target = None;
            return;
        };

        if self.waypoints.is_empty() {
            if self.center().distance(goal) < self.tuning.waypoint_reach_distance {
                self.target = None;
                self.facing = self.spawn_facing;
            } else {
                self.target = Some(goal);
                let _ = self.travel(goal, speed, dt, obstacles);
            }
            return;
        }

        self.target = Some(goal);
        let travel = self.travel(goal, speed, dt, obstacles);
        if travel.reached || travel.stalled {
            self.waypoint_index = (self.waypoint_index + 1) % self.waypoints.len();
            self.stuck_for = 0.0;
        }
    }

    fn drive_leg(&mut self, goal: Option<Vec2>, dt: f32, speed: f32, obstacles: &[Obstacle]) {
        let (Some(mut leg), Some(goal)) = (self.leg.take(), goal) else {
            self.target = None;
            return;
        };

        self.target = Some(goal);
        match leg.phase {
            LegPhase::Travelling => {
                leg.elapsed += dt;
                let travel = self.travel(goal, speed, dt, obstacles);
                if travel.reached || travel.stalled || leg.elapsed >= self.tuning.leg_timeout {
                    self.stuck_for = 0.0;
                    leg.phase = if leg.pause > 0.0 {
                        self.scan_direction = -self.scan_direction;
                        LegPhase::Scanning {
                            remaining: leg.pause,
                        }
                    } else {
                        LegPhase::Done
                    };
                }
            }
            LegPhase::Scanning { remaining } => {
                self.facing =
                    normalize_angle(self.facing + self.scan_direction * self.tuning.scan_rate * dt);
                let remaining = remaining - dt;
                leg.phase = if remaining > 0.0 {
                    LegPhase::Scanning { remaining }
                } else {
                    LegPhase::Done
                };
            }
            LegPhase::Done => {}
        }

        self.leg = Some(leg);
    }

    /// Walks toward `target`, turning to face it, and tracks stalls.
    fn travel(&mut self, target: Vec2, speed: f32, dt: f32, obstacles: &[Obstacle]) -> Travel {
        let reach = self.tuning.waypoint_reach_distance;
        if self.center().distance(target) < reach {
            self.stuck_for = 0.0;
            return Travel {
                reached: true,
                stalled: false,
            };
        }

        let intended = (speed * dt).min(self.center().distance(target));
        let step = approach(&mut self.body, target, speed, dt, obstacles);
        if let Some(heading) = step.heading {
            self.facing = normalize_angle(heading);
        }

        let moved = step.displacement.length();
        if moved < self.tuning.stuck_move_threshold.min(intended * 0.5) {
            self.stuck_for += dt;
        } else {
            self.stuck_for = 0.0;
        }

        let stalled = self.stuck_for > self.tuning.stuck_advance_delay;
        Travel {
            reached: self.center().distance(target) < reach,
            stalled,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Travel {
    reached: bool,
    stalled: bool,
}
