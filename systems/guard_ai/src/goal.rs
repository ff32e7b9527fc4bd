use shadow_signal_core::{GuardState, Vec2};

/// Points a guard may head for this tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Bearings {
    /// Centre of the player at the start of the tick.
    pub player: Vec2,
    /// Current patrol waypoint, when the guard has a route.
    pub waypoint: Option<Vec2>,
    /// Centre of the guard's spawn rectangle.
    pub home: Vec2,
    /// Point of the active investigate, search, or return leg.
    pub leg: Option<Vec2>,
}

/// Picks the point a guard in `state` walks toward.
///
/// Patrolling guards follow their route, or hold their spawn point when they
/// have none. Chasing guards run at the player. Every other state follows its
/// current leg and stands still once there is none.
#[must_use]
pub fn movement_goal(state: GuardState, bearings: &Bearings) -> Option<Vec2> {
    match state {
        GuardState::Patrol => Some(bearings.waypoint.unwrap_or(bearings.home)),
        GuardState::Chase => Some(bearings.player),
        GuardState::Investigate | GuardState::Search | GuardState::Return => bearings.leg,
    }
}
