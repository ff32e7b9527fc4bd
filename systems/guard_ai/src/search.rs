use shadow_signal_core::{Obstacle, Rect, Vec2};
use shadow_signal_system_visibility::rect_contains_point;

use crate::GuardTuning;

/// Ordered points a guard visits after losing the player.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SearchPlan {
    points: Vec<Vec2>,
    index: usize,
}

impl SearchPlan {
    /// Points of the plan in visiting order.
    #[must_use]
    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    /// Point currently being searched, if any remain.
    #[must_use]
    pub fn current(&self) -> Option<Vec2> {
        self.points.get(self.index).copied()
    }

    /// Index of the point currently being searched.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Moves on to the next point.
    pub fn advance(&mut self) {
        self.index = (self.index + 1).min(self.points.len());
    }

    /// Whether every point has been visited.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.index >= self.points.len()
    }
}

/// Builds the search plan for a guard that lost the player at `last_seen`.
///
/// The plan starts at the last-seen point, then visits the nearest hide spot
/// within [`GuardTuning::hide_spot_search_radius`] if there is one, then sweeps
/// an arc of [`GuardTuning::search_sweep_count`] points around the last-seen
/// point. The arc is centred on `facing` and spans
/// [`GuardTuning::search_sweep_arc_fraction`] of `field_of_view`. Sweep points
/// that land inside a blocking obstacle are dropped.
#[must_use]
pub fn build_search_plan(
    last_seen: Vec2,
    facing: f32,
    field_of_view: f32,
    hide_spots: &[Rect],
    obstacles: &[Obstacle],
    tuning: &GuardTuning,
) -> SearchPlan {
    let mut points = vec![last_seen];

    let nearest_hide_spot = hide_spots
        .iter()
        .filter(|spot| spot.is_solid())
        .map(Rect::center)
        .map(|center| (center, center.distance(last_seen)))
        .filter(|(_, distance)| *distance <= tuning.hide_spot_search_radius)
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(center, _)| center);
    points.extend(nearest_hide_spot);

    let count = tuning.search_sweep_count.max(1);
    let span = field_of_view * tuning.search_sweep_arc_fraction;
    let sweep = (0..count)
        .map(|index| {
            if count == 1 {
                facing
            } else {
                facing - span * 0.5 + span * index as f32 / (count - 1) as f32
            }
        })
        .map(|angle| last_seen + Vec2::from_angle(angle) * tuning.search_sweep_radius)
        .filter(|point| point.is_finite())
        .filter(|point| {
            !obstacles
                .iter()
                .filter(|obstacle| obstacle.blocks())
                .any(|obstacle| rect_contains_point(&obstacle.rect, *point))
        });
    points.extend(sweep);

    SearchPlan { points, index: 0 }
}
