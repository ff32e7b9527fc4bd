#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic collision resolver for rectangular bodies.
//!
//! Bodies move in sub-steps. Each sub-step sweeps the horizontal component
//! first, stopping flush against the nearest blocking face in its path, then
//! does the same for the vertical component. Resolving the axes separately
//! makes diagonal motion slide along walls instead of stopping.

use shadow_signal_core::{Obstacle, Rect, Vec2};
use shadow_signal_system_visibility::rects_overlap;

/// Preferred longest distance a body travels along either axis in a single sub-step.
pub const MAX_SUB_STEP: f32 = 4.0;

/// Upper bound on the number of sub-steps of one move.
///
/// Longer moves use proportionally longer sub-steps. Each axis sweep stops at
/// the first blocking face, so long sub-steps still cannot tunnel.
pub const MAX_SUB_STEPS: u32 = 256;

/// Moves `body` by `delta`, stopping flush against blocking obstacles.
///
/// Returns the displacement that was actually applied. Non-finite deltas and
/// inert bodies are left untouched.
pub fn resolve_move(body: &mut Rect, delta: Vec2, obstacles: &[Obstacle]) -> Vec2 {
    if !delta.is_finite() || !body.is_solid() {
        return Vec2::ZERO;
    }

    let steps = (delta.x.abs().max(delta.y.abs()) / MAX_SUB_STEP).ceil();
    if steps < 1.0 {
        return Vec2::ZERO;
    }
    let steps = steps.min(MAX_SUB_STEPS as f32);

    let start = body.origin();
    let step = delta / steps;
    for _ in 0..steps as u32 {
        advance_axis(body, Axis::Horizontal, step.x, obstacles);
        advance_axis(body, Axis::Vertical, step.y, obstacles);
    }

    body.origin() - start
}

/// Outcome of [`approach`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Approach {
    /// Displacement actually applied to the body.
    pub displacement: Vec2,
    /// Heading toward the target in radians, when the target is not already
    /// under the body centre.
    pub heading: Option<f32>,
    /// Distance from the body centre to the target before moving.
    pub distance: f32,
}

/// Walks `body` toward `target` at `speed` for `dt` seconds.
///
/// The step never overshoots the target. Collision resolution is delegated to
/// [`resolve_move`].
pub fn approach(
    body: &mut Rect,
    target: Vec2,
    speed: f32,
    dt: f32,
    obstacles: &[Obstacle],
) -> Approach {
    let offset = target - body.center();
    let distance = offset.length();
    if !distance.is_finite() || distance <= f32::EPSILON {
        return Approach {
            displacement: Vec2::ZERO,
            heading: None,
            distance: if distance.is_finite() { distance } else { 0.0 },
        };
    }

    let travel = (speed * dt).max(0.0).min(distance);
    let direction = offset / distance;
    let displacement = resolve_move(body, direction * travel, obstacles);

    Approach {
        displacement,
        heading: Some(direction.y.atan2(direction.x)),
        distance,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Axis {
    Horizontal,
    Vertical,
}

fn advance_axis(body: &mut Rect, axis: Axis, amount: f32, obstacles: &[Obstacle]) {
    if amount == 0.0 {
        return;
    }

    match nearest_face(body, axis, amount, obstacles) {
        Some(wall) => snap_flush(body, axis, amount, &wall),
        None => match axis {
            Axis::Horizontal => body.x += amount,
            Axis::Vertical => body.y += amount,
        },
    }

    // Each pass only pulls the body back toward where it came from, so the
    // loop settles within one pass per obstacle.
    for _ in 0..=obstacles.len() {
        let mut snapped = false;
        for obstacle in obstacles.iter().filter(|obstacle| obstacle.blocks()) {
            if !rects_overlap(body, &obstacle.rect) {
                continue;
            }
            snap_flush(body, axis, amount, &obstacle.rect);
            snapped = true;
        }
        if !snapped {
            break;
        }
    }
}

/// Blocking obstacle whose face `body` would reach first when moving `amount`
/// along `axis`, if that face lies within the move.
fn nearest_face(body: &Rect, axis: Axis, amount: f32, obstacles: &[Obstacle]) -> Option<Rect> {
    let mut nearest: Option<(f32, Rect)> = None;
    for obstacle in obstacles.iter().filter(|obstacle| obstacle.blocks()) {
        let wall = &obstacle.rect;
        if !wall.is_solid() {
            continue;
        }
        let (across, gap) = match (axis, amount > 0.0) {
            (Axis::Horizontal, true) => (spans_y(body, wall), wall.x - body.right()),
            (Axis::Horizontal, false) => (spans_y(body, wall), body.x - wall.right()),
            (Axis::Vertical, true) => (spans_x(body, wall), wall.y - body.bottom()),
            (Axis::Vertical, false) => (spans_x(body, wall), body.y - wall.bottom()),
        };
        if !across || gap < 0.0 || gap >= amount.abs() {
            continue;
        }
        if nearest.map_or(true, |(best, _)| gap < best) {
            nearest = Some((gap, *wall));
        }
    }
    nearest.map(|(_, wall)| wall)
}

fn spans_y(body: &Rect, wall: &Rect) -> bool {
    wall.y < body.bottom() && wall.bottom() > body.y
}

fn spans_x(body: &Rect, wall: &Rect) -> bool {
    wall.x < body.right() && wall.right() > body.x
}

fn snap_flush(body: &mut Rect, axis: Axis, amount: f32, wall: &Rect) {
    match (axis, amount > 0.0) {
        (Axis::Horizontal, true) => body.x = wall.x - body.w,
        (Axis::Horizontal, false) => body.x = wall.right(),
        (Axis::Vertical, true) => body.y = wall.y - body.h,
        (Axis::Vertical, false) => body.y = wall.bottom(),
    }
}
