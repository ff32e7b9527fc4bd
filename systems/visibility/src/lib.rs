#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Geometry and visibility kernel used by guard perception.
//!
//! Everything in this crate is a pure function over [`Rect`] values and
//! points. Segment tests are exact parametric clipping rather than sampling,
//! so a guard never sees through the corner of a wall regardless of frame
//! rate or distance.

use std::f32::consts::{PI, TAU};

use shadow_signal_core::{finite_or, Obstacle, Rect, Vec2};

/// Numeric tolerances applied by line-of-sight queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LosTuning {
    /// Tolerance used for parallel-segment and interval checks.
    pub epsilon: f32,
    /// Amount each obstacle is shrunk on every side before testing.
    ///
    /// A small inset lets sight lines graze wall faces without being blocked.
    pub edge_inset: f32,
}

impl LosTuning {
    /// Creates tuning values, replacing invalid inputs with the defaults.
    #[must_use]
    pub fn new(epsilon: f32, edge_inset: f32) -> Self {
        let defaults = Self::default();
        let epsilon = finite_or(epsilon, defaults.epsilon).abs();
        let edge_inset = finite_or(edge_inset, defaults.edge_inset).max(0.0);
        Self {
            epsilon,
            edge_inset,
        }
    }
}

impl Default for LosTuning {
    fn default() -> Self {
        Self {
            epsilon: 1e-6,
            edge_inset: 0.1,
        }
    }
}

/// Reports whether two rectangles overlap.
///
/// Edges that merely touch do not overlap, and inert rectangles never overlap
/// anything.
#[must_use]
pub fn rects_overlap(a: &Rect, b: &Rect) -> bool {
    a.is_solid()
        && b.is_solid()
        && a.x < b.right()
        && a.right() > b.x
        && a.y < b.bottom()
        && a.bottom() > b.y
}

/// Reports whether `point` lies strictly inside `rect`.
#[must_use]
pub fn rect_contains_point(rect: &Rect, point: Vec2) -> bool {
    rect.is_solid()
        && point.x > rect.x
        && point.x < rect.right()
        && point.y > rect.y
        && point.y < rect.bottom()
}

/// Normalises an angle in radians into `(-π, π]`.
///
/// Non-finite input maps to zero.
#[must_use]
pub fn normalize_angle(angle: f32) -> f32 {
    let mut wrapped = finite_or(angle, 0.0) % TAU;
    if wrapped <= -PI {
        wrapped += TAU;
    } else if wrapped > PI {
        wrapped -= TAU;
    }
    wrapped
}

/// Heading from `from` toward `to` in radians.
#[must_use]
pub fn heading(from: Vec2, to: Vec2) -> f32 {
    let delta = to - from;
    delta.y.atan2(delta.x)
}

/// Reports whether the segment `p0 → p1` intersects `rect` shrunk by `edge_inset`.
///
/// The shrunk rectangle must keep a positive area, otherwise nothing
/// intersects it. A segment with an endpoint strictly inside the shrunk
/// rectangle always intersects. Otherwise the segment is clipped against the
/// four half-planes of the rectangle (Liang–Barsky) and intersects when the
/// surviving parameter interval is non-empty within `epsilon`.
#[must_use]
pub fn segment_intersects_rect(
    p0: Vec2,
    p1: Vec2,
    rect: &Rect,
    edge_inset: f32,
    epsilon: f32,
) -> bool {
    if !(p0.is_finite() && p1.is_finite() && rect.is_solid()) {
        return false;
    }

    let shrunk = rect.inset(edge_inset);
    let (min_x, min_y) = (shrunk.x, shrunk.y);
    let (max_x, max_y) = (shrunk.right(), shrunk.bottom());
    if max_x <= min_x || max_y <= min_y {
        return false;
    }

    let strictly_inside =
        |point: Vec2| point.x > min_x && point.x < max_x && point.y > min_y && point.y < max_y;
    if strictly_inside(p0) || strictly_inside(p1) {
        return true;
    }

    let dx = p1.x - p0.x;
    let dy = p1.y - p0.y;
    let mut window = ClipWindow::new(epsilon);

    window.clip(-dx, p0.x - min_x)
        && window.clip(dx, max_x - p0.x)
        && window.clip(-dy, p0.y - min_y)
        && window.clip(dy, max_y - p0.y)
        && window.t1 >= window.t0 - epsilon
}

/// Parametric interval `[t0, t1]` surviving the half-planes clipped so far.
struct ClipWindow {
    t0: f32,
    t1: f32,
    epsilon: f32,
}

impl ClipWindow {
    const fn new(epsilon: f32) -> Self {
        Self {
            t0: 0.0,
            t1: 1.0,
            epsilon,
        }
    }

    /// Clips against `p * t <= q`; returns false once the interval is empty.
    fn clip(&mut self, p: f32, q: f32) -> bool {
        if p.abs() <= self.epsilon {
            return q >= -self.epsilon;
        }

        let t = q / p;
        if p < 0.0 {
            if t > self.t1 {
                return false;
            }
            self.t0 = self.t0.max(t);
        } else {
            if t < self.t0 {
                return false;
            }
            self.t1 = self.t1.min(t);
        }
        true
    }
}

/// Reports whether nothing blocking lies on the segment `from → to`.
///
/// Open doors and inert obstacles are ignored.
#[must_use]
pub fn has_line_of_sight(from: Vec2, to: Vec2, obstacles: &[Obstacle], tuning: &LosTuning) -> bool {
    !obstacles
        .iter()
        .filter(|obstacle| obstacle.blocks())
        .any(|obstacle| {
            segment_intersects_rect(from, to, &obstacle.rect, tuning.edge_inset, tuning.epsilon)
        })
}

/// Cone a guard sees through.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisionCone {
    /// Eye position, the centre of the guard body.
    pub origin: Vec2,
    /// Facing angle in radians.
    pub facing: f32,
    /// Maximum sighting distance.
    pub range: f32,
    /// Full angular width of the cone in radians.
    pub field_of_view: f32,
}

/// Outcome of a single vision check.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct VisionReport {
    /// The target lies within the vision range.
    pub in_range: bool,
    /// The target lies within half the field of view of the facing.
    pub in_fov: bool,
    /// The segment to the target is unobstructed. Only evaluated when the
    /// target is both in range and in the cone.
    pub has_line_of_sight: bool,
    /// The target is seen: in range, in the cone, and unobstructed.
    pub sees: bool,
}

/// Evaluates whether `cone` sees `target`.
///
/// A hidden target produces an all-false report.
#[must_use]
pub fn assess_vision(
    cone: &VisionCone,
    target: Vec2,
    target_hidden: bool,
    obstacles: &[Obstacle],
    tuning: &LosTuning,
) -> VisionReport {
    if target_hidden || !(cone.origin.is_finite() && target.is_finite()) {
        return VisionReport::default();
    }

    let in_range = cone.origin.distance(target) <= cone.range;
    let offset = normalize_angle(heading(cone.origin, target) - cone.facing);
    let in_fov = offset.abs() <= cone.field_of_view * 0.5;
    let has_line_of_sight =
        in_range && in_fov && has_line_of_sight(cone.origin, target, obstacles, tuning);

    VisionReport {
        in_range,
        in_fov,
        has_line_of_sight,
        sees: in_range && in_fov && has_line_of_sight,
    }
}
