use shadow_signal_core::{DoorState, Obstacle, ObstacleId, Rect, Vec2};
use shadow_signal_system_visibility::{
    assess_vision, has_line_of_sight, LosTuning, VisionCone, VisionReport,
};

fn standard_cone() -> VisionCone {
    VisionCone {
        origin: Vec2::ZERO,
        facing: 0.0,
        range: 320.0,
        field_of_view: 80f32.to_radians(),
    }
}

#[test]
fn clear_map_sees_player_ahead() {
    let report = assess_vision(
        &standard_cone(),
        Vec2::new(200.0, 0.0),
        false,
        &[],
        &LosTuning::default(),
    );

    assert_eq!(
        report,
        VisionReport {
            in_range: true,
            in_fov: true,
            has_line_of_sight: true,
            sees: true,
        }
    );
}

#[test]
fn wall_between_blocks_sight() {
    let wall = Obstacle::wall(ObstacleId::new(0), Rect::new(100.0, -50.0, 20.0, 100.0));
    let report = assess_vision(
        &standard_cone(),
        Vec2::new(200.0, 0.0),
        false,
        &[wall],
        &LosTuning::default(),
    );

    assert!(report.in_range);
    assert!(report.in_fov);
    assert!(!report.has_line_of_sight);
    assert!(!report.sees);
}

#[test]
fn open_door_does_not_block_sight() {
    let door = Obstacle::door(
        ObstacleId::new(3),
        Rect::new(100.0, -50.0, 20.0, 100.0),
        DoorState::Open,
    );
    assert!(has_line_of_sight(
        Vec2::ZERO,
        Vec2::new(200.0, 0.0),
        &[door],
        &LosTuning::default()
    ));

    let locked = Obstacle::door(
        ObstacleId::new(3),
        Rect::new(100.0, -50.0, 20.0, 100.0),
        DoorState::Locked,
    );
    assert!(!has_line_of_sight(
        Vec2::ZERO,
        Vec2::new(200.0, 0.0),
        &[locked],
        &LosTuning::default()
    ));
}

#[test]
fn target_beyond_range_is_not_seen() {
    let report = assess_vision(
        &standard_cone(),
        Vec2::new(321.0, 0.0),
        false,
        &[],
        &LosTuning::default(),
    );

    assert!(!report.in_range);
    assert!(report.in_fov);
    assert!(!report.sees);
}

#[test]
fn cone_edge_is_inclusive() {
    let mut cone = standard_cone();
    cone.facing = 0.1;
    let inside = Vec2::new(100.0, 100.0 * (0.1f32 + 0.69).tan());
    let outside = Vec2::new(100.0, 100.0 * (0.1f32 + 0.71).tan());

    let tuning = LosTuning::default();
    assert!(assess_vision(&cone, inside, false, &[], &tuning).in_fov);
    assert!(!assess_vision(&cone, outside, false, &[], &tuning).in_fov);
}

#[test]
fn facing_across_the_seam_still_sees() {
    let mut cone = standard_cone();
    cone.facing = std::f32::consts::PI - 0.05;
    let target = Vec2::new(-200.0, -20.0);

    let report = assess_vision(&cone, target, false, &[], &LosTuning::default());
    assert!(report.sees);
}
