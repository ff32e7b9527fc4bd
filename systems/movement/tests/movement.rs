use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use shadow_signal_core::{DoorState, Obstacle, ObstacleId, Rect, Vec2};
use shadow_signal_system_movement::{resolve_move, MAX_SUB_STEP};
use shadow_signal_system_visibility::rects_overlap;

fn wall(id: u32, x: f32, y: f32, w: f32, h: f32) -> Obstacle {
    Obstacle::wall(ObstacleId::new(id), Rect::new(x, y, w, h))
}

#[test]
fn head_on_move_stops_flush_against_wall() {
    let obstacles = [wall(0, 50.0, 0.0, 10.0, 100.0)];
    let mut body = Rect::new(0.0, 40.0, 20.0, 20.0);

    let moved = resolve_move(&mut body, Vec2::new(100.0, 0.0), &obstacles);

    assert_eq!(body.x, 30.0);
    assert_eq!(body.y, 40.0);
    assert_eq!(moved, Vec2::new(30.0, 0.0));
}

#[test]
fn leftward_move_stops_on_the_far_edge() {
    let obstacles = [wall(0, 50.0, 0.0, 10.0, 100.0)];
    let mut body = Rect::new(100.0, 40.0, 20.0, 20.0);

    let _ = resolve_move(&mut body, Vec2::new(-100.0, 0.0), &obstacles);

    assert_eq!(body.x, 60.0);
}

#[test]
fn diagonal_move_slides_along_wall() {
    let obstacles = [wall(0, 50.0, 0.0, 10.0, 200.0)];
    let mut body = Rect::new(20.0, 40.0, 20.0, 20.0);

    let moved = resolve_move(&mut body, Vec2::new(40.0, 40.0), &obstacles);

    assert_eq!(body.x, 30.0);
    assert!((body.y - 80.0).abs() < 1e-4);
    assert!((moved.y - 40.0).abs() < 1e-4);
}

#[test]
fn open_door_lets_bodies_through() {
    let door = Rect::new(50.0, 0.0, 10.0, 100.0);
    let open = [Obstacle::door(ObstacleId::new(0), door, DoorState::Open)];
    let locked = [Obstacle::door(ObstacleId::new(0), door, DoorState::Locked)];

    let mut through = Rect::new(0.0, 40.0, 20.0, 20.0);
    let _ = resolve_move(&mut through, Vec2::new(100.0, 0.0), &open);
    assert!((through.x - 100.0).abs() < 1e-4);

    let mut blocked = Rect::new(0.0, 40.0, 20.0, 20.0);
    let _ = resolve_move(&mut blocked, Vec2::new(100.0, 0.0), &locked);
    assert_eq!(blocked.x, 30.0);
}

#[test]
fn long_moves_do_not_tunnel_through_thin_walls() {
    let obstacles = [wall(0, 60.0, 0.0, 1.0, 100.0)];
    let mut body = Rect::new(0.0, 40.0, 10.0, 10.0);

    let _ = resolve_move(&mut body, Vec2::new(500.0, 0.0), &obstacles);

    assert_eq!(body.x, 50.0);
}

#[test]
fn corner_pocket_holds_both_axes() {
    let obstacles = [
        wall(0, 100.0, 0.0, 10.0, 200.0),
        wall(1, 0.0, 100.0, 200.0, 10.0),
    ];
    let mut body = Rect::new(60.0, 60.0, 20.0, 20.0);

    let _ = resolve_move(&mut body, Vec2::new(50.0, 50.0), &obstacles);

    assert_eq!(body.x, 80.0);
    assert_eq!(body.y, 80.0);
}

#[test]
fn random_moves_never_end_inside_obstacles() {
    let mut rng = ChaCha8Rng::seed_from_u64(0xb0d1_e5);

    for layout in 0..40 {
        let obstacles: Vec<Obstacle> = (0..8)
            .map(|index| {
                wall(
                    index,
                    rng.gen_range(0..400) as f32,
                    rng.gen_range(0..400) as f32,
                    rng.gen_range(4..80) as f32,
                    rng.gen_range(4..80) as f32,
                )
            })
            .collect();

        let size = rng.gen_range(8..30) as f32;
        let Some(mut body) = (0..64)
            .map(|_| {
                Rect::new(
                    rng.gen_range(0..400) as f32,
                    rng.gen_range(0..400) as f32,
                    size,
                    size,
                )
            })
            .find(|candidate| {
                obstacles
                    .iter()
                    .all(|obstacle| !rects_overlap(candidate, &obstacle.rect))
            })
        else {
            continue;
        };

        for step in 0..200 {
            let delta = Vec2::new(rng.gen_range(-40.0..40.0), rng.gen_range(-40.0..40.0));
            let before = body;
            let moved = resolve_move(&mut body, delta, &obstacles);

            for obstacle in &obstacles {
                assert!(
                    !rects_overlap(&body, &obstacle.rect),
                    "layout {layout} step {step}: {before:?} + {delta:?} ended in {:?}",
                    obstacle.rect
                );
            }
            assert!(moved.x.abs() <= delta.x.abs() + MAX_SUB_STEP);
            assert!(moved.y.abs() <= delta.y.abs() + MAX_SUB_STEP);
        }
    }
}
