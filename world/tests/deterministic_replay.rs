use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    time::Duration,
};

use shadow_signal_core::{Command, LevelLayout, Vec2};
use shadow_signal_world::{self as world, query, World};

#[test]
fn guard_replay_is_deterministic() {
    let script = sneak_sequence();
    let first = replay(script.clone());
    let second = replay(script);

    assert!(!first.events.is_empty());
    assert_eq!(first, second, "guard replay diverged");
    assert_eq!(first.fingerprint(), second.fingerprint());
}

fn replay(commands: Vec<Command>) -> ReplayOutcome {
    let mut world = World::new();
    let mut events = Vec::new();
    let mut poses = Vec::new();

    for command in commands {
        world::apply(&mut world, command, &mut events);
        for snapshot in query::guard_snapshots(&world) {
            poses.push([
                snapshot.position.x.to_bits(),
                snapshot.position.y.to_bits(),
                snapshot.facing.to_bits(),
                snapshot.detection.to_bits(),
            ]);
        }
    }

    ReplayOutcome {
        events: events.iter().map(|event| format!("{event:?}")).collect(),
        poses,
    }
}

fn sneak_sequence() -> Vec<Command> {
    let tick = Command::Tick {
        dt: Duration::from_millis(50),
    };
    let mut commands = vec![Command::LoadLevel {
        layout: LevelLayout::test_level(),
    }];
    for _ in 0..20 {
        commands.push(Command::MovePlayer {
            delta: Vec2::new(12.0, 6.0),
        });
        commands.push(tick.clone());
    }
    commands.push(Command::ThrowRock {
        target: Vec2::new(700.0, 300.0),
    });
    commands.extend(std::iter::repeat(tick.clone()).take(40));
    commands.push(Command::PlacePlayer {
        center: Vec2::new(245.0, 545.0),
    });
    commands.push(Command::SetPlayerHidden { hidden: true });
    commands.extend(std::iter::repeat(tick.clone()).take(40));
    commands.push(Command::SetPlayerHidden { hidden: false });
    commands.extend(std::iter::repeat(tick).take(40));
    commands
}

#[derive(Debug, PartialEq, Eq)]
struct ReplayOutcome {
    events: Vec<String>,
    poses: Vec<[u32; 4]>,
}

impl ReplayOutcome {
    fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.events.hash(&mut hasher);
        self.poses.hash(&mut hasher);
        hasher.finish()
    }
}
