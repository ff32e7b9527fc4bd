use shadow_signal_core::GuardState;

/// Everything the transition function needs to know about the current tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Perception {
    /// The player is hidden from sight.
    pub player_hidden: bool,
    /// The guard sees the player this tick.
    pub sees_player: bool,
    /// Detection after this tick's integration.
    pub detection: f32,
    /// A chasing guard has gone without a sighting for longer than its chase memory.
    pub contact_lost: bool,
    /// The guard knows where it last saw the player.
    pub has_last_seen: bool,
    /// The guard heard a noise it has not reacted to before.
    pub heard_noise: bool,
    /// The current investigation has finished looking around.
    pub investigation_finished: bool,
    /// Every point of the current search plan has been visited.
    pub search_exhausted: bool,
    /// The guard reached the point it was returning to.
    pub arrived: bool,
}

/// Decides the next behaviour state.
///
/// Rules apply in order and the first match wins:
/// 1. A chase ends when the player hides or contact is lost, falling back to
///    [`GuardState::Search`] when a last-seen point exists.
/// 2. Full detection of a visible player starts a chase.
/// 3. A new noise starts an investigation.
/// 4. A partial sighting while patrolling or returning starts an investigation.
/// 5. Finished investigations and exhausted searches return to the route, and
///    arriving there resumes the patrol.
#[must_use]
pub fn next_state(current: GuardState, perception: &Perception) -> GuardState {
    if current == GuardState::Chase {
        if perception.player_hidden || perception.contact_lost {
            return if perception.has_last_seen {
                GuardState::Search
            } else {
                GuardState::Return
            };
        }
        return GuardState::Chase;
    }

    if perception.detection >= 1.0 && !perception.player_hidden {
        return GuardState::Chase;
    }

    if perception.heard_noise {
        return GuardState::Investigate;
    }

    let partial = perception.detection > 0.0 && perception.detection < 1.0;
    if perception.sees_player
        && partial
        && matches!(current, GuardState::Patrol | GuardState::Return)
    {
        return GuardState::Investigate;
    }

    match current {
        GuardState::Investigate if perception.investigation_finished => GuardState::Return,
        GuardState::Search if perception.search_exhausted => GuardState::Return,
        GuardState::Return if perception.arrived => GuardState::Patrol,
        other => other,
    }
}

/// Speed a guard moves at in `state`.
#[must_use]
pub fn state_speed(state: GuardState, tuning: &crate::GuardTuning) -> f32 {
    match state {
        GuardState::Patrol | GuardState::Investigate => tuning.patrol_speed,
        GuardState::Chase => tuning.chase_speed,
        GuardState::Search | GuardState::Return => tuning.return_speed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seen(detection: f32) -> Perception {
        Perception {
            sees_player: true,
            detection,
            has_last_seen: true,
            ..Perception::default()
        }
    }

    #[test]
    fn full_detection_starts_chase_from_any_calm_state() {
        for state in [
            GuardState::Patrol,
            GuardState::Investigate,
            GuardState::Search,
            GuardState::Return,
        ] {
            assert_eq!(next_state(state, &seen(1.0)), GuardState::Chase);
        }
    }

    #[test]
    fn hiding_ends_chase_even_with_full_detection() {
        let perception = Perception {
            player_hidden: true,
            detection: 1.0,
            has_last_seen: true,
            ..Perception::default()
        };
        assert_eq!(next_state(GuardState::Chase, &perception), GuardState::Search);
    }

    #[test]
    fn lost_chase_without_last_seen_returns() {
        let perception = Perception {
            contact_lost: true,
            ..Perception::default()
        };
        assert_eq!(next_state(GuardState::Chase, &perception), GuardState::Return);
    }

    #[test]
    fn chase_ignores_noise() {
        let perception = Perception {
            heard_noise: true,
            detection: 0.4,
            has_last_seen: true,
            ..Perception::default()
        };
        assert_eq!(next_state(GuardState::Chase, &perception), GuardState::Chase);
    }

    #[test]
    fn detection_outranks_noise() {
        let perception = Perception {
            heard_noise: true,
            ..seen(1.0)
        };
        assert_eq!(next_state(GuardState::Patrol, &perception), GuardState::Chase);
    }

    #[test]
    fn partial_sighting_only_diverts_patrol_and_return() {
        assert_eq!(
            next_state(GuardState::Patrol, &seen(0.3)),
            GuardState::Investigate
        );
        assert_eq!(
            next_state(GuardState::Return, &seen(0.3)),
            GuardState::Investigate
        );
        assert_eq!(next_state(GuardState::Search, &seen(0.3)), GuardState::Search);
    }

    #[test]
    fn completed_activities_walk_back_to_patrol() {
        let finished = Perception {
            investigation_finished: true,
            search_exhausted: true,
            arrived: true,
            ..Perception::default()
        };
        assert_eq!(
            next_state(GuardState::Investigate, &finished),
            GuardState::Return
        );
        assert_eq!(next_state(GuardState::Search, &finished), GuardState::Return);
        assert_eq!(next_state(GuardState::Return, &finished), GuardState::Patrol);
        assert_eq!(next_state(GuardState::Patrol, &finished), GuardState::Patrol);
    }
}
