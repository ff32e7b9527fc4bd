#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Guard perception and tactical state machine.
//!
//! Each [`Guard`] looks for the player through the visibility kernel,
//! integrates a detection scalar over time, listens to the noise bus, and
//! moves itself through the collision resolver. Behaviour is an explicit
//! [`GuardState`](shadow_signal_core::GuardState) driven by the pure
//! [`next_state`] function; where the guard walks in each state is decided
//! separately by [`movement_goal`] once the state is known.

mod goal;
mod guard;
mod search;
mod transition;
mod tuning;

pub use goal::{movement_goal, Bearings};
pub use guard::{Guard, GuardReport, TickContext};
pub use search::{build_search_plan, SearchPlan};
pub use transition::{next_state, state_speed, Perception};
pub use tuning::{GuardTuning, MAX_SWEEP_COUNT};
