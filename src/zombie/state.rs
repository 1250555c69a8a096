//! Behavioral states and the transition table
//!
//! Evaluation is a pure function of a snapshot of the agent's senses and
//! timers. Sensing signals dominate timers.
//!
//! | From        | Condition                                 | To          |
//! |-------------|-------------------------------------------|-------------|
//! | Idle        | target acquired                           | Chase       |
//! | Idle        | time in state > rolled idle duration      | Wander      |
//! | Wander      | target acquired                           | Chase       |
//! | Wander      | sound memory non-empty                    | Investigate |
//! | Chase       | time since seen > give-up time            | Wander      |
//! | Chase       | no target and time since seen > grace     | Investigate |
//! | Chase       | target within attack range                | Attack      |
//! | Attack      | no target or beyond 1.5 x attack range    | Chase       |
//! | Investigate | target acquired                           | Chase       |
//! | Investigate | destination reached or timer expired      | Wander      |
//! | Patrol      | target acquired                           | Chase       |
//! | Patrol      | patrol point reached                      | new point   |

use serde::{Deserialize, Serialize};
use std::fmt;

/// Attack is held until the target moves beyond this multiple of range
pub const ATTACK_EXIT_FACTOR: f32 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ZombieState {
    #[default]
    Idle,
    Wander,
    Patrol,
    Chase,
    Attack,
    Investigate,
    /// Terminal
    Dead,
}

impl ZombieState {
    pub fn is_engaged(self) -> bool {
        matches!(self, ZombieState::Chase | ZombieState::Attack)
    }

    /// States in which smell may seed an investigation
    pub fn is_passive(self) -> bool {
        matches!(self, ZombieState::Idle | ZombieState::Wander)
    }

    pub fn name(self) -> &'static str {
        match self {
            ZombieState::Idle => "Idle",
            ZombieState::Wander => "Wander",
            ZombieState::Patrol => "Patrol",
            ZombieState::Chase => "Chase",
            ZombieState::Attack => "Attack",
            ZombieState::Investigate => "Investigate",
            ZombieState::Dead => "Dead",
        }
    }
}

impl fmt::Display for ZombieState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Everything the transition table looks at
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionInputs {
    /// A valid target handle is held
    pub has_target: bool,
    /// Distance to the held target, if any
    pub target_distance: Option<f32>,
    pub time_since_seen: f32,
    pub time_in_state: f32,
    /// Idle duration rolled on entering Idle
    pub idle_duration: f32,
    /// Unexpired heard sounds remain in memory
    pub has_sound_memory: bool,
    pub reached_destination: bool,
    pub investigate_timer: f32,
    pub attack_range: f32,
    pub give_up_time: f32,
    pub lost_target_grace: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Stay,
    Enter(ZombieState),
    /// Stay in Patrol with a freshly rolled point
    NextPatrolPoint,
}

pub fn evaluate(state: ZombieState, inputs: &TransitionInputs) -> Transition {
    use ZombieState::*;

    let in_range = |factor: f32| {
        inputs
            .target_distance
            .map(|d| inputs.has_target && d <= inputs.attack_range * factor)
            .unwrap_or(false)
    };

    match state {
        Idle => {
            if inputs.has_target {
                Transition::Enter(Chase)
            } else if inputs.time_in_state > inputs.idle_duration {
                Transition::Enter(Wander)
            } else {
                Transition::Stay
            }
        }
        Wander => {
            if inputs.has_target {
                Transition::Enter(Chase)
            } else if inputs.has_sound_memory {
                Transition::Enter(Investigate)
            } else {
                Transition::Stay
            }
        }
        Chase => {
            if inputs.time_since_seen > inputs.give_up_time {
                Transition::Enter(Wander)
            } else if !inputs.has_target && inputs.time_since_seen > inputs.lost_target_grace {
                Transition::Enter(Investigate)
            } else if in_range(1.0) {
                Transition::Enter(Attack)
            } else {
                Transition::Stay
            }
        }
        Attack => {
            if in_range(ATTACK_EXIT_FACTOR) {
                Transition::Stay
            } else {
                Transition::Enter(Chase)
            }
        }
        Investigate => {
            if inputs.has_target {
                Transition::Enter(Chase)
            } else if inputs.reached_destination || inputs.investigate_timer <= 0.0 {
                Transition::Enter(Wander)
            } else {
                Transition::Stay
            }
        }
        Patrol => {
            if inputs.has_target {
                Transition::Enter(Chase)
            } else if inputs.reached_destination {
                Transition::NextPatrolPoint
            } else {
                Transition::Stay
            }
        }
        Dead => Transition::Stay,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs() -> TransitionInputs {
        TransitionInputs {
            has_target: false,
            target_distance: None,
            time_since_seen: 0.0,
            time_in_state: 0.0,
            idle_duration: 3.0,
            has_sound_memory: false,
            reached_destination: false,
            investigate_timer: 5.0,
            attack_range: 1.5,
            give_up_time: 10.0,
            lost_target_grace: 2.0,
        }
    }

    #[test]
    fn test_idle_sensing_beats_timer() {
        let i = TransitionInputs { has_target: true, time_in_state: 9.0, ..inputs() };
        assert_eq!(evaluate(ZombieState::Idle, &i), Transition::Enter(ZombieState::Chase));

        let i = TransitionInputs { time_in_state: 3.5, ..inputs() };
        assert_eq!(evaluate(ZombieState::Idle, &i), Transition::Enter(ZombieState::Wander));
        assert_eq!(evaluate(ZombieState::Idle, &inputs()), Transition::Stay);
    }

    #[test]
    fn test_chase_give_up_precedes_investigate() {
        let i = TransitionInputs { time_since_seen: 10.5, ..inputs() };
        assert_eq!(evaluate(ZombieState::Chase, &i), Transition::Enter(ZombieState::Wander));

        let i = TransitionInputs { time_since_seen: 2.5, ..inputs() };
        assert_eq!(evaluate(ZombieState::Chase, &i), Transition::Enter(ZombieState::Investigate));

        // Lost target within the grace period keeps chasing the last position
        let i = TransitionInputs { time_since_seen: 1.0, ..inputs() };
        assert_eq!(evaluate(ZombieState::Chase, &i), Transition::Stay);
    }

    #[test]
    fn test_attack_requires_target() {
        let i = TransitionInputs { target_distance: Some(1.0), ..inputs() };
        assert_eq!(evaluate(ZombieState::Chase, &i), Transition::Stay);

        let i = TransitionInputs { has_target: true, target_distance: Some(1.0), ..inputs() };
        assert_eq!(evaluate(ZombieState::Chase, &i), Transition::Enter(ZombieState::Attack));
    }

    #[test]
    fn test_attack_hysteresis() {
        let held = TransitionInputs { has_target: true, target_distance: Some(2.0), ..inputs() };
        assert_eq!(evaluate(ZombieState::Attack, &held), Transition::Stay);

        let far = TransitionInputs { has_target: true, target_distance: Some(2.3), ..inputs() };
        assert_eq!(evaluate(ZombieState::Attack, &far), Transition::Enter(ZombieState::Chase));

        assert_eq!(evaluate(ZombieState::Attack, &inputs()), Transition::Enter(ZombieState::Chase));
    }

    #[test]
    fn test_investigate_and_patrol() {
        let timed_out = TransitionInputs { investigate_timer: 0.0, ..inputs() };
        assert_eq!(evaluate(ZombieState::Investigate, &timed_out), Transition::Enter(ZombieState::Wander));

        let arrived = TransitionInputs { reached_destination: true, ..inputs() };
        assert_eq!(evaluate(ZombieState::Patrol, &arrived), Transition::NextPatrolPoint);

        let spotted = TransitionInputs { has_target: true, reached_destination: true, ..inputs() };
        assert_eq!(evaluate(ZombieState::Patrol, &spotted), Transition::Enter(ZombieState::Chase));
    }

    #[test]
    fn test_wander_hears_sound() {
        let i = TransitionInputs { has_sound_memory: true, ..inputs() };
        assert_eq!(evaluate(ZombieState::Wander, &i), Transition::Enter(ZombieState::Investigate));
    }

    #[test]
    fn test_dead_is_terminal() {
        let i = TransitionInputs { has_target: true, target_distance: Some(0.5), ..inputs() };
        assert_eq!(evaluate(ZombieState::Dead, &i), Transition::Stay);
    }
}
