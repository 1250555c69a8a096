//! Adaptive decision layer
//!
//! Observations flow out of the agent and profiler, actions and rewards flow
//! back. No component reaches into another's state directly.

pub mod action;
pub mod context;
pub mod episode;
pub mod layer;
pub mod observation;
pub mod reward;

pub use action::{ActionBias, AgentAction, HeuristicPolicy, Policy};
pub use context::{DecisionContext, EnvironmentInfo, ProfileSignals, TargetInfo};
pub use episode::{Episode, EpisodeEnd, EpisodeStats, StepObservation, StepResult};
pub use layer::AdaptiveLayer;
pub use observation::Observation;
pub use reward::{shape_reward, RewardBreakdown, RewardInputs};
