//! Runs a policy over adaptive agents and keeps their episodes

use ahash::AHashMap;

use crate::core::config::DecisionConfig;
use crate::decision::action::{HeuristicPolicy, Policy};
use crate::decision::context::{DecisionContext, EnvironmentInfo, TargetInfo};
use crate::decision::episode::{Episode, StepObservation, StepResult};
use crate::decision::observation::Observation;
use crate::profiler::BehaviorProfiler;
use crate::spatial::SpatialQuery;
use crate::zombie::{AgentId, ZombieAgent};

pub struct AdaptiveLayer {
    policy: Box<dyn Policy>,
    episodes: AHashMap<AgentId, Episode>,
}

impl AdaptiveLayer {
    pub fn new(policy: Box<dyn Policy>) -> Self {
        Self {
            policy,
            episodes: AHashMap::new(),
        }
    }

    pub fn heuristic(seed: u64) -> Self {
        Self::new(Box::new(HeuristicPolicy::new(seed)))
    }

    pub fn policy_name(&self) -> &str {
        self.policy.name()
    }

    pub fn episode(&self, id: AgentId) -> Option<&Episode> {
        self.episodes.get(&id)
    }

    pub fn episode_mut(&mut self, id: AgentId) -> Option<&mut Episode> {
        self.episodes.get_mut(&id)
    }

    pub fn forget(&mut self, id: AgentId) {
        self.episodes.remove(&id);
    }

    pub fn episode_count(&self) -> usize {
        self.episodes.len()
    }

    /// Observe, decide and push the action into the agent.
    /// Returns whether the attack intent succeeded.
    #[allow(clippy::too_many_arguments)]
    pub fn decide(
        &mut self,
        agent: &mut ZombieAgent,
        world: &dyn SpatialQuery,
        profiler: Option<&BehaviorProfiler>,
        target: Option<TargetInfo>,
        environment: Option<EnvironmentInfo>,
        config: &DecisionConfig,
        dt: f32,
    ) -> bool {
        let episode = self
            .episodes
            .entry(agent.id)
            .or_insert_with(|| Episode::new(agent, profiler, config, target.map(|t| t.position)));
        episode.advance_time(dt);
        let profile = *episode.profile();

        let (action, distance) = {
            let ctx = DecisionContext {
                world,
                agent: &*agent,
                config,
                profile: &profile,
                target,
                environment,
            };
            let observation = Observation::build(&ctx);
            (self.policy.decide(&observation, &ctx), ctx.target_distance())
        };
        episode.apply_action(&action, agent, distance, config)
    }

    /// Score the step an agent just took
    pub fn score(&mut self, agent: &ZombieAgent, step: &StepObservation, config: &DecisionConfig) -> Option<StepResult> {
        self.episodes.get_mut(&agent.id).map(|e| e.score_step(agent, step, config))
    }
}

impl std::fmt::Debug for AdaptiveLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdaptiveLayer")
            .field("policy", &self.policy.name())
            .field("episodes", &self.episodes.len())
            .finish()
    }
}
