//! Per-agent episode bookkeeping for the adaptive layer

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::{DecisionConfig, ZombieConfig};
use crate::core::types::Vec2;
use crate::decision::action::{ActionBias, AgentAction};
use crate::decision::context::ProfileSignals;
use crate::decision::reward::{shape_reward, RewardBreakdown, RewardInputs};
use crate::profiler::BehaviorProfiler;
use crate::zombie::movement::random_in_disc;
use crate::zombie::ZombieAgent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EpisodeEnd {
    Died,
    BudgetExhausted,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EpisodeStats {
    pub steps: u32,
    pub cumulative_reward: f32,
    pub time_alive: f32,
    pub damage_dealt: f32,
    pub damage_taken: f32,
    pub attack_attempts: u32,
    pub attack_successes: u32,
}

impl EpisodeStats {
    /// Successes over attempts; 0 before any attempt
    pub fn success_rate(&self) -> f32 {
        if self.attack_attempts == 0 {
            0.0
        } else {
            self.attack_successes as f32 / self.attack_attempts as f32
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepResult {
    pub reward: RewardBreakdown,
    pub end: Option<EpisodeEnd>,
}

/// Inputs for scoring one step, gathered after the agent has acted
#[derive(Debug, Clone, Copy)]
pub struct StepObservation {
    pub target_distance: Option<f32>,
    pub is_daytime: Option<bool>,
    pub attack_success: bool,
}

#[derive(Debug, Clone)]
pub struct Episode {
    stats: EpisodeStats,
    profile: ProfileSignals,
    bias: ActionBias,
    spawn_anchor: Vec2,
    previous_health: f32,
    previous_distance: Option<f32>,
    /// Agent's lifetime damage counter at the previous step
    previous_damage_dealt: f32,
    terminated: bool,
    completed: u32,
    last_reward: RewardBreakdown,
}

impl Episode {
    pub fn new(
        agent: &ZombieAgent,
        profiler: Option<&BehaviorProfiler>,
        config: &DecisionConfig,
        target_position: Option<Vec2>,
    ) -> Self {
        let profile = ProfileSignals::read(profiler);
        let mut episode = Self {
            stats: EpisodeStats::default(),
            profile,
            bias: ActionBias::from_profile(&profile, config),
            spawn_anchor: agent.spawn_position(),
            previous_health: agent.health(),
            previous_distance: None,
            previous_damage_dealt: agent.damage_dealt(),
            terminated: false,
            completed: 0,
            last_reward: RewardBreakdown::default(),
        };
        episode.begin(agent, profiler, config, target_position);
        episode
    }

    /// Start a fresh episode from the agent's current state
    fn begin(
        &mut self,
        agent: &ZombieAgent,
        profiler: Option<&BehaviorProfiler>,
        config: &DecisionConfig,
        target_position: Option<Vec2>,
    ) {
        self.profile = ProfileSignals::read(profiler);
        self.bias = ActionBias::from_profile(&self.profile, config);
        self.stats = EpisodeStats::default();
        self.previous_health = agent.health();
        self.previous_damage_dealt = agent.damage_dealt();
        self.previous_distance = target_position.map(|p| p.distance(agent.position));
        self.terminated = false;
        self.last_reward = RewardBreakdown::default();
    }

    pub fn stats(&self) -> &EpisodeStats {
        &self.stats
    }

    pub fn profile(&self) -> &ProfileSignals {
        &self.profile
    }

    pub fn bias(&self) -> ActionBias {
        self.bias
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    pub fn completed_episodes(&self) -> u32 {
        self.completed
    }

    pub fn last_reward(&self) -> &RewardBreakdown {
        &self.last_reward
    }

    pub fn spawn_anchor(&self) -> Vec2 {
        self.spawn_anchor
    }

    pub fn advance_time(&mut self, dt: f32) {
        if !self.terminated {
            self.stats.time_alive += dt;
        }
    }

    /// Push an action into the agent. Returns whether the attack intent
    /// was a success (target within exact attack range).
    pub fn apply_action(
        &mut self,
        action: &AgentAction,
        agent: &mut ZombieAgent,
        target_distance: Option<f32>,
        config: &DecisionConfig,
    ) -> bool {
        if self.terminated || agent.is_dead() {
            agent.set_steering_override(None);
            return false;
        }
        agent.set_speed_bias(self.bias.speed_multiplier);
        agent.set_steering_override(Some(action.movement));
        if action.turn_rate != 0.0 {
            let turned = Vec2::from_angle(action.turn_rate).rotate(agent.facing());
            agent.set_facing(turned);
        }

        if !action.attack {
            return false;
        }
        let Some(distance) = target_distance else {
            return false;
        };
        let range = agent.stats.attack_range;
        if distance > range * config.attack_intent_range_factor {
            return false;
        }
        self.stats.attack_attempts += 1;
        if distance <= range {
            self.stats.attack_successes += 1;
            true
        } else {
            false
        }
    }

    /// Score the step that just ran and detect the episode's end
    pub fn score_step(&mut self, agent: &ZombieAgent, step: &StepObservation, config: &DecisionConfig) -> StepResult {
        if self.terminated {
            return StepResult {
                reward: RewardBreakdown::default(),
                end: None,
            };
        }
        self.stats.steps += 1;

        let health_lost = (self.previous_health - agent.health()).max(0.0);
        self.stats.damage_taken += health_lost;
        self.previous_health = agent.health();

        let dealt = (agent.damage_dealt() - self.previous_damage_dealt).max(0.0);
        self.stats.damage_dealt += dealt;
        self.previous_damage_dealt = agent.damage_dealt();

        let died = agent.is_dead();
        let budget_exhausted = !died && self.stats.steps >= config.max_steps;

        let inputs = RewardInputs {
            previous_distance: self.previous_distance,
            current_distance: step.target_distance,
            health_lost,
            max_health: agent.stats.max_health,
            damage_dealt: dealt,
            attack_success: step.attack_success,
            speed: agent.velocity.length(),
            move_speed: agent.stats.move_speed,
            is_daytime: step.is_daytime,
            state: agent.state(),
            died,
            budget_exhausted,
            time_alive: self.stats.time_alive,
            max_steps: config.max_steps,
        };
        let reward = shape_reward(&inputs, &self.profile, &config.rewards);
        self.stats.cumulative_reward += reward.total();
        self.previous_distance = step.target_distance;
        self.last_reward = reward;

        let end = if died {
            Some(EpisodeEnd::Died)
        } else if budget_exhausted {
            Some(EpisodeEnd::BudgetExhausted)
        } else {
            None
        };
        if let Some(end) = end {
            self.terminated = true;
            tracing::info!(
                "Zombie {} episode ended ({:?}): {} steps, reward {:.3}, success rate {:.2}",
                agent.id,
                end,
                self.stats.steps,
                self.stats.cumulative_reward,
                self.stats.success_rate()
            );
        }
        StepResult { reward, end }
    }

    /// Revive the agent near its spawn anchor and start a new episode
    pub fn reset<R: Rng + ?Sized>(
        &mut self,
        agent: &mut ZombieAgent,
        profiler: Option<&BehaviorProfiler>,
        config: &DecisionConfig,
        zombie: &ZombieConfig,
        target_position: Option<Vec2>,
        rng: &mut R,
    ) {
        let position = random_in_disc(rng, self.spawn_anchor, config.respawn_offset);
        agent.revive(position, zombie, rng);
        agent.set_steering_override(None);
        self.completed += 1;
        self.begin(agent, profiler, config, target_position);
        tracing::debug!("Zombie {} episode {} begins", agent.id, self.completed + 1);
    }
}
