//! Fixed-layout observation vector
//!
//! | Slots      | Section                                                      |
//! |------------|--------------------------------------------------------------|
//! | 0..7       | self: health, position, velocity, kind, speed                |
//! | 7..18      | target: direction, distance, position, health, speed, panic, |
//! |            | aiming, ranged flag, ammo fraction                           |
//! | 18..23     | environment: hour, day flag, day count, nearby agents,       |
//! |            | obstacle flag                                                |
//! | 23..31     | profile: melee flag, risk, day pref, stealth pref, health    |
//! |            | threshold, combat distance, success rate, aggression         |
//! | 31..       | rays: (normalized distance, hit category) per ray            |

use crate::core::types::{direction_from_degrees, Layer, LayerMask, Vec2};
use crate::decision::context::DecisionContext;
use crate::profiler::CombatStyle;

pub const SELF_SLOTS: usize = 7;
pub const TARGET_SLOTS: usize = 11;
pub const ENVIRONMENT_SLOTS: usize = 5;
pub const PROFILE_SLOTS: usize = 8;
pub const BASE_SLOTS: usize = SELF_SLOTS + TARGET_SLOTS + ENVIRONMENT_SLOTS + PROFILE_SLOTS;

pub const TARGET_OFFSET: usize = SELF_SLOTS;
pub const ENVIRONMENT_OFFSET: usize = TARGET_OFFSET + TARGET_SLOTS;
pub const PROFILE_OFFSET: usize = ENVIRONMENT_OFFSET + ENVIRONMENT_SLOTS;
pub const RAY_OFFSET: usize = BASE_SLOTS;

const POSITION_SCALE: f32 = 100.0;
const VELOCITY_SCALE: f32 = 10.0;
const SPEED_SCALE: f32 = 10.0;
const KIND_SCALE: f32 = 7.0;

pub const RAY_HIT_PLAYER: f32 = 1.0;
pub const RAY_HIT_OBSTACLE: f32 = 0.5;
pub const RAY_HIT_OTHER: f32 = 0.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    values: Vec<f32>,
}

impl Observation {
    pub fn size(ray_count: usize) -> usize {
        BASE_SLOTS + 2 * ray_count
    }

    pub fn build(ctx: &DecisionContext<'_>) -> Self {
        let size = Self::size(ctx.config.ray_count);
        let mut values = Vec::with_capacity(size);
        let agent = ctx.agent;

        // Self
        values.push(if agent.stats.max_health > 0.0 { agent.health() / agent.stats.max_health } else { 0.0 });
        values.push(agent.position.x / POSITION_SCALE);
        values.push(agent.position.y / POSITION_SCALE);
        values.push(agent.velocity.x / VELOCITY_SCALE);
        values.push(agent.velocity.y / VELOCITY_SCALE);
        values.push(agent.kind.ordinal() as f32 / KIND_SCALE);
        values.push(agent.stats.move_speed / SPEED_SCALE);

        // Target
        match ctx.target {
            Some(t) => {
                let offset = t.position - agent.position;
                let dir = offset.normalize_or_zero();
                values.extend_from_slice(&[
                    dir.x,
                    dir.y,
                    offset.length() / ctx.config.observation_radius,
                    t.position.x / POSITION_SCALE,
                    t.position.y / POSITION_SCALE,
                    t.health / 100.0,
                    t.speed_modifier,
                    t.panic / 100.0,
                    flag(t.aiming),
                    flag(t.ranged),
                    t.ammo_fraction,
                ]);
            }
            None => values.extend_from_slice(&[0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 0.0, 1.0]),
        }

        // Environment
        match ctx.environment {
            Some(env) => {
                values.push(env.hour / 24.0);
                values.push(flag(env.is_daytime));
                values.push(env.day as f32 / 100.0);
            }
            None => values.extend_from_slice(&[0.5, 1.0, 0.01]),
        }
        let nearby = ctx
            .world
            .query_circle(agent.position, ctx.config.nearby_agent_radius, LayerMask::ZOMBIE)
            .into_iter()
            .filter(|h| Some(*h) != agent.body())
            .count();
        values.push(nearby as f32 / 10.0);
        let obstacle_near = !ctx
            .world
            .query_circle(agent.position, ctx.config.obstacle_check_radius, LayerMask::OBSTACLE)
            .is_empty();
        values.push(flag(obstacle_near));

        // Profile
        let p = ctx.profile;
        values.extend_from_slice(&[
            flag(p.combat_style == CombatStyle::Melee),
            p.risk_tolerance,
            flag(p.prefers_day),
            flag(p.prefers_stealth),
            p.health_threshold / 100.0,
            p.combat_distance / 20.0,
            p.success_rate,
            p.aggressive_confidence,
        ]);

        // Rays
        let count = ctx.config.ray_count;
        let step = if count > 0 { 360.0 / count as f32 } else { 0.0 };
        for i in 0..count {
            let direction = direction_from_degrees(step * i as f32);
            let (distance, category) = sample_ray(ctx, agent.position, direction);
            values.push(distance);
            values.push(category);
        }

        debug_assert_eq!(values.len(), size);
        Self { values }
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Unit direction to the target as observed (zero without a target)
    pub fn target_direction(&self) -> Vec2 {
        Vec2::new(self.values[TARGET_OFFSET], self.values[TARGET_OFFSET + 1])
    }

    /// Target distance over the observation radius (1 without a target)
    pub fn normalized_target_distance(&self) -> f32 {
        self.values[TARGET_OFFSET + 2]
    }
}

fn flag(b: bool) -> f32 {
    if b {
        1.0
    } else {
        0.0
    }
}

fn sample_ray(ctx: &DecisionContext<'_>, origin: Vec2, direction: Vec2) -> (f32, f32) {
    let max = ctx.config.ray_distance;
    match ctx.world.raycast(origin, direction, max, LayerMask::ALL) {
        Some(hit) => {
            let category = match hit.layer {
                Layer::Player => RAY_HIT_PLAYER,
                Layer::Obstacle => RAY_HIT_OBSTACLE,
                Layer::Zombie => RAY_HIT_OTHER,
            };
            (hit.distance / max, category)
        }
        None => (1.0, RAY_HIT_OTHER),
    }
}
