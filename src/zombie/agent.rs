//! Per-zombie state machine
//!
//! A tick runs in four phases, driven by the simulation:
//! `begin_tick` (timers), `sense`, `think` (transitions), `act` (movement
//! and attacks). Cross-agent effects such as group alerts are pushed to an
//! outbox of [`AgentSignal`]s that the simulation drains after each agent,
//! so no agent ever borrows another.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::{SenseConfig, ZombieConfig};
use crate::core::types::{EntityHandle, LayerMask, SimTime, Vec2};
use crate::sound::SoundListener;
use crate::spatial::SpatialQuery;
use crate::zombie::combat::{StatusEffect, Strike};
use crate::zombie::kind::{ZombieKind, ZombieStats};
use crate::zombie::movement::{avoid_obstacles, random_direction, random_in_disc, steer};
use crate::zombie::senses::{can_hear, scan_vision, sniff, SoundMemory};
use crate::zombie::state::{evaluate, Transition, TransitionInputs, ZombieState};

/// Stable identity of an agent across pool reuse
pub type AgentId = u32;

/// Facing below this speed is left unchanged
const FACING_MIN_SPEED: f32 = 0.1;

/// Notifications an agent emits for the simulation to route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AgentSignal {
    StateEntered { from: ZombieState, to: ZombieState },
    /// Entered Chase; nearby agents should investigate this position
    Alert { target_position: Vec2 },
    DamageDealt { target: EntityHandle, amount: f32 },
    DamageTaken { amount: f32, source: Vec2 },
    Died { position: Vec2 },
    /// Audible groan at the agent's position
    Groan { position: Vec2 },
    RageStarted,
}

/// Where an investigation should head
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InvestigateSeed {
    /// Most recent sound, else the last known target position
    Memory,
    /// Most recent sound, else the smelled position
    Smell(Vec2),
    /// Exactly this point (alerts, damage sources)
    Point(Vec2),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Already dead, nothing happened
    Ignored,
    Hurt,
    Killed,
}

/// Borrowed per-tick environment
pub struct AgentContext<'a, Q: ?Sized> {
    pub world: &'a Q,
    pub zombie: &'a ZombieConfig,
    pub senses: &'a SenseConfig,
    pub now: SimTime,
    pub dt: f32,
    pub is_night: bool,
}

#[derive(Debug, Clone)]
pub struct ZombieAgent {
    pub id: AgentId,
    pub kind: ZombieKind,
    pub stats: ZombieStats,
    health: f32,
    /// Body in the collision world; `None` once dead or pooled
    body: Option<EntityHandle>,

    state: ZombieState,
    previous_state: ZombieState,
    time_in_state: f32,
    idle_duration: f32,

    target: Option<EntityHandle>,
    last_known_target: Vec2,
    time_since_seen: f32,
    sound_memory: SoundMemory,
    investigate_timer: f32,

    pub position: Vec2,
    pub velocity: Vec2,
    facing: Vec2,
    knockback: Vec2,
    destination: Vec2,
    wander_direction: Vec2,
    wander_timer: f32,
    spawn_position: Vec2,

    attack_timer: f32,
    raging: bool,
    rage_timer: f32,
    corpse_timer: f32,

    /// Decision-layer speed multiplier for this tick
    speed_bias: f32,
    /// Decision-layer heading for this tick
    steering_override: Option<Vec2>,

    distance_travelled: f32,
    damage_dealt: f32,
    signals: Vec<AgentSignal>,
}

impl ZombieAgent {
    pub fn new<R: Rng + ?Sized>(
        id: AgentId,
        kind: ZombieKind,
        stats: ZombieStats,
        position: Vec2,
        senses: &SenseConfig,
        rng: &mut R,
    ) -> Self {
        Self {
            id,
            kind,
            stats,
            health: stats.max_health,
            body: None,
            state: ZombieState::Wander,
            previous_state: ZombieState::Idle,
            time_in_state: 0.0,
            idle_duration: 0.0,
            target: None,
            last_known_target: position,
            time_since_seen: 0.0,
            sound_memory: SoundMemory::new(senses.sound_memory_capacity),
            investigate_timer: 0.0,
            position,
            velocity: Vec2::ZERO,
            facing: Vec2::X,
            knockback: Vec2::ZERO,
            destination: position,
            wander_direction: random_direction(rng),
            wander_timer: 0.0,
            spawn_position: position,
            attack_timer: 0.0,
            raging: false,
            rage_timer: 0.0,
            corpse_timer: 0.0,
            speed_bias: 1.0,
            steering_override: None,
            distance_travelled: 0.0,
            damage_dealt: 0.0,
            signals: Vec::new(),
        }
    }

    /// Reinitialize a pooled agent for a fresh spawn
    pub fn respawn<R: Rng + ?Sized>(
        &mut self,
        kind: ZombieKind,
        stats: ZombieStats,
        position: Vec2,
        senses: &SenseConfig,
        rng: &mut R,
    ) {
        let mut signals = std::mem::take(&mut self.signals);
        signals.clear();
        *self = Self {
            signals,
            ..Self::new(self.id, kind, stats, position, senses, rng)
        };
    }

    // === ACCESSORS ===

    pub fn state(&self) -> ZombieState {
        self.state
    }

    pub fn previous_state(&self) -> ZombieState {
        self.previous_state
    }

    pub fn health(&self) -> f32 {
        self.health
    }

    pub fn is_dead(&self) -> bool {
        self.state == ZombieState::Dead
    }

    pub fn body(&self) -> Option<EntityHandle> {
        self.body
    }

    pub fn set_body(&mut self, body: Option<EntityHandle>) {
        self.body = body;
    }

    pub fn target(&self) -> Option<EntityHandle> {
        self.target
    }

    /// Hand the agent a target directly (scripted spawns, tests)
    pub fn set_target(&mut self, target: Option<EntityHandle>) {
        self.target = target;
        if target.is_some() {
            self.time_since_seen = 0.0;
        }
    }

    pub fn last_known_target(&self) -> Vec2 {
        self.last_known_target
    }

    pub fn time_since_seen(&self) -> f32 {
        self.time_since_seen
    }

    pub fn set_time_since_seen(&mut self, seconds: f32) {
        self.time_since_seen = seconds.max(0.0);
    }

    pub fn time_in_state(&self) -> f32 {
        self.time_in_state
    }

    pub fn destination(&self) -> Vec2 {
        self.destination
    }

    pub fn investigate_timer(&self) -> f32 {
        self.investigate_timer
    }

    pub fn sound_memory(&self) -> &SoundMemory {
        &self.sound_memory
    }

    pub fn facing(&self) -> Vec2 {
        self.facing
    }

    pub fn set_facing(&mut self, facing: Vec2) {
        let facing = facing.normalize_or_zero();
        if facing != Vec2::ZERO {
            self.facing = facing;
        }
    }

    pub fn spawn_position(&self) -> Vec2 {
        self.spawn_position
    }

    pub fn is_raging(&self) -> bool {
        self.raging
    }

    pub fn distance_travelled(&self) -> f32 {
        self.distance_travelled
    }

    pub fn damage_dealt(&self) -> f32 {
        self.damage_dealt
    }

    /// Move speed including rage, before state and time-of-day multipliers
    pub fn effective_move_speed(&self, config: &ZombieConfig) -> f32 {
        if self.raging {
            self.stats.move_speed * config.rage_speed_multiplier
        } else {
            self.stats.move_speed
        }
    }

    /// Damage of the next strike
    pub fn effective_damage(&self, config: &ZombieConfig) -> f32 {
        if self.raging {
            self.stats.attack_damage * config.rage_damage_multiplier * config.rage_strike_multiplier
        } else {
            self.stats.attack_damage
        }
    }

    pub fn set_speed_bias(&mut self, bias: f32) {
        self.speed_bias = bias.max(0.0);
    }

    pub fn set_steering_override(&mut self, heading: Option<Vec2>) {
        self.steering_override = heading.map(|h| h.normalize_or_zero());
    }

    pub fn drain_signals(&mut self) -> std::vec::Drain<'_, AgentSignal> {
        self.signals.drain(..)
    }

    pub fn pending_signals(&self) -> &[AgentSignal] {
        &self.signals
    }

    // === STATE CHANGES ===

    fn set_state<R: Rng + ?Sized>(&mut self, next: ZombieState, config: &ZombieConfig, rng: &mut R) {
        if self.state == next || self.is_dead() {
            return;
        }
        self.previous_state = self.state;
        self.state = next;
        self.time_in_state = 0.0;

        match next {
            ZombieState::Idle => {
                self.idle_duration = rng.gen_range(config.idle_min_secs..=config.idle_max_secs);
            }
            ZombieState::Investigate => self.seed_investigation(InvestigateSeed::Memory, config),
            ZombieState::Patrol => self.pick_patrol_point(config, rng),
            // No alert without a held target
            ZombieState::Chase if self.target.is_some() => {
                self.signals.push(AgentSignal::Alert {
                    target_position: self.last_known_target,
                });
            }
            ZombieState::Chase => {}
            ZombieState::Wander | ZombieState::Attack | ZombieState::Dead => {}
        }

        tracing::debug!("Zombie {} entered state: {}", self.id, next);
        self.signals.push(AgentSignal::StateEntered {
            from: self.previous_state,
            to: next,
        });
    }

    fn seed_investigation(&mut self, seed: InvestigateSeed, config: &ZombieConfig) {
        let remembered = self.sound_memory.most_recent().map(|s| s.position);
        let (destination, timer) = match (seed, remembered) {
            (InvestigateSeed::Point(p), _) => (p, config.investigate_time_default),
            (_, Some(sound)) => (sound, config.investigate_time_sound),
            (InvestigateSeed::Smell(p), None) => (p, config.investigate_time_default),
            (InvestigateSeed::Memory, None) => (self.last_known_target, config.investigate_time_default),
        };
        self.destination = destination;
        self.investigate_timer = timer;
    }

    /// Enter Investigate (or re-seed it) from an explicit seed
    pub fn investigate<R: Rng + ?Sized>(&mut self, seed: InvestigateSeed, config: &ZombieConfig, rng: &mut R) {
        if self.is_dead() {
            return;
        }
        if self.state == ZombieState::Investigate {
            self.seed_investigation(seed, config);
            return;
        }
        self.set_state(ZombieState::Investigate, config, rng);
        // set_state seeded from memory; explicit seeds override it
        if !matches!(seed, InvestigateSeed::Memory) {
            self.seed_investigation(seed, config);
        }
    }

    fn pick_patrol_point<R: Rng + ?Sized>(&mut self, config: &ZombieConfig, rng: &mut R) {
        self.destination = random_in_disc(rng, self.spawn_position, config.patrol_radius);
    }

    /// The only way into Patrol
    pub fn request_patrol<R: Rng + ?Sized>(&mut self, config: &ZombieConfig, rng: &mut R) {
        if self.is_dead() {
            return;
        }
        if self.state == ZombieState::Patrol {
            self.pick_patrol_point(config, rng);
        } else {
            self.set_state(ZombieState::Patrol, config, rng);
        }
    }

    /// Synchronous group alert from a chasing neighbor
    pub fn receive_alert<R: Rng + ?Sized>(&mut self, target_position: Vec2, config: &ZombieConfig, rng: &mut R) {
        if self.is_dead() || self.state.is_engaged() {
            return;
        }
        self.last_known_target = target_position;
        self.investigate(InvestigateSeed::Point(target_position), config, rng);
    }

    // === TICK PHASES ===

    pub fn begin_tick(&mut self, dt: f32) {
        if self.is_dead() {
            return;
        }
        self.time_in_state += dt;
        self.time_since_seen += dt;
        self.attack_timer = (self.attack_timer - dt).max(0.0);

        if self.raging {
            self.rage_timer -= dt;
            if self.rage_timer <= 0.0 {
                self.raging = false;
                tracing::debug!("Zombie {} rage ended", self.id);
            }
        }
    }

    /// Vision, then smell; prunes sound memory
    pub fn sense<Q: SpatialQuery + ?Sized, R: Rng + ?Sized>(&mut self, ctx: &AgentContext<'_, Q>, rng: &mut R) {
        if self.is_dead() {
            return;
        }
        self.sound_memory.prune(ctx.now, self.stats.memory_duration);

        if let Some(sighting) = scan_vision(
            ctx.world,
            self.position,
            self.facing,
            self.stats.vision_range,
            self.stats.vision_angle,
        ) {
            self.target = Some(sighting.entity);
            self.time_since_seen = 0.0;
            self.last_known_target = sighting.position;
        } else if let Some(target) = self.target {
            let keep = ctx
                .world
                .position_of(target)
                .map(|p| p.distance(self.position) <= self.stats.vision_range * ctx.senses.lose_target_factor)
                .unwrap_or(false);
            if !keep {
                self.target = None;
            }
        }

        if self.target.is_none() && self.state.is_passive() {
            if let Some(smelled) = sniff(ctx.world, self.position, self.stats.smell_range) {
                self.investigate(InvestigateSeed::Smell(smelled.position), ctx.zombie, rng);
            }
        }
    }

    fn target_position<Q: SpatialQuery + ?Sized>(&self, world: &Q) -> Option<Vec2> {
        self.target.and_then(|t| world.position_of(t))
    }

    /// Evaluate the transition table once
    pub fn think<Q: SpatialQuery + ?Sized, R: Rng + ?Sized>(&mut self, ctx: &AgentContext<'_, Q>, rng: &mut R) {
        if self.is_dead() {
            return;
        }
        // Stale handles are dropped before evaluation
        let target_pos = self.target_position(ctx.world);
        if target_pos.is_none() {
            self.target = None;
        }

        let inputs = TransitionInputs {
            has_target: self.target.is_some(),
            target_distance: target_pos.map(|p| p.distance(self.position)),
            time_since_seen: self.time_since_seen,
            time_in_state: self.time_in_state,
            idle_duration: self.idle_duration,
            has_sound_memory: !self.sound_memory.is_empty(),
            reached_destination: self.position.distance(self.destination) < ctx.zombie.arrival_distance,
            investigate_timer: self.investigate_timer,
            attack_range: self.stats.attack_range,
            give_up_time: ctx.zombie.give_up_time,
            lost_target_grace: ctx.zombie.lost_target_grace,
        };

        match evaluate(self.state, &inputs) {
            Transition::Stay => {
                if self.state == ZombieState::Investigate {
                    self.investigate_timer -= ctx.dt;
                }
            }
            Transition::NextPatrolPoint => self.pick_patrol_point(ctx.zombie, rng),
            Transition::Enter(next) => {
                if self.state == ZombieState::Chase && next == ZombieState::Wander {
                    self.target = None;
                }
                self.set_state(next, ctx.zombie, rng);
            }
        }
    }

    /// Per-state movement and attacks. Returns a strike to apply, if any.
    pub fn act<Q: SpatialQuery + ?Sized, R: Rng + ?Sized>(
        &mut self,
        ctx: &AgentContext<'_, Q>,
        rng: &mut R,
    ) -> Option<Strike> {
        if self.is_dead() {
            return None;
        }
        let cfg = ctx.zombie;
        let speed = self.effective_move_speed(cfg);
        let mut strike = None;

        let plan: Option<(Vec2, f32)> = match self.state {
            ZombieState::Idle => None,
            ZombieState::Wander => {
                self.wander_timer += ctx.dt;
                if self.wander_timer >= cfg.wander_change_interval {
                    self.wander_timer = 0.0;
                    self.wander_direction = random_direction(rng);
                }
                let goal = self.position + self.wander_direction * cfg.wander_lookahead;
                Some((goal, speed * cfg.wander_speed_multiplier))
            }
            ZombieState::Chase => match self.target_position(ctx.world) {
                Some(p) => {
                    self.last_known_target = p;
                    Some((p, speed * cfg.chase_speed_multiplier))
                }
                None => Some((self.last_known_target, speed)),
            },
            ZombieState::Attack => {
                if let Some(p) = self.target_position(ctx.world) {
                    self.set_facing(p - self.position);
                }
                strike = self.try_strike(ctx, rng);
                None
            }
            ZombieState::Investigate => Some((self.destination, speed * cfg.investigate_speed_multiplier)),
            ZombieState::Patrol => Some((self.destination, speed * cfg.patrol_speed_multiplier)),
            ZombieState::Dead => None,
        };

        let time_factor = if ctx.is_night { cfg.night_speed_multiplier } else { 1.0 };
        let steerable = !matches!(self.state, ZombieState::Attack | ZombieState::Dead);
        self.velocity = match (self.steering_override, plan) {
            // A decision-layer heading replaces state steering; zero stands still
            (Some(heading), _) if steerable => {
                if heading == Vec2::ZERO {
                    Vec2::ZERO
                } else {
                    let dir = avoid_obstacles(
                        ctx.world,
                        self.position,
                        heading,
                        cfg.obstacle_probe_distance,
                        cfg.avoidance_weight,
                        rng,
                    );
                    dir * speed * self.speed_bias * time_factor
                }
            }
            (_, None) => Vec2::ZERO,
            (_, Some((goal, state_speed))) => {
                let dir = steer(
                    ctx.world,
                    self.position,
                    goal,
                    cfg.obstacle_probe_distance,
                    cfg.avoidance_weight,
                    rng,
                );
                dir * state_speed * self.speed_bias * time_factor
            }
        };

        self.integrate(ctx.dt, cfg);
        strike
    }

    fn integrate(&mut self, dt: f32, config: &ZombieConfig) {
        let step = (self.velocity + self.knockback) * dt;
        self.position += step;
        self.distance_travelled += step.length();
        self.knockback *= config.knockback_damping.clamp(0.0, 1.0).powf(dt);
        if self.knockback.length_squared() < 1e-6 {
            self.knockback = Vec2::ZERO;
        }
        if self.velocity.length() > FACING_MIN_SPEED {
            self.facing = self.velocity.normalize();
        }
    }

    /// Strike the held target if the cooldown has elapsed and it is in range
    pub fn try_strike<Q: SpatialQuery + ?Sized, R: Rng + ?Sized>(
        &mut self,
        ctx: &AgentContext<'_, Q>,
        rng: &mut R,
    ) -> Option<Strike> {
        let target = self.target?;
        self.strike_at(target, ctx, rng)
    }

    /// Strike a specific entity, subject to cooldown and range
    pub fn strike_at<Q: SpatialQuery + ?Sized, R: Rng + ?Sized>(
        &mut self,
        target: EntityHandle,
        ctx: &AgentContext<'_, Q>,
        rng: &mut R,
    ) -> Option<Strike> {
        if self.is_dead() || self.attack_timer > 0.0 {
            return None;
        }
        let target_pos = ctx.world.position_of(target)?;
        if target_pos.distance(self.position) > self.stats.attack_range {
            return None;
        }

        let cfg = ctx.zombie;
        let damage = self.effective_damage(cfg);
        self.attack_timer = self.stats.attack_cooldown;
        self.damage_dealt += damage;

        let mut effects = Vec::new();
        if rng.gen::<f32>() < cfg.bleed_chance {
            effects.push(StatusEffect::Bleeding { duration: cfg.bleed_duration });
        }
        if rng.gen::<f32>() < cfg.infection_chance {
            effects.push(StatusEffect::Infected);
        }

        self.signals.push(AgentSignal::DamageDealt { target, amount: damage });
        self.signals.push(AgentSignal::Groan { position: self.position });
        tracing::debug!("Zombie {} attacked for {:.1} damage", self.id, damage);

        Some(Strike {
            attacker: self.body,
            target,
            damage,
            origin: self.position,
            effects,
        })
    }

    // === EXTERNAL STIMULI ===

    /// Hearing callback. Returns whether the sound was accepted.
    pub fn hear_sound<R: Rng + ?Sized>(
        &mut self,
        position: Vec2,
        intensity: f32,
        now: SimTime,
        config: &ZombieConfig,
        rng: &mut R,
    ) -> bool {
        if self.is_dead() || !can_hear(self.position, position, intensity, self.stats.hearing_range) {
            return false;
        }
        self.sound_memory.remember(position, intensity, now);
        tracing::debug!(
            "Zombie {} heard sound at distance {:.1} with intensity {:.2}",
            self.id,
            self.position.distance(position),
            intensity
        );

        if !self.state.is_engaged() && self.state != ZombieState::Investigate {
            self.set_state(ZombieState::Investigate, config, rng);
        }
        true
    }

    /// Apply damage from `source`. Re-entrant damage after death is a no-op.
    pub fn take_damage<Q: SpatialQuery + ?Sized, R: Rng + ?Sized>(
        &mut self,
        amount: f32,
        source: Vec2,
        world: &Q,
        config: &ZombieConfig,
        rng: &mut R,
    ) -> DamageOutcome {
        if self.is_dead() {
            return DamageOutcome::Ignored;
        }
        let amount = amount.max(0.0);
        self.health = (self.health - amount).clamp(0.0, self.stats.max_health);
        self.signals.push(AgentSignal::DamageTaken { amount, source });

        let away = (self.position - source).normalize_or_zero();
        self.knockback += away * config.knockback_force;

        tracing::debug!(
            "Zombie {} took {:.1} damage. Health: {:.1}/{:.1}",
            self.id,
            amount,
            self.health,
            self.stats.max_health
        );

        if self.health <= 0.0 {
            self.die();
            return DamageOutcome::Killed;
        }

        if !self.state.is_engaged() {
            self.last_known_target = source;
            let attacker = world
                .query_circle(source, config.attacker_search_radius, LayerMask::PLAYER)
                .into_iter()
                .find_map(|h| world.position_of(h).map(|p| (h, p)));
            match attacker {
                Some((handle, pos)) => {
                    self.target = Some(handle);
                    self.time_since_seen = 0.0;
                    self.last_known_target = pos;
                    self.set_state(ZombieState::Chase, config, rng);
                }
                None => self.investigate(InvestigateSeed::Point(source), config, rng),
            }
        }

        self.signals.push(AgentSignal::Groan { position: self.position });

        if self.kind.can_rage()
            && !self.raging
            && self.health < self.stats.max_health * config.rage_health_fraction
        {
            self.raging = true;
            self.rage_timer = config.rage_duration;
            self.signals.push(AgentSignal::RageStarted);
            tracing::debug!("Zombie {} entered rage", self.id);
        }

        DamageOutcome::Hurt
    }

    pub fn heal(&mut self, amount: f32) {
        if self.is_dead() {
            return;
        }
        self.health = (self.health + amount.max(0.0)).min(self.stats.max_health);
    }

    fn die(&mut self) {
        self.previous_state = self.state;
        self.state = ZombieState::Dead;
        self.time_in_state = 0.0;
        self.velocity = Vec2::ZERO;
        self.knockback = Vec2::ZERO;
        self.target = None;
        self.raging = false;
        self.sound_memory.clear();
        self.corpse_timer = 0.0;

        tracing::info!(
            "Zombie {} ({}) died. Distance travelled: {:.1}, damage dealt: {:.1}",
            self.id,
            self.kind,
            self.distance_travelled,
            self.damage_dealt
        );
        self.signals.push(AgentSignal::StateEntered {
            from: self.previous_state,
            to: ZombieState::Dead,
        });
        self.signals.push(AgentSignal::Died { position: self.position });
    }

    /// Advance the corpse timer. True once the body may return to the pool.
    pub fn tick_corpse(&mut self, dt: f32, despawn_delay: f32) -> bool {
        if !self.is_dead() {
            return false;
        }
        self.corpse_timer += dt;
        self.corpse_timer >= despawn_delay
    }

    /// Restore health and clear behavior in place (training resets)
    pub fn revive<R: Rng + ?Sized>(&mut self, position: Vec2, config: &ZombieConfig, rng: &mut R) {
        self.health = self.stats.max_health;
        self.state = ZombieState::Idle;
        self.previous_state = ZombieState::Idle;
        self.idle_duration = rng.gen_range(config.idle_min_secs..=config.idle_max_secs);
        self.time_in_state = 0.0;
        self.target = None;
        self.time_since_seen = 0.0;
        self.sound_memory.clear();
        self.position = position;
        self.velocity = Vec2::ZERO;
        self.knockback = Vec2::ZERO;
        self.destination = position;
        self.attack_timer = 0.0;
        self.raging = false;
        self.rage_timer = 0.0;
        self.corpse_timer = 0.0;
    }

    /// Restore persisted minimal state
    pub fn restore_vitals(&mut self, position: Vec2, health: f32) {
        self.position = position;
        self.spawn_position = position;
        self.destination = position;
        self.health = health.clamp(0.0, self.stats.max_health);
    }
}

impl SoundListener for ZombieAgent {
    fn listener_position(&self) -> Vec2 {
        self.position
    }

    fn is_listening(&self) -> bool {
        !self.is_dead()
    }
}
