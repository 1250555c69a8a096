//! Tick system - orchestrates simulation updates
//!
//! Order within one tick:
//! 1. Clock advances
//! 2. Survivors move and their bodies are synced into the collision world
//! 3. Profiler samples the primary survivor
//! 4. Spawner schedules and the simulation performs spawns
//! 5. Each zombie runs sense -> transition -> decide -> execute, and its
//!    signals are routed immediately (alerts fan out synchronously)
//! 6. Corpses whose delay elapsed return to the pool
//!
//! Everything runs on the caller's thread; nothing suspends mid-tick.

use rand::Rng;

use crate::core::types::{Layer, LayerMask, Vec2};
use crate::decision::{EnvironmentInfo, EpisodeEnd, StepObservation};
use crate::simulation::{SimEvent, Simulation};
use crate::sound::SoundKind;
use crate::spatial::SpatialQuery;
use crate::zombie::{AgentContext, AgentSignal, SpawnContext, Strike, ZombieSpawner};

impl Simulation {
    /// Advance the simulation by `dt` seconds
    pub fn tick(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        self.time += dt;
        self.stats.ticks += 1;

        if self.clock.advance(dt) > 0 {
            tracing::info!("Day {} begins", self.clock.current_day());
        }

        for survivor in self.survivors.iter_mut() {
            survivor.update(dt);
            self.world.set_position(survivor.body, survivor.position);
        }

        let subject = self.primary_survivor().map(|s| s.subject_sample());
        let is_daytime = self.clock.is_daytime();
        self.profiler.update(dt, self.time, subject, Some(is_daytime));

        self.run_spawner(dt);

        let is_night = self.clock.is_night();
        for index in 0..self.zombies.len() {
            self.run_agent(index, dt, is_night);
        }

        self.collect_corpses(dt);
    }

    /// Run `ticks` fixed steps
    pub fn run(&mut self, ticks: u64, dt: f32) {
        for _ in 0..ticks {
            self.tick(dt);
        }
    }

    pub(crate) fn spawn_context(&self) -> SpawnContext {
        SpawnContext {
            alive: self.alive_zombies(),
            day: self.clock.current_day(),
            is_night: self.clock.is_night(),
            player_level: self.player_level,
        }
    }

    fn run_spawner(&mut self, dt: f32) {
        let ctx = self.spawn_context();
        let count = self.spawner.update(dt, &self.config.spawner, &ctx);
        if count == 0 {
            return;
        }
        let anchor = self.primary_survivor().map(|s| s.position).unwrap_or(Vec2::ZERO);
        for _ in 0..count {
            let kind = ZombieSpawner::select_kind(&self.config.spawner.kind_weights, &mut self.rng);
            let position = ZombieSpawner::spawn_position(&self.config.spawner, anchor, &mut self.rng);
            self.spawn_internal(kind, position);
            self.spawner.record_spawn();
        }
    }

    // === PER-AGENT PIPELINE ===

    fn run_agent(&mut self, index: usize, dt: f32, is_night: bool) {
        if self.zombies[index].is_dead() {
            self.finish_dead_episode(index);
            return;
        }

        let target = self.primary_survivor().map(|s| s.target_info());
        let target_body = self.primary_survivor().map(|s| s.body);
        let environment = EnvironmentInfo {
            hour: self.clock.current_hour(),
            is_daytime: self.clock.is_daytime(),
            day: self.clock.current_day(),
        };

        let mut strikes: Vec<Strike> = Vec::new();
        let mut attack_success = false;
        {
            let ctx = AgentContext {
                world: &self.world,
                zombie: &self.config.zombie,
                senses: &self.config.senses,
                now: self.time,
                dt,
                is_night,
            };
            let agent = &mut self.zombies[index];
            agent.begin_tick(dt);
            agent.sense(&ctx, &mut self.rng);
            agent.think(&ctx, &mut self.rng);

            if let Some(layer) = self.adaptive.as_mut() {
                attack_success = layer.decide(
                    agent,
                    &self.world,
                    Some(&self.profiler),
                    target,
                    Some(environment),
                    &self.config.decision,
                    dt,
                );
                if let (true, Some(body)) = (attack_success, target_body) {
                    strikes.extend(agent.strike_at(body, &ctx, &mut self.rng));
                }
            }

            strikes.extend(agent.act(&ctx, &mut self.rng));
        }

        let agent = &self.zombies[index];
        if let Some(body) = agent.body() {
            self.world.set_position(body, agent.position);
        }

        for strike in &strikes {
            self.apply_strike(strike);
        }

        if let Some(layer) = self.adaptive.as_mut() {
            let agent = &self.zombies[index];
            let step = StepObservation {
                target_distance: target.map(|t| t.position.distance(agent.position)),
                is_daytime: Some(environment.is_daytime),
                attack_success,
            };
            if let Some(end) = layer.score(agent, &step, &self.config.decision).and_then(|r| r.end) {
                self.route_signals(index);
                self.end_episode(index, end);
            }
        }

        self.route_signals(index);
    }

    fn apply_strike(&mut self, strike: &Strike) {
        let Some(survivor) = self.survivors.iter_mut().find(|s| s.body == strike.target) else {
            return;
        };
        if !survivor.is_alive() {
            return;
        }
        strike.apply(survivor);
        self.stats.strikes += 1;
        self.stats.damage_to_survivors += strike.damage;
    }

    /// One terminal decision step for an adaptive agent that died since
    /// its last step
    fn finish_dead_episode(&mut self, index: usize) {
        let target = self.primary_survivor().map(|s| s.position);
        let is_daytime = self.clock.is_daytime();
        let Some(layer) = self.adaptive.as_mut() else {
            return;
        };
        let agent = &self.zombies[index];
        let pending = layer.episode(agent.id).map(|e| !e.is_terminated()).unwrap_or(false);
        if !pending {
            return;
        }
        let step = StepObservation {
            target_distance: target.map(|p| p.distance(agent.position)),
            is_daytime: Some(is_daytime),
            attack_success: false,
        };
        if let Some(end) = layer.score(agent, &step, &self.config.decision).and_then(|r| r.end) {
            self.end_episode(index, end);
        }
    }

    fn end_episode(&mut self, index: usize, end: EpisodeEnd) {
        let id = self.zombies[index].id;
        let reward = self
            .adaptive
            .as_ref()
            .and_then(|l| l.episode(id))
            .map(|e| e.stats().cumulative_reward)
            .unwrap_or(0.0);
        self.stats.episodes_completed += 1;
        self.events.push(SimEvent::EpisodeEnded { zombie: id, end, reward });

        let reset = match end {
            EpisodeEnd::BudgetExhausted => true,
            EpisodeEnd::Died => self.config.decision.training_mode,
        };
        if reset {
            self.reset_episode(index);
        }
    }

    /// Revive near the spawn anchor with a fresh episode and profile read
    fn reset_episode(&mut self, index: usize) {
        let target = self.primary_survivor().map(|s| s.position);
        let id = self.zombies[index].id;
        if let Some(episode) = self.adaptive.as_mut().and_then(|l| l.episode_mut(id)) {
            episode.reset(
                &mut self.zombies[index],
                Some(&self.profiler),
                &self.config.decision,
                &self.config.zombie,
                target,
                &mut self.rng,
            );
        }

        let agent = &mut self.zombies[index];
        match agent.body() {
            Some(body) => {
                self.world.set_position(body, agent.position);
            }
            None => {
                let body = self.world.add_circle(
                    agent.position,
                    self.config.senses.body_radius,
                    Layer::Zombie,
                );
                agent.set_body(Some(body));
            }
        }
        // Signals from the previous life are stale
        agent.drain_signals().for_each(drop);
    }

    // === SIGNAL ROUTING ===

    /// Drain an agent's outbox into events and cross-agent effects
    pub(crate) fn route_signals(&mut self, index: usize) {
        let signals: Vec<AgentSignal> = self.zombies[index].drain_signals().collect();
        let id = self.zombies[index].id;

        for signal in signals {
            match signal {
                AgentSignal::StateEntered { from, to } => {
                    self.events.push(SimEvent::StateEntered { zombie: id, from, to });
                }
                AgentSignal::Alert { target_position } => self.fan_out_alert(index, target_position),
                AgentSignal::DamageDealt { target, amount } => {
                    self.events.push(SimEvent::DamageDealt { zombie: id, target, amount });
                }
                AgentSignal::DamageTaken { amount, source } => {
                    self.events.push(SimEvent::DamageTaken { zombie: id, amount, source });
                }
                AgentSignal::Died { position } => self.handle_death(index, position),
                AgentSignal::Groan { position } => {
                    self.stats.sounds_emitted += 1;
                    self.events.push(SimEvent::SoundEmitted {
                        kind: SoundKind::ZombieGroan,
                        position,
                        listeners: 0,
                    });
                }
                AgentSignal::RageStarted => {
                    tracing::debug!("Zombie {} is raging", id);
                }
            }
        }
    }

    /// Synchronous alert to zombies near a new chaser
    fn fan_out_alert(&mut self, index: usize, target_position: Vec2) {
        let origin = self.zombies[index].position;
        let me = self.zombies[index].body();
        let bodies = self.body_index();
        let neighbors = self
            .world
            .query_circle(origin, self.config.zombie.group_alert_radius, LayerMask::ZOMBIE);

        let mut alerted = 0;
        for handle in neighbors {
            if Some(handle) == me {
                continue;
            }
            let Some(&j) = bodies.get(&handle) else {
                continue;
            };
            self.zombies[j].receive_alert(target_position, &self.config.zombie, &mut self.rng);
            self.route_signals(j);
            alerted += 1;
        }
        self.stats.alerts += 1;
        tracing::debug!("Zombie {} alerted {} neighbors", self.zombies[index].id, alerted);
    }

    fn handle_death(&mut self, index: usize, position: Vec2) {
        let loot_dropped = self.rng.gen::<f32>() < self.config.zombie.loot_chance;
        self.stats.kills += 1;
        if loot_dropped {
            self.stats.loot_drops += 1;
        }
        self.spawner.record_kill();

        let agent = &mut self.zombies[index];
        if let Some(body) = agent.body() {
            self.world.remove(body);
            agent.set_body(None);
        }
        self.events.push(SimEvent::Died {
            zombie: agent.id,
            kind: agent.kind,
            position,
            loot_dropped,
        });
    }

    /// Return corpses to the pool once their delay has elapsed
    fn collect_corpses(&mut self, dt: f32) {
        let delay = self.config.zombie.despawn_delay;
        let mut i = 0;
        while i < self.zombies.len() {
            if !self.zombies[i].tick_corpse(dt, delay) {
                i += 1;
                continue;
            }
            let agent = self.zombies.remove(i);
            if let Some(layer) = self.adaptive.as_mut() {
                layer.forget(agent.id);
            }
            self.events.push(SimEvent::Despawned { zombie: agent.id });
            self.pool.release(agent);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SimulationConfig;
    use crate::profiler::CombatStyle;
    use crate::zombie::{DamageOutcome, ZombieKind, ZombieState};

    fn quiet_config() -> SimulationConfig {
        let mut config = SimulationConfig::default();
        config.spawner.enabled = false;
        config
    }

    #[test]
    fn test_spawn_and_despawn_cycle() {
        let mut sim = Simulation::new(quiet_config()).unwrap();
        sim.add_survivor(Vec2::new(50.0, 50.0));
        let id = sim.spawn_zombie(ZombieKind::Walker, Vec2::ZERO);
        assert_eq!(sim.alive_zombies(), 1);

        assert_eq!(sim.player_attack(CombatStyle::Ranged, id, 500.0), DamageOutcome::Killed);
        assert_eq!(sim.alive_zombies(), 0);
        assert_eq!(sim.stats().kills, 1);

        sim.run(40, 0.1);
        assert!(sim.zombies().is_empty());
        let events = sim.drain_events();
        let deaths = events.iter().filter(|e| matches!(e, SimEvent::Died { .. })).count();
        assert_eq!(deaths, 1);
        assert!(events.iter().any(|e| matches!(e, SimEvent::Despawned { zombie } if *zombie == id)));
    }

    #[test]
    fn test_alert_pulls_neighbors_into_investigate() {
        let mut sim = Simulation::new(quiet_config()).unwrap();
        sim.add_survivor(Vec2::new(5.0, 0.0));
        let chaser = sim.spawn_zombie(ZombieKind::Walker, Vec2::ZERO);
        let neighbor = sim.spawn_zombie(ZombieKind::Walker, Vec2::new(-3.0, 0.0));
        sim.zombie_mut(chaser).unwrap().set_facing(Vec2::X);
        sim.zombie_mut(neighbor).unwrap().set_facing(-Vec2::X);

        sim.tick(0.1);
        assert_eq!(sim.zombie(chaser).unwrap().state(), ZombieState::Chase);
        assert_eq!(sim.zombie(neighbor).unwrap().state(), ZombieState::Investigate);
        assert_eq!(sim.stats().alerts, 1);
    }

    #[test]
    fn test_gunshot_draws_zombies() {
        let mut sim = Simulation::new(quiet_config()).unwrap();
        sim.add_survivor(Vec2::new(100.0, 100.0));
        let near = sim.spawn_zombie(ZombieKind::Walker, Vec2::new(10.0, 0.0));
        let far = sim.spawn_zombie(ZombieKind::Walker, Vec2::new(45.0, 0.0));

        let heard = sim.emit_sound(SoundKind::Gunshot, Vec2::ZERO);
        assert_eq!(heard, 1);
        assert_eq!(sim.zombie(near).unwrap().state(), ZombieState::Investigate);
        assert_ne!(sim.zombie(far).unwrap().state(), ZombieState::Investigate);
    }
}
