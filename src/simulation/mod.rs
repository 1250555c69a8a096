//! Simulation context
//!
//! Owns every subsystem and passes them explicitly to agents each tick.
//! There is no global state; two simulations never share anything.

pub mod events;
pub mod persistence;
pub mod player;
pub mod tick;

use ahash::AHashMap;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::core::calendar::DayNightClock;
use crate::core::config::SimulationConfig;
use crate::core::error::Result;
use crate::core::types::{EntityHandle, Layer, SimTime, Vec2};
use crate::decision::{AdaptiveLayer, Policy};
use crate::profiler::{BehaviorProfiler, CombatStyle, ResourceKind};
use crate::sound::{SoundKind, SoundPropagation};
use crate::spatial::CollisionWorld;
use crate::zombie::{AgentId, DamageOutcome, ZombieAgent, ZombieKind, ZombiePool, ZombieSpawner, ZombieStats};

pub use events::{EventQueue, SimEvent};
pub use persistence::{AgentRecord, SaveGame, SAVE_FORMAT_VERSION};
pub use player::{ActiveEffect, Survivor};

/// Running totals across the whole run
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationStats {
    pub ticks: u64,
    pub spawned: u64,
    pub kills: u64,
    pub loot_drops: u64,
    pub strikes: u64,
    pub damage_to_survivors: f32,
    pub sounds_emitted: u64,
    pub alerts: u64,
    pub episodes_completed: u64,
}

pub struct Simulation {
    config: SimulationConfig,
    clock: DayNightClock,
    profiler: BehaviorProfiler,
    world: CollisionWorld,
    sounds: SoundPropagation,
    survivors: Vec<Survivor>,
    zombies: Vec<ZombieAgent>,
    pool: ZombiePool,
    spawner: ZombieSpawner,
    adaptive: Option<AdaptiveLayer>,
    events: EventQueue,
    stats: SimulationStats,
    rng: ChaCha8Rng,
    time: SimTime,
    player_level: u32,
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let pool = ZombiePool::prefilled(config.spawner.initial_pool_size, &config.zombie, &config.senses, &mut rng);

        tracing::info!("Simulation created with seed {}", config.seed);
        Ok(Self {
            clock: DayNightClock::new(config.clock.clone()),
            profiler: BehaviorProfiler::new(config.profiler.clone()),
            world: CollisionWorld::new(),
            sounds: SoundPropagation::new(&config.sound),
            survivors: Vec::new(),
            zombies: Vec::new(),
            pool,
            spawner: ZombieSpawner::new(&config.spawner),
            adaptive: None,
            events: EventQueue::new(),
            stats: SimulationStats::default(),
            rng,
            time: 0.0,
            player_level: 1,
            config,
        })
    }

    // === ACCESSORS ===

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn clock(&self) -> &DayNightClock {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut DayNightClock {
        &mut self.clock
    }

    pub fn profiler(&self) -> &BehaviorProfiler {
        &self.profiler
    }

    pub fn profiler_mut(&mut self) -> &mut BehaviorProfiler {
        &mut self.profiler
    }

    pub fn world(&self) -> &CollisionWorld {
        &self.world
    }

    pub fn spawner(&self) -> &ZombieSpawner {
        &self.spawner
    }

    pub fn pool(&self) -> &ZombiePool {
        &self.pool
    }

    pub fn stats(&self) -> &SimulationStats {
        &self.stats
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn zombies(&self) -> &[ZombieAgent] {
        &self.zombies
    }

    pub fn zombie(&self, id: AgentId) -> Option<&ZombieAgent> {
        self.zombies.iter().find(|z| z.id == id)
    }

    pub fn zombie_mut(&mut self, id: AgentId) -> Option<&mut ZombieAgent> {
        self.zombies.iter_mut().find(|z| z.id == id)
    }

    pub fn alive_zombies(&self) -> usize {
        self.zombies.iter().filter(|z| !z.is_dead()).count()
    }

    pub fn survivors(&self) -> &[Survivor] {
        &self.survivors
    }

    pub fn survivor_mut(&mut self, index: usize) -> Option<&mut Survivor> {
        self.survivors.get_mut(index)
    }

    /// The survivor the profiler tracks and adaptive agents hunt
    pub fn primary_survivor(&self) -> Option<&Survivor> {
        self.survivors.first().filter(|s| s.is_alive())
    }

    pub fn adaptive(&self) -> Option<&AdaptiveLayer> {
        self.adaptive.as_ref()
    }

    pub fn set_player_level(&mut self, level: u32) {
        self.player_level = level.max(1);
    }

    /// Tick-local FIFO of notifications since the last drain
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        self.events.drain().collect()
    }

    pub fn pending_events(&self) -> &EventQueue {
        &self.events
    }

    // === SETUP ===

    /// Route every zombie through `policy` from now on
    pub fn enable_adaptive(&mut self, policy: Box<dyn Policy>) {
        tracing::info!("Adaptive decision layer enabled ({})", policy.name());
        self.adaptive = Some(AdaptiveLayer::new(policy));
    }

    pub fn enable_heuristic_adaptive(&mut self) {
        let seed = self.rng.gen();
        self.enable_adaptive(Box::new(crate::decision::HeuristicPolicy::new(seed)));
    }

    pub fn add_survivor(&mut self, position: Vec2) -> usize {
        let body = self.world.add_circle(position, self.config.senses.body_radius, Layer::Player);
        self.survivors.push(Survivor::new(body, position));
        self.survivors.len() - 1
    }

    /// Axis-aligned wall between two corners
    pub fn add_wall(&mut self, corner_a: Vec2, corner_b: Vec2) -> EntityHandle {
        self.world.add_box(corner_a, corner_b, Layer::Obstacle)
    }

    /// Spawn outside the spawner; difficulty scaling still applies
    pub fn spawn_zombie(&mut self, kind: ZombieKind, position: Vec2) -> AgentId {
        let id = self.spawn_internal(kind, position);
        self.spawner.record_manual_spawn();
        id
    }

    fn spawn_internal(&mut self, kind: ZombieKind, position: Vec2) -> AgentId {
        let difficulty = self.spawner.difficulty(&self.config.spawner, &self.spawn_context());
        let stats = ZombieStats::for_kind(kind, &self.config.zombie, &self.config.senses).scaled_for_difficulty(difficulty);
        let mut agent = self.pool.acquire(kind, stats, position, &self.config.senses, &mut self.rng);
        let body = self.world.add_circle(position, self.config.senses.body_radius, Layer::Zombie);
        agent.set_body(Some(body));

        let id = agent.id;
        self.zombies.push(agent);
        self.stats.spawned += 1;
        self.events.push(SimEvent::Spawned { zombie: id, kind, position });
        tracing::debug!("Spawned {} zombie {} at ({:.1}, {:.1})", kind, id, position.x, position.y);
        id
    }

    // === PLAYER-SIDE ENTRY POINTS ===

    /// The primary survivor hits a zombie. Records the combat event and
    /// applies the damage.
    pub fn player_attack(&mut self, style: CombatStyle, zombie: AgentId, damage: f32) -> DamageOutcome {
        let Some(index) = self.zombies.iter().position(|z| z.id == zombie) else {
            return DamageOutcome::Ignored;
        };
        let source = self.primary_survivor().map(|s| s.position).unwrap_or(self.zombies[index].position);
        let distance = source.distance(self.zombies[index].position);

        let outcome = self.zombies[index].take_damage(damage, source, &self.world, &self.config.zombie, &mut self.rng);
        self.profiler.record_combat(style, distance, outcome != DamageOutcome::Ignored);
        self.route_signals(index);
        outcome
    }

    /// Emit a preset sound; returns how many zombies accepted it
    pub fn emit_sound(&mut self, kind: SoundKind, position: Vec2) -> usize {
        let event = kind.event(position);
        let now = self.time;
        let zombie_config = &self.config.zombie;
        let rng = &mut self.rng;
        let listeners = self.sounds.emit(event, &mut self.zombies, |agent, intensity| {
            agent.hear_sound(position, intensity, now, zombie_config, rng)
        });

        self.stats.sounds_emitted += 1;
        self.events.push(SimEvent::SoundEmitted { kind, position, listeners });
        for index in 0..self.zombies.len() {
            self.route_signals(index);
        }
        listeners
    }

    /// Footstep from a survivor; silent while crouched
    pub fn survivor_footstep(&mut self, index: usize) -> usize {
        let Some(survivor) = self.survivors.get(index) else {
            return 0;
        };
        match SoundKind::Footstep.event_for_stance(survivor.position, survivor.crouching) {
            Some(event) => self.emit_sound(SoundKind::Footstep, event.position),
            None => 0,
        }
    }

    pub fn record_location_visit(&mut self, location_type: &str) {
        self.profiler.record_location_visit(location_type);
    }

    pub fn record_resource_use(&mut self, kind: ResourceKind, value_before: f32, value_after: f32) {
        self.profiler.record_resource_use(kind, value_before, value_after);
    }

    pub fn record_dangerous_encounter(&mut self, retreated: bool) {
        self.profiler.record_dangerous_encounter(retreated);
    }

    /// Put a zombie into Patrol around its spawn point
    pub fn request_patrol(&mut self, zombie: AgentId) -> bool {
        let Some(index) = self.zombies.iter().position(|z| z.id == zombie) else {
            return false;
        };
        self.zombies[index].request_patrol(&self.config.zombie, &mut self.rng);
        self.route_signals(index);
        true
    }

    /// Index of each live zombie body in the roster
    fn body_index(&self) -> AHashMap<EntityHandle, usize> {
        self.zombies
            .iter()
            .enumerate()
            .filter_map(|(i, z)| z.body().map(|b| (b, i)))
            .collect()
    }
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("time", &self.time)
            .field("zombies", &self.zombies.len())
            .field("survivors", &self.survivors.len())
            .field("stats", &self.stats)
            .finish()
    }
}
