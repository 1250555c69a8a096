//! Spawn scheduling, kind selection and difficulty scaling
//!
//! The spawner decides *how many* agents to spawn each tick. The simulation
//! owns the pool and the collision world, so it performs the spawns and
//! reports them back through [`ZombieSpawner::record_spawn`].

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::{KindWeights, SpawnerConfig};
use crate::core::types::Vec2;
use crate::zombie::kind::ZombieKind;
use crate::zombie::movement::random_direction;

/// Wave cycle: Warmup -> Active -> Intermission -> Active ...
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum WavePhase {
    Warmup { remaining: f32 },
    Active { wave: u32, elapsed: f32, quota: u32, spawned: u32 },
    Intermission { remaining: f32, next_wave: u32 },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnCounters {
    pub total_spawned: u64,
    pub total_killed: u64,
    pub wave_spawned: u32,
    pub wave_killed: u32,
}

/// Inputs the spawner reads each tick
#[derive(Debug, Clone, Copy)]
pub struct SpawnContext {
    pub alive: usize,
    pub day: u32,
    pub is_night: bool,
    pub player_level: u32,
}

#[derive(Debug, Clone)]
pub struct ZombieSpawner {
    phase: WavePhase,
    /// Continuous-mode accumulator
    spawn_timer: f32,
    counters: SpawnCounters,
}

impl ZombieSpawner {
    pub fn new(config: &SpawnerConfig) -> Self {
        Self {
            phase: WavePhase::Warmup {
                remaining: config.initial_wave_delay,
            },
            spawn_timer: 0.0,
            counters: SpawnCounters::default(),
        }
    }

    pub fn phase(&self) -> WavePhase {
        self.phase
    }

    pub fn counters(&self) -> SpawnCounters {
        self.counters
    }

    /// Current wave number, 0 before the first wave starts
    pub fn current_wave(&self) -> u32 {
        match self.phase {
            WavePhase::Warmup { .. } => 0,
            WavePhase::Active { wave, .. } => wave,
            WavePhase::Intermission { next_wave, .. } => next_wave.saturating_sub(1),
        }
    }

    pub fn record_spawn(&mut self) {
        self.counters.total_spawned += 1;
        self.counters.wave_spawned += 1;
        if let WavePhase::Active { spawned, .. } = &mut self.phase {
            *spawned += 1;
        }
    }

    /// A spawn outside the wave schedule
    pub fn record_manual_spawn(&mut self) {
        self.counters.total_spawned += 1;
    }

    pub fn record_kill(&mut self) {
        self.counters.total_killed += 1;
        self.counters.wave_killed += 1;
    }

    // === DIFFICULTY ===

    pub fn difficulty(&self, config: &SpawnerConfig, ctx: &SpawnContext) -> f32 {
        if !config.difficulty_scaling {
            return 1.0;
        }
        let mut d = config.day_difficulty_multiplier.powi(ctx.day.saturating_sub(1) as i32);
        if ctx.is_night {
            d *= config.night_difficulty_multiplier;
        }
        d *= config.player_level_multiplier.powi(ctx.player_level.saturating_sub(1) as i32);
        let wave = self.current_wave();
        if config.use_waves && wave > 0 {
            d *= config.wave_multiplier.powi(wave as i32 - 1);
        }
        d
    }

    /// Continuous spawn interval, shrinking with difficulty
    pub fn spawn_interval(config: &SpawnerConfig, difficulty: f32) -> f32 {
        let base = config.base_spawn_interval.max(1.0);
        (base / difficulty.max(f32::EPSILON).sqrt()).clamp(1.0, base)
    }

    pub fn wave_quota(config: &SpawnerConfig, wave: u32) -> u32 {
        let scaled = config.zombies_per_wave as f32 * config.wave_multiplier.powi(wave.saturating_sub(1) as i32);
        scaled.round() as u32
    }

    // === SCHEDULING ===

    /// Advance timers and return how many agents should spawn this tick
    pub fn update(&mut self, dt: f32, config: &SpawnerConfig, ctx: &SpawnContext) -> u32 {
        if !config.enabled {
            return 0;
        }
        let room = config.max_zombies_alive.saturating_sub(ctx.alive) as u32;
        if config.use_waves {
            self.update_waves(dt, config, room)
        } else {
            self.update_continuous(dt, config, ctx, room)
        }
    }

    fn update_continuous(&mut self, dt: f32, config: &SpawnerConfig, ctx: &SpawnContext, room: u32) -> u32 {
        self.spawn_timer += dt;
        let interval = Self::spawn_interval(config, self.difficulty(config, ctx));
        if self.spawn_timer >= interval && room > 0 {
            self.spawn_timer = 0.0;
            1
        } else {
            0
        }
    }

    fn update_waves(&mut self, dt: f32, config: &SpawnerConfig, room: u32) -> u32 {
        match &mut self.phase {
            WavePhase::Warmup { remaining } => {
                *remaining -= dt;
                if *remaining <= 0.0 {
                    self.start_wave(1, config);
                }
                0
            }
            WavePhase::Intermission { remaining, next_wave } => {
                *remaining -= dt;
                if *remaining <= 0.0 {
                    let wave = *next_wave;
                    self.start_wave(wave, config);
                }
                0
            }
            WavePhase::Active { wave, elapsed, quota, spawned } => {
                *elapsed += dt;
                if *elapsed >= config.wave_duration {
                    let finished = *wave;
                    tracing::info!(
                        "Wave {} complete: {} spawned, {} killed",
                        finished,
                        self.counters.wave_spawned,
                        self.counters.wave_killed
                    );
                    self.phase = WavePhase::Intermission {
                        remaining: config.time_between_waves,
                        next_wave: finished + 1,
                    };
                    return 0;
                }
                if *quota == 0 {
                    return 0;
                }
                // Spread the quota evenly; the first spawn is immediate
                let spacing = config.wave_duration / *quota as f32;
                let due = ((*elapsed / spacing).floor() as u32 + 1).min(*quota);
                due.saturating_sub(*spawned).min(room)
            }
        }
    }

    fn start_wave(&mut self, wave: u32, config: &SpawnerConfig) {
        let quota = Self::wave_quota(config, wave);
        self.counters.wave_spawned = 0;
        self.counters.wave_killed = 0;
        self.phase = WavePhase::Active {
            wave,
            elapsed: 0.0,
            quota,
            spawned: 0,
        };
        tracing::info!("Wave {} starting with {} zombies", wave, quota);
    }

    // === PLACEMENT ===

    /// Weighted kind selection; a zero total falls back to Walker
    pub fn select_kind<R: Rng + ?Sized>(weights: &KindWeights, rng: &mut R) -> ZombieKind {
        let table = [
            (ZombieKind::Walker, weights.walker),
            (ZombieKind::Runner, weights.runner),
            (ZombieKind::Brute, weights.brute),
            (ZombieKind::Crawler, weights.crawler),
            (ZombieKind::Spitter, weights.spitter),
            (ZombieKind::Bloater, weights.bloater),
            (ZombieKind::Screamer, weights.screamer),
        ];
        let total: f32 = table.iter().map(|(_, w)| w.max(0.0)).sum();
        if total <= 0.0 {
            return ZombieKind::Walker;
        }

        let mut roll = rng.gen::<f32>() * total;
        for (kind, weight) in table {
            let weight = weight.max(0.0);
            if roll < weight {
                return kind;
            }
            roll -= weight;
        }
        ZombieKind::Walker
    }

    /// A configured spawn point, else a ring around the player
    pub fn spawn_position<R: Rng + ?Sized>(config: &SpawnerConfig, player: Vec2, rng: &mut R) -> Vec2 {
        if !config.spawn_points.is_empty() {
            let [x, y] = config.spawn_points[rng.gen_range(0..config.spawn_points.len())];
            return Vec2::new(x, y);
        }
        let min = config.min_spawn_distance.min(config.max_spawn_distance);
        let max = config.max_spawn_distance.max(min);
        let distance = if max > min { rng.gen_range(min..max) } else { min };
        player + random_direction(rng) * distance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn ctx() -> SpawnContext {
        SpawnContext {
            alive: 0,
            day: 1,
            is_night: false,
            player_level: 1,
        }
    }

    #[test]
    fn test_difficulty_factors() {
        let config = SpawnerConfig::default();
        let spawner = ZombieSpawner::new(&config);
        assert_eq!(spawner.difficulty(&config, &ctx()), 1.0);

        let night = SpawnContext { day: 3, is_night: true, ..ctx() };
        let expected = 1.1f32 * 1.1 * 1.5;
        assert!((spawner.difficulty(&config, &night) - expected).abs() < 1e-4);

        let flat = SpawnerConfig { difficulty_scaling: false, ..SpawnerConfig::default() };
        assert_eq!(spawner.difficulty(&flat, &night), 1.0);
    }

    #[test]
    fn test_spawn_interval_clamped() {
        let config = SpawnerConfig::default();
        assert_eq!(ZombieSpawner::spawn_interval(&config, 1.0), 5.0);
        assert!((ZombieSpawner::spawn_interval(&config, 4.0) - 2.5).abs() < 1e-5);
        assert_eq!(ZombieSpawner::spawn_interval(&config, 100.0), 1.0);
    }

    #[test]
    fn test_wave_cycle() {
        let config = SpawnerConfig {
            initial_wave_delay: 1.0,
            zombies_per_wave: 4,
            wave_duration: 8.0,
            time_between_waves: 2.0,
            ..SpawnerConfig::default()
        };
        let mut spawner = ZombieSpawner::new(&config);

        assert_eq!(spawner.update(0.5, &config, &ctx()), 0);
        assert_eq!(spawner.update(0.6, &config, &ctx()), 0);
        assert_eq!(spawner.current_wave(), 1);

        // First spawn of the wave is immediate
        let first = spawner.update(0.1, &config, &ctx());
        assert_eq!(first, 1);
        spawner.record_spawn();

        let mut total = 1;
        for _ in 0..80 {
            let n = spawner.update(0.1, &config, &ctx());
            for _ in 0..n {
                spawner.record_spawn();
            }
            total += n;
        }
        assert_eq!(total, 4);
        assert!(matches!(spawner.phase(), WavePhase::Intermission { next_wave: 2, .. }));
        assert_eq!(ZombieSpawner::wave_quota(&config, 2), 5);
    }

    #[test]
    fn test_alive_cap_blocks_spawns() {
        let config = SpawnerConfig { use_waves: false, max_zombies_alive: 2, ..SpawnerConfig::default() };
        let mut spawner = ZombieSpawner::new(&config);
        let full = SpawnContext { alive: 2, ..ctx() };
        assert_eq!(spawner.update(10.0, &config, &full), 0);
        assert_eq!(spawner.update(0.1, &config, &ctx()), 1);
    }

    #[test]
    fn test_zero_weights_fall_back_to_walker() {
        let weights = KindWeights {
            walker: 0.0,
            runner: 0.0,
            brute: 0.0,
            crawler: 0.0,
            spitter: 0.0,
            bloater: 0.0,
            screamer: 0.0,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(ZombieSpawner::select_kind(&weights, &mut rng), ZombieKind::Walker);

        let only_brutes = KindWeights { brute: 1.0, ..weights };
        for _ in 0..20 {
            assert_eq!(ZombieSpawner::select_kind(&only_brutes, &mut rng), ZombieKind::Brute);
        }
    }

    #[test]
    fn test_spawn_ring_distance() {
        let config = SpawnerConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        for _ in 0..50 {
            let p = ZombieSpawner::spawn_position(&config, Vec2::new(5.0, 5.0), &mut rng);
            let d = p.distance(Vec2::new(5.0, 5.0));
            assert!((19.99..=40.01).contains(&d));
        }
    }
}
