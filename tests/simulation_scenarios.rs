//! End-to-end scenarios through `Simulation::tick`
//!
//! These tests verify subsystem wiring rather than individual rules:
//! - The spawner fills waves around the survivor and respects the alive cap
//! - Sounds pull zombies in and corpses are recycled through the pool
//! - Identical seeds reproduce identical runs
//! - Saves survive a trip through disk

use shambler::core::config::SimulationConfig;
use shambler::core::types::Vec2;
use shambler::profiler::CombatStyle;
use shambler::sound::SoundKind;
use shambler::zombie::{WavePhase, ZombieKind, ZombieState};
use shambler::{SaveGame, SimEvent, Simulation};

fn quiet_config() -> SimulationConfig {
    let mut config = SimulationConfig::default();
    config.spawner.enabled = false;
    config
}

#[test]
fn test_first_wave_spawns_around_survivor() {
    let mut config = SimulationConfig::default();
    config.spawner.initial_wave_delay = 1.0;
    config.spawner.zombies_per_wave = 5;
    config.spawner.wave_duration = 10.0;
    let mut sim = Simulation::new(config).unwrap();
    sim.add_survivor(Vec2::new(100.0, 100.0));

    // Warmup plus the whole first wave
    sim.run(115, 0.1);

    assert_eq!(sim.stats().spawned, 5);
    assert_eq!(sim.spawner().counters().total_spawned, 5);
    assert!(matches!(sim.spawner().phase(), WavePhase::Intermission { next_wave: 2, .. }));
    for event in sim.drain_events() {
        if let SimEvent::Spawned { position, .. } = event {
            let d = position.distance(Vec2::new(100.0, 100.0));
            assert!((19.9..=40.1).contains(&d), "spawned {} away", d);
        }
    }
}

#[test]
fn test_alive_cap_limits_continuous_spawning() {
    let mut config = SimulationConfig::default();
    config.spawner.use_waves = false;
    config.spawner.base_spawn_interval = 1.0;
    config.spawner.max_zombies_alive = 3;
    let mut sim = Simulation::new(config).unwrap();
    sim.add_survivor(Vec2::ZERO);

    sim.run(200, 0.1);
    assert_eq!(sim.alive_zombies(), 3);
    assert_eq!(sim.stats().spawned, 3);
}

#[test]
fn test_pool_recycles_corpses() {
    let mut sim = Simulation::new(quiet_config()).unwrap();
    sim.add_survivor(Vec2::new(60.0, 0.0));
    let before = sim.pool().available(ZombieKind::Brute);
    let id = sim.spawn_zombie(ZombieKind::Brute, Vec2::ZERO);
    assert_eq!(sim.pool().available(ZombieKind::Brute), before - 1);

    sim.player_attack(CombatStyle::Ranged, id, 1000.0);
    sim.run(35, 0.1);
    assert_eq!(sim.pool().available(ZombieKind::Brute), before);
    assert_eq!(sim.world().body_count(), 1);

    // The recycled agent comes back with the same identity and full health
    let again = sim.spawn_zombie(ZombieKind::Brute, Vec2::new(5.0, 5.0));
    assert_eq!(again, id);
    let zombie = sim.zombie(again).unwrap();
    assert_eq!(zombie.health(), zombie.stats.max_health);
    assert_ne!(zombie.state(), ZombieState::Dead);
    assert_eq!(sim.pool().fresh_allocations(), 0);
}

#[test]
fn test_crouched_footsteps_are_silent() {
    let mut sim = Simulation::new(quiet_config()).unwrap();
    sim.add_survivor(Vec2::ZERO);
    let id = sim.spawn_zombie(ZombieKind::Walker, Vec2::new(1.0, 0.0));

    sim.survivor_mut(0).unwrap().crouching = true;
    assert_eq!(sim.survivor_footstep(0), 0);
    assert!(sim.zombie(id).unwrap().sound_memory().is_empty());

    sim.survivor_mut(0).unwrap().crouching = false;
    assert_eq!(sim.survivor_footstep(0), 1);
    assert_eq!(sim.zombie(id).unwrap().state(), ZombieState::Investigate);
}

#[test]
fn test_zombies_wear_down_a_passive_survivor() {
    let mut sim = Simulation::new(quiet_config()).unwrap();
    sim.add_survivor(Vec2::ZERO);
    for i in 0..4 {
        let position = Vec2::from_angle(i as f32 * std::f32::consts::FRAC_PI_2) * 6.0;
        sim.spawn_zombie(ZombieKind::Walker, position);
        sim.emit_sound(SoundKind::Gunshot, Vec2::ZERO);
    }

    sim.run(600, 0.1);
    let survivor = &sim.survivors()[0];
    assert!(survivor.health < survivor.max_health);
    assert!(survivor.damage_taken() > 0.0);
    assert!(sim.stats().strikes > 0);
    assert!(sim
        .drain_events()
        .iter()
        .any(|e| matches!(e, SimEvent::StateEntered { to: ZombieState::Attack, .. })));
}

#[test]
fn test_same_seed_same_run() {
    let run = || {
        let mut sim = Simulation::new(SimulationConfig::default()).unwrap();
        sim.add_survivor(Vec2::ZERO);
        sim.add_wall(Vec2::new(-3.0, 4.0), Vec2::new(3.0, 5.0));
        sim.enable_heuristic_adaptive();
        for _ in 0..400 {
            if let Some(s) = sim.survivor_mut(0) {
                s.velocity = Vec2::new(1.0, 0.5);
            }
            sim.tick(0.1);
        }
        let positions: Vec<Vec2> = sim.zombies().iter().map(|z| z.position).collect();
        (positions, *sim.stats())
    };
    let (a_positions, a_stats) = run();
    let (b_positions, b_stats) = run();
    assert_eq!(a_positions, b_positions);
    assert_eq!(a_stats, b_stats);
}

#[test]
fn test_save_load_via_disk() {
    let mut sim = Simulation::new(quiet_config()).unwrap();
    sim.add_survivor(Vec2::ZERO);
    sim.spawn_zombie(ZombieKind::Spitter, Vec2::new(12.0, 3.0));
    sim.spawn_zombie(ZombieKind::Walker, Vec2::new(-12.0, 3.0));
    sim.record_location_visit("Hospital");
    sim.record_dangerous_encounter(false);
    sim.run(50, 0.1);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.json");
    sim.save_game().save_to_path(&path).unwrap();

    let mut restored = Simulation::new(quiet_config()).unwrap();
    restored.load_game(&SaveGame::load_from_path(&path).unwrap()).unwrap();

    assert_eq!(restored.alive_zombies(), sim.alive_zombies());
    assert_eq!(restored.profiler().preferred_location_type(), "Hospital");
    assert_eq!(restored.profiler().risk_tolerance(), 1.0);
    assert_eq!(restored.clock().current_day(), sim.clock().current_day());
    assert!((restored.clock().current_hour() - sim.clock().current_hour()).abs() < 1e-4);
}

#[test]
fn test_missing_save_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(SaveGame::load_from_path(dir.path().join("absent.json")).is_err());
}
