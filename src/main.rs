//! Shambler - headless scenario runner
//!
//! Builds a small walled arena with one survivor walking a loop, lets the
//! spawner and zombies run for a number of ticks and prints a summary.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use shambler::core::types::Vec2;
use shambler::profiler::CombatStyle;
use shambler::sound::SoundKind;
use shambler::zombie::ZombieKind;
use shambler::{Result, SimEvent, Simulation, SimulationConfig};

#[derive(Parser, Debug)]
#[command(name = "shambler", about = "Run a headless zombie simulation")]
struct Args {
    /// TOML config file; missing keys fall back to defaults
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, default_value_t = 600)]
    ticks: u64,

    /// Seconds per tick
    #[arg(long, default_value_t = 0.1)]
    dt: f32,

    /// Overrides the config seed
    #[arg(long)]
    seed: Option<u64>,

    /// Zombies placed at start in addition to the spawner's
    #[arg(long, default_value_t = 8)]
    zombies: usize,

    /// Route zombies through the adaptive decision layer
    #[arg(long)]
    adaptive: bool,

    /// Write a save file when the run ends
    #[arg(long)]
    save: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("shambler=info")))
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    let mut sim = Simulation::new(config)?;
    build_arena(&mut sim, args.zombies);
    if args.adaptive {
        sim.enable_heuristic_adaptive();
    }

    tracing::info!("Running {} ticks at dt {}", args.ticks, args.dt);
    let mut deaths = 0;
    for tick in 0..args.ticks {
        steer_survivor(&mut sim, tick, args.dt);
        sim.tick(args.dt);

        // Every few seconds the survivor fights back
        if tick % 50 == 49 {
            survivor_attacks(&mut sim);
        }
        deaths += sim
            .drain_events()
            .iter()
            .filter(|e| matches!(e, SimEvent::Died { .. }))
            .count();

        if sim.primary_survivor().is_none() {
            tracing::info!("Survivor fell at tick {}", tick);
            break;
        }
    }

    print_summary(&sim, deaths);

    if let Some(path) = &args.save {
        sim.save_game().save_to_path(path)?;
    }
    Ok(())
}

fn build_arena(sim: &mut Simulation, zombies: usize) {
    sim.add_wall(Vec2::new(-30.0, -31.0), Vec2::new(30.0, -30.0));
    sim.add_wall(Vec2::new(-30.0, 30.0), Vec2::new(30.0, 31.0));
    sim.add_wall(Vec2::new(-31.0, -30.0), Vec2::new(-30.0, 30.0));
    sim.add_wall(Vec2::new(30.0, -30.0), Vec2::new(31.0, 30.0));
    sim.add_wall(Vec2::new(-5.0, -2.0), Vec2::new(5.0, 2.0));

    sim.add_survivor(Vec2::new(0.0, -15.0));
    for i in 0..zombies {
        let angle = i as f32 / zombies.max(1) as f32 * std::f32::consts::TAU;
        let kind = if i % 4 == 3 { ZombieKind::Runner } else { ZombieKind::Walker };
        sim.spawn_zombie(kind, Vec2::from_angle(angle) * 22.0);
    }
}

/// Walk a circle around the central wall, crouching half the time
fn steer_survivor(sim: &mut Simulation, tick: u64, dt: f32) {
    let t = tick as f32 * dt;
    let Some(survivor) = sim.survivor_mut(0) else {
        return;
    };
    let heading = Vec2::from_angle(t * 0.2 + std::f32::consts::FRAC_PI_2);
    survivor.velocity = heading * 3.0;
    survivor.crouching = (t as u32 / 20) % 2 == 1;
    if tick % 5 == 0 {
        sim.survivor_footstep(0);
    }
}

fn survivor_attacks(sim: &mut Simulation) {
    let Some(position) = sim.primary_survivor().map(|s| s.position) else {
        return;
    };
    let nearest = sim
        .zombies()
        .iter()
        .filter(|z| !z.is_dead())
        .map(|z| (z.id, z.position.distance(position)))
        .min_by(|a, b| a.1.total_cmp(&b.1));
    let Some((id, distance)) = nearest else {
        return;
    };
    if distance < 3.0 {
        sim.player_attack(CombatStyle::Melee, id, 25.0);
        sim.emit_sound(SoundKind::MeleeHit, position);
    } else if distance < 20.0 {
        sim.player_attack(CombatStyle::Ranged, id, 35.0);
        sim.emit_sound(SoundKind::Gunshot, position);
    }
}

fn print_summary(sim: &Simulation, deaths: usize) {
    let stats = sim.stats();
    let profiler = sim.profiler();
    println!();
    println!("=== SHAMBLER RUN ===");
    println!("Day {} {}", sim.clock().current_day(), sim.clock().time_string());
    println!("Ticks: {}  Wave: {}", stats.ticks, sim.spawner().current_wave());
    println!(
        "Zombies: {} alive, {} spawned, {} killed ({} deaths seen), {} loot drops",
        sim.alive_zombies(),
        stats.spawned,
        stats.kills,
        deaths,
        stats.loot_drops
    );
    println!(
        "Strikes on survivors: {} for {:.1} damage, {} alerts",
        stats.strikes, stats.damage_to_survivors, stats.alerts
    );
    if let Some(layer) = sim.adaptive() {
        println!("Adaptive policy: {}  episodes ended: {}", layer.policy_name(), stats.episodes_completed);
    }
    println!();
    println!("Player profile:");
    println!("  Preferred combat: {:?}", profiler.preferred_combat_style());
    println!("  Risk tolerance:   {:.2}", profiler.risk_tolerance());
    println!("  Prefers stealth:  {}", profiler.prefers_stealth());
    println!("  Distance walked:  {:.1}", profiler.total_distance());
    for pattern in profiler.dominant_patterns() {
        println!("  Dominant: {}", pattern.name());
    }
}
