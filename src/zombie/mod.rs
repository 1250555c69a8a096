//! Zombie agents: senses, state machine, combat, pooling and spawning

pub mod agent;
pub mod combat;
pub mod kind;
pub mod movement;
pub mod pool;
pub mod senses;
pub mod spawner;
pub mod state;

pub use agent::{AgentContext, AgentId, AgentSignal, DamageOutcome, InvestigateSeed, ZombieAgent};
pub use combat::{DamageSink, StatusEffect, Strike};
pub use kind::{KindModifiers, ZombieKind, ZombieStats};
pub use pool::ZombiePool;
pub use senses::{HeardSound, SoundMemory};
pub use spawner::{SpawnContext, SpawnCounters, WavePhase, ZombieSpawner};
pub use state::{Transition, TransitionInputs, ZombieState};
