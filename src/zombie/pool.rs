//! Per-kind free lists of reusable agents

use ahash::AHashMap;
use rand::Rng;

use crate::core::config::{SenseConfig, ZombieConfig};
use crate::core::types::Vec2;
use crate::zombie::agent::{AgentId, ZombieAgent};
use crate::zombie::kind::{ZombieKind, ZombieStats};

#[derive(Debug, Default)]
pub struct ZombiePool {
    free: AHashMap<ZombieKind, Vec<ZombieAgent>>,
    next_id: AgentId,
    /// Agents created because a free list was empty
    fresh_allocations: u64,
}

impl ZombiePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pool with `per_kind` idle agents of every kind
    pub fn prefilled<R: Rng + ?Sized>(
        per_kind: usize,
        zombie: &ZombieConfig,
        senses: &SenseConfig,
        rng: &mut R,
    ) -> Self {
        let mut pool = Self::new();
        for kind in ZombieKind::ALL {
            let stats = ZombieStats::for_kind(kind, zombie, senses);
            let list: Vec<ZombieAgent> = (0..per_kind)
                .map(|_| {
                    let id = pool.take_id();
                    ZombieAgent::new(id, kind, stats, Vec2::ZERO, senses, rng)
                })
                .collect();
            pool.free.insert(kind, list);
        }
        tracing::debug!("Zombie pool prefilled with {} agents per kind", per_kind);
        pool
    }

    fn take_id(&mut self) -> AgentId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Take an agent of `kind`, reset for a spawn at `position`.
    /// An empty free list falls back to a fresh allocation.
    pub fn acquire<R: Rng + ?Sized>(
        &mut self,
        kind: ZombieKind,
        stats: ZombieStats,
        position: Vec2,
        senses: &SenseConfig,
        rng: &mut R,
    ) -> ZombieAgent {
        match self.free.get_mut(&kind).and_then(|list| list.pop()) {
            Some(mut agent) => {
                agent.respawn(kind, stats, position, senses, rng);
                agent
            }
            None => {
                self.fresh_allocations += 1;
                let id = self.take_id();
                tracing::debug!("Pool for {} exhausted, allocating agent {}", kind, id);
                ZombieAgent::new(id, kind, stats, position, senses, rng)
            }
        }
    }

    /// Return an agent to its kind's free list
    pub fn release(&mut self, mut agent: ZombieAgent) {
        agent.set_body(None);
        self.free.entry(agent.kind).or_default().push(agent);
    }

    pub fn available(&self, kind: ZombieKind) -> usize {
        self.free.get(&kind).map(|l| l.len()).unwrap_or(0)
    }

    pub fn total_available(&self) -> usize {
        self.free.values().map(|l| l.len()).sum()
    }

    pub fn fresh_allocations(&self) -> u64 {
        self.fresh_allocations
    }

    /// Reserve an id for an agent created outside the pool
    pub fn next_agent_id(&mut self) -> AgentId {
        self.take_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_exhausted_pool_allocates_fresh() {
        let zc = ZombieConfig::default();
        let sc = SenseConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut pool = ZombiePool::prefilled(1, &zc, &sc, &mut rng);
        assert_eq!(pool.available(ZombieKind::Runner), 1);

        let stats = ZombieStats::for_kind(ZombieKind::Runner, &zc, &sc);
        let a = pool.acquire(ZombieKind::Runner, stats, Vec2::new(3.0, 4.0), &sc, &mut rng);
        assert_eq!(a.position, Vec2::new(3.0, 4.0));
        assert_eq!(pool.fresh_allocations(), 0);

        let b = pool.acquire(ZombieKind::Runner, stats, Vec2::ZERO, &sc, &mut rng);
        assert_eq!(pool.fresh_allocations(), 1);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_release_reuses_identity() {
        let zc = ZombieConfig::default();
        let sc = SenseConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut pool = ZombiePool::new();

        let stats = ZombieStats::for_kind(ZombieKind::Walker, &zc, &sc);
        let agent = pool.acquire(ZombieKind::Walker, stats, Vec2::ZERO, &sc, &mut rng);
        let id = agent.id;
        pool.release(agent);
        assert_eq!(pool.total_available(), 1);

        let again = pool.acquire(ZombieKind::Walker, stats, Vec2::ONE, &sc, &mut rng);
        assert_eq!(again.id, id);
        assert_eq!(again.health(), stats.max_health);
        assert!(!again.is_dead());
    }
}
