//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

pub use glam::Vec2;

/// Generational handle into an entity table
///
/// A handle stays valid only while its slot holds the same generation.
/// Pooled agents reuse slots, so holders must re-validate before every use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityHandle {
    pub index: u32,
    pub generation: u32,
}

impl EntityHandle {
    pub fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }
}

impl std::fmt::Display for EntityHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

/// Allocates generational handles and tracks which are live
#[derive(Debug, Clone, Default)]
pub struct HandleAllocator {
    generations: Vec<u32>,
    live: Vec<bool>,
    free: Vec<u32>,
}

impl HandleAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self) -> EntityHandle {
        if let Some(index) = self.free.pop() {
            let slot = index as usize;
            self.generations[slot] += 1;
            self.live[slot] = true;
            return EntityHandle::new(index, self.generations[slot]);
        }
        let index = self.generations.len() as u32;
        self.generations.push(0);
        self.live.push(true);
        EntityHandle::new(index, 0)
    }

    /// Release a handle. Releasing a stale handle does nothing.
    pub fn release(&mut self, handle: EntityHandle) -> bool {
        if !self.is_live(handle) {
            return false;
        }
        self.live[handle.index as usize] = false;
        self.free.push(handle.index);
        true
    }

    pub fn is_live(&self, handle: EntityHandle) -> bool {
        let slot = handle.index as usize;
        slot < self.generations.len()
            && self.live[slot]
            && self.generations[slot] == handle.generation
    }

    pub fn live_count(&self) -> usize {
        self.live.iter().filter(|l| **l).count()
    }
}

/// Collision layer an entity body lives on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Layer {
    Player,
    Zombie,
    Obstacle,
}

impl Layer {
    pub fn mask(self) -> LayerMask {
        match self {
            Layer::Player => LayerMask::PLAYER,
            Layer::Zombie => LayerMask::ZOMBIE,
            Layer::Obstacle => LayerMask::OBSTACLE,
        }
    }
}

/// Set of layers a query is allowed to see
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const NONE: LayerMask = LayerMask(0);
    pub const PLAYER: LayerMask = LayerMask(1);
    pub const ZOMBIE: LayerMask = LayerMask(1 << 1);
    pub const OBSTACLE: LayerMask = LayerMask(1 << 2);
    pub const ALL: LayerMask = LayerMask(0b111);

    pub fn contains(self, layer: Layer) -> bool {
        self.0 & layer.mask().0 != 0
    }
}

impl std::ops::BitOr for LayerMask {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        LayerMask(self.0 | rhs.0)
    }
}

/// Simulation time in seconds since the simulation started
pub type SimTime = f32;

/// Unit vector for an angle in degrees, measured counter-clockwise from +X
pub fn direction_from_degrees(degrees: f32) -> Vec2 {
    let radians = degrees.to_radians();
    Vec2::new(radians.cos(), radians.sin())
}

/// Unsigned angle between two vectors in degrees (0..=180)
pub fn angle_between_degrees(a: Vec2, b: Vec2) -> f32 {
    let a = a.normalize_or_zero();
    let b = b.normalize_or_zero();
    if a == Vec2::ZERO || b == Vec2::ZERO {
        return 0.0;
    }
    a.dot(b).clamp(-1.0, 1.0).acos().to_degrees()
}
