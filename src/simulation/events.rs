//! Outgoing notifications
//!
//! Events are queued in the order they happen within a tick and drained by
//! the caller. Nothing inside the simulation reads them back.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::core::types::{EntityHandle, Vec2};
use crate::decision::EpisodeEnd;
use crate::sound::SoundKind;
use crate::zombie::{AgentId, ZombieKind, ZombieState};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    /// A zombie entered the roster
    Spawned {
        zombie: AgentId,
        kind: ZombieKind,
        position: Vec2,
    },
    StateEntered {
        zombie: AgentId,
        from: ZombieState,
        to: ZombieState,
    },
    /// A zombie strike landed on a survivor
    DamageDealt {
        zombie: AgentId,
        target: EntityHandle,
        amount: f32,
    },
    DamageTaken {
        zombie: AgentId,
        amount: f32,
        source: Vec2,
    },
    /// Fired exactly once per death
    Died {
        zombie: AgentId,
        kind: ZombieKind,
        position: Vec2,
        loot_dropped: bool,
    },
    /// A sound was emitted; `listeners` zombies accepted it
    SoundEmitted {
        kind: SoundKind,
        position: Vec2,
        listeners: usize,
    },
    EpisodeEnded {
        zombie: AgentId,
        end: EpisodeEnd,
        reward: f32,
    },
    /// The pooled agent left the world after its corpse delay
    Despawned {
        zombie: AgentId,
    },
}

impl SimEvent {
    /// The zombie this event is about, if any
    pub fn subject(&self) -> Option<AgentId> {
        match self {
            SimEvent::Spawned { zombie, .. }
            | SimEvent::StateEntered { zombie, .. }
            | SimEvent::DamageDealt { zombie, .. }
            | SimEvent::DamageTaken { zombie, .. }
            | SimEvent::Died { zombie, .. }
            | SimEvent::EpisodeEnded { zombie, .. }
            | SimEvent::Despawned { zombie } => Some(*zombie),
            SimEvent::SoundEmitted { .. } => None,
        }
    }
}

/// FIFO event queue
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    events: VecDeque<SimEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: SimEvent) {
        self.events.push_back(event);
    }

    pub fn drain(&mut self) -> impl Iterator<Item = SimEvent> + '_ {
        self.events.drain(..)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SimEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let mut queue = EventQueue::new();
        queue.push(SimEvent::Despawned { zombie: 1 });
        queue.push(SimEvent::Despawned { zombie: 2 });
        queue.push(SimEvent::SoundEmitted {
            kind: SoundKind::Gunshot,
            position: Vec2::ZERO,
            listeners: 0,
        });

        let subjects: Vec<_> = queue.drain().map(|e| e.subject()).collect();
        assert_eq!(subjects, vec![Some(1), Some(2), None]);
        assert!(queue.is_empty());
    }
}
