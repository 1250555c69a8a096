//! Vision, smell and hearing
//!
//! Each channel is evaluated independently; the agent fuses them with the
//! precedence vision > hearing memory > smell.

use ordered_float::OrderedFloat;
use std::collections::VecDeque;

use crate::core::types::{angle_between_degrees, EntityHandle, LayerMask, SimTime, Vec2};
use crate::spatial::SpatialQuery;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeardSound {
    pub position: Vec2,
    pub intensity: f32,
    pub timestamp: SimTime,
}

/// Time-decaying queue of heard sounds
#[derive(Debug, Clone)]
pub struct SoundMemory {
    entries: VecDeque<HeardSound>,
    capacity: usize,
}

impl SoundMemory {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn remember(&mut self, position: Vec2, intensity: f32, now: SimTime) {
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(HeardSound {
            position,
            intensity,
            timestamp: now,
        });
    }

    /// Drop entries older than `duration`
    pub fn prune(&mut self, now: SimTime, duration: f32) {
        self.entries.retain(|s| now - s.timestamp <= duration);
    }

    pub fn most_recent(&self) -> Option<&HeardSound> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HeardSound> {
        self.entries.iter()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// A sound is heard iff `distance <= hearing_range * intensity`
pub fn can_hear(listener: Vec2, source: Vec2, intensity: f32, hearing_range: f32) -> bool {
    listener.distance(source) <= hearing_range * intensity
}

/// A visible candidate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sighting {
    pub entity: EntityHandle,
    pub position: Vec2,
}

/// First player inside the vision cone with an unobstructed line of sight.
///
/// Candidates are checked in spatial-query order, which is handle order.
pub fn scan_vision<Q: SpatialQuery + ?Sized>(
    world: &Q,
    eye: Vec2,
    facing: Vec2,
    range: f32,
    angle: f32,
) -> Option<Sighting> {
    let half_angle = angle * 0.5;
    world
        .query_circle(eye, range, LayerMask::PLAYER)
        .into_iter()
        .filter_map(|entity| world.position_of(entity).map(|position| Sighting { entity, position }))
        .find(|s| {
            let to_target = s.position - eye;
            let in_cone = to_target.length_squared() <= f32::EPSILON
                || angle_between_degrees(facing, to_target) <= half_angle;
            in_cone && world.line_of_sight(eye, s.position, LayerMask::OBSTACLE)
        })
}

/// Nearest player within smell range. Walls do not block smell.
pub fn sniff<Q: SpatialQuery + ?Sized>(world: &Q, position: Vec2, range: f32) -> Option<Sighting> {
    world
        .query_circle(position, range, LayerMask::PLAYER)
        .into_iter()
        .filter_map(|entity| world.position_of(entity).map(|p| Sighting { entity, position: p }))
        .filter(|s| s.position.distance(position) <= range)
        .min_by_key(|s| OrderedFloat(s.position.distance(position)))
}
