//! Geometric query contract consumed by sensing and combat
//!
//! Implementations must be deterministic for a fixed world snapshot: the
//! same query against the same bodies returns the same handles in the same
//! order.

use crate::core::types::{EntityHandle, Layer, LayerMask, Vec2};

/// Nearest intersection along a ray
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHit {
    pub entity: EntityHandle,
    pub point: Vec2,
    pub distance: f32,
    pub layer: Layer,
}

pub trait SpatialQuery {
    /// Live bodies on `mask` overlapping the circle, ordered by handle
    fn query_circle(&self, center: Vec2, radius: f32, mask: LayerMask) -> Vec<EntityHandle>;

    /// Nearest body on `mask` hit within `max_distance`.
    ///
    /// A ray that starts inside a body does not report that body.
    fn raycast(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<RaycastHit>;

    /// Current position of a live body; `None` for stale handles
    fn position_of(&self, entity: EntityHandle) -> Option<Vec2>;

    fn layer_of(&self, entity: EntityHandle) -> Option<Layer>;

    fn is_live(&self, entity: EntityHandle) -> bool {
        self.position_of(entity).is_some()
    }

    /// True when nothing on `blockers` lies strictly between the two points
    fn line_of_sight(&self, from: Vec2, to: Vec2, blockers: LayerMask) -> bool {
        let delta = to - from;
        let distance = delta.length();
        if distance <= f32::EPSILON {
            return true;
        }
        match self.raycast(from, delta / distance, distance, blockers) {
            Some(hit) => hit.distance >= distance - 1e-4,
            None => true,
        }
    }
}
