//! In-crate collision world
//!
//! Circle bodies for players and zombies, axis-aligned boxes for walls.
//! A sparse hash grid does the broadphase; exact shape tests decide overlap.

use ahash::AHashMap;
use ordered_float::OrderedFloat;

use crate::core::types::{EntityHandle, HandleAllocator, Layer, LayerMask, Vec2};
use crate::spatial::query::{RaycastHit, SpatialQuery};
use crate::spatial::sparse_hash::SparseHashGrid;

const DEFAULT_CELL_SIZE: f32 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Circle { radius: f32 },
    Aabb { half_extents: Vec2 },
}

#[derive(Debug, Clone, Copy)]
pub struct Body {
    pub position: Vec2,
    pub shape: Shape,
    pub layer: Layer,
}

impl Body {
    fn bounds(&self) -> (Vec2, Vec2) {
        let extent = match self.shape {
            Shape::Circle { radius } => Vec2::splat(radius),
            Shape::Aabb { half_extents } => half_extents,
        };
        (self.position - extent, self.position + extent)
    }

    fn overlaps_circle(&self, center: Vec2, radius: f32) -> bool {
        match self.shape {
            Shape::Circle { radius: r } => self.position.distance(center) <= radius + r,
            Shape::Aabb { half_extents } => {
                let (min, max) = (self.position - half_extents, self.position + half_extents);
                center.clamp(min, max).distance(center) <= radius
            }
        }
    }

    /// Entry distance along a normalized ray, if any
    fn ray_entry(&self, origin: Vec2, dir: Vec2) -> Option<f32> {
        match self.shape {
            Shape::Circle { radius } => {
                let to_origin = origin - self.position;
                let c = to_origin.length_squared() - radius * radius;
                if c <= 0.0 {
                    return None;
                }
                let b = to_origin.dot(dir);
                let disc = b * b - c;
                if b > 0.0 || disc < 0.0 {
                    return None;
                }
                Some(-b - disc.sqrt())
            }
            Shape::Aabb { half_extents } => {
                let (min, max) = (self.position - half_extents, self.position + half_extents);
                if origin.cmpge(min).all() && origin.cmple(max).all() {
                    return None;
                }
                let mut t_min = f32::NEG_INFINITY;
                let mut t_max = f32::INFINITY;
                for axis in 0..2 {
                    let (o, d, lo, hi) = (origin[axis], dir[axis], min[axis], max[axis]);
                    if d.abs() < 1e-8 {
                        if o < lo || o > hi {
                            return None;
                        }
                        continue;
                    }
                    let (mut t0, mut t1) = ((lo - o) / d, (hi - o) / d);
                    if t0 > t1 {
                        std::mem::swap(&mut t0, &mut t1);
                    }
                    t_min = t_min.max(t0);
                    t_max = t_max.min(t1);
                }
                if t_max < t_min || t_min < 0.0 {
                    None
                } else {
                    Some(t_min)
                }
            }
        }
    }
}

/// Deterministic body table with grid broadphase
#[derive(Debug, Clone)]
pub struct CollisionWorld {
    handles: HandleAllocator,
    bodies: AHashMap<EntityHandle, Body>,
    grid: SparseHashGrid,
    /// Largest circle radius ever inserted; widens circle broadphase
    max_circle_radius: f32,
}

impl CollisionWorld {
    pub fn new() -> Self {
        Self::with_cell_size(DEFAULT_CELL_SIZE)
    }

    pub fn with_cell_size(cell_size: f32) -> Self {
        Self {
            handles: HandleAllocator::new(),
            bodies: AHashMap::new(),
            grid: SparseHashGrid::new(cell_size),
            max_circle_radius: 0.0,
        }
    }

    pub fn add_circle(&mut self, position: Vec2, radius: f32, layer: Layer) -> EntityHandle {
        let radius = radius.max(0.0);
        self.max_circle_radius = self.max_circle_radius.max(radius);
        self.insert(Body { position, shape: Shape::Circle { radius }, layer })
    }

    /// Add a wall spanning the two corners
    pub fn add_box(&mut self, corner_a: Vec2, corner_b: Vec2, layer: Layer) -> EntityHandle {
        let min = corner_a.min(corner_b);
        let max = corner_a.max(corner_b);
        self.insert(Body {
            position: (min + max) * 0.5,
            shape: Shape::Aabb { half_extents: (max - min) * 0.5 },
            layer,
        })
    }

    fn insert(&mut self, body: Body) -> EntityHandle {
        let handle = self.handles.allocate();
        self.index(handle, &body);
        self.bodies.insert(handle, body);
        handle
    }

    fn index(&mut self, handle: EntityHandle, body: &Body) {
        match body.shape {
            Shape::Circle { .. } => self.grid.insert(handle, body.position),
            Shape::Aabb { .. } => {
                let (min, max) = body.bounds();
                self.grid.insert_box(handle, min, max);
            }
        }
    }

    fn unindex(&mut self, handle: EntityHandle, body: &Body) {
        match body.shape {
            Shape::Circle { .. } => self.grid.remove(handle, body.position),
            Shape::Aabb { .. } => {
                let (min, max) = body.bounds();
                self.grid.remove_box(handle, min, max);
            }
        }
    }

    /// Move a body. Returns false for stale handles.
    pub fn set_position(&mut self, handle: EntityHandle, position: Vec2) -> bool {
        let Some(body) = self.bodies.get(&handle).copied() else {
            return false;
        };
        self.unindex(handle, &body);
        let moved = Body { position, ..body };
        self.index(handle, &moved);
        self.bodies.insert(handle, moved);
        true
    }

    pub fn remove(&mut self, handle: EntityHandle) -> bool {
        let Some(body) = self.bodies.remove(&handle) else {
            return false;
        };
        self.unindex(handle, &body);
        self.handles.release(handle);
        true
    }

    pub fn body(&self, handle: EntityHandle) -> Option<&Body> {
        self.bodies.get(&handle)
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    fn candidates(&self, center: Vec2, radius: f32) -> Vec<EntityHandle> {
        self.grid.query_candidates(center, radius + self.max_circle_radius)
    }
}

impl Default for CollisionWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl SpatialQuery for CollisionWorld {
    fn query_circle(&self, center: Vec2, radius: f32, mask: LayerMask) -> Vec<EntityHandle> {
        self.candidates(center, radius)
            .into_iter()
            .filter(|handle| {
                self.bodies
                    .get(handle)
                    .map(|b| mask.contains(b.layer) && b.overlaps_circle(center, radius))
                    .unwrap_or(false)
            })
            .collect()
    }

    fn raycast(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<RaycastHit> {
        let dir = direction.normalize_or_zero();
        if dir == Vec2::ZERO || max_distance <= 0.0 {
            return None;
        }

        let half = max_distance * 0.5;
        let midpoint = origin + dir * half;

        // Candidates are handle-ordered, so min_by_key keeps the lowest
        // handle on equal distances.
        self.candidates(midpoint, half)
            .into_iter()
            .filter_map(|handle| {
                let body = self.bodies.get(&handle)?;
                if !mask.contains(body.layer) {
                    return None;
                }
                let distance = body.ray_entry(origin, dir)?;
                (distance <= max_distance).then_some(RaycastHit {
                    entity: handle,
                    point: origin + dir * distance,
                    distance,
                    layer: body.layer,
                })
            })
            .min_by_key(|hit| OrderedFloat(hit.distance))
    }

    fn position_of(&self, entity: EntityHandle) -> Option<Vec2> {
        self.bodies.get(&entity).map(|b| b.position)
    }

    fn layer_of(&self, entity: EntityHandle) -> Option<Layer> {
        self.bodies.get(&entity).map(|b| b.layer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_circle_filters_layers_and_orders_by_handle() {
        let mut world = CollisionWorld::new();
        let z = world.add_circle(Vec2::new(1.0, 0.0), 0.4, Layer::Zombie);
        let p = world.add_circle(Vec2::new(2.0, 0.0), 0.4, Layer::Player);
        let far = world.add_circle(Vec2::new(50.0, 0.0), 0.4, Layer::Player);

        let all = world.query_circle(Vec2::ZERO, 3.0, LayerMask::ALL);
        assert_eq!(all, vec![z, p]);

        let players = world.query_circle(Vec2::ZERO, 3.0, LayerMask::PLAYER);
        assert_eq!(players, vec![p]);
        assert!(!players.contains(&far));
    }

    #[test]
    fn test_box_overlap() {
        let mut world = CollisionWorld::new();
        let wall = world.add_box(Vec2::new(5.0, -5.0), Vec2::new(6.0, 5.0), Layer::Obstacle);
        assert_eq!(world.query_circle(Vec2::new(4.5, 0.0), 0.6, LayerMask::OBSTACLE), vec![wall]);
        assert!(world.query_circle(Vec2::new(3.0, 0.0), 0.6, LayerMask::OBSTACLE).is_empty());
    }

    #[test]
    fn test_raycast_reports_nearest() {
        let mut world = CollisionWorld::new();
        let near = world.add_box(Vec2::new(3.0, -1.0), Vec2::new(4.0, 1.0), Layer::Obstacle);
        let _far = world.add_circle(Vec2::new(8.0, 0.0), 0.5, Layer::Player);

        let hit = world.raycast(Vec2::ZERO, Vec2::X, 20.0, LayerMask::ALL).unwrap();
        assert_eq!(hit.entity, near);
        assert!((hit.distance - 3.0).abs() < 1e-4);
        assert_eq!(hit.layer, Layer::Obstacle);
        assert_eq!(world.layer_of(near), Some(Layer::Obstacle));

        let player_hit = world.raycast(Vec2::ZERO, Vec2::X, 20.0, LayerMask::PLAYER).unwrap();
        assert!((player_hit.distance - 7.5).abs() < 1e-4);
    }

    #[test]
    fn test_raycast_respects_max_distance_and_origin_inside() {
        let mut world = CollisionWorld::new();
        world.add_circle(Vec2::ZERO, 0.5, Layer::Zombie);
        world.add_circle(Vec2::new(10.0, 0.0), 0.5, Layer::Player);

        assert!(world.raycast(Vec2::ZERO, Vec2::X, 5.0, LayerMask::ALL).is_none());
        let hit = world.raycast(Vec2::ZERO, Vec2::X, 15.0, LayerMask::ALL).unwrap();
        assert_eq!(hit.layer, Layer::Player);
    }

    #[test]
    fn test_line_of_sight_blocked_by_wall() {
        let mut world = CollisionWorld::new();
        world.add_box(Vec2::new(2.0, -1.0), Vec2::new(2.5, 1.0), Layer::Obstacle);

        assert!(!world.line_of_sight(Vec2::ZERO, Vec2::new(5.0, 0.0), LayerMask::OBSTACLE));
        assert!(world.line_of_sight(Vec2::ZERO, Vec2::new(0.0, 5.0), LayerMask::OBSTACLE));
    }

    #[test]
    fn test_stale_handle_after_remove() {
        let mut world = CollisionWorld::new();
        let a = world.add_circle(Vec2::ZERO, 0.4, Layer::Zombie);
        assert!(world.remove(a));
        let b = world.add_circle(Vec2::ZERO, 0.4, Layer::Zombie);

        assert_eq!(a.index, b.index);
        assert!(world.position_of(a).is_none());
        assert!(!world.set_position(a, Vec2::ONE));
        assert!(world.set_position(b, Vec2::ONE));
        assert_eq!(world.query_circle(Vec2::ONE, 0.1, LayerMask::ALL), vec![b]);
    }
}
