//! Steering with a short forward obstacle probe

use rand::Rng;

use crate::core::types::{LayerMask, Vec2};
use crate::spatial::SpatialQuery;

/// Direction toward `destination`, bent around an obstacle if the probe hits
pub fn steer<Q: SpatialQuery + ?Sized, R: Rng + ?Sized>(
    world: &Q,
    position: Vec2,
    destination: Vec2,
    probe_distance: f32,
    avoidance_weight: f32,
    rng: &mut R,
) -> Vec2 {
    let direction = (destination - position).normalize_or_zero();
    if direction == Vec2::ZERO {
        return Vec2::ZERO;
    }
    avoid_obstacles(world, position, direction, probe_distance, avoidance_weight, rng)
}

pub fn avoid_obstacles<Q: SpatialQuery + ?Sized, R: Rng + ?Sized>(
    world: &Q,
    position: Vec2,
    direction: Vec2,
    probe_distance: f32,
    avoidance_weight: f32,
    rng: &mut R,
) -> Vec2 {
    if world
        .raycast(position, direction, probe_distance, LayerMask::OBSTACLE)
        .is_none()
    {
        return direction;
    }
    let mut avoidance = direction.perp();
    if rng.gen_bool(0.5) {
        avoidance = -avoidance;
    }
    (direction + avoidance * avoidance_weight).normalize_or_zero()
}

/// Uniform random unit vector
pub fn random_direction<R: Rng + ?Sized>(rng: &mut R) -> Vec2 {
    let angle = rng.gen_range(0.0..std::f32::consts::TAU);
    Vec2::new(angle.cos(), angle.sin())
}

/// Uniform point inside a disc
pub fn random_in_disc<R: Rng + ?Sized>(rng: &mut R, center: Vec2, radius: f32) -> Vec2 {
    let r = radius.max(0.0) * rng.gen::<f32>().sqrt();
    center + random_direction(rng) * r
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Layer;
    use crate::spatial::CollisionWorld;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_clear_path_goes_straight() {
        let world = CollisionWorld::new();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let dir = steer(&world, Vec2::ZERO, Vec2::new(10.0, 0.0), 1.0, 0.5, &mut rng);
        assert!((dir - Vec2::X).length() < 1e-6);
    }

    #[test]
    fn test_blocked_path_bends() {
        let mut world = CollisionWorld::new();
        world.add_box(Vec2::new(0.5, -2.0), Vec2::new(1.0, 2.0), Layer::Obstacle);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let dir = steer(&world, Vec2::ZERO, Vec2::new(10.0, 0.0), 1.0, 0.5, &mut rng);
        assert!((dir.length() - 1.0).abs() < 1e-5);
        assert!(dir.x > 0.0);
        // Half-weight perpendicular: |y| / x == 0.5
        assert!((dir.y.abs() / dir.x - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_arrived_is_zero() {
        let world = CollisionWorld::new();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(steer(&world, Vec2::ONE, Vec2::ONE, 1.0, 0.5, &mut rng), Vec2::ZERO);
    }

    #[test]
    fn test_random_in_disc_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        for _ in 0..100 {
            let p = random_in_disc(&mut rng, Vec2::new(3.0, 3.0), 10.0);
            assert!(p.distance(Vec2::new(3.0, 3.0)) <= 10.0 + 1e-4);
        }
    }
}
