//! Spatial queries: broadphase grid, query contract and collision world

pub mod query;
pub mod sparse_hash;
pub mod world;

pub use query::{RaycastHit, SpatialQuery};
pub use sparse_hash::SparseHashGrid;
pub use world::{Body, CollisionWorld, Shape};
