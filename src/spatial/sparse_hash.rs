//! Sparse hash grid for efficient spatial queries

use ahash::AHashMap;
use crate::core::types::{EntityHandle, Vec2};

/// Sparse hash grid for neighbor queries
///
/// Stores handles per cell; entities with an extent (walls) are inserted
/// into every cell their bounding box touches.
#[derive(Debug, Clone)]
pub struct SparseHashGrid {
    cell_size: f32,
    cells: AHashMap<(i32, i32), Vec<EntityHandle>>,
}

impl SparseHashGrid {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size: cell_size.max(0.001),
            cells: AHashMap::new(),
        }
    }

    #[inline]
    fn cell_coord(&self, pos: Vec2) -> (i32, i32) {
        (
            (pos.x / self.cell_size).floor() as i32,
            (pos.y / self.cell_size).floor() as i32,
        )
    }

    pub fn insert(&mut self, entity: EntityHandle, pos: Vec2) {
        let coord = self.cell_coord(pos);
        self.cells.entry(coord).or_default().push(entity);
    }

    /// Insert into every cell overlapped by the box [min, max]
    pub fn insert_box(&mut self, entity: EntityHandle, min: Vec2, max: Vec2) {
        let (x0, y0) = self.cell_coord(min);
        let (x1, y1) = self.cell_coord(max);
        for cx in x0..=x1 {
            for cy in y0..=y1 {
                self.cells.entry((cx, cy)).or_default().push(entity);
            }
        }
    }

    pub fn remove(&mut self, entity: EntityHandle, pos: Vec2) {
        let coord = self.cell_coord(pos);
        if let Some(cell) = self.cells.get_mut(&coord) {
            cell.retain(|&e| e != entity);
            if cell.is_empty() {
                self.cells.remove(&coord);
            }
        }
    }

    pub fn remove_box(&mut self, entity: EntityHandle, min: Vec2, max: Vec2) {
        let (x0, y0) = self.cell_coord(min);
        let (x1, y1) = self.cell_coord(max);
        for cx in x0..=x1 {
            for cy in y0..=y1 {
                if let Some(cell) = self.cells.get_mut(&(cx, cy)) {
                    cell.retain(|&e| e != entity);
                    if cell.is_empty() {
                        self.cells.remove(&(cx, cy));
                    }
                }
            }
        }
    }

    /// Candidate handles from every cell touched by a circle.
    ///
    /// Sorted and deduplicated; callers still do the exact shape test.
    pub fn query_candidates(&self, center: Vec2, radius: f32) -> Vec<EntityHandle> {
        let r = Vec2::splat(radius.max(0.0));
        let (x0, y0) = self.cell_coord(center - r);
        let (x1, y1) = self.cell_coord(center + r);

        let mut found = Vec::new();
        for cx in x0..=x1 {
            for cy in y0..=y1 {
                if let Some(cell) = self.cells.get(&(cx, cy)) {
                    found.extend_from_slice(cell);
                }
            }
        }
        found.sort_unstable();
        found.dedup();
        found
    }

    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(i: u32) -> EntityHandle {
        EntityHandle::new(i, 0)
    }

    #[test]
    fn test_candidates_cover_radius() {
        let mut grid = SparseHashGrid::new(4.0);
        grid.insert(handle(1), Vec2::new(0.0, 0.0));
        grid.insert(handle(2), Vec2::new(11.0, 0.0));
        grid.insert(handle(3), Vec2::new(30.0, 30.0));

        let found = grid.query_candidates(Vec2::ZERO, 12.0);
        assert_eq!(found, vec![handle(1), handle(2)]);
    }

    #[test]
    fn test_box_insert_and_remove() {
        let mut grid = SparseHashGrid::new(2.0);
        grid.insert_box(handle(7), Vec2::new(0.0, 0.0), Vec2::new(5.0, 1.0));

        assert_eq!(grid.query_candidates(Vec2::new(4.5, 0.5), 0.1), vec![handle(7)]);

        grid.remove_box(handle(7), Vec2::new(0.0, 0.0), Vec2::new(5.0, 1.0));
        assert!(grid.query_candidates(Vec2::new(4.5, 0.5), 0.1).is_empty());
    }

    #[test]
    fn test_remove_point() {
        let mut grid = SparseHashGrid::new(2.0);
        grid.insert(handle(1), Vec2::new(1.0, 1.0));
        grid.remove(handle(1), Vec2::new(1.0, 1.0));
        assert!(grid.query_candidates(Vec2::new(1.0, 1.0), 2.0).is_empty());
        assert_eq!(grid.occupied_cells(), 0);
    }
}
