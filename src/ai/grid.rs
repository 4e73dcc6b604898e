//! 2D navigation grid
//!
//! Fixed-size cells with a walkable flag. Cell `(x, y)` sits at world
//! position `(x * cell_size, y * cell_size)`.

use glam::Vec2;
use smallvec::SmallVec;

use crate::core::GridConfig;

/// Neighbor offsets: cardinal first, then diagonal.
const DIRECTIONS: [(i32, i32); 8] = [
    (-1, 0),
    (1, 0),
    (0, -1),
    (0, 1),
    (-1, -1),
    (-1, 1),
    (1, -1),
    (1, 1),
];

/// A single grid cell
#[derive(Debug, Clone, PartialEq)]
pub struct PathNode {
    /// Column
    pub x: i32,
    /// Row
    pub y: i32,
    /// World position of the cell
    pub position: Vec2,
    /// Whether agents may enter this cell
    pub walkable: bool,
}

impl PathNode {
    /// Grid coordinates of this cell
    #[must_use]
    pub fn coords(&self) -> (i32, i32) {
        (self.x, self.y)
    }
}

/// A 2D navigation grid
#[derive(Debug, Clone)]
pub struct Grid {
    width: i32,
    height: i32,
    cell_size: f32,
    /// Row-major cells
    nodes: Vec<PathNode>,
}

impl Grid {
    /// Create a new grid (all cells walkable by default)
    #[must_use]
    pub fn new(width: usize, height: usize, cell_size: f32) -> Self {
        let width = i32::try_from(width).unwrap_or(i32::MAX);
        let height = i32::try_from(height).unwrap_or(i32::MAX);

        let mut nodes = Vec::with_capacity((width as usize) * (height as usize));
        for y in 0..height {
            for x in 0..width {
                nodes.push(PathNode {
                    x,
                    y,
                    position: Vec2::new(x as f32 * cell_size, y as f32 * cell_size),
                    walkable: true,
                });
            }
        }

        Self {
            width,
            height,
            cell_size,
            nodes,
        }
    }

    /// Build a grid from configuration, applying its blocked cells.
    ///
    /// A cell size that is not a positive finite number falls back to the
    /// default. Blocked cells outside the grid are skipped.
    #[must_use]
    pub fn from_config(config: &GridConfig) -> Self {
        let cell_size = if config.cell_size.is_finite() && config.cell_size > 0.0 {
            config.cell_size
        } else {
            let fallback = GridConfig::default().cell_size;
            log::warn!("Invalid cell size {}, using {fallback}", config.cell_size);
            fallback
        };

        let mut grid = Self::new(config.width, config.height, cell_size);
        for &(x, y) in &config.blocked {
            if !grid.set_walkable(x, y, false) {
                log::debug!("Skipping blocked cell ({x}, {y}) outside the grid");
            }
        }
        grid
    }

    /// Width in cells
    #[must_use]
    pub fn width(&self) -> usize {
        self.width as usize
    }

    /// Height in cells
    #[must_use]
    pub fn height(&self) -> usize {
        self.height as usize
    }

    /// Cell size in world units
    #[must_use]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Check whether coordinates fall inside the grid
    #[must_use]
    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width && y >= 0 && y < self.height
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> usize {
        (y * self.width + x) as usize
    }

    /// Set a cell's walkability.
    ///
    /// Out-of-range coordinates are ignored and `false` is returned.
    pub fn set_walkable(&mut self, x: i32, y: i32, walkable: bool) -> bool {
        if !self.in_bounds(x, y) {
            return false;
        }
        let index = self.index(x, y);
        self.nodes[index].walkable = walkable;
        true
    }

    /// Check if a cell is walkable (out-of-range cells are not)
    #[must_use]
    pub fn is_walkable(&self, x: i32, y: i32) -> bool {
        self.node(x, y).is_some_and(|node| node.walkable)
    }

    /// Look up a cell by grid coordinates
    #[must_use]
    pub fn node(&self, x: i32, y: i32) -> Option<&PathNode> {
        if self.in_bounds(x, y) {
            Some(&self.nodes[self.index(x, y)])
        } else {
            None
        }
    }

    /// Look up the cell containing a world position.
    ///
    /// Non-finite positions lie in no cell.
    #[must_use]
    pub fn get_node(&self, position: Vec2) -> Option<&PathNode> {
        if !position.is_finite() {
            return None;
        }
        let (x, y) = self.world_to_grid(position);
        self.node(x, y)
    }

    /// Convert world position to grid coordinates
    #[must_use]
    pub fn world_to_grid(&self, pos: Vec2) -> (i32, i32) {
        (
            (pos.x / self.cell_size).floor() as i32,
            (pos.y / self.cell_size).floor() as i32,
        )
    }

    /// Convert grid coordinates to world position
    #[must_use]
    pub fn grid_to_world(&self, x: i32, y: i32) -> Vec2 {
        Vec2::new(x as f32 * self.cell_size, y as f32 * self.cell_size)
    }

    /// In-bounds neighbors of a cell (8-directional).
    ///
    /// Walkability of the neighbor itself is not filtered here. With
    /// `cut_corners` off, a diagonal is dropped unless both cardinal cells
    /// flanking it are walkable.
    #[must_use]
    pub fn neighbors(&self, x: i32, y: i32, cut_corners: bool) -> SmallVec<[&PathNode; 8]> {
        let mut result = SmallVec::new();

        for (dx, dy) in DIRECTIONS {
            let Some(node) = self.node(x + dx, y + dy) else {
                continue;
            };

            let diagonal = dx != 0 && dy != 0;
            if diagonal
                && !cut_corners
                && !(self.is_walkable(x + dx, y) && self.is_walkable(x, y + dy))
            {
                continue;
            }

            result.push(node);
        }

        result
    }

    /// Iterate over all cells in row-major order
    pub fn nodes(&self) -> impl Iterator<Item = &PathNode> {
        self.nodes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_grid_all_walkable() {
        let grid = Grid::new(4, 3, 2.0);

        assert_eq!(grid.width(), 4);
        assert_eq!(grid.height(), 3);
        assert_eq!(grid.nodes().count(), 12);
        assert!(grid.nodes().all(|n| n.walkable));
    }

    #[test]
    fn test_node_position_scales_with_cell_size() {
        let grid = Grid::new(4, 4, 2.0);

        let node = grid.node(3, 1).unwrap();
        assert_eq!(node.coords(), (3, 1));
        assert_eq!(node.position, Vec2::new(6.0, 2.0));
    }

    #[test]
    fn test_set_walkable_out_of_range_ignored() {
        let mut grid = Grid::new(3, 3, 1.0);

        assert!(!grid.set_walkable(-1, 0, false));
        assert!(!grid.set_walkable(3, 0, false));
        assert!(!grid.set_walkable(0, 7, false));
        assert!(grid.set_walkable(2, 2, true));

        assert!(grid.nodes().all(|n| n.walkable));
        assert!(!grid.is_walkable(-1, 0));
    }

    #[test]
    fn test_get_node_floors_position() {
        let mut grid = Grid::new(5, 5, 2.0);
        grid.set_walkable(1, 2, false);

        let node = grid.get_node(Vec2::new(3.9, 4.1)).unwrap();
        assert_eq!(node.coords(), (1, 2));
        assert!(!node.walkable);

        assert!(grid.get_node(Vec2::new(-0.5, 1.0)).is_none());
        assert!(grid.get_node(Vec2::new(10.0, 1.0)).is_none());
    }

    #[test]
    fn test_get_node_rejects_non_finite() {
        let grid = Grid::new(5, 5, 1.0);

        assert!(grid.get_node(Vec2::new(f32::NAN, f32::NAN)).is_none());
        assert!(grid.get_node(Vec2::new(f32::NAN, 2.0)).is_none());
        assert!(grid.get_node(Vec2::new(1.0, f32::INFINITY)).is_none());
        assert!(grid.get_node(Vec2::new(f32::NEG_INFINITY, 0.0)).is_none());
    }

    #[test]
    fn test_neighbors_at_corner() {
        let grid = Grid::new(3, 3, 1.0);

        let coords: Vec<_> = grid.neighbors(0, 0, true).iter().map(|n| n.coords()).collect();
        assert_eq!(coords, vec![(1, 0), (0, 1), (1, 1)]);

        assert_eq!(grid.neighbors(1, 1, true).len(), 8);
    }

    #[test]
    fn test_neighbors_without_corner_cutting() {
        let mut grid = Grid::new(3, 3, 1.0);
        grid.set_walkable(1, 0, false);

        let with: Vec<_> = grid.neighbors(0, 0, true).iter().map(|n| n.coords()).collect();
        assert!(with.contains(&(1, 1)));

        let without: Vec<_> = grid.neighbors(0, 0, false).iter().map(|n| n.coords()).collect();
        assert!(!without.contains(&(1, 1)));
        // Blocked cardinal neighbor is still reported; the search filters it
        assert!(without.contains(&(1, 0)));
    }

    #[test]
    fn test_from_config() {
        let config = GridConfig {
            width: 4,
            height: 4,
            cell_size: 0.5,
            blocked: vec![(1, 1), (2, 2), (9, 9)],
        };

        let grid = Grid::from_config(&config);
        assert_eq!(grid.cell_size(), 0.5);
        assert!(!grid.is_walkable(1, 1));
        assert!(!grid.is_walkable(2, 2));
        assert!(grid.is_walkable(0, 0));
        // (9, 9) is skipped without touching any in-range cell
        assert_eq!(grid.nodes().filter(|n| !n.walkable).count(), 2);
    }

    #[test]
    fn test_from_config_rejects_bad_cell_size() {
        for cell_size in [0.0, -2.0, f32::NAN, f32::INFINITY] {
            let config = GridConfig {
                width: 3,
                height: 3,
                cell_size,
                blocked: Vec::new(),
            };

            let grid = Grid::from_config(&config);
            assert_eq!(grid.cell_size(), 1.0);
            assert_eq!(grid.node(2, 1).unwrap().position, Vec2::new(2.0, 1.0));
        }
    }
}
