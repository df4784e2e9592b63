// Uniform occupancy grid for bounding neighbour scans.
//
// Cleared and repopulated every frame before any agent reads it. Each cell
// holds at most `max_agents_per_cell` agent indices; further inserts into a
// full cell are dropped for that frame.

use glam::{UVec2, Vec2};

use super::math::{clamp01, lerp};

// ============================================================================
// WORLD -> CELL
// ============================================================================

/// Map a world position onto grid coordinates.
///
/// Each axis is normalized by the world extent, clamped to `[0, 1]`, scaled
/// to `[0, dim - 1]` and rounded to the nearest cell (not floored), so the
/// result is always a valid cell even for positions outside the world.
pub fn world_to_cell(pos: Vec2, world_size: Vec2, dims: UVec2) -> UVec2 {
    let axis = |coord: f32, extent: f32, dim: u32| -> u32 {
        let t = clamp01(coord / extent);
        lerp(0.0, (dim - 1) as f32, t).round() as u32
    };
    UVec2::new(
        axis(pos.x, world_size.x, dims.x),
        axis(pos.y, world_size.y, dims.y),
    )
}

// ============================================================================
// OCCUPANCY GRID
// ============================================================================

pub struct OccupancyGrid {
    cells: Vec<Vec<usize>>,
    width: u32,
    height: u32,
    max_agents_per_cell: usize,
    /// Inserts rejected by a full cell since the last `clear`.
    dropped: usize,
}

impl OccupancyGrid {
    /// Callers validate dimensions and capacity through `CrowdConfig`.
    pub fn new(width: u32, height: u32, max_agents_per_cell: usize) -> Self {
        let cells = (0..(width as usize * height as usize))
            .map(|_| Vec::with_capacity(max_agents_per_cell))
            .collect();
        Self {
            cells,
            width,
            height,
            max_agents_per_cell,
            dropped: 0,
        }
    }

    /// Empty every cell. Keeps allocations.
    pub fn clear(&mut self) {
        for c in &mut self.cells { c.clear(); }
        self.dropped = 0;
    }

    /// Row-major linear index. No bounds check.
    #[inline]
    pub fn cell_index(&self, x: u32, y: u32) -> usize {
        x as usize + y as usize * self.width as usize
    }

    /// Add `agent` to cell `(x, y)` unless that cell is already full.
    ///
    /// Returns the cell index whether or not the agent was stored. `(x, y)`
    /// must already be in range; see `world_to_cell`.
    pub fn insert(&mut self, x: u32, y: u32, agent: usize) -> usize {
        let idx = self.cell_index(x, y);
        let cell = &mut self.cells[idx];
        if cell.len() < self.max_agents_per_cell {
            cell.push(agent);
        } else {
            self.dropped += 1;
            log::trace!("cell ({x}, {y}) full, dropped agent {agent}");
        }
        idx
    }

    /// Agents stored in `(x, y)`; empty for coordinates outside the grid.
    pub fn query(&self, x: i32, y: i32) -> &[usize] {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return &[];
        }
        &self.cells[self.cell_index(x as u32, y as u32)]
    }

    /// Call `f` with every agent stored in the 3x3 block centred on `center`.
    pub fn for_each_in_block(&self, center: UVec2, mut f: impl FnMut(usize)) {
        let (cx, cy) = (center.x as i32, center.y as i32);
        for dy in -1..=1 {
            for dx in -1..=1 {
                for &k in self.query(cx + dx, cy + dy) {
                    f(k);
                }
            }
        }
    }

    #[inline]
    pub fn dimensions(&self) -> UVec2 {
        UVec2::new(self.width, self.height)
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.max_agents_per_cell
    }

    pub fn dropped_inserts(&self) -> usize {
        self.dropped
    }

    pub fn occupied_cells(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_empty()).count()
    }
}
