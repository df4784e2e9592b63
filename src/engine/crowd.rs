// The simulation core: agents, shared directions, the occupancy grid and the
// per-frame scratch that ties them together.
//
// One `advance` runs in fixed phases:
//   1. clear the grid and insert every agent at its frame-start position
//   2. integrate positions and facings with last frame's velocities
//   3. with positions and grid frozen, score and steer each agent
// Phase 3 only reads shared state, so per-agent results do not depend on
// iteration order.

use glam::{UVec2, Vec2};
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::agents::AgentStore;
use super::config::CrowdConfig;
use super::debug::FrameStats;
use super::directions::DirectionSet;
use super::error::CrowdError;
use super::occupancy::{OccupancyGrid, world_to_cell};
use super::steering::{StepContext, integrate, steer_agent};

/// Per-frame working state. Nothing here survives into the next frame's
/// results; it is kept only to reuse allocations and for inspection.
struct FrameScratch {
    /// Cell coordinates each agent was inserted into.
    cells: Vec<UVec2>,
    /// Linear cell index from `OccupancyGrid::insert`, `None` before the
    /// first frame.
    cell_index: Vec<Option<usize>>,
    obstacles: Vec<(Vec2, f32)>,
}

impl FrameScratch {
    fn new(count: usize) -> Self {
        Self {
            cells: vec![UVec2::ZERO; count],
            cell_index: vec![None; count],
            obstacles: Vec::new(),
        }
    }
}

pub struct Crowd {
    agents: AgentStore,
    directions: DirectionSet,
    grid: OccupancyGrid,
    world_size: Vec2,
    danger_threshold: f32,
    scratch: FrameScratch,
    frame: u64,
}

impl Crowd {
    /// Assemble a crowd from pre-built parts.
    ///
    /// Fails if the direction set and the agents' score rows disagree on
    /// resolution, or if `config` is invalid. `config.agent_count` and the
    /// speed range are ignored; `agents` is taken as-is.
    pub fn new(
        config: &CrowdConfig,
        directions: DirectionSet,
        agents: AgentStore,
    ) -> Result<Self, CrowdError> {
        config.validate()?;
        if directions.resolution() != agents.resolution() {
            return Err(CrowdError::ResolutionMismatch {
                directions: directions.resolution(),
                agents: agents.resolution(),
            });
        }
        let grid = OccupancyGrid::new(
            config.grid_width,
            config.grid_height,
            config.max_agents_per_cell,
        );
        let scratch = FrameScratch::new(agents.len());
        log::debug!(
            "crowd ready: {} agents, {} directions, {}x{} grid",
            agents.len(),
            directions.resolution(),
            config.grid_width,
            config.grid_height,
        );
        Ok(Self {
            agents,
            directions,
            grid,
            world_size: config.world_size,
            danger_threshold: config.danger_threshold,
            scratch,
            frame: 0,
        })
    }

    /// `config.agent_count` random agents drawn from `rng`.
    pub fn spawn_random<R: rand::Rng + ?Sized>(
        config: &CrowdConfig,
        rng: &mut R,
    ) -> Result<Self, CrowdError> {
        config.validate()?;
        let directions = DirectionSet::new(config.resolution)?;
        let agents = AgentStore::random(rng, config)?;
        Self::new(config, directions, agents)
    }

    /// `spawn_random` with a `StdRng` seeded from `config.seed`.
    pub fn spawn_seeded(config: &CrowdConfig) -> Result<Self, CrowdError> {
        let mut rng = StdRng::seed_from_u64(config.seed);
        Self::spawn_random(config, &mut rng)
    }

    /// Run one simulation step toward `target` over `dt` seconds.
    ///
    /// `dt == 0` leaves positions and velocities unchanged but still
    /// refreshes the score maps.
    pub fn advance(&mut self, target: Vec2, dt: f32) -> FrameStats {
        self.populate_grid();

        let res = self.directions.resolution();
        let cols = self.agents.columns_mut();

        for ((pos, facing), &vel) in cols
            .position
            .iter_mut()
            .zip(cols.facing.iter_mut())
            .zip(cols.velocity.iter())
        {
            integrate(pos, facing, vel, dt);
        }

        let ctx = StepContext {
            directions: &self.directions,
            grid: &self.grid,
            positions: cols.position,
            cells: &self.scratch.cells,
            target,
            danger_threshold: self.danger_threshold,
        };
        let rows = cols
            .interest
            .chunks_exact_mut(res)
            .zip(cols.danger.chunks_exact_mut(res));
        for (i, (interest, danger)) in rows.enumerate() {
            cols.velocity[i] = steer_agent(
                &ctx,
                i,
                cols.velocity[i],
                cols.max_speed[i],
                dt,
                interest,
                danger,
                &mut self.scratch.obstacles,
            );
        }

        self.frame += 1;
        let stats = self.frame_stats();
        if stats.dropped_inserts > 0 {
            log::debug!(
                "frame {}: {} agents dropped from full cells",
                self.frame,
                stats.dropped_inserts
            );
        }
        stats
    }

    fn populate_grid(&mut self) {
        self.grid.clear();
        let dims = self.grid.dimensions();
        for (i, &p) in self.agents.positions().iter().enumerate() {
            let cell = world_to_cell(p, self.world_size, dims);
            self.scratch.cells[i] = cell;
            self.scratch.cell_index[i] = Some(self.grid.insert(cell.x, cell.y, i));
        }
    }

    fn frame_stats(&self) -> FrameStats {
        let count = self.agents.len();
        let mean_speed = if count == 0 {
            0.0
        } else {
            self.agents.velocities().iter().map(|v| v.length()).sum::<f32>() / count as f32
        };
        FrameStats {
            agents: count,
            occupied_cells: self.grid.occupied_cells(),
            dropped_inserts: self.grid.dropped_inserts(),
            mean_speed,
        }
    }

    // ------------------------------------------------------------------------
    // Read access
    // ------------------------------------------------------------------------

    #[inline]
    pub fn count(&self) -> usize {
        self.agents.len()
    }

    pub fn position(&self, i: usize) -> Vec2 {
        self.agents.positions()[i]
    }

    pub fn velocity(&self, i: usize) -> Vec2 {
        self.agents.velocities()[i]
    }

    pub fn facing(&self, i: usize) -> Vec2 {
        self.agents.facings()[i]
    }

    pub fn max_speed(&self, i: usize) -> f32 {
        self.agents.max_speeds()[i]
    }

    pub fn interest(&self, i: usize) -> &[u8] {
        self.agents.interest().row(i)
    }

    pub fn danger(&self, i: usize) -> &[u8] {
        self.agents.danger().row(i)
    }

    /// Cell index agent `i` was last inserted into, `None` before the first
    /// `advance`.
    pub fn grid_cell(&self, i: usize) -> Option<usize> {
        self.scratch.cell_index[i]
    }

    pub fn positions(&self) -> &[Vec2] {
        self.agents.positions()
    }

    pub fn agents(&self) -> &AgentStore {
        &self.agents
    }

    pub fn directions(&self) -> &DirectionSet {
        &self.directions
    }

    pub fn grid(&self) -> &OccupancyGrid {
        &self.grid
    }

    pub fn world_size(&self) -> Vec2 {
        self.world_size
    }

    /// Completed `advance` calls.
    pub fn frame(&self) -> u64 {
        self.frame
    }
}
