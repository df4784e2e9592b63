// Agent state, stored column-wise.
// Row `i` of every column belongs to the same agent. Rows are only ever
// appended through `push_agent`; there is no removal and no per-column
// mutation that could change one column's length without the others.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

use super::config::CrowdConfig;
use super::error::ConfigError;

/// Initial state for one agent.
#[derive(Debug, Clone, Copy)]
pub struct AgentSpawn {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Should be unit length.
    pub facing: Vec2,
    /// Desired cruising speed in world units/sec.
    pub max_speed: f32,
}

impl AgentSpawn {
    /// Agent at rest at `position`, facing +X.
    pub fn at(position: Vec2, max_speed: f32) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            facing: Vec2::X,
            max_speed,
        }
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_facing(mut self, facing: Vec2) -> Self {
        self.facing = facing;
        self
    }

    /// Random position inside `world_size`, at rest, random unit facing,
    /// `max_speed` drawn from `[min_speed, max_speed)`.
    pub fn random<R: Rng + ?Sized>(rng: &mut R, cfg: &CrowdConfig) -> Self {
        let position = Vec2::new(
            rng.gen_range(0.0..cfg.world_size.x),
            rng.gen_range(0.0..cfg.world_size.y),
        );
        let heading = rng.gen_range(0.0..TAU);
        Self {
            position,
            velocity: Vec2::ZERO,
            facing: Vec2::new(heading.cos(), heading.sin()),
            max_speed: rng.gen_range(cfg.min_speed..cfg.max_speed),
        }
    }
}

// ============================================================================
// SCORE MAP
// ============================================================================

/// One 8-bit score per (agent, direction), flattened row-major so every row
/// has exactly `resolution` entries.
#[derive(Debug, Clone)]
pub struct ScoreMap {
    values: Vec<u8>,
    resolution: usize,
}

impl ScoreMap {
    fn new(resolution: usize) -> Self {
        Self { values: Vec::new(), resolution }
    }

    fn push_row(&mut self) {
        self.values.resize(self.values.len() + self.resolution, 0);
    }

    #[inline]
    pub fn row(&self, i: usize) -> &[u8] {
        let start = i * self.resolution;
        &self.values[start..start + self.resolution]
    }

    /// All rows back to back.
    #[inline]
    pub fn as_flat(&self) -> &[u8] {
        &self.values
    }

    #[inline]
    fn as_flat_mut(&mut self) -> &mut [u8] {
        &mut self.values
    }
}

// ============================================================================
// AGENT STORE
// ============================================================================

pub struct AgentStore {
    position: Vec<Vec2>,
    velocity: Vec<Vec2>,
    facing: Vec<Vec2>,
    max_speed: Vec<f32>,
    interest: ScoreMap,
    danger: ScoreMap,
    resolution: usize,
}

/// Mutable view over every column at once. Slices, so the step can write
/// values but never change a column's length.
pub struct AgentColumnsMut<'a> {
    pub position: &'a mut [Vec2],
    pub velocity: &'a mut [Vec2],
    pub facing: &'a mut [Vec2],
    pub max_speed: &'a [f32],
    pub interest: &'a mut [u8],
    pub danger: &'a mut [u8],
}

impl AgentStore {
    /// Empty store whose score rows will hold `resolution` entries.
    pub fn new(resolution: usize) -> Result<Self, ConfigError> {
        if resolution == 0 {
            return Err(ConfigError::ZeroResolution);
        }
        Ok(Self {
            position: Vec::new(),
            velocity: Vec::new(),
            facing: Vec::new(),
            max_speed: Vec::new(),
            interest: ScoreMap::new(resolution),
            danger: ScoreMap::new(resolution),
            resolution,
        })
    }

    /// `count` agents sampled with `AgentSpawn::random`. The config is
    /// validated first; an empty speed range or world would make sampling panic.
    pub fn random<R: Rng + ?Sized>(rng: &mut R, cfg: &CrowdConfig) -> Result<Self, ConfigError> {
        cfg.validate()?;
        let mut store = Self::new(cfg.resolution)?;
        for _ in 0..cfg.agent_count {
            store.push_agent(AgentSpawn::random(rng, cfg));
        }
        Ok(store)
    }

    /// Append one agent to every column. Returns its index.
    pub fn push_agent(&mut self, spawn: AgentSpawn) -> usize {
        let idx = self.position.len();
        self.position.push(spawn.position);
        self.velocity.push(spawn.velocity);
        self.facing.push(spawn.facing);
        self.max_speed.push(spawn.max_speed);
        self.interest.push_row();
        self.danger.push_row();
        idx
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.position.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.position.is_empty()
    }

    #[inline]
    pub fn resolution(&self) -> usize {
        self.resolution
    }

    pub fn positions(&self) -> &[Vec2] {
        &self.position
    }

    pub fn velocities(&self) -> &[Vec2] {
        &self.velocity
    }

    pub fn facings(&self) -> &[Vec2] {
        &self.facing
    }

    pub fn max_speeds(&self) -> &[f32] {
        &self.max_speed
    }

    pub fn interest(&self) -> &ScoreMap {
        &self.interest
    }

    pub fn danger(&self) -> &ScoreMap {
        &self.danger
    }

    pub(crate) fn columns_mut(&mut self) -> AgentColumnsMut<'_> {
        AgentColumnsMut {
            position: &mut self.position,
            velocity: &mut self.velocity,
            facing: &mut self.facing,
            max_speed: &self.max_speed,
            interest: self.interest.as_flat_mut(),
            danger: self.danger.as_flat_mut(),
        }
    }
}
