// Tunables for a crowd run.
//
// Defaults reproduce the reference scene: ten agents in a 1000x1000 world,
// eight candidate directions, a 100x100 occupancy grid with ten slots per
// cell and a 150-unit danger falloff.
//
// # Environment Variables
//
// `CrowdConfig::from_env` overlays any of these on top of the defaults:
// - `CROWD_AGENT_COUNT`
// - `CROWD_RESOLUTION`
// - `CROWD_WORLD_WIDTH`, `CROWD_WORLD_HEIGHT`
// - `CROWD_GRID_WIDTH`, `CROWD_GRID_HEIGHT`
// - `CROWD_MAX_AGENTS_PER_CELL`
// - `CROWD_DANGER_THRESHOLD`
// - `CROWD_MIN_SPEED`, `CROWD_MAX_SPEED`
// - `CROWD_SEED`

use std::str::FromStr;

use glam::Vec2;

use super::error::ConfigError;

pub const DEFAULT_AGENT_COUNT: usize = 10;
pub const DEFAULT_RESOLUTION: usize = 8;
pub const DEFAULT_WORLD_SIZE: f32 = 1000.0;
pub const DEFAULT_GRID_DIM: u32 = 100;
pub const DEFAULT_MAX_AGENTS_PER_CELL: usize = 10;
/// Distance at which a neighbour stops contributing danger.
pub const DEFAULT_DANGER_THRESHOLD: f32 = 150.0;
pub const DEFAULT_MIN_SPEED: f32 = 100.0;
pub const DEFAULT_MAX_SPEED: f32 = 500.0;

#[derive(Debug, Clone, PartialEq)]
pub struct CrowdConfig {
    pub agent_count: usize,
    /// Number of candidate directions sampled around the circle.
    pub resolution: usize,
    /// World extent; positions are expected in `[0, w) x [0, h)`.
    pub world_size: Vec2,
    pub grid_width: u32,
    pub grid_height: u32,
    pub max_agents_per_cell: usize,
    pub danger_threshold: f32,
    /// Range `max_speed` is drawn from when spawning randomly.
    pub min_speed: f32,
    pub max_speed: f32,
    /// Seed for `Crowd::spawn_seeded`.
    pub seed: u64,
}

impl Default for CrowdConfig {
    fn default() -> Self {
        Self {
            agent_count: DEFAULT_AGENT_COUNT,
            resolution: DEFAULT_RESOLUTION,
            world_size: Vec2::splat(DEFAULT_WORLD_SIZE),
            grid_width: DEFAULT_GRID_DIM,
            grid_height: DEFAULT_GRID_DIM,
            max_agents_per_cell: DEFAULT_MAX_AGENTS_PER_CELL,
            danger_threshold: DEFAULT_DANGER_THRESHOLD,
            min_speed: DEFAULT_MIN_SPEED,
            max_speed: DEFAULT_MAX_SPEED,
            seed: 0,
        }
    }
}

impl CrowdConfig {
    /// Defaults overlaid with any `CROWD_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like `from_env` but reads variables through `lookup`, so tests don't
    /// have to mutate the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        override_with(&lookup, "CROWD_AGENT_COUNT", &mut cfg.agent_count)?;
        override_with(&lookup, "CROWD_RESOLUTION", &mut cfg.resolution)?;
        override_with(&lookup, "CROWD_WORLD_WIDTH", &mut cfg.world_size.x)?;
        override_with(&lookup, "CROWD_WORLD_HEIGHT", &mut cfg.world_size.y)?;
        override_with(&lookup, "CROWD_GRID_WIDTH", &mut cfg.grid_width)?;
        override_with(&lookup, "CROWD_GRID_HEIGHT", &mut cfg.grid_height)?;
        override_with(&lookup, "CROWD_MAX_AGENTS_PER_CELL", &mut cfg.max_agents_per_cell)?;
        override_with(&lookup, "CROWD_DANGER_THRESHOLD", &mut cfg.danger_threshold)?;
        override_with(&lookup, "CROWD_MIN_SPEED", &mut cfg.min_speed)?;
        override_with(&lookup, "CROWD_MAX_SPEED", &mut cfg.max_speed)?;
        override_with(&lookup, "CROWD_SEED", &mut cfg.seed)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.resolution == 0 {
            return Err(ConfigError::ZeroResolution);
        }
        if self.grid_width == 0 || self.grid_height == 0 {
            return Err(ConfigError::EmptyGrid {
                width: self.grid_width,
                height: self.grid_height,
            });
        }
        if self.max_agents_per_cell == 0 {
            return Err(ConfigError::ZeroCellCapacity);
        }
        let w = self.world_size;
        if !(w.x.is_finite() && w.y.is_finite() && w.x > 0.0 && w.y > 0.0) {
            return Err(ConfigError::NonPositiveWorld { width: w.x, height: w.y });
        }
        if !(self.danger_threshold.is_finite() && self.danger_threshold > 0.0) {
            return Err(ConfigError::NonPositiveThreshold(self.danger_threshold));
        }
        if !(self.min_speed >= 0.0 && self.min_speed < self.max_speed && self.max_speed.is_finite()) {
            return Err(ConfigError::InvalidSpeedRange {
                min: self.min_speed,
                max: self.max_speed,
            });
        }
        Ok(())
    }
}

fn override_with<T, F>(lookup: &F, var: &'static str, slot: &mut T) -> Result<(), ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    if let Some(raw) = lookup(var) {
        *slot = raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Parse { var, value: raw.clone() })?;
        log::debug!("config override {var}={raw}");
    }
    Ok(())
}
