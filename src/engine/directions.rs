// Candidate steering directions shared by every agent.

use std::f32::consts::TAU;

use glam::Vec2;

use super::error::ConfigError;

/// `resolution` unit vectors evenly spaced around the circle, starting at +X
/// and turning counter-clockwise. Index `j` here lines up with index `j` of
/// every agent's interest and danger rows.
#[derive(Debug, Clone)]
pub struct DirectionSet {
    dirs: Box<[Vec2]>,
}

impl DirectionSet {
    pub fn new(resolution: usize) -> Result<Self, ConfigError> {
        if resolution == 0 {
            return Err(ConfigError::ZeroResolution);
        }
        let dirs = (0..resolution)
            .map(|j| {
                let angle = TAU * j as f32 / resolution as f32;
                Vec2::new(angle.cos(), angle.sin())
            })
            .collect();
        Ok(Self { dirs })
    }

    #[inline]
    pub fn resolution(&self) -> usize {
        self.dirs.len()
    }

    #[inline]
    pub fn get(&self, j: usize) -> Vec2 {
        self.dirs[j]
    }

    pub fn iter(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.dirs.iter().copied()
    }

    /// Index of the direction with the largest dot product against `v`.
    /// Ties resolve to the lowest index.
    pub fn closest(&self, v: Vec2) -> usize {
        let mut best = 0;
        let mut best_dot = f32::NEG_INFINITY;
        for (j, d) in self.dirs.iter().enumerate() {
            let dot = d.dot(v);
            if dot > best_dot {
                best_dot = dot;
                best = j;
            }
        }
        best
    }
}
