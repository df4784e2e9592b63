//! Context-steering crowd simulation.
//!
//! Agents score a ring of candidate directions by how well each points at a
//! shared target (interest) and how much nearby crowding lies along it
//! (danger), then ease their velocity toward the blended best direction.
//! Neighbour lookups go through a uniform occupancy grid rebuilt every frame.
//!
//! ```
//! use crowd_steer::{Crowd, CrowdConfig};
//! use glam::Vec2;
//!
//! let mut crowd = Crowd::spawn_seeded(&CrowdConfig::default()).unwrap();
//! crowd.advance(Vec2::new(500.0, 500.0), 1.0 / 60.0);
//! assert_eq!(crowd.count(), 10);
//! ```

pub mod engine;

pub use engine::{
    AgentSpawn, AgentStore, ConfigError, Crowd, CrowdConfig, CrowdError, DirectionSet, FrameStats,
    OccupancyGrid,
};
