// Engine module - crowd simulation core and its headless ECS driver
// Rendering and windowing live outside this crate; everything here runs
// without a GPU or a window.

pub mod agents;
pub mod config;
pub mod crowd;
pub mod debug;
pub mod directions;
pub mod error;
pub mod math;
pub mod occupancy;
pub mod pointer;
pub mod steering;
pub mod systems;

// Re-export commonly used items
pub use agents::{AgentSpawn, AgentStore};
pub use config::CrowdConfig;
pub use crowd::Crowd;
pub use debug::FrameStats;
pub use directions::DirectionSet;
pub use error::{ConfigError, CrowdError};
pub use occupancy::OccupancyGrid;
