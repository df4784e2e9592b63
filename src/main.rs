// Headless crowd runner.
// Spawns a seeded crowd, drives it with the ECS frame schedule toward an
// orbiting target, and logs stats about once per second of wall time.
//
// Usage: crowd-steer [frames] [dt]
// Crowd settings come from CROWD_* environment variables (see engine::config).
// Set RUST_LOG=info to see the periodic report.

use glam::Vec2;

use crowd_steer::engine::debug::{DEFAULT_LINK_RADIUS, neighbor_links};
use crowd_steer::engine::pointer::PointerPath;
use crowd_steer::engine::systems::{CrowdSim, build_world, frame_schedule};
use crowd_steer::{Crowd, CrowdConfig};

const DEFAULT_FRAMES: u64 = 600;
const DEFAULT_DT: f32 = 1.0 / 60.0;

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let frames: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(DEFAULT_FRAMES);
    let dt: f32 = args.next().and_then(|s| s.parse().ok()).unwrap_or(DEFAULT_DT);

    let config = match CrowdConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            log::error!("{e}");
            std::process::exit(2);
        }
    };
    let crowd = match Crowd::spawn_seeded(&config) {
        Ok(crowd) => crowd,
        Err(e) => {
            log::error!("{e}");
            std::process::exit(2);
        }
    };

    let center = config.world_size * 0.5;
    let path = PointerPath::Orbit {
        center,
        radius: center.min_element() * 0.6,
        angular_speed: 0.5,
    };

    let mut world = match build_world(crowd, dt, path) {
        Ok(world) => world,
        Err(e) => {
            log::error!("{e}");
            std::process::exit(2);
        }
    };
    log::info!(
        "Spawned {} agents, running {} frames at dt={:.4}",
        world.resource::<CrowdSim>().0.count(),
        frames,
        dt
    );

    let mut schedule = frame_schedule();
    let started = std::time::Instant::now();
    for _ in 0..frames {
        schedule.run(&mut world);
    }
    let wall = started.elapsed();

    let crowd = &world.resource::<CrowdSim>().0;
    let links = neighbor_links(crowd.positions(), DEFAULT_LINK_RADIUS);
    let centroid = crowd.positions().iter().copied().sum::<Vec2>() / crowd.count().max(1) as f32;
    println!(
        "{} frames in {:.1}ms | agents: {} | centroid: ({:.1}, {:.1}) | close pairs: {}",
        crowd.frame(),
        wall.as_secs_f64() * 1000.0,
        crowd.count(),
        centroid.x,
        centroid.y,
        links.len(),
    );
}
