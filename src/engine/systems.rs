// ECS systems for driving a crowd frame by frame.
// The crowd lives in the World as a resource; systems run in a fixed,
// chained order each frame: clock -> pointer -> crowd -> stats.

use bevy_ecs::prelude::*;
use glam::Vec2;

use super::crowd::Crowd;
use super::debug::{DebugStats, FrameStats, FrameTimer};
use super::error::ConfigError;
use super::pointer::{Pointer, PointerPath, world_to_screen};

#[derive(Resource)]
pub struct CrowdSim(pub Crowd);

/// Fixed-step clock. `dt` is fed to the crowd every frame.
#[derive(Resource, Debug, Clone, Copy)]
pub struct FrameClock {
    pub dt: f32,
    pub elapsed: f32,
    pub frame: u64,
}

impl FrameClock {
    /// Rejects a NaN, infinite or negative step.
    pub fn fixed(dt: f32) -> Result<Self, ConfigError> {
        if !(dt.is_finite() && dt >= 0.0) {
            return Err(ConfigError::InvalidTimeStep(dt));
        }
        Ok(Self { dt, elapsed: 0.0, frame: 0 })
    }
}

/// Where the crowd is heading this frame. The path moves a virtual cursor
/// over a viewport the size of the world; the target is read back from it.
#[derive(Resource, Debug, Clone, Copy)]
pub struct Target {
    pub position: Vec2,
    pub path: PointerPath,
    pub pointer: Pointer,
}

impl Target {
    pub fn following(path: PointerPath, viewport: Vec2) -> Self {
        let mut target = Self {
            position: Vec2::ZERO,
            path,
            pointer: Pointer::new(viewport),
        };
        target.seek(0.0);
        target
    }

    fn seek(&mut self, elapsed: f32) {
        let screen = world_to_screen(self.path.sample(elapsed), self.pointer.viewport);
        self.pointer.move_to(screen);
        self.position = self.pointer.world_target();
    }
}

#[derive(Resource, Default)]
pub struct LastFrame(pub FrameStats);

#[derive(Resource, Default)]
pub struct Diagnostics(pub DebugStats);

/// Real time between frames, independent of the simulated `dt`.
#[derive(Resource, Default)]
pub struct WallClock(pub FrameTimer);

/// Advance simulated time by one fixed step.
pub fn clock_system(mut clock: ResMut<FrameClock>) {
    clock.elapsed += clock.dt;
    clock.frame += 1;
}

/// Move the target along its scripted path.
pub fn pointer_system(clock: Res<FrameClock>, mut target: ResMut<Target>) {
    target.seek(clock.elapsed);
}

/// Run one crowd step toward the current target.
pub fn crowd_system(
    mut sim: ResMut<CrowdSim>,
    target: Res<Target>,
    clock: Res<FrameClock>,
    mut last: ResMut<LastFrame>,
) {
    last.0 = sim.0.advance(target.position, clock.dt);
}

/// Fold the frame into the rolling stats; log once per wall-clock second.
pub fn stats_system(
    mut wall: ResMut<WallClock>,
    last: Res<LastFrame>,
    mut diagnostics: ResMut<Diagnostics>,
) {
    let frame_time = wall.0.tick();
    if diagnostics.0.record(frame_time, last.0) {
        diagnostics.0.report();
        diagnostics.0.reset_window();
    }
}

/// World with every resource the frame schedule needs.
pub fn build_world(crowd: Crowd, dt: f32, path: PointerPath) -> Result<World, ConfigError> {
    let clock = FrameClock::fixed(dt)?;
    let target = Target::following(path, crowd.world_size());
    let mut world = World::new();
    world.insert_resource(CrowdSim(crowd));
    world.insert_resource(clock);
    world.insert_resource(target);
    world.insert_resource(LastFrame::default());
    world.insert_resource(Diagnostics::default());
    world.insert_resource(WallClock::default());
    Ok(world)
}

pub fn frame_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.add_systems((clock_system, pointer_system, crowd_system, stats_system).chain());
    schedule
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::agents::{AgentSpawn, AgentStore};
    use crate::engine::config::CrowdConfig;
    use crate::engine::directions::DirectionSet;

    #[test]
    fn schedule_drives_crowd_toward_target() {
        let cfg = CrowdConfig::default();
        let mut store = AgentStore::new(cfg.resolution).unwrap();
        store.push_agent(AgentSpawn::at(Vec2::new(100.0, 500.0), 200.0));
        let crowd = Crowd::new(&cfg, DirectionSet::new(cfg.resolution).unwrap(), store).unwrap();

        let target = Vec2::new(900.0, 500.0);
        let mut world = build_world(crowd, 1.0 / 30.0, PointerPath::Fixed(target)).unwrap();
        let mut schedule = frame_schedule();
        for _ in 0..60 {
            schedule.run(&mut world);
        }

        let clock = world.resource::<FrameClock>();
        assert_eq!(clock.frame, 60);
        let sim = world.resource::<CrowdSim>();
        assert_eq!(sim.0.frame(), 60);
        assert!(sim.0.position(0).x > 250.0, "{:?}", sim.0.position(0));
        assert!((sim.0.position(0).y - 500.0).abs() < 1.0);
        assert_eq!(world.resource::<LastFrame>().0.agents, 1);
    }

    #[test]
    fn pointer_system_follows_path() {
        let cfg = CrowdConfig { agent_count: 3, ..CrowdConfig::default() };
        let crowd = Crowd::spawn_seeded(&cfg).unwrap();
        let path = PointerPath::Orbit { center: Vec2::splat(500.0), radius: 100.0, angular_speed: 1.0 };
        let mut world = build_world(crowd, 0.5, path).unwrap();
        frame_schedule().run(&mut world);
        let target = world.resource::<Target>();
        let expected = path.sample(0.5);
        assert!((target.position - expected).length() < 1e-4);
        // The cursor sits in screen space, y measured down from the top.
        assert_eq!(target.pointer.viewport, cfg.world_size);
        assert!((target.pointer.screen_position.y - (cfg.world_size.y - expected.y)).abs() < 1e-4);
        assert_eq!(target.pointer.screen_position.x, expected.x);
    }

    #[test]
    fn frame_time_is_wall_clock_not_dt() {
        let cfg = CrowdConfig { agent_count: 3, ..CrowdConfig::default() };
        let crowd = Crowd::spawn_seeded(&cfg).unwrap();
        let mut world = build_world(crowd, 0.25, PointerPath::Fixed(Vec2::splat(500.0))).unwrap();
        let mut schedule = frame_schedule();
        for _ in 0..3 {
            schedule.run(&mut world);
        }
        // Three simulated quarter-seconds; a tiny crowd takes far less real time.
        let stats = &world.resource::<Diagnostics>().0;
        assert_eq!(stats.fps, 0);
        assert!(stats.frame_time_max_ms < 200.0, "{}", stats.frame_time_max_ms);
        assert_eq!(stats.last_frame.agents, 3);
    }

    #[test]
    fn bad_time_step_rejected() {
        for dt in [f32::INFINITY, f32::NAN, -0.1] {
            let crowd = Crowd::spawn_seeded(&CrowdConfig::default()).unwrap();
            assert!(matches!(
                build_world(crowd, dt, PointerPath::Fixed(Vec2::ZERO)),
                Err(ConfigError::InvalidTimeStep(_))
            ));
        }
        assert_eq!(FrameClock::fixed(0.0).map(|c| c.dt), Ok(0.0));
    }
}
