// Target source for the crowd.
// Turns a screen-space cursor into a world-space attractor, or scripts one
// when there is no window to read a cursor from.

use glam::Vec2;

/// Latest cursor state, in screen pixels with y pointing down.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pointer {
    pub screen_position: Vec2,
    /// Viewport size in pixels; the world is mapped 1:1 onto it.
    pub viewport: Vec2,
}

impl Pointer {
    pub fn new(viewport: Vec2) -> Self {
        Self { screen_position: Vec2::ZERO, viewport }
    }

    /// Feed a cursor-moved event.
    pub fn move_to(&mut self, screen: Vec2) {
        self.screen_position = screen;
    }

    /// World-space target under the cursor (y flipped to point up).
    pub fn world_target(&self) -> Vec2 {
        screen_to_world(self.screen_position, self.viewport)
    }
}

#[inline]
pub fn screen_to_world(screen: Vec2, viewport: Vec2) -> Vec2 {
    Vec2::new(screen.x, viewport.y - screen.y)
}

/// Inverse of `screen_to_world`.
#[inline]
pub fn world_to_screen(world: Vec2, viewport: Vec2) -> Vec2 {
    Vec2::new(world.x, viewport.y - world.y)
}

/// Scripted target motion for headless runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerPath {
    Fixed(Vec2),
    /// Circle around `center`, `angular_speed` in radians/sec.
    Orbit { center: Vec2, radius: f32, angular_speed: f32 },
}

impl PointerPath {
    /// Target position `elapsed` seconds into the run.
    pub fn sample(&self, elapsed: f32) -> Vec2 {
        match *self {
            PointerPath::Fixed(p) => p,
            PointerPath::Orbit { center, radius, angular_speed } => {
                let angle = elapsed * angular_speed;
                center + Vec2::new(angle.cos(), angle.sin()) * radius
            }
        }
    }
}
