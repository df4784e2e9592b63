// Context steering: per-direction interest and danger scores, blended into a
// single goal direction that the agent's velocity eases toward.
//
// Every function here reads positions and grid contents that are frozen for
// the duration of the step, so agents can be evaluated in any order.

use glam::{UVec2, Vec2};

use super::directions::DirectionSet;
use super::math::{SCORE_MAX, normalize_or_zero, quantize_unit};
use super::occupancy::OccupancyGrid;

/// Read-only inputs shared by every agent in one step.
pub struct StepContext<'a> {
    pub directions: &'a DirectionSet,
    pub grid: &'a OccupancyGrid,
    /// Positions after this frame's integration.
    pub positions: &'a [Vec2],
    /// Cell each agent was inserted into this frame.
    pub cells: &'a [UVec2],
    pub target: Vec2,
    pub danger_threshold: f32,
}

// ============================================================================
// INTEGRATION
// ============================================================================

/// Move by the current velocity and refresh the heading. A stationary agent
/// keeps its previous facing.
#[inline]
pub fn integrate(position: &mut Vec2, facing: &mut Vec2, velocity: Vec2, dt: f32) {
    *position += velocity * dt;
    let speed = velocity.length();
    if speed > 0.0 {
        *facing = velocity / speed;
    }
}

// ============================================================================
// SCORE MAPS
// ============================================================================

/// Score each direction by how well it points at `target`.
///
/// `out[j] = quantize(dot(normalize(target - position), dir[j]))`. An agent
/// sitting exactly on the target scores 0 everywhere.
pub fn interest_map(position: Vec2, target: Vec2, directions: &DirectionSet, out: &mut [u8]) {
    let to_target = normalize_or_zero(target - position);
    for (score, dir) in out.iter_mut().zip(directions.iter()) {
        *score = quantize_unit(to_target.dot(dir));
    }
}

/// Collect `(unit offset, falloff)` for every other agent in the 3x3 block
/// around agent `i`'s cell. Falloff is `max(0, (T - dist) / T)`.
pub fn gather_obstacles(ctx: &StepContext<'_>, i: usize, out: &mut Vec<(Vec2, f32)>) {
    out.clear();
    let here = ctx.positions[i];
    let threshold = ctx.danger_threshold;
    ctx.grid.for_each_in_block(ctx.cells[i], |k| {
        if k == i {
            return;
        }
        let offset = ctx.positions[k] - here;
        let falloff = ((threshold - offset.length()) / threshold).max(0.0);
        if falloff > 0.0 {
            out.push((normalize_or_zero(offset), falloff));
        }
    });
}

/// Score each direction by how much crowding lies along it.
///
/// Directions pointing *toward* nearby agents accumulate positive badness;
/// the blend subtracts danger from interest, so that is what steers agents
/// away. Coincident agents have a zero offset and add nothing.
pub fn danger_map(obstacles: &[(Vec2, f32)], directions: &DirectionSet, out: &mut [u8]) {
    for (score, dir) in out.iter_mut().zip(directions.iter()) {
        let badness: f32 = obstacles
            .iter()
            .map(|&(to_obstacle, falloff)| dir.dot(to_obstacle) * falloff)
            .sum();
        *score = quantize_unit(badness);
    }
}

// ============================================================================
// BLEND + STEER
// ============================================================================

/// `normalize(sum_j dir[j] * max(0, interest[j] - danger[j]) / 255)`.
/// Zero when nothing survives the subtraction.
pub fn blend_goal(directions: &DirectionSet, interest: &[u8], danger: &[u8]) -> Vec2 {
    let mut sum = Vec2::ZERO;
    for ((dir, &good), &bad) in directions.iter().zip(interest).zip(danger) {
        let weight = good.saturating_sub(bad) as f32 / SCORE_MAX as f32;
        sum += dir * weight;
    }
    normalize_or_zero(sum)
}

/// Euler step of `velocity` toward `goal * max_speed`.
///
/// `max_speed` is the desired speed, not a clamp on the result.
#[inline]
pub fn steer(velocity: Vec2, goal: Vec2, max_speed: f32, dt: f32) -> Vec2 {
    let desired = goal * max_speed;
    let steering = desired - velocity;
    velocity + steering * dt
}

/// Full score-and-steer pass for agent `i`. Writes both score rows and
/// returns the agent's new velocity.
pub fn steer_agent(
    ctx: &StepContext<'_>,
    i: usize,
    velocity: Vec2,
    max_speed: f32,
    dt: f32,
    interest: &mut [u8],
    danger: &mut [u8],
    obstacles: &mut Vec<(Vec2, f32)>,
) -> Vec2 {
    interest_map(ctx.positions[i], ctx.target, ctx.directions, interest);
    gather_obstacles(ctx, i, obstacles);
    danger_map(obstacles, ctx.directions, danger);
    let goal = blend_goal(ctx.directions, interest, danger);
    steer(velocity, goal, max_speed, dt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::occupancy::world_to_cell;

    const WORLD: Vec2 = Vec2::splat(1000.0);

    struct Scene {
        directions: DirectionSet,
        grid: OccupancyGrid,
        positions: Vec<Vec2>,
        cells: Vec<UVec2>,
    }

    impl Scene {
        fn new(positions: &[Vec2]) -> Self {
            Self::with_grid(positions, 100)
        }

        fn with_grid(positions: &[Vec2], dim: u32) -> Self {
            let mut grid = OccupancyGrid::new(dim, dim, 10);
            let mut cells = Vec::new();
            for (i, &p) in positions.iter().enumerate() {
                let c = world_to_cell(p, WORLD, grid.dimensions());
                grid.insert(c.x, c.y, i);
                cells.push(c);
            }
            Self {
                directions: DirectionSet::new(8).unwrap(),
                grid,
                positions: positions.to_vec(),
                cells,
            }
        }

        fn ctx(&self, target: Vec2) -> StepContext<'_> {
            StepContext {
                directions: &self.directions,
                grid: &self.grid,
                positions: &self.positions,
                cells: &self.cells,
                target,
                danger_threshold: 150.0,
            }
        }

        fn danger_of(&self, i: usize) -> Vec<u8> {
            let ctx = self.ctx(Vec2::ZERO);
            let mut obstacles = Vec::new();
            gather_obstacles(&ctx, i, &mut obstacles);
            let mut out = vec![0u8; self.directions.resolution()];
            danger_map(&obstacles, &self.directions, &mut out);
            out
        }
    }

    #[test]
    fn integrate_keeps_facing_when_stationary() {
        let mut pos = Vec2::new(1.0, 1.0);
        let mut facing = Vec2::Y;
        integrate(&mut pos, &mut facing, Vec2::ZERO, 0.5);
        assert_eq!(pos, Vec2::new(1.0, 1.0));
        assert_eq!(facing, Vec2::Y);

        integrate(&mut pos, &mut facing, Vec2::new(-4.0, 0.0), 0.5);
        assert_eq!(pos, Vec2::new(-1.0, 1.0));
        assert_eq!(facing, Vec2::new(-1.0, 0.0));
    }

    #[test]
    fn interest_is_zero_on_target() {
        let dirs = DirectionSet::new(8).unwrap();
        let mut out = [7u8; 8];
        let p = Vec2::new(42.0, 17.0);
        interest_map(p, p, &dirs, &mut out);
        assert_eq!(out, [0u8; 8]);
    }

    #[test]
    fn interest_peaks_uniquely_on_aligned_direction() {
        let dirs = DirectionSet::new(8).unwrap();
        let origin = Vec2::new(500.0, 500.0);
        for j in 0..8 {
            let mut out = [0u8; 8];
            interest_map(origin, origin + dirs.get(j) * 80.0, &dirs, &mut out);
            assert_eq!(out[j], 255, "direction {j}: {out:?}");
            let peaks = out.iter().filter(|&&s| s == 255).count();
            assert_eq!(peaks, 1, "direction {j}: {out:?}");
        }
    }

    #[test]
    fn interest_clamps_backward_directions_to_zero() {
        let dirs = DirectionSet::new(8).unwrap();
        let mut out = [0u8; 8];
        interest_map(Vec2::ZERO, Vec2::new(100.0, 0.0), &dirs, &mut out);
        assert_eq!(out[0], 255);
        assert_eq!(out[1], 180);
        assert_eq!(out[7], 180);
        assert_eq!(&out[2..7], &[0u8; 5]);
    }

    #[test]
    fn lone_agent_has_no_danger() {
        let scene = Scene::new(&[Vec2::new(500.0, 500.0), Vec2::new(900.0, 100.0)]);
        assert_eq!(scene.danger_of(0), vec![0u8; 8]);
    }

    #[test]
    fn neighbours_beyond_threshold_add_no_danger() {
        // Coarse grid so both land in one 3x3 block while 160 units apart.
        let scene = Scene::with_grid(&[Vec2::new(100.0, 100.0), Vec2::new(100.0, 260.0)], 4);
        let mut in_block = Vec::new();
        scene.grid.for_each_in_block(scene.cells[0], |k| in_block.push(k));
        assert!(in_block.contains(&1));
        assert_eq!(scene.danger_of(0), vec![0u8; 8]);
    }

    #[test]
    fn danger_points_toward_the_crowd() {
        let scene = Scene::new(&[Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0)]);
        let danger = scene.danger_of(0);
        // (150 - 10) / 150 = 0.933..
        assert_eq!(danger[0], 238);
        assert!(danger[0] > danger[4]);
        assert_eq!(danger[4], 0);
        assert_eq!(danger[3], 0);
        assert_eq!(danger[5], 0);
        assert!(danger[1] > 0 && danger[7] > 0);
    }

    #[test]
    fn coincident_agents_add_no_danger() {
        let p = Vec2::new(300.0, 300.0);
        let scene = Scene::new(&[p, p, p]);
        let danger = scene.danger_of(1);
        assert_eq!(danger, vec![0u8; 8]);
        let mut obstacles = Vec::new();
        gather_obstacles(&scene.ctx(Vec2::ZERO), 1, &mut obstacles);
        assert_eq!(obstacles.len(), 2);
        assert!(obstacles.iter().all(|(v, w)| v.is_finite() && w.is_finite()));
    }

    #[test]
    fn blend_of_nothing_is_zero() {
        let dirs = DirectionSet::new(8).unwrap();
        assert_eq!(blend_goal(&dirs, &[0; 8], &[0; 8]), Vec2::ZERO);
        // Danger fully cancels interest.
        assert_eq!(blend_goal(&dirs, &[200; 8], &[255; 8]), Vec2::ZERO);
    }

    #[test]
    fn blend_follows_interest_minus_danger() {
        let dirs = DirectionSet::new(4).unwrap();
        let goal = blend_goal(&dirs, &[255, 255, 0, 0], &[255, 0, 0, 0]);
        assert!((goal - Vec2::Y).length() < 1e-6, "{goal:?}");
    }

    #[test]
    fn steer_decays_toward_zero_goal() {
        let v = steer(Vec2::new(10.0, 0.0), Vec2::ZERO, 300.0, 0.25);
        assert_eq!(v, Vec2::new(7.5, 0.0));
        let still = steer(Vec2::new(10.0, 0.0), Vec2::X, 300.0, 0.0);
        assert_eq!(still, Vec2::new(10.0, 0.0));
    }

    #[test]
    fn steer_agent_heads_for_target() {
        let scene = Scene::new(&[Vec2::new(0.0, 0.0)]);
        let ctx = scene.ctx(Vec2::new(100.0, 0.0));
        let (mut interest, mut danger) = ([0u8; 8], [0u8; 8]);
        let mut obstacles = Vec::new();
        let v = steer_agent(&ctx, 0, Vec2::ZERO, 100.0, 1.0, &mut interest, &mut danger, &mut obstacles);
        assert!((v - Vec2::new(100.0, 0.0)).length() < 1e-3, "{v:?}");
        assert_eq!(danger, [0u8; 8]);
        assert_eq!(interest[0], 255);
    }
}
