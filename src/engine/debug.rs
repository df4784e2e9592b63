// Diagnostics for a running crowd: per-frame counters from `Crowd::advance`,
// rolling frame-time stats, and the neighbour-link query used to draw
// proximity lines between agents.

use std::time::{Duration, Instant};

use glam::Vec2;

/// Radius used for neighbour links when nothing else is configured.
pub const DEFAULT_LINK_RADIUS: f32 = 50.0;

/// Counters produced by one `Crowd::advance`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameStats {
    pub agents: usize,
    pub occupied_cells: usize,
    /// Inserts rejected because a cell was already full.
    pub dropped_inserts: usize,
    pub mean_speed: f32,
}

/// Rolling frame-time summary, reported and reset about once a second.
pub struct DebugStats {
    pub fps: u32,
    pub frame_time_avg_ms: f32,
    pub frame_time_min_ms: f32,
    pub frame_time_max_ms: f32,
    pub entity_count: usize,
    pub last_frame: FrameStats,
    frames: u32,
    total_ms: f32,
    window: Duration,
}

impl Default for DebugStats {
    fn default() -> Self {
        Self {
            fps: 0,
            frame_time_avg_ms: 0.0,
            frame_time_min_ms: f32::INFINITY,
            frame_time_max_ms: 0.0,
            entity_count: 0,
            last_frame: FrameStats::default(),
            frames: 0,
            total_ms: 0.0,
            window: Duration::ZERO,
        }
    }
}

impl DebugStats {
    /// Fold in one frame. Returns `true` once a full second has been
    /// accumulated; `fps` and the averages are valid until the next call.
    pub fn record(&mut self, frame_time: Duration, frame: FrameStats) -> bool {
        let ms = frame_time.as_secs_f32() * 1000.0;
        self.frames += 1;
        self.total_ms += ms;
        self.frame_time_min_ms = self.frame_time_min_ms.min(ms);
        self.frame_time_max_ms = self.frame_time_max_ms.max(ms);
        self.entity_count = frame.agents;
        self.last_frame = frame;
        self.window += frame_time;

        if self.window < Duration::from_secs(1) {
            return false;
        }
        self.fps = self.frames;
        self.frame_time_avg_ms = self.total_ms / self.frames as f32;
        true
    }

    pub fn report(&self) {
        log::info!(
            "FPS: {} | frame {:.2}ms avg ({:.2}..{:.2}) | agents: {} | cells: {} | dropped: {} | mean speed: {:.1}",
            self.fps,
            self.frame_time_avg_ms,
            self.frame_time_min_ms,
            self.frame_time_max_ms,
            self.entity_count,
            self.last_frame.occupied_cells,
            self.last_frame.dropped_inserts,
            self.last_frame.mean_speed,
        );
    }

    /// Start a new one-second window.
    pub fn reset_window(&mut self) {
        self.frames = 0;
        self.total_ms = 0.0;
        self.window = Duration::ZERO;
        self.frame_time_min_ms = f32::INFINITY;
        self.frame_time_max_ms = 0.0;
    }
}

/// Wall-clock time between successive frames.
#[derive(Debug, Clone, Copy)]
pub struct FrameTimer {
    last: Instant,
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self { last: Instant::now() }
    }
}

impl FrameTimer {
    /// Real time since the previous tick (or since creation).
    pub fn tick(&mut self) -> Duration {
        self.tick_at(Instant::now())
    }

    pub fn tick_at(&mut self, now: Instant) -> Duration {
        let elapsed = now.saturating_duration_since(self.last);
        self.last = now;
        elapsed
    }
}

/// Every unordered pair `(a, b)`, `a < b`, closer than `radius`.
/// Brute force; meant for debug drawing of small crowds.
pub fn neighbor_links(positions: &[Vec2], radius: f32) -> Vec<(usize, usize)> {
    let r_sq = radius * radius;
    let mut links = Vec::new();
    for (a, pa) in positions.iter().enumerate() {
        for (b, pb) in positions.iter().enumerate().skip(a + 1) {
            if pa.distance_squared(*pb) < r_sq {
                links.push((a, b));
            }
        }
    }
    links
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn links_are_unique_pairs_within_radius() {
        let pts = [
            Vec2::new(0.0, 0.0),
            Vec2::new(30.0, 0.0),
            Vec2::new(0.0, 49.9),
            Vec2::new(500.0, 500.0),
        ];
        let links = neighbor_links(&pts, DEFAULT_LINK_RADIUS);
        assert_eq!(links, vec![(0, 1), (0, 2)]);
        assert!(neighbor_links(&pts[3..], DEFAULT_LINK_RADIUS).is_empty());
    }

    #[test]
    fn stats_roll_over_after_one_second() {
        let mut stats = DebugStats::default();
        let frame = FrameStats { agents: 10, ..FrameStats::default() };
        for _ in 0..3 {
            assert!(!stats.record(Duration::from_millis(250), frame));
        }
        assert!(stats.record(Duration::from_millis(250), frame));
        assert_eq!(stats.fps, 4);
        assert!((stats.frame_time_avg_ms - 250.0).abs() < 1e-3);
        assert_eq!(stats.entity_count, 10);

        stats.reset_window();
        assert!(!stats.record(Duration::from_millis(10), frame));
        assert!((stats.frame_time_max_ms - 10.0).abs() < 1e-3);
    }

    #[test]
    fn timer_measures_between_ticks() {
        let start = Instant::now();
        let mut timer = FrameTimer { last: start };
        assert_eq!(timer.tick_at(start + Duration::from_millis(16)), Duration::from_millis(16));
        assert_eq!(timer.tick_at(start + Duration::from_millis(40)), Duration::from_millis(24));
        // A clock that appears to run backwards never yields a negative frame.
        assert_eq!(timer.tick_at(start), Duration::ZERO);
    }
}
