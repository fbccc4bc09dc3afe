//! Obstacle spawning, scrolling and retirement

use crate::{Field, ModeParams, Obstacle, INITIAL_OBSTACLE_OFFSET, OBSTACLE_WIDTH, SPAWN_MARGIN_RATIO};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Owns the active obstacle set and the spawn timer for one session
#[derive(Debug, Clone)]
pub struct ObstacleStream {
    obstacles: Vec<Obstacle>,
    spawn_timer: f32,
    rng: StdRng,
}

impl ObstacleStream {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Deterministic stream, used by tests and replays
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            obstacles: Vec::new(),
            spawn_timer: 0.0,
            rng,
        }
    }

    /// Clears the set and pre-seeds one obstacle well beyond the right edge.
    ///
    /// The timer starts one interval in the negative so the first timed spawn
    /// trails the pre-seeded obstacle.
    pub fn reset(&mut self, field: &Field, params: &ModeParams) {
        self.obstacles.clear();
        self.spawn_timer = -params.spawn_interval;
        let x = field.width + OBSTACLE_WIDTH * INITIAL_OBSTACLE_OFFSET;
        self.spawn_at(x, field, params);
    }

    /// Advances the spawn timer and scrolls every obstacle left.
    /// Returns true if an obstacle was spawned this tick.
    pub fn advance(&mut self, field: &Field, params: &ModeParams, dt: f32) -> bool {
        self.spawn_timer += dt;
        let spawned = self.spawn_timer >= params.spawn_interval;
        if spawned {
            self.spawn_at(field.width + OBSTACLE_WIDTH, field, params);
            // keep the sub-interval remainder so spawns don't drift
            self.spawn_timer -= params.spawn_interval;
        }

        let shift = params.obstacle_speed * dt;
        for obstacle in &mut self.obstacles {
            obstacle.x -= shift;
        }
        self.obstacles.retain(|o| o.trailing_edge() > 0.0);

        spawned
    }

    fn spawn_at(&mut self, x: f32, field: &Field, params: &ModeParams) {
        let (lo, hi) = gap_range(field, params.gap_size);
        let gap_y = self.rng.gen_range(lo..=hi) as f32;
        self.obstacles.push(Obstacle::new(x, gap_y));
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn obstacles_mut(&mut self) -> &mut [Obstacle] {
        &mut self.obstacles
    }

    pub fn spawn_timer(&self) -> f32 {
        self.spawn_timer
    }

    /// True while any active obstacle has not yet been passed
    pub fn has_unscored(&self) -> bool {
        self.obstacles.iter().any(|o| !o.scored)
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }
}

impl Default for ObstacleStream {
    fn default() -> Self {
        Self::new()
    }
}

/// Inclusive range of whole-pixel gap offsets for the given field and gap size.
///
/// Collapses to the top margin when the field is too short to fit the gap.
pub fn gap_range(field: &Field, gap_size: f32) -> (i32, i32) {
    let margin = (field.height * SPAWN_MARGIN_RATIO).floor() as i32;
    let hi = (field.height - gap_size).floor() as i32 - margin;
    (margin, hi.max(margin))
}
