//! # Shared Simulation Library
//!
//! Types and pure functions used by both the game client and the score server.
//! Nothing in this crate performs I/O: every function here is a numeric or
//! geometric transform that can be driven with synthetic `dt` values.
//!
//! ## Module Organization
//!
//! - [`physics`]: vertical integration of the player entity (gravity, flap)
//! - [`obstacles`]: spawning, scrolling and retiring of obstacles
//! - [`collision`]: forgiving AABB hit tests and pass scoring
//! - [`difficulty`]: staged escalation of the per-session mode parameters
//! - [`protocol`]: JSON request/response bodies exchanged over HTTP

pub mod collision;
pub mod difficulty;
pub mod obstacles;
pub mod physics;
pub mod protocol;

use serde::{Deserialize, Serialize};

pub use collision::{award_passes, detect_collision, CollisionKind, Rect};
pub use difficulty::{DifficultyScaler, Escalation};
pub use obstacles::ObstacleStream;
pub use physics::integrate;
pub use protocol::{LeaderboardEntry, SubmitRequest};

pub const TICK_RATE: u32 = 60;
pub const TICK_DT: f32 = 1.0 / TICK_RATE as f32;

pub const ENTITY_BASE_SIZE: f32 = 34.0;
pub const ENTITY_SCALE: f32 = 1.9;
pub const ENTITY_SIZE: f32 = ENTITY_BASE_SIZE * ENTITY_SCALE;
/// Horizontal resting position of the entity as a fraction of field width.
pub const ENTITY_X_RATIO: f32 = 0.2;

pub const OBSTACLE_WIDTH: f32 = 52.0;
pub const OBSTACLE_HEIGHT: f32 = 320.0;
/// The pre-seeded obstacle starts this many obstacle widths past the right edge.
pub const INITIAL_OBSTACLE_OFFSET: f32 = 6.0;

/// Vertical margin kept free of gaps, top and bottom, as a fraction of field height.
pub const SPAWN_MARGIN_RATIO: f32 = 0.2;
/// The visual ground line sits at this fraction of field height.
pub const GROUND_LINE_RATIO: f32 = 0.85;

/// Ranked lists are served truncated to this many entries.
pub const LEADERBOARD_SIZE: usize = 10;

/// Number of selectable entity skins.
pub const SKIN_VARIANTS: u32 = 9;

/// Game mode. Each mode has its own parameter defaults and its own leaderboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Classic,
    #[serde(rename = "speed")]
    SpeedRun,
}

impl Mode {
    pub const ALL: [Mode; 2] = [Mode::Classic, Mode::SpeedRun];

    /// Short machine name, used in storage keys and admin routes
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Classic => "classic",
            Mode::SpeedRun => "speed",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Mode::Classic => "Classic",
            Mode::SpeedRun => "Speed Run",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "classic" => Some(Mode::Classic),
            "speed" | "speedrun" | "speed_run" | "sr" => Some(Mode::SpeedRun),
            _ => None,
        }
    }

    /// Fresh parameter set for a new session in this mode
    pub fn defaults(&self) -> ModeParams {
        match self {
            Mode::Classic => ModeParams {
                gravity: 975.0,
                flap_impulse: -250.0,
                obstacle_speed: 200.0,
                spawn_interval: 1.5,
                gap_size: 180.0,
                hitbox_inset: 6.0,
            },
            Mode::SpeedRun => ModeParams {
                gravity: 900.0,
                flap_impulse: -300.0,
                obstacle_speed: 350.0,
                spawn_interval: 0.75,
                gap_size: 175.0,
                hitbox_inset: 6.0,
            },
        }
    }
}

/// Per-session tunables. Difficulty escalation mutates a session's copy only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModeParams {
    /// px/s², positive is downward
    pub gravity: f32,
    /// px/s, negative is upward
    pub flap_impulse: f32,
    /// px/s
    pub obstacle_speed: f32,
    /// seconds between spawns
    pub spawn_interval: f32,
    /// px
    pub gap_size: f32,
    /// px shaved off every hitbox edge
    pub hitbox_inset: f32,
}

/// Dimensions of the play field in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Field {
    pub width: f32,
    pub height: f32,
}

impl Field {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn ground_line(&self) -> f32 {
        self.height * GROUND_LINE_RATIO
    }
}

/// The player-controlled entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub x: f32,
    pub y: f32,
    pub vy: f32,
    pub width: f32,
    pub height: f32,
    pub flap_requested: bool,
}

impl Entity {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            vy: 0.0,
            width: ENTITY_SIZE,
            height: ENTITY_SIZE,
            flap_requested: false,
        }
    }

    /// Entity at its starting position for the given field
    pub fn spawn(field: &Field) -> Self {
        Self::new(
            field.width * ENTITY_X_RATIO,
            (field.height - ENTITY_SIZE) / 2.0,
        )
    }

    pub fn request_flap(&mut self) {
        self.flap_requested = true;
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

/// An obstacle: a top and a bottom segment separated by a gap starting at `gap_y`.
#[derive(Debug, Clone, PartialEq)]
pub struct Obstacle {
    pub x: f32,
    pub gap_y: f32,
    pub scored: bool,
}

impl Obstacle {
    pub fn new(x: f32, gap_y: f32) -> Self {
        Self {
            x,
            gap_y,
            scored: false,
        }
    }

    pub fn trailing_edge(&self) -> f32 {
        self.x + OBSTACLE_WIDTH
    }
}
