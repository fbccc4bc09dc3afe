//! Session state machine
//!
//! `GameMachine` owns the current screen, the selected mode and skin, and the
//! active session. It never performs I/O: every input and every tick returns
//! the [`SessionEvent`]s the driver should act on (sounds, HTTP calls).

use crate::layout::{self, Action};
use log::{debug, info};
use shared::{
    award_passes, detect_collision, integrate, CollisionKind, DifficultyScaler, Entity,
    Escalation, Field, LeaderboardEntry, Mode, ModeParams, ObstacleStream, SKIN_VARIANTS,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    ModeSelect,
    Welcome,
    Play,
    GameOver,
    PickSkin,
    Leaderboard,
}

/// Raw player input, already edge-detected
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Tap or click at a field position
    Pointer { x: f32, y: f32 },
    /// Flap key
    Flap,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Flapped,
    Scored { score: u32 },
    Escalated(Escalation),
    GameOver { cause: CollisionKind, score: u32 },
    SubmitScore { mode: Mode, score: u32, duration_ms: u64 },
    FetchLeaderboard(Mode),
    SkinSelected(u32),
}

/// One run from "start" to collision
#[derive(Debug, Clone)]
pub struct Session {
    pub mode: Mode,
    /// Copy of the mode defaults; escalation only touches this copy
    pub params: ModeParams,
    pub score: u32,
    /// Seconds of simulated play
    pub elapsed: f32,
    pub obstacles: ObstacleStream,
    pub entity: Entity,
    pub scaler: DifficultyScaler,
    pub termination: Option<CollisionKind>,
}

impl Session {
    /// Fresh session; `obstacles` is reset, its RNG carries over
    pub fn start(mode: Mode, field: &Field, mut obstacles: ObstacleStream) -> Self {
        let params = mode.defaults();
        obstacles.reset(field, &params);
        Self {
            mode,
            params,
            score: 0,
            elapsed: 0.0,
            obstacles,
            entity: Entity::spawn(field),
            scaler: DifficultyScaler::new(),
            termination: None,
        }
    }

    pub fn is_over(&self) -> bool {
        self.termination.is_some()
    }

    pub fn duration_ms(&self) -> u64 {
        (self.elapsed.max(0.0) * 1000.0).round() as u64
    }

    /// Advances one tick: scroll, integrate, collide, score, escalate.
    /// A collision ends the tick early and is recorded as the termination cause.
    pub fn tick(&mut self, field: &Field, dt: f32) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        if self.is_over() {
            return events;
        }

        self.elapsed += dt;
        self.obstacles.advance(field, &self.params, dt);

        if integrate(&mut self.entity, &self.params, dt) {
            events.push(SessionEvent::Flapped);
        }

        if let Some(cause) =
            detect_collision(&self.entity, self.obstacles.obstacles(), field, &self.params)
        {
            self.termination = Some(cause);
            return events;
        }

        let passed = award_passes(&self.entity, self.obstacles.obstacles_mut());
        if passed > 0 {
            self.score += passed;
            events.push(SessionEvent::Scored { score: self.score });
        }

        let has_unscored = self.obstacles.has_unscored();
        if let Some(escalation) = self
            .scaler
            .evaluate(self.score, has_unscored, &mut self.params)
        {
            debug!("Escalated at {}: {:?}", self.score, escalation);
            events.push(SessionEvent::Escalated(escalation));
        }

        events
    }
}

pub struct GameMachine {
    field: Field,
    screen: Screen,
    mode: Mode,
    skin: Option<u32>,
    session: Option<Session>,
    leaderboard: Vec<LeaderboardEntry>,
    /// Mode of the leaderboard fetch requested on the current screen
    pending_fetch: Option<Mode>,
    seed: Option<u64>,
}

impl GameMachine {
    pub fn new(field: Field) -> Self {
        Self {
            field,
            screen: Screen::ModeSelect,
            mode: Mode::Classic,
            skin: None,
            session: None,
            leaderboard: Vec::new(),
            pending_fetch: None,
            seed: None,
        }
    }

    /// Machine whose obstacle placement is reproducible
    pub fn with_seed(field: Field, seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::new(field)
        }
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn skin(&self) -> Option<u32> {
        self.skin
    }

    /// Restores a remembered skin; unknown variants are ignored
    pub fn restore_skin(&mut self, variant: Option<u32>) {
        if let Some(variant) = variant.filter(|v| *v < SKIN_VARIANTS) {
            self.skin = Some(variant);
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn leaderboard(&self) -> &[LeaderboardEntry] {
        &self.leaderboard
    }

    fn set_screen(&mut self, screen: Screen) {
        if self.screen != screen {
            debug!("Screen {:?} -> {:?}", self.screen, screen);
            self.screen = screen;
            self.pending_fetch = None;
        }
    }

    pub fn handle_input(&mut self, input: InputEvent) -> Vec<SessionEvent> {
        match self.screen {
            Screen::Play => {
                if let Some(session) = self.session.as_mut() {
                    session.entity.request_flap();
                }
                Vec::new()
            }
            Screen::Leaderboard => {
                self.set_screen(Screen::Welcome);
                Vec::new()
            }
            screen => match input {
                InputEvent::Pointer { x, y } => {
                    match layout::hit_test(screen, &self.field, x, y) {
                        Some(action) => self.apply(action),
                        None => Vec::new(),
                    }
                }
                InputEvent::Flap => Vec::new(),
            },
        }
    }

    fn apply(&mut self, action: Action) -> Vec<SessionEvent> {
        match action {
            Action::SelectMode(mode) => {
                self.mode = mode;
                self.set_screen(Screen::Welcome);
                Vec::new()
            }
            Action::OpenSkinPicker => {
                self.set_screen(Screen::PickSkin);
                Vec::new()
            }
            Action::PickSkin(variant) => {
                self.skin = Some(variant);
                self.set_screen(Screen::ModeSelect);
                vec![SessionEvent::SkinSelected(variant)]
            }
            Action::Start => {
                self.start_play();
                Vec::new()
            }
            Action::OpenLeaderboard => {
                self.pending_fetch = Some(self.mode);
                vec![SessionEvent::FetchLeaderboard(self.mode)]
            }
            Action::Back => {
                self.set_screen(Screen::ModeSelect);
                Vec::new()
            }
        }
    }

    /// Starts a new session in the current mode. The skin is kept.
    pub fn start_play(&mut self) {
        let obstacles = match self.session.take() {
            Some(previous) => previous.obstacles,
            None => match self.seed {
                Some(seed) => ObstacleStream::seeded(seed),
                None => ObstacleStream::new(),
            },
        };
        self.session = Some(Session::start(self.mode, &self.field, obstacles));
        self.set_screen(Screen::Play);
        info!("Started {} session", self.mode.label());
    }

    /// Runs one simulation tick; only does anything during play
    pub fn advance(&mut self, dt: f32) -> Vec<SessionEvent> {
        if self.screen != Screen::Play {
            return Vec::new();
        }
        let Some(session) = self.session.as_mut() else {
            return Vec::new();
        };

        let mut events = session.tick(&self.field, dt);
        if let Some(cause) = session.termination {
            events.extend(self.game_over(cause));
        }
        events
    }

    /// Ends the current session. A second call is a no-op.
    pub fn game_over(&mut self, cause: CollisionKind) -> Vec<SessionEvent> {
        if self.screen != Screen::Play {
            return Vec::new();
        }
        let Some(session) = self.session.as_mut() else {
            return Vec::new();
        };
        session.termination.get_or_insert(cause);

        let (mode, score, duration_ms) = (session.mode, session.score, session.duration_ms());
        self.set_screen(Screen::GameOver);
        info!(
            "{} session over ({:?}) with score {} after {} ms",
            mode.label(),
            cause,
            score,
            duration_ms
        );

        vec![
            SessionEvent::GameOver { cause, score },
            SessionEvent::SubmitScore {
                mode,
                score,
                duration_ms,
            },
        ]
    }

    /// Opens the leaderboard screen with fetched entries.
    ///
    /// Ignored unless a fetch for `mode` was requested on the current
    /// WELCOME or GAMEOVER screen; leaving that screen drops the request.
    /// Returns whether the screen opened.
    pub fn show_leaderboard(&mut self, mode: Mode, entries: Vec<LeaderboardEntry>) -> bool {
        if self.pending_fetch != Some(mode)
            || mode != self.mode
            || !matches!(self.screen, Screen::Welcome | Screen::GameOver)
        {
            return false;
        }
        self.leaderboard = entries;
        self.set_screen(Screen::Leaderboard);
        true
    }
}
