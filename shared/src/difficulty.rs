//! Staged difficulty escalation
//!
//! Every 25 points one escalation is applied to the session's parameters,
//! rotating gap -> speed -> spawn interval -> gap ...

use crate::ModeParams;

/// Score multiple at which an escalation is due.
pub const ESCALATION_STEP: u32 = 25;

pub const GAP_STEP: f32 = 10.0;
pub const GAP_FLOOR: f32 = 100.0;
pub const SPEED_STEP: f32 = 20.0;
pub const SPEED_CEILING: f32 = 400.0;
pub const SPAWN_STEP: f32 = 0.1;
pub const SPAWN_FLOOR: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Escalation {
    ShrinkGap,
    SpeedUp,
    ShortenSpawn,
}

impl Escalation {
    /// Escalation applied at a given position of the rotation
    pub fn for_cycle(cycle: u32) -> Self {
        match cycle % 3 {
            0 => Escalation::ShrinkGap,
            1 => Escalation::SpeedUp,
            _ => Escalation::ShortenSpawn,
        }
    }

    /// Pure transition: the escalation due at `cycle` and the next cycle value
    pub fn next(cycle: u32) -> (u32, Self) {
        (cycle + 1, Self::for_cycle(cycle))
    }

    /// Applies the escalation, clamped to its floor or ceiling
    pub fn apply(&self, params: &mut ModeParams) {
        match self {
            Escalation::ShrinkGap => {
                params.gap_size = (params.gap_size - GAP_STEP).max(GAP_FLOOR);
            }
            Escalation::SpeedUp => {
                params.obstacle_speed = (params.obstacle_speed + SPEED_STEP).min(SPEED_CEILING);
            }
            Escalation::ShortenSpawn => {
                params.spawn_interval = (params.spawn_interval - SPAWN_STEP).max(SPAWN_FLOOR);
            }
        }
    }
}

/// Tracks the rotation and the last score at which an escalation fired
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DifficultyScaler {
    cycle: u32,
    last_fired_score: u32,
}

impl DifficultyScaler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.cycle = 0;
        self.last_fired_score = 0;
    }

    pub fn cycle(&self) -> u32 {
        self.cycle
    }

    pub fn last_fired_score(&self) -> u32 {
        self.last_fired_score
    }

    /// Whether an escalation is due for this score.
    ///
    /// Never fires while an obstacle is still unpassed: its gap was placed
    /// with the current geometry.
    pub fn is_due(&self, score: u32, has_unscored: bool) -> bool {
        score > 0
            && score % ESCALATION_STEP == 0
            && score > self.last_fired_score
            && !has_unscored
    }

    /// Applies the next escalation to `params` if one is due
    pub fn evaluate(
        &mut self,
        score: u32,
        has_unscored: bool,
        params: &mut ModeParams,
    ) -> Option<Escalation> {
        if !self.is_due(score, has_unscored) {
            return None;
        }

        let (next_cycle, escalation) = Escalation::next(self.cycle);
        escalation.apply(params);
        self.cycle = next_cycle;
        self.last_fired_score = score;
        Some(escalation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Mode;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_rotation_order() {
        let kinds: Vec<Escalation> = (0..6).map(Escalation::for_cycle).collect();
        assert_eq!(
            kinds,
            vec![
                Escalation::ShrinkGap,
                Escalation::SpeedUp,
                Escalation::ShortenSpawn,
                Escalation::ShrinkGap,
                Escalation::SpeedUp,
                Escalation::ShortenSpawn,
            ]
        );
        assert_eq!(Escalation::next(4), (5, Escalation::SpeedUp));
    }

    #[test]
    fn test_not_due_at_zero_or_off_step() {
        let scaler = DifficultyScaler::new();
        assert!(!scaler.is_due(0, false));
        assert!(!scaler.is_due(24, false));
        assert!(!scaler.is_due(26, false));
        assert!(scaler.is_due(25, false));
    }

    #[test]
    fn test_blocked_by_unscored_obstacle() {
        let mut scaler = DifficultyScaler::new();
        let mut params = Mode::Classic.defaults();

        assert_eq!(scaler.evaluate(25, true, &mut params), None);
        assert_eq!(params, Mode::Classic.defaults());

        assert_eq!(
            scaler.evaluate(25, false, &mut params),
            Some(Escalation::ShrinkGap)
        );
        assert_eq!(params.gap_size, 170.0);
    }

    #[test]
    fn test_fires_once_per_plateau() {
        let mut scaler = DifficultyScaler::new();
        let mut params = Mode::Classic.defaults();

        assert!(scaler.evaluate(25, false, &mut params).is_some());
        for _ in 0..10 {
            assert!(scaler.evaluate(25, false, &mut params).is_none());
        }
        assert_eq!(scaler.cycle(), 1);
        assert_eq!(scaler.last_fired_score(), 25);
    }

    #[test]
    fn test_full_cycle_updates_each_parameter() {
        let mut scaler = DifficultyScaler::new();
        let mut params = Mode::Classic.defaults();

        scaler.evaluate(25, false, &mut params);
        scaler.evaluate(50, false, &mut params);
        scaler.evaluate(75, false, &mut params);

        assert_eq!(params.gap_size, 170.0);
        assert_eq!(params.obstacle_speed, 220.0);
        assert_approx_eq!(params.spawn_interval, 1.4);
        assert_eq!(scaler.cycle(), 3);
    }

    #[test]
    fn test_clamps_at_limits() {
        let mut params = Mode::SpeedRun.defaults();
        params.gap_size = 105.0;
        params.obstacle_speed = 390.0;
        params.spawn_interval = 0.55;

        Escalation::ShrinkGap.apply(&mut params);
        Escalation::SpeedUp.apply(&mut params);
        Escalation::ShortenSpawn.apply(&mut params);
        Escalation::ShrinkGap.apply(&mut params);
        Escalation::SpeedUp.apply(&mut params);
        Escalation::ShortenSpawn.apply(&mut params);

        assert_eq!(params.gap_size, GAP_FLOOR);
        assert_eq!(params.obstacle_speed, SPEED_CEILING);
        assert_eq!(params.spawn_interval, SPAWN_FLOOR);
    }

    #[test]
    fn test_reset_restarts_rotation() {
        let mut scaler = DifficultyScaler::new();
        let mut params = Mode::Classic.defaults();
        scaler.evaluate(25, false, &mut params);
        scaler.evaluate(50, false, &mut params);

        scaler.reset();

        assert_eq!(scaler, DifficultyScaler::new());
        assert_eq!(
            scaler.evaluate(25, false, &mut params),
            Some(Escalation::ShrinkGap)
        );
    }
}
