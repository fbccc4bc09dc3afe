//! Play-time accumulation and the per-player analytics report
//!
//! Session durations and high scores are updated independently; the report
//! joins them freshly on every call.

use crate::leaderboard::LeaderboardStore;
use crate::storage::{load_json, persist_json, Store, StoreError};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use shared::Mode;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tokio::sync::Mutex;

pub const PLAY_TIMES_KEY: &str = "play-times";

/// Cumulative minutes played by one identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayTimeRecord {
    pub username: String,
    #[serde(default)]
    pub classic_time_played: f64,
    #[serde(default)]
    pub speed_time_played: f64,
}

impl PlayTimeRecord {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            classic_time_played: 0.0,
            speed_time_played: 0.0,
        }
    }

    pub fn minutes(&self, mode: Mode) -> f64 {
        match mode {
            Mode::Classic => self.classic_time_played,
            Mode::SpeedRun => self.speed_time_played,
        }
    }

    fn add(&mut self, mode: Mode, minutes: f64) {
        match mode {
            Mode::Classic => self.classic_time_played += minutes,
            Mode::SpeedRun => self.speed_time_played += minutes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsRow {
    pub username: String,
    pub classic_time_played: f64,
    pub speed_time_played: f64,
    pub classic_high_score: u64,
    pub speed_high_score: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsReport {
    pub rows: Vec<AnalyticsRow>,
    pub total_classic_minutes: f64,
    pub total_speed_minutes: f64,
}

/// Converts a client-reported duration into minutes
pub fn duration_ms_to_minutes(duration_ms: f64) -> f64 {
    duration_ms / 60_000.0
}

fn round_minutes(minutes: f64) -> f64 {
    (minutes * 100.0).round() / 100.0
}

pub struct AnalyticsAggregator {
    store: Arc<dyn Store>,
    records: Mutex<BTreeMap<String, PlayTimeRecord>>,
}

impl AnalyticsAggregator {
    pub fn load(store: Arc<dyn Store>) -> Result<Self, StoreError> {
        let stored: Vec<PlayTimeRecord> = load_json(store.as_ref(), PLAY_TIMES_KEY)?;

        let mut records: BTreeMap<String, PlayTimeRecord> = BTreeMap::new();
        for record in stored {
            let entry = records
                .entry(record.username.clone())
                .or_insert_with(|| PlayTimeRecord::new(record.username.clone()));
            entry.classic_time_played += sanitize(record.classic_time_played);
            entry.speed_time_played += sanitize(record.speed_time_played);
        }
        info!("Loaded play time for {} players", records.len());

        Ok(Self {
            store,
            records: Mutex::new(records),
        })
    }

    /// Adds `minutes` to the identity's total for `mode`.
    ///
    /// Negative or non-finite durations count as zero; the identity is still
    /// recorded.
    pub async fn record_session(
        &self,
        username: &str,
        mode: Mode,
        minutes: f64,
    ) -> Result<(), StoreError> {
        let mut records = self.records.lock().await;

        let mut next = records.clone();
        next.entry(username.to_string())
            .or_insert_with(|| PlayTimeRecord::new(username))
            .add(mode, sanitize(minutes));

        let rows: Vec<&PlayTimeRecord> = next.values().collect();
        persist_json(&self.store, PLAY_TIMES_KEY, &rows).await?;
        *records = next;

        debug!("Recorded {:.2} {} minutes for {}", minutes, mode.label(), username);
        Ok(())
    }

    pub async fn play_time(&self, username: &str) -> Option<PlayTimeRecord> {
        self.records.lock().await.get(username).cloned()
    }

    /// Joins play time with current high scores, one row per known identity
    pub async fn report(&self, leaderboards: &LeaderboardStore) -> AnalyticsReport {
        let records = self.records.lock().await.clone();
        let classic = leaderboards.snapshot(Mode::Classic).await;
        let speed = leaderboards.snapshot(Mode::SpeedRun).await;

        let usernames: BTreeSet<&str> = records
            .keys()
            .map(String::as_str)
            .chain(classic.entries().iter().map(|e| e.username.as_str()))
            .chain(speed.entries().iter().map(|e| e.username.as_str()))
            .collect();

        let rows: Vec<AnalyticsRow> = usernames
            .into_iter()
            .map(|username| {
                let record = records.get(username);
                AnalyticsRow {
                    username: username.to_string(),
                    classic_time_played: round_minutes(
                        record.map_or(0.0, |r| r.minutes(Mode::Classic)),
                    ),
                    speed_time_played: round_minutes(
                        record.map_or(0.0, |r| r.minutes(Mode::SpeedRun)),
                    ),
                    classic_high_score: classic.best(username).unwrap_or(0),
                    speed_high_score: speed.best(username).unwrap_or(0),
                }
            })
            .collect();

        let total_classic: f64 = records.values().map(|r| r.classic_time_played).sum();
        let total_speed: f64 = records.values().map(|r| r.speed_time_played).sum();

        AnalyticsReport {
            rows,
            total_classic_minutes: round_minutes(total_classic),
            total_speed_minutes: round_minutes(total_speed),
        }
    }
}

fn sanitize(minutes: f64) -> f64 {
    if minutes.is_finite() && minutes > 0.0 {
        minutes
    } else {
        0.0
    }
}
