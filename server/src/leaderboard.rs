//! Per-mode ranked lists of best scores
//!
//! Each mode's list sits behind its own async mutex, held for the whole
//! read-modify-write-persist span of a submission. Two submissions for the
//! same mode therefore never interleave, while Classic and Speed Run lists
//! update independently.
//!
//! Storage keeps every identity ever ranked; only [`LeaderboardStore::query`]
//! truncates to the top [`LEADERBOARD_SIZE`]. A mutation reaches memory only
//! after it has been persisted.

use crate::storage::{load_json, persist_json, Store, StoreError};
use log::{debug, info};
use shared::{LeaderboardEntry, Mode, LEADERBOARD_SIZE};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

#[derive(Debug, Error)]
pub enum LeaderboardError {
    #[error("{username} not found on {mode} leaderboard")]
    NotFound { mode: &'static str, username: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result of a max-merge submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// First score for this identity
    Inserted,
    /// Replaced a lower personal best
    Improved { previous: u64 },
    /// Did not beat the recorded best, nothing changed
    Kept { best: u64 },
}

impl SubmitOutcome {
    pub fn changed(&self) -> bool {
        !matches!(self, SubmitOutcome::Kept { .. })
    }
}

/// De-duplicated list of entries, sorted descending by score.
///
/// Sorting is stable, so equal scores keep their relative order across
/// submissions and queries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankedList {
    entries: Vec<LeaderboardEntry>,
}

impl RankedList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a list from stored entries, collapsing duplicate identities
    /// to their best score
    pub fn from_entries(stored: Vec<LeaderboardEntry>) -> Self {
        let mut list = Self::new();
        for entry in stored {
            list.merge(entry.username, entry.score);
        }
        list.sort();
        list
    }

    /// Max-merges a score for `username`
    pub fn submit(&mut self, username: &str, score: u64) -> SubmitOutcome {
        let outcome = self.merge(username.to_string(), score);
        if outcome.changed() {
            self.sort();
        }
        outcome
    }

    fn merge(&mut self, username: String, score: u64) -> SubmitOutcome {
        match self.entries.iter_mut().find(|e| e.username == username) {
            Some(existing) if score > existing.score => {
                let previous = existing.score;
                existing.score = score;
                SubmitOutcome::Improved { previous }
            }
            Some(existing) => SubmitOutcome::Kept {
                best: existing.score,
            },
            None => {
                self.entries.push(LeaderboardEntry { username, score });
                SubmitOutcome::Inserted
            }
        }
    }

    fn sort(&mut self) {
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
    }

    /// Sets `username`'s score outright, even if lower than the current best
    pub fn set(&mut self, username: &str, score: u64) {
        match self.entries.iter_mut().find(|e| e.username == username) {
            Some(existing) => existing.score = score,
            None => self.entries.push(LeaderboardEntry::new(username, score)),
        }
        self.sort();
    }

    /// Removes the entry for `username`; returns false if absent
    pub fn remove(&mut self, username: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.username != username);
        self.entries.len() < before
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn top(&self, n: usize) -> Vec<LeaderboardEntry> {
        self.entries.iter().take(n).cloned().collect()
    }

    pub fn best(&self, username: &str) -> Option<u64> {
        self.entries
            .iter()
            .find(|e| e.username == username)
            .map(|e| e.score)
    }

    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Storage key of a mode's ranked list
pub fn storage_key(mode: Mode) -> &'static str {
    match mode {
        Mode::Classic => "leaderboard",
        Mode::SpeedRun => "sr-leaderboard",
    }
}

/// Owns both modes' ranked lists and their persistence
pub struct LeaderboardStore {
    store: Arc<dyn Store>,
    classic: Mutex<RankedList>,
    speed_run: Mutex<RankedList>,
}

impl LeaderboardStore {
    /// Loads both lists, self-healing anything missing or malformed.
    /// Fails if either list exists but cannot be read.
    pub fn load(store: Arc<dyn Store>) -> Result<Self, StoreError> {
        let classic = Self::load_list(store.as_ref(), Mode::Classic)?;
        let speed_run = Self::load_list(store.as_ref(), Mode::SpeedRun)?;
        Ok(Self {
            store,
            classic: Mutex::new(classic),
            speed_run: Mutex::new(speed_run),
        })
    }

    fn load_list(store: &dyn Store, mode: Mode) -> Result<RankedList, StoreError> {
        let stored: Vec<LeaderboardEntry> = load_json(store, storage_key(mode))?;
        let list = RankedList::from_entries(stored);
        info!("Loaded {} {} leaderboard entries", list.len(), mode.label());
        Ok(list)
    }

    fn list(&self, mode: Mode) -> &Mutex<RankedList> {
        match mode {
            Mode::Classic => &self.classic,
            Mode::SpeedRun => &self.speed_run,
        }
    }

    /// Max-merges `score` into `mode`'s list and persists the result
    pub async fn submit(
        &self,
        mode: Mode,
        username: &str,
        score: u64,
    ) -> Result<SubmitOutcome, LeaderboardError> {
        let mut list = self.list(mode).lock().await;

        let mut next = list.clone();
        let outcome = next.submit(username, score);
        if outcome.changed() {
            persist_json(&self.store, storage_key(mode), next.entries()).await?;
            *list = next;
        }

        debug!("{} submit {} -> {:?}", mode.label(), username, outcome);
        Ok(outcome)
    }

    /// Top entries for `mode`, best first
    pub async fn query(&self, mode: Mode) -> Vec<LeaderboardEntry> {
        self.list(mode).lock().await.top(LEADERBOARD_SIZE)
    }

    /// Full, untruncated list for `mode`
    pub async fn snapshot(&self, mode: Mode) -> RankedList {
        self.list(mode).lock().await.clone()
    }

    pub async fn best(&self, mode: Mode, username: &str) -> Option<u64> {
        self.list(mode).lock().await.best(username)
    }

    /// Deletes one identity's entry
    pub async fn remove(&self, mode: Mode, username: &str) -> Result<(), LeaderboardError> {
        let mut list = self.list(mode).lock().await;

        let mut next = list.clone();
        if !next.remove(username) {
            return Err(LeaderboardError::NotFound {
                mode: mode.label(),
                username: username.to_string(),
            });
        }
        persist_json(&self.store, storage_key(mode), next.entries()).await?;
        *list = next;

        info!("Removed {} from {} leaderboard", username, mode.label());
        Ok(())
    }

    /// Overwrites one identity's score, inserting it if absent
    pub async fn set_score(
        &self,
        mode: Mode,
        username: &str,
        score: u64,
    ) -> Result<(), LeaderboardError> {
        let mut list = self.list(mode).lock().await;

        let mut next = list.clone();
        next.set(username, score);
        persist_json(&self.store, storage_key(mode), next.entries()).await?;
        *list = next;

        info!("Set {} score for {} to {}", mode.label(), username, score);
        Ok(())
    }

    /// Clears every entry for `mode`
    pub async fn reset(&self, mode: Mode) -> Result<(), LeaderboardError> {
        let mut list = self.list(mode).lock().await;

        persist_json(&self.store, storage_key(mode), &Vec::<LeaderboardEntry>::new()).await?;
        list.clear();

        info!("{} leaderboard has been reset", mode.label());
        Ok(())
    }
}
