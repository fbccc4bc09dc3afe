//! # Score Server Library
//!
//! This library provides the score submission and ranking service for the
//! game. Clients submit a final score when a session ends; the server keeps
//! one ranked list per mode, accumulates play time per player, and remembers
//! each player's chosen skin.
//!
//! ## Core Responsibilities
//!
//! ### Ranked Lists
//! Each mode (Classic, Speed Run) owns an independent list holding at most one
//! entry per player. A later submission only replaces a player's entry when
//! it is strictly greater (max-merge), so a recorded best never decreases.
//! Queries return the top ten, best first; storage keeps every player.
//!
//! ### Play-Time Analytics
//! Every accepted submission adds the session's duration to the player's
//! cumulative minutes for that mode, whether or not the score was a new best.
//! The analytics report joins these totals with current high scores on
//! demand; it is never stored.
//!
//! ### Persistence
//! All state lives behind a narrow key-value [`storage::Store`] with an atomic
//! replace primitive. Missing or corrupt values load as empty and are
//! rewritten in their empty form, so a damaged data file never stops the
//! server from starting.
//!
//! ## Architecture Design
//!
//! ### Serialized Writes Per Mode
//! Every ranked list sits behind its own async mutex, held across the whole
//! read-modify-write-persist span. Concurrent submissions to the same mode
//! queue up instead of interleaving; the two modes never block each other.
//!
//! ### Persist Before Commit
//! A mutation is applied to a copy, the copy is persisted, and only then does
//! it replace the in-memory value. A failed write leaves memory exactly as it
//! was and surfaces as HTTP 500.
//!
//! ## Module Organization
//!
//! - [`storage`]: `Store` trait, file and in-memory backends, JSON load/save
//! - [`leaderboard`]: `RankedList` and the per-mode `LeaderboardStore`
//! - [`analytics`]: play-time accumulation and the joined report
//! - [`skins`]: remembered skin variant per player
//! - [`network`]: request validation, axum routes and the `Server` entry point
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::network::{AppState, Server};
//! use server::storage::FileStore;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(FileStore::open("./data")?);
//!     let state = AppState::open(store, Some("admin-secret".to_string()))?;
//!
//!     // Serves /submit, /leaderboard, ... until Ctrl+C
//!     let server = Server::new("127.0.0.1:3000", state, "").await?;
//!     server.run().await?;
//!
//!     Ok(())
//! }
//! ```

pub mod analytics;
pub mod leaderboard;
pub mod network;
pub mod skins;
pub mod storage;
