//! JSON bodies exchanged between the game client and the score server

use serde::{Deserialize, Serialize};

/// Body of `POST /submit` and `POST /SR-submit` as sent by the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitRequest {
    pub username: String,
    pub score: u64,
    #[serde(rename = "durationMs", skip_serializing_if = "Option::is_none", default)]
    pub duration_ms: Option<u64>,
}

/// One ranked row as served by the leaderboard endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub username: String,
    pub score: u64,
}

impl LeaderboardEntry {
    pub fn new(username: impl Into<String>, score: u64) -> Self {
        Self {
            username: username.into(),
            score,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Body of `GET /getQuakk`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkinResponse {
    pub variant: Option<u32>,
}

/// Body of `POST /selectQuakk`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectSkinRequest {
    pub username: String,
    pub variant: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}
