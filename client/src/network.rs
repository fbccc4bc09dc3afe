//! Fire-and-forget calls to the score server
//!
//! Every request runs as a task on a tokio runtime owned by the binary. The
//! simulation never waits on them: results that matter to the game (fetched
//! leaderboards, the remembered skin) come back through a channel drained
//! once per frame. Failures are logged and never retried.

use crate::game::SessionEvent;
use log::{debug, error, info};
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared::protocol::{SelectSkinRequest, SkinResponse};
use shared::{LeaderboardEntry, Mode, SubmitRequest};
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::mpsc;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} answered {status}")]
    Status { url: String, status: u16 },
}

/// Results delivered back to the game loop
#[derive(Debug, Clone, PartialEq)]
pub enum BackendReply {
    Leaderboard {
        mode: Mode,
        entries: Vec<LeaderboardEntry>,
    },
    Skin(Option<u32>),
}

pub fn submit_url(base: &str, mode: Mode) -> String {
    match mode {
        Mode::Classic => format!("{}/submit", base),
        Mode::SpeedRun => format!("{}/SR-submit", base),
    }
}

pub fn leaderboard_url(base: &str, mode: Mode) -> String {
    match mode {
        Mode::Classic => format!("{}/leaderboard", base),
        Mode::SpeedRun => format!("{}/SR-leaderboard", base),
    }
}

pub struct Backend {
    http: reqwest::Client,
    base_url: String,
    username: String,
    runtime: Handle,
    reply_tx: mpsc::UnboundedSender<BackendReply>,
    reply_rx: mpsc::UnboundedReceiver<BackendReply>,
}

impl Backend {
    pub fn new(base_url: &str, username: &str, runtime: Handle) -> Self {
        let (reply_tx, reply_rx) = mpsc::unbounded_channel();
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            username: username.to_string(),
            runtime,
            reply_tx,
            reply_rx,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Starts whatever network call `event` asks for, if any
    pub fn dispatch(&self, event: &SessionEvent) {
        match event {
            SessionEvent::SubmitScore {
                mode,
                score,
                duration_ms,
            } => self.submit_score(*mode, *score, *duration_ms),
            SessionEvent::FetchLeaderboard(mode) => self.fetch_leaderboard(*mode),
            SessionEvent::SkinSelected(variant) => self.select_skin(*variant),
            _ => {}
        }
    }

    pub fn submit_score(&self, mode: Mode, score: u32, duration_ms: u64) {
        let http = self.http.clone();
        let url = submit_url(&self.base_url, mode);
        let body = SubmitRequest {
            username: self.username.clone(),
            score: u64::from(score),
            duration_ms: Some(duration_ms),
        };

        self.runtime.spawn(async move {
            match post_json(&http, &url, &body).await {
                Ok(()) => info!("Submitted {} score {}", mode.label(), body.score),
                Err(e) => error!("Score submission failed: {}", e),
            }
        });
    }

    pub fn fetch_leaderboard(&self, mode: Mode) {
        let http = self.http.clone();
        let url = leaderboard_url(&self.base_url, mode);
        let reply_tx = self.reply_tx.clone();

        self.runtime.spawn(async move {
            match get_json::<Vec<LeaderboardEntry>>(&http, &url).await {
                Ok(entries) => {
                    debug!("Fetched {} {} entries", entries.len(), mode.label());
                    let _ = reply_tx.send(BackendReply::Leaderboard { mode, entries });
                }
                Err(e) => error!("Leaderboard fetch failed: {}", e),
            }
        });
    }

    pub fn fetch_skin(&self) {
        let http = self.http.clone();
        let url = format!("{}/getQuakk", self.base_url);
        let username = self.username.clone();
        let reply_tx = self.reply_tx.clone();

        self.runtime.spawn(async move {
            let request = http.get(&url).query(&[("username", username.as_str())]);
            match send_for_json::<SkinResponse>(request, &url).await {
                Ok(response) => {
                    let _ = reply_tx.send(BackendReply::Skin(response.variant));
                }
                Err(e) => error!("Skin fetch failed: {}", e),
            }
        });
    }

    pub fn select_skin(&self, variant: u32) {
        let http = self.http.clone();
        let url = format!("{}/selectQuakk", self.base_url);
        let body = SelectSkinRequest {
            username: self.username.clone(),
            variant,
        };

        self.runtime.spawn(async move {
            if let Err(e) = post_json(&http, &url, &body).await {
                error!("Skin selection failed: {}", e);
            }
        });
    }

    /// Replies that arrived since the last call
    pub fn drain(&mut self) -> Vec<BackendReply> {
        let mut replies = Vec::new();
        while let Ok(reply) = self.reply_rx.try_recv() {
            replies.push(reply);
        }
        replies
    }
}

async fn post_json<T: Serialize>(
    http: &reqwest::Client,
    url: &str,
    body: &T,
) -> Result<(), ClientError> {
    let response = http.post(url).json(body).send().await?;
    check_status(url, &response)?;
    Ok(())
}

async fn get_json<T: DeserializeOwned>(http: &reqwest::Client, url: &str) -> Result<T, ClientError> {
    send_for_json(http.get(url), url).await
}

async fn send_for_json<T: DeserializeOwned>(
    request: reqwest::RequestBuilder,
    url: &str,
) -> Result<T, ClientError> {
    let response = request.send().await?;
    check_status(url, &response)?;
    Ok(response.json::<T>().await?)
}

fn check_status(url: &str, response: &reqwest::Response) -> Result<(), ClientError> {
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(ClientError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        })
    }
}
