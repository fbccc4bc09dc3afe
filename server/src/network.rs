//! HTTP layer: request validation, routing and the server entry point

use crate::analytics::{duration_ms_to_minutes, AnalyticsAggregator, AnalyticsReport};
use crate::leaderboard::{LeaderboardError, LeaderboardStore};
use crate::skins::SkinPicks;
use crate::storage::{Store, StoreError};
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use log::{error, info, warn};
use serde::Deserialize;
use shared::protocol::{ErrorResponse, SkinResponse, StatusResponse, SuccessResponse};
use shared::{LeaderboardEntry, Mode};
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;

pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// Largest score accepted; keeps the f64 -> u64 conversion exact
const MAX_SCORE: f64 = 9_007_199_254_740_991.0;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid payload")]
    InvalidPayload,

    #[error("username required")]
    MissingUsername,

    #[error("username & variant required")]
    MissingSkinFields,

    #[error("Unknown variant {0}")]
    UnknownSkin(u32),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    NotFound(String),

    #[error("Unknown mode {0}")]
    UnknownMode(String),

    #[error("Could not save {0}")]
    Persistence(&'static str),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidPayload
            | ApiError::MissingUsername
            | ApiError::MissingSkinFields
            | ApiError::UnknownSkin(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) | ApiError::UnknownMode(_) => StatusCode::NOT_FOUND,
            ApiError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

/// Shared handles behind every request handler
#[derive(Clone)]
pub struct AppState {
    pub leaderboards: Arc<LeaderboardStore>,
    pub analytics: Arc<AnalyticsAggregator>,
    pub skins: Arc<SkinPicks>,
    admin_token: Option<Arc<str>>,
}

impl AppState {
    /// Loads every component from `store`.
    ///
    /// Fails when a stored value exists but cannot be read, rather than
    /// serving (and later overwriting) an empty stand-in.
    pub fn open(store: Arc<dyn Store>, admin_token: Option<String>) -> Result<Self, StoreError> {
        Ok(Self {
            leaderboards: Arc::new(LeaderboardStore::load(Arc::clone(&store))?),
            analytics: Arc::new(AnalyticsAggregator::load(Arc::clone(&store))?),
            skins: Arc::new(SkinPicks::load(store)?),
            admin_token: admin_token
                .filter(|token| !token.is_empty())
                .map(Arc::from),
        })
    }

    fn authorize(&self, headers: &HeaderMap) -> Result<(), ApiError> {
        let expected = self.admin_token.as_deref().ok_or(ApiError::Unauthorized)?;
        let presented = headers
            .get(ADMIN_TOKEN_HEADER)
            .and_then(|value| value.to_str().ok());

        match presented {
            Some(token) if token == expected => Ok(()),
            _ => {
                warn!("Rejected admin request with missing or wrong token");
                Err(ApiError::Unauthorized)
            }
        }
    }
}

/// Raw submission body before validation
#[derive(Debug, Deserialize)]
struct SubmitPayload {
    username: String,
    score: f64,
    #[serde(rename = "durationMs", default)]
    duration_ms: Option<f64>,
}

/// A validated score submission
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub username: String,
    pub score: u64,
    pub duration_minutes: f64,
}

impl Submission {
    /// Validates a JSON submission body
    pub fn parse(body: &[u8]) -> Result<Self, ApiError> {
        let payload: SubmitPayload =
            serde_json::from_slice(body).map_err(|_| ApiError::InvalidPayload)?;

        let username = payload.username.trim();
        if username.is_empty() {
            return Err(ApiError::MissingUsername);
        }

        let score = parse_score(payload.score)?;

        let duration_ms = match payload.duration_ms {
            Some(ms) if !ms.is_finite() || ms < 0.0 => return Err(ApiError::InvalidPayload),
            Some(ms) => ms,
            None => 0.0,
        };

        Ok(Self {
            username: username.to_string(),
            score,
            duration_minutes: duration_ms_to_minutes(duration_ms),
        })
    }
}

fn parse_score(score: f64) -> Result<u64, ApiError> {
    if !score.is_finite() || score < 0.0 || score.fract() != 0.0 || score > MAX_SCORE {
        return Err(ApiError::InvalidPayload);
    }
    Ok(score as u64)
}

#[derive(Debug, Deserialize)]
struct SetScorePayload {
    score: f64,
}

#[derive(Debug, Deserialize)]
struct SkinQuery {
    username: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SelectSkinPayload {
    username: Option<String>,
    variant: Option<u32>,
}

/// Builds the full route table, nested under `base_path` when non-empty
pub fn router(state: AppState, base_path: &str) -> Router {
    let routes = Router::new()
        .route("/submit", post(submit_classic))
        .route("/SR-submit", post(submit_speed_run))
        .route("/leaderboard", get(leaderboard_classic))
        .route("/SR-leaderboard", get(leaderboard_speed_run))
        .route("/getQuakk", get(get_skin))
        .route("/selectQuakk", post(select_skin))
        .route("/admin/analytics", get(admin_analytics))
        .route("/admin/{mode}", delete(admin_reset))
        .route(
            "/admin/{mode}/{username}",
            delete(admin_remove).put(admin_set_score),
        )
        .with_state(state);

    let base = base_path.trim_matches('/');
    if base.is_empty() {
        routes
    } else {
        Router::new().nest(&format!("/{base}"), routes)
    }
}

async fn submit_classic(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<StatusResponse>, ApiError> {
    submit(&state, Mode::Classic, &body).await
}

async fn submit_speed_run(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<StatusResponse>, ApiError> {
    submit(&state, Mode::SpeedRun, &body).await
}

async fn submit(
    state: &AppState,
    mode: Mode,
    body: &[u8],
) -> Result<Json<StatusResponse>, ApiError> {
    let submission = Submission::parse(body).map_err(|e| {
        warn!("Rejected {} submission: {}", mode.label(), e);
        e
    })?;

    state
        .leaderboards
        .submit(mode, &submission.username, submission.score)
        .await
        .map_err(|e| {
            error!("Failed to persist {} leaderboard: {}", mode.label(), e);
            ApiError::Persistence("leaderboard")
        })?;

    state
        .analytics
        .record_session(&submission.username, mode, submission.duration_minutes)
        .await
        .map_err(|e| {
            error!("Failed to persist play time: {}", e);
            ApiError::Persistence("play time")
        })?;

    info!(
        "{} scored {} in {} ({:.2} min)",
        submission.username,
        submission.score,
        mode.label(),
        submission.duration_minutes
    );
    Ok(Json(StatusResponse::ok()))
}

async fn leaderboard_classic(State(state): State<AppState>) -> Json<Vec<LeaderboardEntry>> {
    Json(state.leaderboards.query(Mode::Classic).await)
}

async fn leaderboard_speed_run(State(state): State<AppState>) -> Json<Vec<LeaderboardEntry>> {
    Json(state.leaderboards.query(Mode::SpeedRun).await)
}

async fn get_skin(
    State(state): State<AppState>,
    Query(query): Query<SkinQuery>,
) -> Result<Json<SkinResponse>, ApiError> {
    let username = query
        .username
        .filter(|name| !name.trim().is_empty())
        .ok_or(ApiError::MissingUsername)?;

    let variant = state.skins.get(username.trim()).await;
    Ok(Json(SkinResponse { variant }))
}

async fn select_skin(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SuccessResponse>, ApiError> {
    let payload: SelectSkinPayload =
        serde_json::from_slice(&body).map_err(|_| ApiError::InvalidPayload)?;

    let (username, variant) = match (payload.username, payload.variant) {
        (Some(username), Some(variant)) if !username.trim().is_empty() => (username, variant),
        _ => return Err(ApiError::MissingSkinFields),
    };

    let accepted = state
        .skins
        .select(username.trim(), variant)
        .await
        .map_err(|e| {
            error!("Failed to persist skin pick: {}", e);
            ApiError::Persistence("skin pick")
        })?;

    if !accepted {
        return Err(ApiError::UnknownSkin(variant));
    }
    Ok(Json(SuccessResponse { success: true }))
}

fn parse_mode(raw: &str) -> Result<Mode, ApiError> {
    Mode::from_str(raw).ok_or_else(|| ApiError::UnknownMode(raw.to_string()))
}

async fn admin_remove(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((mode, username)): Path<(String, String)>,
) -> Result<Json<StatusResponse>, ApiError> {
    state.authorize(&headers)?;
    let mode = parse_mode(&mode)?;

    match state.leaderboards.remove(mode, &username).await {
        Ok(()) => Ok(Json(StatusResponse::ok())),
        Err(e @ LeaderboardError::NotFound { .. }) => Err(ApiError::NotFound(e.to_string())),
        Err(e) => {
            error!("Failed to persist {} leaderboard: {}", mode.label(), e);
            Err(ApiError::Persistence("leaderboard"))
        }
    }
}

/// Overwrites an identity's score outright, bypassing max-merge
async fn admin_set_score(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((mode, username)): Path<(String, String)>,
    body: Bytes,
) -> Result<Json<StatusResponse>, ApiError> {
    state.authorize(&headers)?;
    let mode = parse_mode(&mode)?;

    let payload: SetScorePayload =
        serde_json::from_slice(&body).map_err(|_| ApiError::InvalidPayload)?;
    let score = parse_score(payload.score)?;
    let username = username.trim();
    if username.is_empty() {
        return Err(ApiError::MissingUsername);
    }

    state
        .leaderboards
        .set_score(mode, username, score)
        .await
        .map_err(|e| {
            error!("Failed to persist {} leaderboard: {}", mode.label(), e);
            ApiError::Persistence("leaderboard")
        })?;
    Ok(Json(StatusResponse::ok()))
}

async fn admin_reset(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(mode): Path<String>,
) -> Result<Json<StatusResponse>, ApiError> {
    state.authorize(&headers)?;
    let mode = parse_mode(&mode)?;

    state.leaderboards.reset(mode).await.map_err(|e| {
        error!("Failed to reset {} leaderboard: {}", mode.label(), e);
        ApiError::Persistence("leaderboard")
    })?;
    Ok(Json(StatusResponse::ok()))
}

async fn admin_analytics(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<AnalyticsReport>, ApiError> {
    state.authorize(&headers)?;
    Ok(Json(state.analytics.report(&state.leaderboards).await))
}

/// Score server bound to a TCP listener
pub struct Server {
    listener: TcpListener,
    app: Router,
}

impl Server {
    pub async fn new(
        addr: &str,
        state: AppState,
        base_path: &str,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let listener = TcpListener::bind(addr).await?;
        info!("Server listening on {}", listener.local_addr()?);

        Ok(Server {
            listener,
            app: router(state, base_path),
        })
    }

    /// Serves requests until Ctrl+C
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        axum::serve(self.listener, self.app)
            .with_graceful_shutdown(async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    error!("Failed to listen for shutdown signal: {}", e);
                }
                info!("Server shutting down");
            })
            .await?;
        Ok(())
    }
}
