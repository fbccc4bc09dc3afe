//! Integration tests across the shared simulation, the score server and the client
//!
//! These tests validate the full pipeline: a session ending in the client,
//! its submission reaching the server, and the ranked lists and analytics
//! that result.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use server::network::{router, AppState, ADMIN_TOKEN_HEADER};
use server::storage::{FileStore, MemoryStore};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

const TOKEN: &str = "integration";

fn app() -> Router {
    let state = AppState::open(Arc::new(MemoryStore::new()), Some(TOKEN.to_string())).unwrap();
    router(state, "")
}

async fn call(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn submit(path: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(path: &str) -> Request<Body> {
    Request::builder().uri(path).body(Body::empty()).unwrap()
}

fn admin_get(path: &str) -> Request<Body> {
    Request::builder()
        .uri(path)
        .header(ADMIN_TOKEN_HEADER, TOKEN)
        .body(Body::empty())
        .unwrap()
}

fn scores(body: &Value) -> Vec<u64> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["score"].as_u64().unwrap())
        .collect()
}

/// LEADERBOARD PIPELINE TESTS
mod leaderboard_tests {
    use super::*;

    /// A lower later score never replaces a player's best
    #[tokio::test]
    async fn max_merge_end_to_end() {
        let app = app();

        call(&app, submit("/submit", json!({"username": "@a", "score": 10}))).await;
        call(&app, submit("/submit", json!({"username": "@a", "score": 7}))).await;

        let (status, body) = call(&app, get("/leaderboard")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([{"username": "@a", "score": 10}]));
    }

    /// Distinct players come back sorted descending, ties in a stable order
    #[tokio::test]
    async fn ordering_with_ties_is_stable() {
        let app = app();
        for (name, score) in [("@a", 5), ("@b", 9), ("@c", 3), ("@d", 9), ("@e", 1)] {
            call(&app, submit("/submit", json!({"username": name, "score": score}))).await;
        }

        let (_, first) = call(&app, get("/leaderboard")).await;
        let (_, second) = call(&app, get("/leaderboard")).await;

        assert_eq!(scores(&first), vec![9, 9, 5, 3, 1]);
        assert_eq!(first, second);
    }

    /// Queries cap at ten while the full list survives in storage
    #[tokio::test]
    async fn query_truncates_storage_does_not() {
        let store = Arc::new(MemoryStore::new());
        let app = router(AppState::open(store.clone(), None).unwrap(), "");
        for i in 0..14 {
            call(
                &app,
                submit("/SR-submit", json!({"username": format!("@p{i}"), "score": i})),
            )
            .await;
        }

        let (_, body) = call(&app, get("/SR-leaderboard")).await;
        assert_eq!(body.as_array().unwrap().len(), 10);
        assert_eq!(scores(&body)[0], 13);

        let reopened = AppState::open(store.clone(), None).unwrap();
        assert_eq!(
            reopened
                .leaderboards
                .snapshot(shared::Mode::SpeedRun)
                .await
                .len(),
            14
        );
    }

    /// State written through a file store is served again after a restart
    #[tokio::test]
    async fn file_store_survives_restart() {
        let dir = tempfile::tempdir().unwrap();

        let first = router(
            AppState::open(Arc::new(FileStore::open(dir.path()).unwrap()), None).unwrap(),
            "",
        );
        call(&first, submit("/submit", json!({"username": "@a", "score": 21}))).await;
        drop(first);

        let second = router(
            AppState::open(Arc::new(FileStore::open(dir.path()).unwrap()), None).unwrap(),
            "",
        );
        let (_, body) = call(&second, get("/leaderboard")).await;
        assert_eq!(body, json!([{"username": "@a", "score": 21}]));
    }

    /// Corrupt data files load as empty and are rewritten
    #[tokio::test]
    async fn corrupt_file_self_heals() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("leaderboard.json"), "{{{").unwrap();

        let app = router(
            AppState::open(Arc::new(FileStore::open(dir.path()).unwrap()), None).unwrap(),
            "",
        );
        let (status, body) = call(&app, get("/leaderboard")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
        let healed = std::fs::read_to_string(dir.path().join("leaderboard.json")).unwrap();
        assert_eq!(healed, "[]");
    }
}

/// ANALYTICS TESTS
mod analytics_tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    /// Durations accumulate per mode and join with high scores
    #[tokio::test]
    async fn report_joins_play_time_and_scores() {
        let app = app();
        call(
            &app,
            submit("/submit", json!({"username": "@a", "score": 4, "durationMs": 150_000})),
        )
        .await;
        call(
            &app,
            submit("/submit", json!({"username": "@a", "score": 2, "durationMs": 90_000})),
        )
        .await;
        call(
            &app,
            submit("/SR-submit", json!({"username": "@b", "score": 12, "durationMs": 30_000})),
        )
        .await;

        let (status, report) = call(&app, admin_get("/admin/analytics")).await;
        assert_eq!(status, StatusCode::OK);

        let rows = report["rows"].as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["username"], "@a");
        assert_approx_eq!(rows[0]["classic_time_played"].as_f64().unwrap(), 4.0);
        assert_eq!(rows[0]["classic_high_score"], 4);
        assert_eq!(rows[0]["speed_high_score"], 0);
        assert_eq!(rows[1]["username"], "@b");
        assert_approx_eq!(rows[1]["speed_time_played"].as_f64().unwrap(), 0.5);
        assert_eq!(rows[1]["classic_high_score"], 0);
        assert_approx_eq!(report["total_classic_minutes"].as_f64().unwrap(), 4.0);
        assert_approx_eq!(report["total_speed_minutes"].as_f64().unwrap(), 0.5);
    }

    /// A rejected submission leaves both the ranking and play time untouched
    #[tokio::test]
    async fn invalid_submission_mutates_nothing() {
        let app = app();
        let (status, body) = call(
            &app,
            submit("/submit", json!({"username": "@a", "score": "lots", "durationMs": 60_000})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Invalid payload"}));

        let (_, report) = call(&app, admin_get("/admin/analytics")).await;
        assert!(report["rows"].as_array().unwrap().is_empty());
    }
}

/// GAME SESSION TESTS
mod game_session_tests {
    use super::*;
    use client::game::{GameMachine, InputEvent, Screen, SessionEvent};
    use client::layout::{buttons, Action};
    use client::scheduler::TickScheduler;
    use shared::{Field, Mode};

    fn tap(machine: &mut GameMachine, action: Action) -> Vec<SessionEvent> {
        let button = buttons(machine.screen(), machine.field())
            .into_iter()
            .find(|b| b.action == action)
            .unwrap();
        machine.handle_input(InputEvent::Pointer {
            x: button.rect.x + button.rect.w / 2.0,
            y: button.rect.y + button.rect.h / 2.0,
        })
    }

    /// Drives a session through the scheduler until it ends on its own
    fn play_out(machine: &mut GameMachine, flap_every: Option<u32>) -> Vec<SessionEvent> {
        let mut scheduler = TickScheduler::new();
        let mut events = Vec::new();
        let mut frame = 0u32;

        while machine.screen() == Screen::Play && frame < 60 * 120 {
            if let Some(n) = flap_every {
                if frame % n == 0 {
                    events.extend(machine.handle_input(InputEvent::Flap));
                }
            }
            scheduler.run(1.0 / 60.0, |dt| events.extend(machine.advance(dt)));
            frame += 1;
        }
        events
    }

    /// A session that ends produces exactly one submission the server accepts
    #[tokio::test]
    async fn finished_session_is_submitted() {
        let app = app();
        let mut machine = GameMachine::with_seed(Field::new(480.0, 800.0), 42);
        tap(&mut machine, Action::SelectMode(Mode::SpeedRun));
        tap(&mut machine, Action::Start);

        let events = play_out(&mut machine, Some(18));
        assert_eq!(machine.screen(), Screen::GameOver);

        let submissions: Vec<(Mode, u32, u64)> = events
            .iter()
            .filter_map(|e| match e {
                SessionEvent::SubmitScore {
                    mode,
                    score,
                    duration_ms,
                } => Some((*mode, *score, *duration_ms)),
                _ => None,
            })
            .collect();
        assert_eq!(submissions.len(), 1);

        let (mode, score, duration_ms) = submissions[0];
        assert_eq!(mode, Mode::SpeedRun);
        let (status, _) = call(
            &app,
            submit(
                "/SR-submit",
                json!({"username": "@sim", "score": score, "durationMs": duration_ms}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, board) = call(&app, get("/SR-leaderboard")).await;
        assert_eq!(board[0]["username"], "@sim");
        assert_eq!(board[0]["score"].as_u64().unwrap(), u64::from(score));
    }

    /// Replaying keeps the skin and starts from the mode defaults
    #[test]
    fn replay_after_game_over() {
        let mut machine = GameMachine::with_seed(Field::new(480.0, 800.0), 3);
        tap(&mut machine, Action::OpenSkinPicker);
        tap(&mut machine, Action::PickSkin(6));
        tap(&mut machine, Action::SelectMode(Mode::Classic));
        tap(&mut machine, Action::Start);
        play_out(&mut machine, None);

        tap(&mut machine, Action::Start);

        assert_eq!(machine.screen(), Screen::Play);
        assert_eq!(machine.skin(), Some(6));
        let session = machine.session().unwrap();
        assert_eq!(session.score, 0);
        assert_eq!(session.params, Mode::Classic.defaults());
    }
}

/// CLIENT SERVER TESTS
mod client_server_tests {
    use super::*;
    use client::game::SessionEvent;
    use client::network::{Backend, BackendReply};
    use shared::{LeaderboardEntry, Mode};
    use tokio::net::TcpListener;

    async fn spawn_server() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = router(
            AppState::open(Arc::new(MemoryStore::new()), None).unwrap(),
            "/flappy_quakks",
        );
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/flappy_quakks", addr)
    }

    async fn wait_for_reply(backend: &mut Backend) -> Option<BackendReply> {
        for _ in 0..50 {
            if let Some(reply) = backend.drain().into_iter().next() {
                return Some(reply);
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        None
    }

    /// Submissions and skin picks made by the backend are visible on the next fetch
    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn backend_round_trip() {
        let base = spawn_server().await;
        let mut backend = Backend::new(&base, "@net", tokio::runtime::Handle::current());

        backend.dispatch(&SessionEvent::SubmitScore {
            mode: Mode::Classic,
            score: 17,
            duration_ms: 45_000,
        });
        backend.dispatch(&SessionEvent::SkinSelected(2));
        tokio::time::sleep(Duration::from_millis(200)).await;

        backend.dispatch(&SessionEvent::FetchLeaderboard(Mode::Classic));
        let reply = wait_for_reply(&mut backend).await;
        assert_eq!(
            reply,
            Some(BackendReply::Leaderboard {
                mode: Mode::Classic,
                entries: vec![LeaderboardEntry::new("@net", 17)],
            })
        );

        backend.fetch_skin();
        let reply = wait_for_reply(&mut backend).await;
        assert_eq!(reply, Some(BackendReply::Skin(Some(2))));
    }
}
