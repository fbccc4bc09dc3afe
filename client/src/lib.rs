//! # Game Client Library
//!
//! This library provides the playable side of the game: the screen flow, the
//! per-session simulation, input capture, drawing, and the calls that report
//! scores to the server.
//!
//! ## Architecture Overview
//!
//! ### Event-Returning State Machine
//! [`game::GameMachine`] is the single owner of game state. Inputs and ticks
//! go in; a list of [`game::SessionEvent`]s comes out. Submitting a score,
//! fetching a leaderboard or saving a skin pick are all requests expressed as
//! events, so the whole screen flow can be driven in tests without a window
//! or a server.
//!
//! ### Fixed Timestep
//! The simulation always advances in 1/60 s steps. [`scheduler::TickScheduler`]
//! turns the real frame time into a whole number of steps, carrying the
//! remainder to the next frame and dropping anything beyond five steps after
//! a stall.
//!
//! ### Non-Blocking Network
//! [`network::Backend`] spawns every HTTP call on a tokio runtime and returns
//! immediately. Replies the game needs are queued and drained at the start of
//! the next frame.
//!
//! ## Module Organization
//!
//! ### Game Module (`game`)
//! - Screens: mode select, welcome, play, game over, skin picker, leaderboard
//! - Per-session parameters, score, elapsed time and termination cause
//! - Tick order: scroll obstacles, integrate, collide, award passes, escalate
//!
//! ### Layout Module (`layout`)
//! Button rectangles for each screen, used for both hit-testing and drawing.
//!
//! ### Input Module (`input`)
//! Edge-detected taps and flap key presses.
//!
//! ### Network Module (`network`)
//! Score submission, leaderboard fetch, skin load and save.
//!
//! ### Rendering Module (`rendering`)
//! macroquad drawing of the field, obstacles, entity, menus and leaderboard.
//!
//! ## Usage Example
//!
//! ```rust
//! use client::game::{GameMachine, InputEvent, Screen};
//! use client::layout::{buttons, Action};
//! use shared::{Field, TICK_DT};
//!
//! let mut machine = GameMachine::with_seed(Field::new(480.0, 800.0), 1);
//!
//! // Tap "Classic", then "Start"
//! for action in [Action::SelectMode(shared::Mode::Classic), Action::Start] {
//!     let button = buttons(machine.screen(), machine.field())
//!         .into_iter()
//!         .find(|b| b.action == action)
//!         .unwrap();
//!     machine.handle_input(InputEvent::Pointer { x: button.rect.x + 1.0, y: button.rect.y + 1.0 });
//! }
//! assert_eq!(machine.screen(), Screen::Play);
//!
//! // Never flapping: the entity falls to the ground and the session ends
//! let mut events = Vec::new();
//! while machine.screen() == Screen::Play {
//!     events.extend(machine.advance(TICK_DT));
//! }
//! assert_eq!(machine.screen(), Screen::GameOver);
//! ```

pub mod game;
pub mod input;
pub mod layout;
pub mod network;
pub mod rendering;
pub mod scheduler;
