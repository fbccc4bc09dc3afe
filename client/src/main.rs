use clap::Parser;
use client::game::{GameMachine, SessionEvent};
use client::input::InputManager;
use client::network::{Backend, BackendReply};
use client::rendering::Renderer;
use client::scheduler::TickScheduler;
use log::{error, info};
use macroquad::prelude::*;
use shared::Field;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Score server base URL
    #[arg(short = 's', long, env = "GAME_SERVER", default_value = "http://127.0.0.1:3000")]
    server: String,

    /// Identity scores are submitted under; defaults to @$USER
    #[arg(short = 'u', long, env = "GAME_USERNAME")]
    username: Option<String>,

    /// Window width
    #[arg(short = 'w', long, default_value = "480")]
    width: u32,

    /// Window height; -h belongs to --help
    #[arg(long, default_value = "800")]
    height: u32,
}

impl Args {
    fn username(&self) -> String {
        self.username
            .clone()
            .or_else(|| std::env::var("USER").ok().map(|user| format!("@{}", user)))
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| "@player".to_string())
    }
}

fn window_conf() -> Conf {
    let args = Args::parse();
    Conf {
        window_title: "Flappy Quakks".to_string(),
        window_width: args.width as i32,
        window_height: args.height as i32,
        window_resizable: false,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to start network runtime: {}", e);
            return;
        }
    };

    let username = args.username();
    info!("Playing as {} against {}", username, args.server);

    let field = Field::new(args.width as f32, args.height as f32);
    let mut machine = GameMachine::new(field);
    let mut backend = Backend::new(&args.server, &username, runtime.handle().clone());
    let mut input = InputManager::new();
    let mut scheduler = TickScheduler::new();
    let renderer = Renderer::new(field);

    backend.fetch_skin();

    loop {
        for reply in backend.drain() {
            match reply {
                BackendReply::Leaderboard { mode, entries } => {
                    machine.show_leaderboard(mode, entries);
                }
                BackendReply::Skin(variant) => machine.restore_skin(variant),
            }
        }

        let mut events: Vec<SessionEvent> = Vec::new();
        for event in input.poll() {
            events.extend(machine.handle_input(event));
        }
        scheduler.run(get_frame_time(), |dt| events.extend(machine.advance(dt)));

        for event in &events {
            backend.dispatch(event);
        }

        renderer.render(&machine);
        next_frame().await;
    }
}
