use clap::Parser;
use log::info;
use server::network::{AppState, Server};
use server::storage::FileStore;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(author, version, about = "Score and leaderboard server")]
struct Args {
    /// Address to bind to
    #[arg(short = 'H', long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    #[arg(short, long, env = "PORT", default_value = "3000")]
    port: u16,

    /// Directory holding the JSON data files
    #[arg(short, long, env = "DATA_DIR", default_value = "./data")]
    data_dir: PathBuf,

    /// Token required in the x-admin-token header; admin routes are disabled when unset
    #[arg(long, env = "ADMIN_TOKEN")]
    admin_token: Option<String>,

    /// Prefix every route is mounted under, e.g. /flappy_quakks
    #[arg(long, env = "BASE_PATH", default_value = "")]
    base_path: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let store = Arc::new(FileStore::open(&args.data_dir)?);
    info!("Using data directory {}", store.dir().display());

    if args.admin_token.is_none() {
        info!("No admin token configured, admin routes are disabled");
    }
    let state = AppState::open(store, args.admin_token)?;

    let addr = format!("{}:{}", args.host, args.port);
    let server = Server::new(&addr, state, &args.base_path).await?;
    server.run().await?;

    Ok(())
}
