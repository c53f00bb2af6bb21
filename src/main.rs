mod console;

use clap::Parser;
use console::ConsolePresenter;
use pictionary::config::Config;
use pictionary::{Identity, LineCanvas, Session};
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "pictionary", about = "Draw-and-guess client")]
struct Args {
    /// WebSocket endpoint of the game server
    #[arg(short, long)]
    server: Option<String>,

    /// Display name shown to other players
    #[arg(short, long)]
    name: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let mut config = Config::from_env();
    if let Some(server) = args.server {
        config.server_url = server;
    }
    let name = args.name.or(config.player_name.take()).unwrap_or_default();
    let identity = Identity::new(&name)?;

    tracing::info!(server = %config.server_url, name = %identity.name, "Starting client");

    let (input_tx, input_rx) = mpsc::unbounded_channel();
    tokio::spawn(console::read_commands(input_tx));

    let session = Session::new(
        config.session()?,
        identity,
        LineCanvas::new(),
        ConsolePresenter::default(),
    );

    tokio::select! {
        result = session.run(input_rx) => result?,
        _ = tokio::signal::ctrl_c() => tracing::info!("Interrupted"),
    }

    Ok(())
}
