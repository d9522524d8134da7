//! campus-relay: realtime relay server for the campus feed.

use std::path::PathBuf;
use std::time::Duration;

use campus_relay::RelayState;
use clap::Parser;
use tokio::net::TcpListener;

#[derive(Parser)]
#[command(name = "campus-relay", about = "Realtime relay for the campus feed")]
struct Args {
    /// Path to config.toml (default: platform config dir).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on. Overrides `relay.port`.
    #[arg(short, long)]
    port: Option<u16>,

    /// Address to bind. Overrides `relay.bind`.
    #[arg(long)]
    bind: Option<String>,

    /// Seconds between session-count log lines.
    #[arg(long, default_value_t = 60)]
    stats_interval: u64,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let config = match campus_config::load_config_from(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("campus-relay: {e}");
            std::process::exit(2);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.directive_for("campus_relay").into()),
        )
        .init();

    let mut relay = config.relay.clone();
    if let Some(port) = args.port {
        relay.port = port;
    }
    if let Some(bind) = args.bind {
        relay.bind = bind;
    }

    let state = RelayState::in_memory(&relay);

    let addr = format!("{}:{}", relay.bind, relay.port);
    let listener = TcpListener::bind(&addr)
        .await
        .expect("Failed to bind TCP listener");

    tracing::info!("campus-relay listening on {}", addr);

    // Periodic session stats.
    let stats = state.clone();
    let every = Duration::from_secs(args.stats_interval.max(1));
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(every).await;
            let users = stats.sessions().count().await;
            let connections = stats.sessions().connection_count().await;
            tracing::debug!(users, connections, "Stats tick");
        }
    });

    campus_relay::serve(listener, state).await;
}
