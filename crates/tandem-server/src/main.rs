//! Tandem server binary.
//!
//! # Usage
//!
//! ```bash
//! # Start on the default port
//! tandem-server --bind 0.0.0.0:7400
//!
//! # Enable admin commands and requeue-on-skip
//! tandem-server --bind 0.0.0.0:7400 --admin-token sesame --skip-behavior requeue
//! ```

use clap::{Parser, ValueEnum};
use tandem_core::{EngineConfig, SkipBehavior};
use tandem_server::{Server, ServerRuntimeConfig};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// What `/next` does with the skipper after leaving a chat.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum SkipMode {
    /// Immediately attempt a re-match.
    Rematch,
    /// Re-enter the back of the waiting queue.
    Requeue,
}

impl From<SkipMode> for SkipBehavior {
    fn from(mode: SkipMode) -> Self {
        match mode {
            SkipMode::Rematch => Self::Rematch,
            SkipMode::Requeue => Self::Requeue,
        }
    }
}

/// Anonymous pair-chat server
#[derive(Parser, Debug)]
#[command(name = "tandem-server")]
#[command(about = "Anonymous pair-chat matchmaking server")]
#[command(version)]
struct Args {
    /// Address to bind to
    #[arg(short, long, default_value = "0.0.0.0:7400")]
    bind: String,

    /// Token granting access to /stats and /broadcast (omit to disable)
    #[arg(long)]
    admin_token: Option<String>,

    /// What /next does with the skipper after leaving a chat
    #[arg(long, value_enum, default_value = "rematch")]
    skip_behavior: SkipMode,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    tracing::info!("tandem server starting");
    tracing::info!("binding to {}", args.bind);

    if args.admin_token.is_none() {
        tracing::info!("no admin token configured - /stats and /broadcast are disabled");
    }

    let config = ServerRuntimeConfig {
        bind_address: args.bind,
        admin_token: args.admin_token,
        engine: EngineConfig { skip_behavior: args.skip_behavior.into() },
    };

    let server = Server::bind(config).await?;

    tracing::info!("server listening on {}", server.local_addr()?);

    server.run().await?;

    Ok(())
}
