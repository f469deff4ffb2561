use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pr_triager::api::{self, AppState};
use pr_triager::config::{BoardArgs, ConfigFile, WebhookSecret};
use triage_core::models::BoardLayout;
use triage_core::{BoardGateway, Reconciler, TriageContext};

#[derive(Parser)]
#[command(name = "triager")]
#[command(about = "Mirrors pull request triage state onto a kanban board")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the webhook server
    Serve {
        /// Port to listen on
        #[arg(short, long, env = "PORT", default_value = "4567")]
        port: u16,

        /// Address to bind
        #[arg(long, default_value = "0.0.0.0")]
        bind: String,

        /// Shared secret for webhook signatures
        #[arg(long, env = "GITHUB_HOOK_SECRET", hide_env_values = true)]
        hook_secret: Option<String>,

        /// YAML file listing employee logins
        #[arg(long, env = "CONFIG_PATH", default_value = "config.yml")]
        config_path: PathBuf,

        #[command(flatten)]
        board: BoardArgs,
    },
    /// Show how the board's lists map to triage lanes
    Lanes {
        #[command(flatten)]
        board: BoardArgs,
    },
}

/// Initialize tracing from RUST_LOG
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG")
            .unwrap_or_else(|_| "pr_triager=debug,triage_core=debug,tower_http=debug".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Commands::Serve {
            port,
            bind,
            hook_secret,
            config_path,
            board,
        } => {
            let roster = ConfigFile::load(&config_path)?.roster();
            tracing::info!(insiders = roster.len(), "Loaded roster");

            let client = board.client();
            let context = TriageContext::load(&client, roster).await?;
            for (role, lane) in context.layout.bindings() {
                tracing::info!(role = %role, lane = %lane.name, "Bound lane");
            }

            let secret = WebhookSecret::new(hook_secret);
            if secret.key().is_none() {
                tracing::warn!("No webhook secret configured, signatures are not verified");
            }

            let reconciler = Reconciler::new(Arc::new(client), Arc::new(context));
            let app = api::create_router(AppState::new(reconciler, secret));

            let listener = tokio::net::TcpListener::bind(format!("{}:{}", bind, port)).await?;
            tracing::info!("Triager listening on http://{}:{}", bind, port);

            axum::serve(listener, app).await?;
        }
        Commands::Lanes { board } => {
            let client = board.client();
            let lanes = client.lanes().await?;
            let extra: Vec<_> = lanes.iter().skip(4).map(|l| l.name.clone()).collect();
            let layout = BoardLayout::from_lanes(lanes)?;

            println!("Board {}", client.board_id());
            for (role, lane) in layout.bindings() {
                println!("  {:<24} {} ({})", role.as_str(), lane.name, lane.id);
            }
            if !extra.is_empty() {
                println!("  unused: {}", extra.join(", "));
            }
        }
    }

    Ok(())
}
