//! News Verification Agent entry point
//!
//! `serve` runs the HTTP edge function; `verify` runs one verification from
//! the terminal and prints the report.

use clap::{Args, Parser, Subcommand};
use news_verification::config::{API_KEY_ENV, APP_ID_ENV, DEFAULT_ENDPOINT};
use news_verification::handler::{create_router, AppState};
use news_verification::{
    Credentials, ServiceConfig, UpstreamConfig, VerificationRequest, AGENT_ID, AGENT_VERSION,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "verify-news")]
#[command(about = "News Verification Agent - SIFT claim analysis over an LLM API")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    upstream: UpstreamArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct UpstreamArgs {
    /// Upstream API key
    #[arg(long, env = API_KEY_ENV, hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// Upstream application id
    #[arg(long, env = APP_ID_ENV, global = true)]
    app_id: Option<String>,

    /// Chat-completion endpoint URL
    #[arg(long, env = "QIANFAN_ENDPOINT", default_value = DEFAULT_ENDPOINT, global = true)]
    endpoint: String,

    /// Model name sent with each request (omitted when unset)
    #[arg(long, env = "QIANFAN_MODEL", global = true)]
    model: Option<String>,

    /// Upstream timeout in milliseconds
    #[arg(long, env = "UPSTREAM_TIMEOUT_MS", default_value = "25000", global = true)]
    timeout_ms: u64,
}

impl UpstreamArgs {
    fn into_config(self) -> ServiceConfig {
        let upstream = UpstreamConfig {
            endpoint: self.endpoint,
            model: self.model,
            timeout_ms: self.timeout_ms,
            ..Default::default()
        };
        ServiceConfig::new(upstream, Credentials::from_parts(self.api_key, self.app_id))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8080", env = "PORT")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "0.0.0.0", env = "HOST")]
        host: String,
    },

    /// Verify a single claim and print the report
    Verify {
        /// Claim text
        #[arg(short, long)]
        content: String,

        /// Where the claim was seen
        #[arg(short, long)]
        source: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let cli = Cli::parse();
    let config = cli.upstream.into_config();

    if !config.credentials.is_complete() {
        tracing::warn!(
            has_api_key = config.credentials.has_api_key(),
            has_app_id = config.credentials.has_app_id(),
            "Upstream credentials incomplete; verification requests will fail"
        );
    }

    match cli.command {
        Commands::Serve { port, host } => {
            let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
            let state = Arc::new(AppState::new(config)?);
            let router = create_router(state);

            tracing::info!("Starting News Verification Agent on {}", addr);
            tracing::info!("Agent ID: {}, Version: {}", AGENT_ID, AGENT_VERSION);

            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;
        }

        Commands::Verify { content, source } => {
            let state = AppState::new(config)?;
            let request = VerificationRequest {
                content: Some(content),
                source,
            };

            match state.engine.verify(request).await {
                Ok(verification) => {
                    println!("{}", serde_json::to_string_pretty(&verification.report)?);
                }
                Err(err) => {
                    eprintln!("{}", serde_json::to_string_pretty(&err.to_body())?);
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("News Verification Agent shutting down");
}
