use anyhow::Context;
use bug_helpers::config::ServerConfig;
use bug_helpers::engine::Engine;
use bug_helpers::server::{AppState, build_router};
use octocrab::Octocrab;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bug_helpers=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env().context("invalid configuration")?;

    let github = Octocrab::builder()
        .personal_token(config.github_token.clone())
        .build()
        .context("failed to build GitHub client")?;

    let engines: Vec<Engine> = config
        .bots
        .into_iter()
        .map(|bot| {
            info!(
                bot = %bot.bot_name,
                variant = bot.variant.name(),
                event_label = ?bot.event_label,
                "Enabled helper bot"
            );
            Engine::new(bot)
        })
        .collect();

    let state = AppState::new(config.webhook_secret.into_bytes(), engines, github);
    let app = build_router(state.clone());

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    info!(addr = %config.bind_addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Waiting for in-flight commands");
    state.tracker().close();
    state.tracker().wait().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
