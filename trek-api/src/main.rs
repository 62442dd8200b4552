use anyhow::Context;
use std::net::SocketAddr;
use trek_api::{app, AppState};
use trek_booking::build_gateway;
use trek_store::{app_config::Config, DbClient};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trek_api=debug,trek_booking=debug,trek_store=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting Trek API on port {}", config.server.port);

    if config.auth.jwt_secret == "change-me" {
        tracing::warn!("Using the default JWT secret; set TREK__AUTH__JWT_SECRET");
    }

    let db = DbClient::new(&config.database.url, config.database.max_connections)
        .await
        .context("Failed to connect to database")?;
    db.migrate().await.context("Failed to run migrations")?;

    let gateway = build_gateway(&config.payment).context("Failed to build payment gateway")?;

    let state = AppState::new(&db, &config.auth, gateway).context("Invalid auth configuration")?;
    let app = app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
