use std::sync::Arc;

use anyhow::Context;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{self, TraceLayer};
use tracing::{info, warn, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod router;

use auth_cell::PortalNavigator;
use shared_config::AppConfig;
use shared_utils::SessionContext;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting clinic portal");

    let config = AppConfig::from_env();
    if !config.is_configured() {
        warn!("Portal configuration is incomplete; check CLINIC_BACKEND_URL");
    }

    let session = SessionContext::from_config(&config);
    let restoring = session.clone();
    tokio::spawn(async move {
        if let Err(e) = restoring.init().await {
            warn!("Could not restore the saved session: {:#}", e);
        }
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let bind_addr = config.bind_addr.clone();
    let state = Arc::new(config);

    let app = router::create_router(state, session, PortalNavigator::new())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new().level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding {}", bind_addr))?;
    info!("Listening on {}", bind_addr);

    axum::serve(listener, app).await.context("portal server stopped")?;
    Ok(())
}
