use kestrel::config::Config;
use kestrel::services::SqliteStore;
use kestrel::{api, AppState};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kestrel=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env();
    info!("Starting Kestrel server on {}:{}", config.host, config.port);

    let state = AppState::new(config.clone());

    // Connect SQLite and rehydrate the stores
    let sqlite = Arc::new(SqliteStore::new(&config.sqlite_path)?);
    state.snapshots.connect_sqlite(Arc::clone(&sqlite)).await;
    state.picks.connect_sqlite(sqlite).await;
    state.snapshots.load_from_sqlite().await;
    state.picks.load_from_sqlite().await;
    info!("Rehydrated {} tickers from {}", state.snapshots.count(), config.sqlite_path);

    // Daily outcome-tracking sweep
    {
        let tracker = Arc::clone(&state.tracker);
        tokio::spawn(async move {
            loop {
                match tracker.track_pending().await {
                    Ok(counts) => {
                        if counts.success + counts.partial + counts.fail > 0 {
                            info!(
                                "Tracking sweep: {} success, {} partial, {} fail, {} skipped",
                                counts.success, counts.partial, counts.fail, counts.skipped
                            );
                        }
                    }
                    Err(e) => error!("Tracking sweep failed: {}", e),
                }
                tokio::time::sleep(tokio::time::Duration::from_secs(60 * 60)).await;
            }
        });
    }

    // Build CORS layer
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the router
    let app = api::router()
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start the server
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Kestrel server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
