use std::sync::Arc;

use session_recommender::{
    api::{create_router, AppState},
    config::Config,
    db::{create_pool, DataSource, MySqlDataSource},
    services::{snapshot_channel, HybridScorer, SnapshotRefresher},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "session_recommender=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    // The refresher owns the only writer; handlers get readers
    let pool = create_pool(&config.database_url)?;
    let source: Arc<dyn DataSource> = Arc::new(MySqlDataSource::new(pool));
    let (publisher, snapshots) = snapshot_channel();
    SnapshotRefresher::new(source, publisher, config.level_policy()).spawn(config.refresh_interval());

    let state = AppState::new(snapshots, HybridScorer::new(config.scoring()));
    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
