//! token-gate server
//!
//! Configuration comes from the environment (or a `.env` file):
//! `LOCK_ADDRESS` and `NETWORK` are required, see `GateConfig::from_env`.

use token_gate::server::{create_router, AppState};
use token_gate::{AppContext, GateConfig, PostStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,token_gate=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    let config = GateConfig::from_env()?;
    let ctx = AppContext::new(&config)?;
    let posts = PostStore::load_dir(&config.posts_dir)?;

    let app = create_router(AppState::new(ctx, posts));

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(
        addr = %config.bind_addr,
        lock = %config.lock.lock_address_hex(),
        network = config.lock.network,
        "token-gate listening"
    );

    axum::serve(listener, app).await?;

    Ok(())
}
