use hls_relay::{Config, server};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hls_relay=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let addr = config.bind_address();

    match &config.public_base_url {
        Some(url) => tracing::info!("Rewritten links point at {}", url),
        None => tracing::info!("Rewritten links derive from forwarding headers"),
    }
    if config.rewrite.tag_uris {
        tracing::info!("Tag URI attributes are rewritten too");
    }

    let state = server::AppState::new(config)?;
    let app = server::create_router(state);

    tracing::info!("Starting hls-relay on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
