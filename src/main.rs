use dotenvy::dotenv;
use log::info;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use learnserver::api_router::configure_api_routes;
use learnserver::shared::config::AppConfig;
use learnserver::shared::state::AppState;
use learnserver::shared::utils::create_conn;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = AppConfig::from_env()?;
    let conn = create_conn(&config.database_url)?;
    let state = Arc::new(AppState {
        config: config.clone(),
        conn,
    });

    let router = configure_api_routes()
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("learnserver listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
