use log::{error, info};
use tower_http::cors::CorsLayer;

use devnet_messenger::{app, integration, state::AppState};

#[tokio::main]
async fn main() {
    let config = integration::Config::default();
    let state = AppState::init(&config).await;

    let cors = CorsLayer::new()
        .allow_origin(config.env.allow_origin())
        .allow_methods(config.env.allow_methods())
        .allow_headers(config.env.allow_headers());

    let router = app(state).layer(cors);

    let addr = config.env.addr();
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => panic!("Failed to bind {addr}: {e}"),
    };

    info!("listening on {addr}");
    if let Err(e) = axum::serve(listener, router).await {
        error!("server stopped: {e}");
    }
}
