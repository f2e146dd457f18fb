use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::http::{HeaderValue, Method};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, Level};

use expense_splitter::domain::SystemClock;
use expense_splitter::rest::{api_router, AppState};
use expense_splitter::storage::CsvConnection;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    let data_dir = std::env::var("EXPENSE_SPLITTER_DATA")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data"));
    info!("Using data directory {:?}", data_dir);

    let connection = Arc::new(CsvConnection::new(data_dir)?);
    let state = AppState::new(connection, Arc::new(SystemClock));

    // CORS setup to allow a local frontend to make requests
    let cors = CorsLayer::new()
        .allow_origin("http://localhost:8080".parse::<HeaderValue>()?)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    let app = Router::new().nest("/api", api_router(state)).layer(cors);

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
