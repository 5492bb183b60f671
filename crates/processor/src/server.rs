use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Extension, Router};
use prometheus_client::registry::Registry;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;


async fn get_metrics(Extension(registry): Extension<Arc<Registry>>) -> Response {
    let mut buffer = String::new();
    if let Err(err) = prometheus_client::encoding::text::encode(&mut buffer, &registry) {
        return (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
    }
    (
        [(CONTENT_TYPE, HeaderValue::from_static("application/openmetrics-text; version=1.0.0; charset=utf-8"))],
        buffer
    ).into_response()
}


pub async fn run_server(registry: Registry, port: u16) -> anyhow::Result<()> {
    let app = Router::new()
        .route("/metrics", get(get_metrics))
        .layer(Extension(Arc::new(registry)));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("metrics are served on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
