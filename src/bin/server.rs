use std::net::SocketAddr;

use axum::http::StatusCode;
use axum::{Json, Router, routing::post};
use log::{info, warn};
use serde::Serialize;
use serde_json::Value;
use tower_http::cors::CorsLayer;

use hexplates::config::Params;

#[derive(Serialize)]
struct TimingEntry {
    name: String,
    ms: f64,
}

#[derive(Serialize)]
struct GenerateResponse {
    session: Value,
    timings: Vec<TimingEntry>,
}

type ApiError = (StatusCode, String);

async fn generate_handler(Json(params): Json<Params>) -> Result<Json<GenerateResponse>, ApiError> {
    let response = tokio::task::spawn_blocking(move || {
        let (session, timings) = hexplates::generate(&params)
            .map_err(|e| (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))?;

        let session = serde_json::to_value(session.snapshot())
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
        let timings = timings
            .iter()
            .map(|t| TimingEntry {
                name: t.name.to_string(),
                ms: t.ms,
            })
            .collect();

        Ok::<_, ApiError>(GenerateResponse { session, timings })
    })
    .await
    .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    match response {
        Ok(r) => Ok(Json(r)),
        Err(e) => {
            warn!("generate failed: {}", e.1);
            Err(e)
        }
    }
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let app = Router::new()
        .route("/api/generate", post(generate_handler))
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    info!("hexplates server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}
