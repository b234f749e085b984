mod color;
mod copywriter;
mod fallback;
mod gemini;
mod generator;
mod models;
mod pdf;
mod render;
mod routes;
mod svg;

use axum::{Router, routing::{post, get}};
use routes::{generate_flyers, quick_generate_flyers, get_batch, export_batch_pdf, AppState};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{fmt, EnvFilter};
use tower_http::cors::{CorsLayer, Any};

use crate::gemini::GeminiClient;
use crate::generator::FlyerGenerator;
use crate::render::{BrowserRenderer, FlyerRenderer, VectorRenderer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Init tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let api_key = std::env::var("GEMINI_API_KEY").unwrap_or_else(|_| "DEMO_KEY".into());
    if api_key == "DEMO_KEY" {
        tracing::warn!("GEMINI_API_KEY not set - all copy will come from the fallback bank");
    }
    tracing::info!("Using API key: {}...", &api_key[..std::cmp::min(10, api_key.len())]);

    let renderer: Arc<dyn FlyerRenderer> = match std::env::var("RENDER_BACKEND").as_deref() {
        Ok("browser") => {
            let webdriver_url = std::env::var("WEBDRIVER_URL")
                .unwrap_or_else(|_| "http://localhost:4444".to_string());
            tracing::info!("Render backend: headless browser via {}", webdriver_url);
            Arc::new(BrowserRenderer::new(webdriver_url))
        }
        _ => {
            tracing::info!("Render backend: vector (resvg)");
            Arc::new(VectorRenderer::new())
        }
    };

    let output_dir = PathBuf::from(std::env::var("OUTPUT_DIR").unwrap_or_else(|_| "output".into()));
    let generator = Arc::new(FlyerGenerator::new(
        Arc::new(GeminiClient::new(api_key)),
        renderer,
        output_dir,
    ));

    let state = AppState {
        store: Arc::default(),
        generator: generator.clone(),
    };

    let app = Router::new()
        .route("/api/flyers", post(generate_flyers))
        .route("/api/flyers/quick", post(quick_generate_flyers))
        .route("/api/flyers/:id", get(get_batch))
        .route("/api/flyers/:id/pdf", get(export_batch_pdf))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state);

    let port: u16 = std::env::var("PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(8080);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(%addr, "Starting server");
    axum::serve(tokio::net::TcpListener::bind(addr).await?, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // release the renderer (kills the headless browser session, if any)
    generator.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
