use axum::{Json, extract::{Path, State}, http::StatusCode, response::{IntoResponse, Response}};
use std::{collections::HashMap, sync::Arc};
use parking_lot::RwLock;
use uuid::Uuid;
use chrono::Utc;

use crate::{
    generator::{FlyerGenerator, GeneratorError, DEFAULT_FORMATS},
    models::{FlyerBatch, GenerateRequest, QuickGenerateRequest},
    pdf::batch_summary_pdf,
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RwLock<HashMap<Uuid, FlyerBatch>>>,
    pub generator: Arc<FlyerGenerator>,
}

/// Practical ceiling per batch; larger requests are clamped, not rejected.
const MAX_QUANTITY: u32 = 10;

fn default_formats() -> Vec<String> {
    DEFAULT_FORMATS.iter().map(|f| f.to_string()).collect()
}

fn to_status(e: GeneratorError) -> StatusCode {
    tracing::error!("❌ Batch generation failed: {}", e);
    StatusCode::INTERNAL_SERVER_ERROR
}

pub async fn generate_flyers(
    State(state): State<AppState>,
    Json(body): Json<GenerateRequest>,
) -> Result<Json<FlyerBatch>, StatusCode> {
    let quantity = body.quantity.clamp(1, MAX_QUANTITY);
    let formats = body.formats.clone().unwrap_or_else(default_formats);
    let language = body.language.clone().unwrap_or_else(|| "en".to_string());

    tracing::info!("🚀 Batch request for product: {}", body.brief.product);

    let flyers = state
        .generator
        .generate(&body.brief, quantity, &formats, &language)
        .await
        .map_err(to_status)?;

    let batch = FlyerBatch {
        id: Uuid::new_v4(),
        product: body.brief.product.clone(),
        language,
        requested: quantity,
        flyers,
        created_at: Utc::now(),
    };

    state.store.write().insert(batch.id, batch.clone());
    tracing::info!("✅ Batch {} stored with {} flyer(s)", batch.id, batch.flyers.len());
    Ok(Json(batch))
}

pub async fn quick_generate_flyers(
    State(state): State<AppState>,
    Json(body): Json<QuickGenerateRequest>,
) -> Result<Json<FlyerBatch>, StatusCode> {
    let quantity = body.quantity.clamp(1, MAX_QUANTITY);

    tracing::info!("🚀 Quick batch request for product: {}", body.product);

    let flyers = state
        .generator
        .quick_generate(&body.product, &body.offer, body.colors.clone(), quantity)
        .await
        .map_err(to_status)?;

    let batch = FlyerBatch {
        id: Uuid::new_v4(),
        product: body.product.clone(),
        language: "en".to_string(),
        requested: quantity,
        flyers,
        created_at: Utc::now(),
    };

    state.store.write().insert(batch.id, batch.clone());
    Ok(Json(batch))
}

pub async fn get_batch(Path(id): Path<Uuid>, State(state): State<AppState>) -> Response {
    if let Some(batch) = state.store.read().get(&id).cloned() {
        Json(batch).into_response()
    } else {
        StatusCode::NOT_FOUND.into_response()
    }
}

pub async fn export_batch_pdf(Path(id): Path<Uuid>, State(state): State<AppState>) -> Response {
    let store = state.store.read();
    if let Some(batch) = store.get(&id) {
        let pdf_bytes = batch_summary_pdf(batch);
        let mut headers = axum::http::HeaderMap::new();
        headers.insert(axum::http::header::CONTENT_TYPE, "application/pdf".parse().unwrap());
        headers.insert(
            axum::http::header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"flyers_{}.pdf\"", id).parse().unwrap(),
        );
        return (StatusCode::OK, headers, pdf_bytes).into_response();
    }
    StatusCode::NOT_FOUND.into_response()
}
