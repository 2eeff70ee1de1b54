use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use crate::database::AppState;
use crate::error::{AppError, Result};
use crate::model::{Category, CategorySummary, CreateCategoryRequest, VerifyRequest};

/// All categories by name, with the number of active links filed under each
pub async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<CategorySummary>>> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for link in state.store.active_links()? {
        *counts.entry(link.category).or_default() += 1;
    }

    let categories = state
        .store
        .categories()?
        .into_iter()
        .map(|category| CategorySummary {
            link_count: counts.get(&category.name).copied().unwrap_or(0),
            category,
        })
        .collect();

    Ok(Json(categories))
}

/// Creates a category
///
/// # Response
///
/// - **201 Created** - the stored category
/// - **409 Conflict** - a category with this name exists
/// - **422 Unprocessable Entity** - empty or overlong name
pub async fn create_category(
    State(state): State<AppState>,
    Json(payload): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<Category>)> {
    let category = state
        .store
        .create_category(&payload.name, &payload.description)?;
    tracing::info!("Category {} created (id {})", category.name, category.id);

    Ok((StatusCode::CREATED, Json(category)))
}

/// Sets or clears the verified badge of a link
pub async fn verify_link(
    State(state): State<AppState>,
    Path(hash_id): Path<String>,
    Json(payload): Json<VerifyRequest>,
) -> Result<Json<Value>> {
    let link = state
        .store
        .set_verified(&hash_id, payload.is_verified)?
        .ok_or(AppError::NotFound)?;

    Ok(Json(json!({
        "hash_id": link.hash_id,
        "is_verified": link.is_verified
    })))
}
