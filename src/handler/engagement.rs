use axum::{
    extract::{Path, State},
    http::Method,
    response::Response,
    Extension, Form, Json,
};
use serde::Serialize;

use super::{flash, link_path, see_other};
use crate::database::AppState;
use crate::error::{AppError, Result};
use crate::model::{CurrentUser, FlashMessage, LikeToggle};
use crate::validation::CommentForm;

#[derive(Serialize)]
pub struct LikeResponse {
    pub success: bool,
    #[serde(flatten)]
    pub toggle: LikeToggle,
}

/// Likes or un-likes a link for the caller
///
/// # Response
///
/// - **200 OK** - `{"success": true, "liked": bool, "likes_count": n}`
/// - **400 Bad Request** - `{"success": false, ...}` for any method but POST
/// - **404 Not Found** - unknown or soft-deleted link
pub async fn toggle_like(
    State(state): State<AppState>,
    method: Method,
    Extension(user): Extension<CurrentUser>,
    Path(hash_id): Path<String>,
) -> Result<Json<LikeResponse>> {
    if method != Method::POST {
        return Err(AppError::BadRequest(format!(
            "{method} is not allowed, use POST"
        )));
    }

    let toggle = state
        .store
        .toggle_like(&hash_id, &user.id)?
        .ok_or(AppError::NotFound)?;

    Ok(Json(LikeResponse {
        success: true,
        toggle,
    }))
}

/// Adds a comment and returns to the link page. Invalid text is reported
/// through a flash message and nothing is stored.
pub async fn add_comment(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(hash_id): Path<String>,
    Form(form): Form<CommentForm>,
) -> Result<Response> {
    if state.store.active_link(&hash_id)?.is_none() {
        return Err(AppError::NotFound);
    }

    match form.validate() {
        Ok(text) => {
            state
                .store
                .add_comment(&hash_id, &user.id, &text)?
                .ok_or(AppError::NotFound)?;
            flash(&state, &user, FlashMessage::success("Comment added successfully!"))?;
        }
        Err(AppError::Validation(errors)) => {
            tracing::debug!("Rejected comment on {}: {:?}", hash_id, errors);
            flash(&state, &user, FlashMessage::error("Error adding comment."))?;
        }
        Err(e) => return Err(e),
    }

    Ok(see_other(&link_path(&hash_id)))
}

/// Soft-deletes one of the caller's comments
pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(comment_id): Path<String>,
) -> Result<Response> {
    let comment_id: u64 = comment_id.parse().map_err(|_| AppError::NotFound)?;
    let comment = state
        .store
        .deactivate_comment(comment_id, &user.id)?
        .ok_or(AppError::NotFound)?;

    tracing::info!("Comment {} soft-deleted by {}", comment.id, user.username);
    flash(&state, &user, FlashMessage::success("Comment deleted successfully!"))?;

    Ok(see_other(&link_path(&comment.hash_id)))
}
