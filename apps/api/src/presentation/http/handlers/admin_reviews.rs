use axum::{
    Json,
    extract::{Extension, Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use crate::{
    application::reviews::dto::{BulkOutcome, ImportOutcome, ReviewDraft},
    domain::review::entity::Review,
    presentation::http::{errors::AppError, middleware::user::UserClaims, state::AppState},
};

const MAX_BULK_ITEMS: usize = 200;

#[derive(Debug, Deserialize)]
pub struct BulkReviewActionRequest {
    pub ids: Vec<i64>,
    pub action: String,
}

#[derive(Debug, Serialize)]
pub struct ClearReviewsResponse {
    pub cleared: usize,
}

pub async fn import_reviews(
    State(state): State<AppState>,
    Extension(claims): Extension<UserClaims>,
    Json(drafts): Json<Vec<ReviewDraft>>,
) -> Result<(StatusCode, Json<ImportOutcome>), AppError> {
    if drafts.is_empty() {
        return Err(AppError::BadRequest("reviews cannot be empty".to_string()));
    }

    let outcome = state.reviews.import_reviews(drafts).await;
    tracing::info!(
        admin = %claims.sub,
        created = outcome.created.len(),
        failed = outcome.failures.len(),
        "Admin imported reviews"
    );
    Ok((StatusCode::CREATED, Json(outcome)))
}

pub async fn edit_review(
    State(state): State<AppState>,
    Extension(claims): Extension<UserClaims>,
    Path(id): Path<i64>,
    Json(draft): Json<ReviewDraft>,
) -> Result<Json<Review>, AppError> {
    let review = state.reviews.edit_review(id, draft).await?;
    tracing::info!(admin = %claims.sub, review_id = id, "Admin edited review");
    Ok(Json(review))
}

pub async fn delete_review(
    State(state): State<AppState>,
    Extension(claims): Extension<UserClaims>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.reviews.delete_review(id).await?;
    tracing::info!(admin = %claims.sub, review_id = id, "Admin deleted review");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn bulk_review_action(
    State(state): State<AppState>,
    Extension(claims): Extension<UserClaims>,
    Json(body): Json<BulkReviewActionRequest>,
) -> Result<Json<BulkOutcome>, AppError> {
    let action = body.action.trim().to_lowercase();
    if body.ids.is_empty() {
        return Err(AppError::BadRequest("ids cannot be empty".to_string()));
    }
    if body.ids.len() > MAX_BULK_ITEMS {
        return Err(AppError::BadRequest(format!(
            "bulk actions are limited to {} items",
            MAX_BULK_ITEMS
        )));
    }

    let outcome = match action.as_str() {
        "approve" => state.reviews.moderate_reviews(&body.ids, true).await,
        "unapprove" => state.reviews.moderate_reviews(&body.ids, false).await,
        "delete" => state.reviews.delete_reviews(&body.ids).await,
        _ => {
            return Err(AppError::BadRequest(
                "action must be one of approve, unapprove, delete".to_string(),
            ));
        }
    };

    tracing::info!(
        admin = %claims.sub,
        action = %action,
        processed = outcome.processed,
        failed = outcome.failed,
        "Admin bulk review action"
    );
    Ok(Json(outcome))
}

pub async fn clear_reviews(
    State(state): State<AppState>,
    Extension(claims): Extension<UserClaims>,
) -> Result<Json<ClearReviewsResponse>, AppError> {
    let cleared = state.reviews.clear_data().await?;
    tracing::warn!(admin = %claims.sub, cleared, "Admin cleared all review data");
    Ok(Json(ClearReviewsResponse { cleared }))
}
