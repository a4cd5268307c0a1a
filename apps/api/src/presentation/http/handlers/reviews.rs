use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
};
use serde::Deserialize;

use crate::{
    application::{
        reviews::dto::{RatingSummary, SearchRequest, SearchResponse},
        submit_review::dto::{SubmitReviewRequest, SubmitReviewResponse},
    },
    domain::{
        review::entity::Review,
        shared::pagination::{PaginationRequest, ReviewRange},
    },
    presentation::http::{
        errors::AppError, middleware::user::decode_required_user_claims, state::AppState,
    },
};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub product_id: Option<String>,
    pub search_term: Option<String>,
    pub order_by: Option<String>,
    pub status: Option<String>,
    #[serde(default = "default_from")]
    pub from: i64,
    #[serde(default)]
    pub to: i64,
}

fn default_from() -> i64 {
    1
}

#[derive(Debug, Deserialize)]
pub struct ProductReviewsQuery {
    #[serde(default)]
    pub offset: usize,
    #[serde(default)]
    pub limit: usize,
    pub order_by: Option<String>,
}

pub async fn search_reviews(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<SearchResponse>, AppError> {
    let request = SearchRequest {
        product_id: params.product_id,
        search_term: params.search_term,
        order_by: params.order_by,
        status: params.status,
        range: ReviewRange::new(params.from, params.to),
    };
    Ok(Json(state.reviews.search_reviews(request).await?))
}

pub async fn get_review(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Review>, AppError> {
    Ok(Json(state.reviews.get_review(id).await?))
}

pub async fn get_product_reviews(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
    Query(params): Query<ProductReviewsQuery>,
) -> Result<Json<Vec<Review>>, AppError> {
    let page = PaginationRequest {
        offset: params.offset,
        limit: params.limit,
    };
    let reviews = state
        .reviews
        .get_reviews_by_product_id(&product_id, page, params.order_by.as_deref())
        .await?;
    Ok(Json(reviews))
}

pub async fn get_product_rating(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<Json<RatingSummary>, AppError> {
    Ok(Json(state.reviews.rating_summary(&product_id).await?))
}

pub async fn submit_review(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<SubmitReviewRequest>,
) -> Result<(StatusCode, Json<SubmitReviewResponse>), AppError> {
    let claims = decode_required_user_claims(&headers, &state.config.jwt_secret)?;
    let response = state.submit_review.execute(&claims.sub, body).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn list_my_reviews(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Review>>, AppError> {
    let claims = decode_required_user_claims(&headers, &state.config.jwt_secret)?;
    Ok(Json(state.reviews.reviews_by_shopper(&claims.sub).await?))
}
