use super::{
    handlers::{admin_reviews, health, reviews},
    middleware::admin::require_admin,
    middleware::logging::logging_middleware,
    middleware::request_id::request_id_middleware,
    state::AppState,
};
use axum::{
    Router, middleware,
    routing::{get, patch, post},
};

pub fn create_router(state: AppState) -> Router {
    let admin_routes = Router::new()
        .route(
            "/api/v1/admin/reviews",
            post(admin_reviews::import_reviews).delete(admin_reviews::clear_reviews),
        )
        .route(
            "/api/v1/admin/reviews/bulk",
            post(admin_reviews::bulk_review_action),
        )
        .route(
            "/api/v1/admin/reviews/{id}",
            patch(admin_reviews::edit_review).delete(admin_reviews::delete_review),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    Router::new()
        // Health
        .route("/health", get(health::health_check))
        // Reviews
        .route(
            "/api/v1/reviews",
            get(reviews::search_reviews).post(reviews::submit_review),
        )
        .route("/api/v1/reviews/{id}", get(reviews::get_review))
        // Products
        .route(
            "/api/v1/products/{product_id}/reviews",
            get(reviews::get_product_reviews),
        )
        .route(
            "/api/v1/products/{product_id}/rating",
            get(reviews::get_product_rating),
        )
        // Shopper workspace
        .route("/api/v1/me/reviews", get(reviews::list_my_reviews))
        // Admin (protected by JWT role check)
        .merge(admin_routes)
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}
