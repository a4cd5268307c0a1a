use crate::{
    application::{reviews::service::ReviewService, submit_review::use_case::SubmitReviewUseCase},
    config::Config,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub reviews: Arc<ReviewService>,
    pub submit_review: Arc<SubmitReviewUseCase>,
}

impl AppState {
    pub fn new(config: Config, reviews: Arc<ReviewService>) -> Self {
        Self {
            config,
            submit_review: Arc::new(SubmitReviewUseCase::new(reviews.clone())),
            reviews,
        }
    }
}
