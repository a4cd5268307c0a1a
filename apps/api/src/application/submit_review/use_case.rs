use super::dto::{SubmitReviewRequest, SubmitReviewResponse};
use crate::{application::reviews::service::ReviewService, domain::review::errors::DomainError};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use validator::Validate;

/// Shopper-facing review submission: one review per shopper and product,
/// flagged as a verified purchase when order history confirms it.
///
/// The duplicate check and the insert are not atomic, so two simultaneous
/// submissions from the same shopper can both be accepted.
pub struct SubmitReviewUseCase {
    reviews: Arc<ReviewService>,
}

impl SubmitReviewUseCase {
    pub fn new(reviews: Arc<ReviewService>) -> Self {
        Self { reviews }
    }

    #[instrument(skip(self, request), fields(product_id = %request.product_id))]
    pub async fn execute(
        &self,
        shopper_id: &str,
        request: SubmitReviewRequest,
    ) -> Result<SubmitReviewResponse, DomainError> {
        if shopper_id.trim().is_empty() {
            return Err(DomainError::Unauthorized(
                "a shopper identity is required to submit reviews".to_string(),
            ));
        }
        request.validate()?;

        let already_reviewed = self
            .reviews
            .has_shopper_reviewed(shopper_id, &request.product_id)
            .await
            .map_err(|err| {
                warn!(error = %err, "Duplicate check failed");
                DomainError::Unavailable(format!("could not check for an existing review: {err}"))
            })?;
        if already_reviewed {
            return Err(DomainError::Duplicate(format!(
                "shopper has already reviewed product {}",
                request.product_id
            )));
        }

        let verification = self
            .reviews
            .shopper_has_purchased_product(shopper_id, &request.product_id)
            .await;

        let draft = request.into_draft(shopper_id, verification.is_purchased());
        let review = self.reviews.new_review(draft).await?;
        info!(review_id = review.id, ?verification, "Shopper review submitted");

        Ok(SubmitReviewResponse {
            review,
            verification,
        })
    }
}
