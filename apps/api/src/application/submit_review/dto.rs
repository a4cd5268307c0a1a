use crate::{
    application::reviews::dto::ReviewDraft,
    domain::review::{entity::Review, verification::PurchaseStatus},
};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use validator::Validate;

/// Review body posted by a signed-in shopper. Identity and verification
/// flags are never taken from the request.
#[derive(Debug, Clone, Serialize, Deserialize, TS, Validate)]
#[ts(export)]
pub struct SubmitReviewRequest {
    #[validate(length(min = 1, max = 200, message = "product_id is required"))]
    pub product_id: String,
    #[validate(length(max = 200))]
    pub sku: Option<String>,
    #[validate(length(max = 100))]
    pub reviewer_name: Option<String>,
    #[validate(length(max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 5000))]
    pub text: Option<String>,
    #[validate(range(min = 1, max = 5, message = "rating must be between 1 and 5"))]
    pub rating: i32,
}

impl SubmitReviewRequest {
    pub fn into_draft(self, shopper_id: &str, verified_purchaser: bool) -> ReviewDraft {
        ReviewDraft {
            product_id: self.product_id,
            sku: self.sku,
            shopper_id: Some(shopper_id.to_string()),
            reviewer_name: self.reviewer_name,
            title: self.title,
            text: self.text,
            rating: self.rating,
            verified_purchaser: Some(verified_purchaser),
            approved: None,
            review_date_time: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SubmitReviewResponse {
    pub review: Review,
    pub verification: PurchaseStatus,
}
