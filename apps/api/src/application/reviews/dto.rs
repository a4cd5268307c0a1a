use crate::domain::{
    review::{entity::Review, errors::DomainError},
    shared::pagination::ReviewRange,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Review content before the store assigns an id.
///
/// Unset flags and a blank timestamp fall back to the values of the review
/// being replaced (or to creation defaults for new reviews).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct ReviewDraft {
    pub product_id: String,
    pub sku: Option<String>,
    pub shopper_id: Option<String>,
    pub reviewer_name: Option<String>,
    pub title: Option<String>,
    pub text: Option<String>,
    pub rating: i32,
    pub verified_purchaser: Option<bool>,
    pub approved: Option<bool>,
    pub review_date_time: Option<String>,
}

impl ReviewDraft {
    pub fn into_review(self, fallback: &Review) -> Review {
        Review {
            id: fallback.id,
            cache_id: fallback.cache_id,
            product_id: self.product_id.trim().to_string(),
            sku: self.sku,
            shopper_id: self.shopper_id,
            reviewer_name: self.reviewer_name,
            title: self.title,
            text: self.text,
            rating: self.rating,
            verified_purchaser: self
                .verified_purchaser
                .unwrap_or(fallback.verified_purchaser),
            approved: self.approved.unwrap_or(fallback.approved),
            review_date_time: self
                .review_date_time
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| fallback.review_date_time.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BulkFailure {
    pub id: i64,
    pub error: String,
}

/// Per-id result of a best-effort bulk operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BulkOutcome {
    pub requested: usize,
    pub processed: usize,
    pub failed: usize,
    pub all_succeeded: bool,
    pub failed_items: Vec<BulkFailure>,
}

impl BulkOutcome {
    pub fn new(requested: usize) -> Self {
        Self {
            requested,
            processed: 0,
            failed: 0,
            all_succeeded: true,
            failed_items: Vec::new(),
        }
    }

    pub fn record(&mut self, id: i64, result: Result<(), DomainError>) {
        match result {
            Ok(()) => self.processed += 1,
            Err(err) => {
                self.failed += 1;
                self.all_succeeded = false;
                self.failed_items.push(BulkFailure {
                    id,
                    error: err.to_string(),
                });
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SearchRequest {
    /// Restrict the search to one product; all products otherwise
    pub product_id: Option<String>,
    pub search_term: Option<String>,
    pub order_by: Option<String>,
    /// `"true"` / `"false"` approval filter
    pub status: Option<String>,
    pub range: ReviewRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SearchRange {
    pub from: i64,
    pub to: i64,
    /// Matches before the window was applied
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SearchResponse {
    pub data: Vec<Review>,
    pub range: SearchRange,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RatingSummary {
    #[ts(type = "number")]
    pub average: Decimal,
    pub total_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ImportFailure {
    /// Zero-based position of the draft in the submitted batch
    pub index: usize,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ImportOutcome {
    pub created: Vec<Review>,
    pub failures: Vec<ImportFailure>,
}
