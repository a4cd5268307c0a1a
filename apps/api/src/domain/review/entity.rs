use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;
use validator::Validate;

/// Global index from a review id to the product whose list holds the review.
///
/// Serialized as a JSON object keyed by the stringified id.
pub type ReviewLookup = BTreeMap<i64, String>;

/// Core domain entity representing a single product review.
///
/// Reviews are persisted inside the ordered list of their product and are
/// reachable by id through the [`ReviewLookup`].
///
/// # Invariants
/// - `id` is assigned once by the store sequence and never changes or gets reused
/// - `cache_id` always mirrors `id`
/// - `product_id` is non-empty and fixed for the lifetime of the review
/// - `rating` lies in `1..=5`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS, Validate)]
#[serde(default)]
#[ts(export)]
pub struct Review {
    /// Store-assigned identifier, unique across all products
    pub id: i64,

    /// Catalog identifier of the reviewed item
    #[validate(length(min = 1, max = 200, message = "product_id is required"))]
    pub product_id: String,

    pub sku: Option<String>,

    /// Identity of the shopper who wrote the review, if submitted by one
    pub shopper_id: Option<String>,

    #[validate(length(max = 100))]
    pub reviewer_name: Option<String>,

    #[validate(length(max = 200))]
    pub title: Option<String>,

    #[validate(length(max = 5000))]
    pub text: Option<String>,

    #[validate(range(min = 1, max = 5, message = "rating must be between 1 and 5"))]
    pub rating: i32,

    /// Set at creation from the shopper's order history
    pub verified_purchaser: bool,

    /// Moderation flag; gates aggregation when approval is required
    pub approved: bool,

    /// Free-form timestamp text, parsed leniently when sorting
    pub review_date_time: String,

    /// Mirrors `id` for client-side cache invalidation
    pub cache_id: i64,
}

impl Review {
    /// Returns true if any searchable attribute contains `needle`.
    ///
    /// `needle` must already be lowercased; matching is case-insensitive.
    pub fn matches_search(&self, needle: &str) -> bool {
        [
            Some(self.product_id.as_str()),
            self.sku.as_deref(),
            self.shopper_id.as_deref(),
            self.reviewer_name.as_deref(),
        ]
        .into_iter()
        .flatten()
        .any(|value| value.to_lowercase().contains(needle))
    }

    pub fn is_written_by(&self, shopper_id: &str) -> bool {
        self.shopper_id.as_deref() == Some(shopper_id)
    }
}
