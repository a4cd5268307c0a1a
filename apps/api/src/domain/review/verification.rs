use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Result of checking a shopper's order history for a product.
///
/// `Unavailable` is kept apart from `NotPurchased` so callers never mistake
/// a failed lookup for a negative answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
#[ts(export)]
pub enum PurchaseStatus {
    Purchased,
    NotPurchased,
    Unavailable(String),
}

impl PurchaseStatus {
    pub fn is_purchased(&self) -> bool {
        matches!(self, PurchaseStatus::Purchased)
    }
}
