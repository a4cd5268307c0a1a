use super::entity::{Review, ReviewLookup};
use super::errors::DomainError;
use async_trait::async_trait;

/// A set of document writes that must land together.
///
/// Product lists given as empty vectors are cleared from the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReviewStoreWrite {
    pub product_reviews: Vec<(String, Vec<Review>)>,
    pub lookup: Option<ReviewLookup>,
}

impl ReviewStoreWrite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn product(mut self, product_id: impl Into<String>, reviews: Vec<Review>) -> Self {
        self.product_reviews.push((product_id.into(), reviews));
        self
    }

    pub fn lookup(mut self, lookup: ReviewLookup) -> Self {
        self.lookup = Some(lookup);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.product_reviews.is_empty() && self.lookup.is_none()
    }
}

/// Key-value persistence for the lookup document and per-product review lists.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    async fn load_lookup(&self) -> Result<ReviewLookup, DomainError>;
    /// An empty lookup clears the stored document.
    async fn save_lookup(&self, lookup: &ReviewLookup) -> Result<(), DomainError>;
    async fn get_product_reviews(&self, product_id: &str) -> Result<Vec<Review>, DomainError>;
    /// An empty slice clears the product's reviews.
    async fn save_product_reviews(
        &self,
        product_id: &str,
        reviews: &[Review],
    ) -> Result<(), DomainError>;
    /// Next value of a durable, strictly increasing id sequence.
    async fn next_review_id(&self) -> Result<i64, DomainError>;
    /// Applies every write in `write` or none of them.
    async fn commit(&self, write: ReviewStoreWrite) -> Result<(), DomainError>;
    async fn ping(&self) -> Result<(), DomainError>;
}
