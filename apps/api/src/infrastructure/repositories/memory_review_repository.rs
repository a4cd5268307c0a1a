//! In-memory implementation of `ReviewRepository`.
//!
//! All documents live in a `HashMap` behind a `RwLock` and are lost on
//! restart. Used for local runs (`REVIEW_STORE=memory`) and tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::review::{
    entity::{Review, ReviewLookup},
    errors::DomainError,
    repository::{ReviewRepository, ReviewStoreWrite},
};

#[derive(Default)]
struct Documents {
    lookup: ReviewLookup,
    products: HashMap<String, Vec<Review>>,
}

impl Documents {
    fn put_product(&mut self, product_id: &str, reviews: Vec<Review>) {
        if reviews.is_empty() {
            self.products.remove(product_id);
        } else {
            self.products.insert(product_id.to_string(), reviews);
        }
    }
}

pub struct InMemoryReviewRepository {
    documents: RwLock<Documents>,
    /// Last id handed out.
    sequence: AtomicI64,
}

impl InMemoryReviewRepository {
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(Documents::default()),
            sequence: AtomicI64::new(0),
        }
    }

    /// Builds a store already holding `reviews`, with the id sequence placed
    /// after the highest seeded id.
    pub fn with_reviews(reviews: Vec<Review>) -> Self {
        let mut documents = Documents::default();
        let mut max_id = 0;
        for review in reviews {
            max_id = max_id.max(review.id);
            documents.lookup.insert(review.id, review.product_id.clone());
            documents
                .products
                .entry(review.product_id.clone())
                .or_default()
                .push(review);
        }
        Self {
            documents: RwLock::new(documents),
            sequence: AtomicI64::new(max_id),
        }
    }
}

impl Default for InMemoryReviewRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReviewRepository for InMemoryReviewRepository {
    async fn load_lookup(&self) -> Result<ReviewLookup, DomainError> {
        Ok(self.documents.read().await.lookup.clone())
    }

    async fn save_lookup(&self, lookup: &ReviewLookup) -> Result<(), DomainError> {
        self.documents.write().await.lookup = lookup.clone();
        Ok(())
    }

    async fn get_product_reviews(&self, product_id: &str) -> Result<Vec<Review>, DomainError> {
        let documents = self.documents.read().await;
        Ok(documents.products.get(product_id).cloned().unwrap_or_default())
    }

    async fn save_product_reviews(
        &self,
        product_id: &str,
        reviews: &[Review],
    ) -> Result<(), DomainError> {
        self.documents
            .write()
            .await
            .put_product(product_id, reviews.to_vec());
        Ok(())
    }

    async fn next_review_id(&self) -> Result<i64, DomainError> {
        Ok(self.sequence.fetch_add(1, Ordering::SeqCst) + 1)
    }

    async fn commit(&self, write: ReviewStoreWrite) -> Result<(), DomainError> {
        let mut documents = self.documents.write().await;
        for (product_id, reviews) in write.product_reviews {
            documents.put_product(&product_id, reviews);
        }
        if let Some(lookup) = write.lookup {
            documents.lookup = lookup;
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), DomainError> {
        Ok(())
    }
}
