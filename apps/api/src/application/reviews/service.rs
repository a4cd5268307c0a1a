use super::{
    dto::{
        BulkOutcome, ImportFailure, ImportOutcome, RatingSummary, ReviewDraft, SearchRange,
        SearchRequest, SearchResponse,
    },
    locks::ProductLocks,
};
use crate::{
    domain::{
        review::{
            entity::{Review, ReviewLookup},
            errors::DomainError,
            query::{OrderBy, ReviewFilter},
            rating,
            repository::{ReviewRepository, ReviewStoreWrite},
            verification::PurchaseStatus,
        },
        shared::pagination::PaginationRequest,
    },
    infrastructure::{
        orders::traits::OrderHistory,
        settings::traits::{AppSettings, SettingsProvider},
    },
};
use chrono::Utc;
use futures_util::{StreamExt, stream};
use rust_decimal::Decimal;
use std::{collections::BTreeSet, future::Future, sync::Arc, time::Duration};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

/// Attempts `clear_data` makes before giving up on a moving product set.
const CLEAR_ATTEMPTS: usize = 3;

#[derive(Debug, Clone, Copy)]
pub struct ReviewServiceOptions {
    /// Deadline for every single store or collaborator call
    pub call_timeout: Duration,
    /// Orders inspected in parallel during purchase verification
    pub purchase_check_concurrency: usize,
}

impl Default for ReviewServiceOptions {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_millis(5000),
            purchase_check_concurrency: 4,
        }
    }
}

/// Review management over the two-tier store: the global id lookup and the
/// per-product review lists.
///
/// # Consistency
/// Every read-modify-write of a product list runs under that product's lock.
/// Operations that also rewrite the lookup take the lookup lock afterwards
/// (always product first, then lookup) and persist both documents through a
/// single [`ReviewStoreWrite`]. No lock is held while settings or order
/// history are consulted.
pub struct ReviewService {
    repository: Arc<dyn ReviewRepository>,
    settings: Arc<dyn SettingsProvider>,
    orders: Arc<dyn OrderHistory>,
    options: ReviewServiceOptions,
    product_locks: ProductLocks,
    lookup_lock: Mutex<()>,
}

impl ReviewService {
    pub fn new(
        repository: Arc<dyn ReviewRepository>,
        settings: Arc<dyn SettingsProvider>,
        orders: Arc<dyn OrderHistory>,
        options: ReviewServiceOptions,
    ) -> Self {
        info!(
            call_timeout_ms = options.call_timeout.as_millis() as u64,
            purchase_check_concurrency = options.purchase_check_concurrency,
            "Initializing ReviewService"
        );
        Self {
            repository,
            settings,
            orders,
            options,
            product_locks: ProductLocks::new(),
            lookup_lock: Mutex::new(()),
        }
    }

    /// Stores a new review and returns it with its assigned id.
    ///
    /// No duplicate check happens here; shopper submissions go through
    /// `SubmitReviewUseCase`, which checks first.
    #[instrument(skip(self, draft), fields(product_id = %draft.product_id))]
    pub async fn new_review(&self, draft: ReviewDraft) -> Result<Review, DomainError> {
        let settings = self.settings().await?;
        let defaults = Review {
            approved: settings.approve_new_reviews,
            review_date_time: Utc::now().to_rfc3339(),
            ..Default::default()
        };
        let mut review = draft.into_review(&defaults);
        review.validate()?;

        let product_id = review.product_id.clone();
        let _product = self.product_locks.acquire(&product_id).await;

        let id = self
            .store("next_review_id", self.repository.next_review_id())
            .await?;
        review.id = id;
        review.cache_id = id;

        let mut reviews = self.load_product(&product_id).await?;
        reviews.push(review.clone());

        let _lookup = self.lookup_lock.lock().await;
        let mut lookup = self.load_lookup().await?;
        lookup.insert(id, product_id.clone());

        let write = ReviewStoreWrite::new()
            .product(product_id, reviews)
            .lookup(lookup);
        self.store("commit", self.repository.commit(write)).await?;

        info!(review_id = id, "Review created");
        Ok(review)
    }

    /// Creates every draft independently; failures do not stop the batch.
    #[instrument(skip(self, drafts), fields(count = drafts.len()))]
    pub async fn import_reviews(&self, drafts: Vec<ReviewDraft>) -> ImportOutcome {
        let mut outcome = ImportOutcome::default();
        for (index, draft) in drafts.into_iter().enumerate() {
            match self.new_review(draft).await {
                Ok(review) => outcome.created.push(review),
                Err(err) => {
                    warn!(index, error = %err, "Review import failed");
                    outcome.failures.push(ImportFailure {
                        index,
                        error: err.to_string(),
                    });
                }
            }
        }
        outcome
    }

    #[instrument(skip(self))]
    pub async fn get_review(&self, id: i64) -> Result<Review, DomainError> {
        let product_id = self.resolve_product(id).await?;
        self.load_product(&product_id)
            .await?
            .into_iter()
            .find(|review| review.id == id)
            .ok_or_else(|| review_not_found(id))
    }

    /// One product's reviews, optionally sorted, then windowed by offset/limit.
    #[instrument(skip(self))]
    pub async fn get_reviews_by_product_id(
        &self,
        product_id: &str,
        page: PaginationRequest,
        order_by: Option<&str>,
    ) -> Result<Vec<Review>, DomainError> {
        let order_by = order_by
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(OrderBy::parse)
            .transpose()?;

        let mut reviews = self.load_product(product_id).await?;
        if let Some(order_by) = order_by {
            order_by.sort(&mut reviews);
        }
        Ok(page.apply(reviews))
    }

    /// The full stored list of one product, in insertion order.
    pub async fn product_reviews(&self, product_id: &str) -> Result<Vec<Review>, DomainError> {
        self.load_product(product_id).await
    }

    /// Every review of every product known to the lookup.
    #[instrument(skip(self))]
    pub async fn get_reviews(&self) -> Result<Vec<Review>, DomainError> {
        let lookup = self.load_lookup().await?;
        let products: BTreeSet<&String> = lookup.values().collect();

        let mut reviews = Vec::new();
        for product_id in products {
            reviews.extend(self.load_product(product_id).await?);
        }
        Ok(reviews)
    }

    #[instrument(skip(self))]
    pub async fn reviews_by_shopper(&self, shopper_id: &str) -> Result<Vec<Review>, DomainError> {
        let mut reviews = self.get_reviews().await?;
        reviews.retain(|review| review.is_written_by(shopper_id));
        Ok(reviews)
    }

    /// Search, sort, status filter, then the inclusive `from..=to` window.
    #[instrument(skip(self, request), fields(product_id = ?request.product_id))]
    pub async fn search_reviews(
        &self,
        request: SearchRequest,
    ) -> Result<SearchResponse, DomainError> {
        let filter = ReviewFilter::parse(
            request.search_term.as_deref(),
            request.order_by.as_deref(),
            request.status.as_deref(),
        )?;

        let product_id = request
            .product_id
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty());
        let reviews = match product_id {
            Some(product_id) => self.load_product(product_id).await?,
            None => self.get_reviews().await?,
        };

        let filtered = filter.apply(reviews);
        let total = filtered.len();
        let data = request.range.apply(filtered);

        let from = request.range.first_position();
        let to = from + data.len() as i64 - 1;
        debug!(total, returned = data.len(), "Review search completed");

        Ok(SearchResponse {
            data,
            range: SearchRange { from, to, total },
        })
    }

    /// Mean rating rounded to two places; zero when nothing counts.
    #[instrument(skip(self))]
    pub async fn average_rating(&self, product_id: &str) -> Result<Decimal, DomainError> {
        let reviews = self.rated_reviews(product_id).await?;
        Ok(rating::average_rating(&reviews))
    }

    #[instrument(skip(self))]
    pub async fn rating_summary(&self, product_id: &str) -> Result<RatingSummary, DomainError> {
        let reviews = self.rated_reviews(product_id).await?;
        Ok(RatingSummary {
            average: rating::average_rating(&reviews),
            total_count: reviews.len(),
        })
    }

    /// Sets the approval flag on each id; unknown ids are reported, not fatal.
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn moderate_reviews(&self, ids: &[i64], approved: bool) -> BulkOutcome {
        let mut outcome = BulkOutcome::new(ids.len());
        for &id in ids {
            let result = self.moderate_one(id, approved).await;
            if let Err(err) = &result {
                warn!(review_id = id, error = %err, "Moderation failed");
            }
            outcome.record(id, result);
        }
        info!(
            processed = outcome.processed,
            failed = outcome.failed,
            approved,
            "Moderation batch finished"
        );
        outcome
    }

    /// Removes each review from its list and from the lookup in one commit.
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn delete_reviews(&self, ids: &[i64]) -> BulkOutcome {
        let mut outcome = BulkOutcome::new(ids.len());
        for &id in ids {
            let result = self.delete_review(id).await;
            if let Err(err) = &result {
                warn!(review_id = id, error = %err, "Delete failed");
            }
            outcome.record(id, result);
        }
        info!(
            processed = outcome.processed,
            failed = outcome.failed,
            "Delete batch finished"
        );
        outcome
    }

    /// Replaces a stored review; the edited record moves to the end of its
    /// product's list.
    #[instrument(skip(self, draft))]
    pub async fn edit_review(&self, id: i64, mut draft: ReviewDraft) -> Result<Review, DomainError> {
        let product_id = self.resolve_product(id).await?;
        let requested = draft.product_id.trim();
        if !requested.is_empty() && requested != product_id {
            return Err(DomainError::ValidationError(
                "product_id of an existing review cannot change".to_string(),
            ));
        }
        draft.product_id = product_id.clone();

        let _product = self.product_locks.acquire(&product_id).await;
        let mut reviews = self.load_product(&product_id).await?;
        let position = reviews
            .iter()
            .position(|review| review.id == id)
            .ok_or_else(|| review_not_found(id))?;

        let updated = draft.into_review(&reviews[position]);
        updated.validate()?;

        reviews.remove(position);
        reviews.push(updated.clone());
        self.store(
            "save_product_reviews",
            self.repository.save_product_reviews(&product_id, &reviews),
        )
        .await?;

        info!(review_id = id, "Review edited");
        Ok(updated)
    }

    /// Drops every product list referenced by the lookup and the lookup
    /// itself. Returns the number of reviews removed.
    #[instrument(skip(self))]
    pub async fn clear_data(&self) -> Result<usize, DomainError> {
        for attempt in 1..=CLEAR_ATTEMPTS {
            let products: BTreeSet<String> = self.load_lookup().await?.into_values().collect();

            // Sorted acquisition keeps concurrent clears from deadlocking.
            let mut guards = Vec::with_capacity(products.len());
            for product_id in &products {
                guards.push(self.product_locks.acquire(product_id).await);
            }
            let _lookup = self.lookup_lock.lock().await;

            let lookup = self.load_lookup().await?;
            if !lookup.values().all(|product_id| products.contains(product_id)) {
                debug!(attempt, "New products appeared while clearing, retrying");
                continue;
            }

            let write = products
                .iter()
                .fold(ReviewStoreWrite::new(), |write, product_id| {
                    write.product(product_id.clone(), Vec::new())
                })
                .lookup(ReviewLookup::new());
            self.store("commit", self.repository.commit(write)).await?;

            info!(reviews = lookup.len(), products = products.len(), "Review data cleared");
            return Ok(lookup.len());
        }

        Err(DomainError::RepositoryError(
            "review data kept changing while clearing".to_string(),
        ))
    }

    /// Store failures propagate; they are never read as "not reviewed".
    #[instrument(skip(self))]
    pub async fn has_shopper_reviewed(
        &self,
        shopper_id: &str,
        product_id: &str,
    ) -> Result<bool, DomainError> {
        let reviews = self.load_product(product_id).await?;
        Ok(reviews.iter().any(|review| review.is_written_by(shopper_id)))
    }

    /// Walks the shopper's orders with bounded concurrency and stops at the
    /// first order containing the product.
    #[instrument(skip(self))]
    pub async fn shopper_has_purchased_product(
        &self,
        shopper_id: &str,
        product_id: &str,
    ) -> PurchaseStatus {
        let orders = match self
            .collaborator("order history", self.orders.list_orders(shopper_id))
            .await
        {
            Ok(orders) => orders,
            Err(err) => {
                warn!(error = %err, "Could not list shopper orders");
                return PurchaseStatus::Unavailable(err.to_string());
            }
        };

        let mut checks = stream::iter(orders)
            .map(|order_id| async move {
                self.collaborator("order history", self.orders.get_order(&order_id))
                    .await
                    .map(|items| items.iter().any(|item| item == product_id))
            })
            .buffer_unordered(self.options.purchase_check_concurrency.max(1));

        let mut failure = None;
        while let Some(result) = checks.next().await {
            match result {
                Ok(true) => return PurchaseStatus::Purchased,
                Ok(false) => {}
                Err(err) => {
                    warn!(error = %err, "Order lookup failed");
                    failure.get_or_insert_with(|| err.to_string());
                }
            }
        }

        match failure {
            Some(reason) => PurchaseStatus::Unavailable(reason),
            None => PurchaseStatus::NotPurchased,
        }
    }

    pub async fn ping(&self) -> Result<(), DomainError> {
        self.store("ping", self.repository.ping()).await
    }

    async fn moderate_one(&self, id: i64, approved: bool) -> Result<(), DomainError> {
        let product_id = self.resolve_product(id).await?;
        let _product = self.product_locks.acquire(&product_id).await;

        let mut reviews = self.load_product(&product_id).await?;
        let review = reviews
            .iter_mut()
            .find(|review| review.id == id)
            .ok_or_else(|| review_not_found(id))?;
        review.approved = approved;

        self.store(
            "save_product_reviews",
            self.repository.save_product_reviews(&product_id, &reviews),
        )
        .await
    }

    /// Removes one review from its product list and the lookup together.
    #[instrument(skip(self))]
    pub async fn delete_review(&self, id: i64) -> Result<(), DomainError> {
        let product_id = self.resolve_product(id).await?;
        let _product = self.product_locks.acquire(&product_id).await;

        let mut reviews = self.load_product(&product_id).await?;
        let before = reviews.len();
        reviews.retain(|review| review.id != id);

        let _lookup = self.lookup_lock.lock().await;
        let mut lookup = self.load_lookup().await?;
        if lookup.remove(&id).is_none() {
            // Deleted by a concurrent request between resolve and lock.
            return Err(review_not_found(id));
        }

        if reviews.len() == before {
            warn!(review_id = id, %product_id, "Lookup entry without a stored review, dropping it");
            return self
                .store("save_lookup", self.repository.save_lookup(&lookup))
                .await;
        }

        let write = ReviewStoreWrite::new()
            .product(product_id, reviews)
            .lookup(lookup);
        self.store("commit", self.repository.commit(write)).await?;
        debug!(review_id = id, "Review deleted");
        Ok(())
    }

    async fn rated_reviews(&self, product_id: &str) -> Result<Vec<Review>, DomainError> {
        let settings = self.settings().await?;
        let mut reviews = self.load_product(product_id).await?;
        if settings.require_approval {
            reviews.retain(|review| review.approved);
        }
        Ok(reviews)
    }

    async fn resolve_product(&self, id: i64) -> Result<String, DomainError> {
        self.load_lookup()
            .await?
            .remove(&id)
            .ok_or_else(|| review_not_found(id))
    }

    async fn load_lookup(&self) -> Result<ReviewLookup, DomainError> {
        self.store("load_lookup", self.repository.load_lookup()).await
    }

    async fn load_product(&self, product_id: &str) -> Result<Vec<Review>, DomainError> {
        self.store(
            "get_product_reviews",
            self.repository.get_product_reviews(product_id),
        )
        .await
    }

    async fn settings(&self) -> Result<AppSettings, DomainError> {
        self.collaborator("settings provider", self.settings.get_settings())
            .await
            .map_err(|err| DomainError::Unavailable(format!("settings: {err}")))
    }

    async fn store<T>(
        &self,
        operation: &str,
        call: impl Future<Output = Result<T, DomainError>>,
    ) -> Result<T, DomainError> {
        tokio::time::timeout(self.options.call_timeout, call)
            .await
            .map_err(|_| {
                DomainError::RepositoryError(format!(
                    "review store timed out during {operation} after {:?}",
                    self.options.call_timeout
                ))
            })?
    }

    async fn collaborator<T>(
        &self,
        name: &str,
        call: impl Future<Output = anyhow::Result<T>>,
    ) -> anyhow::Result<T> {
        match tokio::time::timeout(self.options.call_timeout, call).await {
            Ok(result) => result,
            Err(_) => anyhow::bail!("{name} timed out after {:?}", self.options.call_timeout),
        }
    }
}

fn review_not_found(id: i64) -> DomainError {
    DomainError::NotFound(format!("review {id}"))
}
