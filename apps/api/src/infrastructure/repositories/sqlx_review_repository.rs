use crate::domain::review::{
    entity::{Review, ReviewLookup},
    errors::DomainError,
    repository::{ReviewRepository, ReviewStoreWrite},
};
use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use sqlx::{PgConnection, PgPool, types::Json};
use tracing::{debug, error, info, instrument};

const LOOKUP_KEY: &str = "lookup";

fn product_key(product_id: &str) -> String {
    format!("reviews:{}", product_id)
}

fn store_error(err: sqlx::Error) -> DomainError {
    error!("Review store query failed: {}", err);
    DomainError::RepositoryError(err.to_string())
}

/// Review store kept as JSONB documents in the `review_store` table.
///
/// Ids come from the `review_id_seq` sequence and multi-document writes run
/// inside a single transaction.
pub struct SqlxReviewRepository {
    pub pool: PgPool,
}

impl SqlxReviewRepository {
    /// Creates a new instance of the repository with the provided database pool.
    pub fn new(pool: PgPool) -> Self {
        info!("Initializing SqlxReviewRepository with connection pool");
        Self { pool }
    }

    async fn read_document<T>(&self, key: &str) -> Result<T, DomainError>
    where
        T: DeserializeOwned + Default + Send + Unpin + 'static,
    {
        let document = sqlx::query_scalar::<_, Json<T>>("SELECT value FROM review_store WHERE key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)?;
        Ok(document.map(|Json(value)| value).unwrap_or_default())
    }
}

async fn upsert_document<T>(conn: &mut PgConnection, key: &str, value: &T) -> Result<(), DomainError>
where
    T: Serialize + Sync,
{
    sqlx::query(
        "INSERT INTO review_store (key, value, updated_at) VALUES ($1, $2, NOW())
         ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()",
    )
    .bind(key)
    .bind(Json(value))
    .execute(&mut *conn)
    .await
    .map_err(store_error)?;
    Ok(())
}

async fn delete_document(conn: &mut PgConnection, key: &str) -> Result<(), DomainError> {
    sqlx::query("DELETE FROM review_store WHERE key = $1")
        .bind(key)
        .execute(&mut *conn)
        .await
        .map_err(store_error)?;
    Ok(())
}

async fn write_product_reviews(
    conn: &mut PgConnection,
    product_id: &str,
    reviews: &[Review],
) -> Result<(), DomainError> {
    let key = product_key(product_id);
    if reviews.is_empty() {
        delete_document(conn, &key).await
    } else {
        upsert_document(conn, &key, &reviews).await
    }
}

async fn write_lookup(conn: &mut PgConnection, lookup: &ReviewLookup) -> Result<(), DomainError> {
    if lookup.is_empty() {
        delete_document(conn, LOOKUP_KEY).await
    } else {
        upsert_document(conn, LOOKUP_KEY, lookup).await
    }
}

#[async_trait]
impl ReviewRepository for SqlxReviewRepository {
    async fn load_lookup(&self) -> Result<ReviewLookup, DomainError> {
        self.read_document(LOOKUP_KEY).await
    }

    async fn save_lookup(&self, lookup: &ReviewLookup) -> Result<(), DomainError> {
        let mut conn = self.pool.acquire().await.map_err(store_error)?;
        write_lookup(&mut conn, lookup).await
    }

    async fn get_product_reviews(&self, product_id: &str) -> Result<Vec<Review>, DomainError> {
        self.read_document(&product_key(product_id)).await
    }

    async fn save_product_reviews(
        &self,
        product_id: &str,
        reviews: &[Review],
    ) -> Result<(), DomainError> {
        let mut conn = self.pool.acquire().await.map_err(store_error)?;
        write_product_reviews(&mut conn, product_id, reviews).await
    }

    async fn next_review_id(&self) -> Result<i64, DomainError> {
        sqlx::query_scalar::<_, i64>("SELECT nextval('review_id_seq')")
            .fetch_one(&self.pool)
            .await
            .map_err(store_error)
    }

    #[instrument(skip_all, fields(products = write.product_reviews.len(), lookup = write.lookup.is_some()))]
    async fn commit(&self, write: ReviewStoreWrite) -> Result<(), DomainError> {
        if write.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await.map_err(store_error)?;
        for (product_id, reviews) in &write.product_reviews {
            write_product_reviews(&mut tx, product_id, reviews).await?;
        }
        if let Some(lookup) = &write.lookup {
            write_lookup(&mut tx, lookup).await?;
        }
        tx.commit().await.map_err(store_error)?;

        debug!("Review store batch committed");
        Ok(())
    }

    async fn ping(&self) -> Result<(), DomainError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(store_error)?;
        Ok(())
    }
}
