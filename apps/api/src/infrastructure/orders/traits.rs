use async_trait::async_trait;

/// Read access to a shopper's order history.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderHistory: Send + Sync {
    /// Ids of every order placed by the shopper
    async fn list_orders(&self, shopper_id: &str) -> anyhow::Result<Vec<String>>;

    /// Product ids of the order's line items
    async fn get_order(&self, order_id: &str) -> anyhow::Result<Vec<String>>;
}
