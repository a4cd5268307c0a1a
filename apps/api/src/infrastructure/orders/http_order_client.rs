use super::traits::OrderHistory;
use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, IntoUrl, Url};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, instrument};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderListResponse {
    #[serde(default)]
    list: Vec<OrderSummary>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderSummary {
    order_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderDetailResponse {
    #[serde(default)]
    items: Vec<OrderItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderItem {
    product_id: String,
}

/// Order-management API client.
///
/// Expects `GET {base}/orders?q={shopper}` returning `{ "list": [{ "orderId" }] }`
/// and `GET {base}/orders/{id}` returning `{ "items": [{ "productId" }] }`.
pub struct HttpOrderClient {
    client: Client,
    base_url: String,
    api_token: Option<String>,
}

impl HttpOrderClient {
    pub fn new(base_url: String, api_token: Option<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build order history HTTP client")?;
        info!("Initializing HttpOrderClient for {}", base_url);
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token,
        })
    }

    /// `{base}/orders/{order_id}` with the id encoded as a single path segment.
    fn order_url(&self, order_id: &str) -> anyhow::Result<Url> {
        let mut url = Url::parse(&format!("{}/orders", self.base_url))
            .context("invalid order detail URL")?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("order API base URL cannot carry a path"))?
            .push(order_id);
        Ok(url)
    }

    fn get<U: IntoUrl>(&self, url: U) -> reqwest::RequestBuilder {
        let request = self.client.get(url);
        match &self.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl OrderHistory for HttpOrderClient {
    #[instrument(skip(self))]
    async fn list_orders(&self, shopper_id: &str) -> anyhow::Result<Vec<String>> {
        let url = Url::parse_with_params(&format!("{}/orders", self.base_url), &[("q", shopper_id)])
            .context("invalid order list URL")?;
        let response: OrderListResponse = self
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .context("malformed order list response")?;

        debug!("Shopper has {} orders", response.list.len());
        Ok(response.list.into_iter().map(|o| o.order_id).collect())
    }

    #[instrument(skip(self))]
    async fn get_order(&self, order_id: &str) -> anyhow::Result<Vec<String>> {
        let response: OrderDetailResponse = self
            .get(self.order_url(order_id)?)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .with_context(|| format!("malformed order response for {}", order_id))?;

        Ok(response.items.into_iter().map(|i| i.product_id).collect())
    }
}

/// Stand-in used when no order API is configured; every lookup fails so
/// purchases are reported as unverifiable rather than absent.
pub struct UnconfiguredOrderHistory;

#[async_trait]
impl OrderHistory for UnconfiguredOrderHistory {
    async fn list_orders(&self, _shopper_id: &str) -> anyhow::Result<Vec<String>> {
        anyhow::bail!("order history API is not configured")
    }

    async fn get_order(&self, _order_id: &str) -> anyhow::Result<Vec<String>> {
        anyhow::bail!("order history API is not configured")
    }
}
