use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use serde_json::json;

use super::{OrderStore, StoreError};
use crate::models::{Order, OrderStatus};

pub const ORDERS_QUERY: &str = r#"*[_type == "order"] {
  _id,
  firstName,
  lastName,
  phone,
  email,
  address,
  zipCode,
  total,
  city,
  orderDate,
  status,
  cartItems[] {
    product->{
      _id,
      name,
      image
    },
    quantity,
    price
  }
}"#;

#[derive(Debug, Deserialize)]
struct QueryResponse<T> {
    result: T,
}

/// Sanity HTTP API client for the order dataset. The token must be able to
/// write, so this lives only on the server.
#[derive(Clone)]
pub struct SanityStore {
    client: Client,
    base_url: String,
    dataset: String,
    api_version: String,
    token: Option<String>,
}

impl SanityStore {
    pub fn new(project_id: &str, dataset: &str, api_version: &str, token: Option<&str>) -> Self {
        Self::with_host(
            &format!("https://{}.api.sanity.io", project_id),
            dataset,
            api_version,
            token,
        )
    }

    pub fn with_host(host: &str, dataset: &str, api_version: &str, token: Option<&str>) -> Self {
        Self {
            client: Client::new(),
            base_url: host.trim_end_matches('/').to_string(),
            dataset: dataset.to_string(),
            api_version: api_version.trim_start_matches('v').to_string(),
            token: token.map(|t| t.to_string()),
        }
    }

    fn endpoint(&self, action: &str) -> Result<Url, StoreError> {
        let url = format!(
            "{}/v{}/data/{}/{}",
            self.base_url, self.api_version, action, self.dataset
        );
        Url::parse(&url).map_err(|e| StoreError::NotConfigured(format!("Invalid Sanity URL {}: {}", url, e)))
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.header("Authorization", format!("Bearer {}", token)),
            None => request,
        }
    }

    async fn check(response: reqwest::Response, document: &str) -> Result<reqwest::Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound(document.to_string()));
        }

        Err(StoreError::Api {
            status: status.as_u16(),
            body,
        })
    }

    async fn mutate(&self, document: &str, mutation: serde_json::Value) -> Result<(), StoreError> {
        if self.token.is_none() {
            return Err(StoreError::NotConfigured(
                "SANITY_API_TOKEN is required for mutations".to_string(),
            ));
        }

        let url = self.endpoint("mutate")?;
        let response = self
            .authorize(self.client.post(url))
            .json(&json!({ "mutations": [mutation] }))
            .send()
            .await
            .map_err(|e| StoreError::Request(format!("Sanity mutate error: {}", e)))?;

        Self::check(response, document).await?;
        Ok(())
    }
}

#[async_trait]
impl OrderStore for SanityStore {
    async fn list_orders(&self) -> Result<Vec<Order>, StoreError> {
        let mut url = self.endpoint("query")?;
        url.query_pairs_mut().append_pair("query", ORDERS_QUERY);

        let response = self
            .authorize(self.client.get(url))
            .send()
            .await
            .map_err(|e| StoreError::Request(format!("Sanity query error: {}", e)))?;

        let response = Self::check(response, "order").await?;
        let body: QueryResponse<Vec<Order>> = response
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;

        tracing::debug!("Fetched {} orders from Sanity", body.result.len());
        Ok(body.result)
    }

    async fn set_status(&self, order_id: &str, status: OrderStatus) -> Result<(), StoreError> {
        self.mutate(
            order_id,
            json!({ "patch": { "id": order_id, "set": { "status": status.as_str() } } }),
        )
        .await
    }

    async fn delete_order(&self, order_id: &str) -> Result<(), StoreError> {
        self.mutate(order_id, json!({ "delete": { "id": order_id } })).await
    }
}
