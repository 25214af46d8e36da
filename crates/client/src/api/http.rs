//! reqwest implementation of the API traits

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode, header::ACCEPT};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::debug;
use uuid::Uuid;

use crate::{
    api::{ApiError, CartApi, OrdersApi},
    models::{
        AddItem, Cart, LineKey, NewOrder, OrderDetail, OrderList, OrderStatus, OrderSummary,
        OrderUpdate, RemoveItem, Reschedule,
    },
};

/// JSON API client authenticated with a bearer token.
#[derive(Debug, Clone)]
pub struct HttpApi {
    http: Client,
    base_url: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    brief: Option<String>,

    #[serde(default)]
    detail: Option<String>,
}

#[derive(Debug, Serialize)]
struct QuantityUpdate<'a> {
    #[serde(flatten)]
    key: &'a LineKey,
    quantity: i64,
}

#[derive(Debug, Serialize)]
struct CancelBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<String>,
}

impl HttpApi {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url, token)
    }

    pub fn with_client(http: Client, base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request
            .bearer_auth(&self.token)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(ApiError::Transport)?;

        let status = response.status();

        if status == StatusCode::SERVICE_UNAVAILABLE {
            return Err(ApiError::Unavailable);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();

            debug!(status = status.as_u16(), body, "request rejected");

            return Err(ApiError::Rejected {
                status: status.as_u16(),
                message: rejection_message(status, &body),
            });
        }

        response.json().await.map_err(ApiError::Decode)
    }
}

/// Prefer the server's explanation; fall back to the status reason.
fn rejection_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|body| body.error.brief.or(body.error.detail))
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        })
}

#[async_trait]
impl CartApi for HttpApi {
    async fn get_cart(&self) -> Result<Cart, ApiError> {
        self.send(self.http.get(self.url("/cart"))).await
    }

    async fn add_item(&self, item: &AddItem) -> Result<Cart, ApiError> {
        self.send(self.http.post(self.url("/cart")).json(item)).await
    }

    async fn update_quantity(&self, key: &LineKey, quantity: i64) -> Result<Cart, ApiError> {
        let body = QuantityUpdate { key, quantity };

        self.send(self.http.put(self.url("/cart")).json(&body)).await
    }

    async fn remove_item(&self, selector: &RemoveItem) -> Result<Cart, ApiError> {
        let mut query = vec![("product", selector.product_uuid.to_string())];

        if let Some(stall) = selector.stall_uuid {
            query.push(("stall", stall.to_string()));
        }

        if let Some(at) = selector.scheduled_for {
            query.push(("scheduled_for", at.to_string()));
        }

        self.send(self.http.delete(self.url("/cart")).query(&query))
            .await
    }

    async fn clear(&self) -> Result<Cart, ApiError> {
        self.send(self.http.delete(self.url("/cart")).query(&[("all", "true")]))
            .await
    }
}

#[async_trait]
impl OrdersApi for HttpApi {
    async fn place_order(&self, order: &NewOrder) -> Result<OrderDetail, ApiError> {
        self.send(self.http.post(self.url("/orders")).json(order))
            .await
    }

    async fn get_order(&self, order: Uuid) -> Result<OrderDetail, ApiError> {
        self.send(self.http.get(self.url(&format!("/orders/{order}"))))
            .await
    }

    async fn list_orders(&self, status: Option<OrderStatus>) -> Result<Vec<OrderSummary>, ApiError> {
        let mut request = self.http.get(self.url("/orders"));

        if let Some(status) = status {
            request = request.query(&[("status", status.as_str())]);
        }

        let list: OrderList = self.send(request).await?;

        Ok(list.orders)
    }

    async fn update_order(&self, order: Uuid, update: &OrderUpdate) -> Result<OrderDetail, ApiError> {
        self.send(
            self.http
                .patch(self.url(&format!("/orders/{order}")))
                .json(update),
        )
        .await
    }

    async fn cancel_order(&self, order: Uuid, reason: Option<String>) -> Result<OrderDetail, ApiError> {
        self.send(
            self.http
                .post(self.url(&format!("/orders/{order}/cancel")))
                .json(&CancelBody { notes: reason }),
        )
        .await
    }

    async fn reschedule_order(
        &self,
        order: Uuid,
        reschedule: &Reschedule,
    ) -> Result<OrderDetail, ApiError> {
        self.send(
            self.http
                .post(self.url(&format!("/orders/{order}/reschedule")))
                .json(reschedule),
        )
        .await
    }
}
