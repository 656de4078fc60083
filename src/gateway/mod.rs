//! Remote cart and offer service contract
//!
//! The storefront backend is the sole source of truth for persisted cart
//! state and active offers. These traits capture the REST contract so the
//! session can be driven against in-memory fakes in tests and the real
//! HTTP client in production.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::domain::{Cart, Offer};

pub mod http;

pub use http::HttpCartService;

/// Transport or protocol failure talking to the remote service.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("http transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response ({status}): {message}")]
    Unexpected { status: u16, message: String },
}

/// Structured rejection of a quantity update by the server.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpdateRejection {
    #[error("maximum quantity for this item is {max_quantity}")]
    MaxQuantity { max_quantity: u32 },
}

/// Failure of a `PATCH /cart/items/{id}` call. A structured rejection is
/// kept distinct from transport noise so the UI can show the server's
/// actual reason.
#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("update rejected: {0}")]
    Rejected(UpdateRejection),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Payload for `POST /cart/items`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub product_id: String,
    pub size: String,
    pub quantity: u32,
}

/// Active-offer lookups. At most one offer is active per scope at a time;
/// absence is `Ok(None)`, never an error.
#[async_trait]
pub trait OfferGateway: Send + Sync {
    async fn active_product_offer(&self, product_id: &str) -> Result<Option<Offer>, GatewayError>;
    async fn active_category_offer(&self, category_id: &str)
        -> Result<Option<Offer>, GatewayError>;
}

/// Cart mutations. Every mutation returns the full updated cart, which
/// callers adopt as the new confirmed baseline.
#[async_trait]
pub trait CartGateway: Send + Sync {
    async fn fetch_cart(&self) -> Result<Cart, GatewayError>;
    async fn add_item(&self, request: &AddItemRequest) -> Result<Cart, GatewayError>;
    async fn update_quantity(&self, item_id: &str, quantity: u32) -> Result<Cart, UpdateError>;
    async fn remove_item(&self, item_id: &str) -> Result<Cart, GatewayError>;
}
