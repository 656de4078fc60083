//! HTTP implementation of the cart/offer gateways

use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::Deserialize;

use crate::domain::{Cart, Offer};

use super::{AddItemRequest, CartGateway, GatewayError, OfferGateway, UpdateError, UpdateRejection};

/// Bearer-token-authenticated client for the storefront REST service.
#[derive(Clone)]
pub struct HttpCartService {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl HttpCartService {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Fetch one active offer. 404 is the normal "no active offer" case.
    async fn fetch_offer(&self, path: &str) -> Result<Option<Offer>, GatewayError> {
        let response = self
            .http
            .get(self.url(path))
            .bearer_auth(&self.token)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        classify_offer_response(status.as_u16(), &body)
    }

    async fn expect_cart(&self, response: Response) -> Result<Cart, GatewayError> {
        let status = response.status();
        if status.is_success() {
            Ok(response.json::<Cart>().await?)
        } else {
            Err(unexpected(status, response).await)
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error_type: Option<String>,
    #[serde(default)]
    max_quantity: Option<u32>,
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|body| body.message)
        .unwrap_or_else(|| "unknown error".to_string())
}

async fn unexpected(status: StatusCode, response: Response) -> GatewayError {
    let body = response.text().await.unwrap_or_default();
    GatewayError::Unexpected { status: status.as_u16(), message: error_message(&body) }
}

/// Map an offer-lookup response to the typed result: 404 is the normal
/// "no active offer" state, a success body must parse as an offer, and
/// everything else is an error.
fn classify_offer_response(status: u16, body: &str) -> Result<Option<Offer>, GatewayError> {
    if status == 404 {
        return Ok(None);
    }
    if (200..300).contains(&status) {
        return serde_json::from_str::<Offer>(body).map(Some).map_err(|error| {
            GatewayError::Unexpected { status, message: format!("malformed offer body: {error}") }
        });
    }
    Err(GatewayError::Unexpected { status, message: error_message(body) })
}

/// Map a failed PATCH response body to an update error, preferring the
/// server's structured `maxQuantity` rejection when present.
fn classify_update_failure(status: u16, body: &str) -> UpdateError {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        if parsed.error_type.as_deref() == Some("maxQuantity") {
            if let Some(max_quantity) = parsed.max_quantity {
                return UpdateError::Rejected(UpdateRejection::MaxQuantity { max_quantity });
            }
        }
        if let Some(message) = parsed.message {
            return UpdateError::Gateway(GatewayError::Unexpected { status, message });
        }
    }
    UpdateError::Gateway(GatewayError::Unexpected {
        status,
        message: "unknown error".to_string(),
    })
}

#[async_trait]
impl OfferGateway for HttpCartService {
    async fn active_product_offer(&self, product_id: &str) -> Result<Option<Offer>, GatewayError> {
        self.fetch_offer(&format!("/offers/product/active/{product_id}")).await
    }

    async fn active_category_offer(
        &self,
        category_id: &str,
    ) -> Result<Option<Offer>, GatewayError> {
        self.fetch_offer(&format!("/offers/category/active/{category_id}")).await
    }
}

#[async_trait]
impl CartGateway for HttpCartService {
    async fn fetch_cart(&self) -> Result<Cart, GatewayError> {
        let response = self
            .http
            .get(self.url("/cart"))
            .bearer_auth(&self.token)
            .send()
            .await?;
        self.expect_cart(response).await
    }

    async fn add_item(&self, request: &AddItemRequest) -> Result<Cart, GatewayError> {
        let response = self
            .http
            .post(self.url("/cart/items"))
            .bearer_auth(&self.token)
            .json(request)
            .send()
            .await?;
        self.expect_cart(response).await
    }

    async fn update_quantity(&self, item_id: &str, quantity: u32) -> Result<Cart, UpdateError> {
        let response = self
            .http
            .patch(self.url(&format!("/cart/items/{item_id}")))
            .bearer_auth(&self.token)
            .json(&serde_json::json!({ "quantity": quantity }))
            .send()
            .await
            .map_err(GatewayError::from)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<Cart>().await.map_err(GatewayError::from)?);
        }
        let body = response.text().await.unwrap_or_default();
        Err(classify_update_failure(status.as_u16(), &body))
    }

    async fn remove_item(&self, item_id: &str) -> Result<Cart, GatewayError> {
        let response = self
            .http
            .delete(self.url(&format!("/cart/items/{item_id}")))
            .bearer_auth(&self.token)
            .send()
            .await?;
        self.expect_cart(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_without_doubled_slashes() {
        let svc = HttpCartService::new("https://api.example.com/", "token");
        assert_eq!(svc.url("/cart"), "https://api.example.com/cart");
    }

    #[test]
    fn offer_not_found_is_typed_absence() {
        assert!(matches!(
            classify_offer_response(404, r#"{"message":"no active offer"}"#),
            Ok(None)
        ));
    }

    #[test]
    fn offer_success_body_is_parsed() {
        let body = r#"{
            "id": "off-7",
            "scope": "product",
            "scopeId": "p1",
            "discountType": "flat",
            "discountValue": 150,
            "activeWindow": {
                "startsAt": "2026-01-01T00:00:00Z",
                "endsAt": "2026-02-01T00:00:00Z"
            }
        }"#;
        let offer = classify_offer_response(200, body).unwrap().unwrap();
        assert_eq!(offer.id, "off-7");
        assert_eq!(offer.scope_id, "p1");
    }

    #[test]
    fn offer_server_error_is_not_swallowed() {
        match classify_offer_response(500, r#"{"message":"boom"}"#) {
            Err(GatewayError::Unexpected { status, message }) => {
                assert_eq!(status, 500);
                assert_eq!(message, "boom");
            }
            other => panic!("expected unexpected-response error, got {other:?}"),
        }
    }

    #[test]
    fn malformed_offer_success_body_is_an_error() {
        assert!(matches!(
            classify_offer_response(200, "<html></html>"),
            Err(GatewayError::Unexpected { status: 200, .. })
        ));
    }

    #[test]
    fn structured_max_quantity_rejection_is_parsed() {
        let err = classify_update_failure(409, r#"{"errorType":"maxQuantity","maxQuantity":5}"#);
        match err {
            UpdateError::Rejected(UpdateRejection::MaxQuantity { max_quantity }) => {
                assert_eq!(max_quantity, 5)
            }
            other => panic!("expected structured rejection, got {other:?}"),
        }
    }

    #[test]
    fn plain_message_body_maps_to_gateway_error() {
        let err = classify_update_failure(500, r#"{"message":"database unavailable"}"#);
        match err {
            UpdateError::Gateway(GatewayError::Unexpected { status, message }) => {
                assert_eq!(status, 500);
                assert_eq!(message, "database unavailable");
            }
            other => panic!("expected gateway error, got {other:?}"),
        }
    }

    #[test]
    fn garbage_body_still_yields_an_error() {
        let err = classify_update_failure(502, "<html>bad gateway</html>");
        assert!(matches!(err, UpdateError::Gateway(GatewayError::Unexpected { status: 502, .. })));
    }
}
