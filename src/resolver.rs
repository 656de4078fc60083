//! Offer resolution
//!
//! Wraps the offer gateway with the resilience rule the cart depends on:
//! pricing must never hard-fail. A missing offer is a normal, silent
//! state; a failed or invalid lookup is logged and degraded to "no offer".

use chrono::Utc;

use crate::domain::Offer;
use crate::gateway::OfferGateway;

/// At most one active offer per scope for a line item.
#[derive(Clone, Debug, Default)]
pub struct ResolvedOffers {
    pub product_offer: Option<Offer>,
    pub category_offer: Option<Offer>,
}

/// Fetch the active product-scoped offer, degrading failures to `None`.
pub async fn lookup_product_offer<G: OfferGateway + ?Sized>(
    gateway: &G,
    product_id: &str,
) -> Option<Offer> {
    match gateway.active_product_offer(product_id).await {
        Ok(offer) => checked(offer),
        Err(error) => {
            tracing::warn!(%product_id, %error, "product offer lookup failed, pricing without it");
            None
        }
    }
}

/// Fetch the active category-scoped offer, degrading failures to `None`.
pub async fn lookup_category_offer<G: OfferGateway + ?Sized>(
    gateway: &G,
    category_id: &str,
) -> Option<Offer> {
    match gateway.active_category_offer(category_id).await {
        Ok(offer) => checked(offer),
        Err(error) => {
            tracing::warn!(%category_id, %error, "category offer lookup failed, pricing without it");
            None
        }
    }
}

/// Resolve both scopes for one line item.
pub async fn resolve_offers<G: OfferGateway + ?Sized>(
    gateway: &G,
    product_id: &str,
    category_id: Option<&str>,
) -> ResolvedOffers {
    let product_offer = lookup_product_offer(gateway, product_id).await;
    let category_offer = match category_id {
        Some(category_id) => lookup_category_offer(gateway, category_id).await,
        None => None,
    };
    ResolvedOffers { product_offer, category_offer }
}

// An offer violating its own invariants, or one the server returned
// outside its own active window, must not reach pricing.
fn checked(offer: Option<Offer>) -> Option<Offer> {
    let offer = offer?;
    if let Err(error) = offer.validate() {
        tracing::warn!(offer_id = %offer.id, %error, "dropping invalid offer");
        return None;
    }
    if !offer.is_active_at(Utc::now()) {
        tracing::warn!(offer_id = %offer.id, "dropping offer outside its active window");
        return None;
    }
    Some(offer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ActiveWindow, DiscountType, OfferScope};
    use crate::gateway::GatewayError;
    use async_trait::async_trait;
    use chrono::{Duration, Utc};
    use rust_decimal_macros::dec;

    struct StaticOffers {
        product: Result<Option<Offer>, ()>,
        category: Result<Option<Offer>, ()>,
    }

    #[async_trait]
    impl OfferGateway for StaticOffers {
        async fn active_product_offer(&self, _: &str) -> Result<Option<Offer>, GatewayError> {
            self.product.clone().map_err(|()| GatewayError::Unexpected {
                status: 500,
                message: "boom".into(),
            })
        }
        async fn active_category_offer(&self, _: &str) -> Result<Option<Offer>, GatewayError> {
            self.category.clone().map_err(|()| GatewayError::Unexpected {
                status: 500,
                message: "boom".into(),
            })
        }
    }

    fn offer(scope: OfferScope, value: rust_decimal::Decimal) -> Offer {
        Offer {
            id: "off-1".into(),
            scope,
            scope_id: "x".into(),
            discount_type: DiscountType::Percentage,
            discount_value: value,
            active_window: ActiveWindow {
                starts_at: Utc::now() - Duration::hours(1),
                ends_at: Utc::now() + Duration::hours(1),
            },
        }
    }

    #[tokio::test]
    async fn absence_is_a_silent_none() {
        let gateway = StaticOffers { product: Ok(None), category: Ok(None) };
        let resolved = resolve_offers(&gateway, "p1", Some("c1")).await;
        assert!(resolved.product_offer.is_none());
        assert!(resolved.category_offer.is_none());
    }

    #[tokio::test]
    async fn lookup_failure_degrades_to_none() {
        let gateway = StaticOffers {
            product: Err(()),
            category: Ok(Some(offer(OfferScope::Category, dec!(10)))),
        };
        let resolved = resolve_offers(&gateway, "p1", Some("c1")).await;
        assert!(resolved.product_offer.is_none());
        assert!(resolved.category_offer.is_some());
    }

    #[tokio::test]
    async fn offer_outside_its_window_is_dropped() {
        let mut expired = offer(OfferScope::Product, dec!(10));
        expired.active_window = ActiveWindow {
            starts_at: Utc::now() - Duration::hours(3),
            ends_at: Utc::now() - Duration::hours(1),
        };
        let gateway = StaticOffers { product: Ok(Some(expired)), category: Ok(None) };
        let resolved = resolve_offers(&gateway, "p1", None).await;
        assert!(resolved.product_offer.is_none());
    }

    #[tokio::test]
    async fn invalid_offer_is_dropped() {
        let gateway = StaticOffers {
            product: Ok(Some(offer(OfferScope::Product, dec!(150)))),
            category: Ok(None),
        };
        let resolved = resolve_offers(&gateway, "p1", None).await;
        assert!(resolved.product_offer.is_none());
    }

    #[tokio::test]
    async fn no_category_means_no_category_lookup() {
        let gateway = StaticOffers {
            product: Ok(None),
            category: Err(()), // would degrade noisily if it were called
        };
        let resolved = resolve_offers(&gateway, "p1", None).await;
        assert!(resolved.category_offer.is_none());
    }
}
