//! Promotional offers and best-offer selection
//!
//! Discount math is centralized here as pure functions so pricing can be
//! tested independently of cart state and rendering. Per-product and
//! per-category offers are each evaluated against the undiscounted line
//! total; they never stack.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::value_objects::Money;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OfferScope {
    Product,
    Category,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    Percentage,
    Flat,
}

/// Time window during which an offer applies. Half-open: active from
/// `starts_at` up to but not including `ends_at`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveWindow {
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

impl ActiveWindow {
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.starts_at <= at && at < self.ends_at
    }
}

/// A promotional offer scoped to one product or one category. The server
/// guarantees at most one active offer per scope at a time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    pub id: String,
    pub scope: OfferScope,
    pub scope_id: String,
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    pub active_window: ActiveWindow,
}

impl Offer {
    /// Check the offer invariants: non-negative value, and percentages
    /// within `[0, 100]`.
    pub fn validate(&self) -> Result<(), OfferError> {
        if self.discount_value < Decimal::ZERO {
            return Err(OfferError::NegativeDiscount);
        }
        if self.discount_type == DiscountType::Percentage
            && self.discount_value > Decimal::ONE_HUNDRED
        {
            return Err(OfferError::PercentageOutOfRange);
        }
        Ok(())
    }

    pub fn is_active_at(&self, at: DateTime<Utc>) -> bool {
        self.active_window.contains(at)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OfferError {
    #[error("discount value must be non-negative")]
    NegativeDiscount,

    #[error("percentage discount must not exceed 100")]
    PercentageOutOfRange,
}

/// Where a line's selected discount came from. Drives a UI badge only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountSource {
    None,
    Product,
    Category,
}

/// The discount actually applied to a line. Derived, never stored:
/// recomputed whenever offers or the line total change.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResolvedDiscount {
    pub amount: Money,
    pub source: DiscountSource,
}

impl ResolvedDiscount {
    pub fn none(currency: &str) -> Self {
        Self { amount: Money::zero(currency), source: DiscountSource::None }
    }
}

/// Discount an offer takes off `price`. A flat discount is clamped to the
/// price so the effective price never goes negative.
pub fn discount_amount(price: &Money, offer: Option<&Offer>) -> Money {
    let Some(offer) = offer else {
        return Money::zero(price.currency());
    };
    let amount = match offer.discount_type {
        DiscountType::Percentage => price.amount() * offer.discount_value / Decimal::ONE_HUNDRED,
        DiscountType::Flat => price.amount().min(offer.discount_value),
    };
    Money::new(amount, price.currency())
}

/// Pick the larger of the product-level and category-level discounts for a
/// line, each computed independently against the undiscounted line total.
/// Ties favor the product offer. A zero-amount result carries no source.
pub fn select_best_offer(
    line_total: &Money,
    product_offer: Option<&Offer>,
    category_offer: Option<&Offer>,
) -> ResolvedDiscount {
    let from_product = discount_amount(line_total, product_offer);
    let from_category = discount_amount(line_total, category_offer);

    let (amount, source) = if from_product.amount() >= from_category.amount() {
        (from_product, DiscountSource::Product)
    } else {
        (from_category, DiscountSource::Category)
    };
    if amount.is_zero() {
        return ResolvedDiscount::none(line_total.currency());
    }
    ResolvedDiscount { amount, source }
}
