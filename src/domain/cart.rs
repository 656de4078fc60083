//! Cart view and totals

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::offer::{select_best_offer, Offer, ResolvedDiscount};
use crate::domain::quantity::effective_max;
use crate::domain::value_objects::Money;

/// One product+size+quantity entry as the server reports it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub id: String,
    pub product_id: String,
    #[serde(default)]
    pub category_id: Option<String>,
    pub name: String,
    pub size: String,
    pub quantity: u32,
    pub unit_price: Money,
    pub max_stock: u32,
    pub is_available: bool,
    #[serde(default)]
    pub unavailable_reason: Option<String>,
}

impl LineItem {
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }

    /// Ceiling the UI should offer for this line.
    pub fn effective_max(&self, global_cap: u32) -> u32 {
        effective_max(self.max_stock, global_cap)
    }
}

/// Server snapshot of the cart. The remote service is the sole source of
/// truth for persisted quantity and line existence; local copies of this
/// struct only ever hold confirmed state plus in-flight optimistic edits.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub id: String,
    pub items: Vec<LineItem>,
}

impl Cart {
    pub fn item(&self, item_id: &str) -> Option<&LineItem> {
        self.items.iter().find(|i| i.id == item_id)
    }
}

/// A line item with its best applicable discount resolved.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PricedLine {
    pub item: LineItem,
    pub discount: ResolvedDiscount,
}

impl PricedLine {
    /// Resolve the discount for one line. Unavailable lines are priced at
    /// zero discount; they stay in the view for rendering but take no part
    /// in money math.
    pub fn price(
        item: LineItem,
        product_offer: Option<&Offer>,
        category_offer: Option<&Offer>,
    ) -> Self {
        let discount = if item.is_available {
            select_best_offer(&item.line_total(), product_offer, category_offer)
        } else {
            ResolvedDiscount::none(item.unit_price.currency())
        };
        Self { item, discount }
    }
}

/// Aggregate totals shown before checkout.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CartTotals {
    pub subtotal: Money,
    pub offer_discount: Money,
    pub shipping: Money,
    pub total: Money,
}

/// Sum the priced lines into checkout totals. Available lines only;
/// shipping is a flat fee charged iff the subtotal is positive; the grand
/// total is floored at zero.
pub fn compute_totals(lines: &[PricedLine], shipping_fee: &Money) -> CartTotals {
    let currency = shipping_fee.currency();
    let available = || lines.iter().filter(|l| l.item.is_available);

    let subtotal = available().fold(Money::zero(currency), |acc, l| {
        acc.add(&l.item.line_total()).unwrap_or(acc)
    });
    let offer_discount = available().fold(Money::zero(currency), |acc, l| {
        acc.add(&l.discount.amount).unwrap_or(acc)
    });
    let shipping = if subtotal.amount() > Decimal::ZERO {
        shipping_fee.clone()
    } else {
        Money::zero(currency)
    };
    let total = (subtotal.amount() - offer_discount.amount() + shipping.amount()).max(Decimal::ZERO);

    CartTotals { subtotal, offer_discount, shipping, total: Money::new(total, currency) }
}
