//! Storefront cart core
//!
//! Offer-aware cart pricing and optimistic quantity reconciliation for an
//! e-commerce storefront. The remote cart/offer REST service stays the
//! sole source of truth; this crate owns the client-side view of it.
//!
//! ## Features
//! - Active-offer resolution with silent "no offer" absence
//! - Best-offer selection between product and category discounts
//! - Quantity policy: stock and per-line cap bounds with typed violations
//! - Optimistic quantity updates with rollback, supersession, and an
//!   explicit stale-response guard
//! - Cart totals: subtotal, offer discount, flat shipping, zero-floored
//!   grand total
//!
//! ## Overview
//!
//! [`session::CartSession`] owns the cart view and drives every quantity
//! mutation through a per-line `Stable → Pending → Stable` machine. Pure
//! pricing math lives in [`domain`]; the REST contract behind
//! [`gateway::CartGateway`]/[`gateway::OfferGateway`] has one production
//! implementation, [`gateway::HttpCartService`].

pub mod domain;
pub mod gateway;
pub mod resolver;
pub mod session;

pub use domain::{
    compute_totals, discount_amount, select_best_offer, validate_quantity, Cart, CartEvent,
    CartTotals, DiscountSource, LineItem, Money, Offer, PricedLine, QuantityViolation,
    ResolvedDiscount, GLOBAL_LINE_CAP,
};
pub use gateway::{
    AddItemRequest, CartGateway, GatewayError, HttpCartService, OfferGateway, UpdateError,
    UpdateRejection,
};
pub use resolver::{resolve_offers, ResolvedOffers};
pub use session::{CartConfig, CartSession, RequestError, SettleOutcome, UpdateTicket};
