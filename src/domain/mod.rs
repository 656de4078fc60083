//! Domain model: offers, quantity policy, cart view and totals

pub mod cart;
pub mod events;
pub mod offer;
pub mod quantity;
pub mod value_objects;

pub use cart::{compute_totals, Cart, CartTotals, LineItem, PricedLine};
pub use events::CartEvent;
pub use offer::{
    discount_amount, select_best_offer, ActiveWindow, DiscountSource, DiscountType, Offer,
    OfferError, OfferScope, ResolvedDiscount,
};
pub use quantity::{effective_max, validate_quantity, QuantityViolation, GLOBAL_LINE_CAP};
pub use value_objects::{Money, MoneyError};
