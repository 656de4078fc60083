//! Cart session: optimistic quantity sync against the remote cart
//!
//! One [`CartSession`] owns the local cart view and is the only path that
//! mutates line-item quantity in view state. Each line moves through an
//! explicit machine:
//!
//! ```text
//!   Stable ──request_quantity──► Pending{seq}
//!   Pending ─settle Ok──────────► Stable   (server cart adopted; server wins)
//!   Pending ─settle Err─────────► Stable   (quantity rolled back, resync scheduled)
//!   Pending ─request_quantity───► Pending{seq+1}   (supersession, last write wins)
//! ```
//!
//! Every request is stamped with a per-line sequence number carried on an
//! [`UpdateTicket`]. A settle whose ticket is not the line's latest pending
//! sequence is discarded, so a stale response can never overwrite a newer
//! optimistic value. Removal and add-to-cart are deliberately not
//! optimistic: the view changes only on server confirmation.

use std::collections::HashMap;
use std::time::Duration;

use thiserror::Error;

use crate::domain::{
    compute_totals, validate_quantity, Cart, CartEvent, CartTotals, Money, Offer, PricedLine,
    QuantityViolation, GLOBAL_LINE_CAP,
};
use crate::gateway::{AddItemRequest, CartGateway, GatewayError, OfferGateway, UpdateError};
use crate::resolver::{lookup_category_offer, lookup_product_offer};

/// Session configuration. No ambient globals: the cap, the flat shipping
/// fee, and the resync delay all arrive here.
#[derive(Clone, Debug)]
pub struct CartConfig {
    pub global_cap: u32,
    pub shipping_fee: Money,
    pub resync_delay: Duration,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            global_cap: GLOBAL_LINE_CAP,
            shipping_fee: Money::default(),
            resync_delay: Duration::from_millis(250),
        }
    }
}

/// Why a quantity request was rejected locally, before any network call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("line item not found in cart")]
    UnknownItem,

    #[error("item is currently unavailable")]
    Unavailable,

    #[error(transparent)]
    Invalid(#[from] QuantityViolation),
}

/// Token for one in-flight quantity update. Settling with a superseded
/// ticket is a no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateTicket {
    pub item_id: String,
    pub quantity: u32,
    seq: u64,
}

/// Result of settling an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettleOutcome {
    /// Server state adopted as the new baseline.
    Confirmed,
    /// Update failed; the line shows its last confirmed quantity again.
    RolledBack { reason: String },
    /// The response belonged to a superseded request and was ignored.
    StaleDiscarded,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SyncPhase {
    Stable,
    Pending { seq: u64 },
}

// Per-line sync record. `last_seq` survives baseline adoption so a stale
// settle can still be recognized after a resync.
#[derive(Clone, Debug)]
struct LineSync {
    stable_quantity: u32,
    phase: SyncPhase,
    last_seq: u64,
}

/// Read-through, write-ahead local copy of the remote cart.
pub struct CartSession<G> {
    gateway: G,
    config: CartConfig,
    cart: Cart,
    sync: HashMap<String, LineSync>,
    product_offers: HashMap<String, Option<Offer>>,
    category_offers: HashMap<String, Option<Offer>>,
    events: Vec<CartEvent>,
    needs_resync: bool,
}

impl<G: CartGateway + OfferGateway> CartSession<G> {
    /// Fetch the authoritative cart and build a session around it.
    pub async fn load(gateway: G, config: CartConfig) -> Result<Self, GatewayError> {
        let cart = gateway.fetch_cart().await?;
        let mut session = Self {
            gateway,
            config,
            cart: Cart::default(),
            sync: HashMap::new(),
            product_offers: HashMap::new(),
            category_offers: HashMap::new(),
            events: Vec::new(),
            needs_resync: false,
        };
        session.adopt(cart);
        session.refresh_offers().await;
        Ok(session)
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn needs_resync(&self) -> bool {
        self.needs_resync
    }

    /// Currently displayed quantity for a line (confirmed or optimistic).
    pub fn quantity(&self, item_id: &str) -> Option<u32> {
        self.cart.item(item_id).map(|item| item.quantity)
    }

    /// Ceiling the UI should offer for a line: `min(stock, cap)`.
    pub fn effective_max(&self, item_id: &str) -> Option<u32> {
        self.cart.item(item_id).map(|item| item.effective_max(self.config.global_cap))
    }

    /// Drain accumulated UI notifications.
    pub fn take_events(&mut self) -> Vec<CartEvent> {
        std::mem::take(&mut self.events)
    }

    /// Current lines with their best applicable discounts resolved.
    pub fn priced_lines(&self) -> Vec<PricedLine> {
        self.cart
            .items
            .iter()
            .map(|item| {
                let product_offer = self
                    .product_offers
                    .get(&item.product_id)
                    .and_then(|offer| offer.as_ref());
                let category_offer = item
                    .category_id
                    .as_ref()
                    .and_then(|id| self.category_offers.get(id))
                    .and_then(|offer| offer.as_ref());
                PricedLine::price(item.clone(), product_offer, category_offer)
            })
            .collect()
    }

    /// Checkout totals for the current view.
    pub fn totals(&self) -> CartTotals {
        compute_totals(&self.priced_lines(), &self.config.shipping_fee)
    }

    /// Validate and optimistically apply a quantity change, returning the
    /// ticket to settle once the remote call resolves. On violation the
    /// line stays Stable and nothing is dispatched.
    ///
    /// A request while a previous one is still pending supersedes it
    /// (last write wins) but is validated against the same stable bounds.
    pub fn request_quantity(
        &mut self,
        item_id: &str,
        requested: i64,
    ) -> Result<UpdateTicket, RequestError> {
        let item = self
            .cart
            .items
            .iter_mut()
            .find(|item| item.id == item_id)
            .ok_or(RequestError::UnknownItem)?;
        if !item.is_available {
            return Err(RequestError::Unavailable);
        }
        let quantity = validate_quantity(requested, item.max_stock, self.config.global_cap)?;

        let sync = self.sync.get_mut(item_id).ok_or(RequestError::UnknownItem)?;
        sync.last_seq += 1;
        let seq = sync.last_seq;
        sync.phase = SyncPhase::Pending { seq };
        let from = sync.stable_quantity;
        item.quantity = quantity;

        self.events.push(CartEvent::QuantityRequested {
            item_id: item_id.to_string(),
            from,
            to: quantity,
        });
        Ok(UpdateTicket { item_id: item_id.to_string(), quantity, seq })
    }

    /// Settle a previously issued ticket with the remote outcome.
    ///
    /// Stale tickets (superseded, or for a line that no longer exists) are
    /// discarded without touching state. On failure the line's displayed
    /// quantity reverts to the last confirmed value and a resync is marked
    /// as required.
    pub fn settle_update(
        &mut self,
        ticket: &UpdateTicket,
        outcome: Result<Cart, UpdateError>,
    ) -> SettleOutcome {
        let current = matches!(
            self.sync.get(&ticket.item_id),
            Some(LineSync { phase: SyncPhase::Pending { seq }, .. }) if *seq == ticket.seq
        );
        if !current {
            tracing::debug!(item_id = %ticket.item_id, "discarding stale update response");
            return SettleOutcome::StaleDiscarded;
        }

        match outcome {
            Ok(cart) => {
                // The server may have clamped further; its value wins.
                self.adopt(cart);
                if let Some(quantity) = self.quantity(&ticket.item_id) {
                    self.events.push(CartEvent::QuantityConfirmed {
                        item_id: ticket.item_id.clone(),
                        quantity,
                    });
                }
                SettleOutcome::Confirmed
            }
            Err(error) => {
                let reason = match &error {
                    UpdateError::Rejected(rejection) => rejection.to_string(),
                    UpdateError::Gateway(_) => {
                        "Could not update quantity, please try again".to_string()
                    }
                };
                let mut restored = 0;
                if let Some(sync) = self.sync.get_mut(&ticket.item_id) {
                    sync.phase = SyncPhase::Stable;
                    restored = sync.stable_quantity;
                }
                if let Some(item) =
                    self.cart.items.iter_mut().find(|item| item.id == ticket.item_id)
                {
                    item.quantity = restored;
                }
                tracing::warn!(item_id = %ticket.item_id, %error, restored, "rolled back quantity update");
                self.events.push(CartEvent::RolledBack {
                    item_id: ticket.item_id.clone(),
                    restored,
                    reason: reason.clone(),
                });
                self.needs_resync = true;
                SettleOutcome::RolledBack { reason }
            }
        }
    }

    /// Full optimistic update cycle: validate, apply locally, dispatch,
    /// settle. Returns as soon as the outcome is known; after a failure
    /// the session owes a full-cart resync ([`Self::needs_resync`]) which
    /// the caller drives with [`Self::run_owed_resync`].
    pub async fn set_quantity(
        &mut self,
        item_id: &str,
        requested: i64,
    ) -> Result<SettleOutcome, RequestError> {
        let ticket = self.request_quantity(item_id, requested)?;
        let outcome = self.gateway.update_quantity(&ticket.item_id, ticket.quantity).await;
        Ok(self.settle_update(&ticket, outcome))
    }

    /// Run the resync owed after a failed update, after the configured
    /// delay. No-op when none is owed; the delay keeps the resync out of
    /// the mutation path itself.
    pub async fn run_owed_resync(&mut self) {
        if !self.needs_resync {
            return;
        }
        tokio::time::sleep(self.config.resync_delay).await;
        self.resync().await;
    }

    /// Add an item. Not optimistic: the view updates only once the server
    /// confirms with the new cart.
    pub async fn add_item(&mut self, request: AddItemRequest) -> Result<(), GatewayError> {
        let cart = self.gateway.add_item(&request).await?;
        self.adopt(cart);
        self.refresh_offers().await;
        self.events.push(CartEvent::ItemAdded { product_id: request.product_id });
        Ok(())
    }

    /// Remove a line. Not optimistic: the view updates only once the
    /// server confirms with the new cart.
    pub async fn remove_item(&mut self, item_id: &str) -> Result<(), GatewayError> {
        let cart = self.gateway.remove_item(item_id).await?;
        self.adopt(cart);
        self.refresh_offers().await;
        self.events.push(CartEvent::ItemRemoved { item_id: item_id.to_string() });
        Ok(())
    }

    /// Re-fetch the authoritative cart and rebuild the view. On failure
    /// the last known good view is kept and the resync stays owed.
    pub async fn resync(&mut self) {
        match self.gateway.fetch_cart().await {
            Ok(cart) => {
                self.adopt(cart);
                self.refresh_offers().await;
                self.needs_resync = false;
                self.events.push(CartEvent::ResyncCompleted);
            }
            Err(error) => {
                tracing::warn!(%error, "cart resync failed, keeping last known good view");
            }
        }
    }

    // Adopt a server cart as the confirmed baseline. Sequence counters for
    // surviving lines are preserved so stale settles remain detectable.
    fn adopt(&mut self, cart: Cart) {
        let mut sync = HashMap::with_capacity(cart.items.len());
        for item in &cart.items {
            let last_seq = self.sync.get(&item.id).map(|line| line.last_seq).unwrap_or(0);
            sync.insert(
                item.id.clone(),
                LineSync { stable_quantity: item.quantity, phase: SyncPhase::Stable, last_seq },
            );
        }
        self.sync = sync;
        self.cart = cart;
    }

    // Refresh the per-scope offer caches for every line in the cart.
    async fn refresh_offers(&mut self) {
        self.product_offers.clear();
        self.category_offers.clear();
        let scopes: Vec<(String, Option<String>)> = self
            .cart
            .items
            .iter()
            .map(|item| (item.product_id.clone(), item.category_id.clone()))
            .collect();
        for (product_id, category_id) in scopes {
            if !self.product_offers.contains_key(&product_id) {
                let offer = lookup_product_offer(&self.gateway, &product_id).await;
                self.product_offers.insert(product_id, offer);
            }
            if let Some(category_id) = category_id {
                if !self.category_offers.contains_key(&category_id) {
                    let offer = lookup_category_offer(&self.gateway, &category_id).await;
                    self.category_offers.insert(category_id, offer);
                }
            }
        }
    }
}
