//! Cart events surfaced to the UI

/// Notifications the session accumulates for the UI layer. Drained with
/// [`crate::session::CartSession::take_events`].
#[derive(Clone, Debug, PartialEq)]
pub enum CartEvent {
    /// An optimistic quantity change was applied locally and dispatched.
    QuantityRequested { item_id: String, from: u32, to: u32 },
    /// The server confirmed a quantity change; `quantity` is the server's
    /// value, which may be clamped below what was requested.
    QuantityConfirmed { item_id: String, quantity: u32 },
    /// A remote update failed; the line was restored to its last
    /// confirmed quantity. `reason` is human-readable.
    RolledBack { item_id: String, restored: u32, reason: String },
    /// A full-cart resync completed and the view was rebuilt.
    ResyncCompleted,
    ItemAdded { product_id: String },
    ItemRemoved { item_id: String },
}
