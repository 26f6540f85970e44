//! Domain types for Tradelines.

pub mod ids;
pub mod order;

pub use ids::{OrderId, OverlayHandle};
pub use order::{Order, OrderDraft, OrderKind, OrderPatch, OrderSide, OrderStatus};
