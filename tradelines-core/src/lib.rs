//! Tradelines Core — order state & overlay synchronization engine.
//!
//! Renders and manages trading orders (entry, limit, stop-loss,
//! take-profit, market) as interactive lines on a price/time chart:
//! - Authoritative order registry with a parallel id → overlay-handle map
//! - PnL and risk math, recomputed on every reference-price tick
//! - Theme/style resolution with field-level partial overrides
//! - Drag-to-reprice protocol as an explicit state machine
//! - Ordered callback dispatch for lifecycle, price-change, cancel,
//!   click, and drag-end notifications
//!
//! The chart itself is a host collaborator behind [`host::RenderSurface`];
//! this crate never draws.

pub mod domain;
pub mod engine;
pub mod error;
pub mod events;
pub mod host;
pub mod persistence;
pub mod pnl;
pub mod theme;
pub mod validate;

pub use domain::{Order, OrderDraft, OrderId, OrderKind, OrderPatch, OrderSide, OrderStatus, OverlayHandle};
pub use engine::OrderEngine;
pub use error::{EngineError, SyncFailure, SyncOp};
pub use events::{EventBus, Lifecycle, OrderListener};
pub use host::{Anchor, HostError, NullSurface, OverlayDetail, OverlayPayload, RenderSurface};
pub use pnl::{calculate_pnl, profit_target, risk_amount, PnlResult};
pub use theme::{Color, LineStyle, StylePatch, Theme, ThemePatch};
pub use validate::{validate, ValidationIssue};
