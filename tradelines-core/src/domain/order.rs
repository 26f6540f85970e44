//! Order types: kind/side/status enums, the order record, and the
//! draft/patch shapes used by the creation and update paths.

use super::ids::OrderId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What the order line represents on the chart.
///
/// Variant declaration order is the fixed display priority used by
/// `OrderEngine::orders()`: entry < market < limit < stop_loss < take_profit.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum OrderKind {
    /// Position entry line (reference for linked stops/targets).
    Entry,
    /// Market order, to be filled at the live price.
    Market,
    /// Limit order at a fixed price.
    Limit,
    /// Protective stop-loss line.
    StopLoss,
    /// Take-profit target line.
    TakeProfit,
}

impl OrderKind {
    /// Display priority within `orders()` (lower sorts first).
    pub fn priority(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            OrderKind::Entry => "ENTRY",
            OrderKind::Market => "MKT",
            OrderKind::Limit => "LMT",
            OrderKind::StopLoss => "SL",
            OrderKind::TakeProfit => "TP",
        }
    }
}

/// Which way the order trades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// Direction multiplier for PnL math: +1 for buy, -1 for sell.
    pub fn direction(self) -> f64 {
        match self {
            OrderSide::Buy => 1.0,
            OrderSide::Sell => -1.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            OrderSide::Buy => "BUY",
            OrderSide::Sell => "SELL",
        }
    }

    /// The closing side for a position opened on this side.
    pub fn opposite(self) -> Self {
        match self {
            OrderSide::Buy => OrderSide::Sell,
            OrderSide::Sell => OrderSide::Buy,
        }
    }
}

/// Order lifecycle states.
///
/// Transitions are one-directional except pending ⇄ partially_filled;
/// `can_transition` encodes the allowed moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Waiting on the chart; the only draggable state.
    Pending,
    /// Some quantity filled, the rest still working.
    PartiallyFilled,
    /// Completely filled.
    Filled,
    /// Cancelled by the user or the cancel affordance.
    Cancelled,
}

impl OrderStatus {
    /// Whether a status update from `self` to `to` is legal.
    ///
    /// Same-status updates are allowed (idempotent patches).
    pub fn can_transition(self, to: OrderStatus) -> bool {
        use OrderStatus::*;
        match (self, to) {
            (a, b) if a == b => true,
            (Pending, _) => true,
            (PartiallyFilled, Pending) => true,
            (PartiallyFilled, Filled) | (PartiallyFilled, Cancelled) => true,
            (Filled, _) | (Cancelled, _) => false,
            _ => false,
        }
    }

    /// Terminal states admit no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Filled | OrderStatus::Cancelled)
    }

    pub fn label(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::PartiallyFilled => "partial",
            OrderStatus::Filled => "filled",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

/// A tracked trading intent or position, visualized as a price-anchored line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub kind: OrderKind,
    pub side: OrderSide,
    pub price: f64,
    pub quantity: f64,
    pub symbol: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,

    /// Optional label shown next to the line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Reference price for PnL/risk (the position's entry).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_price: Option<f64>,
    /// Linked stop-loss price, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_loss: Option<f64>,
    /// Linked take-profit price, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub take_profit: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_quantity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fees: Option<f64>,
    /// Arbitrary caller metadata, carried verbatim through export/import.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl Order {
    /// Build a record from a validated draft. The caller supplies the final
    /// id (drafts may omit it) and the creation timestamp.
    pub fn from_draft(id: OrderId, draft: OrderDraft, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            kind: draft.kind,
            side: draft.side,
            price: draft.price,
            quantity: draft.quantity,
            symbol: draft.symbol,
            status: draft.status.unwrap_or(OrderStatus::Pending),
            created_at,
            text: draft.text,
            entry_price: draft.entry_price,
            stop_loss: draft.stop_loss,
            take_profit: draft.take_profit,
            fill_price: draft.fill_price,
            fill_quantity: draft.fill_quantity,
            fees: draft.fees,
            metadata: draft.metadata,
        }
    }

    /// Quantity used for PnL: the fill quantity when known, else the
    /// working quantity.
    pub fn effective_quantity(&self) -> f64 {
        self.fill_quantity.unwrap_or(self.quantity)
    }

    /// Entry basis for PnL math: the entry price when present, else the
    /// line's own price.
    pub fn entry_basis(&self) -> f64 {
        self.entry_price.unwrap_or(self.price)
    }

    /// Merge a patch into this record. Fields present in the patch win.
    /// Status legality is checked by the engine before this is called.
    pub fn apply_patch(&mut self, patch: OrderPatch) {
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(quantity) = patch.quantity {
            self.quantity = quantity;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(text) = patch.text {
            self.text = Some(text);
        }
        if let Some(entry_price) = patch.entry_price {
            self.entry_price = Some(entry_price);
        }
        if let Some(stop_loss) = patch.stop_loss {
            self.stop_loss = Some(stop_loss);
        }
        if let Some(take_profit) = patch.take_profit {
            self.take_profit = Some(take_profit);
        }
        if let Some(fill_price) = patch.fill_price {
            self.fill_price = Some(fill_price);
        }
        if let Some(fill_quantity) = patch.fill_quantity {
            self.fill_quantity = Some(fill_quantity);
        }
        if let Some(fees) = patch.fees {
            self.fees = Some(fees);
        }
        if let Some(metadata) = patch.metadata {
            self.metadata = Some(metadata);
        }
    }
}

/// Creation request for `OrderEngine::add_order`.
///
/// Everything optional carries through to the record verbatim; `id` and
/// `status` get engine defaults when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<OrderId>,
    pub kind: OrderKind,
    pub side: OrderSide,
    pub price: f64,
    pub quantity: f64,
    pub symbol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_loss: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub take_profit: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_quantity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fees: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl OrderDraft {
    pub fn new(
        kind: OrderKind,
        side: OrderSide,
        price: f64,
        quantity: f64,
        symbol: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            kind,
            side,
            price,
            quantity,
            symbol: symbol.into(),
            status: None,
            text: None,
            entry_price: None,
            stop_loss: None,
            take_profit: None,
            fill_price: None,
            fill_quantity: None,
            fees: None,
            metadata: None,
        }
    }
}

impl From<Order> for OrderDraft {
    /// Turn an exported record back into a creation request (import path).
    fn from(order: Order) -> Self {
        Self {
            id: Some(order.id),
            kind: order.kind,
            side: order.side,
            price: order.price,
            quantity: order.quantity,
            symbol: order.symbol,
            status: Some(order.status),
            text: order.text,
            entry_price: order.entry_price,
            stop_loss: order.stop_loss,
            take_profit: order.take_profit,
            fill_price: order.fill_price,
            fill_quantity: order.fill_quantity,
            fees: order.fees,
            metadata: order.metadata,
        }
    }
}

/// Partial update for `OrderEngine::update_order`. Absent fields are kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_loss: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub take_profit: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_quantity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fees: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl OrderPatch {
    pub fn price(price: f64) -> Self {
        Self {
            price: Some(price),
            ..Self::default()
        }
    }

    pub fn status(status: OrderStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}
