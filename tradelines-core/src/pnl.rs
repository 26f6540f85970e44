//! PnL and risk math — pure functions of an order and a reference price.
//!
//! Results are derived on every refresh and never stored; the order record
//! plus the live reference price are the only inputs.

use crate::domain::{Order, OrderKind, OrderStatus};
use serde::{Deserialize, Serialize};

/// Profit and loss snapshot for one order at one reference price.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PnlResult {
    /// Mark-to-reference PnL for open (filled/partially filled) positions.
    pub unrealized: f64,
    /// PnL locked in by an actual fill price.
    pub realized: f64,
    /// Net return as a percentage of the entry notional.
    pub percentage: f64,
    pub fees: f64,
    /// unrealized + realized - fees.
    pub net: f64,
}

/// Compute PnL for `order` marked against `reference_price`.
///
/// The entry basis is `entry_price` when present, else the line's own
/// price. Unrealized PnL applies only to filled/partially-filled orders;
/// realized PnL only to filled orders with a known fill price. Sell-side
/// PnL is sign-inverted.
pub fn calculate_pnl(order: &Order, reference_price: f64) -> PnlResult {
    let basis = order.entry_basis();
    let quantity = order.effective_quantity();
    let direction = order.side.direction();

    let unrealized = match order.status {
        OrderStatus::Filled | OrderStatus::PartiallyFilled => {
            (reference_price - basis) * quantity * direction
        }
        _ => 0.0,
    };

    let realized = match (order.status, order.fill_price) {
        (OrderStatus::Filled, Some(fill_price)) => (fill_price - basis) * quantity * direction,
        _ => 0.0,
    };

    let fees = order.fees.unwrap_or(0.0);
    let net = unrealized + realized - fees;

    let notional = basis * quantity;
    let percentage = if notional > 0.0 {
        net / notional * 100.0
    } else {
        0.0
    };

    PnlResult {
        unrealized,
        realized,
        percentage,
        fees,
        net,
    }
}

/// Amount at risk for a stop-loss line: |entry - stop| x quantity.
/// Zero without an entry price or for any other order kind.
pub fn risk_amount(order: &Order) -> f64 {
    match (order.kind, order.entry_price) {
        (OrderKind::StopLoss, Some(entry)) => (entry - order.price).abs() * order.quantity,
        _ => 0.0,
    }
}

/// Target amount for a take-profit line: |target - entry| x quantity.
/// Zero without an entry price or for any other order kind.
pub fn profit_target(order: &Order) -> f64 {
    match (order.kind, order.entry_price) {
        (OrderKind::TakeProfit, Some(entry)) => (order.price - entry).abs() * order.quantity,
        _ => 0.0,
    }
}
