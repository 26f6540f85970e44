//! Host rendering-surface boundary.
//!
//! The engine never draws anything itself: it asks a [`RenderSurface`] to
//! create, overwrite, or remove price-anchored visual primitives and refers
//! to them by the opaque handle the surface issued. Surface failures are
//! non-fatal — the record store stays authoritative and a later refresh
//! retries the sync.

use crate::domain::{Order, OrderKind, OverlayHandle};
use crate::pnl::{profit_target, risk_amount, PnlResult};
use crate::theme::LineStyle;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Where a primitive sits on the chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub price: f64,
    pub time: DateTime<Utc>,
}

/// Kind-specific payload fields for the visual treatment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OverlayDetail {
    Entry,
    Market,
    Limit,
    StopLoss { risk_amount: f64 },
    TakeProfit { profit_target: f64 },
}

/// Everything a surface needs to draw one order line: a snapshot of the
/// record, its resolved style, and the derived numbers at the current
/// reference price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayPayload {
    pub order: Order,
    pub style: LineStyle,
    pub reference_price: Option<f64>,
    pub pnl: PnlResult,
    pub detail: OverlayDetail,
}

impl OverlayPayload {
    /// Snapshot an order against a style and reference price. `draggable`
    /// is gated off here for anything that is not pending — the surface
    /// must not even offer the drag.
    pub fn snapshot(order: &Order, mut style: LineStyle, reference_price: Option<f64>) -> Self {
        use crate::domain::OrderStatus;

        style.draggable = style.draggable && order.status == OrderStatus::Pending;
        let pnl = reference_price
            .map(|rp| crate::pnl::calculate_pnl(order, rp))
            .unwrap_or_default();
        let detail = match order.kind {
            OrderKind::Entry => OverlayDetail::Entry,
            OrderKind::Market => OverlayDetail::Market,
            OrderKind::Limit => OverlayDetail::Limit,
            OrderKind::StopLoss => OverlayDetail::StopLoss {
                risk_amount: risk_amount(order),
            },
            OrderKind::TakeProfit => OverlayDetail::TakeProfit {
                profit_target: profit_target(order),
            },
        };
        Self {
            order: order.clone(),
            style,
            reference_price,
            pnl,
            detail,
        }
    }

    /// Human-readable line label, e.g. `SELL SL 0.1 @ 43000.00 risk 200.00`.
    pub fn label(&self) -> String {
        let o = &self.order;
        let mut label = format!(
            "{} {} {} @ {:.2}",
            o.side.label(),
            o.kind.label(),
            o.quantity,
            o.price
        );
        match &self.detail {
            OverlayDetail::StopLoss { risk_amount } if *risk_amount > 0.0 => {
                label.push_str(&format!(" risk {risk_amount:.2}"));
            }
            OverlayDetail::TakeProfit { profit_target } if *profit_target > 0.0 => {
                label.push_str(&format!(" target {profit_target:.2}"));
            }
            _ => {}
        }
        if self.pnl.net != 0.0 {
            label.push_str(&format!(" pnl {:+.2}", self.pnl.net));
        }
        if let Some(text) = &o.text {
            label.push_str(&format!(" [{text}]"));
        }
        label
    }
}

/// Why a surface operation failed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HostError {
    #[error("surface does not know {0}")]
    UnknownHandle(OverlayHandle),

    #[error("surface rejected the operation: {0}")]
    Rejected(String),
}

/// Capabilities the engine requires from the host rendering surface.
///
/// Implementations must return a fresh handle per created primitive and
/// overwrite in place on update — the engine never creates a second
/// primitive for the same order.
pub trait RenderSurface {
    fn create_overlay(
        &mut self,
        anchor: Anchor,
        payload: OverlayPayload,
    ) -> Result<OverlayHandle, HostError>;

    fn update_overlay(
        &mut self,
        handle: OverlayHandle,
        anchor: Anchor,
        payload: OverlayPayload,
    ) -> Result<(), HostError>;

    fn remove_overlay(&mut self, handle: OverlayHandle) -> Result<(), HostError>;
}

/// Surface that draws nothing and accepts everything. Useful headless:
/// benchmarks, tests, or running the engine purely as a bookkeeper.
#[derive(Debug, Default)]
pub struct NullSurface {
    next_handle: u64,
}

impl NullSurface {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RenderSurface for NullSurface {
    fn create_overlay(
        &mut self,
        _anchor: Anchor,
        _payload: OverlayPayload,
    ) -> Result<OverlayHandle, HostError> {
        self.next_handle += 1;
        Ok(OverlayHandle(self.next_handle))
    }

    fn update_overlay(
        &mut self,
        _handle: OverlayHandle,
        _anchor: Anchor,
        _payload: OverlayPayload,
    ) -> Result<(), HostError> {
        Ok(())
    }

    fn remove_overlay(&mut self, _handle: OverlayHandle) -> Result<(), HostError> {
        Ok(())
    }
}
