//! Application state — single-owner, main-thread only.
//!
//! Everything the TUI knows lives here: the order engine wired to the
//! terminal chart surface, the synthetic price feed, and the per-frame
//! geometry the mouse handlers hit-test against.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::rc::Rc;

use ratatui::layout::Rect;

use tradelines_core::{
    Lifecycle, Order, OrderDraft, OrderEngine, OrderId, OrderKind, OrderListener, OrderPatch,
    OrderSide, OrderStatus, OverlayHandle, Theme,
};

use crate::chart::Viewport;
use crate::host::ChartSurface;
use crate::sample_data::PriceFeed;

/// How many ticks of price history the chart keeps.
pub const HISTORY_LEN: usize = 360;

/// How many event lines the log strip retains.
const EVENT_LOG_LEN: usize = 64;

/// Status message severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

/// Bus subscriber that renders every notification as one log line.
#[derive(Default)]
pub struct EventLog {
    lines: RefCell<VecDeque<String>>,
}

impl EventLog {
    fn push(&self, line: String) {
        let mut lines = self.lines.borrow_mut();
        if lines.len() == EVENT_LOG_LEN {
            lines.pop_front();
        }
        lines.push_back(line);
    }

    /// Most recent lines first.
    pub fn recent(&self, count: usize) -> Vec<String> {
        self.lines.borrow().iter().rev().take(count).cloned().collect()
    }
}

impl OrderListener for EventLog {
    fn on_order_event(&self, event: Lifecycle, order: &Order) {
        let verb = match event {
            Lifecycle::Created => "created",
            Lifecycle::Updated => "updated",
            Lifecycle::Cancelled => "cancelled",
            Lifecycle::Filled => "filled",
            Lifecycle::Dragged => "dragged",
        };
        self.push(format!(
            "{} {} {} {} @ {:.2}",
            order.id,
            verb,
            order.side.label(),
            order.kind.label(),
            order.price
        ));
    }

    fn on_price_change(&self, order: &Order, old_price: f64, new_price: f64) {
        self.push(format!(
            "{} repriced {old_price:.2} -> {new_price:.2}",
            order.id
        ));
    }

    fn on_cancel(&self, order: &Order) {
        self.push(format!("{} cancel requested", order.id));
    }

    fn on_click(&self, order: &Order) {
        self.push(format!("{} clicked", order.id));
    }

    fn on_drag_end(&self, id: &OrderId, price: f64) {
        self.push(format!("{id} drag ended at {price:.2}"));
    }
}

/// One drawn order line's screen geometry, rebuilt every frame for
/// mouse hit-testing.
#[derive(Debug, Clone)]
pub struct LineHit {
    pub handle: OverlayHandle,
    pub order_id: OrderId,
    /// Terminal row (absolute) the line occupies.
    pub row: u16,
    /// Columns (absolute) covered by the `[x]` cancel affordance, if shown.
    pub cancel_span: Option<(u16, u16)>,
    pub draggable: bool,
}

pub struct AppState {
    pub engine: OrderEngine<ChartSurface>,
    pub feed: PriceFeed,
    pub symbol: String,
    pub history: VecDeque<f64>,
    pub running: bool,
    pub paused: bool,
    pub dark: bool,
    /// Price the keyboard cursor sits at; new orders land here.
    pub cursor_price: f64,
    pub status_message: Option<(String, StatusLevel)>,
    pub events: Rc<EventLog>,
    pub orders_path: PathBuf,
    /// Chart inner area from the last draw, for mouse mapping.
    pub chart_area: Rect,
    /// Viewport from the last draw.
    pub viewport: Option<Viewport>,
    /// Hit map from the last draw.
    pub line_hits: Vec<LineHit>,
    /// True while a mouse drag is in flight.
    pub mouse_dragging: bool,
}

impl AppState {
    pub fn new(symbol: String, seed: u64, start_price: f64, dark: bool, orders_path: PathBuf) -> Self {
        let theme = if dark { Theme::dark() } else { Theme::light() };
        let mut engine = OrderEngine::with_theme(ChartSurface::new(), theme);
        let events = Rc::new(EventLog::default());
        engine.subscribe(events.clone() as Rc<dyn OrderListener>);

        let feed = PriceFeed::new(seed, start_price);
        let mut history = VecDeque::with_capacity(HISTORY_LEN);
        history.push_back(start_price);
        engine.set_reference_price(start_price);

        Self {
            engine,
            feed,
            symbol,
            history,
            running: true,
            paused: false,
            dark,
            cursor_price: start_price,
            status_message: None,
            events,
            orders_path,
            chart_area: Rect::default(),
            viewport: None,
            line_hits: Vec::new(),
            mouse_dragging: false,
        }
    }

    /// Advance the feed one tick and mark every line against it.
    pub fn tick(&mut self) {
        if self.paused {
            return;
        }
        let price = self.feed.next_tick();
        if self.history.len() == HISTORY_LEN {
            self.history.pop_front();
        }
        self.history.push_back(price);
        self.engine.set_reference_price(price);
        self.drain_sync_failures();
    }

    /// Surface failures are non-fatal; show the latest one in the status
    /// bar and let the next refresh retry.
    pub fn drain_sync_failures(&mut self) {
        for failure in self.engine.take_sync_failures() {
            self.set_error(format!(
                "chart sync failed for {}: {}",
                failure.order_id, failure.error
            ));
        }
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Info));
    }

    pub fn set_warning(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Warning));
    }

    pub fn set_error(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Error));
    }

    /// Place a pending limit order at the cursor price.
    pub fn place_limit(&mut self, side: OrderSide) {
        let draft = OrderDraft::new(
            OrderKind::Limit,
            side,
            self.cursor_price,
            0.1,
            self.symbol.clone(),
        );
        self.submit(draft);
    }

    /// Place an entry with attached stop-loss and take-profit lines,
    /// bracketing the cursor price by 2%.
    pub fn place_bracket(&mut self, side: OrderSide) {
        let entry = self.cursor_price;
        let offset = entry * 0.02;
        let (stop, target) = match side {
            OrderSide::Buy => (entry - offset, entry + offset),
            OrderSide::Sell => (entry + offset, entry - offset),
        };

        let mut draft = OrderDraft::new(OrderKind::Entry, side, entry, 0.1, self.symbol.clone());
        draft.stop_loss = Some(stop);
        draft.take_profit = Some(target);
        let Some(entry_id) = self.submit(draft) else {
            return;
        };

        let mut sl = OrderDraft::new(OrderKind::StopLoss, side.opposite(), stop, 0.1, self.symbol.clone());
        sl.entry_price = Some(entry);
        sl.text = Some(format!("stop for {entry_id}"));
        self.submit(sl);

        let mut tp = OrderDraft::new(
            OrderKind::TakeProfit,
            side.opposite(),
            target,
            0.1,
            self.symbol.clone(),
        );
        tp.entry_price = Some(entry);
        tp.text = Some(format!("target for {entry_id}"));
        self.submit(tp);
    }

    fn submit(&mut self, draft: OrderDraft) -> Option<OrderId> {
        match self.engine.add_order(draft) {
            Ok(id) => {
                self.set_status(format!("placed {id}"));
                self.drain_sync_failures();
                Some(id)
            }
            Err(err) => {
                self.set_error(err.to_string());
                None
            }
        }
    }

    /// Fill the nearest pending line at the current reference price.
    pub fn fill_nearest(&mut self) {
        let Some(reference) = self.engine.reference_price() else {
            return;
        };
        let Some(order) = self
            .engine
            .orders()
            .into_iter()
            .filter(|o| o.status == OrderStatus::Pending)
            .min_by(|a, b| {
                (a.price - reference)
                    .abs()
                    .total_cmp(&(b.price - reference).abs())
            })
        else {
            self.set_warning("no pending order to fill");
            return;
        };

        let mut patch = OrderPatch::status(OrderStatus::Filled);
        patch.fill_price = Some(reference);
        match self.engine.update_order(&order.id, patch) {
            Ok(()) => self.set_status(format!("filled {} at {reference:.2}", order.id)),
            Err(err) => self.set_error(err.to_string()),
        }
        self.drain_sync_failures();
    }

    pub fn toggle_theme(&mut self) {
        self.dark = !self.dark;
        let theme = if self.dark { Theme::dark() } else { Theme::light() };
        self.engine.set_theme(theme);
        self.set_status(if self.dark { "dark theme" } else { "light theme" });
        self.drain_sync_failures();
    }

    /// Nudge the cursor by one chart row.
    pub fn move_cursor(&mut self, up: bool) {
        let step = self
            .viewport
            .map(|vp| vp.row_step())
            .unwrap_or(self.cursor_price * 0.001);
        if up {
            self.cursor_price += step;
        } else {
            self.cursor_price = (self.cursor_price - step).max(0.01);
        }
    }

    /// Hit map lookup for an absolute terminal position.
    pub fn line_at(&self, column: u16, row: u16) -> Option<&LineHit> {
        if !self.chart_area.contains(ratatui::layout::Position::new(column, row)) {
            return None;
        }
        self.line_hits.iter().find(|hit| hit.row == row)
    }
}
