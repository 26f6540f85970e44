//! The order engine: authoritative record store, overlay synchronization,
//! drag protocol, and event dispatch.
//!
//! The engine owns four pieces of shared state — the order map, the
//! parallel id → handle map, the theme, and the listener list — and is
//! their single writer. Everything is synchronous and runs to completion;
//! the hosting event loop is the only source of interleaving.

pub mod drag;

use std::collections::HashMap;

use chrono::Utc;

use crate::domain::{Order, OrderDraft, OrderId, OrderPatch, OrderStatus, OverlayHandle};
use crate::error::{EngineError, SyncFailure, SyncOp};
use crate::events::{EventBus, Lifecycle, OrderListener};
use crate::host::{Anchor, HostError, OverlayPayload, RenderSurface};
use crate::theme::{Theme, ThemePatch};
use crate::validate::{validate, ValidationIssue};

use drag::{acceptable_drag_price, DragState};

use std::rc::Rc;

/// Order registry plus its visual projection onto a host surface.
///
/// Store mutations always succeed or fail before the surface is touched;
/// surface failures are recorded (see [`OrderEngine::sync_failures`]) and
/// retried on the next refresh rather than rolled back.
pub struct OrderEngine<S: RenderSurface> {
    host: S,
    theme: Theme,
    orders: HashMap<OrderId, Order>,
    /// Parallel map, keyed like `orders`. No back-references in records.
    handles: HashMap<OrderId, OverlayHandle>,
    bus: EventBus,
    drag: DragState,
    reference_price: Option<f64>,
    next_id: u64,
    sync_failures: Vec<SyncFailure>,
}

impl<S: RenderSurface> OrderEngine<S> {
    pub fn new(host: S) -> Self {
        Self::with_theme(host, Theme::default())
    }

    pub fn with_theme(host: S, theme: Theme) -> Self {
        Self {
            host,
            theme,
            orders: HashMap::new(),
            handles: HashMap::new(),
            bus: EventBus::new(),
            drag: DragState::Idle,
            reference_price: None,
            next_id: 0,
            sync_failures: Vec::new(),
        }
    }

    // ── Record store ─────────────────────────────────────────────────

    /// Validate and insert a new order, create its overlay, and fire
    /// `Created`. Nothing is inserted on a validation failure.
    pub fn add_order(&mut self, draft: OrderDraft) -> Result<OrderId, EngineError> {
        let mut issues = validate(&draft);
        if let Some(id) = &draft.id {
            if self.orders.contains_key(id) {
                issues.push(ValidationIssue::DuplicateId(id.clone()));
            }
        }
        if !issues.is_empty() {
            return Err(EngineError::Validation(issues));
        }

        let id = match draft.id.clone() {
            Some(id) => id,
            None => self.generate_id(),
        };
        let order = Order::from_draft(id.clone(), draft, Utc::now());
        self.orders.insert(id.clone(), order.clone());
        self.create_overlay(&id);
        self.bus.order_event(Lifecycle::Created, &order);
        Ok(id)
    }

    /// Merge a partial update into an existing order, refresh its overlay
    /// in place, and fire `Updated` (plus `Filled`/`Cancelled` when the
    /// status newly lands there).
    pub fn update_order(&mut self, id: &OrderId, patch: OrderPatch) -> Result<(), EngineError> {
        let order = self
            .orders
            .get_mut(id)
            .ok_or_else(|| EngineError::NotFound(id.clone()))?;

        let old_status = order.status;
        if let Some(to) = patch.status {
            if !old_status.can_transition(to) {
                return Err(EngineError::InvalidTransition {
                    id: id.clone(),
                    from: old_status,
                    to,
                });
            }
        }

        order.apply_patch(patch);
        let snapshot = order.clone();

        self.refresh_overlay(id);
        self.bus.order_event(Lifecycle::Updated, &snapshot);
        if snapshot.status != old_status {
            match snapshot.status {
                OrderStatus::Filled => self.bus.order_event(Lifecycle::Filled, &snapshot),
                OrderStatus::Cancelled => self.bus.order_event(Lifecycle::Cancelled, &snapshot),
                _ => {}
            }
        }
        Ok(())
    }

    /// Remove an order: overlay binding first, then the record, then a
    /// `Cancelled` event with the pre-removal snapshot. Unknown ids are a
    /// no-op.
    pub fn remove_order(&mut self, id: &OrderId) {
        if !self.orders.contains_key(id) {
            return;
        }
        if let Some(handle) = self.handles.remove(id) {
            if let Err(err) = self.host.remove_overlay(handle) {
                self.sync_failures
                    .push(SyncFailure::now(id.clone(), SyncOp::Remove, err));
            }
        }
        self.drag.clear_if_target(id);
        if let Some(order) = self.orders.remove(id) {
            self.bus.order_event(Lifecycle::Cancelled, &order);
        }
    }

    /// Remove every order through the individual removal path, so bindings
    /// stay symmetric and events fire per order.
    pub fn clear(&mut self) {
        for order in self.orders_sorted() {
            self.remove_order(&order.id);
        }
    }

    /// Copy-on-read lookup. Mutating the returned snapshot does not touch
    /// the store.
    pub fn get_order(&self, id: &OrderId) -> Option<Order> {
        self.orders.get(id).cloned()
    }

    /// All orders, sorted by kind priority (entry < market < limit <
    /// stop_loss < take_profit) then ascending price.
    pub fn orders(&self) -> Vec<Order> {
        self.orders_sorted()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    fn orders_sorted(&self) -> Vec<Order> {
        let mut all: Vec<Order> = self.orders.values().cloned().collect();
        all.sort_by(|a, b| a.kind.cmp(&b.kind).then(a.price.total_cmp(&b.price)));
        all
    }

    fn generate_id(&mut self) -> OrderId {
        loop {
            self.next_id += 1;
            let id = OrderId::from(self.next_id);
            if !self.orders.contains_key(&id) {
                return id;
            }
        }
    }

    // ── Reference price & theme ──────────────────────────────────────

    /// Mark every overlay against a new live price. Non-finite ticks are
    /// ignored. O(open orders), no events.
    pub fn set_reference_price(&mut self, price: f64) {
        if !price.is_finite() {
            return;
        }
        self.reference_price = Some(price);
        self.refresh_all();
    }

    pub fn reference_price(&self) -> Option<f64> {
        self.reference_price
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Replace the theme wholesale and restyle every overlay.
    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        self.refresh_all();
    }

    /// Merge a partial theme override and restyle every overlay.
    pub fn merge_theme(&mut self, patch: &ThemePatch) {
        self.theme.apply(patch);
        self.refresh_all();
    }

    // ── Events ───────────────────────────────────────────────────────

    pub fn subscribe(&mut self, listener: Rc<dyn OrderListener>) {
        self.bus.subscribe(listener);
    }

    pub fn unsubscribe(&mut self, listener: &Rc<dyn OrderListener>) {
        self.bus.unsubscribe(listener);
    }

    // ── Pointer protocol (host-delivered) ────────────────────────────

    /// Pressed-move-start: may this order begin dragging? Yes only while
    /// pending; any other status vetoes the drag.
    pub fn begin_drag(&mut self, id: &OrderId) -> bool {
        match self.orders.get(id) {
            Some(order) if order.status == OrderStatus::Pending => {
                self.drag.begin(id.clone());
                true
            }
            _ => false,
        }
    }

    /// Pressed-moving: apply a host-reported candidate price to the
    /// dragged order. Fires the dedicated price-change notification (not
    /// `Updated`) and refreshes the overlay. Returns false when idle or
    /// when the candidate is rejected (non-finite or non-positive — the
    /// last accepted price stands).
    pub fn drag_to(&mut self, candidate: f64) -> bool {
        let Some(id) = self.drag.target().cloned() else {
            return false;
        };
        if !acceptable_drag_price(candidate) {
            return false;
        }
        let Some(order) = self.orders.get_mut(&id) else {
            // Order vanished mid-drag; drop the wedged state.
            self.drag.clear_if_target(&id);
            return false;
        };

        let old_price = order.price;
        if old_price == candidate {
            return true;
        }
        order.price = candidate;
        let snapshot = order.clone();

        self.bus.price_change(&snapshot, old_price, candidate);
        self.refresh_overlay(&id);
        true
    }

    /// Pressed-move-end: fire the drag-end notification with the settled
    /// price (the caller's chance to confirm or roll back) and a `Dragged`
    /// lifecycle event, then return to idle.
    pub fn end_drag(&mut self) -> Option<(OrderId, f64)> {
        let id = self.drag.end()?;
        let snapshot = self.orders.get(&id)?.clone();
        let settled = snapshot.price;
        self.bus.drag_end(&id, settled);
        self.bus.order_event(Lifecycle::Dragged, &snapshot);
        Some((id, settled))
    }

    /// The order currently being dragged, if any.
    pub fn drag_target(&self) -> Option<&OrderId> {
        self.drag.target()
    }

    /// Click on the line body.
    pub fn overlay_clicked(&self, id: &OrderId) {
        if let Some(order) = self.orders.get(id) {
            self.bus.click(order);
        }
    }

    /// Click on the cancel affordance: the dedicated cancel notification
    /// fires first, then the status change runs through the normal update
    /// path (which fires `Updated` and `Cancelled`).
    pub fn cancel_clicked(&mut self, id: &OrderId) -> Result<(), EngineError> {
        let snapshot = self
            .orders
            .get(id)
            .cloned()
            .ok_or_else(|| EngineError::NotFound(id.clone()))?;
        self.bus.cancel(&snapshot);
        self.update_order(id, OrderPatch::status(OrderStatus::Cancelled))
    }

    /// Secondary-click interception: true for any handle this engine owns,
    /// meaning the host must suppress its default removal behavior for the
    /// primitive.
    pub fn secondary_clicked(&self, handle: OverlayHandle) -> bool {
        self.order_for_handle(handle).is_some()
    }

    /// Resolve a surface handle back to its order. Linear scan — the order
    /// count per chart is small and bounded.
    pub fn order_for_handle(&self, handle: OverlayHandle) -> Option<&OrderId> {
        self.handles
            .iter()
            .find(|(_, h)| **h == handle)
            .map(|(id, _)| id)
    }

    // ── Host access & sync bookkeeping ───────────────────────────────

    pub fn host(&self) -> &S {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut S {
        &mut self.host
    }

    /// Host-sync failures recorded since the last drain.
    pub fn sync_failures(&self) -> &[SyncFailure] {
        &self.sync_failures
    }

    pub fn take_sync_failures(&mut self) -> Vec<SyncFailure> {
        std::mem::take(&mut self.sync_failures)
    }

    // ── Overlay synchronization internals ────────────────────────────

    fn payload_for(&self, order: &Order) -> (Anchor, OverlayPayload) {
        let anchor = Anchor {
            price: order.price,
            time: order.created_at,
        };
        let style = *self.theme.style(order.side, order.kind);
        let payload = OverlayPayload::snapshot(order, style, self.reference_price);
        (anchor, payload)
    }

    fn create_overlay(&mut self, id: &OrderId) {
        let Some(order) = self.orders.get(id).cloned() else {
            return;
        };
        let (anchor, payload) = self.payload_for(&order);
        match self.host.create_overlay(anchor, payload) {
            Ok(handle) => {
                self.handles.insert(id.clone(), handle);
            }
            Err(err) => {
                self.sync_failures
                    .push(SyncFailure::now(id.clone(), SyncOp::Create, err));
            }
        }
    }

    /// Overwrite the existing primitive for `id`; a lost binding is
    /// re-created here, which is what makes sync failures recoverable.
    fn refresh_overlay(&mut self, id: &OrderId) {
        let Some(order) = self.orders.get(id).cloned() else {
            return;
        };
        let Some(&handle) = self.handles.get(id) else {
            self.create_overlay(id);
            return;
        };
        let (anchor, payload) = self.payload_for(&order);
        if let Err(err) = self.host.update_overlay(handle, anchor, payload) {
            if matches!(err, HostError::UnknownHandle(_)) {
                // Stale binding: forget it so the next refresh re-creates.
                self.handles.remove(id);
            }
            self.sync_failures
                .push(SyncFailure::now(id.clone(), SyncOp::Update, err));
        }
    }

    fn refresh_all(&mut self) {
        let ids: Vec<OrderId> = self.orders.keys().cloned().collect();
        for id in ids {
            self.refresh_overlay(&id);
        }
    }
}
