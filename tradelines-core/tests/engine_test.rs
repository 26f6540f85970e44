//! Integration tests for the engine ↔ surface synchronization contract
//! and the event dispatch ordering, using a scripted mock surface that
//! records every host call.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tradelines_core::{
    Anchor, EngineError, HostError, Lifecycle, Order, OrderDraft, OrderEngine, OrderId,
    OrderKind, OrderListener, OrderPatch, OrderSide, OrderStatus, OverlayHandle,
    OverlayPayload, RenderSurface,
};

// ── Mock surface ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
enum SurfaceOp {
    Create(OverlayHandle),
    Update(OverlayHandle),
    Remove(OverlayHandle),
}

#[derive(Default)]
struct MockSurface {
    next_handle: u64,
    ops: Vec<SurfaceOp>,
    live: HashMap<OverlayHandle, (Anchor, OverlayPayload)>,
    /// Reject this many creates before behaving again.
    fail_creates: usize,
}

impl RenderSurface for MockSurface {
    fn create_overlay(
        &mut self,
        anchor: Anchor,
        payload: OverlayPayload,
    ) -> Result<OverlayHandle, HostError> {
        if self.fail_creates > 0 {
            self.fail_creates -= 1;
            return Err(HostError::Rejected("scripted create failure".into()));
        }
        self.next_handle += 1;
        let handle = OverlayHandle(self.next_handle);
        self.live.insert(handle, (anchor, payload));
        self.ops.push(SurfaceOp::Create(handle));
        Ok(handle)
    }

    fn update_overlay(
        &mut self,
        handle: OverlayHandle,
        anchor: Anchor,
        payload: OverlayPayload,
    ) -> Result<(), HostError> {
        if !self.live.contains_key(&handle) {
            return Err(HostError::UnknownHandle(handle));
        }
        self.live.insert(handle, (anchor, payload));
        self.ops.push(SurfaceOp::Update(handle));
        Ok(())
    }

    fn remove_overlay(&mut self, handle: OverlayHandle) -> Result<(), HostError> {
        if self.live.remove(&handle).is_none() {
            return Err(HostError::UnknownHandle(handle));
        }
        self.ops.push(SurfaceOp::Remove(handle));
        Ok(())
    }
}

// ── Recording listener ───────────────────────────────────────────────

#[derive(Default)]
struct Recorder {
    log: RefCell<Vec<String>>,
}

impl Recorder {
    fn entries(&self) -> Vec<String> {
        self.log.borrow().clone()
    }
}

impl OrderListener for Recorder {
    fn on_order_event(&self, event: Lifecycle, order: &Order) {
        self.log.borrow_mut().push(format!("{event:?}:{}", order.id));
    }

    fn on_price_change(&self, order: &Order, old_price: f64, new_price: f64) {
        self.log
            .borrow_mut()
            .push(format!("price:{}:{old_price}->{new_price}", order.id));
    }

    fn on_cancel(&self, order: &Order) {
        self.log.borrow_mut().push(format!("cancel:{}", order.id));
    }

    fn on_click(&self, order: &Order) {
        self.log.borrow_mut().push(format!("click:{}", order.id));
    }

    fn on_drag_end(&self, id: &OrderId, price: f64) {
        self.log.borrow_mut().push(format!("dragend:{id}@{price}"));
    }
}

fn engine() -> (OrderEngine<MockSurface>, Rc<Recorder>) {
    let mut eng = OrderEngine::new(MockSurface::default());
    let recorder = Rc::new(Recorder::default());
    eng.subscribe(recorder.clone());
    (eng, recorder)
}

fn limit(price: f64) -> OrderDraft {
    OrderDraft::new(OrderKind::Limit, OrderSide::Buy, price, 1.0, "BTCUSDT")
}

// ── Creation / update / removal sync ─────────────────────────────────

#[test]
fn creation_pushes_one_primitive_and_fires_created() {
    let (mut eng, rec) = engine();
    let id = eng.add_order(limit(100.0)).unwrap();

    assert_eq!(eng.host().ops, vec![SurfaceOp::Create(OverlayHandle(1))]);
    assert_eq!(rec.entries(), vec![format!("Created:{id}")]);

    let (anchor, payload) = &eng.host().live[&OverlayHandle(1)];
    assert_eq!(anchor.price, 100.0);
    assert_eq!(payload.order.id, id);
    assert!(payload.style.draggable);
}

#[test]
fn update_overwrites_the_same_primitive() {
    let (mut eng, rec) = engine();
    let id = eng.add_order(limit(100.0)).unwrap();
    eng.update_order(&id, OrderPatch::price(110.0)).unwrap();

    assert_eq!(
        eng.host().ops,
        vec![
            SurfaceOp::Create(OverlayHandle(1)),
            SurfaceOp::Update(OverlayHandle(1)),
        ]
    );
    assert_eq!(eng.host().live.len(), 1);
    assert_eq!(eng.host().live[&OverlayHandle(1)].0.price, 110.0);
    assert_eq!(
        rec.entries(),
        vec![format!("Created:{id}"), format!("Updated:{id}")]
    );
}

#[test]
fn fill_transition_fires_updated_then_filled() {
    let (mut eng, rec) = engine();
    let id = eng.add_order(limit(100.0)).unwrap();
    eng.update_order(
        &id,
        OrderPatch {
            status: Some(OrderStatus::Filled),
            fill_price: Some(100.5),
            ..OrderPatch::default()
        },
    )
    .unwrap();

    assert_eq!(
        rec.entries(),
        vec![
            format!("Created:{id}"),
            format!("Updated:{id}"),
            format!("Filled:{id}"),
        ]
    );
    // The refreshed payload no longer offers the drag.
    assert!(!eng.host().live[&OverlayHandle(1)].1.style.draggable);
}

#[test]
fn removal_destroys_binding_then_fires_cancelled_snapshot() {
    let (mut eng, rec) = engine();
    let id = eng.add_order(limit(100.0)).unwrap();
    eng.remove_order(&id);

    assert!(eng.host().live.is_empty());
    assert_eq!(
        eng.host().ops,
        vec![
            SurfaceOp::Create(OverlayHandle(1)),
            SurfaceOp::Remove(OverlayHandle(1)),
        ]
    );
    assert_eq!(
        rec.entries(),
        vec![format!("Created:{id}"), format!("Cancelled:{id}")]
    );
    assert!(eng.is_empty());
}

#[test]
fn clear_removes_through_the_individual_path() {
    let (mut eng, rec) = engine();
    let a = eng.add_order(limit(100.0)).unwrap();
    let b = eng.add_order(limit(90.0)).unwrap();
    eng.clear();

    assert!(eng.is_empty());
    assert!(eng.host().live.is_empty());
    // One Cancelled per order, in display order (ascending price).
    assert_eq!(
        rec.entries()[2..],
        [format!("Cancelled:{b}"), format!("Cancelled:{a}")]
    );
}

// ── Reference price refresh ──────────────────────────────────────────

#[test]
fn reference_tick_refreshes_every_overlay() {
    let (mut eng, _rec) = engine();
    let mut entry = OrderDraft::new(OrderKind::Entry, OrderSide::Buy, 100.0, 1.0, "BTCUSDT");
    entry.entry_price = Some(100.0);
    entry.status = Some(OrderStatus::Filled);
    let entry_id = eng.add_order(entry).unwrap();
    eng.add_order(limit(95.0)).unwrap();

    let ops_before = eng.host().ops.len();
    eng.set_reference_price(110.0);

    let updates = eng.host().ops[ops_before..]
        .iter()
        .filter(|op| matches!(op, SurfaceOp::Update(_)))
        .count();
    assert_eq!(updates, 2);

    // The filled entry's payload carries mark-to-reference PnL.
    let handle = *eng
        .host()
        .live
        .iter()
        .find(|(_, (_, p))| p.order.id == entry_id)
        .map(|(h, _)| h)
        .unwrap();
    let payload = &eng.host().live[&handle].1;
    assert_eq!(payload.reference_price, Some(110.0));
    assert_eq!(payload.pnl.unrealized, 10.0);
}

// ── Drag protocol ────────────────────────────────────────────────────

#[test]
fn drag_moves_fire_price_change_not_updated() {
    let (mut eng, rec) = engine();
    let id = eng.add_order(limit(100.0)).unwrap();

    assert!(eng.begin_drag(&id));
    assert!(eng.drag_to(104.0));
    assert!(eng.drag_to(108.0));
    let (settled_id, settled) = eng.end_drag().unwrap();
    assert_eq!((settled_id, settled), (id.clone(), 108.0));

    assert_eq!(
        rec.entries(),
        vec![
            format!("Created:{id}"),
            format!("price:{id}:100->104"),
            format!("price:{id}:104->108"),
            format!("dragend:{id}@108"),
            format!("Dragged:{id}"),
        ]
    );
    // Each accepted move refreshed the anchor.
    assert_eq!(eng.host().live[&OverlayHandle(1)].0.price, 108.0);
}

#[test]
fn drag_start_is_vetoed_for_filled_orders() {
    let (mut eng, _rec) = engine();
    let mut draft = limit(100.0);
    draft.status = Some(OrderStatus::Filled);
    let id = eng.add_order(draft).unwrap();

    assert!(!eng.begin_drag(&id));
    assert!(!eng.drag_to(120.0));
    assert_eq!(eng.get_order(&id).unwrap().price, 100.0);
}

#[test]
fn drag_end_is_the_rollback_point() {
    let (mut eng, _rec) = engine();
    let id = eng.add_order(limit(100.0)).unwrap();

    eng.begin_drag(&id);
    eng.drag_to(130.0);
    let (dragged, settled) = eng.end_drag().unwrap();

    // A caller unhappy with the settle price rolls back explicitly.
    eng.update_order(&dragged, OrderPatch::price(100.0)).unwrap();
    assert_eq!(settled, 130.0);
    assert_eq!(eng.get_order(&id).unwrap().price, 100.0);
}

// ── Clicks & cancellation ────────────────────────────────────────────

#[test]
fn cancel_affordance_fires_cancel_before_updated() {
    let (mut eng, rec) = engine();
    let id = eng.add_order(limit(100.0)).unwrap();
    eng.cancel_clicked(&id).unwrap();

    assert_eq!(
        rec.entries(),
        vec![
            format!("Created:{id}"),
            format!("cancel:{id}"),
            format!("Updated:{id}"),
            format!("Cancelled:{id}"),
        ]
    );
    assert_eq!(eng.get_order(&id).unwrap().status, OrderStatus::Cancelled);
    // The record stays in the store; only removal deletes it.
    assert_eq!(eng.len(), 1);
}

#[test]
fn cancel_clicked_on_unknown_id_fails() {
    let (mut eng, _rec) = engine();
    assert!(matches!(
        eng.cancel_clicked(&OrderId::new("ghost")),
        Err(EngineError::NotFound(_))
    ));
}

#[test]
fn body_click_fires_click_notification() {
    let (mut eng, rec) = engine();
    let id = eng.add_order(limit(100.0)).unwrap();
    eng.overlay_clicked(&id);
    assert_eq!(rec.entries().last().unwrap(), &format!("click:{id}"));
}

#[test]
fn secondary_click_is_suppressed_for_owned_handles() {
    let (mut eng, _rec) = engine();
    let id = eng.add_order(limit(100.0)).unwrap();
    let handle = OverlayHandle(1);

    assert_eq!(eng.order_for_handle(handle), Some(&id));
    assert!(eng.secondary_clicked(handle));
    assert!(!eng.secondary_clicked(OverlayHandle(999)));
}

// ── Host failure recovery ────────────────────────────────────────────

#[test]
fn create_failure_is_non_fatal_and_retried_on_refresh() {
    let mut eng = OrderEngine::new(MockSurface {
        fail_creates: 1,
        ..MockSurface::default()
    });

    let id = eng.add_order(limit(100.0)).unwrap();
    // The store kept the order even though the surface rejected it.
    assert_eq!(eng.len(), 1);
    assert_eq!(eng.sync_failures().len(), 1);
    assert!(eng.host().live.is_empty());
    assert_eq!(eng.order_for_handle(OverlayHandle(1)), None);

    // The next refresh re-creates the missing primitive.
    eng.set_reference_price(101.0);
    assert_eq!(eng.host().live.len(), 1);
    assert_eq!(eng.order_for_handle(OverlayHandle(1)), Some(&id));

    let drained = eng.take_sync_failures();
    assert_eq!(drained.len(), 1);
    assert!(eng.sync_failures().is_empty());
}

#[test]
fn stale_handle_is_recreated_on_next_refresh() {
    let (mut eng, _rec) = engine();
    let id = eng.add_order(limit(100.0)).unwrap();

    // Simulate the surface losing the primitive behind the engine's back.
    eng.host_mut().live.clear();

    eng.set_reference_price(101.0);
    assert_eq!(eng.sync_failures().len(), 1);

    eng.set_reference_price(102.0);
    assert_eq!(eng.host().live.len(), 1);
    assert!(eng
        .host()
        .live
        .values()
        .any(|(_, p)| p.order.id == id));
}

// ── Subscription management ──────────────────────────────────────────

#[test]
fn unsubscribed_listeners_stop_receiving() {
    let (mut eng, rec) = engine();
    let rec_dyn: Rc<dyn OrderListener> = rec.clone();

    eng.add_order(limit(100.0)).unwrap();
    eng.unsubscribe(&rec_dyn);
    eng.add_order(limit(90.0)).unwrap();

    assert_eq!(rec.entries().len(), 1);
}
