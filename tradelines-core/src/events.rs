//! Event dispatch — ordered fan-out of engine notifications to subscribers.

use crate::domain::{Order, OrderId};
use std::rc::Rc;

/// Lifecycle notifications carried by the generic event channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Created,
    Updated,
    Cancelled,
    Filled,
    Dragged,
}

/// Subscriber interface. Every method defaults to a no-op so an
/// implementation picks exactly the subset of notifications it cares
/// about.
///
/// Dispatch is synchronous and runs on the engine's thread; listeners must
/// not call back into the engine from inside a notification.
pub trait OrderListener {
    /// Generic lifecycle channel: created, updated, cancelled, filled,
    /// dragged. The order argument is a snapshot, not live store state.
    fn on_order_event(&self, _event: Lifecycle, _order: &Order) {}

    /// A drag moved the order's price. Fired per accepted drag sample;
    /// deliberately distinct from the generic `Updated` event.
    fn on_price_change(&self, _order: &Order, _old_price: f64, _new_price: f64) {}

    /// The order's cancel affordance was activated. Fires before the
    /// status change lands (and before its `Updated` event).
    fn on_cancel(&self, _order: &Order) {}

    /// The order line's body was clicked.
    fn on_click(&self, _order: &Order) {}

    /// A drag finished; `price` is where the line settled. Rollback, if
    /// wanted, is the subscriber's call via `update_order`.
    fn on_drag_end(&self, _id: &OrderId, _price: f64) {}
}

/// Ordered listener registry. Registration is additive; removal matches by
/// reference identity (`Rc::ptr_eq`).
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<Rc<dyn OrderListener>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: Rc<dyn OrderListener>) {
        self.listeners.push(listener);
    }

    pub fn unsubscribe(&mut self, listener: &Rc<dyn OrderListener>) {
        self.listeners.retain(|l| !Rc::ptr_eq(l, listener));
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn order_event(&self, event: Lifecycle, order: &Order) {
        for l in &self.listeners {
            l.on_order_event(event, order);
        }
    }

    pub fn price_change(&self, order: &Order, old_price: f64, new_price: f64) {
        for l in &self.listeners {
            l.on_price_change(order, old_price, new_price);
        }
    }

    pub fn cancel(&self, order: &Order) {
        for l in &self.listeners {
            l.on_cancel(order);
        }
    }

    pub fn click(&self, order: &Order) {
        for l in &self.listeners {
            l.on_click(order);
        }
    }

    pub fn drag_end(&self, id: &OrderId, price: f64) {
        for l in &self.listeners {
            l.on_drag_end(id, price);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OrderDraft, OrderKind, OrderSide};
    use chrono::Utc;
    use std::cell::RefCell;

    /// Listener that records only the lifecycle channel — exercises the
    /// any-subset contract.
    #[derive(Default)]
    struct LifecycleRecorder {
        seen: RefCell<Vec<Lifecycle>>,
    }

    impl OrderListener for LifecycleRecorder {
        fn on_order_event(&self, event: Lifecycle, _order: &Order) {
            self.seen.borrow_mut().push(event);
        }
    }

    fn order() -> Order {
        Order::from_draft(
            OrderId::new("e1"),
            OrderDraft::new(OrderKind::Entry, OrderSide::Buy, 10.0, 1.0, "SPY"),
            Utc::now(),
        )
    }

    #[test]
    fn fan_out_reaches_every_listener_in_order() {
        let mut bus = EventBus::new();
        let a = Rc::new(LifecycleRecorder::default());
        let b = Rc::new(LifecycleRecorder::default());
        bus.subscribe(a.clone());
        bus.subscribe(b.clone());

        bus.order_event(Lifecycle::Created, &order());
        bus.order_event(Lifecycle::Updated, &order());

        assert_eq!(*a.seen.borrow(), vec![Lifecycle::Created, Lifecycle::Updated]);
        assert_eq!(*b.seen.borrow(), vec![Lifecycle::Created, Lifecycle::Updated]);
    }

    #[test]
    fn unsubscribe_matches_by_identity() {
        let mut bus = EventBus::new();
        let a = Rc::new(LifecycleRecorder::default());
        let b = Rc::new(LifecycleRecorder::default());
        let a_dyn: Rc<dyn OrderListener> = a.clone();
        bus.subscribe(a_dyn.clone());
        bus.subscribe(b.clone());
        assert_eq!(bus.len(), 2);

        bus.unsubscribe(&a_dyn);
        assert_eq!(bus.len(), 1);

        bus.order_event(Lifecycle::Created, &order());
        assert!(a.seen.borrow().is_empty());
        assert_eq!(b.seen.borrow().len(), 1);
    }

    #[test]
    fn unimplemented_channels_are_no_ops() {
        let bus = {
            let mut bus = EventBus::new();
            bus.subscribe(Rc::new(LifecycleRecorder::default()));
            bus
        };
        // None of these panic even though the listener only handles the
        // lifecycle channel.
        let o = order();
        bus.price_change(&o, 10.0, 11.0);
        bus.cancel(&o);
        bus.click(&o);
        bus.drag_end(&o.id, 11.0);
    }
}
