//! Drag-to-reprice state machine.
//!
//! The host's pointer phases (pressed-move-start / pressed-moving /
//! pressed-move-end) map onto an explicit FSM with states
//! {idle, dragging(order)}. Guards live on the transitions, so the engine
//! never depends on the host sequencing its callbacks correctly.

use crate::domain::OrderId;

/// Current drag phase. At most one order drags at a time — the hosting
/// event loop serializes pointer sequences.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        id: OrderId,
    },
}

impl DragState {
    /// The order currently being dragged, if any.
    pub fn target(&self) -> Option<&OrderId> {
        match self {
            DragState::Idle => None,
            DragState::Dragging { id } => Some(id),
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self, DragState::Dragging { .. })
    }

    /// Begin dragging `id`. A drag already in flight is replaced — the
    /// host cannot physically press two lines at once, but a missed
    /// move-end must not wedge the machine.
    pub fn begin(&mut self, id: OrderId) {
        *self = DragState::Dragging { id };
    }

    /// End the drag, yielding the order that was in flight.
    pub fn end(&mut self) -> Option<OrderId> {
        match std::mem::take(self) {
            DragState::Idle => None,
            DragState::Dragging { id } => Some(id),
        }
    }

    /// Drop the drag if it targets `id` (order removed mid-drag).
    pub fn clear_if_target(&mut self, id: &OrderId) {
        if self.target() == Some(id) {
            *self = DragState::Idle;
        }
    }
}

/// Policy for prices reported during pressed-moving: only finite, positive
/// candidates are accepted; rejected samples leave the last accepted price
/// in place.
pub fn acceptable_drag_price(candidate: f64) -> bool {
    candidate.is_finite() && candidate > 0.0
}
