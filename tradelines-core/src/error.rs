//! Engine error taxonomy and host-sync failure records.

use crate::domain::{OrderId, OrderStatus};
use crate::host::HostError;
use crate::validate::ValidationIssue;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Caller-facing failures. Host-sync trouble is deliberately absent: it is
/// recorded as a [`SyncFailure`] instead of propagating, so a surface
/// hiccup never rolls back a store mutation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("order rejected: {}", format_issues(.0))]
    Validation(Vec<ValidationIssue>),

    #[error("order {0} not found")]
    NotFound(OrderId),

    #[error("order {id}: illegal status transition {from:?} -> {to:?}")]
    InvalidTransition {
        id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    },
}

fn format_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Which surface call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOp {
    Create,
    Update,
    Remove,
}

impl SyncOp {
    pub fn label(self) -> &'static str {
        match self {
            SyncOp::Create => "create",
            SyncOp::Update => "update",
            SyncOp::Remove => "remove",
        }
    }
}

/// One recorded host-sync failure. The store stayed authoritative; a later
/// refresh retries the visual sync.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncFailure {
    pub timestamp: DateTime<Utc>,
    pub order_id: OrderId,
    pub op: SyncOp,
    pub error: HostError,
}

impl SyncFailure {
    pub fn now(order_id: OrderId, op: SyncOp, error: HostError) -> Self {
        Self {
            timestamp: Utc::now(),
            order_id,
            op,
            error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_lists_every_issue() {
        let err = EngineError::Validation(vec![
            ValidationIssue::EmptySymbol,
            ValidationIssue::NonPositivePrice(-1.0),
        ]);
        let text = err.to_string();
        assert!(text.contains("symbol must not be empty"));
        assert!(text.contains("price must be positive"));
    }

    #[test]
    fn sync_failure_labels() {
        assert_eq!(SyncOp::Create.label(), "create");
        assert_eq!(SyncOp::Remove.label(), "remove");
    }
}
