//! Creation-request validation — pure checks, no store or host access.

use crate::domain::{OrderDraft, OrderId};
use thiserror::Error;

/// One reason a draft is unacceptable.
///
/// `DuplicateId` is appended by the engine (uniqueness needs the store);
/// everything else comes from [`validate`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationIssue {
    #[error("symbol must not be empty")]
    EmptySymbol,

    #[error("price must be positive, got {0}")]
    NonPositivePrice(f64),

    #[error("price must be finite")]
    NonFinitePrice,

    #[error("quantity must be positive, got {0}")]
    NonPositiveQuantity(f64),

    #[error("quantity must be finite")]
    NonFiniteQuantity,

    #[error("order id {0} already exists")]
    DuplicateId(OrderId),
}

/// Check a creation request. An empty result means acceptable; any issue
/// blocks insertion.
pub fn validate(draft: &OrderDraft) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if draft.symbol.trim().is_empty() {
        issues.push(ValidationIssue::EmptySymbol);
    }

    if !draft.price.is_finite() {
        issues.push(ValidationIssue::NonFinitePrice);
    } else if draft.price <= 0.0 {
        issues.push(ValidationIssue::NonPositivePrice(draft.price));
    }

    if !draft.quantity.is_finite() {
        issues.push(ValidationIssue::NonFiniteQuantity);
    } else if draft.quantity <= 0.0 {
        issues.push(ValidationIssue::NonPositiveQuantity(draft.quantity));
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OrderKind, OrderSide};

    fn draft() -> OrderDraft {
        OrderDraft::new(OrderKind::Limit, OrderSide::Buy, 50.0, 1.0, "ETHUSDT")
    }

    #[test]
    fn valid_draft_has_no_issues() {
        assert!(validate(&draft()).is_empty());
    }

    #[test]
    fn empty_symbol_rejected() {
        let mut d = draft();
        d.symbol = "   ".into();
        assert_eq!(validate(&d), vec![ValidationIssue::EmptySymbol]);
    }

    #[test]
    fn non_positive_numbers_rejected() {
        let mut d = draft();
        d.price = 0.0;
        d.quantity = -3.0;
        let issues = validate(&d);
        assert!(issues.contains(&ValidationIssue::NonPositivePrice(0.0)));
        assert!(issues.contains(&ValidationIssue::NonPositiveQuantity(-3.0)));
    }

    #[test]
    fn non_finite_numbers_rejected() {
        let mut d = draft();
        d.price = f64::NAN;
        d.quantity = f64::INFINITY;
        let issues = validate(&d);
        assert!(issues.contains(&ValidationIssue::NonFinitePrice));
        assert!(issues.contains(&ValidationIssue::NonFiniteQuantity));
    }

    #[test]
    fn issues_accumulate() {
        let mut d = draft();
        d.symbol = String::new();
        d.price = -1.0;
        assert_eq!(validate(&d).len(), 2);
    }
}
