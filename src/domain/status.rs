//! Settlement status shared by tuition billings and tutor payments

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::DomainResult;
use crate::shared::errors::DomainError;

/// Lifecycle of an invoice or payout.
///
/// Allowed transitions: pending → paid | overdue | cancelled,
/// overdue → paid | cancelled. Paid and cancelled are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SettlementStatus {
    Pending,
    Paid,
    Overdue,
    Cancelled,
}

impl SettlementStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Overdue => "overdue",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "paid" => Some(Self::Paid),
            "overdue" => Some(Self::Overdue),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Still owed: pending or overdue.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Pending | Self::Overdue)
    }

    pub fn can_transition_to(&self, next: SettlementStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Paid)
                | (Self::Pending, Self::Overdue)
                | (Self::Pending, Self::Cancelled)
                | (Self::Overdue, Self::Paid)
                | (Self::Overdue, Self::Cancelled)
        )
    }

    /// Validate a transition for `entity`, returning the new status.
    pub fn transition(
        &self,
        entity: &'static str,
        next: SettlementStatus,
    ) -> DomainResult<SettlementStatus> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(self.rejected(entity, next))
        }
    }

    /// `InvalidTransition` from this status to `next`.
    pub fn rejected(&self, entity: &'static str, next: SettlementStatus) -> DomainError {
        DomainError::InvalidTransition {
            entity,
            from: self.as_str().to_string(),
            to: next.as_str().to_string(),
        }
    }
}

impl Default for SettlementStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl std::fmt::Display for SettlementStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
