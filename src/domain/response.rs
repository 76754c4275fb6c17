use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::numeric::parse_numeric;
use crate::domain::value::{OrderId, ServiceId};

/// Status labels after which an order no longer changes (compared case-insensitively).
pub const TERMINAL_STATUSES: [&str; 4] = ["completed", "partial", "canceled", "refunded"];

/// Status label synthesized when the panel answers with an `error` and no `status`.
pub const ERROR_STATUS: &str = "Error";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Service {
    pub service: ServiceId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub category: String,
    pub rate: String,
    pub min: String,
    pub max: String,
    pub refill: Option<bool>,
    pub cancel: Option<bool>,
    pub dripfeed: Option<bool>,
}

impl Service {
    pub fn rate_value(&self) -> Option<Decimal> {
        parse_numeric(&self.rate)
    }

    pub fn min_value(&self) -> Option<Decimal> {
        parse_numeric(&self.min)
    }

    pub fn max_value(&self) -> Option<Decimal> {
        parse_numeric(&self.max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderResponse {
    pub order: OrderId,
    /// `true` when the id was synthesized locally in dry-run mode and never issued by the panel.
    pub simulated: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusResponse {
    pub status: Option<String>,
    pub error: Option<String>,
    pub charge: Option<String>,
    pub remains: Option<String>,
    pub currency: Option<String>,
    pub start_count: Option<String>,
}

impl StatusResponse {
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// Whether the status label is one of [`TERMINAL_STATUSES`].
    pub fn is_terminal(&self) -> bool {
        self.status.as_deref().is_some_and(|status| {
            TERMINAL_STATUSES
                .iter()
                .any(|terminal| status.trim().eq_ignore_ascii_case(terminal))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalanceResponse {
    pub balance: String,
    pub currency: String,
}

impl BalanceResponse {
    pub fn amount(&self) -> Option<Decimal> {
        parse_numeric(&self.balance)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
/// Per-order result of a refill or cancel request.
pub enum RequestOutcome {
    /// Panel accepted the request; the value is the refill/cancel id or result code.
    Accepted(u64),
    /// Panel rejected the request with string diagnostics (usually `{"error": "..."}`).
    Rejected(BTreeMap<String, String>),
}

impl RequestOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefillResponse {
    pub order: OrderId,
    pub refill: RequestOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CancelItem {
    pub order: OrderId,
    pub cancel: RequestOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Result of an action addressed to one order or to a batch of orders.
pub enum OrderReply<T> {
    Single(T),
    Batch(BTreeMap<OrderId, T>),
}

impl<T> OrderReply<T> {
    pub fn single(self) -> Option<T> {
        match self {
            Self::Single(value) => Some(value),
            Self::Batch(_) => None,
        }
    }

    pub fn batch(self) -> Option<BTreeMap<OrderId, T>> {
        match self {
            Self::Single(_) => None,
            Self::Batch(values) => Some(values),
        }
    }
}
