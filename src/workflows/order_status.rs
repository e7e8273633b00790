// Order lifecycle: confirm -> roasting -> shipped -> complete, with cancelled
// assigned externally. The server owns every transition; this module only
// answers "what comes next".

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Forward-only fulfilment sequence. `Cancelled` is deliberately absent.
pub const STATUS_FLOW: [OrderStatus; 4] = [
    OrderStatus::Confirm,
    OrderStatus::Roasting,
    OrderStatus::Shipped,
    OrderStatus::Complete,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Confirm,
    Roasting,
    Shipped,
    Complete,
    Cancelled,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown order status '{0}' (expected confirm, roasting, shipped, complete or cancelled)")]
pub struct UnknownStatus(pub String);

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Confirm,
        OrderStatus::Roasting,
        OrderStatus::Shipped,
        OrderStatus::Complete,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Confirm => "confirm",
            OrderStatus::Roasting => "roasting",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Complete => "complete",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Capitalized form used in button text and terminal output.
    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::Confirm => "Confirm",
            OrderStatus::Roasting => "Roasting",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Complete => "Complete",
            OrderStatus::Cancelled => "Cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Complete | OrderStatus::Cancelled)
    }

    /// The status an advance request should ask the server for, if any.
    pub fn next(&self) -> Option<OrderStatus> {
        next_status(*self)
    }
}

/// Successor of `current` in [`STATUS_FLOW`].
///
/// Terminal statuses are absorbing and return `None`. A status outside the
/// flow also yields `None`; the last entry of the flow has no successor.
pub fn next_status(current: OrderStatus) -> Option<OrderStatus> {
    if current.is_terminal() {
        return None;
    }

    let index = STATUS_FLOW.iter().position(|status| *status == current)?;
    STATUS_FLOW.get(index + 1).copied()
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        OrderStatus::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}
