//! Order model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{CartItem, OrderId, OrderStatus};

/// A placed order.
///
/// Items and total are frozen at checkout; only `status` changes afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Generated identifier.
    pub id: OrderId,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Snapshot of the cart at checkout.
    pub items: Vec<CartItem>,
    /// Amount charged, fees included.
    pub total: Decimal,
    /// Current status.
    pub status: OrderStatus,
    /// Simulated payment transaction reference.
    pub tx_ref: String,
}

impl Order {
    /// Total number of units across all lines.
    #[inline]
    #[must_use]
    pub fn unit_count(&self) -> u64 {
        self.items
            .iter()
            .map(|item| u64::from(item.quantity.get()))
            .sum()
    }
}
