//! Wallet ledger entry model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{TransactionId, TransactionKind, TransactionStatus};

/// A wallet ledger entry.
///
/// The sign of `amount` gives the direction: credits are positive, debits
/// negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Generated identifier.
    pub id: TransactionId,
    /// What produced the entry.
    pub kind: TransactionKind,
    /// Signed amount.
    pub amount: Decimal,
    /// When the entry was recorded.
    pub timestamp: DateTime<Utc>,
    /// Settlement state.
    pub status: TransactionStatus,
}

impl Transaction {
    /// Creates an entry stamped with the current time.
    #[inline]
    #[must_use]
    pub fn record(kind: TransactionKind, amount: Decimal, status: TransactionStatus) -> Self {
        Self {
            id: TransactionId::generate(),
            kind,
            amount,
            timestamp: Utc::now(),
            status,
        }
    }
}
