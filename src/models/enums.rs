//! Enumeration types for constrained values.

use serde::{Deserialize, Serialize};

/// Product category shown in the filter panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Cannabis products.
    Cannabis,
    /// Stimulants.
    Stimulants,
    /// Psychedelics.
    Psychedelics,
    /// Pharmacy products.
    Pharmacy,
    /// Digital goods.
    Digital,
}

impl Category {
    /// Every category, in display order.
    pub const ALL: [Self; 5] = [
        Self::Cannabis,
        Self::Stimulants,
        Self::Psychedelics,
        Self::Pharmacy,
        Self::Digital,
    ];

    /// Returns the display label.
    #[inline]
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Cannabis => "Cannabis",
            Self::Stimulants => "Stimulants",
            Self::Psychedelics => "Psychedelics",
            Self::Pharmacy => "Pharmacy",
            Self::Digital => "Digital",
        }
    }
}

impl core::fmt::Display for Category {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

impl core::str::FromStr for Category {
    type Err = String;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown category: {s}"))
    }
}

/// How a product is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Fulfillment {
    /// Shipped as a parcel.
    Physical,
    /// Delivered electronically.
    Digital,
}

/// Status of an order. Moves forward only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Created at checkout, not yet picked up by the vendor.
    Pending,
    /// Being prepared by the vendor.
    Processing,
    /// Handed to the carrier.
    Shipped,
    /// Received by the buyer. Terminal.
    Delivered,
    /// Abandoned before delivery. Terminal.
    Cancelled,
}

impl OrderStatus {
    /// Position along the forward path, used to reject regressions.
    #[inline]
    #[must_use]
    pub const fn stage(self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Processing => 1,
            Self::Shipped => 2,
            Self::Delivered | Self::Cancelled => 3,
        }
    }

    /// Returns `true` if no further transitions are possible.
    #[inline]
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Returns the next status on the forward path, if any.
    #[inline]
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Pending => Some(Self::Processing),
            Self::Processing => Some(Self::Shipped),
            Self::Shipped => Some(Self::Delivered),
            Self::Delivered | Self::Cancelled => None,
        }
    }

    /// Returns `true` if moving from `self` to `to` is allowed.
    ///
    /// Forward moves along the path may skip stages. Cancellation is
    /// allowed from any non-terminal status.
    #[inline]
    #[must_use]
    pub const fn can_become(self, to: Self) -> bool {
        if self.is_terminal() {
            return false;
        }
        match to {
            Self::Cancelled => true,
            Self::Pending | Self::Processing | Self::Shipped | Self::Delivered => {
                to.stage() > self.stage()
            }
        }
    }
}

impl core::fmt::Display for OrderStatus {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let label = match *self {
            Self::Pending => "Pending",
            Self::Processing => "Processing",
            Self::Shipped => "Shipped",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
        };
        f.write_str(label)
    }
}

/// Phase of a simulated checkout payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PaymentPhase {
    /// Waiting for the buyer to report the payment as sent.
    Waiting,
    /// Pretending to scan for the payment.
    Detecting,
    /// Payment shown as confirmed; the order follows shortly.
    Confirmed,
    /// The payment window ran out while still waiting.
    Expired,
}

impl core::fmt::Display for PaymentPhase {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let label = match *self {
            Self::Waiting => "waiting",
            Self::Detecting => "detecting",
            Self::Confirmed => "confirmed",
            Self::Expired => "expired",
        };
        f.write_str(label)
    }
}

/// Kind of wallet ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    /// Funds added to the wallet.
    Deposit,
    /// Funds sent out of the wallet.
    Withdrawal,
    /// Net winnings from a game.
    Win,
    /// Stake lost in a game.
    Loss,
    /// Payment for an order or raffle ticket.
    Purchase,
}

/// Settlement state of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionStatus {
    /// Recorded but not yet settled.
    Pending,
    /// Settled. Immutable from here on.
    Completed,
}

/// A side of the coin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoinSide {
    /// Heads.
    Heads,
    /// Tails.
    Tails,
}

impl core::fmt::Display for CoinSide {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match *self {
            Self::Heads => f.write_str("Heads"),
            Self::Tails => f.write_str("Tails"),
        }
    }
}
