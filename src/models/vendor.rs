//! Vendor profile and rank ladder.

use serde::{Deserialize, Serialize};

/// Vendor loyalty rank, ordered from lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum VendorRank {
    /// Entry rank.
    Peddler,
    /// Second rank.
    Runner,
    /// Third rank.
    Dealer,
    /// Fourth rank.
    Supplier,
    /// Highest rank reachable through sales.
    Kingpin,
    /// Invitation-only rank.
    Heisenberg,
}

impl VendorRank {
    /// The full ladder, lowest first.
    pub const LADDER: [Self; 6] = [
        Self::Peddler,
        Self::Runner,
        Self::Dealer,
        Self::Supplier,
        Self::Kingpin,
        Self::Heisenberg,
    ];

    /// Rank earned by a cumulative sales count.
    ///
    /// [`VendorRank::Heisenberg`] is never earned this way.
    #[inline]
    #[must_use]
    pub const fn for_sales(sales: u64) -> Self {
        match sales {
            0..=9 => Self::Peddler,
            10..=49 => Self::Runner,
            50..=199 => Self::Dealer,
            200..=999 => Self::Supplier,
            _ => Self::Kingpin,
        }
    }

    /// Human-readable sales requirement.
    #[inline]
    #[must_use]
    pub const fn requirement(self) -> &'static str {
        match self {
            Self::Peddler => "0 - 10 Sales",
            Self::Runner => "10 - 50 Sales",
            Self::Dealer => "50 - 200 Sales",
            Self::Supplier => "200 - 1000 Sales",
            Self::Kingpin => "1000+ Sales",
            Self::Heisenberg => "Invitation Only",
        }
    }

    /// Cosmetic perks shown for the rank.
    #[inline]
    #[must_use]
    pub const fn perks(self) -> &'static [&'static str] {
        match self {
            Self::Peddler => &["Basic Listing Limit", "Standard Fees"],
            Self::Runner => &["Verified Badge", "Bold Listings"],
            Self::Dealer => &["Escrow Priority", "Search Boost"],
            Self::Supplier => &["Reduced Fees", "Homepage Feature"],
            Self::Kingpin => &["Instant FE", "Dedicated Support", "Custom URL"],
            Self::Heisenberg => &["Market Share", "Leaderboard Crown"],
        }
    }
}

impl core::fmt::Display for VendorRank {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Debug::fmt(self, f)
    }
}

/// A single buyer review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    /// Reviewer display name.
    pub reviewer: String,
    /// Rating from 0 to 5.
    pub rating: f64,
    /// Review text.
    pub comment: String,
    /// Opaque timestamp label.
    pub timestamp: String,
}

/// Vendor snapshot embedded in each product.
///
/// There is no vendor table: `name` is the identity key, and two products
/// with the same vendor name describe the same vendor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vendor {
    /// Vendor name; unique across the catalog.
    pub name: String,
    /// Average rating from 0 to 5.
    pub rating: f64,
    /// Cumulative sales count.
    pub sales: u64,
    /// Cumulative revenue in whole currency units.
    pub total_revenue: u64,
    /// Trust level from 1 to 10.
    pub trust_level: u8,
    /// Whether the vendor passed verification.
    pub verified: bool,
    /// Loyalty rank.
    pub rank: VendorRank,
    /// Opaque join-date label.
    pub join_date: String,
    /// Profile text.
    pub bio: String,
    /// Reviews, oldest first.
    pub feedback: Vec<Feedback>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_thresholds() {
        assert_eq!(VendorRank::for_sales(0), VendorRank::Peddler);
        assert_eq!(VendorRank::for_sales(9), VendorRank::Peddler);
        assert_eq!(VendorRank::for_sales(10), VendorRank::Runner);
        assert_eq!(VendorRank::for_sales(199), VendorRank::Dealer);
        assert_eq!(VendorRank::for_sales(200), VendorRank::Supplier);
        assert_eq!(VendorRank::for_sales(9001), VendorRank::Kingpin);
    }

    #[test]
    fn ladder_is_ordered() {
        assert!(VendorRank::LADDER.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(VendorRank::Heisenberg.requirement(), "Invitation Only");
    }

    #[test]
    fn rank_display_matches_variant() {
        assert_eq!(VendorRank::Supplier.to_string(), "Supplier");
    }
}
