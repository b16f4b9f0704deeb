//! Product and price tier models.

use serde::{Deserialize, Serialize};

use super::{Category, Fulfillment, ProductId, TierId, Vendor};

/// A purchasable quantity/price variant of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceTier {
    /// Identifier, unique within the owning product.
    pub id: TierId,
    /// Human-readable amount label, e.g. `"1g"`.
    pub amount: String,
    /// Price in whole currency units. Always positive.
    #[serde(deserialize_with = "positive_price")]
    pub price: u64,
}

impl PriceTier {
    /// Creates a tier.
    #[inline]
    #[must_use]
    pub fn new<I: Into<TierId>, A: Into<String>>(id: I, amount: A, price: u64) -> Self {
        Self {
            id: id.into(),
            amount: amount.into(),
            price,
        }
    }
}

/// Rejects a zero tier price.
fn positive_price<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let price = u64::deserialize(deserializer)?;
    if price == 0 {
        return Err(serde::de::Error::custom("tier price must be positive"));
    }
    Ok(price)
}

/// A catalog listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique identifier.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Category used by the filter panel.
    pub category: Category,
    /// Image reference (URL or data URI).
    pub image_url: String,
    /// Price tiers, in display order.
    pub tiers: Vec<PriceTier>,
    /// Snapshot of the selling vendor.
    pub vendor: Vendor,
    /// Region the product ships from.
    pub origin: String,
    /// Region the product ships to, or `"Worldwide"`.
    pub ships_to: String,
    /// Whether payment is held in escrow. Descriptive only.
    pub escrow: bool,
    /// Whether the vendor requires finalize-early. Descriptive only.
    pub finalize_early: bool,
    /// Physical or digital delivery.
    pub fulfillment: Fulfillment,
    /// Whether the buyer has wishlisted the product.
    #[serde(default)]
    pub wishlisted: bool,
    /// Popularity score, if known.
    #[serde(default)]
    pub popularity: Option<u32>,
    /// Units in stock, if tracked.
    #[serde(default)]
    pub stock: Option<u32>,
}

impl Product {
    /// Looks up a tier by identifier.
    #[inline]
    #[must_use]
    pub fn tier(&self, id: &TierId) -> Option<&PriceTier> {
        self.tiers.iter().find(|tier| tier.id == *id)
    }

    /// Returns the cheapest and most expensive tier prices.
    ///
    /// Returns `None` for a product without tiers.
    #[inline]
    #[must_use]
    pub fn price_range(&self) -> Option<(u64, u64)> {
        let min = self.tiers.iter().map(|tier| tier.price).min()?;
        let max = self.tiers.iter().map(|tier| tier.price).max()?;
        Some((min, max))
    }
}
