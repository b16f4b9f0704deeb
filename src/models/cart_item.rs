//! Cart line model.

use core::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use super::{CartLineId, PriceTier, ProductId};

/// One line in the cart.
///
/// Display fields are captured when the line is added so later catalog
/// edits do not rewrite the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Generated line identifier.
    pub id: CartLineId,
    /// Source product.
    pub product_id: ProductId,
    /// Product name at add time.
    pub name: String,
    /// Product image at add time.
    pub image_url: String,
    /// Selected tier.
    pub tier: PriceTier,
    /// Quantity; always at least one.
    pub quantity: NonZeroU32,
}

impl CartItem {
    /// Returns `tier.price * quantity`, saturating at `u64::MAX`.
    #[inline]
    #[must_use]
    pub fn line_total(&self) -> u64 {
        self.tier.price.saturating_mul(u64::from(self.quantity.get()))
    }
}
