//! Cart Aggregator: line items, merge policy and fee computation.

use core::num::NonZeroU32;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::{Result, StorefrontError};
use crate::models::{CartItem, CartLineId, Product, TierId};

/// What happens when a product tier already in the cart is added again.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MergePolicy {
    /// Increment the quantity of the existing `(product, tier)` line.
    #[default]
    Merge,
    /// Always append a new line with quantity one.
    Append,
}

/// Callback invoked after every successful add (e.g. to open the cart panel).
pub type AddHook = Box<dyn FnMut(&CartItem) + Send>;

/// Fee rates applied at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeSchedule {
    /// Service fee rate applied to the subtotal.
    pub service_rate: Decimal,
    /// Optional mixing fee rate applied to the subtotal.
    pub mixing_rate: Decimal,
}

/// Price breakdown shown at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutQuote {
    /// Sum of line totals.
    pub subtotal: u64,
    /// `floor(subtotal * (1 + service_rate))`.
    pub base_total: Decimal,
    /// Mixing fee, zero unless requested.
    pub mixing_fee: Decimal,
    /// Simulated network fee.
    pub network_fee: Decimal,
}

impl CheckoutQuote {
    /// Amount charged: base total plus the cosmetic extras.
    #[inline]
    #[must_use]
    pub fn grand_total(&self) -> Decimal {
        self.base_total
            .saturating_add(self.mixing_fee)
            .saturating_add(self.network_fee)
    }
}

/// The shopping cart.
///
/// Quantities are always at least one; reducing a line below one removes
/// it.
pub struct Cart {
    /// Lines in insertion order.
    lines: Vec<CartItem>,
    /// Re-add behaviour.
    policy: MergePolicy,
    /// Optional add callback.
    on_add: Option<AddHook>,
}

impl core::fmt::Debug for Cart {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Cart")
            .field("lines", &self.lines)
            .field("policy", &self.policy)
            .field("on_add", &self.on_add.is_some())
            .finish()
    }
}

impl Default for Cart {
    #[inline]
    fn default() -> Self {
        Self::new(MergePolicy::default())
    }
}

impl Cart {
    /// Creates an empty cart with the given merge policy.
    #[inline]
    #[must_use]
    pub const fn new(policy: MergePolicy) -> Self {
        Self {
            lines: Vec::new(),
            policy,
            on_add: None,
        }
    }

    /// Registers the callback run after every add.
    #[inline]
    pub fn set_on_add(&mut self, hook: AddHook) {
        self.on_add = Some(hook);
    }

    /// Returns the merge policy.
    #[inline]
    #[must_use]
    pub const fn policy(&self) -> MergePolicy {
        self.policy
    }

    /// Adds one unit of `product` at the given tier.
    ///
    /// Returns the identifier of the line that now holds the unit.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::TierNotFound`] if the tier does not
    /// belong to the product.
    #[inline]
    pub fn add(&mut self, product: &Product, tier_id: &TierId) -> Result<CartLineId> {
        let tier = product
            .tier(tier_id)
            .ok_or_else(|| StorefrontError::TierNotFound {
                product: product.id.clone(),
                tier: tier_id.clone(),
            })?;

        let existing = match self.policy {
            MergePolicy::Merge => self
                .lines
                .iter()
                .position(|line| line.product_id == product.id && line.tier.id == tier.id),
            MergePolicy::Append => None,
        };

        let index = if let Some(index) = existing {
            if let Some(line) = self.lines.get_mut(index) {
                line.quantity = line.quantity.saturating_add(1);
            }
            index
        } else {
            self.lines.push(CartItem {
                id: CartLineId::generate(),
                product_id: product.id.clone(),
                name: product.name.clone(),
                image_url: product.image_url.clone(),
                tier: tier.clone(),
                quantity: NonZeroU32::MIN,
            });
            self.lines.len() - 1
        };

        let line = self
            .lines
            .get(index)
            .ok_or_else(|| StorefrontError::ProductNotFound(product.id.clone()))?;
        tracing::debug!(line = %line.id, product = %product.id, tier = %tier.id, quantity = line.quantity.get(), "added to cart");
        if let Some(hook) = self.on_add.as_mut() {
            hook(line);
        }
        Ok(line.id.clone())
    }

    /// Removes a line. Unknown identifiers are ignored.
    #[inline]
    pub fn remove(&mut self, id: &CartLineId) -> Option<CartItem> {
        let index = self.lines.iter().position(|line| line.id == *id)?;
        Some(self.lines.remove(index))
    }

    /// Sets a line's quantity; zero removes the line.
    ///
    /// Returns `false` if no line has the identifier.
    #[inline]
    pub fn set_quantity(&mut self, id: &CartLineId, quantity: u32) -> bool {
        let Some(index) = self.lines.iter().position(|line| line.id == *id) else {
            return false;
        };
        match NonZeroU32::new(quantity) {
            Some(quantity) => {
                if let Some(line) = self.lines.get_mut(index) {
                    line.quantity = quantity;
                }
            }
            None => {
                let _removed = self.lines.remove(index);
            }
        }
        true
    }

    /// Removes one unit from a line, removing the line at quantity one.
    #[inline]
    pub fn decrement(&mut self, id: &CartLineId) -> bool {
        let Some(current) = self.line(id).map(|line| line.quantity.get()) else {
            return false;
        };
        self.set_quantity(id, current - 1)
    }

    /// Empties the cart.
    #[inline]
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Looks up a line.
    #[inline]
    #[must_use]
    pub fn line(&self, id: &CartLineId) -> Option<&CartItem> {
        self.lines.iter().find(|line| line.id == *id)
    }

    /// All lines in insertion order.
    #[inline]
    #[must_use]
    pub fn lines(&self) -> &[CartItem] {
        &self.lines
    }

    /// Returns `true` if the cart has no lines.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total units across all lines.
    #[inline]
    #[must_use]
    pub fn unit_count(&self) -> u64 {
        self.lines
            .iter()
            .fold(0, |count, line| count.saturating_add(u64::from(line.quantity.get())))
    }

    /// Sum of `tier.price * quantity` over all lines, saturating at
    /// `u64::MAX`.
    #[inline]
    #[must_use]
    pub fn subtotal(&self) -> u64 {
        self.lines
            .iter()
            .fold(0, |sum, line| sum.saturating_add(line.line_total()))
    }

    /// `floor(subtotal * (1 + fee_rate))`.
    #[inline]
    #[must_use]
    pub fn total(&self, fee_rate: Decimal) -> Decimal {
        Decimal::from(self.subtotal())
            .saturating_mul(Decimal::ONE.saturating_add(fee_rate))
            .floor()
    }

    /// Builds the checkout breakdown.
    #[inline]
    #[must_use]
    pub fn quote(&self, fees: &FeeSchedule, mixing: bool, network_fee: Decimal) -> CheckoutQuote {
        let subtotal = self.subtotal();
        let mixing_fee = if mixing {
            Decimal::from(subtotal).saturating_mul(fees.mixing_rate)
        } else {
            Decimal::ZERO
        };
        CheckoutQuote {
            subtotal,
            base_total: self.total(fees.service_rate),
            mixing_fee,
            network_fee,
        }
    }
}
