//! Catalog Store: product listings and vendor views derived from them.
//!
//! Vendors have no table of their own. A vendor is identified by name, and
//! when two listings disagree about a vendor the first listing wins.

use std::collections::HashSet;
use std::path::Path;

use crate::error::{Result, StorefrontError};
use crate::models::{Product, ProductId, Vendor};

/// Ordered product listings.
///
/// # Upsert semantics
///
/// Saving a product whose id is already listed replaces it in place; a new
/// id is inserted at the front. Nothing is ever deleted.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Catalog {
    /// Listings in display order.
    products: Vec<Product>,
}

impl Catalog {
    /// Creates a catalog from listings in display order.
    #[inline]
    #[must_use]
    pub const fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// Parses a JSON array of products.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::Serialization`] if the JSON is malformed.
    #[inline]
    pub fn from_json_str(json: &str) -> Result<Self> {
        let products: Vec<Product> = serde_json::from_str(json)?;
        Ok(Self::new(products))
    }

    /// Reads a JSON array of products from disk.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::Io`] if the file cannot be read and
    /// [`StorefrontError::Serialization`] if its contents are malformed.
    #[inline]
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let catalog = Self::from_json_str(&json)?;
        tracing::debug!(path = %path.display(), products = catalog.len(), "catalog loaded");
        Ok(catalog)
    }

    /// All listings in display order.
    #[inline]
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Number of listings.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Returns `true` if nothing is listed.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Looks up a listing.
    #[inline]
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|product| product.id == *id)
    }

    /// Saves a listing from the editor.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::InvalidListing`] if the name is blank or a
    /// tier is free; the catalog is left untouched.
    #[inline]
    pub fn upsert(&mut self, product: Product) -> Result<()> {
        if product.name.trim().is_empty() {
            return Err(StorefrontError::InvalidListing("name must not be empty".to_owned()));
        }
        if let Some(free) = product.tiers.iter().find(|tier| tier.price == 0) {
            return Err(StorefrontError::InvalidListing(format!(
                "tier {} must have a positive price",
                free.id
            )));
        }
        if let Some(existing) = self.products.iter_mut().find(|p| p.id == product.id) {
            tracing::debug!(product = %product.id, "listing replaced");
            *existing = product;
        } else {
            tracing::debug!(product = %product.id, "listing added");
            self.products.insert(0, product);
        }
        Ok(())
    }

    /// Flips the wishlist flag and returns its new value.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::ProductNotFound`] for an unknown id.
    #[inline]
    pub fn toggle_wishlist(&mut self, id: &ProductId) -> Result<bool> {
        let product = self
            .products
            .iter_mut()
            .find(|product| product.id == *id)
            .ok_or_else(|| StorefrontError::ProductNotFound(id.clone()))?;
        product.wishlisted = !product.wishlisted;
        Ok(product.wishlisted)
    }

    /// One entry per vendor name, in order of first appearance.
    #[inline]
    #[must_use]
    pub fn vendors(&self) -> Vec<&Vendor> {
        let mut seen = HashSet::new();
        self.products
            .iter()
            .map(|product| &product.vendor)
            .filter(|vendor| seen.insert(vendor.name.as_str()))
            .collect()
    }

    /// Verified vendors, in order of first appearance.
    #[inline]
    #[must_use]
    pub fn verified_vendors(&self) -> Vec<&Vendor> {
        let mut vendors = self.vendors();
        vendors.retain(|vendor| vendor.verified);
        vendors
    }

    /// The `limit` vendors with the highest cumulative revenue, highest first.
    #[inline]
    #[must_use]
    pub fn top_vendors(&self, limit: usize) -> Vec<&Vendor> {
        let mut vendors = self.vendors();
        vendors.sort_by(|a, b| b.total_revenue.cmp(&a.total_revenue));
        vendors.truncate(limit);
        vendors
    }

    /// Listings sold by the named vendor.
    #[inline]
    #[must_use]
    pub fn vendor_products(&self, name: &str) -> Vec<&Product> {
        self.products
            .iter()
            .filter(|product| product.vendor.name == name)
            .collect()
    }
}
