//! Filter Engine: composable product filtering and optional sorting.

use std::collections::BTreeSet;

use crate::models::{Category, Product};

/// Region value that disables the origin or ships-to predicate.
pub const ANY_REGION: &str = "All";

/// Ships-to value that matches every destination filter.
pub const WORLDWIDE: &str = "Worldwide";

/// Default upper price bound used by the filter panel.
pub const DEFAULT_MAX_PRICE: u64 = 10_000;

/// Ordering applied to a filtered listing.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortOrder {
    /// Keep catalog order.
    #[default]
    Catalog,
    /// Cheapest tier first.
    PriceLowToHigh,
    /// Most expensive tier first.
    PriceHighToLow,
    /// Highest vendor rating first.
    VendorRating,
    /// Highest popularity first; unknown popularity last.
    Popularity,
}

/// Filter criteria for the product listing.
///
/// Every criterion must pass for a product to be shown. The default value
/// shows every product priced within `0..=10_000` in every category.
///
/// # Examples
///
/// ```
/// use storefront_sim::filter::ProductFilter;
/// use storefront_sim::models::Category;
///
/// let filter = ProductFilter::new()
///     .search("gold")
///     .ships_to("Australia")
///     .price_range(100, 500)
///     .only_categories([Category::Cannabis]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductFilter {
    /// Case-insensitive substring searched in name and description.
    pub search: String,
    /// Required origin, or [`ANY_REGION`].
    pub origin: String,
    /// Required destination, or [`ANY_REGION`].
    pub ships_to: String,
    /// Lower price bound (inclusive).
    pub min_price: u64,
    /// Upper price bound (inclusive).
    pub max_price: u64,
    /// Enabled categories. An empty set shows nothing.
    pub categories: BTreeSet<Category>,
    /// Show wishlisted products only.
    pub favorites_only: bool,
}

impl Default for ProductFilter {
    #[inline]
    fn default() -> Self {
        Self {
            search: String::new(),
            origin: ANY_REGION.to_owned(),
            ships_to: ANY_REGION.to_owned(),
            min_price: 0,
            max_price: DEFAULT_MAX_PRICE,
            categories: Category::ALL.into_iter().collect(),
            favorites_only: false,
        }
    }
}

impl ProductFilter {
    /// Creates the default filter.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the search text.
    #[inline]
    #[must_use]
    pub fn search<T: Into<String>>(mut self, text: T) -> Self {
        self.search = text.into();
        self
    }

    /// Restricts to products shipping from `origin`.
    #[inline]
    #[must_use]
    pub fn origin<T: Into<String>>(mut self, origin: T) -> Self {
        self.origin = origin.into();
        self
    }

    /// Restricts to products shipping to `region` (or worldwide).
    #[inline]
    #[must_use]
    pub fn ships_to<T: Into<String>>(mut self, region: T) -> Self {
        self.ships_to = region.into();
        self
    }

    /// Sets both price bounds.
    #[inline]
    #[must_use]
    pub const fn price_range(mut self, min: u64, max: u64) -> Self {
        self.min_price = min;
        self.max_price = max;
        self
    }

    /// Replaces the enabled category set.
    #[inline]
    #[must_use]
    pub fn only_categories<I: IntoIterator<Item = Category>>(mut self, categories: I) -> Self {
        self.categories = categories.into_iter().collect();
        self
    }

    /// Shows wishlisted products only.
    #[inline]
    #[must_use]
    pub const fn favorites_only(mut self, enabled: bool) -> Self {
        self.favorites_only = enabled;
        self
    }

    /// Enables the category if disabled, disables it otherwise.
    #[inline]
    pub fn toggle_category(&mut self, category: Category) {
        if !self.categories.remove(&category) {
            let _inserted = self.categories.insert(category);
        }
    }

    /// Returns `true` if the product satisfies every criterion.
    #[inline]
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        self.matches_search(product)
            && self.categories.contains(&product.category)
            && self.matches_origin(product)
            && self.matches_ships_to(product)
            && self.matches_price(product)
            && (!self.favorites_only || product.wishlisted)
    }

    /// Returns the matching products in input order.
    #[inline]
    #[must_use]
    pub fn apply<'a>(&self, products: &'a [Product]) -> Vec<&'a Product> {
        products
            .iter()
            .filter(|product| self.matches(product))
            .collect()
    }

    /// Checks the search text against name and description.
    fn matches_search(&self, product: &Product) -> bool {
        if self.search.is_empty() {
            return true;
        }
        let needle = self.search.to_lowercase();
        product.name.to_lowercase().contains(&needle)
            || product.description.to_lowercase().contains(&needle)
    }

    /// Checks the origin criterion.
    fn matches_origin(&self, product: &Product) -> bool {
        self.origin == ANY_REGION || product.origin == self.origin
    }

    /// Checks the destination criterion; worldwide shipping always passes.
    fn matches_ships_to(&self, product: &Product) -> bool {
        self.ships_to == ANY_REGION
            || product.ships_to == self.ships_to
            || product.ships_to == WORLDWIDE
    }

    /// Checks that the product's tier range overlaps the price bounds.
    fn matches_price(&self, product: &Product) -> bool {
        product
            .price_range()
            .is_some_and(|(low, high)| low <= self.max_price && high >= self.min_price)
    }
}

/// Sorts a listing in place. The sort is stable, so ties keep catalog order.
#[inline]
pub fn sort_listing(products: &mut [&Product], order: SortOrder) {
    match order {
        SortOrder::Catalog => {}
        SortOrder::PriceLowToHigh => {
            products.sort_by_key(|product| product.price_range().map_or(u64::MAX, |(low, _)| low));
        }
        SortOrder::PriceHighToLow => {
            products.sort_by_key(|product| {
                core::cmp::Reverse(product.price_range().map_or(0, |(_, high)| high))
            });
        }
        SortOrder::VendorRating => {
            products.sort_by(|a, b| b.vendor.rating.total_cmp(&a.vendor.rating));
        }
        SortOrder::Popularity => {
            products.sort_by_key(|product| core::cmp::Reverse(product.popularity));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test_support::sample_product;
    use crate::models::{PriceTier, ProductId};

    fn catalog() -> Vec<Product> {
        let mut cheap = sample_product("cheap");
        cheap.name = "Gold Coast Green".to_owned();
        cheap.category = Category::Cannabis;
        cheap.tiers = vec![PriceTier::new("t1", "7g", 120)];
        cheap.ships_to = WORLDWIDE.to_owned();

        let mut mid = sample_product("mid");
        mid.description = "Premium shards, lab tested".to_owned();
        mid.origin = "International".to_owned();

        let mut pricey = sample_product("pricey");
        pricey.category = Category::Digital;
        pricey.tiers = vec![PriceTier::new("t1", "lifetime", 2_000)];
        pricey.wishlisted = true;

        vec![cheap, mid, pricey]
    }

    fn ids(products: &[&Product]) -> Vec<String> {
        products
            .iter()
            .map(|product| product.id.as_inner().to_owned())
            .collect()
    }

    #[test]
    fn default_filter_shows_everything_in_order() {
        let products = catalog();
        let shown = ProductFilter::new().apply(&products);
        assert_eq!(ids(&shown), ["cheap", "mid", "pricey"]);
    }

    #[test]
    fn search_is_case_insensitive_over_name_and_description() {
        let products = catalog();
        assert_eq!(ids(&ProductFilter::new().search("GOLD").apply(&products)), ["cheap"]);
        assert_eq!(ids(&ProductFilter::new().search("lab tested").apply(&products)), ["mid"]);
    }

    #[test]
    fn empty_category_set_shows_nothing() {
        let products = catalog();
        let filter = ProductFilter::new().only_categories([]);
        assert!(filter.apply(&products).is_empty());
    }

    #[test]
    fn origin_requires_exact_match() {
        let products = catalog();
        let shown = ProductFilter::new().origin("International").apply(&products);
        assert_eq!(ids(&shown), ["mid"]);
    }

    #[test]
    fn worldwide_vendors_match_any_destination() {
        let products = catalog();
        let shown = ProductFilter::new().ships_to("New Zealand").apply(&products);
        assert_eq!(ids(&shown), ["cheap"]);
        let shown = ProductFilter::new().ships_to("Australia").apply(&products);
        assert_eq!(ids(&shown), ["cheap", "mid", "pricey"]);
    }

    #[test]
    fn price_filter_uses_range_overlap() {
        let product = sample_product("p1");
        assert!(ProductFilter::new().price_range(300, 1_000).matches(&product));
        assert!(ProductFilter::new().price_range(0, 250).matches(&product));
        assert!(!ProductFilter::new().price_range(451, 1_000).matches(&product));
        assert!(!ProductFilter::new().price_range(0, 249).matches(&product));
    }

    #[test]
    fn product_without_tiers_fails_price_filter() {
        let mut product = sample_product("p1");
        product.tiers.clear();
        assert!(!ProductFilter::new().matches(&product));
    }

    #[test]
    fn favorites_only_requires_wishlist() {
        let products = catalog();
        let shown = ProductFilter::new().favorites_only(true).apply(&products);
        assert_eq!(ids(&shown), ["pricey"]);
    }

    #[test]
    fn filtering_is_idempotent() {
        let products = catalog();
        let filters = [
            ProductFilter::new(),
            ProductFilter::new().search("product"),
            ProductFilter::new().price_range(200, 500).ships_to("Australia"),
            ProductFilter::new().only_categories([Category::Digital]).favorites_only(true),
        ];
        for filter in filters {
            let once: Vec<Product> = filter.apply(&products).into_iter().cloned().collect();
            let twice: Vec<Product> = filter.apply(&once).into_iter().cloned().collect();
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn enabling_categories_never_hides_products() {
        let products = catalog();
        let mut filter = ProductFilter::new().only_categories([Category::Cannabis]);
        let before: Vec<ProductId> = filter.apply(&products).iter().map(|p| p.id.clone()).collect();
        filter.toggle_category(Category::Digital);
        let after: Vec<ProductId> = filter.apply(&products).iter().map(|p| p.id.clone()).collect();
        assert!(before.iter().all(|id| after.contains(id)));
        assert_eq!(after.len(), 2);
    }

    #[test]
    fn toggle_category_round_trips() {
        let mut filter = ProductFilter::new();
        filter.toggle_category(Category::Pharmacy);
        assert!(!filter.categories.contains(&Category::Pharmacy));
        filter.toggle_category(Category::Pharmacy);
        assert!(filter.categories.contains(&Category::Pharmacy));
    }

    #[test]
    fn sort_by_price_is_stable() {
        let products = catalog();
        let mut shown = ProductFilter::new().apply(&products);
        sort_listing(&mut shown, SortOrder::PriceLowToHigh);
        assert_eq!(ids(&shown), ["cheap", "mid", "pricey"]);
        sort_listing(&mut shown, SortOrder::PriceHighToLow);
        assert_eq!(ids(&shown), ["pricey", "mid", "cheap"]);
    }

    #[test]
    fn sort_by_popularity_puts_unknown_last() {
        let mut products = catalog();
        products[2].popularity = Some(90);
        products[0].popularity = Some(10);
        let mut shown = ProductFilter::new().apply(&products);
        sort_listing(&mut shown, SortOrder::Popularity);
        assert_eq!(ids(&shown), ["pricey", "cheap", "mid"]);
    }
}
