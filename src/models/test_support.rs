//! Fixture builders shared by unit tests.

use super::{Category, Fulfillment, PriceTier, Product, ProductId, Vendor, VendorRank};

/// Vendor with the given name and neutral stats.
pub(crate) fn sample_vendor(name: &str) -> Vendor {
    Vendor {
        name: name.to_owned(),
        rating: 4.5,
        sales: 100,
        total_revenue: 10_000,
        trust_level: 7,
        verified: true,
        rank: VendorRank::Dealer,
        join_date: "Jan 2024".to_owned(),
        bio: String::new(),
        feedback: Vec::new(),
    }
}

/// Product with tiers `t1` (0.5g, 250) and `t2` (1g, 450).
pub(crate) fn sample_product(id: &str) -> Product {
    Product {
        id: ProductId::from(id),
        name: format!("Product {id}"),
        description: "Sample listing".to_owned(),
        category: Category::Stimulants,
        image_url: String::new(),
        tiers: vec![
            PriceTier::new("t1", "0.5g", 250),
            PriceTier::new("t2", "1g", 450),
        ],
        vendor: sample_vendor("SampleVendor"),
        origin: "Australia".to_owned(),
        ships_to: "Australia".to_owned(),
        escrow: true,
        finalize_early: false,
        fulfillment: Fulfillment::Physical,
        wishlisted: false,
        popularity: None,
        stock: None,
    }
}
