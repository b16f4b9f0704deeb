//! Listings a fresh storefront starts with.

use crate::models::{
    Category, Feedback, Fulfillment, PriceTier, Product, ProductId, Vendor, VendorRank,
};

/// Builds a vendor snapshot.
fn vendor(name: &str, rating: f64, sales: u64, total_revenue: u64, rank: VendorRank) -> Vendor {
    Vendor {
        name: name.to_owned(),
        rating,
        sales,
        total_revenue,
        trust_level: 8,
        verified: sales >= 10,
        rank,
        join_date: "Jan 2023".to_owned(),
        bio: String::new(),
        feedback: Vec::new(),
    }
}

/// Returns the built-in catalog, in display order.
#[must_use]
pub fn seed_catalog() -> Vec<Product> {
    let mut roastery = vendor("NorthsideRoastery", 4.95, 3_200, 850_000, VendorRank::Kingpin);
    roastery.trust_level = 10;
    roastery.join_date = "Nov 2022".to_owned();
    roastery.bio = "Small-batch roaster, cold brew since 2015.".to_owned();
    roastery.feedback = vec![Feedback {
        reviewer: "b***r".to_owned(),
        rating: 5.0,
        comment: "Arrived cold, tastes great.".to_owned(),
        timestamp: "2 days ago".to_owned(),
    }];

    let mut farmer = vendor("HempFarmerAU", 4.8, 850, 120_000, VendorRank::Supplier);
    farmer.bio = "Cold-pressed on the farm.".to_owned();

    let mut chemist = vendor("CornerChemist", 4.6, 120, 18_500, VendorRank::Dealer);
    chemist.trust_level = 6;

    let mut lab = vendor("SporeLab", 5.0, 9_001, 2_500_000, VendorRank::Heisenberg);
    lab.trust_level = 10;
    lab.join_date = "Oct 2020".to_owned();

    let mut vpn = vendor("TunnelWorks", 4.2, 4, 600, VendorRank::Peddler);
    vpn.trust_level = 3;

    vec![
        Product {
            id: ProductId::from("p1"),
            name: "Cold Brew Concentrate".to_owned(),
            description: "Single-origin concentrate. Dilute one to four.".to_owned(),
            category: Category::Stimulants,
            image_url: "https://images.example.com/cold-brew.jpg".to_owned(),
            tiers: vec![
                PriceTier::new("t1", "500ml", 25),
                PriceTier::new("t2", "1l", 45),
            ],
            vendor: roastery,
            origin: "Australia".to_owned(),
            ships_to: "Australia".to_owned(),
            escrow: true,
            finalize_early: false,
            fulfillment: Fulfillment::Physical,
            wishlisted: false,
            popularity: Some(142),
            stock: Some(40),
        },
        Product {
            id: ProductId::from("p2"),
            name: "Hemp Seed Oil".to_owned(),
            description: "Cold-pressed, unrefined, rich in omega-3.".to_owned(),
            category: Category::Cannabis,
            image_url: "https://images.example.com/hemp-oil.jpg".to_owned(),
            tiers: vec![PriceTier::new("t4", "250ml", 12)],
            vendor: farmer,
            origin: "Australia".to_owned(),
            ships_to: "Worldwide".to_owned(),
            escrow: true,
            finalize_early: true,
            fulfillment: Fulfillment::Physical,
            wishlisted: false,
            popularity: Some(12),
            stock: Some(300),
        },
        Product {
            id: ProductId::from("p3"),
            name: "Vitamin D3 Softgels".to_owned(),
            description: "1000 IU daily softgels, 180 count.".to_owned(),
            category: Category::Pharmacy,
            image_url: "https://images.example.com/vitamin-d3.jpg".to_owned(),
            tiers: vec![
                PriceTier::new("t5", "90 caps", 18),
                PriceTier::new("t6", "180 caps", 30),
            ],
            vendor: chemist,
            origin: "International".to_owned(),
            ships_to: "Australia".to_owned(),
            escrow: true,
            finalize_early: false,
            fulfillment: Fulfillment::Physical,
            wishlisted: false,
            popularity: Some(64),
            stock: None,
        },
        Product {
            id: ProductId::from("p4"),
            name: "Lion's Mane Grow Kit".to_owned(),
            description: "Ready-to-fruit gourmet mushroom block.".to_owned(),
            category: Category::Psychedelics,
            image_url: "https://images.example.com/lions-mane.jpg".to_owned(),
            tiers: vec![PriceTier::new("t12", "1 kit", 40)],
            vendor: lab,
            origin: "Australia".to_owned(),
            ships_to: "Australia".to_owned(),
            escrow: true,
            finalize_early: false,
            fulfillment: Fulfillment::Physical,
            wishlisted: false,
            popularity: Some(256),
            stock: Some(3),
        },
        Product {
            id: ProductId::from("p5"),
            name: "VPN Subscription".to_owned(),
            description: "Twelve months, unlimited devices.".to_owned(),
            category: Category::Digital,
            image_url: "https://images.example.com/vpn.jpg".to_owned(),
            tiers: vec![
                PriceTier::new("t20", "1 month", 8),
                PriceTier::new("t21", "12 months", 60),
            ],
            vendor: vpn,
            origin: "International".to_owned(),
            ships_to: "Worldwide".to_owned(),
            escrow: false,
            finalize_early: true,
            fulfillment: Fulfillment::Digital,
            wishlisted: false,
            popularity: None,
            stock: None,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn seed_ids_are_unique_and_priced() {
        let products = seed_catalog();
        let ids: HashSet<&ProductId> = products.iter().map(|product| &product.id).collect();
        assert_eq!(ids.len(), products.len());
        assert!(products.iter().all(|product| product.price_range().is_some()));
    }

    #[test]
    fn seed_covers_every_category() {
        let products = seed_catalog();
        for category in Category::ALL {
            assert!(products.iter().any(|product| product.category == category));
        }
    }

    #[test]
    fn seed_ranks_match_sales_below_invitation() {
        for product in seed_catalog() {
            if product.vendor.rank != VendorRank::Heisenberg {
                assert_eq!(product.vendor.rank, VendorRank::for_sales(product.vendor.sales));
            }
        }
    }
}
