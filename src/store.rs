//! In-memory stores owned by the storefront coordinator.
//!
//! [`Catalog`] holds the product listings and derives the vendor views,
//! [`SessionStore`] holds the signed-in user, and [`seed_catalog`] provides
//! the listings a fresh storefront starts with.

mod catalog;
mod seed;
mod session;

pub use catalog::Catalog;
pub use seed::seed_catalog;
pub use session::SessionStore;
