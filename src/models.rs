//! Data models for the storefront.
//!
//! This module contains strongly-typed representations of catalog
//! listings, cart lines, orders and ledger entries, newtype ID wrappers,
//! and enumeration types for constrained values.

mod cart_item;
mod enums;
mod ids;
mod order;
mod product;
#[cfg(test)]
pub(crate) mod test_support;
mod transaction;
mod user;
mod vendor;

pub use cart_item::CartItem;
pub use enums::{
    Category, CoinSide, Fulfillment, OrderStatus, PaymentPhase, TransactionKind,
    TransactionStatus,
};
pub use ids::{
    CartLineId, FlipId, MessageId, OrderId, ProductId, SessionId, TierId, TransactionId,
};
pub use order::Order;
pub use product::{PriceTier, Product};
pub use transaction::Transaction;
pub use user::User;
pub use vendor::{Feedback, Vendor, VendorRank};
