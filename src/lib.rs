//! In-memory storefront simulation.
//!
//! The crate models a small marketplace entirely in process: a product
//! catalog with composable filters, a cart that aggregates tiers, a timed
//! checkout and order lifecycle, a simulated wallet with a coinflip game and
//! a daily raffle. Nothing is persisted and no real payment is made.
//!
//! [`Storefront`] is the entry point. It owns every store and applies timer
//! events one at a time:
//!
//! ```no_run
//! use storefront_sim::{Storefront, StorefrontBuilder, StorefrontEvent};
//! use storefront_sim::models::CoinSide;
//! use rust_decimal::Decimal;
//!
//! # async fn run() -> storefront_sim::Result<()> {
//! let mut store: Storefront = StorefrontBuilder::new().build();
//! let _flip = store.flip(Decimal::from(100), CoinSide::Heads)?;
//! if let Some(StorefrontEvent::FlipResolved(result)) = store.next_event().await {
//!     assert_eq!(result.balance, store.wallet().balance());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - `assistant` enables [`assistant::GeminiClient`], an HTTP client for a
//!   Gemini-style completion API.
//! - `cli` builds the `storefront` binary.

pub mod assistant;
pub mod cart;
pub mod config;
pub mod currency;
pub mod error;
pub mod filter;
pub mod lifecycle;
pub mod messaging;
pub mod models;
pub mod payment;
pub mod raffle;
pub mod random;
pub mod scheduler;
pub mod store;
pub mod storefront;
pub mod wallet;

pub use config::StorefrontConfig;
pub use currency::DisplayCurrency;
pub use error::{Result, StorefrontError};
pub use storefront::{
    CheckoutOptions, Storefront, StorefrontBuilder, StorefrontEvent, TimerScope, View,
};
