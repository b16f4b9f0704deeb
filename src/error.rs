//! Error types for the storefront simulation.

use rust_decimal::Decimal;

use crate::models::{OrderId, OrderStatus, PaymentPhase, ProductId, TierId, TransactionId};

/// All errors that can occur when driving the storefront.
#[derive(Debug, thiserror::Error)]
pub enum StorefrontError {
    /// A debit was requested that exceeds the wallet balance.
    ///
    /// The operation is rejected before any state is touched.
    #[error("insufficient funds: {required} required, {available} available")]
    InsufficientFunds {
        /// Amount the operation needed.
        required: Decimal,
        /// Balance at the time of the request.
        available: Decimal,
    },

    /// A monetary amount was zero or negative where a positive value is needed.
    #[error("amount must be positive, got {0}")]
    InvalidAmount(Decimal),

    /// Crediting the amount would push the balance past the largest
    /// representable value.
    #[error("crediting {0} would overflow the balance")]
    BalanceOverflow(Decimal),

    /// A listing failed validation in the editor.
    #[error("invalid listing: {0}")]
    InvalidListing(String),

    /// A message had no text.
    #[error("message must not be empty")]
    EmptyMessage,

    /// A username was empty or otherwise unusable.
    #[error("invalid username")]
    InvalidUsername,

    /// No product exists with the given identifier.
    #[error("product not found: {0}")]
    ProductNotFound(ProductId),

    /// The product exists but has no tier with the given identifier.
    #[error("tier {tier} not found on product {product}")]
    TierNotFound {
        /// Product that was searched.
        product: ProductId,
        /// Missing tier identifier.
        tier: TierId,
    },

    /// No order exists with the given identifier.
    #[error("order not found: {0}")]
    OrderNotFound(OrderId),

    /// An order status change would move backwards or leave a terminal state.
    #[error("order {order} cannot move from {from} to {to}")]
    InvalidTransition {
        /// Order being advanced.
        order: OrderId,
        /// Current status.
        from: OrderStatus,
        /// Requested status.
        to: OrderStatus,
    },

    /// No ledger entry exists with the given identifier.
    #[error("transaction not found: {0}")]
    TransactionNotFound(TransactionId),

    /// The ledger entry was already completed and is immutable.
    #[error("transaction {0} is already completed")]
    TransactionCompleted(TransactionId),

    /// Checkout was requested with nothing in the cart.
    #[error("cart is empty")]
    EmptyCart,

    /// A checkout session is already open.
    #[error("a checkout session is already in progress")]
    CheckoutInProgress,

    /// A payment action was requested without an open checkout session.
    #[error("no checkout session is open")]
    NoCheckoutSession,

    /// The payment session is not in a phase that accepts the action.
    #[error("payment session is {0}, expected waiting")]
    PaymentNotWaiting(PaymentPhase),

    /// A coinflip is already awaiting resolution.
    #[error("a coinflip is already in progress")]
    FlipInProgress,

    /// The current session may not perform the action.
    #[error("operation requires an admin session")]
    Unauthorized,

    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(String),

    /// Reading a configuration file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML configuration could not be parsed.
    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The HTTP request to the assistant service failed.
    #[cfg(feature = "assistant")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The assistant client was built without an API key.
    #[error("assistant API key is not set")]
    MissingApiKey,

    /// The assistant service returned a non-success status.
    #[error("API error (status {status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body or reason.
        message: String,
    },

    /// The assistant service returned a response without usable content.
    #[error("empty response from assistant service")]
    EmptyResponse,

    /// Inline binary data from the assistant service was not valid base64.
    #[cfg(feature = "assistant")]
    #[error("base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Convenience alias used across the crate.
pub type Result<T> = core::result::Result<T, StorefrontError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_funds_display() {
        let err = StorefrontError::InsufficientFunds {
            required: Decimal::new(300, 0),
            available: Decimal::new(12_550, 2),
        };
        let msg = err.to_string();
        assert!(msg.contains("insufficient funds"));
        assert!(msg.contains("300"));
        assert!(msg.contains("125.50"));
    }

    #[test]
    fn invalid_transition_display() {
        let err = StorefrontError::InvalidTransition {
            order: OrderId::new("o-1".to_owned()),
            from: OrderStatus::Shipped,
            to: OrderStatus::Processing,
        };
        assert_eq!(
            err.to_string(),
            "order o-1 cannot move from Shipped to Processing"
        );
    }

    #[test]
    fn error_from_serde_json() {
        let serde_err = serde_json::from_str::<String>("not json").unwrap_err();
        let err = StorefrontError::from(serde_err);
        assert!(matches!(err, StorefrontError::Serialization(_)));
        assert!(err.to_string().contains("serialization error"));
    }

    #[test]
    fn error_from_toml() {
        let toml_err = toml::from_str::<toml::Table>("= broken").unwrap_err();
        let err = StorefrontError::from(toml_err);
        assert!(matches!(err, StorefrontError::Toml(_)));
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<StorefrontError>();
    }
}
