//! Newtype wrappers for entity identifiers.
//!
//! Products, tiers, cart lines, orders and ledger entries are all keyed by
//! strings; wrapping them keeps a cart line id from being passed where a
//! product id is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to define a newtype ID wrapping a `String`.
macro_rules! define_string_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier from the given string.
            #[inline]
            #[must_use]
            pub const fn new(value: String) -> Self {
                Self(value)
            }

            /// Generates a fresh random identifier (UUID v4).
            #[inline]
            #[must_use]
            pub fn generate() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            /// Returns a reference to the inner string.
            #[inline]
            #[must_use]
            pub fn as_inner(&self) -> &str {
                &self.0
            }

            /// Consumes the wrapper and returns the inner string.
            #[inline]
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            #[inline]
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<String> for $name {
            #[inline]
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            #[inline]
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }
    };
}

define_string_id! {
    /// Unique identifier for a catalog product.
    ProductId
}

define_string_id! {
    /// Identifier of a price tier, unique within its product.
    TierId
}

define_string_id! {
    /// Generated identifier of a single cart line.
    CartLineId
}

define_string_id! {
    /// Generated identifier of a placed order.
    OrderId
}

define_string_id! {
    /// Generated identifier of a wallet ledger entry.
    TransactionId
}

define_string_id! {
    /// Generated identifier of a checkout payment session.
    SessionId
}

define_string_id! {
    /// Generated identifier of a single coinflip wager.
    FlipId
}

define_string_id! {
    /// Generated identifier of a message in a thread.
    MessageId
}
