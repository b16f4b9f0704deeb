//! Storefront configuration.
//!
//! Every section is optional in the TOML file; missing sections and fields
//! fall back to the defaults below. Decimal amounts are written as strings
//! (`service_rate = "0.03"`) so they parse without float rounding.

use core::time::Duration;
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::cart::{FeeSchedule, MergePolicy};
use crate::currency::DisplayCurrency;
use crate::error::{Result, StorefrontError};
use crate::lifecycle::LifecycleDelays;
use crate::messaging::Correspondent;
use crate::payment::PaymentDelays;

/// Top-level configuration.
///
/// # Examples
///
/// ```
/// use storefront_sim::config::StorefrontConfig;
///
/// let config = StorefrontConfig::from_toml_str(
///     r#"
///     [delays]
///     processing_secs = 1
///     "#,
/// )
/// .unwrap();
/// assert_eq!(config.delays.processing_secs, 1);
/// assert_eq!(config.delays.shipped_secs, 15);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct StorefrontConfig {
    /// Checkout fees.
    pub fees: FeeConfig,
    /// Wallet and coinflip settings.
    pub wallet: WalletConfig,
    /// Timer delays.
    pub delays: DelayConfig,
    /// Raffle round settings.
    pub raffle: RaffleConfig,
    /// Cart behaviour.
    pub cart: CartConfig,
    /// Sign-in settings.
    pub session: SessionConfig,
    /// Assistant service endpoint.
    pub assistant: AssistantConfig,
}

impl StorefrontConfig {
    /// Parses a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::Toml`] if the document is malformed and
    /// [`StorefrontError::Config`] if the values are inconsistent.
    #[inline]
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        let config: Self = toml::from_str(toml)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::Io`] if the file cannot be read, otherwise
    /// the errors of [`StorefrontConfig::from_toml_str`].
    #[inline]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "loading configuration");
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Rejects values the simulation cannot work with.
    fn validate(&self) -> Result<()> {
        if self.fees.service_rate.is_sign_negative() || self.fees.mixing_rate.is_sign_negative() {
            return Err(invalid("fee rates must not be negative"));
        }
        check_range(
            "network_fee",
            self.fees.network_fee_min,
            self.fees.network_fee_max,
        )?;
        check_range("deposit", self.wallet.deposit_min, self.wallet.deposit_max)?;
        if self.wallet.starting_balance.is_sign_negative() {
            return Err(invalid("starting_balance must not be negative"));
        }
        if self.wallet.payout_multiplier.is_sign_negative() {
            return Err(invalid("payout_multiplier must not be negative"));
        }
        if self.raffle.ticket_price <= Decimal::ZERO {
            return Err(invalid("ticket_price must be positive"));
        }
        if self.raffle.pot.is_sign_negative() {
            return Err(invalid("raffle pot must not be negative"));
        }
        if self.delays.processing_secs >= self.delays.shipped_secs {
            return Err(invalid("processing_secs must be less than shipped_secs"));
        }
        Ok(())
    }
}

/// Builds a [`StorefrontError::Config`].
fn invalid(reason: &str) -> StorefrontError {
    StorefrontError::Config(reason.to_owned())
}

/// Checks a random draw range: both bounds finite, non-negative and ordered.
fn check_range(name: &str, min: f64, max: f64) -> Result<()> {
    if !min.is_finite() || !max.is_finite() {
        return Err(StorefrontError::Config(format!("{name} bounds must be finite")));
    }
    if min < 0.0 || max < 0.0 {
        return Err(StorefrontError::Config(format!("{name} bounds must not be negative")));
    }
    if min > max {
        return Err(StorefrontError::Config(format!("{name}_min must not exceed {name}_max")));
    }
    Ok(())
}

/// Checkout fees.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FeeConfig {
    /// Service fee rate applied to the subtotal.
    pub service_rate: Decimal,
    /// Mixing fee rate applied to the subtotal when requested.
    pub mixing_rate: Decimal,
    /// Lower bound of the random network fee.
    pub network_fee_min: f64,
    /// Upper bound (exclusive) of the random network fee.
    pub network_fee_max: f64,
}

impl Default for FeeConfig {
    #[inline]
    fn default() -> Self {
        Self {
            service_rate: Decimal::new(3, 2),
            mixing_rate: Decimal::new(5, 2),
            network_fee_min: 2.0,
            network_fee_max: 7.0,
        }
    }
}

impl FeeConfig {
    /// The rates used by the cart quote.
    #[inline]
    #[must_use]
    pub const fn schedule(&self) -> FeeSchedule {
        FeeSchedule {
            service_rate: self.service_rate,
            mixing_rate: self.mixing_rate,
        }
    }
}

/// Wallet and coinflip settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    /// Balance a new storefront starts with.
    pub starting_balance: Decimal,
    /// Coinflip payout multiplier applied to a winning wager.
    pub payout_multiplier: Decimal,
    /// Lower bound of a simulated deposit.
    pub deposit_min: f64,
    /// Upper bound (exclusive) of a simulated deposit.
    pub deposit_max: f64,
}

impl Default for WalletConfig {
    #[inline]
    fn default() -> Self {
        Self {
            starting_balance: Decimal::new(250_050, 2),
            payout_multiplier: Decimal::new(19, 1),
            deposit_min: 50.0,
            deposit_max: 550.0,
        }
    }
}

/// Timer delays, in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DelayConfig {
    /// Order creation to `Processing`.
    pub processing_secs: u64,
    /// Order creation to `Shipped`.
    pub shipped_secs: u64,
    /// Payment sent to payment confirmed.
    pub detect_secs: u64,
    /// Payment confirmed to order created.
    pub confirm_secs: u64,
    /// Wager placed to coin landed.
    pub coinflip_secs: u64,
    /// Deposit scan started to deposit found.
    pub deposit_scan_secs: u64,
    /// Withdrawal requested to withdrawal completed.
    pub withdrawal_secs: u64,
    /// How long an unpaid checkout stays open.
    pub payment_window_secs: u64,
    /// Message sent to a vendor's reply, in milliseconds.
    pub vendor_reply_ms: u64,
    /// Message sent to support's reply, in milliseconds.
    pub support_reply_ms: u64,
}

impl Default for DelayConfig {
    #[inline]
    fn default() -> Self {
        Self {
            processing_secs: 5,
            shipped_secs: 15,
            detect_secs: 3,
            confirm_secs: 2,
            coinflip_secs: 2,
            deposit_scan_secs: 3,
            withdrawal_secs: 10,
            payment_window_secs: 900,
            vendor_reply_ms: 1_500,
            support_reply_ms: 1_000,
        }
    }
}

impl DelayConfig {
    /// Order lifecycle delays.
    #[inline]
    #[must_use]
    pub const fn lifecycle(&self) -> LifecycleDelays {
        LifecycleDelays {
            processing: Duration::from_secs(self.processing_secs),
            shipped: Duration::from_secs(self.shipped_secs),
        }
    }

    /// Checkout payment delays.
    #[inline]
    #[must_use]
    pub const fn payment(&self) -> PaymentDelays {
        PaymentDelays {
            detect: Duration::from_secs(self.detect_secs),
            confirm: Duration::from_secs(self.confirm_secs),
            window: Duration::from_secs(self.payment_window_secs),
        }
    }

    /// Coinflip resolution delay.
    #[inline]
    #[must_use]
    pub const fn coinflip(&self) -> Duration {
        Duration::from_secs(self.coinflip_secs)
    }

    /// Deposit scan delay.
    #[inline]
    #[must_use]
    pub const fn deposit_scan(&self) -> Duration {
        Duration::from_secs(self.deposit_scan_secs)
    }

    /// Withdrawal settlement delay.
    #[inline]
    #[must_use]
    pub const fn withdrawal(&self) -> Duration {
        Duration::from_secs(self.withdrawal_secs)
    }

    /// Delay before `with` replies to a message.
    #[inline]
    #[must_use]
    pub const fn reply(&self, with: &Correspondent) -> Duration {
        match *with {
            Correspondent::Vendor(_) => Duration::from_millis(self.vendor_reply_ms),
            Correspondent::Support => Duration::from_millis(self.support_reply_ms),
        }
    }
}

/// Raffle round settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RaffleConfig {
    /// Opening prize pot.
    pub pot: Decimal,
    /// Tickets already sold when the storefront starts.
    pub tickets_sold: u64,
    /// Price of a paid ticket.
    pub ticket_price: Decimal,
}

impl Default for RaffleConfig {
    #[inline]
    fn default() -> Self {
        Self {
            pot: Decimal::from(5_000),
            tickets_sold: 1_420,
            ticket_price: Decimal::from(5),
        }
    }
}

/// Cart behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct CartConfig {
    /// What re-adding a tier already in the cart does.
    pub merge_policy: MergePolicy,
}

/// Sign-in settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Usernames that receive admin rights on sign-in.
    pub admins: Vec<String>,
    /// Currency prices are shown in.
    pub currency: DisplayCurrency,
}

impl Default for SessionConfig {
    #[inline]
    fn default() -> Self {
        Self {
            admins: vec!["admin".to_owned()],
            currency: DisplayCurrency::Aud,
        }
    }
}

/// Assistant service endpoint and models.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    /// Base URL of the generative language API.
    pub base_url: String,
    /// Model for short text tasks.
    pub text_model: String,
    /// Model for chat, questions and image analysis.
    pub reasoning_model: String,
    /// Model for image generation.
    pub image_model: String,
    /// Model for image editing.
    pub edit_model: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for AssistantConfig {
    #[inline]
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".to_owned(),
            text_model: "gemini-2.5-flash".to_owned(),
            reasoning_model: "gemini-3-pro-preview".to_owned(),
            image_model: "gemini-3-pro-image-preview".to_owned(),
            edit_model: "gemini-2.5-flash-image".to_owned(),
            timeout_secs: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_simulation_constants() {
        let config = StorefrontConfig::default();
        assert_eq!(config.fees.service_rate, Decimal::new(3, 2));
        assert_eq!(config.wallet.starting_balance, Decimal::new(250_050, 2));
        assert_eq!(config.wallet.payout_multiplier, Decimal::new(19, 1));
        assert_eq!(config.delays.lifecycle(), LifecycleDelays::default());
        assert_eq!(config.delays.payment(), PaymentDelays::default());
        assert_eq!(config.raffle.tickets_sold, 1_420);
        assert_eq!(config.cart.merge_policy, MergePolicy::Merge);
        assert_eq!(config.session.admins, ["admin"]);
        assert_eq!(
            config.delays.reply(&Correspondent::Vendor("Alpha".to_owned())),
            Duration::from_millis(1_500)
        );
        assert_eq!(config.delays.reply(&Correspondent::Support), Duration::from_secs(1));
    }

    #[test]
    fn empty_document_is_default() {
        let config = StorefrontConfig::from_toml_str("").unwrap();
        assert_eq!(config, StorefrontConfig::default());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = StorefrontConfig::from_toml_str(
            r#"
            [fees]
            service_rate = "0.04"

            [cart]
            merge_policy = "append"

            [session]
            admins = ["root", "ops"]
            currency = "BTC"
            "#,
        )
        .unwrap();
        assert_eq!(config.fees.service_rate, Decimal::new(4, 2));
        assert_eq!(config.fees.mixing_rate, Decimal::new(5, 2));
        assert_eq!(config.cart.merge_policy, MergePolicy::Append);
        assert_eq!(config.session.admins, ["root", "ops"]);
        assert_eq!(config.session.currency, DisplayCurrency::Btc);
        assert_eq!(config.delays.shipped_secs, 15);
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        let err = StorefrontConfig::from_toml_str(
            r"
            [delays]
            processing_secs = 20
            ",
        )
        .unwrap_err();
        assert!(matches!(err, StorefrontError::Config(_)));
    }

    #[test]
    fn equal_lifecycle_delays_are_rejected() {
        let err = StorefrontConfig::from_toml_str(
            r"
            [delays]
            processing_secs = 15
            shipped_secs = 15
            ",
        )
        .unwrap_err();
        assert!(matches!(err, StorefrontError::Config(_)));
    }

    #[test]
    fn free_raffle_tickets_are_rejected() {
        for price in ["0", "-5"] {
            let toml = format!("[raffle]\nticket_price = \"{price}\"\n");
            let err = StorefrontConfig::from_toml_str(&toml).unwrap_err();
            assert!(matches!(err, StorefrontError::Config(_)), "{price}");
        }
    }

    #[test]
    fn negative_payout_multiplier_is_rejected() {
        let err = StorefrontConfig::from_toml_str(
            r#"
            [wallet]
            payout_multiplier = "-1.9"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, StorefrontError::Config(_)));
    }

    #[test]
    fn negative_network_fee_is_rejected() {
        let err = StorefrontConfig::from_toml_str(
            r"
            [fees]
            network_fee_min = -3.0
            ",
        )
        .unwrap_err();
        assert!(matches!(err, StorefrontError::Config(_)));
    }

    #[test]
    fn non_finite_deposit_bound_is_rejected() {
        let err = StorefrontConfig::from_toml_str(
            r"
            [wallet]
            deposit_max = inf
            ",
        )
        .unwrap_err();
        assert!(matches!(err, StorefrontError::Config(_)));

        let mut config = StorefrontConfig::default();
        config.wallet.deposit_min = f64::NAN;
        assert!(matches!(config.validate(), Err(StorefrontError::Config(_))));
    }

    #[test]
    fn malformed_toml_is_rejected() {
        let err = StorefrontConfig::from_toml_str("[fees").unwrap_err();
        assert!(matches!(err, StorefrontError::Toml(_)));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storefront.toml");
        std::fs::write(&path, "[raffle]\nticket_price = \"2.50\"\n").unwrap();
        let config = StorefrontConfig::load(&path).unwrap();
        assert_eq!(config.raffle.ticket_price, Decimal::new(250, 2));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = StorefrontConfig::load(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, StorefrontError::Io(_)));
    }
}
