//! Display currencies.
//!
//! Prices and balances are kept in whole Australian dollars. The crypto
//! currencies are only a presentation choice, converted at fixed simulated
//! exchange rates.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Currency prices are shown in.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DisplayCurrency {
    /// Australian dollars, the unit amounts are stored in.
    #[default]
    Aud,
    /// Bitcoin at 145 000 AUD.
    Btc,
    /// Monero at 245 AUD.
    Xmr,
}

impl DisplayCurrency {
    /// All currencies, in menu order.
    pub const ALL: [Self; 3] = [Self::Aud, Self::Btc, Self::Xmr];

    /// Ticker shown in menus.
    #[inline]
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Aud => "AUD",
            Self::Btc => "BTC",
            Self::Xmr => "XMR",
        }
    }

    /// AUD value of one unit of this currency.
    #[inline]
    #[must_use]
    pub fn rate(self) -> Decimal {
        match self {
            Self::Aud => Decimal::ONE,
            Self::Btc => Decimal::from(145_000),
            Self::Xmr => Decimal::from(245),
        }
    }

    /// Decimal places an amount is rounded to.
    #[inline]
    #[must_use]
    pub const fn scale(self) -> u32 {
        match self {
            Self::Aud => 2,
            Self::Btc => 6,
            Self::Xmr => 3,
        }
    }

    /// Converts an AUD amount, rounded to [`DisplayCurrency::scale`].
    ///
    /// # Examples
    ///
    /// ```
    /// use rust_decimal::Decimal;
    /// use storefront_sim::currency::DisplayCurrency;
    ///
    /// let btc = DisplayCurrency::Btc.convert(Decimal::from(290));
    /// assert_eq!(btc, Decimal::new(2_000, 6));
    /// ```
    #[inline]
    #[must_use]
    pub fn convert(self, aud: Decimal) -> Decimal {
        match self {
            Self::Aud => aud.round_dp(self.scale()),
            // Every rate is above one, so the quotient never overflows.
            Self::Btc | Self::Xmr => (aud / self.rate()).round_dp(self.scale()),
        }
    }

    /// Formats an AUD amount in this currency, e.g. `₿0.002000`.
    #[inline]
    #[must_use]
    pub fn format(self, aud: Decimal) -> String {
        let amount = self.convert(aud);
        match self {
            Self::Aud => format!("${amount}"),
            Self::Btc => format!("\u{20bf}{amount:.6}"),
            Self::Xmr => format!("XMR {amount:.3}"),
        }
    }

    /// Formats a whole-dollar tier price.
    #[inline]
    #[must_use]
    pub fn format_price(self, price: u64) -> String {
        self.format(Decimal::from(price))
    }
}

impl core::fmt::Display for DisplayCurrency {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

impl core::str::FromStr for DisplayCurrency {
    type Err = String;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|currency| currency.code().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown currency: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aud_prices_are_unchanged() {
        assert_eq!(DisplayCurrency::Aud.format_price(250), "$250");
        assert_eq!(DisplayCurrency::Aud.format(Decimal::new(250_050, 2)), "$2500.50");
    }

    #[test]
    fn btc_uses_six_places() {
        assert_eq!(DisplayCurrency::Btc.convert(Decimal::from(145_000)), Decimal::ONE);
        // 250 / 145000 = 0.0017241...
        assert_eq!(DisplayCurrency::Btc.format_price(250), "\u{20bf}0.001724");
    }

    #[test]
    fn xmr_uses_three_places() {
        // 450 / 245 = 1.83673...
        assert_eq!(DisplayCurrency::Xmr.convert(Decimal::from(450)), Decimal::new(1_837, 3));
        assert_eq!(DisplayCurrency::Xmr.format_price(490), "XMR 2.000");
    }

    #[test]
    fn parses_codes_case_insensitively() {
        assert_eq!("btc".parse::<DisplayCurrency>(), Ok(DisplayCurrency::Btc));
        assert_eq!("XMR".parse::<DisplayCurrency>(), Ok(DisplayCurrency::Xmr));
        assert!("eur".parse::<DisplayCurrency>().is_err());
    }

    #[test]
    fn serde_uses_uppercase_codes() {
        let json = serde_json::to_string(&DisplayCurrency::Xmr).unwrap();
        assert_eq!(json, r#""XMR""#);
    }
}
