//! Amounts in Tunisian dinar. The storefront prices everything in TND,
//! which has three minor-unit digits (millimes).

use rust_decimal::{Decimal, RoundingStrategy};
use rusty_money::iso;

/// Currency every price and total is expressed in.
pub fn currency() -> &'static iso::Currency {
    iso::TND
}

/// Rounds to the currency's minor unit, half away from zero.
pub fn round(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(currency().exponent, RoundingStrategy::MidpointAwayFromZero)
}

/// Formats the amount with exactly as many decimals as the currency uses, e.g. `35.000`.
pub fn format_amount(amount: Decimal) -> String {
    format!("{:.*}", currency().exponent as usize, round(amount))
}

/// Formats the amount followed by the ISO code, e.g. `35.000 TND`.
pub fn format_tnd(amount: Decimal) -> String {
    format!("{} {}", format_amount(amount), currency().iso_alpha_code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_pads_to_three_decimals() {
        assert_eq!(format_tnd(Decimal::new(35, 0)), "35.000 TND");
        assert_eq!(format_tnd(Decimal::new(425, 1)), "42.500 TND");
    }

    #[test]
    fn test_format_rounds_extra_precision() {
        assert_eq!(format_amount(Decimal::new(123_4567, 4)), "123.457");
    }

    #[test]
    fn test_midpoint_rounds_away_from_zero() {
        assert_eq!(format_amount(Decimal::new(10_0005, 4)), "10.001");
    }

    #[test]
    fn test_zero() {
        assert_eq!(format_tnd(Decimal::ZERO), "0.000 TND");
    }
}
