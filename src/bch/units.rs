//! Satoshi and token quantity conversions
//!
//! Amounts are accumulated as integers and only converted to decimal values
//! at the edges (wallet document fields and console output).

use crate::error::WalletError;

pub const SATS_PER_BCH: i64 = 100_000_000;

/// SLP allows at most 9 decimal places
pub const MAX_TOKEN_DECIMALS: u8 = 9;

pub fn sats_to_bch(sats: i64) -> f64 {
    sats as f64 / SATS_PER_BCH as f64
}

pub fn bch_to_sats(bch: f64) -> i64 {
    (bch * SATS_PER_BCH as f64).round() as i64
}

fn scale(decimals: u8) -> Result<u64, WalletError> {
    if decimals > MAX_TOKEN_DECIMALS {
        return Err(WalletError::InvalidInput(format!(
            "Token decimals must be {} or less, got {}",
            MAX_TOKEN_DECIMALS, decimals
        )));
    }
    Ok(10u64.pow(decimals as u32))
}

/// Parse a display quantity such as `"983.6"` into token base units.
pub fn parse_token_qty(qty: &str, decimals: u8) -> Result<u64, WalletError> {
    let qty = qty.trim();
    let invalid = || WalletError::InvalidInput(format!("Invalid token quantity: '{}'", qty));

    let (whole, fraction) = match qty.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (qty, ""),
    };
    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid());
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit())
    {
        return Err(invalid());
    }

    let significant = fraction.trim_end_matches('0');
    if significant.len() > decimals as usize {
        return Err(WalletError::InvalidInput(format!(
            "Token quantity '{}' has more than {} decimal places",
            qty, decimals
        )));
    }

    let multiplier = scale(decimals)?;
    let whole_units = if whole.is_empty() {
        0
    } else {
        whole.parse::<u64>().map_err(|_| invalid())?
    };
    let fraction_units = if significant.is_empty() {
        0
    } else {
        let padded = format!("{:0<width$}", significant, width = decimals as usize);
        padded.parse::<u64>().map_err(|_| invalid())?
    };

    whole_units
        .checked_mul(multiplier)
        .and_then(|units| units.checked_add(fraction_units))
        .ok_or_else(invalid)
}

/// Render token base units back into a display quantity
pub fn format_token_qty(units: u64, decimals: u8) -> String {
    let decimals = decimals.min(MAX_TOKEN_DECIMALS);
    let multiplier = 10u64.pow(decimals as u32);
    let whole = units / multiplier;
    let fraction = units % multiplier;

    if fraction == 0 {
        return whole.to_string();
    }
    let fraction = format!("{:0>width$}", fraction, width = decimals as usize);
    format!("{}.{}", whole, fraction.trim_end_matches('0'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sats_round_trip() {
        for sats in [0i64, 1, 546, 1_035_950, 2_100_000_000_000_000, -2500] {
            assert_eq!(bch_to_sats(sats_to_bch(sats)), sats);
        }
        assert_eq!(sats_to_bch(1_035_950), 0.0103595);
    }

    #[test]
    fn test_parse_token_qty() {
        assert_eq!(parse_token_qty("983.6", 8).unwrap(), 98_360_000_000);
        assert_eq!(parse_token_qty("1", 0).unwrap(), 1);
        assert_eq!(parse_token_qty("0.5", 2).unwrap(), 50);
        assert_eq!(parse_token_qty(".25", 2).unwrap(), 25);
        assert_eq!(parse_token_qty("10.500", 1).unwrap(), 105);
    }

    #[test]
    fn test_parse_token_qty_rejects_bad_input() {
        assert!(parse_token_qty("", 2).is_err());
        assert!(parse_token_qty("1.234", 2).is_err());
        assert!(parse_token_qty("-1", 2).is_err());
        assert!(parse_token_qty("1e5", 2).is_err());
        assert!(parse_token_qty("1", 10).is_err());
    }

    #[test]
    fn test_format_token_qty() {
        assert_eq!(format_token_qty(98_360_000_000, 8), "983.6");
        assert_eq!(format_token_qty(100, 0), "100");
        assert_eq!(format_token_qty(5, 3), "0.005");
    }
}
