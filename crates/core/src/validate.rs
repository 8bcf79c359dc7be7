//! Stateless validation predicates.
//!
//! These are the rules every customer and product write is checked against.
//! They never fail loudly: each returns `false` for a rejected value and the
//! caller decides which error to surface.

use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

/// Permissive phone grammar.
///
/// Optional leading `+`, a 1-4 digit country code, an optional area code of
/// 1-3 digits (optionally parenthesized), then two groups of 3-4 digits.
/// Any component may be followed by one `-`, `.` or whitespace separator.
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\+?\d{1,4}[-.\s]?\(?\d{1,3}\)?[-.\s]?\d{3,4}[-.\s]?\d{3,4}$")
        .expect("Invalid regex")
});

/// Returns `true` if the phone is absent or matches the phone grammar.
///
/// `None`, the empty string and whitespace-only strings all count as absent.
///
/// ```
/// use crm_core::validate_phone;
///
/// assert!(validate_phone(None));
/// assert!(validate_phone(Some("")));
/// assert!(validate_phone(Some("+1234567890")));
/// assert!(validate_phone(Some("123-456-7890")));
/// assert!(!validate_phone(Some("12345")));
/// ```
#[must_use]
pub fn validate_phone(phone: Option<&str>) -> bool {
    match phone.map(str::trim) {
        None | Some("") => true,
        Some(phone) => PHONE_RE.is_match(phone),
    }
}

/// Largest storable price, the bound of a `NUMERIC(10,2)` column.
// 9_999_999_999 = 0x2_540B_E3FF, scale 2 (`Decimal::new` is not const).
pub const MAX_PRICE: Decimal = Decimal::from_parts(0x540B_E3FF, 2, 0, false, 2);

/// Returns `true` iff the price is strictly positive. Zero is invalid.
#[must_use]
pub fn validate_price(price: Decimal) -> bool {
    price > Decimal::ZERO
}

/// Returns `true` iff the stock level is non-negative.
#[must_use]
pub const fn validate_stock(stock: i32) -> bool {
    stock >= 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_phone_is_valid() {
        assert!(validate_phone(None));
        assert!(validate_phone(Some("")));
        assert!(validate_phone(Some("   ")));
    }

    #[test]
    fn test_common_phone_formats() {
        for phone in [
            "+1234567890",
            "123-456-7890",
            "555.123.4567",
            "555 123 4567",
            "+1 (555) 123-4567",
            "+44 20 7946 0958",
            "12345678",
        ] {
            assert!(validate_phone(Some(phone)), "expected {phone:?} to be valid");
        }
    }

    #[test]
    fn test_rejects_missing_digit_groups() {
        for phone in [
            "12345",
            "1234567",
            "123-45",
            "+1-555-123",
            "phone",
            "123--456-7890",
            "555-123-4567 ext 9",
            "++1234567890",
        ] {
            assert!(!validate_phone(Some(phone)), "expected {phone:?} to be invalid");
        }
    }

    #[test]
    fn test_price_boundaries() {
        assert!(!validate_price(Decimal::ZERO));
        assert!(!validate_price(Decimal::new(-1, 2)));
        assert!(validate_price(Decimal::new(1, 2)));
        assert!(validate_price(Decimal::new(99_999, 2)));
    }

    #[test]
    fn test_max_price_value() {
        assert_eq!(MAX_PRICE.to_string(), "99999999.99");
    }

    #[test]
    fn test_stock_boundaries() {
        assert!(validate_stock(0));
        assert!(validate_stock(25));
        assert!(!validate_stock(-1));
    }
}
