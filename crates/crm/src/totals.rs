//! Order total calculation.
//!
//! An order's `total_amount` is computed exactly once, when the order is
//! created, from the prices its products have at that moment. There is no
//! recomputation path: the stored total is the record of what was charged.

use std::collections::BTreeSet;

use rust_decimal::Decimal;

use crate::models::Product;

/// Largest storable order total, the bound of a `NUMERIC(12,2)` column.
// 999_999_999_999 = 232 * 2^32 + 0xD4A5_0FFF, scale 2 (`Decimal::new` is not const).
pub const MAX_ORDER_TOTAL: Decimal = Decimal::from_parts(0xD4A5_0FFF, 232, 0, false, 2);

/// Sum the prices of `products`, counting each product ID once.
///
/// Returns `None` if the sum overflows [`Decimal`].
///
/// ```
/// # use crm::models::Product;
/// # use crm::totals::order_total;
/// # use crm_core::ProductId;
/// # use rust_decimal::Decimal;
/// let laptop = Product { id: ProductId::new(1), name: "Laptop".into(), price: Decimal::new(1000, 2), stock: 1 };
/// let mouse = Product { id: ProductId::new(2), name: "Mouse".into(), price: Decimal::new(2500, 2), stock: 1 };
/// assert_eq!(order_total(&[laptop.clone(), mouse, laptop]), Some(Decimal::new(3500, 2)));
/// ```
#[must_use]
pub fn order_total(products: &[Product]) -> Option<Decimal> {
    let mut seen = BTreeSet::new();
    products
        .iter()
        .filter(|p| seen.insert(p.id))
        .try_fold(Decimal::ZERO, |total, p| total.checked_add(p.price))
}

#[cfg(test)]
mod tests {
    use crm_core::ProductId;

    use super::*;

    fn product(id: i32, cents: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            price: Decimal::new(cents, 2),
            stock: 0,
        }
    }

    #[test]
    fn test_total_is_exact_decimal_sum() {
        let total = order_total(&[product(1, 1000), product(2, 2500)]).unwrap_or_default();
        assert_eq!(total, Decimal::new(3500, 2));
        assert_eq!(total.to_string(), "35.00");
    }

    #[test]
    fn test_total_avoids_float_drift() {
        let total = order_total(&[product(1, 10), product(2, 20)]);
        assert_eq!(total, Some(Decimal::new(30, 2)));
    }

    #[test]
    fn test_duplicate_products_count_once() {
        let total = order_total(&[product(1, 999), product(1, 999)]);
        assert_eq!(total, Some(Decimal::new(999, 2)));
    }

    #[test]
    fn test_empty_total_is_zero() {
        assert_eq!(order_total(&[]), Some(Decimal::ZERO));
    }

    #[test]
    fn test_overflow_is_none() {
        let mut huge = product(1, 0);
        huge.price = Decimal::MAX;
        let mut other = huge.clone();
        other.id = ProductId::new(2);
        assert_eq!(order_total(&[huge, other]), None);
    }
}
