//! Basket valuation in integer minor units.

use thiserror::Error;

use crate::models::BasketProduct;

/// Errors that can occur while valuing basket lines.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PricingError {
    /// A line or running total left the `i64` range.
    #[error("amount overflow while pricing product {product_id}")]
    Overflow { product_id: uuid::Uuid },

    /// A line carried a quantity below one.
    #[error("invalid quantity {quantity} for product {product_id}")]
    InvalidQuantity {
        product_id: uuid::Uuid,
        quantity: i32,
    },
}

/// Price of a single line: `price × quantity`.
pub fn line_total(line: &BasketProduct) -> Result<i64, PricingError> {
    if line.quantity < 1 {
        return Err(PricingError::InvalidQuantity {
            product_id: line.product_id,
            quantity: line.quantity,
        });
    }

    line.price
        .checked_mul(i64::from(line.quantity))
        .ok_or(PricingError::Overflow {
            product_id: line.product_id,
        })
}

/// Sum of all line totals; zero for an empty basket.
pub fn basket_total(lines: &[BasketProduct]) -> Result<i64, PricingError> {
    lines.iter().try_fold(0_i64, |acc, line| {
        acc.checked_add(line_total(line)?)
            .ok_or(PricingError::Overflow {
                product_id: line.product_id,
            })
    })
}

/// Renders minor units as a two-decimal string, e.g. `2750` as `"27.50"`.
pub fn format_minor_units(amount: i64) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    let abs = amount.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;

    fn line(price: i64, quantity: i32) -> BasketProduct {
        BasketProduct {
            basket_id: Uuid::nil(),
            product_id: Uuid::new_v4(),
            quantity,
            price,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn empty_basket_totals_zero() {
        assert_eq!(basket_total(&[]), Ok(0));
    }

    #[test]
    fn totals_are_exact_in_minor_units() {
        assert_eq!(basket_total(&[line(1999, 3)]), Ok(5997));
        assert_eq!(format_minor_units(5997), "59.97");

        let lines = [line(1000, 2), line(250, 3)];
        assert_eq!(basket_total(&lines), Ok(2750));
        assert_eq!(format_minor_units(2750), "27.50");
    }

    #[test]
    fn many_small_lines_do_not_drift() {
        let lines: Vec<_> = (0..1000).map(|_| line(10, 1)).collect();
        assert_eq!(basket_total(&lines), Ok(10_000));
        assert_eq!(format_minor_units(10_000), "100.00");
    }

    #[test]
    fn overflow_is_reported() {
        let big = line(i64::MAX, 2);
        assert!(matches!(
            line_total(&big),
            Err(PricingError::Overflow { .. })
        ));

        let lines = [line(i64::MAX, 1), line(1, 1)];
        assert!(matches!(
            basket_total(&lines),
            Err(PricingError::Overflow { .. })
        ));
    }

    #[test]
    fn zero_quantity_is_rejected() {
        assert!(matches!(
            line_total(&line(100, 0)),
            Err(PricingError::InvalidQuantity { quantity: 0, .. })
        ));
    }

    #[test]
    fn formats_small_and_negative_amounts() {
        assert_eq!(format_minor_units(0), "0.00");
        assert_eq!(format_minor_units(5), "0.05");
        assert_eq!(format_minor_units(-150), "-1.50");
    }
}
