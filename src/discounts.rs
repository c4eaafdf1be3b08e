//! Discounts
//!
//! Pure resolution of a product's displayed price against its optional,
//! quantity-gated offer. Callers may probe any non-negative quantity without
//! touching the cart, so product pages can show "would cost X if you buy N+"
//! previews with the same code path the cart uses.

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::catalog::{Offer, Product};

/// Errors specific to discount resolution.
#[derive(Debug, Error, PartialEq)]
pub enum DiscountError {
    /// A negative quantity was probed; quantities are counts of units.
    #[error("quantity {0} is negative")]
    NegativeQuantity(i64),

    /// The discounted amount could not be represented in minor units.
    #[error("discounted amount is not representable in minor units")]
    AmountOverflow,
}

/// A product's resolved display price at a given quantity.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedPrice {
    unit_price: Money<'static, Currency>,
    final_unit_price: Money<'static, Currency>,
    discount_applied: bool,
    discount_percent: u8,
}

impl ResolvedPrice {
    /// Undiscounted unit price.
    pub fn unit_price(&self) -> Money<'static, Currency> {
        self.unit_price
    }

    /// Unit price after any applied discount.
    pub fn final_unit_price(&self) -> Money<'static, Currency> {
        self.final_unit_price
    }

    /// Whether the offer's discount applied at the resolved quantity.
    pub fn discount_applied(&self) -> bool {
        self.discount_applied
    }

    /// The offer's discount percentage, or 0 when the product has no live
    /// offer. Reported even when the quantity does not yet qualify, so views
    /// can advertise the discount next to the full price.
    pub fn discount_percent(&self) -> u8 {
        self.discount_percent
    }

    /// Per-unit savings against the undiscounted price.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the subtraction operation fails.
    pub fn savings(&self) -> Result<Money<'static, Currency>, MoneyError> {
        self.unit_price.sub(self.final_unit_price)
    }
}

/// Resolve the display price of `product` at `quantity` units.
///
/// `offer` is the offer attached to the product, already looked up by the
/// caller; `None` covers both "no offer set" and "offer deleted from the
/// catalogue". A zero-percent offer is treated as no offer. The discount
/// applies only when `quantity` reaches the offer's minimum qualifying
/// quantity; quantity 0 is a valid probe and never qualifies.
///
/// # Errors
///
/// - [`DiscountError::NegativeQuantity`]: `quantity` was negative, which is a
///   caller bug rather than a shopper state.
/// - [`DiscountError::AmountOverflow`]: the discounted amount left the
///   representable minor-unit range.
pub fn resolve(
    product: &Product,
    offer: Option<&Offer>,
    quantity: i64,
) -> Result<ResolvedPrice, DiscountError> {
    if quantity < 0 {
        return Err(DiscountError::NegativeQuantity(quantity));
    }

    let unit_price = product.price;
    let offer = offer.filter(|offer| offer.discount_percent() > 0);
    let discount_percent = offer.map_or(0, Offer::discount_percent);

    let qualifies = offer.is_some_and(|offer| quantity >= i64::from(offer.min_quantity().get()));

    if !qualifies {
        return Ok(ResolvedPrice {
            unit_price,
            final_unit_price: unit_price,
            discount_applied: false,
            discount_percent,
        });
    }

    let final_minor = discounted_minor(unit_price.to_minor_units(), discount_percent)?;

    Ok(ResolvedPrice {
        unit_price,
        final_unit_price: Money::from_minor(final_minor, unit_price.currency()),
        discount_applied: true,
        discount_percent,
    })
}

/// Discounted unit price in minor units.
///
/// Rounds the final price (not the discount amount) half-up at minor-unit
/// precision, matching standard retail price display.
fn discounted_minor(minor: i64, percent: u8) -> Result<i64, DiscountError> {
    let remaining = Decimal::from(100 - i32::from(percent));

    let applied = Decimal::from(minor)
        .checked_mul(remaining)
        .and_then(|scaled| scaled.checked_div(Decimal::ONE_HUNDRED))
        .ok_or(DiscountError::AmountOverflow)?;

    applied
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(DiscountError::AmountOverflow)
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU32;

    use rusty_money::iso;
    use testresult::TestResult;

    use crate::catalog::{CategoryId, OfferError, OfferId, ProductId};

    use super::*;

    fn product(price_minor: i64, offer: Option<OfferId>) -> Product {
        Product {
            id: ProductId(1),
            name: "Camiseta Básica Blanca".to_string(),
            description: String::new(),
            price: Money::from_minor(price_minor, iso::EUR),
            category_id: CategoryId(1),
            offer_id: offer,
            sizes: Product::default_sizes(),
        }
    }

    fn offer(percent: u8, min_quantity: u32) -> Result<Offer, OfferError> {
        Offer::new(
            OfferId(1),
            "Promo",
            "promo",
            "",
            percent,
            NonZeroU32::new(min_quantity).unwrap_or(NonZeroU32::MIN),
        )
    }

    #[test]
    fn no_offer_keeps_unit_price_at_any_quantity() -> TestResult {
        let product = product(850, None);

        for quantity in [0, 1, 500] {
            let resolved = resolve(&product, None, quantity)?;

            assert_eq!(resolved.final_unit_price(), product.price);
            assert!(!resolved.discount_applied());
            assert_eq!(resolved.discount_percent(), 0);
        }

        Ok(())
    }

    #[test]
    fn twenty_percent_off_eight_fifty() -> TestResult {
        let product = product(850, Some(OfferId(1)));
        let offer = offer(20, 1)?;

        let resolved = resolve(&product, Some(&offer), 2)?;

        assert_eq!(resolved.final_unit_price(), Money::from_minor(680, iso::EUR));
        assert!(resolved.discount_applied());
        assert_eq!(resolved.discount_percent(), 20);
        assert_eq!(resolved.savings()?, Money::from_minor(170, iso::EUR));

        Ok(())
    }

    #[test]
    fn below_threshold_falls_back_to_unit_price() -> TestResult {
        let product = product(4500, Some(OfferId(1)));
        let offer = offer(25, 50)?;

        let resolved = resolve(&product, Some(&offer), 10)?;

        assert_eq!(
            resolved.final_unit_price(),
            Money::from_minor(4500, iso::EUR)
        );
        assert!(!resolved.discount_applied());
        // The percentage is still reported for "buy 50+" previews.
        assert_eq!(resolved.discount_percent(), 25);

        Ok(())
    }

    #[test]
    fn quantity_zero_is_a_valid_probe_that_never_qualifies() -> TestResult {
        let product = product(850, Some(OfferId(1)));
        let offer = offer(20, 1)?;

        let resolved = resolve(&product, Some(&offer), 0)?;

        assert!(!resolved.discount_applied());
        assert_eq!(resolved.final_unit_price(), product.price);

        Ok(())
    }

    #[test]
    fn negative_quantity_is_a_contract_violation() -> TestResult {
        let product = product(850, Some(OfferId(1)));
        let offer = offer(20, 1)?;

        let result = resolve(&product, Some(&offer), -1);

        assert_eq!(result, Err(DiscountError::NegativeQuantity(-1)));

        Ok(())
    }

    #[test]
    fn zero_percent_offer_is_treated_as_no_offer() -> TestResult {
        let product = product(850, Some(OfferId(1)));
        let offer = offer(0, 1)?;

        let resolved = resolve(&product, Some(&offer), 3)?;

        assert!(!resolved.discount_applied());
        assert_eq!(resolved.final_unit_price(), product.price);

        Ok(())
    }

    #[test]
    fn final_price_rounds_half_up() -> TestResult {
        // 1.05 at 10% off is 0.945, which displays as 0.95.
        let product = product(105, Some(OfferId(1)));
        let offer = offer(10, 1)?;

        let resolved = resolve(&product, Some(&offer), 1)?;

        assert_eq!(resolved.final_unit_price(), Money::from_minor(95, iso::EUR));

        Ok(())
    }

    #[test]
    fn full_discount_resolves_to_zero() -> TestResult {
        let product = product(850, Some(OfferId(1)));
        let offer = offer(100, 1)?;

        let resolved = resolve(&product, Some(&offer), 1)?;

        assert_eq!(resolved.final_unit_price(), Money::from_minor(0, iso::EUR));

        Ok(())
    }
}
