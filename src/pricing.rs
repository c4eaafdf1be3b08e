//! Pricing
//!
//! Joins cart lines with the catalogue and the discount resolver into a
//! priced, displayable cart view. The join is an explicit, field-by-field
//! construction of [`PricedLine`] records; a rendering layer never needs to
//! re-derive prices.

use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::{
    cart::{Cart, LineKey},
    catalog::CatalogLookup,
    discounts::{DiscountError, resolve},
};

/// Errors related to pricing a cart.
///
/// Catalogue drift is not an error: lines whose product vanished are dropped
/// from the view. Only arithmetic faults surface here.
#[derive(Debug, Error)]
pub enum PricingError {
    /// A line subtotal could not be represented in minor units.
    #[error("line subtotal is not representable in minor units")]
    AmountOverflow,

    /// Errors bubbled up from discount resolution.
    #[error(transparent)]
    Discount(#[from] DiscountError),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// A cart line enriched, at read time, with resolved pricing. Never persisted,
/// so it can never go stale relative to the catalogue.
#[derive(Clone, Debug)]
pub struct PricedLine {
    /// The line's composite key, for update/remove actions in the view
    pub key: LineKey,

    /// Product name at pricing time
    pub name: String,

    /// Units in the line
    pub quantity: u32,

    /// Undiscounted unit price
    pub unit_price: Money<'static, Currency>,

    /// Unit price after any applied discount
    pub final_unit_price: Money<'static, Currency>,

    /// Whether the offer's discount applied at this quantity
    pub discount_applied: bool,

    /// The offer's discount percentage, 0 when the product has no live offer
    pub discount_percent: u8,

    /// `final_unit_price` times `quantity`
    pub subtotal: Money<'static, Currency>,
}

/// A fully priced cart view: the sole contract the rendering layer needs.
#[derive(Debug)]
pub struct PricedCart {
    lines: Vec<PricedLine>,
    subtotal: Money<'static, Currency>,
    grand_total: Money<'static, Currency>,
}

impl PricedCart {
    /// The priced lines, in cart order.
    pub fn lines(&self) -> &[PricedLine] {
        &self.lines
    }

    /// Total before any discount applications.
    pub fn subtotal(&self) -> Money<'static, Currency> {
        self.subtotal
    }

    /// Total payable across all retained lines.
    pub fn grand_total(&self) -> Money<'static, Currency> {
        self.grand_total
    }

    /// Savings made by applied discounts.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the subtraction operation fails.
    pub fn savings(&self) -> Result<Money<'static, Currency>, MoneyError> {
        self.subtotal.sub(self.grand_total)
    }

    /// The number of priced lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the priced view is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Price every cart line against a catalogue snapshot.
///
/// Pure in its inputs: the same cart and catalogue snapshot always produce
/// the same view. Lines referencing a product that no longer exists are
/// silently dropped from the view; the stored cart is left untouched, so a
/// stale reference never crashes rendering and purging remains an explicit,
/// separate decision. A dangling offer reference prices as undiscounted.
///
/// Subtotals stay in exact minor units, so the grand total is a single exact
/// sum with no per-line rounding drift beyond the resolver's half-up rounding
/// of each unit price.
///
/// # Errors
///
/// - [`PricingError::AmountOverflow`]: a line subtotal left the representable
///   minor-unit range.
/// - [`PricingError::Money`]: money arithmetic failed, for example a currency
///   mismatch between catalogue entries.
pub fn price_cart<C: CatalogLookup>(
    cart: &Cart,
    catalog: &C,
    currency: &'static Currency,
) -> Result<PricedCart, PricingError> {
    let mut lines = Vec::with_capacity(cart.len());
    let mut subtotal = Money::from_minor(0, currency);
    let mut grand_total = Money::from_minor(0, currency);

    for line in cart.lines() {
        let Ok(product) = catalog.find_product(line.key().product()) else {
            // Deleted from the catalogue after being added to the cart.
            continue;
        };

        let offer = product.offer_id.and_then(|id| catalog.find_offer(id).ok());
        let resolved = resolve(product, offer, i64::from(line.quantity()))?;

        let quantity = i64::from(line.quantity());
        let line_subtotal = scale(resolved.final_unit_price(), quantity)?;
        let undiscounted = scale(resolved.unit_price(), quantity)?;

        subtotal = subtotal.add(undiscounted)?;
        grand_total = grand_total.add(line_subtotal)?;

        lines.push(PricedLine {
            key: line.key().clone(),
            name: product.name.clone(),
            quantity: line.quantity(),
            unit_price: resolved.unit_price(),
            final_unit_price: resolved.final_unit_price(),
            discount_applied: resolved.discount_applied(),
            discount_percent: resolved.discount_percent(),
            subtotal: line_subtotal,
        });
    }

    Ok(PricedCart {
        lines,
        subtotal,
        grand_total,
    })
}

/// Multiply a unit price by a quantity in exact minor units.
fn scale(
    unit: Money<'static, Currency>,
    quantity: i64,
) -> Result<Money<'static, Currency>, PricingError> {
    let minor = unit
        .to_minor_units()
        .checked_mul(quantity)
        .ok_or(PricingError::AmountOverflow)?;

    Ok(Money::from_minor(minor, unit.currency()))
}
