//! Telar
//!
//! Telar is the cart and pricing core of an online storefront for
//! customizable apparel: immutable catalogue snapshots, quantity-gated
//! percentage offers, session-scoped carts keyed by `(product, variant)`,
//! and pure aggregation of cart lines into a priced, displayable view.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod discounts;
pub mod fixtures;
pub mod prelude;
pub mod pricing;
pub mod sessions;
