//! Telar prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{Cart, CartError, CartLine, LineKey, ParseLineKeyError},
    catalog::{
        Catalog, CatalogError, CatalogLookup, Category, CategoryId, NO_VARIANT, Offer, OfferError,
        OfferId, Product, ProductId, Variant,
    },
    checkout::{checkout, checkout_session},
    discounts::{DiscountError, ResolvedPrice, resolve},
    fixtures::{CatalogFixture, FixtureError},
    pricing::{PricedCart, PricedLine, PricingError, price_cart},
    sessions::{CartStore, MemoryCartStore, SessionId},
};
