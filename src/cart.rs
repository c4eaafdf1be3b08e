//! Cart
//!
//! The shopper's selected line items for one session. Lines are identified by
//! the composite `(product, variant)` key; the same tee in two sizes is two
//! independent lines. Quantities are strictly positive: a mutation can never
//! leave a zero-quantity line behind, and deletion is always an explicit
//! [`Cart::remove`].

use std::fmt;
use std::str::FromStr;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::catalog::{ProductId, Variant};

/// Errors related to cart mutations.
#[derive(Debug, Error, PartialEq)]
pub enum CartError {
    /// Quantities are strictly positive; use [`Cart::remove`] to delete a line.
    #[error("quantity must be at least 1")]
    InvalidQuantity,

    /// The cart has no line for the given key.
    #[error("no cart line for {0}")]
    LineNotFound(LineKey),
}

/// Errors related to parsing a serialized line key.
#[derive(Debug, Error, PartialEq)]
pub enum ParseLineKeyError {
    /// The key had no `_` separating product id from variant label.
    #[error("line key {0:?} has no `_` separator")]
    MissingSeparator(String),

    /// The product id portion was not an integer.
    #[error("line key {0:?} has an invalid product id")]
    InvalidProductId(String),
}

/// Composite cart line identity: one product in one variant.
///
/// Serializes as `"{product_id}_{variant}"`, the stable, human-inspectable
/// form shared by every storage backend.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LineKey {
    product: ProductId,
    variant: Variant,
}

impl LineKey {
    /// Create a line key for a product in a variant.
    pub fn new(product: ProductId, variant: Variant) -> Self {
        Self { product, variant }
    }

    /// The product id.
    pub fn product(&self) -> ProductId {
        self.product
    }

    /// The variant.
    pub fn variant(&self) -> &Variant {
        &self.variant
    }

    /// The serialized composite key, e.g. `"12_XL"` or `"7_none"`.
    #[must_use]
    pub fn storage_key(&self) -> String {
        format!("{}_{}", self.product, self.variant)
    }
}

impl fmt::Display for LineKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.product, self.variant)
    }
}

impl FromStr for LineKey {
    type Err = ParseLineKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((id, label)) = s.split_once('_') else {
            return Err(ParseLineKeyError::MissingSeparator(s.to_string()));
        };

        let product = id
            .parse::<u32>()
            .map_err(|_err| ParseLineKeyError::InvalidProductId(s.to_string()))?;

        Ok(Self {
            product: ProductId(product),
            variant: Variant::from_label(label),
        })
    }
}

/// One `(product, variant)` pair and its quantity within a cart.
#[derive(Clone, Debug, PartialEq)]
pub struct CartLine {
    key: LineKey,
    quantity: u32,
}

impl CartLine {
    /// The line's composite key.
    pub fn key(&self) -> &LineKey {
        &self.key
    }

    /// The line's quantity, always at least 1.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }
}

/// A session-scoped cart: at most one line per `(product, variant)` key,
/// kept in insertion order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `delta` units of a product variant, merging into an existing line
    /// for the same key.
    ///
    /// Catalogue existence is deliberately not checked here; the caller
    /// validates against the catalogue before mutating the cart, keeping the
    /// store decoupled from the catalogue collaborator.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidQuantity`] if `delta` is 0.
    pub fn add(&mut self, key: LineKey, delta: u32) -> Result<(), CartError> {
        if delta == 0 {
            return Err(CartError::InvalidQuantity);
        }

        if let Some(line) = self.lines.iter_mut().find(|line| line.key == key) {
            line.quantity = line.quantity.saturating_add(delta);
        } else {
            self.lines.push(CartLine { key, quantity: delta });
        }

        Ok(())
    }

    /// Replace the stored quantity of an existing line.
    ///
    /// # Errors
    ///
    /// - [`CartError::InvalidQuantity`]: `quantity` is 0. Callers wanting an
    ///   empty line must call [`Cart::remove`] instead.
    /// - [`CartError::LineNotFound`]: no line exists for the key.
    pub fn set_quantity(&mut self, key: &LineKey, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }

        let line = self
            .lines
            .iter_mut()
            .find(|line| line.key == *key)
            .ok_or_else(|| CartError::LineNotFound(key.clone()))?;
        line.quantity = quantity;

        Ok(())
    }

    /// Delete the line for a key; absent keys are a no-op.
    pub fn remove(&mut self, key: &LineKey) {
        self.lines.retain(|line| line.key != *key);
    }

    /// The stored quantity for a key, if a line exists.
    pub fn quantity(&self, key: &LineKey) -> Option<u32> {
        self.lines
            .iter()
            .find(|line| line.key == *key)
            .map(|line| line.quantity)
    }

    /// All lines, in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// The number of lines in the cart.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Remove all lines.
    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

impl Serialize for Cart {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.lines.len()))?;

        for line in &self.lines {
            map.serialize_entry(&line.key.storage_key(), &line.quantity)?;
        }

        map.end()
    }
}

impl<'de> Deserialize<'de> for Cart {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CartVisitor;

        impl<'de> Visitor<'de> for CartVisitor {
            type Value = Cart;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a map of composite line keys to positive quantities")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Cart, A::Error> {
                let mut cart = Cart::new();

                while let Some((key, quantity)) = access.next_entry::<String, u32>()? {
                    let key = key.parse::<LineKey>().map_err(de::Error::custom)?;

                    // Repeated keys merge additively, mirroring `add`.
                    cart.add(key, quantity).map_err(de::Error::custom)?;
                }

                Ok(cart)
            }
        }

        deserializer.deserialize_map(CartVisitor)
    }
}
