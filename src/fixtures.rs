//! Fixtures
//!
//! YAML-defined catalogue snapshots for tests, demos and seeding. Prices are
//! written as display strings (`"8.50"`) and parsed into exact minor units.

use std::str::FromStr;
use std::{fs, path::Path};

use rust_decimal::{Decimal, prelude::ToPrimitive};
use rusty_money::{
    Money,
    iso::{Currency, EUR, GBP, USD},
};
use serde::Deserialize;
use thiserror::Error;

use crate::catalog::{
    Catalog, CatalogLookup, Category, CategoryId, Offer, OfferError, OfferId, Product, ProductId,
    Variant,
};

/// Fixture parsing errors.
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String, #[source] rust_decimal::Error),

    /// Price with more than two decimal places, negative, or out of range
    #[error("Price not representable in minor units: {0}")]
    PriceOutOfRange(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// A product referenced a category missing from the fixture
    #[error("Unknown category: {0}")]
    UnknownCategory(CategoryId),

    /// A product referenced an offer missing from the fixture
    #[error("Unknown offer: {0}")]
    UnknownOffer(OfferId),

    /// Invalid offer definition
    #[error(transparent)]
    Offer(#[from] OfferError),
}

fn default_currency() -> String {
    "EUR".to_string()
}

fn default_min_quantity() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default = "default_currency")]
    currency: String,

    #[serde(default)]
    categories: Vec<CategoryEntry>,

    #[serde(default)]
    offers: Vec<OfferEntry>,

    #[serde(default)]
    products: Vec<ProductEntry>,
}

#[derive(Debug, Deserialize)]
struct CategoryEntry {
    id: u32,
    name: String,
    slug: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct OfferEntry {
    id: u32,
    name: String,
    slug: String,
    #[serde(default)]
    description: String,
    discount_percent: u8,
    #[serde(default = "default_min_quantity")]
    min_quantity: u32,
}

#[derive(Debug, Deserialize)]
struct ProductEntry {
    id: u32,
    name: String,
    #[serde(default)]
    description: String,
    price: String,
    category: u32,
    #[serde(default)]
    offer: Option<u32>,
    /// Omitted: the default garment size run. Present but empty: no variants.
    #[serde(default)]
    sizes: Option<Vec<String>>,
}

/// A catalogue snapshot loaded from a YAML fixture definition.
#[derive(Debug)]
pub struct CatalogFixture {
    catalog: Catalog,
    currency: &'static Currency,
}

impl CatalogFixture {
    /// Load a fixture from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns a [`FixtureError`] if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, FixtureError> {
        let contents = fs::read_to_string(path)?;

        Self::from_yaml(&contents)
    }

    /// Load a fixture from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns a [`FixtureError`] if the definition cannot be parsed or is
    /// internally inconsistent (unknown category or offer references,
    /// unparseable prices, out-of-range percentages).
    pub fn from_yaml(contents: &str) -> Result<Self, FixtureError> {
        let file: CatalogFile = serde_norway::from_str(contents)?;

        let currency = match file.currency.as_str() {
            "EUR" => EUR,
            "GBP" => GBP,
            "USD" => USD,
            other => return Err(FixtureError::UnknownCurrency(other.to_string())),
        };

        let mut catalog = Catalog::new();

        for entry in file.categories {
            catalog.insert_category(Category {
                id: CategoryId(entry.id),
                name: entry.name,
                slug: entry.slug,
                description: entry.description,
            });
        }

        for entry in file.offers {
            catalog.insert_offer(Offer::new(
                OfferId(entry.id),
                entry.name,
                entry.slug,
                entry.description,
                entry.discount_percent,
                std::num::NonZeroU32::new(entry.min_quantity)
                    .unwrap_or(std::num::NonZeroU32::MIN),
            )?);
        }

        for entry in file.products {
            let category_id = CategoryId(entry.category);
            if catalog.find_category(category_id).is_err() {
                return Err(FixtureError::UnknownCategory(category_id));
            }

            let offer_id = entry.offer.map(OfferId);
            if let Some(id) = offer_id.filter(|id| catalog.find_offer(*id).is_err()) {
                return Err(FixtureError::UnknownOffer(id));
            }

            let minor = parse_minor(&entry.price)?;
            let sizes = match entry.sizes {
                None => Product::default_sizes(),
                Some(labels) => labels.into_iter().map(Variant::Size).collect(),
            };

            catalog.insert_product(Product {
                id: ProductId(entry.id),
                name: entry.name,
                description: entry.description,
                price: Money::from_minor(minor, currency),
                category_id,
                offer_id,
                sizes,
            });
        }

        Ok(Self { catalog, currency })
    }

    /// The bundled storefront seed set under `fixtures/`.
    ///
    /// # Errors
    ///
    /// Returns a [`FixtureError`] if the bundled definition fails to parse,
    /// which would indicate a packaging defect.
    pub fn storefront() -> Result<Self, FixtureError> {
        Self::from_yaml(include_str!("../fixtures/storefront.yaml"))
    }

    /// The loaded catalogue.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Consume the fixture, keeping the catalogue.
    #[must_use]
    pub fn into_catalog(self) -> Catalog {
        self.catalog
    }

    /// The fixture set's currency.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}

/// Parse a display price such as `"8.50"` into exact minor units.
fn parse_minor(price: &str) -> Result<i64, FixtureError> {
    let amount = Decimal::from_str(price)
        .map_err(|err| FixtureError::InvalidPrice(price.to_string(), err))?;

    let minor = amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .ok_or_else(|| FixtureError::PriceOutOfRange(price.to_string()))?;

    if minor.fract() != Decimal::ZERO || minor.is_sign_negative() {
        return Err(FixtureError::PriceOutOfRange(price.to_string()));
    }

    minor
        .to_i64()
        .ok_or_else(|| FixtureError::PriceOutOfRange(price.to_string()))
}
