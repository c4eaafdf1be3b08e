//! Catalog
//!
//! Read-only snapshots of the storefront catalogue: products, categories and
//! offers, indexed by their stable external ids. The cart never mutates
//! catalogue data; it only looks it up through [`CatalogLookup`].

use std::fmt;
use std::num::NonZeroU32;

use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use smallvec::{SmallVec, smallvec};
use thiserror::Error;

/// Label used for the missing variant axis, both in memory and on the wire.
pub const NO_VARIANT: &str = "none";

/// Stable external product id.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub u32);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ProductId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// Stable external offer id.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OfferId(pub u32);

impl fmt::Display for OfferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for OfferId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// Stable external category id.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(pub u32);

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for CategoryId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// A selectable product attribute (here, garment size).
///
/// Variants partition cart identity independently of the base product: the
/// same tee in `M` and `L` is two distinct cart lines. Products without a
/// variant axis use [`Variant::None`], rendered as [`NO_VARIANT`] on the wire.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Variant {
    /// The product has no variant axis.
    None,

    /// A size label such as `S`, `M` or `XL`.
    Size(String),
}

impl Variant {
    /// Create a size variant from a label.
    pub fn size(label: impl Into<String>) -> Self {
        Self::Size(label.into())
    }

    /// Parse a wire label; [`NO_VARIANT`] maps back to [`Variant::None`].
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        if label == NO_VARIANT {
            Self::None
        } else {
            Self::Size(label.to_string())
        }
    }

    /// The wire label of the variant.
    pub fn label(&self) -> &str {
        match self {
            Self::None => NO_VARIANT,
            Self::Size(label) => label,
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A product category.
#[derive(Clone, Debug)]
pub struct Category {
    /// Category id
    pub id: CategoryId,

    /// Category name
    pub name: String,

    /// URL-friendly version of the name
    pub slug: String,

    /// Category description
    pub description: String,
}

/// Errors related to offer construction.
#[derive(Debug, Error, PartialEq)]
pub enum OfferError {
    /// The discount percentage exceeded 100.
    #[error("discount percentage {0} is greater than 100")]
    PercentOutOfRange(u8),
}

/// A discount rule attachable to zero or more products.
///
/// The discount applies only once a cart line reaches the offer's minimum
/// qualifying quantity.
#[derive(Clone, Debug)]
pub struct Offer {
    id: OfferId,
    name: String,
    slug: String,
    description: String,
    discount_percent: u8,
    min_quantity: NonZeroU32,
}

impl Offer {
    /// Create a new offer.
    ///
    /// # Errors
    ///
    /// Returns [`OfferError::PercentOutOfRange`] if `discount_percent`
    /// exceeds 100.
    pub fn new(
        id: OfferId,
        name: impl Into<String>,
        slug: impl Into<String>,
        description: impl Into<String>,
        discount_percent: u8,
        min_quantity: NonZeroU32,
    ) -> Result<Self, OfferError> {
        if discount_percent > 100 {
            return Err(OfferError::PercentOutOfRange(discount_percent));
        }

        Ok(Self {
            id,
            name: name.into(),
            slug: slug.into(),
            description: description.into(),
            discount_percent,
            min_quantity,
        })
    }

    /// Offer id.
    pub fn id(&self) -> OfferId {
        self.id
    }

    /// Offer name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// URL-friendly version of the name.
    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// Offer description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Discount percentage, between 0 and 100.
    pub fn discount_percent(&self) -> u8 {
        self.discount_percent
    }

    /// Minimum cart line quantity for the discount to apply.
    pub fn min_quantity(&self) -> NonZeroU32 {
        self.min_quantity
    }
}

/// An immutable product snapshot.
#[derive(Clone, Debug)]
pub struct Product {
    /// Product id
    pub id: ProductId,

    /// Product name
    pub name: String,

    /// Product description
    pub description: String,

    /// Undiscounted unit price
    pub price: Money<'static, Currency>,

    /// Category the product belongs to
    pub category_id: CategoryId,

    /// Offer attached to the product, if any (at most one)
    pub offer_id: Option<OfferId>,

    /// Available size run; empty means the product has no variant axis
    pub sizes: SmallVec<[Variant; 6]>,
}

impl Product {
    /// The size run assigned to new garments by default.
    #[must_use]
    pub fn default_sizes() -> SmallVec<[Variant; 6]> {
        smallvec![
            Variant::size("S"),
            Variant::size("M"),
            Variant::size("L"),
            Variant::size("XL"),
        ]
    }

    /// Whether the product has a variant axis at all.
    pub fn has_variants(&self) -> bool {
        !self.sizes.is_empty()
    }

    /// Whether the product carries the given variant.
    ///
    /// A product without a variant axis carries only [`Variant::None`].
    pub fn carries(&self, variant: &Variant) -> bool {
        if self.sizes.is_empty() {
            *variant == Variant::None
        } else {
            self.sizes.contains(variant)
        }
    }
}

/// Errors related to catalogue lookups.
#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    /// No product exists with the given id.
    #[error("product {0} not found")]
    ProductNotFound(ProductId),

    /// No offer exists with the given id.
    #[error("offer {0} not found")]
    OfferNotFound(OfferId),

    /// No category exists with the given id.
    #[error("category {0} not found")]
    CategoryNotFound(CategoryId),
}

/// Read-only lookup seam between the cart core and the catalogue collaborator.
pub trait CatalogLookup {
    /// Find a product by id.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::ProductNotFound`] if the product is missing.
    fn find_product(&self, id: ProductId) -> Result<&Product, CatalogError>;

    /// Find an offer by id.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::OfferNotFound`] if the offer is missing.
    fn find_offer(&self, id: OfferId) -> Result<&Offer, CatalogError>;
}

/// In-memory catalogue index.
#[derive(Debug, Default)]
pub struct Catalog {
    products: FxHashMap<ProductId, Product>,
    offers: FxHashMap<OfferId, Offer>,
    categories: FxHashMap<CategoryId, Category>,
}

impl Catalog {
    /// Create an empty catalogue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a product.
    pub fn insert_product(&mut self, product: Product) {
        self.products.insert(product.id, product);
    }

    /// Insert or replace an offer.
    pub fn insert_offer(&mut self, offer: Offer) {
        self.offers.insert(offer.id(), offer);
    }

    /// Insert or replace a category.
    pub fn insert_category(&mut self, category: Category) {
        self.categories.insert(category.id, category);
    }

    /// Find a category by id.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::CategoryNotFound`] if the category is missing.
    pub fn find_category(&self, id: CategoryId) -> Result<&Category, CatalogError> {
        self.categories
            .get(&id)
            .ok_or(CatalogError::CategoryNotFound(id))
    }

    /// The offer attached to a product, if one is set and still exists.
    ///
    /// An unset or dangling offer reference resolves to `None`; pricing then
    /// falls back to the undiscounted unit price.
    pub fn offer_for(&self, product: &Product) -> Option<&Offer> {
        product.offer_id.and_then(|id| self.offers.get(&id))
    }

    /// Iterate over all products, in no particular order.
    pub fn products(&self) -> impl Iterator<Item = &Product> {
        self.products.values()
    }

    /// Products whose name contains the search term, case-insensitively,
    /// ordered by product id.
    pub fn search(&self, term: &str) -> Vec<&Product> {
        let term = term.to_lowercase();
        let mut matches: Vec<&Product> = self
            .products
            .values()
            .filter(|product| product.name.to_lowercase().contains(&term))
            .collect();
        matches.sort_by_key(|product| product.id);

        matches
    }

    /// Products with an offer attached, ordered by product id.
    pub fn on_sale(&self) -> Vec<&Product> {
        let mut matches: Vec<&Product> = self
            .products
            .values()
            .filter(|product| product.offer_id.is_some())
            .collect();
        matches.sort_by_key(|product| product.id);

        matches
    }

    /// Products in the given category, ordered by product id.
    pub fn in_category(&self, id: CategoryId) -> Vec<&Product> {
        let mut matches: Vec<&Product> = self
            .products
            .values()
            .filter(|product| product.category_id == id)
            .collect();
        matches.sort_by_key(|product| product.id);

        matches
    }
}

impl CatalogLookup for Catalog {
    fn find_product(&self, id: ProductId) -> Result<&Product, CatalogError> {
        self.products.get(&id).ok_or(CatalogError::ProductNotFound(id))
    }

    fn find_offer(&self, id: OfferId) -> Result<&Offer, CatalogError> {
        self.offers.get(&id).ok_or(CatalogError::OfferNotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso;
    use testresult::TestResult;

    use super::*;

    fn tee(id: u32, name: &str, offer: Option<u32>) -> Product {
        Product {
            id: ProductId(id),
            name: name.to_string(),
            description: String::new(),
            price: Money::from_minor(850, iso::EUR),
            category_id: CategoryId(1),
            offer_id: offer.map(OfferId),
            sizes: Product::default_sizes(),
        }
    }

    #[test]
    fn offer_rejects_percent_over_100() {
        let result = Offer::new(
            OfferId(1),
            "Bad",
            "bad",
            "",
            101,
            NonZeroU32::MIN,
        );

        assert!(matches!(result, Err(OfferError::PercentOutOfRange(101))));
    }

    #[test]
    fn find_product_missing_returns_error() {
        let catalog = Catalog::new();

        let err = catalog.find_product(ProductId(9)).err();

        assert_eq!(err, Some(CatalogError::ProductNotFound(ProductId(9))));
    }

    #[test]
    fn offer_for_dangling_reference_is_none() {
        let mut catalog = Catalog::new();
        catalog.insert_product(tee(1, "Camiseta Blanca", Some(7)));

        let product = catalog.find_product(ProductId(1)).ok();

        assert!(product.is_some_and(|p| catalog.offer_for(p).is_none()));
    }

    #[test]
    fn search_is_case_insensitive_and_ordered() {
        let mut catalog = Catalog::new();
        catalog.insert_product(tee(2, "Camiseta Negra", None));
        catalog.insert_product(tee(1, "Camiseta Blanca", None));
        catalog.insert_product(tee(3, "Polo Corporativo", None));

        let matches = catalog.search("camiseta");

        let ids: Vec<ProductId> = matches.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![ProductId(1), ProductId(2)]);
    }

    #[test]
    fn on_sale_keeps_only_products_with_offers() -> TestResult {
        let mut catalog = Catalog::new();
        catalog.insert_offer(Offer::new(
            OfferId(1),
            "Promo",
            "promo",
            "",
            15,
            NonZeroU32::MIN,
        )?);
        catalog.insert_product(tee(1, "Camiseta Blanca", Some(1)));
        catalog.insert_product(tee(2, "Camiseta Negra", None));

        let on_sale = catalog.on_sale();

        let ids: Vec<ProductId> = on_sale.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![ProductId(1)]);

        Ok(())
    }

    #[test]
    fn carries_uses_sentinel_for_products_without_sizes() {
        let mut plain = tee(1, "Bolsa de Tela", None);
        plain.sizes.clear();

        assert!(plain.carries(&Variant::None));
        assert!(!plain.carries(&Variant::size("M")));
    }

    #[test]
    fn carries_checks_the_size_run() {
        let product = tee(1, "Camiseta Blanca", None);

        assert!(product.carries(&Variant::size("M")));
        assert!(!product.carries(&Variant::size("XXL")));
        assert!(!product.carries(&Variant::None));
    }

    #[test]
    fn variant_label_round_trips() {
        assert_eq!(Variant::from_label("M"), Variant::size("M"));
        assert_eq!(Variant::from_label(NO_VARIANT), Variant::None);
        assert_eq!(Variant::None.label(), NO_VARIANT);
        assert_eq!(Variant::size("XL").to_string(), "XL");
    }
}
