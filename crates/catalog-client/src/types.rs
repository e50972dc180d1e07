//! Catalog resource types
//!
//! Wire-compatible representations of the two catalog resources, the request
//! payloads used to create or update them, list filters, and the `data`
//! envelope every successful response is wrapped in.

use crate::validation::Validate;
use serde::de::{self, DeserializeOwned, Unexpected};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Server-assigned category identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(pub u64);

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Server-assigned product identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub u64);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// A category as returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Server-assigned identifier
    pub id: CategoryId,
    /// Display name
    pub name: String,
    /// Optional free-form description
    #[serde(default)]
    pub description: Option<String>,
}

/// Category fields embedded in a product for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySnapshot {
    /// Identifier, when the server includes it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<CategoryId>,
    /// Category name at the time of the response
    pub name: String,
}

/// A product as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Server-assigned identifier
    pub id: ProductId,
    /// Display name
    pub name: String,
    /// Unit price, always positive
    ///
    /// Decimal columns may arrive as strings such as `"12.50"`.
    #[serde(deserialize_with = "decimal_price")]
    pub price: f64,
    /// Owning category
    pub category_id: CategoryId,
    /// Availability flag
    #[serde(default = "default_in_stock")]
    pub in_stock: bool,
    /// Owning category snapshot
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<CategorySnapshot>,
}

impl Product {
    /// Name of the owning category, when the server embedded one
    #[must_use]
    pub fn category_name(&self) -> Option<&str> {
        self.category.as_ref().map(|c| c.name.as_str())
    }
}

fn default_in_stock() -> bool {
    true
}

fn decimal_price<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum WirePrice {
        Number(f64),
        Text(String),
    }

    match WirePrice::deserialize(deserializer)? {
        WirePrice::Number(price) => Ok(price),
        WirePrice::Text(text) => text
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|price| price.is_finite())
            .ok_or_else(|| de::Error::invalid_value(Unexpected::Str(&text), &"a decimal price")),
    }
}

/// Body of `POST /categories` and `PUT /categories/{id}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPayload {
    /// Display name
    pub name: String,
    /// Description, empty when not provided
    #[serde(default)]
    pub description: String,
}

impl CategoryPayload {
    /// Create payload with an empty description
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
        }
    }

    /// With description
    #[inline]
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Body of `POST /products` and `PUT /products/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPayload {
    /// Display name
    pub name: String,
    /// Unit price
    pub price: f64,
    /// Owning category
    pub category_id: CategoryId,
    /// Availability flag
    pub in_stock: bool,
}

impl ProductPayload {
    /// Create an in-stock product payload
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, price: f64, category_id: CategoryId) -> Self {
        Self {
            name: name.into(),
            price,
            category_id,
            in_stock: true,
        }
    }

    /// With stock flag
    #[inline]
    #[must_use]
    pub fn with_in_stock(mut self, in_stock: bool) -> Self {
        self.in_stock = in_stock;
        self
    }
}

/// Optional constraints for `GET /products`
///
/// Unset fields impose no constraint and are not sent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilter {
    /// Only products of this category
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    /// Only products with this stock flag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_stock: Option<bool>,
}

impl ProductFilter {
    /// Filter with no constraints
    #[inline]
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Restrict to a category
    #[inline]
    #[must_use]
    pub fn with_category(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }

    /// Restrict to a stock flag
    #[inline]
    #[must_use]
    pub fn with_in_stock(mut self, in_stock: bool) -> Self {
        self.in_stock = Some(in_stock);
        self
    }

    /// True when no constraint is set
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.category_id.is_none() && self.in_stock.is_none()
    }
}

/// Converts a list filter into query parameters
pub trait ListFilter {
    /// Query parameters to send; absent constraints emit nothing
    fn query_pairs(&self) -> Vec<(&'static str, String)>;
}

impl ListFilter for () {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }
}

impl ListFilter for ProductFilter {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(2);
        if let Some(category_id) = self.category_id {
            pairs.push(("categoryId", category_id.to_string()));
        }
        if let Some(in_stock) = self.in_stock {
            pairs.push(("inStock", in_stock.to_string()));
        }
        pairs
    }
}

/// Successful response wrapper: `{ "data": ..., "message": ... }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// Payload; absent on some empty or delete responses
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    /// Informational message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> Default for Envelope<T> {
    fn default() -> Self {
        Self {
            data: None,
            message: None,
        }
    }
}

/// A catalog resource reachable under its own collection path
pub trait Resource: Clone + DeserializeOwned + Send + Sync + 'static {
    /// Identifier type
    type Id: Copy + fmt::Display + Send + Sync;
    /// Create/update request body
    type Payload: Serialize + Validate + Send + Sync;
    /// List constraints
    type Filter: ListFilter + Send + Sync;

    /// Collection path segment, e.g. `categories`
    const COLLECTION: &'static str;
    /// Human label, e.g. `Category`
    const LABEL: &'static str;

    /// Identifier of this instance
    fn id(&self) -> Self::Id;
}

impl Resource for Category {
    type Id = CategoryId;
    type Payload = CategoryPayload;
    type Filter = ();

    const COLLECTION: &'static str = "categories";
    const LABEL: &'static str = "Category";

    fn id(&self) -> CategoryId {
        self.id
    }
}

impl Resource for Product {
    type Id = ProductId;
    type Payload = ProductPayload;
    type Filter = ProductFilter;

    const COLLECTION: &'static str = "products";
    const LABEL: &'static str = "Product";

    fn id(&self) -> ProductId {
        self.id
    }
}
