//! Form drafts
//!
//! A draft holds what the user typed. Converting it to a payload runs the
//! same checks as the client plus the ones that need the cached catalog.

use super::{CATEGORY_REQUIRED, UNKNOWN_CATEGORY};
use catalog_client::validation::{check_description, check_name, check_price};
use catalog_client::{
    Category, CategoryId, CategoryPayload, FieldErrors, Product, ProductPayload,
};
use serde::{Deserialize, Serialize};

/// Category form contents
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDraft {
    /// Name as typed
    pub name: String,
    /// Description as typed
    pub description: String,
}

impl CategoryDraft {
    /// Draft with a name
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

    /// Pre-filled from an existing category
    #[must_use]
    pub fn from_category(category: &Category) -> Self {
        Self {
            name: category.name.clone(),
            description: category.description.clone().unwrap_or_default(),
        }
    }

    /// Validate and build the request body
    ///
    /// # Errors
    /// Every failing field, keyed by wire name.
    pub fn to_payload(&self) -> Result<CategoryPayload, FieldErrors> {
        let mut errors = FieldErrors::new();
        check_name("Category", &self.name, &mut errors);
        check_description(&self.description, &mut errors);
        errors.into_result()?;
        Ok(CategoryPayload::new(self.name.trim()).with_description(self.description.clone()))
    }
}

/// Product form contents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDraft {
    /// Name as typed
    pub name: String,
    /// Parsed price, `None` when the field is blank
    pub price: Option<f64>,
    /// Selected category
    pub category_id: Option<CategoryId>,
    /// Stock switch
    pub in_stock: bool,
}

impl Default for ProductDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            price: None,
            category_id: None,
            in_stock: true,
        }
    }
}

impl ProductDraft {
    /// Draft with every field set
    pub fn new(name: impl Into<String>, price: f64, category_id: CategoryId) -> Self {
        Self {
            name: name.into(),
            price: Some(price),
            category_id: Some(category_id),
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

    /// Pre-filled from an existing product
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            price: Some(product.price),
            category_id: Some(product.category_id),
            in_stock: product.in_stock,
        }
    }

    /// Validate against the cached categories and build the request body
    ///
    /// # Errors
    /// Every failing field, keyed by wire name. A category id absent from
    /// `categories` is rejected here so no request is sent.
    pub fn to_payload(&self, categories: &[Category]) -> Result<ProductPayload, FieldErrors> {
        let mut errors = FieldErrors::new();
        check_name("Product", &self.name, &mut errors);
        check_price(self.price, &mut errors);
        match self.category_id {
            None => errors.insert("categoryId", CATEGORY_REQUIRED),
            Some(id) if !categories.iter().any(|c| c.id == id) => {
                errors.insert("categoryId", UNKNOWN_CATEGORY);
            }
            Some(_) => {}
        }

        match (self.price, self.category_id) {
            (Some(price), Some(category_id)) if errors.is_empty() => {
                Ok(ProductPayload::new(self.name.trim(), price, category_id)
                    .with_in_stock(self.in_stock))
            }
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn tools() -> Category {
        Category {
            id: CategoryId(7),
            name: "Tools".to_string(),
            description: Some("Hand tools".to_string()),
        }
    }

    #[test]
    fn category_draft_trims_name() {
        let payload = CategoryDraft::new("  Tools ").to_payload().unwrap();
        assert_eq!(payload.name, "Tools");
        assert_eq!(payload.description, "");
    }

    #[test]
    fn category_draft_collects_every_failure() {
        let errors = CategoryDraft::new("T")
            .with_description("x".repeat(501))
            .to_payload()
            .unwrap_err();

        assert_eq!(errors.get("name"), Some("Category name must be at least 2 characters"));
        assert_eq!(
            errors.get("description"),
            Some("Description cannot exceed 500 characters")
        );
    }

    #[test]
    fn category_draft_round_trips_existing_category() {
        let draft = CategoryDraft::from_category(&tools());
        assert_eq!(draft, CategoryDraft::new("Tools").with_description("Hand tools"));
    }

    #[test]
    fn blank_product_draft_reports_every_field() {
        let errors = ProductDraft::default().to_payload(&[tools()]).unwrap_err();

        assert_eq!(errors.get("name"), Some("Product name is required"));
        assert_eq!(
            errors.get("price"),
            Some("Valid price is required (must be greater than 0)")
        );
        assert_eq!(errors.get("categoryId"), Some(CATEGORY_REQUIRED));
    }

    #[test]
    fn product_draft_rejects_unknown_category() {
        let errors = ProductDraft::new("Hammer", 12.5, CategoryId(99))
            .to_payload(&[tools()])
            .unwrap_err();

        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get("categoryId"), Some(UNKNOWN_CATEGORY));
    }

    #[test]
    fn product_draft_builds_payload() {
        let payload = ProductDraft::new(" Hammer ", 12.5, CategoryId(7))
            .with_in_stock(false)
            .to_payload(&[tools()])
            .unwrap();

        assert_eq!(
            payload,
            ProductPayload::new("Hammer", 12.5, CategoryId(7)).with_in_stock(false)
        );
    }

    proptest! {
        #[test]
        fn non_positive_prices_never_produce_payloads(price in -1.0e6f64..=0.0) {
            let draft = ProductDraft::new("Hammer", price, CategoryId(7));
            let errors = draft.to_payload(&[tools()]).unwrap_err();
            prop_assert!(errors.contains("price"));
        }

        #[test]
        fn ids_outside_the_cache_are_always_rejected(id in 8u64..10_000) {
            let draft = ProductDraft::new("Hammer", 1.0, CategoryId(id));
            prop_assert!(draft.to_payload(&[tools()]).is_err());
        }
    }
}
