//! Client-side payload validation
//!
//! Payloads are checked before any request leaves the process. The server
//! remains the final authority and may still reject a payload that passes.

use crate::types::{CategoryPayload, ProductPayload};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Minimum name length, in characters, after trimming
pub const MIN_NAME_CHARS: usize = 2;

/// Maximum category description length, in characters
pub const MAX_DESCRIPTION_CHARS: usize = 500;

/// Per-field validation messages keyed by wire field name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    /// Empty error set
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-field error set
    #[must_use]
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.insert(field, message);
        errors
    }

    /// Record a message for a field, replacing any earlier one
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.insert(field.into(), message.into());
    }

    /// Message recorded for a field
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Whether a field has a message
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// True when no field failed
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of failing fields
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over `(field, message)` pairs in field order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `Ok(())` when empty, otherwise `Err(self)`
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    /// Merge another error set into this one
    pub fn extend(&mut self, other: FieldErrors) {
        self.0.extend(other.0);
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

/// Payloads that can be checked before sending
pub trait Validate {
    /// Check every field, collecting all failures
    fn validate(&self) -> Result<(), FieldErrors>;
}

/// Check a resource name; `label` prefixes the message (`Category`, `Product`)
pub fn check_name(label: &str, name: &str, errors: &mut FieldErrors) {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        errors.insert("name", format!("{label} name is required"));
    } else if trimmed.chars().count() < MIN_NAME_CHARS {
        errors.insert(
            "name",
            format!("{label} name must be at least {MIN_NAME_CHARS} characters"),
        );
    }
}

/// Check a category description
pub fn check_description(description: &str, errors: &mut FieldErrors) {
    if description.chars().count() > MAX_DESCRIPTION_CHARS {
        errors.insert(
            "description",
            format!("Description cannot exceed {MAX_DESCRIPTION_CHARS} characters"),
        );
    }
}

/// Check a product price
pub fn check_price(price: Option<f64>, errors: &mut FieldErrors) {
    match price {
        Some(p) if p.is_finite() && p > 0.0 => {}
        _ => errors.insert("price", "Valid price is required (must be greater than 0)"),
    }
}

impl Validate for CategoryPayload {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        check_name("Category", &self.name, &mut errors);
        check_description(&self.description, &mut errors);
        errors.into_result()
    }
}

impl Validate for ProductPayload {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        check_name("Product", &self.name, &mut errors);
        check_price(Some(self.price), &mut errors);
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CategoryId;
    use proptest::prelude::*;

    #[test]
    fn blank_name_is_required() {
        let errors = CategoryPayload::new("   ").validate().unwrap_err();
        assert_eq!(errors.get("name"), Some("Category name is required"));
    }

    #[test]
    fn one_character_name_is_too_short() {
        let errors = ProductPayload::new(" x ", 1.0, CategoryId(1))
            .validate()
            .unwrap_err();
        assert_eq!(
            errors.get("name"),
            Some("Product name must be at least 2 characters")
        );
    }

    #[test]
    fn description_limit_counts_characters() {
        let at_limit = "é".repeat(MAX_DESCRIPTION_CHARS);
        assert!(CategoryPayload::new("Tools")
            .with_description(at_limit)
            .validate()
            .is_ok());

        let over = "a".repeat(MAX_DESCRIPTION_CHARS + 1);
        let errors = CategoryPayload::new("Tools")
            .with_description(over)
            .validate()
            .unwrap_err();
        assert!(errors.contains("description"));
    }

    #[test]
    fn non_positive_and_nan_prices_are_rejected() {
        for price in [0.0, -3.0, f64::NAN, f64::INFINITY] {
            let errors = ProductPayload::new("Saw", price, CategoryId(1))
                .validate()
                .unwrap_err();
            assert!(errors.contains("price"), "price {price} accepted");
        }
    }

    #[test]
    fn all_failures_are_collected() {
        let errors = ProductPayload::new("", 0.0, CategoryId(1))
            .validate()
            .unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors.to_string(),
            "name: Product name is required; price: Valid price is required (must be greater than 0)"
        );
    }

    proptest! {
        #[test]
        fn prop_valid_category_payloads_pass(
            name in "[A-Za-z][A-Za-z0-9 ]{0,38}[A-Za-z0-9]",
            description in ".{0,500}",
        ) {
            let payload = CategoryPayload::new(name).with_description(description);
            prop_assert!(payload.validate().is_ok());
        }

        #[test]
        fn prop_positive_prices_pass(price in 0.01f64..1_000_000.0) {
            let payload = ProductPayload::new("Widget", price, CategoryId(1));
            prop_assert!(payload.validate().is_ok());
        }
    }
}
