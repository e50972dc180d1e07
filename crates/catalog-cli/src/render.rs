use catalog_client::{Category, FieldErrors, Product};
use catalog_store::{Notice, Severity};
use std::fmt::Write as _;

const NAME_WIDTH: usize = 24;

pub(crate) fn categories(categories: &[Category]) -> String {
    if categories.is_empty() {
        return "No categories yet. Create your first category to get started.\n".to_string();
    }
    let mut out = format!("{:>6}  {:<NAME_WIDTH$}  {}\n", "ID", "NAME", "DESCRIPTION");
    for category in categories {
        let _ = writeln!(
            out,
            "{:>6}  {:<NAME_WIDTH$}  {}",
            category.id,
            category.name,
            category.description.as_deref().unwrap_or("-")
        );
    }
    out
}

/// `label` resolves the category column for each row
pub(crate) fn products<F>(products: &[Product], empty_hint: &str, label: F) -> String
where
    F: Fn(&Product) -> String,
{
    if products.is_empty() {
        return format!("No products yet. {empty_hint}.\n");
    }
    let mut out = format!(
        "{:>6}  {:<NAME_WIDTH$}  {:>10}  {:<NAME_WIDTH$}  {}\n",
        "ID", "NAME", "PRICE", "CATEGORY", "STOCK"
    );
    for product in products {
        let _ = writeln!(
            out,
            "{:>6}  {:<NAME_WIDTH$}  {:>10}  {:<NAME_WIDTH$}  {}",
            product.id,
            product.name,
            format!("${:.2}", product.price),
            label(product),
            if product.in_stock { "In Stock" } else { "Out of Stock" }
        );
    }
    out
}

pub(crate) fn field_errors(errors: &FieldErrors) -> String {
    let mut out = String::new();
    for (field, message) in errors.iter() {
        let _ = writeln!(out, "  {field}: {message}");
    }
    out
}

pub(crate) fn notice(notice: &Notice) -> String {
    let marker = match notice.severity {
        Severity::Success => "✓",
        Severity::Error => "✗",
    };
    format!("{marker} {}", notice.message)
}
