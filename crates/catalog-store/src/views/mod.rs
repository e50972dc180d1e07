//! Headless views
//!
//! View-models for the category and product screens. A view reads the
//! shared store, performs mutations through the API directly, reports the
//! outcome as a notice and then asks the store to refresh.

mod category;
mod form;
mod product;

pub use category::CategoryView;
pub use form::{CategoryDraft, ProductDraft};
pub use product::{ProductView, NO_CATEGORY};

use crate::notice::{Notice, Notifier};
use catalog_client::{ApiError, ApiResult};

/// Shown when adding a product while no category exists
pub const CREATE_CATEGORY_FIRST: &str = "Please create a category first before adding products!";
/// Product form without a category
pub const CATEGORY_REQUIRED: &str = "Category is required";
/// Product form referencing a category missing from the store
pub const UNKNOWN_CATEGORY: &str = "Selected category does not exist";
/// Fallback for a failed create or update
pub const OPERATION_FAILED: &str = "Operation failed";

/// Turn a mutation result into a notice and pass it through
fn report<T>(
    notifier: &Notifier,
    result: ApiResult<T>,
    success: &str,
    fallback: &str,
) -> ApiResult<T> {
    match &result {
        Ok(_) => notifier.notify(Notice::success(success)),
        Err(err) => notifier.notify(Notice::error(error_text(err, fallback))),
    }
    result
}

fn error_text(err: &ApiError, fallback: &str) -> String {
    let message = err.message();
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}
