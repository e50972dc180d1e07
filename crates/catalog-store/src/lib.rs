//! Catalog Store
//!
//! The client-side synchronization layer between the catalog API and the
//! screens that display it.
//!
//! # Core Pieces
//!
//! - **Store**: one `CatalogStore` per session holding categories and
//!   products, with a re-entrancy guarded refresh per resource kind
//! - **State machine**: `FetchPhase` transitions validated per kind
//! - **Notices**: transient success/error messages on a broadcast channel
//! - **Context**: `CatalogContext` bundles the API, store and notifier
//! - **Views**: headless category and product screens with form drafts
//!
//! # Example
//!
//! ```rust,ignore
//! use catalog_store::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn example(api: Arc<dyn catalog_client::CatalogApi>) {
//! let context = CatalogContext::new(api, StoreConfig::default());
//! let categories = context.category_view();
//!
//! categories.mount().await;
//! let _ = categories.submit(None, &CategoryDraft::new("Tools")).await;
//! assert!(context.store().has_categories());
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod config;
pub mod context;
pub mod notice;
pub mod state;
pub mod store;
pub mod views;

pub use config::{ErrorRetention, LoadingScope, StoreConfig};
pub use context::CatalogContext;
pub use notice::{Notice, Notifier, Severity};
pub use state::{validate_transition, FetchPhase, ResourceKind, TransitionError};
pub use store::{CatalogSnapshot, CatalogStore, FetchError, FetchOutcome};
pub use views::{CategoryDraft, CategoryView, ProductDraft, ProductView};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the catalog store
    pub use crate::config::{ErrorRetention, LoadingScope, StoreConfig};
    pub use crate::context::CatalogContext;
    pub use crate::notice::{Notice, Severity};
    pub use crate::store::{CatalogStore, FetchOutcome};
    pub use crate::views::{CategoryDraft, CategoryView, ProductDraft, ProductView};
}
