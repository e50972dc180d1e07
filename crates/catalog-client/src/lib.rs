//! Catalog Client
//!
//! Typed access to the category/product REST API.
//!
//! # Core Pieces
//!
//! - **Types**: `Category`, `Product`, their payloads and list filters
//! - **Validation**: payload checks run before any request is sent
//! - **Errors**: one normalized `ApiError` per failed call
//! - **Transport**: `HttpCatalogClient`, a reqwest implementation of `CatalogApi`
//!
//! # Example
//!
//! ```rust,ignore
//! use catalog_client::prelude::*;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::from_env()?;
//! let client = HttpCatalogClient::new(&config)?;
//!
//! let tools = client
//!     .create_category(&CategoryPayload::new("Tools"))
//!     .await?;
//! let products = client
//!     .list_products(&ProductFilter::all().with_category(tools.id))
//!     .await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod api;
pub mod config;
pub mod error;
pub mod http;
pub mod types;
pub mod validation;

pub use api::CatalogApi;
#[cfg(feature = "mock")]
pub use api::MockCatalogApi;
pub use config::ClientConfig;
pub use error::{ApiError, ApiResult, ConfigError, ErrorKind, NETWORK_ERROR_MESSAGE};
pub use http::{HttpCatalogClient, ResourceClient, API_KEY_HEADER};
pub use types::{
    Category, CategoryId, CategoryPayload, CategorySnapshot, Envelope, ListFilter, Product,
    ProductFilter, ProductId, ProductPayload, Resource,
};
pub use validation::{FieldErrors, Validate, MAX_DESCRIPTION_CHARS, MIN_NAME_CHARS};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the catalog client
    pub use crate::api::CatalogApi;
    pub use crate::config::ClientConfig;
    pub use crate::error::{ApiError, ApiResult, ErrorKind};
    pub use crate::http::HttpCatalogClient;
    pub use crate::types::{
        Category, CategoryId, CategoryPayload, Product, ProductFilter, ProductId, ProductPayload,
    };
    pub use crate::validation::{FieldErrors, Validate};
}
