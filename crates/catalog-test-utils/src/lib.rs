//! Testing utilities for the catalog workspace
//!
//! API doubles, fixtures and the fake HTTP server.

#![allow(missing_docs)]

pub mod backend;
pub mod memory;
pub mod server;

pub use backend::{CatalogBackend, CATEGORY_IN_USE};
pub use memory::{InMemoryCatalog, Operation};
pub use server::{FakeApiServer, RecordedRequest, API_PREFIX};

use catalog_client::{Category, CategoryId, ClientConfig, HttpCatalogClient, Product, ProductId};

/// API key accepted by [`FakeApiServer`] in tests
pub const TEST_API_KEY: &str = "test-key";

pub fn category(id: u64, name: &str) -> Category {
    Category {
        id: CategoryId(id),
        name: name.to_string(),
        description: None,
    }
}

pub fn product(id: u64, name: &str, category_id: u64) -> Product {
    Product {
        id: ProductId(id),
        name: name.to_string(),
        price: 10.0,
        category_id: CategoryId(category_id),
        in_stock: true,
        category: None,
    }
}

/// Client configured for `server` with [`TEST_API_KEY`]
pub fn client_for(server: &FakeApiServer) -> HttpCatalogClient {
    let config = ClientConfig::new()
        .with_base_url(server.base_url())
        .with_api_key(TEST_API_KEY)
        .with_timeout_secs(5);
    HttpCatalogClient::new(&config).unwrap()
}

/// Start a fake server accepting [`TEST_API_KEY`] and a client pointed at it
pub fn setup_http() -> (FakeApiServer, HttpCatalogClient) {
    let server = FakeApiServer::start(TEST_API_KEY).unwrap();
    let client = client_for(&server);
    (server, client)
}
