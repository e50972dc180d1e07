//! In-process HTTP double speaking the catalog wire format
//!
//! Routes live under `/api`. Successful responses are wrapped as
//! `{"success": true, "data": ..}`, failures as
//! `{"success": false, "message": ..}`. Mutations without the expected
//! `x-api-key` header are refused with 401.

use crate::backend::CatalogBackend;
use catalog_client::{
    ApiResult, CategoryId, CategoryPayload, ProductFilter, ProductId, ProductPayload,
    API_KEY_HEADER,
};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use warp::http::{Method, StatusCode};
use warp::hyper::body::Bytes;
use warp::path::FullPath;
use warp::Filter;

/// Mount point of the API
pub const API_PREFIX: &str = "/api";

/// A request as seen by the fake server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub api_key: Option<String>,
}

impl RecordedRequest {
    /// Value of query parameter `name`
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug)]
struct ServerState {
    backend: Mutex<CatalogBackend>,
    requests: Mutex<Vec<RecordedRequest>>,
    api_key: String,
    prices_as_text: AtomicBool,
}

/// Running fake API server
#[derive(Debug, Clone)]
pub struct FakeApiServer {
    addr: SocketAddr,
    state: Arc<ServerState>,
}

impl FakeApiServer {
    /// Start on an ephemeral localhost port, accepting `api_key` for mutations
    ///
    /// Must be called inside a tokio runtime; the server runs until the
    /// runtime shuts down.
    pub fn start(api_key: impl Into<String>) -> Result<Self, warp::Error> {
        Self::start_with(CatalogBackend::new(), api_key)
    }

    pub fn start_with(
        backend: CatalogBackend,
        api_key: impl Into<String>,
    ) -> Result<Self, warp::Error> {
        let state = Arc::new(ServerState {
            backend: Mutex::new(backend),
            requests: Mutex::new(Vec::new()),
            api_key: api_key.into(),
            prices_as_text: AtomicBool::new(false),
        });

        let with_state = {
            let state = Arc::clone(&state);
            warp::any().map(move || Arc::clone(&state))
        };

        let routes = warp::method()
            .and(warp::path::full())
            .and(warp::query::<Vec<(String, String)>>())
            .and(warp::header::optional::<String>(API_KEY_HEADER))
            .and(warp::body::bytes())
            .and(with_state)
            .and_then(handle);

        let (addr, server) = warp::serve(routes).try_bind_ephemeral(([127, 0, 0, 1], 0))?;
        tokio::spawn(server);
        tracing::debug!(%addr, "fake catalog api listening");

        Ok(Self { addr, state })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Base URL to hand to `ClientConfig::with_base_url`
    pub fn base_url(&self) -> String {
        format!("http://{}{}", self.addr, API_PREFIX)
    }

    /// Every request received so far, oldest first
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().clone()
    }

    /// Send product prices as decimal strings (`"12.50"`) from now on
    pub fn send_prices_as_text(&self, enabled: bool) {
        self.state.prices_as_text.store(enabled, Ordering::Relaxed);
    }

    /// Direct access to the stored data
    pub fn with_data<T>(&self, f: impl FnOnce(&mut CatalogBackend) -> T) -> T {
        f(&mut self.state.backend.lock())
    }
}

async fn handle(
    method: Method,
    path: FullPath,
    query: Vec<(String, String)>,
    api_key: Option<String>,
    body: Bytes,
    state: Arc<ServerState>,
) -> Result<warp::reply::WithStatus<warp::reply::Json>, Infallible> {
    let request = RecordedRequest {
        method,
        path: path.as_str().to_string(),
        query,
        api_key,
    };
    state.requests.lock().push(request.clone());

    let (status, mut body) = route(&state, &request, &body);
    if state.prices_as_text.load(Ordering::Relaxed) {
        prices_to_text(&mut body);
    }
    Ok(warp::reply::with_status(warp::reply::json(&body), status))
}

fn route(state: &ServerState, request: &RecordedRequest, body: &[u8]) -> (StatusCode, Value) {
    let mutating = matches!(request.method, Method::POST | Method::PUT | Method::DELETE);
    if mutating && request.api_key.as_deref() != Some(state.api_key.as_str()) {
        return failure(StatusCode::UNAUTHORIZED, "Invalid API key");
    }

    let Some(rest) = request.path.strip_prefix(API_PREFIX) else {
        return failure(StatusCode::NOT_FOUND, "Route not found");
    };
    let segments: Vec<&str> = rest.split('/').filter(|s| !s.is_empty()).collect();
    let mut backend = state.backend.lock();

    match (&request.method, segments.as_slice()) {
        (&Method::GET, ["categories"]) => success(StatusCode::OK, backend.list_categories()),
        (&Method::POST, ["categories"]) => match decode::<CategoryPayload>(body) {
            Ok(payload) => reply(StatusCode::CREATED, backend.create_category(&payload)),
            Err(err) => err,
        },
        (&Method::GET, ["products"]) => match product_filter(&request.query) {
            Ok(filter) => success(StatusCode::OK, backend.list_products(&filter)),
            Err(err) => err,
        },
        (&Method::POST, ["products"]) => match decode::<ProductPayload>(body) {
            Ok(payload) => reply(StatusCode::CREATED, backend.create_product(&payload)),
            Err(err) => err,
        },
        (method, ["categories", raw]) => {
            let Some(id) = raw.parse().ok().map(CategoryId) else {
                return failure(StatusCode::BAD_REQUEST, "Invalid category id");
            };
            match *method {
                Method::GET => reply(StatusCode::OK, backend.get_category(id)),
                Method::PUT => match decode::<CategoryPayload>(body) {
                    Ok(payload) => reply(StatusCode::OK, backend.update_category(id, &payload)),
                    Err(err) => err,
                },
                Method::DELETE => reply(StatusCode::OK, backend.delete_category(id).map(|()| Value::Null)),
                _ => failure(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed"),
            }
        }
        (method, ["products", raw]) => {
            let Some(id) = raw.parse().ok().map(ProductId) else {
                return failure(StatusCode::BAD_REQUEST, "Invalid product id");
            };
            match *method {
                Method::GET => reply(StatusCode::OK, backend.get_product(id)),
                Method::PUT => match decode::<ProductPayload>(body) {
                    Ok(payload) => reply(StatusCode::OK, backend.update_product(id, &payload)),
                    Err(err) => err,
                },
                Method::DELETE => reply(StatusCode::OK, backend.delete_product(id).map(|()| Value::Null)),
                _ => failure(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed"),
            }
        }
        _ => failure(StatusCode::NOT_FOUND, "Route not found"),
    }
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, (StatusCode, Value)> {
    serde_json::from_slice(body)
        .map_err(|err| failure(StatusCode::BAD_REQUEST, &format!("Invalid request body: {err}")))
}

fn product_filter(query: &[(String, String)]) -> Result<ProductFilter, (StatusCode, Value)> {
    let mut filter = ProductFilter::all();
    for (key, value) in query {
        match key.as_str() {
            "categoryId" => match value.parse() {
                Ok(id) => filter = filter.with_category(CategoryId(id)),
                Err(_) => return Err(failure(StatusCode::BAD_REQUEST, "Invalid categoryId")),
            },
            "inStock" => match value.parse() {
                Ok(in_stock) => filter = filter.with_in_stock(in_stock),
                Err(_) => return Err(failure(StatusCode::BAD_REQUEST, "Invalid inStock")),
            },
            _ => {}
        }
    }
    Ok(filter)
}

fn reply<T: Serialize>(status: StatusCode, result: ApiResult<T>) -> (StatusCode, Value) {
    match result {
        Ok(data) => success(status, data),
        Err(err) => {
            let code = err
                .status()
                .and_then(|s| StatusCode::from_u16(s).ok())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            failure(code, &err.message())
        }
    }
}

fn prices_to_text(value: &mut Value) {
    match value {
        Value::Object(fields) => {
            for (key, field) in fields.iter_mut() {
                let price = if key == "price" { field.as_f64() } else { None };
                match price {
                    Some(price) => *field = Value::String(format!("{price:.2}")),
                    None => prices_to_text(field),
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(prices_to_text),
        _ => {}
    }
}

fn success<T: Serialize>(status: StatusCode, data: T) -> (StatusCode, Value) {
    (status, json!({ "success": true, "data": data }))
}

fn failure(status: StatusCode, message: &str) -> (StatusCode, Value) {
    (status, json!({ "success": false, "message": message }))
}
