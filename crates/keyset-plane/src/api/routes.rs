//! Request dispatch table
//!
//! Maps every exposed key-set operation to its HTTP method and path template.
//! The table drives the axum router and can also be resolved without any
//! transport, which keeps the mapping itself testable.

use axum::{
    http::Method,
    routing::{delete, get, post, put, MethodRouter},
    Router,
};
use std::sync::Arc;

use crate::api::handlers::{self, AppState};

/// Path of the key-set endpoints
pub const KEY_HANDLER_PATH: &str = "/keys";

/// Path of the discovery endpoint
pub const WELL_KNOWN_KEYS_PATH: &str = "/.well-known/jwks.json";

/// Key-set operations exposed over HTTP
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Discover,
    FetchKey,
    FetchKeySet,
    Generate,
    ReplaceKeySet,
    ReplaceKey,
    DeleteKeySet,
    DeleteKey,
}

/// Every route, in registration order
pub const ROUTES: [Operation; 8] = [
    Operation::Discover,
    Operation::FetchKey,
    Operation::FetchKeySet,
    Operation::Generate,
    Operation::ReplaceKey,
    Operation::ReplaceKeySet,
    Operation::DeleteKey,
    Operation::DeleteKeySet,
];

/// Path parameters extracted by [`resolve`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    pub set: Option<String>,
    pub key: Option<String>,
}

impl Operation {
    pub fn method(self) -> Method {
        match self {
            Operation::Discover | Operation::FetchKey | Operation::FetchKeySet => Method::GET,
            Operation::Generate => Method::POST,
            Operation::ReplaceKeySet | Operation::ReplaceKey => Method::PUT,
            Operation::DeleteKeySet | Operation::DeleteKey => Method::DELETE,
        }
    }

    /// Path template, axum syntax
    pub fn path(self) -> &'static str {
        match self {
            Operation::Discover => WELL_KNOWN_KEYS_PATH,
            Operation::FetchKeySet
            | Operation::Generate
            | Operation::ReplaceKeySet
            | Operation::DeleteKeySet => "/keys/{set}",
            Operation::FetchKey | Operation::ReplaceKey | Operation::DeleteKey => "/keys/{set}/{key}",
        }
    }

    fn method_router(self) -> MethodRouter<Arc<AppState>> {
        match self {
            Operation::Discover => get(handlers::well_known),
            Operation::FetchKey => get(handlers::get_key),
            Operation::FetchKeySet => get(handlers::get_key_set),
            Operation::Generate => post(handlers::create_key_set),
            Operation::ReplaceKeySet => put(handlers::update_key_set),
            Operation::ReplaceKey => put(handlers::update_key),
            Operation::DeleteKeySet => delete(handlers::delete_key_set),
            Operation::DeleteKey => delete(handlers::delete_key),
        }
    }
}

/// Router holding every operation of the table
pub fn key_routes() -> Router<Arc<AppState>> {
    ROUTES
        .iter()
        .fold(Router::new(), |router, op| router.route(op.path(), op.method_router()))
}

/// Resolve a method and concrete path against the table
pub fn resolve(method: &Method, path: &str) -> Option<(Operation, PathParams)> {
    ROUTES
        .iter()
        .filter(|op| op.method() == *method)
        .find_map(|op| match_template(op.path(), path).map(|params| (*op, params)))
}

fn match_template(template: &str, path: &str) -> Option<PathParams> {
    let template: Vec<&str> = template.trim_matches('/').split('/').collect();
    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
    if template.len() != segments.len() {
        return None;
    }

    let mut params = PathParams::default();
    for (expected, actual) in template.iter().zip(segments) {
        match *expected {
            "{set}" if !actual.is_empty() => params.set = Some(actual.to_string()),
            "{key}" if !actual.is_empty() => params.key = Some(actual.to_string()),
            literal if literal == actual => {}
            _ => return None,
        }
    }
    Some(params)
}
