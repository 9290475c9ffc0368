//! Key set management

mod service;

pub use service::{CreateKeyRequest, KeySetService, ReplaceKeySetRequest};
