//! Core configuration and resource naming for the key-set service

mod config;
mod resource;

pub use config::{KeysConfig, DEFAULT_SCOPE_PREFIX, ID_TOKEN_SET};
pub use resource::{KeyAction, ResourceNamer, DEFAULT_RESOURCE_PREFIX};
