//! API request handlers

pub mod keys;
pub mod well_known;

pub use keys::{
    create_key_set, delete_key, delete_key_set, get_key, get_key_set, update_key,
    update_key_set, AppState,
};
pub use well_known::well_known;
