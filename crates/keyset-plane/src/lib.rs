//! Key Set Server
//!
//! HTTP service managing named JSON Web Key Sets on behalf of an OAuth2 /
//! OpenID Connect provider:
//! - Generates key material for a requested algorithm and stores it in a set
//! - Merges client-supplied keys into sets
//! - Publishes the public half of the ID token signing set
//! - Gates every operation through a policy firewall
//!
//! ## Authorization
//!
//! Every key is a policy resource `<prefix>:keys:<set>:<kid>`, every set a
//! resource `<prefix>:keys:<set>`. A request carrying a bearer token is checked
//! against the token's subject and scope first; if that check fails the
//! anonymous subject is checked, so single keys can be made public.
//!
//! ## API Endpoints
//!
//! - `GET /health` - Liveness check
//! - `GET /.well-known/jwks.json` - Public ID token signing keys
//! - `GET /keys/{set}` - Fetch a key set
//! - `GET /keys/{set}/{key}` - Fetch a single key
//! - `POST /keys/{set}` - Generate keys into a set
//! - `PUT /keys/{set}` - Merge keys into a set
//! - `PUT /keys/{set}/{key}` - Merge a single key into a set
//! - `DELETE /keys/{set}` - Delete a set
//! - `DELETE /keys/{set}/{key}` - Delete a single key

pub mod api;
pub mod core;
pub mod keys;
pub mod storage;

pub use api::create_router;
pub use api::handlers::AppState;
pub use core::{KeyAction, KeysConfig, ResourceNamer};
pub use keys::KeySetService;
pub use storage::{KeyManager, MemoryKeyManager, StorageError};
