//! Key Set Server Binary
//!
//! Runs the key-set HTTP server with an in-memory store and policy firewall.

use std::env;
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use keyset_core::GeneratorRegistry;
use keyset_firewall::{AuthorizationGate, MemoryFirewall};
use keyset_plane::{create_router, AppState, KeyManager, KeySetService, KeysConfig, MemoryKeyManager};

/// Algorithm of the bootstrapped ID token signing keys
const BOOTSTRAP_ALGORITHM: &str = "RS256";

#[tokio::main]
async fn main() {
    // Initialize logging
    let log_level = env::var("KEYSET_LOG_LEVEL")
        .unwrap_or_else(|_| "info".into())
        .parse()
        .unwrap_or(Level::INFO);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(true)
        .with_thread_ids(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    // Configuration
    let port: u16 = env::var("KEYSET_PORT")
        .unwrap_or_else(|_| "8080".into())
        .parse()
        .expect("KEYSET_PORT must be a valid port number");

    let mut config = KeysConfig::default();
    if let Ok(prefix) = env::var("KEYSET_RESOURCE_PREFIX") {
        config.resource_prefix = prefix;
    }
    config.public_url = env::var("KEYSET_PUBLIC_URL").ok();
    config.require_matching_kid = env::var("KEYSET_REQUIRE_MATCHING_KID")
        .map(|value| matches!(value.as_str(), "1" | "true" | "yes"))
        .unwrap_or(false);

    // Policy firewall
    let firewall = match env::var("KEYSET_POLICIES_PATH") {
        Ok(path) => {
            let json = std::fs::read_to_string(&path)
                .unwrap_or_else(|e| panic!("Failed to read policies from {}: {}", path, e));
            MemoryFirewall::from_json(&json).expect("KEYSET_POLICIES_PATH must hold a valid policy document")
        }
        Err(_) => {
            warn!("KEYSET_POLICIES_PATH not set, every request will be denied");
            MemoryFirewall::new()
        }
    };
    let gate = AuthorizationGate::new(Arc::new(firewall));

    // Initialize storage
    let store: Arc<dyn KeyManager> = Arc::new(MemoryKeyManager::new());

    let keys = KeySetService::new(store, gate, GeneratorRegistry::new(), config);

    keys.ensure_well_known_keys(BOOTSTRAP_ALGORITHM)
        .await
        .expect("Failed to create the well-known key set");

    info!(
        prefix = %keys.namer().prefix(),
        well_known_set = %keys.config().well_known_set,
        port = port,
        "Starting key set server"
    );

    // Create application state
    let state = Arc::new(AppState { keys });

    // Build router
    let app = create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    info!(addr = %addr, "Key set server listening");

    axum::serve(listener, app)
        .await
        .expect("Server error");
}
