//! # Test Utilities
//!
//! Hard-coded document signer key material and a sample input database that
//! can be used for testing.
//!
//! This crate provides common utilities for the workspace and is not
//! intended to be used directly.

use std::sync::Once;

use serde_json::Value;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Self-signed P-256 document signer certificate.
pub const ISSUER_CERT: &str = include_str!("../data/ds_cert.pem");

/// Document signer private key, PKCS#8 PEM.
pub const ISSUER_KEY: &str = include_str!("../data/ds_private_key.pem");

/// Document signer private key, SEC1 PEM.
pub const ISSUER_KEY_SEC1: &str = include_str!("../data/ds_private_key_sec1.pem");

/// Sample input database with one `mso_mdoc`, one `dc+sd-jwt` and one
/// unsupported record.
pub const DATABASE_IN: &str = include_str!("../data/database_in.json");

// initalise tracing once for all tests
static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// # Panics
///
/// Panics if the tracing subscriber cannot be set.
pub fn init_tracer() {
    INIT.call_once(|| {
        let subscriber = FmtSubscriber::builder().with_max_level(Level::ERROR).finish();
        tracing::subscriber::set_global_default(subscriber).expect("subscriber set");
    });
}

/// The sample input database as JSON.
///
/// # Panics
///
/// Panics if the bundled sample is not valid JSON.
#[must_use]
pub fn sample_database() -> Value {
    serde_json::from_str(DATABASE_IN).expect("sample database should parse")
}
