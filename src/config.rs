//! # Configuration
//!
//! Settings for a generator run. Every setting has a default so a run needs
//! no configuration file at all; values from a TOML file are in turn
//! overridden by command line flags.
//!
//! ```toml
//! input = "testdata/database_in.json"
//! output = "testdata/database.json"
//! issuer = "https://example.com/issuer"
//! validity_days = 365
//! seed = 42
//! issued_at = "2024-10-01T00:00:00Z"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use testdata_infosec::Randomness;

/// Generator settings.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Document signer certificate chain, PEM, leaf first.
    pub certificate: PathBuf,

    /// Document signer private key, PKCS#8 or SEC1 PEM.
    pub private_key: PathBuf,

    /// Input database.
    pub input: PathBuf,

    /// Output database. Overwritten if it exists.
    pub output: PathBuf,

    /// `iss` claim of issued SD-JWT credentials.
    pub issuer: String,

    /// Number of days `mso_mdoc` credentials remain valid.
    pub validity_days: u32,

    /// Seed for salts, element randoms and device keys. When unset, output
    /// differs on every run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Issuance time of every credential, RFC 3339. Defaults to now.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<DateTime<Utc>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            certificate: PathBuf::from("testdata/ds_cert.pem"),
            private_key: PathBuf::from("testdata/ds_private_key.pem"),
            input: PathBuf::from("testdata/database_in.json"),
            output: PathBuf::from("testdata/database.json"),
            issuer: String::from("https://example.com/issuer"),
            validity_days: 365,
            seed: None,
            issued_at: None,
        }
    }
}

impl Config {
    /// Read configuration from a TOML file. Settings missing from the file
    /// keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid
    /// configuration.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("issue reading config {}", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("issue parsing config {}", path.display()))
    }

    /// Source of randomness for the run.
    #[must_use]
    pub fn randomness(&self) -> Randomness {
        self.seed.into()
    }

    /// Validity period of `mso_mdoc` credentials.
    #[must_use]
    pub fn validity(&self) -> Duration {
        Duration::days(i64::from(self.validity_days))
    }
}
