//! # Credential Manager Test Database
//!
//! Generates the test credential database used by the credential manager
//! wallet. Each record of the input database describes a credential: an ISO
//! mDL (`mso_mdoc`) as name spaces of data elements, or an SD-JWT VC
//! (`dc+sd-jwt`) as a tree of claim paths. For each one the generator
//!
//! - issues the credential, signed by the configured document signer and
//!   bound to a freshly generated device key;
//! - adds the credential, the device private key and the display metadata of
//!   its claims to the record.
//!
//! Records of other formats are copied unchanged.
//!
//! ```no_run
//! use credman_testdata::{generate, Config};
//!
//! let config = Config {
//!     seed: Some(42),
//!     ..Config::default()
//! };
//! generate(&config).expect("should generate");
//! ```

mod config;
mod database;
mod generate;

pub use crate::config::Config;
pub use crate::database::{Database, MdocCredential, Record, DC_SD_JWT, MSO_MDOC};
pub use crate::generate::{generate, to_pretty_json, Generator};
