//! # Claim Path Trees
//!
//! Test credentials are described as a nested "paths" tree: each key is a
//! claim segment, each node is either a branch (further segments) or a leaf
//! carrying the claim `value`, an optional human-readable `display` name and
//! a `_sd` flag marking the claim as selectively disclosable.
//!
//! ```json
//! {
//!   "given_name": { "value": "ERIKA", "display": "Given Name", "_sd": true },
//!   "address": {
//!     "_sd": false,
//!     "street": { "value": "Main St", "display": "Street", "_sd": true }
//!   }
//! }
//! ```
//!
//! The tree is parsed once into a [`ClaimTree`] and then derived into:
//!
//! - a flat list of [`ClaimsDescription`]s, one per displayed leaf, used as
//!   credential configuration metadata (see [`build_display_claims`]);
//! - a [`DisclosureClaims`] mapping where flagged claims are wrapped as
//!   [`ClaimValue::SelectivelyDisclosable`], handed to the SD-JWT issuer (see
//!   [`build_disclosure_claims`]).

mod disclosure;
mod display;
mod error;
mod tree;

pub use crate::disclosure::{build_disclosure_claims, Claim, ClaimValue, DisclosureClaims};
pub use crate::display::{
    build_display_claims, display_claims, ClaimDisplay, ClaimsDescription, DEFAULT_LOCALE,
};
pub use crate::error::Error;
pub use crate::tree::{ClaimNode, ClaimTree, SD_FLAG};
