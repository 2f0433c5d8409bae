use thiserror::Error;

/// Structural errors raised while parsing a claim path tree.
///
/// Paths are rendered as dot-separated claim segments, with `$` standing for
/// the root of the tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The node is not a JSON object.
    #[error("claim node `{path}` is not an object")]
    NotAnObject {
        /// Location of the offending node.
        path: String,
    },

    /// The `_sd` flag is present but not a boolean.
    #[error("claim node `{path}` has a non-boolean `_sd` flag")]
    InvalidFlag {
        /// Location of the offending node.
        path: String,
    },

    /// The `display` field of a leaf is not a string.
    #[error("claim node `{path}` has a non-string `display`")]
    InvalidDisplay {
        /// Location of the offending node.
        path: String,
    },

    /// The node carries a `value` and nested claim mappings at the same time.
    #[error("claim node `{path}` has a `value` and a nested mapping `{key}`")]
    AmbiguousNode {
        /// Location of the offending node.
        path: String,

        /// The nested key that conflicts with `value`.
        key: String,
    },

    /// The node declares a `display` name but no `value`.
    #[error("claim node `{path}` has a `display` but no `value`")]
    DisplayWithoutValue {
        /// Location of the offending node.
        path: String,
    },
}
