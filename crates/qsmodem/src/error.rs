//! Error types surfaced by [`decode`](crate::decode) and
//! [`encode`](crate::encode).

use thiserror::Error;

/// Errors produced while decoding a query string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// More pairs than `parameter_limit` arrived while
    /// `raise_on_limit_exceeded` was set.
    #[error("Parameter limit exceeded. Only {limit} parameter{} allowed.", if *.limit == 1 { "" } else { "s" })]
    ParameterLimitExceeded { limit: usize },

    /// A list grew past `list_limit` while `raise_on_limit_exceeded` was set.
    #[error("List limit exceeded. Only {limit} element{} allowed in a list.", if *.limit == 1 { "" } else { "s" })]
    ListLimitExceeded { limit: isize },

    /// Well-formed bracket groups continued past `depth` while `strict_depth`
    /// was set.
    #[error("Input depth exceeded depth option of {depth} and strict_depth is true")]
    DepthExceeded { depth: usize },

    /// `decode_dot_in_keys` was set while `allow_dots` was explicitly
    /// disabled.
    #[error("decode_dot_in_keys requires allow_dots to be enabled")]
    DotInKeysRequiresAllowDots,
}

/// Errors produced while encoding a value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// The same container was visited twice along one descent path.
    #[error("Circular reference detected")]
    CircularReference,

    /// `encode_dot_in_keys` was set while `allow_dots` was explicitly
    /// disabled.
    #[error("encode_dot_in_keys requires allow_dots to be enabled")]
    DotInKeysRequiresAllowDots,
}
