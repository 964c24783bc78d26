//! Route registration and matching errors.
//!
//! Every variant here is a configuration error: it means the route table
//! itself is broken, not that an individual request is bad. Callers are
//! expected to treat them as fatal.

use thiserror::Error;

/// Errors raised while registering routes or building the matcher.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// Resolution was attempted with no routes registered.
    #[error("route table is empty; register at least one route before resolving")]
    EmptyTable,

    /// A route was registered with an empty pattern.
    #[error("route pattern must not be empty")]
    EmptyPattern,

    /// The pattern could not be turned into a valid regex fragment.
    #[error("malformed route pattern `{pattern}`: {reason}")]
    MalformedPattern {
        /// The offending pattern.
        pattern: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The same parameter name appears twice in one pattern.
    #[error("parameter `{name}` is declared more than once in `{pattern}`")]
    DuplicateParameter {
        /// The offending pattern.
        pattern: String,
        /// The repeated parameter name.
        name: String,
    },

    /// A method list contained a token that is not a valid HTTP method.
    #[error("invalid HTTP method `{0}` in route method list")]
    InvalidMethod(String),

    /// A call directive string could not be resolved.
    #[error("invalid call directive `{0}`: a controller segment is required")]
    InvalidCallDirective(String),

    /// The combined matcher failed to compile.
    #[error("failed to build route matcher: {0}")]
    Matcher(String),
}

impl RouteError {
    /// Creates a malformed pattern error.
    pub fn malformed(pattern: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedPattern {
            pattern: pattern.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_display() {
        let err = RouteError::malformed("/x/:id[", "unterminated character class");
        let msg = err.to_string();
        assert!(msg.contains("/x/:id["));
        assert!(msg.contains("unterminated character class"));
    }

    #[test]
    fn test_duplicate_parameter_display() {
        let err = RouteError::DuplicateParameter {
            pattern: "/:a/:a".to_string(),
            name: "a".to_string(),
        };
        assert!(err.to_string().contains("`a`"));
    }
}
