//! Global route matching options.

/// Options that affect how patterns are compiled and paths are matched.
///
/// # Example
///
/// ```rust
/// use heron_router::MatchOptions;
///
/// let options = MatchOptions::default().with_trailing_slash_optional(true);
/// assert!(options.unicode);
/// assert!(options.trailing_slash_optional);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchOptions {
    /// Compile the matcher in Unicode mode.
    pub unicode: bool,
    /// Percent-decode the whole path before matching.
    pub decode_uri: bool,
    /// Append an optional trailing slash to every compiled fragment.
    pub trailing_slash_optional: bool,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            unicode: true,
            decode_uri: true,
            trailing_slash_optional: false,
        }
    }
}

impl MatchOptions {
    /// Sets Unicode mode.
    #[must_use]
    pub fn with_unicode(mut self, enabled: bool) -> Self {
        self.unicode = enabled;
        self
    }

    /// Sets percent-decoding of incoming paths.
    #[must_use]
    pub fn with_decode_uri(mut self, enabled: bool) -> Self {
        self.decode_uri = enabled;
        self
    }

    /// Sets the optional trailing slash.
    #[must_use]
    pub fn with_trailing_slash_optional(mut self, enabled: bool) -> Self {
        self.trailing_slash_optional = enabled;
        self
    }
}
