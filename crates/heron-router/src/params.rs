//! Captured path parameters.
//!
//! Parameters are stored in first-occurrence order. A parameter that is
//! declared in the pattern but whose group did not take part in the match
//! (for example one inside an unused optional segment) is kept with a
//! `None` value so callers can tell "absent" from "empty".

use smallvec::SmallVec;

/// Maximum number of parameters stored inline (stack allocated).
const INLINE_PARAMS: usize = 4;

/// Extracted path parameters from a route match.
///
/// # Example
///
/// ```rust
/// use heron_router::Params;
///
/// let mut params = Params::new();
/// params.push("id", Some("7"));
/// params.push("page", None::<&str>);
///
/// assert_eq!(params.get("id"), Some("7"));
/// assert_eq!(params.get("page"), None);
/// assert!(params.contains("page"));
/// assert_eq!(params.present().count(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Params {
    inner: SmallVec<[(String, Option<String>); INLINE_PARAMS]>,
}

impl Params {
    /// Creates a new empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a params set with the given capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: SmallVec::with_capacity(capacity),
        }
    }

    /// Adds a parameter to the set.
    pub fn push(&mut self, name: impl Into<String>, value: Option<impl Into<String>>) {
        self.inner.push((name.into(), value.map(Into::into)));
    }

    /// Returns the captured value for a parameter, if it was set.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, v)| v.as_deref())
    }

    /// Returns true if the parameter is declared, set or not.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.inner.iter().any(|(n, _)| n == name)
    }

    /// Returns true if there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the number of declared parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Iterates over all parameters, including unset ones.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.inner.iter().map(|(n, v)| (n.as_str(), v.as_deref()))
    }

    /// Iterates over parameters that captured a value.
    pub fn present(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner
            .iter()
            .filter_map(|(n, v)| v.as_deref().map(|v| (n.as_str(), v)))
    }
}

impl FromIterator<(String, Option<String>)> for Params {
    fn from_iter<I: IntoIterator<Item = (String, Option<String>)>>(iter: I) -> Self {
        Self {
            inner: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_new() {
        let params = Params::new();
        assert!(params.is_empty());
        assert_eq!(params.len(), 0);
    }

    #[test]
    fn test_params_push_and_get() {
        let mut params = Params::new();
        params.push("id", Some("123"));
        params.push("name", Some("alice"));

        assert_eq!(params.get("id"), Some("123"));
        assert_eq!(params.get("name"), Some("alice"));
        assert_eq!(params.get("unknown"), None);
    }

    #[test]
    fn test_unset_param_is_declared_but_absent() {
        let mut params = Params::new();
        params.push("page", None::<String>);

        assert!(params.contains("page"));
        assert_eq!(params.get("page"), None);
        assert_eq!(params.present().count(), 0);
    }

    #[test]
    fn test_iter_keeps_order() {
        let mut params = Params::new();
        params.push("b", Some("2"));
        params.push("a", None::<String>);
        params.push("c", Some("3"));

        let names: Vec<_> = params.iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["b", "a", "c"]);

        let present: Vec<_> = params.present().collect();
        assert_eq!(present, [("b", "2"), ("c", "3")]);
    }

    #[test]
    fn test_params_many_params() {
        let mut params = Params::new();
        for i in 0..10 {
            params.push(format!("key{i}"), Some(format!("value{i}")));
        }

        assert_eq!(params.len(), 10);
        assert_eq!(params.get("key5"), Some("value5"));
    }
}
