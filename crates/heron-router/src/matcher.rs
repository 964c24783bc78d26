//! Combined single-regex matcher.
//!
//! All compiled fragments are joined into one alternation:
//!
//! ```text
//! ^(?:(?P<r0>/book/(?P<r0p0>[\d]+))|(?P<r1>/users/(?P<r1p0>[^/]+))|...)$
//! ```
//!
//! Each route is wrapped in a branch group `r{index}` so a single regex
//! pass tells which route fired. The regex engine uses leftmost-first
//! semantics, so when several routes could match the first registered one
//! wins. Parameter groups are renamed to `r{index}p{n}` because the engine
//! rejects duplicate group names across branches; the per-route name table
//! maps them back to the declared names.

use std::borrow::Cow;

use percent_encoding::percent_decode_str;
use regex::{Regex, RegexBuilder};

use crate::{CompiledPattern, MatchOptions, Params, RouteError};

/// A successful match against the combined matcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    /// Index of the matched route in declaration order.
    pub route_index: usize,
    /// The normalized path that was matched.
    pub path: String,
    /// Declared parameters in first-occurrence order.
    pub params: Params,
    /// Every named group that participated, by raw group name.
    pub captures: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
struct Branch {
    marker: String,
    groups: Vec<(String, String)>,
}

/// One regex covering every registered route.
///
/// # Example
///
/// ```rust
/// use heron_router::{CompiledPattern, MatchOptions, Matcher};
///
/// let options = MatchOptions::default();
/// let routes = [
///     CompiledPattern::compile("/x/:id", &options).unwrap(),
///     CompiledPattern::compile("/x/fixed", &options).unwrap(),
/// ];
/// let matcher = Matcher::build(&routes, &options).unwrap();
///
/// let found = matcher.find("/x/fixed").unwrap();
/// assert_eq!(found.route_index, 0);
/// assert_eq!(found.params.get("id"), Some("fixed"));
/// ```
#[derive(Debug, Clone)]
pub struct Matcher {
    regex: Regex,
    branches: Vec<Branch>,
}

impl Matcher {
    /// Builds the combined matcher from compiled patterns in declaration order.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::EmptyTable`] when no patterns are given and
    /// [`RouteError::Matcher`] if the combined regex fails to compile.
    pub fn build<'a>(
        patterns: impl IntoIterator<Item = &'a CompiledPattern>,
        options: &MatchOptions,
    ) -> Result<Self, RouteError> {
        let mut source = String::from("^(?:");
        let mut branches = Vec::new();

        for (index, compiled) in patterns.into_iter().enumerate() {
            let groups: Vec<(String, String)> = compiled
                .params()
                .iter()
                .enumerate()
                .map(|(n, name)| (name.clone(), format!("r{index}p{n}")))
                .collect();
            let marker = format!("r{index}");
            let fragment = compiled.render(|n| groups[n].1.clone());

            if index > 0 {
                source.push('|');
            }
            source.push_str("(?P<");
            source.push_str(&marker);
            source.push('>');
            source.push_str(&fragment);
            source.push(')');

            branches.push(Branch { marker, groups });
        }

        if branches.is_empty() {
            return Err(RouteError::EmptyTable);
        }
        source.push_str(")$");

        let regex = RegexBuilder::new(&source)
            .unicode(options.unicode)
            .build()
            .map_err(|e| RouteError::Matcher(e.to_string()))?;

        tracing::debug!(routes = branches.len(), "built combined route matcher");
        Ok(Self { regex, branches })
    }

    /// Matches an already-normalized path.
    #[must_use]
    pub fn find(&self, path: &str) -> Option<RouteMatch> {
        let caps = self.regex.captures(path)?;
        let (route_index, branch) = self
            .branches
            .iter()
            .enumerate()
            .find(|(_, branch)| caps.name(&branch.marker).is_some())?;

        let params: Params = branch
            .groups
            .iter()
            .map(|(param, group)| {
                (
                    param.clone(),
                    caps.name(group).map(|m| m.as_str().to_string()),
                )
            })
            .collect();

        let captures = self
            .regex
            .capture_names()
            .flatten()
            .filter_map(|name| {
                caps.name(name)
                    .map(|m| (name.to_string(), m.as_str().to_string()))
            })
            .collect();

        Some(RouteMatch {
            route_index,
            path: path.to_string(),
            params,
            captures,
        })
    }

    /// Returns the number of routes covered by the matcher.
    #[must_use]
    pub fn len(&self) -> usize {
        self.branches.len()
    }

    /// Always false; a matcher cannot be built without routes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }
}

/// Normalizes an incoming request path for matching.
///
/// Optionally percent-decodes the path, collapses repeated slashes and
/// strips one trailing slash unless the path is the root.
///
/// ```rust
/// use heron_router::{normalize_path, MatchOptions};
///
/// let options = MatchOptions::default();
/// assert_eq!(normalize_path("/a//b/", &options), "/a/b");
/// assert_eq!(normalize_path("/caf%C3%A9", &options), "/café");
/// assert_eq!(normalize_path("", &options), "/");
/// ```
#[must_use]
pub fn normalize_path(path: &str, options: &MatchOptions) -> String {
    let decoded: Cow<'_, str> = if options.decode_uri {
        percent_decode_str(path).decode_utf8_lossy()
    } else {
        Cow::Borrowed(path)
    };

    let mut out = String::with_capacity(decoded.len());
    for c in decoded.chars() {
        if c == '/' && out.ends_with('/') {
            continue;
        }
        out.push(c);
    }

    if out.is_empty() {
        out.push('/');
    } else if out.len() > 1 && out.ends_with('/') {
        out.pop();
    }
    out
}
