//! Caller hooks consulted before each non-root node is compared.
//!
//! A [`Prefilter`] can suppress a node entirely (no descent, no record) or
//! rewrite the pair of values about to be compared. Plain closures
//! `Fn(&Path, &Key) -> bool` act as prefilters; [`FilterFns`] bundles a
//! prefilter with a normalizer; [`IgnoreRules`] is the declarative form used
//! by configuration.

use std::fmt;

use deepdelta_types::{Key, Path, Value};

use crate::error::{DiffError, DiffResult};

/// Hooks run at every node that has a key (never at the root).
///
/// `path` is the location of the parent; `key` is the member about to be
/// compared.
pub trait Prefilter {
    /// Return `true` to skip this node.
    fn prefilter(&self, _path: &Path, _key: &Key) -> bool {
        false
    }

    /// Return replacement values for the pair about to be compared.
    ///
    /// A side is `None` when the corresponding container does not own `key`.
    fn normalize(
        &self,
        _path: &Path,
        _key: &Key,
        _lhs: Option<&Value>,
        _rhs: Option<&Value>,
    ) -> Option<(Value, Value)> {
        None
    }
}

impl<F> Prefilter for F
where
    F: Fn(&Path, &Key) -> bool,
{
    fn prefilter(&self, path: &Path, key: &Key) -> bool {
        self(path, key)
    }
}

type PrefilterFn<'a> = Box<dyn Fn(&Path, &Key) -> bool + 'a>;
type NormalizeFn<'a> =
    Box<dyn Fn(&Path, &Key, Option<&Value>, Option<&Value>) -> Option<(Value, Value)> + 'a>;

/// A prefilter and a normalizer supplied as closures. Either may be absent.
#[derive(Default)]
pub struct FilterFns<'a> {
    prefilter: Option<PrefilterFn<'a>>,
    normalize: Option<NormalizeFn<'a>>,
}

impl<'a> FilterFns<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefilter(mut self, f: impl Fn(&Path, &Key) -> bool + 'a) -> Self {
        self.prefilter = Some(Box::new(f));
        self
    }

    pub fn with_normalize(
        mut self,
        f: impl Fn(&Path, &Key, Option<&Value>, Option<&Value>) -> Option<(Value, Value)> + 'a,
    ) -> Self {
        self.normalize = Some(Box::new(f));
        self
    }
}

impl Prefilter for FilterFns<'_> {
    fn prefilter(&self, path: &Path, key: &Key) -> bool {
        self.prefilter.as_ref().is_some_and(|f| f(path, key))
    }

    fn normalize(
        &self,
        path: &Path,
        key: &Key,
        lhs: Option<&Value>,
        rhs: Option<&Value>,
    ) -> Option<(Value, Value)> {
        self.normalize.as_ref().and_then(|f| f(path, key, lhs, rhs))
    }
}

impl fmt::Debug for FilterFns<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterFns")
            .field("prefilter", &self.prefilter.is_some())
            .field("normalize", &self.normalize.is_some())
            .finish()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    Any,
    Exact(String),
}

/// Suppresses nodes whose full path matches one of a set of patterns.
///
/// Patterns are dotted paths (`config.secret`, `users.*.password`); `*`
/// matches any single segment and numeric segments match sequence
/// positions. A pattern matches only paths of exactly its length, so its
/// subtree is skipped by virtue of never being entered.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IgnoreRules {
    patterns: Vec<Vec<Segment>>,
}

impl IgnoreRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a list of dotted patterns.
    pub fn parse<S: AsRef<str>>(patterns: &[S]) -> DiffResult<Self> {
        let mut rules = Self::new();
        for pattern in patterns {
            rules.add(pattern.as_ref())?;
        }
        Ok(rules)
    }

    /// Add one dotted pattern.
    pub fn add(&mut self, pattern: &str) -> DiffResult<()> {
        let segments = pattern
            .split('.')
            .map(|seg| match seg {
                "" => Err(DiffError::InvalidIgnorePattern(pattern.to_owned())),
                "*" => Ok(Segment::Any),
                other => Ok(Segment::Exact(other.to_owned())),
            })
            .collect::<DiffResult<Vec<_>>>()?;
        self.patterns.push(segments);
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Returns `true` if the node at `path` + `key` is ignored.
    pub fn matches(&self, path: &Path, key: &Key) -> bool {
        let full: Vec<&Key> = path.iter().chain(std::iter::once(key)).collect();
        self.patterns.iter().any(|pattern| {
            pattern.len() == full.len()
                && pattern.iter().zip(&full).all(|(seg, key)| match seg {
                    Segment::Any => true,
                    Segment::Exact(text) => key.to_string() == *text,
                })
        })
    }
}

impl Prefilter for IgnoreRules {
    fn prefilter(&self, path: &Path, key: &Key) -> bool {
        self.matches(path, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_prefilters() {
        let f = |_: &Path, key: &Key| key == &Key::name("skip");
        assert!(Prefilter::prefilter(&f, &Path::root(), &Key::name("skip")));
        assert!(!Prefilter::prefilter(&f, &Path::root(), &Key::name("keep")));
        assert!(f.normalize(&Path::root(), &Key::name("x"), None, None).is_none());
    }

    #[test]
    fn filter_fns_default_to_no_ops() {
        let fns = FilterFns::new();
        assert!(!fns.prefilter(&Path::root(), &Key::name("a")));
        assert!(fns
            .normalize(&Path::root(), &Key::name("a"), None, None)
            .is_none());
    }

    #[test]
    fn filter_fns_normalize() {
        let fns = FilterFns::new().with_normalize(|_, _, lhs, rhs| {
            let lower = |v: Option<&Value>| {
                Value::from(v.and_then(Value::as_str).unwrap_or_default().to_lowercase())
            };
            Some((lower(lhs), lower(rhs)))
        });
        let (l, r) = fns
            .normalize(
                &Path::root(),
                &Key::name("a"),
                Some(&Value::from("ABC")),
                Some(&Value::from("abc")),
            )
            .unwrap();
        assert_eq!(l, r);
    }

    #[test]
    fn ignore_rules_match_exact_length() {
        let rules = IgnoreRules::parse(&["secret", "users.*.password"]).unwrap();
        assert_eq!(rules.len(), 2);
        assert!(rules.matches(&Path::root(), &Key::name("secret")));
        assert!(!rules.matches(&Path::root().with("a"), &Key::name("secret")));
        assert!(rules.matches(
            &Path::root().with("users").with(3usize),
            &Key::name("password")
        ));
        assert!(!rules.matches(&Path::root().with("users"), &Key::Index(3)));
    }

    #[test]
    fn ignore_rules_match_positions() {
        let rules = IgnoreRules::parse(&["items.0"]).unwrap();
        assert!(rules.matches(&Path::root().with("items"), &Key::Index(0)));
        assert!(!rules.matches(&Path::root().with("items"), &Key::Index(1)));
    }

    #[test]
    fn empty_segments_are_rejected() {
        assert!(matches!(
            IgnoreRules::parse(&["a..b"]),
            Err(DiffError::InvalidIgnorePattern(p)) if p == "a..b"
        ));
        assert!(IgnoreRules::parse(&[""]).is_err());
    }
}
