//! Features and feature sets
//!
//! A [`Feature`] keeps the spelling it was declared with but compares,
//! hashes and orders on its lowercase form, so `Servlet-4.0` and
//! `servlet-4.0` are the same member of a [`FeatureSet`].

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Separator between namespace and name of a custom (user) feature
pub const CUSTOM_FEATURE_SEPARATOR: char = ':';

/// Errors constructing a feature
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeatureError {
    /// Blank feature token
    #[error("feature name must not be empty")]
    Empty,

    /// Token with embedded whitespace
    #[error("invalid feature name '{0}': contains whitespace")]
    ContainsWhitespace(String),
}

/// A platform capability token such as `servlet-4.0` or `usr:myFeature-1.0`
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Feature {
    /// Spelling as declared
    name: String,
    /// Lowercase comparison key
    key: String,
}

impl Feature {
    /// Create a feature from a declared token
    ///
    /// Surrounding whitespace is trimmed; the remaining spelling is kept.
    ///
    /// # Errors
    /// Returns error if the token is blank or contains inner whitespace
    pub fn new(name: impl AsRef<str>) -> Result<Self, FeatureError> {
        let trimmed = name.as_ref().trim();
        if trimmed.is_empty() {
            return Err(FeatureError::Empty);
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(FeatureError::ContainsWhitespace(trimmed.to_string()));
        }
        Ok(Self {
            name: trimmed.to_string(),
            key: trimmed.to_lowercase(),
        })
    }

    /// Declared spelling
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Case-folded form used for comparison
    #[inline]
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Whether this is a namespaced custom feature (`namespace:name`)
    #[inline]
    #[must_use]
    pub fn is_custom(&self) -> bool {
        self.name.contains(CUSTOM_FEATURE_SEPARATOR)
    }

    /// Copy of this feature spelled in lowercase
    #[inline]
    #[must_use]
    pub fn to_folded(&self) -> Self {
        Self {
            name: self.key.clone(),
            key: self.key.clone(),
        }
    }
}

impl PartialEq for Feature {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Feature {}

impl Hash for Feature {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl PartialOrd for Feature {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Feature {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

impl fmt::Debug for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Feature({})", self.name)
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl TryFrom<String> for Feature {
    type Error = FeatureError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for Feature {
    type Error = FeatureError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Feature> for String {
    fn from(feature: Feature) -> Self {
        feature.name
    }
}

/// Set of features
///
/// Membership is case-insensitive. Iteration is ordered by the folded
/// key, which keeps rendered output stable across runs with the same
/// input.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureSet {
    inner: BTreeSet<Feature>,
}

impl FeatureSet {
    /// Create empty set
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from declared tokens
    ///
    /// # Errors
    /// Returns the first token that is not a valid feature
    pub fn from_names<I, S>(names: I) -> Result<Self, FeatureError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names.into_iter().map(Feature::new).collect()
    }

    /// Insert a feature
    ///
    /// Returns `false` if an equal feature (ignoring case) was present; the
    /// existing spelling is kept.
    #[inline]
    pub fn insert(&mut self, feature: Feature) -> bool {
        self.inner.insert(feature)
    }

    /// Membership test
    #[inline]
    #[must_use]
    pub fn contains(&self, feature: &Feature) -> bool {
        self.inner.contains(feature)
    }

    /// Membership test by token, ignoring case
    #[must_use]
    pub fn contains_name(&self, name: &str) -> bool {
        Feature::new(name).is_ok_and(|f| self.inner.contains(&f))
    }

    /// Number of features
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether the set is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Iterate in key order
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.inner.iter()
    }

    /// Iterate declared spellings in key order
    #[inline]
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.inner.iter().map(Feature::name)
    }

    /// `self − other`
    #[must_use]
    pub fn difference(&self, other: &FeatureSet) -> FeatureSet {
        self.inner.difference(&other.inner).cloned().collect()
    }

    /// `self ∪ other`, keeping `self`'s spelling on collisions
    #[must_use]
    pub fn union(&self, other: &FeatureSet) -> FeatureSet {
        self.inner.union(&other.inner).cloned().collect()
    }

    /// `self ∩ other`
    #[must_use]
    pub fn intersection(&self, other: &FeatureSet) -> FeatureSet {
        self.inner.intersection(&other.inner).cloned().collect()
    }

    /// Whether every member of `other` is in `self`
    #[inline]
    #[must_use]
    pub fn is_superset(&self, other: &FeatureSet) -> bool {
        self.inner.is_superset(&other.inner)
    }

    /// Whether every member of `self` is in `other`
    #[inline]
    #[must_use]
    pub fn is_subset(&self, other: &FeatureSet) -> bool {
        self.inner.is_subset(&other.inner)
    }

    /// Features without a namespace prefix
    ///
    /// These are the only features an analyzer understands.
    #[must_use]
    pub fn platform_only(&self) -> FeatureSet {
        self.inner.iter().filter(|f| !f.is_custom()).cloned().collect()
    }

    /// Namespaced custom features
    #[must_use]
    pub fn custom_only(&self) -> FeatureSet {
        self.inner.iter().filter(|f| f.is_custom()).cloned().collect()
    }

    /// Copy with every feature spelled in lowercase
    #[must_use]
    pub fn to_folded(&self) -> FeatureSet {
        self.inner.iter().map(Feature::to_folded).collect()
    }
}

impl fmt::Debug for FeatureSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}

/// Renders as `[a, b, c]`
impl fmt::Display for FeatureSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, feature) in self.inner.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(feature.name())?;
        }
        f.write_str("]")
    }
}

impl FromIterator<Feature> for FeatureSet {
    fn from_iter<I: IntoIterator<Item = Feature>>(iter: I) -> Self {
        Self {
            inner: iter.into_iter().collect(),
        }
    }
}

impl Extend<Feature> for FeatureSet {
    fn extend<I: IntoIterator<Item = Feature>>(&mut self, iter: I) {
        self.inner.extend(iter);
    }
}

impl IntoIterator for FeatureSet {
    type Item = Feature;
    type IntoIter = std::collections::btree_set::IntoIter<Feature>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.into_iter()
    }
}

impl<'a> IntoIterator for &'a FeatureSet {
    type Item = &'a Feature;
    type IntoIter = std::collections::btree_set::Iter<'a, Feature>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter()
    }
}
