//! Platform umbrella version resolution
//!
//! Scans the build dependencies for EE and MicroProfile umbrella
//! coordinates and picks one level per track.
//!
//! # Selection rules
//!
//! - A candidate replaces the current selection only if its label compares
//!   greater as a plain string ([`EeLevel::is_newer_than`],
//!   [`MpLevel::is_newer_than`]). This is not a numeric comparison:
//!   `mp3` sorts before `mp3.3`, and `mp10` would sort before `mp2`.
//! - A Jakarta EE 8 umbrella selects [`EeLevel::EE8`] unconditionally.
//! - A MicroProfile `4.x` umbrella selects [`MpLevel::MP4`] unconditionally.

use crate::dependency::Dependency;
use serde::Serialize;
use std::fmt;

/// Java EE umbrella coordinates, as `(group, name)`
const EE_UMBRELLAS: &[(&str, &str)] = &[("javax", "javaee-api"), ("javax", "javaee-web-api")];

/// Jakarta EE umbrella coordinate
const JAKARTA_UMBRELLA: (&str, &str) = ("jakarta.platform", "jakarta.jakartaee-api");

/// MicroProfile umbrella coordinate
const MP_UMBRELLA: (&str, &str) = ("org.eclipse.microprofile", "microprofile");

/// Known `major.minor` MicroProfile releases
const MP_RELEASES: &[(&str, MpLevel)] = &[
    ("1.0", MpLevel("mp1.0")),
    ("1.2", MpLevel("mp1.2")),
    ("1.3", MpLevel("mp1.3")),
    ("1.4", MpLevel("mp1.4")),
    ("2.0", MpLevel("mp2.0")),
    ("2.1", MpLevel("mp2.1")),
    ("2.2", MpLevel("mp2.2")),
    ("3.0", MpLevel("mp3.0")),
    ("3.2", MpLevel("mp3.2")),
    ("3.3", MpLevel("mp3.3")),
];

/// Java EE / Jakarta EE platform level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct EeLevel(&'static str);

impl EeLevel {
    /// Java EE 6
    pub const EE6: Self = Self("ee6");
    /// Java EE 7
    pub const EE7: Self = Self("ee7");
    /// Java EE 8 / Jakarta EE 8
    pub const EE8: Self = Self("ee8");

    /// Level label understood by the analyzer
    #[inline]
    #[must_use]
    pub fn label(self) -> &'static str {
        self.0
    }

    /// Map an EE umbrella version by its major prefix
    #[must_use]
    pub fn from_version(version: &str) -> Option<Self> {
        if version.starts_with("8.") {
            Some(Self::EE8)
        } else if version.starts_with("7.") {
            Some(Self::EE7)
        } else if version.starts_with("6.") {
            Some(Self::EE6)
        } else {
            None
        }
    }

    /// Lexicographic label comparison against the current selection
    #[inline]
    #[must_use]
    pub fn is_newer_than(self, current: Option<Self>) -> bool {
        current.map_or(true, |c| self.0 > c.0)
    }
}

impl fmt::Display for EeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// MicroProfile platform level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct MpLevel(&'static str);

impl MpLevel {
    /// MicroProfile 1.x
    pub const MP1: Self = Self("mp1");
    /// MicroProfile 2.x
    pub const MP2: Self = Self("mp2");
    /// MicroProfile 3.x
    pub const MP3: Self = Self("mp3");
    /// MicroProfile 4.x
    pub const MP4: Self = Self("mp4");

    /// Level label understood by the analyzer
    #[inline]
    #[must_use]
    pub fn label(self) -> &'static str {
        self.0
    }

    /// Exact `major.minor` lookup
    #[must_use]
    pub fn from_release(version: &str) -> Option<Self> {
        MP_RELEASES
            .iter()
            .find(|(release, _)| *release == version)
            .map(|(_, level)| *level)
    }

    /// Major-digit fallback for 1, 2 and 3
    #[must_use]
    pub fn from_major(version: &str) -> Option<Self> {
        match version.chars().next()? {
            '1' => Some(Self::MP1),
            '2' => Some(Self::MP2),
            '3' => Some(Self::MP3),
            _ => None,
        }
    }

    /// Lexicographic label comparison against the current selection
    #[inline]
    #[must_use]
    pub fn is_newer_than(self, current: Option<Self>) -> bool {
        current.map_or(true, |c| self.0 > c.0)
    }
}

impl fmt::Display for MpLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Levels selected for both tracks
///
/// `None` means the analyzer should detect the level itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PlatformVersions {
    /// EE track
    pub ee: Option<EeLevel>,
    /// MicroProfile track
    pub mp: Option<MpLevel>,
}

/// Stateless umbrella-version resolver
#[derive(Debug, Clone, Copy, Default)]
pub struct VersionResolver;

impl VersionResolver {
    /// Resolve both tracks
    #[must_use]
    pub fn resolve(dependencies: &[Dependency]) -> PlatformVersions {
        PlatformVersions {
            ee: Self::resolve_ee(dependencies),
            mp: Self::resolve_mp(dependencies),
        }
    }

    /// Newest EE level among the dependencies
    #[must_use]
    pub fn resolve_ee(dependencies: &[Dependency]) -> Option<EeLevel> {
        let mut selected: Option<EeLevel> = None;
        for dep in dependencies {
            if EE_UMBRELLAS.iter().any(|(g, n)| dep.is(g, n)) {
                match EeLevel::from_version(&dep.version) {
                    Some(level) if level.is_newer_than(selected) => selected = Some(level),
                    Some(_) => {}
                    None => tracing::debug!("unrecognised EE umbrella version: {}", dep),
                }
            }
            if dep.is(JAKARTA_UMBRELLA.0, JAKARTA_UMBRELLA.1) {
                if dep.version.starts_with("8.") {
                    selected = Some(EeLevel::EE8);
                } else {
                    tracing::debug!("ignoring Jakarta EE umbrella outside 8.x: {}", dep);
                }
            }
        }
        selected
    }

    /// Newest MicroProfile level among the dependencies
    #[must_use]
    pub fn resolve_mp(dependencies: &[Dependency]) -> Option<MpLevel> {
        let mut selected: Option<MpLevel> = None;
        for dep in dependencies
            .iter()
            .filter(|d| d.is(MP_UMBRELLA.0, MP_UMBRELLA.1))
        {
            let version = dep.version.as_str();
            if version.starts_with('4') {
                selected = Some(MpLevel::MP4);
                continue;
            }
            let candidate = if version.split('.').count() == 2 {
                MpLevel::from_release(version).or_else(|| MpLevel::from_major(version))
            } else {
                MpLevel::from_major(version)
            };
            match candidate {
                Some(level) if level.is_newer_than(selected) => selected = Some(level),
                Some(_) => {}
                None => tracing::debug!("unrecognised MicroProfile umbrella version: {}", dep),
            }
        }
        selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn javaee(version: &str) -> Dependency {
        Dependency::new("javax", "javaee-api", version)
    }

    fn jakarta(version: &str) -> Dependency {
        Dependency::new("jakarta.platform", "jakarta.jakartaee-api", version)
    }

    fn mp(version: &str) -> Dependency {
        Dependency::new("org.eclipse.microprofile", "microprofile", version)
    }

    #[test]
    fn javaee_8_resolves_ee8() {
        assert_eq!(VersionResolver::resolve_ee(&[javaee("8.0")]), Some(EeLevel::EE8));
    }

    #[test]
    fn javaee_major_prefixes() {
        assert_eq!(VersionResolver::resolve_ee(&[javaee("7.0")]), Some(EeLevel::EE7));
        assert_eq!(VersionResolver::resolve_ee(&[javaee("6.0")]), Some(EeLevel::EE6));
        assert_eq!(VersionResolver::resolve_ee(&[javaee("5.0")]), None);
    }

    #[test]
    fn newest_ee_wins_regardless_of_order() {
        assert_eq!(
            VersionResolver::resolve_ee(&[javaee("8.0"), javaee("7.0")]),
            Some(EeLevel::EE8)
        );
        assert_eq!(
            VersionResolver::resolve_ee(&[javaee("6.0"), javaee("7.0")]),
            Some(EeLevel::EE7)
        );
    }

    #[test]
    fn jakarta_8_wins_over_javaee_7() {
        assert_eq!(
            VersionResolver::resolve_ee(&[jakarta("8.0.0"), javaee("7.0")]),
            Some(EeLevel::EE8)
        );
        assert_eq!(
            VersionResolver::resolve_ee(&[javaee("7.0"), jakarta("8.0.0")]),
            Some(EeLevel::EE8)
        );
    }

    #[test]
    fn jakarta_9_is_ignored() {
        assert_eq!(VersionResolver::resolve_ee(&[jakarta("9.1.0")]), None);
    }

    #[test]
    fn unrelated_dependencies_select_nothing() {
        let deps = [Dependency::new("org.slf4j", "slf4j-api", "8.0")];
        assert_eq!(VersionResolver::resolve(&deps), PlatformVersions::default());
    }

    #[test]
    fn mp_release_table_lookup() {
        assert_eq!(
            VersionResolver::resolve_mp(&[mp("3.3")]).map(MpLevel::label),
            Some("mp3.3")
        );
        assert_eq!(
            VersionResolver::resolve_mp(&[mp("1.2")]).map(MpLevel::label),
            Some("mp1.2")
        );
    }

    #[test]
    fn mp_major_fallback() {
        assert_eq!(VersionResolver::resolve_mp(&[mp("2.0.1")]), Some(MpLevel::MP2));
        assert_eq!(VersionResolver::resolve_mp(&[mp("1.1")]), Some(MpLevel::MP1));
    }

    #[test]
    fn mp_4_overwrites_unconditionally() {
        assert_eq!(
            VersionResolver::resolve_mp(&[mp("3.3"), mp("4.0")]),
            Some(MpLevel::MP4)
        );
        assert_eq!(
            VersionResolver::resolve_mp(&[mp("4.1"), mp("3.0")]),
            Some(MpLevel::MP4)
        );
    }

    #[test]
    fn mp_comparison_is_lexicographic() {
        // "3.9" is not a known release, falls back to "mp3", and "mp3" < "mp3.3"
        assert_eq!(
            VersionResolver::resolve_mp(&[mp("3.3"), mp("3.9")]).map(MpLevel::label),
            Some("mp3.3")
        );
        assert!(MpLevel::MP3.is_newer_than(Some(MpLevel::MP2)));
        assert!(!MpLevel::MP3.is_newer_than(MpLevel::from_release("3.0")));
    }

    #[test]
    fn labels_serialize_as_strings() {
        let versions = PlatformVersions {
            ee: Some(EeLevel::EE7),
            mp: Some(MpLevel::MP2),
        };
        assert_eq!(
            serde_json::to_string(&versions).unwrap(),
            r#"{"ee":"ee7","mp":"mp2"}"#
        );
    }
}
