//! Featgen Model
//!
//! Value types shared by every stage of feature generation.
//!
//! # Core Concepts
//!
//! - [`Feature`]: Case-preserving, case-insensitively compared feature token
//! - [`FeatureSet`]: Deterministically ordered set of features with set algebra
//! - [`Dependency`]: Build dependency coordinate (group, name, version)
//! - [`VersionResolver`]: Picks the EE and MicroProfile umbrella levels
//!
//! # Example
//!
//! ```rust
//! use featgen_model::{Dependency, FeatureSet, VersionResolver};
//!
//! let scanned = FeatureSet::from_names(["servlet-4.0", "jaxrs-2.1"]).unwrap();
//! let declared = FeatureSet::from_names(["JAXRS-2.1", "usr:custom-1.0"]).unwrap();
//! let missing = scanned.difference(&declared);
//! assert_eq!(missing.to_string(), "[servlet-4.0]");
//!
//! let deps = [Dependency::new("javax", "javaee-api", "8.0")];
//! let versions = VersionResolver::resolve(&deps);
//! assert_eq!(versions.ee.map(|l| l.label()), Some("ee8"));
//! ```

#![warn(unreachable_pub)]

// Core modules
mod dependency;
mod feature;
mod version;

// Re-exports
pub use dependency::Dependency;
pub use feature::{Feature, FeatureError, FeatureSet, CUSTOM_FEATURE_SEPARATOR};
pub use version::{EeLevel, MpLevel, PlatformVersions, VersionResolver};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
