//! Featgen Config Layer
//!
//! The boundary between server configuration files on disk and the
//! feature model.
//!
//! # Core Operations
//!
//! - **Read**: Collect `<feature>` declarations from `server.xml`, its
//!   includes and the `configDropins` directories
//! - **Build**: Assemble a generated configuration fragment
//! - **Annotate**: Add a one-time pointer comment to the primary configuration
//!
//! # Architecture
//!
//! ```text
//! configDropins/defaults/*.xml ─┐
//! server.xml (+ includes) ──────┼─► ServerConfigReader ─► FeatureSet
//! configDropins/overrides/*.xml ┘
//!
//! FeatureSet ─► ConfigDocument ─► configDropins/overrides/generated-features.xml
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use featgen_config::{CaseMode, ReadOptions, ServerConfigReader, ServerLayout};
//!
//! let layout = ServerLayout::new("src/main/liberty/config");
//! let options = ReadOptions::new(CaseMode::Preserve).exclude(layout.generated_features_path());
//! let declared = ServerConfigReader::new().read_features(&layout, &options)?;
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

// Core modules
pub mod document;
pub mod error;
pub mod layout;
pub mod pointer;
pub mod reader;

// Re-exports for convenience
pub use document::ConfigDocument;
pub use error::{ConfigError, ConfigResult};
pub use layout::{ServerLayout, GENERATED_FEATURES_FILE, GENERATED_FEATURES_PATH};
pub use pointer::{has_pointer_comment, insert_pointer_comment};
pub use reader::{CaseMode, ReadOptions, ServerConfigReader};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with server configuration
    pub use crate::document::ConfigDocument;
    pub use crate::error::{ConfigError, ConfigResult};
    pub use crate::layout::ServerLayout;
    pub use crate::reader::{CaseMode, ReadOptions, ServerConfigReader};
    pub use featgen_model::{Feature, FeatureSet};
}
