//! Generated configuration documents
//!
//! A [`ConfigDocument`] is always rendered in full. Nothing here patches an
//! existing file.

use crate::error::{ConfigError, ConfigResult};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::writer::Writer;
use std::fs;
use std::io::Cursor;
use std::path::Path;

/// A `<server>` document holding comments and one `<featureManager>`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigDocument {
    comments: Vec<String>,
    feature_manager: Option<FeatureManager>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct FeatureManager {
    comments: Vec<String>,
    features: Vec<String>,
}

impl ConfigDocument {
    /// Empty `<server>` document
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a comment directly under `<server>`
    pub fn create_comment(&mut self, text: impl Into<String>) -> &mut Self {
        self.comments.push(text.into());
        self
    }

    /// Ensure the document has a `<featureManager>`
    pub fn create_feature_manager(&mut self) -> &mut Self {
        self.feature_manager.get_or_insert_with(FeatureManager::default);
        self
    }

    /// Add a comment inside `<featureManager>`, creating it if needed
    pub fn create_feature_manager_comment(&mut self, text: impl Into<String>) -> &mut Self {
        self.feature_manager
            .get_or_insert_with(FeatureManager::default)
            .comments
            .push(text.into());
        self
    }

    /// Add a `<feature>` entry, creating `<featureManager>` if needed
    pub fn create_feature(&mut self, name: impl Into<String>) -> &mut Self {
        self.feature_manager
            .get_or_insert_with(FeatureManager::default)
            .features
            .push(name.into());
        self
    }

    /// Feature entries in insertion order
    #[must_use]
    pub fn features(&self) -> &[String] {
        self.feature_manager
            .as_ref()
            .map_or(&[], |fm| fm.features.as_slice())
    }

    /// Render to a string with an XML declaration and four-space indent
    ///
    /// # Errors
    /// Returns `ConfigError::Render` if the writer fails
    pub fn to_xml(&self) -> ConfigResult<String> {
        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 4);
        self.render(&mut writer).map_err(ConfigError::Render)?;
        let mut bytes = writer.into_inner().into_inner();
        bytes.push(b'\n');
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Render and write to `path`, creating parent directories
    ///
    /// # Errors
    /// - `ConfigError::Render` if rendering fails
    /// - `ConfigError::Io` if the directory or file cannot be written
    pub fn write(&self, path: &Path) -> ConfigResult<()> {
        let xml = self.to_xml()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::io_error(parent, e))?;
        }
        fs::write(path, xml).map_err(|e| ConfigError::io_error(path, e))
    }

    fn render(&self, writer: &mut Writer<Cursor<Vec<u8>>>) -> quick_xml::Result<()> {
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        writer.write_event(Event::Start(BytesStart::new("server")))?;
        for comment in &self.comments {
            writer.write_event(Event::Comment(comment_text(comment)))?;
        }
        if let Some(fm) = &self.feature_manager {
            writer.write_event(Event::Start(BytesStart::new("featureManager")))?;
            for comment in &fm.comments {
                writer.write_event(Event::Comment(comment_text(comment)))?;
            }
            for feature in &fm.features {
                writer.write_event(Event::Start(BytesStart::new("feature")))?;
                writer.write_event(Event::Text(BytesText::new(feature)))?;
                writer.write_event(Event::End(BytesEnd::new("feature")))?;
            }
            writer.write_event(Event::End(BytesEnd::new("featureManager")))?;
        }
        writer.write_event(Event::End(BytesEnd::new("server")))?;
        Ok(())
    }
}

/// Comment body padded with spaces; `--` is not allowed inside XML comments
pub(crate) fn comment_text(text: &str) -> BytesText<'static> {
    let body = text.replace("--", "- -");
    BytesText::from_escaped(format!(" {body} "))
}
