//! Pointer comment in the primary configuration
//!
//! The primary configuration is user-owned. The only change ever made to
//! it is one comment spliced in right after the opening `<server>` tag;
//! every other byte of the file is left as it was.

use crate::error::{ConfigError, ConfigResult};
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use std::fs;
use std::path::Path;

/// Whether any comment in the document contains `marker`
///
/// # Errors
/// - `ConfigError::Io` if the file cannot be read
/// - `ConfigError::Xml` if the document is malformed
pub fn has_pointer_comment(server_xml: &Path, marker: &str) -> ConfigResult<bool> {
    let content = fs::read_to_string(server_xml).map_err(|e| ConfigError::io_error(server_xml, e))?;
    let mut reader = Reader::from_str(&content);
    loop {
        match reader.read_event() {
            Ok(Event::Comment(c)) => {
                if String::from_utf8_lossy(&c).contains(marker) {
                    return Ok(true);
                }
            }
            Ok(Event::Eof) => return Ok(false),
            Err(e) => return Err(ConfigError::xml_error(server_xml, e)),
            _ => {}
        }
    }
}

/// Insert `<!-- text -->` as the first child of `<server>`
///
/// # Errors
/// - `ConfigError::Io` if the file cannot be read or written
/// - `ConfigError::Xml` if the document is malformed
/// - `ConfigError::MissingRoot` if there is no `<server>` element
pub fn insert_pointer_comment(server_xml: &Path, text: &str) -> ConfigResult<()> {
    let content = fs::read_to_string(server_xml).map_err(|e| ConfigError::io_error(server_xml, e))?;
    let updated = splice_comment(&content, text)
        .map_err(|e| ConfigError::xml_error(server_xml, e))?
        .ok_or_else(|| ConfigError::MissingRoot(server_xml.to_path_buf()))?;
    fs::write(server_xml, updated).map_err(|e| ConfigError::io_error(server_xml, e))?;
    tracing::debug!("added pointer comment to {}", server_xml.display());
    Ok(())
}

/// `content` with the comment spliced in; `None` without a `<server>` root
fn splice_comment(content: &str, text: &str) -> quick_xml::Result<Option<String>> {
    let comment = format!(
        "<!--{}-->",
        String::from_utf8_lossy(&crate::document::comment_text(text))
    );
    let mut reader = Reader::from_str(content);
    loop {
        let before = reader.buffer_position();
        match reader.read_event()? {
            Event::Start(e) if e.local_name().as_ref() == b"server" => {
                let after = reader.buffer_position();
                let indent = child_indent(&content[after..]);
                let mut out = String::with_capacity(content.len() + comment.len() + 8);
                out.push_str(&content[..after]);
                out.push('\n');
                out.push_str(&indent);
                out.push_str(&comment);
                out.push_str(&content[after..]);
                return Ok(Some(out));
            }
            Event::Empty(e) if e.local_name().as_ref() == b"server" => {
                let after = reader.buffer_position();
                let tag = &content[before..after];
                let Some(close) = tag.rfind("/>") else {
                    return Ok(None);
                };
                let open = format!("{}>", tag[..close].trim_end());
                let mut out = String::with_capacity(content.len() + comment.len() + 16);
                out.push_str(&content[..before]);
                out.push_str(&open);
                out.push_str("\n    ");
                out.push_str(&comment);
                out.push_str("\n</server>");
                out.push_str(&content[after..]);
                return Ok(Some(out));
            }
            Event::Start(_) | Event::Empty(_) | Event::Eof => return Ok(None),
            _ => {}
        }
    }
}

/// Indentation of the first child line, defaulting to four spaces
fn child_indent(rest: &str) -> String {
    rest.lines()
        .skip(1)
        .find(|l| !l.trim().is_empty())
        .map(|l| l.chars().take_while(|c| *c == ' ' || *c == '\t').collect::<String>())
        .filter(|i| !i.is_empty())
        .unwrap_or_else(|| "    ".to_string())
}
