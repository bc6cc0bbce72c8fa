//! Multipart form description.
//!
//! Forms are plain values so that a request can be cloned and re-sent on
//! retry. File contents are either held in memory or referenced by path and
//! streamed from disk by the transport on every attempt.

use std::path::{Path, PathBuf};

/// Where the bytes of an uploaded file come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSource {
    /// File contents already in memory.
    Bytes(Vec<u8>),
    /// File on disk, opened and streamed when the request is sent.
    Path(PathBuf),
}

/// A single part of a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPart {
    /// A plain text field.
    Text {
        /// Field name
        name: String,
        /// Field value
        value: String,
    },
    /// A file field.
    File {
        /// Field name
        name: String,
        /// File name reported to the server
        file_name: String,
        /// Optional MIME type of the file
        content_type: Option<String>,
        /// File contents
        source: FileSource,
    },
}

impl FormPart {
    /// Returns the form field name of this part.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Text { name, .. } | Self::File { name, .. } => name,
        }
    }
}

/// An ordered list of multipart form parts.
///
/// # Example
///
/// ```
/// use iv_ingestion::transport::{FileSource, MultipartForm};
/// use serde_json::json;
///
/// let form = MultipartForm::new()
///     .with_field("metadata", &json!({"propertyId": "123"}))
///     .with_file("file", "report.pdf", FileSource::Bytes(b"%PDF".to_vec()));
///
/// assert_eq!(form.parts().len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartForm {
    parts: Vec<FormPart>,
}

impl MultipartForm {
    /// Creates an empty form.
    #[must_use]
    pub const fn new() -> Self {
        Self { parts: Vec::new() }
    }

    /// Adds a text field.
    #[must_use]
    pub fn with_text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(FormPart::Text {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// Adds a field from a JSON value.
    ///
    /// Strings are sent verbatim, other scalars are stringified, and
    /// objects or arrays are sent as serialized JSON.
    #[must_use]
    pub fn with_field(self, name: impl Into<String>, value: &serde_json::Value) -> Self {
        let text = match value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        self.with_text(name, text)
    }

    /// Adds a file field.
    #[must_use]
    pub fn with_file(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        source: FileSource,
    ) -> Self {
        self.parts.push(FormPart::File {
            name: name.into(),
            file_name: file_name.into(),
            content_type: None,
            source,
        });
        self
    }

    /// Adds a file field read from `path`, named after the path's final component.
    #[must_use]
    pub fn with_file_path(self, name: impl Into<String>, path: &Path) -> Self {
        let file_name = path
            .file_name()
            .map_or_else(|| "upload".to_string(), |n| n.to_string_lossy().into_owned());
        self.with_file(name, file_name, FileSource::Path(path.to_path_buf()))
    }

    /// Returns the parts in insertion order.
    #[must_use]
    pub fn parts(&self) -> &[FormPart] {
        &self.parts
    }

    /// Consumes the form, returning its parts.
    #[must_use]
    pub fn into_parts(self) -> Vec<FormPart> {
        self.parts
    }

    /// Returns the first part with the given field name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FormPart> {
        self.parts.iter().find(|p| p.name() == name)
    }

    /// Returns true if the form has no parts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}
