//! Request parameter bags
//!
//! A [`Params`] value is the "parameter bag" consumed by the endpoint
//! resolver: an ordered list of named values, each either scalar text or
//! file content. A bag containing any file triggers multipart encoding.

use bytes::Bytes;
use foursquare_transport::MultipartField;

/// Ordered bag of request parameters.
///
/// Insertion order is preserved so encoded query strings and bodies are
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    entries: Vec<(String, ParamValue)>,
}

/// A single parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// Scalar text value
    Text(String),

    /// File content, the multipart marker
    File(FilePart),
}

/// File content attached to a parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct FilePart {
    /// File name reported to the server
    pub file_name: String,
    /// MIME type of the content
    pub content_type: String,
    /// File content
    pub bytes: Bytes,
}

impl FilePart {
    /// Create a new file part.
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }
}

impl Params {
    /// Create an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a scalar text parameter.
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries
            .push((name.into(), ParamValue::Text(value.into())));
        self
    }

    /// Add a file parameter.
    pub fn file(mut self, name: impl Into<String>, file: FilePart) -> Self {
        self.entries.push((name.into(), ParamValue::File(file)));
        self
    }

    /// Whether the bag is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of parameters in the bag.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether any value carries file content, requiring multipart encoding.
    pub fn is_multipart(&self) -> bool {
        self.entries
            .iter()
            .any(|(_, value)| matches!(value, ParamValue::File(_)))
    }

    /// Iterate over the entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    /// The scalar entries as owned key/value pairs, for form encoding.
    ///
    /// Only meaningful for all-scalar bags; file values are skipped here and
    /// handled by [`to_multipart_fields`](Self::to_multipart_fields).
    pub fn to_form_pairs(&self) -> Vec<(String, String)> {
        self.entries
            .iter()
            .filter_map(|(name, value)| match value {
                ParamValue::Text(text) => Some((name.clone(), text.clone())),
                ParamValue::File(_) => None,
            })
            .collect()
    }

    /// Convert the bag into multipart fields, preserving order.
    pub fn to_multipart_fields(&self) -> Vec<MultipartField> {
        self.entries
            .iter()
            .map(|(name, value)| match value {
                ParamValue::Text(text) => MultipartField::Text {
                    name: name.clone(),
                    value: text.clone(),
                },
                ParamValue::File(file) => MultipartField::File {
                    name: name.clone(),
                    file_name: file.file_name.clone(),
                    content_type: file.content_type.clone(),
                    bytes: file.bytes.clone(),
                },
            })
            .collect()
    }

    /// Encode the scalar entries as a query string, without a leading `?`.
    pub fn to_query_string(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (name, value) in &self.entries {
            if let ParamValue::Text(text) = value {
                serializer.append_pair(name, text);
            }
        }
        serializer.finish()
    }
}

impl<'a> IntoIterator for &'a Params {
    type Item = (&'a str, &'a ParamValue);
    type IntoIter = Box<dyn Iterator<Item = (&'a str, &'a ParamValue)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}
