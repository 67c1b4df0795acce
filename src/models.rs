//! Core data types.

use serde::{Deserialize, Serialize};

/// One uploaded file as recorded in the document store.
///
/// `name` is the filename the client sent; it is not unique. `path` is where
/// the bytes were written, relative to the process working directory unless
/// the upload directory is configured as an absolute path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub name: String,
    pub path: String,
}

impl DocumentRecord {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}
