//! HTTP transport capability.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// A file submitted as a multipart upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// Lowercased extension of the file name, if any.
    pub fn extension(&self) -> Option<String> {
        std::path::Path::new(&self.file_name)
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
    }

    /// MIME type guessed from the extension.
    pub fn content_type(&self) -> &'static str {
        match self.extension().as_deref() {
            Some("json") => "application/json",
            Some("csv") => "text/csv",
            _ => "application/octet-stream",
        }
    }
}

/// Asynchronous, fallible access to the recipe API.
///
/// Paths are relative to the API base (e.g. `/recipes/42`). Implementations
/// map non-success responses to [`RecipeError::Transport`] carrying the
/// server's message and status code.
///
/// [`RecipeError::Transport`]: crate::error::RecipeError::Transport
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, path: &str, params: &[(String, String)]) -> Result<Value>;

    async fn post(&self, path: &str, body: Value) -> Result<Value>;

    async fn put(&self, path: &str, body: Value) -> Result<Value>;

    async fn delete(&self, path: &str) -> Result<()>;

    /// Submits a file as multipart form data under the `file` field.
    async fn upload(&self, path: &str, file: UploadFile) -> Result<Value>;
}
