use bytes::Bytes;

use crate::gateway::ApiError;
use crate::models::FilePart;

/// A document the user picked for upload, checked before anything is sent.
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub field: String,
    pub file_name: String,
    pub bytes: Bytes,
}

impl DocumentUpload {
    pub fn new(field: impl Into<String>, file_name: impl Into<String>, bytes: Bytes) -> Self {
        DocumentUpload {
            field: field.into(),
            file_name: file_name.into(),
            bytes,
        }
    }

    /// Turn the upload into a multipart file part, guessing its content type
    /// from the file name.
    pub fn into_part(self) -> Result<FilePart, ApiError> {
        if self.file_name.trim().is_empty() {
            return Err(ApiError::validation("file_name", "a file name is required"));
        }
        if self.bytes.is_empty() {
            return Err(ApiError::validation("file", "the selected file is empty"));
        }

        let content_type = mime_guess::from_path(&self.file_name)
            .first_or_octet_stream()
            .essence_str()
            .to_string();

        Ok(FilePart {
            field: self.field,
            file_name: self.file_name,
            content_type,
            bytes: self.bytes,
        })
    }
}
