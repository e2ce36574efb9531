//! `multipart/form-data` body builder
//!
//! Report files are uploaded with the part content type `json`, which is not
//! a registered MIME type and is rejected by `reqwest::multipart`. The body
//! is therefore assembled by hand:
//!
//! ```text
//! --Boundary-<uuid>\r\n
//! Content-Disposition: form-data; name="reports[]"; filename="report1.json"\r\n
//! Content-Type: json\r\n
//! \r\n
//! <report bytes>\r\n
//! --Boundary-<uuid>\r\n
//! Content-Disposition: form-data; name="<parameter>"\r\n
//! \r\n
//! <value>\r\n
//! --Boundary-<uuid>--\r\n
//! ```

use serde_json::{Map, Value};
use uuid::Uuid;

/// Content type of each uploaded file part
pub const FILE_PART_CONTENT_TYPE: &str = "json";

/// A fully assembled multipart body and its boundary
#[derive(Debug, Clone)]
pub struct MultipartBody {
    boundary: String,
    body: Vec<u8>,
}

impl MultipartBody {
    /// Builds a body with a fresh `Boundary-<uuid>` boundary
    ///
    /// # Arguments
    /// * `key` - Field name shared by every file part
    /// * `files` - File contents, named `report1.json`, `report2.json`, ...
    /// * `parameters` - Scalar form fields appended after the files
    pub fn build(key: &str, files: &[Vec<u8>], parameters: Option<&Map<String, Value>>) -> Self {
        Self::with_boundary(format!("Boundary-{}", Uuid::new_v4()), key, files, parameters)
    }

    /// Builds a body around a caller-chosen boundary
    pub fn with_boundary(
        boundary: String,
        key: &str,
        files: &[Vec<u8>],
        parameters: Option<&Map<String, Value>>,
    ) -> Self {
        let mut body = Vec::new();
        let delimiter = format!("--{boundary}\r\n");

        for (index, file) in files.iter().enumerate() {
            body.extend_from_slice(delimiter.as_bytes());
            body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{key}\"; filename=\"report{}.json\"\r\n",
                    index + 1
                )
                .as_bytes(),
            );
            body.extend_from_slice(
                format!("Content-Type: {FILE_PART_CONTENT_TYPE}\r\n\r\n").as_bytes(),
            );
            body.extend_from_slice(file);
            body.extend_from_slice(b"\r\n");
        }

        for (name, value) in parameters.into_iter().flatten() {
            body.extend_from_slice(delimiter.as_bytes());
            body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
            );
            body.extend_from_slice(field_value(value).as_bytes());
            body.extend_from_slice(b"\r\n");
        }

        body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

        Self { boundary, body }
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Value for the request's `Content-Type` header
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.body
    }
}

/// Strings go out bare; everything else as its JSON text
fn field_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
