//! Multipart payloads. Kept as plain data so fakes can inspect exactly what
//! would be sent; converted to a `reqwest` form at the last moment.

use reqwest::multipart::{Form, Part};
use std::path::Path;
use tokio::fs;

use crate::error::ApiError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

impl FilePart {
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, ApiError> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();
        let bytes = fs::read(path).await?;
        Ok(Self {
            file_name,
            content_type: content_type_for(path),
            bytes,
        })
    }
}

fn content_type_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|s| s.to_ascii_lowercase())
    {
        Some(ext) if ext == "jpg" || ext == "jpeg" => "image/jpeg",
        Some(ext) if ext == "png" => "image/png",
        Some(ext) if ext == "gif" => "image/gif",
        Some(ext) if ext == "webp" => "image/webp",
        Some(ext) if ext == "svg" => "image/svg+xml",
        Some(ext) if ext == "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartPayload {
    pub fields: Vec<(String, String)>,
    pub files: Vec<(String, FilePart)>,
}

impl MultipartPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: impl Into<String>) -> Self {
        self.fields.push((name.to_string(), value.into()));
        self
    }

    pub fn file(mut self, name: &str, part: FilePart) -> Self {
        self.files.push((name.to_string(), part));
        self
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_file(&self, name: &str) -> bool {
        self.files.iter().any(|(k, _)| k == name)
    }

    pub fn into_form(self) -> Result<Form, ApiError> {
        let mut form = Form::new();
        for (name, value) in self.fields {
            form = form.text(name, value);
        }
        for (name, file) in self.files {
            let part = Part::bytes(file.bytes)
                .file_name(file.file_name)
                .mime_str(file.content_type)
                .map_err(ApiError::Network)?;
            form = form.part(name, part);
        }
        Ok(form)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_by_extension() {
        assert_eq!(content_type_for(Path::new("a/logo.PNG")), "image/png");
        assert_eq!(content_type_for(Path::new("photo.jpeg")), "image/jpeg");
        assert_eq!(content_type_for(Path::new("scan.pdf")), "application/pdf");
        assert_eq!(content_type_for(Path::new("blob")), "application/octet-stream");
    }

    #[tokio::test]
    async fn reads_file_from_disk() {
        let td = tempfile::tempdir().unwrap();
        let path = td.path().join("front.jpg");
        std::fs::write(&path, b"jpegdata").unwrap();
        let part = FilePart::from_path(&path).await.unwrap();
        assert_eq!(part.file_name, "front.jpg");
        assert_eq!(part.content_type, "image/jpeg");
        assert_eq!(part.bytes, b"jpegdata");

        let missing = FilePart::from_path(td.path().join("nope.png")).await;
        assert!(matches!(missing, Err(ApiError::Upload(_))));
    }

    #[test]
    fn field_lookup() {
        let payload = MultipartPayload::new().text("name", "Maple").text("floor", "");
        assert_eq!(payload.field("name"), Some("Maple"));
        assert_eq!(payload.field("floor"), Some(""));
        assert!(payload.field("image").is_none());
        assert!(!payload.has_file("image"));
        assert!(payload.into_form().is_ok());
    }
}
