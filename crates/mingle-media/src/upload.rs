//! One-shot media upload to the file-storage endpoint.
//!
//! Screens that attach media (chat sends, profile photo/cover) call
//! [`Uploader::upload`] and only emit the channel event after the URL comes
//! back; a failed upload aborts the whole action.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::{debug, info};

use mingle_shared::constants::{UPLOAD_PATH, UPLOAD_TIMEOUT_SECS};
use mingle_shared::types::MediaKind;

use crate::error::UploadError;

/// A file picked by the user, ready to upload.
#[derive(Debug, Clone)]
pub struct MediaFile {
    pub name: String,
    pub content_type: String,
    pub data: Bytes,
}

impl MediaFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, data: Bytes) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            data,
        }
    }

    /// How the file will render once attached.
    pub fn kind(&self) -> MediaKind {
        MediaKind::from_mime(&self.content_type)
    }
}

/// Result of a completed upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedMedia {
    pub file_url: String,
    pub kind: MediaKind,
}

/// Seam for the upload exchange, so view handlers can be exercised with a
/// failing uploader in tests.
#[async_trait]
pub trait Uploader: Send + Sync {
    async fn upload(&self, file: MediaFile) -> Result<UploadedMedia, UploadError>;
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(rename = "fileUrl")]
    file_url: String,
}

/// HTTP client for the `POST /upload` endpoint.
#[derive(Debug, Clone)]
pub struct MediaClient {
    http: reqwest::Client,
    base_url: String,
}

impl MediaClient {
    /// Build a client for the given server base URL (e.g. `http://host:8080`).
    pub fn new(base_url: impl Into<String>) -> Result<Self, UploadError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(UPLOAD_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Uploader for MediaClient {
    async fn upload(&self, file: MediaFile) -> Result<UploadedMedia, UploadError> {
        let kind = file.kind();
        let size = file.data.len();
        debug!(name = %file.name, size, "Uploading media");

        let part = Part::bytes(file.data.to_vec())
            .file_name(file.name)
            .mime_str(&file.content_type)?;
        let form = Form::new().part("file", part);

        let url = format!("{}{}", self.base_url, UPLOAD_PATH);
        let response = self.http.post(&url).multipart(form).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(UploadError::Status {
                code: status.as_u16(),
            });
        }

        let body: UploadResponse = response.json().await?;
        if body.file_url.is_empty() {
            return Err(UploadError::MalformedResponse("empty fileUrl".into()));
        }

        info!(url = %body.file_url, size, "Media uploaded");
        Ok(UploadedMedia {
            file_url: body.file_url,
            kind,
        })
    }
}
