//! # mingle-media
//!
//! Upload adapter: a single multipart request/response exchange against the
//! server's `/upload` endpoint, behind the [`Uploader`] seam.

pub mod upload;

mod error;

pub use error::UploadError;
pub use upload::{MediaClient, MediaFile, UploadedMedia, Uploader};
