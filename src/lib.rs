//! DICOMweb client library
//!
//! Typed convenience methods for querying (QIDO-RS), retrieving (WADO-RS)
//! and storing (STOW-RS) DICOM studies, series, instances and frames over
//! HTTP.
//!
//! # Features
//! - Multipart/related codec for binary DICOM payloads, operating on raw
//!   bytes throughout
//! - Media type negotiation against per-resource transfer-syntax
//!   compatibility tables
//! - QIDO/WADO/STOW client surface generic over a pluggable HTTP transport

pub mod client;
pub mod error;
pub mod mediatype;
pub mod multipart;
pub mod transport;
pub mod uri;

// Re-export commonly used types
pub use client::{ClientConfig, DicomWebClient};
pub use error::{DicomWebError, Result};
pub use mediatype::{MediaTypeSpec, Strictness, SupportedMediaTypes};
pub use multipart::{EncodedMultipart, Part};
pub use transport::{HttpRequest, HttpResponse, HttpTransport};

/// Client library version
pub const DICOMWEB_CLIENT_VERSION: &str = "0.1.0";
