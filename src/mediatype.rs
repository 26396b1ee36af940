//! Media type negotiation for DICOMweb requests
//!
//! Builds legal `Accept` header values from the media types a caller is
//! willing to receive and the table of media types the requested resource
//! supports, rejecting combinations the server is known a priori not to
//! satisfy.

use std::collections::{BTreeSet, HashMap, HashSet};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{DicomWebError, Result};

/// Media type used for DICOM JSON search and metadata resources
pub const DICOM_JSON: &str = "application/dicom+json";

/// A media type a caller is willing to accept, optionally constrained to a
/// specific DICOM transfer syntax
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaTypeSpec {
    /// Media type in `type/subtype` form
    pub media_type: String,

    /// Transfer syntax UID, or `None` to leave the encoding to the server
    pub transfer_syntax_uid: Option<String>,
}

impl MediaTypeSpec {
    /// Create a spec without a transfer syntax constraint
    pub fn new(media_type: impl Into<String>) -> Self {
        Self {
            media_type: media_type.into(),
            transfer_syntax_uid: None,
        }
    }

    /// Constrain the spec to a transfer syntax UID
    pub fn with_transfer_syntax(mut self, uid: impl Into<String>) -> Self {
        self.transfer_syntax_uid = Some(uid.into());
        self
    }
}

/// Media types a resource supports, either as a flat set or keyed by the
/// transfer syntax the pixel data is stored in
#[derive(Debug, Clone)]
pub enum SupportedMediaTypes {
    /// Any listed media type is acceptable
    Flat(HashSet<String>),
    /// Acceptable media types depend on the transfer syntax UID
    ByTransferSyntax(HashMap<String, Vec<String>>),
}

impl SupportedMediaTypes {
    /// Build a flat set of acceptable media types
    pub fn flat<I, S>(media_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Flat(media_types.into_iter().map(Into::into).collect())
    }

    /// Build a transfer-syntax keyed table
    pub fn by_transfer_syntax(entries: &[(&str, &[&str])]) -> Self {
        Self::ByTransferSyntax(
            entries
                .iter()
                .map(|(uid, media_types)| {
                    (
                        (*uid).to_string(),
                        media_types.iter().map(|mt| (*mt).to_string()).collect(),
                    )
                })
                .collect(),
        )
    }
}

/// How negotiation treats a requested media type the resource does not
/// support: reject the whole request, or drop the entry and keep going
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Strictness {
    #[default]
    Strict,
    Lenient,
}

/// Build an `Accept` header value for a single-part resource.
///
/// Every requested media type must be well-formed and a member of
/// `supported`.
pub fn build_accept_for_simple(
    media_types: &[MediaTypeSpec],
    supported: &HashSet<String>,
) -> Result<String> {
    let mut fields = Vec::with_capacity(media_types.len());
    for spec in media_types {
        validate_media_type(&spec.media_type)?;
        if !supported.contains(&spec.media_type) {
            return Err(DicomWebError::UnsupportedMediaType(format!(
                "{} is not supported for the requested resource",
                spec.media_type
            )));
        }
        fields.push(spec.media_type.clone());
    }
    Ok(fields.join(", "))
}

/// Build an `Accept` header value for a `multipart/related` resource.
///
/// Each surviving entry becomes `multipart/related; type="{media_type}"`,
/// suffixed with `; transfer-syntax={uid}` when a transfer syntax UID was
/// requested. With [`Strictness::Lenient`], unsupported media types are
/// skipped with a warning instead of failing the request.
pub fn build_accept_for_multipart(
    media_types: &[MediaTypeSpec],
    supported: &SupportedMediaTypes,
    strictness: Strictness,
) -> Result<String> {
    let mut fields = Vec::with_capacity(media_types.len());
    for spec in media_types {
        let (base, _) = validate_media_type(&spec.media_type)?;
        let supported_here = match supported {
            SupportedMediaTypes::Flat(set) => set.contains(&spec.media_type),
            SupportedMediaTypes::ByTransferSyntax(table) => {
                is_wildcard(&spec.media_type)
                    || table.values().flatten().any(|mt| mt == &spec.media_type)
            }
        };
        if !supported_here {
            match strictness {
                Strictness::Strict => {
                    return Err(DicomWebError::UnsupportedMediaType(format!(
                        "{} is not supported for the requested resource",
                        spec.media_type
                    )));
                }
                Strictness::Lenient => {
                    tracing::warn!(
                        media_type = %spec.media_type,
                        "skipping media type not supported for the requested resource"
                    );
                    continue;
                }
            }
        }

        let mut field = format!("multipart/related; type=\"{}\"", spec.media_type);
        if let Some(uid) = spec.transfer_syntax_uid.as_deref() {
            if uid != "*" {
                if let SupportedMediaTypes::ByTransferSyntax(table) = supported {
                    let listed = table.get(uid).ok_or_else(|| {
                        DicomWebError::UnsupportedTransferSyntax(format!(
                            "{uid} is not supported for the requested resource"
                        ))
                    })?;
                    let matches_listed = listed.contains(&spec.media_type)
                        || (is_wildcard(&spec.media_type)
                            && listed.iter().any(|mt| base_type(mt) == base));
                    if !matches_listed {
                        return Err(DicomWebError::UnsupportedTransferSyntax(format!(
                            "{uid} is not supported for media type {}",
                            spec.media_type
                        )));
                    }
                }
            }
            field.push_str(&format!("; transfer-syntax={uid}"));
        }
        fields.push(field);
    }

    if fields.is_empty() {
        return Err(DicomWebError::NoAcceptableMediaType);
    }
    Ok(fields.join(", "))
}

/// Determine the common base type of the requested media types, e.g.
/// `"image/"`. Retrieval requests are routed by this prefix; a request that
/// mixes base types cannot be served by one resource.
pub fn common_media_type(media_types: &[MediaTypeSpec]) -> Result<String> {
    if media_types.is_empty() {
        return Err(DicomWebError::NoMediaTypesProvided);
    }
    let mut bases = BTreeSet::new();
    for spec in media_types {
        if let Some((base, _)) = spec.media_type.split_once('/') {
            if !base.is_empty() {
                bases.insert(format!("{base}/"));
            }
        }
    }
    let mut iter = bases.into_iter();
    match (iter.next(), iter.next()) {
        (None, _) => Err(DicomWebError::NoCommonMediaType),
        (Some(base), None) => Ok(base),
        (Some(_), Some(_)) => Err(DicomWebError::MixedMediaTypes(
            media_types
                .iter()
                .map(|spec| spec.media_type.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        )),
    }
}

/// Validate `type/subtype` shape, returning the two halves
fn validate_media_type(media_type: &str) -> Result<(&str, &str)> {
    let (base, subtype) = media_type
        .split_once('/')
        .ok_or_else(|| DicomWebError::InvalidMediaType(media_type.to_string()))?;
    if !matches!(base, "application" | "image" | "text" | "video") {
        return Err(DicomWebError::InvalidMediaType(media_type.to_string()));
    }
    if subtype.contains('/') {
        return Err(DicomWebError::InvalidMediaType(media_type.to_string()));
    }
    Ok((base, subtype))
}

fn base_type(media_type: &str) -> &str {
    media_type
        .split_once('/')
        .map(|(base, _)| base)
        .unwrap_or(media_type)
}

fn is_wildcard(media_type: &str) -> bool {
    media_type.ends_with('/') || media_type.ends_with("/*")
}

/// Media types acceptable when retrieving stored instances
pub static INSTANCE_MEDIA_TYPES: Lazy<SupportedMediaTypes> =
    Lazy::new(|| SupportedMediaTypes::flat(["application/dicom"]));

/// Media types acceptable when retrieving bulkdata
pub static BULKDATA_MEDIA_TYPES: Lazy<SupportedMediaTypes> =
    Lazy::new(|| SupportedMediaTypes::flat(["application/octet-stream"]));

/// Media types acceptable for search and metadata resources
pub static DICOM_JSON_MEDIA_TYPES: Lazy<HashSet<String>> =
    Lazy::new(|| [DICOM_JSON.to_string()].into_iter().collect());

/// Transfer syntaxes of single- and multi-frame pixel data and the media
/// types each can be delivered as
pub static PIXEL_DATA_MEDIA_TYPES: Lazy<SupportedMediaTypes> = Lazy::new(|| {
    SupportedMediaTypes::by_transfer_syntax(&[
        // Explicit VR Little Endian
        ("1.2.840.10008.1.2.1", &["application/octet-stream"]),
        // RLE Lossless
        ("1.2.840.10008.1.2.5", &["image/x-dicom-rle"]),
        // JPEG Baseline, Extended, Lossless
        ("1.2.840.10008.1.2.4.50", &["image/jpeg"]),
        ("1.2.840.10008.1.2.4.51", &["image/jpeg"]),
        ("1.2.840.10008.1.2.4.57", &["image/jpeg"]),
        ("1.2.840.10008.1.2.4.70", &["image/jpeg"]),
        // JPEG-LS
        ("1.2.840.10008.1.2.4.80", &["image/x-jls"]),
        ("1.2.840.10008.1.2.4.81", &["image/x-jls"]),
        // JPEG 2000
        ("1.2.840.10008.1.2.4.90", &["image/jp2"]),
        ("1.2.840.10008.1.2.4.91", &["image/jp2"]),
        ("1.2.840.10008.1.2.4.92", &["image/jpx"]),
        ("1.2.840.10008.1.2.4.93", &["image/jpx"]),
    ])
});

/// Transfer syntaxes of video pixel data and the media types each can be
/// delivered as
pub static VIDEO_MEDIA_TYPES: Lazy<SupportedMediaTypes> = Lazy::new(|| {
    SupportedMediaTypes::by_transfer_syntax(&[
        // MPEG2
        ("1.2.840.10008.1.2.4.100", &["video/mpeg2"]),
        ("1.2.840.10008.1.2.4.101", &["video/mpeg2"]),
        // MPEG-4 AVC/H.264
        ("1.2.840.10008.1.2.4.102", &["video/mp4"]),
        ("1.2.840.10008.1.2.4.103", &["video/mp4"]),
        ("1.2.840.10008.1.2.4.104", &["video/mp4"]),
        ("1.2.840.10008.1.2.4.105", &["video/mp4"]),
        ("1.2.840.10008.1.2.4.106", &["video/mp4"]),
        // HEVC/H.265
        ("1.2.840.10008.1.2.4.107", &["video/H265"]),
        ("1.2.840.10008.1.2.4.108", &["video/H265"]),
    ])
});
