//! DICOMweb client: typed QIDO-RS, WADO-RS and STOW-RS operations
//!
//! The client assembles URLs and headers, negotiates media types, and runs
//! multipart response bodies through the codec. Performing the request is
//! delegated to the [`HttpTransport`] supplied at construction.

mod qido;
mod stow;
mod wado;

use http::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::error::{DicomWebError, Result};
use crate::mediatype::{self, MediaTypeSpec, Strictness, DICOM_JSON, DICOM_JSON_MEDIA_TYPES};
use crate::multipart::Part;
use crate::transport::{HttpRequest, HttpResponse, HttpTransport};

/// Configuration for a DICOMweb service
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ClientConfig {
    /// Base URL of the service, e.g. `https://server.com/dicomweb`
    pub base_url: String,

    /// Path prefix of the QIDO-RS service, when it differs from the base
    #[serde(default)]
    pub qido_prefix: Option<String>,

    /// Path prefix of the WADO-RS service, when it differs from the base
    #[serde(default)]
    pub wado_prefix: Option<String>,

    /// Path prefix of the STOW-RS service, when it differs from the base
    #[serde(default)]
    pub stow_prefix: Option<String>,

    /// How media type negotiation treats unsupported entries
    #[serde(default)]
    pub strictness: Strictness,
}

/// Client for a DICOMweb service, generic over the HTTP transport
#[derive(Debug)]
pub struct DicomWebClient<T: HttpTransport> {
    qido_url: Url,
    wado_url: Url,
    stow_url: Url,
    strictness: Strictness,
    transport: T,
}

impl<T: HttpTransport> DicomWebClient<T> {
    /// Create a client from a configuration and a transport
    pub fn new(config: ClientConfig, transport: T) -> Result<Self> {
        let base: Url = config.base_url.parse()?;
        if base.cannot_be_a_base() {
            return Err(DicomWebError::config(format!(
                "base URL cannot address DICOMweb resources: {}",
                config.base_url
            )));
        }
        Ok(Self {
            qido_url: service_url(&base, config.qido_prefix.as_deref())?,
            wado_url: service_url(&base, config.wado_prefix.as_deref())?,
            stow_url: service_url(&base, config.stow_prefix.as_deref())?,
            strictness: config.strictness,
            transport,
        })
    }

    /// Perform a GET for a DICOM JSON resource.
    ///
    /// A `204 No Content` or empty body resolves to an empty list.
    async fn get_json(&self, url: Url) -> Result<Vec<Value>> {
        let accept = mediatype::build_accept_for_simple(
            &[MediaTypeSpec::new(DICOM_JSON)],
            &DICOM_JSON_MEDIA_TYPES,
        )?;
        let request = HttpRequest::get(url.clone()).with_header("Accept", accept);
        let response = self.transport.perform(request).await?;
        self.check_status(&response, &url)?;
        if response.status == StatusCode::NO_CONTENT || response.body.is_empty() {
            tracing::debug!(url = %url, "empty search response");
            return Ok(Vec::new());
        }
        match serde_json::from_slice(&response.body)? {
            Value::Array(items) => Ok(items),
            other => Ok(vec![other]),
        }
    }

    /// Perform a GET for a `multipart/related` resource and decode the body
    async fn get_multipart(&self, url: Url, accept: String) -> Result<Vec<Part>> {
        let request = HttpRequest::get(url.clone()).with_header("Accept", accept);
        let response = self.transport.perform(request).await?;
        self.check_status(&response, &url)?;
        if response.status == StatusCode::NO_CONTENT || response.body.is_empty() {
            return Ok(Vec::new());
        }
        crate::multipart::decode(&response.body)
    }

    fn check_status(&self, response: &HttpResponse, url: &Url) -> Result<()> {
        if !response.status.is_success() {
            return Err(DicomWebError::Http {
                status: response.status,
                url: url.to_string(),
            });
        }
        Ok(())
    }
}

/// Service root: the base URL with the optional per-service prefix appended
fn service_url(base: &Url, prefix: Option<&str>) -> Result<Url> {
    match prefix {
        Some(prefix) => resource_url(base, &prefix.split('/').collect::<Vec<_>>()),
        None => Ok(base.clone()),
    }
}

/// A resource URL built by appending path segments to a service root
fn resource_url(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|()| DicomWebError::config("service URL cannot carry path segments"))?;
        path.pop_if_empty();
        path.extend(segments.iter().filter(|s| !s.is_empty()));
    }
    Ok(url)
}

/// Append QIDO query parameters, percent-encoding keys and values
fn with_query(mut url: Url, params: &[(&str, &str)]) -> Url {
    if !params.is_empty() {
        url.query_pairs_mut().extend_pairs(params);
    }
    url
}
