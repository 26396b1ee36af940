//! STOW-RS store operations

use bytes::Bytes;
use serde_json::Value;

use super::{resource_url, DicomWebClient};
use crate::error::{DicomWebError, Result};
use crate::mediatype::DICOM_JSON;
use crate::multipart::{self, DEFAULT_PART_CONTENT_TYPE};
use crate::transport::{HttpRequest, HttpTransport};

impl<T: HttpTransport> DicomWebClient<T> {
    /// Store DICOM instances, optionally into a specific study.
    ///
    /// The datasets are packaged into one `multipart/related` body; the
    /// boundary used is echoed in the request `Content-Type`. Returns the
    /// server's store response as DICOM JSON, or `Value::Null` for an empty
    /// response body.
    pub async fn store_instances(
        &self,
        datasets: &[Bytes],
        study_instance_uid: Option<&str>,
        boundary: Option<String>,
    ) -> Result<Value> {
        if datasets.is_empty() {
            return Err(DicomWebError::config("no datasets provided"));
        }
        tracing::debug!(count = datasets.len(), "storing instances");

        let encoded = multipart::encode(datasets, boundary, DEFAULT_PART_CONTENT_TYPE);
        let url = match study_instance_uid {
            Some(study) => resource_url(&self.stow_url, &["studies", study])?,
            None => resource_url(&self.stow_url, &["studies"])?,
        };
        let content_type = format!(
            "multipart/related; type=\"application/dicom\"; boundary={}",
            encoded.boundary
        );
        let request = HttpRequest::post(url.clone(), encoded.data)
            .with_header("Content-Type", content_type)
            .with_header("Accept", DICOM_JSON);

        let response = self.transport.perform(request).await?;
        self.check_status(&response, &url)?;
        if response.body.is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&response.body)?)
    }
}
