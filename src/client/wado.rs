//! WADO-RS retrieval operations

use bytes::Bytes;
use serde_json::Value;
use url::Url;

use super::{resource_url, DicomWebClient};
use crate::error::{DicomWebError, Result};
use crate::mediatype::{
    build_accept_for_multipart, common_media_type, MediaTypeSpec, SupportedMediaTypes,
    BULKDATA_MEDIA_TYPES, INSTANCE_MEDIA_TYPES, PIXEL_DATA_MEDIA_TYPES, VIDEO_MEDIA_TYPES,
};
use crate::multipart::Part;
use crate::transport::HttpTransport;

impl<T: HttpTransport> DicomWebClient<T> {
    /// Retrieve the metadata of all instances in a study as DICOM JSON
    pub async fn retrieve_study_metadata(&self, study_instance_uid: &str) -> Result<Vec<Value>> {
        tracing::debug!(study_instance_uid, "retrieving study metadata");
        let url = resource_url(&self.wado_url, &["studies", study_instance_uid, "metadata"])?;
        self.get_json(url).await
    }

    /// Retrieve the metadata of all instances in a series as DICOM JSON
    pub async fn retrieve_series_metadata(
        &self,
        study_instance_uid: &str,
        series_instance_uid: &str,
    ) -> Result<Vec<Value>> {
        let url = resource_url(
            &self.wado_url,
            &[
                "studies",
                study_instance_uid,
                "series",
                series_instance_uid,
                "metadata",
            ],
        )?;
        self.get_json(url).await
    }

    /// Retrieve the metadata of a single instance as DICOM JSON
    pub async fn retrieve_instance_metadata(
        &self,
        study_instance_uid: &str,
        series_instance_uid: &str,
        sop_instance_uid: &str,
    ) -> Result<Vec<Value>> {
        let url = resource_url(
            &self.wado_url,
            &[
                "studies",
                study_instance_uid,
                "series",
                series_instance_uid,
                "instances",
                sop_instance_uid,
                "metadata",
            ],
        )?;
        self.get_json(url).await
    }

    /// Retrieve all instances of a study as `application/dicom` parts
    pub async fn retrieve_study(&self, study_instance_uid: &str) -> Result<Vec<Bytes>> {
        tracing::debug!(study_instance_uid, "retrieving study");
        let url = resource_url(&self.wado_url, &["studies", study_instance_uid])?;
        self.retrieve_instances(url).await
    }

    /// Retrieve all instances of a series as `application/dicom` parts
    pub async fn retrieve_series(
        &self,
        study_instance_uid: &str,
        series_instance_uid: &str,
    ) -> Result<Vec<Bytes>> {
        let url = resource_url(
            &self.wado_url,
            &[
                "studies",
                study_instance_uid,
                "series",
                series_instance_uid,
            ],
        )?;
        self.retrieve_instances(url).await
    }

    /// Retrieve a single instance as `application/dicom` bytes
    pub async fn retrieve_instance(
        &self,
        study_instance_uid: &str,
        series_instance_uid: &str,
        sop_instance_uid: &str,
    ) -> Result<Bytes> {
        let url = resource_url(
            &self.wado_url,
            &[
                "studies",
                study_instance_uid,
                "series",
                series_instance_uid,
                "instances",
                sop_instance_uid,
            ],
        )?;
        self.retrieve_instances(url)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DicomWebError::malformed("response contained no parts"))
    }

    /// Retrieve one or more frames of an instance's pixel data.
    ///
    /// Without `media_types` the frames are requested as
    /// `application/octet-stream` (uncompressed). The requested media types
    /// must share a base type; it routes the request to the pixel data or
    /// video compatibility table.
    pub async fn retrieve_instance_frames(
        &self,
        study_instance_uid: &str,
        series_instance_uid: &str,
        sop_instance_uid: &str,
        frame_numbers: &[u32],
        media_types: Option<&[MediaTypeSpec]>,
    ) -> Result<Vec<Bytes>> {
        if frame_numbers.is_empty() {
            return Err(DicomWebError::config("no frame numbers provided"));
        }
        let default = [MediaTypeSpec::new("application/octet-stream")];
        let media_types = media_types.unwrap_or(&default);
        let supported = frame_media_type_table(media_types)?;
        let accept = build_accept_for_multipart(media_types, supported, self.strictness)?;

        let frame_list = frame_numbers
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(",");
        tracing::debug!(sop_instance_uid, frames = %frame_list, "retrieving frames");
        let url = resource_url(
            &self.wado_url,
            &[
                "studies",
                study_instance_uid,
                "series",
                series_instance_uid,
                "instances",
                sop_instance_uid,
                "frames",
                &frame_list,
            ],
        )?;
        let parts = self.get_multipart(url, accept).await?;
        Ok(parts.into_iter().map(Part::into_body).collect())
    }

    /// Retrieve bulkdata referenced by an absolute URL, e.g. from a
    /// `BulkDataURI` attribute in retrieved metadata
    pub async fn retrieve_bulk_data(
        &self,
        url: &str,
        media_types: Option<&[MediaTypeSpec]>,
    ) -> Result<Vec<Bytes>> {
        let target: Url = url.parse()?;
        let default = [MediaTypeSpec::new("application/octet-stream")];
        let media_types = media_types.unwrap_or(&default);
        let accept = build_accept_for_multipart(media_types, &BULKDATA_MEDIA_TYPES, self.strictness)?;
        let parts = self.get_multipart(target, accept).await?;
        Ok(parts.into_iter().map(Part::into_body).collect())
    }

    async fn retrieve_instances(&self, url: Url) -> Result<Vec<Bytes>> {
        let accept = build_accept_for_multipart(
            &[MediaTypeSpec::new("application/dicom")],
            &INSTANCE_MEDIA_TYPES,
            self.strictness,
        )?;
        let parts = self.get_multipart(url, accept).await?;
        Ok(parts.into_iter().map(Part::into_body).collect())
    }
}

/// Pick the compatibility table matching the common base type of the
/// requested media types
fn frame_media_type_table(media_types: &[MediaTypeSpec]) -> Result<&'static SupportedMediaTypes> {
    match common_media_type(media_types)?.as_str() {
        "image/" | "application/" => Ok(&PIXEL_DATA_MEDIA_TYPES),
        "video/" => Ok(&VIDEO_MEDIA_TYPES),
        other => Err(DicomWebError::UnsupportedMediaType(format!(
            "{other} resources cannot be retrieved as frames"
        ))),
    }
}
