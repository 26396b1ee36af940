//! QIDO-RS search operations

use serde_json::Value;

use super::{resource_url, with_query, DicomWebClient};
use crate::error::{DicomWebError, Result};
use crate::transport::HttpTransport;

impl<T: HttpTransport> DicomWebClient<T> {
    /// Search for studies matching the given QIDO query parameters
    pub async fn search_for_studies(&self, params: &[(&str, &str)]) -> Result<Vec<Value>> {
        tracing::debug!("searching for studies");
        let url = with_query(resource_url(&self.qido_url, &["studies"])?, params);
        self.get_json(url).await
    }

    /// Search for series, either within a study or across the whole service
    pub async fn search_for_series(
        &self,
        study_instance_uid: Option<&str>,
        params: &[(&str, &str)],
    ) -> Result<Vec<Value>> {
        let url = match study_instance_uid {
            Some(study) => resource_url(&self.qido_url, &["studies", study, "series"])?,
            None => resource_url(&self.qido_url, &["series"])?,
        };
        self.get_json(with_query(url, params)).await
    }

    /// Search for instances within a series, within a study, or across the
    /// whole service
    pub async fn search_for_instances(
        &self,
        study_instance_uid: Option<&str>,
        series_instance_uid: Option<&str>,
        params: &[(&str, &str)],
    ) -> Result<Vec<Value>> {
        let url = match (study_instance_uid, series_instance_uid) {
            (Some(study), Some(series)) => resource_url(
                &self.qido_url,
                &["studies", study, "series", series, "instances"],
            )?,
            (Some(study), None) => resource_url(&self.qido_url, &["studies", study, "instances"])?,
            (None, None) => resource_url(&self.qido_url, &["instances"])?,
            (None, Some(_)) => {
                return Err(DicomWebError::config(
                    "a series-level instance search requires a study instance UID",
                ));
            }
        };
        self.get_json(with_query(url, params)).await
    }
}
