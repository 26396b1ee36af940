//! Extraction of DICOM UIDs and frame numbers from DICOMweb resource URIs

/// Value of the path segment following the last occurrence of `anchor`
fn segment_after<'a>(uri: &'a str, anchor: &str) -> Option<&'a str> {
    let path = uri.split('?').next().unwrap_or(uri);
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    segments
        .iter()
        .rposition(|segment| *segment == anchor)
        .and_then(|index| segments.get(index + 1).copied())
}

/// Study Instance UID addressed by the URI, if any
pub fn study_instance_uid_from_uri(uri: &str) -> Option<String> {
    segment_after(uri, "studies").map(String::from)
}

/// Series Instance UID addressed by the URI, if any
pub fn series_instance_uid_from_uri(uri: &str) -> Option<String> {
    segment_after(uri, "series").map(String::from)
}

/// SOP Instance UID addressed by the URI, if any
pub fn sop_instance_uid_from_uri(uri: &str) -> Option<String> {
    segment_after(uri, "instances").map(String::from)
}

/// Frame numbers addressed by the URI, if any.
///
/// Returns `None` when the URI has no frame list or the list contains a
/// value that is not a number.
pub fn frame_numbers_from_uri(uri: &str) -> Option<Vec<u32>> {
    segment_after(uri, "frames")
        .and_then(|list| list.split(',').map(|n| n.parse().ok()).collect())
}
