use bytes::Bytes;
use serde_json::json;

use dicomweb_client::{DicomWebError, MediaTypeSpec};

mod common;
use common::{json_response, multipart_response, request_header, test_client};

// =============================================================================
// Metadata retrieval
// =============================================================================

#[tokio::test]
async fn test_retrieve_study_metadata() {
    let (client, transport) = test_client();
    transport.push_response(json_response(json!([
        { "00080018": { "vr": "UI", "Value": ["7.8.9"] } }
    ])));

    let metadata = client.retrieve_study_metadata("1.2.3").await.expect("metadata");
    assert_eq!(metadata.len(), 1);

    let request = transport.single_request();
    assert_eq!(
        request.url.as_str(),
        "http://localhost:8008/dicomweb/studies/1.2.3/metadata"
    );
    assert_eq!(
        request_header(&request, "Accept").as_deref(),
        Some("application/dicom+json")
    );
}

#[tokio::test]
async fn test_retrieve_instance_metadata() {
    let (client, transport) = test_client();
    transport.push_response(json_response(json!([])));

    client
        .retrieve_instance_metadata("1.2.3", "4.5.6", "7.8.9")
        .await
        .expect("metadata");

    let request = transport.single_request();
    assert_eq!(
        request.url.as_str(),
        "http://localhost:8008/dicomweb/studies/1.2.3/series/4.5.6/instances/7.8.9/metadata"
    );
}

// =============================================================================
// Instance retrieval
// =============================================================================

#[tokio::test]
async fn test_retrieve_instance_decodes_first_part() {
    let (client, transport) = test_client();
    let instance = Bytes::from_static(b"DICM-instance-bytes");
    transport.push_response(multipart_response(
        std::slice::from_ref(&instance),
        "application/dicom",
    ));

    let retrieved = client
        .retrieve_instance("1.2.3", "4.5.6", "7.8.9")
        .await
        .expect("instance");
    assert_eq!(retrieved, instance);

    let request = transport.single_request();
    assert_eq!(
        request.url.as_str(),
        "http://localhost:8008/dicomweb/studies/1.2.3/series/4.5.6/instances/7.8.9"
    );
    assert_eq!(
        request_header(&request, "Accept").as_deref(),
        Some("multipart/related; type=\"application/dicom\"")
    );
}

#[tokio::test]
async fn test_retrieve_series_returns_all_parts() {
    let (client, transport) = test_client();
    let instances = [
        Bytes::from_static(b"first instance"),
        Bytes::from_static(b"second instance"),
    ];
    transport.push_response(multipart_response(&instances, "application/dicom"));

    let retrieved = client.retrieve_series("1.2.3", "4.5.6").await.expect("series");
    assert_eq!(retrieved, instances);
}

// =============================================================================
// Frame retrieval
// =============================================================================

#[tokio::test]
async fn test_retrieve_frames_default_media_type() {
    let (client, transport) = test_client();
    let frames = [Bytes::from_static(&[0x10, 0x20]), Bytes::from_static(&[0x30])];
    transport.push_response(multipart_response(&frames, "application/octet-stream"));

    let retrieved = client
        .retrieve_instance_frames("1.2.3", "4.5.6", "7.8.9", &[1, 2], None)
        .await
        .expect("frames");
    assert_eq!(retrieved, frames);

    let request = transport.single_request();
    assert_eq!(
        request.url.as_str(),
        "http://localhost:8008/dicomweb/studies/1.2.3/series/4.5.6/instances/7.8.9/frames/1,2"
    );
    assert_eq!(
        request_header(&request, "Accept").as_deref(),
        Some("multipart/related; type=\"application/octet-stream\"")
    );
}

#[tokio::test]
async fn test_retrieve_frames_with_transfer_syntax() {
    let (client, transport) = test_client();
    transport.push_response(multipart_response(
        &[Bytes::from_static(b"jpeg frame")],
        "image/jpeg",
    ));

    let media_types =
        [MediaTypeSpec::new("image/jpeg").with_transfer_syntax("1.2.840.10008.1.2.4.50")];
    client
        .retrieve_instance_frames("1.2.3", "4.5.6", "7.8.9", &[1], Some(&media_types))
        .await
        .expect("frames");

    let request = transport.single_request();
    assert_eq!(
        request_header(&request, "Accept").as_deref(),
        Some("multipart/related; type=\"image/jpeg\"; transfer-syntax=1.2.840.10008.1.2.4.50")
    );
}

#[tokio::test]
async fn test_retrieve_frames_mixed_media_types_rejected_before_request() {
    let (client, transport) = test_client();

    let media_types = [
        MediaTypeSpec::new("image/jpeg"),
        MediaTypeSpec::new("video/mp4"),
    ];
    let err = client
        .retrieve_instance_frames("1.2.3", "4.5.6", "7.8.9", &[1], Some(&media_types))
        .await
        .unwrap_err();
    assert!(matches!(err, DicomWebError::MixedMediaTypes(_)));
    assert!(transport.requests().is_empty(), "no request must be sent");
}

#[tokio::test]
async fn test_retrieve_frames_requires_frame_numbers() {
    let (client, transport) = test_client();

    let err = client
        .retrieve_instance_frames("1.2.3", "4.5.6", "7.8.9", &[], None)
        .await
        .unwrap_err();
    assert!(matches!(err, DicomWebError::Config(_)));
    assert!(transport.requests().is_empty());
}

// =============================================================================
// Bulkdata retrieval
// =============================================================================

#[tokio::test]
async fn test_retrieve_bulk_data() {
    let (client, transport) = test_client();
    let blob = Bytes::from_static(&[0xde, 0xad, 0xbe, 0xef]);
    transport.push_response(multipart_response(
        std::slice::from_ref(&blob),
        "application/octet-stream",
    ));

    let retrieved = client
        .retrieve_bulk_data("http://localhost:8008/dicomweb/bulkdata/abc", None)
        .await
        .expect("bulkdata");
    assert_eq!(retrieved, [blob]);

    let request = transport.single_request();
    assert_eq!(
        request.url.as_str(),
        "http://localhost:8008/dicomweb/bulkdata/abc"
    );
    assert_eq!(
        request_header(&request, "Accept").as_deref(),
        Some("multipart/related; type=\"application/octet-stream\"")
    );
}
