use http::{Method, StatusCode};
use serde_json::json;

use dicomweb_client::DicomWebError;

mod common;
use common::{empty_response, json_response, request_header, test_client};

#[tokio::test]
async fn test_search_for_studies_builds_qido_request() {
    let (client, transport) = test_client();
    transport.push_response(json_response(json!([
        { "0020000D": { "vr": "UI", "Value": ["1.2.3"] } }
    ])));

    let studies = client
        .search_for_studies(&[("PatientID", "123"), ("limit", "10")])
        .await
        .expect("studies");
    assert_eq!(studies.len(), 1);

    let request = transport.single_request();
    assert_eq!(request.method, Method::GET);
    assert_eq!(
        request.url.as_str(),
        "http://localhost:8008/dicomweb/studies?PatientID=123&limit=10"
    );
    assert_eq!(
        request_header(&request, "Accept").as_deref(),
        Some("application/dicom+json")
    );
}

#[tokio::test]
async fn test_search_query_values_are_percent_encoded() {
    let (client, transport) = test_client();
    transport.push_response(json_response(json!([])));

    client
        .search_for_studies(&[("PatientName", "DOE^JOHN")])
        .await
        .expect("studies");

    let request = transport.single_request();
    assert_eq!(
        request.url.as_str(),
        "http://localhost:8008/dicomweb/studies?PatientName=DOE%5EJOHN"
    );
}

#[tokio::test]
async fn test_search_for_series_scoped_to_study() {
    let (client, transport) = test_client();
    transport.push_response(json_response(json!([])));

    client
        .search_for_series(Some("1.2.3"), &[])
        .await
        .expect("series");

    let request = transport.single_request();
    assert_eq!(
        request.url.as_str(),
        "http://localhost:8008/dicomweb/studies/1.2.3/series"
    );
}

#[tokio::test]
async fn test_search_for_instances_across_service() {
    let (client, transport) = test_client();
    transport.push_response(json_response(json!([])));

    client
        .search_for_instances(None, None, &[("Modality", "CT")])
        .await
        .expect("instances");

    let request = transport.single_request();
    assert_eq!(
        request.url.as_str(),
        "http://localhost:8008/dicomweb/instances?Modality=CT"
    );
}

#[tokio::test]
async fn test_series_level_instance_search_requires_study() {
    let (client, transport) = test_client();

    let err = client
        .search_for_instances(None, Some("4.5.6"), &[])
        .await
        .unwrap_err();
    assert!(matches!(err, DicomWebError::Config(_)));
    assert!(transport.requests().is_empty(), "no request must be sent");
}

#[tokio::test]
async fn test_empty_search_resolves_to_no_matches() {
    let (client, transport) = test_client();
    transport.push_response(empty_response(StatusCode::NO_CONTENT));

    let studies = client.search_for_studies(&[]).await.expect("studies");
    assert!(studies.is_empty());
}

#[tokio::test]
async fn test_error_status_is_reported() {
    let (client, transport) = test_client();
    transport.push_response(empty_response(StatusCode::BAD_REQUEST));

    let err = client.search_for_studies(&[]).await.unwrap_err();
    match err {
        DicomWebError::Http { status, url } => {
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert!(url.ends_with("/studies"));
        }
        other => panic!("unexpected error: {other}"),
    }
}
