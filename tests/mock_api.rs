//! Router-level tests for the mock print API.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt; // for .collect().await
use print_drop::sim::{MockPrintApi, MockSettings, create_router};
use serde_json::json;
use std::sync::Arc;
use tower::util::ServiceExt; // for `oneshot`

const ENDPOINT: &str = "/default/lambda_print";

fn test_state(settings: MockSettings) -> Arc<MockPrintApi> {
    Arc::new(MockPrintApi::new(settings, "http://mock.local"))
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

async fn issue(app: &axum::Router) -> (String, String) {
    let request = Request::builder()
        .method("GET")
        .uri(format!("{}?fileName=a%20b.pdf&fileType=application%2Fpdf", ENDPOINT))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    (
        json["uploadURL"].as_str().unwrap().to_string(),
        json["key"].as_str().unwrap().to_string(),
    )
}

#[tokio::test]
async fn test_issue_upload_url() {
    let state = test_state(MockSettings::default());
    let app = create_router(state.clone());
    let (upload_url, key) = issue(&app).await;

    assert!(upload_url.starts_with("http://mock.local/uploads/"));
    assert!(upload_url.contains("X-Amz-Signature="));
    assert!(key.starts_with("uploads/") && key.ends_with(".pdf"));
    assert_eq!(state.credential_requests()[0].file_name, "a b.pdf");
}

#[tokio::test]
async fn test_issue_upload_url_requires_query() {
    let app = create_router(test_state(MockSettings::default()));
    let request = Request::builder().method("GET").uri(ENDPOINT).body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_injected_credential_failure() {
    let app = create_router(test_state(MockSettings {
        fail_credentials: Some(StatusCode::FORBIDDEN),
        ..Default::default()
    }));
    let request = Request::builder()
        .method("GET")
        .uri(format!("{}?fileName=a.pdf&fileType=application%2Fpdf", ENDPOINT))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_signed_put_stores_object() {
    let state = test_state(MockSettings::default());
    let app = create_router(state.clone());
    let (upload_url, key) = issue(&app).await;
    let path = upload_url.trim_start_matches("http://mock.local");

    let request = Request::builder()
        .method("PUT")
        .uri(path)
        .header("content-type", "application/pdf")
        .body(Body::from("%PDF-1.4"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(state.object(&key).unwrap().content, b"%PDF-1.4".to_vec());
}

#[tokio::test]
async fn test_put_with_bad_signature_or_type_is_forbidden() {
    let state = test_state(MockSettings::default());
    let app = create_router(state.clone());
    let (upload_url, _) = issue(&app).await;
    let path = upload_url.trim_start_matches("http://mock.local");
    let unsigned = path.split('?').next().unwrap().to_string();

    let bad_signature = Request::builder()
        .method("PUT")
        .uri(format!("{}?X-Amz-Signature=forged", unsigned))
        .header("content-type", "application/pdf")
        .body(Body::from("x"))
        .unwrap();
    let response = app.clone().oneshot(bad_signature).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let wrong_type = Request::builder()
        .method("PUT")
        .uri(path)
        .header("content-type", "text/plain")
        .body(Body::from("x"))
        .unwrap();
    let response = app.clone().oneshot(wrong_type).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(state.object_count(), 0);
}

#[tokio::test]
async fn test_log_job_returns_sequential_ids() {
    let state = test_state(MockSettings::default());
    let app = create_router(state.clone());
    let payload = json!({
        "FileUrl": "https://mock.local/uploads/abc.pdf",
        "FileName": "abc.pdf",
        "Copies": 3,
        "IsColor": false
    });

    for expected in ["J-100", "J-101"] {
        let request = Request::builder()
            .method("POST")
            .uri(ENDPOINT)
            .header("content-type", "application/json")
            .body(Body::from(payload.to_string()))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["jobId"], expected);
    }
    let jobs = state.jobs();
    assert_eq!(jobs.len(), 2);
    assert_eq!(jobs[0].request.copies, 3);
    assert_eq!(jobs[0].request.is_color, Some(false));
}

#[tokio::test]
async fn test_log_job_without_color_field() {
    let state = test_state(MockSettings {
        omit_job_id: true,
        ..Default::default()
    });
    let app = create_router(state.clone());
    let payload = json!({"FileUrl": "u", "FileName": "n.pdf", "Copies": 1});
    let request = Request::builder()
        .method("POST")
        .uri(ENDPOINT)
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(json_body(response).await.get("jobId").is_none());
    assert_eq!(state.jobs()[0].request.is_color, None);
}

#[tokio::test]
async fn test_injected_log_failure_records_nothing() {
    let state = test_state(MockSettings {
        fail_log: Some(StatusCode::INTERNAL_SERVER_ERROR),
        ..Default::default()
    });
    let app = create_router(state.clone());
    let payload = json!({"FileUrl": "u", "FileName": "n.pdf", "Copies": 1});
    let request = Request::builder()
        .method("POST")
        .uri(ENDPOINT)
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(state.jobs().is_empty());
}
