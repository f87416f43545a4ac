use super::*;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn multipart_request(uri: &str, field: &str, filename: &str, contents: &str) -> Request<Body> {
    let boundary = "catalog-import-test-boundary";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n\
         Content-Type: application/json\r\n\r\n\
         {contents}\r\n\
         --{boundary}--\r\n"
    );
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_import_uploads_images_and_creates_entries() {
    let images = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/lamp.png"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/png")
                .set_body_bytes(b"\x89PNG lamp".to_vec()),
        )
        .mount(&images)
        .await;

    let host = create_test_host(|_| {}).await;
    let request = post_json(
        &format!("/import/{PRODUCT}"),
        json!({"data": [
            {"title": "Lamp", "image": format!("{}/lamp.png", images.uri())},
            {"title": "Desk"}
        ]}),
    );

    let response = host.router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["result"]["contentTypeId"], PRODUCT);
    assert_eq!(body["result"]["totalRecords"], 2);
    assert_eq!(body["result"]["successful"], 2);
    assert_eq!(body["result"]["failed"], 0);

    let media = host.db.list_media().await.unwrap();
    assert_eq!(media.len(), 1);
    // Records within a batch run concurrently, so insertion order is not fixed
    let entries = host.db.list_entries(PRODUCT).await.unwrap();
    let lamp = entries.iter().find(|e| e.data["title"] == "Lamp").unwrap();
    let desk = entries.iter().find(|e| e.data["title"] == "Desk").unwrap();
    assert_eq!(lamp.data["image"], json!({"connect": [media[0].id]}));
    assert_eq!(desk.data, json!({"title": "Desk"}));
}

#[tokio::test]
async fn test_import_reports_per_record_failures() {
    let host = create_test_host(|_| {}).await;
    let request = post_json(
        &format!("/import/{PRODUCT}"),
        json!({"data": [{"title": "ok"}, {"price": 3}, {"title": "also ok"}]}),
    );

    let response = host.router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["result"]["successful"], 2);
    assert_eq!(body["result"]["failed"], 1);
    assert_eq!(body["result"]["errors"][0]["index"], 1);
    assert!(
        body["result"]["errors"][0]["message"]
            .as_str()
            .unwrap()
            .contains("title")
    );
    assert_eq!(host.db.count_entries(PRODUCT).await.unwrap(), 2);
}

#[tokio::test]
async fn test_import_rejects_non_array_data() {
    let host = create_test_host(|_| {}).await;

    for body in [json!({"data": {"title": "x"}}), json!({})] {
        let response = host
            .router()
            .oneshot(post_json(&format!("/import/{PRODUCT}"), body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"]["code"], "not_an_array");
    }
}

#[tokio::test]
async fn test_import_unknown_content_type() {
    let host = create_test_host(|_| {}).await;

    let response = host
        .router()
        .oneshot(post_json("/import/api::ghost.ghost", json!({"data": []})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "unknown_content_type");
    assert_eq!(body["error"]["details"]["content_type"], "api::ghost.ghost");
}

#[tokio::test]
async fn test_import_json_text() {
    let host = create_test_host(|_| {}).await;

    let response = host
        .router()
        .oneshot(post_json(
            &format!("/import-json/{PRODUCT}"),
            json!({"jsonData": r#"[{"title": "From text"}]"#}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["result"]["successful"], 1);

    let response = host
        .router()
        .oneshot(post_json(
            &format!("/import-json/{PRODUCT}"),
            json!({"jsonData": "[{\"title\": "}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"]["code"], "invalid_json");

    let response = host
        .router()
        .oneshot(post_json(
            &format!("/import-json/{PRODUCT}"),
            json!({"jsonData": "{\"title\": \"one\"}"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"]["code"], "not_an_array");
}

#[tokio::test]
async fn test_upload_file() {
    let host = create_test_host(|_| {}).await;

    let response = host
        .router()
        .oneshot(multipart_request(
            &format!("/upload-file/{PRODUCT}"),
            "file",
            "products.json",
            r#"[{"title": "Uploaded"}, {"title": "Second"}]"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["result"]["successful"], 2);
    assert_eq!(host.db.count_entries(PRODUCT).await.unwrap(), 2);
}

#[tokio::test]
async fn test_upload_file_errors() {
    let host = create_test_host(|_| {}).await;

    let response = host
        .router()
        .oneshot(multipart_request(
            &format!("/upload-file/{PRODUCT}"),
            "attachment",
            "products.json",
            "[]",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"]["code"], "invalid_input");

    let response = host
        .router()
        .oneshot(multipart_request(
            &format!("/upload-file/{PRODUCT}"),
            "file",
            "broken.json",
            "[{",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "invalid_json");
    assert!(body["error"]["message"].as_str().unwrap().contains("broken.json"));
}

#[tokio::test]
async fn test_import_local_file() {
    let host = create_test_host(|_| {}).await;
    let file = host.dir.path().join("local.json");
    std::fs::write(&file, r#"[{"title": "Local"}]"#).unwrap();

    let response = host
        .router()
        .oneshot(post_json(
            &format!("/import-local-file/{PRODUCT}"),
            json!({"filePath": file}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["result"]["successful"], 1);

    let response = host
        .router()
        .oneshot(post_json(
            &format!("/import-local-file/{PRODUCT}"),
            json!({"filePath": host.dir.path().join("nope.json")}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["error"]["code"], "file_not_found");

    let response = host
        .router()
        .oneshot(post_json(
            &format!("/import-local-file/{PRODUCT}"),
            json!({"filePath": "  "}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_body_limit() {
    let host = create_test_host(|config| config.server.api.max_body_bytes = 64).await;
    let records: Vec<Value> = (0..20).map(|i| json!({"title": format!("record {i}")})).collect();

    let response = host
        .router()
        .oneshot(post_json(
            &format!("/import/{PRODUCT}"),
            json!({"data": records}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(host.db.count_entries(PRODUCT).await.unwrap(), 0);
}
