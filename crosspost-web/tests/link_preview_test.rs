mod common;

use axum::http::StatusCode;
use common::{
    body_json, json_request, spawn_app, spawn_app_with_preview, spawn_app_with_preview_timeout,
};
use crosspost_web::config::PreviewSettings;
use serde_json::json;
use std::time::Duration;
use tower::util::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ARTICLE: &str = r#"<!doctype html>
<html><head>
  <title>Fallback title</title>
  <meta property="og:title" content="Shipping Rust at scale">
  <meta property="og:description" content="Notes from a year in production.">
  <meta property="og:image" content="https://cdn.example/cover.png">
</head><body></body></html>"#;

async fn mount_html(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body.to_owned(), "text/html"))
        .mount(server)
        .await;
}

#[tokio::test]
async fn single_preview_reads_open_graph_tags() {
    let server = MockServer::start().await;
    mount_html(&server, "/article", ARTICLE).await;
    let app = spawn_app();

    let url = format!("{}/article", server.uri());
    let response = app
        .router
        .oneshot(json_request("POST", "/api/link-preview", json!({ "url": url })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({
            "url": url,
            "title": "Shipping Rust at scale",
            "description": "Notes from a year in production.",
            "image": "https://cdn.example/cover.png"
        })
    );
}

#[tokio::test]
async fn server_error_degrades_to_bare_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500).set_body_raw(ARTICLE, "text/html"))
        .mount(&server)
        .await;
    let app = spawn_app();

    let url = format!("{}/broken", server.uri());
    let response = app
        .router
        .oneshot(json_request("POST", "/api/link-preview", json!({ "url": url })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "url": url }));
}

#[tokio::test]
async fn slow_page_times_out_to_bare_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(ARTICLE, "text/html")
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;
    let app = spawn_app_with_preview_timeout(200);

    let url = format!("{}/slow", server.uri());
    let response = app
        .router
        .oneshot(json_request("POST", "/api/link-preview", json!({ "url": url })))
        .await
        .unwrap();

    assert_eq!(body_json(response).await, json!({ "url": url }));
}

#[tokio::test]
async fn oversized_page_degrades_to_bare_url() {
    let server = MockServer::start().await;
    let padding = "x".repeat(8 * 1024);
    mount_html(&server, "/huge", &format!("{}{}", ARTICLE, padding)).await;
    mount_html(&server, "/small", ARTICLE).await;
    let app = spawn_app_with_preview(PreviewSettings {
        max_body_bytes: 4 * 1024,
        ..PreviewSettings::default()
    });

    let base = server.uri();
    let text = format!("{base}/huge {base}/small", base = base);
    let response = app
        .router
        .oneshot(json_request("POST", "/api/link-previews", json!({ "text": text })))
        .await
        .unwrap();

    let previews = body_json(response).await;
    assert_eq!(previews[0], json!({ "url": format!("{}/huge", base) }));
    assert_eq!(previews[1]["title"], "Shipping Rust at scale");
}

#[tokio::test]
async fn missing_url_is_bad_request() {
    let app = spawn_app();

    for body in [json!({}), json!({ "url": "" }), json!({ "url": "   " })] {
        let response = app
            .router
            .clone()
            .oneshot(json_request("POST", "/api/link-preview", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "URL is required");
    }
}

#[tokio::test]
async fn text_previews_keep_link_order_and_isolate_failures() {
    let server = MockServer::start().await;
    mount_html(&server, "/article", ARTICLE).await;
    mount_html(
        &server,
        "/plain",
        "<html><head><title> Just a title </title></head></html>",
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/late"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(
                    r#"<meta name="twitter:title" content="Late but here">"#,
                    "text/html",
                )
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;
    let app = spawn_app();

    let base = server.uri();
    let text = format!(
        "First {base}/late then {base}/gone, see {base}/article\nand {base}/plain",
        base = base
    );
    let response = app
        .router
        .oneshot(json_request("POST", "/api/link-previews", json!({ "text": text })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let previews = body_json(response).await;
    let previews = previews.as_array().unwrap();
    assert_eq!(previews.len(), 4);

    assert_eq!(previews[0]["url"], format!("{}/late", base));
    assert_eq!(previews[0]["title"], "Late but here");
    // The comma is part of the URL since only whitespace ends a link.
    assert_eq!(previews[1], json!({ "url": format!("{}/gone,", base) }));
    assert_eq!(previews[2]["title"], "Shipping Rust at scale");
    assert_eq!(previews[3]["title"], "Just a title");
    assert!(previews[3].get("description").is_none());
}

#[tokio::test]
async fn text_without_links_yields_empty_list() {
    let app = spawn_app();

    let response = app
        .router
        .oneshot(json_request(
            "POST",
            "/api/link-previews",
            json!({ "text": "nothing to see here" }),
        ))
        .await
        .unwrap();

    assert_eq!(body_json(response).await, json!([]));
}
