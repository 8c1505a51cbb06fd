use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, APP_ACCESS_TOKEN, APP_ID, APP_SECRET, AUTH_CODE, ME_ID, USER_ACCESS_TOKEN};
use serde_json::Value;
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn get(uri: &str) -> Request<String> {
    Request::builder()
        .uri(uri)
        .header(http::header::HOST, "graph.test")
        .body(String::new())
        .unwrap()
}

fn form_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(body.to_string())
        .unwrap()
}

fn assert_error(body: &Value, error_type: &str) {
    assert_eq!(body["error"]["type"], error_type, "unexpected body: {body}");
    assert!(body["error"]["message"].is_string());
}

// --- objects ---

#[tokio::test]
async fn object_by_alias() {
    let resp = app().oneshot(get("/cocacola")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["name"], "Coca-Cola");
    assert_eq!(body["id"], "40796308305");
}

#[tokio::test]
async fn object_with_field_selection() {
    let resp = app().oneshot(get("/btaylor?fields=id,name")).await.unwrap();
    let body = body_json(resp).await;
    assert_eq!(body, serde_json::json!({"id": "220439", "name": "Bret Taylor"}));
}

#[tokio::test]
async fn unknown_field_is_query_parse_error() {
    let resp = app().oneshot(get("/btaylor?fields=shoe_size")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_error(&body_json(resp).await, "QueryParseException");
}

#[tokio::test]
async fn unknown_object_is_graph_method_error() {
    let resp = app().oneshot(get("/nobody-here")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_error(&body_json(resp).await, "GraphMethodException");
}

#[tokio::test]
async fn me_without_token_is_oauth_error() {
    let resp = app().oneshot(get("/me")).await.unwrap();
    assert_error(&body_json(resp).await, "OAuthException");
}

#[tokio::test]
async fn me_with_token() {
    let resp = app()
        .oneshot(get(&format!("/me?access_token={USER_ACCESS_TOKEN}")))
        .await
        .unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["id"], ME_ID);
}

// --- batch ---

#[tokio::test]
async fn batch_lookup_keys_by_requested_id() {
    let resp = app().oneshot(get("/?ids=btaylor,cocacola&fields=name")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["btaylor"]["name"], "Bret Taylor");
    assert_eq!(body["cocacola"]["name"], "Coca-Cola");
}

// --- edges and paging ---

#[tokio::test]
async fn edge_is_paginated() {
    let resp = app().oneshot(get("/cocacola/photos?limit=2")).await.unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["paging"]["next"], "http://graph.test/cocacola/photos?limit=2&offset=2");
    assert!(body["paging"].get("previous").is_none());
}

#[tokio::test]
async fn unknown_edge_is_empty_list() {
    let resp = app().oneshot(get("/btaylor/movies")).await.unwrap();
    let body = body_json(resp).await;
    assert_eq!(body, serde_json::json!({"data": []}));
}

#[tokio::test]
async fn search_filters_by_type() {
    let resp = app().oneshot(get("/search?q=coca&type=page")).await.unwrap();
    let body = body_json(resp).await;
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["name"], "Coca-Cola");

    let resp = app().oneshot(get("/search?q=coca&type=user")).await.unwrap();
    assert!(body_json(resp).await["data"].as_array().unwrap().is_empty());
}

// --- publish / remove ---

#[tokio::test]
async fn publish_requires_token() {
    let resp = app()
        .oneshot(form_request("POST", "/me/feed", "message=hi"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_error(&body_json(resp).await, "OAuthException");
}

#[tokio::test]
async fn publish_then_remove_post() {
    let app = app();
    let body = format!("access_token={USER_ACCESS_TOKEN}&message=Hello+there");
    let resp = app
        .clone()
        .oneshot(form_request("POST", "/me/feed", &body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let created = body_json(resp).await;
    let post_id = created["id"].as_str().unwrap().to_string();
    assert!(post_id.starts_with(&format!("{ME_ID}_")));

    let resp = app.clone().oneshot(get(&format!("/{post_id}"))).await.unwrap();
    assert_eq!(body_json(resp).await["message"], "Hello there");

    let resp = app
        .clone()
        .oneshot(form_request("DELETE", &format!("/{post_id}"), &format!("access_token={USER_ACCESS_TOKEN}")))
        .await
        .unwrap();
    assert_eq!(body_bytes(resp).await, "true");

    let resp = app.oneshot(get(&format!("/{post_id}"))).await.unwrap();
    assert_error(&body_json(resp).await, "GraphMethodException");
}

#[tokio::test]
async fn bad_token_is_access_token_error() {
    let resp = app()
        .oneshot(form_request("DELETE", "/4/likes", "access_token=stale"))
        .await
        .unwrap();
    assert_error(&body_json(resp).await, "OAuthAccessTokenException");
}

// --- oauth ---

#[tokio::test]
async fn user_token_exchange_is_form_encoded() {
    let uri = format!(
        "/oauth/access_token?client_id={APP_ID}&client_secret={APP_SECRET}&redirect_uri=http%3A%2F%2Fx&code={AUTH_CODE}"
    );
    let resp = app().oneshot(get(&uri)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_bytes(resp).await;
    assert_eq!(body, format!("access_token={USER_ACCESS_TOKEN}&expires=4000"));
}

#[tokio::test]
async fn app_token_exchange() {
    let uri = format!("/oauth/access_token?client_id={APP_ID}&client_secret={APP_SECRET}&type=client_cred");
    let resp = app().oneshot(get(&uri)).await.unwrap();
    let body = String::from_utf8(body_bytes(resp).await.to_vec()).unwrap();
    assert_eq!(body, "access_token=112157085578818%7Capp-access-token");
    assert!(APP_ACCESS_TOKEN.contains('|'));
}

#[tokio::test]
async fn wrong_secret_is_oauth_error() {
    let uri = format!("/oauth/access_token?client_id={APP_ID}&client_secret=wrong&type=client_cred");
    let resp = app().oneshot(get(&uri)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_error(&body_json(resp).await, "OAuthException");
}

// --- insights ---

#[tokio::test]
async fn insights_metric_requires_app_token() {
    let resp = app()
        .oneshot(get(&format!("/{APP_ID}/insights/application_api_call/day")))
        .await
        .unwrap();
    assert_error(&body_json(resp).await, "OAuthException");
}
