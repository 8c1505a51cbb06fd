//! Verify URL formatting, response interpretation, and pagination against
//! JSON test vectors stored in `test-vectors/`.
//!
//! Options maps are compared as parsed JSON objects so key order in the
//! vector files does not matter.

use graph_core::{format_url, interpret, ApiErrorKind, Collection, GraphResponse, PageOptions, Params};
use serde_json::Value;

fn params_from(value: &Value) -> Params {
    let mut params = Params::new();
    for pair in value.as_array().unwrap() {
        let pair = pair.as_array().unwrap();
        params.insert_opt(pair[0].as_str().unwrap(), pair[1].as_str());
    }
    params
}

fn options_json(options: Option<&PageOptions>) -> Value {
    match options {
        Some(options) => options
            .present()
            .map(|(name, value)| (name.to_string(), Value::from(value)))
            .collect::<serde_json::Map<_, _>>()
            .into(),
        None => Value::Null,
    }
}

fn kind_from(name: &str) -> ApiErrorKind {
    match name {
        "Generic" => ApiErrorKind::Generic,
        "QueryParse" => ApiErrorKind::QueryParse,
        "GraphMethod" => ApiErrorKind::GraphMethod,
        "OAuth" => ApiErrorKind::OAuth,
        "OAuthAccessToken" => ApiErrorKind::OAuthAccessToken,
        other => panic!("unknown error kind: {other}"),
    }
}

// ---------------------------------------------------------------------------
// URL formatting
// ---------------------------------------------------------------------------

#[test]
fn format_url_test_vectors() {
    let raw = include_str!("../../test-vectors/format_url.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();
    let base = vectors["base_url"].as_str().unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let params = params_from(&case["params"]);
        let url = format_url(base, case["path"].as_str().unwrap(), &params);
        assert_eq!(url, case["expected"].as_str().unwrap(), "{name}");
    }
}

// ---------------------------------------------------------------------------
// Response interpretation
// ---------------------------------------------------------------------------

#[test]
fn interpret_test_vectors() {
    let raw = include_str!("../../test-vectors/interpret.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let expected = &case["expected"];
        let result = interpret(case["body"].clone());

        if let Some(kind) = expected.get("error") {
            let err = result.unwrap_err();
            assert_eq!(err.kind, kind_from(kind.as_str().unwrap()), "{name}: kind");
            assert_eq!(err.error_type, case["body"]["error"]["type"], "{name}: type");
            assert_eq!(err.message, case["body"]["error"]["message"], "{name}: message");
        } else if let Some(object) = expected.get("object") {
            assert_eq!(result.unwrap(), GraphResponse::Object(object.clone()), "{name}");
        } else {
            let collection = result.unwrap().into_collection().expect(name);
            let expected = &expected["collection"];
            assert_eq!(collection.len() as u64, expected["len"].as_u64().unwrap(), "{name}: len");
            assert_eq!(options_json(collection.next_options()), expected["next_options"], "{name}: next");
            assert_eq!(
                options_json(collection.previous_options()),
                expected["previous_options"],
                "{name}: previous"
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

#[test]
fn pagination_test_vectors() {
    let raw = include_str!("../../test-vectors/pagination.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let expected = &case["expected"];
        let collection = Collection::from_envelope(&case["body"]);

        assert_eq!(collection.len() as u64, expected["len"].as_u64().unwrap(), "{name}: len");
        assert_eq!(collection.next_url(), expected["next_url"].as_str(), "{name}: next_url");
        assert_eq!(collection.previous_url(), expected["previous_url"].as_str(), "{name}: previous_url");
        assert_eq!(options_json(collection.next_options()), expected["next_options"], "{name}: next_options");
        assert_eq!(
            options_json(collection.previous_options()),
            expected["previous_options"],
            "{name}: previous_options"
        );
        assert_eq!(collection.is_first(), expected["is_first"].as_bool().unwrap(), "{name}: is_first");
        assert_eq!(collection.has_next(), expected["has_next"].as_bool().unwrap(), "{name}: has_next");
        assert_eq!(
            collection.has_previous(),
            expected["has_previous"].as_bool().unwrap(),
            "{name}: has_previous"
        );
    }
}
