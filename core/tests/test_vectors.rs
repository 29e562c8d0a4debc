//! Verify resolution, signing and status classification against the JSON
//! vectors stored in `test-vectors/`.

use ovh_core::signature::{sign, signing_string};
use ovh_core::{endpoint, ClientConfig, HttpMethod, HttpResponse, OvhClient};

fn client(endpoint: &str) -> OvhClient {
    OvhClient::new(ClientConfig::new(endpoint, "ak", "as", "ck"))
}

// ---------------------------------------------------------------------------
// Endpoints
// ---------------------------------------------------------------------------

#[test]
fn endpoint_test_vectors() {
    let raw = include_str!("../../test-vectors/endpoints.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();
    let path = vectors["path"].as_str().unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["endpoint"].as_str().unwrap();
        let expected = case["expected_url"].as_str().unwrap();

        assert_eq!(format!("{}{path}", endpoint::resolve(name)), expected, "{name}: resolve");

        let req = client(name).build_request_at(HttpMethod::Get, path, "", true, 1000);
        assert_eq!(req.url, expected, "{name}: request url");
    }
}

// ---------------------------------------------------------------------------
// Signatures
// ---------------------------------------------------------------------------

#[test]
fn signature_test_vectors() {
    let raw = include_str!("../../test-vectors/signatures.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let field = |key: &str| case[key].as_str().unwrap();
        let timestamp = case["timestamp"].as_i64().unwrap();

        let to_sign = signing_string(
            field("secret"),
            field("consumer_key"),
            field("method"),
            field("url"),
            field("body"),
            timestamp,
        );
        assert_eq!(to_sign, field("expected_signing_string"), "{name}: signing string");

        let signature = sign(
            field("secret"),
            field("consumer_key"),
            field("method"),
            field("url"),
            field("body"),
            timestamp,
        );
        assert_eq!(signature, field("expected_signature"), "{name}: signature");
    }
}

// ---------------------------------------------------------------------------
// Status classification
// ---------------------------------------------------------------------------

#[test]
fn status_test_vectors() {
    let raw = include_str!("../../test-vectors/statuses.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    let c = client("ovh-eu");
    for case in vectors["cases"].as_array().unwrap() {
        let status = case["status"].as_u64().unwrap() as u16;
        let body = case["body"].as_str().unwrap();
        let response = HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        };
        let result = c.parse_response(response);

        if let Some(expected_error) = case.get("expected_error") {
            let err = result.unwrap_err();
            assert_eq!(err.kind().as_str(), expected_error.as_str().unwrap(), "{status}: kind");
            assert_eq!(err.message(), body, "{status}: message");
        } else {
            let payload = result.unwrap();
            assert_eq!(payload, case["expected_result"].as_str().unwrap(), "{status}: payload");
        }
    }
}
