//! Integration tests for the Gemini client against a local stub server.

use kingsley_integration_tests::{StubGemini, StubResponse, TEST_API_KEY};
use kingsley_storefront::config::StylistConfig;
use kingsley_storefront::gemini::prompt::{SYSTEM_INSTRUCTION, build_request};
use kingsley_storefront::gemini::{
    CONNECTION_FALLBACK, EMPTY_REPLY_FALLBACK, GeminiClient, GeminiError,
};
use kingsley_storefront::stylist::ImageAttachment;
use serde_json::json;

// =============================================================================
// Request Shape
// =============================================================================

#[tokio::test]
async fn test_text_request_shape() {
    let stub = StubGemini::start(StubResponse::Reply("A navy blazer.".to_string())).await;
    let client = stub.client();

    let reply = client.stylist_reply(&[], "What suits a garden party?", None).await;
    assert_eq!(reply, "A navy blazer.");

    let requests = stub.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.call, "gemini-2.5-flash:generateContent");
    assert_eq!(request.api_key.as_deref(), Some(TEST_API_KEY));

    let body = &request.body;
    assert_eq!(body["systemInstruction"]["parts"][0]["text"], SYSTEM_INSTRUCTION);
    assert_eq!(body["contents"][0]["role"], "user");
    assert_eq!(
        body["contents"][0]["parts"],
        json!([{ "text": "What suits a garden party?" }])
    );
    assert_eq!(body["generationConfig"]["temperature"], 0.7);
}

#[tokio::test]
async fn test_image_request_shape() {
    let stub = StubGemini::start(StubResponse::Reply("Lovely drape.".to_string())).await;
    let client = stub.client();
    let image = ImageAttachment::from_bytes(b"outfit", "image/png");

    let reply = client
        .stylist_reply(&[], "Is this right for a gala?", Some(&image))
        .await;
    assert_eq!(reply, "Lovely drape.");

    let requests = stub.requests();
    let parts = &requests[0].body["contents"][0]["parts"];
    assert_eq!(
        *parts,
        json!([
            { "inlineData": { "mimeType": "image/jpeg", "data": "b3V0Zml0" } },
            { "text": "Is this right for a gala?" }
        ])
    );
}

#[tokio::test]
async fn test_custom_model_in_path() {
    let stub = StubGemini::start(StubResponse::Reply("ok".to_string())).await;
    let config = StylistConfig {
        model: "gemini-2.5-pro".to_string(),
        temperature: 0.2,
        ..stub.config()
    };
    let client = GeminiClient::new(&config).expect("client");

    let request = build_request(&[], "hi", None, client.temperature());
    client.generate_content(&request).await.expect("response");

    let requests = stub.requests();
    assert_eq!(requests[0].call, "gemini-2.5-pro:generateContent");
    let temperature = requests[0].body["generationConfig"]["temperature"]
        .as_f64()
        .expect("temperature");
    assert!((temperature - 0.2).abs() < 1e-6);
}

// =============================================================================
// Error Mapping
// =============================================================================

#[tokio::test]
async fn test_unauthorized() {
    let stub = StubGemini::start(StubResponse::Error {
        status: 403,
        body: json!({
            "error": { "code": 403, "message": "API key not valid.", "status": "PERMISSION_DENIED" }
        }),
    })
    .await;

    let request = build_request(&[], "hi", None, 0.7);
    let err = stub
        .client()
        .generate_content(&request)
        .await
        .expect_err("forbidden");
    assert!(matches!(err, GeminiError::Unauthorized(ref m) if m == "API key not valid."));
}

#[tokio::test]
async fn test_rate_limited_reads_retry_after() {
    let stub = StubGemini::start(StubResponse::RateLimited { retry_after: 7 }).await;

    let request = build_request(&[], "hi", None, 0.7);
    let err = stub
        .client()
        .generate_content(&request)
        .await
        .expect_err("rate limited");
    assert!(matches!(err, GeminiError::RateLimited(7)));
}

#[tokio::test]
async fn test_server_error_uses_error_body() {
    let stub = StubGemini::start(StubResponse::Error {
        status: 500,
        body: json!({
            "error": { "code": 500, "message": "Internal error encountered.", "status": "INTERNAL" }
        }),
    })
    .await;

    let request = build_request(&[], "hi", None, 0.7);
    let err = stub
        .client()
        .generate_content(&request)
        .await
        .expect_err("server error");
    match err {
        GeminiError::Api { status, message } => {
            assert_eq!(status, "INTERNAL");
            assert_eq!(message, "Internal error encountered.");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_body_is_parse_error() {
    let stub = StubGemini::start(StubResponse::Malformed).await;

    let request = build_request(&[], "hi", None, 0.7);
    let err = stub
        .client()
        .generate_content(&request)
        .await
        .expect_err("malformed");
    assert!(matches!(err, GeminiError::Parse(_)));
}

// =============================================================================
// Fallback Replies
// =============================================================================

#[tokio::test]
async fn test_failures_become_connection_fallback() {
    let stub = StubGemini::start(StubResponse::Error {
        status: 503,
        body: json!({ "error": { "code": 503, "message": "Overloaded", "status": "UNAVAILABLE" } }),
    })
    .await;

    let reply = stub.client().stylist_reply(&[], "hello", None).await;
    assert_eq!(reply, CONNECTION_FALLBACK);
}

#[tokio::test]
async fn test_no_candidates_becomes_empty_fallback() {
    let stub = StubGemini::start(StubResponse::Json(json!({
        "promptFeedback": { "blockReason": "SAFETY" }
    })))
    .await;

    let reply = stub.client().stylist_reply(&[], "hello", None).await;
    assert_eq!(reply, EMPTY_REPLY_FALLBACK);
}

#[tokio::test]
async fn test_missing_key_sends_nothing() {
    let stub = StubGemini::start(StubResponse::Reply("unused".to_string())).await;
    let config = StylistConfig {
        api_key: None,
        ..stub.config()
    };
    let client = GeminiClient::new(&config).expect("client");

    let reply = client.stylist_reply(&[], "hello", None).await;
    assert_eq!(reply, CONNECTION_FALLBACK);
    assert!(stub.requests().is_empty());
}

#[tokio::test]
async fn test_unreachable_server_becomes_connection_fallback() {
    let config = StylistConfig {
        api_key: Some(TEST_API_KEY.into()),
        api_base_url: "http://127.0.0.1:9/v1beta".to_string(),
        ..StylistConfig::default()
    };
    let client = GeminiClient::new(&config).expect("client");

    let reply = client.stylist_reply(&[], "hello", None).await;
    assert_eq!(reply, CONNECTION_FALLBACK);
}
