//! HTTP surface tests
//!
//! Drives the router directly with `tower::ServiceExt::oneshot`, so
//! no socket is bound. Multipart bodies are assembled by hand to keep
//! the wire shape visible in the test.

mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::Value;
use tower::ServiceExt;

use common::{FailingReply, FakeEngines, FixedReply, SttScript, TtsScript, build_pipeline, wav_bytes};
use vox_gateway::api::{ApiServer, ApiState};
use vox_gateway::{Config, ReplyGenerator};

const BOUNDARY: &str = "vox-test-boundary";

fn router_over(
    dir: &std::path::Path,
    engines: Arc<FakeEngines>,
    reply: Arc<dyn ReplyGenerator>,
) -> axum::Router {
    router_with_config(dir, engines, reply, Config::default())
}

fn router_with_config(
    dir: &std::path::Path,
    engines: Arc<FakeEngines>,
    reply: Arc<dyn ReplyGenerator>,
    config: Config,
) -> axum::Router {
    let state = Arc::new(ApiState {
        pipeline: build_pipeline(dir, engines, reply),
        config,
    });
    ApiServer::new(state, "127.0.0.1".to_string(), 0).router()
}

fn multipart_body(field: &str, filename: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: audio/wav\r\n\r\n");
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn field_upload_request(field: &str, filename: &str, bytes: &[u8]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/voice-chat")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(field, filename, bytes)))
        .unwrap()
}

fn upload_request(filename: &str, bytes: &[u8]) -> Request<Body> {
    field_upload_request("file", filename, bytes)
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn voice_chat_returns_reply_and_audio() {
    let dir = tempfile::tempdir().unwrap();
    let engines = FakeEngines::new(
        SttScript::Transcript("what time is it"),
        TtsScript::Wav {
            sample_rate: 22050,
            frames: 30000,
        },
    );
    let router = router_over(
        dir.path(),
        Arc::clone(&engines),
        Arc::new(FixedReply("It is 3 PM.")),
    );

    let response = router
        .oneshot(upload_request("clip.wav", b"RIFF....fake clip"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["response"], "It is 3 PM.");
    let decoded = BASE64
        .decode(body["audio_base64"].as_str().unwrap())
        .unwrap();
    assert_eq!(decoded, wav_bytes(22050, 30000));
}

#[tokio::test]
async fn zero_byte_upload_is_rejected_before_any_engine_runs() {
    let dir = tempfile::tempdir().unwrap();
    let engines = FakeEngines::new(
        SttScript::Transcript("unreachable"),
        TtsScript::Wav {
            sample_rate: 22050,
            frames: 500,
        },
    );
    let router = router_over(
        dir.path(),
        Arc::clone(&engines),
        Arc::new(FixedReply("unreachable")),
    );

    let response = router
        .oneshot(upload_request("clip.wav", b""))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body, serde_json::json!({"error": "Empty file"}));
    assert_eq!(engines.stt_invocations(), 0);
    assert_eq!(engines.tts_invocations(), 0);
}

#[tokio::test]
async fn recognition_failure_maps_to_unprocessable_entity() {
    let dir = tempfile::tempdir().unwrap();
    let engines = FakeEngines::new(
        SttScript::Fail("failed to decode audio"),
        TtsScript::Wav {
            sample_rate: 22050,
            frames: 500,
        },
    );
    let router = router_over(dir.path(), engines, Arc::new(FixedReply("unreachable")));

    let response = router
        .oneshot(upload_request("clip.wav", b"clip"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(response).await;
    assert_eq!(body["stage"], "stt");
}

#[tokio::test]
async fn reply_failure_maps_to_bad_gateway() {
    let dir = tempfile::tempdir().unwrap();
    let engines = FakeEngines::new(
        SttScript::Transcript("hello"),
        TtsScript::Wav {
            sample_rate: 22050,
            frames: 500,
        },
    );
    let router = router_over(
        dir.path(),
        engines,
        Arc::new(FailingReply("upstream quota exhausted")),
    );

    let response = router
        .oneshot(upload_request("clip.wav", b"clip"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = json_body(response).await;
    assert_eq!(body["stage"], "llm");
}

#[tokio::test]
async fn synthesis_failure_maps_to_internal_server_error() {
    let dir = tempfile::tempdir().unwrap();
    let engines = FakeEngines::new(SttScript::Transcript("hello"), TtsScript::Garbage);
    let router = router_over(dir.path(), engines, Arc::new(FixedReply("Hi there.")));

    let response = router
        .oneshot(upload_request("clip.wav", b"clip"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["stage"], "tts");
}

#[tokio::test]
async fn fields_other_than_file_are_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let engines = FakeEngines::new(
        SttScript::Transcript("unreachable"),
        TtsScript::Wav {
            sample_rate: 22050,
            frames: 500,
        },
    );
    let router = router_over(
        dir.path(),
        Arc::clone(&engines),
        Arc::new(FixedReply("unreachable")),
    );

    let response = router
        .oneshot(field_upload_request("attachment", "clip.wav", b"clip"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body, serde_json::json!({"error": "Empty file"}));
    assert_eq!(engines.stt_invocations(), 0);
}

#[tokio::test]
async fn blank_api_key_is_not_reported_as_configured() {
    let dir = tempfile::tempdir().unwrap();
    let engines = FakeEngines::new(
        SttScript::Transcript("unused"),
        TtsScript::Wav {
            sample_rate: 22050,
            frames: 500,
        },
    );
    let mut config = Config::default();
    config.llm.api_key = Some(String::new());
    let router = router_with_config(dir.path(), engines, Arc::new(FixedReply("unused")), config);

    let response = router
        .oneshot(
            Request::builder()
                .uri("/capabilities")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["llm_configured"], false);
}

#[tokio::test]
async fn health_reports_version() {
    let dir = tempfile::tempdir().unwrap();
    let engines = FakeEngines::new(
        SttScript::Transcript("unused"),
        TtsScript::Wav {
            sample_rate: 22050,
            frames: 500,
        },
    );
    let router = router_over(dir.path(), engines, Arc::new(FixedReply("unused")));

    let response = router
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}
