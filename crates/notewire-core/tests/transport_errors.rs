//! Transport failures: error envelopes, notices, and request shape.


use fixtures::{controller_for, sse_body, sse_response, text_turn, TEST_TOKEN};
use notewire_core::session::{Role, SessionStatus, Submission};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn rejected_request_surfaces_the_detail_and_resets() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(
            ResponseTemplate::new(429).set_body_string(r#"{"detail":"rate limited"}"#),
        )
        .mount(&server)
        .await;

    let mut controller = controller_for(&server.uri());
    let outcome = controller.submit("Summarize my notes").await;
    assert!(matches!(outcome, Submission::Failed));

    // The notice carries the backend's detail string verbatim.
    assert_eq!(controller.notices().len(), 1);
    assert_eq!(controller.notices()[0].text, "rate limited");
    // Status returns to idle so the user can retry.
    assert_eq!(controller.status(), SessionStatus::Idle);
    // The user message already appended stays; no assistant message.
    assert_eq!(controller.messages().len(), 1);
    assert_eq!(controller.messages()[0].role, Role::User);
}

#[tokio::test]
async fn unparseable_error_body_falls_back_to_a_generic_notice() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<html>boom</html>"))
        .mount(&server)
        .await;

    let mut controller = controller_for(&server.uri());
    let outcome = controller.submit("hello").await;
    assert!(matches!(outcome, Submission::Failed));
    assert_eq!(controller.notices()[0].text, "HTTP 500");
    assert_eq!(controller.status(), SessionStatus::Idle);
}

#[tokio::test]
async fn mid_stream_error_event_surfaces_and_keeps_partial_output() {
    let server = MockServer::start().await;
    let body = sse_body(&[
        r#"{"type":"text-delta","index":0,"delta":"partial"}"#,
        r#"{"type":"error","errorText":"graph exploded"}"#,
    ]);
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(sse_response(&body))
        .mount(&server)
        .await;

    let mut controller = controller_for(&server.uri());
    let Submission::Accepted(turn) = controller.submit("hello").await else {
        panic!("submission should be accepted");
    };
    controller.drive(turn).await;

    assert_eq!(controller.notices()[0].text, "graph exploded");
    assert_eq!(controller.status(), SessionStatus::Idle);
    // The partial assistant output stays in history.
    assert_eq!(controller.messages()[1].text(), "partial");
}

#[tokio::test]
async fn request_carries_bearer_token_and_spec_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(header("authorization", format!("Bearer {TEST_TOKEN}")))
        .and(body_partial_json(json!({
            "message": {
                "text": "Summarize my notes",
                "attachments": []
            }
        })))
        .respond_with(sse_response(&text_turn(&["ok"])))
        .expect(1)
        .mount(&server)
        .await;

    let mut controller = controller_for(&server.uri());
    let Submission::Accepted(turn) = controller.submit("Summarize my notes").await else {
        panic!("submission should be accepted");
    };
    controller.drive(turn).await;
    // Mock expectations verified on drop.
}

#[tokio::test]
async fn thread_id_is_stable_across_turns() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(sse_response(&text_turn(&["ok"])))
        .mount(&server)
        .await;

    let mut controller = controller_for(&server.uri());
    let thread = controller.thread().to_string();

    for prompt in ["first question", "second question"] {
        let Submission::Accepted(turn) = controller.submit(prompt).await else {
            panic!("submission should be accepted");
        };
        controller.drive(turn).await;
    }

    assert_eq!(controller.thread().to_string(), thread);
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    for request in &requests {
        let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
        assert_eq!(body["thread_id"], thread.as_str());
    }
}

#[tokio::test]
async fn staged_attachments_ride_along_and_are_consumed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(sse_response(&text_turn(&["indexed"])))
        .mount(&server)
        .await;

    let mut controller = controller_for(&server.uri());
    let staged = controller.stage_attachment(
        notewire_core::session::Attachment::from_bytes("notes.pdf", "application/pdf", b"%PDF-"),
    );
    assert!(staged);
    // Unsupported media types never enter the staging set.
    assert!(!controller.stage_attachment(notewire_core::session::Attachment::from_bytes(
        "cat.png",
        "image/png",
        b"\x89PNG"
    )));
    assert_eq!(controller.staged_attachments().len(), 1);

    let Submission::Accepted(turn) = controller.submit("index this").await else {
        panic!("submission should be accepted");
    };
    controller.drive(turn).await;

    // The staging set is discarded once the message is sent.
    assert!(controller.staged_attachments().is_empty());
    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["message"]["attachments"][0]["name"], "notes.pdf");
    assert_eq!(
        body["message"]["attachments"][0]["mediaType"],
        "application/pdf"
    );
}
