mod common;

use common::*;

use async_trait::async_trait;
use futures::FutureExt;
use serde_json::{json, Value};
use webwalk::prelude::*;

#[tokio::test]
async fn test_empty_steps_resolve_to_none_without_exchange() {
    init_tracing();
    let transport = MockTransport::new();
    let requests = transport.requests();
    let walker = Walker::with_transport(transport);

    let output = walker.walk(&WalkConfig::new()).await.unwrap();

    assert!(output.is_none());
    assert!(requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_final_output_defaults_to_body_text() {
    let transport = MockTransport::new()
        .respond_with(ok_response("https://example.com/a", "first"))
        .respond_with(ok_response("https://example.com/b", "second"));
    let walker = Walker::with_transport(transport);

    let config = WalkConfig::new()
        .step(StepConfig::new("https://example.com/a"))
        .step(StepConfig::new("https://example.com/b"));

    let output = walker.walk(&config).await.unwrap();
    assert_eq!(output, Some(Value::String("second".to_string())));
}

#[tokio::test]
async fn test_cookie_carries_from_step_one_to_step_two() {
    init_tracing();
    let transport = MockTransport::new()
        .respond_with(response_with_cookies(
            "https://example.com/login",
            "ok",
            &["session=abc; Path=/"],
        ))
        .respond_with(ok_response("https://example.com/account", "account page"));
    let requests = transport.requests();
    let walker = Walker::with_transport(transport);

    let config = WalkConfig::new()
        .step(StepConfig::new("https://example.com/login"))
        .step(StepConfig::new("https://example.com/account"));

    walker.walk(&config).await.unwrap();

    let requests = requests.lock().unwrap();
    assert_eq!(requests.len(), 2);
    assert!(!requests[0].headers.contains_key("cookie"));
    assert_eq!(requests[1].headers["cookie"], "session=abc");
}

#[tokio::test]
async fn test_redirect_final_url_scopes_absorbed_cookies() {
    init_tracing();
    // Step 1 redirects cross-host; its cookie belongs to the final host.
    let transport = MockTransport::new()
        .respond_with(response_with_cookies(
            "https://sso.example.net/callback",
            "ok",
            &["token=xyz"],
        ))
        .respond_with(ok_response("https://sso.example.net/profile", "profile"))
        .respond_with(ok_response("https://example.com/", "home"));
    let requests = transport.requests();
    let walker = Walker::with_transport(transport);

    let config = WalkConfig::new()
        .step(StepConfig::new("https://example.com/start"))
        .step(StepConfig::new("https://sso.example.net/profile"))
        .step(StepConfig::new("https://example.com/"));

    walker.walk(&config).await.unwrap();

    let requests = requests.lock().unwrap();
    assert_eq!(requests[1].headers["cookie"], "token=xyz");
    assert!(!requests[2].headers.contains_key("cookie"));
}

struct LoginPrepare;

#[async_trait]
impl PrepareHook for LoginPrepare {
    async fn prepare(
        &self,
        last: Option<&StepResponse>,
        history: &[StepResponse],
    ) -> anyhow::Result<StepRequest> {
        assert_eq!(history.len(), 1);
        let last = last.expect("second step sees the first response");
        let token = last.cookies["csrf"].clone();
        Ok(StepRequest::new().header("x-csrf-token", token))
    }
}

#[tokio::test]
async fn test_prepare_hook_reads_prior_response() {
    let transport = MockTransport::new()
        .respond_with(response_with_cookies(
            "https://example.com/form",
            "form",
            &["csrf=tok123"],
        ))
        .respond_with(ok_response("https://example.com/submit", "done"));
    let requests = transport.requests();
    let walker = Walker::with_transport(transport);

    let config = WalkConfig::new()
        .step(StepConfig::new("https://example.com/form"))
        .step(StepConfig::new("https://example.com/submit").prepare(LoginPrepare));

    walker.walk(&config).await.unwrap();

    let requests = requests.lock().unwrap();
    assert_eq!(requests[1].headers["x-csrf-token"], "tok123");
    assert_eq!(requests[1].headers["cookie"], "csrf=tok123");
}

#[tokio::test]
async fn test_prepare_hook_url_override_wins() {
    let transport =
        MockTransport::new().respond_with(ok_response("https://alt.example/x", "alt body"));
    let requests = transport.requests();
    let walker = Walker::with_transport(transport);

    let config = WalkConfig::new().step(
        StepConfig::new("https://example.com/static").prepare(FnPrepare::new(|_, _| {
            async { Ok(StepRequest::new().url("https://alt.example/x")) }.boxed()
        })),
    );

    walker.walk(&config).await.unwrap();

    let requests = requests.lock().unwrap();
    assert_eq!(requests[0].url.as_str(), "https://alt.example/x");
}

#[tokio::test]
async fn test_process_hook_output_is_walk_result() {
    let transport = MockTransport::new()
        .respond_with(ok_response("https://example.com/data", r#"{"id": 7}"#));
    let walker = Walker::with_transport(transport);

    let config = WalkConfig::new().step(
        StepConfig::new("https://example.com/data").process(FnProcess::new(|response, _| {
            async move {
                let parsed: Value = serde_json::from_str(&response.text)?;
                Ok(json!({ "status": response.status, "id": parsed["id"] }))
            }
            .boxed()
        })),
    );

    let output = walker.walk(&config).await.unwrap();
    assert_eq!(output, Some(json!({ "status": 200, "id": 7 })));
}

#[tokio::test]
async fn test_error_status_is_data_not_error() {
    let mut unavailable = ok_response("https://example.com/flaky", "try later");
    unavailable.status = 503;
    let transport = MockTransport::new().respond_with(unavailable);
    let walker = Walker::with_transport(transport);

    let config = WalkConfig::new().step(
        StepConfig::new("https://example.com/flaky").process(FnProcess::new(|response, _| {
            async move { Ok(Value::from(response.status)) }.boxed()
        })),
    );

    let output = walker.walk(&config).await.unwrap();
    assert_eq!(output, Some(Value::from(503)));
}

#[tokio::test]
async fn test_prepare_error_aborts_before_exchange() {
    init_tracing();
    let transport = MockTransport::new()
        .respond_with(ok_response("https://example.com/a", "ok"))
        .respond_with(ok_response("https://example.com/b", "never sent"));
    let requests = transport.requests();
    let walker = Walker::with_transport(transport);

    let config = WalkConfig::new()
        .step(StepConfig::new("https://example.com/a"))
        .step(
            StepConfig::new("https://example.com/b").prepare(FnPrepare::new(|_, _| {
                async { anyhow::bail!("missing credentials") }.boxed()
            })),
        );

    let err = walker.walk(&config).await.unwrap_err();
    assert!(matches!(err, WalkError::PrepareHook { step: 1, .. }));
    // Only the first step's exchange happened.
    assert_eq!(requests.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_process_error_aborts_remaining_steps() {
    let transport = MockTransport::new()
        .respond_with(ok_response("https://example.com/a", "ok"))
        .respond_with(ok_response("https://example.com/b", "unreached"));
    let requests = transport.requests();
    let walker = Walker::with_transport(transport);

    let config = WalkConfig::new()
        .step(
            StepConfig::new("https://example.com/a").process(FnProcess::new(|_, _| {
                async { anyhow::bail!("unexpected payload") }.boxed()
            })),
        )
        .step(StepConfig::new("https://example.com/b"));

    let err = walker.walk(&config).await.unwrap_err();
    assert!(matches!(err, WalkError::ProcessHook { step: 0, .. }));
    assert_eq!(requests.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_transport_error_propagates() {
    init_tracing();
    // Scripted responses exhausted after the first step.
    let transport = MockTransport::new().respond_with(ok_response("https://example.com/a", "ok"));
    let walker = Walker::with_transport(transport);

    let config = WalkConfig::new()
        .step(StepConfig::new("https://example.com/a"))
        .step(StepConfig::new("https://example.com/b"));

    let err = walker.walk(&config).await.unwrap_err();
    assert!(matches!(err, WalkError::Transport { step: 1, .. }));
}

#[tokio::test]
async fn test_invalid_static_url_rejected() {
    let transport = MockTransport::new();
    let walker = Walker::with_transport(transport);

    let config = WalkConfig::new().step(StepConfig::new("not a url"));

    let err = walker.walk(&config).await.unwrap_err();
    assert!(matches!(err, WalkError::InvalidUrl { .. }));
}

#[tokio::test]
async fn test_form_data_becomes_urlencoded_post() {
    let transport = MockTransport::new().respond_with(ok_response("https://example.com/login", "ok"));
    let requests = transport.requests();
    let walker = Walker::with_transport(transport);

    let config = WalkConfig::new().step(
        StepConfig::new("https://example.com/login").request(
            StepRequest::new()
                .form_field("user", "alice smith")
                .form_field("password", "p"),
        ),
    );

    walker.walk(&config).await.unwrap();

    let requests = requests.lock().unwrap();
    assert_eq!(requests[0].method, "POST");
    assert_eq!(
        requests[0].body.as_deref(),
        Some("password=p&user=alice%20smith")
    );
    assert_eq!(
        requests[0].headers["content-type"],
        "application/x-www-form-urlencoded"
    );
}

#[tokio::test]
async fn test_session_and_step_headers_merge_onto_wire() {
    let transport = MockTransport::new().respond_with(ok_response("https://example.com/", "ok"));
    let requests = transport.requests();
    let walker = Walker::with_transport(transport);

    let config = WalkConfig::new()
        .header("X-Env", "staging")
        .header("Accept", "application/json")
        .step(
            StepConfig::new("https://example.com/")
                .request(StepRequest::new().header("x-env", "step-wins")),
        );

    walker.walk(&config).await.unwrap();

    let requests = requests.lock().unwrap();
    assert_eq!(requests[0].headers["x-env"], "step-wins");
    assert_eq!(requests[0].headers["accept"], "application/json");
    assert!(requests[0].headers["user-agent"].starts_with("webwalk/"));
}

#[tokio::test]
async fn test_session_cookies_appended_after_jar_cookies() {
    let transport = MockTransport::new()
        .respond_with(response_with_cookies(
            "https://example.com/a",
            "ok",
            &["session=abc"],
        ))
        .respond_with(ok_response("https://example.com/b", "ok"));
    let requests = transport.requests();
    let walker = Walker::with_transport(transport);

    let config = WalkConfig::new()
        .cookie("forced", "1")
        .step(StepConfig::new("https://example.com/a"))
        .step(StepConfig::new("https://example.com/b"));

    walker.walk(&config).await.unwrap();

    let requests = requests.lock().unwrap();
    assert_eq!(requests[0].headers["cookie"], "forced=1");
    assert_eq!(requests[1].headers["cookie"], "session=abc;forced=1");
}

#[tokio::test]
async fn test_walk_with_preseeded_jar() {
    let transport = MockTransport::new().respond_with(ok_response("https://example.com/", "ok"));
    let requests = transport.requests();
    let walker = Walker::with_transport(transport);

    let mut jar = MemoryCookieJar::new();
    jar.absorb("seeded=1", &url::Url::parse("https://example.com/").unwrap());

    let config = WalkConfig::new().step(StepConfig::new("https://example.com/"));
    walker.walk_with_jar(&config, Box::new(jar)).await.unwrap();

    let requests = requests.lock().unwrap();
    assert_eq!(requests[0].headers["cookie"], "seeded=1");
}

#[tokio::test]
async fn test_hook_output_attached_to_history() {
    struct HistoryCheck;

    #[async_trait]
    impl PrepareHook for HistoryCheck {
        async fn prepare(
            &self,
            last: Option<&StepResponse>,
            _history: &[StepResponse],
        ) -> anyhow::Result<StepRequest> {
            // The committed response carries the previous step's output.
            assert_eq!(last.unwrap().output, Some(Value::String("first".to_string())));
            Ok(StepRequest::new())
        }
    }

    let transport = MockTransport::new()
        .respond_with(ok_response("https://example.com/a", "first"))
        .respond_with(ok_response("https://example.com/b", "second"));
    let walker = Walker::with_transport(transport);

    let config = WalkConfig::new()
        .step(StepConfig::new("https://example.com/a"))
        .step(StepConfig::new("https://example.com/b").prepare(HistoryCheck));

    walker.walk(&config).await.unwrap();
}
