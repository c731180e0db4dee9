//! Integration tests for mailtm-otp.
//!
//! Most tests run against a local `wiremock` server. The live test hits the
//! real mail.tm API and is disabled by default:
//!
//! ```bash
//! cargo test -- --ignored
//! ```

use mailtm_otp::{
    authenticate, provision, AccountStatus, Credentials, Error, ErrorCategory, InboxPoller,
    MailTmClient, MailTmConfig, PollEvent, PollState,
};
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ─────────────────────────────────────────────────────────────────────────────
// Test Configuration Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn hydra(members: Value) -> Value {
    let total = members.as_array().map_or(0, Vec::len);
    json!({ "hydra:member": members, "hydra:totalItems": total })
}

fn config_for(server: &MockServer) -> mailtm_otp::MailTmConfigBuilder {
    MailTmConfig::builder()
        .base_url(server.uri())
        .poll_interval(Duration::ZERO)
}

async fn mount_domains(server: &MockServer, domains: &[&str]) {
    let members: Vec<Value> = domains
        .iter()
        .map(|d| json!({ "id": d, "domain": d, "isActive": true }))
        .collect();

    Mock::given(method("GET"))
        .and(path("/domains"))
        .respond_with(ResponseTemplate::new(200).set_body_json(hydra(Value::Array(members))))
        .mount(server)
        .await;
}

async fn mount_token(server: &MockServer, token: &str) {
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "token": token, "id": "acc-1" })),
        )
        .mount(server)
        .await;
}

// ─────────────────────────────────────────────────────────────────────────────
// Provisioning
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_provision_creates_account_on_listed_domain() {
    let server = MockServer::start().await;
    mount_domains(&server, &["mock.test"]).await;

    Mock::given(method("POST"))
        .and(path("/accounts"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "acc-1",
            "address": "signupabc123@mock.test",
            "createdAt": "2024-05-01T10:00:00+00:00"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server).username_prefix("signup").build().unwrap();
    let client = MailTmClient::new(&config).unwrap();

    let provisioned = provision(&client, &config).await.unwrap();

    assert!(matches!(provisioned.status, AccountStatus::Created));
    assert_eq!(provisioned.domain.domain, "mock.test");
    assert!(!provisioned.domain.fell_back);
    assert!(provisioned.credentials.address().starts_with("signup"));
    assert!(provisioned.credentials.address().ends_with("@mock.test"));
}

#[tokio::test]
async fn test_provision_created_with_unexpected_body() {
    let server = MockServer::start().await;
    mount_domains(&server, &["mock.test"]).await;

    Mock::given(method("POST"))
        .and(path("/accounts"))
        .respond_with(ResponseTemplate::new(201).set_body_string("created"))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server).build().unwrap();
    let client = MailTmClient::new(&config).unwrap();

    let provisioned = provision(&client, &config).await.unwrap();
    assert!(matches!(provisioned.status, AccountStatus::Created));
}

#[tokio::test]
async fn test_provision_swallows_create_failure() {
    let server = MockServer::start().await;
    mount_domains(&server, &["mock.test"]).await;

    Mock::given(method("POST"))
        .and(path("/accounts"))
        .respond_with(ResponseTemplate::new(422).set_body_string("address already used"))
        .mount(&server)
        .await;

    let config = config_for(&server).build().unwrap();
    let client = MailTmClient::new(&config).unwrap();

    let provisioned = provision(&client, &config).await.unwrap();

    match provisioned.status {
        AccountStatus::CreateFailed(err) => {
            assert_eq!(err.category(), ErrorCategory::Api);
            assert_eq!(err.status().map(|s| s.as_u16()), Some(422));
        }
        other => panic!("expected CreateFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_provision_falls_back_when_domain_missing() {
    let server = MockServer::start().await;
    mount_domains(&server, &["a.test", "b.test"]).await;

    let config = config_for(&server)
        .domain("wanted.test")
        .address("me@wanted.test")
        .password("pw")
        .build()
        .unwrap();
    let client = MailTmClient::new(&config).unwrap();

    let provisioned = provision(&client, &config).await.unwrap();

    assert!(matches!(provisioned.status, AccountStatus::Supplied));
    assert!(provisioned.domain.fell_back);
    assert!(["a.test", "b.test"].contains(&provisioned.domain.domain.as_str()));
    // Supplied credentials are used as-is
    assert_eq!(provisioned.credentials.address(), "me@wanted.test");
}

#[tokio::test]
async fn test_provision_fails_without_domains() {
    let server = MockServer::start().await;
    mount_domains(&server, &[]).await;

    let config = config_for(&server).build().unwrap();
    let client = MailTmClient::new(&config).unwrap();

    let err = provision(&client, &config).await.unwrap_err();
    assert!(matches!(err, Error::NoDomains));
    assert_eq!(err.category(), ErrorCategory::NotFound);
}

#[tokio::test]
async fn test_domain_listing_server_error_is_retryable() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/domains"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let config = config_for(&server).build().unwrap();
    let client = MailTmClient::new(&config).unwrap();

    let err = client.list_domains().await.unwrap_err();
    assert!(err.is_retryable());
}

// ─────────────────────────────────────────────────────────────────────────────
// Authentication
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_authenticate_returns_session() {
    let server = MockServer::start().await;
    mount_token(&server, "tok-123").await;

    let config = config_for(&server).build().unwrap();
    let client = MailTmClient::new(&config).unwrap();
    let credentials = Credentials::new("me@mock.test", "pw");

    let session = authenticate(&client, &credentials).await.unwrap();
    assert_eq!(session.address(), "me@mock.test");
    assert!(!format!("{session:?}").contains("tok-123"));
}

#[tokio::test]
async fn test_authenticate_without_token_fails() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "acc-1" })))
        .mount(&server)
        .await;

    let config = config_for(&server).build().unwrap();
    let client = MailTmClient::new(&config).unwrap();
    let credentials = Credentials::new("me@mock.test", "pw");

    let err = authenticate(&client, &credentials).await.unwrap_err();
    assert!(matches!(err, Error::MissingToken));
}

#[tokio::test]
async fn test_authenticate_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "Invalid" })))
        .mount(&server)
        .await;

    let config = config_for(&server).build().unwrap();
    let client = MailTmClient::new(&config).unwrap();
    let credentials = Credentials::new("me@mock.test", "wrong");

    let err = authenticate(&client, &credentials).await.unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Api);
    assert!(!err.is_retryable());
}

// ─────────────────────────────────────────────────────────────────────────────
// Polling
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_poll_reports_each_message_once() {
    let server = MockServer::start().await;
    mount_token(&server, "tok-123").await;

    Mock::given(method("GET"))
        .and(path("/messages"))
        .and(header("authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(hydra(json!([{
            "id": "m1",
            "from": { "address": "noreply@service.io", "name": "Service" },
            "subject": "Verify your email",
            "intro": "Your code is 482913",
            "createdAt": "2024-05-01T10:00:00+00:00"
        }]))))
        .expect(3)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/messages/m1"))
        .and(header("authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "m1",
            "text": "Your code is 482913, expires soon",
            "html": ["<p>Your code is <b>482913</b></p>"]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server).max_polls(3).build().unwrap();
    let client = MailTmClient::new(&config).unwrap();
    let session = authenticate(&client, &Credentials::new("me@mock.test", "pw"))
        .await
        .unwrap();

    let mut poller = InboxPoller::new(&client, &session, config.polling.clone());
    assert_eq!(poller.state(), PollState::Idle);

    let mut announced = Vec::new();
    let mut codes = Vec::new();
    let mut batches = 0;
    let summary = poller
        .run(|event| match event {
            PollEvent::NewMessage(summary) => {
                announced.push(summary.id().map(str::to_string));
            }
            PollEvent::Message(report) => {
                assert!(report.has_html);
                codes.extend(report.code().map(str::to_string));
            }
            PollEvent::BatchEnd { count, .. } => {
                assert_eq!(count, 1);
                batches += 1;
            }
            PollEvent::NoMessages { .. } => panic!("inbox is not empty"),
        })
        .await
        .unwrap();

    assert_eq!(announced, [Some("m1".to_string())]);
    assert_eq!(codes, ["482913"]);
    assert_eq!(batches, 1);
    assert_eq!(summary.polls, 3);
    assert_eq!(summary.reported, 1);
    assert_eq!(summary.codes_found, 1);
    assert!(!summary.interrupted);
    assert_eq!(poller.state(), PollState::Done);
}

#[tokio::test]
async fn test_poll_empty_inbox_counts_polls() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(hydra(json!([]))))
        .expect(2)
        .mount(&server)
        .await;

    let config = config_for(&server).max_polls(2).build().unwrap();
    let client = MailTmClient::new(&config).unwrap();
    let session = mailtm_otp::Session::new("me@mock.test", "tok".to_string().into());

    let mut poller = InboxPoller::new(&client, &session, config.polling.clone());

    let mut empty_polls = Vec::new();
    let summary = poller
        .run(|event| {
            if let PollEvent::NoMessages { poll, max_polls } = event {
                empty_polls.push((poll, max_polls));
            }
        })
        .await
        .unwrap();

    assert_eq!(empty_polls, [(1, 2), (2, 2)]);
    assert_eq!(summary.reported, 0);
}

#[tokio::test]
async fn test_poll_message_without_code_shows_excerpt() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(hydra(json!([{
            "id": "m2",
            "subject": "Welcome",
            "intro": "Thanks for signing up"
        }]))))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/messages/m2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "m2",
            "text": "Thanks for signing up, no code today.",
            "html": null
        })))
        .mount(&server)
        .await;

    let config = config_for(&server).max_polls(1).build().unwrap();
    let client = MailTmClient::new(&config).unwrap();
    let session = mailtm_otp::Session::new("me@mock.test", "tok".to_string().into());

    let mut poller = InboxPoller::new(&client, &session, config.polling.clone());

    let mut rendered = String::new();
    poller
        .run(|event| match event {
            PollEvent::NewMessage(summary) => rendered.push_str(&summary.to_string()),
            PollEvent::Message(report) => {
                assert!(report.code().is_none());
                assert!(!report.has_html);
                rendered.push_str(&report.to_string());
            }
            _ => {}
        })
        .await
        .unwrap();

    assert!(rendered.contains("From: (unknown)"));
    assert!(rendered.contains("Subject: Welcome"));
    assert!(rendered.contains("No code detected"));
    assert!(rendered.contains("Thanks for signing up, no code today."));
}

#[tokio::test]
async fn test_poll_skips_entries_without_id() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(hydra(json!([
            { "id": null, "subject": "ghost" },
            { "subject": "no id at all" },
            { "id": "m1", "subject": "real", "intro": "PIN 5566" }
        ]))))
        .mount(&server)
        .await;

    // Detail without an id field
    Mock::given(method("GET"))
        .and(path("/messages/m1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "text": "PIN 5566" })))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server).max_polls(2).build().unwrap();
    let client = MailTmClient::new(&config).unwrap();
    let session = mailtm_otp::Session::new("me@mock.test", "tok".to_string().into());

    let mut poller = InboxPoller::new(&client, &session, config.polling.clone());

    let mut subjects = Vec::new();
    let summary = poller
        .run(|event| {
            if let PollEvent::Message(report) = event {
                subjects.push(report.summary.subject().to_string());
                assert_eq!(report.code(), Some("5566"));
            }
        })
        .await
        .unwrap();

    assert_eq!(subjects, ["real"]);
    assert_eq!(summary.reported, 1);
    assert_eq!(summary.polls, 2);
}

#[tokio::test]
async fn test_poll_announces_message_before_detail_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(hydra(json!([{
            "id": "m9",
            "from": { "address": "noreply@service.io" },
            "subject": "Your login code"
        }]))))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/messages/m9"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server).max_polls(3).build().unwrap();
    let client = MailTmClient::new(&config).unwrap();
    let session = mailtm_otp::Session::new("me@mock.test", "tok".to_string().into());

    let mut poller = InboxPoller::new(&client, &session, config.polling.clone());

    let mut announced = Vec::new();
    let mut reports = 0;
    let err = poller
        .run(|event| match event {
            PollEvent::NewMessage(summary) => announced.push(summary.subject().to_string()),
            PollEvent::Message(_) => reports += 1,
            _ => {}
        })
        .await
        .unwrap_err();

    assert_eq!(announced, ["Your login code"]);
    assert_eq!(reports, 0);
    assert_eq!(err.status().map(|s| s.as_u16()), Some(500));
    assert_eq!(poller.state(), PollState::Done);
}

#[tokio::test]
async fn test_poll_stops_on_list_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/messages"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let config = config_for(&server).max_polls(5).build().unwrap();
    let client = MailTmClient::new(&config).unwrap();
    let session = mailtm_otp::Session::new("me@mock.test", "expired".to_string().into());

    let mut poller = InboxPoller::new(&client, &session, config.polling.clone());

    let err = poller.run(|_| {}).await.unwrap_err();
    assert_eq!(err.status().map(|s| s.as_u16()), Some(401));
    assert_eq!(poller.state(), PollState::Done);
}

#[tokio::test]
async fn test_poll_interrupted_by_shutdown() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(hydra(json!([]))))
        .mount(&server)
        .await;

    let config = config_for(&server)
        .poll_interval(Duration::from_secs(3600))
        .max_polls(10)
        .build()
        .unwrap();
    let client = MailTmClient::new(&config).unwrap();
    let session = mailtm_otp::Session::new("me@mock.test", "tok".to_string().into());

    let mut poller = InboxPoller::new(&client, &session, config.polling.clone());

    let shutdown = tokio::time::sleep(Duration::from_millis(200));
    let summary = poller.run_until(shutdown, |_| {}).await.unwrap();

    assert!(summary.interrupted);
    assert_eq!(summary.polls, 1);
    assert_eq!(poller.state(), PollState::Done);
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_invalid_email_format() {
    let result = MailTmConfig::builder()
        .address("not-an-email")
        .password("password")
        .build();

    assert!(matches!(result, Err(Error::InvalidEmailFormat { .. })));
}

#[test]
fn test_partial_credentials_are_ignored() {
    let config = MailTmConfig::builder()
        .address("test@example.com")
        .build()
        .unwrap();
    assert!(config.credentials.is_none());
}

// ─────────────────────────────────────────────────────────────────────────────
// Live API
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
#[ignore = "requires network access to api.mail.tm"]
async fn test_live_provision_and_poll_once() {
    dotenvy::dotenv().ok();

    let config = MailTmConfig::builder().max_polls(1).build().unwrap();
    let client = MailTmClient::new(&config).unwrap();

    let provisioned = provision(&client, &config).await.unwrap();
    println!("Provisioned: {}", provisioned.credentials.address());

    let session = authenticate(&client, &provisioned.credentials)
        .await
        .unwrap();

    let mut poller = InboxPoller::new(&client, &session, config.polling.clone());
    let summary = poller.run(|_| {}).await.unwrap();

    assert_eq!(summary.polls, 1);
}
