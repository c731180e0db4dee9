//! Example: Using tracing for observability.
//!
//! This example demonstrates how to enable structured logging using
//! the `tracing` ecosystem. Provisioning, authentication and every API
//! call emit tracing spans and events.
//!
//! # Usage
//!
//! ```bash
//! # Set log level (trace, debug, info, warn, error)
//! export RUST_LOG=mailtm_otp=debug
//!
//! cargo run --example with_tracing
//! ```

use mailtm_otp::{authenticate, provision, InboxPoller, MailTmClient, MailTmConfig, PollEvent};
use std::time::Duration;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> mailtm_otp::Result<()> {
    // Use RUST_LOG environment variable to control log levels
    // Example: RUST_LOG=mailtm_otp=debug,info
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mailtm_otp=info")),
        )
        .with_span_events(FmtSpan::ENTER | FmtSpan::EXIT)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    tracing::info!("Starting mailtm-otp example");

    let config = MailTmConfig::builder()
        .poll_interval(Duration::from_secs(5))
        .max_polls(6)
        .build()?;

    tracing::debug!("Configuration built successfully");

    let client = MailTmClient::new(&config)?;

    // Emits spans for the domain listing and account creation
    let provisioned = provision(&client, &config).await?;

    // Emits a span for the token exchange
    let session = authenticate(&client, &provisioned.credentials).await?;
    tracing::info!(address = %session.address(), "Inbox ready");

    let mut poller = InboxPoller::new(&client, &session, config.polling.clone());

    // Emits the poll loop span plus one span per message fetch
    let summary = poller
        .run(|event| {
            if let PollEvent::Message(report) = event {
                match report.code() {
                    Some(code) => tracing::info!(code = %code, "Found code"),
                    None => {
                        let id = report.summary.id().unwrap_or_default();
                        tracing::info!(id = %id, "Message without code");
                    }
                }
            }
        })
        .await?;

    tracing::info!(
        polls = summary.polls,
        codes_found = summary.codes_found,
        "Example completed successfully"
    );

    Ok(())
}
