//! Example: Poll an existing mail.tm account for a code.
//!
//! Skips provisioning and authenticates straight away, then stops at the first
//! message that yields a code.
//!
//! # Usage
//!
//! ```bash
//! export MAILTM_ADDRESS="user123456@example.com"
//! export MAILTM_PASSWORD="your-password"
//! cargo run --example existing_account
//! ```

use mailtm_otp::{authenticate, InboxPoller, MailTmClient, MailTmConfig, PollEvent};
use std::env;
use std::time::Duration;

#[tokio::main]
async fn main() -> mailtm_otp::Result<()> {
    let address = env::var("MAILTM_ADDRESS").expect("MAILTM_ADDRESS environment variable required");
    let password =
        env::var("MAILTM_PASSWORD").expect("MAILTM_PASSWORD environment variable required");

    let config = MailTmConfig::builder()
        .address(&address)
        .password(password)
        .poll_interval(Duration::from_secs(5))
        .max_polls(12)
        .build()?;

    let client = MailTmClient::new(&config)?;
    let credentials = config.credentials.as_ref().expect("credentials configured");

    println!("Authenticating {address}...");
    let session = authenticate(&client, credentials).await?;

    // Completing the shutdown future ends the run after the first code
    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let mut stop_tx = Some(stop_tx);
    let mut found: Option<String> = None;

    let mut poller = InboxPoller::new(&client, &session, config.polling.clone());

    let summary = poller
        .run_until(
            async {
                let _ = stop_rx.await;
            },
            |event| {
                if let PollEvent::Message(report) = event {
                    if found.is_none() {
                        found = report.code().map(str::to_string);
                        if found.is_some() {
                            if let Some(stop) = stop_tx.take() {
                                let _ = stop.send(());
                            }
                        }
                    }
                }
            },
        )
        .await?;

    match found {
        Some(code) => println!("Found code: {code}"),
        None => println!("No code after {} polls", summary.polls),
    }

    Ok(())
}
