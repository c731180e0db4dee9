//! Command-line poller: provisions a mail.tm inbox and prints codes as they arrive.
//!
//! # Usage
//!
//! ```bash
//! # Optional: reuse an account instead of creating one
//! export MAILTM_ADDRESS="user123456@example.com"
//! export MAILTM_PASSWORD="secret"
//! export MAILTM_DOMAIN="example.com"
//! export POLL_SECONDS=10
//! export MAX_POLLS=30
//! # Diagnostics go to stderr
//! export RUST_LOG=mailtm_otp=debug
//!
//! mailtm-otp
//! ```

use mailtm_otp::report::{batch_separator, mask_password};
use mailtm_otp::{
    authenticate, provision, AccountStatus, InboxPoller, MailTmClient, MailTmConfig, PollEvent,
};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> mailtm_otp::Result<()> {
    dotenvy::dotenv().ok();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mailtm_otp=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    let config = MailTmConfig::from_env()?;
    let client = MailTmClient::new(&config)?;

    if config.credentials.is_none() {
        println!("No MAILTM_ADDRESS / MAILTM_PASSWORD provided. Creating a new temp account...");
    }

    let provisioned = provision(&client, &config).await?;

    if provisioned.domain.fell_back {
        println!(
            "MAILTM_DOMAIN not available. Using a random available domain: {}",
            provisioned.domain.domain
        );
    }

    match &provisioned.status {
        AccountStatus::Supplied => {}
        AccountStatus::Created => println!("Account created."),
        AccountStatus::CreateFailed(e) => {
            println!("Account create failed: {e}");
            println!(
                "If you want to use an existing account, set MAILTM_ADDRESS and MAILTM_PASSWORD."
            );
        }
    }

    let credentials = &provisioned.credentials;
    println!("Email: {}", credentials.address());
    println!("Password: {}", mask_password(credentials.password()));

    println!("Getting token...");
    let session = authenticate(&client, credentials).await?;
    println!("Token received.");

    let polling = config.polling.clone();
    println!(
        "Polling inbox every {}s (max {} times)...",
        polling.interval.as_secs(),
        polling.max_polls
    );

    let mut poller = InboxPoller::new(&client, &session, polling);

    let shutdown = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    let summary = poller
        .run_until(shutdown, |event| match event {
            PollEvent::NoMessages { poll, max_polls } => {
                println!("No messages yet... ({poll}/{max_polls})");
            }
            PollEvent::NewMessage(summary) => println!("{summary}"),
            PollEvent::Message(report) => println!("{report}"),
            PollEvent::BatchEnd { .. } => {
                println!("{}\n", batch_separator());
            }
        })
        .await?;

    if summary.interrupted {
        println!("Interrupted.");
    }
    println!("Done polling.");
    println!(
        "Tip: keep this account for further use by saving MAILTM_ADDRESS and MAILTM_PASSWORD."
    );

    Ok(())
}
