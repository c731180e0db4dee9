//! Domain selection and account provisioning.
//!
//! [`provision`] lists the available domains, picks one, and either uses the
//! configured credentials or generates fresh ones and asks the API to create
//! the account. A failed creation is not fatal: the token exchange that
//! follows is what decides whether the credentials work.

use crate::client::MailTmClient;
use crate::config::{Credentials, MailTmConfig};
use crate::error::{Error, Result};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{info, instrument, warn};

const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Outcome of choosing a domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainChoice {
    /// The chosen domain, always a member of the available list.
    pub domain: String,
    /// `true` when a desired domain was configured but not available.
    pub fell_back: bool,
}

/// What happened to the account during provisioning.
#[derive(Debug)]
pub enum AccountStatus {
    /// Credentials came from configuration; no creation was attempted.
    Supplied,
    /// A new account was created.
    Created,
    /// Creation was attempted and rejected; the credentials may still work.
    CreateFailed(Error),
}

/// Result of [`provision`].
#[derive(Debug)]
pub struct Provisioned {
    /// Credentials to authenticate with.
    pub credentials: Credentials,
    /// The domain choice made for this run.
    pub domain: DomainChoice,
    /// Account creation outcome.
    pub status: AccountStatus,
}

/// Picks a domain from `available`.
///
/// Uses `desired` when it is available, otherwise a random available domain.
/// Returns `None` only when `available` is empty.
pub fn choose_domain<R: Rng + ?Sized>(
    available: &[String],
    desired: Option<&str>,
    rng: &mut R,
) -> Option<DomainChoice> {
    if let Some(wanted) = desired {
        if available.iter().any(|d| d == wanted) {
            return Some(DomainChoice {
                domain: wanted.to_string(),
                fell_back: false,
            });
        }
    }

    available.choose(rng).map(|domain| DomainChoice {
        domain: domain.clone(),
        fell_back: desired.is_some(),
    })
}

/// Returns `n` random characters from `[a-z0-9]`.
pub fn random_string<R: Rng + ?Sized>(rng: &mut R, n: usize) -> String {
    (0..n)
        .map(|_| char::from(CHARSET[rng.gen_range(0..CHARSET.len())]))
        .collect()
}

/// Generates credentials `<prefix><6 chars>@<domain>` with a random password.
pub fn generate_credentials<R: Rng + ?Sized>(
    rng: &mut R,
    prefix: &str,
    domain: &str,
) -> Credentials {
    let username = format!("{prefix}{}", random_string(rng, 6));
    let password = format!("{}#@{}", random_string(rng, 10), random_string(rng, 4));
    Credentials::new(format!("{username}@{domain}"), password)
}

/// Chooses a domain and prepares an account for this run.
///
/// # Errors
///
/// Returns an error if the domain listing fails or yields no domains.
/// Account creation failures are reported through [`AccountStatus::CreateFailed`].
#[instrument(
    name = "provision::provision",
    skip_all,
    fields(desired_domain = ?config.domain)
)]
pub async fn provision(client: &MailTmClient, config: &MailTmConfig) -> Result<Provisioned> {
    let available = client.list_domains().await?;

    let domain = choose_domain(&available, config.domain.as_deref(), &mut rand::thread_rng())
        .ok_or(Error::NoDomains)?;

    if domain.fell_back {
        warn!(
            desired = ?config.domain,
            chosen = %domain.domain,
            "Desired domain not available, using a random one"
        );
    }

    if let Some(credentials) = &config.credentials {
        info!(address = %credentials.address(), "Using configured account");
        return Ok(Provisioned {
            credentials: credentials.clone(),
            domain,
            status: AccountStatus::Supplied,
        });
    }

    let credentials =
        generate_credentials(&mut rand::thread_rng(), &config.username_prefix, &domain.domain);

    let status = match client.create_account(&credentials).await {
        Ok(account) => {
            info!(
                address = %credentials.address(),
                id = account.id.as_deref().unwrap_or_default(),
                "Account created"
            );
            AccountStatus::Created
        }
        Err(e) => {
            warn!(
                address = %credentials.address(),
                error = %e,
                "Account creation failed, continuing"
            );
            AccountStatus::CreateFailed(e)
        }
    };

    Ok(Provisioned {
        credentials,
        domain,
        status,
    })
}
