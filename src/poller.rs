//! Fixed-interval inbox polling.
//!
//! The [`InboxPoller`] runs a fixed number of polls. Each poll lists the inbox
//! and walks it in list order: a message whose id has not been seen during this
//! run is marked seen, announced, fetched in full and scanned for a code.
//! Results are handed to a callback as [`PollEvent`]s so the caller decides how
//! to present them.
//!
//! # Example
//!
//! ```no_run
//! use mailtm_otp::{session, InboxPoller, MailTmClient, MailTmConfig, PollEvent};
//!
//! # async fn example() -> mailtm_otp::Result<()> {
//! let config = MailTmConfig::builder()
//!     .address("me@example.com")
//!     .password("secret")
//!     .build()?;
//! let client = MailTmClient::new(&config)?;
//! let credentials = config.credentials.clone().expect("configured");
//! let session = session::authenticate(&client, &credentials).await?;
//!
//! let mut poller = InboxPoller::new(&client, &session, config.polling.clone());
//! let summary = poller
//!     .run(|event| {
//!         if let PollEvent::Message(report) = event {
//!             println!("{report}");
//!         }
//!     })
//!     .await?;
//! println!("{} codes found", summary.codes_found);
//! # Ok(())
//! # }
//! ```

use crate::client::MailTmClient;
use crate::config::PollingConfig;
use crate::error::Result;
use crate::matcher::CODE_DESCRIPTION;
use crate::models::MessageSummary;
use crate::report::MessageReport;
use crate::session::Session;
use std::collections::HashSet;
use std::future::Future;
use tracing::{debug, info, instrument};

/// Poller lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    /// Not started.
    Idle,
    /// Running poll number `poll` (1-based).
    Polling {
        /// Current poll number.
        poll: u32,
    },
    /// Iteration budget used up, interrupted, or failed.
    Done,
}

/// Message ids already reported during one run.
///
/// Only grows; created fresh by each [`InboxPoller::run`].
#[derive(Debug, Default)]
pub struct SeenIds {
    ids: HashSet<String>,
}

impl SeenIds {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if `id` was already seen.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Number of ids seen.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns `true` if nothing has been seen.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Marks `id` as seen.
    ///
    /// Returns `true` if the id is new. Empty ids are never recorded.
    pub fn mark(&mut self, id: &str) -> bool {
        !id.is_empty() && self.ids.insert(id.to_string())
    }
}

/// Something the caller should present.
#[derive(Debug, Clone)]
pub enum PollEvent {
    /// The inbox was empty on this poll.
    NoMessages {
        /// Current poll number.
        poll: u32,
        /// Total number of polls.
        max_polls: u32,
    },
    /// A message not seen before, announced before its body is fetched.
    NewMessage(MessageSummary),
    /// The body of a new message was fetched and scanned.
    Message(MessageReport),
    /// All new messages of a poll have been reported.
    BatchEnd {
        /// Current poll number.
        poll: u32,
        /// Number of new messages in this poll.
        count: usize,
    },
}

/// Totals for a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollSummary {
    /// Polls completed.
    pub polls: u32,
    /// Messages reported.
    pub reported: usize,
    /// Reported messages that yielded a code.
    pub codes_found: usize,
    /// `true` if the run was cut short by the shutdown signal.
    pub interrupted: bool,
}

/// Result of a single poll.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollStep {
    /// Messages in the list response.
    pub listed: usize,
    /// New messages reported.
    pub reported: usize,
    /// New messages that yielded a code.
    pub codes_found: usize,
}

/// Polls an inbox a fixed number of times.
pub struct InboxPoller<'a> {
    client: &'a MailTmClient,
    session: &'a Session,
    polling: PollingConfig,
    state: PollState,
}

impl<'a> InboxPoller<'a> {
    /// Creates an idle poller.
    #[must_use]
    pub fn new(client: &'a MailTmClient, session: &'a Session, polling: PollingConfig) -> Self {
        Self {
            client,
            session,
            polling,
            state: PollState::Idle,
        }
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> PollState {
        self.state
    }

    /// Runs every poll of the budget.
    ///
    /// # Errors
    ///
    /// Returns the first API error; the poller is `Done` afterwards.
    pub async fn run<F>(&mut self, on_event: F) -> Result<PollSummary>
    where
        F: FnMut(PollEvent),
    {
        self.run_until(std::future::pending::<()>(), on_event).await
    }

    /// Runs every poll of the budget, stopping early when `shutdown` completes.
    ///
    /// Sleeps the configured interval between polls whether or not new messages
    /// arrived, and not after the last one.
    ///
    /// # Errors
    ///
    /// Returns the first API error; the poller is `Done` afterwards.
    #[instrument(
        name = "InboxPoller::run",
        skip_all,
        fields(
            address = %self.session.address(),
            max_polls = self.polling.max_polls,
            interval_secs = self.polling.interval.as_secs(),
            extracts = CODE_DESCRIPTION
        )
    )]
    pub async fn run_until<S, F>(&mut self, shutdown: S, mut on_event: F) -> Result<PollSummary>
    where
        S: Future<Output = ()>,
        F: FnMut(PollEvent),
    {
        tokio::pin!(shutdown);

        let max_polls = self.polling.max_polls;
        let mut seen = SeenIds::new();
        let mut summary = PollSummary::default();

        for poll in 1..=max_polls {
            self.state = PollState::Polling { poll };

            let step = tokio::select! {
                step = self.poll_once(&mut seen, poll, &mut on_event) => step,
                () = &mut shutdown => {
                    summary.interrupted = true;
                    break;
                }
            };

            let step = match step {
                Ok(step) => step,
                Err(e) => {
                    self.state = PollState::Done;
                    return Err(e);
                }
            };

            summary.polls = poll;
            summary.reported += step.reported;
            summary.codes_found += step.codes_found;

            if poll < max_polls {
                tokio::select! {
                    () = tokio::time::sleep(self.polling.interval) => {}
                    () = &mut shutdown => {
                        summary.interrupted = true;
                        break;
                    }
                }
            }
        }

        self.state = PollState::Done;
        info!(
            polls = summary.polls,
            reported = summary.reported,
            codes_found = summary.codes_found,
            interrupted = summary.interrupted,
            "Polling finished"
        );
        Ok(summary)
    }

    /// Performs one poll against `seen`.
    ///
    /// # Errors
    ///
    /// Returns an error if listing messages or fetching a body fails.
    pub async fn poll_once(
        &self,
        seen: &mut SeenIds,
        poll: u32,
        on_event: &mut dyn FnMut(PollEvent),
    ) -> Result<PollStep> {
        let token = self.session.token();
        let messages = self.client.messages(token).await?;
        let listed = messages.len();

        debug!(poll, listed, seen = seen.len(), "Polled inbox");

        if messages.is_empty() {
            on_event(PollEvent::NoMessages {
                poll,
                max_polls: self.polling.max_polls,
            });
            return Ok(PollStep::default());
        }

        let mut step = PollStep {
            listed,
            ..PollStep::default()
        };

        for summary in messages {
            let Some(id) = summary.id().map(str::to_string) else {
                debug!("Skipping message without id");
                continue;
            };
            if !seen.mark(&id) {
                continue;
            }

            info!(id = %id, from = %summary.from_address(), "New message");
            on_event(PollEvent::NewMessage(summary.clone()));

            let detail = self.client.message(token, &id).await?;
            let report = MessageReport::new(summary, &detail);

            step.reported += 1;
            if report.code().is_some() {
                step.codes_found += 1;
            }
            on_event(PollEvent::Message(report));
        }

        if step.reported > 0 {
            on_event(PollEvent::BatchEnd {
                poll,
                count: step.reported,
            });
        }

        Ok(step)
    }
}

impl std::fmt::Debug for InboxPoller<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InboxPoller")
            .field("address", &self.session.address())
            .field("polling", &self.polling)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
