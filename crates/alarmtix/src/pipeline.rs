//! 🎬 *[camera pans across a dimly lit ops room]*
//! 🎬 "One alarm. One ticket. One exit code."
//! 🎬 *[record scratch]* 🦆
//!
//! 📦 The Pipeline: reads the event, parses it, fetches credentials, files
//! the ticket, and boils everything that happened down to an [`Outcome`].
//!
//! ```text
//!   load bytes ──▶ parse ──▶ credentials ──▶ merge ──▶ dispatch
//!   └─ UnknownError  └──── ConfigError ────────┘       └─ UnknownError
//! ```
//!
//! Strictly one step at a time. Nothing runs in the background.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{error, info};

use crate::alias::AccountAliasResolver;
use crate::app_config::AppConfig;
use crate::backends::{IamAliasLookup, S3ObjectStore};
use crate::common::TicketInputs;
use crate::credentials::{CredentialResolver, parse_credentials};
use crate::http_session::HttpSessionClient;
use crate::parser::EventParser;
use crate::ticketing::{DispatchOutcome, TicketDispatcher};

/// 🚦 How the run ended. Maps 1:1 onto the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    ConfigError,
    UnknownError,
}

impl Outcome {
    pub fn exit_code(self) -> i32 {
        match self {
            Outcome::Success => 0,
            Outcome::ConfigError => -1,
            Outcome::UnknownError => -3,
        }
    }
}

#[derive(Debug)]
pub struct Pipeline {
    parser: EventParser,
    credentials: CredentialResolver,
    dispatcher: TicketDispatcher,
}

impl Pipeline {
    pub fn new(
        parser: EventParser,
        credentials: CredentialResolver,
        dispatcher: TicketDispatcher,
    ) -> Self {
        Self {
            parser,
            credentials,
            dispatcher,
        }
    }

    /// 🏗️ Wire the production collaborators: S3, IAM, and Jira over HTTP.
    pub async fn from_config(app_config: &AppConfig) -> Result<Self> {
        // 🚇 HTTP first: a bad proxy fails here, before any AWS client exists
        let the_http = HttpSessionClient::new(app_config)
            .context("💀 Could not build the HTTP client. Check proxy_host / proxy_port.")?;

        let the_parser = EventParser::new(AccountAliasResolver::new(Box::new(
            IamAliasLookup::new().await,
        )));
        let the_credentials = CredentialResolver::new(
            Box::new(S3ObjectStore::new().await),
            app_config.credentials_file_override.clone(),
        );
        let the_dispatcher = TicketDispatcher::new(the_http, app_config.ticket_base_url());

        Ok(Self::new(the_parser, the_credentials, the_dispatcher))
    }

    /// 🚀 Process one alarm event file, start to finish.
    pub async fn process_event(&self, event_path: &Path) -> Outcome {
        let the_event = match tokio::fs::read(event_path).await {
            Ok(bytes) => bytes,
            Err(err) => {
                error!(
                    event_path = %event_path.display(),
                    "💀 Error occurred reading the event file. cause: {}", err
                );
                return Outcome::UnknownError;
            }
        };

        let the_inputs = match self.gather_inputs(&the_event).await {
            Ok(inputs) => inputs,
            Err(err) => {
                error!(
                    event_path = %event_path.display(),
                    "💀 Error occurred trying to get configuration. cause: {:#}", err
                );
                return Outcome::ConfigError;
            }
        };

        match self.dispatcher.create_notification(&the_inputs).await {
            Ok(DispatchOutcome::Created { key }) | Ok(DispatchOutcome::Commented { key }) => {
                info!(event_path = %event_path.display(), "✅ Notification filed as {}", key);
                Outcome::Success
            }
            Err(err) => {
                error!(
                    event_path = %event_path.display(),
                    "💀 Error occurred trying to create notification. cause: {:#}",
                    anyhow::Error::from(err)
                );
                Outcome::UnknownError
            }
        }
    }

    /// 🧩 Parse the event and pair it with the credentials of its account.
    async fn gather_inputs(&self, raw_event: &[u8]) -> Result<TicketInputs> {
        let the_fields = self
            .parser
            .parse(raw_event)
            .await
            .context("💀 The alarm event could not be parsed")?;

        let the_raw_credentials = self
            .credentials
            .resolve(&the_fields.aws_account_id)
            .await
            .context("💀 The Jira credentials could not be fetched")?;
        let the_credentials = parse_credentials(&the_raw_credentials)
            .context("💀 The Jira credentials could not be parsed")?;

        Ok(TicketInputs::new(the_fields, the_credentials))
    }
}
