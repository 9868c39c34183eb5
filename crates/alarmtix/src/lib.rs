//! 🚨 alarmtix: CloudWatch alarms in, Jira tickets out.
//!
//! One SNS alarm envelope per run. Parse it, fetch the account's Jira
//! credentials, file (or re-raise) the ticket, report an exit code.

pub mod alias;
pub mod app_config;
pub mod backends;
pub mod common;
pub mod credentials;
pub mod http_session;
pub mod parser;
pub mod pipeline;
pub mod ticketing;

#[cfg(test)]
mod test_fixtures;

use std::path::Path;

use tracing::error;

use crate::app_config::AppConfig;
pub use crate::pipeline::{Outcome, Pipeline};

/// 🚀 Build the production pipeline from `app_config` and process one event.
///
/// A pipeline that cannot even be built is a configuration problem.
pub async fn run(app_config: &AppConfig, event_path: &Path) -> Outcome {
    match Pipeline::from_config(app_config).await {
        Ok(pipeline) => pipeline.process_event(event_path).await,
        Err(err) => {
            error!(
                event_path = %event_path.display(),
                "💀 Error occurred trying to get configuration. cause: {:#}", err
            );
            Outcome::ConfigError
        }
    }
}
