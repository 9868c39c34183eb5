//! 🎫 Ticketing: turns [`TicketInputs`] into a Jira issue.
//!
//! 🧠 Knowledge graph:
//! - Transport: [`HttpSessionClient`] (cookies, JSON, status classification)
//! - Flow: login → search for an open twin → comment on it OR create + assign
//! - `summary_search` exists for the search step: the JQL text operator chokes
//!   on the characters the parser already scrubbed out
//!
//! Failure policy:
//! - login / search / create failing → [`TicketError`], surfaced to the pipeline
//! - comment / assignee returning non-2xx → logged and shrugged off, the
//!   ticket itself already exists

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::{info, warn};

use crate::common::{
    COMPONENT, DESCRIPTION, PASSWORD, PRIORITY, PROJECT, RECIPIENT, SUMMARY, SUMMARY_SEARCH,
    TicketInputs, USERNAME,
};
use crate::http_session::{HttpError, HttpSessionClient};

pub const ISSUE_TYPE: &str = "Bug";

/// 💀 The three ways Jira can ruin the night.
///
/// Each variant names the step that failed and keeps the [`HttpError`] as its
/// source, so `{:#}` in the logs reads like a crime scene timeline: which step,
/// which URL, which status, what Jira said about it.
#[derive(Debug, Error)]
pub enum TicketError {
    #[error("failed to log in to Jira as '{username}'")]
    Login {
        username: String,
        #[source]
        source: HttpError,
    },

    #[error("failed to search Jira for an open issue in project '{project}'")]
    Search {
        project: String,
        #[source]
        source: HttpError,
    },

    #[error("failed to create a Jira issue in project '{project}'")]
    Create {
        project: String,
        #[source]
        source: HttpError,
    },
}

/// 📬 What happened to the alarm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// a brand new issue was filed
    Created { key: String },
    /// an open issue for the same alarm already existed; it got a comment
    Commented { key: String },
}

// 🔑 the only body Jira's session endpoint will take
#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    issues: Vec<IssueRef>,
}

#[derive(Debug, Deserialize)]
struct IssueRef {
    key: String,
}

/// 🎫 Files tickets against one Jira instance.
///
/// 🧠 Knowledge graph:
/// - owns an [`HttpSessionClient`], so the proxy decision is already baked in
/// - `base_url` is stored without a trailing `/`; every REST path starts with one
/// - stateless between calls: each alarm logs in fresh, cookies die with the call
#[derive(Debug)]
pub struct TicketDispatcher {
    http: HttpSessionClient,
    base_url: String,
}

impl TicketDispatcher {
    pub fn new(http: HttpSessionClient, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// 🚀 File (or re-raise) the ticket for one alarm.
    ///
    /// 🧠 Everything is read off the merged field map: the eight ticket keys
    /// plus `username` / `password`. One map in, one ticket out.
    pub async fn create_notification(
        &self,
        inputs: &TicketInputs,
    ) -> Result<DispatchOutcome, TicketError> {
        let the_values = inputs.merged();
        let project = value_of(&the_values, PROJECT);
        let summary = value_of(&the_values, SUMMARY);
        let description = value_of(&the_values, DESCRIPTION);
        let recipient = value_of(&the_values, RECIPIENT);

        let the_cookies = self
            .http
            .post_login(
                &self.url("/rest/auth/1/session"),
                &LoginRequest {
                    username: value_of(&the_values, USERNAME),
                    password: value_of(&the_values, PASSWORD),
                },
            )
            .await
            .map_err(|source| TicketError::Login {
                username: value_of(&the_values, USERNAME).to_string(),
                source,
            })?;

        let the_search: SearchResult = self
            .http
            .post_for_object(
                &self.url("/rest/api/2/search"),
                &json!({
                    "jql": open_issue_jql(project, value_of(&the_values, SUMMARY_SEARCH)),
                    "maxResults": 1,
                    "fields": ["key"],
                }),
                &the_cookies,
            )
            .await
            .map_err(|source| TicketError::Search {
                project: project.to_string(),
                source,
            })?;

        if let Some(the_existing) = the_search.issues.into_iter().next() {
            let the_status = self
                .http
                .post_for_status(
                    &self.url(&format!("/rest/api/2/issue/{}/comment", the_existing.key)),
                    &json!({ "body": description }),
                    &the_cookies,
                )
                .await;
            match the_status {
                Ok(status) if (200..300).contains(&status) => {
                    info!("🔁 Alarm fired again, commented on open issue {}", the_existing.key)
                }
                Ok(status) => warn!(
                    "⚠️ Could not comment on open issue {} (status {}). The issue is still open, moving on.",
                    the_existing.key, status
                ),
                Err(err) => warn!(
                    "⚠️ Could not comment on open issue {}. The issue is still open, moving on. cause: {:#}",
                    the_existing.key, err
                ),
            }
            return Ok(DispatchOutcome::Commented {
                key: the_existing.key,
            });
        }

        let the_created: IssueRef = self
            .http
            .post_for_object(
                &self.url("/rest/api/2/issue"),
                &json!({
                    "fields": {
                        "project": { "key": project },
                        "summary": summary,
                        "description": description,
                        "issuetype": { "name": ISSUE_TYPE },
                        "priority": { "id": value_of(&the_values, PRIORITY) },
                        "components": [{ "name": value_of(&the_values, COMPONENT) }],
                    }
                }),
                &the_cookies,
            )
            .await
            .map_err(|source| TicketError::Create {
                project: project.to_string(),
                source,
            })?;
        info!("🎫 Created issue {} for '{}'", the_created.key, summary);

        let the_status = self
            .http
            .put_for_status(
                &self.url(&format!("/rest/api/2/issue/{}/assignee", the_created.key)),
                &json!({ "name": recipient }),
                &the_cookies,
            )
            .await;
        match the_status {
            Ok(status) if (200..300).contains(&status) => {}
            Ok(status) => warn!(
                "⚠️ Could not assign {} to '{}' (status {}). The issue exists, unassigned.",
                the_created.key, recipient, status
            ),
            Err(err) => warn!(
                "⚠️ Could not assign {} to '{}'. The issue exists, unassigned. cause: {:#}",
                the_created.key, recipient, err
            ),
        }

        Ok(DispatchOutcome::Created {
            key: the_created.key,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// 🗝️ One value out of the merged map. The merge always carries every key.
fn value_of<'a>(values: &'a BTreeMap<String, String>, key: &str) -> &'a str {
    values.get(key).map(String::as_str).unwrap_or_default()
}

/// 🔍 JQL for "an unresolved issue in `project` whose summary matches `summary_search`".
fn open_issue_jql(project: &str, summary_search: &str) -> String {
    format!(
        "project = \"{}\" AND summary ~ \"\\\"{}\\\"\" AND resolution = Unresolved",
        escape_jql(project),
        escape_jql(summary_search)
    )
}

fn escape_jql(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
