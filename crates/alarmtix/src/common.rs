//! 📦 Common types: the nouns every other module keeps passing around.
//!
//! 🧠 Knowledge graph:
//! - `TicketFields`: produced by `parser`, consumed by `ticketing`
//! - `Credentials`: produced by `credentials::parse_credentials`
//! - `TicketInputs`: the two of them, merged, handed to the dispatcher

use std::collections::BTreeMap;

use serde::Deserialize;

pub const SUMMARY: &str = "summary";
pub const SUMMARY_SEARCH: &str = "summary_search";
pub const PROJECT: &str = "project";
pub const COMPONENT: &str = "component";
pub const PRIORITY: &str = "priority";
pub const RECIPIENT: &str = "recipient";
pub const DESCRIPTION: &str = "description";
pub const AWS_ACCOUNT_ID: &str = "aws_account_id";
pub const USERNAME: &str = "username";
pub const PASSWORD: &str = "password";

/// 🎫 Everything a ticket needs to know about one alarm.
///
/// Built once per event by the parser and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketFields {
    pub summary: String,
    /// 🔍 `summary` with every search-index special character swapped for a space
    pub summary_search: String,
    pub project: String,
    pub component: String,
    pub priority: String,
    pub recipient: String,
    /// 📝 reason + alarm console link + runbook link, one per line
    pub description: String,
    pub aws_account_id: String,
}

impl TicketFields {
    /// 🗺️ The field-name → value view of this ticket.
    pub fn to_map(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            (SUMMARY.to_string(), self.summary.clone()),
            (SUMMARY_SEARCH.to_string(), self.summary_search.clone()),
            (PROJECT.to_string(), self.project.clone()),
            (COMPONENT.to_string(), self.component.clone()),
            (PRIORITY.to_string(), self.priority.clone()),
            (RECIPIENT.to_string(), self.recipient.clone()),
            (DESCRIPTION.to_string(), self.description.clone()),
            (AWS_ACCOUNT_ID.to_string(), self.aws_account_id.clone()),
        ])
    }
}

/// 🔑 Jira credentials. Fetched fresh per run, never cached.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>") // 🔒 logs are forever
            .finish()
    }
}

/// 🤝 Ticket fields and credentials, together at last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketInputs {
    pub fields: TicketFields,
    pub credentials: Credentials,
}

impl TicketInputs {
    pub fn new(fields: TicketFields, credentials: Credentials) -> Self {
        Self {
            fields,
            credentials,
        }
    }

    /// 🗺️ One flat map: the eight ticket keys plus `username` and `password`.
    pub fn merged(&self) -> BTreeMap<String, String> {
        let mut the_map = self.fields.to_map();
        the_map.insert(USERNAME.to_string(), self.credentials.username.clone());
        the_map.insert(PASSWORD.to_string(), self.credentials.password.clone());
        the_map
    }
}
