//! 🔑 Credential Resolver: fetches the Jira credentials for an account.
//!
//! 🧠 Knowledge graph:
//! - Production: `ObjectStore` (S3), bucket `account-info-<accountId>`, fixed key
//! - Local runs / tests: `credentials_file_override` short-circuits S3 entirely
//! - Output is raw JSON text; [`parse_credentials`] turns it into [`Credentials`]

use std::path::PathBuf;

use thiserror::Error;
use tracing::{error, info};

use crate::backends::ObjectStore;
use crate::common::Credentials;

pub const CREDENTIALS_KEY: &str = "superadmin/us-east-1/jira-creds";

/// 🪣 `account-info-<accountId>`
pub fn credentials_bucket(aws_account_id: &str) -> String {
    format!("account-info-{}", aws_account_id)
}

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("no such key: verify that bucket \"{bucket}\" and key \"{key}\" exist in S3")]
    Fetch {
        bucket: String,
        key: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to read the Jira credentials from {origin}")]
    Unreadable {
        origin: String,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("Jira credentials are not a {{\"username\", \"password\"}} JSON document")]
    Malformed(#[source] serde_json::Error),
}

#[derive(Debug)]
pub struct CredentialResolver {
    store: Box<dyn ObjectStore>,
    override_file: Option<PathBuf>,
}

impl CredentialResolver {
    pub fn new(store: Box<dyn ObjectStore>, override_file: Option<PathBuf>) -> Self {
        Self {
            store,
            override_file,
        }
    }

    /// 🚀 Raw credential JSON for `aws_account_id`.
    ///
    /// A readable override file wins and S3 is never asked. An unreadable
    /// override file is logged and we carry on with S3.
    pub async fn resolve(&self, aws_account_id: &str) -> Result<String, CredentialError> {
        let bucket = credentials_bucket(aws_account_id);

        if let Some((the_path, the_bytes)) = self.read_override().await {
            info!(
                "🧪 Did NOT read from bucket={} key={} but used testing configuration '{}'.",
                bucket,
                CREDENTIALS_KEY,
                the_path.display()
            );
            return String::from_utf8(the_bytes).map_err(|source| CredentialError::Unreadable {
                origin: the_path.display().to_string(),
                source,
            });
        }

        let the_bytes = self
            .store
            .get_object(&bucket, CREDENTIALS_KEY)
            .await
            .map_err(|source| CredentialError::Fetch {
                bucket: bucket.clone(),
                key: CREDENTIALS_KEY.to_string(),
                source,
            })?;

        String::from_utf8(the_bytes).map_err(|source| CredentialError::Unreadable {
            origin: format!("s3://{}/{}", bucket, CREDENTIALS_KEY),
            source,
        })
    }

    async fn read_override(&self) -> Option<(&PathBuf, Vec<u8>)> {
        let the_path = self.override_file.as_ref()?;
        match tokio::fs::read(the_path).await {
            Ok(the_bytes) => Some((the_path, the_bytes)),
            Err(err) => {
                error!(
                    "💀 Error occurred trying to read file={} for Jira credentials. \
                     Will assume production defaults and continue. cause: {}",
                    the_path.display(),
                    err
                );
                None
            }
        }
    }
}

/// 🔓 `{"username": "...", "password": "..."}` → [`Credentials`].
pub fn parse_credentials(raw: &str) -> Result<Credentials, CredentialError> {
    serde_json::from_str(raw).map_err(CredentialError::Malformed)
}
