//! 🏷️ IAM: asks AWS what the humans named this account.

use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::backends::AccountAliasLookup;

/// 📛 [`AccountAliasLookup`] backed by IAM `ListAccountAliases`.
#[derive(Debug, Clone)]
pub struct IamAliasLookup {
    client: aws_sdk_iam::Client,
}

impl IamAliasLookup {
    pub async fn new() -> Self {
        let the_aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self {
            client: aws_sdk_iam::Client::new(&the_aws_config),
        }
    }
}

#[async_trait]
impl AccountAliasLookup for IamAliasLookup {
    async fn first_account_alias(&self) -> Result<String> {
        let the_response = self
            .client
            .list_account_aliases()
            .send()
            .await
            .context("💀 ListAccountAliases failed. IAM is not in a sharing mood.")?;

        the_response
            .account_aliases()
            .first()
            .cloned()
            .context("💀 The account has no alias. Perhaps nobody has configured one yet?")
    }
}
