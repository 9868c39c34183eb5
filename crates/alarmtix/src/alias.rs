//! 🏷️ Account Alias Resolver: best-effort friendly names.
//!
//! A missing alias must never stop a ticket from being filed, so this is the
//! one place in the crate that swallows errors on purpose. Everything gets
//! logged, nothing gets raised, and the worst case is a ticket that says
//! "unknown". 🦆

use tracing::error;

use crate::backends::AccountAliasLookup;

/// 🤷 What the account is called when nobody can tell us.
pub const UNKNOWN_ALIAS: &str = "unknown";

#[derive(Debug)]
pub struct AccountAliasResolver {
    lookup: Box<dyn AccountAliasLookup>,
}

impl AccountAliasResolver {
    pub fn new(lookup: Box<dyn AccountAliasLookup>) -> Self {
        Self { lookup }
    }

    /// 🎯 The first account alias, or [`UNKNOWN_ALIAS`] on any failure. Never errors.
    pub async fn friendly_name(&self) -> String {
        match self.lookup.first_account_alias().await {
            Ok(alias) => alias,
            Err(err) => {
                error!(
                    "💀 Error occurred looking for the account alias. Will assume '{}' for now. \
                     Perhaps the account alias has not been configured yet? cause: {:#}",
                    UNKNOWN_ALIAS, err
                );
                UNKNOWN_ALIAS.to_string()
            }
        }
    }
}
