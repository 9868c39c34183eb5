//! 🔌 Backends: where the bridge talks to AWS.
//!
//! ☁️ Two tiny contracts, two real implementations, two in-memory stand-ins:
//! - [`ObjectStore`]: "give me the bytes at bucket/key" (S3 in prod)
//! - [`AccountAliasLookup`]: "what do humans call this account?" (IAM in prod)
//!
//! The rest of the crate only ever sees the traits. Tests swap in `in_mem`
//! and nobody needs an AWS account to run `cargo test`. 🦆

use anyhow::Result;
use async_trait::async_trait;

pub(crate) mod iam;
#[cfg(test)]
pub(crate) mod in_mem;
pub(crate) mod s3;

pub use iam::IamAliasLookup;
pub use s3::S3ObjectStore;

/// 🪣 Something that holds objects by bucket and key.
///
/// # Contract
/// - `get_object` returns the whole object body, fully read.
/// - Missing bucket, missing key, access denied, or a body that stops halfway
///   are all `Err`. The caller decides what that means.
#[async_trait]
pub trait ObjectStore: std::fmt::Debug + Send + Sync {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>>;
}

/// 🏷️ Something that knows the friendly alias of the current account.
///
/// # Contract
/// - `first_account_alias` returns the first alias configured for the account.
/// - No alias configured is an `Err`, same as a network failure. The caller
///   is expected to shrug and use a fallback.
#[async_trait]
pub trait AccountAliasLookup: std::fmt::Debug + Send + Sync {
    async fn first_account_alias(&self) -> Result<String>;
}
