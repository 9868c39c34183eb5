//! 🧪 In-memory backends: AWS cosplay for the test suite.
//!
//! ⚠️ This is NOT for production. It only exists under `cfg(test)`.
//! No network calls. No IAM policies. Just a `HashMap` and a dream.

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::{Result, anyhow};
use async_trait::async_trait;

use crate::backends::{AccountAliasLookup, ObjectStore};

/// 🪣 A bucket/key → bytes map that also remembers who asked for what.
#[derive(Debug, Default)]
pub(crate) struct InMemoryObjectStore {
    objects: HashMap<(String, String), Vec<u8>>,
    requests: Mutex<Vec<(String, String)>>,
}

impl InMemoryObjectStore {
    pub(crate) fn with_object(self, bucket: &str, key: &str, body: &str) -> Self {
        self.with_object_bytes(bucket, key, body.as_bytes())
    }

    /// 🧨 Same as `with_object`, for bodies that are not text at all.
    pub(crate) fn with_object_bytes(mut self, bucket: &str, key: &str, body: &[u8]) -> Self {
        self.objects
            .insert((bucket.to_string(), key.to_string()), body.to_vec());
        self
    }

    /// 🕵️ Every (bucket, key) pair `get_object` was called with, in order.
    pub(crate) fn requests(&self) -> Vec<(String, String)> {
        self.requests
            .lock()
            .map(|the_requests| the_requests.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        if let Ok(mut the_requests) = self.requests.lock() {
            the_requests.push((bucket.to_string(), key.to_string()));
        }
        self.objects
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| anyhow!("NoSuchKey: s3://{}/{}", bucket, key))
    }
}

/// 🏷️ An alias lookup that always says the same thing, or always fails.
#[derive(Debug, Clone)]
pub(crate) enum FixedAlias {
    Alias(String),
    Broken,
}

#[async_trait]
impl AccountAliasLookup for FixedAlias {
    async fn first_account_alias(&self) -> Result<String> {
        match self {
            FixedAlias::Alias(alias) => Ok(alias.clone()),
            FixedAlias::Broken => Err(anyhow!("AccessDenied: iam:ListAccountAliases")),
        }
    }
}
