//! 🪣 S3: the place where credentials go to wait for us.
//!
//! INT. AWS CONSOLE: NIGHT. A bucket named `account-info-<id>` holds one small
//! JSON file. It has been waiting since the account was provisioned. Patient.
//! Ready to be read exactly once per alarm.

use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_s3::config::Region;
use tracing::trace;

use crate::backends::ObjectStore;

/// 🌎 The only region this bridge knows how to find credentials in.
/// Another region means another code path. Nobody has asked yet.
pub const CREDENTIALS_REGION: &str = "us-east-1";

/// 📦 [`ObjectStore`] backed by the AWS S3 SDK.
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
}

impl S3ObjectStore {
    /// 🚀 Build an S3 client pinned to [`CREDENTIALS_REGION`], credentials from the usual AWS chain.
    pub async fn new() -> Self {
        let the_aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(CREDENTIALS_REGION))
            .load()
            .await;

        Self {
            client: aws_sdk_s3::Client::new(&the_aws_config),
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        let the_response = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .context(format!(
                "💀 GetObject failed for s3://{}/{}. The bucket ghosted us. \
                 Check: bucket name, key path, region, and IAM permissions.",
                bucket, key
            ))?;

        let the_bytes = the_response
            .body
            .collect()
            .await
            .context(format!(
                "💀 S3 started sending s3://{}/{} and then stopped. Half a credential is no credential.",
                bucket, key
            ))?
            .into_bytes();

        trace!("🪣 hauled {} bytes out of s3://{}/{}", the_bytes.len(), bucket, key);
        Ok(the_bytes.to_vec())
    }
}
