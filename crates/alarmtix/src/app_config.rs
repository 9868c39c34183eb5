//! 🔧 App Configuration: the sacred TOML-and-env-to-struct pipeline.
//!
//! 📡 "It worked in staging.": the config, moments before being pointed at prod 🦆
//!
//! 🏗️ Powered by Figment. Resolved exactly once at startup, then handed around
//! by reference. Nobody reads a global behind your back in this house.

use std::path::{Path, PathBuf};

use anyhow::Context;
use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use serde::Deserialize;
use tracing::info;

/// 🌐 Where Jira lives when nobody tells us otherwise.
pub const PRODUCTION_TICKET_BASE_URL: &str = "https://almtools.ldschurch.org:443";

/// 📦 Everything the bridge needs to know about the outside world.
///
/// All four knobs are optional. An empty config is a valid config: production
/// Jira, credentials from S3, no proxy. The happy path, basically.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct AppConfig {
    /// 🚇 HTTP proxy host. Only used when `proxy_port` is set too.
    #[serde(default)]
    pub proxy_host: Option<String>,
    /// 🚇 HTTP proxy port. Only used when `proxy_host` is set too.
    #[serde(default)]
    pub proxy_port: Option<u16>,
    /// 🧪 Point the bridge at a different Jira (local runs, tests, a mock server in a trench coat).
    #[serde(default)]
    pub ticket_base_url_override: Option<String>,
    /// 🔑 Read Jira credentials from this file instead of S3.
    #[serde(default)]
    pub credentials_file_override: Option<PathBuf>,
}

impl AppConfig {
    /// 🎯 The Jira base URL every ticketing request is built on.
    pub fn ticket_base_url(&self) -> &str {
        self.ticket_base_url_override
            .as_deref()
            .unwrap_or(PRODUCTION_TICKET_BASE_URL)
    }
}

/// 🚀 Load the config: environment variables (`ALARMTIX_*`) plus an optional TOML file.
///
/// - `None` → env vars only.
/// - `Some(path)` → env vars + TOML file, merged. TOML wins on conflicts.
pub fn load_config(config_file_name: Option<&Path>) -> anyhow::Result<AppConfig> {
    info!(
        "🔧 Loading configuration: {:#?}",
        config_file_name.unwrap_or(Path::new(""))
    );

    let config = Figment::new().merge(Env::prefixed("ALARMTIX_"));

    let config = match config_file_name {
        Some(file_name) => config.merge(Toml::file(file_name)),
        None => config,
    };

    let context_msg = match config_file_name {
        Some(path) => format!(
            "💀 Failed to parse configuration from file '{}' and environment variables (ALARMTIX_*). \
             Check the file for typos, then check the env for leftovers from last Tuesday.",
            path.display()
        ),
        None => "💀 Failed to parse configuration from environment variables (ALARMTIX_*). \
                 No file was provided, so this one's all on the environment."
            .to_string(),
    };

    config.extract().context(context_msg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_test_config(contents: &str) -> tempfile::NamedTempFile {
        let mut the_file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("💀 Failed to create a temp config. The filesystem said 'new phone who dis'.");
        the_file
            .write_all(contents.as_bytes())
            .expect("💀 Failed to write test config.");
        the_file
    }

    #[test]
    fn the_one_where_every_knob_comes_from_the_toml_file() {
        let the_file = write_test_config(
            r#"
            proxy_host = "proxy.fslocal.net"
            proxy_port = 443
            ticket_base_url_override = "http://localhost:8080"
            credentials_file_override = "/tmp/jira-creds.json"
            "#,
        );

        let app_config = load_config(Some(the_file.path()))
            .expect("💀 A fully populated config should parse.");

        assert_eq!(app_config.proxy_host.as_deref(), Some("proxy.fslocal.net"));
        assert_eq!(app_config.proxy_port, Some(443));
        assert_eq!(app_config.ticket_base_url(), "http://localhost:8080");
        assert_eq!(
            app_config.credentials_file_override,
            Some(PathBuf::from("/tmp/jira-creds.json"))
        );
    }

    #[test]
    fn the_one_where_an_empty_file_means_production_defaults() {
        let the_file = write_test_config("");

        let app_config: AppConfig = Figment::new()
            .merge(Toml::file(the_file.path()))
            .extract()
            .expect("💀 An empty config is a valid config. Serde disagreed.");

        assert_eq!(app_config, AppConfig::default());
        assert_eq!(app_config.ticket_base_url(), PRODUCTION_TICKET_BASE_URL);
    }

    #[test]
    fn the_one_where_a_port_that_is_not_a_port_gets_rejected() {
        let the_file = write_test_config(r#"proxy_port = "not-a-port""#);

        let the_result = load_config(Some(the_file.path()));

        assert!(the_result.is_err(), "💀 'not-a-port' should not parse as a u16");
    }
}
