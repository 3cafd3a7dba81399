use crate::error::{Error, Result};
use crate::proxy::{MaxBodySize, MountPath};
use crate::upstream::{ProxyUrl, TransportTimeouts, UpstreamUrl, DEFAULT_UPSTREAM_URL};
use config::{builder::DefaultState, ConfigBuilder, Environment, File};
use serde::Deserialize;
use std::env;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

pub use config::ConfigError;

/// Prefix for environment overrides, e.g. `AUDIT_RELAY__AUDIT__ENABLED=false`
pub const ENV_PREFIX: &str = "AUDIT_RELAY";

/// Names an extra configuration file loaded after the `config/` directory
pub const CONFIG_FILE_VAR: &str = "AUDIT_RELAY_CONFIG";

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub audit: AuditSettings,
    pub registry: RegistrySettings,
    pub transport: TransportSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
    pub environment: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuditSettings {
    /// Whether audit requests are forwarded at all
    pub enabled: bool,
    pub mount_path: String,
    pub upstream_url: String,
    pub max_body_bytes: usize,
}

/// Host registry settings the relay reads on every request
#[derive(Debug, Deserialize, Clone, Default)]
pub struct RegistrySettings {
    pub https_proxy: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TransportSettings {
    pub connect_timeout_ms: u64,
    /// Unset means no whole-request timeout
    pub request_timeout_ms: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

impl Settings {
    /// Load settings from defaults, the `config/` directory, an optional
    /// explicit file and the environment, in that order
    pub fn new() -> std::result::Result<Self, ConfigError> {
        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let mut builder = Self::defaults(&environment)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            .add_source(File::with_name("config/local").required(false));

        if let Ok(path) = env::var(CONFIG_FILE_VAR) {
            builder = builder.add_source(File::with_name(&path).required(true));
        }

        builder
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?
            .try_deserialize()
    }

    /// Load settings from defaults overlaid with a single file
    pub fn from_file(path: impl AsRef<Path>) -> std::result::Result<Self, ConfigError> {
        Self::defaults("development")?
            .add_source(File::from(path.as_ref()).required(true))
            .build()?
            .try_deserialize()
    }

    fn defaults(
        environment: &str,
    ) -> std::result::Result<ConfigBuilder<DefaultState>, ConfigError> {
        config::Config::builder()
            .set_default("application.host", "0.0.0.0")?
            .set_default("application.port", 8080)?
            .set_default("application.environment", environment)?
            .set_default("audit.enabled", true)?
            .set_default("audit.mount_path", crate::proxy::types::DEFAULT_MOUNT_PATH)?
            .set_default("audit.upstream_url", DEFAULT_UPSTREAM_URL)?
            .set_default(
                "audit.max_body_bytes",
                crate::proxy::types::DEFAULT_MAX_BODY_BYTES as u64,
            )?
            .set_default("transport.connect_timeout_ms", 30_000)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "json")
    }

    /// Check every setting that has a validated form
    pub fn validate(&self) -> Result<()> {
        self.socket_addr()?;
        self.mount_path()?;
        self.upstream_url()?;
        self.max_body_size()?;
        self.https_proxy()?;
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.application.host, self.application.port)
            .parse()
            .map_err(|e| Error::invalid_setting("application.host", e))
    }

    pub fn mount_path(&self) -> Result<MountPath> {
        MountPath::try_new(self.audit.mount_path.clone())
            .map_err(|e| Error::invalid_setting("audit.mount_path", e))
    }

    pub fn upstream_url(&self) -> Result<UpstreamUrl> {
        UpstreamUrl::try_new(self.audit.upstream_url.clone())
            .map_err(|e| Error::invalid_setting("audit.upstream_url", e))
    }

    pub fn max_body_size(&self) -> Result<MaxBodySize> {
        MaxBodySize::try_new(self.audit.max_body_bytes)
            .map_err(|e| Error::invalid_setting("audit.max_body_bytes", e))
    }

    /// The configured outbound proxy; blank values count as unset
    pub fn https_proxy(&self) -> Result<Option<ProxyUrl>> {
        match self.registry.https_proxy.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(url) => ProxyUrl::try_new(url.to_string())
                .map(Some)
                .map_err(|e| Error::invalid_setting("registry.https_proxy", e)),
        }
    }

    pub fn timeouts(&self) -> TransportTimeouts {
        TransportTimeouts {
            connect: Duration::from_millis(self.transport.connect_timeout_ms),
            request: self.transport.request_timeout_ms.map(Duration::from_millis),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn defaults_only() -> Settings {
        Settings::from_file(write_config("").path()).unwrap()
    }

    #[test]
    fn test_defaults_are_valid() {
        let settings = defaults_only();

        settings.validate().unwrap();
        assert!(settings.audit.enabled);
        assert_eq!(settings.application.port, 8080);
        assert_eq!(settings.mount_path().unwrap().as_ref(), "/-/npm/v1/security");
        assert_eq!(settings.upstream_url().unwrap().as_ref(), DEFAULT_UPSTREAM_URL);
        assert_eq!(*settings.max_body_size().unwrap().as_ref(), 50 * 1024 * 1024);
        assert_eq!(settings.https_proxy().unwrap(), None);
        assert_eq!(settings.logging.format, LogFormat::Json);
        assert_eq!(settings.timeouts(), TransportTimeouts::default());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let file = write_config(
            r#"
            [application]
            port = 9090

            [audit]
            enabled = false
            mount_path = "/audit-proxy"

            [registry]
            https_proxy = "http://proxy.internal:3128"

            [transport]
            connect_timeout_ms = 500
            request_timeout_ms = 10000

            [logging]
            format = "pretty"
            "#,
        );

        let settings = Settings::from_file(file.path()).unwrap();

        assert!(!settings.audit.enabled);
        assert_eq!(settings.application.port, 9090);
        assert_eq!(settings.mount_path().unwrap().as_ref(), "/audit-proxy");
        assert_eq!(
            settings.https_proxy().unwrap().unwrap().as_ref(),
            "http://proxy.internal:3128"
        );
        assert_eq!(
            settings.timeouts(),
            TransportTimeouts {
                connect: Duration::from_millis(500),
                request: Some(Duration::from_secs(10)),
            }
        );
        assert_eq!(settings.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_blank_proxy_is_unset() {
        let file = write_config("[registry]\nhttps_proxy = \"  \"\n");
        let settings = Settings::from_file(file.path()).unwrap();
        assert_eq!(settings.https_proxy().unwrap(), None);
    }

    #[test]
    fn test_invalid_mount_path_is_rejected() {
        let file = write_config("[audit]\nmount_path = \"no-leading-slash\"\n");
        let settings = Settings::from_file(file.path()).unwrap();

        let error = settings.validate().unwrap_err();
        assert!(matches!(error, Error::InvalidSetting { ref key, .. } if key == "audit.mount_path"));
    }

    #[test]
    fn test_wildcard_mount_path_is_rejected() {
        let file = write_config("[audit]\nmount_path = \"/{*rest}\"\n");
        let settings = Settings::from_file(file.path()).unwrap();

        assert!(matches!(
            settings.mount_path(),
            Err(Error::InvalidSetting { ref key, .. }) if key == "audit.mount_path"
        ));
    }

    #[test]
    fn test_invalid_upstream_url_is_rejected() {
        let file = write_config("[audit]\nupstream_url = \"registry.npmjs.org\"\n");
        let settings = Settings::from_file(file.path()).unwrap();

        assert!(matches!(
            settings.upstream_url(),
            Err(Error::InvalidSetting { .. })
        ));
    }

    #[test]
    fn test_zero_body_limit_is_rejected() {
        let file = write_config("[audit]\nmax_body_bytes = 0\n");
        let settings = Settings::from_file(file.path()).unwrap();

        assert!(settings.max_body_size().is_err());
    }

    #[test]
    fn test_unknown_log_format_fails_to_load() {
        let file = write_config("[logging]\nformat = \"xml\"\n");
        assert!(Settings::from_file(file.path()).is_err());
    }

    #[test]
    fn test_missing_file_fails_to_load() {
        assert!(Settings::from_file("/nonexistent/audit-relay.toml").is_err());
    }
}
