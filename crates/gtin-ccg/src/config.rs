//! # CCG Client Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     GTIN_CCG_URL=https://…/ccgConsGTIN.asmx                            │
//! │     GTIN_CCG_TIMEOUT_SECS=30                                           │
//! │     GTIN_CCG_DEBUG_DIR=/tmp/ccg                                        │
//! │     GTIN_CCG_ACCEPT_INVALID_CERTS=true                                 │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/gtin/ccg.toml (Linux)                                    │
//! │     ~/Library/Application Support/br.gtin.gtin/ccg.toml (macOS)        │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     SVRS production endpoint, 20s connect timeout                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # ccg.toml
//! [service]
//! endpoint = "https://dfe-servico.svrs.rs.gov.br/ws/ccgConsGTIN/ccgConsGTIN.asmx"
//! timeout_secs = 20
//! ipv4_only = true
//! accept_invalid_certs = false
//!
//! [debug]
//! dir = "/var/log/gtin/ccg"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{CcgError, CcgResult};

/// Production CCG endpoint (SVRS).
pub const DEFAULT_ENDPOINT: &str = "https://dfe-servico.svrs.rs.gov.br/ws/ccgConsGTIN/ccgConsGTIN.asmx";

/// Extra time allowed on top of the connect timeout for the whole exchange.
const TRANSFER_ALLOWANCE_SECS: u64 = 20;

// =============================================================================
// Service Settings
// =============================================================================

/// Where and how to reach the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceSettings {
    /// SOAP endpoint URL.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Connect timeout (seconds). The full request may take 20s more.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Resolve and connect over IPv4 only.
    #[serde(default = "default_true")]
    pub ipv4_only: bool,

    /// Skip server certificate verification.
    ///
    /// SEFAZ endpoints chain to the ICP-Brasil root, which most system
    /// trust stores lack.
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_timeout() -> u64 {
    20
}

fn default_true() -> bool {
    true
}

impl Default for ServiceSettings {
    fn default() -> Self {
        ServiceSettings {
            endpoint: default_endpoint(),
            timeout_secs: default_timeout(),
            ipv4_only: true,
            accept_invalid_certs: false,
        }
    }
}

// =============================================================================
// Debug Settings
// =============================================================================

/// Capture of raw request/response pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugSettings {
    /// Directory receiving the capture files. Disabled when absent.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete client configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CcgConfig {
    /// Service settings.
    #[serde(default)]
    pub service: ServiceSettings,

    /// Debug capture settings.
    #[serde(default)]
    pub debug: DebugSettings,
}

impl CcgConfig {
    /// Creates a config pointing at the production endpoint.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a config for a specific endpoint, other settings default.
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        CcgConfig {
            service: ServiceSettings {
                endpoint: endpoint.into(),
                ..ServiceSettings::default()
            },
            debug: DebugSettings::default(),
        }
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (ccg.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> CcgResult<Self> {
        Self::load_with(config_path, |key| std::env::var(key).ok())
    }

    /// [`CcgConfig::load`] with the environment read through `var`.
    pub fn load_with(
        config_path: Option<PathBuf>,
        var: impl Fn(&str) -> Option<String>,
    ) -> CcgResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading CCG config from file");
                let contents = std::fs::read_to_string(&path)
                    .map_err(|e| CcgError::ConfigLoadFailed(format!("{}: {}", path.display(), e)))?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(var);
        config.validate()?;

        Ok(config)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> CcgResult<()> {
        let endpoint = url::Url::parse(&self.service.endpoint)?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(CcgError::InvalidUrl(format!(
                "Endpoint must use http or https, got: {}",
                self.service.endpoint
            )));
        }

        if self.service.timeout_secs == 0 {
            return Err(CcgError::InvalidConfig(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies the `GTIN_CCG_*` overrides found through `var`.
    pub fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(url) = var("GTIN_CCG_URL") {
            debug!(url = %url, "Overriding CCG endpoint from environment");
            self.service.endpoint = url;
        }

        if let Some(timeout) = var("GTIN_CCG_TIMEOUT_SECS") {
            match timeout.parse::<u64>() {
                Ok(secs) => self.service.timeout_secs = secs,
                Err(_) => warn!(value = %timeout, "Ignoring non-numeric GTIN_CCG_TIMEOUT_SECS"),
            }
        }

        if let Some(dir) = var("GTIN_CCG_DEBUG_DIR") {
            self.debug.dir = if dir.is_empty() {
                None
            } else {
                Some(PathBuf::from(dir))
            };
        }

        if let Some(flag) = var("GTIN_CCG_ACCEPT_INVALID_CERTS") {
            match flag.to_lowercase().as_str() {
                "1" | "true" | "yes" => self.service.accept_invalid_certs = true,
                "0" | "false" | "no" => self.service.accept_invalid_certs = false,
                _ => warn!(value = %flag, "Unknown GTIN_CCG_ACCEPT_INVALID_CERTS value"),
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("br", "gtin", "gtin")
            .map(|dirs| dirs.config_dir().join("ccg.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Time allowed to establish the connection.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.service.timeout_secs)
    }

    /// Time allowed for the whole exchange.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.service.timeout_secs + TRANSFER_ALLOWANCE_SECS)
    }

    /// Endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.service.endpoint
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = CcgConfig::new();
        assert_eq!(config.endpoint(), DEFAULT_ENDPOINT);
        assert_eq!(config.service.timeout_secs, 20);
        assert!(config.service.ipv4_only);
        assert!(!config.service.accept_invalid_certs);
        assert!(config.debug.dir.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_timeouts() {
        let config = CcgConfig::default();
        assert_eq!(config.connect_timeout(), Duration::from_secs(20));
        assert_eq!(config.request_timeout(), Duration::from_secs(40));
    }

    #[test]
    fn test_config_validation() {
        let mut config = CcgConfig::with_endpoint("not a url");
        assert!(matches!(config.validate(), Err(CcgError::InvalidUrl(_))));

        config.service.endpoint = "ftp://example.com/ccg".into();
        assert!(matches!(config.validate(), Err(CcgError::InvalidUrl(_))));

        config.service.endpoint = "http://127.0.0.1:8080/ccg".into();
        assert!(config.validate().is_ok());

        config.service.timeout_secs = 0;
        assert!(matches!(config.validate(), Err(CcgError::InvalidConfig(_))));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: CcgConfig = toml::from_str(
            r#"
            [service]
            timeout_secs = 5

            [debug]
            dir = "/tmp/ccg"
            "#,
        )
        .unwrap();
        assert_eq!(config.service.timeout_secs, 5);
        assert_eq!(config.endpoint(), DEFAULT_ENDPOINT);
        assert!(config.service.ipv4_only);
        assert_eq!(config.debug.dir, Some(PathBuf::from("/tmp/ccg")));
    }

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[service]\nendpoint = \"https://homologacao.example/ccg\"\naccept_invalid_certs = true"
        )
        .unwrap();

        let config = CcgConfig::load_with(Some(file.path().to_path_buf()), |_| None).unwrap();
        assert_eq!(config.endpoint(), "https://homologacao.example/ccg");
        assert!(config.service.accept_invalid_certs);
        assert_eq!(config.service.timeout_secs, 20);
    }

    #[test]
    fn test_environment_wins_over_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[service]\ntimeout_secs = 5\n\n[debug]\ndir = \"/tmp/from-file\"").unwrap();

        let config = CcgConfig::load_with(
            Some(file.path().to_path_buf()),
            vars(&[
                ("GTIN_CCG_URL", "http://127.0.0.1:9000/ccg"),
                ("GTIN_CCG_TIMEOUT_SECS", "7"),
                ("GTIN_CCG_DEBUG_DIR", "/tmp/from-env"),
            ]),
        )
        .unwrap();
        assert_eq!(config.endpoint(), "http://127.0.0.1:9000/ccg");
        assert_eq!(config.service.timeout_secs, 7);
        assert_eq!(config.debug.dir, Some(PathBuf::from("/tmp/from-env")));
    }

    #[test]
    fn test_empty_debug_dir_disables_capture() {
        let mut config = CcgConfig::default();
        config.debug.dir = Some(PathBuf::from("/tmp/ccg"));
        config.apply_overrides(vars(&[("GTIN_CCG_DEBUG_DIR", "")]));
        assert!(config.debug.dir.is_none());
    }

    #[test]
    fn test_non_numeric_timeout_is_ignored() {
        let mut config = CcgConfig::default();
        config.apply_overrides(vars(&[("GTIN_CCG_TIMEOUT_SECS", "soon")]));
        assert_eq!(config.service.timeout_secs, 20);
    }

    #[test]
    fn test_accept_invalid_certs_flag() {
        for value in ["1", "true", "TRUE", "yes"] {
            let mut config = CcgConfig::default();
            config.apply_overrides(vars(&[("GTIN_CCG_ACCEPT_INVALID_CERTS", value)]));
            assert!(config.service.accept_invalid_certs, "{value} enables");
        }

        for value in ["0", "false", "No"] {
            let mut config = CcgConfig::default();
            config.service.accept_invalid_certs = true;
            config.apply_overrides(vars(&[("GTIN_CCG_ACCEPT_INVALID_CERTS", value)]));
            assert!(!config.service.accept_invalid_certs, "{value} disables");
        }

        let mut config = CcgConfig::default();
        config.service.accept_invalid_certs = true;
        config.apply_overrides(vars(&[("GTIN_CCG_ACCEPT_INVALID_CERTS", "maybe")]));
        assert!(config.service.accept_invalid_certs);
    }

    #[test]
    fn test_zero_timeout_from_environment_fails_validation() {
        assert!(matches!(
            CcgConfig::load_with(
                Some(PathBuf::from("/nonexistent/ccg.toml")),
                vars(&[("GTIN_CCG_TIMEOUT_SECS", "0")])
            ),
            Err(CcgError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_load_rejects_bad_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[service\nendpoint = ").unwrap();
        assert!(matches!(
            CcgConfig::load(Some(file.path().to_path_buf())),
            Err(CcgError::ConfigLoadFailed(_))
        ));
    }
}
