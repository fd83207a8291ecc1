//! Configuration for the render pipeline and HTTP service.
//!
//! Configuration sources (highest priority first):
//! 1. Command-line flags and environment variables (PORT, MODGRAPHWEB_BIND)
//! 2. Settings file passed with --config or MODGRAPHWEB_CONFIG
//! 3. Defaults (modgraphviz | dot -Tsvg, port 8080)

use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Environment variable holding the listening port
pub const PORT_ENV_VAR: &str = "PORT";

/// Port used when PORT is not set
pub const DEFAULT_PORT: u16 = 8080;

/// An external program invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageCommand {
    /// Program name or path
    pub program: String,

    /// Arguments passed to the program
    #[serde(default)]
    pub args: Vec<String>,
}

/// Settings file schema (every key optional)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSettings {
    /// Converts `go mod graph` output into DOT
    #[serde(default = "default_normalize")]
    pub normalize: StageCommand,

    /// Converts DOT into SVG
    #[serde(default = "default_render")]
    pub render: StageCommand,

    /// Per-stage timeout in seconds (default: 60)
    #[serde(default = "default_stage_timeout")]
    pub stage_timeout_seconds: u64,

    /// Largest accepted request body (default: 32 MiB)
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// Cache lifetime advertised for pages and artifacts (default: 1 hour)
    #[serde(default = "default_cache_max_age")]
    pub cache_max_age_seconds: u64,
}

fn default_normalize() -> StageCommand {
    StageCommand {
        program: "modgraphviz".to_string(),
        args: Vec::new(),
    }
}
fn default_render() -> StageCommand {
    StageCommand {
        program: "dot".to_string(),
        args: vec!["-Tsvg".to_string()],
    }
}
fn default_stage_timeout() -> u64 {
    60
}
fn default_max_upload_bytes() -> usize {
    32 << 20
}
fn default_cache_max_age() -> u64 {
    3600
} // 1 hour

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            normalize: default_normalize(),
            render: default_render(),
            stage_timeout_seconds: default_stage_timeout(),
            max_upload_bytes: default_max_upload_bytes(),
            cache_max_age_seconds: default_cache_max_age(),
        }
    }
}

impl RenderSettings {
    /// Load settings from a YAML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;

        Self::from_yaml(&content)
            .with_context(|| format!("Failed to load settings file: {}", path.display()))
    }

    /// Parse settings from YAML content
    pub fn from_yaml(content: &str) -> Result<Self> {
        let settings: Self =
            serde_yaml::from_str(content).context("Failed to parse settings YAML")?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load from an optional file, falling back to defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        if self.normalize.program.trim().is_empty() {
            anyhow::bail!("normalize.program cannot be empty");
        }
        if self.render.program.trim().is_empty() {
            anyhow::bail!("render.program cannot be empty");
        }
        if self.stage_timeout_seconds == 0 {
            anyhow::bail!("stage_timeout_seconds must be greater than zero");
        }
        if self.max_upload_bytes == 0 {
            anyhow::bail!("max_upload_bytes must be greater than zero");
        }
        Ok(())
    }

    /// Get the per-stage timeout
    pub fn stage_timeout(&self) -> Duration {
        Duration::from_secs(self.stage_timeout_seconds)
    }

    /// Value of the Cache-Control header for cacheable responses
    pub fn cache_control(&self) -> String {
        format!("max-age={}", self.cache_max_age_seconds)
    }
}

/// Resolve the listening port, warning when falling back to the default
pub fn resolve_port(port: Option<u16>) -> u16 {
    port.unwrap_or_else(|| {
        warn!(
            "{} not specified; using default {}",
            PORT_ENV_VAR, DEFAULT_PORT
        );
        DEFAULT_PORT
    })
}

/// Build the socket address to listen on
pub fn listen_addr(bind: IpAddr, port: Option<u16>) -> SocketAddr {
    SocketAddr::new(bind, resolve_port(port))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::net::Ipv4Addr;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let settings = RenderSettings::default();

        assert_eq!(settings.normalize.program, "modgraphviz");
        assert!(settings.normalize.args.is_empty());
        assert_eq!(settings.render.program, "dot");
        assert_eq!(settings.render.args, vec!["-Tsvg".to_string()]);
        assert_eq!(settings.stage_timeout(), Duration::from_secs(60));
        assert_eq!(settings.max_upload_bytes, 32 * 1024 * 1024);
        assert_eq!(settings.cache_control(), "max-age=3600");
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let settings = RenderSettings::from_yaml(
            r#"
render:
  program: /usr/local/bin/dot
  args: ["-Tsvg", "-Grankdir=LR"]
stage_timeout_seconds: 5
"#,
        )
        .unwrap();

        assert_eq!(settings.normalize, default_normalize());
        assert_eq!(settings.render.program, "/usr/local/bin/dot");
        assert_eq!(settings.render.args.len(), 2);
        assert_eq!(settings.stage_timeout_seconds, 5);
        assert_eq!(settings.cache_max_age_seconds, 3600);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        assert!(RenderSettings::from_yaml("stage_timeout_seconds: 0").is_err());
        assert!(RenderSettings::from_yaml("max_upload_bytes: 0").is_err());
        assert!(RenderSettings::from_yaml("normalize:\n  program: \"\"").is_err());
        assert!(RenderSettings::from_yaml("render: [not, a, map]").is_err());
    }

    #[test]
    fn test_settings_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "cache_max_age_seconds: 60").unwrap();

        let settings = RenderSettings::load(Some(file.path())).unwrap();
        assert_eq!(settings.cache_control(), "max-age=60");

        let missing = RenderSettings::load(Some(Path::new("/nonexistent/modgraphweb.yaml")));
        assert!(missing.is_err());

        assert_eq!(RenderSettings::load(None).unwrap(), RenderSettings::default());
    }

    #[test]
    fn test_port_resolution() {
        assert_eq!(resolve_port(Some(9000)), 9000);
        assert_eq!(resolve_port(None), DEFAULT_PORT);

        let addr = listen_addr(IpAddr::V4(Ipv4Addr::LOCALHOST), Some(3000));
        assert_eq!(addr.to_string(), "127.0.0.1:3000");
    }
}
