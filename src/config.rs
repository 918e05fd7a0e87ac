use crate::error::{BlockwallError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlocklistConfig {
    /// Source addresses to drop, in slot order
    #[serde(default)]
    pub blocked_ips: Vec<String>,

    /// Reserved for port-based blocking; parsed but not enforced
    #[serde(default)]
    pub blocked_ports: Vec<u16>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
}

impl ConfigFormat {
    /// Pick the decoder from the file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();

        match ext {
            "yaml" | "yml" => Ok(ConfigFormat::Yaml),
            "json" => Ok(ConfigFormat::Json),
            other => Err(BlockwallError::UnsupportedFormat(other.to_string())),
        }
    }

    pub fn parse(self, content: &str) -> Result<BlocklistConfig> {
        let config = match self {
            ConfigFormat::Yaml => serde_yaml::from_str(content)?,
            ConfigFormat::Json => serde_json::from_str(content)?,
        };
        Ok(config)
    }
}

/// Load the blocklist configuration from a YAML or JSON file
pub fn load_config(path: &Path) -> Result<BlocklistConfig> {
    let format = ConfigFormat::from_path(path)?;
    debug!("Reading {:?} config from {}", format, path.display());

    let content = std::fs::read_to_string(path).map_err(|e| {
        BlockwallError::Config(format!("Failed to open config file {}: {}", path.display(), e))
    })?;

    let config = format.parse(&content)?;
    if !config.blocked_ports.is_empty() {
        debug!(
            "Ignoring {} blocked_ports entries (port filtering is not enforced)",
            config.blocked_ports.len()
        );
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(suffix: &str, content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(suffix)
            .tempfile()
            .expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write temp file");
        file
    }

    #[test]
    fn test_load_yaml() {
        let file = write_config(
            ".yaml",
            "blocked_ips:\n  - 10.0.0.1\n  - 192.168.1.10\n",
        );
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.blocked_ips, vec!["10.0.0.1", "192.168.1.10"]);
        assert!(config.blocked_ports.is_empty());
    }

    #[test]
    fn test_load_yml_extension() {
        let file = write_config(".yml", "blocked_ips: [\"1.1.1.1\"]\n");
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.blocked_ips, vec!["1.1.1.1"]);
    }

    #[test]
    fn test_load_json_keeps_order() {
        let file = write_config(
            ".json",
            r#"{"blocked_ips": ["10.0.0.3", "garbage", "10.0.0.1"]}"#,
        );
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.blocked_ips, vec!["10.0.0.3", "garbage", "10.0.0.1"]);
    }

    #[test]
    fn test_blocked_ports_accepted_and_unknown_fields_ignored() {
        let file = write_config(
            ".json",
            r#"{"blocked_ips": ["10.0.0.1"], "blocked_ports": [22, 8080], "comment": "x"}"#,
        );
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.blocked_ips, vec!["10.0.0.1"]);
        assert_eq!(config.blocked_ports, vec![22, 8080]);
    }

    #[test]
    fn test_missing_field_is_empty_list() {
        let file = write_config(".yaml", "{}\n");
        let config = load_config(file.path()).unwrap();
        assert!(config.blocked_ips.is_empty());
    }

    #[test]
    fn test_unsupported_extension() {
        let file = write_config(".toml", "blocked_ips = []\n");
        match load_config(file.path()) {
            Err(BlockwallError::UnsupportedFormat(ext)) => assert_eq!(ext, "toml"),
            other => panic!("expected UnsupportedFormat, got {other:?}"),
        }
    }

    #[test]
    fn test_no_extension_is_unsupported() {
        assert!(matches!(
            ConfigFormat::from_path(Path::new("/etc/blockwall/config")),
            Err(BlockwallError::UnsupportedFormat(ext)) if ext.is_empty()
        ));
    }

    #[test]
    fn test_malformed_documents() {
        let file = write_config(".json", "{\"blocked_ips\": [");
        assert!(matches!(load_config(file.path()), Err(BlockwallError::Json(_))));

        let file = write_config(".yaml", "blocked_ips: 42\n");
        assert!(matches!(load_config(file.path()), Err(BlockwallError::Yaml(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = load_config(Path::new("/nonexistent/blockwall.yaml"));
        assert!(matches!(result, Err(BlockwallError::Config(_))));
    }
}
