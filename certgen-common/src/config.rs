//! Configuration loading and root folder resolution

use crate::{Error, Result};
use std::path::PathBuf;

/// Default HTTP port for the certificate generator service
pub const DEFAULT_PORT: u16 = 8081;

/// Resolved server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Storage root; `templates/` and `certificates/` live underneath
    pub root_folder: PathBuf,
    /// HTTP listen port
    pub port: u16,
    /// Optional explicit TrueType font path for certificate stamping
    pub font_path: Option<PathBuf>,
}

/// Root folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_root_folder(cli_arg: Option<&str>, env_var_name: &str) -> Result<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Ok(PathBuf::from(path));
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.is_empty() {
            return Ok(PathBuf::from(path));
        }
    }

    // Priority 3: TOML config file
    if let Ok(config_path) = locate_config_file() {
        if let Ok(toml_content) = std::fs::read_to_string(&config_path) {
            if let Ok(config) = toml::from_str::<toml::Value>(&toml_content) {
                if let Some(root_folder) = config.get("root_folder").and_then(|v| v.as_str()) {
                    return Ok(PathBuf::from(root_folder));
                }
            }
        }
    }

    // Priority 4: OS-dependent compiled default
    Ok(default_root_folder())
}

/// Get default configuration file path for the platform
fn locate_config_file() -> Result<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("certgen").join("config.toml"));

    if let Some(path) = user_config {
        if path.exists() {
            return Ok(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/certgen/config.toml");
        if system_config.exists() {
            return Ok(system_config);
        }
    }

    Err(Error::Config("No config file found".to_string()))
}

/// Get OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("certgen"))
        .unwrap_or_else(|| PathBuf::from("./certgen_data"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_argument_wins() {
        let root = resolve_root_folder(Some("/tmp/certgen-test"), "CERTGEN_TEST_UNSET").unwrap();
        assert_eq!(root, PathBuf::from("/tmp/certgen-test"));
    }

    #[test]
    fn env_var_used_when_no_cli_arg() {
        std::env::set_var("CERTGEN_TEST_ROOT_A", "/tmp/certgen-env");
        let root = resolve_root_folder(None, "CERTGEN_TEST_ROOT_A").unwrap();
        assert_eq!(root, PathBuf::from("/tmp/certgen-env"));
        std::env::remove_var("CERTGEN_TEST_ROOT_A");
    }

    #[test]
    fn fallback_is_non_empty() {
        let root = resolve_root_folder(None, "CERTGEN_TEST_UNSET_B").unwrap();
        assert!(!root.as_os_str().is_empty());
    }
}
