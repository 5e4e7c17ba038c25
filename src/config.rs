use anyhow::{Context, Result};
use log::debug;
use std::path::{Path, PathBuf};

use crate::registry::TemplateConfig;

/// Environment variable overriding the config directory
pub const CONFIG_DIR_ENV: &str = "SEQPROBE_CONFIG_DIR";
/// Default template configuration file name
pub const TEMPLATES_FILE: &str = "templates.json";
/// Default log file name
pub const LOG_FILE: &str = "seqprobe.log";

/// Configuration for overriding default application paths
#[derive(Debug, Clone)]
pub struct PathConfig {
    /// Custom config directory (from CLI or ENV)
    pub config_dir: Option<PathBuf>,
}

impl PathConfig {
    /// Create PathConfig from CLI arguments and environment variables
    ///
    /// Priority: CLI args → ENV var (SEQPROBE_CONFIG_DIR) → None (use defaults)
    pub fn from_env_and_cli(cli_dir: Option<PathBuf>) -> Self {
        Self::resolve(cli_dir, std::env::var_os(CONFIG_DIR_ENV).map(PathBuf::from))
    }

    fn resolve(cli_dir: Option<PathBuf>, env_dir: Option<PathBuf>) -> Self {
        Self {
            config_dir: cli_dir.or(env_dir),
        }
    }
}

/// Get path to a configuration file
///
/// Priority:
/// 1. CLI --config-dir argument
/// 2. SEQPROBE_CONFIG_DIR environment variable
/// 3. Local folder IF any config files exist (templates.json, seqprobe.log)
/// 4. Platform-specific config directory from dirs-next (default)
///
/// Platform paths:
/// - Linux: ~/.config/seqprobe/{name}
/// - macOS: ~/Library/Application Support/seqprobe/{name}
/// - Windows: %APPDATA%\seqprobe\{name}
pub fn config_file(name: &str, config: &PathConfig) -> PathBuf {
    get_config_dir(config).join(name)
}

/// Get path to a data file (logs)
///
/// Same priority as [`config_file`], falling back to the platform data
/// directory (~/.local/share/seqprobe on Linux).
pub fn data_file(name: &str, config: &PathConfig) -> PathBuf {
    get_data_dir(config).join(name)
}

/// Ensure that configuration and data directories exist
pub fn ensure_dirs(config: &PathConfig) -> Result<()> {
    let config_dir = get_config_dir(config);
    let data_dir = get_data_dir(config);

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)
            .with_context(|| format!("Failed to create config directory: {}", config_dir.display()))?;
    }

    if data_dir != config_dir && !data_dir.exists() {
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
    }

    Ok(())
}

/// Load a template configuration file
pub fn load_templates(path: &Path) -> Result<TemplateConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read templates: {}", path.display()))?;
    let config: TemplateConfig = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse templates: {}", path.display()))?;
    debug!(
        "Templates {}: {} keys, {} paths",
        path.display(),
        config.keys.len(),
        config.paths.len()
    );
    Ok(config)
}

/// Template file to use: explicit path, else the default one if it exists
pub fn templates_path(explicit: Option<&Path>, config: &PathConfig) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => Some(config_file(TEMPLATES_FILE, config)).filter(|p| p.is_file()),
    }
}

/// Check if any config files exist in the given directory
fn has_local_config_files(dir: &Path) -> bool {
    [TEMPLATES_FILE, LOG_FILE].iter().any(|f| dir.join(f).exists())
}

/// Local folder if it holds config files
fn local_dir() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .filter(|dir| has_local_config_files(dir))
}

/// Get the configuration directory
fn get_config_dir(config: &PathConfig) -> PathBuf {
    if let Some(dir) = &config.config_dir {
        return dir.clone();
    }
    if let Some(dir) = local_dir() {
        return dir;
    }
    if let Some(dir) = dirs_next::config_dir() {
        return dir.join("seqprobe");
    }
    PathBuf::from(".")
}

/// Get the data directory
fn get_data_dir(config: &PathConfig) -> PathBuf {
    if let Some(dir) = &config.config_dir {
        return dir.clone();
    }
    if let Some(dir) = local_dir() {
        return dir;
    }
    if let Some(dir) = dirs_next::data_dir() {
        return dir.join("seqprobe");
    }
    PathBuf::from(".")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_cli_beats_env() {
        let config = PathConfig::resolve(Some("/cli".into()), Some("/env".into()));
        assert_eq!(config.config_dir, Some(PathBuf::from("/cli")));

        let config = PathConfig::resolve(None, Some("/env".into()));
        assert_eq!(config.config_dir, Some(PathBuf::from("/env")));
    }

    #[test]
    fn test_config_file_with_custom_dir() {
        let config = PathConfig {
            config_dir: Some(PathBuf::from("/custom")),
        };

        assert_eq!(config_file("test.json", &config), PathBuf::from("/custom/test.json"));
        assert_eq!(data_file(LOG_FILE, &config), PathBuf::from("/custom/seqprobe.log"));
    }

    #[test]
    fn test_config_file_uses_platform_defaults() {
        let config = PathConfig { config_dir: None };

        let path = config_file(TEMPLATES_FILE, &config);
        assert!(path.ends_with(TEMPLATES_FILE));
    }

    #[test]
    fn test_ensure_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested").join("cfg");
        let config = PathConfig {
            config_dir: Some(dir.clone()),
        };

        ensure_dirs(&config).unwrap();
        assert!(dir.is_dir());
    }

    #[test]
    fn test_templates_path() {
        let tmp = tempfile::tempdir().unwrap();
        let config = PathConfig {
            config_dir: Some(tmp.path().to_path_buf()),
        };

        assert_eq!(templates_path(None, &config), None);
        assert_eq!(
            templates_path(Some(Path::new("/x/t.json")), &config),
            Some(PathBuf::from("/x/t.json"))
        );

        fs::write(tmp.path().join(TEMPLATES_FILE), "{}").unwrap();
        assert_eq!(templates_path(None, &config), Some(tmp.path().join(TEMPLATES_FILE)));
    }

    #[test]
    fn test_load_templates() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(TEMPLATES_FILE);
        fs::write(
            &path,
            r#"{"keys": {"SEQ": {"type": "sequence"}}, "paths": {"plate": "/p/plate.{SEQ}.exr"}}"#,
        )
        .unwrap();

        let config = load_templates(&path).unwrap();
        assert_eq!(config.paths.len(), 1);
        assert!(config.roots.is_empty());

        fs::write(&path, "{not json").unwrap();
        let err = load_templates(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse templates"));

        let err = load_templates(&tmp.path().join("missing.json")).unwrap_err();
        assert!(err.to_string().starts_with("Failed to read templates"));
    }
}
