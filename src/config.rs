//! Configuration for the locator and grounding commands.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (QUOTE_ANCHOR_THRESHOLD, QUOTE_ANCHOR_GAP_FACTOR,
//!    QUOTE_ANCHOR_MAX_SOURCE_CHARS)
//! 2. Config file (.quote-anchor/config.yaml)
//! 3. Defaults
//!
//! Config file discovery:
//! - Searches current directory and parents for .quote-anchor/config.yaml
//! - Falls back to the user config dir (e.g. ~/.config/quote-anchor/config.yaml)

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::evidence::DEFAULT_ANCHOR_WINDOW;
use crate::locate::LocateOptions;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

/// Directory holding the project config file
pub const CONFIG_DIR: &str = ".quote-anchor";

/// Default source length guard for the CLI, in chars
pub const DEFAULT_MAX_SOURCE_CHARS: usize = 1_000_000;

pub const ENV_THRESHOLD: &str = "QUOTE_ANCHOR_THRESHOLD";
pub const ENV_GAP_FACTOR: &str = "QUOTE_ANCHOR_GAP_FACTOR";
pub const ENV_MAX_SOURCE_CHARS: &str = "QUOTE_ANCHOR_MAX_SOURCE_CHARS";

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub locator: LocatorConfig,
    #[serde(default)]
    pub grounding: Option<GroundingConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocatorConfig {
    pub typo_threshold: Option<f64>,
    pub gap_factor: Option<usize>,
    pub min_fuzzy_words: Option<usize>,
    pub max_source_chars: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GroundingConfig {
    /// Bytes of context stored with each span (0 disables)
    pub anchor_window: Option<usize>,
}

/// Resolved configuration
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Locator settings
    pub locate: LocateOptions,
    /// Anchor text window for grounding records
    pub anchor_window: usize,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            locate: LocateOptions {
                max_source_chars: Some(DEFAULT_MAX_SOURCE_CHARS),
                ..Default::default()
            },
            anchor_window: DEFAULT_ANCHOR_WINDOW,
            config_file: None,
        }
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let start = std::env::current_dir().ok()?;
    let user_dir = dirs::config_dir().map(|dir| dir.join("quote-anchor"));
    search_config_file(start, user_dir.as_deref())
}

/// Search `start` and its parents, then `user_dir`, for a config file
fn search_config_file(mut current: PathBuf, user_dir: Option<&Path>) -> Option<PathBuf> {
    loop {
        let config_path = current.join(CONFIG_DIR).join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    let user_path = user_dir?.join("config.yaml");
    user_path.exists().then_some(user_path)
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Parse an environment override, if set
fn env_override<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("Invalid value for {}: {}", name, value)),
        None => Ok(None),
    }
}

/// Merge config file and environment over the defaults
fn resolve(
    file: Option<(PathBuf, ConfigFile)>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<ResolvedConfig> {
    let mut resolved = ResolvedConfig::default();

    if let Some((path, config)) = file {
        let locator = &config.locator;
        if let Some(threshold) = locator.typo_threshold {
            resolved.locate.typo_threshold = threshold;
        }
        if let Some(gap_factor) = locator.gap_factor {
            resolved.locate.gap_factor = gap_factor;
        }
        if let Some(min_words) = locator.min_fuzzy_words {
            resolved.locate.min_fuzzy_words = min_words;
        }
        if let Some(max_chars) = locator.max_source_chars {
            resolved.locate.max_source_chars = Some(max_chars);
        }
        if let Some(window) = config.grounding.as_ref().and_then(|g| g.anchor_window) {
            resolved.anchor_window = window;
        }
        resolved.config_file = Some(path);
    }

    if let Some(threshold) = env_override(&lookup, ENV_THRESHOLD)? {
        resolved.locate.typo_threshold = threshold;
    }
    if let Some(gap_factor) = env_override(&lookup, ENV_GAP_FACTOR)? {
        resolved.locate.gap_factor = gap_factor;
    }
    if let Some(max_chars) = env_override(&lookup, ENV_MAX_SOURCE_CHARS)? {
        resolved.locate.max_source_chars = Some(max_chars);
    }

    resolved
        .locate
        .validate()
        .context("Invalid locator configuration")?;

    Ok(resolved)
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let file = match find_config_file() {
        Some(path) => {
            let config = load_config_file(&path)?;
            Some((path, config))
        }
        None => None,
    };

    resolve(file, |name| std::env::var(name).ok())
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| format!("{:#}", e)));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Force reload configuration (useful for testing)
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn write_config(temp: &TempDir, body: &str) -> PathBuf {
        let dir = temp.path().join(CONFIG_DIR);
        std::fs::create_dir_all(&dir).unwrap();
        let config_path = dir.join("config.yaml");
        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "{}", body).unwrap();
        config_path
    }

    #[test]
    fn test_defaults_without_file() {
        let config = resolve(None, no_env).unwrap();
        assert_eq!(config.locate.typo_threshold, 0.8);
        assert_eq!(config.locate.gap_factor, 3);
        assert_eq!(config.locate.min_fuzzy_words, 1);
        assert_eq!(config.locate.max_source_chars, Some(DEFAULT_MAX_SOURCE_CHARS));
        assert_eq!(config.anchor_window, DEFAULT_ANCHOR_WINDOW);
        assert!(config.config_file.is_none());
    }

    #[test]
    fn test_config_file_parsing() {
        let temp = TempDir::new().unwrap();
        let config_path = write_config(
            &temp,
            r#"
version: "1.0"
locator:
  typo_threshold: 0.9
  gap_factor: 4
  min_fuzzy_words: 2
grounding:
  anchor_window: 120
"#,
        );

        let file = load_config_file(&config_path).unwrap();
        assert_eq!(file.version, "1.0");
        assert_eq!(file.locator.typo_threshold, Some(0.9));
        assert_eq!(file.locator.max_source_chars, None);

        let config = resolve(Some((config_path.clone(), file)), no_env).unwrap();
        assert_eq!(config.locate.typo_threshold, 0.9);
        assert_eq!(config.locate.gap_factor, 4);
        assert_eq!(config.locate.min_fuzzy_words, 2);
        assert_eq!(config.anchor_window, 120);
        assert_eq!(config.config_file, Some(config_path));
    }

    #[test]
    fn test_env_overrides_file() {
        let temp = TempDir::new().unwrap();
        let config_path = write_config(
            &temp,
            "version: \"1.0\"\nlocator:\n  typo_threshold: 0.9\n",
        );
        let file = load_config_file(&config_path).unwrap();

        let env: HashMap<&str, &str> = [(ENV_THRESHOLD, "0.75"), (ENV_MAX_SOURCE_CHARS, "500")]
            .into_iter()
            .collect();
        let config = resolve(Some((config_path, file)), |name| {
            env.get(name).map(|v| v.to_string())
        })
        .unwrap();

        assert_eq!(config.locate.typo_threshold, 0.75);
        assert_eq!(config.locate.max_source_chars, Some(500));
    }

    #[test]
    fn test_invalid_env_value() {
        let result = resolve(None, |name| {
            (name == ENV_GAP_FACTOR).then(|| "three".to_string())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_out_of_range_threshold_rejected() {
        let result = resolve(None, |name| (name == ENV_THRESHOLD).then(|| "1.2".to_string()));
        let err = result.unwrap_err();
        assert!(format!("{:#}", err).contains("Typo threshold"));
    }

    #[test]
    fn test_search_prefers_project_over_user_config() {
        let temp = TempDir::new().unwrap();
        let project_config = write_config(&temp, "version: \"1.0\"");
        let nested = temp.path().join("docs").join("2026");
        std::fs::create_dir_all(&nested).unwrap();

        let user_dir = temp.path().join("user");
        std::fs::create_dir_all(&user_dir).unwrap();
        std::fs::write(user_dir.join("config.yaml"), "version: \"1.0\"\n").unwrap();

        let found = search_config_file(nested, Some(user_dir.as_path()));
        assert_eq!(found, Some(project_config));
    }

    #[test]
    fn test_search_falls_back_to_user_config() {
        let project = TempDir::new().unwrap();
        let user = TempDir::new().unwrap();
        let user_config = user.path().join("config.yaml");

        // Nothing anywhere yet
        assert_eq!(search_config_file(project.path().to_path_buf(), Some(user.path())), None);
        assert_eq!(search_config_file(project.path().to_path_buf(), None), None);

        std::fs::write(&user_config, "version: \"1.0\"\nlocator:\n  gap_factor: 5\n").unwrap();
        let found = search_config_file(project.path().to_path_buf(), Some(user.path()));
        assert_eq!(found, Some(user_config.clone()));

        let file = load_config_file(&user_config).unwrap();
        let config = resolve(Some((user_config, file)), no_env).unwrap();
        assert_eq!(config.locate.gap_factor, 5);
    }

    #[test]
    fn test_malformed_config_file() {
        let temp = TempDir::new().unwrap();
        let config_path = write_config(&temp, "locator: [not, a, map]");
        assert!(load_config_file(&config_path).is_err());
    }
}
