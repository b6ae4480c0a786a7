//! Configuration management for quill.
//!
//! Parses `quill.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories. Every section is
//! optional; a missing file yields the defaults.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `diagrams.kroki_url`
//! - `posts.author`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override rendering service URL.
    pub kroki_url: Option<String>,
    /// Override posts directory.
    pub posts_dir: Option<PathBuf>,
    /// Override default post author.
    pub author: Option<String>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "quill.toml";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Diagram rendering configuration.
    pub diagrams: DiagramsConfig,
    /// Lazy rendering (viewport gating) configuration.
    pub lazy: LazyConfig,
    /// Diagram text colors per color scheme.
    pub theme: ThemeConfig,
    /// Post scaffolding configuration (paths are relative strings from TOML).
    posts: PostsConfigRaw,

    /// Resolved posts configuration (set after loading).
    #[serde(skip)]
    pub posts_resolved: PostsConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Diagram rendering configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DiagramsConfig {
    /// Base URL of the Kroki-compatible rendering service.
    pub kroki_url: String,
    /// HTTP timeout in seconds for `quill check` probes.
    pub timeout_secs: u64,
}

impl DiagramsConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for DiagramsConfig {
    fn default() -> Self {
        Self {
            kroki_url: "https://kroki.io".to_owned(),
            timeout_secs: 30,
        }
    }
}

/// Viewport gating for deferred diagram rendering.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LazyConfig {
    /// Vertical pre-fetch margin in CSS pixels.
    pub root_margin_px: u32,
    /// Minimum visible fraction of a placeholder before it renders.
    pub threshold: f64,
}

impl Default for LazyConfig {
    fn default() -> Self {
        Self {
            root_margin_px: 50,
            threshold: 0.1,
        }
    }
}

/// Text colors applied to rendered diagrams.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PaletteConfig {
    /// Fill for ordinary diagram text.
    pub text: String,
    /// Fill for note text.
    pub note: String,
}

/// Palettes for both color schemes.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub light: PaletteConfig,
    pub dark: PaletteConfig,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            light: PaletteConfig {
                text: "#1f2937".to_owned(),
                note: "#374151".to_owned(),
            },
            dark: PaletteConfig {
                text: "#f9fafb".to_owned(),
                note: "#e5e7eb".to_owned(),
            },
        }
    }
}

impl Default for PaletteConfig {
    fn default() -> Self {
        ThemeConfig::default().light
    }
}

/// Raw posts configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct PostsConfigRaw {
    dir: Option<String>,
    templates_dir: Option<String>,
    author: Option<String>,
    template: Option<String>,
}

/// Resolved post scaffolding configuration with absolute paths.
#[derive(Debug, Default)]
pub struct PostsConfig {
    /// Directory new posts are written to.
    pub dir: PathBuf,
    /// Directory holding `<name>.md` post templates.
    pub templates_dir: PathBuf,
    /// Default author name.
    pub author: String,
    /// Default template name.
    pub template: String,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`diagrams.kroki_url`").
        field: String,
        /// Error message (e.g., "${`KROKI_URL`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

/// Require a `#rgb` or `#rrggbb` color.
fn require_hex_color(value: &str, field: &str) -> Result<(), ConfigError> {
    let valid = value
        .strip_prefix('#')
        .is_some_and(|hex| matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit()));
    if !valid {
        return Err(ConfigError::Validation(format!(
            "{field} must be a #rgb or #rrggbb color, got '{value}'"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `quill.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(kroki_url) = &settings.kroki_url {
            self.diagrams.kroki_url.clone_from(kroki_url);
        }
        if let Some(posts_dir) = &settings.posts_dir {
            self.posts_resolved.dir.clone_from(posts_dir);
        }
        if let Some(author) = &settings.author {
            self.posts_resolved.author.clone_from(author);
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        let mut config = Self {
            diagrams: DiagramsConfig::default(),
            lazy: LazyConfig::default(),
            theme: ThemeConfig::default(),
            posts: PostsConfigRaw::default(),
            posts_resolved: PostsConfig::default(),
            config_path: None,
        };
        config.resolve_paths(base);
        config
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file and after CLI overrides.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_diagrams()?;
        self.validate_lazy()?;
        self.validate_theme()?;
        Ok(())
    }

    fn validate_diagrams(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.diagrams.kroki_url, "diagrams.kroki_url")?;
        require_http_url(&self.diagrams.kroki_url, "diagrams.kroki_url")?;
        if self.diagrams.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "diagrams.timeout_secs must be greater than 0".to_owned(),
            ));
        }
        Ok(())
    }

    fn validate_lazy(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.lazy.threshold) {
            return Err(ConfigError::Validation(format!(
                "lazy.threshold must be between 0.0 and 1.0, got {}",
                self.lazy.threshold
            )));
        }
        Ok(())
    }

    fn validate_theme(&self) -> Result<(), ConfigError> {
        require_hex_color(&self.theme.light.text, "theme.light.text")?;
        require_hex_color(&self.theme.light.note, "theme.light.note")?;
        require_hex_color(&self.theme.dark.text, "theme.dark.text")?;
        require_hex_color(&self.theme.dark.note, "theme.dark.note")?;
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.diagrams.kroki_url = expand::expand_env(&self.diagrams.kroki_url, "diagrams.kroki_url")?;

        if let Some(ref author) = self.posts.author {
            self.posts.author = Some(expand::expand_env(author, "posts.author")?);
        }

        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let resolve = |path: Option<&str>, default: &str| config_dir.join(path.unwrap_or(default));

        self.posts_resolved = PostsConfig {
            dir: resolve(self.posts.dir.as_deref(), "_posts"),
            templates_dir: resolve(self.posts.templates_dir.as_deref(), "_templates"),
            author: self
                .posts
                .author
                .clone()
                .unwrap_or_else(|| "Anonymous".to_owned()),
            template: self
                .posts
                .template
                .clone()
                .unwrap_or_else(|| "default".to_owned()),
        };
    }
}
