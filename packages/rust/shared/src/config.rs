//! Application configuration for mdexamples.
//!
//! User config lives at `~/.mdexamples/mdexamples.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{MdExamplesError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "mdexamples.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".mdexamples";

/// Placeholder in [`EmitConfig::run_command`] replaced by the snippet filename.
pub const SNIPPET_PLACEHOLDER: &str = "{snippet}";

// ---------------------------------------------------------------------------
// Config structs (matching mdexamples.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Fence tags recognised for each dialect.
    #[serde(default)]
    pub dialects: DialectsConfig,

    /// Bundle emission settings.
    #[serde(default)]
    pub emit: EmitConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Directory bundles are written into.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Sidecar JSON mapping example ids to sections.
    #[serde(default = "default_sections_file")]
    pub sections_file: String,

    /// Reserved document name that is never converted.
    #[serde(default = "default_index_document")]
    pub index_document: String,

    /// Extension of source documents (without the dot).
    #[serde(default = "default_source_extension")]
    pub source_extension: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            sections_file: default_sections_file(),
            index_document: default_index_document(),
            source_extension: default_source_extension(),
        }
    }
}

fn default_output_dir() -> String {
    "examples".into()
}
fn default_sections_file() -> String {
    "data/sections.json".into()
}
fn default_index_document() -> String {
    "index.md".into()
}
fn default_source_extension() -> String {
    "md".into()
}

/// `[dialects]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialectsConfig {
    /// Fence tags treated as snippet code.
    #[serde(default = "default_snippet_tags")]
    pub snippet_tags: Vec<String>,

    /// Fence tags treated as shell commands.
    #[serde(default = "default_command_tags")]
    pub command_tags: Vec<String>,
}

impl Default for DialectsConfig {
    fn default() -> Self {
        Self {
            snippet_tags: default_snippet_tags(),
            command_tags: default_command_tags(),
        }
    }
}

fn default_snippet_tags() -> Vec<String> {
    vec!["python".into()]
}
fn default_command_tags() -> Vec<String> {
    vec!["bash".into(), "shell".into()]
}

/// `[emit]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmitConfig {
    /// Extension of the generated snippet file.
    #[serde(default = "default_snippet_extension")]
    pub snippet_extension: String,

    /// Extension of the generated shell file.
    #[serde(default = "default_command_extension")]
    pub command_extension: String,

    /// Install command used when a document has no command fences.
    #[serde(default = "default_install_command")]
    pub install_command: String,

    /// Run command used when a document has no command fences.
    /// `{snippet}` is replaced by the snippet filename.
    #[serde(default = "default_run_command")]
    pub run_command: String,

    /// Link written when a document contains no links.
    #[serde(default = "default_link")]
    pub default_link: String,
}

impl Default for EmitConfig {
    fn default() -> Self {
        Self {
            snippet_extension: default_snippet_extension(),
            command_extension: default_command_extension(),
            install_command: default_install_command(),
            run_command: default_run_command(),
            default_link: default_link(),
        }
    }
}

fn default_snippet_extension() -> String {
    "snippet".into()
}
fn default_command_extension() -> String {
    "cmd".into()
}
fn default_install_command() -> String {
    "pip install instructor pydantic".into()
}
fn default_run_command() -> String {
    format!("python {SNIPPET_PLACEHOLDER}")
}
fn default_link() -> String {
    "https://github.com/jxnl/instructor".into()
}

// ---------------------------------------------------------------------------
// Convert config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime conversion configuration: merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    /// Root directory for bundle output.
    pub output_dir: PathBuf,
    /// Section map sidecar path.
    pub sections_file: PathBuf,
    /// Reserved document name that is skipped.
    pub index_document: String,
    /// Extension of candidate documents.
    pub source_extension: String,
    /// Snippet fence tags.
    pub snippet_tags: Vec<String>,
    /// Command fence tags.
    pub command_tags: Vec<String>,
    /// Emission settings.
    pub emit: EmitConfig,
}

impl From<&AppConfig> for ConvertConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            output_dir: PathBuf::from(&config.defaults.output_dir),
            sections_file: PathBuf::from(&config.defaults.sections_file),
            index_document: config.defaults.index_document.clone(),
            source_extension: config.defaults.source_extension.clone(),
            snippet_tags: config.dialects.snippet_tags.clone(),
            command_tags: config.dialects.command_tags.clone(),
            emit: config.emit.clone(),
        }
    }
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl ConvertConfig {
    /// Check that the merged config can drive a conversion.
    pub fn validate(&self) -> Result<()> {
        if self.snippet_tags.is_empty() {
            return Err(MdExamplesError::config("dialects.snippet_tags must not be empty"));
        }
        if self.command_tags.is_empty() {
            return Err(MdExamplesError::config("dialects.command_tags must not be empty"));
        }
        if let Some(tag) = self
            .snippet_tags
            .iter()
            .find(|t| self.command_tags.contains(t))
        {
            return Err(MdExamplesError::config(format!(
                "fence tag '{tag}' is configured for both dialects"
            )));
        }
        if self.emit.snippet_extension == self.emit.command_extension {
            return Err(MdExamplesError::config(
                "emit.snippet_extension and emit.command_extension must differ",
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.mdexamples/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| MdExamplesError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.mdexamples/mdexamples.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| MdExamplesError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        MdExamplesError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| MdExamplesError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| MdExamplesError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| MdExamplesError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
