//! Application configuration for kmimport.
//!
//! User config lives at `~/.kmimport/kmimport.toml`.
//! CLI flags override config file values, which override defaults.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ImportError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "kmimport.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".kmimport";

/// Matches a compact IRI (`prefix:local`). The local part must not start with
/// `//`, so absolute IRIs such as `http://...` are never split.
static CURIE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z][A-Za-z0-9_.-]*):((?:[^/].*)?|/(?:[^/].*)?)$").expect("curie regex")
});

// ---------------------------------------------------------------------------
// Config structs (matching kmimport.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Annotation keys that carry the RDF mapping.
    #[serde(default)]
    pub annotations: AnnotationsConfig,

    /// Namespace prefixes used to expand compact annotation values.
    #[serde(default)]
    pub prefixes: BTreeMap<String, String>,

    /// Replies output settings.
    #[serde(default)]
    pub output: OutputConfig,
}

/// `[annotations]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotationsConfig {
    /// Key naming the RDF class of a list question's items.
    #[serde(default = "default_type_key")]
    pub type_key: String,

    /// Key naming the RDF property a question reads.
    #[serde(default = "default_property_key")]
    pub property_key: String,

    /// Key naming the RDF value an answer or choice stands for.
    #[serde(default = "default_value_key")]
    pub value_key: String,
}

impl Default for AnnotationsConfig {
    fn default() -> Self {
        Self {
            type_key: default_type_key(),
            property_key: default_property_key(),
            value_key: default_value_key(),
        }
    }
}

fn default_type_key() -> String {
    "rdfType".into()
}
fn default_property_key() -> String {
    "rdfProperty".into()
}
fn default_value_key() -> String {
    "rdfValue".into()
}

/// `[output]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Pretty-print the replies JSON.
    #[serde(default = "default_true")]
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { pretty: true }
    }
}

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Crawl config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime crawl configuration, derived from the config file.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Annotation key for the item class of list questions.
    pub type_key: String,
    /// Annotation key for the property read by a question.
    pub property_key: String,
    /// Annotation key for the value of an answer or choice.
    pub value_key: String,
    /// Prefix → namespace IRI.
    pub prefixes: BTreeMap<String, String>,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for CrawlConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            type_key: config.annotations.type_key.clone(),
            property_key: config.annotations.property_key.clone(),
            value_key: config.annotations.value_key.clone(),
            prefixes: config.prefixes.clone(),
        }
    }
}

impl CrawlConfig {
    /// Expand `prefix:local` into a full IRI when `prefix` is registered.
    /// Anything else is returned unchanged.
    pub fn expand(&self, value: &str) -> String {
        if self.prefixes.is_empty() {
            return value.to_string();
        }
        match CURIE_RE.captures(value) {
            Some(caps) => match self.prefixes.get(&caps[1]) {
                Some(namespace) => format!("{namespace}{}", &caps[2]),
                None => value.to_string(),
            },
            None => value.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.kmimport/`).
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| ImportError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.kmimport/kmimport.toml`).
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
    let content = std::fs::read_to_string(path).map_err(|e| ImportError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content)
        .map_err(|e| ImportError::config(format!("failed to parse {}: {e}", path.display())))?;
    validate_config(&config)?;
    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| ImportError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| ImportError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| ImportError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Reject configs whose annotation keys are blank or collide.
pub fn validate_config(config: &AppConfig) -> Result<()> {
    let keys = &config.annotations;
    for (name, key) in [
        ("type_key", &keys.type_key),
        ("property_key", &keys.property_key),
        ("value_key", &keys.value_key),
    ] {
        if key.trim().is_empty() {
            return Err(ImportError::config(format!("annotations.{name} must not be empty")));
        }
    }
    if keys.type_key == keys.property_key
        || keys.type_key == keys.value_key
        || keys.property_key == keys.value_key
    {
        return Err(ImportError::config("annotation keys must be distinct"));
    }
    Ok(())
}
