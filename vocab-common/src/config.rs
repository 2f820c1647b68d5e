//! Configuration loading and root folder resolution
//!
//! Settings are resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. OS-dependent compiled default (fallback)
//!
//! A missing or unreadable TOML file is never fatal: a warning is logged and
//! compiled defaults are used instead.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable naming the root folder (database location)
pub const ENV_ROOT_FOLDER: &str = "VOCAB_ROOT_FOLDER";

/// Environment variable carrying the Gemini API key
pub const ENV_GEMINI_API_KEY: &str = "GEMINI_API_KEY";

/// Environment variable carrying the Google Cloud Text-to-Speech API key
pub const ENV_TTS_API_KEY: &str = "GOOGLE_TTS_API_KEY";

/// Database file name inside the root folder
pub const DATABASE_FILE_NAME: &str = "vocab.db";

/// Default HTTP port for the drill tracker server
pub const DEFAULT_PORT: u16 = 5730;

/// Compiled-in defaults used when nothing else is configured
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub root_folder: PathBuf,
    pub port: u16,
    pub log_level: String,
}

impl CompiledDefaults {
    /// Defaults for the platform this binary was built for
    pub fn for_current_platform() -> Self {
        Self {
            root_folder: default_root_folder(),
            port: DEFAULT_PORT,
            log_level: default_log_level(),
        }
    }
}

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Folder holding `vocab.db`
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    /// HTTP server port
    #[serde(default)]
    pub port: Option<u16>,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub translation: TranslationConfig,

    #[serde(default)]
    pub tts: TtsConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Translation provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationConfig {
    /// Gemini API key; the Gemini provider is skipped when unset
    #[serde(default)]
    pub gemini_api_key: Option<String>,

    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,

    #[serde(default = "default_libretranslate_url")]
    pub libretranslate_url: String,

    #[serde(default = "default_mymemory_url")]
    pub mymemory_url: String,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            gemini_model: default_gemini_model(),
            libretranslate_url: default_libretranslate_url(),
            mymemory_url: default_mymemory_url(),
        }
    }
}

/// Text-to-speech configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TtsConfig {
    /// Google Cloud API key; speech synthesis answers 500 when unset
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_tts_endpoint")]
    pub endpoint: String,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: default_tts_endpoint(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_gemini_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_libretranslate_url() -> String {
    "https://libretranslate.de/translate".to_string()
}

fn default_mymemory_url() -> String {
    "https://api.mymemory.translated.net/get".to_string()
}

fn default_tts_endpoint() -> String {
    "https://texttospeech.googleapis.com/v1/text:synthesize".to_string()
}

impl TomlConfig {
    /// Parse a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        Self::parse(&content)
    }

    /// Parse TOML text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }

    /// Load the explicit file if given, else the platform config file.
    ///
    /// Never fails: problems are logged and defaults returned.
    pub fn load_or_default(explicit: Option<&Path>) -> Self {
        let path = match explicit {
            Some(p) => Some(p.to_path_buf()),
            None => default_config_path(),
        };

        let Some(path) = path else {
            debug!("No config file found, using compiled defaults");
            return Self::default();
        };

        match Self::load(&path) {
            Ok(config) => {
                debug!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                warn!("{} (using compiled defaults)", e);
                Self::default()
            }
        }
    }

    /// Environment variables win over TOML for secrets
    pub fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var(ENV_GEMINI_API_KEY) {
            if is_valid_key(&key) {
                self.translation.gemini_api_key = Some(key);
            }
        }
        if let Ok(key) = std::env::var(ENV_TTS_API_KEY) {
            if is_valid_key(&key) {
                self.tts.api_key = Some(key);
            }
        }
    }
}

/// API key validation (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Resolves the root folder following the documented priority order
#[derive(Debug, Clone)]
pub struct RootFolderResolver {
    module_name: String,
    cli_arg: Option<PathBuf>,
    toml_root: Option<PathBuf>,
}

impl RootFolderResolver {
    pub fn new(module_name: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
            cli_arg: None,
            toml_root: None,
        }
    }

    /// Command-line `--root-folder` value
    pub fn with_cli_arg(mut self, path: Option<PathBuf>) -> Self {
        self.cli_arg = path;
        self
    }

    /// `root_folder` from the loaded TOML config
    pub fn with_toml_root(mut self, path: Option<PathBuf>) -> Self {
        self.toml_root = path;
        self
    }

    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.cli_arg {
            debug!("[{}] root folder from command line", self.module_name);
            return path.clone();
        }

        if let Ok(path) = std::env::var(ENV_ROOT_FOLDER) {
            if !path.trim().is_empty() {
                debug!("[{}] root folder from {}", self.module_name, ENV_ROOT_FOLDER);
                return PathBuf::from(path);
            }
        }

        if let Some(path) = &self.toml_root {
            debug!("[{}] root folder from TOML config", self.module_name);
            return path.clone();
        }

        CompiledDefaults::for_current_platform().root_folder
    }
}

/// Prepares the root folder on disk
#[derive(Debug, Clone)]
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    pub fn root_folder(&self) -> &Path {
        &self.root_folder
    }

    /// Create the root folder if missing
    pub fn ensure_directory_exists(&self) -> Result<()> {
        if !self.root_folder.exists() {
            std::fs::create_dir_all(&self.root_folder)?;
            warn!("Created root folder: {}", self.root_folder.display());
        }
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE_NAME)
    }
}

/// Platform config file: `~/.config/vocab/config.toml`, then `/etc/vocab/config.toml` on Linux
pub fn default_config_path() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("vocab").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/vocab/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Get OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/vocab
        dirs::data_local_dir()
            .map(|d| d.join("vocab"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/vocab"))
    } else if cfg!(target_os = "macos") {
        // ~/Library/Application Support/vocab
        dirs::data_dir()
            .map(|d| d.join("vocab"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/vocab"))
    } else if cfg!(target_os = "windows") {
        // %LOCALAPPDATA%\vocab
        dirs::data_local_dir()
            .map(|d| d.join("vocab"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\vocab"))
    } else {
        PathBuf::from("./vocab_data")
    }
}
