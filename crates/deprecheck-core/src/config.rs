//! Configuration schema (deprecheck.toml)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::diagnostic::Severity;

/// Default config file name, looked up in the workspace root
pub const CONFIG_FILE_NAME: &str = "deprecheck.toml";

/// Where Java sources come from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Source roots relative to the workspace root
    #[serde(default)]
    pub source_paths: Vec<PathBuf>,

    /// JSON file in the `build-info` format (`{"sourcePaths": [...]}`)
    #[serde(default)]
    pub build_info_file: Option<PathBuf>,

    /// Command printing `build-info` JSON on stdout, run from the workspace root
    #[serde(default)]
    pub build_info_command: Vec<String>,

    /// Files to skip (glob patterns on paths relative to the workspace root)
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            source_paths: Vec::new(),
            build_info_file: None,
            build_info_command: Vec::new(),
            exclude: Vec::new(),
        }
    }
}

impl WorkspaceConfig {
    /// Check if a relative path is excluded
    pub fn is_excluded(&self, relative: &str) -> bool {
        self.exclude.iter().any(|pattern| glob_match(pattern, relative))
    }
}

/// Deprecation check settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeprecationConfig {
    /// Run the check at all
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Severity for deprecated usages (never escalated to error)
    #[serde(default = "default_severity")]
    pub severity: Severity,

    /// Qualified symbol names to stay quiet about (glob patterns)
    #[serde(default)]
    pub ignore: Vec<String>,
}

fn default_enabled() -> bool {
    true
}

fn default_severity() -> Severity {
    Severity::Warning
}

impl Default for DeprecationConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            severity: default_severity(),
            ignore: Vec::new(),
        }
    }
}

impl DeprecationConfig {
    /// Configured severity with `error` lowered to `warning`
    ///
    /// Deprecation is advisory; nothing about it is allowed to block.
    pub fn effective_severity(&self) -> Severity {
        match self.severity {
            Severity::Error => Severity::Warning,
            other => other,
        }
    }

    /// Check if diagnostics for a symbol are suppressed
    pub fn is_ignored(&self, qualified_name: &str) -> bool {
        self.ignore.iter().any(|pattern| glob_match(pattern, qualified_name))
    }
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub workspace: WorkspaceConfig,

    #[serde(default)]
    pub deprecation: DeprecationConfig,

    /// Workspace root (for resolving relative paths)
    #[serde(skip)]
    pub project_root: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workspace: WorkspaceConfig::default(),
            deprecation: DeprecationConfig::default(),
            project_root: std::env::current_dir().unwrap_or_default(),
        }
    }
}

impl Config {
    /// Load config from TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        let mut config = Self::from_toml(&contents)?;

        // Set project root to parent of config file
        if let Some(parent) = path.parent() {
            config.project_root = parent.to_path_buf();
        }

        Ok(config)
    }

    /// Load `deprecheck.toml` from `root`, or defaults rooted there if absent
    pub fn discover(root: &Path) -> Result<Self, ConfigError> {
        let path = root.join(CONFIG_FILE_NAME);
        if path.exists() {
            Self::from_file(&path)
        } else {
            Ok(Self {
                project_root: root.to_path_buf(),
                ..Self::default()
            })
        }
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml)
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Save config to TOML file
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let toml = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, toml)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }
}

/// Simple glob matching
///
/// `*` matches within one segment (no `/` or `.`), `**` matches anything.
pub fn glob_match(pattern: &str, text: &str) -> bool {
    fn matches(pattern: &[u8], text: &[u8]) -> bool {
        match pattern {
            [] => text.is_empty(),
            [b'*', b'*', b'/', rest @ ..] => (0..=text.len())
                .any(|i| (i == 0 || text[i - 1] == b'/') && matches(rest, &text[i..])),
            [b'*', b'*', rest @ ..] => (0..=text.len()).any(|i| matches(rest, &text[i..])),
            [b'*', rest @ ..] => {
                let mut i = 0;
                loop {
                    if matches(rest, &text[i..]) {
                        return true;
                    }
                    if i == text.len() || text[i] == b'/' || text[i] == b'.' {
                        return false;
                    }
                    i += 1;
                }
            }
            [c, rest @ ..] => text.first() == Some(c) && matches(rest, &text[1..]),
        }
    }

    matches(pattern.as_bytes(), text.as_bytes())
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),
}
