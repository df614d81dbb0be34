//! Workspace discovery
//!
//! Finds the Java sources of a checkout. Source roots come from the config
//! and from a `build-info` document (`{"sourcePaths": [...], "classPaths": [...]}`),
//! read from a file or printed by a command.

use deprecheck_core::Config;
use deprecheck_java::{JavaParser, ParseError, SourceUnit};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Command;
use walkdir::WalkDir;

/// Build information describing where sources live
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildInfo {
    /// Source roots, relative to the workspace root
    #[serde(default)]
    pub source_paths: Vec<PathBuf>,

    /// Compiled dependencies; recorded but not indexed
    #[serde(default)]
    pub class_paths: Vec<PathBuf>,
}

impl BuildInfo {
    pub fn from_json(json: &str) -> Result<Self, WorkspaceError> {
        serde_json::from_str(json).map_err(|e| WorkspaceError::BuildInfo(e.to_string()))
    }

    pub fn from_file(path: &Path) -> Result<Self, WorkspaceError> {
        let contents = std::fs::read_to_string(path).map_err(|e| WorkspaceError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        Self::from_json(&contents)
    }

    /// Run `command` in `cwd` and parse what it prints
    pub fn from_command(command: &[String], cwd: &Path) -> Result<Self, WorkspaceError> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| WorkspaceError::Command("empty build-info command".to_string()))?;

        tracing::debug!(program = %program, ?args, "Running build-info command");
        let output = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .output()
            .map_err(|e| WorkspaceError::Command(format!("{}: {}", program, e)))?;

        if !output.status.success() {
            return Err(WorkspaceError::Command(format!(
                "{} exited with {}: {}",
                program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Self::from_json(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Workspace errors
#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    #[error("Invalid build info: {0}")]
    BuildInfo(String),

    #[error("Build info command failed: {0}")]
    Command(String),

    #[error("Failed to read {}: {message}", path.display())]
    Io { path: PathBuf, message: String },
}

/// The Java files of a workspace
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    source_roots: Vec<PathBuf>,
    class_paths: Vec<PathBuf>,
    files: Vec<PathBuf>,
}

impl Workspace {
    /// Discover source roots and Java files for a configuration
    ///
    /// With no source roots configured anywhere, the whole project root is
    /// searched.
    pub fn discover(config: &Config) -> Result<Self, WorkspaceError> {
        let root = config.project_root.clone();
        let settings = &config.workspace;

        let mut source_paths = settings.source_paths.clone();
        let mut class_paths = Vec::new();

        let build_info = match (&settings.build_info_file, settings.build_info_command.is_empty()) {
            (Some(file), _) => Some(BuildInfo::from_file(&root.join(file))?),
            (None, false) => Some(BuildInfo::from_command(&settings.build_info_command, &root)?),
            (None, true) => None,
        };
        if let Some(info) = build_info {
            source_paths.extend(info.source_paths);
            class_paths = info.class_paths;
        }

        let mut source_roots: Vec<PathBuf> = Vec::new();
        for path in source_paths {
            let path = root.join(path);
            if !source_roots.contains(&path) {
                source_roots.push(path);
            }
        }
        if source_roots.is_empty() {
            source_roots.push(root.clone());
        }

        let mut files = Vec::new();
        for source_root in &source_roots {
            if !source_root.exists() {
                tracing::warn!(path = %source_root.display(), "Source root does not exist");
                continue;
            }

            for entry in WalkDir::new(source_root)
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let path = entry.path();
                if !entry.file_type().is_file() || path.extension().map_or(true, |ext| ext != "java") {
                    continue;
                }
                if settings.is_excluded(&relative(&root, path)) {
                    tracing::trace!(path = %path.display(), "Excluded");
                    continue;
                }
                files.push(path.to_path_buf());
            }
        }
        files.sort();
        files.dedup();

        tracing::debug!(roots = source_roots.len(), files = files.len(), "Workspace discovered");
        Ok(Self {
            root,
            source_roots,
            class_paths,
            files,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn source_roots(&self) -> &[PathBuf] {
        &self.source_roots
    }

    pub fn class_paths(&self) -> &[PathBuf] {
        &self.class_paths
    }

    /// Java files, sorted
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Path relative to the workspace root, `/`-separated
    pub fn relative_path(&self, path: &Path) -> String {
        relative(&self.root, path)
    }

    /// Parse every file; failures are returned next to the parsed units
    pub fn load_units(&self, parser: &JavaParser) -> (Vec<SourceUnit>, Vec<ParseError>) {
        let mut units = Vec::with_capacity(self.files.len());
        let mut failures = Vec::new();

        for file in &self.files {
            match parser.parse_file(file) {
                Ok(unit) => units.push(unit),
                Err(err) => {
                    tracing::warn!(error = %err, "Failed to parse Java file");
                    failures.push(err);
                }
            }
        }

        (units, failures)
    }
}

fn relative(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn build_info_json() {
        let info = BuildInfo::from_json(
            r#"{"sourcePaths": ["chrome/java", "content/java"], "classPaths": ["third_party/android_sdk/android.jar"]}"#,
        )
        .unwrap();
        assert_eq!(info.source_paths, vec![PathBuf::from("chrome/java"), PathBuf::from("content/java")]);
        assert_eq!(info.class_paths.len(), 1);
    }

    #[test]
    fn build_info_fields_are_optional() {
        assert_eq!(BuildInfo::from_json("{}").unwrap(), BuildInfo::default());
        assert!(matches!(BuildInfo::from_json("[1, 2]"), Err(WorkspaceError::BuildInfo(_))));
    }

    #[test]
    fn empty_command_is_an_error() {
        assert!(matches!(
            BuildInfo::from_command(&[], Path::new(".")),
            Err(WorkspaceError::Command(_))
        ));
    }

    #[test]
    fn relative_paths_use_forward_slashes() {
        assert_eq!(
            relative(Path::new("/src"), Path::new("/src/chrome/java/Browser.java")),
            "chrome/java/Browser.java"
        );
    }
}
