use crate::core::exclusion::ExclusionRuleSet;
use crate::domain::errors::ConfigError;
use crate::domain::models::{CONFIG_FILE_NAME, IGNORE_FILE_NAME, PathEntry, ProjectConfig};
use log::{debug, info};
use std::fs;
use std::io::Read;
use std::path::{Component, Path};

const DEFAULT_CONFIG: &str = r#"# --- mkaireadme Configuration ---
# Use this file to guide the AI and fine-tune your README generation.

# project_goals: Describe the main purpose and vision of your project.
project_goals: ""

# custom_instructions: Specific instructions for the AI.
# For example: "Emphasize the real-time features."
custom_instructions: ""

# license: A short license notice to mention in the README, e.g. "MIT".
license: ""

# exclude: Glob patterns for files/directories to leave out of the analysis,
# in addition to your .gitignore file.
exclude: []
"#;

fn relative_segments(path: &Path, root: &Path) -> Vec<String> {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect()
}

/// Snapshots every non-excluded entry under `root`, in file-name order.
///
/// Excluded directories are pruned without being descended into. Entries the
/// walker cannot stat are skipped.
pub fn scan_project(root: &Path, rules: &ExclusionRuleSet) -> anyhow::Result<Vec<PathEntry>> {
    info!("Scanning project tree in: {}", root.display());
    if !root.is_dir() {
        anyhow::bail!("{} is not a directory", root.display());
    }

    let mut entries = Vec::new();
    let mut scanned = 0usize;

    for entry in walkdir::WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            let relative = relative_segments(e.path(), root).join("/");
            let excluded = rules.is_excluded(&relative, e.file_type().is_dir());
            if excluded {
                debug!("Excluded: {}", relative);
            }
            !excluded
        })
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        scanned += 1;

        let file_type = entry.file_type();
        if file_type.is_symlink() {
            continue;
        }

        let path = entry.path();
        let size_bytes = if file_type.is_file() {
            entry.metadata().map(|m| m.len()).unwrap_or(0)
        } else {
            0
        };

        entries.push(PathEntry {
            relative_path: relative_segments(path, root),
            is_dir: file_type.is_dir(),
            size_bytes,
            extension: path
                .extension()
                .and_then(|e| e.to_str())
                .map(str::to_string),
        });
    }

    info!("Scan complete: {} entries kept of {} visited", entries.len(), scanned);
    Ok(entries)
}

pub fn read_file_contents(path: &Path) -> anyhow::Result<String> {
    if !path.is_file() {
        anyhow::bail!("Not a file: {}", path.display());
    }
    if path.metadata()?.len() == 0 {
        debug!("File is empty: {}", path.display());
        return Ok(String::new());
    }

    debug!("Reading file contents: {}", path.display());
    let mut file = fs::File::open(path)?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;
    debug!("Read {} bytes from file", contents.len());
    Ok(contents)
}

/// Raw lines of the project's `.gitignore`, in file order.
pub fn load_ignore_lines(root: &Path) -> Result<Vec<String>, ConfigError> {
    let gitignore_path = root.join(IGNORE_FILE_NAME);
    if !gitignore_path.is_file() {
        debug!("No .gitignore file found at: {}", gitignore_path.display());
        return Ok(Vec::new());
    }

    debug!("Parsing .gitignore file at: {}", gitignore_path.display());
    let content = fs::read_to_string(&gitignore_path).map_err(|source| ConfigError::Io {
        path: gitignore_path.clone(),
        source,
    })?;

    let lines: Vec<String> = content.lines().map(str::to_string).collect();
    info!("Loaded {} lines from .gitignore", lines.len());
    Ok(lines)
}

pub fn load_project_config(root: &Path) -> Result<ProjectConfig, ConfigError> {
    let config_path = root.join(CONFIG_FILE_NAME);
    if !config_path.is_file() {
        debug!("No config file found at: {}", config_path.display());
        return Ok(ProjectConfig::default());
    }

    debug!("Loading config from {}", config_path.display());
    let content = fs::read_to_string(&config_path).map_err(|source| ConfigError::Io {
        path: config_path.clone(),
        source,
    })?;
    if content.trim().is_empty() {
        return Ok(ProjectConfig::default());
    }

    let mut config: ProjectConfig =
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: config_path,
            source,
        })?;
    config.exclude.retain(|pattern| !pattern.trim().is_empty());
    Ok(config)
}

/// Writes the commented default config. Returns `false` if one already exists.
pub fn write_default_config(root: &Path) -> anyhow::Result<bool> {
    let config_path = root.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        debug!("Config already exists at {}", config_path.display());
        return Ok(false);
    }
    fs::write(&config_path, DEFAULT_CONFIG)?;
    info!("Created config at {}", config_path.display());
    Ok(true)
}
