use serde::{Deserialize, Deserializer};
use std::path::PathBuf;

pub const MARKER_START: &str = "<!-- AUTOGEN:START -->";
pub const MARKER_END: &str = "<!-- AUTOGEN:END -->";

pub const DEFAULT_DOCUMENT_NAME: &str = "README.md";
pub const CONFIG_FILE_NAME: &str = ".mkaireadme.yml";
pub const IGNORE_FILE_NAME: &str = ".gitignore";
pub const ENV_FILE_NAME: &str = ".env";

/// Snapshot of one filesystem node, relative to the project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathEntry {
    pub relative_path: Vec<String>,
    pub is_dir: bool,
    pub size_bytes: u64,
    pub extension: Option<String>,
}

impl PathEntry {
    /// Forward-slash joined relative path, independent of the host separator.
    pub fn display_path(&self) -> String {
        self.relative_path.join("/")
    }

    pub fn name(&self) -> &str {
        self.relative_path.last().map(String::as_str).unwrap_or("")
    }

    pub fn depth(&self) -> usize {
        self.relative_path.len().saturating_sub(1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentBudget {
    pub max_context_chars: usize,
    pub current_size: usize,
}

impl ContentBudget {
    pub fn new(max_context_chars: usize) -> Self {
        Self {
            max_context_chars,
            current_size: 0,
        }
    }

    pub fn fits(&self, size: usize) -> bool {
        self.current_size
            .checked_add(size)
            .is_some_and(|total| total <= self.max_context_chars)
    }

    /// Reserves `size` if it fits; returns whether the reservation happened.
    pub fn try_consume(&mut self, size: usize) -> bool {
        if !self.fits(size) {
            return false;
        }
        self.current_size += size;
        true
    }

    pub fn remaining(&self) -> usize {
        self.max_context_chars - self.current_size
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedChunk {
    pub file_name: String,
    pub text: String,
}

impl FormattedChunk {
    pub fn size(&self) -> usize {
        self.text.len()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvidencePackage {
    pub structure_summary: String,
    pub file_chunks: Vec<FormattedChunk>,
    pub files_considered: usize,
}

impl EvidencePackage {
    pub fn content_size(&self) -> usize {
        self.file_chunks.iter().map(FormattedChunk::size).sum()
    }
}

/// Contents of `.mkaireadme.yml`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    #[serde(deserialize_with = "null_as_default")]
    pub project_goals: String,
    #[serde(deserialize_with = "null_as_default")]
    pub custom_instructions: String,
    #[serde(deserialize_with = "null_as_default")]
    pub license: String,
    #[serde(deserialize_with = "null_as_default")]
    pub exclude: Vec<String>,
}

// A key written as `project_goals:` with no value parses as null.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    pub max_context_chars: usize,
    pub max_tree_entries: usize,
    pub document_name: String,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            max_context_chars: 60_000,
            max_tree_entries: 400,
            document_name: DEFAULT_DOCUMENT_NAME.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GenerateConfig {
    pub root_path: PathBuf,
    pub model: String,
    pub force_overwrite: bool,
    pub analyzer: AnalyzerConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeState {
    Created,
    Updated,
    Overwritten,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    pub content: String,
    pub state: MergeState,
}
