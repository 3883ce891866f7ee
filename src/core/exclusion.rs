use crate::domain::models::{CONFIG_FILE_NAME, ENV_FILE_NAME};
use globset::{GlobBuilder, GlobMatcher};
use log::{debug, warn};
use std::collections::HashSet;

const IGNORED_DIRS: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    ".qodo",
    "node_modules",
    "target",
    "__pycache__",
    ".venv",
    "venv",
    ".idea",
    ".vscode",
    "dist",
];

const IGNORED_FILES: &[&str] = &[ENV_FILE_NAME, CONFIG_FILE_NAME];

/// One compiled line of an ignore file.
#[derive(Debug, Clone)]
struct IgnorePattern {
    source: String,
    matcher: GlobMatcher,
    negated: bool,
    dir_only: bool,
}

impl IgnorePattern {
    fn parse(line: &str) -> Option<Result<Self, globset::Error>> {
        let line = trim_trailing_spaces(line.trim_end_matches(['\r', '\n']));
        if line.is_empty() || line.starts_with('#') {
            return None;
        }

        let (negated, body) = if let Some(rest) = line.strip_prefix('!') {
            (true, rest)
        } else if line.starts_with("\\#") || line.starts_with("\\!") {
            (false, &line[1..])
        } else {
            (false, line)
        };

        let (dir_only, body) = match body.strip_suffix('/') {
            Some(rest) => (true, rest),
            None => (false, body),
        };
        if body.is_empty() || body == "/" {
            return None;
        }

        // A slash anywhere but the end pins the pattern to the root.
        let anchored = body.contains('/');
        let body = body.trim_start_matches('/');
        let glob = if anchored {
            body.to_string()
        } else {
            format!("**/{body}")
        };

        let compiled = GlobBuilder::new(&glob)
            .literal_separator(true)
            .backslash_escape(true)
            .build()
            .map(|g| IgnorePattern {
                source: line.to_string(),
                matcher: g.compile_matcher(),
                negated,
                dir_only,
            });
        Some(compiled)
    }
}

fn trim_trailing_spaces(line: &str) -> &str {
    let mut end = line.len();
    while line[..end].ends_with(' ') && !line[..end].ends_with("\\ ") {
        end -= 1;
    }
    &line[..end]
}

/// Ordered ignore rules plus the built-in ignore lists.
///
/// Patterns are evaluated last-match-wins. On top of that, a path whose
/// ancestor directory is excluded stays excluded even if a later negation
/// names it. Standard gitignore behaves the same for most inputs, but this
/// rule is applied unconditionally, so `!` can never re-include a file under
/// an excluded directory.
#[derive(Debug, Clone)]
pub struct ExclusionRuleSet {
    patterns: Vec<IgnorePattern>,
    ignored_dirs: HashSet<String>,
    ignored_files: HashSet<String>,
}

impl ExclusionRuleSet {
    pub fn new(document_name: &str) -> Self {
        let mut ignored_files: HashSet<String> =
            IGNORED_FILES.iter().map(|s| s.to_string()).collect();
        ignored_files.insert(document_name.to_string());

        Self {
            patterns: Vec::new(),
            ignored_dirs: IGNORED_DIRS.iter().map(|s| s.to_string()).collect(),
            ignored_files,
        }
    }

    /// Merges ignore-file lines followed by config excludes into one list.
    pub fn build(ignore_lines: &[String], config_excludes: &[String], document_name: &str) -> Self {
        let mut rules = Self::new(document_name);
        for line in ignore_lines.iter().chain(config_excludes) {
            rules.add_pattern(line);
        }
        debug!("Exclusion rule set holds {} patterns", rules.len());
        rules
    }

    /// Appends one gitignore-style line. Blank lines and comments are skipped;
    /// a line that does not compile is dropped with a warning.
    pub fn add_pattern(&mut self, line: &str) {
        match IgnorePattern::parse(line) {
            Some(Ok(pattern)) => {
                debug!("Added exclusion pattern: {}", pattern.source);
                self.patterns.push(pattern);
            }
            Some(Err(e)) => warn!("Skipping invalid ignore pattern '{}': {}", line.trim(), e),
            None => {}
        }
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Whether a root-relative, forward-slash path is excluded.
    pub fn is_excluded(&self, path: &str, is_dir: bool) -> bool {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty() && *s != ".").collect();
        let Some((last, ancestors)) = segments.split_last() else {
            return false;
        };

        if ancestors.iter().any(|dir| self.ignored_dirs.contains(*dir)) {
            return true;
        }
        if is_dir && self.ignored_dirs.contains(*last) {
            return true;
        }
        if !is_dir && self.ignored_files.contains(*last) {
            return true;
        }

        for depth in 1..segments.len() {
            if self.matches_patterns(&segments[..depth].join("/"), true) {
                return true;
            }
        }

        self.matches_patterns(&segments.join("/"), is_dir)
    }

    fn matches_patterns(&self, path: &str, is_dir: bool) -> bool {
        let mut excluded = false;
        for pattern in &self.patterns {
            if pattern.dir_only && !is_dir {
                continue;
            }
            if pattern.matcher.is_match(path) {
                excluded = !pattern.negated;
            }
        }
        excluded
    }
}
