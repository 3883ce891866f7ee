use crate::domain::models::{EvidencePackage, FormattedChunk, PathEntry, ProjectConfig};
use log::{debug, info};

const INFERABLE_LAYOUT_NOTE: &str =
    "The directory layout is inferable from the file paths in the contents below.";

pub fn format_chunk(display_path: &str, content: &str) -> FormattedChunk {
    FormattedChunk {
        file_name: display_path.to_string(),
        text: format!(
            "\n--- START OF {display_path} ---\n{content}\n--- END OF {display_path} ---\n"
        ),
    }
}

/// Fixed bytes a chunk adds around the file content.
pub fn chunk_overhead(display_path: &str) -> usize {
    format_chunk(display_path, "").size()
}

/// Indented listing of the non-excluded tree, capped at `max_entries` lines.
pub fn build_structure_summary(entries: &[PathEntry], max_entries: usize) -> String {
    if max_entries == 0 || entries.is_empty() {
        return INFERABLE_LAYOUT_NOTE.to_string();
    }

    let mut summary = String::new();
    for entry in entries.iter().take(max_entries) {
        let indent = "    ".repeat(entry.depth());
        if entry.is_dir {
            summary.push_str(&format!("{indent}├── {}/\n", entry.name()));
        } else {
            summary.push_str(&format!("{indent}└── {}\n", entry.name()));
        }
    }

    if entries.len() > max_entries {
        summary.push_str(&format!(
            "... ({} more entries)\n",
            entries.len() - max_entries
        ));
    }

    debug!(
        "Structure summary lists {} of {} entries",
        entries.len().min(max_entries),
        entries.len()
    );
    summary
}

pub fn build_guidance(config: &ProjectConfig) -> String {
    let fields = [
        ("Project Goals", config.project_goals.trim()),
        ("Instructions", config.custom_instructions.trim()),
        ("License", config.license.trim()),
    ];

    if fields.iter().all(|(_, value)| value.is_empty()) {
        debug!("No user guidance configured");
        return String::new();
    }

    info!("Including user guidance in context");
    let mut guidance = String::from("--- User Guidance ---\n");
    for (label, value) in fields.iter().filter(|(_, value)| !value.is_empty()) {
        guidance.push_str(&format!("{label}: {value}\n"));
    }
    guidance.push_str("-------------------\n");
    guidance
}

pub fn format_output(evidence: &EvidencePackage) -> String {
    debug!(
        "Formatting evidence package with {} chunks ({} bytes of file content)",
        evidence.file_chunks.len(),
        evidence.content_size()
    );
    let mut result = String::new();

    result.push_str("PROJECT DIRECTORY STRUCTURE:\n");
    result.push_str(&evidence.structure_summary);
    result.push_str("\n\nKEY FILE CONTENTS:\n");
    for chunk in &evidence.file_chunks {
        result.push_str(&chunk.text);
    }

    result
}

pub fn build_prompt(evidence: &EvidencePackage, guidance: &str) -> String {
    let mut prompt = String::from(
        "You are an expert technical writer. Create a professional README.md for the \
         software project described below, based on its directory structure and key file \
         contents.\n\n",
    );

    if !guidance.is_empty() {
        prompt.push_str(guidance);
        prompt.push('\n');
    }

    prompt.push_str(
        "Include the usual sections: project title, description, key features, \
         installation and usage. Generate only the Markdown content, with no other \
         explanatory text. Never include API keys, secrets or passwords even if they \
         appear in the file contents.\n\nHere is the project context:\n---\n",
    );
    prompt.push_str(&format_output(evidence));
    prompt.push_str("\n---\n");
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(path: &str, is_dir: bool) -> PathEntry {
        PathEntry {
            relative_path: path.split('/').map(str::to_string).collect(),
            is_dir,
            size_bytes: 0,
            extension: None,
        }
    }

    #[test]
    fn test_format_chunk_carries_file_name() {
        let chunk = format_chunk("src/main.rs", "fn main() {}");
        assert_eq!(chunk.file_name, "src/main.rs");
        assert_eq!(
            chunk.text,
            "\n--- START OF src/main.rs ---\nfn main() {}\n--- END OF src/main.rs ---\n"
        );
    }

    #[test]
    fn test_chunk_overhead_matches_formatting() {
        let content = "x".repeat(100);
        let chunk = format_chunk("a.py", &content);
        assert_eq!(chunk.size(), chunk_overhead("a.py") + 100);
    }

    #[test]
    fn test_build_structure_summary() {
        let entries = vec![
            entry("src", true),
            entry("src/main.rs", false),
            entry("Cargo.toml", false),
        ];

        let summary = build_structure_summary(&entries, 10);

        assert_eq!(summary, "├── src/\n    └── main.rs\n└── Cargo.toml\n");
    }

    #[test]
    fn test_build_structure_summary_is_capped() {
        let entries = vec![entry("a.rs", false), entry("b.rs", false), entry("c.rs", false)];

        let summary = build_structure_summary(&entries, 2);

        assert!(summary.contains("a.rs"));
        assert!(!summary.contains("c.rs"));
        assert!(summary.ends_with("... (1 more entries)\n"));
    }

    #[test]
    fn test_build_structure_summary_without_tree() {
        let entries = vec![entry("a.rs", false)];
        assert_eq!(build_structure_summary(&entries, 0), INFERABLE_LAYOUT_NOTE);
        assert_eq!(build_structure_summary(&[], 10), INFERABLE_LAYOUT_NOTE);
    }

    #[test]
    fn test_build_guidance_omits_empty_fields() {
        let config = ProjectConfig {
            project_goals: "Make READMEs painless".to_string(),
            custom_instructions: "  ".to_string(),
            license: "MIT".to_string(),
            exclude: vec![],
        };

        let guidance = build_guidance(&config);

        assert_eq!(
            guidance,
            "--- User Guidance ---\nProject Goals: Make READMEs painless\nLicense: MIT\n-------------------\n"
        );
    }

    #[test]
    fn test_build_guidance_empty_config() {
        assert_eq!(build_guidance(&ProjectConfig::default()), "");
    }

    #[test]
    fn test_format_output() {
        let evidence = EvidencePackage {
            structure_summary: "└── a.py\n".to_string(),
            file_chunks: vec![format_chunk("a.py", "print(1)")],
            files_considered: 1,
        };

        let formatted = format_output(&evidence);

        assert!(formatted.starts_with("PROJECT DIRECTORY STRUCTURE:\n└── a.py\n"));
        assert!(formatted.contains("KEY FILE CONTENTS:\n\n--- START OF a.py ---\nprint(1)\n"));
    }

    #[test]
    fn test_build_prompt_includes_guidance_and_context() {
        let evidence = EvidencePackage {
            structure_summary: "└── a.py\n".to_string(),
            file_chunks: vec![format_chunk("a.py", "print(1)")],
            files_considered: 1,
        };

        let prompt = build_prompt(&evidence, "--- User Guidance ---\nLicense: MIT\n");

        assert!(prompt.contains("License: MIT"));
        assert!(prompt.contains("--- START OF a.py ---"));

        let bare = build_prompt(&evidence, "");
        assert!(!bare.contains("User Guidance"));
    }
}
