use crate::core::context_generator::{build_guidance, build_structure_summary};
use crate::core::exclusion::ExclusionRuleSet;
use crate::core::file_selector::{is_candidate, select_files};
use crate::domain::models::{AnalyzerConfig, EvidencePackage, PathEntry, ProjectConfig};
use crate::infra::file_system::{
    load_ignore_lines, load_project_config, read_file_contents, scan_project,
};
use log::{debug, info, warn};
use std::path::Path;

/// Loads `.mkaireadme.yml` and `.gitignore` and merges them into one rule set.
/// Either file failing to load is treated as absent.
pub fn load_project_rules(
    root: &Path,
    config: &AnalyzerConfig,
) -> (ExclusionRuleSet, ProjectConfig) {
    let project = load_project_config(root).unwrap_or_else(|e| {
        warn!("Ignoring config file: {}", e);
        ProjectConfig::default()
    });
    let ignore_lines = load_ignore_lines(root).unwrap_or_else(|e| {
        warn!("Ignoring .gitignore: {}", e);
        Vec::new()
    });

    let rules = ExclusionRuleSet::build(&ignore_lines, &project.exclude, &config.document_name);
    (rules, project)
}

/// Builds the evidence package for `root` and the guidance text for `project`.
pub fn analyze(
    root: &Path,
    rules: &ExclusionRuleSet,
    project: &ProjectConfig,
    config: &AnalyzerConfig,
) -> anyhow::Result<(EvidencePackage, String)> {
    info!("Analyzing project at {}", root.display());
    let entries = scan_project(root, rules)?;

    let candidates: Vec<PathEntry> = entries.iter().filter(|e| is_candidate(e)).cloned().collect();
    debug!("{} of {} entries are candidate files", candidates.len(), entries.len());

    let selection = select_files(
        candidates,
        |entry: &PathEntry| read_file_contents(&root.join(entry.relative_path.join("/"))),
        config.max_context_chars,
    );
    if selection.unreadable > 0 {
        debug!("Skipped {} unreadable files", selection.unreadable);
    }
    debug!("{} bytes of budget left", selection.budget.remaining());

    let evidence = EvidencePackage {
        structure_summary: build_structure_summary(&entries, config.max_tree_entries),
        file_chunks: selection.chunks,
        files_considered: selection.files_considered,
    };
    let guidance = build_guidance(project);

    Ok((evidence, guidance))
}
