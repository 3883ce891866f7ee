use crate::core::context_generator::{chunk_overhead, format_chunk};
use crate::domain::models::{ContentBudget, FormattedChunk, PathEntry};
use log::{debug, info};

const SOURCE_EXTENSIONS: &[&str] = &[
    "py", "js", "jsx", "ts", "tsx", "go", "java", "kt", "rs", "rb", "php", "c", "h", "cpp",
    "hpp", "cs", "swift", "scala", "sh", "toml", "json", "yml", "yaml", "md", "html", "css",
];

#[derive(Debug)]
pub struct Selection {
    pub chunks: Vec<FormattedChunk>,
    pub budget: ContentBudget,
    pub files_considered: usize,
    pub unreadable: usize,
    pub dropped_by_budget: usize,
}

/// Files whose extension is on the source allow-list.
pub fn is_candidate(entry: &PathEntry) -> bool {
    !entry.is_dir
        && entry
            .extension
            .as_deref()
            .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// Smallest files first; equal sizes fall back to path order.
pub fn order_candidates(candidates: &mut [PathEntry]) {
    candidates.sort_by(|a, b| {
        a.size_bytes
            .cmp(&b.size_bytes)
            .then_with(|| a.relative_path.cmp(&b.relative_path))
    });
}

/// Fills the budget with whole chunks, smallest candidates first.
///
/// Selection stops at the first chunk that would overflow the budget. Files
/// the reader cannot load are skipped and consume nothing.
pub fn select_files(
    mut candidates: Vec<PathEntry>,
    file_reader: impl Fn(&PathEntry) -> anyhow::Result<String>,
    max_context_chars: usize,
) -> Selection {
    let mut budget = ContentBudget::new(max_context_chars);
    let files_considered = candidates.len();

    if candidates.is_empty() {
        info!("No candidate files to select");
        return Selection {
            chunks: Vec::new(),
            budget,
            files_considered,
            unreadable: 0,
            dropped_by_budget: 0,
        };
    }

    debug!("Selecting from {} candidate files", files_considered);
    order_candidates(&mut candidates);

    let mut chunks = Vec::new();
    let mut unreadable = 0;
    let mut dropped_by_budget = 0;

    for (index, entry) in candidates.iter().enumerate() {
        let display_path = entry.display_path();
        let expected_size = usize::try_from(entry.size_bytes)
            .unwrap_or(usize::MAX)
            .saturating_add(chunk_overhead(&display_path));
        if !budget.fits(expected_size) {
            dropped_by_budget = files_considered - index;
            debug!(
                "Budget reached before reading {} ({} bytes expected, {} left), dropping {} remaining files",
                display_path,
                expected_size,
                budget.remaining(),
                dropped_by_budget
            );
            break;
        }

        let content = match file_reader(entry) {
            Ok(content) => content,
            Err(e) => {
                debug!("Skipping unreadable file {}: {}", display_path, e);
                unreadable += 1;
                continue;
            }
        };

        let chunk = format_chunk(&display_path, &content);
        if !budget.try_consume(chunk.size()) {
            dropped_by_budget = files_considered - index;
            debug!(
                "Budget reached at {} ({} + {} > {}), dropping {} remaining files",
                display_path,
                budget.current_size,
                chunk.size(),
                budget.max_context_chars,
                dropped_by_budget
            );
            break;
        }

        debug!("Adding file {} ({} bytes)", display_path, chunk.size());
        chunks.push(chunk);
    }

    info!(
        "Selected {} of {} files ({} of {} bytes used)",
        chunks.len(),
        files_considered,
        budget.current_size,
        budget.max_context_chars
    );

    Selection {
        chunks,
        budget,
        files_considered,
        unreadable,
        dropped_by_budget,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    struct MockFileSystem {
        files: HashMap<String, String>,
    }

    impl MockFileSystem {
        fn new() -> Self {
            Self {
                files: HashMap::new(),
            }
        }

        fn add_file(&mut self, path: &str, content: String) -> PathEntry {
            let entry = PathEntry {
                relative_path: path.split('/').map(str::to_string).collect(),
                is_dir: false,
                size_bytes: content.len() as u64,
                extension: path.rsplit_once('.').map(|(_, ext)| ext.to_string()),
            };
            self.files.insert(path.to_string(), content);
            entry
        }

        fn read_file(&self, entry: &PathEntry) -> anyhow::Result<String> {
            match self.files.get(&entry.display_path()) {
                Some(content) => Ok(content.clone()),
                None => Err(anyhow::anyhow!("File not found")),
            }
        }
    }

    fn names(selection: &Selection) -> Vec<&str> {
        selection
            .chunks
            .iter()
            .map(|chunk| chunk.file_name.as_str())
            .collect()
    }

    #[test]
    fn test_select_files_with_empty_input() {
        let reader = |_: &PathEntry| -> anyhow::Result<String> { Ok(String::new()) };

        let selection = select_files(Vec::new(), reader, 1_000);

        assert!(selection.chunks.is_empty());
        assert_eq!(selection.files_considered, 0);
    }

    #[test]
    fn test_select_files_orders_by_ascending_size() {
        let mut mock_fs = MockFileSystem::new();
        let large = mock_fs.add_file("large.rs", "x".repeat(300));
        let small = mock_fs.add_file("small.rs", "x".repeat(10));
        let medium = mock_fs.add_file("medium.rs", "x".repeat(50));

        let selection = select_files(vec![large, small, medium], |e| mock_fs.read_file(e), 10_000);

        assert_eq!(names(&selection), vec!["small.rs", "medium.rs", "large.rs"]);
    }

    #[test]
    fn test_select_files_ties_break_by_path() {
        let mut mock_fs = MockFileSystem::new();
        let b = mock_fs.add_file("src/b.rs", "same".to_string());
        let a = mock_fs.add_file("src/a.rs", "same".to_string());
        let c = mock_fs.add_file("a/c.rs", "same".to_string());

        let first = select_files(vec![b.clone(), a.clone(), c.clone()], |e| mock_fs.read_file(e), 10_000);
        let second = select_files(vec![c, a, b], |e| mock_fs.read_file(e), 10_000);

        assert_eq!(names(&first), vec!["a/c.rs", "src/a.rs", "src/b.rs"]);
        assert_eq!(names(&first), names(&second));
    }

    #[test]
    fn test_select_files_admits_exactly_four_of_ten() {
        let mut mock_fs = MockFileSystem::new();
        let mut entries = Vec::new();
        for i in (1..=10).rev() {
            entries.push(mock_fs.add_file(&format!("f{i:02}.py"), "x".repeat(i * 100)));
        }
        let overhead = chunk_overhead("f01.py");
        let budget = (100 + 200 + 300 + 400) + 4 * overhead;

        let selection = select_files(entries.clone(), |e| mock_fs.read_file(e), budget);

        assert_eq!(names(&selection), vec!["f01.py", "f02.py", "f03.py", "f04.py"]);
        assert_eq!(selection.budget.current_size, budget);
        assert_eq!(selection.dropped_by_budget, 6);

        let selection = select_files(entries, |e| mock_fs.read_file(e), budget - 1);
        assert_eq!(names(&selection), vec!["f01.py", "f02.py", "f03.py"]);
    }

    #[test]
    fn test_select_files_never_exceeds_budget() {
        let mut mock_fs = MockFileSystem::new();
        let entries: Vec<PathEntry> = (0..25)
            .map(|i| mock_fs.add_file(&format!("m{i}.go"), "y".repeat((i * 37) % 211)))
            .collect();

        for budget in [0, 1, 50, 333, 1_000, 4_096] {
            let selection = select_files(entries.clone(), |e| mock_fs.read_file(e), budget);
            let total: usize = selection.chunks.iter().map(FormattedChunk::size).sum();
            assert!(total <= budget, "budget {budget} exceeded: {total}");
            assert_eq!(total, selection.budget.current_size);
        }
    }

    #[test]
    fn test_select_files_budget_below_smallest_chunk() {
        let mut mock_fs = MockFileSystem::new();
        let entry = mock_fs.add_file("tiny.rs", "fn a() {}".to_string());

        let selection = select_files(vec![entry], |e| mock_fs.read_file(e), 5);

        assert!(selection.chunks.is_empty());
        assert_eq!(selection.budget.current_size, 0);
    }

    #[test]
    fn test_select_files_with_read_error() {
        let mut mock_fs = MockFileSystem::new();
        let readable = mock_fs.add_file("ok.rs", "content".to_string());
        let missing = PathEntry {
            relative_path: vec!["gone.rs".to_string()],
            is_dir: false,
            size_bytes: 1,
            extension: Some("rs".to_string()),
        };

        let selection = select_files(vec![missing, readable], |e| mock_fs.read_file(e), 10_000);

        assert_eq!(names(&selection), vec!["ok.rs"]);
        assert_eq!(selection.unreadable, 1);
    }

    #[test]
    fn test_select_files_does_not_read_files_past_budget() {
        let mut mock_fs = MockFileSystem::new();
        let small = mock_fs.add_file("small.rs", "x".repeat(20));
        let huge = mock_fs.add_file("huge.rs", "x".repeat(50_000));
        let reads = RefCell::new(Vec::new());
        let reader = |entry: &PathEntry| {
            reads.borrow_mut().push(entry.display_path());
            mock_fs.read_file(entry)
        };

        let selection = select_files(vec![huge, small], reader, 1_000);

        assert_eq!(names(&selection), vec!["small.rs"]);
        assert_eq!(selection.dropped_by_budget, 1);
        assert_eq!(*reads.borrow(), vec!["small.rs".to_string()]);
    }

    #[test]
    fn test_is_candidate() {
        let mut mock_fs = MockFileSystem::new();
        assert!(is_candidate(&mock_fs.add_file("src/lib.rs", String::new())));
        assert!(is_candidate(&mock_fs.add_file("Config.JSON", String::new())));
        assert!(!is_candidate(&mock_fs.add_file("logo.png", String::new())));
        assert!(!is_candidate(&mock_fs.add_file("Makefile", String::new())));

        let dir = PathEntry {
            relative_path: vec!["src.rs".to_string()],
            is_dir: true,
            size_bytes: 0,
            extension: Some("rs".to_string()),
        };
        assert!(!is_candidate(&dir));
    }
}
