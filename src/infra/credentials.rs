use log::{debug, info};
use std::fs;
use crate::domain::models::ENV_FILE_NAME;
use std::path::{Path, PathBuf};

pub const API_KEY_VAR: &str = "OPENROUTER_API_KEY";

fn parse_assignment(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let line = line.strip_prefix("export ").unwrap_or(line);
    let (key, value) = line.split_once('=')?;
    let value = value.trim();
    let value = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
        .unwrap_or(value);
    Some((key.trim(), value))
}

/// Value of `key` in a `.env` file; the last assignment wins.
pub fn read_env_file_value(env_file: &Path, key: &str) -> Option<String> {
    let content = fs::read_to_string(env_file).ok()?;
    content
        .lines()
        .filter_map(parse_assignment)
        .filter(|(k, _)| *k == key)
        .map(|(_, v)| v.to_string())
        .last()
        .filter(|v| !v.is_empty())
}

/// `.env` files consulted for the API key: the project root first, then the
/// working directory.
pub fn credential_files(root: &Path) -> Vec<PathBuf> {
    let mut files = vec![root.join(ENV_FILE_NAME)];
    let cwd_file = PathBuf::from(ENV_FILE_NAME);
    if files[0] != cwd_file {
        files.push(cwd_file);
    }
    files
}

/// First non-empty API key among `env_files`, in order.
pub fn find_api_key_in_files(env_files: &[PathBuf]) -> Option<String> {
    env_files.iter().find_map(|env_file| {
        let key = read_env_file_value(env_file, API_KEY_VAR)?;
        debug!("Using API key from {}", env_file.display());
        Some(key)
    })
}

/// Looks up the API key in the process environment, then in `env_files`.
pub fn load_api_key(env_files: &[PathBuf]) -> Option<String> {
    if let Some(key) = std::env::var(API_KEY_VAR).ok().filter(|v| !v.trim().is_empty()) {
        debug!("Using API key from the environment");
        return Some(key);
    }
    find_api_key_in_files(env_files)
}

/// Stores the API key in `env_file`, replacing any previous assignment and
/// leaving other lines untouched.
pub fn save_api_key(env_file: &Path, api_key: &str) -> anyhow::Result<()> {
    let existing = if env_file.exists() {
        fs::read_to_string(env_file)?
    } else {
        String::new()
    };

    let assignment = format!("{API_KEY_VAR}='{}'", api_key.trim());
    let mut replaced = false;
    let mut lines: Vec<String> = Vec::new();
    for line in existing.lines() {
        let is_key_line = parse_assignment(line).is_some_and(|(k, _)| k == API_KEY_VAR);
        if !is_key_line {
            lines.push(line.to_string());
        } else if !replaced {
            lines.push(assignment.clone());
            replaced = true;
        }
    }
    if !replaced {
        lines.push(assignment);
    }

    let mut content = lines.join("\n");
    content.push('\n');
    fs::write(env_file, content)?;
    info!("Saved API key to {}", env_file.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_assignment() {
        assert_eq!(parse_assignment("KEY=value"), Some(("KEY", "value")));
        assert_eq!(parse_assignment("export KEY=\"quoted\""), Some(("KEY", "quoted")));
        assert_eq!(parse_assignment(" KEY = 'single' "), Some(("KEY", "single")));
        assert_eq!(parse_assignment("# KEY=commented"), None);
        assert_eq!(parse_assignment("no equals sign"), None);
    }

    #[test]
    fn test_read_env_file_value() {
        let temp_dir = TempDir::new().unwrap();
        let env_file = temp_dir.path().join(".env");
        fs::write(&env_file, "OTHER=1\nOPENROUTER_API_KEY=first\nOPENROUTER_API_KEY='second'\n").unwrap();

        assert_eq!(
            read_env_file_value(&env_file, API_KEY_VAR),
            Some("second".to_string())
        );
        assert_eq!(read_env_file_value(&env_file, "MISSING"), None);
    }

    #[test]
    fn test_read_env_file_missing() {
        let temp_dir = TempDir::new().unwrap();
        assert_eq!(read_env_file_value(&temp_dir.path().join(".env"), API_KEY_VAR), None);
    }

    #[test]
    fn test_save_api_key_replaces_existing() {
        let temp_dir = TempDir::new().unwrap();
        let env_file = temp_dir.path().join(".env");
        fs::write(&env_file, "# secrets\nOPENROUTER_API_KEY=old\nDATABASE_URL=postgres://x\n").unwrap();

        save_api_key(&env_file, "sk-or-new").unwrap();

        let content = fs::read_to_string(&env_file).unwrap();
        assert_eq!(
            content,
            "# secrets\nOPENROUTER_API_KEY='sk-or-new'\nDATABASE_URL=postgres://x\n"
        );
        assert_eq!(
            read_env_file_value(&env_file, API_KEY_VAR),
            Some("sk-or-new".to_string())
        );
    }

    #[test]
    fn test_save_api_key_creates_file() {
        let temp_dir = TempDir::new().unwrap();
        let env_file = temp_dir.path().join(".env");

        save_api_key(&env_file, "sk-or-abc").unwrap();

        assert_eq!(fs::read_to_string(&env_file).unwrap(), "OPENROUTER_API_KEY='sk-or-abc'\n");
    }

    #[test]
    fn test_find_api_key_falls_back_to_later_files() {
        let project = TempDir::new().unwrap();
        let cwd = TempDir::new().unwrap();
        let project_env = project.path().join(".env");
        let cwd_env = cwd.path().join(".env");
        fs::write(&cwd_env, "OPENROUTER_API_KEY=sk-or-cwd\n").unwrap();

        let files = vec![project_env.clone(), cwd_env.clone()];
        assert_eq!(find_api_key_in_files(&files), Some("sk-or-cwd".to_string()));

        fs::write(&project_env, "OPENROUTER_API_KEY=sk-or-project\n").unwrap();
        assert_eq!(find_api_key_in_files(&files), Some("sk-or-project".to_string()));

        fs::write(&project_env, "OPENROUTER_API_KEY=\n").unwrap();
        assert_eq!(find_api_key_in_files(&files), Some("sk-or-cwd".to_string()));
    }

    #[test]
    fn test_credential_files_order() {
        let files = credential_files(Path::new("some/project"));
        assert_eq!(
            files,
            vec![PathBuf::from("some/project/.env"), PathBuf::from(".env")]
        );
        assert_eq!(credential_files(Path::new("")), vec![PathBuf::from(".env")]);
    }
}
