use crate::domain::errors::DocumentError;
use crate::domain::models::MergeState;
use crossterm::{
    ExecutableCommand,
    style::{Color, ResetColor, SetForegroundColor},
};
use log::{debug, info};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Read/write access to the target document.
pub trait DocumentStore {
    fn read(&self) -> Result<Option<String>, DocumentError>;
    fn write(&self, content: &str) -> Result<(), DocumentError>;
}

pub struct FileDocumentStore {
    path: PathBuf,
}

impl FileDocumentStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DocumentStore for FileDocumentStore {
    fn read(&self) -> Result<Option<String>, DocumentError> {
        if !self.path.exists() {
            debug!("No document at {}", self.path.display());
            return Ok(None);
        }
        fs::read_to_string(&self.path)
            .map(Some)
            .map_err(|source| DocumentError::Read {
                path: self.path.clone(),
                source,
            })
    }

    fn write(&self, content: &str) -> Result<(), DocumentError> {
        debug!("Writing document to file: {}", self.path.display());
        fs::write(&self.path, content).map_err(|source| DocumentError::Write {
            path: self.path.clone(),
            source,
        })?;
        info!("Document written to file: {} ({} bytes)", self.path.display(), content.len());
        Ok(())
    }
}

fn print_colored(color: Color, message: &str) -> io::Result<()> {
    let mut stdout = io::stdout();
    stdout.execute(SetForegroundColor(color))?;
    writeln!(stdout, "{message}")?;
    stdout.execute(ResetColor)?;
    Ok(())
}

pub fn print_success(message: &str) -> io::Result<()> {
    print_colored(Color::Green, &format!("✅ {message}"))
}

pub fn print_warning(message: &str) -> io::Result<()> {
    print_colored(Color::Yellow, message)
}

pub fn merge_state_message(state: MergeState, document_name: &str) -> String {
    match state {
        MergeState::Created => format!("Successfully created {document_name}!"),
        MergeState::Updated => format!("Successfully updated {document_name} with new content!"),
        MergeState::Overwritten => format!("Successfully overwrote {document_name}!"),
    }
}

pub fn print_generated(document_name: &str, content: &str) -> io::Result<()> {
    print_colored(Color::Blue, &format!("\n--- Generated {document_name} ---\n"))?;
    let mut stdout = io::stdout();
    writeln!(stdout, "{content}")?;
    Ok(())
}

pub fn print_models(title: &str, model_ids: &[String]) -> io::Result<()> {
    print_colored(Color::Green, title)?;
    let mut stdout = io::stdout();
    for id in model_ids {
        stdout.execute(SetForegroundColor(Color::Cyan))?;
        writeln!(stdout, "  {id}")?;
    }
    stdout.execute(ResetColor)?;
    Ok(())
}
