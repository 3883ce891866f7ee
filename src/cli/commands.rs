use crate::core::analyzer::{analyze, load_project_rules};
use crate::core::generation::{TextGenerator, prepare_generated_text};
use crate::core::merge::{marker_issue, merge, wrap_with_markers};
use crate::domain::errors::{MarkerIssue, MergeError};
use crate::domain::models::{
    AnalyzerConfig, ENV_FILE_NAME, GenerateConfig, MARKER_END, MARKER_START, MergeState,
};
use crate::infra::credentials::{API_KEY_VAR, credential_files, load_api_key, save_api_key};
use crate::infra::file_system::write_default_config;
use crate::infra::logger::setup_logger;
use crate::infra::openrouter::OpenRouterClient;
use crate::infra::output::{
    DocumentStore, FileDocumentStore, merge_state_message, print_generated, print_models,
    print_success, print_warning,
};
use clap::{Parser, Subcommand};
use inquire::Confirm;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

const RECOMMENDED_MODELS: &[&str] = &[
    "google/gemini-flash-1.5",
    "anthropic/claude-3-haiku",
    "mistralai/mistral-7b-instruct",
    "meta-llama/llama-3-8b-instruct",
    "openai/gpt-4o-mini",
];

#[derive(Parser)]
#[command(name = "mkaireadme")]
#[command(about = "Generate professional README.md files using AI", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate or smartly update README.md for the project
    #[command(alias = "generate")]
    Gen {
        /// Model ID to use for generation
        #[arg(long)]
        model: String,

        /// Replace a README.md that has no AUTOGEN markers
        #[arg(long)]
        force_overwrite: bool,

        /// Enable debug output
        #[arg(long)]
        debug: bool,

        /// Upper bound on the file content sent to the model
        #[arg(long, default_value_t = AnalyzerConfig::default().max_context_chars)]
        max_context_chars: usize,

        /// Project root to analyze
        #[arg(long, default_value = ".")]
        path: PathBuf,
    },

    /// Create a .mkaireadme.yml file to guide the AI
    Init {
        #[arg(long, default_value = ".")]
        path: PathBuf,
    },

    /// Save the OpenRouter API key to .env
    SetKey {
        api_key: String,

        /// Directory whose .env file receives the key
        #[arg(long, default_value = ".")]
        path: PathBuf,
    },

    /// List recommended models or search the provider's catalogue
    Models { search: Option<String> },
}

#[derive(Debug, PartialEq, Eq)]
pub enum GenerationReport {
    /// A custom document was wrapped in markers; nothing was generated.
    MarkersAdded,
    Written { state: MergeState, generated: String },
}

pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let verbosity = match cli.command {
        Commands::Gen { debug: true, .. } => 3,
        _ => cli.verbose,
    };
    setup_logger(verbosity)?;

    match cli.command {
        Commands::Gen {
            model,
            force_overwrite,
            debug: _,
            max_context_chars,
            path,
        } => {
            info!("Starting gen command");
            debug!(
                "Command parameters: model={}, force_overwrite={}, max_context_chars={}, path={}",
                model,
                force_overwrite,
                max_context_chars,
                path.display()
            );

            let config = GenerateConfig {
                root_path: path,
                model,
                force_overwrite,
                analyzer: AnalyzerConfig {
                    max_context_chars,
                    ..AnalyzerConfig::default()
                },
            };
            generate_document(&config)
        }
        Commands::Init { path } => init_config(path),
        Commands::SetKey { api_key, path } => {
            save_api_key(&path.join(ENV_FILE_NAME), &api_key)?;
            print_success("OpenRouter API key saved successfully!")?;
            Ok(())
        }
        Commands::Models { search } => list_models(search),
    }
}

fn require_api_key(root: &Path) -> anyhow::Result<String> {
    load_api_key(&credential_files(root)).ok_or_else(|| {
        anyhow::anyhow!(
            "No API key found. Set {API_KEY_VAR} or run: mkaireadme set-key YOUR_KEY"
        )
    })
}

fn generate_document(config: &GenerateConfig) -> anyhow::Result<()> {
    let api_key = require_api_key(&config.root_path)?;
    let client = OpenRouterClient::new(api_key)?;
    let document_name = config.analyzer.document_name.clone();
    let store = FileDocumentStore::new(config.root_path.join(&document_name));
    info!("Target document: {}", store.path().display());

    let report = run_generation(config, &client, &store, |issue| {
        confirm_add_markers(&document_name, issue)
    })?;

    match report {
        GenerationReport::MarkersAdded => {
            print_success(&format!("Markers added to {document_name}."))?;
            print_warning(&format!(
                "Move any hand-written sections outside of {MARKER_START} ... {MARKER_END}, then run `mkaireadme gen` again."
            ))?;
        }
        GenerationReport::Written { state, generated } => {
            print_success(&merge_state_message(state, &document_name))?;
            print_generated(&document_name, &generated)?;
        }
    }
    Ok(())
}

fn confirm_add_markers(document_name: &str, issue: MarkerIssue) -> bool {
    if let Err(e) = print_warning(&format!(
        "Custom {document_name} detected ({issue}). This tool only modifies content between AUTOGEN markers to avoid data loss."
    )) {
        warn!("Failed to print warning: {}", e);
    }
    Confirm::new(&format!("Wrap the existing {document_name} in AUTOGEN markers?"))
        .with_default(true)
        .with_help_message("Content is kept unchanged; no README is generated on this run")
        .prompt()
        .unwrap_or(false)
}

/// The `gen` pipeline: protect, analyze, generate, merge, then write once.
///
/// `confirm_add_markers` is asked whether a document without a usable marker
/// pair should be wrapped in fresh markers instead of generating.
pub fn run_generation(
    config: &GenerateConfig,
    generator: &impl TextGenerator,
    store: &impl DocumentStore,
    confirm_add_markers: impl FnOnce(MarkerIssue) -> bool,
) -> anyhow::Result<GenerationReport> {
    let existing = store.read()?;

    if let Some(content) = existing.as_deref().filter(|_| !config.force_overwrite) {
        if let Some(issue) = marker_issue(content) {
            if !confirm_add_markers(issue) {
                return Err(MergeError::DocumentProtected(issue).into());
            }
            store.write(&wrap_with_markers(content))?;
            return Ok(GenerationReport::MarkersAdded);
        }
    }

    let (rules, project) = load_project_rules(&config.root_path, &config.analyzer);
    let (evidence, guidance) = analyze(&config.root_path, &rules, &project, &config.analyzer)?;
    info!(
        "Evidence package: {} of {} candidate files, {} bytes",
        evidence.file_chunks.len(),
        evidence.files_considered,
        evidence.content_size()
    );

    let raw = generator.generate(&evidence, &guidance, &config.model)?;
    let generated = prepare_generated_text(&raw);

    let outcome = merge(existing.as_deref(), &generated, config.force_overwrite)?;
    store.write(&outcome.content)?;

    Ok(GenerationReport::Written {
        state: outcome.state,
        generated,
    })
}

fn init_config(path: PathBuf) -> anyhow::Result<()> {
    if write_default_config(&path)? {
        print_success("Created '.mkaireadme.yml'! Edit it to guide the AI.")?;
    } else {
        print_warning("'.mkaireadme.yml' already exists.")?;
    }
    Ok(())
}

fn list_models(search: Option<String>) -> anyhow::Result<()> {
    let Some(term) = search.filter(|s| !s.trim().is_empty()) else {
        let recommended: Vec<String> = RECOMMENDED_MODELS.iter().map(|m| m.to_string()).collect();
        print_models("Recommended models (search with `mkaireadme models <term>`):", &recommended)?;
        return Ok(());
    };

    let api_key = require_api_key(Path::new("."))?;
    let client = OpenRouterClient::new(api_key)?;
    let matching = filter_models(client.list_models()?, &term);

    if matching.is_empty() {
        print_warning(&format!("No models found matching '{term}'."))?;
    } else {
        print_models(&format!("Models matching '{term}':"), &matching)?;
    }
    Ok(())
}

fn filter_models(model_ids: Vec<String>, term: &str) -> Vec<String> {
    let term = term.to_lowercase();
    let mut matching: Vec<String> = model_ids
        .into_iter()
        .filter(|id| id.to_lowercase().contains(&term))
        .collect();
    matching.sort();
    matching
}
