use std::path::PathBuf;
use thiserror::Error;

/// Failure to load `.gitignore` or `.mkaireadme.yml`. Callers degrade to an
/// empty rule set / config rather than aborting.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Terminal failures from the text generation provider. None are retried.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Authentication Error: your OpenRouter API key is invalid. Run `mkaireadme set-key <KEY>` with a valid key.")]
    AuthInvalid,

    #[error("Rate Limit Error: you have exceeded your OpenRouter API quota. Wait a moment or check your plan, then run again.")]
    RateLimited,

    #[error("Model Not Found: the model '{model}' does not exist or is not available. Run `mkaireadme models <term>` to find a valid id.")]
    ModelNotFound { model: String },

    #[error("Model Moderation Error: the safety filter of '{model}' rejected the project content. This is not a problem with your project; try a model from another provider.")]
    ContentRejected { model: String },

    #[error("Unexpected provider error: {0}")]
    Unknown(String),
}

impl GenerationError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AuthInvalid => "auth_invalid",
            Self::RateLimited => "rate_limited",
            Self::ModelNotFound { .. } => "model_not_found",
            Self::ContentRejected { .. } => "content_rejected",
            Self::Unknown(_) => "unknown",
        }
    }
}

/// Why an existing document's AUTOGEN markers do not form a usable pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerIssue {
    Missing,
    Incomplete,
    Duplicated,
    OutOfOrder,
}

impl std::fmt::Display for MarkerIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::Missing => "it has no AUTOGEN markers",
            Self::Incomplete => "only one of the two AUTOGEN markers is present",
            Self::Duplicated => {
                "AUTOGEN markers were found but appear more than once; remove the extra markers \
                 (--force-overwrite would also discard everything outside them)"
            }
            Self::OutOfOrder => "the AUTOGEN end marker comes before the start marker",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MergeError {
    #[error(
        "Custom document detected: {0}. Add one marker pair to enable smart updates, or run again with --force-overwrite to replace the whole file."
    )]
    DocumentProtected(MarkerIssue),
}

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not write {path}, please check file permissions: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
