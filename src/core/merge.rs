use crate::domain::errors::{MarkerIssue, MergeError};
use crate::domain::models::{MARKER_END, MARKER_START, MergeOutcome, MergeState};
use log::{debug, info, warn};

/// Splits a document at its marker pair into preamble and epilogue.
///
/// The pair only counts when each marker occurs exactly once and the start
/// marker comes first.
fn split_at_markers(content: &str) -> Result<(&str, &str), MarkerIssue> {
    let starts = content.matches(MARKER_START).count();
    let ends = content.matches(MARKER_END).count();
    match (starts, ends) {
        (0, 0) => return Err(MarkerIssue::Missing),
        (s, e) if s > 1 || e > 1 => return Err(MarkerIssue::Duplicated),
        (1, 1) => {}
        _ => return Err(MarkerIssue::Incomplete),
    }

    let (preamble, rest) = content
        .split_once(MARKER_START)
        .ok_or(MarkerIssue::Incomplete)?;
    let (_, epilogue) = rest.split_once(MARKER_END).ok_or(MarkerIssue::OutOfOrder)?;
    Ok((preamble, epilogue))
}

/// The reason `content` cannot be updated in place, if any.
pub fn marker_issue(content: &str) -> Option<MarkerIssue> {
    split_at_markers(content).err()
}

/// Removes every marker literal, including ones formed by removing another.
pub fn strip_marker_literals(text: &str) -> String {
    let mut current = text.to_string();
    while current.contains(MARKER_START) || current.contains(MARKER_END) {
        current = current.replace(MARKER_START, "").replace(MARKER_END, "");
    }
    current
}

fn managed_document(body: &str) -> String {
    format!(
        "{MARKER_START}\n\n{}\n\n{MARKER_END}",
        strip_marker_literals(body).trim()
    )
}

/// Places existing content inside a fresh marker pair. Stray marker literals
/// are dropped so the result always holds exactly one pair.
pub fn wrap_with_markers(content: &str) -> String {
    managed_document(content)
}

/// Computes the new document text. Nothing here touches the filesystem.
pub fn merge(
    existing: Option<&str>,
    generated: &str,
    force_overwrite: bool,
) -> Result<MergeOutcome, MergeError> {
    let Some(existing) = existing else {
        debug!("No existing document, creating one");
        return Ok(MergeOutcome {
            content: managed_document(generated),
            state: MergeState::Created,
        });
    };

    let issue = match split_at_markers(existing) {
        Ok((preamble, epilogue)) => {
            info!(
                "Replacing managed region (preamble {} bytes, epilogue {} bytes kept)",
                preamble.trim().len(),
                epilogue.trim().len()
            );
            let content = format!(
                "{}\n\n{MARKER_START}\n\n{}\n\n{MARKER_END}\n\n{}",
                preamble.trim(),
                strip_marker_literals(generated).trim(),
                epilogue.trim()
            )
            .trim()
            .to_string();
            return Ok(MergeOutcome {
                content,
                state: MergeState::Updated,
            });
        }
        Err(issue) => issue,
    };

    if !force_overwrite {
        info!("Existing document cannot be updated in place: {}", issue);
        return Err(MergeError::DocumentProtected(issue));
    }

    if issue != MarkerIssue::Missing {
        warn!("Overwriting document with unusable markers: {}", issue);
    }
    info!("Overwriting custom document");
    Ok(MergeOutcome {
        content: managed_document(generated),
        state: MergeState::Overwritten,
    })
}
