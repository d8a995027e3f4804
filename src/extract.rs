//! Pulls the candidate JSON object out of a raw model completion.
//!
//! The completion echoes the whole prompt, so the answer region starts after
//! the first answer marker. Within it the candidate spans the first `{` up to
//! the first `}`. Braces are not balanced: a `}` inside the description ends
//! the candidate early, and a `}` ahead of the first `{` means no candidate.

/// Everything after the first `marker`, or the whole completion when the
/// marker is missing. Surrounding whitespace is trimmed.
pub fn answer_region<'a>(completion: &'a str, marker: &str) -> &'a str {
    let region = match completion.find(marker) {
        Some(index) => &completion[index + marker.len()..],
        None => completion,
    };
    region.trim()
}

/// Candidate JSON text from the answer region.
///
/// Returns an empty string when there is no `{`, no `}`, or the first `}`
/// comes before the first `{`. The empty candidate fails validation downstream.
pub fn candidate_json(completion: &str, marker: &str) -> String {
    let answer = answer_region(completion, marker);

    let (Some(open), Some(close)) = (answer.find('{'), answer.find('}')) else {
        tracing::debug!("No brace pair in model answer");
        return String::new();
    };
    if close < open {
        tracing::debug!("Closing brace precedes the opening brace in model answer");
        return String::new();
    }

    // both braces are single-byte, so the slice stays on char boundaries
    answer[open..=close].trim().to_string()
}
