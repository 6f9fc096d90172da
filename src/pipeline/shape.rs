//! Normalization of diagram-stage output.
//!
//! Models often wrap Mermaid diagrams in markdown code fences despite instructions not to.
//! The helpers here strip that wrapping and check for the diagram-type declaration; the full
//! grammar is the renderer's concern.

/// Strip a surrounding markdown code fence, if present, and trim whitespace.
pub fn strip_code_fences(raw: &str) -> String {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed.to_string();
    };
    // Drop the info string (e.g. "mermaid") on the opening fence line.
    let rest = match rest.split_once('\n') {
        Some((_, body)) => body,
        None => rest,
    };
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim().to_string()
}

/// Whether the first non-empty line opens with the expected diagram declaration.
pub fn has_header(text: &str, header: &str) -> bool {
    text.lines()
        .find(|line| !line.trim().is_empty())
        .is_some_and(|line| line.trim_start().starts_with(header))
}
