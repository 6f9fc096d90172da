//! Prompt templates for the pipeline stages.
//!
//! Each stage sends one fully assembled prompt; there is no shared prompt registry. Diagram
//! prompts embed the Stage A summary verbatim so every run is self-contained.

/// Prompt for the summarization stage. The document rides alongside as an inline part.
pub fn summary_prompt() -> &'static str {
    "You are a legal document analyst. Read the attached document and provide a concise \
     plain-text summary in 3-5 sentences. Cover the parties involved, the key obligations, \
     and any deadlines or monetary amounts. Respond with the summary only, no preamble."
}

/// Prompt for the mind-map stage, parameterized with the Stage A summary.
pub fn mind_map_prompt(summary: &str) -> String {
    format!(
        "Create a hierarchical mind map of the following legal document summary using Mermaid \
         mindmap syntax. Start the output with the line 'mindmap', use a single root node for \
         the document, and add 3-5 branches for legal concepts, parties, obligations, and key \
         terms. Output only the Mermaid diagram, without code fences or commentary.\n\n\
         Summary:\n{summary}"
    )
}

/// Prompt for the flowchart stage, parameterized with the Stage A summary.
pub fn flowchart_prompt(summary: &str) -> String {
    format!(
        "Create a sequential flowchart of the process described in the following legal document \
         summary using Mermaid syntax. Start the output with the line 'flowchart TD', model the \
         steps as nodes connected in order, and branch only where the summary describes a \
         decision. Output only the Mermaid diagram, without code fences or commentary.\n\n\
         Summary:\n{summary}"
    )
}

/// Prompt for the advice stage.
pub fn advice_prompt(query: &str, area_label: &str) -> String {
    format!(
        "You are a legal advice assistant. Provide step-by-step guidance for the question \
         below as a numbered list of clear, actionable steps. Focus on {area_label} where \
         relevant, mention when consulting a qualified attorney is recommended, and do not \
         provide definitive legal conclusions.\n\n\
         Question: {query}"
    )
}
