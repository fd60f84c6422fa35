//! Sanitize step: turns raw model output into compiler-ready LaTeX.
//!
//! Contract, in order:
//! 1. strip markdown code fences (keep only the fenced block when one exists)
//! 2. require `\begin{document}`; without it the output is unusable
//! 3. optionally escape `& % $ _` inside the document body
//!
//! Step 3 is switched on once at startup (`LATEX_ESCAPE_SPECIALS`) so every
//! call path applies the same contract.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

pub const DOCUMENT_BODY_MARKER: &str = r"\begin{document}";
pub const DOCUMENT_END_MARKER: &str = r"\end{document}";

const ESCAPED_CHARS: [char; 4] = ['&', '%', '$', '_'];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SanitizeError {
    #[error("generated LaTeX is missing \\begin{{document}}")]
    MissingDocumentBody,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SanitizeOptions {
    pub escape_specials: bool,
}

/// LaTeX source that passed the sanitize step. Only `sanitize` builds one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedLatex(String);

impl SanitizedLatex {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for SanitizedLatex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn fenced_block() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| {
        Regex::new(r"```(?:(?i:latex|tex)\b)?\s*([\s\S]*?)```").expect("fence pattern is valid")
    })
}

pub fn sanitize(raw: &str, options: SanitizeOptions) -> Result<SanitizedLatex, SanitizeError> {
    let source = strip_code_fences(raw);

    if !source.contains(DOCUMENT_BODY_MARKER) {
        return Err(SanitizeError::MissingDocumentBody);
    }

    let source = if options.escape_specials {
        escape_document_body(&source)
    } else {
        source
    };

    Ok(SanitizedLatex(source))
}

fn fence_marker() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| {
        Regex::new(r"```(?:(?i:latex|tex)\b)?").expect("fence marker pattern is valid")
    })
}

/// Removes markdown fences around model output.
pub fn strip_code_fences(raw: &str) -> String {
    if raw.contains("```") {
        if let Some(inner) = fenced_block().captures(raw).and_then(|c| c.get(1)) {
            return inner.as_str().trim().to_string();
        }
        // Unbalanced fence: drop the markers and keep everything else.
        return fence_marker().replace_all(raw, "").trim().to_string();
    }

    raw.trim().trim_matches('`').trim().to_string()
}

/// Escapes `&`, `%`, `$` and `_` not already preceded by a backslash and
/// deletes `\newline` control sequences.
pub fn escape_special_chars(text: &str) -> String {
    let text = text.replace(r"\newline", "");
    let mut out = String::with_capacity(text.len() + text.len() / 16);
    let mut prev = None;
    for c in text.chars() {
        if ESCAPED_CHARS.contains(&c) && prev != Some('\\') {
            out.push('\\');
        }
        out.push(c);
        prev = Some(c);
    }
    out
}

/// Applies `escape_special_chars` between the document markers only, so the
/// preamble (package options, `\newcommand` bodies) is left untouched.
fn escape_document_body(source: &str) -> String {
    let Some(begin) = source.find(DOCUMENT_BODY_MARKER) else {
        return source.to_string();
    };
    let body_start = begin + DOCUMENT_BODY_MARKER.len();
    let body_end = source[body_start..]
        .rfind(DOCUMENT_END_MARKER)
        .map(|i| body_start + i)
        .unwrap_or(source.len());

    let mut out = String::with_capacity(source.len());
    out.push_str(&source[..body_start]);
    out.push_str(&escape_special_chars(&source[body_start..body_end]));
    out.push_str(&source[body_end..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r"\documentclass{article}\begin{document}Hello\end{document}";

    #[test]
    fn test_latex_fence_is_stripped() {
        let raw = "```latex\n\\documentclass{article}\\begin{document}Hello\\end{document}\n```";
        let out = sanitize(raw, SanitizeOptions::default()).unwrap();
        assert_eq!(out.as_str(), MINIMAL);
    }

    #[test]
    fn test_fence_surrounded_by_prose_and_whitespace() {
        let raw = format!("Here is your resume:\n\n   ```latex   \n\n{MINIMAL}\n\n```\n\nGood luck!");
        let out = sanitize(&raw, SanitizeOptions::default()).unwrap();
        assert_eq!(out.as_str(), MINIMAL);
    }

    #[test]
    fn test_untagged_fence_is_stripped() {
        let raw = format!("```\n{MINIMAL}\n```");
        assert_eq!(strip_code_fences(&raw), MINIMAL);
    }

    #[test]
    fn test_tex_tag_is_stripped_case_insensitively() {
        let raw = format!("```LaTeX\n{MINIMAL}\n```");
        assert_eq!(strip_code_fences(&raw), MINIMAL);
        let raw = format!("```tex\n{MINIMAL}\n```");
        assert_eq!(strip_code_fences(&raw), MINIMAL);
    }

    #[test]
    fn test_only_first_fenced_block_is_kept() {
        let raw = format!("```latex\n{MINIMAL}\n```\nand also\n```latex\nother\n```");
        assert_eq!(strip_code_fences(&raw), MINIMAL);
    }

    #[test]
    fn test_unterminated_fence_drops_markers() {
        let raw = format!("```latex\n{MINIMAL}\n");
        assert_eq!(strip_code_fences(&raw), MINIMAL);
    }

    #[test]
    fn test_unterminated_fence_drops_tag_in_any_case() {
        let raw = format!("```LaTeX\n{MINIMAL}\n");
        assert_eq!(strip_code_fences(&raw), MINIMAL);
        let raw = format!("```TEX\n{MINIMAL}");
        assert_eq!(strip_code_fences(&raw), MINIMAL);
    }

    #[test]
    fn test_stray_backticks_are_trimmed() {
        let raw = format!("`{MINIMAL}`\n");
        assert_eq!(strip_code_fences(&raw), MINIMAL);
    }

    #[test]
    fn test_plain_document_passes_unchanged() {
        let out = sanitize(MINIMAL, SanitizeOptions::default()).unwrap();
        assert_eq!(out.into_inner(), MINIMAL);
    }

    #[test]
    fn test_refusal_is_unusable() {
        let err = sanitize("Sorry, I cannot help with that.", SanitizeOptions::default());
        assert_eq!(err, Err(SanitizeError::MissingDocumentBody));
    }

    #[test]
    fn test_fragment_without_body_marker_is_unusable() {
        let raw = "```latex\n\\section{Experience}\n\\item Built things\n```";
        assert_eq!(
            sanitize(raw, SanitizeOptions::default()),
            Err(SanitizeError::MissingDocumentBody)
        );
    }

    #[test]
    fn test_body_marker_outside_fence_is_not_used() {
        // The fenced block wins; a marker in surrounding prose does not rescue it.
        let raw = "Use \\begin{document} like this:\n```latex\n\\section{A}\n```";
        assert_eq!(
            sanitize(raw, SanitizeOptions::default()),
            Err(SanitizeError::MissingDocumentBody)
        );
    }

    #[test]
    fn test_escape_special_chars() {
        assert_eq!(
            escape_special_chars("R&D 50% $10 snake_case"),
            r"R\&D 50\% \$10 snake\_case"
        );
    }

    #[test]
    fn test_escape_leaves_already_escaped_alone() {
        assert_eq!(escape_special_chars(r"R\&D 50\%"), r"R\&D 50\%");
    }

    #[test]
    fn test_escape_removes_newline_commands() {
        assert_eq!(escape_special_chars(r"one\newline two"), "one two");
    }

    #[test]
    fn test_escape_option_only_touches_body() {
        let raw = "\\documentclass{article}\n\\usepackage[margin=1in]{geometry}\n% preamble comment\n\\begin{document}\nR&D at 50%\n\\end{document}";
        let out = sanitize(
            raw,
            SanitizeOptions {
                escape_specials: true,
            },
        )
        .unwrap();
        assert!(out.as_str().contains("% preamble comment"));
        assert!(out.as_str().contains(r"R\&D at 50\%"));
        assert!(out.as_str().ends_with(DOCUMENT_END_MARKER));
    }

    #[test]
    fn test_escape_option_off_keeps_model_output() {
        let raw = "\\begin{document}\nR&D\n\\end{document}";
        let out = sanitize(raw, SanitizeOptions::default()).unwrap();
        assert!(out.as_str().contains("R&D"));
    }
}
