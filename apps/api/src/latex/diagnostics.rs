//! Turns raw compiler output into a short, actionable diagnostic.

/// Size of the trailing slice shown when no explicit error line is found.
pub const TAIL_CHARS: usize = 2000;

pub const NO_OUTPUT: &str = "No error output captured";

/// Error-marked lines if there are any, otherwise the last `TAIL_CHARS` characters.
pub fn summarize(output: &str) -> String {
    let error_lines: Vec<&str> = output.lines().filter(|l| is_error_line(l)).collect();
    if !error_lines.is_empty() {
        return error_lines.join("\n");
    }

    if output.trim().is_empty() {
        return NO_OUTPUT.to_string();
    }

    tail(output, TAIL_CHARS).trim_end().to_string()
}

/// `! ` is how TeX itself starts an error message.
fn is_error_line(line: &str) -> bool {
    line.contains("Error:") || line.contains("Fatal error") || line.starts_with("! ")
}

/// Last `max_chars` characters of `text`, cut on a char boundary.
pub fn tail(text: &str, max_chars: usize) -> &str {
    if max_chars == 0 {
        return "";
    }
    match text.char_indices().rev().nth(max_chars - 1) {
        Some((start, _)) => &text[start..],
        None => text,
    }
}
