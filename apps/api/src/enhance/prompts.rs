// Prompt for the resume enhancement call.
// Placeholders are filled in a single pass, so user text containing `{...}` is never re-expanded.

/// Shown in the prompt when the user leaves company or position blank.
pub const EXTRACT_FROM_JD: &str = "Extract from job description";

/// Replace: {template}, {resume_text}, {job_description}, {company}, {position}
pub const ENHANCE_PROMPT_TEMPLATE: &str = r#"You are a professional resume writer with expertise in LaTeX. Your task is to enhance a resume for a job application by tailoring it to match the specific job description.

## TEMPLATE:
```latex
{template}
```

## RESUME CONTENT:
```
{resume_text}
```

## JOB DESCRIPTION:
```
{job_description}
```

## COMPANY AND POSITION DETAILS:
Company: {company}
Position: {position}

## INSTRUCTIONS:
1. Create a complete LaTeX resume document using the provided template.
2. Tailor the content to highlight skills and experiences that match the job description.
3. Keep the original LaTeX structure and commands intact.
4. Ensure all LaTeX special characters are properly escaped.
5. Focus on skills and experiences most relevant to the job description.
6. Ensure the document compiles correctly without errors.
7. Return ONLY the complete LaTeX code with no explanations or markdown.

The LaTeX code should start with the document class and end with \end{document}."#;

pub struct PromptInputs<'a> {
    pub template: &'a str,
    pub resume_text: &'a str,
    pub job_description: &'a str,
    pub company: Option<&'a str>,
    pub position: Option<&'a str>,
}

pub fn build_enhance_prompt(inputs: &PromptInputs<'_>) -> String {
    fill(
        ENHANCE_PROMPT_TEMPLATE,
        &[
            ("template", inputs.template),
            ("resume_text", inputs.resume_text),
            ("job_description", inputs.job_description),
            ("company", inputs.company.unwrap_or(EXTRACT_FROM_JD)),
            ("position", inputs.position.unwrap_or(EXTRACT_FROM_JD)),
        ],
    )
}

/// Single left-to-right pass over `template`; unknown `{...}` are kept verbatim.
fn fill(template: &str, vars: &[(&str, &str)]) -> String {
    let extra: usize = vars.iter().map(|(_, v)| v.len()).sum();
    let mut out = String::with_capacity(template.len() + extra);
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start + 1..];
        let hit = vars
            .iter()
            .find(|(key, _)| tail.starts_with(key) && tail[key.len()..].starts_with('}'));
        match hit {
            Some((key, value)) => {
                out.push_str(value);
                rest = &tail[key.len() + 1..];
            }
            None => {
                out.push('{');
                rest = tail;
            }
        }
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs<'a>(company: Option<&'a str>, position: Option<&'a str>) -> PromptInputs<'a> {
        PromptInputs {
            template: "\\documentclass{article}\\begin{document}TEMPLATE\\end{document}",
            resume_text: "Jane Doe, 5 years of Rust",
            job_description: "Senior Rust Engineer at Acme",
            company,
            position,
        }
    }

    #[test]
    fn test_prompt_embeds_all_inputs() {
        let prompt = build_enhance_prompt(&inputs(Some("Acme"), Some("Senior Rust Engineer")));
        assert!(prompt.contains("\\begin{document}TEMPLATE\\end{document}"));
        assert!(prompt.contains("Jane Doe, 5 years of Rust"));
        assert!(prompt.contains("Senior Rust Engineer at Acme"));
        assert!(prompt.contains("Company: Acme"));
        assert!(prompt.contains("Position: Senior Rust Engineer"));
        assert!(!prompt.contains("{resume_text}"));
    }

    #[test]
    fn test_missing_company_and_position_defer_to_jd() {
        let prompt = build_enhance_prompt(&inputs(None, None));
        assert!(prompt.contains(&format!("Company: {EXTRACT_FROM_JD}")));
        assert!(prompt.contains(&format!("Position: {EXTRACT_FROM_JD}")));
    }

    #[test]
    fn test_latex_braces_in_template_survive() {
        let prompt = build_enhance_prompt(&inputs(None, None));
        assert!(prompt.contains("\\documentclass{article}"));
        assert!(prompt.ends_with("end with \\end{document}."));
    }

    #[test]
    fn test_placeholders_in_user_text_are_not_expanded() {
        let prompt = build_enhance_prompt(&PromptInputs {
            template: "T",
            resume_text: "I wrote {job_description} literally",
            job_description: "JD",
            company: None,
            position: None,
        });
        assert!(prompt.contains("I wrote {job_description} literally"));
    }

    #[test]
    fn test_fill_keeps_unknown_and_unclosed_braces() {
        assert_eq!(fill("a {x} {y", &[("x", "1")]), "a 1 {y");
        assert_eq!(fill("{x}{x}", &[("x", "é")]), "éé");
    }
}
