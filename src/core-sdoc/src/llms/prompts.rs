use std::collections::HashMap;

use indoc::indoc;
use subst::substitute;

use crate::GenerationError;

/// Only this many characters of a page's Markdown are sent to the LLM.
/// A crude guard against context overflow, not a semantic chunker.
pub const MAX_CONTENT_CHARS: usize = 20_000;

const REWRITE_SYSTEM: &str = indoc! { "
  You are an expert technical documentation assistant. Process the Markdown source supplied by the user:

  1. **Translation**: Translate all explanatory prose into fluent, professional technical ${LANGUAGE}.
  2. **Code annotation**: Keep every code block intact (never translate or rename identifiers), but you **must** add a ${LANGUAGE} comment after each key line of code, using the comment syntax of the code's language (for example `# <comment>` or `// <comment>`).
  3. **Mermaid diagrams**: When the text describes an architecture, a process flow, or references a flowchart image, redraw that diagram as a `mermaid` code block in the Markdown.
  4. **Cleanup**: Remove useless header, footer, and navigation text. Keep only the main body.

  Output only the processed Markdown.
"};

const REWRITE_USER: &str = indoc! { "
  Markdown Content:

  ${CONTENT}"
};

/// The fixed system instruction for the rewrite step, targeting the given language.
pub fn prompt_rewrite_system(language: &str) -> Result<String, GenerationError> {
    let res = substitute(REWRITE_SYSTEM, &{
        let mut v = HashMap::new();
        v.insert("LANGUAGE".to_string(), language.to_string());
        v
    })?;
    Ok(res)
}

/// The user turn wrapping the (already truncated) Markdown content.
pub fn prompt_rewrite_user(content: &str) -> Result<String, GenerationError> {
    let res = substitute(REWRITE_USER, &{
        let mut v = HashMap::new();
        v.insert("CONTENT".to_string(), content.to_string());
        v
    })?;
    Ok(res)
}

/// The first `max_chars` characters of `content`. Never splits a multi-byte character.
pub fn truncate_chars(content: &str, max_chars: usize) -> &str {
    match content.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &content[..byte_idx],
        None => content,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_substitutes_language() {
        let prompt = prompt_rewrite_system("Simplified Chinese").unwrap();
        assert!(prompt.contains("professional technical Simplified Chinese"));
        assert!(prompt.contains("mermaid"));
        assert!(!prompt.contains("${LANGUAGE}"));
    }

    #[test]
    fn test_user_prompt_wraps_content() {
        let prompt = prompt_rewrite_user("# Title\n\nHello").unwrap();
        assert_eq!(prompt, "Markdown Content:\n\n# Title\n\nHello");
    }

    #[test]
    fn test_user_prompt_keeps_dollar_signs_in_content() {
        let content = "Run `echo $HOME` and `${PATH}`";
        let prompt = prompt_rewrite_user(content).unwrap();
        assert!(prompt.ends_with(content));
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello", 5), "hello");
        assert_eq!(truncate_chars("hello", 2), "he");
        assert_eq!(truncate_chars("", 2), "");
        // multi-byte characters count as one
        assert_eq!(truncate_chars("文档助手", 2), "文档");
        assert_eq!(truncate_chars("héllo", 2), "hé");
    }

    #[test]
    fn test_truncate_at_max_content_chars() {
        let long = "a".repeat(MAX_CONTENT_CHARS + 500);
        assert_eq!(truncate_chars(&long, MAX_CONTENT_CHARS).chars().count(), MAX_CONTENT_CHARS);
    }
}
