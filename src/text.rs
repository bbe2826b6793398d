//! Text cleanup helpers and issue-ID extraction

use anyhow::{bail, Result};
use regex::Regex;

/// Remove every `<...>` tag construct from a string.
///
/// Entities are left unescaped; text outside tags is preserved verbatim.
/// Idempotent on already-clean input.
pub fn strip_tags(text: &str) -> String {
    let re = Regex::new(r"<[^>]+>").expect("valid regex");
    re.replace_all(text, "").into_owned()
}

/// Extract the numeric issue ID from a Comicvine issue URL or a bare ID.
///
/// Comicvine issue URLs carry a `/4000-<id>/` path segment; the second
/// number is the issue ID.
pub fn extract_issue_id(input: &str) -> Result<u64> {
    let input = input.trim();

    if !input.is_empty() && input.chars().all(|c| c.is_ascii_digit()) {
        return Ok(input.parse()?);
    }

    let re = Regex::new(r"/(\d+)-(\d+)/").expect("valid regex");
    match re.captures(input) {
        Some(caps) => Ok(caps[2].parse()?),
        None => bail!("Invalid issue URL: could not extract issue ID from '{}'", input),
    }
}

/// Truncate a string for display, appending "..." when cut.
///
/// Counts characters, not bytes, so multibyte input never splits mid-char.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let cut: String = s.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", cut)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_tags() {
        assert_eq!(strip_tags("<p>Hello <b>world</b></p>"), "Hello world");
        assert_eq!(strip_tags("no markup here"), "no markup here");
        assert_eq!(strip_tags("a &amp; b"), "a &amp; b");
    }

    #[test]
    fn test_strip_tags_idempotent() {
        let dirty = "<div class='x'>Some <em>text</em> &gt; here</div>";
        let once = strip_tags(dirty);
        assert_eq!(strip_tags(&once), once);
    }

    #[test]
    fn test_extract_issue_id_from_url() {
        let url = "https://comicvine.gamespot.com/example-vol-1-3/4000-123456/";
        assert_eq!(extract_issue_id(url).unwrap(), 123456);
    }

    #[test]
    fn test_extract_issue_id_bare() {
        assert_eq!(extract_issue_id("98765").unwrap(), 98765);
        assert_eq!(extract_issue_id(" 42 ").unwrap(), 42);
    }

    #[test]
    fn test_extract_issue_id_invalid() {
        assert!(extract_issue_id("https://example.com/no-id-here").is_err());
        assert!(extract_issue_id("").is_err());
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("this is a long string", 10), "this is...");
    }

    #[test]
    fn test_truncate_multibyte() {
        assert_eq!(truncate("日本語テスト", 8), "日本語テスト");
        assert_eq!(truncate("日本語のテスト文字列", 8), "日本語のテ...");
    }

    #[test]
    fn test_truncate_tiny_max() {
        assert_eq!(truncate("abcdef", 2), "...");
        assert_eq!(truncate("ab", 2), "ab");
    }
}
