//! Extraction of structured fields from raw model text.
//!
//! Nothing here fails: missing sections fall back to placeholders so the
//! caller always has something to show.

use crate::model::TranslationResult;
use regex::Regex;
use std::sync::OnceLock;

pub const REASONING_PLACEHOLDER: &str = "No reasoning was provided.";

/// Stands in for SQL the model did not produce. A bare comment, so running it
/// fails through the normal execution error path instead of doing anything.
pub const SQL_GENERATION_FAILED: &str = "-- SQL generation failed";

pub const MAX_SUGGESTIONS: usize = 5;

fn reasoning_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<reasoning>(.*?)</reasoning>").expect("static regex"))
}

fn sql_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<sql>(.*?)</sql>").expect("static regex"))
}

fn first_span(re: &Regex, raw: &str) -> Option<String> {
    re.captures(raw)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
}

pub fn parse_translation(raw: &str) -> TranslationResult {
    let reasoning =
        first_span(reasoning_re(), raw).unwrap_or_else(|| REASONING_PLACEHOLDER.to_string());
    let sql = first_span(sql_re(), raw)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| SQL_GENERATION_FAILED.to_string());

    TranslationResult { reasoning, sql }
}

/// Result shown when generation itself failed: the error text becomes the
/// reasoning so it stays visible.
pub fn degraded_translation(message: &str) -> TranslationResult {
    TranslationResult {
        reasoning: message.trim().to_string(),
        sql: SQL_GENERATION_FAILED.to_string(),
    }
}

/// Keeps lines starting with a digit or `-`, strips the enumerator, and
/// returns the first five.
pub fn parse_suggestions(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter_map(strip_enumerator)
        .filter(|s| !s.is_empty())
        .take(MAX_SUGGESTIONS)
        .map(str::to_string)
        .collect()
}

fn strip_enumerator(line: &str) -> Option<&str> {
    if let Some(rest) = line.strip_prefix('-') {
        return Some(rest.trim());
    }
    if !line.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    let rest = line.trim_start_matches(|c: char| c.is_ascii_digit());
    let rest = rest
        .strip_prefix('.')
        .or_else(|| rest.strip_prefix(')'))
        .unwrap_or(rest);
    Some(rest.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recovers_tagged_sections_trimmed() {
        let raw = "Sure!\n<reasoning>\n  Count rows in Users.\n</reasoning>\n\n<sql>\nSELECT COUNT(*)\nFROM Users\n</sql>\n";
        let t = parse_translation(raw);
        assert_eq!(t.reasoning, "Count rows in Users.");
        assert_eq!(t.sql, "SELECT COUNT(*)\nFROM Users");
    }

    #[test]
    fn takes_first_span_only() {
        let raw = "<sql>SELECT 1</sql> later <sql>SELECT 2</sql>";
        assert_eq!(parse_translation(raw).sql, "SELECT 1");
    }

    #[test]
    fn missing_tags_fall_back_to_placeholders() {
        let t = parse_translation("I cannot help with that.");
        assert_eq!(t.reasoning, REASONING_PLACEHOLDER);
        assert_eq!(t.sql, SQL_GENERATION_FAILED);
        assert!(!t.sql.is_empty());
    }

    #[test]
    fn empty_sql_tag_is_treated_as_missing() {
        let t = parse_translation("<reasoning>x</reasoning><sql>   </sql>");
        assert_eq!(t.sql, SQL_GENERATION_FAILED);
    }

    #[test]
    fn degraded_output_becomes_visible_reasoning() {
        let t = degraded_translation("Error: quota exceeded\n");
        assert_eq!(t.reasoning, "Error: quota exceeded");
        assert_eq!(t.sql, SQL_GENERATION_FAILED);
    }

    #[test]
    fn answer_starting_with_error_is_parsed_like_any_other() {
        let t = parse_translation("Error: codes live in Logs.\n<sql>SELECT code FROM Logs</sql>");
        assert_eq!(t.reasoning, REASONING_PLACEHOLDER);
        assert_eq!(t.sql, "SELECT code FROM Logs");
    }

    #[test]
    fn suggestions_keep_first_five_and_strip_enumerators() {
        let raw = "Here you go:\n1. Q one\n2. Q two\n3. Q three\n4. Q four\n5. Q five\n6. Q six\n7. Q seven\n";
        let s = parse_suggestions(raw);
        assert_eq!(s, vec!["Q one", "Q two", "Q three", "Q four", "Q five"]);
    }

    #[test]
    fn suggestions_accept_dashes_and_keep_inner_periods() {
        let raw = "- Avg. order value by tier\n  10) Top 3 products\nnot a question";
        let s = parse_suggestions(raw);
        assert_eq!(s, vec!["Avg. order value by tier", "Top 3 products"]);
    }

    #[test]
    fn suggestions_degrade_to_empty() {
        assert!(parse_suggestions("Error: network down").is_empty());
        assert!(parse_suggestions("").is_empty());
    }
}
