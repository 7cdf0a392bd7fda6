//! Cleanup of model-generated queries.
//!
//! Models like to wrap SQL in markdown fences and trail semicolons; the
//! adapters want a bare, single-line statement.

use regex::Regex;
use std::sync::OnceLock;

fn fence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)^```(?:sql)?\s*\n?(.*?)\n?```$").unwrap())
}

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").unwrap())
}

/// Strip markdown code fences, trailing semicolons and extra whitespace from
/// a generated query.
pub fn clean_sql_query(query: &str) -> String {
    if query.is_empty() {
        return String::new();
    }

    let trimmed = query.trim();
    let unfenced = if let Some(caps) = fence_re().captures(trimmed) {
        caps[1].trim().to_string()
    } else if let Some(rest) = trimmed.strip_prefix("```") {
        // unterminated or oddly nested fence
        let mut rest = rest.trim_start();
        if let Some(stripped) = rest.strip_prefix("sql").or_else(|| rest.strip_prefix("SQL")) {
            rest = stripped;
        }
        rest.trim().trim_end_matches("```").trim().to_string()
    } else {
        trimmed.to_string()
    };

    let cleaned = unfenced.trim().trim_end_matches(';').trim();
    whitespace_re().replace_all(cleaned, " ").into_owned()
}
