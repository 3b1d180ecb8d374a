use once_cell::sync::Lazy;
use regex::Regex;

// Unicode-aware word runs: letters (accented included), digits, underscore
static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").expect("word regex should compile"));

/// Lowercase `query` and split it into word tokens in query order.
/// Punctuation never produces a token.
pub fn tokenize(query: &str) -> Vec<String> {
    let lowered = query.to_lowercase();
    WORD.find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}
