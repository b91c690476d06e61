//! Default-name derivation for extracted notes.
//!
//! The derived name is built from the selection's first block only: the lead
//! paragraph is assumed to carry the descriptive keywords, while later blocks
//! (quotes, code, lists) would pollute the title. Only lowercase Latin
//! letters survive tokenization; numbers, punctuation and non-Latin scripts
//! are discarded. That is a documented limitation, not an oversight.

use chrono::{DateTime, Local};
use regex::{Captures, Regex};
use std::sync::OnceLock;

use crate::config::ExtractConfig;
use crate::stopwords;

/// Date-token alphabet accepted inside `{DATE:<pattern>}`, mapped to chrono
/// specifiers. Longer tokens are listed before their prefixes so the
/// translator can match greedily.
const DATE_TOKENS: &[(&str, &str)] = &[
    ("YYYY", "%Y"),
    ("YY", "%y"),
    ("MMMM", "%B"),
    ("MMM", "%b"),
    ("MM", "%m"),
    ("M", "%-m"),
    ("dddd", "%A"),
    ("ddd", "%a"),
    ("DD", "%d"),
    ("D", "%-d"),
    ("HH", "%H"),
    ("H", "%-H"),
    ("hh", "%I"),
    ("h", "%-I"),
    ("mm", "%M"),
    ("m", "%-M"),
    ("ss", "%S"),
    ("s", "%-S"),
    ("A", "%p"),
    ("a", "%P"),
];

fn date_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{DATE:([^}]+)\}").unwrap())
}

/// Derive the default name for a note extracted from `selected_text`.
///
/// Pure given `now`: every `{DATE:...}` token in the format expands with the
/// same captured timestamp, so a name can never straddle a clock tick.
pub fn derive_name(
    selected_text: &str,
    config: &ExtractConfig,
    now: DateTime<Local>,
) -> String {
    let keywords = keyword_segment(selected_text, config);
    let named = config.format.replace("{nWords}", &keywords);
    expand_date_tokens(&named, now)
}

/// The first `nWords` non-stopword words of the selection's first block,
/// hyphen-joined. May be empty (all-stopword or all-punctuation selections,
/// or `nWords == 0`); callers must tolerate that.
pub fn keyword_segment(selected_text: &str, config: &ExtractConfig) -> String {
    let first_block = selected_text.split("\n\n").next().unwrap_or("");
    let cleaned: String = first_block
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_whitespace())
        .collect();
    let words: Vec<String> =
        cleaned.split_whitespace().map(str::to_string).collect();
    let kept = stopwords::remove_stopwords(words, &config.custom_stopwords);
    kept.into_iter()
        .take(config.n_words)
        .collect::<Vec<_>>()
        .join("-")
}

/// Expand every `{DATE:<pattern>}` token in `input` using `now`.
///
/// Also used for subdirectory templates. `{DATE:}` with an empty pattern is
/// left untouched.
pub fn expand_date_tokens(input: &str, now: DateTime<Local>) -> String {
    date_token_re()
        .replace_all(input, |caps: &Captures| {
            now.format(&translate_date_pattern(&caps[1])).to_string()
        })
        .to_string()
}

/// Translate a date-token pattern (`YYYY-MM-DD`) into a chrono format
/// string (`%Y-%m-%d`). Unrecognized characters pass through literally;
/// a literal `%` is escaped so chrono never sees a stray specifier and
/// formatting cannot panic.
fn translate_date_pattern(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 4);
    let mut rest = pattern;
    'scan: while !rest.is_empty() {
        for (token, spec) in DATE_TOKENS {
            if let Some(tail) = rest.strip_prefix(token) {
                out.push_str(spec);
                rest = tail;
                continue 'scan;
            }
        }
        match rest.chars().next() {
            Some('%') => {
                out.push_str("%%");
                rest = &rest[1..];
            }
            Some(ch) => {
                out.push(ch);
                rest = &rest[ch.len_utf8()..];
            }
            None => break,
        }
    }
    out
}
