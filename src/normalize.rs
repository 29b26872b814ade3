use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static DURATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*duration:\s+[0-9.]+\s+\w+\s+").unwrap());
static EXECUTE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*execute\s+[\w<>]+:\s+").unwrap());
static IDENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#""([^"]*)""#).unwrap());

/// Strip log preambles from a message and unquote identifiers.
///
/// The steps run in order: `duration: ... ms` annotations, then
/// `execute <name>:` prefixes, then double quotes around identifiers.
/// Single-quoted literals are left alone.
pub fn normalize(raw: &str) -> String {
    let text = DURATION_RE.replace_all(raw, "");
    let text = EXECUTE_RE.replace_all(&text, "");
    IDENT_RE
        .replace_all(&text, |caps: &Captures| caps[1].to_string())
        .into_owned()
}
