use crate::classify::StatementKind;
use crate::colors::{Color, ColorScheme};
use crate::params::{Argument, ArgumentList, Binding};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::fmt;

static PLACEHOLDER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$([0-9]+)").unwrap());
static COMMENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"--[^\n]*").unwrap());
static SPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+").unwrap());

/// Leading verb (lowercase) to statement color; first match wins
const VERB_COLORS: &[(&str, Color)] = &[
    ("update", Color::Magenta),
    ("insert", Color::Green),
    ("delete", Color::Red),
    ("commit", Color::Cyan),
    ("rollback", Color::Red),
    ("begin", Color::Cyan),
];

const DEFAULT_COLOR: Color = Color::Blue;

/// Rendering options, fixed for the lifetime of a `Renderer`
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Drop `--` comments and fold the statement onto one line
    pub shorten: bool,
    /// Literal written for NULL and unset bindings
    pub null_literal: String,
    /// Text values longer than this many characters are cut
    pub truncate_at: usize,
    pub use_colors: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            shorten: true,
            null_literal: "NULL".to_string(),
            truncate_at: 64,
            use_colors: true,
        }
    }
}

/// A finished output line
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedLine {
    pub color: Color,
    pub text: String,
}

impl fmt::Display for RenderedLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

pub struct Renderer {
    config: RenderConfig,
}

impl Renderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Render one statement with its arguments substituted.
    ///
    /// For simple statements `text` is the bare operation keyword and no
    /// placeholders are substituted.
    pub fn render(&self, kind: StatementKind, text: &str, args: &ArgumentList) -> RenderedLine {
        let sql = text.trim();
        let color = statement_color(sql);
        let scheme = ColorScheme::new(color, self.config.use_colors);

        let sql = if self.config.shorten {
            shorten(sql)
        } else {
            sql.to_string()
        };

        if kind == StatementKind::Simple {
            return RenderedLine {
                color,
                text: format!("{}{}{}", scheme.text, sql, scheme.reset),
            };
        }

        let sql = PLACEHOLDER_RE.replace_all(&sql, |caps: &Captures| {
            let placeholder = &caps[0];
            let Some(binding) = caps[1].parse::<usize>().ok().and_then(|n| args.get(n)) else {
                return placeholder.to_string();
            };
            match self.format_binding(binding) {
                Some(value) => format!("{}{}{}{}", scheme.bright, value, scheme.reset, scheme.text),
                None => placeholder.to_string(),
            }
        });

        RenderedLine {
            color,
            text: format!("{}{}{}", scheme.text, sql, scheme.reset),
        }
    }

    /// Literal form of a binding, or None when the value cannot be rendered
    fn format_binding(&self, binding: &Binding) -> Option<String> {
        let argument = match binding {
            Binding::Unset => return Some(self.config.null_literal.clone()),
            Binding::Bound(argument) => argument,
        };

        let formatted = match argument {
            Argument::Text(s) => quote(&self.truncate(s)),
            Argument::Bytes(bytes) => quote_bytes(&self.truncate_bytes(bytes)),
            Argument::Integer(i) => i.to_string(),
            Argument::Boolean(b) => b.to_string(),
            Argument::Timestamp(ts) => ts.to_string(),
            Argument::Null => self.config.null_literal.clone(),
            Argument::Unsupported { value, type_tag } => {
                tracing::warn!(value = %value, type_tag = *type_tag, "unsupported argument type, leaving placeholder");
                return None;
            }
        };
        Some(formatted)
    }

    fn truncate(&self, s: &str) -> String {
        let limit = self.config.truncate_at;
        match s.char_indices().nth(limit) {
            Some((cut, _)) => {
                let elided = s[cut..].chars().count();
                format!("{} (truncated {} chars)", &s[..cut], elided)
            }
            None => s.to_string(),
        }
    }

    fn truncate_bytes(&self, bytes: &[u8]) -> Vec<u8> {
        let limit = self.config.truncate_at;
        if bytes.len() <= limit {
            return bytes.to_vec();
        }
        let mut cut = bytes[..limit].to_vec();
        cut.extend_from_slice(format!(" (truncated {} bytes)", bytes.len() - limit).as_bytes());
        cut
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(RenderConfig::default())
    }
}

/// Pick a color from the statement's leading verb, ignoring case
pub fn statement_color(sql: &str) -> Color {
    let head = sql.trim_start();
    VERB_COLORS
        .iter()
        .find(|(verb, _)| {
            head.get(..verb.len())
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case(verb))
        })
        .map_or(DEFAULT_COLOR, |&(_, color)| color)
}

/// Strip line comments and collapse the statement onto a single line
pub fn shorten(sql: &str) -> String {
    let sql = COMMENT_RE.replace_all(sql, "");
    let sql = sql.replace('\n', " ");
    SPACE_RE.replace_all(&sql, " ").into_owned()
}

/// Quote a value as a SQL string literal.
///
/// CR and LF become `\r` / `\n`; other control bytes, non-ASCII bytes,
/// backslashes and single quotes become `\xHH`. If anything was escaped the
/// literal gets the `E` prefix so the escapes are honored when pasted back.
pub fn quote(value: &str) -> String {
    quote_bytes(value.as_bytes())
}

/// `quote` for text in an encoding other than UTF-8
pub fn quote_bytes(value: &[u8]) -> String {
    let mut body = String::with_capacity(value.len() + 3);
    let mut escaped = false;

    for &byte in value {
        match byte {
            b'\r' => {
                escaped = true;
                body.push_str("\\r");
            }
            b'\n' => {
                escaped = true;
                body.push_str("\\n");
            }
            b'\\' | b'\'' => {
                escaped = true;
                body.push_str(&format!("\\x{:02x}", byte));
            }
            32..=126 => body.push(char::from(byte)),
            _ => {
                escaped = true;
                body.push_str(&format!("\\x{:02x}", byte));
            }
        }
    }

    if escaped {
        format!("E'{}'", body)
    } else {
        format!("'{}'", body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() -> Renderer {
        Renderer::new(RenderConfig {
            use_colors: false,
            ..RenderConfig::default()
        })
    }

    fn texts(values: &[&str]) -> ArgumentList {
        values.iter().copied().collect()
    }

    #[test]
    fn test_update_is_magenta_with_bright_value() {
        let renderer = Renderer::default();
        let line = renderer.render(
            StatementKind::Parsed,
            "UPDATE t SET x=$1",
            &texts(&["hello"]),
        );
        assert_eq!(line.color, Color::Magenta);
        assert_eq!(
            line.text,
            "\x1b[35mUPDATE t SET x=\x1b[95m'hello'\x1b[0m\x1b[35m\x1b[0m"
        );
    }

    #[test]
    fn test_color_table() {
        let cases = [
            ("update t set a=1", Color::Magenta),
            ("  INSERT INTO t VALUES (1)", Color::Green),
            ("Delete from t", Color::Red),
            ("COMMIT", Color::Cyan),
            ("ROLLBACK", Color::Red),
            ("BEGIN", Color::Cyan),
            ("SELECT 1", Color::Blue),
            ("", Color::Blue),
            ("upd", Color::Blue),
        ];
        for (sql, expected) in cases {
            assert_eq!(statement_color(sql), expected, "{:?}", sql);
        }
    }

    #[test]
    fn test_shorten() {
        let sql = "SELECT a, -- the a column\n\t b\nFROM   t";
        assert_eq!(shorten(sql), "SELECT a, b FROM t");
    }

    #[test]
    fn test_no_shorten_keeps_layout() {
        let renderer = Renderer::new(RenderConfig {
            shorten: false,
            use_colors: false,
            ..RenderConfig::default()
        });
        let line = renderer.render(StatementKind::Parsed, "SELECT 1 -- one\nFROM t", &ArgumentList::new());
        assert_eq!(line.text, "SELECT 1 -- one\nFROM t");
    }

    #[test]
    fn test_out_of_range_placeholders_untouched() {
        let line = plain().render(
            StatementKind::Parsed,
            "SELECT $1, $2, $0, $99999999999999999999",
            &texts(&["a"]),
        );
        assert_eq!(line.text, "SELECT 'a', $2, $0, $99999999999999999999");
    }

    #[test]
    fn test_value_formatting() {
        let ts = chrono::DateTime::parse_from_rfc3339("2024-01-02T03:04:05+00:00").unwrap();
        let mut args = ArgumentList::new();
        args.set(1, Argument::Integer(-42));
        args.set(2, Argument::Boolean(true));
        args.set(3, Argument::Timestamp(ts));
        args.set(4, Argument::Null);
        args.set(6, Argument::Text("x".to_string()));

        let line = plain().render(StatementKind::Parsed, "SELECT $1, $2, $3, $4, $5, $6", &args);
        assert_eq!(
            line.text,
            "SELECT -42, true, 2024-01-02 03:04:05 +00:00, NULL, NULL, 'x'"
        );
    }

    #[test]
    fn test_custom_null_literal() {
        let renderer = Renderer::new(RenderConfig {
            null_literal: "null".to_string(),
            use_colors: false,
            ..RenderConfig::default()
        });
        let mut args = ArgumentList::new();
        args.set(2, Argument::Null);
        let line = renderer.render(StatementKind::Parsed, "SELECT $1, $2", &args);
        assert_eq!(line.text, "SELECT null, null");
    }

    #[test]
    fn test_unsupported_argument_keeps_placeholder() {
        let mut args = ArgumentList::new();
        args.set(1, Argument::from_json(&serde_json::json!([1, 2])));
        args.set(2, Argument::Integer(5));
        let line = plain().render(StatementKind::Parsed, "SELECT $1, $2", &args);
        assert_eq!(line.text, "SELECT $1, 5");
    }

    #[test]
    fn test_truncation_boundary() {
        let renderer = plain();
        let exact = "a".repeat(64);
        let over = "b".repeat(65);

        let line = renderer.render(StatementKind::Parsed, "SELECT $1", &texts(&[exact.as_str()]));
        assert_eq!(line.text, format!("SELECT '{}'", exact));

        let line = renderer.render(StatementKind::Parsed, "SELECT $1", &texts(&[over.as_str()]));
        assert_eq!(
            line.text,
            format!("SELECT '{} (truncated 1 chars)'", "b".repeat(64))
        );
    }

    #[test]
    fn test_truncation_counts_characters() {
        let value = "é".repeat(70);
        let line = plain().render(StatementKind::Parsed, "SELECT $1", &texts(&[value.as_str()]));
        assert!(line.text.ends_with(" (truncated 6 chars)'"));
        assert!(line.text.starts_with("SELECT E'\\xc3\\xa9"));
    }

    #[test]
    fn test_non_utf8_value_escaped_per_byte() {
        let mut args = ArgumentList::new();
        args.set(1, Argument::Bytes(b"caf\xe9".to_vec()));
        let line = plain().render(StatementKind::Parsed, "SELECT $1", &args);
        assert_eq!(line.text, "SELECT E'caf\\xe9'");

        let mut args = ArgumentList::new();
        let mut long = vec![0xe9];
        long.extend_from_slice(&[b'a'; 65]);
        args.set(1, Argument::Bytes(long));
        let line = plain().render(StatementKind::Parsed, "SELECT $1", &args);
        assert!(line.text.ends_with(" (truncated 2 bytes)'"));
    }

    #[test]
    fn test_non_ascii_digit_placeholder_untouched() {
        let line = plain().render(StatementKind::Parsed, "SELECT $1, $\u{663}", &texts(&["a"]));
        assert_eq!(line.text, "SELECT 'a', $\u{663}");
    }

    #[test]
    fn test_simple_statement() {
        let line = Renderer::default().render(StatementKind::Simple, "COMMIT", &ArgumentList::new());
        assert_eq!(line.color, Color::Cyan);
        assert_eq!(line.text, "\x1b[36mCOMMIT\x1b[0m");
    }

    #[test]
    fn test_quote_plain() {
        assert_eq!(quote("hello world"), "'hello world'");
        assert_eq!(quote(""), "''");
    }

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote("it's\nok"), "E'it\\x27s\\nok'");
        assert_eq!(quote("a\r\\b"), "E'a\\r\\x5cb'");
        assert_eq!(quote("tab\there"), "E'tab\\x09here'");
        assert_eq!(quote("\x7f"), "E'\\x7f'");
    }
}
