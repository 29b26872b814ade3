// src/params.rs - bound parameter values and the binding-string parser
use crate::error::ProcessingError;
use chrono::{DateTime, FixedOffset, Utc};
use once_cell::sync::Lazy;
use regex::bytes::Regex;

// A single quote inside the bound content ends the match early; escaped
// quotes ('') in the server's binding output are not understood.
static PARAM_SET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$([0-9]+)\s*=\s*'((?-u:[^'])*)'").unwrap());

/// A typed value bound to a statement placeholder
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    Text(String),
    /// Text in a non-UTF-8 server encoding, kept byte for byte
    Bytes(Vec<u8>),
    Integer(i64),
    Boolean(bool),
    Timestamp(DateTime<FixedOffset>),
    /// Explicitly bound to NULL
    Null,
    /// A value with no bindable representation; rendered as a diagnostic
    Unsupported { value: String, type_tag: &'static str },
}

impl Argument {
    /// Map a JSON value onto an argument. Floats, arrays and objects have no
    /// bindable form and become `Unsupported`.
    pub fn from_json(value: &serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Argument::Null,
            Value::Bool(b) => Argument::Boolean(*b),
            Value::String(s) => Argument::Text(s.clone()),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Argument::Integer(i),
                None => Argument::Unsupported {
                    value: n.to_string(),
                    type_tag: if n.is_f64() { "float" } else { "number" },
                },
            },
            Value::Array(_) => Argument::Unsupported {
                value: value.to_string(),
                type_tag: "array",
            },
            Value::Object(_) => Argument::Unsupported {
                value: value.to_string(),
                type_tag: "object",
            },
        }
    }
}

impl From<&str> for Argument {
    fn from(s: &str) -> Self {
        Argument::Text(s.to_string())
    }
}

impl From<String> for Argument {
    fn from(s: String) -> Self {
        Argument::Text(s)
    }
}

impl From<Vec<u8>> for Argument {
    fn from(bytes: Vec<u8>) -> Self {
        match String::from_utf8(bytes) {
            Ok(s) => Argument::Text(s),
            Err(e) => Argument::Bytes(e.into_bytes()),
        }
    }
}

impl From<i64> for Argument {
    fn from(i: i64) -> Self {
        Argument::Integer(i)
    }
}

impl From<i32> for Argument {
    fn from(i: i32) -> Self {
        Argument::Integer(i64::from(i))
    }
}

impl From<bool> for Argument {
    fn from(b: bool) -> Self {
        Argument::Boolean(b)
    }
}

impl From<DateTime<FixedOffset>> for Argument {
    fn from(ts: DateTime<FixedOffset>) -> Self {
        Argument::Timestamp(ts)
    }
}

impl From<DateTime<Utc>> for Argument {
    fn from(ts: DateTime<Utc>) -> Self {
        Argument::Timestamp(ts.fixed_offset())
    }
}

impl<T: Into<Argument>> From<Option<T>> for Argument {
    fn from(value: Option<T>) -> Self {
        value.map_or(Argument::Null, Into::into)
    }
}

/// One slot of an argument list
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    /// No binding was supplied for this position
    Unset,
    Bound(Argument),
}

impl Binding {
    pub fn is_unset(&self) -> bool {
        matches!(self, Binding::Unset)
    }
}

/// Dense, 0-indexed list: slot `i` holds the value for placeholder `$(i + 1)`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArgumentList {
    slots: Vec<Binding>,
}

impl ArgumentList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Binding for the 1-based placeholder `$position`
    pub fn get(&self, position: usize) -> Option<&Binding> {
        position.checked_sub(1).and_then(|i| self.slots.get(i))
    }

    /// Bind `$position`, growing the list with `Unset` slots as needed.
    /// Later writes to the same position replace earlier ones.
    pub fn set(&mut self, position: usize, argument: Argument) {
        let Some(index) = position.checked_sub(1) else {
            return;
        };
        if index >= self.slots.len() {
            self.slots.resize(index + 1, Binding::Unset);
        }
        self.slots[index] = Binding::Bound(argument);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Binding> {
        self.slots.iter()
    }
}

impl<A: Into<Argument>> FromIterator<A> for ArgumentList {
    fn from_iter<I: IntoIterator<Item = A>>(iter: I) -> Self {
        ArgumentList {
            slots: iter
                .into_iter()
                .map(|a| Binding::Bound(a.into()))
                .collect(),
        }
    }
}

/// Parse a binding string such as `$1 = 'foo', $2 = 'bar'` into an argument list.
///
/// Positions may appear in any order and with gaps. Every bound value is
/// text; the server does not log parameter types. Values that are not valid
/// UTF-8 are kept as raw bytes. Positions must be in `1..=65535`, the
/// protocol's parameter limit.
pub fn build_args<B: AsRef<[u8]> + ?Sized>(raw: &B) -> Result<ArgumentList, ProcessingError> {
    let mut args = ArgumentList::new();

    for caps in PARAM_SET_RE.captures_iter(raw.as_ref()) {
        let token = &caps[1];
        let position = std::str::from_utf8(token)
            .ok()
            .and_then(|t| t.parse::<u16>().ok())
            .filter(|&n| n > 0)
            .ok_or_else(|| ProcessingError::MalformedParameterIndex {
                token: format!("${}", String::from_utf8_lossy(token)),
            })?;
        args.set(usize::from(position), Argument::from(caps[2].to_vec()));
    }

    Ok(args)
}
