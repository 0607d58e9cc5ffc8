//! Algorithm parameters and action argument strings.

use std::str::FromStr;

use indexmap::IndexMap;

use crate::report::ErrorReport;

/// Separator between action arguments.
pub const ARG_SEPARATOR: &str = "::";

/// Split an action argument string on `::`, trimming each piece.
///
/// An empty or all-whitespace string has no arguments.
pub fn split_args(args: &str) -> Vec<&str> {
    if args.trim().is_empty() {
        return Vec::new();
    }
    args.split(ARG_SEPARATOR).map(str::trim).collect()
}

/// Ordered `key = value` parameters for an algorithm.
///
/// Accessors that can fail record the problem in an [`ErrorReport`] and
/// return `None`, so an algorithm can check every field before bailing
/// out.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Parameters {
    values: IndexMap<String, String>,
}

impl Parameters {
    /// No parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Set `key`, replacing any previous value.
    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(key.to_owned(), value.into());
    }

    /// Parse `key=value` assignments. Malformed items are reported under
    /// their own text and skipped.
    pub fn from_assignments<'a>(
        items: impl IntoIterator<Item = &'a str>,
        errors: &mut ErrorReport,
    ) -> Self {
        let mut params = Self::new();
        for item in items {
            match item.split_once('=') {
                Some((key, value)) if !key.trim().is_empty() => {
                    params.insert(key.trim(), value.trim());
                }
                _ => errors.push(item, "expected key=value"),
            }
        }
        params
    }

    /// Raw value of `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether there are no parameters.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Non-empty value of `key`, reporting it as missing otherwise.
    pub fn require(&self, key: &str, errors: &mut ErrorReport) -> Option<&str> {
        match self.get(key) {
            Some(v) if !v.is_empty() => Some(v),
            _ => {
                errors.push(key, "parameter is required");
                None
            }
        }
    }

    /// Required value of `key` parsed as `T`.
    pub fn parse<T: FromStr>(&self, key: &str, errors: &mut ErrorReport) -> Option<T> {
        let raw = self.require(key, errors)?;
        match raw.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                errors.push(key, format!("cannot parse '{raw}'"));
                None
            }
        }
    }

    /// Optional value of `key` parsed as `T`, or `default` when absent.
    pub fn parse_or<T: FromStr>(&self, key: &str, default: T, errors: &mut ErrorReport) -> Option<T> {
        if self.get(key).is_none_or(str::is_empty) {
            return Some(default);
        }
        self.parse(key, errors)
    }

    /// Required list of numbers separated by whitespace or commas.
    pub fn numbers<T: FromStr>(&self, key: &str, errors: &mut ErrorReport) -> Option<Vec<T>> {
        let raw = self.require(key, errors)?;
        let mut out = Vec::new();
        for piece in raw.split(|c: char| c == ',' || c.is_whitespace()) {
            if piece.is_empty() {
                continue;
            }
            match piece.parse() {
                Ok(v) => out.push(v),
                Err(_) => {
                    errors.push(key, format!("cannot parse '{piece}' as a number"));
                    return None;
                }
            }
        }
        Some(out)
    }

    /// Required list of exactly three numbers.
    pub fn triple(&self, key: &str, errors: &mut ErrorReport) -> Option<[f64; 3]> {
        let values: Vec<f64> = self.numbers(key, errors)?;
        match values.as_slice() {
            &[a, b, c] => Some([a, b, c]),
            _ => {
                errors.push(key, format!("expected 3 numbers, got {}", values.len()));
                None
            }
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Parameters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}
