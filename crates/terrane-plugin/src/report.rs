//! Collected validation errors.

use std::fmt;

/// Field-level error messages gathered while validating parameters.
///
/// Validation keeps going after the first problem so that every bad
/// field is reported at once.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ErrorReport {
    entries: Vec<(String, String)>,
}

impl ErrorReport {
    /// An empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `message` against `field` when `failed` holds. Returns
    /// `failed` so checks can be chained into early returns.
    pub fn report(&mut self, failed: bool, field: &str, message: impl Into<String>) -> bool {
        if failed {
            self.push(field, message);
        }
        failed
    }

    /// Record an error unconditionally.
    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.entries.push((field.to_owned(), message.into()));
    }

    /// Whether no errors were recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of recorded errors.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `(field, message)` pairs in the order they were recorded.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(f, m)| (f.as_str(), m.as_str()))
    }

    /// Whether any error was recorded against `field`.
    pub fn has_field(&self, field: &str) -> bool {
        self.entries.iter().any(|(f, _)| f == field)
    }
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, message)) in self.entries.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{field}: {message}")?;
        }
        Ok(())
    }
}
