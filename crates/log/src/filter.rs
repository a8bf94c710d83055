//! Record filters

use std::fmt;

use crate::record::Record;

/// Decides whether a record goes on
pub trait Filter: Send + Sync + fmt::Debug {
    /// `true` to keep the record
    fn filter(&self, record: &Record) -> bool;
}

/// Passes records from one logger and its descendants.
///
/// `NameFilter::new("a.b")` passes `a.b` and `a.b.c`, but not `a.bc`.
/// An empty name passes everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameFilter {
    name: String,
}

impl NameFilter {
    /// Filter on `name`
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The logger name this filter passes
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Filter for NameFilter {
    fn filter(&self, record: &Record) -> bool {
        if self.name.is_empty() {
            return true;
        }
        match record.name.strip_prefix(&self.name) {
            Some(rest) => rest.is_empty() || rest.starts_with('.'),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Level;
    use rstest::rstest;

    #[rstest]
    #[case("", "anything", true)]
    #[case("a.b", "a.b", true)]
    #[case("a.b", "a.b.c", true)]
    #[case("a.b", "a.bc", false)]
    #[case("a.b", "a", false)]
    #[case("a.b", "x.a.b", false)]
    fn test_name_filter(#[case] filter: &str, #[case] logger: &str, #[case] passes: bool) {
        let record = Record::new(logger, Level::Info, "x");
        assert_eq!(NameFilter::new(filter).filter(&record), passes);
    }
}
