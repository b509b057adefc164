use crate::types::Record;
use std::collections::HashSet;

/// Matching rules for one parse operation
///
/// A record is reported when its name contains one of the substrings, or
/// when its name ends with one of the domain suffixes *and* its type is one
/// of the accepted record types. Substrings ignore the record type.
///
/// Comparisons are plain byte-wise string operations. No case folding or
/// trailing-dot stripping happens here, so a dataset with mixed-case names
/// will under-match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    records: HashSet<String>,
    domains: Vec<String>,
    substrings: Vec<String>,
}

impl FilterSet {
    /// Create a builder for a filter set
    #[must_use]
    pub fn builder() -> FilterSetBuilder {
        FilterSetBuilder::default()
    }

    /// Returns true if the record should be reported
    #[must_use]
    pub fn matches(&self, record: &Record) -> bool {
        self.matches_substring(&record.name)
            || (self.matches_domain(&record.name) && self.matches_type(&record.record_type))
    }

    /// Returns true if `name` contains any configured substring
    #[must_use]
    pub fn matches_substring(&self, name: &str) -> bool {
        self.substrings.iter().any(|s| name.contains(s.as_str()))
    }

    /// Returns true if `name` ends with any configured domain suffix
    #[must_use]
    pub fn matches_domain(&self, name: &str) -> bool {
        self.domains.iter().any(|d| name.ends_with(d.as_str()))
    }

    /// Returns true if `record_type` is one of the accepted types
    #[must_use]
    pub fn matches_type(&self, record_type: &str) -> bool {
        self.records.contains(record_type)
    }

    /// Accepted record types
    pub fn records(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(String::as_str)
    }

    /// Accepted domain suffixes, each starting with `.`
    #[must_use]
    pub fn domains(&self) -> &[String] {
        &self.domains
    }

    /// Accepted substrings
    #[must_use]
    pub fn substrings(&self) -> &[String] {
        &self.substrings
    }

    /// Returns true if no record can ever match
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.substrings.is_empty() && (self.domains.is_empty() || self.records.is_empty())
    }
}

/// Builder for [`FilterSet`]
///
/// Domains are stored with a leading `.` so that `example.com` only matches
/// names below it and never `notexample.com`. Empty entries are dropped.
#[derive(Debug, Clone, Default)]
pub struct FilterSetBuilder {
    inner: FilterSet,
}

impl FilterSetBuilder {
    /// Accept a record type tag
    #[must_use]
    pub fn record(mut self, record_type: impl Into<String>) -> Self {
        let record_type = record_type.into();
        if !record_type.is_empty() {
            self.inner.records.insert(record_type);
        }
        self
    }

    /// Accept several record type tags
    #[must_use]
    pub fn records<I, S>(self, records: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        records.into_iter().fold(self, |b, r| b.record(r))
    }

    /// Accept names below a domain
    #[must_use]
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        let domain = domain.into();
        if domain.is_empty() || domain == "." {
            return self;
        }
        let suffix = if domain.starts_with('.') {
            domain
        } else {
            format!(".{domain}")
        };
        if !self.inner.domains.contains(&suffix) {
            self.inner.domains.push(suffix);
        }
        self
    }

    /// Accept names below several domains
    #[must_use]
    pub fn domains<I, S>(self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        domains.into_iter().fold(self, |b, d| b.domain(d))
    }

    /// Accept names containing a substring, whatever their type
    #[must_use]
    pub fn substring(mut self, substring: impl Into<String>) -> Self {
        let substring = substring.into();
        if !substring.is_empty() && !self.inner.substrings.contains(&substring) {
            self.inner.substrings.push(substring);
        }
        self
    }

    /// Accept names containing any of several substrings
    #[must_use]
    pub fn substrings<I, S>(self, substrings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        substrings.into_iter().fold(self, |b, s| b.substring(s))
    }

    /// Finish building
    #[must_use]
    pub fn build(self) -> FilterSet {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, record_type: &str) -> Record {
        Record {
            name: name.to_string(),
            record_type: record_type.to_string(),
            value: "127.0.0.1".to_string(),
            timestamp: String::new(),
        }
    }

    #[test]
    fn domain_and_type_must_both_match() {
        let filters = FilterSet::builder()
            .record("a")
            .domain(".example.com")
            .build();

        assert!(filters.matches(&record("a.b.example.com", "a")));
        assert!(!filters.matches(&record("a.b.example.com", "cname")));
        assert!(!filters.matches(&record("a.b.other.com", "a")));
    }

    #[test]
    fn other_domain_does_not_match() {
        let filters = FilterSet::builder()
            .record("a")
            .domain(".other.com")
            .build();
        assert!(!filters.matches(&record("a.b.example.com", "a")));
    }

    #[test]
    fn substring_overrides_type_and_domain() {
        let filters = FilterSet::builder().substring("b.example").build();
        assert!(filters.matches(&record("a.b.example.com", "a")));
        assert!(filters.matches(&record("a.b.example.com", "txt")));
        assert!(!filters.matches(&record("a.c.example.com", "a")));
    }

    #[test]
    fn empty_records_never_match_domains() {
        let filters = FilterSet::builder().domain("example.com").build();
        assert!(!filters.matches(&record("a.example.com", "a")));
        assert!(filters.is_empty());
    }

    #[test]
    fn domain_gets_leading_separator() {
        let filters = FilterSet::builder()
            .record("a")
            .domains(["example.com", ".example.com", "", "."])
            .build();

        assert_eq!(filters.domains(), [".example.com".to_string()]);
        assert!(!filters.matches(&record("notexample.com", "a")));
        assert!(!filters.matches(&record("example.com", "a")));
        assert!(filters.matches(&record("www.example.com", "a")));
    }

    #[test]
    fn type_match_is_case_sensitive() {
        let filters = FilterSet::builder().record("A").domain("foo.tld").build();
        assert!(!filters.matches(&record("x.foo.tld", "a")));
        assert!(filters.matches(&record("x.foo.tld", "A")));
    }

    #[test]
    fn no_normalization_of_names() {
        let filters = FilterSet::builder().record("a").domain("example.com").build();
        assert!(!filters.matches(&record("WWW.EXAMPLE.COM", "a")));
        assert!(!filters.matches(&record("www.example.com.", "a")));
    }

    #[test]
    fn builder_ignores_duplicates_and_empties() {
        let filters = FilterSet::builder()
            .records(["a", "a", ""])
            .substrings(["dev", "", "dev"])
            .build();

        assert_eq!(filters.records().collect::<Vec<_>>(), ["a"]);
        assert_eq!(filters.substrings(), ["dev".to_string()]);
        assert!(!filters.is_empty());
    }
}
