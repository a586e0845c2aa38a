//! Path exclusion filter
//!
//! A path is excluded when it contains any of the configured substrings or
//! matches any of the configured regular expressions. Matching is done on the
//! raw path bytes so non-UTF-8 names are filtered like any other.

use crate::error::ConfigError;
use regex::bytes::Regex;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

/// Set of substrings and patterns that drop a path from collection
#[derive(Debug, Clone, Default)]
pub struct ExclusionFilter {
    substrings: Vec<Vec<u8>>,
    patterns: Vec<Regex>,
}

impl ExclusionFilter {
    /// Build a filter from plain substrings and regex sources
    pub fn new<S: Into<String>>(
        substrings: impl IntoIterator<Item = S>,
        patterns: &[String],
    ) -> Result<Self, ConfigError> {
        let patterns = patterns
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|e| ConfigError::InvalidExcludePattern {
                    pattern: p.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            substrings: Self::normalize(substrings),
            patterns,
        })
    }

    /// Build a substring-only filter
    pub fn from_substrings<S: Into<String>>(substrings: impl IntoIterator<Item = S>) -> Self {
        Self {
            substrings: Self::normalize(substrings),
            patterns: Vec::new(),
        }
    }

    // An empty needle would match every path.
    fn normalize<S: Into<String>>(substrings: impl IntoIterator<Item = S>) -> Vec<Vec<u8>> {
        substrings
            .into_iter()
            .map(Into::into)
            .filter(|s| !s.is_empty())
            .map(String::into_bytes)
            .collect()
    }

    /// True when nothing would ever be excluded
    pub fn is_empty(&self) -> bool {
        self.substrings.is_empty() && self.patterns.is_empty()
    }

    /// Check if a path should be excluded
    pub fn is_excluded(&self, path: impl AsRef<Path>) -> bool {
        let bytes = path.as_ref().as_os_str().as_bytes();

        self.substrings
            .iter()
            .any(|needle| contains(bytes, needle))
            || self.patterns.iter().any(|re| re.is_match(bytes))
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filter_excludes_nothing() {
        let filter = ExclusionFilter::default();
        assert!(filter.is_empty());
        assert!(!filter.is_excluded("/data/file.txt"));
    }

    #[test]
    fn test_substring_match() {
        let filter = ExclusionFilter::from_substrings([".snapshot"]);
        assert!(filter.is_excluded("/data/.snapshot/hourly.0"));
        assert!(!filter.is_excluded("/data/myfile.txt"));
    }

    #[test]
    fn test_substring_matches_anywhere_in_path() {
        let filter = ExclusionFilter::from_substrings(["tmp"]);
        assert!(filter.is_excluded("/tmpdir/a"));
        assert!(filter.is_excluded("/a/b.tmp"));
        assert!(!filter.is_excluded("/a/b.txt"));
    }

    #[test]
    fn test_empty_substring_ignored() {
        let filter = ExclusionFilter::from_substrings([""]);
        assert!(filter.is_empty());
        assert!(!filter.is_excluded("/anything"));
    }

    #[test]
    fn test_regex_match() {
        let filter = ExclusionFilter::new(Vec::<String>::new(), &[r"\.o$".to_string()]).unwrap();
        assert!(filter.is_excluded("/build/main.o"));
        assert!(!filter.is_excluded("/build/main.objc"));
    }

    #[test]
    fn test_non_utf8_path() {
        use std::ffi::OsStr;

        let filter = ExclusionFilter::from_substrings(["skip"]);
        let path = Path::new(OsStr::from_bytes(b"/data/\xffskip"));
        assert!(filter.is_excluded(path));
    }
}
