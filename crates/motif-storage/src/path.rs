//! Storage path parsing.

use std::fmt;
use std::path::PathBuf;

const SCHEME_SEPARATOR: &str = "://";
const LOCAL_SCHEME: &str = "file";

/// Filesystem family a path belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scheme {
    /// Local filesystem (bare paths and `file://`)
    Local,
    /// Distributed filesystem, keyed by URL scheme (`hdfs`, `s3a`, ...)
    Distributed(String),
}

/// Caller-supplied storage location
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoragePath {
    raw: String,
    scheme: Scheme,
}

impl StoragePath {
    /// Classify a path by its URL scheme
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let scheme = match raw.split_once(SCHEME_SEPARATOR) {
            Some((scheme, _))
                if !scheme.is_empty() && !scheme.eq_ignore_ascii_case(LOCAL_SCHEME) =>
            {
                Scheme::Distributed(scheme.to_ascii_lowercase())
            }
            _ => Scheme::Local,
        };
        Self { raw, scheme }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn scheme(&self) -> &Scheme {
        &self.scheme
    }

    pub fn is_local(&self) -> bool {
        self.scheme == Scheme::Local
    }

    /// Whether both paths name the same object; `/x/a` and `file:///x/a` do
    pub fn same_location(&self, other: &StoragePath) -> bool {
        match (self.local_path(), other.local_path()) {
            (Some(a), Some(b)) => a == b,
            _ => self == other,
        }
    }

    /// Local filesystem path, without any `file://` prefix
    pub fn local_path(&self) -> Option<PathBuf> {
        if !self.is_local() {
            return None;
        }
        let stripped = match self.raw.split_once(SCHEME_SEPARATOR) {
            Some((_, rest)) => rest,
            None => self.raw.as_str(),
        };
        Some(PathBuf::from(stripped))
    }
}

impl fmt::Display for StoragePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<&str> for StoragePath {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl From<String> for StoragePath {
    fn from(raw: String) -> Self {
        Self::parse(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_local_paths() {
        let bare = StoragePath::parse("results/run1");
        assert!(bare.is_local());
        assert_eq!(bare.local_path().unwrap(), Path::new("results/run1"));

        let file = StoragePath::parse("file:///tmp/out");
        assert!(file.is_local());
        assert_eq!(file.local_path().unwrap(), Path::new("/tmp/out"));
    }

    #[test]
    fn test_distributed_paths() {
        let hdfs = StoragePath::parse("HDFS://namenode:8020/user/motif/out");
        assert_eq!(hdfs.scheme(), &Scheme::Distributed("hdfs".to_string()));
        assert_eq!(hdfs.local_path(), None);
        assert_eq!(hdfs.to_string(), "HDFS://namenode:8020/user/motif/out");
    }

    #[test]
    fn test_same_location() {
        let bare = StoragePath::parse("/tmp/out");
        assert!(bare.same_location(&StoragePath::parse("file:///tmp/out")));
        assert!(!bare.same_location(&StoragePath::parse("/tmp/other")));

        let hdfs = StoragePath::parse("hdfs://nn/out");
        assert!(hdfs.same_location(&StoragePath::parse("hdfs://nn/out")));
        assert!(!hdfs.same_location(&StoragePath::parse("s3a://nn/out")));
        assert!(!hdfs.same_location(&bare));
    }
}
