//! Inbound recipient data sources.
//!
//! # Responsibility
//! - Model the objects and lists GET endpoints as one trait.
//! - Provide file-backed and in-memory implementations.
//!
//! # Invariants
//! - Sources return raw bodies; decoding stays in `model::payload`.
//! - One call performs one best-effort fetch; there is no retry.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Endpoint fetch failure.
#[derive(Debug)]
pub enum TransportError {
    Io { path: PathBuf, source: std::io::Error },
    /// The endpoint returned no usable body.
    Unavailable(String),
}

impl TransportError {
    /// Variant name, safe to log.
    pub fn variant_name(&self) -> &'static str {
        match self {
            Self::Io { .. } => "io",
            Self::Unavailable(_) => "unavailable",
        }
    }
}

impl Display for TransportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read `{}`: {source}", path.display())
            }
            Self::Unavailable(endpoint) => write!(f, "endpoint unavailable: {endpoint}"),
        }
    }
}

impl Error for TransportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Unavailable(_) => None,
        }
    }
}

/// The two inbound endpoints feeding the store.
pub trait RecipientSource {
    /// Fetches the `{type: "user"|"submission", objects}` body.
    fn fetch_objects(&self) -> Result<String, TransportError>;
    /// Fetches the `{type: "mailing_list", objects}` body.
    fn fetch_lists(&self) -> Result<String, TransportError>;
}

/// Reads endpoint bodies from JSON files on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSource {
    objects_path: PathBuf,
    lists_path: PathBuf,
}

impl FileSource {
    pub fn new(objects_path: impl Into<PathBuf>, lists_path: impl Into<PathBuf>) -> Self {
        Self {
            objects_path: objects_path.into(),
            lists_path: lists_path.into(),
        }
    }
}

impl RecipientSource for FileSource {
    fn fetch_objects(&self) -> Result<String, TransportError> {
        read_body(&self.objects_path)
    }

    fn fetch_lists(&self) -> Result<String, TransportError> {
        read_body(&self.lists_path)
    }
}

fn read_body(path: &Path) -> Result<String, TransportError> {
    std::fs::read_to_string(path).map_err(|source| TransportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Serves bodies already held in memory, e.g. embedded in a rendered page.
///
/// A missing body behaves like an unreachable endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticSource {
    objects: Option<String>,
    lists: Option<String>,
}

impl StaticSource {
    pub fn new(objects: impl Into<String>, lists: impl Into<String>) -> Self {
        Self {
            objects: Some(objects.into()),
            lists: Some(lists.into()),
        }
    }

    /// Source whose objects endpoint answers but lists endpoint does not.
    pub fn objects_only(objects: impl Into<String>) -> Self {
        Self {
            objects: Some(objects.into()),
            lists: None,
        }
    }

    /// Source with both endpoints unavailable.
    pub fn unavailable() -> Self {
        Self::default()
    }
}

impl RecipientSource for StaticSource {
    fn fetch_objects(&self) -> Result<String, TransportError> {
        self.objects
            .clone()
            .ok_or_else(|| TransportError::Unavailable("objects".to_string()))
    }

    fn fetch_lists(&self) -> Result<String, TransportError> {
        self.lists
            .clone()
            .ok_or_else(|| TransportError::Unavailable("lists".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::{FileSource, RecipientSource, StaticSource, TransportError};
    use std::io::Write;

    #[test]
    fn file_source_reads_both_bodies() {
        let dir = tempfile::tempdir().unwrap();
        let objects_path = dir.path().join("objects.json");
        let lists_path = dir.path().join("lists.json");
        std::fs::File::create(&objects_path)
            .unwrap()
            .write_all(b"{\"type\":\"user\",\"objects\":[]}")
            .unwrap();
        std::fs::write(&lists_path, "{\"type\":\"mailing_list\",\"objects\":[]}").unwrap();

        let source = FileSource::new(&objects_path, &lists_path);
        assert!(source.fetch_objects().unwrap().contains("user"));
        assert!(source.fetch_lists().unwrap().contains("mailing_list"));
    }

    #[test]
    fn file_source_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileSource::new(dir.path().join("nope.json"), dir.path().join("nope2.json"));
        let err = source.fetch_objects().unwrap_err();
        assert!(matches!(err, TransportError::Io { .. }));
    }

    #[test]
    fn static_source_without_lists_is_unavailable() {
        let source = StaticSource::objects_only("{}");
        assert_eq!(source.fetch_objects().unwrap(), "{}");
        assert!(matches!(
            source.fetch_lists(),
            Err(TransportError::Unavailable(_))
        ));
    }
}
