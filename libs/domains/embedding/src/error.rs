use std::error::Error as StdError;
use std::path::{Path, PathBuf};

use strum::{Display, EnumString};
use thiserror::Error;

pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Failure categories for everything that touches embedding files or models.
///
/// Callers branch on these, never on message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
pub enum FileErrorKind {
    FileNotFound,
    FileEmpty,
    FileCreationError,
    FileLoadingError,
    ModelLoadingError,
    ModelSearchError,
}

#[derive(Debug, Error)]
#[error("{kind}: {} - {source}", path.display())]
pub struct FileError {
    kind: FileErrorKind,
    path: PathBuf,
    #[source]
    source: BoxError,
}

pub type EmbeddingResult<T> = Result<T, FileError>;

impl FileError {
    pub fn new(kind: FileErrorKind, path: impl Into<PathBuf>, cause: impl Into<BoxError>) -> Self {
        Self {
            kind,
            path: path.into(),
            source: cause.into(),
        }
    }

    pub fn not_found(path: impl Into<PathBuf>, cause: impl Into<BoxError>) -> Self {
        Self::new(FileErrorKind::FileNotFound, path, cause)
    }

    pub fn empty(path: impl Into<PathBuf>, cause: impl Into<BoxError>) -> Self {
        Self::new(FileErrorKind::FileEmpty, path, cause)
    }

    pub fn creation(path: impl Into<PathBuf>, cause: impl Into<BoxError>) -> Self {
        Self::new(FileErrorKind::FileCreationError, path, cause)
    }

    pub fn loading(path: impl Into<PathBuf>, cause: impl Into<BoxError>) -> Self {
        Self::new(FileErrorKind::FileLoadingError, path, cause)
    }

    pub fn model_loading(path: impl Into<PathBuf>, cause: impl Into<BoxError>) -> Self {
        Self::new(FileErrorKind::ModelLoadingError, path, cause)
    }

    pub fn model_search(path: impl Into<PathBuf>, cause: impl Into<BoxError>) -> Self {
        Self::new(FileErrorKind::ModelSearchError, path, cause)
    }

    pub fn kind(&self) -> FileErrorKind {
        self.kind
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is(&self, kind: FileErrorKind) -> bool {
        self.kind == kind
    }
}

/// True when `err` is a [`FileError`] of the given kind.
///
/// Accepts any error so it also works on boxed or `eyre`-wrapped chains'
/// root causes.
pub fn is_kind(err: &(dyn StdError + 'static), kind: FileErrorKind) -> bool {
    err.downcast_ref::<FileError>()
        .is_some_and(|fe| fe.kind == kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_each_constructor_tags_its_own_kind() {
        let cases = [
            (FileError::not_found("a", "x"), FileErrorKind::FileNotFound),
            (FileError::empty("a", "x"), FileErrorKind::FileEmpty),
            (FileError::creation("a", "x"), FileErrorKind::FileCreationError),
            (FileError::loading("a", "x"), FileErrorKind::FileLoadingError),
            (FileError::model_loading("a", "x"), FileErrorKind::ModelLoadingError),
            (FileError::model_search("a", "x"), FileErrorKind::ModelSearchError),
        ];

        for (err, kind) in cases {
            assert_eq!(err.kind(), kind);
            assert!(is_kind(&err, kind));
        }
    }

    #[test]
    fn test_model_kinds_are_distinct_from_loading() {
        let err = FileError::model_search("vectors.txt", "index build failed");
        assert!(!is_kind(&err, FileErrorKind::FileLoadingError));
        assert!(!is_kind(&err, FileErrorKind::ModelLoadingError));
    }

    #[test]
    fn test_is_kind_rejects_foreign_errors() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "nope");
        assert!(!is_kind(&io_err, FileErrorKind::FileNotFound));
    }

    #[test]
    fn test_display_carries_kind_path_and_cause() {
        let cause = io::Error::new(io::ErrorKind::PermissionDenied, "permission denied");
        let err = FileError::creation("/tmp/out/vectors.txt", cause);
        assert_eq!(
            err.to_string(),
            "FileCreationError: /tmp/out/vectors.txt - permission denied"
        );
        assert!(StdError::source(&err).is_some());
    }

    #[test]
    fn test_kind_parses_from_tag() {
        let kind: FileErrorKind = "FileEmpty".parse().unwrap();
        assert_eq!(kind, FileErrorKind::FileEmpty);
    }
}
