use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::time::Instant;

use tracing::{info, instrument};

use crate::error::{EmbeddingResult, FileError};
use crate::model::EmbeddingModel;
use crate::persistence::{ensure_non_empty, save_embeddings};
use crate::word2vec::{Word2Vec, Word2VecConfig};

/// Trains the default CBOW model on `input` and writes vectors to `output`.
///
/// # Errors
///
/// | condition                         | kind                |
/// |-----------------------------------|---------------------|
/// | `input` does not exist            | `FileNotFound`      |
/// | `input` is zero bytes             | `FileEmpty`         |
/// | `input` cannot be opened          | `FileLoadingError`  |
/// | model cannot be built or trained  | `ModelLoadingError` |
/// | `output` cannot be created/written| `FileCreationError` |
pub fn train(input: impl AsRef<Path>, output: impl AsRef<Path>) -> EmbeddingResult<()> {
    let input = input.as_ref();
    let model = Word2Vec::new(Word2VecConfig::default()).map_err(|e| FileError::model_loading(input, e))?;
    train_with(model, input, output)
}

/// Same as [`train`] with a caller-supplied model
#[instrument(skip_all, fields(input = %input.as_ref().display(), output = %output.as_ref().display()))]
pub fn train_with<M: EmbeddingModel>(
    mut model: M,
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
) -> EmbeddingResult<()> {
    let input = input.as_ref();
    let output = output.as_ref();
    let started = Instant::now();

    let bytes = ensure_non_empty(input)?;
    let file = File::open(input).map_err(|e| FileError::loading(input, e))?;

    model
        .train(&mut BufReader::new(file))
        .map_err(|e| FileError::model_loading(input, e))?;

    let out = File::create(output).map_err(|e| FileError::creation(output, e))?;
    let records = model.embeddings();
    save_embeddings(&records, BufWriter::new(out)).map_err(|e| FileError::creation(output, e))?;

    info!(
        corpus_bytes = bytes,
        words = records.len(),
        dimension = model.dimension(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Embeddings trained and saved"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BoxError, FileErrorKind};
    use crate::models::EmbeddingRecord;
    use std::fs;
    use std::io::BufRead;

    struct FailingModel;

    impl EmbeddingModel for FailingModel {
        fn train(&mut self, _corpus: &mut dyn BufRead) -> Result<(), BoxError> {
            Err("diverged".into())
        }

        fn embeddings(&self) -> Vec<EmbeddingRecord> {
            Vec::new()
        }

        fn dimension(&self) -> usize {
            3
        }
    }

    struct FixedModel;

    impl EmbeddingModel for FixedModel {
        fn train(&mut self, _corpus: &mut dyn BufRead) -> Result<(), BoxError> {
            Ok(())
        }

        fn embeddings(&self) -> Vec<EmbeddingRecord> {
            vec![EmbeddingRecord::new("a", vec![1.0, 2.0])]
        }

        fn dimension(&self) -> usize {
            2
        }
    }

    #[test]
    fn test_missing_input_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = train(dir.path().join("nope.txt"), dir.path().join("out.txt")).unwrap_err();
        assert_eq!(err.kind(), FileErrorKind::FileNotFound);
        assert!(!dir.path().join("out.txt").exists());
    }

    #[test]
    fn test_empty_input_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("corpus.txt");
        fs::write(&input, "").unwrap();
        let err = train(&input, dir.path().join("out.txt")).unwrap_err();
        assert_eq!(err.kind(), FileErrorKind::FileEmpty);
    }

    #[test]
    fn test_model_failure_is_model_loading() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("corpus.txt");
        fs::write(&input, "some words").unwrap();
        let err = train_with(FailingModel, &input, dir.path().join("out.txt")).unwrap_err();
        assert_eq!(err.kind(), FileErrorKind::ModelLoadingError);
    }

    #[test]
    fn test_unwritable_output_is_creation_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("corpus.txt");
        fs::write(&input, "some words").unwrap();
        let output = dir.path().join("no-such-dir").join("out.txt");
        let err = train_with(FixedModel, &input, &output).unwrap_err();
        assert_eq!(err.kind(), FileErrorKind::FileCreationError);
    }

    #[test]
    fn test_writes_model_vectors() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("corpus.txt");
        let output = dir.path().join("out.txt");
        fs::write(&input, "a").unwrap();
        train_with(FixedModel, &input, &output).unwrap();
        assert_eq!(fs::read_to_string(&output).unwrap(), "a 1.000000 2.000000\n");
    }
}
