use std::path::PathBuf;

use core_config::{ConfigError, FromEnv, env_or_default, env_parse_or};
use domain_embedding::DEFAULT_NEIGHBORS;

/// Pipeline settings, read from `WORDS_*` variables
#[derive(Debug, Clone)]
pub struct WordsConfig {
    pub corpus_path: PathBuf,
    pub vectors_path: PathBuf,
    /// Word whose neighbours are looked up
    pub query: String,
    pub collection: String,
    pub top_k: usize,
    /// Rows per insert request
    pub insert_batch_size: usize,
    pub drop_on_exit: bool,
}

impl Default for WordsConfig {
    fn default() -> Self {
        Self {
            corpus_path: PathBuf::from("data/corpus.txt"),
            vectors_path: PathBuf::from("data/vectors.txt"),
            query: "cat".to_string(),
            collection: "words".to_string(),
            top_k: DEFAULT_NEIGHBORS,
            insert_batch_size: 1000,
            drop_on_exit: false,
        }
    }
}

impl FromEnv for WordsConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let top_k = env_parse_or("WORDS_TOP_K", defaults.top_k)?;
        if top_k == 0 {
            return Err(ConfigError::ParseError {
                key: "WORDS_TOP_K".to_string(),
                details: "must be positive".to_string(),
            });
        }
        let insert_batch_size = env_parse_or("WORDS_INSERT_BATCH_SIZE", defaults.insert_batch_size)?;
        if insert_batch_size == 0 {
            return Err(ConfigError::ParseError {
                key: "WORDS_INSERT_BATCH_SIZE".to_string(),
                details: "must be positive".to_string(),
            });
        }

        Ok(Self {
            corpus_path: PathBuf::from(env_or_default("WORDS_CORPUS_PATH", "data/corpus.txt")),
            vectors_path: PathBuf::from(env_or_default("WORDS_VECTORS_PATH", "data/vectors.txt")),
            query: env_or_default("WORDS_QUERY", &defaults.query),
            collection: env_or_default("WORDS_COLLECTION", &defaults.collection),
            top_k,
            insert_batch_size,
            drop_on_exit: env_parse_or("WORDS_DROP_ON_EXIT", defaults.drop_on_exit)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VARS: [&str; 7] = [
        "WORDS_CORPUS_PATH",
        "WORDS_VECTORS_PATH",
        "WORDS_QUERY",
        "WORDS_COLLECTION",
        "WORDS_TOP_K",
        "WORDS_INSERT_BATCH_SIZE",
        "WORDS_DROP_ON_EXIT",
    ];

    #[test]
    fn test_defaults_when_unset() {
        temp_env::with_vars_unset(VARS, || {
            let config = WordsConfig::from_env().unwrap();
            assert_eq!(config.corpus_path, PathBuf::from("data/corpus.txt"));
            assert_eq!(config.collection, "words");
            assert_eq!(config.top_k, 10);
            assert!(!config.drop_on_exit);
        });
    }

    #[test]
    fn test_reads_overrides() {
        temp_env::with_vars(
            [
                ("WORDS_CORPUS_PATH", Some("/tmp/text8")),
                ("WORDS_QUERY", Some("king")),
                ("WORDS_TOP_K", Some("5")),
                ("WORDS_DROP_ON_EXIT", Some("true")),
            ],
            || {
                let config = WordsConfig::from_env().unwrap();
                assert_eq!(config.corpus_path, PathBuf::from("/tmp/text8"));
                assert_eq!(config.query, "king");
                assert_eq!(config.top_k, 5);
                assert!(config.drop_on_exit);
            },
        );
    }

    #[test]
    fn test_rejects_zero_top_k() {
        temp_env::with_var("WORDS_TOP_K", Some("0"), || {
            let err = WordsConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("WORDS_TOP_K"));
        });
    }

    #[test]
    fn test_rejects_unparseable_flag() {
        temp_env::with_var("WORDS_DROP_ON_EXIT", Some("sometimes"), || {
            assert!(WordsConfig::from_env().is_err());
        });
    }
}
