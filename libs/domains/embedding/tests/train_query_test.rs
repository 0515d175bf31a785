use std::fs;

use domain_embedding::{
    FileErrorKind, Searcher, Word2Vec, Word2VecConfig, is_kind, load_embeddings, query_similar,
    train, train_with,
};

const CORPUS: &str = "\
the cat chased the mouse around the house
the dog chased the cat around the yard
a cat and a dog are pets
the mouse ate the cheese in the house
the dog ate the bone in the yard
";

#[test]
fn test_train_then_query_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let corpus = dir.path().join("corpus.txt");
    let vectors = dir.path().join("vectors.txt");
    fs::write(&corpus, CORPUS).unwrap();

    train(&corpus, &vectors).unwrap();

    let records = load_embeddings(&vectors).unwrap();
    let vocabulary: Vec<&str> = records.iter().map(|r| r.word.as_str()).collect();
    assert!(vocabulary.contains(&"cat"));
    assert!(vocabulary.contains(&"cheese"));
    assert!(records.iter().all(|r| r.vector.len() == 10));

    let neighbors = query_similar("cat", &vectors, 10).unwrap();
    assert_eq!(neighbors.len(), 10);
    assert!(!neighbors.words().contains(&"cat"));
    let sims: Vec<f32> = neighbors.iter().map(|n| n.similarity).collect();
    assert!(sims.windows(2).all(|w| w[0] >= w[1]));
}

#[test]
fn test_seeded_training_is_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    let corpus = dir.path().join("corpus.txt");
    fs::write(&corpus, CORPUS).unwrap();

    let config = Word2VecConfig::new().with_seed(42).with_dimension(8);
    let first = dir.path().join("a.txt");
    let second = dir.path().join("b.txt");
    train_with(Word2Vec::new(config.clone()).unwrap(), &corpus, &first).unwrap();
    train_with(Word2Vec::new(config).unwrap(), &corpus, &second).unwrap();

    assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());
}

#[test]
fn test_errors_are_classified_by_kind() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.txt");
    let empty = dir.path().join("empty.txt");
    fs::write(&empty, "").unwrap();

    let err = train(&missing, dir.path().join("out.txt")).unwrap_err();
    assert!(is_kind(&err, FileErrorKind::FileNotFound));

    let err = train(&empty, dir.path().join("out.txt")).unwrap_err();
    assert!(is_kind(&err, FileErrorKind::FileEmpty));

    let err = query_similar("cat", &empty, 10).unwrap_err();
    assert!(is_kind(&err, FileErrorKind::FileEmpty));
}

#[test]
fn test_saved_vectors_feed_searcher_directly() {
    let dir = tempfile::tempdir().unwrap();
    let corpus = dir.path().join("corpus.txt");
    let vectors = dir.path().join("vectors.txt");
    fs::write(&corpus, CORPUS).unwrap();
    train(&corpus, &vectors).unwrap();

    let searcher = Searcher::new(load_embeddings(&vectors).unwrap()).unwrap();
    let dog = searcher.vector("dog").unwrap().to_vec();
    let hits = searcher.search_vector(&dog, 1).unwrap();
    assert_eq!(hits.words(), vec!["dog"]);
}

#[test]
fn test_whitespace_only_corpus_trains_to_empty_vectors() {
    let dir = tempfile::tempdir().unwrap();
    let corpus = dir.path().join("blank.txt");
    let vectors = dir.path().join("vectors.txt");
    fs::write(&corpus, "\n   \n").unwrap();

    train(&corpus, &vectors).unwrap();

    assert_eq!(fs::read_to_string(&vectors).unwrap(), "");
    let err = query_similar("cat", &vectors, 10).unwrap_err();
    assert!(is_kind(&err, FileErrorKind::FileEmpty));
}
