use std::fmt;

/// A word and its dense vector
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingRecord {
    pub word: String,
    pub vector: Vec<f32>,
}

impl EmbeddingRecord {
    pub fn new(word: impl Into<String>, vector: Vec<f32>) -> Self {
        Self {
            word: word.into(),
            vector,
        }
    }

    pub fn dimension(&self) -> usize {
        self.vector.len()
    }
}

/// One entry of a similarity ranking. `rank` starts at 1.
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor {
    pub rank: usize,
    pub word: String,
    pub similarity: f32,
}

/// Nearest neighbours ordered by descending similarity
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Neighbors(Vec<Neighbor>);

impl Neighbors {
    pub fn new(neighbors: Vec<Neighbor>) -> Self {
        Self(neighbors)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Neighbor> {
        self.0.iter()
    }

    pub fn words(&self) -> Vec<&str> {
        self.0.iter().map(|n| n.word.as_str()).collect()
    }

    pub fn into_inner(self) -> Vec<Neighbor> {
        self.0
    }

    /// Human-readable table, one neighbour per line
    pub fn describe(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Neighbors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>4}  {:<24} {:>10}", "RANK", "WORD", "SIMILARITY")?;
        for n in &self.0 {
            writeln!(f, "{:>4}  {:<24} {:>10.6}", n.rank, n.word, n.similarity)?;
        }
        Ok(())
    }
}

impl IntoIterator for Neighbors {
    type Item = Neighbor;
    type IntoIter = std::vec::IntoIter<Neighbor>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Neighbors {
    type Item = &'a Neighbor;
    type IntoIter = std::slice::Iter<'a, Neighbor>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_lists_every_neighbor() {
        let neighbors = Neighbors::new(vec![
            Neighbor {
                rank: 1,
                word: "dog".to_string(),
                similarity: 0.91,
            },
            Neighbor {
                rank: 2,
                word: "mouse".to_string(),
                similarity: 0.42,
            },
        ]);

        let table = neighbors.describe();
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("RANK"));
        assert!(lines[1].contains("dog") && lines[1].contains("0.910000"));
        assert!(lines[2].contains("mouse"));
    }

    #[test]
    fn test_empty_neighbors_still_has_header() {
        let neighbors = Neighbors::default();
        assert!(neighbors.is_empty());
        assert_eq!(neighbors.describe().lines().count(), 1);
    }
}
