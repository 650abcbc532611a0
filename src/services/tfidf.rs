use std::collections::{BTreeMap, BTreeSet};

use super::features::FeatureMatrix;

/// Tokens shorter than this are dropped
const MIN_TOKEN_LEN: usize = 2;

/// Splits text into lower-cased word tokens.
///
/// A token is a maximal run of alphanumeric or `_` characters at least
/// `MIN_TOKEN_LEN` characters long.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|token| token.chars().count() >= MIN_TOKEN_LEN)
        .map(str::to_lowercase)
        .collect()
}

/// Term-frequency × inverse-document-frequency model fitted on one corpus.
///
/// tfidf(t, d) = count(t, d) × idf(t), with the smoothed
/// idf(t) = ln((1 + n) / (1 + df(t))) + 1, and every document row
/// L2-normalised. Documents without any token become zero rows.
#[derive(Debug, Clone, Default)]
pub struct TfidfVectorizer {
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Learns the vocabulary and idf weights from `documents`
    pub fn fit<S: AsRef<str>>(&mut self, documents: &[S]) {
        let mut doc_freq: BTreeMap<String, usize> = BTreeMap::new();
        for doc in documents {
            let distinct: BTreeSet<String> = tokenize(doc.as_ref()).into_iter().collect();
            for term in distinct {
                *doc_freq.entry(term).or_insert(0) += 1;
            }
        }

        let n = documents.len() as f64;
        self.vocabulary = doc_freq
            .keys()
            .enumerate()
            .map(|(i, term)| (term.clone(), i))
            .collect();
        self.idf = doc_freq
            .values()
            .map(|&df| ((1.0 + n) / (1.0 + df as f64)).ln() + 1.0)
            .collect();
    }

    /// Vectorizes `documents` against the fitted vocabulary.
    /// Terms outside the vocabulary are ignored.
    pub fn transform<S: AsRef<str>>(&self, documents: &[S]) -> FeatureMatrix {
        let mut matrix = FeatureMatrix::zeros(documents.len(), self.vocabulary.len());
        for (row, doc) in documents.iter().enumerate() {
            let values = matrix.row_mut(row);
            for token in tokenize(doc.as_ref()) {
                if let Some(&col) = self.vocabulary.get(&token) {
                    values[col] += 1.0;
                }
            }
            for (value, idf) in values.iter_mut().zip(&self.idf) {
                *value *= idf;
            }
            let norm = values.iter().map(|v| v * v).sum::<f64>().sqrt();
            if norm > 0.0 {
                values.iter_mut().for_each(|v| *v /= norm);
            }
        }
        matrix
    }

    pub fn fit_transform<S: AsRef<str>>(&mut self, documents: &[S]) -> FeatureMatrix {
        self.fit(documents);
        self.transform(documents)
    }

    pub fn vocabulary(&self) -> &BTreeMap<String, usize> {
        &self.vocabulary
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }
}
