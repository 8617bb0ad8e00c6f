use crate::error::{AppError, Result};
use ndarray::{Array1, Array2};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Vectorizer hyperparameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorizerConfig {
    /// Maximum vocabulary size after pruning
    #[serde(default = "default_max_vocab_size")]
    pub max_vocab_size: usize,

    /// Minimum number of documents a term must appear in
    #[serde(default = "default_min_doc_freq")]
    pub min_doc_freq: usize,

    /// Largest n-gram length; 1 means unigrams only
    #[serde(default = "default_ngram_max")]
    pub ngram_max: usize,
}

fn default_max_vocab_size() -> usize {
    5000
}

fn default_min_doc_freq() -> usize {
    2
}

fn default_ngram_max() -> usize {
    2
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            max_vocab_size: default_max_vocab_size(),
            min_doc_freq: default_min_doc_freq(),
            ngram_max: default_ngram_max(),
        }
    }
}

/// TF-IDF vectorizer over preprocessed token sequences
///
/// Vocabulary indices are assigned in a deterministic order (document
/// frequency descending, then term ascending), so fitting twice on the same
/// corpus produces byte-identical state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    /// Configuration
    config: VectorizerConfig,

    /// Vocabulary mapping (term -> index)
    vocabulary: HashMap<String, usize>,

    /// Inverse document frequency per vocabulary index
    idf: Vec<f64>,

    /// Is fitted (vocabulary built)
    fitted: bool,
}

impl TfidfVectorizer {
    /// Create a new vectorizer
    pub fn new(config: VectorizerConfig) -> Self {
        Self {
            config,
            vocabulary: HashMap::new(),
            idf: Vec::new(),
            fitted: false,
        }
    }

    /// Fit the vocabulary and IDF table on a token corpus
    pub fn fit(&mut self, documents: &[Vec<String>]) -> Result<()> {
        if documents.is_empty() {
            return Err(AppError::DataQuality(
                "cannot fit vectorizer on an empty corpus".to_string(),
            ));
        }

        let mut term_doc_freq: HashMap<String, usize> = HashMap::new();
        for tokens in documents {
            let unique_terms: HashSet<String> = self.ngrams(tokens).into_iter().collect();
            for term in unique_terms {
                *term_doc_freq.entry(term).or_insert(0) += 1;
            }
        }

        // Filter vocabulary by document frequency
        let min_df = self.config.min_doc_freq;
        let mut vocab_list: Vec<(String, usize)> = term_doc_freq
            .into_iter()
            .filter(|(_, freq)| *freq >= min_df)
            .collect();

        // Deterministic order: frequency descending, term ascending on ties
        vocab_list.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        vocab_list.truncate(self.config.max_vocab_size);

        if vocab_list.is_empty() {
            return Err(AppError::DataQuality(format!(
                "vocabulary is empty after pruning (min_doc_freq = {min_df}); corpus too small or too sparse"
            )));
        }

        let n_docs = documents.len() as f64;
        self.idf = vocab_list
            .iter()
            .map(|(_, doc_freq)| (n_docs / (1.0 + *doc_freq as f64)).ln() + 1.0)
            .collect();

        self.vocabulary = vocab_list
            .into_iter()
            .enumerate()
            .map(|(idx, (term, _))| (term, idx))
            .collect();

        self.fitted = true;

        Ok(())
    }

    /// Transform a token sequence into an L2-normalized TF-IDF vector
    ///
    /// Terms outside the vocabulary are ignored. A document with no known
    /// terms transforms to the zero vector rather than an error.
    pub fn transform(&self, tokens: &[String]) -> Result<Array1<f64>> {
        if !self.fitted {
            return Err(AppError::Internal(
                "TfidfVectorizer must be fitted before transform".to_string(),
            ));
        }

        let mut features = Array1::zeros(self.vocabulary.len());

        let mut term_counts: HashMap<String, usize> = HashMap::new();
        for term in self.ngrams(tokens) {
            *term_counts.entry(term).or_insert(0) += 1;
        }

        for (term, count) in &term_counts {
            if let Some(&idx) = self.vocabulary.get(term) {
                features[idx] = *count as f64 * self.idf[idx];
            }
        }

        // L2 normalization
        let norm = features.dot(&features).sqrt();
        if norm > 0.0 {
            features.mapv_inplace(|v| v / norm);
        }

        Ok(features)
    }

    /// Transform a batch of documents into a feature matrix
    pub fn transform_batch(&self, documents: &[Vec<String>]) -> Result<Array2<f64>> {
        let rows: Vec<Array1<f64>> = documents
            .par_iter()
            .map(|tokens| self.transform(tokens))
            .collect::<Result<Vec<_>>>()?;

        let mut matrix = Array2::zeros((documents.len(), self.n_features()));
        for (i, row) in rows.into_iter().enumerate() {
            matrix.row_mut(i).assign(&row);
        }

        Ok(matrix)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, documents: &[Vec<String>]) -> Result<Array2<f64>> {
        self.fit(documents)?;
        self.transform_batch(documents)
    }

    /// Generate 1..=ngram_max grams, multi-token grams joined with '_'
    fn ngrams(&self, tokens: &[String]) -> Vec<String> {
        let max_n = self.config.ngram_max.max(1);
        let mut terms = Vec::new();

        for n in 1..=max_n {
            for window in tokens.windows(n) {
                terms.push(window.join("_"));
            }
        }

        terms
    }

    /// Get number of features
    pub fn n_features(&self) -> usize {
        self.vocabulary.len()
    }

    /// Get vocabulary size
    pub fn vocab_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// Check if fitted
    pub fn is_fitted(&self) -> bool {
        self.fitted
    }

    /// Vocabulary terms in index order, for manifests and debugging
    pub fn terms(&self) -> Vec<String> {
        let mut entries: Vec<(&String, &usize)> = self.vocabulary.iter().collect();
        entries.sort_by_key(|(_, idx)| **idx);
        entries.into_iter().map(|(term, _)| term.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocessing::tokenize;

    fn test_config() -> VectorizerConfig {
        VectorizerConfig {
            max_vocab_size: 100,
            min_doc_freq: 1,
            ngram_max: 1,
        }
    }

    fn corpus(texts: &[&str]) -> Vec<Vec<String>> {
        texts.iter().map(|t| tokenize(t)).collect()
    }

    #[test]
    fn test_vectorizer_creation() {
        let vectorizer = TfidfVectorizer::new(test_config());
        assert!(!vectorizer.is_fitted());
        assert_eq!(vectorizer.vocab_size(), 0);
    }

    #[test]
    fn test_fit_builds_vocabulary() {
        let docs = corpus(&[
            "great video great editing",
            "terrible video terrible sound",
            "okay video overall",
        ]);

        let mut vectorizer = TfidfVectorizer::new(test_config());
        vectorizer.fit(&docs).unwrap();

        assert!(vectorizer.is_fitted());
        assert!(vectorizer.vocab_size() > 0);
        assert!(vectorizer.terms().contains(&"video".to_string()));
    }

    #[test]
    fn test_transform_dimensions_and_norm() {
        let docs = corpus(&["great video", "terrible video", "boring video again"]);
        let mut vectorizer = TfidfVectorizer::new(test_config());
        vectorizer.fit(&docs).unwrap();

        let vec = vectorizer.transform(&docs[0]).unwrap();
        assert_eq!(vec.len(), vectorizer.n_features());

        let norm = vec.dot(&vec).sqrt();
        assert!((norm - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_tokens_ignored() {
        let docs = corpus(&["great video", "terrible video"]);
        let mut vectorizer = TfidfVectorizer::new(test_config());
        vectorizer.fit(&docs).unwrap();

        let unseen = tokenize("completely unseen words");
        let vec = vectorizer.transform(&unseen).unwrap();
        assert!(vec.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_empty_document_is_zero_vector() {
        let docs = corpus(&["great video", "terrible video"]);
        let mut vectorizer = TfidfVectorizer::new(test_config());
        vectorizer.fit(&docs).unwrap();

        let vec = vectorizer.transform(&[]).unwrap();
        assert!(vec.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_fit_is_deterministic() {
        let docs = corpus(&[
            "love love this channel",
            "hate this channel",
            "channel uploads daily videos",
            "videos load slowly",
        ]);

        let mut a = TfidfVectorizer::new(test_config());
        let mut b = TfidfVectorizer::new(test_config());
        a.fit(&docs).unwrap();
        b.fit(&docs).unwrap();

        assert_eq!(a.terms(), b.terms());
        let va = a.transform(&docs[0]).unwrap();
        let vb = b.transform(&docs[0]).unwrap();
        assert_eq!(va, vb);
    }

    #[test]
    fn test_min_doc_freq_prunes_rare_terms() {
        let docs = corpus(&["common word here", "common word there", "rare appearance"]);
        let config = VectorizerConfig {
            max_vocab_size: 100,
            min_doc_freq: 2,
            ngram_max: 1,
        };

        let mut vectorizer = TfidfVectorizer::new(config);
        vectorizer.fit(&docs).unwrap();

        let terms = vectorizer.terms();
        assert!(terms.contains(&"common".to_string()));
        assert!(!terms.contains(&"rare".to_string()));
    }

    #[test]
    fn test_max_vocab_size_truncates() {
        let docs = corpus(&[
            "alpha beta gamma delta epsilon",
            "alpha beta gamma delta epsilon",
        ]);
        let config = VectorizerConfig {
            max_vocab_size: 3,
            min_doc_freq: 1,
            ngram_max: 1,
        };

        let mut vectorizer = TfidfVectorizer::new(config);
        vectorizer.fit(&docs).unwrap();
        assert_eq!(vectorizer.vocab_size(), 3);
    }

    #[test]
    fn test_bigrams_join_with_underscore() {
        let docs = corpus(&["not good at all honestly", "not good either honestly"]);
        let config = VectorizerConfig {
            max_vocab_size: 100,
            min_doc_freq: 2,
            ngram_max: 2,
        };

        let mut vectorizer = TfidfVectorizer::new(config);
        vectorizer.fit(&docs).unwrap();
        assert!(vectorizer.terms().contains(&"not_good".to_string()));
    }

    #[test]
    fn test_fit_empty_corpus_fails() {
        let mut vectorizer = TfidfVectorizer::new(test_config());
        assert!(vectorizer.fit(&[]).is_err());
    }

    #[test]
    fn test_transform_before_fit_fails() {
        let vectorizer = TfidfVectorizer::new(test_config());
        assert!(vectorizer.transform(&[]).is_err());
    }

    #[test]
    fn test_transform_batch_shape() {
        let docs = corpus(&["great video", "terrible video", "fine video"]);
        let mut vectorizer = TfidfVectorizer::new(test_config());
        let matrix = vectorizer.fit_transform(&docs).unwrap();

        assert_eq!(matrix.nrows(), 3);
        assert_eq!(matrix.ncols(), vectorizer.n_features());
    }
}
