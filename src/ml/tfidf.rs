//! TF-IDF vectorizer for text feature extraction.
//!
//! Fitting builds a bounded [`Vocabulary`] of word unigrams and bigrams and
//! one smoothed IDF weight per term. Transforming a message produces a sparse
//! vector whose dimension is always the vocabulary size:
//!
//! ```text
//! weight(t) = (1 + ln(count(t))) * idf(t)      (sublinear tf)
//! idf(t)    = ln((1 + n) / (1 + df(t))) + 1    (smoothed)
//! ```
//!
//! followed by L2 normalization of the whole vector.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use sprs::CsVec;

use crate::analysis::analyzer::{Analyzer, StandardAnalyzer, StandardAnalyzerConfig};
use crate::analysis::ngram::word_ngrams;
use crate::error::{Result, SpamError};

/// Vector normalization applied after TF-IDF weighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    /// Euclidean unit length.
    L2,
    /// Absolute values sum to one.
    L1,
    /// Raw TF-IDF weights.
    None,
}

/// Configuration for [`TfIdfVectorizer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TfIdfConfig {
    /// Tokenization settings.
    pub analyzer: StandardAnalyzerConfig,
    /// Inclusive range of word n-gram lengths.
    pub ngram_range: (usize, usize),
    /// Minimum number of documents a term must appear in.
    pub min_df: usize,
    /// Maximum fraction of documents a term may appear in.
    pub max_df: f64,
    /// Upper bound on vocabulary size; most frequent terms are kept.
    pub max_features: Option<usize>,
    /// Use `1 + ln(tf)` instead of raw counts.
    pub sublinear_tf: bool,
    /// Add one to document frequencies as if an extra document held every term.
    pub smooth_idf: bool,
    /// Output normalization.
    pub norm: Norm,
}

impl Default for TfIdfConfig {
    fn default() -> Self {
        Self {
            analyzer: StandardAnalyzerConfig::default(),
            ngram_range: (1, 2),
            min_df: 2,
            max_df: 1.0,
            max_features: Some(5000),
            sublinear_tf: true,
            smooth_idf: true,
            norm: Norm::L2,
        }
    }
}

impl TfIdfConfig {
    /// Check that every value is in range.
    pub fn validate(&self) -> Result<()> {
        let (min_n, max_n) = self.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(SpamError::invalid_config(format!(
                "ngram_range must satisfy 1 <= min <= max, got ({min_n}, {max_n})"
            )));
        }
        if self.min_df == 0 {
            return Err(SpamError::invalid_config("min_df must be at least 1"));
        }
        if !(self.max_df > 0.0 && self.max_df <= 1.0) {
            return Err(SpamError::invalid_config(format!(
                "max_df must be in (0, 1], got {}",
                self.max_df
            )));
        }
        if self.max_features == Some(0) {
            return Err(SpamError::invalid_config("max_features must be positive"));
        }
        Ok(())
    }
}

/// Immutable, lexicographically ordered term → feature index mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vocabulary {
    /// Sorted terms; a term's position is its feature index.
    terms: Vec<String>,
}

impl Vocabulary {
    /// Build a vocabulary from arbitrary terms; duplicates are collapsed.
    pub fn from_terms<I: IntoIterator<Item = String>>(terms: I) -> Self {
        let mut terms: Vec<String> = terms.into_iter().collect();
        terms.sort_unstable();
        terms.dedup();
        Self { terms }
    }

    /// Feature index of a term.
    pub fn get(&self, term: &str) -> Option<usize> {
        self.terms
            .binary_search_by(|probe| probe.as_str().cmp(term))
            .ok()
    }

    /// Term stored at a feature index.
    pub fn term(&self, index: usize) -> Option<&str> {
        self.terms.get(index).map(String::as_str)
    }

    pub fn contains(&self, term: &str) -> bool {
        self.get(term).is_some()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Terms in feature-index order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(String::as_str)
    }
}

/// TF-IDF vectorizer for text feature extraction.
#[derive(Clone, Serialize, Deserialize)]
pub struct TfIdfVectorizer {
    config: TfIdfConfig,
    /// Analyzer for tokenization.
    analyzer: StandardAnalyzer,
    /// Fitted vocabulary; empty until `fit`.
    vocabulary: Vocabulary,
    /// Inverse document frequency for each vocabulary term.
    idf: Vec<f64>,
    /// Number of documents seen during fitting.
    n_documents: usize,
}

impl std::fmt::Debug for TfIdfVectorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TfIdfVectorizer")
            .field("vocabulary_size", &self.vocabulary.len())
            .field("n_documents", &self.n_documents)
            .field("ngram_range", &self.config.ngram_range)
            .field("analyzer", &self.analyzer.name())
            .finish()
    }
}

impl TfIdfVectorizer {
    /// Create an unfitted vectorizer.
    pub fn new(config: TfIdfConfig) -> Result<Self> {
        config.validate()?;
        let analyzer = StandardAnalyzer::with_config(config.analyzer.clone())?;
        Ok(Self {
            config,
            analyzer,
            vocabulary: Vocabulary::default(),
            idf: Vec::new(),
            n_documents: 0,
        })
    }

    pub fn config(&self) -> &TfIdfConfig {
        &self.config
    }

    pub fn is_fitted(&self) -> bool {
        !self.vocabulary.is_empty()
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn idf(&self) -> &[f64] {
        &self.idf
    }

    pub fn n_documents(&self) -> usize {
        self.n_documents
    }

    /// Analyze a document and expand it into the configured n-grams.
    pub fn build_ngrams(&self, document: &str) -> Result<Vec<String>> {
        let terms = self.analyzer.terms(document)?;
        let (min_n, max_n) = self.config.ngram_range;
        Ok(word_ngrams(&terms, min_n, max_n))
    }

    /// Learn the vocabulary and IDF weights from a corpus.
    pub fn fit(&mut self, documents: &[String]) -> Result<()> {
        if documents.is_empty() {
            return Err(SpamError::malformed("cannot fit vectorizer on an empty corpus"));
        }

        let n_documents = documents.len();
        let mut document_frequency: AHashMap<String, usize> = AHashMap::new();
        let mut total_frequency: AHashMap<String, usize> = AHashMap::new();

        for doc in documents {
            let mut counts: AHashMap<String, usize> = AHashMap::new();
            for ngram in self.build_ngrams(doc)? {
                *counts.entry(ngram).or_insert(0) += 1;
            }
            for (term, count) in counts {
                *total_frequency.entry(term.clone()).or_insert(0) += count;
                *document_frequency.entry(term).or_insert(0) += 1;
            }
        }

        let max_doc_count = self.config.max_df * n_documents as f64;
        let mut eligible: Vec<(String, usize)> = total_frequency
            .into_iter()
            .filter(|(term, _)| {
                let df = document_frequency[term];
                df >= self.config.min_df && df as f64 <= max_doc_count
            })
            .collect();

        if eligible.is_empty() {
            return Err(SpamError::malformed(format!(
                "no terms appear in at least {} documents; the corpus is too small",
                self.config.min_df
            )));
        }

        let candidates = eligible.len();
        if let Some(limit) = self.config.max_features
            && eligible.len() > limit
        {
            eligible.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
            eligible.truncate(limit);
        }

        let vocabulary = Vocabulary::from_terms(eligible.into_iter().map(|(term, _)| term));
        let smooth = if self.config.smooth_idf { 1.0 } else { 0.0 };
        let idf = vocabulary
            .iter()
            .map(|term| {
                let df = document_frequency[term] as f64;
                ((n_documents as f64 + smooth) / (df + smooth)).ln() + 1.0
            })
            .collect();

        log::debug!(
            "Vectorizer fitted on {} documents: {} candidate terms, vocabulary size {}",
            n_documents,
            candidates,
            vocabulary.len()
        );

        self.vocabulary = vocabulary;
        self.idf = idf;
        self.n_documents = n_documents;

        Ok(())
    }

    /// Transform a document into a TF-IDF feature vector.
    ///
    /// Terms outside the vocabulary are ignored; a document with no known terms
    /// yields an all-zero vector.
    pub fn transform(&self, document: &str) -> Result<CsVec<f64>> {
        if !self.is_fitted() {
            return Err(SpamError::not_trained("vectorizer has not been fitted"));
        }

        let mut counts: AHashMap<usize, usize> = AHashMap::new();
        for ngram in self.build_ngrams(document)? {
            if let Some(idx) = self.vocabulary.get(&ngram) {
                *counts.entry(idx).or_insert(0) += 1;
            }
        }

        let mut entries: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(idx, count)| {
                let tf = if self.config.sublinear_tf {
                    1.0 + (count as f64).ln()
                } else {
                    count as f64
                };
                (idx, tf * self.idf[idx])
            })
            .collect();
        entries.sort_unstable_by_key(|(idx, _)| *idx);

        let norm = match self.config.norm {
            Norm::L2 => entries.iter().map(|(_, v)| v * v).sum::<f64>().sqrt(),
            Norm::L1 => entries.iter().map(|(_, v)| v.abs()).sum::<f64>(),
            Norm::None => 1.0,
        };
        let norm = if norm > 0.0 { norm } else { 1.0 };

        let (indices, data): (Vec<usize>, Vec<f64>) =
            entries.into_iter().map(|(idx, v)| (idx, v / norm)).unzip();

        Ok(CsVec::new(self.vocabulary.len(), indices, data))
    }

    /// Transform many documents.
    pub fn transform_batch(&self, documents: &[String]) -> Result<Vec<CsVec<f64>>> {
        documents.iter().map(|doc| self.transform(doc)).collect()
    }

    /// Fit on a corpus and return its transformed vectors.
    pub fn fit_transform(&mut self, documents: &[String]) -> Result<Vec<CsVec<f64>>> {
        self.fit(documents)?;
        self.transform_batch(documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    fn l2(v: &CsVec<f64>) -> f64 {
        v.iter().map(|(_, x)| x * x).sum::<f64>().sqrt()
    }

    #[test]
    fn test_tfidf_vectorizer() {
        let documents = docs(&[
            "win a free prize now",
            "call now to win a free prize",
            "are we meeting for lunch",
            "lunch tomorrow?",
        ]);

        let mut vectorizer = TfIdfVectorizer::new(TfIdfConfig::default()).unwrap();
        vectorizer.fit(&documents).unwrap();

        let vocabulary = vectorizer.vocabulary();
        assert!(vocabulary.contains("win"));
        assert!(vocabulary.contains("free prize"));
        assert!(vocabulary.contains("lunch"));
        // appears only once, below min_df
        assert!(!vocabulary.contains("tomorrow"));
        assert!(!vocabulary.contains("call"));

        let features = vectorizer.transform("free prize for lunch").unwrap();
        assert_eq!(features.dim(), vectorizer.vocabulary_size());
        assert!((l2(&features) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_vocabulary_is_sorted_and_indexed() {
        let vocabulary = Vocabulary::from_terms(docs(&["win", "call now", "free", "win"]));
        assert_eq!(vocabulary.len(), 3);
        assert_eq!(vocabulary.term(0), Some("call now"));
        assert_eq!(vocabulary.get("free"), Some(1));
        assert_eq!(vocabulary.get("win"), Some(2));
        assert_eq!(vocabulary.get("lunch"), None);
    }

    #[test]
    fn test_max_features_keeps_most_frequent() {
        let documents = docs(&["aa bb cc", "aa bb cc", "aa bb", "aa"]);
        let config = TfIdfConfig {
            ngram_range: (1, 1),
            max_features: Some(2),
            ..Default::default()
        };
        let mut vectorizer = TfIdfVectorizer::new(config).unwrap();
        vectorizer.fit(&documents).unwrap();

        let terms: Vec<&str> = vectorizer.vocabulary().iter().collect();
        assert_eq!(terms, vec!["aa", "bb"]);
    }

    #[test]
    fn test_smoothed_idf_values() {
        let documents = docs(&["aa bb", "aa bb", "aa cc", "cc dd"]);
        let config = TfIdfConfig {
            ngram_range: (1, 1),
            ..Default::default()
        };
        let mut vectorizer = TfIdfVectorizer::new(config).unwrap();
        vectorizer.fit(&documents).unwrap();

        let aa = vectorizer.vocabulary().get("aa").unwrap();
        let bb = vectorizer.vocabulary().get("bb").unwrap();
        // df(aa) = 3, df(bb) = 2, n = 4
        assert!((vectorizer.idf()[aa] - ((5.0f64 / 4.0).ln() + 1.0)).abs() < 1e-12);
        assert!((vectorizer.idf()[bb] - ((5.0f64 / 3.0).ln() + 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_sublinear_tf() {
        let documents = docs(&["aa bb", "aa bb"]);
        let config = TfIdfConfig {
            ngram_range: (1, 1),
            norm: Norm::None,
            ..Default::default()
        };
        let mut vectorizer = TfIdfVectorizer::new(config).unwrap();
        vectorizer.fit(&documents).unwrap();

        let aa = vectorizer.vocabulary().get("aa").unwrap();
        let features = vectorizer.transform("aa aa aa aa").unwrap();
        let weight = features.get(aa).copied().unwrap();
        let expected = (1.0 + 4.0f64.ln()) * vectorizer.idf()[aa];
        assert!((weight - expected).abs() < 1e-12);
    }

    #[test]
    fn test_unseen_terms_give_zero_vector() {
        let documents = docs(&["win cash", "win cash now"]);
        let mut vectorizer = TfIdfVectorizer::new(TfIdfConfig::default()).unwrap();
        vectorizer.fit(&documents).unwrap();

        let features = vectorizer.transform("zebra quantum xylophone").unwrap();
        assert_eq!(features.dim(), vectorizer.vocabulary_size());
        assert_eq!(features.nnz(), 0);
    }

    #[test]
    fn test_transform_before_fit() {
        let vectorizer = TfIdfVectorizer::new(TfIdfConfig::default()).unwrap();
        assert!(matches!(
            vectorizer.transform("hello"),
            Err(SpamError::NotTrained(_))
        ));
    }

    #[test]
    fn test_fit_rejects_empty_and_too_small_corpus() {
        let mut vectorizer = TfIdfVectorizer::new(TfIdfConfig::default()).unwrap();
        assert!(vectorizer.fit(&[]).is_err());
        assert!(vectorizer.fit(&docs(&["only once"])).is_err());
    }

    #[test]
    fn test_invalid_config() {
        let config = TfIdfConfig {
            ngram_range: (2, 1),
            ..Default::default()
        };
        assert!(TfIdfVectorizer::new(config).is_err());

        let config = TfIdfConfig {
            min_df: 0,
            ..Default::default()
        };
        assert!(TfIdfVectorizer::new(config).is_err());
    }

    #[test]
    fn test_serde_round_trip() {
        let documents = docs(&["free prize call", "free prize now", "see you soon", "see you"]);
        let mut vectorizer = TfIdfVectorizer::new(TfIdfConfig::default()).unwrap();
        vectorizer.fit(&documents).unwrap();

        let bytes = bincode::serialize(&vectorizer).unwrap();
        let restored: TfIdfVectorizer = bincode::deserialize(&bytes).unwrap();

        assert_eq!(restored.vocabulary(), vectorizer.vocabulary());
        let before = vectorizer.transform("free prize").unwrap();
        let after = restored.transform("free prize").unwrap();
        assert_eq!(before.indices(), after.indices());
        assert_eq!(before.data(), after.data());
    }
}
