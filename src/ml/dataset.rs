//! Labeled SMS corpus loading and stratified splitting.
//!
//! The training file is a two-column CSV (`label,text`) with no header row by
//! default:
//!
//! ```csv
//! ham,"Ok lar... Joking wif u oni..."
//! spam,"Free entry in 2 a wkly comp to win FA Cup final tkts"
//! ```

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use csv::ReaderBuilder;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SpamError};

/// The two mutually exclusive message classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    /// Legitimate message.
    Ham,
    /// Unsolicited message.
    Spam,
}

impl Label {
    /// Both labels in index order (ham = 0, spam = 1).
    pub const ALL: [Label; 2] = [Label::Ham, Label::Spam];

    /// The canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Ham => "ham",
            Label::Spam => "spam",
        }
    }

    /// Whether this is the positive (spam) class.
    pub fn is_spam(&self) -> bool {
        matches!(self, Label::Spam)
    }

    /// Class index used for per-class bookkeeping.
    pub fn index(&self) -> usize {
        match self {
            Label::Ham => 0,
            Label::Spam => 1,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Label {
    type Err = SpamError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ham" => Ok(Label::Ham),
            "spam" => Ok(Label::Spam),
            other => Err(SpamError::malformed(format!(
                "unrecognized label '{other}', expected 'spam' or 'ham'"
            ))),
        }
    }
}

/// One row of the training corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledMessage {
    pub label: Label,
    pub text: String,
}

impl LabeledMessage {
    pub fn new<S: Into<String>>(label: Label, text: S) -> Self {
        Self {
            label,
            text: text.into(),
        }
    }
}

/// An in-memory labeled corpus.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    messages: Vec<LabeledMessage>,
}

impl Dataset {
    /// Create a dataset from already labeled messages.
    pub fn new(messages: Vec<LabeledMessage>) -> Self {
        Self { messages }
    }

    /// Load a `label,text` CSV file.
    ///
    /// Fails if the file is missing, empty, has a row with a column count other
    /// than two, or contains a label outside {spam, ham}.
    pub fn load_csv<P: AsRef<Path>>(path: P, has_headers: bool) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SpamError::malformed(format!(
                "training file not found: {}",
                path.display()
            )));
        }

        let file = File::open(path)?;
        let dataset = Self::from_reader(file, has_headers)?;
        log::info!(
            "Loaded {} messages from {} ({} spam, {} ham)",
            dataset.len(),
            path.display(),
            dataset.count(Label::Spam),
            dataset.count(Label::Ham)
        );
        Ok(dataset)
    }

    /// Parse a `label,text` CSV from any reader.
    pub fn from_reader<R: Read>(reader: R, has_headers: bool) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(has_headers)
            .flexible(true)
            .from_reader(reader);

        let mut messages = Vec::new();
        for (row, record) in reader.records().enumerate() {
            let record = record?;
            let line = record
                .position()
                .map(|p| p.line())
                .unwrap_or(row as u64 + 1);

            if record.len() != 2 {
                return Err(SpamError::malformed(format!(
                    "line {line}: expected 2 columns (label, text), found {}",
                    record.len()
                )));
            }

            let label: Label = record[0].parse().map_err(|_| {
                SpamError::malformed(format!(
                    "line {line}: unrecognized label '{}', expected 'spam' or 'ham'",
                    record[0].trim()
                ))
            })?;
            messages.push(LabeledMessage::new(label, &record[1]));
        }

        if messages.is_empty() {
            return Err(SpamError::malformed("training corpus is empty"));
        }

        Ok(Self { messages })
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn messages(&self) -> &[LabeledMessage] {
        &self.messages
    }

    /// Message texts in corpus order.
    pub fn texts(&self) -> Vec<String> {
        self.messages.iter().map(|m| m.text.clone()).collect()
    }

    /// Labels in corpus order.
    pub fn labels(&self) -> Vec<Label> {
        self.messages.iter().map(|m| m.label).collect()
    }

    /// Number of messages carrying `label`.
    pub fn count(&self, label: Label) -> usize {
        self.messages.iter().filter(|m| m.label == label).count()
    }

    /// Split into `(train, test)` keeping each class's proportion in both parts.
    ///
    /// Per class, `round(n_class * test_size)` messages go to the test set,
    /// clamped so that a class with at least two messages is represented on
    /// both sides. Deterministic for a given `seed`.
    pub fn stratified_split(&self, test_size: f64, seed: u64) -> Result<(Dataset, Dataset)> {
        if !(test_size > 0.0 && test_size < 1.0) {
            return Err(SpamError::invalid_argument(format!(
                "test_size must be in (0, 1), got {test_size}"
            )));
        }
        if self.len() < 2 {
            return Err(SpamError::malformed(format!(
                "need at least 2 messages to split, got {}",
                self.len()
            )));
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let mut train = Vec::new();
        let mut test = Vec::new();

        for label in Label::ALL {
            let mut indices: Vec<usize> = self
                .messages
                .iter()
                .enumerate()
                .filter(|(_, m)| m.label == label)
                .map(|(i, _)| i)
                .collect();
            if indices.is_empty() {
                continue;
            }
            indices.shuffle(&mut rng);

            let n = indices.len();
            let mut n_test = (n as f64 * test_size).round() as usize;
            if n >= 2 {
                n_test = n_test.clamp(1, n - 1);
            } else {
                n_test = 0;
            }

            let (test_idx, train_idx) = indices.split_at(n_test);
            test.extend(test_idx.iter().map(|&i| self.messages[i].clone()));
            train.extend(train_idx.iter().map(|&i| self.messages[i].clone()));
        }

        train.shuffle(&mut rng);
        test.shuffle(&mut rng);

        log::debug!(
            "Stratified split: {} train / {} test (test_size={test_size}, seed={seed})",
            train.len(),
            test.len()
        );

        Ok((Dataset::new(train), Dataset::new(test)))
    }
}

impl FromIterator<LabeledMessage> for Dataset {
    fn from_iter<T: IntoIterator<Item = LabeledMessage>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus(n_spam: usize, n_ham: usize) -> Dataset {
        let spam = (0..n_spam).map(|i| LabeledMessage::new(Label::Spam, format!("win prize {i}")));
        let ham = (0..n_ham).map(|i| LabeledMessage::new(Label::Ham, format!("see you at {i}")));
        spam.chain(ham).collect()
    }

    #[test]
    fn test_label_parsing() {
        assert_eq!("spam".parse::<Label>().unwrap(), Label::Spam);
        assert_eq!(" HAM ".parse::<Label>().unwrap(), Label::Ham);
        assert!(matches!(
            "eggs".parse::<Label>(),
            Err(SpamError::MalformedData(_))
        ));
        assert_eq!(Label::Spam.to_string(), "spam");
    }

    #[test]
    fn test_from_reader() {
        let csv = "ham,Ok lar... Joking wif u oni...\nspam,\"Free entry, win FA Cup tkts\"\n";
        let dataset = Dataset::from_reader(csv.as_bytes(), false).unwrap();

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.messages()[0].label, Label::Ham);
        assert_eq!(dataset.messages()[1].text, "Free entry, win FA Cup tkts");
    }

    #[test]
    fn test_from_reader_with_header() {
        let csv = "label,text\nspam,Call now\n";
        let dataset = Dataset::from_reader(csv.as_bytes(), true).unwrap();
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.count(Label::Spam), 1);
    }

    #[test]
    fn test_unknown_label_is_rejected() {
        let csv = "ham,hello there\nphishing,click this\n";
        let err = Dataset::from_reader(csv.as_bytes(), false).unwrap_err();
        assert!(matches!(err, SpamError::MalformedData(_)));
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_wrong_column_count_is_rejected() {
        let csv = "ham,hello there\nspam,win,extra\n";
        let err = Dataset::from_reader(csv.as_bytes(), false).unwrap_err();
        assert!(matches!(err, SpamError::MalformedData(_)));

        let csv = "ham\n";
        assert!(Dataset::from_reader(csv.as_bytes(), false).is_err());
    }

    #[test]
    fn test_empty_corpus_is_rejected() {
        let err = Dataset::from_reader("".as_bytes(), false).unwrap_err();
        assert!(matches!(err, SpamError::MalformedData(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = Dataset::load_csv("/nonexistent/sms.csv", false).unwrap_err();
        assert!(matches!(err, SpamError::MalformedData(_)));
    }

    #[test]
    fn test_stratified_split_preserves_proportions() {
        let dataset = corpus(20, 80);
        let (train, test) = dataset.stratified_split(0.2, 42).unwrap();

        assert_eq!(train.len() + test.len(), 100);
        assert_eq!(test.count(Label::Spam), 4);
        assert_eq!(test.count(Label::Ham), 16);
        assert_eq!(train.count(Label::Spam), 16);
        assert_eq!(train.count(Label::Ham), 64);
    }

    #[test]
    fn test_stratified_split_is_deterministic() {
        let dataset = corpus(15, 35);
        let (train_a, test_a) = dataset.stratified_split(0.2, 7).unwrap();
        let (train_b, test_b) = dataset.stratified_split(0.2, 7).unwrap();

        assert_eq!(train_a, train_b);
        assert_eq!(test_a, test_b);
    }

    #[test]
    fn test_small_class_lands_on_both_sides() {
        let dataset = corpus(2, 10);
        let (train, test) = dataset.stratified_split(0.2, 42).unwrap();
        assert_eq!(train.count(Label::Spam), 1);
        assert_eq!(test.count(Label::Spam), 1);
    }

    #[test]
    fn test_invalid_test_size() {
        let dataset = corpus(5, 5);
        assert!(dataset.stratified_split(0.0, 1).is_err());
        assert!(dataset.stratified_split(1.0, 1).is_err());
    }
}
