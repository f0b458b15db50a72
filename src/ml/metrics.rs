//! Held-out evaluation metrics. Spam is the positive class.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpamError};
use crate::ml::dataset::Label;

/// 2x2 confusion matrix with spam as the positive class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub true_positives: usize,
    pub false_positives: usize,
    pub true_negatives: usize,
    pub false_negatives: usize,
}

impl ConfusionMatrix {
    /// Tally predictions against the true labels.
    pub fn from_predictions(truth: &[Label], predicted: &[Label]) -> Result<Self> {
        if truth.len() != predicted.len() {
            return Err(SpamError::invalid_argument(format!(
                "{} true labels but {} predictions",
                truth.len(),
                predicted.len()
            )));
        }

        let mut matrix = Self::default();
        for (&t, &p) in truth.iter().zip(predicted) {
            match (t, p) {
                (Label::Spam, Label::Spam) => matrix.true_positives += 1,
                (Label::Ham, Label::Spam) => matrix.false_positives += 1,
                (Label::Ham, Label::Ham) => matrix.true_negatives += 1,
                (Label::Spam, Label::Ham) => matrix.false_negatives += 1,
            }
        }
        Ok(matrix)
    }

    pub fn total(&self) -> usize {
        self.true_positives + self.false_positives + self.true_negatives + self.false_negatives
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.true_positives + self.true_negatives, self.total())
    }

    pub fn precision(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_positives)
    }

    pub fn recall(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_negatives)
    }

    pub fn f1(&self) -> f64 {
        let (p, r) = (self.precision(), self.recall());
        if p + r == 0.0 { 0.0 } else { 2.0 * p * r / (p + r) }
    }
}

// Undefined ratios report 0.
fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Fraction of predictions equal to the true label.
pub fn accuracy(truth: &[Label], predicted: &[Label]) -> Result<f64> {
    Ok(ConfusionMatrix::from_predictions(truth, predicted)?.accuracy())
}

/// Summary of a held-out evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
    pub confusion: ConfusionMatrix,
}

impl ClassificationReport {
    pub fn from_predictions(truth: &[Label], predicted: &[Label]) -> Result<Self> {
        let confusion = ConfusionMatrix::from_predictions(truth, predicted)?;
        Ok(Self::from(confusion))
    }
}

impl From<ConfusionMatrix> for ClassificationReport {
    fn from(confusion: ConfusionMatrix) -> Self {
        Self {
            accuracy: confusion.accuracy(),
            precision: confusion.precision(),
            recall: confusion.recall(),
            f1: confusion.f1(),
            support: confusion.total(),
            confusion,
        }
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Accuracy:  {:.4} ({} messages)", self.accuracy, self.support)?;
        writeln!(f, "Precision: {:.4}", self.precision)?;
        writeln!(f, "Recall:    {:.4}", self.recall)?;
        writeln!(f, "F1:        {:.4}", self.f1)?;
        writeln!(f, "Confusion matrix (rows = actual, cols = predicted):")?;
        writeln!(f, "            ham    spam")?;
        writeln!(
            f,
            "  ham   {:>6}  {:>6}",
            self.confusion.true_negatives, self.confusion.false_positives
        )?;
        write!(
            f,
            "  spam  {:>6}  {:>6}",
            self.confusion.false_negatives, self.confusion.true_positives
        )
    }
}
