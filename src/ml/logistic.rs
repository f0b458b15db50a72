//! Binary logistic regression over sparse TF-IDF features.
//!
//! Inference is `p(spam) = sigmoid(w · x + b)`; the label is `spam` when
//! `p >= 0.5`. Training minimizes the L2-regularized, class-weighted log loss
//!
//! ```text
//! 0.5 * ||w||² + C * Σ_i s_i * ln(1 + exp(-y_i * (w · x_i + b)))
//! ```
//!
//! with the intercept left unpenalized.

use argmin::core::{CostFunction, Executor, Gradient, State, TerminationReason};
use argmin::solver::linesearch::MoreThuenteLineSearch;
use argmin::solver::quasinewton::LBFGS;
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use sprs::CsVec;

use crate::error::{Result, SpamError};
use crate::ml::dataset::Label;

/// Probability at or above which a message is labeled spam.
pub const DECISION_THRESHOLD: f64 = 0.5;

/// Per-class loss weighting applied during training.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassWeight {
    /// Every sample weighs one.
    None,
    /// `n_samples / (n_classes * n_samples_in_class)`.
    Balanced,
}

/// Configuration for [`LogisticRegression`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogisticRegressionConfig {
    /// Inverse regularization strength.
    pub c: f64,
    pub class_weight: ClassWeight,
    pub fit_intercept: bool,
    /// Maximum optimizer iterations.
    pub max_iter: usize,
    /// Gradient L2 norm below which the solver stops.
    pub tol: f64,
    /// L-BFGS history size.
    pub memory: usize,
}

impl Default for LogisticRegressionConfig {
    fn default() -> Self {
        Self {
            c: 2.0,
            class_weight: ClassWeight::Balanced,
            fit_intercept: true,
            max_iter: 1000,
            tol: 1e-4,
            memory: 10,
        }
    }
}

impl LogisticRegressionConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.c.is_finite() && self.c > 0.0) {
            return Err(SpamError::invalid_config(format!(
                "C must be a positive number, got {}",
                self.c
            )));
        }
        if self.max_iter == 0 {
            return Err(SpamError::invalid_config("max_iter must be positive"));
        }
        if !(self.tol.is_finite() && self.tol >= 0.0) {
            return Err(SpamError::invalid_config("tol must be non-negative"));
        }
        if self.memory == 0 {
            return Err(SpamError::invalid_config("memory must be positive"));
        }
        Ok(())
    }
}

/// Summary of one training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitSummary {
    pub iterations: usize,
    pub converged: bool,
    pub final_loss: f64,
    pub class_weights: [f64; 2],
}

/// Numerically stable logistic function.
pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let ez = z.exp();
        ez / (1.0 + ez)
    }
}

/// `ln(1 + exp(t))` without overflow.
fn softplus(t: f64) -> f64 {
    if t > 0.0 {
        t + (-t).exp().ln_1p()
    } else {
        t.exp().ln_1p()
    }
}

fn sparse_dot(x: &CsVec<f64>, weights: &Array1<f64>) -> f64 {
    x.iter().map(|(i, v)| v * weights[i]).sum()
}

/// Fitted (or not yet fitted) logistic regression model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    config: LogisticRegressionConfig,
    weights: Array1<f64>,
    intercept: f64,
    fitted: bool,
}

impl LogisticRegression {
    pub fn new(config: LogisticRegressionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            weights: Array1::zeros(0),
            intercept: 0.0,
            fitted: false,
        })
    }

    /// Build a fitted model from known parameters.
    pub fn from_parameters(weights: Array1<f64>, intercept: f64) -> Self {
        Self {
            config: LogisticRegressionConfig::default(),
            weights,
            intercept,
            fitted: true,
        }
    }

    pub fn config(&self) -> &LogisticRegressionConfig {
        &self.config
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted
    }

    pub fn weights(&self) -> &Array1<f64> {
        &self.weights
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn n_features(&self) -> usize {
        self.weights.len()
    }

    /// Per-class sample weights `[ham, spam]` for the configured scheme.
    pub fn class_weights(&self, labels: &[Label]) -> [f64; 2] {
        match self.config.class_weight {
            ClassWeight::None => [1.0, 1.0],
            ClassWeight::Balanced => {
                let n = labels.len() as f64;
                let mut counts = [0usize; 2];
                for label in labels {
                    counts[label.index()] += 1;
                }
                counts.map(|c| if c == 0 { 0.0 } else { n / (2.0 * c as f64) })
            }
        }
    }

    /// Fit the model on feature vectors and their labels.
    pub fn fit(&mut self, features: &[CsVec<f64>], labels: &[Label]) -> Result<FitSummary> {
        if features.is_empty() {
            return Err(SpamError::training("no training samples"));
        }
        if features.len() != labels.len() {
            return Err(SpamError::training(format!(
                "{} feature vectors but {} labels",
                features.len(),
                labels.len()
            )));
        }
        let n_features = features[0].dim();
        if let Some(bad) = features.iter().position(|x| x.dim() != n_features) {
            return Err(SpamError::training(format!(
                "feature vector {bad} has dimension {}, expected {n_features}",
                features[bad].dim()
            )));
        }
        for label in Label::ALL {
            if !labels.contains(&label) {
                return Err(SpamError::training(format!(
                    "training data contains no '{label}' messages; both classes are required"
                )));
            }
        }

        let class_weights = self.class_weights(labels);
        let objective = LogLoss {
            features,
            targets: labels
                .iter()
                .map(|l| if l.is_spam() { 1.0 } else { -1.0 })
                .collect(),
            sample_weights: labels.iter().map(|l| class_weights[l.index()]).collect(),
            c: self.config.c,
            n_features,
            fit_intercept: self.config.fit_intercept,
        };

        let solver = LBFGS::new(MoreThuenteLineSearch::new(), self.config.memory)
            .with_tolerance_grad(self.config.tol)
            .map_err(|e| SpamError::training(format!("invalid solver settings: {e}")))?;
        let initial = vec![0.0; objective.dim()];
        let result = Executor::new(objective, solver)
            .configure(|state| state.param(initial).max_iters(self.config.max_iter as u64))
            .run()
            .map_err(|e| SpamError::training(format!("optimizer failed: {e}")))?;

        let state = result.state();
        let iterations = state.get_iter() as usize;
        let converged = matches!(
            state.get_termination_reason(),
            Some(TerminationReason::SolverConverged)
        );
        let final_loss = state.get_best_cost();
        let solution = state
            .get_best_param()
            .ok_or_else(|| SpamError::training("optimizer returned no parameters"))?;

        if converged {
            log::debug!(
                "L-BFGS converged after {iterations} iterations: loss={final_loss:.6}"
            );
        } else {
            log::warn!(
                "Logistic regression did not converge within {} iterations ({:?}); consider raising max_iter",
                self.config.max_iter,
                state.get_termination_reason()
            );
        }

        self.intercept = if self.config.fit_intercept {
            solution[n_features]
        } else {
            0.0
        };
        self.weights = Array1::from(solution[..n_features].to_vec());
        self.fitted = true;

        Ok(FitSummary {
            iterations,
            converged,
            final_loss,
            class_weights,
        })
    }

    fn check_input(&self, x: &CsVec<f64>) -> Result<()> {
        if !self.fitted {
            return Err(SpamError::not_trained("classifier has not been fitted"));
        }
        if x.dim() != self.weights.len() {
            return Err(SpamError::invalid_argument(format!(
                "feature vector has dimension {}, model expects {}",
                x.dim(),
                self.weights.len()
            )));
        }
        Ok(())
    }

    /// Linear score `w · x + b`.
    pub fn decision_function(&self, x: &CsVec<f64>) -> Result<f64> {
        self.check_input(x)?;
        Ok(sparse_dot(x, &self.weights) + self.intercept)
    }

    /// Probability that `x` is spam.
    pub fn predict_proba(&self, x: &CsVec<f64>) -> Result<f64> {
        Ok(sigmoid(self.decision_function(x)?))
    }

    /// Label for `x`; ties at exactly 0.5 go to spam.
    pub fn predict(&self, x: &CsVec<f64>) -> Result<Label> {
        Ok(label_for(self.predict_proba(x)?))
    }
}

/// Apply the decision threshold to a spam probability.
pub fn label_for(spam_probability: f64) -> Label {
    if spam_probability >= DECISION_THRESHOLD {
        Label::Spam
    } else {
        Label::Ham
    }
}

/// Regularized, sample-weighted logistic loss.
struct LogLoss<'a> {
    features: &'a [CsVec<f64>],
    targets: Vec<f64>,
    sample_weights: Vec<f64>,
    c: f64,
    n_features: usize,
    fit_intercept: bool,
}

impl LogLoss<'_> {
    fn dim(&self) -> usize {
        self.n_features + usize::from(self.fit_intercept)
    }

    fn loss_and_gradient(&self, theta: &[f64]) -> (f64, Vec<f64>) {
        let mut grad = vec![0.0; theta.len()];
        let intercept = if self.fit_intercept {
            theta[self.n_features]
        } else {
            0.0
        };

        let mut loss = 0.0;
        for ((x, &y), &s) in self
            .features
            .iter()
            .zip(&self.targets)
            .zip(&self.sample_weights)
        {
            let z = x.iter().map(|(j, v)| v * theta[j]).sum::<f64>() + intercept;
            let margin = y * z;
            loss += s * softplus(-margin);

            // d/dz ln(1 + exp(-y z)) = -y * sigmoid(-y z)
            let coef = -self.c * s * y * sigmoid(-margin);
            for (j, v) in x.iter() {
                grad[j] += coef * v;
            }
            if self.fit_intercept {
                grad[self.n_features] += coef;
            }
        }

        let mut penalty = 0.0;
        for j in 0..self.n_features {
            penalty += theta[j] * theta[j];
            grad[j] += theta[j];
        }

        (self.c * loss + 0.5 * penalty, grad)
    }
}

impl CostFunction for LogLoss<'_> {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, theta: &Self::Param) -> std::result::Result<f64, argmin::core::Error> {
        Ok(self.loss_and_gradient(theta).0)
    }
}

impl Gradient for LogLoss<'_> {
    type Param = Vec<f64>;
    type Gradient = Vec<f64>;

    fn gradient(&self, theta: &Self::Param) -> std::result::Result<Vec<f64>, argmin::core::Error> {
        Ok(self.loss_and_gradient(theta).1)
    }
}
