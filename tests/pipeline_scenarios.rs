use std::fs;
use std::path::{Path, PathBuf};

use spam_detector::config::TrainingConfig;
use spam_detector::error::{Result, SpamError};
use spam_detector::ml::cache::ModelCache;
use spam_detector::ml::dataset::{Dataset, Label};
use spam_detector::ml::models::SpamClassifier;
use spam_detector::pipeline::SpamPipeline;
use spam_detector::training;
use tempfile::TempDir;

const WINNER_MESSAGE: &str =
    "WINNER!! You have been selected to receive a £900 prize reward! Call now to claim.";
const SELECTED_WINNER_MESSAGE: &str =
    "WINNER!! You have been selected to receive a £900 prize, call now!";
const LUNCH_MESSAGE: &str = "Hey, are we still meeting for lunch tomorrow?";

fn fixture_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/sms_sample.csv")
}

fn train_fixture() -> Result<SpamPipeline> {
    let (pipeline, _) = training::train_from_csv(fixture_path(), &TrainingConfig::default())?;
    Ok(pipeline)
}

#[test]
fn winner_message_is_spam_and_lunch_message_is_ham() -> Result<()> {
    let pipeline = train_fixture()?;

    let spam = pipeline.predict(WINNER_MESSAGE)?;
    assert_eq!(spam.label, Label::Spam);
    assert!(spam.spam_probability >= 0.5);

    let ham = pipeline.predict(LUNCH_MESSAGE)?;
    assert_eq!(ham.label, Label::Ham);
    assert!(ham.spam_probability < 0.5);
    Ok(())
}

#[test]
fn selected_winner_message_is_spam() -> Result<()> {
    let pipeline = train_fixture()?;

    let spam = pipeline.predict(SELECTED_WINNER_MESSAGE)?;
    assert_eq!(spam.label, Label::Spam);
    assert!(
        spam.spam_probability > 0.5,
        "spam probability {}",
        spam.spam_probability
    );

    let ham = pipeline.predict(LUNCH_MESSAGE)?;
    assert_eq!(ham.label, Label::Ham);
    assert!(ham.spam_probability < 0.5);
    Ok(())
}

#[test]
fn probabilities_are_bounded_and_match_the_threshold() -> Result<()> {
    let pipeline = train_fixture()?;
    let long_message = "lunch ".repeat(500);
    let messages = [
        WINNER_MESSAGE,
        SELECTED_WINNER_MESSAGE,
        LUNCH_MESSAGE,
        "a",
        "zzzz qqqq xxxx",
        "call me",
        "FREE FREE FREE FREE prize prize prize",
        "Ünïcödé テスト 😀",
        long_message.as_str(),
    ];

    for message in messages {
        let prediction = pipeline.predict(message)?;
        // Open interval: no finite score saturates the sigmoid at these weights.
        assert!(
            0.0 < prediction.spam_probability && prediction.spam_probability < 1.0,
            "{message:?} -> {}",
            prediction.spam_probability
        );
        assert_eq!(
            prediction.spam_probability >= 0.5,
            prediction.label == Label::Spam,
            "{message:?}"
        );
    }
    Ok(())
}

#[test]
fn training_report_classifies_the_sanity_pair() -> Result<()> {
    let (_, report) = training::train_from_csv(fixture_path(), &TrainingConfig::default())?;
    let labels: Vec<Label> = report.sample_predictions.iter().map(|p| p.label).collect();
    assert_eq!(labels, [Label::Spam, Label::Ham]);
    for (prediction, message) in report.sample_predictions.iter().zip(training::SANITY_MESSAGES) {
        assert_eq!(prediction.message, message);
    }
    Ok(())
}

#[test]
fn predictions_are_deterministic() -> Result<()> {
    let pipeline = train_fixture()?;
    let first = pipeline.predict(WINNER_MESSAGE)?;
    let second = pipeline.predict(WINNER_MESSAGE)?;
    assert_eq!(
        first.spam_probability.to_bits(),
        second.spam_probability.to_bits()
    );
    assert_eq!(first.label, second.label);
    Ok(())
}

#[test]
fn training_is_reproducible_for_a_fixed_seed() -> Result<()> {
    let a = train_fixture()?;
    let b = train_fixture()?;
    assert_eq!(a.vocabulary_size(), b.vocabulary_size());
    assert_eq!(
        a.predict(LUNCH_MESSAGE)?.spam_probability.to_bits(),
        b.predict(LUNCH_MESSAGE)?.spam_probability.to_bits()
    );
    Ok(())
}

#[test]
fn vocabulary_is_bounded() -> Result<()> {
    let pipeline = train_fixture()?;
    assert!(pipeline.vocabulary_size() > 0);
    assert!(pipeline.vocabulary_size() <= 5000);

    let config = TrainingConfig {
        vectorizer: spam_detector::ml::tfidf::TfIdfConfig {
            max_features: Some(25),
            ..Default::default()
        },
        ..Default::default()
    };
    let (small, _) = training::train_from_csv(fixture_path(), &config)?;
    assert_eq!(small.vocabulary_size(), 25);
    Ok(())
}

#[test]
fn save_and_load_round_trip() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("spam_classifier.bin");
    let pipeline = train_fixture()?;
    pipeline.save(&path)?;

    let loaded = SpamPipeline::load(&path)?;
    for message in [WINNER_MESSAGE, LUNCH_MESSAGE, "see you soon"] {
        assert_eq!(pipeline.predict(message)?, loaded.predict(message)?);
    }
    assert_eq!(
        loaded.metadata().and_then(|m| m.accuracy),
        pipeline.metadata().and_then(|m| m.accuracy)
    );
    Ok(())
}

#[test]
fn loading_a_missing_artifact_is_distinguishable() {
    let dir = TempDir::new().unwrap();
    let result = SpamPipeline::load(dir.path().join("missing.bin"));
    match result {
        Err(SpamError::ArtifactNotFound { path }) => assert!(path.ends_with("missing.bin")),
        other => panic!("expected ArtifactNotFound, got {other:?}"),
    }
}

#[test]
fn failed_training_keeps_the_existing_artifact() -> Result<()> {
    let dir = TempDir::new()?;
    let model_path = dir.path().join("spam_classifier.bin");
    training::train_and_save(fixture_path(), &model_path, &TrainingConfig::default())?;
    let original = fs::read(&model_path)?;

    let bad_csv = dir.path().join("bad.csv");
    fs::write(&bad_csv, "spam,win now\nham,see you\nphishing,click here\n")?;
    let err = training::train_and_save(&bad_csv, &model_path, &TrainingConfig::default())
        .unwrap_err();
    assert!(matches!(err, SpamError::MalformedData(_)));

    let missing_csv = dir.path().join("missing.csv");
    assert!(training::train_and_save(&missing_csv, &model_path, &TrainingConfig::default()).is_err());

    assert_eq!(fs::read(&model_path)?, original);
    Ok(())
}

#[test]
fn report_covers_the_held_out_split() -> Result<()> {
    let dataset = Dataset::load_csv(fixture_path(), false)?;
    let (_, report) = training::train(&dataset, &TrainingConfig::default())?;

    assert_eq!(report.train_size + report.test_size, dataset.len());
    assert_eq!(report.evaluation.support, report.test_size);
    assert_eq!(report.test_size, 14);
    assert!(report.accuracy() >= 0.75, "accuracy {}", report.accuracy());
    Ok(())
}

#[test]
fn cache_serves_the_saved_pipeline() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("spam_classifier.bin");
    train_fixture()?.save(&path)?;

    let cache = ModelCache::new(&path);
    let pipeline = cache.get()?;
    assert_eq!(pipeline.predict(WINNER_MESSAGE)?.label, Label::Spam);
    assert!(std::sync::Arc::ptr_eq(&pipeline, &cache.get()?));
    Ok(())
}
