//! Integration test: Training pipeline end-to-end

use csvml::artifacts::ArtifactStore;
use csvml::dataset::{Dataset, TargetStorage};
use csvml::inference::{InferenceEngine, Prediction};
use csvml::preprocessing::Label;
use csvml::training::{ClassificationHeuristic, Metric, TaskKind, TrainEngine, TrainingConfig};
use csvml::Error;
use tempfile::TempDir;

fn classification_csv() -> String {
    let mut csv = String::from("f1,f2,f3,label\n");
    for i in 0..20 {
        let x = i as f64;
        let label = if i < 10 { "low" } else { "high" };
        csv.push_str(&format!("{},{},{},{}\n", x, 20.0 - x * 0.9, (i % 4) as f64 * 0.1, label));
    }
    csv
}

fn integer_class_csv() -> String {
    let mut csv = String::from("f1,f2,grade\n");
    for i in 0..30 {
        let grade = i / 10;
        csv.push_str(&format!("{},{},{}\n", i as f64 + 0.5, (i % 7) as f64, grade));
    }
    csv
}

fn regression_csv() -> String {
    let mut csv = String::from("x1,x2,target\n");
    for i in 0..20 {
        let x1 = i as f64;
        let x2 = ((i * 7) % 11) as f64;
        csv.push_str(&format!("{},{},{}\n", x1, x2, 3.0 * x1 - 2.0 * x2 + 1.0));
    }
    csv
}

#[test]
fn test_text_target_trains_classifier() {
    let dataset = Dataset::from_csv_bytes(classification_csv().into_bytes()).unwrap();
    assert_eq!(dataset.target().storage(), TargetStorage::Text);

    let outcome = TrainEngine::new(TrainingConfig::default()).fit(&dataset).unwrap();
    assert_eq!(outcome.task(), TaskKind::Classification);
    assert_eq!(outcome.evaluation.metric, Metric::Accuracy);
    assert!((0.0..=1.0).contains(&outcome.evaluation.score));
    assert_eq!(outcome.n_train + outcome.n_test, 20);
    assert_eq!(outcome.n_test, 6);

    let encoder = outcome.artifacts.label_encoder.as_ref().unwrap();
    assert_eq!(
        encoder.classes(),
        &[Label::Text("high".to_string()), Label::Text("low".to_string())]
    );
}

#[test]
fn test_numeric_target_trains_regressor() {
    let dataset = Dataset::from_csv_bytes(regression_csv().into_bytes()).unwrap();
    let outcome = TrainEngine::new(TrainingConfig::default()).fit(&dataset).unwrap();

    assert_eq!(outcome.task(), TaskKind::Regression);
    assert_eq!(outcome.evaluation.metric, Metric::MeanSquaredError);
    assert!(outcome.evaluation.score >= 0.0);
    assert!(outcome.evaluation.score < 1e-6, "exact linear target should fit: {}", outcome.evaluation.score);
    assert!(outcome.artifacts.label_encoder.is_none());
}

#[test]
fn test_integer_target_depends_on_heuristic() {
    let dataset = Dataset::from_csv_bytes(integer_class_csv().into_bytes()).unwrap();
    assert_eq!(dataset.target().storage(), TargetStorage::Integer);

    let textual = TrainEngine::new(TrainingConfig::default()).fit(&dataset).unwrap();
    assert_eq!(textual.task(), TaskKind::Regression);

    let config = TrainingConfig::default().with_heuristic(ClassificationHeuristic::low_cardinality());
    let cardinality = TrainEngine::new(config).fit(&dataset).unwrap();
    assert_eq!(cardinality.task(), TaskKind::Classification);
    let encoder = cardinality.artifacts.label_encoder.as_ref().unwrap();
    assert_eq!(
        encoder.classes(),
        &[Label::Integer(0), Label::Integer(1), Label::Integer(2)]
    );
}

#[test]
fn test_same_data_same_evaluation() {
    let dataset = Dataset::from_csv_bytes(classification_csv().into_bytes()).unwrap();
    let engine = TrainEngine::new(TrainingConfig::default());
    let a = engine.fit(&dataset).unwrap();
    let b = engine.fit(&dataset).unwrap();
    assert_eq!(a.evaluation, b.evaluation);
}

#[test]
fn test_single_column_is_insufficient() {
    let result = Dataset::from_csv_bytes(b"only\n1\n2\n".to_vec());
    assert!(matches!(result, Err(Error::InsufficientData)));
}

#[test]
fn test_saved_artifacts_reload_for_inference() {
    let dir = TempDir::new().unwrap();
    let store = ArtifactStore::new(dir.path());

    let mut csv = String::from("sepal.length,sepal.width,petal.length,petal.width,variety\n");
    for i in 0..10 {
        let j = i as f64 * 0.05;
        csv.push_str(&format!("{:.2},{:.2},{:.2},{:.2},Setosa\n", 5.0 + j, 3.4 - j, 1.4 + j, 0.2));
        csv.push_str(&format!("{:.2},{:.2},{:.2},{:.2},Virginica\n", 6.6 + j, 3.0 - j, 5.6 + j, 2.1));
    }
    let dataset = Dataset::from_csv_bytes(csv.into_bytes()).unwrap();
    let outcome = TrainEngine::new(TrainingConfig::default()).fit(&dataset).unwrap();
    store.save(&outcome.artifacts).unwrap();

    let engine = InferenceEngine::load(&store).unwrap();
    assert_eq!(engine.task(), TaskKind::Classification);
    let prediction = engine.predict_row(&[5.1, 3.4, 1.5, 0.2]).unwrap();
    assert_eq!(prediction, vec![Prediction::Class(Label::Text("Setosa".to_string()))]);
}

#[test]
fn test_inference_rejects_other_schema() {
    let dir = TempDir::new().unwrap();
    let store = ArtifactStore::new(dir.path());
    let dataset = Dataset::from_csv_bytes(regression_csv().into_bytes()).unwrap();
    let outcome = TrainEngine::new(TrainingConfig::default()).fit(&dataset).unwrap();
    store.save(&outcome.artifacts).unwrap();

    // Without a label encoder on disk the set cannot be served
    let err = InferenceEngine::load(&store).unwrap_err();
    assert!(matches!(err, Error::ArtifactMissing(_)));

    let artifacts = outcome.artifacts;
    let engine = InferenceEngine::new(artifacts.model, artifacts.scaler, None).unwrap();
    let result = engine.predict_row(&[1.0, 2.0, 3.0, 4.0]);
    assert!(matches!(result, Err(Error::FeatureMismatch { .. })));
}
