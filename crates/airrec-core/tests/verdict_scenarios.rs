//! Adapter scenarios against a stub oracle.
//!
//! The stub counts its calls, so the tests can check that invalid input never
//! reaches the oracle.

use airrec_core::{
    is_distribution, Column, FeatureRecord, InvalidRatingError, Label, OracleError,
    OraclePredictionError, PredictionOracle, RawRatings, RecommendationService, ServiceError,
    Verdict,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct StubOracle {
    class: usize,
    probabilities: [f64; 2],
    calls: AtomicUsize,
}

impl StubOracle {
    fn new(class: usize, probabilities: [f64; 2]) -> Self {
        Self {
            class,
            probabilities,
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PredictionOracle for StubOracle {
    fn kind(&self) -> &str {
        "stub"
    }

    fn classify(&self, _record: &FeatureRecord) -> Result<usize, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.class)
    }

    fn class_probabilities(&self, _record: &FeatureRecord) -> Result<[f64; 2], OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert!(
            is_distribution(&self.probabilities),
            "stub distribution must sum to 1"
        );
        Ok(self.probabilities)
    }
}

struct FailingOracle;

impl PredictionOracle for FailingOracle {
    fn classify(&self, _record: &FeatureRecord) -> Result<usize, OracleError> {
        Err(OracleError::new("feature shape mismatch: expected 5 columns"))
    }

    fn class_probabilities(&self, _record: &FeatureRecord) -> Result<[f64; 2], OracleError> {
        Err(OracleError::new("unreachable"))
    }
}

fn service(class: usize, probabilities: [f64; 2]) -> (Arc<StubOracle>, RecommendationService) {
    let stub = Arc::new(StubOracle::new(class, probabilities));
    let svc = RecommendationService::new(stub.clone());
    (stub, svc)
}

#[test]
fn all_fives_are_recommended() {
    let (_, svc) = service(1, [0.1, 0.9]);
    let prediction = svc
        .evaluate(&RawRatings::from([5, 5, 5, 5, 5]))
        .expect("prediction should succeed");
    assert_eq!(prediction.verdict.label, Label::Recommended);
    assert!((prediction.verdict.confidence - 0.90).abs() < 1e-9);
    assert_eq!(prediction.highlighted.len(), 5);
}

#[test]
fn all_ones_are_not_recommended() {
    let (_, svc) = service(0, [0.85, 0.15]);
    let prediction = svc
        .evaluate(&RawRatings::from([1, 1, 1, 1, 1]))
        .expect("prediction should succeed");
    assert_eq!(
        prediction.verdict,
        Verdict {
            label: Label::NotRecommended,
            confidence: 0.85
        }
    );
}

#[test]
fn confidence_follows_predicted_class_not_index_one() {
    let (_, svc) = service(0, [0.3, 0.7]);
    let verdict = svc
        .predict(&FeatureRecord::default())
        .expect("prediction should succeed");
    assert_eq!(verdict.label, Label::NotRecommended);
    assert!((verdict.confidence - 0.3).abs() < 1e-9);
}

#[test]
fn invalid_rating_never_reaches_oracle() {
    let (stub, svc) = service(1, [0.1, 0.9]);

    for bad in [0, 6] {
        let err = svc
            .evaluate(&RawRatings::from([3, 3, 3, 3, bad]))
            .unwrap_err();
        assert_eq!(
            err,
            ServiceError::InvalidRating(InvalidRatingError::OutOfRange {
                column: Column::GroundService,
                value: bad
            })
        );
    }

    let err = svc.evaluate(&RawRatings::default()).unwrap_err();
    assert!(matches!(
        err,
        ServiceError::InvalidRating(InvalidRatingError::Missing {
            column: Column::SeatComfort
        })
    ));
    assert_eq!(stub.calls(), 0);
}

#[test]
fn boundary_ratings_are_served() {
    let (stub, svc) = service(1, [0.4, 0.6]);
    assert!(svc.evaluate(&RawRatings::from([1, 5, 1, 5, 1])).is_ok());
    assert_eq!(stub.calls(), 2);
}

#[test]
fn oracle_failure_propagates_unchanged() {
    let svc = RecommendationService::from_oracle(FailingOracle);
    let err = svc.evaluate(&RawRatings::form_defaults()).unwrap_err();
    match err {
        ServiceError::Prediction(OraclePredictionError::Oracle(e)) => {
            assert_eq!(e.message(), "feature shape mismatch: expected 5 columns");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn service_is_shared_across_threads() {
    let (stub, svc) = service(1, [0.2, 0.8]);
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let svc = svc.clone();
            std::thread::spawn(move || svc.predict(&FeatureRecord::default()))
        })
        .collect();
    for h in handles {
        let verdict = h.join().expect("thread panicked").expect("prediction failed");
        assert_eq!(verdict.label, Label::Recommended);
    }
    assert_eq!(stub.calls(), 8);
    assert_eq!(svc.oracle_kind(), "stub");
}

#[test]
fn prediction_json_echoes_input() {
    let (_, svc) = service(1, [0.1, 0.9]);
    let prediction = svc
        .evaluate(&RawRatings::from([5, 4, 3, 2, 1]))
        .expect("prediction should succeed");
    let json = serde_json::to_value(&prediction).expect("should serialize");
    assert_eq!(json["label"], "Recommended");
    assert_eq!(json["confidence"], 0.9);
    assert_eq!(json["input"]["seat_comfort"], 5);
    assert_eq!(json["input"]["ground_service"], 1);
    assert_eq!(json["highlighted"], serde_json::json!(["seat_comfort"]));
    assert!(json["ts"].as_str().is_some_and(|ts| ts.ends_with('Z')));
}
