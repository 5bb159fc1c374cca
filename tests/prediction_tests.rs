/// Tests for the classifier capability: artifact loading and the
/// predict/predict_proba contract against the committed model.
use std::path::Path;

use deposit_predictor::encoder::{encode, UnknownLevelPolicy};
use deposit_predictor::forest::RandomForest;
use deposit_predictor::models::RawRecord;

fn cold_record() -> RawRecord {
    RawRecord {
        age: 35,
        job: "admin.".to_string(),
        marital: "single".to_string(),
        education: "tertiary".to_string(),
        default: "no".to_string(),
        balance: 1000,
        housing: "yes".to_string(),
        loan: "no".to_string(),
        contact: "cellular".to_string(),
        day: 15,
        month: "may".to_string(),
        duration: 300,
        campaign: 1,
        pdays: 999,
        previous: 0,
        poutcome: "unknown".to_string(),
    }
}

/// A customer the committed model should consider likely to subscribe:
/// long call, previous campaign succeeded, contacted recently.
fn hot_record() -> RawRecord {
    RawRecord {
        age: 35,
        job: "admin.".to_string(),
        marital: "single".to_string(),
        education: "tertiary".to_string(),
        default: "no".to_string(),
        balance: 2000,
        housing: "no".to_string(),
        loan: "no".to_string(),
        contact: "cellular".to_string(),
        day: 15,
        month: "may".to_string(),
        duration: 600,
        campaign: 1,
        pdays: 5,
        previous: 2,
        poutcome: "success".to_string(),
    }
}

fn load_model() -> RandomForest {
    RandomForest::load(Path::new("model/forest.json")).expect("committed artifact should load")
}

#[cfg(test)]
mod artifact_tests {
    use super::*;

    #[test]
    fn test_committed_artifact_loads() {
        let forest = load_model();
        assert_eq!(forest.format_version(), 1);
        assert_eq!(forest.n_trees(), 5);
    }

    #[test]
    fn test_missing_artifact_is_an_error() {
        assert!(RandomForest::load(Path::new("model/no_such_file.json")).is_err());
    }

    #[test]
    fn test_corrupt_artifact_is_an_error() {
        assert!(RandomForest::from_json_str("{ not json").is_err());
        assert!(RandomForest::from_json_str("{}").is_err());
    }
}

#[cfg(test)]
mod prediction_contract_tests {
    use super::*;

    #[test]
    fn test_probability_pair_sums_to_one() {
        let forest = load_model();
        for record in [cold_record(), hot_record()] {
            let row = encode(&record, UnknownLevelPolicy::ZeroFill).unwrap();
            let (p0, p1) = forest.predict_proba(&row).unwrap();
            assert!((p0 + p1 - 1.0).abs() < 1e-9, "p0={} p1={}", p0, p1);
            assert!((0.0..=1.0).contains(&p0));
            assert!((0.0..=1.0).contains(&p1));
        }
    }

    #[test]
    fn test_predict_agrees_with_proba() {
        let forest = load_model();
        for record in [cold_record(), hot_record()] {
            let row = encode(&record, UnknownLevelPolicy::ZeroFill).unwrap();
            let (_, p1) = forest.predict_proba(&row).unwrap();
            let predicted = forest.predict(&row).unwrap();
            assert_eq!(predicted, u8::from(p1 >= 0.5));
        }
    }

    #[test]
    fn test_prediction_is_deterministic() {
        let forest = load_model();
        let row = encode(&cold_record(), UnknownLevelPolicy::ZeroFill).unwrap();
        let first = forest.predict_proba(&row).unwrap();
        let second = forest.predict_proba(&row).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_cold_record_predicts_no_subscription() {
        // Short call, no previous success: the ensemble lands on class 0.
        // Expected mass worked out by hand from the committed trees:
        // p0 = (0.62 + 0.78 + 0.82 + 0.72 + 0.75) / 5 = 0.738
        let forest = load_model();
        let row = encode(&cold_record(), UnknownLevelPolicy::ZeroFill).unwrap();
        let (p0, _) = forest.predict_proba(&row).unwrap();
        assert!((p0 - 0.738).abs() < 1e-9, "p0={}", p0);
        assert_eq!(forest.predict(&row).unwrap(), 0);
    }

    #[test]
    fn test_hot_record_predicts_subscription() {
        // Long call and a previous success flip every tree toward class 1:
        // p1 = (0.82 + 0.88 + 0.58 + 0.48 + 0.60) / 5 = 0.672
        let forest = load_model();
        let row = encode(&hot_record(), UnknownLevelPolicy::ZeroFill).unwrap();
        let (_, p1) = forest.predict_proba(&row).unwrap();
        assert!((p1 - 0.672).abs() < 1e-9, "p1={}", p1);
        assert_eq!(forest.predict(&row).unwrap(), 1);
    }
}
