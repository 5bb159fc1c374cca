/// Property-based tests using proptest
/// Tests invariants and properties that should hold for all inputs
use proptest::prelude::*;

use deposit_predictor::encoder::{encode, UnknownLevelPolicy};
use deposit_predictor::models::RawRecord;
use deposit_predictor::schema;

fn choice(values: &'static [&'static str]) -> impl Strategy<Value = String> {
    prop::sample::select(values.to_vec()).prop_map(str::to_string)
}

/// Any record the form can actually produce.
fn valid_record() -> impl Strategy<Value = RawRecord> {
    (
        (
            18i64..=90,
            choice(schema::JOB_CHOICES),
            choice(schema::MARITAL_CHOICES),
            choice(schema::EDUCATION_CHOICES),
            choice(schema::YES_NO_CHOICES),
            -5000i64..=100_000,
        ),
        (
            choice(schema::YES_NO_CHOICES),
            choice(schema::YES_NO_CHOICES),
            choice(schema::CONTACT_CHOICES),
            1i64..=31,
            choice(schema::MONTH_CHOICES),
            0i64..=1200,
        ),
        (
            1i64..=5,
            0i64..=999,
            0i64..=5,
            choice(schema::POUTCOME_CHOICES),
        ),
    )
        .prop_map(
            |(
                (age, job, marital, education, default, balance),
                (housing, loan, contact, day, month, duration),
                (campaign, pdays, previous, poutcome),
            )| RawRecord {
                age,
                job,
                marital,
                education,
                default,
                balance,
                housing,
                loan,
                contact,
                day,
                month,
                duration,
                campaign,
                pdays,
                previous,
                poutcome,
            },
        )
}

// Property: every valid record encodes to exactly the frozen schema
proptest! {
    #[test]
    fn schema_completeness(record in valid_record()) {
        let row = encode(&record, UnknownLevelPolicy::ZeroFill).unwrap();
        let names: Vec<&str> = row.names().collect();
        prop_assert_eq!(names.as_slice(), schema::EXPECTED_COLUMNS);
    }

    #[test]
    fn valid_records_encode_under_strict_policy_too(record in valid_record()) {
        // Levels the training pipeline dropped are still part of the known
        // domain, so strict mode must accept everything the form allows.
        let row = encode(&record, UnknownLevelPolicy::Strict);
        prop_assert!(row.is_ok());
    }

    #[test]
    fn encoding_is_deterministic(record in valid_record()) {
        let first = encode(&record, UnknownLevelPolicy::ZeroFill).unwrap();
        let second = encode(&record, UnknownLevelPolicy::ZeroFill).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn validation_accepts_everything_the_form_produces(record in valid_record()) {
        prop_assert!(record.validate().is_ok());
    }
}

// Property: indicator groups are mutually exclusive
proptest! {
    #[test]
    fn at_most_one_indicator_per_group(record in valid_record()) {
        let row = encode(&record, UnknownLevelPolicy::ZeroFill).unwrap();
        for group in [
            "education_", "marital_", "contact_", "month_", "poutcome_",
            "age_categories_", "job_categories_",
        ] {
            let ones = row
                .names()
                .filter(|n| n.starts_with(group) && row.get(n) == Some(1.0))
                .count();
            let zeros = row
                .names()
                .filter(|n| n.starts_with(group) && row.get(n) == Some(0.0))
                .count();
            prop_assert!(ones <= 1, "group {} has {} indicators set", group, ones);
            // Nothing in an indicator group is ever anything but 0 or 1
            let total = row.names().filter(|n| n.starts_with(group)).count();
            prop_assert_eq!(ones + zeros, total);
        }
    }

    #[test]
    fn binary_fields_are_zero_or_one(record in valid_record()) {
        let row = encode(&record, UnknownLevelPolicy::ZeroFill).unwrap();
        for field in ["default", "housing", "loan"] {
            let value = row.get(field).unwrap();
            prop_assert!(value == 0.0 || value == 1.0);
        }
    }

    #[test]
    fn all_values_are_finite(record in valid_record()) {
        let row = encode(&record, UnknownLevelPolicy::ZeroFill).unwrap();
        prop_assert!(row.to_vector().iter().all(|v| v.is_finite()));
    }
}

// Property: zero-fill encoding never panics, whatever strings arrive
proptest! {
    #[test]
    fn zero_fill_encoding_never_panics(
        age in 1i64..=100,
        job in "\\PC*",
        marital in "\\PC*",
        education in "\\PC*",
        month in "\\PC*",
        poutcome in "\\PC*",
    ) {
        let record = RawRecord {
            age,
            job,
            marital,
            education,
            default: "no".to_string(),
            balance: 0,
            housing: "yes".to_string(),
            loan: "no".to_string(),
            contact: "cellular".to_string(),
            day: 1,
            month,
            duration: 0,
            campaign: 1,
            pdays: 999,
            previous: 0,
            poutcome,
        };
        let row = encode(&record, UnknownLevelPolicy::ZeroFill).unwrap();
        // The schema survives arbitrary junk under zero-fill
        prop_assert_eq!(row.len(), schema::EXPECTED_COLUMNS.len());
    }
}
