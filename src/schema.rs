//! Frozen training-time schema and lookup tables.
//!
//! Everything in this module is a verbatim artifact of the original model
//! training pipeline. The classifier indexes features positionally, so a
//! wrong column set or order silently corrupts predictions instead of
//! failing. Do not re-derive or "fix" these tables; they are versioned
//! alongside the model artifact they were trained against.

/// Full column schema the classifier was trained against, in canonical
/// lexicographic order: 10 numeric columns plus 28 one-hot indicators.
///
/// Note the levels the training pipeline dropped: there is no
/// `education_unknown`, `marital_divorced`, `month_dec` or
/// `job_categories_cat3` column. Records carrying those values encode as
/// an all-zero indicator group for that field.
pub const EXPECTED_COLUMNS: &[&str] = &[
    "age",
    "age_categories_about to retire",
    "age_categories_old age",
    "age_categories_stable",
    "age_categories_struggling",
    "balance",
    "campaign",
    "contact_cellular",
    "contact_telephone",
    "day",
    "default",
    "duration",
    "education_primary",
    "education_secondary",
    "education_tertiary",
    "housing",
    "job_categories_cat1",
    "job_categories_cat2",
    "job_categories_cat4",
    "loan",
    "marital_married",
    "marital_single",
    "month_apr",
    "month_aug",
    "month_feb",
    "month_jan",
    "month_jul",
    "month_jun",
    "month_mar",
    "month_may",
    "month_nov",
    "month_oct",
    "month_sep",
    "pdays",
    "poutcome_failure",
    "poutcome_success",
    "poutcome_unknown",
    "previous",
];

/// Many-to-one regrouping of the 12 raw job categories into the 4 coarse
/// buckets used at training time.
pub const JOB_BUCKETS: &[(&str, &str)] = &[
    ("admin.", "cat1"),
    ("technician", "cat1"),
    ("services", "cat2"),
    ("management", "cat2"),
    ("blue-collar", "cat2"),
    ("housemaid", "cat2"),
    ("retired", "cat3"),
    ("student", "cat3"),
    ("unemployed", "cat3"),
    ("unknown", "cat3"),
    ("entrepreneur", "cat4"),
    ("self-employed", "cat4"),
];

/// Age bins: left-open, right-closed. An age `a` falls into the first
/// entry with `a <= upper`. Ages outside (0, 100] have no bin.
pub const AGE_BINS: &[(i64, &str)] = &[
    (30, "struggling"),
    (45, "stable"),
    (60, "about to retire"),
    (100, "old age"),
];

/// Valid choice lists for the categorical form fields. Used by the
/// collector-side validation, not by the encoder (which trusts its caller).
pub const JOB_CHOICES: &[&str] = &[
    "admin.",
    "technician",
    "services",
    "retired",
    "management",
    "blue-collar",
    "entrepreneur",
    "housemaid",
    "student",
    "unemployed",
    "self-employed",
    "unknown",
];

pub const MARITAL_CHOICES: &[&str] = &["single", "married", "divorced"];

pub const EDUCATION_CHOICES: &[&str] = &["primary", "secondary", "tertiary", "unknown"];

pub const YES_NO_CHOICES: &[&str] = &["yes", "no"];

pub const CONTACT_CHOICES: &[&str] = &["cellular", "telephone"];

pub const MONTH_CHOICES: &[&str] = &[
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

pub const POUTCOME_CHOICES: &[&str] = &["success", "failure", "unknown"];

/// Look up the coarse bucket for a raw job category.
pub fn job_bucket(job: &str) -> Option<&'static str> {
    JOB_BUCKETS
        .iter()
        .find(|(raw, _)| *raw == job)
        .map(|(_, bucket)| *bucket)
}

/// Look up the age bin label for an age. `None` for ages outside (0, 100].
pub fn age_bin(age: i64) -> Option<&'static str> {
    if age <= 0 {
        return None;
    }
    AGE_BINS
        .iter()
        .find(|(upper, _)| age <= *upper)
        .map(|(_, label)| *label)
}

/// Whether a column name belongs to the frozen schema.
pub fn is_schema_column(name: &str) -> bool {
    // EXPECTED_COLUMNS is sorted, so binary search is valid.
    EXPECTED_COLUMNS.binary_search(&name).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_is_sorted_and_has_38_columns() {
        assert_eq!(EXPECTED_COLUMNS.len(), 38);
        let mut sorted = EXPECTED_COLUMNS.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted.as_slice(), EXPECTED_COLUMNS);
    }

    #[test]
    fn every_job_choice_has_a_bucket() {
        for job in JOB_CHOICES {
            assert!(job_bucket(job).is_some(), "no bucket for job {}", job);
        }
    }

    #[test]
    fn age_bin_boundaries() {
        assert_eq!(age_bin(30), Some("struggling"));
        assert_eq!(age_bin(31), Some("stable"));
        assert_eq!(age_bin(45), Some("stable"));
        assert_eq!(age_bin(46), Some("about to retire"));
        assert_eq!(age_bin(60), Some("about to retire"));
        assert_eq!(age_bin(61), Some("old age"));
        assert_eq!(age_bin(100), Some("old age"));
        assert_eq!(age_bin(0), None);
        assert_eq!(age_bin(101), None);
        assert_eq!(age_bin(-5), None);
    }

    #[test]
    fn dropped_training_levels_are_not_schema_columns() {
        assert!(!is_schema_column("education_unknown"));
        assert!(!is_schema_column("marital_divorced"));
        assert!(!is_schema_column("month_dec"));
        assert!(!is_schema_column("job_categories_cat3"));
    }
}
