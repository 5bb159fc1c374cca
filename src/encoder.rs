/// Feature-encoding pipeline: RawRecord -> FeatureRow.
///
/// This is the one part of the service with real invariants. The encoder is
/// a pure, stateless, single-pass transform that must reproduce the
/// training-time preprocessing exactly:
/// 1. coerce the yes/no fields to 1/0;
/// 2. bin age into the four training-time age categories;
/// 3. regroup the 12 raw jobs into the four coarse buckets;
/// 4. one-hot expand the categorical fields against the frozen schema;
/// 5. reconcile with the schema (zero-fill missing, drop extras, sort).
///
/// The encoder trusts its caller: records are expected to be domain-valid
/// (see `RawRecord::validate`). What happens to values that still miss the
/// lookup tables is an explicit policy, not an accident.
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::models::RawRecord;
use crate::schema;

/// What to do with a categorical value that has no entry in the lookup
/// tables (a level never seen at training time).
///
/// The original pipeline silently encoded such values as an all-zero
/// indicator group; `ZeroFill` reproduces that. `Strict` fails loudly
/// instead. Levels the training pipeline itself dropped (e.g. "divorced",
/// "dec") are part of the known domain and zero-fill under both policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownLevelPolicy {
    /// Unknown levels encode as all zeros for their field (the original
    /// behavior; silent data loss).
    #[default]
    ZeroFill,
    /// Unknown levels fail the encode with `EncodeError::SchemaMismatch`.
    Strict,
}

impl UnknownLevelPolicy {
    /// Parse the policy from its configuration spelling.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "zero-fill" => Some(UnknownLevelPolicy::ZeroFill),
            "strict" => Some(UnknownLevelPolicy::Strict),
            _ => None,
        }
    }
}

/// Encoder-domain errors.
#[derive(Debug, Clone, PartialEq)]
pub enum EncodeError {
    /// Age outside (0, 100]: no training-time bin exists, which is a
    /// precondition violation rather than an unknown level.
    AgeOutOfRange(i64),
    /// A raw value has no entry in a lookup table (strict policy only).
    SchemaMismatch {
        /// The raw field the value came from.
        field: &'static str,
        /// The offending value.
        value: String,
    },
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodeError::AgeOutOfRange(age) => {
                write!(f, "age {} has no bin in (0, 100]", age)
            }
            EncodeError::SchemaMismatch { field, value } => {
                write!(
                    f,
                    "value '{}' for field '{}' was never seen at training time",
                    value, field
                )
            }
        }
    }
}

impl std::error::Error for EncodeError {}

/// One encoded record: every schema column, in canonical lexicographic
/// order, no extras, no omissions.
///
/// The classifier indexes features positionally, so this invariant is the
/// single most important one in the system. `FeatureRow` can only be built
/// by `encode`, which reconciles against the frozen schema before
/// returning.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureRow {
    // BTreeMap iteration order is the canonical (lexicographic) order.
    columns: BTreeMap<String, f64>,
}

impl FeatureRow {
    /// Value of a column by name.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.columns.get(name).copied()
    }

    /// Number of columns (always the schema width).
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Column names in canonical order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// The ordered numeric vector the classifier consumes, aligned to
    /// `schema::EXPECTED_COLUMNS`.
    pub fn to_vector(&self) -> Vec<f64> {
        self.columns.values().copied().collect()
    }

    /// The row as an ordered name -> value map, for rendering.
    pub fn to_map(&self) -> BTreeMap<String, f64> {
        self.columns.clone()
    }
}

/// Coerce a yes/no field to 1/0. Anything other than exactly "yes" encodes
/// as 0; the encoder trusts its caller to have validated the domain.
fn binary_flag(value: &str) -> f64 {
    if value == "yes" {
        1.0
    } else {
        0.0
    }
}

/// Emit the one-hot indicator for one observed categorical level.
///
/// Only schema-known columns are ever written: a level the training
/// pipeline dropped leaves its whole indicator group at zero. A level
/// outside the known domain is handled per the policy.
fn one_hot(
    columns: &mut BTreeMap<String, f64>,
    field: &'static str,
    value: &str,
    domain: &[&str],
    policy: UnknownLevelPolicy,
) -> Result<(), EncodeError> {
    if !domain.contains(&value) {
        return match policy {
            UnknownLevelPolicy::ZeroFill => Ok(()),
            UnknownLevelPolicy::Strict => Err(EncodeError::SchemaMismatch {
                field,
                value: value.to_string(),
            }),
        };
    }
    let column = format!("{}_{}", field, value);
    if schema::is_schema_column(&column) {
        columns.insert(column, 1.0);
    }
    Ok(())
}

/// Deterministic, pure, total transform from a raw record to the
/// fixed-schema feature row. No hidden state, no I/O.
pub fn encode(record: &RawRecord, policy: UnknownLevelPolicy) -> Result<FeatureRow, EncodeError> {
    let mut columns: BTreeMap<String, f64> = BTreeMap::new();

    // Step 1: numeric passthrough and binary coercion.
    columns.insert("age".to_string(), record.age as f64);
    columns.insert("balance".to_string(), record.balance as f64);
    columns.insert("day".to_string(), record.day as f64);
    columns.insert("duration".to_string(), record.duration as f64);
    columns.insert("campaign".to_string(), record.campaign as f64);
    columns.insert("pdays".to_string(), record.pdays as f64);
    columns.insert("previous".to_string(), record.previous as f64);
    columns.insert("default".to_string(), binary_flag(&record.default));
    columns.insert("housing".to_string(), binary_flag(&record.housing));
    columns.insert("loan".to_string(), binary_flag(&record.loan));

    // Step 2: age binning. An unbinnable age is a precondition violation
    // under every policy, not an unknown level.
    let age_label = schema::age_bin(record.age).ok_or(EncodeError::AgeOutOfRange(record.age))?;

    // Step 3: job regrouping via the frozen bucket table.
    let job_label = match schema::job_bucket(&record.job) {
        Some(bucket) => Some(bucket),
        None => match policy {
            UnknownLevelPolicy::ZeroFill => None,
            UnknownLevelPolicy::Strict => {
                return Err(EncodeError::SchemaMismatch {
                    field: "job",
                    value: record.job.clone(),
                })
            }
        },
    };

    // Step 4: one-hot expansion of the categorical fields and the two
    // derived ones.
    one_hot(
        &mut columns,
        "education",
        &record.education,
        schema::EDUCATION_CHOICES,
        policy,
    )?;
    one_hot(
        &mut columns,
        "marital",
        &record.marital,
        schema::MARITAL_CHOICES,
        policy,
    )?;
    one_hot(
        &mut columns,
        "contact",
        &record.contact,
        schema::CONTACT_CHOICES,
        policy,
    )?;
    one_hot(
        &mut columns,
        "month",
        &record.month,
        schema::MONTH_CHOICES,
        policy,
    )?;
    one_hot(
        &mut columns,
        "poutcome",
        &record.poutcome,
        schema::POUTCOME_CHOICES,
        policy,
    )?;
    one_hot(
        &mut columns,
        "age_categories",
        age_label,
        &["struggling", "stable", "about to retire", "old age"],
        policy,
    )?;
    if let Some(bucket) = job_label {
        one_hot(
            &mut columns,
            "job_categories",
            bucket,
            &["cat1", "cat2", "cat3", "cat4"],
            policy,
        )?;
    }

    // Step 5: schema reconciliation. Drop anything outside the schema,
    // zero-fill anything missing. The BTreeMap keeps the canonical order.
    columns.retain(|name, _| schema::is_schema_column(name));
    for name in schema::EXPECTED_COLUMNS {
        columns.entry((*name).to_string()).or_insert(0.0);
    }

    debug_assert_eq!(columns.len(), schema::EXPECTED_COLUMNS.len());

    Ok(FeatureRow { columns })
}
