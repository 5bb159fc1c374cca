use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::errors::AppError;
use crate::schema;

// ============ Request Models ============

/// One customer's raw form input, exactly as submitted.
///
/// Categorical fields are carried as plain strings: the form restricts them
/// to fixed choice lists, and `validate` re-checks the domains server-side
/// before the record reaches the encoder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRecord {
    /// Customer age in years.
    pub age: i64,
    /// Raw job category (one of 12 values, including "unknown").
    pub job: String,
    /// Marital status: single, married or divorced.
    pub marital: String,
    /// Education level: primary, secondary, tertiary or unknown.
    pub education: String,
    /// Has credit in default? "yes" or "no".
    pub default: String,
    /// Account balance in euros; may be negative.
    pub balance: i64,
    /// Has a housing loan? "yes" or "no".
    pub housing: String,
    /// Has a personal loan? "yes" or "no".
    pub loan: String,
    /// Contact channel: cellular or telephone.
    pub contact: String,
    /// Day of month of last contact.
    pub day: i64,
    /// Three-letter month code of last contact.
    pub month: String,
    /// Duration of last contact, in seconds.
    pub duration: i64,
    /// Number of contacts during this campaign.
    pub campaign: i64,
    /// Days since the customer was last contacted; 999 means never.
    pub pdays: i64,
    /// Number of contacts before this campaign.
    pub previous: i64,
    /// Outcome of the previous campaign: success, failure or unknown.
    pub poutcome: String,
}

impl RawRecord {
    /// Collector-side domain validation.
    ///
    /// Checks every field against the bounds and choice lists the form
    /// enforces, and reports all violations at once so the caller can fix
    /// the whole submission in one round trip. A record that passes is
    /// domain-valid by construction; the encoder does not re-validate.
    pub fn validate(&self) -> Result<(), AppError> {
        let mut problems = Vec::new();

        if !(18..=90).contains(&self.age) {
            problems.push(format!("age must be between 18 and 90, got {}", self.age));
        }
        if !schema::JOB_CHOICES.contains(&self.job.as_str()) {
            problems.push(format!("job '{}' is not a known category", self.job));
        }
        if !schema::MARITAL_CHOICES.contains(&self.marital.as_str()) {
            problems.push(format!("marital '{}' is not a known status", self.marital));
        }
        if !schema::EDUCATION_CHOICES.contains(&self.education.as_str()) {
            problems.push(format!(
                "education '{}' is not a known level",
                self.education
            ));
        }
        if !schema::YES_NO_CHOICES.contains(&self.default.as_str()) {
            problems.push(format!(
                "default must be 'yes' or 'no', got '{}'",
                self.default
            ));
        }
        if !(-5000..=100_000).contains(&self.balance) {
            problems.push(format!(
                "balance must be between -5000 and 100000, got {}",
                self.balance
            ));
        }
        if !schema::YES_NO_CHOICES.contains(&self.housing.as_str()) {
            problems.push(format!(
                "housing must be 'yes' or 'no', got '{}'",
                self.housing
            ));
        }
        if !schema::YES_NO_CHOICES.contains(&self.loan.as_str()) {
            problems.push(format!("loan must be 'yes' or 'no', got '{}'", self.loan));
        }
        if !schema::CONTACT_CHOICES.contains(&self.contact.as_str()) {
            problems.push(format!("contact '{}' is not a known channel", self.contact));
        }
        if !(1..=31).contains(&self.day) {
            problems.push(format!("day must be between 1 and 31, got {}", self.day));
        }
        if !schema::MONTH_CHOICES.contains(&self.month.as_str()) {
            problems.push(format!("month '{}' is not a known month code", self.month));
        }
        if !(0..=1200).contains(&self.duration) {
            problems.push(format!(
                "duration must be between 0 and 1200 seconds, got {}",
                self.duration
            ));
        }
        if !(1..=5).contains(&self.campaign) {
            problems.push(format!(
                "campaign must be between 1 and 5, got {}",
                self.campaign
            ));
        }
        if !(0..=999).contains(&self.pdays) {
            problems.push(format!(
                "pdays must be between 0 and 999 (999 = never contacted), got {}",
                self.pdays
            ));
        }
        if !(0..=5).contains(&self.previous) {
            problems.push(format!(
                "previous must be between 0 and 5, got {}",
                self.previous
            ));
        }
        if !schema::POUTCOME_CHOICES.contains(&self.poutcome.as_str()) {
            problems.push(format!(
                "poutcome '{}' is not a known outcome",
                self.poutcome
            ));
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(AppError::BadRequest(problems.join("; ")))
        }
    }
}

// ============ Response Models ============

/// Probability pair returned by the classifier; the two values sum to 1.0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbabilityPair {
    /// Probability the customer will NOT subscribe.
    pub not_subscribe: f64,
    /// Probability the customer WILL subscribe.
    pub subscribe: f64,
}

/// Result block rendered to the caller after a prediction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResponse {
    /// Predicted class: 0 = will not subscribe, 1 = will subscribe.
    pub prediction: u8,
    /// Human-readable verdict for the predicted class.
    pub label: String,
    /// Raw probability pair.
    pub probabilities: ProbabilityPair,
    /// Probability of the predicted class, formatted to one decimal place
    /// (e.g. "87.3%").
    pub confidence: String,
    /// The encoded feature row, in canonical column order.
    pub features: BTreeMap<String, f64>,
}

/// Response for the schema-auditing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaResponse {
    /// Artifact format version of the loaded model.
    pub model_version: u32,
    /// Number of columns in the frozen schema.
    pub column_count: usize,
    /// The frozen schema, in canonical order.
    pub columns: Vec<String>,
}
