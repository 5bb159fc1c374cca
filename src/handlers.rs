use crate::config::Config;
use crate::encoder;
use crate::errors::{AppError, ResultExt};
use crate::forest::RandomForest;
use crate::models::*;
use crate::schema;
use axum::{extract::State, http::StatusCode, Json};
use serde_json::json;
use std::sync::Arc;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// The pre-trained classifier, loaded once at startup.
    pub forest: Arc<RandomForest>,
}

/// Health check endpoint.
///
/// Returns the service status, version, and health information.
///
/// # Returns
///
/// * `(StatusCode, Json<serde_json::Value>)` - HTTP 200 OK with health status JSON.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "deposit-predictor",
            "version": "0.1.0"
        })),
    )
}

/// GET /api/v1/schema
///
/// Exposes the frozen training-time schema and the loaded artifact version
/// so the tables can be audited externally without reading the source.
///
/// # Arguments
///
/// * `state` - The application state.
///
/// # Returns
///
/// * `Json<SchemaResponse>` - The schema in canonical order.
pub async fn get_schema(State(state): State<Arc<AppState>>) -> Json<SchemaResponse> {
    Json(SchemaResponse {
        model_version: state.forest.format_version(),
        column_count: schema::EXPECTED_COLUMNS.len(),
        columns: schema::EXPECTED_COLUMNS
            .iter()
            .map(|c| (*c).to_string())
            .collect(),
    })
}

/// POST /api/v1/predict
///
/// The single-record prediction pipeline: validate the submitted record,
/// encode it against the frozen schema, run the classifier, and render the
/// result block. Every failure is converted to an error response at this
/// boundary; the process keeps serving the next submission.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `record` - JSON body containing the 16 raw form fields.
///
/// # Returns
///
/// * `Result<Json<PredictionResponse>, AppError>` - The prediction result or an error.
pub async fn predict(
    State(state): State<Arc<AppState>>,
    Json(record): Json<RawRecord>,
) -> Result<Json<PredictionResponse>, AppError> {
    tracing::info!(
        "POST /predict - age: {}, job: {}, month: {}",
        record.age,
        record.job,
        record.month
    );

    record.validate()?;

    let row = encoder::encode(&record, state.config.unknown_level_policy)
        .context("failed to encode record")?;

    let (p0, p1) = state
        .forest
        .predict_proba(&row)
        .context("classifier rejected the feature row")?;
    let prediction = u8::from(p1 >= 0.5);

    let (label, confidence) = if prediction == 1 {
        (
            "Customer is likely to subscribe".to_string(),
            format!("{:.1}%", p1 * 100.0),
        )
    } else {
        (
            "Customer is unlikely to subscribe".to_string(),
            format!("{:.1}%", p0 * 100.0),
        )
    };

    tracing::info!(
        "Prediction: {} (not_subscribe: {:.3}, subscribe: {:.3})",
        prediction,
        p0,
        p1
    );

    Ok(Json(PredictionResponse {
        prediction,
        label,
        probabilities: ProbabilityPair {
            not_subscribe: p0,
            subscribe: p1,
        },
        confidence,
        features: row.to_map(),
    }))
}
