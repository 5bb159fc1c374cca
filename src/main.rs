mod config;
mod encoder;
mod errors;
mod forest;
mod handlers;
mod models;
mod schema;

use axum::{
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::forest::RandomForest;

/// Serves the customer-input form.
///
/// One self-contained HTML page with the 16 fields, constrained at the
/// point of entry (range inputs, fixed choice lists) so submissions are
/// domain-valid by construction. Submitting posts the record as JSON to
/// `/api/v1/predict` and renders the result block: the preprocessed
/// feature table, the predicted label and the confidence percentages.
///
/// # Returns
///
/// * `impl IntoResponse` - The HTTP response containing the form HTML.
async fn serve_form() -> impl IntoResponse {
    let html = r#"
<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Bank Term Deposit Predictor</title>
    <style>
        body { font-family: sans-serif; margin: 0 auto; max-width: 760px; padding: 2rem; }
        form { background-color: #f0f2f6; padding: 2rem; border-radius: 10px; }
        .grid { display: grid; grid-template-columns: 1fr 1fr; gap: 0.75rem 2rem; }
        label { display: block; font-size: 0.9rem; margin-top: 0.5rem; }
        input, select { width: 100%; box-sizing: border-box; padding: 0.3rem; }
        button { margin-top: 1.5rem; padding: 0.6rem 2rem; }
        #result { margin-top: 2rem; }
        .ok { color: #0a7d32; } .bad { color: #b00020; }
        table { border-collapse: collapse; font-size: 0.8rem; }
        td, th { border: 1px solid #ccc; padding: 2px 8px; text-align: right; }
    </style>
</head>
<body>
    <h1>&#127794; Bank Term Deposit Predictor</h1>
    <form id="predict-form">
        <h2>Customer Information</h2>
        <div class="grid">
            <div>
                <label>Age <input type="number" name="age" min="18" max="90" value="35" required></label>
                <label>Job <select name="job">
                    <option>admin.</option><option>technician</option><option>services</option>
                    <option>retired</option><option>management</option><option>blue-collar</option>
                    <option>entrepreneur</option><option>housemaid</option><option>student</option>
                    <option>unemployed</option><option>self-employed</option><option>unknown</option>
                </select></label>
                <label>Marital Status <select name="marital">
                    <option>single</option><option>married</option><option>divorced</option>
                </select></label>
                <label>Education <select name="education">
                    <option>primary</option><option>secondary</option><option>tertiary</option><option>unknown</option>
                </select></label>
                <label>Credit in Default? <select name="default"><option>no</option><option>yes</option></select></label>
                <label>Balance <input type="number" name="balance" min="-5000" max="100000" value="1000" required></label>
            </div>
            <div>
                <label>Housing Loan? <select name="housing"><option>no</option><option>yes</option></select></label>
                <label>Personal Loan? <select name="loan"><option>no</option><option>yes</option></select></label>
                <label>Contact Type <select name="contact"><option>cellular</option><option>telephone</option></select></label>
                <label>Day <input type="number" name="day" min="1" max="31" value="15" required></label>
                <label>Month <select name="month">
                    <option>jan</option><option>feb</option><option>mar</option><option>apr</option>
                    <option>may</option><option>jun</option><option>jul</option><option>aug</option>
                    <option>sep</option><option>oct</option><option>nov</option><option>dec</option>
                </select></label>
                <label>Duration (seconds) <input type="number" name="duration" min="0" max="1200" value="300" required></label>
            </div>
        </div>
        <h2>Campaign Information</h2>
        <div class="grid">
            <div>
                <label>Number of Contacts <input type="number" name="campaign" min="1" max="5" value="1" required></label>
                <label>Days Since Last Contact (999 = never)
                    <input type="number" name="pdays" min="0" max="999" value="999" required></label>
            </div>
            <div>
                <label>Previous Contacts <input type="number" name="previous" min="0" max="5" value="0" required></label>
                <label>Previous Outcome <select name="poutcome">
                    <option>unknown</option><option>success</option><option>failure</option>
                </select></label>
            </div>
        </div>
        <button type="submit">Predict Subscription</button>
    </form>
    <div id="result"></div>
    <script>
        const numeric = ["age", "balance", "day", "duration", "campaign", "pdays", "previous"];
        document.getElementById("predict-form").addEventListener("submit", async (ev) => {
            ev.preventDefault();
            const record = Object.fromEntries(new FormData(ev.target));
            numeric.forEach(k => record[k] = parseInt(record[k], 10));
            const out = document.getElementById("result");
            try {
                const resp = await fetch("/api/v1/predict", {
                    method: "POST",
                    headers: { "Content-Type": "application/json" },
                    body: JSON.stringify(record),
                });
                const body = await resp.json();
                if (!resp.ok) {
                    out.innerHTML = "<p class='bad'>&#10060; " + body.error + "</p>";
                    return;
                }
                const pct = p => (p * 100).toFixed(1) + "%";
                const rows = Object.entries(body.features)
                    .map(([k, v]) => "<tr><td>" + k + "</td><td>" + v + "</td></tr>").join("");
                const verdict = body.prediction === 1
                    ? "<p class='ok'>&#9989; " + body.label + " (Confidence: " + body.confidence + ")</p>"
                    : "<p class='bad'>&#10060; " + body.label + " (Confidence: " + body.confidence + ")</p>";
                out.innerHTML =
                    "<h2>Prediction Probabilities</h2>" +
                    "<p>Not Subscribe: " + pct(body.probabilities.not_subscribe) +
                    "<br>Subscribe: " + pct(body.probabilities.subscribe) + "</p>" +
                    verdict +
                    "<h2>Preprocessed Data</h2><table>" + rows + "</table>";
            } catch (e) {
                out.innerHTML = "<p class='bad'>&#10060; Request failed: " + e + "</p>";
            }
        });
    </script>
</body>
</html>
"#;
    (
        StatusCode::OK,
        [(axum::http::header::CONTENT_TYPE, "text/html; charset=utf-8")],
        html,
    )
}

/// Main entry point for the application.
///
/// This function initializes the application, including:
/// - Logging and tracing.
/// - Configuration loading.
/// - The model artifact (loaded once; a failed load is fatal).
/// - HTTP routes and middleware (CORS, Rate Limiting).
///
/// It then starts the Axum server.
///
/// # Returns
///
/// * `anyhow::Result<()>` - Ok if the server runs successfully, or an error if initialization fails.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "deposit_predictor=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded successfully");

    // Load the model artifact. This is the only blocking startup step:
    // either it fully succeeds before any request is served, or the
    // process refuses to serve.
    let forest = RandomForest::load(&config.model_path)?;
    tracing::info!(
        "Model loaded successfully: format_version {}, {} trees",
        forest.format_version(),
        forest.n_trees()
    );

    // Build application state
    let app_state = Arc::new(handlers::AppState {
        config: config.clone(),
        forest: Arc::new(forest),
    });

    // Configure rate limiter: 10 requests/second per IP, burst of 20
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(10)
            .burst_size(20)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .unwrap(),
    );

    // Build protected routes with security layers
    let protected_routes = Router::new()
        // Input form
        .route("/", get(serve_form))
        // API endpoints
        .route("/api/v1/predict", post(handlers::predict))
        .route("/api/v1/schema", get(handlers::get_schema))
        .layer(
            ServiceBuilder::new()
                // Request size limit: one record per invocation, 64KB is generous
                .layer(RequestBodyLimitLayer::new(64 * 1024))
                // Rate limiting: 10 req/sec per IP, burst of 20
                .layer(GovernorLayer {
                    config: governor_conf,
                }),
        );

    // Build final app with health check (bypasses rate limiting)
    let app = Router::new()
        .route("/health", get(handlers::health))
        .merge(protected_routes)
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
