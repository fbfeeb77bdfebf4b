use axum::{
    extract::{DefaultBodyLimit, State},
    http::{HeaderName, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Form, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::limit::ConcurrencyLimitLayer;
use tower::ServiceBuilder;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::timeout::TimeoutLayer;
use tracing::info;

use crate::catalog::store::{DrugTable, PlantTable};
use crate::cli::ServeArgs;
use crate::matching::engine::{MatchQuery, MatchResult, MatchingConfig, MatchingEngine};
use crate::utils::validation::{validate_threshold, ValidationError};
use crate::web::render::{render_index, PageContent};

/// Maximum request body size; queries are two short text fields
pub const MAX_BODY_SIZE: usize = 64 * 1024;

/// Shared application state, loaded once at startup and never mutated
pub struct AppState {
    pub drugs: DrugTable,
    pub plants: PlantTable,
    pub config: MatchingConfig,
}

/// Enhanced error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_type: String,
    pub details: Option<String>,
}

/// Fields submitted by the search form
#[derive(Debug, Default, Deserialize)]
pub struct MatchForm {
    #[serde(default)]
    pub disease: String,
    #[serde(default)]
    pub region: String,
}

/// Body of a JSON match request
#[derive(Debug, Deserialize)]
pub struct MatchRequest {
    pub disease: String,
    pub region: String,
    /// Overrides the server's similarity threshold for this request
    pub threshold: Option<f64>,
}

/// Create a safe error response that prevents information disclosure
/// while logging detailed errors server-side for debugging
pub fn create_safe_error_response(
    error_type: &str,
    user_message: &str,
    internal_error: Option<&str>,
) -> ErrorResponse {
    // Log detailed error server-side for debugging (not exposed to client)
    if let Some(internal_msg) = internal_error {
        tracing::error!("Internal error ({}): {}", error_type, internal_msg);
    }

    ErrorResponse {
        error: user_message.to_string(),
        error_type: error_type.to_string(),
        details: None, // Never expose internal details to prevent information disclosure
    }
}

/// Run the web server
///
/// # Errors
///
/// Returns an error if the tables cannot be loaded, the tokio runtime cannot
/// be created, or the server fails to start.
pub fn run(args: ServeArgs) -> anyhow::Result<()> {
    // Build tokio runtime
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move { run_server(args).await })
}

/// Routes and handlers without middleware.
pub fn app_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index_handler).post(form_handler))
        .route("/api/match", post(match_handler))
        .route("/api/tables", get(tables_handler))
        .with_state(state)
}

/// Create the application router with all routes and middleware configured.
#[allow(clippy::missing_panics_doc)] // Panics only on invalid governor config (constants are valid)
pub fn create_router(state: Arc<AppState>) -> Router {
    // Configure IP-based rate limiting
    let governor_conf = GovernorConfigBuilder::default()
        .per_second(10) // 10 requests per second per IP
        .burst_size(50) // Allow bursts of 50 requests
        .finish()
        .unwrap();

    // Build router with comprehensive security layers
    app_routes(state).layer(
        ServiceBuilder::new()
            // Security headers for browser protection
            .layer(SetResponseHeaderLayer::if_not_present(
                HeaderName::from_static("x-content-type-options"),
                HeaderValue::from_static("nosniff"),
            ))
            .layer(SetResponseHeaderLayer::if_not_present(
                HeaderName::from_static("x-frame-options"),
                HeaderValue::from_static("DENY"),
            ))
            .layer(SetResponseHeaderLayer::if_not_present(
                HeaderName::from_static("content-security-policy"),
                HeaderValue::from_static(
                    "default-src 'none'; style-src 'unsafe-inline'; form-action 'self'",
                ),
            ))
            .layer(SetResponseHeaderLayer::if_not_present(
                HeaderName::from_static("referrer-policy"),
                HeaderValue::from_static("strict-origin-when-cross-origin"),
            ))
            // IP-based rate limiting to prevent abuse
            .layer(GovernorLayer {
                config: Arc::new(governor_conf),
            })
            // Request timeout to prevent slow client attacks
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                Duration::from_secs(30),
            ))
            // Limit concurrent requests to prevent DOS
            .layer(ConcurrencyLimitLayer::new(100))
            .layer(DefaultBodyLimit::max(MAX_BODY_SIZE)),
    )
}

async fn run_server(args: ServeArgs) -> anyhow::Result<()> {
    let config = MatchingConfig::with_threshold(args.threshold)?;
    let (drugs, plants) = args.tables.load()?;
    info!(
        "Loaded {} drug records and {} plant records",
        drugs.len(),
        plants.len()
    );

    let state = Arc::new(AppState {
        drugs,
        plants,
        config,
    });
    let app = create_router(state);

    let addr = format!("{}:{}", args.address, args.port);
    println!("Starting phyto-match web server at http://{addr}");

    if args.open {
        let _ = open::that(format!("http://{addr}"));
    }

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// Main page handler
async fn index_handler() -> Html<String> {
    Html(render_index("", "", &PageContent::Empty))
}

/// Form submission: re-render the page with the results
async fn form_handler(State(state): State<Arc<AppState>>, Form(form): Form<MatchForm>) -> Response {
    let query = match MatchQuery::new(&form.disease, &form.region) {
        Ok(query) => query,
        Err(e) => {
            let page = render_index(&form.disease, &form.region, &PageContent::Error(&e.to_string()));
            return (StatusCode::UNPROCESSABLE_ENTITY, Html(page)).into_response();
        }
    };

    let result = run_match(&state, &query, state.config);
    Html(render_index(
        &query.disease,
        &query.region,
        &PageContent::Results(&result.plants),
    ))
    .into_response()
}

/// API endpoint for matching
async fn match_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<MatchRequest>,
) -> Response {
    let validated = MatchQuery::new(&request.disease, &request.region).and_then(|query| {
        let config = match request.threshold {
            Some(threshold) => MatchingConfig {
                similarity_threshold: validate_threshold(threshold)?,
                ..state.config
            },
            None => state.config,
        };
        Ok::<_, ValidationError>((query, config))
    });

    let (query, config) = match validated {
        Ok(validated) => validated,
        Err(e) => {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(create_safe_error_response(
                    "validation_error",
                    &e.to_string(),
                    None,
                )),
            )
                .into_response();
        }
    };

    let result = run_match(&state, &query, config);
    Json(serde_json::json!({
        "query": {
            "disease": query.disease,
            "region": query.region,
            "threshold": config.similarity_threshold,
        },
        "plants": result.plants,
        "stats": result.stats,
    }))
    .into_response()
}

/// Return the sizes of the loaded tables
async fn tables_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "drug_records": state.drugs.len(),
        "plant_records": state.plants.len(),
        "similarity_threshold": state.config.similarity_threshold,
    }))
}

fn run_match(state: &AppState, query: &MatchQuery, config: MatchingConfig) -> MatchResult {
    MatchingEngine::with_config(&state.drugs, &state.plants, config).find_matches(query)
}
