//! HTTP routes and request handlers

use crate::app_state::{AppState, SharedAppState};
use crate::cli::CommandLineArgs;
use crate::error::UserInsightsError;
use crate::evaluation;
use crate::insights::{self, MinLogins};
use crate::loader;
use crate::metrics;
use crate::models::{
    EvaluationReport, LoadResponse, LoginsPerDay, SuperusersResponse,
    TeamInsight, TopCountries,
};

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use std::time::Instant;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// Build the [Router] serving all endpoints from `state`.
pub fn router(state: SharedAppState) -> Router {
    Router::new()
        .route("/users", post(load))
        .route("/superusers", get(superusers))
        .route("/top-countries", get(top_countries))
        .route("/team-insights", get(team_insights))
        .route("/active-users-per-day", get(active_users_per_day))
        .route("/evaluation", get(evaluation))
        .route("/metrics", get(metrics::metrics_handler))
        .with_state(state)
        .layer(
            ServiceBuilder::new().layer(
                TraceLayer::new_for_http()
                    .on_request(metrics::request_counter)
                    .on_response(metrics::record_response_metrics),
            ),
        )
}

/// Build the [Router] for the server, with fresh state derived from `args`.
pub fn service(args: &CommandLineArgs) -> Router {
    router(Arc::new(AppState::new(args)))
}

/// Replace the loaded users with the contents of the users file.
///
/// The request body is ignored.
async fn load(State(state): State<SharedAppState>) -> Result<Json<LoadResponse>, UserInsightsError> {
    let users = loader::load_users(&state.args.users_file).await?;
    let count = users.len();
    state.store.replace(users);
    metrics::LOADED_USERS.set(count.try_into().unwrap_or(i64::MAX));
    tracing::info!(count, path = %state.args.users_file, "loaded users");
    Ok(Json(LoadResponse::new(count)))
}

async fn superusers(State(state): State<SharedAppState>) -> Response {
    let users = state.store.snapshot();
    let start = Instant::now();
    let data = insights::superusers(&users);
    let elapsed = start.elapsed();
    tracing::debug!(found = data.len(), of = users.len(), ?elapsed, "filtered superusers");
    Json(SuperusersResponse {
        processing_time_ms: format!("{:.2} ms", elapsed.as_secs_f64() * 1000.0),
        total: data.len(),
        data,
    })
    .into_response()
}

async fn top_countries(State(state): State<SharedAppState>) -> Json<TopCountries> {
    Json(insights::top_countries(&state.store.snapshot()))
}

async fn team_insights(State(state): State<SharedAppState>) -> Json<Vec<TeamInsight>> {
    Json(insights::team_insights(&state.store.snapshot()))
}

async fn active_users_per_day(
    State(state): State<SharedAppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Json<Vec<LoginsPerDay>> {
    let min = MinLogins::from_query(&params);
    Json(insights::logins_per_day(&state.store.snapshot(), min))
}

async fn evaluation(State(state): State<SharedAppState>) -> Json<EvaluationReport> {
    Json(evaluation::evaluate(state.probe.as_ref()).await)
}
