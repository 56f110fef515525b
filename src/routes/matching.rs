use actix_web::{web, HttpResponse, Responder};
use validator::Validate;
use crate::config::Settings;
use crate::core::{rng_from_seed, MatchMaker};
use crate::error::MatchError;
use crate::models::{ErrorResponse, HealthResponse, RunMatchingRequest};
use crate::routes::auth::{AdminGuard, AuthConfig};
use std::sync::Arc;
use std::time::Duration;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub matchmaker: Arc<MatchMaker>,
    pub auth: AuthConfig,
    pub default_seed: Option<u64>,
    pub run_timeout: Duration,
}

impl AppState {
    pub fn new(matchmaker: MatchMaker, settings: &Settings) -> Self {
        Self {
            matchmaker: Arc::new(matchmaker),
            auth: AuthConfig::from_settings(&settings.auth),
            default_seed: settings.matching.seed,
            run_timeout: Duration::from_secs(settings.server.run_timeout_secs),
        }
    }
}

/// Configure all matching routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/matching/run", web::post().to(run_matching));
}

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Run a matching round
///
/// POST /api/v1/matching/run
///
/// Request body:
/// ```json
/// {
///   "participants": [{"id": "...", "role": "veterane", "course": "..."}],
///   "seed": 42,
///   "maxConnections": 2
/// }
/// ```
///
/// Responds with `{ "<mentor id>": ["<mentee id>", ...] }`.
async fn run_matching(
    state: web::Data<AppState>,
    admin: AdminGuard,
    req: web::Json<RunMatchingRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for run_matching request: {:?}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let request = req.into_inner();
    let seed = request.seed.or(state.default_seed);
    let mut matchmaker = state.matchmaker.as_ref().clone();
    if let Some(max_connections) = request.max_connections {
        matchmaker = matchmaker.with_max_connections(max_connections as usize);
    }

    tracing::info!(
        "Running matching for {} participants (requested by {}, max connections {})",
        request.participants.len(),
        admin.subject.as_deref().unwrap_or("anonymous"),
        matchmaker.max_connections()
    );

    let records = request.participants;
    let job = web::block(move || {
        let mut rng = rng_from_seed(seed);
        matchmaker.run(&records, &mut rng)
    });

    match tokio::time::timeout(state.run_timeout, job).await {
        Ok(Ok(Ok(outcome))) => {
            if !outcome.summary.degraded_attributes.is_empty() {
                tracing::warn!(
                    "Matching finished with degraded attributes: {:?}",
                    outcome.summary.degraded_attributes
                );
            }
            HttpResponse::Ok().json(outcome.assignments)
        }
        Ok(Ok(Err(e))) => {
            tracing::error!("Matching run failed: {}", e);
            HttpResponse::UnprocessableEntity().json(ErrorResponse {
                error: error_kind(&e).to_string(),
                message: e.to_string(),
                status_code: 422,
            })
        }
        Ok(Err(e)) => {
            tracing::error!("Matching worker failed: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Matching process failed".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
        Err(_) => {
            tracing::error!("Matching run exceeded {:?}", state.run_timeout);
            HttpResponse::GatewayTimeout().json(ErrorResponse {
                error: "Matching timed out".to_string(),
                message: format!("run exceeded {} seconds", state.run_timeout.as_secs()),
                status_code: 504,
            })
        }
    }
}

fn error_kind(error: &MatchError) -> &'static str {
    match error {
        MatchError::EmptyInput
        | MatchError::NoMentors
        | MatchError::NoMentees
        | MatchError::InvalidRecord { .. } => "invalid_input",
        MatchError::UnknownAttributeKind { .. }
        | MatchError::InvalidSchema(_)
        | MatchError::Configuration(_) => "invalid_configuration",
        MatchError::InfeasibleCapacity { .. } => "infeasible_capacity",
        MatchError::ShapeMismatch { .. } | MatchError::Solver(_) => "matching_failed",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(error_kind(&MatchError::NoMentees), "invalid_input");
        assert_eq!(error_kind(&MatchError::InvalidSchema("x".into())), "invalid_configuration");
        assert_eq!(
            error_kind(&MatchError::InfeasibleCapacity {
                participants: 1,
                total: 0,
                cap: 1
            }),
            "infeasible_capacity"
        );
    }
}
