pub mod error;
pub mod recovery;
pub mod routes;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Cosmos Launchpad API",
        version = "0.1.0",
        description = "Provision Ignite-scaffolded Cosmos chains onto a VPS over SSH"
    ),
    paths(
        routes::health_check,
        routes::db_status,
        routes::create_deployment,
        routes::get_deployment_status,
        routes::get_deployment_logs,
        routes::cancel_deployment,
        routes::deployment_events,
        routes::list_deployments,
        routes::admin_stats,
    ),
    components(schemas(
        routes::HealthResponse,
        routes::DbStatusResponse,
        routes::DeployResponse,
        routes::DeploymentStatusResponse,
        routes::DeploymentLogsResponse,
        routes::CancelResponse,
        routes::DeploymentSummary,
        routes::Pagination,
        routes::DeploymentListResponse,
        error::ErrorResponse,
        launchpad_core::CreateDeploymentRequest,
        launchpad_core::DeploymentStatus,
        launchpad_core::DeploymentLogEntry,
        launchpad_core::LogStep,
        launchpad_core::DeploymentStats,
    )),
    tags(
        (name = "health", description = "Liveness and database status"),
        (name = "deployments", description = "Submit and follow chain deployments"),
        (name = "admin", description = "Aggregate statistics"),
    )
)]
pub struct ApiDoc;

pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(routes::health_check))
        .route("/db-status", get(routes::db_status))
        .route("/deploy", post(routes::create_deployment))
        .route("/deployments", get(routes::list_deployments))
        .route(
            "/deployments/{id}/status",
            get(routes::get_deployment_status),
        )
        .route("/deployments/{id}/logs", get(routes::get_deployment_logs))
        .route("/deployments/{id}/cancel", post(routes::cancel_deployment))
        .route("/deployments/{id}/events", get(routes::deployment_events))
        .route("/admin/stats", get(routes::admin_stats));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api/openapi.json", ApiDoc::openapi()))
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
