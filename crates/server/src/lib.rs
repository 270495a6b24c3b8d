pub mod config;
pub mod doc;
pub mod dtos;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;
pub mod utils;

use crate::{doc::ApiDoc, routes::health, state::AppState};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_axum::{router::OpenApiRouter, routes};
use utoipa_swagger_ui::SwaggerUi;

/// Builds the application: `/api`, `/health`, the OpenAPI document and Swagger UI
pub fn app(state: AppState) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .routes(routes!(health::health))
        .nest("/api", routes::api_router())
        .split_for_parts();

    router
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new()),
        )
        .with_state(state)
}
