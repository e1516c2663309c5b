use axum::{routing::get, Router};
use sqlx::PgPool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::health::health_check;
use super::weekly_plans::{weekly_plan_routes, WeeklyPlanAppState};
use crate::config::CollaboratorConfig;
use crate::services::{
    AdaptationEngine, ExerciseCatalogClient, FallbackAllocator, PlanOrchestrator, PlanStore,
    RecommendationClient, UserProfileClient,
};

pub fn create_routes(db: PgPool, collaborators: &CollaboratorConfig) -> Router {
    let store = PlanStore::new(db);
    let profiles = UserProfileClient::new(collaborators.auth_service_url.clone());
    let recommendations = RecommendationClient::new(collaborators.ml_service_url.clone());
    let catalog = ExerciseCatalogClient::new(collaborators.content_service_url.clone());

    let orchestrator = PlanOrchestrator::new(
        store.clone(),
        profiles,
        recommendations,
        FallbackAllocator::new(catalog.clone()),
    );
    let adaptation = AdaptationEngine::new(store.clone(), catalog);

    let state = WeeklyPlanAppState {
        store,
        orchestrator,
        adaptation,
    };

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/planning/weekly", weekly_plan_routes(state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
