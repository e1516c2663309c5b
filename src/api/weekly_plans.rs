use std::collections::BTreeSet;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post, put},
    Router,
};
use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{DayPlan, PlanningError, Weekday, WeeklyWorkoutPlan};
use crate::services::{monday_of, AdaptationEngine, PlanOrchestrator, PlanStore};

#[derive(Debug, Deserialize)]
pub struct GenerateWeeklyPlanRequest {
    pub user_id: Uuid,
    pub week_start_date: Option<NaiveDate>,
    #[serde(default, alias = "regenerate")]
    pub force_regenerate: bool,
}

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct CompleteDayRequest {
    pub day: Weekday,
}

#[derive(Debug, Deserialize)]
pub struct SkipDayRequest {
    pub day: Weekday,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PreferredDaysRequest {
    pub preferred_days: Vec<Weekday>,
    #[serde(default = "default_preserve_completed")]
    pub preserve_completed: bool,
}

fn default_preserve_completed() -> bool {
    true
}

#[derive(Debug, Serialize)]
pub struct WeeklyPlanResponse {
    pub plan: WeeklyWorkoutPlan,
    pub regenerated: bool,
}

#[derive(Debug, Serialize)]
pub struct CurrentWeekResponse {
    pub plan: WeeklyWorkoutPlan,
    pub today: Weekday,
    pub today_plan: Option<DayPlan>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error_code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            error_code: code.to_string(),
            message: message.into(),
        }
    }
}

fn map_error(error: PlanningError) -> (StatusCode, Json<ApiError>) {
    match error {
        PlanningError::ProfileUnavailable => (
            StatusCode::BAD_GATEWAY,
            Json(ApiError::new(
                "PROFILE_UNAVAILABLE",
                "User profile could not be fetched from the auth service",
            )),
        ),
        PlanningError::PlanNotFound => (
            StatusCode::NOT_FOUND,
            Json(ApiError::new("PLAN_NOT_FOUND", "Weekly plan not found")),
        ),
        PlanningError::NoWorkoutPlanned => (
            StatusCode::BAD_REQUEST,
            Json(ApiError::new(
                "NO_WORKOUT_PLANNED",
                "The requested day has no workout scheduled",
            )),
        ),
        PlanningError::InvalidAdaptation(reason) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiError::new("INVALID_ADAPTATION", reason)),
        ),
        PlanningError::Database(e) => {
            tracing::error!("database error: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiError::new("DATABASE_ERROR", "Internal database error")),
            )
        }
        PlanningError::Serialization(e) => {
            tracing::error!("serialization error: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiError::new(
                    "SERIALIZATION_ERROR",
                    "Failed to encode plan document",
                )),
            )
        }
    }
}

#[derive(Clone)]
pub struct WeeklyPlanAppState {
    pub store: PlanStore,
    pub orchestrator: PlanOrchestrator,
    pub adaptation: AdaptationEngine,
}

pub fn weekly_plan_routes(state: WeeklyPlanAppState) -> Router {
    Router::new()
        .route("/generate", post(generate_weekly_plan))
        .route("/current/:user_id", get(get_current_week_plan))
        .route("/week/:date", get(get_plan_for_week))
        .route("/:plan_id/complete-day", post(complete_day))
        .route("/:plan_id/skip-day", post(skip_day))
        .route("/:plan_id/preferred-days", put(update_preferred_days))
        .with_state(state)
}

/// Generate (or reuse) the weekly plan for a user's week. Answers 201 when
/// a plan was built, 200 when the stored one was reused.
pub async fn generate_weekly_plan(
    State(state): State<WeeklyPlanAppState>,
    Json(request): Json<GenerateWeeklyPlanRequest>,
) -> Result<(StatusCode, Json<WeeklyPlanResponse>), (StatusCode, Json<ApiError>)> {
    let outcome = state
        .orchestrator
        .get_or_create(
            request.user_id,
            request.week_start_date,
            request.force_regenerate,
        )
        .await
        .map_err(map_error)?;

    let status = if outcome.regenerated {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((
        status,
        Json(WeeklyPlanResponse {
            plan: outcome.plan,
            regenerated: outcome.regenerated,
        }),
    ))
}

/// Get the active plan covering today, generating one if none exists yet.
/// The response carries today's slice of the plan alongside the document.
pub async fn get_current_week_plan(
    State(state): State<WeeklyPlanAppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<CurrentWeekResponse>, (StatusCode, Json<ApiError>)> {
    let today = Utc::now().date_naive();

    let plan = match state
        .store
        .find_current_week(user_id, today)
        .await
        .map_err(map_error)?
    {
        Some(plan) => plan,
        None => {
            state
                .orchestrator
                .get_or_create(user_id, None, false)
                .await
                .map_err(map_error)?
                .plan
        }
    };

    let today = Weekday::from(today.weekday());
    let today_plan = plan.day_plan(today).cloned();
    Ok(Json(CurrentWeekResponse {
        plan,
        today,
        today_plan,
    }))
}

/// Get the active plan for the week containing the given date. The date is
/// normalized to its Monday before lookup.
pub async fn get_plan_for_week(
    State(state): State<WeeklyPlanAppState>,
    Path(date): Path<NaiveDate>,
    Query(query): Query<UserQuery>,
) -> Result<Json<WeeklyWorkoutPlan>, (StatusCode, Json<ApiError>)> {
    let plan = state
        .store
        .find_active_for_week(query.user_id, monday_of(date))
        .await
        .map_err(map_error)?
        .ok_or_else(|| map_error(PlanningError::PlanNotFound))?;

    Ok(Json(plan))
}

/// Mark one workout day completed and persist the recomputed progress.
pub async fn complete_day(
    State(state): State<WeeklyPlanAppState>,
    Path(plan_id): Path<Uuid>,
    Json(request): Json<CompleteDayRequest>,
) -> Result<Json<WeeklyWorkoutPlan>, (StatusCode, Json<ApiError>)> {
    let mut plan = state
        .store
        .find_by_id(plan_id)
        .await
        .map_err(map_error)?
        .ok_or_else(|| map_error(PlanningError::PlanNotFound))?;

    plan.mark_day_completed(request.day, Utc::now())
        .map_err(map_error)?;

    let updated = state.store.update(&plan).await.map_err(map_error)?;
    Ok(Json(updated))
}

/// Mark one workout day skipped, with an optional reason.
pub async fn skip_day(
    State(state): State<WeeklyPlanAppState>,
    Path(plan_id): Path<Uuid>,
    Json(request): Json<SkipDayRequest>,
) -> Result<Json<WeeklyWorkoutPlan>, (StatusCode, Json<ApiError>)> {
    let mut plan = state
        .store
        .find_by_id(plan_id)
        .await
        .map_err(map_error)?
        .ok_or_else(|| map_error(PlanningError::PlanNotFound))?;

    plan.mark_day_skipped(request.day, request.reason, Utc::now())
        .map_err(map_error)?;

    let updated = state.store.update(&plan).await.map_err(map_error)?;
    Ok(Json(updated))
}

/// Change the plan's preferred workout days mid-week, reallocating
/// exercises from removed future days onto added ones.
pub async fn update_preferred_days(
    State(state): State<WeeklyPlanAppState>,
    Path(plan_id): Path<Uuid>,
    Json(request): Json<PreferredDaysRequest>,
) -> Result<Json<WeeklyWorkoutPlan>, (StatusCode, Json<ApiError>)> {
    if request.preferred_days.is_empty() {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiError::new(
                "INVALID_ADAPTATION",
                "At least one preferred workout day is required",
            )),
        ));
    }

    // Duplicate day names collapse here.
    let new_days: BTreeSet<Weekday> = request.preferred_days.into_iter().collect();

    let updated = state
        .adaptation
        .adapt(plan_id, &new_days, request.preserve_completed)
        .await
        .map_err(map_error)?;

    Ok(Json(updated))
}
