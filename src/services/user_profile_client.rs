use std::time::Duration;

use serde::Deserialize;
use uuid::Uuid;

use crate::models::{FitnessLevel, PlanningError, Weekday};

const PROFILE_TIMEOUT: Duration = Duration::from_secs(10);

/// User profile fields needed for plan generation, as served by the auth
/// service. Missing fields get the same lenient defaults the planning
/// service has always applied.
#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub user_id: Uuid,
    pub fitness_level: FitnessLevel,
    pub preferred_workout_days: Vec<Weekday>,
    pub target_muscle_groups: Vec<String>,
    pub goals: Vec<String>,
    pub time_budget_minutes: i32,
}

#[derive(Debug, Deserialize)]
struct UserProfileResponse {
    fitness_level: Option<String>,
    #[serde(default)]
    preferred_workout_days: Vec<Weekday>,
    #[serde(default)]
    target_muscle_groups: Vec<String>,
    #[serde(default)]
    fitness_goals: Vec<String>,
    time_constraints_minutes: Option<i32>,
}

/// Client for the auth service's user-profile endpoint. The profile is a
/// hard prerequisite for generation: any failure here aborts the calling
/// operation.
#[derive(Clone)]
pub struct UserProfileClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl UserProfileClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, PROFILE_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            timeout,
        }
    }

    pub async fn fetch(&self, user_id: Uuid) -> Result<UserProfile, PlanningError> {
        let url = format!("{}/auth/user-profile/{}", self.base_url, user_id);

        let response = self
            .http
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(%user_id, error = %e, "failed to reach auth service");
                PlanningError::ProfileUnavailable
            })?;

        if !response.status().is_success() {
            tracing::error!(
                %user_id,
                status = %response.status(),
                "auth service returned non-success for user profile"
            );
            return Err(PlanningError::ProfileUnavailable);
        }

        let body: UserProfileResponse = response.json().await.map_err(|e| {
            tracing::error!(%user_id, error = %e, "failed to decode user profile");
            PlanningError::ProfileUnavailable
        })?;

        Ok(UserProfile {
            user_id,
            fitness_level: body
                .fitness_level
                .as_deref()
                .map(FitnessLevel::parse_lenient)
                .unwrap_or_default(),
            preferred_workout_days: body.preferred_workout_days,
            target_muscle_groups: body.target_muscle_groups,
            goals: body.fitness_goals,
            time_budget_minutes: body.time_constraints_minutes.unwrap_or(30),
        })
    }
}
