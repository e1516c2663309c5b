use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use uuid::Uuid;

use crate::models::{FitnessLevel, PlanData, Weekday};

use super::user_profile_client::UserProfile;

/// Total attempts per call. Transport failures are retried once; HTTP-level
/// rejections are definitive and never retried.
const MAX_ATTEMPTS: u32 = 2;
const RETRY_DELAY: Duration = Duration::from_secs(1);
const RECOMMENDATION_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize)]
struct GenerateWeeklyPlanRequest<'a> {
    user_id: Uuid,
    workout_days: &'a [Weekday],
    fitness_level: FitnessLevel,
    target_muscle_groups: &'a [String],
    goals: &'a [String],
    time_constraints: i32,
}

#[derive(Debug, Deserialize)]
struct MlWeeklyPlanResponse {
    weekly_plan: PlanData,
    #[serde(default)]
    metadata: MlPlanMetadata,
}

#[derive(Debug, Default, Deserialize)]
pub struct MlPlanMetadata {
    #[serde(default)]
    pub total_exercises: i32,
    #[serde(default)]
    pub estimated_weekly_duration: i32,
    #[serde(default)]
    pub estimated_weekly_calories: i32,
    pub confidence_score: Option<f64>,
}

/// Usable result from the recommendation service.
#[derive(Debug)]
pub struct MlPlanOutcome {
    pub plan_data: PlanData,
    pub metadata: MlPlanMetadata,
}

/// Client for the ML recommendation service's weekly-plan endpoint.
///
/// `None` is the sole negative signal: the caller falls through to the
/// fallback allocator and never retries on its own.
#[derive(Clone)]
pub struct RecommendationClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
    retry_delay: Duration,
}

impl RecommendationClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timing(base_url, RECOMMENDATION_TIMEOUT, RETRY_DELAY)
    }

    pub fn with_timing(
        base_url: impl Into<String>,
        timeout: Duration,
        retry_delay: Duration,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            timeout,
            retry_delay,
        }
    }

    pub async fn generate(&self, profile: &UserProfile) -> Option<MlPlanOutcome> {
        let url = format!("{}/generate-weekly-plan", self.base_url);
        let body = GenerateWeeklyPlanRequest {
            user_id: profile.user_id,
            workout_days: &profile.preferred_workout_days,
            fitness_level: profile.fitness_level,
            target_muscle_groups: &profile.target_muscle_groups,
            goals: &profile.goals,
            time_constraints: profile.time_budget_minutes,
        };

        let started = Instant::now();
        let mut attempts = 0u32;

        let outcome = loop {
            attempts += 1;

            match self
                .http
                .post(&url)
                .timeout(self.timeout)
                .json(&body)
                .send()
                .await
            {
                Ok(response) if response.status().is_success() => {
                    match response.json::<MlWeeklyPlanResponse>().await {
                        Ok(parsed) => {
                            break Some(MlPlanOutcome {
                                plan_data: parsed.weekly_plan,
                                metadata: parsed.metadata,
                            })
                        }
                        // A broken payload is a definitive negative, like a
                        // non-2xx status: the transport worked.
                        Err(e) => {
                            tracing::warn!(
                                user_id = %profile.user_id,
                                error = %e,
                                "ml service returned an unusable weekly plan payload"
                            );
                            break None;
                        }
                    }
                }
                Ok(response) => {
                    tracing::warn!(
                        user_id = %profile.user_id,
                        status = %response.status(),
                        "ml service rejected weekly plan request"
                    );
                    break None;
                }
                Err(e) if attempts < MAX_ATTEMPTS => {
                    tracing::warn!(
                        user_id = %profile.user_id,
                        attempt = attempts,
                        error = %e,
                        "ml service call failed, retrying"
                    );
                    sleep(self.retry_delay).await;
                }
                Err(e) => {
                    tracing::warn!(
                        user_id = %profile.user_id,
                        attempt = attempts,
                        error = %e,
                        "ml service call failed, giving up"
                    );
                    break None;
                }
            }
        };

        // Fire-and-forget timing/outcome record for observability.
        tracing::info!(
            user_id = %profile.user_id,
            duration_ms = started.elapsed().as_millis() as u64,
            attempts,
            usable = outcome.is_some(),
            "recommendation service call finished"
        );

        outcome
    }
}
