use chrono::{Datelike, Duration, NaiveDate, Utc};
use uuid::Uuid;

use crate::models::{
    aggregate_totals, DayPlan, GenerationMethod, PlanningError, UserPreferencesSnapshot,
    Weekday, WeeklyWorkoutPlan,
};

use super::fallback_allocator::{FallbackAllocator, GeneratedWeek};
use super::plan_store::{NewWeeklyPlan, PlanStore};
use super::recommendation_client::{MlPlanOutcome, RecommendationClient};
use super::regeneration_policy::RegenerationPolicy;
use super::user_profile_client::{UserProfile, UserProfileClient};

/// Result of a get-or-create call, with the reuse/rebuild decision exposed
/// for the API layer.
#[derive(Debug)]
pub struct PlanRequestOutcome {
    pub plan: WeeklyWorkoutPlan,
    pub regenerated: bool,
}

/// Top-level control for weekly plan requests: reuse the stored document,
/// or rebuild via the recommendation service with the fallback allocator
/// behind it.
#[derive(Clone)]
pub struct PlanOrchestrator {
    store: PlanStore,
    profiles: UserProfileClient,
    recommendations: RecommendationClient,
    allocator: FallbackAllocator,
    policy: RegenerationPolicy,
}

impl PlanOrchestrator {
    pub fn new(
        store: PlanStore,
        profiles: UserProfileClient,
        recommendations: RecommendationClient,
        allocator: FallbackAllocator,
    ) -> Self {
        Self {
            store,
            profiles,
            recommendations,
            allocator,
            policy: RegenerationPolicy,
        }
    }

    pub async fn get_or_create(
        &self,
        user_id: Uuid,
        week_start_date: Option<NaiveDate>,
        force: bool,
    ) -> Result<PlanRequestOutcome, PlanningError> {
        self.get_or_create_at(user_id, week_start_date, force, Utc::now().date_naive())
            .await
    }

    /// Same as `get_or_create`, with "today" passed explicitly so the
    /// reuse/rebuild decision and `is_current_week` stay deterministic.
    pub async fn get_or_create_at(
        &self,
        user_id: Uuid,
        week_start_date: Option<NaiveDate>,
        force: bool,
        today: NaiveDate,
    ) -> Result<PlanRequestOutcome, PlanningError> {
        let week_start = monday_of(week_start_date.unwrap_or(today));
        let week_end = week_start + Duration::days(6);

        let existing = self.store.find_active_for_week(user_id, week_start).await?;

        if let Some(plan) = existing
            .as_ref()
            .filter(|p| !self.policy.should_regenerate(Some(p), force))
        {
            // The stored document satisfies the current preferences; no
            // external call is made.
            tracing::info!(%user_id, %week_start, plan_id = %plan.plan_id, "reusing weekly plan");
            return Ok(PlanRequestOutcome {
                plan: plan.clone(),
                regenerated: false,
            });
        }

        // Profile fetch is the hard prerequisite; everything after it has a
        // degraded path.
        let profile = self.profiles.fetch(user_id).await?;

        let week = match self.recommendations.generate(&profile).await {
            Some(outcome) => week_from_ml(outcome, &profile),
            None => {
                tracing::warn!(%user_id, "recommendation service unusable, using fallback allocator");
                self.allocator.allocate(&profile).await
            }
        };

        let new_plan = NewWeeklyPlan {
            user_id,
            week_start_date: week_start,
            week_end_date: week_end,
            is_current_week: today >= week_start && today <= week_end,
            plan_data: week.plan_data,
            total_workout_days: week.totals.workout_days,
            total_rest_days: week.totals.rest_days,
            total_exercises: week.totals.exercises,
            estimated_weekly_duration: week.totals.duration,
            estimated_weekly_calories: week.totals.calories,
            ml_generated: week.ml_generated,
            ml_confidence_score: week.ml_confidence_score,
            generation_method: week.generation_method,
            user_preferences_snapshot: snapshot_from(&profile),
        };

        let plan = self
            .store
            .replace_active(existing.map(|p| p.plan_id), new_plan)
            .await?;

        tracing::info!(
            %user_id,
            %week_start,
            plan_id = %plan.plan_id,
            generation_method = ?plan.generation_method,
            workout_days = plan.total_workout_days,
            "weekly plan generated"
        );

        Ok(PlanRequestOutcome {
            plan,
            regenerated: true,
        })
    }
}

/// Normalize any date to the Monday of its week.
pub fn monday_of(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

fn snapshot_from(profile: &UserProfile) -> UserPreferencesSnapshot {
    UserPreferencesSnapshot {
        fitness_level: profile.fitness_level,
        preferred_workout_days: profile.preferred_workout_days.clone(),
        target_muscle_groups: profile.target_muscle_groups.clone(),
        time_budget_minutes: profile.time_budget_minutes,
    }
}

/// Package a recommendation-service result as a persistable week. Missing
/// days are filled with rest markers and the document totals are recomputed
/// from the day map so the stored aggregates always agree with it.
fn week_from_ml(outcome: MlPlanOutcome, profile: &UserProfile) -> GeneratedWeek {
    let mut plan_data = outcome.plan_data;
    for day in Weekday::ALL {
        plan_data.entry(day).or_insert_with(DayPlan::rest);
    }

    let totals = aggregate_totals(&plan_data);
    if totals.exercises != outcome.metadata.total_exercises {
        tracing::debug!(
            user_id = %profile.user_id,
            computed = totals.exercises,
            reported = outcome.metadata.total_exercises,
            "ml metadata exercise count disagrees with day plans"
        );
    }

    GeneratedWeek {
        plan_data,
        totals,
        ml_generated: true,
        ml_confidence_score: outcome.metadata.confidence_score,
        generation_method: GenerationMethod::MlAuto,
    }
}
