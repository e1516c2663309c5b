use chrono::{NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{
    GenerationMethod, PlanData, PlanningError, UserPreferencesSnapshot, WeeklyWorkoutPlan,
};

const PLAN_COLUMNS: &str = "plan_id, user_id, week_start_date, week_end_date, is_active, \
     is_current_week, plan_data, total_workout_days, total_rest_days, total_exercises, \
     estimated_weekly_duration, estimated_weekly_calories, ml_generated, ml_confidence_score, \
     generation_method, user_preferences_snapshot, workouts_completed, workouts_skipped, \
     completion_rate, created_at, updated_at, completed_at";

/// Fields of a freshly generated plan, before it has a row.
#[derive(Debug)]
pub struct NewWeeklyPlan {
    pub user_id: Uuid,
    pub week_start_date: NaiveDate,
    pub week_end_date: NaiveDate,
    pub is_current_week: bool,
    pub plan_data: PlanData,
    pub total_workout_days: i32,
    pub total_rest_days: i32,
    pub total_exercises: i32,
    pub estimated_weekly_duration: i32,
    pub estimated_weekly_calories: i32,
    pub ml_generated: bool,
    pub ml_confidence_score: Option<f64>,
    pub generation_method: GenerationMethod,
    pub user_preferences_snapshot: UserPreferencesSnapshot,
}

/// Persistence for weekly_workout_plans. One active row per
/// (user_id, week_start_date); regeneration retires the old row and inserts
/// the new one in a single transaction.
#[derive(Clone)]
pub struct PlanStore {
    db: PgPool,
}

impl PlanStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn find_by_id(
        &self,
        plan_id: Uuid,
    ) -> Result<Option<WeeklyWorkoutPlan>, PlanningError> {
        let query = format!("SELECT {PLAN_COLUMNS} FROM weekly_workout_plans WHERE plan_id = $1");
        let plan = sqlx::query_as::<_, WeeklyWorkoutPlan>(&query)
            .bind(plan_id)
            .fetch_optional(&self.db)
            .await?;
        Ok(plan)
    }

    pub async fn find_active_for_week(
        &self,
        user_id: Uuid,
        week_start_date: NaiveDate,
    ) -> Result<Option<WeeklyWorkoutPlan>, PlanningError> {
        let query = format!(
            "SELECT {PLAN_COLUMNS} FROM weekly_workout_plans \
             WHERE user_id = $1 AND week_start_date = $2 AND is_active = TRUE"
        );
        let plan = sqlx::query_as::<_, WeeklyWorkoutPlan>(&query)
            .bind(user_id)
            .bind(week_start_date)
            .fetch_optional(&self.db)
            .await?;
        Ok(plan)
    }

    pub async fn find_current_week(
        &self,
        user_id: Uuid,
        today: NaiveDate,
    ) -> Result<Option<WeeklyWorkoutPlan>, PlanningError> {
        let query = format!(
            "SELECT {PLAN_COLUMNS} FROM weekly_workout_plans \
             WHERE user_id = $1 AND is_active = TRUE \
             AND week_start_date <= $2 AND week_end_date >= $2"
        );
        let plan = sqlx::query_as::<_, WeeklyWorkoutPlan>(&query)
            .bind(user_id)
            .bind(today)
            .fetch_optional(&self.db)
            .await?;
        Ok(plan)
    }

    /// Retire the superseded row (if any) and insert the replacement as a
    /// single logical write. Last writer wins at the (user, week) key.
    pub async fn replace_active(
        &self,
        retired_plan_id: Option<Uuid>,
        new_plan: NewWeeklyPlan,
    ) -> Result<WeeklyWorkoutPlan, PlanningError> {
        let now = Utc::now();
        let mut tx = self.db.begin().await?;

        if let Some(plan_id) = retired_plan_id {
            sqlx::query(
                "UPDATE weekly_workout_plans \
                 SET is_active = FALSE, is_current_week = FALSE, updated_at = $2 \
                 WHERE plan_id = $1",
            )
            .bind(plan_id)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        let query = format!(
            "INSERT INTO weekly_workout_plans ( \
                 plan_id, user_id, week_start_date, week_end_date, is_active, is_current_week, \
                 plan_data, total_workout_days, total_rest_days, total_exercises, \
                 estimated_weekly_duration, estimated_weekly_calories, ml_generated, \
                 ml_confidence_score, generation_method, user_preferences_snapshot, \
                 workouts_completed, workouts_skipped, completion_rate, created_at, updated_at \
             ) VALUES ( \
                 $1, $2, $3, $4, TRUE, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, \
                 0, 0, 0.0, $16, $16 \
             ) RETURNING {PLAN_COLUMNS}"
        );
        let plan = sqlx::query_as::<_, WeeklyWorkoutPlan>(&query)
            .bind(Uuid::new_v4())
            .bind(new_plan.user_id)
            .bind(new_plan.week_start_date)
            .bind(new_plan.week_end_date)
            .bind(new_plan.is_current_week)
            .bind(serde_json::to_value(&new_plan.plan_data)?)
            .bind(new_plan.total_workout_days)
            .bind(new_plan.total_rest_days)
            .bind(new_plan.total_exercises)
            .bind(new_plan.estimated_weekly_duration)
            .bind(new_plan.estimated_weekly_calories)
            .bind(new_plan.ml_generated)
            .bind(new_plan.ml_confidence_score)
            .bind(new_plan.generation_method)
            .bind(serde_json::to_value(&new_plan.user_preferences_snapshot)?)
            .bind(now)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(plan)
    }

    /// Write back a mutated document (adaptation, day completion). The full
    /// mutable state is persisted in one statement; partial updates are
    /// never written.
    pub async fn update(
        &self,
        plan: &WeeklyWorkoutPlan,
    ) -> Result<WeeklyWorkoutPlan, PlanningError> {
        let query = format!(
            "UPDATE weekly_workout_plans SET \
                 plan_data = $2, total_workout_days = $3, total_rest_days = $4, \
                 total_exercises = $5, estimated_weekly_duration = $6, \
                 estimated_weekly_calories = $7, user_preferences_snapshot = $8, \
                 workouts_completed = $9, workouts_skipped = $10, completion_rate = $11, \
                 completed_at = $12, updated_at = $13 \
             WHERE plan_id = $1 \
             RETURNING {PLAN_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, WeeklyWorkoutPlan>(&query)
            .bind(plan.plan_id)
            .bind(serde_json::to_value(&plan.plan_data)?)
            .bind(plan.total_workout_days)
            .bind(plan.total_rest_days)
            .bind(plan.total_exercises)
            .bind(plan.estimated_weekly_duration)
            .bind(plan.estimated_weekly_calories)
            .bind(serde_json::to_value(&plan.user_preferences_snapshot)?)
            .bind(plan.workouts_completed)
            .bind(plan.workouts_skipped)
            .bind(plan.completion_rate)
            .bind(plan.completed_at)
            .bind(Utc::now())
            .fetch_one(&self.db)
            .await?;
        Ok(updated)
    }
}
