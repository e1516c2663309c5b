use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::error::PlanningError;
use super::exercise::{ExerciseCandidate, FitnessLevel};

/// Canonical weekday, ordered Monday..Sunday. The derived `Ord` follows the
/// declaration order, which is the week-order index used for all
/// future/past comparisons.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    /// Week-order index: Monday = 0 .. Sunday = 6.
    pub fn index(self) -> usize {
        self as usize
    }

    /// A day is "future" purely by name position within the week cycle,
    /// not by calendar date.
    pub fn is_after(self, other: Weekday) -> bool {
        self.index() > other.index()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Weekday::Monday => "monday",
            Weekday::Tuesday => "tuesday",
            Weekday::Wednesday => "wednesday",
            Weekday::Thursday => "thursday",
            Weekday::Friday => "friday",
            Weekday::Saturday => "saturday",
            Weekday::Sunday => "sunday",
        }
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(day: chrono::Weekday) -> Self {
        match day {
            chrono::Weekday::Mon => Weekday::Monday,
            chrono::Weekday::Tue => Weekday::Tuesday,
            chrono::Weekday::Wed => Weekday::Wednesday,
            chrono::Weekday::Thu => Weekday::Thursday,
            chrono::Weekday::Fri => Weekday::Friday,
            chrono::Weekday::Sat => Weekday::Saturday,
            chrono::Weekday::Sun => Weekday::Sunday,
        }
    }
}

/// One day inside a weekly plan: either a rest marker or a concrete
/// workout. Serialized in the same JSON shape the planning service has
/// always persisted (`planned`/`rest_day` booleans present in both
/// variants), so the variant is modeled as an untagged union.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DayPlan {
    Workout(WorkoutDay),
    Rest(RestDay),
}

impl DayPlan {
    pub fn rest() -> Self {
        DayPlan::Rest(RestDay {
            planned: false,
            rest_day: true,
        })
    }

    pub fn is_planned(&self) -> bool {
        matches!(self, DayPlan::Workout(_))
    }

    pub fn as_workout(&self) -> Option<&WorkoutDay> {
        match self {
            DayPlan::Workout(day) => Some(day),
            DayPlan::Rest(_) => None,
        }
    }

    pub fn as_workout_mut(&mut self) -> Option<&mut WorkoutDay> {
        match self {
            DayPlan::Workout(day) => Some(day),
            DayPlan::Rest(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutDay {
    pub planned: bool,
    pub rest_day: bool,
    #[serde(default = "default_workout_type")]
    pub workout_type: String,
    pub exercises: Vec<ExerciseCandidate>,
    pub estimated_duration: i32,
    pub estimated_calories: i32,
    #[serde(default)]
    pub focus_areas: Vec<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub skipped: bool,
    #[serde(default)]
    pub adapted_from_reallocation: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skipped_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_reason: Option<String>,
}

impl WorkoutDay {
    pub fn new(
        exercises: Vec<ExerciseCandidate>,
        estimated_duration: i32,
        estimated_calories: i32,
        focus_areas: Vec<String>,
    ) -> Self {
        Self {
            planned: true,
            rest_day: false,
            workout_type: default_workout_type(),
            exercises,
            estimated_duration,
            estimated_calories,
            focus_areas,
            completed: false,
            skipped: false,
            adapted_from_reallocation: false,
            completed_at: None,
            skipped_at: None,
            skip_reason: None,
        }
    }
}

fn default_workout_type() -> String {
    "tabata".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestDay {
    pub planned: bool,
    pub rest_day: bool,
}

/// Per-week day mapping. All seven keys are always present; BTreeMap
/// iteration follows the canonical Monday..Sunday order.
pub type PlanData = BTreeMap<Weekday, DayPlan>;

/// Aggregates derived from the seven day plans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanTotals {
    pub workout_days: i32,
    pub rest_days: i32,
    pub exercises: i32,
    pub duration: i32,
    pub calories: i32,
}

/// Recompute document-level totals by summing over all seven day plans.
pub fn aggregate_totals(plan_data: &PlanData) -> PlanTotals {
    let mut totals = PlanTotals {
        workout_days: 0,
        rest_days: 0,
        exercises: 0,
        duration: 0,
        calories: 0,
    };

    for day_plan in plan_data.values() {
        match day_plan {
            DayPlan::Workout(day) => {
                totals.workout_days += 1;
                totals.exercises += day.exercises.len() as i32;
                totals.duration += day.estimated_duration;
                totals.calories += day.estimated_calories;
            }
            DayPlan::Rest(_) => totals.rest_days += 1,
        }
    }

    totals
}

/// Provenance tag distinguishing recommendation-service output from locally
/// computed output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "generation_method", rename_all = "snake_case")]
pub enum GenerationMethod {
    MlAuto,
    Fallback,
}

/// User preferences frozen at generation time, persisted alongside the plan
/// for regeneration reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPreferencesSnapshot {
    pub fitness_level: FitnessLevel,
    pub preferred_workout_days: Vec<Weekday>,
    pub target_muscle_groups: Vec<String>,
    pub time_budget_minutes: i32,
}

/// Aggregate root: one weekly workout plan per user per week, with at most
/// one active row per (user_id, week_start_date).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WeeklyWorkoutPlan {
    pub plan_id: Uuid,
    pub user_id: Uuid,
    /// Monday of the plan's week.
    pub week_start_date: NaiveDate,
    /// Sunday of the plan's week (week_start_date + 6 days).
    pub week_end_date: NaiveDate,
    pub is_active: bool,
    pub is_current_week: bool,
    #[sqlx(json)]
    pub plan_data: PlanData,
    pub total_workout_days: i32,
    pub total_rest_days: i32,
    pub total_exercises: i32,
    pub estimated_weekly_duration: i32,
    pub estimated_weekly_calories: i32,
    pub ml_generated: bool,
    pub ml_confidence_score: Option<f64>,
    pub generation_method: GenerationMethod,
    #[sqlx(json)]
    pub user_preferences_snapshot: UserPreferencesSnapshot,
    pub workouts_completed: i32,
    pub workouts_skipped: i32,
    pub completion_rate: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl WeeklyWorkoutPlan {
    pub fn day_plan(&self, day: Weekday) -> Option<&DayPlan> {
        self.plan_data.get(&day)
    }

    pub fn today_plan(&self, today: Weekday) -> Option<&DayPlan> {
        self.day_plan(today)
    }

    /// Days that carry a workout, in canonical week order.
    pub fn workout_days(&self) -> BTreeSet<Weekday> {
        self.plan_data
            .iter()
            .filter(|(_, plan)| plan.is_planned())
            .map(|(day, _)| *day)
            .collect()
    }

    pub fn rest_days(&self) -> BTreeSet<Weekday> {
        self.plan_data
            .iter()
            .filter(|(_, plan)| !plan.is_planned())
            .map(|(day, _)| *day)
            .collect()
    }

    pub fn is_current_week(&self, today: NaiveDate) -> bool {
        today >= self.week_start_date && today <= self.week_end_date
    }

    /// Flip a day's completed flag and update the completion counters.
    /// Rejects rest days; completing an already-completed day is a no-op.
    pub fn mark_day_completed(
        &mut self,
        day: Weekday,
        now: DateTime<Utc>,
    ) -> Result<(), PlanningError> {
        let workout = self
            .plan_data
            .get_mut(&day)
            .and_then(DayPlan::as_workout_mut)
            .ok_or(PlanningError::NoWorkoutPlanned)?;

        if workout.completed {
            return Ok(());
        }

        workout.completed = true;
        workout.completed_at = Some(now);
        self.workouts_completed += 1;
        self.updated_at = now;
        self.update_completion_rate();
        Ok(())
    }

    /// Flip a day's skipped flag. Rejects rest days; skipping twice is a
    /// no-op for the counters.
    pub fn mark_day_skipped(
        &mut self,
        day: Weekday,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), PlanningError> {
        let workout = self
            .plan_data
            .get_mut(&day)
            .and_then(DayPlan::as_workout_mut)
            .ok_or(PlanningError::NoWorkoutPlanned)?;

        if workout.skipped {
            return Ok(());
        }

        workout.skipped = true;
        workout.skipped_at = Some(now);
        workout.skip_reason = reason;
        self.workouts_skipped += 1;
        self.updated_at = now;
        self.update_completion_rate();
        Ok(())
    }

    /// Recompute all stored aggregates from the current day map.
    pub fn recompute_totals(&mut self) {
        let totals = aggregate_totals(&self.plan_data);
        self.total_workout_days = totals.workout_days;
        self.total_rest_days = totals.rest_days;
        self.total_exercises = totals.exercises;
        self.estimated_weekly_duration = totals.duration;
        self.estimated_weekly_calories = totals.calories;
        self.update_completion_rate();
    }

    fn update_completion_rate(&mut self) {
        if self.total_workout_days > 0 {
            self.completion_rate =
                f64::from(self.workouts_completed) / f64::from(self.total_workout_days) * 100.0;
        }
    }
}
