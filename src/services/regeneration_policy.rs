use crate::models::{DayPlan, GenerationMethod, WeeklyWorkoutPlan};

/// Pure predicate deciding whether a stored weekly plan can be reused or
/// must be rebuilt. No side effects.
#[derive(Clone, Copy, Default)]
pub struct RegenerationPolicy;

impl RegenerationPolicy {
    pub fn should_regenerate(&self, existing: Option<&WeeklyWorkoutPlan>, force: bool) -> bool {
        let Some(plan) = existing else {
            return true;
        };

        if force {
            return true;
        }

        // Fallback results are provisional: a later request should retry
        // the recommendation path now that it may be available.
        if plan.generation_method == GenerationMethod::Fallback {
            return true;
        }

        // A workout day whose non-zero exercise count disagrees with the
        // snapshot's fitness level was written by a superseded generation
        // path; rebuild rather than serve stale inconsistent data.
        let expected = plan
            .user_preferences_snapshot
            .fitness_level
            .exercises_per_day();
        plan.plan_data
            .values()
            .filter_map(DayPlan::as_workout)
            .any(|day| !day.exercises.is_empty() && day.exercises.len() != expected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        aggregate_totals, default_exercise_pool, FitnessLevel, PlanData, UserPreferencesSnapshot,
        Weekday, WorkoutDay,
    };
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    fn plan_with(
        method: GenerationMethod,
        level: FitnessLevel,
        counts: &[(Weekday, usize)],
    ) -> WeeklyWorkoutPlan {
        let mut plan_data = PlanData::new();
        for day in Weekday::ALL {
            match counts.iter().find(|(d, _)| *d == day) {
                Some((_, count)) => {
                    let exercises = default_exercise_pool().into_iter().take(*count).collect();
                    plan_data.insert(
                        day,
                        DayPlan::Workout(WorkoutDay::new(exercises, 20, 140, vec![])),
                    );
                }
                None => {
                    plan_data.insert(day, DayPlan::rest());
                }
            }
        }
        let totals = aggregate_totals(&plan_data);

        WeeklyWorkoutPlan {
            plan_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            week_start_date: NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(),
            week_end_date: NaiveDate::from_ymd_opt(2025, 3, 9).unwrap(),
            is_active: true,
            is_current_week: true,
            plan_data,
            total_workout_days: totals.workout_days,
            total_rest_days: totals.rest_days,
            total_exercises: totals.exercises,
            estimated_weekly_duration: totals.duration,
            estimated_weekly_calories: totals.calories,
            ml_generated: method == GenerationMethod::MlAuto,
            ml_confidence_score: None,
            generation_method: method,
            user_preferences_snapshot: UserPreferencesSnapshot {
                fitness_level: level,
                preferred_workout_days: counts.iter().map(|(d, _)| *d).collect(),
                target_muscle_groups: vec![],
                time_budget_minutes: 30,
            },
            workouts_completed: 0,
            workouts_skipped: 0,
            completion_rate: 0.0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            completed_at: None,
        }
    }

    #[test]
    fn missing_plan_regenerates() {
        assert!(RegenerationPolicy.should_regenerate(None, false));
    }

    #[test]
    fn force_regenerates_even_a_good_plan() {
        let plan = plan_with(
            GenerationMethod::MlAuto,
            FitnessLevel::Intermediate,
            &[(Weekday::Monday, 5)],
        );
        assert!(RegenerationPolicy.should_regenerate(Some(&plan), true));
    }

    #[test]
    fn fallback_plans_are_provisional() {
        let plan = plan_with(
            GenerationMethod::Fallback,
            FitnessLevel::Beginner,
            &[(Weekday::Monday, 4)],
        );
        assert!(RegenerationPolicy.should_regenerate(Some(&plan), false));
    }

    #[test]
    fn mismatched_day_count_forces_rebuild() {
        // Intermediate expects 5 per day; a 3-exercise Wednesday marks the
        // document as written by a defective generation path.
        let plan = plan_with(
            GenerationMethod::MlAuto,
            FitnessLevel::Intermediate,
            &[(Weekday::Monday, 5), (Weekday::Wednesday, 3)],
        );
        assert!(RegenerationPolicy.should_regenerate(Some(&plan), false));
    }

    #[test]
    fn empty_exercise_lists_do_not_trigger_rebuild() {
        let plan = plan_with(
            GenerationMethod::MlAuto,
            FitnessLevel::Intermediate,
            &[(Weekday::Monday, 5), (Weekday::Friday, 0)],
        );
        assert!(!RegenerationPolicy.should_regenerate(Some(&plan), false));
    }

    #[test]
    fn consistent_ml_plan_is_reused() {
        let plan = plan_with(
            GenerationMethod::MlAuto,
            FitnessLevel::Advanced,
            &[(Weekday::Tuesday, 6), (Weekday::Saturday, 6)],
        );
        assert!(!RegenerationPolicy.should_regenerate(Some(&plan), false));
    }
}
