use std::collections::BTreeSet;

use chrono::{Datelike, Utc};
use uuid::Uuid;

use crate::models::{
    default_exercise_pool, DayPlan, ExerciseCandidate, PlanData, PlanningError, Weekday,
    WeeklyWorkoutPlan, WorkoutDay, MINUTES_PER_EXERCISE,
};

use super::exercise_catalog_client::ExerciseCatalogClient;
use super::plan_store::PlanStore;

/// Adapts an existing weekly plan in place when the preferred-day set
/// changes mid-week, salvaging unexpired, incomplete assignments instead of
/// discarding them.
#[derive(Clone)]
pub struct AdaptationEngine {
    store: PlanStore,
    catalog: ExerciseCatalogClient,
}

impl AdaptationEngine {
    pub fn new(store: PlanStore, catalog: ExerciseCatalogClient) -> Self {
        Self { store, catalog }
    }

    pub async fn adapt(
        &self,
        plan_id: Uuid,
        new_days: &BTreeSet<Weekday>,
        preserve_completed: bool,
    ) -> Result<WeeklyWorkoutPlan, PlanningError> {
        let today = Weekday::from(Utc::now().date_naive().weekday());
        self.adapt_at(plan_id, new_days, preserve_completed, today).await
    }

    /// Same as `adapt`, with "today" passed explicitly. The future/past
    /// comparison is by week-order index relative to today's day name, not
    /// by calendar date.
    pub async fn adapt_at(
        &self,
        plan_id: Uuid,
        new_days: &BTreeSet<Weekday>,
        preserve_completed: bool,
        today: Weekday,
    ) -> Result<WeeklyWorkoutPlan, PlanningError> {
        let mut plan = self
            .store
            .find_by_id(plan_id)
            .await?
            .ok_or(PlanningError::PlanNotFound)?;

        validate_request(&plan)?;

        let old_days: BTreeSet<Weekday> = plan
            .user_preferences_snapshot
            .preferred_workout_days
            .iter()
            .copied()
            .collect();
        if *new_days == old_days {
            return Ok(plan);
        }

        // Size the catalog top-up before mutating anything: whatever the
        // orphan pool cannot cover is requested fresh, and the built-in
        // defaults back the catalog so added days always fill exactly.
        let deficit = projected_deficit(&plan, new_days, today);
        let mut top_up = if deficit > 0 {
            self.catalog
                .exercises_by_criteria(
                    plan.user_preferences_snapshot.fitness_level,
                    &plan.user_preferences_snapshot.target_muscle_groups,
                    deficit,
                )
                .await
        } else {
            Vec::new()
        };
        top_up.extend(default_exercise_pool());

        apply_adaptation(&mut plan, new_days, preserve_completed, today, &top_up);

        let updated = self.store.update(&plan).await?;
        tracing::info!(
            %plan_id,
            workout_days = updated.total_workout_days,
            top_up_deficit = deficit,
            "weekly plan adapted to new preferred days"
        );
        Ok(updated)
    }
}

/// Reject inconsistent documents before any mutation: every preferred day
/// in the snapshot must actually carry a workout.
fn validate_request(plan: &WeeklyWorkoutPlan) -> Result<(), PlanningError> {
    for day in &plan.user_preferences_snapshot.preferred_workout_days {
        let planned = plan
            .plan_data
            .get(day)
            .map(DayPlan::is_planned)
            .unwrap_or(false);
        if !planned {
            return Err(PlanningError::InvalidAdaptation(format!(
                "preferred day {} has no workout in the stored plan",
                day.as_str()
            )));
        }
    }
    Ok(())
}

/// How many exercises the added days will need beyond what the orphan pool
/// can supply.
fn projected_deficit(
    plan: &WeeklyWorkoutPlan,
    new_days: &BTreeSet<Weekday>,
    today: Weekday,
) -> usize {
    let old_days: BTreeSet<Weekday> = plan
        .user_preferences_snapshot
        .preferred_workout_days
        .iter()
        .copied()
        .collect();
    let per_day = plan
        .user_preferences_snapshot
        .fitness_level
        .exercises_per_day();

    let orphan_supply: usize = old_days
        .difference(new_days)
        .filter(|day| day.is_after(today))
        .filter_map(|day| plan.plan_data.get(day).and_then(DayPlan::as_workout))
        .filter(|workout| !workout.completed)
        .map(|workout| workout.exercises.len())
        .sum();

    let needed = new_days.difference(&old_days).count() * per_day;
    needed.saturating_sub(orphan_supply)
}

/// In-place reallocation. `top_up` must be non-empty whenever the orphan
/// pool cannot cover the added days (the engine appends the default pool to
/// guarantee this).
fn apply_adaptation(
    plan: &mut WeeklyWorkoutPlan,
    new_days: &BTreeSet<Weekday>,
    preserve_completed: bool,
    today: Weekday,
    top_up: &[ExerciseCandidate],
) {
    let old_days: BTreeSet<Weekday> = plan
        .user_preferences_snapshot
        .preferred_workout_days
        .iter()
        .copied()
        .collect();
    let removed: BTreeSet<Weekday> = old_days.difference(new_days).copied().collect();
    let added: BTreeSet<Weekday> = new_days.difference(&old_days).copied().collect();
    let per_day = plan
        .user_preferences_snapshot
        .fitness_level
        .exercises_per_day();

    let orphans = collect_orphans(&mut plan.plan_data, &removed, today, preserve_completed);
    fill_added_days(&mut plan.plan_data, &added, per_day, orphans, top_up);

    plan.user_preferences_snapshot.preferred_workout_days = new_days.iter().copied().collect();
    plan.recompute_totals();
}

/// Free exercises from removed days that are strictly in the future and not
/// completed, turning those days into rest. Past days keep whatever state
/// they have; completed future days are kept when `preserve_completed` and
/// cleared (without salvage) otherwise.
fn collect_orphans(
    plan_data: &mut PlanData,
    removed: &BTreeSet<Weekday>,
    today: Weekday,
    preserve_completed: bool,
) -> Vec<ExerciseCandidate> {
    let mut orphans = Vec::new();

    for day in removed {
        if !day.is_after(today) {
            continue;
        }
        let Some(DayPlan::Workout(workout)) = plan_data.get_mut(day) else {
            continue;
        };

        if workout.completed {
            if !preserve_completed {
                plan_data.insert(*day, DayPlan::rest());
            }
            continue;
        }

        orphans.append(&mut workout.exercises);
        plan_data.insert(*day, DayPlan::rest());
    }

    orphans
}

/// Fill each added day with exactly `per_day` exercises: orphans first, in
/// their original order, then the top-up supply (cycled if short). Added
/// days use per-exercise calorie estimates rather than the flat day rate
/// used at initial generation, since their exercises originate from mixed
/// sources.
fn fill_added_days(
    plan_data: &mut PlanData,
    added: &BTreeSet<Weekday>,
    per_day: usize,
    orphans: Vec<ExerciseCandidate>,
    top_up: &[ExerciseCandidate],
) {
    let mut orphan_iter = orphans.into_iter();
    let mut top_up_cursor = 0usize;

    for day in added {
        let mut exercises = Vec::with_capacity(per_day);
        for _ in 0..per_day {
            match orphan_iter.next() {
                Some(exercise) => exercises.push(exercise),
                None => {
                    exercises.push(top_up[top_up_cursor % top_up.len()].clone());
                    top_up_cursor += 1;
                }
            }
        }

        let focus_areas: BTreeSet<String> = exercises
            .iter()
            .map(|e| e.target_muscle_group.clone())
            .collect();
        let estimated_calories = exercises.iter().map(|e| e.estimated_calories).sum();

        let mut workout = WorkoutDay::new(
            exercises,
            per_day as i32 * MINUTES_PER_EXERCISE,
            estimated_calories,
            focus_areas.into_iter().collect(),
        );
        workout.adapted_from_reallocation = true;
        plan_data.insert(*day, DayPlan::Workout(workout));
    }
}
