use std::collections::{BTreeSet, HashSet};

use rand::seq::SliceRandom;
use rand::Rng;

use crate::models::{
    aggregate_totals, default_exercise_pool, DayPlan, ExerciseCandidate, GenerationMethod,
    PlanData, PlanTotals, WorkoutDay, CALORIES_PER_MINUTE, MINUTES_PER_EXERCISE,
};

use super::exercise_catalog_client::ExerciseCatalogClient;
use super::user_profile_client::UserProfile;

/// Over-fetch factor applied to the catalog query for variety.
const OVERFETCH_FACTOR: usize = 3;

/// A fully computed week, ready to persist. Produced by this allocator and
/// by the orchestrator's ML path.
#[derive(Debug)]
pub struct GeneratedWeek {
    pub plan_data: PlanData,
    pub totals: PlanTotals,
    pub ml_generated: bool,
    pub ml_confidence_score: Option<f64>,
    pub generation_method: GenerationMethod,
}

/// Deterministic-guarantee allocator used when the recommendation service
/// is unavailable. Always succeeds: the built-in default pool backs the
/// catalog, and the distribution cursor wraps so every workout day gets
/// exactly `exercises_per_day` items.
#[derive(Clone)]
pub struct FallbackAllocator {
    catalog: ExerciseCatalogClient,
}

impl FallbackAllocator {
    pub fn new(catalog: ExerciseCatalogClient) -> Self {
        Self { catalog }
    }

    pub async fn allocate(&self, profile: &UserProfile) -> GeneratedWeek {
        let preferred_days: BTreeSet<_> =
            profile.preferred_workout_days.iter().copied().collect();
        let needed = preferred_days.len() * profile.fitness_level.exercises_per_day();

        let candidates = if needed > 0 {
            self.catalog
                .exercises_by_criteria(
                    profile.fitness_level,
                    &profile.target_muscle_groups,
                    OVERFETCH_FACTOR * needed,
                )
                .await
        } else {
            Vec::new()
        };

        tracing::info!(
            user_id = %profile.user_id,
            workout_days = preferred_days.len(),
            catalog_candidates = candidates.len(),
            "building fallback weekly plan"
        );

        let mut rng = rand::thread_rng();
        build_week(profile, candidates, &mut rng)
    }
}

/// Dedup, shuffle, and back the candidate supply with the default pool,
/// then distribute. Pure apart from the injected random source.
pub fn build_week<R: Rng>(
    profile: &UserProfile,
    candidates: Vec<ExerciseCandidate>,
    rng: &mut R,
) -> GeneratedWeek {
    let preferred_days: BTreeSet<_> = profile.preferred_workout_days.iter().copied().collect();

    let mut pool = dedup_by_id(candidates);
    pool.shuffle(rng);
    pool.extend(default_exercise_pool());

    let plan_data = distribute_pool(
        &preferred_days,
        profile.fitness_level.exercises_per_day(),
        &profile.target_muscle_groups,
        profile.time_budget_minutes,
        &pool,
    );
    let totals = aggregate_totals(&plan_data);

    GeneratedWeek {
        plan_data,
        totals,
        ml_generated: false,
        ml_confidence_score: None,
        generation_method: GenerationMethod::Fallback,
    }
}

/// Drop duplicate candidate ids, preserving first occurrence order.
fn dedup_by_id(candidates: Vec<ExerciseCandidate>) -> Vec<ExerciseCandidate> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|candidate| seen.insert(candidate.exercise_id))
        .collect()
}

/// Walk the seven canonical days in order, drawing exactly
/// `exercises_per_day` items per preferred day from the master pool with a
/// moving cursor that wraps to the start when the pool is exhausted.
/// Duplication across days is acceptable once unique supply runs out; the
/// exact per-day count never is.
fn distribute_pool(
    preferred_days: &BTreeSet<crate::models::Weekday>,
    exercises_per_day: usize,
    target_muscle_groups: &[String],
    time_budget_minutes: i32,
    pool: &[ExerciseCandidate],
) -> PlanData {
    let focus_areas = if target_muscle_groups.is_empty() {
        vec!["full_body".to_string()]
    } else {
        target_muscle_groups.to_vec()
    };

    let mut plan_data = PlanData::new();
    let mut cursor = 0usize;

    for day in crate::models::Weekday::ALL {
        if !preferred_days.contains(&day) {
            plan_data.insert(day, DayPlan::rest());
            continue;
        }

        let mut exercises = Vec::with_capacity(exercises_per_day);
        for _ in 0..exercises_per_day {
            exercises.push(pool[cursor % pool.len()].clone());
            cursor += 1;
        }

        let duration = time_budget_minutes.min(exercises_per_day as i32 * MINUTES_PER_EXERCISE);
        let day_plan = WorkoutDay::new(
            exercises,
            duration,
            duration * CALORIES_PER_MINUTE,
            focus_areas.clone(),
        );
        plan_data.insert(day, DayPlan::Workout(day_plan));
    }

    plan_data
}
