use serde::{Deserialize, Serialize};

/// Protocol unit: every exercise slot is a fixed 4-minute block.
pub const EXERCISE_DURATION_SECONDS: i32 = 240;
/// Minutes each exercise contributes to a day's estimated duration.
pub const MINUTES_PER_EXERCISE: i32 = 4;
/// Flat calorie rate used for day-level estimates at generation time.
pub const CALORIES_PER_MINUTE: i32 = 7;

/// A single schedulable exercise, as supplied by the content service catalog
/// or by the built-in default pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseCandidate {
    #[serde(alias = "id")]
    pub exercise_id: i64,
    pub name: String,
    pub target_muscle_group: String,
    pub difficulty_level: String,
    #[serde(default = "default_duration_seconds")]
    pub duration_seconds: i32,
    #[serde(default)]
    pub estimated_calories: i32,
    #[serde(default)]
    pub equipment_needed: Vec<String>,
    #[serde(default)]
    pub category: String,
}

fn default_duration_seconds() -> i32 {
    EXERCISE_DURATION_SECONDS
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitnessLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl FitnessLevel {
    /// Fixed lookup for the exact number of exercises a workout day carries.
    pub fn exercises_per_day(self) -> usize {
        match self {
            FitnessLevel::Beginner => 4,
            FitnessLevel::Intermediate => 5,
            FitnessLevel::Advanced => 6,
        }
    }

    /// Lenient parse for values coming from the auth service; unknown
    /// levels fall back to beginner.
    pub fn parse_lenient(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "intermediate" => FitnessLevel::Intermediate,
            "advanced" => FitnessLevel::Advanced,
            _ => FitnessLevel::Beginner,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FitnessLevel::Beginner => "beginner",
            FitnessLevel::Intermediate => "intermediate",
            FitnessLevel::Advanced => "advanced",
        }
    }
}

/// Built-in exercise pool appended to every fallback master pool so that
/// supply never runs out, even when the content service returns nothing.
pub fn default_exercise_pool() -> Vec<ExerciseCandidate> {
    const DEFAULTS: [(i64, &str, &str); 12] = [
        (9001, "Jumping Jacks", "full_body"),
        (9002, "Push-Ups", "chest"),
        (9003, "Bodyweight Squats", "legs"),
        (9004, "Plank", "core"),
        (9005, "Mountain Climbers", "core"),
        (9006, "Lunges", "legs"),
        (9007, "Burpees", "full_body"),
        (9008, "High Knees", "legs"),
        (9009, "Tricep Dips", "arms"),
        (9010, "Glute Bridges", "glutes"),
        (9011, "Russian Twists", "core"),
        (9012, "Wall Sit", "legs"),
    ];

    DEFAULTS
        .iter()
        .map(|&(id, name, muscle_group)| ExerciseCandidate {
            exercise_id: id,
            name: name.to_string(),
            target_muscle_group: muscle_group.to_string(),
            difficulty_level: "beginner".to_string(),
            duration_seconds: EXERCISE_DURATION_SECONDS,
            estimated_calories: MINUTES_PER_EXERCISE * CALORIES_PER_MINUTE,
            equipment_needed: vec!["none".to_string()],
            category: "tabata".to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exercises_per_day_matches_fitness_level() {
        assert_eq!(FitnessLevel::Beginner.exercises_per_day(), 4);
        assert_eq!(FitnessLevel::Intermediate.exercises_per_day(), 5);
        assert_eq!(FitnessLevel::Advanced.exercises_per_day(), 6);
    }

    #[test]
    fn unknown_fitness_level_falls_back_to_beginner() {
        assert_eq!(FitnessLevel::parse_lenient("expert"), FitnessLevel::Beginner);
        assert_eq!(FitnessLevel::parse_lenient(""), FitnessLevel::Beginner);
        assert_eq!(
            FitnessLevel::parse_lenient("Intermediate"),
            FitnessLevel::Intermediate
        );
    }

    #[test]
    fn default_pool_is_large_enough_and_unique() {
        let pool = default_exercise_pool();
        assert!(pool.len() >= 10);

        let mut ids: Vec<i64> = pool.iter().map(|e| e.exercise_id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), pool.len());
    }

    #[test]
    fn catalog_payload_accepts_id_alias() {
        let parsed: ExerciseCandidate = serde_json::from_value(serde_json::json!({
            "id": 42,
            "name": "Squat Jumps",
            "target_muscle_group": "legs",
            "difficulty_level": "intermediate"
        }))
        .unwrap();

        assert_eq!(parsed.exercise_id, 42);
        assert_eq!(parsed.duration_seconds, EXERCISE_DURATION_SECONDS);
    }
}
