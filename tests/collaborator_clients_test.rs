use std::time::Duration;

use fitnease_planning::models::{DayPlan, FitnessLevel, PlanData, Weekday, WorkoutDay};
use fitnease_planning::services::{
    ExerciseCatalogClient, RecommendationClient, UserProfile, UserProfileClient,
};
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_profile(user_id: Uuid) -> UserProfile {
    UserProfile {
        user_id,
        fitness_level: FitnessLevel::Intermediate,
        preferred_workout_days: vec![Weekday::Monday, Weekday::Wednesday, Weekday::Friday],
        target_muscle_groups: vec!["core".to_string()],
        goals: vec!["endurance".to_string()],
        time_budget_minutes: 45,
    }
}

fn ml_response_body() -> serde_json::Value {
    let mut plan_data = PlanData::new();
    plan_data.insert(
        Weekday::Monday,
        DayPlan::Workout(WorkoutDay::new(vec![], 20, 140, vec!["core".to_string()])),
    );
    plan_data.insert(Weekday::Tuesday, DayPlan::rest());

    json!({
        "weekly_plan": serde_json::to_value(&plan_data).unwrap(),
        "metadata": {
            "total_exercises": 0,
            "estimated_weekly_duration": 20,
            "estimated_weekly_calories": 140,
            "confidence_score": 0.91
        }
    })
}

#[tokio::test]
async fn user_profile_is_fetched_with_lenient_defaults() {
    let server = MockServer::start().await;
    let user_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path(format!("/auth/user-profile/{user_id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "fitness_level": "Advanced",
            "preferred_workout_days": ["monday", "thursday"]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = UserProfileClient::new(server.uri());
    let profile = client.fetch(user_id).await.unwrap();

    assert_eq!(profile.fitness_level, FitnessLevel::Advanced);
    assert_eq!(
        profile.preferred_workout_days,
        vec![Weekday::Monday, Weekday::Thursday]
    );
    // Absent fields fall back rather than fail.
    assert!(profile.target_muscle_groups.is_empty());
    assert_eq!(profile.time_budget_minutes, 30);
}

#[tokio::test]
async fn user_profile_failure_is_fatal() {
    let server = MockServer::start().await;
    let user_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path(format!("/auth/user-profile/{user_id}")))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let client = UserProfileClient::new(server.uri());
    let result = client.fetch(user_id).await;

    assert_matches::assert_matches!(
        result,
        Err(fitnease_planning::models::PlanningError::ProfileUnavailable)
    );
}

#[tokio::test]
async fn recommendation_success_returns_usable_plan() {
    let server = MockServer::start().await;
    let profile = test_profile(Uuid::new_v4());

    Mock::given(method("POST"))
        .and(path("/generate-weekly-plan"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ml_response_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = RecommendationClient::new(server.uri());
    let outcome = client.generate(&profile).await.unwrap();

    assert!(outcome.plan_data.get(&Weekday::Monday).unwrap().is_planned());
    assert_eq!(outcome.metadata.confidence_score, Some(0.91));
}

#[tokio::test]
async fn recommendation_rejection_is_definitive() {
    let server = MockServer::start().await;
    let profile = test_profile(Uuid::new_v4());

    // Exactly one request: a non-2xx answer is never retried.
    Mock::given(method("POST"))
        .and(path("/generate-weekly-plan"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let client = RecommendationClient::new(server.uri());
    assert!(client.generate(&profile).await.is_none());
}

#[tokio::test]
async fn recommendation_garbage_payload_is_definitive() {
    let server = MockServer::start().await;
    let profile = test_profile(Uuid::new_v4());

    Mock::given(method("POST"))
        .and(path("/generate-weekly-plan"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .expect(1)
        .mount(&server)
        .await;

    let client = RecommendationClient::new(server.uri());
    assert!(client.generate(&profile).await.is_none());
}

#[tokio::test]
async fn recommendation_transport_failure_is_retried_once() {
    let server = MockServer::start().await;
    let profile = test_profile(Uuid::new_v4());

    // First attempt exceeds the client timeout, second succeeds.
    Mock::given(method("POST"))
        .and(path("/generate-weekly-plan"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(ml_response_body())
                .set_delay(Duration::from_secs(5)),
        )
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/generate-weekly-plan"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ml_response_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = RecommendationClient::with_timing(
        server.uri(),
        Duration::from_millis(250),
        Duration::from_millis(20),
    );
    let outcome = client.generate(&profile).await;

    assert!(outcome.is_some());
}

#[tokio::test]
async fn recommendation_gives_up_after_two_transport_failures() {
    let server = MockServer::start().await;
    let profile = test_profile(Uuid::new_v4());

    Mock::given(method("POST"))
        .and(path("/generate-weekly-plan"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(ml_response_body())
                .set_delay(Duration::from_secs(5)),
        )
        .expect(2)
        .mount(&server)
        .await;

    let client = RecommendationClient::with_timing(
        server.uri(),
        Duration::from_millis(250),
        Duration::from_millis(20),
    );
    assert!(client.generate(&profile).await.is_none());
}

#[tokio::test]
async fn catalog_passes_criteria_and_parses_exercises() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/content/exercises/criteria"))
        .and(query_param("difficulty", "intermediate"))
        .and(query_param("muscle_groups", "core,legs"))
        .and(query_param("count", "15"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": 11,
                "name": "Flutter Kicks",
                "target_muscle_group": "core",
                "difficulty_level": "intermediate"
            },
            {
                "exercise_id": 12,
                "name": "Squat Jumps",
                "target_muscle_group": "legs",
                "difficulty_level": "intermediate",
                "estimated_calories": 32
            }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = ExerciseCatalogClient::new(server.uri());
    let exercises = client
        .exercises_by_criteria(
            FitnessLevel::Intermediate,
            &["core".to_string(), "legs".to_string()],
            15,
        )
        .await;

    assert_eq!(exercises.len(), 2);
    assert_eq!(exercises[0].exercise_id, 11);
    assert_eq!(exercises[1].estimated_calories, 32);
}

#[tokio::test]
async fn catalog_failure_yields_empty_list() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/content/exercises/criteria"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let client = ExerciseCatalogClient::new(server.uri());
    let exercises = client
        .exercises_by_criteria(FitnessLevel::Beginner, &[], 12)
        .await;

    assert!(exercises.is_empty());
}
