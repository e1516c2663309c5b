pub mod adaptation_engine;
pub mod exercise_catalog_client;
pub mod fallback_allocator;
pub mod plan_orchestrator;
pub mod plan_store;
pub mod recommendation_client;
pub mod regeneration_policy;
pub mod user_profile_client;

pub use adaptation_engine::AdaptationEngine;
pub use exercise_catalog_client::ExerciseCatalogClient;
pub use fallback_allocator::{build_week, FallbackAllocator, GeneratedWeek};
pub use plan_orchestrator::{monday_of, PlanOrchestrator, PlanRequestOutcome};
pub use plan_store::{NewWeeklyPlan, PlanStore};
pub use recommendation_client::{MlPlanMetadata, MlPlanOutcome, RecommendationClient};
pub use regeneration_policy::RegenerationPolicy;
pub use user_profile_client::{UserProfile, UserProfileClient};
