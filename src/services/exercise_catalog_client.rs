use std::time::Duration;

use crate::models::{ExerciseCandidate, FitnessLevel};

const CATALOG_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the content service's exercise catalog.
///
/// Catalog failures are never fatal: this client reports an empty list on
/// any transport or decode error and callers substitute the built-in
/// default pool.
#[derive(Clone)]
pub struct ExerciseCatalogClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl ExerciseCatalogClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, CATALOG_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            timeout,
        }
    }

    /// Fetch up to `count` exercises matching the difficulty and muscle
    /// groups. Returns an empty list when the catalog is unreachable or
    /// returns garbage.
    pub async fn exercises_by_criteria(
        &self,
        difficulty: FitnessLevel,
        muscle_groups: &[String],
        count: usize,
    ) -> Vec<ExerciseCandidate> {
        let url = format!("{}/content/exercises/criteria", self.base_url);

        let response = self
            .http
            .get(&url)
            .timeout(self.timeout)
            .query(&[
                ("difficulty", difficulty.as_str().to_string()),
                ("muscle_groups", muscle_groups.join(",")),
                ("count", count.to_string()),
            ])
            .send()
            .await;

        let response = match response {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                tracing::warn!(
                    status = %r.status(),
                    "content service rejected exercise criteria query"
                );
                return Vec::new();
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to reach content service");
                return Vec::new();
            }
        };

        match response.json::<Vec<ExerciseCandidate>>().await {
            Ok(exercises) => exercises,
            Err(e) => {
                tracing::warn!(error = %e, "failed to decode exercise catalog response");
                Vec::new()
            }
        }
    }
}
