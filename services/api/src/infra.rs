use chrono::{DateTime, Utc};
use learner_subsidy::error::AppError;
use learner_subsidy::subsidy::{
    CourseContext, LearnerId, LearnerSubsidySnapshot, SourceError, SubsidySource,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Seed document for the in-memory source: snapshots keyed by learner id plus course records.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SubsidyFixtures {
    #[serde(default)]
    pub(crate) learners: HashMap<String, LearnerSubsidySnapshot>,
    #[serde(default)]
    pub(crate) courses: Vec<CourseContext>,
}

/// Process-local subsidy records, seeded from `APP_SUBSIDY_FIXTURES` at startup or by the demo.
#[derive(Default, Clone)]
pub(crate) struct InMemorySubsidySource {
    snapshots: Arc<Mutex<HashMap<LearnerId, LearnerSubsidySnapshot>>>,
    courses: Arc<Mutex<HashMap<String, CourseContext>>>,
}

impl InMemorySubsidySource {
    pub(crate) fn from_fixture_file(path: &Path) -> Result<Self, AppError> {
        let raw = std::fs::read_to_string(path)?;
        let fixtures: SubsidyFixtures = serde_json::from_str(&raw)?;
        let source = Self::default();
        source.seed(fixtures)?;
        Ok(source)
    }

    pub(crate) fn seed(&self, fixtures: SubsidyFixtures) -> Result<(), SourceError> {
        for course in fixtures.courses {
            self.upsert_course(course)?;
        }
        for (learner, snapshot) in fixtures.learners {
            self.upsert_snapshot(LearnerId(learner), snapshot)?;
        }
        Ok(())
    }

    pub(crate) fn counts(&self) -> Result<(usize, usize), SourceError> {
        let learners = self
            .snapshots
            .lock()
            .map_err(|_| SourceError::Unavailable("snapshot store poisoned".to_string()))?
            .len();
        let courses = self
            .courses
            .lock()
            .map_err(|_| SourceError::Unavailable("course store poisoned".to_string()))?
            .len();
        Ok((learners, courses))
    }

    pub(crate) fn upsert_snapshot(
        &self,
        learner: LearnerId,
        snapshot: LearnerSubsidySnapshot,
    ) -> Result<(), SourceError> {
        let mut guard = self
            .snapshots
            .lock()
            .map_err(|_| SourceError::Unavailable("snapshot store poisoned".to_string()))?;
        guard.insert(learner, snapshot);
        Ok(())
    }

    pub(crate) fn upsert_course(&self, course: CourseContext) -> Result<(), SourceError> {
        if course.course_key().trim().is_empty() {
            return Err(SourceError::Malformed(
                "course record has no metadata key".to_string(),
            ));
        }

        let mut guard = self
            .courses
            .lock()
            .map_err(|_| SourceError::Unavailable("course store poisoned".to_string()))?;
        guard.insert(course.course_key().to_string(), course);
        Ok(())
    }
}

impl SubsidySource for InMemorySubsidySource {
    fn snapshot(&self, learner: &LearnerId) -> Result<Option<LearnerSubsidySnapshot>, SourceError> {
        let guard = self
            .snapshots
            .lock()
            .map_err(|_| SourceError::Unavailable("snapshot store poisoned".to_string()))?;
        Ok(guard.get(learner).cloned())
    }

    fn course(&self, course_key: &str) -> Result<Option<CourseContext>, SourceError> {
        let guard = self
            .courses
            .lock()
            .map_err(|_| SourceError::Unavailable("course store poisoned".to_string()))?;
        Ok(guard.get(course_key).cloned())
    }
}

pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|value| value.with_timezone(&Utc))
        .map_err(|err| format!("failed to parse '{raw}' as an RFC 3339 timestamp ({err})"))
}
