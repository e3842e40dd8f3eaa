use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{info, warn};

use super::domain::{CourseContext, LearnerId, LearnerSubsidySnapshot};
use super::resolver::{ResolutionReport, ResolverFeatures, SubsidyResolver};
use super::source::{SourceError, SubsidySource};

/// Self-contained resolution input, used when the caller already holds the records.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionRequest {
    #[serde(default)]
    pub snapshot: LearnerSubsidySnapshot,
    pub course: CourseContext,
}

/// Service composing the subsidy source with the resolver.
pub struct SubsidyResolutionService<S> {
    source: Arc<S>,
    resolver: Arc<SubsidyResolver>,
}

impl<S> SubsidyResolutionService<S>
where
    S: SubsidySource + 'static,
{
    pub fn new(source: Arc<S>, features: ResolverFeatures) -> Self {
        Self::with_resolver(source, Arc::new(SubsidyResolver::new(features)))
    }

    pub fn with_resolver(source: Arc<S>, resolver: Arc<SubsidyResolver>) -> Self {
        Self { source, resolver }
    }

    pub fn resolver(&self) -> &SubsidyResolver {
        &self.resolver
    }

    /// Resolve a caller-supplied snapshot without touching the source.
    pub fn resolve_request(&self, request: &ResolutionRequest, now: DateTime<Utc>) -> ResolutionReport {
        self.resolver.report(&request.snapshot, &request.course, now)
    }

    /// Fetch the learner's subsidies and the course, then resolve.
    pub fn resolve_for_learner(
        &self,
        learner: &LearnerId,
        course_key: &str,
        now: DateTime<Utc>,
    ) -> Result<ResolutionReport, ResolutionServiceError> {
        let course = self
            .source
            .course(course_key)
            .inspect_err(|error| warn!(%error, course_key, "course lookup failed"))?
            .ok_or_else(|| ResolutionServiceError::CourseNotFound(course_key.to_string()))?;

        let snapshot = self
            .source
            .snapshot(learner)
            .inspect_err(|error| warn!(%error, learner = %learner.0, "snapshot lookup failed"))?
            .ok_or_else(|| ResolutionServiceError::LearnerNotFound(learner.0.clone()))?;

        let report = self.resolver.report(&snapshot, &course, now);
        info!(
            learner = %learner.0,
            course_key,
            outcome = %report.resolution.summary(),
            "subsidy resolved"
        );
        Ok(report)
    }
}

/// Error raised by the resolution service.
#[derive(Debug, thiserror::Error)]
pub enum ResolutionServiceError {
    #[error("course {0} not found")]
    CourseNotFound(String),
    #[error("learner {0} not found")]
    LearnerNotFound(String),
    #[error(transparent)]
    Source(#[from] SourceError),
}
