use super::domain::{CourseContext, LearnerId, LearnerSubsidySnapshot};

/// Query layer supplying fresh subsidy records for each resolution.
pub trait SubsidySource: Send + Sync {
    fn snapshot(&self, learner: &LearnerId) -> Result<Option<LearnerSubsidySnapshot>, SourceError>;
    fn course(&self, course_key: &str) -> Result<Option<CourseContext>, SourceError>;
}

/// Failures raised by the upstream query layer.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("subsidy source unavailable: {0}")]
    Unavailable(String),
    #[error("malformed subsidy record: {0}")]
    Malformed(String),
}
