use serde::{Deserialize, Serialize};

/// Feature switches consulted during resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverFeatures {
    pub enterprise_offers: bool,
    pub learner_credit: bool,
}

impl Default for ResolverFeatures {
    fn default() -> Self {
        Self {
            enterprise_offers: true,
            learner_credit: true,
        }
    }
}
