//! Subsidy applicability resolution for course enrollment.
//!
//! Given a learner's subscription license, coupon codes, enterprise offers and
//! learner-credit eligibility, the resolver either selects the one subsidy to
//! redeem with or explains, through a single prioritized reason, why none
//! applies.

pub mod applicability;
pub mod domain;
pub mod pricing;
pub mod resolver;
pub mod router;
pub mod service;
pub mod source;

#[cfg(test)]
mod tests;

pub use applicability::{
    find_coupon_code_for_course, find_enterprise_offer_for_course, is_license_applicable,
};
pub use domain::{
    AgreementSubscription, CatalogContainment, CouponCodeAssignment, CourseContext,
    CourseEntitlement, CourseMetadata, CourseRun, CustomerAgreement, DiscountType,
    EnterpriseAdminUser, EnterpriseContacts, EnterpriseCoupon, EnterpriseOffer,
    LearnerCreditEligibility, LearnerId, LearnerSubsidySnapshot, LicenseStatus, ResolvedSubsidy,
    SubscriptionLicense, SubscriptionPlan, SubsidyAccessPolicy, SubsidyType,
};
pub use pricing::{get_course_price, CoursePrice};
pub use resolver::{
    select_applicable_subsidy, ApplicableCandidates, LearnerCreditCandidate,
    MissingSubsidyReason, PolicyReason, ReasonAction, ReasonKind, Resolution, ResolutionReport,
    ResolverFeatures, SubsidyResolver,
};
pub use router::subsidy_router;
pub use service::{ResolutionRequest, ResolutionServiceError, SubsidyResolutionService};
pub use source::{SourceError, SubsidySource};
