mod features;
mod reasons;
mod rules;

pub use features::ResolverFeatures;
pub use reasons::{MissingSubsidyReason, PolicyReason, ReasonAction, ReasonKind};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::applicability::{
    find_coupon_code_for_course, find_enterprise_offer_for_course, is_license_applicable,
};
use super::domain::{
    CouponCodeAssignment, CourseContext, CourseRun, DiscountType, EnterpriseOffer,
    LearnerSubsidySnapshot, ResolvedSubsidy, SubscriptionLicense, SubsidyAccessPolicy,
    SubsidyType,
};
use super::pricing::{get_course_price, CoursePrice};
use rules::{fallback_reason, ReasonContext, REASON_RULES};

/// Learner-credit policy that passed the redemption check, with the runs it can fund.
#[derive(Debug, Clone, Copy)]
pub struct LearnerCreditCandidate<'a> {
    pub policy: &'a SubsidyAccessPolicy,
    pub available_course_runs: &'a [CourseRun],
}

/// Subsidies already known to apply to the course, at most one per kind.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApplicableCandidates<'a> {
    pub license: Option<&'a SubscriptionLicense>,
    pub learner_credit: Option<LearnerCreditCandidate<'a>>,
    pub coupon: Option<&'a CouponCodeAssignment>,
    pub enterprise_offer: Option<&'a EnterpriseOffer>,
    pub course_runs: &'a [CourseRun],
}

/// Pick the single subsidy to redeem with.
///
/// Priority is fixed: subscription license, learner credit, coupon code,
/// enterprise offer.
pub fn select_applicable_subsidy(candidates: ApplicableCandidates<'_>) -> Option<ResolvedSubsidy> {
    if let Some(license) = candidates.license {
        return Some(ResolvedSubsidy {
            subsidy_type: SubsidyType::License,
            subsidy_id: license.subsidy_id(),
            discount_type: license.discount_type,
            discount_value: license.discount_value,
            available_course_runs: candidates.course_runs.to_vec(),
            expiration_date: license.subscription_plan.expiration_date,
        });
    }

    if let Some(credit) = candidates.learner_credit {
        return Some(ResolvedSubsidy {
            subsidy_type: SubsidyType::LearnerCredit,
            subsidy_id: credit.policy.uuid.clone(),
            discount_type: DiscountType::Percentage,
            discount_value: 100.0,
            available_course_runs: credit.available_course_runs.to_vec(),
            expiration_date: None,
        });
    }

    if let Some(coupon) = candidates.coupon {
        return Some(ResolvedSubsidy {
            subsidy_type: SubsidyType::CouponCode,
            subsidy_id: coupon.code.clone(),
            discount_type: coupon.usage_type,
            discount_value: coupon.benefit_value,
            available_course_runs: candidates.course_runs.to_vec(),
            expiration_date: Some(coupon.coupon_end_date),
        });
    }

    candidates.enterprise_offer.map(|offer| ResolvedSubsidy {
        subsidy_type: SubsidyType::EnterpriseOffer,
        subsidy_id: offer.subsidy_id(),
        discount_type: offer.usage_type,
        discount_value: offer.discount_value,
        available_course_runs: candidates.course_runs.to_vec(),
        expiration_date: Some(offer.end_datetime),
    })
}

/// Outcome of one resolution pass; exactly one variant is produced per call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Resolution {
    Pending,
    Applicable { subsidy: ResolvedSubsidy },
    Missing { reason: MissingSubsidyReason },
}

impl Resolution {
    pub fn is_pending(&self) -> bool {
        matches!(self, Resolution::Pending)
    }

    pub fn subsidy(&self) -> Option<&ResolvedSubsidy> {
        match self {
            Resolution::Applicable { subsidy } => Some(subsidy),
            _ => None,
        }
    }

    pub fn missing_reason(&self) -> Option<&MissingSubsidyReason> {
        match self {
            Resolution::Missing { reason } => Some(reason),
            _ => None,
        }
    }

    pub fn summary(&self) -> String {
        match self {
            Resolution::Pending => "subsidy data still loading".to_string(),
            Resolution::Applicable { subsidy } => format!(
                "redeem with {} {} ({:?} {})",
                subsidy.subsidy_type.label(),
                subsidy.subsidy_id,
                subsidy.discount_type,
                subsidy.discount_value
            ),
            Resolution::Missing { reason } => format!("no subsidy: {}", reason.summary()),
        }
    }
}

/// Resolution together with the price it was computed against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionReport {
    pub course_key: String,
    pub course_price: Option<CoursePrice>,
    pub resolution: Resolution,
}

/// Stateless resolver holding only its feature switches.
#[derive(Debug, Clone, Default)]
pub struct SubsidyResolver {
    features: ResolverFeatures,
}

impl SubsidyResolver {
    pub fn new(features: ResolverFeatures) -> Self {
        Self { features }
    }

    pub fn features(&self) -> ResolverFeatures {
        self.features
    }

    /// Run every applicability check against the raw records.
    pub fn applicable_candidates<'a>(
        &self,
        snapshot: &'a LearnerSubsidySnapshot,
        course: &'a CourseContext,
        course_runs: &'a [CourseRun],
        course_price: Option<f64>,
        now: DateTime<Utc>,
    ) -> ApplicableCandidates<'a> {
        let catalogs = course.catalogs_with_course();

        let license = snapshot.subscription_license.as_ref().filter(|license| {
            let applicable = is_license_applicable(Some(license), catalogs);
            if !applicable {
                debug!(
                    license_status = license.status.label(),
                    plan_current = license.subscription_plan.is_current,
                    course = course.course_key(),
                    "subscription license skipped"
                );
            }
            applicable
        });

        let learner_credit = if self.features.learner_credit {
            let credit = &snapshot.learner_credit;
            credit
                .redeemable_subsidy_access_policy
                .as_ref()
                .filter(|_| credit.is_policy_redemption_enabled)
                .map(|policy| LearnerCreditCandidate {
                    policy,
                    available_course_runs: &credit.available_course_runs,
                })
        } else {
            None
        };

        let coupon = find_coupon_code_for_course(&snapshot.coupon_codes, catalogs, now);

        let enterprise_offer = if self.features.enterprise_offers {
            find_enterprise_offer_for_course(&snapshot.enterprise_offers, catalogs, course_price, now)
        } else {
            None
        };

        ApplicableCandidates {
            license,
            learner_credit,
            coupon,
            enterprise_offer,
            course_runs,
        }
    }

    /// Classify why no subsidy applies, walking the reason table in priority order.
    pub fn resolve_missing_reason(
        &self,
        snapshot: &LearnerSubsidySnapshot,
        course: &CourseContext,
        course_price: Option<f64>,
        now: DateTime<Utc>,
    ) -> MissingSubsidyReason {
        let ctx = ReasonContext {
            snapshot,
            course,
            features: self.features,
            course_price,
            now,
        };

        for rule in REASON_RULES {
            if (rule.applies)(&ctx) {
                debug!(rule = rule.label, course = course.course_key(), "missing subsidy rule matched");
                return (rule.build)(&ctx);
            }
        }

        fallback_reason(&ctx)
    }

    pub fn resolve(
        &self,
        snapshot: &LearnerSubsidySnapshot,
        course: &CourseContext,
        now: DateTime<Utc>,
    ) -> Resolution {
        let price = self.course_price(snapshot, course);
        self.resolve_with_price(snapshot, course, price.as_ref().and_then(CoursePrice::amount), now)
    }

    /// Resolve and attach the course price used for offer affordability.
    pub fn report(
        &self,
        snapshot: &LearnerSubsidySnapshot,
        course: &CourseContext,
        now: DateTime<Utc>,
    ) -> ResolutionReport {
        let course_price = self.course_price(snapshot, course);
        let resolution = self.resolve_with_price(
            snapshot,
            course,
            course_price.as_ref().and_then(CoursePrice::amount),
            now,
        );

        ResolutionReport {
            course_key: course.course_key().to_string(),
            course_price,
            resolution,
        }
    }

    fn course_price(
        &self,
        snapshot: &LearnerSubsidySnapshot,
        course: &CourseContext,
    ) -> Option<CoursePrice> {
        let list_price = if self.features.learner_credit {
            snapshot.learner_credit.list_price.as_deref()
        } else {
            None
        };
        get_course_price(&course.metadata, list_price)
    }

    fn resolve_with_price(
        &self,
        snapshot: &LearnerSubsidySnapshot,
        course: &CourseContext,
        course_price: Option<f64>,
        now: DateTime<Utc>,
    ) -> Resolution {
        if snapshot.is_pending {
            return Resolution::Pending;
        }

        let course_runs = course.metadata.enrollable_runs();
        let candidates =
            self.applicable_candidates(snapshot, course, &course_runs, course_price, now);

        match select_applicable_subsidy(candidates) {
            Some(subsidy) => {
                debug!(
                    subsidy_type = subsidy.subsidy_type.label(),
                    course = course.course_key(),
                    "applicable subsidy selected"
                );
                Resolution::Applicable { subsidy }
            }
            None => Resolution::Missing {
                reason: self.resolve_missing_reason(snapshot, course, course_price, now),
            },
        }
    }
}
