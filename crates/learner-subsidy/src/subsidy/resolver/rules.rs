use chrono::{DateTime, Utc};

use super::super::applicability::{
    coupon_has_ended, enterprise_coupon_is_current, find_coupon_code_for_course,
    find_enterprise_offer_for_course, offer_has_ended, offer_matches_course,
};
use super::super::domain::{
    CourseContext, LearnerCreditEligibility, LearnerSubsidySnapshot, LicenseStatus,
};
use super::features::ResolverFeatures;
use super::reasons::{MissingSubsidyReason, ReasonAction, ReasonKind};

/// Inputs shared by every missing-reason rule.
pub(crate) struct ReasonContext<'a> {
    pub(crate) snapshot: &'a LearnerSubsidySnapshot,
    pub(crate) course: &'a CourseContext,
    pub(crate) features: ResolverFeatures,
    pub(crate) course_price: Option<f64>,
    pub(crate) now: DateTime<Utc>,
}

impl ReasonContext<'_> {
    fn catalogs(&self) -> &[String] {
        self.course.catalogs_with_course()
    }

    fn learner_credit(&self) -> Option<&LearnerCreditEligibility> {
        self.features
            .learner_credit
            .then_some(&self.snapshot.learner_credit)
    }

    fn has_admins(&self) -> bool {
        self.snapshot.contacts.has_admins()
    }

    /// Mailto action addressed to the contact email, or to every admin when unset.
    pub(crate) fn contact_admin(&self) -> Option<ReasonAction> {
        if !self.has_admins() {
            return None;
        }

        let contacts = &self.snapshot.contacts;
        let mailto = match contacts
            .contact_email
            .as_deref()
            .map(str::trim)
            .filter(|email| !email.is_empty())
        {
            Some(email) => vec![email.to_string()],
            None => contacts.admin_emails(),
        };

        Some(ReasonAction::ContactAdmin { mailto })
    }

    fn with_admin_variant(&self, with_admins: ReasonKind, no_admins: ReasonKind) -> MissingSubsidyReason {
        if self.has_admins() {
            MissingSubsidyReason::new(with_admins, self.contact_admin())
        } else {
            MissingSubsidyReason::new(no_admins, None)
        }
    }
}

/// One entry of the missing-reason table; the first entry that applies wins.
pub(crate) struct ReasonRule {
    pub(crate) label: &'static str,
    pub(crate) applies: fn(&ReasonContext<'_>) -> bool,
    pub(crate) build: fn(&ReasonContext<'_>) -> MissingSubsidyReason,
}

pub(crate) const REASON_RULES: &[ReasonRule] = &[
    ReasonRule {
        label: "content_not_in_catalog",
        applies: content_not_in_catalog,
        build: build_content_not_in_catalog,
    },
    ReasonRule {
        label: "learner_credit_request",
        applies: learner_credit_request,
        build: build_learner_credit_request,
    },
    ReasonRule {
        label: "access_policy_reason",
        applies: access_policy_reason,
        build: build_access_policy_reason,
    },
    ReasonRule {
        label: "subscription_license_expired",
        applies: subscription_license_expired,
        build: build_subscription_expired,
    },
    ReasonRule {
        label: "subscription_license_revoked",
        applies: subscription_license_revoked,
        build: build_subscription_deactivated,
    },
    ReasonRule {
        label: "subscription_agreement_expired",
        applies: subscription_agreement_expired,
        build: build_subscription_expired,
    },
    ReasonRule {
        label: "subscription_seats_exhausted",
        applies: subscription_seats_exhausted,
        build: build_subscription_seats_exhausted,
    },
    ReasonRule {
        label: "coupon_codes_expired",
        applies: coupon_codes_expired,
        build: build_coupon_codes_expired,
    },
    ReasonRule {
        label: "coupon_code_not_assigned",
        applies: coupon_code_not_assigned,
        build: build_coupon_code_not_assigned,
    },
    ReasonRule {
        label: "enterprise_offers_expired",
        applies: enterprise_offers_expired,
        build: build_enterprise_offers_expired,
    },
    ReasonRule {
        label: "enterprise_offers_exhausted",
        applies: enterprise_offers_exhausted,
        build: build_enterprise_offers_exhausted,
    },
];

/// Generic reason used when no rule in the table applies.
pub(crate) fn fallback_reason(ctx: &ReasonContext<'_>) -> MissingSubsidyReason {
    ctx.with_admin_variant(ReasonKind::NoSubsidy, ReasonKind::NoSubsidyNoAdmins)
}

fn content_not_in_catalog(ctx: &ReasonContext<'_>) -> bool {
    !ctx.course.containment.contains_content_items
}

fn build_content_not_in_catalog(_ctx: &ReasonContext<'_>) -> MissingSubsidyReason {
    MissingSubsidyReason::new(ReasonKind::ContentNotInCatalog, None)
}

fn learner_credit_request(ctx: &ReasonContext<'_>) -> bool {
    ctx.learner_credit().is_some_and(|credit| {
        credit.learner_credit_request_reason.is_some()
            || (credit.can_request_learner_credit
                && credit.learner_credit_requestable_policy.is_some())
    })
}

fn build_learner_credit_request(ctx: &ReasonContext<'_>) -> MissingSubsidyReason {
    let credit = &ctx.snapshot.learner_credit;
    if let Some(reason) = &credit.learner_credit_request_reason {
        return MissingSubsidyReason::from_policy(reason, ctx.contact_admin());
    }

    let action = credit
        .learner_credit_requestable_policy
        .as_ref()
        .map(|policy| ReasonAction::RequestLearnerCredit {
            policy_uuid: policy.uuid.clone(),
        });
    MissingSubsidyReason::new(ReasonKind::LearnerCreditRequestable, action)
}

fn access_policy_reason(ctx: &ReasonContext<'_>) -> bool {
    ctx.learner_credit()
        .is_some_and(|credit| credit.missing_subsidy_access_policy_reason.is_some())
}

fn build_access_policy_reason(ctx: &ReasonContext<'_>) -> MissingSubsidyReason {
    match &ctx.snapshot.learner_credit.missing_subsidy_access_policy_reason {
        Some(reason) => MissingSubsidyReason::from_policy(reason, ctx.contact_admin()),
        None => fallback_reason(ctx),
    }
}

fn subscription_license_expired(ctx: &ReasonContext<'_>) -> bool {
    ctx.snapshot
        .subscription_license
        .as_ref()
        .is_some_and(|license| !license.subscription_plan.is_current)
}

fn subscription_license_revoked(ctx: &ReasonContext<'_>) -> bool {
    ctx.snapshot
        .subscription_license
        .as_ref()
        .is_some_and(|license| license.status == LicenseStatus::Revoked)
}

fn subscription_agreement_expired(ctx: &ReasonContext<'_>) -> bool {
    if ctx.snapshot.subscription_license.is_some() {
        return false;
    }

    ctx.snapshot.customer_agreement.as_ref().is_some_and(|agreement| {
        !agreement.subscriptions.is_empty()
            && agreement
                .subscriptions
                .iter()
                .all(|subscription| !subscription.is_current)
    })
}

fn subscription_seats_exhausted(ctx: &ReasonContext<'_>) -> bool {
    if ctx.snapshot.subscription_license.is_some() {
        return false;
    }

    ctx.snapshot.customer_agreement.as_ref().is_some_and(|agreement| {
        let mut current = agreement
            .subscriptions
            .iter()
            .filter(|subscription| subscription.is_current)
            .peekable();
        current.peek().is_some()
            && current.all(|subscription| subscription.unassigned_licenses == Some(0))
    })
}

fn build_subscription_expired(ctx: &ReasonContext<'_>) -> MissingSubsidyReason {
    ctx.with_admin_variant(
        ReasonKind::SubscriptionExpired,
        ReasonKind::SubscriptionExpiredNoAdmins,
    )
}

fn build_subscription_deactivated(ctx: &ReasonContext<'_>) -> MissingSubsidyReason {
    MissingSubsidyReason::new(ReasonKind::SubscriptionDeactivated, ctx.contact_admin())
}

fn build_subscription_seats_exhausted(ctx: &ReasonContext<'_>) -> MissingSubsidyReason {
    ctx.with_admin_variant(
        ReasonKind::SubscriptionSeatsExhausted,
        ReasonKind::SubscriptionSeatsExhaustedNoAdmins,
    )
}

fn coupon_codes_expired(ctx: &ReasonContext<'_>) -> bool {
    let coupons = &ctx.snapshot.coupon_codes;
    !coupons.is_empty() && coupons.iter().all(|coupon| coupon_has_ended(coupon, ctx.now))
}

fn coupon_code_not_assigned(ctx: &ReasonContext<'_>) -> bool {
    let coupons = &ctx.snapshot.coupon_codes;
    if coupons.is_empty() {
        return ctx
            .snapshot
            .coupons_overview
            .iter()
            .any(|coupon| enterprise_coupon_is_current(coupon, ctx.now) && coupon.num_unassigned > 0);
    }

    find_coupon_code_for_course(coupons, ctx.catalogs(), ctx.now).is_none()
}

fn build_coupon_codes_expired(ctx: &ReasonContext<'_>) -> MissingSubsidyReason {
    MissingSubsidyReason::new(ReasonKind::CouponCodesExpired, ctx.contact_admin())
}

fn build_coupon_code_not_assigned(ctx: &ReasonContext<'_>) -> MissingSubsidyReason {
    MissingSubsidyReason::new(ReasonKind::CouponCodeNotAssigned, ctx.contact_admin())
}

fn enterprise_offers_expired(ctx: &ReasonContext<'_>) -> bool {
    let offers = &ctx.snapshot.enterprise_offers;
    ctx.features.enterprise_offers
        && !offers.is_empty()
        && offers.iter().all(|offer| offer_has_ended(offer, ctx.now))
}

fn enterprise_offers_exhausted(ctx: &ReasonContext<'_>) -> bool {
    let offers = &ctx.snapshot.enterprise_offers;
    ctx.features.enterprise_offers
        && offers
            .iter()
            .any(|offer| offer_matches_course(offer, ctx.catalogs(), ctx.now))
        && find_enterprise_offer_for_course(offers, ctx.catalogs(), ctx.course_price, ctx.now)
            .is_none()
}

fn build_enterprise_offers_expired(ctx: &ReasonContext<'_>) -> MissingSubsidyReason {
    MissingSubsidyReason::new(ReasonKind::EnterpriseOffersExpired, ctx.contact_admin())
}

fn build_enterprise_offers_exhausted(ctx: &ReasonContext<'_>) -> MissingSubsidyReason {
    MissingSubsidyReason::new(ReasonKind::EnterpriseOffersExhausted, ctx.contact_admin())
}
