use serde::{Deserialize, Serialize};

/// Classified explanation for why enrollment cannot be subsidized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonKind {
    ContentNotInCatalog,
    LearnerCreditRequestable,
    LearnerCreditRequestPending,
    PolicyNotActive,
    LearnerNotInEnterprise,
    LearnerMaxSpendReached,
    LearnerMaxEnrollmentsReached,
    NotEnoughValueInSubsidy,
    SubscriptionExpired,
    SubscriptionExpiredNoAdmins,
    SubscriptionDeactivated,
    SubscriptionSeatsExhausted,
    SubscriptionSeatsExhaustedNoAdmins,
    CouponCodesExpired,
    CouponCodeNotAssigned,
    EnterpriseOffersExpired,
    EnterpriseOffersExhausted,
    NoSubsidy,
    NoSubsidyNoAdmins,
}

impl ReasonKind {
    /// Message key the UI layer translates into the disabled-enrollment copy.
    pub const fn user_message(self) -> &'static str {
        match self {
            ReasonKind::ContentNotInCatalog => "enroll.disabled.content_not_in_catalog",
            ReasonKind::LearnerCreditRequestable => "enroll.disabled.learner_credit_requestable",
            ReasonKind::LearnerCreditRequestPending => {
                "enroll.disabled.learner_credit_request_pending"
            }
            ReasonKind::PolicyNotActive => "enroll.disabled.policy_not_active",
            ReasonKind::LearnerNotInEnterprise => "enroll.disabled.learner_not_in_enterprise",
            ReasonKind::LearnerMaxSpendReached => "enroll.disabled.learner_max_spend_reached",
            ReasonKind::LearnerMaxEnrollmentsReached => {
                "enroll.disabled.learner_max_enrollments_reached"
            }
            ReasonKind::NotEnoughValueInSubsidy => "enroll.disabled.not_enough_value_in_subsidy",
            ReasonKind::SubscriptionExpired => "enroll.disabled.subscription_expired",
            ReasonKind::SubscriptionExpiredNoAdmins => {
                "enroll.disabled.subscription_expired_no_admins"
            }
            ReasonKind::SubscriptionDeactivated => "enroll.disabled.subscription_deactivated",
            ReasonKind::SubscriptionSeatsExhausted => "enroll.disabled.subscription_seats_exhausted",
            ReasonKind::SubscriptionSeatsExhaustedNoAdmins => {
                "enroll.disabled.subscription_seats_exhausted_no_admins"
            }
            ReasonKind::CouponCodesExpired => "enroll.disabled.coupon_codes_expired",
            ReasonKind::CouponCodeNotAssigned => "enroll.disabled.coupon_code_not_assigned",
            ReasonKind::EnterpriseOffersExpired => "enroll.disabled.enterprise_offers_expired",
            ReasonKind::EnterpriseOffersExhausted => "enroll.disabled.enterprise_offers_exhausted",
            ReasonKind::NoSubsidy => "enroll.disabled.no_subsidy",
            ReasonKind::NoSubsidyNoAdmins => "enroll.disabled.no_subsidy_no_admins",
        }
    }
}

/// Remediation the UI can offer next to the disabled enroll button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReasonAction {
    ContactAdmin {
        mailto: Vec<String>,
    },
    RequestLearnerCredit {
        #[serde(rename = "policyUuid")]
        policy_uuid: String,
    },
}

/// Reason already computed by the learner-credit subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyReason {
    pub reason: ReasonKind,
    pub user_message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingSubsidyReason {
    pub reason: ReasonKind,
    pub user_message: String,
    pub actions: Option<ReasonAction>,
}

impl MissingSubsidyReason {
    pub fn new(reason: ReasonKind, actions: Option<ReasonAction>) -> Self {
        Self {
            reason,
            user_message: reason.user_message().to_string(),
            actions,
        }
    }

    pub(crate) fn from_policy(policy_reason: &PolicyReason, actions: Option<ReasonAction>) -> Self {
        Self {
            reason: policy_reason.reason,
            user_message: policy_reason.user_message.clone(),
            actions,
        }
    }

    pub fn summary(&self) -> String {
        match &self.actions {
            Some(ReasonAction::ContactAdmin { mailto }) => {
                format!("{:?}: contact {}", self.reason, mailto.join(", "))
            }
            Some(ReasonAction::RequestLearnerCredit { policy_uuid }) => {
                format!("{:?}: request learner credit from {policy_uuid}", self.reason)
            }
            None => format!("{:?}", self.reason),
        }
    }
}
