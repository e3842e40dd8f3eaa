use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::resolver::PolicyReason;

/// Identifier wrapper for the learner whose subsidies are being resolved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LearnerId(pub String);

/// Lifecycle state of a subscription license as reported by the license manager.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LicenseStatus {
    Activated,
    Assigned,
    Revoked,
    #[default]
    Unassigned,
}

impl LicenseStatus {
    pub const fn label(self) -> &'static str {
        match self {
            LicenseStatus::Activated => "activated",
            LicenseStatus::Assigned => "assigned",
            LicenseStatus::Revoked => "revoked",
            LicenseStatus::Unassigned => "unassigned",
        }
    }
}

/// How a subsidy's value is applied to the course price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    Percentage,
    Absolute,
}

fn full_discount_type() -> DiscountType {
    DiscountType::Percentage
}

fn full_discount_value() -> f64 {
    100.0
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionPlan {
    #[serde(default)]
    pub uuid: String,
    #[serde(default)]
    pub enterprise_catalog_uuid: String,
    #[serde(default)]
    pub is_current: bool,
    #[serde(default)]
    pub expiration_date: Option<DateTime<Utc>>,
}

/// Subscription license held by the learner, possibly expired or revoked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionLicense {
    #[serde(default)]
    pub uuid: String,
    #[serde(default)]
    pub status: LicenseStatus,
    #[serde(default)]
    pub subscription_plan: SubscriptionPlan,
    #[serde(default = "full_discount_type")]
    pub discount_type: DiscountType,
    #[serde(default = "full_discount_value")]
    pub discount_value: f64,
}

impl SubscriptionLicense {
    /// License uuid, or the plan's identifiers when the license record omits it.
    pub fn subsidy_id(&self) -> String {
        first_non_blank(&[
            &self.uuid,
            &self.subscription_plan.uuid,
            &self.subscription_plan.enterprise_catalog_uuid,
        ])
    }
}

fn first_non_blank(candidates: &[&str]) -> String {
    candidates
        .iter()
        .map(|candidate| candidate.trim())
        .find(|candidate| !candidate.is_empty())
        .unwrap_or_default()
        .to_string()
}

/// Coupon code assigned to the learner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponCodeAssignment {
    pub code: String,
    #[serde(default)]
    pub coupon_id: Option<u64>,
    pub catalog: String,
    pub coupon_start_date: DateTime<Utc>,
    pub coupon_end_date: DateTime<Utc>,
    pub usage_type: DiscountType,
    pub benefit_value: f64,
}

/// Enterprise-level coupon inventory, independent of the learner's own assignments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnterpriseCoupon {
    #[serde(default)]
    pub id: Option<u64>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(default)]
    pub num_unassigned: u32,
}

/// Enterprise offer (ecommerce conditional offer) funded against a catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnterpriseOffer {
    #[serde(default)]
    pub id: Option<u64>,
    pub enterprise_catalog_uuid: String,
    pub start_datetime: DateTime<Utc>,
    pub end_datetime: DateTime<Utc>,
    pub usage_type: DiscountType,
    pub discount_value: f64,
    #[serde(default)]
    pub remaining_balance: Option<f64>,
    #[serde(default)]
    pub remaining_balance_for_user: Option<f64>,
    #[serde(default)]
    pub max_user_discount: Option<f64>,
    #[serde(default = "default_true")]
    pub is_current: bool,
}

impl EnterpriseOffer {
    /// Offer id, or the funding catalog when the offer record carries no id.
    pub fn subsidy_id(&self) -> String {
        match self.id {
            Some(id) => id.to_string(),
            None => self.enterprise_catalog_uuid.clone(),
        }
    }
}

/// Learner-credit policy that may fund the enrollment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubsidyAccessPolicy {
    #[serde(default)]
    pub uuid: String,
    #[serde(default)]
    pub policy_type: String,
    #[serde(default)]
    pub per_learner_spend_limit: Option<f64>,
}

/// Redemption eligibility returned by the learner-credit "can redeem" query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnerCreditEligibility {
    #[serde(default)]
    pub is_policy_redemption_enabled: bool,
    #[serde(default)]
    pub redeemable_subsidy_access_policy: Option<SubsidyAccessPolicy>,
    #[serde(default)]
    pub available_course_runs: Vec<CourseRun>,
    #[serde(default)]
    pub list_price: Option<Vec<f64>>,
    #[serde(default)]
    pub missing_subsidy_access_policy_reason: Option<PolicyReason>,
    #[serde(default)]
    pub can_request_learner_credit: bool,
    #[serde(default)]
    pub learner_credit_requestable_policy: Option<SubsidyAccessPolicy>,
    #[serde(default)]
    pub learner_credit_request_reason: Option<PolicyReason>,
}

/// Which of the enterprise's catalogs contain the course.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogContainment {
    #[serde(default)]
    pub contains_content_items: bool,
    #[serde(default)]
    pub catalog_list: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgreementSubscription {
    #[serde(default)]
    pub uuid: String,
    #[serde(default)]
    pub is_current: bool,
    #[serde(default)]
    pub unassigned_licenses: Option<u32>,
}

/// Customer agreement listing every subscription plan of the enterprise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerAgreement {
    #[serde(default)]
    pub uuid: String,
    #[serde(default)]
    pub subscriptions: Vec<AgreementSubscription>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnterpriseAdminUser {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub lms_user_id: Option<u64>,
}

/// Who learners should reach out to when no subsidy applies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnterpriseContacts {
    #[serde(default)]
    pub admin_users: Vec<EnterpriseAdminUser>,
    #[serde(default)]
    pub contact_email: Option<String>,
}

impl EnterpriseContacts {
    pub fn admin_emails(&self) -> Vec<String> {
        self.admin_users
            .iter()
            .map(|admin| admin.email.trim())
            .filter(|email| !email.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn has_admins(&self) -> bool {
        self.admin_users
            .iter()
            .any(|admin| !admin.email.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseRun {
    pub key: String,
    #[serde(default)]
    pub fixed_price_usd: Option<f64>,
    #[serde(default)]
    pub first_enrollable_paid_seat_price: Option<f64>,
    #[serde(default)]
    pub is_enrollable: bool,
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseEntitlement {
    #[serde(default)]
    pub mode: String,
    pub price: f64,
    #[serde(default)]
    pub sku: Option<String>,
}

/// Course metadata as returned by the catalog, trimmed to what pricing needs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseMetadata {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub active_course_run: Option<CourseRun>,
    #[serde(default)]
    pub course_runs: Vec<CourseRun>,
    #[serde(default)]
    pub entitlements: Vec<CourseEntitlement>,
}

impl CourseMetadata {
    pub fn enrollable_runs(&self) -> Vec<CourseRun> {
        self.course_runs
            .iter()
            .filter(|run| run.is_enrollable)
            .cloned()
            .collect()
    }
}

/// Everything the resolver needs to know about the course being enrolled in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseContext {
    #[serde(default)]
    pub containment: CatalogContainment,
    #[serde(default)]
    pub metadata: CourseMetadata,
}

impl CourseContext {
    pub fn course_key(&self) -> &str {
        &self.metadata.key
    }

    pub fn catalogs_with_course(&self) -> &[String] {
        &self.containment.catalog_list
    }
}

/// Snapshot of the learner's subsidies taken by the upstream query layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnerSubsidySnapshot {
    #[serde(default)]
    pub is_pending: bool,
    #[serde(default)]
    pub subscription_license: Option<SubscriptionLicense>,
    #[serde(default)]
    pub coupon_codes: Vec<CouponCodeAssignment>,
    #[serde(default)]
    pub coupons_overview: Vec<EnterpriseCoupon>,
    #[serde(default)]
    pub enterprise_offers: Vec<EnterpriseOffer>,
    #[serde(default)]
    pub learner_credit: LearnerCreditEligibility,
    #[serde(default)]
    pub customer_agreement: Option<CustomerAgreement>,
    #[serde(default)]
    pub contacts: EnterpriseContacts,
}

/// Kind of subsidy selected for redemption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubsidyType {
    License,
    LearnerCredit,
    CouponCode,
    EnterpriseOffer,
}

impl SubsidyType {
    pub const fn label(self) -> &'static str {
        match self {
            SubsidyType::License => "license",
            SubsidyType::LearnerCredit => "learner_credit",
            SubsidyType::CouponCode => "coupon_code",
            SubsidyType::EnterpriseOffer => "enterprise_offer",
        }
    }
}

/// The single subsidy the learner should redeem for the course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedSubsidy {
    pub subsidy_type: SubsidyType,
    pub subsidy_id: String,
    pub discount_type: DiscountType,
    pub discount_value: f64,
    pub available_course_runs: Vec<CourseRun>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<DateTime<Utc>>,
}
