use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;

use crate::subsidy::domain::{
    CatalogContainment, CouponCodeAssignment, CourseContext, CourseEntitlement, CourseMetadata,
    CourseRun, DiscountType, EnterpriseAdminUser, EnterpriseContacts, EnterpriseOffer, LearnerId,
    LearnerSubsidySnapshot, LicenseStatus, SubscriptionLicense, SubscriptionPlan,
    SubsidyAccessPolicy,
};
use crate::subsidy::resolver::{ResolverFeatures, SubsidyResolver};
use crate::subsidy::service::SubsidyResolutionService;
use crate::subsidy::source::{SourceError, SubsidySource};

pub(super) const COURSE_KEY: &str = "edX+DemoX";

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn days(offset: i64) -> DateTime<Utc> {
    now() + Duration::days(offset)
}

pub(super) fn catalogs(uuids: &[&str]) -> Vec<String> {
    uuids.iter().map(|uuid| uuid.to_string()).collect()
}

pub(super) fn license(status: LicenseStatus, is_current: bool, catalog: &str) -> SubscriptionLicense {
    SubscriptionLicense {
        uuid: "license-1".to_string(),
        status,
        subscription_plan: SubscriptionPlan {
            uuid: "plan-1".to_string(),
            enterprise_catalog_uuid: catalog.to_string(),
            is_current,
            expiration_date: Some(days(180)),
        },
        discount_type: DiscountType::Percentage,
        discount_value: 100.0,
    }
}

pub(super) fn active_license(catalog: &str) -> SubscriptionLicense {
    license(LicenseStatus::Activated, true, catalog)
}

pub(super) fn coupon(code: &str, catalog: &str, starts: i64, ends: i64) -> CouponCodeAssignment {
    CouponCodeAssignment {
        code: code.to_string(),
        coupon_id: Some(7),
        catalog: catalog.to_string(),
        coupon_start_date: days(starts),
        coupon_end_date: days(ends),
        usage_type: DiscountType::Percentage,
        benefit_value: 100.0,
    }
}

pub(super) fn offer(id: u64, catalog: &str, usage_type: DiscountType) -> EnterpriseOffer {
    EnterpriseOffer {
        id: Some(id),
        enterprise_catalog_uuid: catalog.to_string(),
        start_datetime: days(-30),
        end_datetime: days(30),
        usage_type,
        discount_value: 100.0,
        remaining_balance: Some(5000.0),
        remaining_balance_for_user: None,
        max_user_discount: None,
        is_current: true,
    }
}

pub(super) fn policy(uuid: &str) -> SubsidyAccessPolicy {
    SubsidyAccessPolicy {
        uuid: uuid.to_string(),
        policy_type: "PerLearnerSpendCreditAccessPolicy".to_string(),
        per_learner_spend_limit: Some(1000.0),
    }
}

pub(super) fn course_run(key: &str, fixed_price: Option<f64>) -> CourseRun {
    CourseRun {
        key: key.to_string(),
        fixed_price_usd: fixed_price,
        first_enrollable_paid_seat_price: Some(199.0),
        is_enrollable: true,
        start: Some(days(14)),
    }
}

pub(super) fn metadata(fixed_price: Option<f64>) -> CourseMetadata {
    let run = course_run("course-v1:edX+DemoX+2024", fixed_price);
    CourseMetadata {
        key: COURSE_KEY.to_string(),
        active_course_run: Some(run.clone()),
        course_runs: vec![run],
        entitlements: vec![CourseEntitlement {
            mode: "verified".to_string(),
            price: 15.0,
            sku: Some("ENT-1".to_string()),
        }],
    }
}

pub(super) fn course(catalog_list: &[&str]) -> CourseContext {
    CourseContext {
        containment: CatalogContainment {
            contains_content_items: !catalog_list.is_empty(),
            catalog_list: catalogs(catalog_list),
        },
        metadata: metadata(Some(100.0)),
    }
}

pub(super) fn contacts(emails: &[&str]) -> EnterpriseContacts {
    EnterpriseContacts {
        admin_users: emails
            .iter()
            .enumerate()
            .map(|(index, email)| EnterpriseAdminUser {
                email: email.to_string(),
                lms_user_id: Some(index as u64 + 1),
            })
            .collect(),
        contact_email: None,
    }
}

pub(super) fn snapshot_with_admins() -> LearnerSubsidySnapshot {
    LearnerSubsidySnapshot {
        contacts: contacts(&["admin@example.com"]),
        ..LearnerSubsidySnapshot::default()
    }
}

pub(super) fn resolver() -> SubsidyResolver {
    SubsidyResolver::new(ResolverFeatures::default())
}

#[derive(Default, Clone)]
pub(super) struct MemorySource {
    pub(super) snapshots: Arc<Mutex<HashMap<LearnerId, LearnerSubsidySnapshot>>>,
    pub(super) courses: Arc<Mutex<HashMap<String, CourseContext>>>,
}

impl MemorySource {
    pub(super) fn with(learner: &str, snapshot: LearnerSubsidySnapshot, course: CourseContext) -> Self {
        let source = Self::default();
        source
            .snapshots
            .lock()
            .expect("source mutex poisoned")
            .insert(LearnerId(learner.to_string()), snapshot);
        source
            .courses
            .lock()
            .expect("source mutex poisoned")
            .insert(course.course_key().to_string(), course);
        source
    }
}

impl SubsidySource for MemorySource {
    fn snapshot(&self, learner: &LearnerId) -> Result<Option<LearnerSubsidySnapshot>, SourceError> {
        let guard = self.snapshots.lock().expect("source mutex poisoned");
        Ok(guard.get(learner).cloned())
    }

    fn course(&self, course_key: &str) -> Result<Option<CourseContext>, SourceError> {
        let guard = self.courses.lock().expect("source mutex poisoned");
        Ok(guard.get(course_key).cloned())
    }
}

pub(super) struct UnavailableSource;

impl SubsidySource for UnavailableSource {
    fn snapshot(&self, _learner: &LearnerId) -> Result<Option<LearnerSubsidySnapshot>, SourceError> {
        Err(SourceError::Unavailable("license manager offline".to_string()))
    }

    fn course(&self, _course_key: &str) -> Result<Option<CourseContext>, SourceError> {
        Err(SourceError::Unavailable("catalog offline".to_string()))
    }
}

pub(super) fn build_service(source: MemorySource) -> SubsidyResolutionService<MemorySource> {
    SubsidyResolutionService::new(Arc::new(source), ResolverFeatures::default())
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
