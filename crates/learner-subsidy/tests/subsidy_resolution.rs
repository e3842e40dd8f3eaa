//! Integration specifications for learner subsidy resolution.
//!
//! Scenarios drive the public resolver, service facade and HTTP router with JSON payloads shaped
//! like the upstream enterprise APIs, without reaching into private modules.

mod common {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use chrono::{DateTime, Utc};
    use serde_json::{json, Value};

    use learner_subsidy::subsidy::{
        CourseContext, LearnerId, LearnerSubsidySnapshot, ResolverFeatures, SourceError,
        SubsidyResolutionService, SubsidySource,
    };

    pub(super) fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-06-15T12:00:00Z")
            .expect("valid timestamp")
            .with_timezone(&Utc)
    }

    pub(super) fn course_json(catalogs: &[&str]) -> Value {
        json!({
            "containment": {
                "containsContentItems": !catalogs.is_empty(),
                "catalogList": catalogs,
            },
            "metadata": {
                "key": "edX+DemoX",
                "activeCourseRun": {
                    "key": "course-v1:edX+DemoX+2024",
                    "firstEnrollablePaidSeatPrice": 149.0,
                    "isEnrollable": true
                },
                "courseRuns": [{
                    "key": "course-v1:edX+DemoX+2024",
                    "firstEnrollablePaidSeatPrice": 149.0,
                    "isEnrollable": true
                }, {
                    "key": "course-v1:edX+DemoX+2019",
                    "isEnrollable": false
                }],
                "entitlements": []
            }
        })
    }

    pub(super) fn course(catalogs: &[&str]) -> CourseContext {
        serde_json::from_value(course_json(catalogs)).expect("course payload")
    }

    pub(super) fn snapshot(value: Value) -> LearnerSubsidySnapshot {
        serde_json::from_value(value).expect("snapshot payload")
    }

    #[derive(Default)]
    pub(super) struct FixtureSource {
        snapshots: Mutex<HashMap<LearnerId, LearnerSubsidySnapshot>>,
        courses: Mutex<HashMap<String, CourseContext>>,
    }

    impl FixtureSource {
        pub(super) fn insert(&self, learner: &str, snapshot: LearnerSubsidySnapshot, course: CourseContext) {
            self.snapshots
                .lock()
                .expect("fixture mutex")
                .insert(LearnerId(learner.to_string()), snapshot);
            self.courses
                .lock()
                .expect("fixture mutex")
                .insert(course.course_key().to_string(), course);
        }
    }

    impl SubsidySource for FixtureSource {
        fn snapshot(&self, learner: &LearnerId) -> Result<Option<LearnerSubsidySnapshot>, SourceError> {
            Ok(self.snapshots.lock().expect("fixture mutex").get(learner).cloned())
        }

        fn course(&self, course_key: &str) -> Result<Option<CourseContext>, SourceError> {
            Ok(self.courses.lock().expect("fixture mutex").get(course_key).cloned())
        }
    }

    pub(super) fn service(source: FixtureSource) -> Arc<SubsidyResolutionService<FixtureSource>> {
        Arc::new(SubsidyResolutionService::new(
            Arc::new(source),
            ResolverFeatures::default(),
        ))
    }
}

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use common::*;
use learner_subsidy::search::FilterBuilder;
use learner_subsidy::subsidy::{
    DiscountType, ReasonAction, ReasonKind, ResolutionRequest, SubsidyResolver, SubsidyType,
};

#[test]
fn expired_license_falls_back_to_assigned_coupon() {
    let snapshot = snapshot(json!({
        "subscriptionLicense": {
            "uuid": "license-9",
            "status": "activated",
            "subscriptionPlan": {
                "uuid": "plan-9",
                "enterpriseCatalogUuid": "cat-1",
                "isCurrent": false,
                "expirationDate": "2024-05-01T00:00:00Z"
            }
        },
        "couponCodes": [{
            "code": "SAVE-50",
            "couponId": 12,
            "catalog": "cat-1",
            "couponStartDate": "2024-06-01T00:00:00Z",
            "couponEndDate": "2024-07-01T00:00:00Z",
            "usageType": "percentage",
            "benefitValue": 50.0
        }]
    }));

    let resolution = SubsidyResolver::default().resolve(&snapshot, &course(&["cat-1"]), now());

    let subsidy = resolution.subsidy().expect("coupon applies");
    assert_eq!(subsidy.subsidy_type, SubsidyType::CouponCode);
    assert_eq!(subsidy.subsidy_id, "SAVE-50");
    assert_eq!(subsidy.discount_type, DiscountType::Percentage);
    assert_eq!(subsidy.discount_value, 50.0);
    assert_eq!(subsidy.available_course_runs.len(), 1);
}

#[test]
fn expired_license_without_other_subsidies_reports_expiry_to_admins() {
    let snapshot = snapshot(json!({
        "subscriptionLicense": {
            "uuid": "license-9",
            "status": "activated",
            "subscriptionPlan": {
                "uuid": "plan-9",
                "enterpriseCatalogUuid": "cat-1",
                "isCurrent": false
            }
        },
        "contacts": {
            "adminUsers": [{ "email": "ops@example.com", "lmsUserId": 3 }],
            "contactEmail": null
        }
    }));

    let resolution = SubsidyResolver::default().resolve(&snapshot, &course(&["cat-1"]), now());

    let reason = resolution.missing_reason().expect("no subsidy applies");
    assert_eq!(reason.reason, ReasonKind::SubscriptionExpired);
    assert_eq!(
        reason.actions,
        Some(ReasonAction::ContactAdmin {
            mailto: vec!["ops@example.com".to_string()]
        })
    );
}

#[test]
fn upstream_policy_reason_deserializes_and_passes_through() {
    let request: ResolutionRequest = serde_json::from_value(json!({
        "snapshot": {
            "learnerCredit": {
                "isPolicyRedemptionEnabled": false,
                "missingSubsidyAccessPolicyReason": {
                    "reason": "learner_max_enrollments_reached",
                    "userMessage": "You have enrolled in the maximum number of courses."
                }
            }
        },
        "course": course_json(&["cat-1"])
    }))
    .expect("request payload");

    let report = SubsidyResolver::default().report(&request.snapshot, &request.course, now());

    let reason = report.resolution.missing_reason().expect("no subsidy applies");
    assert_eq!(reason.reason, ReasonKind::LearnerMaxEnrollmentsReached);
    assert_eq!(
        reason.user_message,
        "You have enrolled in the maximum number of courses."
    );
    assert_eq!(reason.actions, None);
}

#[test]
fn upstream_fields_outside_the_model_are_ignored() {
    let request: ResolutionRequest = serde_json::from_value(json!({
        "snapshot": {
            "customerAgreement": {
                "subscriptions": [{ "isCurrent": false }],
                "disableExpirationNotifications": true
            },
            "learnerCredit": {
                "missingSubsidyAccessPolicyReason": {
                    "reason": "policy_not_active",
                    "userMessage": "This budget is not active.",
                    "metadata": { "enterpriseAdministrators": [] }
                }
            }
        },
        "course": course_json(&["cat-1"])
    }))
    .expect("request payload");

    let resolution = SubsidyResolver::default().resolve(&request.snapshot, &request.course, now());

    let reason = resolution.missing_reason().expect("no subsidy applies");
    assert_eq!(reason.reason, ReasonKind::PolicyNotActive);
    assert_eq!(reason.user_message, "This budget is not active.");
}

#[test]
fn unknown_policy_reason_is_rejected() {
    let parsed: Result<ResolutionRequest, _> = serde_json::from_value(json!({
        "snapshot": {
            "learnerCredit": {
                "missingSubsidyAccessPolicyReason": {
                    "reason": "made_up_reason",
                    "userMessage": "?"
                }
            }
        },
        "course": course_json(&["cat-1"])
    }));

    assert!(parsed.is_err());
}

#[tokio::test]
async fn learner_route_resolves_learner_credit_with_redeemable_runs() {
    let source = FixtureSource::default();
    source.insert(
        "learner-1",
        snapshot(json!({
            "learnerCredit": {
                "isPolicyRedemptionEnabled": true,
                "redeemableSubsidyAccessPolicy": {
                    "uuid": "policy-7",
                    "policyType": "PerLearnerSpendCreditAccessPolicy"
                },
                "availableCourseRuns": [{
                    "key": "course-v1:edX+DemoX+2024",
                    "isEnrollable": true
                }],
                "listPrice": [149.0]
            }
        })),
        course(&["cat-1"]),
    );
    let router = learner_subsidy::subsidy::subsidy_router(service(source));

    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/v1/learners/learner-1/courses/edX+DemoX/subsidy")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("router response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("body");
    let report: Value = serde_json::from_slice(&body).expect("json payload");
    assert_eq!(report["coursePrice"], json!([149.0]));
    assert_eq!(report["resolution"]["status"], "applicable");
    assert_eq!(report["resolution"]["subsidy"]["subsidyType"], "learner_credit");
    assert_eq!(report["resolution"]["subsidy"]["subsidyId"], "policy-7");
    assert_eq!(
        report["resolution"]["subsidy"]["availableCourseRuns"][0]["key"],
        "course-v1:edX+DemoX+2024"
    );
}

#[test]
fn search_filter_scopes_to_enterprise_catalogs() {
    let filter = FilterBuilder::new()
        .enterprise_customer("ent-1")
        .catalog_query_uuids(&["query-1", "query-2"])
        .build();

    assert_eq!(
        filter,
        "enterprise_customer_uuids:ent-1 AND (enterprise_catalog_query_uuids:query-1 OR enterprise_catalog_query_uuids:query-2)"
    );
}
