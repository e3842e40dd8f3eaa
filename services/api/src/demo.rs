use crate::infra::InMemorySubsidySource;
use chrono::{DateTime, Duration, Utc};
use clap::Args;
use learner_subsidy::config::AppConfig;
use learner_subsidy::error::AppError;
use learner_subsidy::subsidy::{
    CatalogContainment, CouponCodeAssignment, CourseContext, CourseEntitlement, CourseMetadata,
    CourseRun, DiscountType, EnterpriseAdminUser, EnterpriseContacts, EnterpriseOffer, LearnerId,
    LearnerSubsidySnapshot, LicenseStatus, ResolutionRequest, ResolverFeatures,
    SubscriptionLicense, SubscriptionPlan, SubsidyAccessPolicy, SubsidyResolutionService,
    SubsidyResolver,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct ResolveArgs {
    /// JSON document with `snapshot` and `course` objects
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Evaluation instant (RFC 3339). Defaults to now.
    #[arg(long, value_parser = crate::infra::parse_timestamp)]
    pub(crate) now: Option<DateTime<Utc>>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Evaluation instant (RFC 3339). Defaults to now.
    #[arg(long, value_parser = crate::infra::parse_timestamp)]
    pub(crate) now: Option<DateTime<Utc>>,
    /// Resolve as if enterprise offers were switched off
    #[arg(long)]
    pub(crate) disable_offers: bool,
    /// Resolve as if learner credit were switched off
    #[arg(long)]
    pub(crate) disable_learner_credit: bool,
    /// Print the full JSON report for each scenario
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_resolve(args: ResolveArgs) -> Result<(), AppError> {
    let ResolveArgs { input, now } = args;

    let features = AppConfig::load()?.features;
    let raw = std::fs::read_to_string(&input)?;
    let request: ResolutionRequest = serde_json::from_str(&raw)?;

    let report = SubsidyResolver::new(features).report(
        &request.snapshot,
        &request.course,
        now.unwrap_or_else(Utc::now),
    );
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        now,
        disable_offers,
        disable_learner_credit,
        json,
    } = args;

    let now = now.unwrap_or_else(Utc::now);
    let features = ResolverFeatures {
        enterprise_offers: !disable_offers,
        learner_credit: !disable_learner_credit,
    };

    let source = Arc::new(InMemorySubsidySource::default());
    source.upsert_course(demo_course(DEMO_COURSE, &["catalog-a"], now))?;
    source.upsert_course(demo_course(OUTSIDE_COURSE, &[], now))?;
    let scenarios = demo_scenarios(now);
    for scenario in &scenarios {
        source.upsert_snapshot(LearnerId(scenario.learner.to_string()), scenario.snapshot.clone())?;
    }

    let service = SubsidyResolutionService::new(source, features);

    println!("Learner subsidy resolution demo");
    println!(
        "Evaluated at {} | enterprise offers {} | learner credit {}",
        now.to_rfc3339(),
        on_off(features.enterprise_offers),
        on_off(features.learner_credit)
    );

    for scenario in &scenarios {
        println!("\n{} ({} / {})", scenario.title, scenario.learner, scenario.course_key);
        let learner = LearnerId(scenario.learner.to_string());
        match service.resolve_for_learner(&learner, scenario.course_key, now) {
            Ok(report) => {
                println!("  {}", report.resolution.summary());
                if json {
                    println!("{}", serde_json::to_string_pretty(&report)?);
                }
            }
            Err(err) => println!("  Resolution unavailable: {}", err),
        }
    }

    Ok(())
}

fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "on"
    } else {
        "off"
    }
}

const DEMO_COURSE: &str = "edX+DemoX";
const OUTSIDE_COURSE: &str = "edX+Outside";

struct DemoScenario {
    title: &'static str,
    learner: &'static str,
    course_key: &'static str,
    snapshot: LearnerSubsidySnapshot,
}

fn demo_scenarios(now: DateTime<Utc>) -> Vec<DemoScenario> {
    let admins = demo_contacts();

    let mut learner_credit = LearnerSubsidySnapshot {
        contacts: admins.clone(),
        ..LearnerSubsidySnapshot::default()
    };
    learner_credit.learner_credit.is_policy_redemption_enabled = true;
    learner_credit.learner_credit.redeemable_subsidy_access_policy = Some(SubsidyAccessPolicy {
        uuid: "policy-spend-1".to_string(),
        policy_type: "PerLearnerSpendCreditAccessPolicy".to_string(),
        per_learner_spend_limit: Some(2000.0),
    });
    learner_credit.learner_credit.available_course_runs = vec![demo_run(now)];
    learner_credit.learner_credit.list_price = Some(vec![149.0]);

    vec![
        DemoScenario {
            title: "Activated subscription license",
            learner: "learner-licensed",
            course_key: DEMO_COURSE,
            snapshot: LearnerSubsidySnapshot {
                subscription_license: Some(demo_license(true)),
                coupon_codes: vec![demo_coupon(now, -5, 25)],
                contacts: admins.clone(),
                ..LearnerSubsidySnapshot::default()
            },
        },
        DemoScenario {
            title: "Learner credit policy",
            learner: "learner-credit",
            course_key: DEMO_COURSE,
            snapshot: learner_credit,
        },
        DemoScenario {
            title: "Expired license with an assigned coupon",
            learner: "learner-coupon",
            course_key: DEMO_COURSE,
            snapshot: LearnerSubsidySnapshot {
                subscription_license: Some(demo_license(false)),
                coupon_codes: vec![demo_coupon(now, -5, 25)],
                contacts: admins.clone(),
                ..LearnerSubsidySnapshot::default()
            },
        },
        DemoScenario {
            title: "Enterprise offer with remaining balance",
            learner: "learner-offer",
            course_key: DEMO_COURSE,
            snapshot: LearnerSubsidySnapshot {
                enterprise_offers: vec![demo_offer(now, 5000.0)],
                contacts: admins.clone(),
                ..LearnerSubsidySnapshot::default()
            },
        },
        DemoScenario {
            title: "Expired license, admins on file",
            learner: "learner-expired",
            course_key: DEMO_COURSE,
            snapshot: LearnerSubsidySnapshot {
                subscription_license: Some(demo_license(false)),
                contacts: admins.clone(),
                ..LearnerSubsidySnapshot::default()
            },
        },
        DemoScenario {
            title: "Depleted offer",
            learner: "learner-depleted",
            course_key: DEMO_COURSE,
            snapshot: LearnerSubsidySnapshot {
                enterprise_offers: vec![demo_offer(now, 20.0)],
                contacts: admins,
                ..LearnerSubsidySnapshot::default()
            },
        },
        DemoScenario {
            title: "No subsidies and no admins",
            learner: "learner-alone",
            course_key: DEMO_COURSE,
            snapshot: LearnerSubsidySnapshot::default(),
        },
        DemoScenario {
            title: "Course outside the enterprise catalog",
            learner: "learner-browsing",
            course_key: OUTSIDE_COURSE,
            snapshot: LearnerSubsidySnapshot {
                subscription_license: Some(demo_license(true)),
                ..LearnerSubsidySnapshot::default()
            },
        },
    ]
}

fn demo_contacts() -> EnterpriseContacts {
    EnterpriseContacts {
        admin_users: vec![EnterpriseAdminUser {
            email: "learning-admin@example.com".to_string(),
            lms_user_id: Some(1),
        }],
        contact_email: None,
    }
}

fn demo_license(is_current: bool) -> SubscriptionLicense {
    SubscriptionLicense {
        uuid: "license-demo".to_string(),
        status: LicenseStatus::Activated,
        subscription_plan: SubscriptionPlan {
            uuid: "plan-demo".to_string(),
            enterprise_catalog_uuid: "catalog-a".to_string(),
            is_current,
            expiration_date: None,
        },
        discount_type: DiscountType::Percentage,
        discount_value: 100.0,
    }
}

fn demo_coupon(now: DateTime<Utc>, starts: i64, ends: i64) -> CouponCodeAssignment {
    CouponCodeAssignment {
        code: "DEMO-COUPON".to_string(),
        coupon_id: Some(11),
        catalog: "catalog-a".to_string(),
        coupon_start_date: now + Duration::days(starts),
        coupon_end_date: now + Duration::days(ends),
        usage_type: DiscountType::Percentage,
        benefit_value: 100.0,
    }
}

fn demo_offer(now: DateTime<Utc>, remaining_balance: f64) -> EnterpriseOffer {
    EnterpriseOffer {
        id: Some(501),
        enterprise_catalog_uuid: "catalog-a".to_string(),
        start_datetime: now - Duration::days(30),
        end_datetime: now + Duration::days(60),
        usage_type: DiscountType::Absolute,
        discount_value: 500.0,
        remaining_balance: Some(remaining_balance),
        remaining_balance_for_user: None,
        max_user_discount: None,
        is_current: true,
    }
}

fn demo_run(now: DateTime<Utc>) -> CourseRun {
    CourseRun {
        key: "course-v1:edX+DemoX+2T2024".to_string(),
        fixed_price_usd: None,
        first_enrollable_paid_seat_price: Some(149.0),
        is_enrollable: true,
        start: Some(now + Duration::days(7)),
    }
}

fn demo_course(key: &str, catalogs: &[&str], now: DateTime<Utc>) -> CourseContext {
    CourseContext {
        containment: CatalogContainment {
            contains_content_items: !catalogs.is_empty(),
            catalog_list: catalogs.iter().map(|uuid| uuid.to_string()).collect(),
        },
        metadata: CourseMetadata {
            key: key.to_string(),
            active_course_run: Some(demo_run(now)),
            course_runs: vec![demo_run(now)],
            entitlements: vec![CourseEntitlement {
                mode: "verified".to_string(),
                price: 149.0,
                sku: None,
            }],
        },
    }
}
