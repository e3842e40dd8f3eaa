//! Per-kind applicability checks for subscription licenses, coupon codes and
//! enterprise offers.

use chrono::{DateTime, Utc};

use super::domain::{
    CouponCodeAssignment, DiscountType, EnterpriseCoupon, EnterpriseOffer, LicenseStatus,
    SubscriptionLicense,
};

fn in_catalogs(catalog: &str, catalogs_with_course: &[String]) -> bool {
    catalogs_with_course.iter().any(|candidate| candidate == catalog)
}

/// True when an activated, current license belongs to a catalog containing the course.
pub fn is_license_applicable(
    license: Option<&SubscriptionLicense>,
    catalogs_with_course: &[String],
) -> bool {
    let Some(license) = license else {
        return false;
    };

    license.status == LicenseStatus::Activated
        && license.subscription_plan.is_current
        && in_catalogs(
            &license.subscription_plan.enterprise_catalog_uuid,
            catalogs_with_course,
        )
}

pub(crate) fn coupon_is_current(coupon: &CouponCodeAssignment, now: DateTime<Utc>) -> bool {
    coupon.coupon_start_date <= now && now <= coupon.coupon_end_date
}

pub(crate) fn coupon_has_ended(coupon: &CouponCodeAssignment, now: DateTime<Utc>) -> bool {
    coupon.coupon_end_date < now
}

pub(crate) fn enterprise_coupon_is_current(coupon: &EnterpriseCoupon, now: DateTime<Utc>) -> bool {
    coupon.start_date <= now && now <= coupon.end_date
}

/// First assignment, in input order, that covers the course and is valid at `now`.
pub fn find_coupon_code_for_course<'a>(
    assignments: &'a [CouponCodeAssignment],
    catalogs_with_course: &[String],
    now: DateTime<Utc>,
) -> Option<&'a CouponCodeAssignment> {
    assignments.iter().find(|coupon| {
        in_catalogs(&coupon.catalog, catalogs_with_course) && coupon_is_current(coupon, now)
    })
}

pub(crate) fn offer_is_current(offer: &EnterpriseOffer, now: DateTime<Utc>) -> bool {
    offer.is_current && offer.start_datetime <= now && now <= offer.end_datetime
}

pub(crate) fn offer_has_ended(offer: &EnterpriseOffer, now: DateTime<Utc>) -> bool {
    !offer.is_current || offer.end_datetime < now
}

pub(crate) fn offer_matches_course(
    offer: &EnterpriseOffer,
    catalogs_with_course: &[String],
    now: DateTime<Utc>,
) -> bool {
    offer_is_current(offer, now) && in_catalogs(&offer.enterprise_catalog_uuid, catalogs_with_course)
}

/// Whether the offer has enough balance left to fund an enrollment at `course_price`.
pub(crate) fn offer_covers_price(offer: &EnterpriseOffer, course_price: Option<f64>) -> bool {
    match offer.usage_type {
        DiscountType::Percentage => {
            let depleted = |balance: Option<f64>| matches!(balance, Some(value) if value <= 0.0);
            !depleted(offer.remaining_balance) && !depleted(offer.remaining_balance_for_user)
        }
        DiscountType::Absolute => {
            let Some(price) = course_price else {
                return false;
            };

            let enterprise_ok = offer
                .remaining_balance
                .map_or(true, |balance| balance >= price);

            // A per-user cap with no reported balance means the learner has not spent yet.
            let learner_ok = match offer.max_user_discount {
                Some(cap) => offer.remaining_balance_for_user.unwrap_or(cap) >= price,
                None => offer
                    .remaining_balance_for_user
                    .map_or(true, |balance| balance >= price),
            };

            enterprise_ok && learner_ok
        }
    }
}

/// First current, catalog-matching offer that can cover the course price.
pub fn find_enterprise_offer_for_course<'a>(
    enterprise_offers: &'a [EnterpriseOffer],
    catalogs_with_course: &[String],
    course_price: Option<f64>,
    now: DateTime<Utc>,
) -> Option<&'a EnterpriseOffer> {
    enterprise_offers.iter().find(|offer| {
        offer_matches_course(offer, catalogs_with_course, now)
            && offer_covers_price(offer, course_price)
    })
}
