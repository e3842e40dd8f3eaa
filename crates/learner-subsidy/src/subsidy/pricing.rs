use serde::{Deserialize, Serialize};

use super::domain::CourseMetadata;

/// Course price in USD, either per-run list prices from the redemption API or one amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CoursePrice {
    List(Vec<f64>),
    Amount(f64),
}

impl CoursePrice {
    /// Amount used for affordability checks; list prices use their first entry.
    pub fn amount(&self) -> Option<f64> {
        match self {
            CoursePrice::List(prices) => prices.first().copied(),
            CoursePrice::Amount(amount) => Some(*amount),
        }
    }
}

/// Resolve the course price.
///
/// Precedence: redemption list price, active run fixed price, first enrollable
/// paid seat price, first entitlement price. Later sources are only consulted
/// when earlier ones are absent; a price of `0` counts as present.
pub fn get_course_price(
    metadata: &CourseMetadata,
    redemption_list_price: Option<&[f64]>,
) -> Option<CoursePrice> {
    if let Some(prices) = redemption_list_price.filter(|prices| !prices.is_empty()) {
        return Some(CoursePrice::List(prices.to_vec()));
    }

    let active_run = metadata.active_course_run.as_ref();

    active_run
        .and_then(|run| run.fixed_price_usd)
        .or_else(|| active_run.and_then(|run| run.first_enrollable_paid_seat_price))
        .or_else(|| metadata.entitlements.first().map(|entitlement| entitlement.price))
        .map(CoursePrice::Amount)
}
