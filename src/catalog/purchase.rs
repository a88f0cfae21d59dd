//! Enrollment & purchase status resolver.
//!
//! Classifies a course as free, purchasable or purchased relative to an
//! optional student. The display string is a hint for the UI; downstream
//! consumers key their decisions off the two booleans, which are
//! independent of each other and always both populated.

use bigdecimal::{BigDecimal, Zero};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PurchaseStatus {
    pub label: String,
    pub is_free: bool,
    pub is_purchased: bool,
}

/// `enrolled` is whether an active, non-deleted enrollment exists for the
/// (student, course) pair; callers pass `false` for anonymous viewers.
pub fn classify(price: Option<&BigDecimal>, enrolled: bool) -> PurchaseStatus {
    let is_free = price.map_or(true, |p| p.is_zero());
    let label = match (enrolled, price) {
        (true, _) => "Purchased".to_string(),
        (false, Some(p)) if !p.is_zero() => format!("Buy: {}", p),
        _ => "Free".to_string(),
    };
    PurchaseStatus {
        label,
        is_free,
        is_purchased: enrolled,
    }
}
