//! Result set builder.
//!
//! Applies a resolved filter set against the property store as a fixed
//! sequence of conjunctive predicates. The predicates commute, so the
//! order never changes the result — it is fixed purely for determinism.
//! Rows with an unknown numeric value are excluded by numeric predicates
//! but unconstrained otherwise. Dataset row order is preserved.
//!
//! `status_list` is carried in the filter set and surfaced to the user but
//! intentionally does not constrain results.

use crate::dataset::{PropertyRecord, PropertyStore};
use crate::filters::FilterSet;

pub fn apply_filters<'a>(filters: &FilterSet, store: &'a PropertyStore) -> Vec<&'a PropertyRecord> {
    let mut results: Vec<&PropertyRecord> = store.records().iter().collect();

    if let Some(city) = &filters.city {
        let key = city.trim().to_lowercase();
        results.retain(|r| r.city_key == key);
    }

    if !filters.bhk_list.is_empty() {
        results.retain(|r| {
            r.bhk
                .map(|bhk| filters.bhk_list.iter().any(|b| *b as f64 == bhk))
                .unwrap_or(false)
        });
    }

    if let Some(min) = filters.budget_min_cr {
        results.retain(|r| r.price_cr.map(|p| p >= min).unwrap_or(false));
    }

    if let Some(max) = filters.budget_max_cr {
        results.retain(|r| r.price_cr.map(|p| p <= max).unwrap_or(false));
    }

    results
}
