//! Canonical filter model for property search intent.
//!
//! A `FilterSet` is the complete snapshot of what the user is currently
//! searching for; a `FilterUpdate` is the partial form produced by one turn
//! of extraction. Merging an update over the previous set carries forward
//! every field the update does not mention, so the resolved set is always
//! complete (no field is silently dropped between turns).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::llm::ArgValue;

/// Complete search-intent snapshot. Budgets are in Crores (1 Cr = 100 Lakh).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSet {
    pub city: Option<String>,
    #[serde(default)]
    pub bhk_list: Vec<u32>,
    pub budget_min_cr: Option<f64>,
    pub budget_max_cr: Option<f64>,
    #[serde(default)]
    pub status_list: Vec<String>,
}

/// Partial extraction from a single turn. `None` means "not mentioned,
/// carry the previous value forward"; a present list replaces the previous
/// list wholesale (extraction always returns full values, never deltas).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterUpdate {
    pub city: Option<String>,
    pub bhk_list: Option<Vec<u32>>,
    pub budget_min_cr: Option<f64>,
    pub budget_max_cr: Option<f64>,
    pub status_list: Option<Vec<String>>,
}

impl FilterSet {
    /// True when no field constrains the search.
    pub fn is_empty(&self) -> bool {
        self.city.is_none()
            && self.bhk_list.is_empty()
            && self.budget_min_cr.is_none()
            && self.budget_max_cr.is_none()
            && self.status_list.is_empty()
    }

    /// Merge a partial update over this set. Fields present in the update
    /// replace the previous value; absent fields carry forward unchanged.
    pub fn merge(&self, update: &FilterUpdate) -> FilterSet {
        FilterSet {
            city: update.city.clone().or_else(|| self.city.clone()),
            bhk_list: match &update.bhk_list {
                Some(list) => dedup_bhk(list.clone()),
                None => self.bhk_list.clone(),
            },
            budget_min_cr: update.budget_min_cr.or(self.budget_min_cr),
            budget_max_cr: update.budget_max_cr.or(self.budget_max_cr),
            status_list: match &update.status_list {
                Some(list) => dedup_statuses(list.clone()),
                None => self.status_list.clone(),
            },
        }
    }
}

impl FilterUpdate {
    /// True when the update carries no new information.
    pub fn is_empty(&self) -> bool {
        self.city.is_none()
            && self.bhk_list.is_none()
            && self.budget_min_cr.is_none()
            && self.budget_max_cr.is_none()
            && self.status_list.is_none()
    }

    /// Decode a structured-argument map from the NLU boundary into a partial
    /// filter set. List wrappers are flattened to plain primitive vectors,
    /// nulls and out-of-domain values (non-positive BHK, negative budgets,
    /// empty strings) are dropped rather than rejected.
    pub fn from_args(args: &HashMap<String, ArgValue>) -> FilterUpdate {
        let city = args
            .get("city")
            .and_then(|v| v.as_text())
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string());

        let bhk_list = args.get("bhk_list").map(|v| {
            let bhks: Vec<u32> = v
                .flatten_numbers()
                .into_iter()
                .filter(|n| *n > 0.0)
                .map(|n| n.round() as u32)
                .collect();
            dedup_bhk(bhks)
        });

        let budget_min_cr = args
            .get("budget_min_cr")
            .and_then(|v| v.as_number())
            .filter(|n| *n >= 0.0);
        let budget_max_cr = args
            .get("budget_max_cr")
            .and_then(|v| v.as_number())
            .filter(|n| *n >= 0.0);

        let status_list = args.get("status_list").map(|v| {
            let statuses: Vec<String> = v
                .flatten_texts()
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            dedup_statuses(statuses)
        });

        FilterUpdate {
            city,
            bhk_list,
            budget_min_cr,
            budget_max_cr,
            status_list,
        }
    }
}

/// Sort and deduplicate a BHK list (the set is unordered; a canonical
/// ascending order keeps equality comparisons stable).
fn dedup_bhk(mut list: Vec<u32>) -> Vec<u32> {
    list.sort_unstable();
    list.dedup();
    list
}

/// Deduplicate statuses case-insensitively, preserving first-seen casing
/// and order. Unrecognized statuses pass through as opaque strings.
fn dedup_statuses(list: Vec<String>) -> Vec<String> {
    let mut seen = Vec::new();
    let mut out = Vec::new();
    for status in list {
        let key = status.to_lowercase();
        if !seen.contains(&key) {
            seen.push(key);
            out.push(status);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn previous() -> FilterSet {
        FilterSet {
            city: Some("Pune".to_string()),
            bhk_list: vec![2, 3],
            budget_min_cr: Some(1.0),
            budget_max_cr: Some(2.0),
            status_list: vec!["Ready to Move".to_string()],
        }
    }

    #[test]
    fn test_merge_carries_forward_absent_fields() {
        let update = FilterUpdate {
            budget_max_cr: Some(1.5),
            ..Default::default()
        };
        let merged = previous().merge(&update);
        assert_eq!(merged.city.as_deref(), Some("Pune"));
        assert_eq!(merged.bhk_list, vec![2, 3]);
        assert_eq!(merged.budget_min_cr, Some(1.0));
        assert_eq!(merged.budget_max_cr, Some(1.5));
        assert_eq!(merged.status_list, vec!["Ready to Move"]);
    }

    #[test]
    fn test_merge_replaces_lists_wholesale() {
        let update = FilterUpdate {
            bhk_list: Some(vec![4]),
            ..Default::default()
        };
        let merged = previous().merge(&update);
        assert_eq!(merged.bhk_list, vec![4]);
    }

    #[test]
    fn test_merge_identity_on_empty_update() {
        let merged = previous().merge(&FilterUpdate::default());
        assert_eq!(merged, previous());
    }

    #[test]
    fn test_merge_idempotent_when_update_repeats_previous() {
        let update = FilterUpdate {
            city: Some("Pune".to_string()),
            bhk_list: Some(vec![2, 3]),
            budget_min_cr: Some(1.0),
            budget_max_cr: Some(2.0),
            status_list: Some(vec!["Ready to Move".to_string()]),
        };
        let once = previous().merge(&update);
        let twice = once.merge(&update);
        assert_eq!(once, previous());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_from_args_flattens_lists_and_dedups() {
        let mut args = HashMap::new();
        args.insert(
            "bhk_list".to_string(),
            ArgValue::List(vec![
                ArgValue::Number(3.0),
                ArgValue::Number(2.0),
                ArgValue::Number(2.0),
                ArgValue::List(vec![ArgValue::Number(4.0)]),
            ]),
        );
        args.insert("budget_max_cr".to_string(), ArgValue::Number(1.2));
        args.insert("city".to_string(), ArgValue::Null);

        let update = FilterUpdate::from_args(&args);
        assert_eq!(update.bhk_list, Some(vec![2, 3, 4]));
        assert_eq!(update.budget_max_cr, Some(1.2));
        assert!(update.city.is_none());
        assert!(update.status_list.is_none());
    }

    #[test]
    fn test_from_args_scalar_bhk_becomes_single_element_list() {
        let mut args = HashMap::new();
        args.insert("bhk_list".to_string(), ArgValue::Number(2.0));
        let update = FilterUpdate::from_args(&args);
        assert_eq!(update.bhk_list, Some(vec![2]));
    }

    #[test]
    fn test_from_args_drops_out_of_domain_values() {
        let mut args = HashMap::new();
        args.insert(
            "bhk_list".to_string(),
            ArgValue::List(vec![ArgValue::Number(0.0), ArgValue::Number(-2.0)]),
        );
        args.insert("budget_min_cr".to_string(), ArgValue::Number(-1.0));
        args.insert("city".to_string(), ArgValue::Text("  ".to_string()));

        let update = FilterUpdate::from_args(&args);
        assert_eq!(update.bhk_list, Some(vec![]));
        assert!(update.budget_min_cr.is_none());
        assert!(update.city.is_none());
    }

    #[test]
    fn test_unrecognized_statuses_pass_through() {
        let mut args = HashMap::new();
        args.insert(
            "status_list".to_string(),
            ArgValue::List(vec![
                ArgValue::Text("Possession Soon".to_string()),
                ArgValue::Text("possession soon".to_string()),
            ]),
        );
        let update = FilterUpdate::from_args(&args);
        assert_eq!(update.status_list, Some(vec!["Possession Soon".to_string()]));
    }
}
