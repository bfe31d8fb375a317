//! CSV-backed property dataset.
//!
//! The store is loaded once at startup and shared read-only across
//! conversations. City and status comparison keys are lowercased ahead of
//! time so per-turn filtering never re-normalizes; numeric columns are
//! coerced leniently, with unparseable values becoming "unknown" for that
//! row instead of failing the load.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

/// One row of the dataset, projected to the columns the assistant uses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PropertyRecord {
    pub project_name: String,
    pub city: String,
    pub landmark: String,
    pub pincode: Option<u32>,
    pub bhk: Option<f64>,
    pub price_cr: Option<f64>,
    pub balcony: Option<f64>,
    pub bathrooms: Option<f64>,
    pub possession_status: String,
    pub price_formatted: String,
    /// Lowercase comparison keys, computed once at load time.
    #[serde(skip)]
    pub city_key: String,
    #[serde(skip)]
    pub status_key: String,
}

/// Raw CSV row with the dataset's native column names. Every column is a
/// string here; coercion happens in one place below.
#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(rename = "projectName", default)]
    project_name: String,
    #[serde(default)]
    city: String,
    #[serde(default)]
    landmark: String,
    #[serde(default)]
    pincode: String,
    #[serde(default)]
    bhk: String,
    #[serde(default)]
    price_cr: String,
    #[serde(default)]
    balcony: String,
    #[serde(default)]
    bathrooms: String,
    #[serde(default)]
    possession_status: String,
    #[serde(default)]
    price_formatted: String,
}

impl From<RawRow> for PropertyRecord {
    fn from(raw: RawRow) -> Self {
        let city_key = raw.city.trim().to_lowercase();
        let status_key = raw.possession_status.trim().to_lowercase();
        PropertyRecord {
            project_name: raw.project_name,
            landmark: raw.landmark,
            pincode: coerce_number(&raw.pincode).map(|n| n as u32),
            bhk: coerce_number(&raw.bhk),
            price_cr: coerce_number(&raw.price_cr),
            balcony: coerce_number(&raw.balcony),
            bathrooms: coerce_number(&raw.bathrooms),
            possession_status: raw.possession_status,
            price_formatted: raw.price_formatted,
            city: raw.city,
            city_key,
            status_key,
        }
    }
}

/// Lenient numeric coercion: unparseable or empty values become `None`
/// (the row survives, it is just excluded from numeric comparisons).
fn coerce_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Read-only property dataset, row order preserved from the source file.
#[derive(Debug)]
pub struct PropertyStore {
    records: Vec<PropertyRecord>,
    cities: Vec<String>,
}

impl PropertyStore {
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path).with_context(|| {
            format!(
                "Property dataset not found at {} — place the CSV there or set DATASET_PATH",
                path.display()
            )
        })?;
        Self::from_reader(file)
            .with_context(|| format!("Failed to read property dataset {}", path.display()))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

        let mut records = Vec::new();
        let mut skipped = 0usize;
        for row in csv_reader.deserialize::<RawRow>() {
            match row {
                Ok(raw) => records.push(PropertyRecord::from(raw)),
                Err(e) => {
                    skipped += 1;
                    tracing::warn!(error = %e, "Skipping malformed dataset row");
                }
            }
        }
        if skipped > 0 {
            tracing::warn!(skipped, loaded = records.len(), "Dataset loaded with skipped rows");
        } else {
            tracing::info!(loaded = records.len(), "Dataset loaded");
        }

        let mut cities: Vec<String> = Vec::new();
        for record in &records {
            let name = record.city.trim();
            if !name.is_empty() && !cities.iter().any(|c| c.eq_ignore_ascii_case(name)) {
                cities.push(name.to_string());
            }
        }

        Ok(Self { records, cities })
    }

    pub fn records(&self) -> &[PropertyRecord] {
        &self.records
    }

    /// Distinct city names in first-seen order, original casing.
    pub fn known_cities(&self) -> &[String] {
        &self.cities
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_CSV: &str = "\
projectName,city,landmark,pincode,bhk,price_cr,balcony,bathrooms,possession_status,price_formatted
Green Acres,Pune,Hinjewadi,411057,2,1.1,1,2,Ready to Move,₹1.1 Cr
Sky Towers,Pune,Baner,411045,3,1.8,2,3,Under Construction,₹1.8 Cr
Sea View,Mumbai,Bandra,,2,not-a-price,1,2,Ready to Move,Price on request
";

    #[test]
    fn test_load_preserves_row_order_and_coerces() {
        let store = PropertyStore::from_reader(SAMPLE_CSV.as_bytes()).unwrap();
        assert_eq!(store.len(), 3);
        assert_eq!(store.records()[0].project_name, "Green Acres");
        assert_eq!(store.records()[0].price_cr, Some(1.1));
        assert_eq!(store.records()[0].pincode, Some(411057));
        assert_eq!(store.records()[1].bhk, Some(3.0));
    }

    #[test]
    fn test_malformed_numeric_becomes_unknown_not_error() {
        let store = PropertyStore::from_reader(SAMPLE_CSV.as_bytes()).unwrap();
        let sea_view = &store.records()[2];
        assert_eq!(sea_view.price_cr, None);
        assert_eq!(sea_view.pincode, None);
        assert_eq!(sea_view.bhk, Some(2.0));
    }

    #[test]
    fn test_comparison_keys_are_lowercased_once() {
        let store = PropertyStore::from_reader(SAMPLE_CSV.as_bytes()).unwrap();
        assert_eq!(store.records()[0].city_key, "pune");
        assert_eq!(store.records()[1].status_key, "under construction");
    }

    #[test]
    fn test_known_cities_deduplicated_first_seen_order() {
        let store = PropertyStore::from_reader(SAMPLE_CSV.as_bytes()).unwrap();
        assert_eq!(store.known_cities(), &["Pune".to_string(), "Mumbai".to_string()]);
    }

    #[test]
    fn test_missing_file_reports_clear_error() {
        let err = PropertyStore::from_path(Path::new("/nonexistent/properties.csv")).unwrap_err();
        assert!(err.to_string().contains("Property dataset not found"));
    }
}
