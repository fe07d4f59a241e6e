//! Typed provider data handed to the orchestrators.
//!
//! Everything here is produced by [`crate::normalize`] from the raw upstream
//! shapes in [`crate::types`]. Missing upstream fields stay `None`; nothing is
//! defaulted to a value the provider did not send.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Property attributes from the location (AVM) provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationData {
    pub bag_id: Option<String>,
    pub postal_code: Option<String>,
    pub house_number: Option<i64>,
    pub house_addition: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub house_type: Option<String>,
    pub build_year: Option<i64>,
    pub inner_surface_area: Option<f64>,
    pub outer_surface_area: Option<f64>,
    pub volume: Option<f64>,
    pub rooms: Option<i64>,
    pub coordinates: Option<Coordinates>,
    pub energy_label: Option<String>,
}

/// A price band as the reference provider reports it (`"400000-450000"`).
/// A single figure is a band with equal bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    pub low: i64,
    pub high: i64,
}

impl PriceRange {
    #[must_use]
    pub fn midpoint(&self) -> i64 {
        (self.low + self.high) / 2
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparableSale {
    pub postal_code: Option<String>,
    pub house_number: Option<String>,
    pub house_addition: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub house_type: Option<String>,
    pub build_year: Option<i64>,
    pub inner_surface_area: Option<f64>,
    pub transaction_price: Option<PriceRange>,
    pub indexed_transaction_price: Option<PriceRange>,
    pub distance_m: Option<f64>,
    /// First day of the month the sale was registered.
    pub transaction_month: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceSummary {
    pub count: usize,
    /// Mean distance to the subject, rounded to whole metres. Missing
    /// distances count as zero.
    pub mean_distance_m: i64,
    /// Comparables per house type; untyped entries under `"Onbekend"`.
    pub house_types: BTreeMap<String, usize>,
}

/// Comparable-sales reference set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceData {
    /// Provider's raw mean price band text.
    pub price_mean: Option<String>,
    pub price_range: Option<PriceRange>,
    pub comparables: Vec<ComparableSale>,
    pub summary: ReferenceSummary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WozValue {
    pub year: i32,
    pub date: Option<NaiveDate>,
    pub value: i64,
    pub indexed_value: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WozGrowth {
    pub absolute: i64,
    /// Percentage change from oldest to newest, two decimals.
    pub percentage: f64,
    pub from_year: i32,
    pub to_year: i32,
}

/// WOZ valuation history, oldest year first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WozData {
    pub bag_id: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub house_type: Option<String>,
    pub build_year: Option<i64>,
    pub source_date: Option<String>,
    pub values: Vec<WozValue>,
    pub growth: Option<WozGrowth>,
    /// Mean of the year-over-year percentage changes, two decimals.
    pub average_yearly_growth_pct: Option<f64>,
}

impl WozData {
    #[must_use]
    pub fn latest(&self) -> Option<&WozValue> {
        self.values.last()
    }
}

/// A registered energy label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyLabelData {
    pub energy_class: Option<String>,
    pub registration_date: Option<NaiveDate>,
    pub valid_until: Option<NaiveDate>,
    pub building_type: Option<String>,
    pub construction_year: Option<i64>,
    pub floor_area: Option<f64>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    /// Whether `valid_until` lies after the day the label was fetched.
    pub is_valid: bool,
    /// `A++` = 10 down to `G` = 2; 0 when the class is missing or unknown.
    pub efficiency_score: u8,
}

/// Market status the area search reports for a listed property.
pub const STATUS_AVAILABLE: &str = "Beschikbaar";
pub const STATUS_SOLD: &str = "Verkocht";

/// One property row from an area search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaListing {
    /// BAG id when the provider sends one, otherwise a key built from the
    /// address. Unique within one search result.
    pub id: String,
    pub address: String,
    pub street: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub postal_code: String,
    pub house_number: String,
    pub addition: Option<String>,
    pub asking_price: Option<i64>,
    pub listing_date: Option<String>,
    pub status: Option<String>,
    pub image_url: Option<String>,
}

impl AreaListing {
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.status.as_deref() == Some(STATUS_AVAILABLE)
    }

    #[must_use]
    pub fn is_sold(&self) -> bool {
        self.status.as_deref() == Some(STATUS_SOLD)
    }
}
