//! Upstream API response and request shapes.
//!
//! The Altum endpoints answer in `PascalCase`, EP-Online in Dutch field
//! names, and both are loose about whether numbers arrive as JSON numbers or
//! strings. Fields here are therefore optional and read through the
//! [`lenient`] helpers; [`crate::normalize`] turns them into the typed data
//! the rest of the workspace sees.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Body shared by the location and WOZ endpoints.
#[derive(Debug, Serialize)]
pub(crate) struct AddressRequest<'a> {
    pub postcode: &'a str,
    pub housenumber: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub houseaddition: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub(crate) struct WozRequest<'a> {
    pub postcode: &'a str,
    pub housenumber: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub addition: Option<&'a str>,
    pub index: u8,
    pub cache: u8,
}

/// Tunable comparison parameters for the comparable-sales reference search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonWeights {
    pub reference_number: u32,
    #[serde(rename = "date_limit")]
    pub date_limit_months: u32,
    pub comparable_housetype: u8,
    pub comparable_innersurfacearea: u8,
    pub comparable_buildyear: u8,
    pub comparable_distance: u8,
    pub weight_innersurfacearea: f64,
    pub weight_buildyear: f64,
    pub weight_transactiondate: f64,
    pub weight_distance: f64,
    pub weight_visualsimilarity: f64,
    pub include_listings: bool,
    pub visual_similarity: bool,
}

impl Default for ComparisonWeights {
    fn default() -> Self {
        Self {
            reference_number: 10,
            date_limit_months: 24,
            comparable_housetype: 1,
            comparable_innersurfacearea: 1,
            comparable_buildyear: 2,
            comparable_distance: 1,
            weight_innersurfacearea: 0.3,
            weight_buildyear: 0.2,
            weight_transactiondate: 0.2,
            weight_distance: 0.3,
            weight_visualsimilarity: 0.0,
            include_listings: true,
            visual_similarity: false,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ReferenceRequest<'a> {
    pub postcode: &'a str,
    pub housenumber: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub houseaddition: Option<&'a str>,
    #[serde(flatten)]
    pub weights: &'a ComparisonWeights,
}

// ---------------------------------------------------------------------------
// Location (AVM)
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct LocationOutput {
    #[serde(rename = "BagID", default, deserialize_with = "lenient::opt_string")]
    pub bag_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub post_code: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub house_number: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub house_addition: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub street: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub house_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub build_year: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub inner_surface_area: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub outer_surface_area: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub volume: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub rooms: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub longitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub energy_label: Option<String>,
}

// ---------------------------------------------------------------------------
// Interactive reference (comparables)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct ReferenceResponse {
    #[serde(rename = "ReferenceData")]
    pub reference_data: ReferenceDataWire,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct ReferenceDataWire {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub reference_price_mean: Option<String>,
    #[serde(default)]
    pub reference_houses: Vec<ReferenceHouseWire>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct ReferenceHouseWire {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub post_code: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub house_number: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub house_addition: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub street: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub house_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub build_year: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub inner_surface_area: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub transaction_price: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub indexed_transaction_price: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub distance: Option<f64>,
    /// `YYYYMM`.
    #[serde(
        rename = "Transactiondate",
        default,
        deserialize_with = "lenient::opt_string"
    )]
    pub transaction_date: Option<String>,
}

// ---------------------------------------------------------------------------
// WOZ
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct WozResponse {
    #[serde(rename = "Output")]
    pub output: WozOutput,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct WozOutput {
    #[serde(rename = "BagID", default, deserialize_with = "lenient::opt_string")]
    pub bag_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub street: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub house_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub build_year: Option<i64>,
    #[serde(
        rename = "WOZ-source_date",
        default,
        deserialize_with = "lenient::opt_string"
    )]
    pub source_date: Option<String>,
    #[serde(rename = "wozvalue", default)]
    pub woz_values: Vec<WozValueWire>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct WozValueWire {
    /// `DD-MM-YYYY`.
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub value: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub indexed_value: Option<i64>,
}

// ---------------------------------------------------------------------------
// EP-Online energy label
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct EnergyLabelRecord {
    #[serde(rename = "Energieklasse", default, deserialize_with = "lenient::opt_string")]
    pub energy_class: Option<String>,
    #[serde(
        rename = "Registratiedatum",
        default,
        deserialize_with = "lenient::opt_string"
    )]
    pub registration_date: Option<String>,
    #[serde(rename = "Geldig_tot", default, deserialize_with = "lenient::opt_string")]
    pub valid_until: Option<String>,
    #[serde(rename = "Gebouwtype", default, deserialize_with = "lenient::opt_string")]
    pub building_type: Option<String>,
    #[serde(rename = "Bouwjaar", default, deserialize_with = "lenient::opt_i64")]
    pub construction_year: Option<i64>,
    #[serde(
        rename = "Gebruiksoppervlakte_thermische_zone",
        default,
        deserialize_with = "lenient::opt_f64"
    )]
    pub floor_area: Option<f64>,
    #[serde(rename = "Postcode", default, deserialize_with = "lenient::opt_string")]
    pub postal_code: Option<String>,
    #[serde(rename = "Plaats", default, deserialize_with = "lenient::opt_string")]
    pub city: Option<String>,
}

// ---------------------------------------------------------------------------
// Autosearch (area listings)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct AutosearchListing {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub bagid: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub houseaddress: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub postcode: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub housenumber: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub houseaddition: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub street: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub province: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub date_listed: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub asking_price: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub market_status: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub image: Option<String>,
}

/// Deserializers tolerant of numbers sent as strings and vice versa.
pub(crate) mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(match Option::<Value>::deserialize(d)? {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_owned()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        })
    }

    #[allow(clippy::cast_possible_truncation)]
    pub fn opt_i64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
        Ok(match Option::<Value>::deserialize(d)? {
            Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
            Some(Value::String(s)) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().map(|f| f as i64))
            }
            _ => None,
        })
    }

    pub fn opt_f64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        Ok(match Option::<Value>::deserialize(d)? {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().replace(',', ".").parse::<f64>().ok(),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_output_accepts_numbers_as_strings() {
        let out: LocationOutput = serde_json::from_value(serde_json::json!({
            "BagID": 363010000123456_i64,
            "HouseNumber": "72",
            "BuildYear": 1900,
            "InnerSurfaceArea": "85.5",
            "Rooms": 3.0,
            "Street": "  "
        }))
        .unwrap();
        assert_eq!(out.bag_id.as_deref(), Some("363010000123456"));
        assert_eq!(out.house_number, Some(72));
        assert_eq!(out.build_year, Some(1900));
        assert_eq!(out.inner_surface_area, Some(85.5));
        assert_eq!(out.rooms, Some(3));
        assert_eq!(out.street, None, "blank strings read as missing");
    }

    #[test]
    fn reference_request_flattens_weights() {
        let weights = ComparisonWeights::default();
        let req = ReferenceRequest {
            postcode: "1015MN",
            housenumber: 72,
            houseaddition: None,
            weights: &weights,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["postcode"], "1015MN");
        assert_eq!(json["date_limit"], 24);
        assert_eq!(json["reference_number"], 10);
        assert_eq!(json["weight_distance"], 0.3);
        assert!(json.get("houseaddition").is_none());
    }

    #[test]
    fn autosearch_listing_parses_string_price() {
        let listing: AutosearchListing = serde_json::from_value(serde_json::json!({
            "bagid": "0363010000999999",
            "housenumber": 72,
            "asking_price": "450000",
            "market_status": "Beschikbaar"
        }))
        .unwrap();
        assert_eq!(listing.housenumber.as_deref(), Some("72"));
        assert_eq!(listing.asking_price, Some(450_000));
        assert_eq!(listing.houseaddition, None);
    }
}
