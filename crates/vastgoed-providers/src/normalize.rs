//! Conversion of upstream response shapes into the typed data in
//! [`crate::data`], plus the derived figures (WOZ growth, reference summary,
//! label validity) computed once at the client boundary.

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;

use crate::data::{
    AreaListing, ComparableSale, Coordinates, EnergyLabelData, LocationData, PriceRange,
    ReferenceData, ReferenceSummary, WozData, WozGrowth, WozValue,
};
use crate::types::{
    AutosearchListing, EnergyLabelRecord, LocationOutput, ReferenceDataWire, WozOutput,
};

const UNKNOWN_HOUSE_TYPE: &str = "Onbekend";

/// Parses an ISO `YYYY-MM-DD` date (time part ignored) or a Dutch
/// `DD-MM-YYYY` date.
#[must_use]
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    let head = s.get(..10).unwrap_or(s);
    NaiveDate::parse_from_str(head, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(head, "%d-%m-%Y"))
        .ok()
}

/// Parses a `YYYYMM` transaction month into the first day of that month.
#[must_use]
pub fn parse_transaction_month(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.len() != 6 {
        return None;
    }
    let year = s.get(..4)?.parse::<i32>().ok()?;
    let month = s.get(4..)?.parse::<u32>().ok()?;
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// Parses `"400000-450000"` or a single figure into a [`PriceRange`].
#[must_use]
pub fn parse_price_range(s: &str) -> Option<PriceRange> {
    let parse = |part: &str| part.trim().replace('.', "").parse::<i64>().ok();
    match s.split_once('-') {
        Some((low, high)) => Some(PriceRange {
            low: parse(low)?,
            high: parse(high)?,
        }),
        None => parse(s).map(|v| PriceRange { low: v, high: v }),
    }
}

/// Maps an energy class to a 0–10 score: `A++` is 10, `G` is 2, anything
/// else 0.
#[must_use]
pub fn efficiency_score(energy_class: Option<&str>) -> u8 {
    match energy_class.map(|c| c.trim().to_ascii_uppercase()).as_deref() {
        Some("A++") => 10,
        Some("A+") => 9,
        Some("A") => 8,
        Some("B") => 7,
        Some("C") => 6,
        Some("D") => 5,
        Some("E") => 4,
        Some("F") => 3,
        Some("G") => 2,
        _ => 0,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[must_use]
pub(crate) fn normalize_location(out: LocationOutput) -> LocationData {
    let coordinates = match (out.latitude, out.longitude) {
        (Some(latitude), Some(longitude)) => Some(Coordinates {
            latitude,
            longitude,
        }),
        _ => None,
    };

    LocationData {
        bag_id: out.bag_id,
        postal_code: out.post_code,
        house_number: out.house_number,
        house_addition: out.house_addition,
        street: out.street,
        city: out.city,
        house_type: out.house_type,
        build_year: out.build_year,
        inner_surface_area: out.inner_surface_area,
        outer_surface_area: out.outer_surface_area,
        volume: out.volume,
        rooms: out.rooms,
        coordinates,
        energy_label: out.energy_label,
    }
}

#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub(crate) fn normalize_reference(wire: ReferenceDataWire) -> ReferenceData {
    let comparables: Vec<ComparableSale> = wire
        .reference_houses
        .into_iter()
        .map(|h| ComparableSale {
            postal_code: h.post_code,
            house_number: h.house_number,
            house_addition: h.house_addition,
            street: h.street,
            city: h.city,
            house_type: h.house_type,
            build_year: h.build_year,
            inner_surface_area: h.inner_surface_area,
            transaction_price: h.transaction_price.as_deref().and_then(parse_price_range),
            indexed_transaction_price: h
                .indexed_transaction_price
                .as_deref()
                .and_then(parse_price_range),
            distance_m: h.distance,
            transaction_month: h.transaction_date.as_deref().and_then(parse_transaction_month),
        })
        .collect();

    let count = comparables.len();
    let mean_distance_m = if count == 0 {
        0
    } else {
        let total: f64 = comparables.iter().filter_map(|c| c.distance_m).sum();
        (total / count as f64).round() as i64
    };

    let mut house_types = BTreeMap::new();
    for sale in &comparables {
        let key = sale
            .house_type
            .clone()
            .unwrap_or_else(|| UNKNOWN_HOUSE_TYPE.to_owned());
        *house_types.entry(key).or_insert(0) += 1;
    }

    ReferenceData {
        price_range: wire.reference_price_mean.as_deref().and_then(parse_price_range),
        price_mean: wire.reference_price_mean,
        comparables,
        summary: ReferenceSummary {
            count,
            mean_distance_m,
            house_types,
        },
    }
}

/// Year of a `DD-MM-YYYY` date; the trailing segment is taken even when the
/// day or month is malformed.
fn woz_year(date: &str) -> Option<i32> {
    date.trim().rsplit('-').next()?.parse::<i32>().ok()
}

#[must_use]
pub(crate) fn normalize_woz(out: WozOutput) -> WozData {
    let mut values: Vec<WozValue> = out
        .woz_values
        .into_iter()
        .filter_map(|v| {
            let date = v.date?;
            Some(WozValue {
                year: woz_year(&date)?,
                date: parse_date(&date),
                value: v.value?,
                indexed_value: v.indexed_value,
            })
        })
        .collect();
    values.sort_by_key(|v| v.year);

    WozData {
        growth: woz_growth(&values),
        average_yearly_growth_pct: average_yearly_growth(&values),
        bag_id: out.bag_id,
        street: out.street,
        city: out.city,
        house_type: out.house_type,
        build_year: out.build_year,
        source_date: out.source_date,
        values,
    }
}

/// Growth from the oldest to the newest value. `None` with fewer than two
/// points or a zero starting value.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn woz_growth(values: &[WozValue]) -> Option<WozGrowth> {
    if values.len() < 2 {
        return None;
    }
    let oldest = values.first()?;
    let newest = values.last()?;
    if oldest.value == 0 {
        return None;
    }

    Some(WozGrowth {
        absolute: newest.value - oldest.value,
        percentage: round2((newest.value as f64 / oldest.value as f64 - 1.0) * 100.0),
        from_year: oldest.year,
        to_year: newest.year,
    })
}

/// Mean of the year-over-year percentage changes across consecutive points.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn average_yearly_growth(values: &[WozValue]) -> Option<f64> {
    let rates: Vec<f64> = values
        .windows(2)
        .filter(|pair| pair[0].value != 0)
        .map(|pair| (pair[1].value as f64 / pair[0].value as f64 - 1.0) * 100.0)
        .collect();
    if rates.is_empty() {
        return None;
    }
    Some(round2(rates.iter().sum::<f64>() / rates.len() as f64))
}

#[must_use]
pub(crate) fn normalize_energy_label(record: EnergyLabelRecord, today: NaiveDate) -> EnergyLabelData {
    let valid_until = record.valid_until.as_deref().and_then(parse_date);

    EnergyLabelData {
        efficiency_score: efficiency_score(record.energy_class.as_deref()),
        is_valid: valid_until.is_some_and(|d| d > today),
        energy_class: record.energy_class,
        registration_date: record.registration_date.as_deref().and_then(parse_date),
        valid_until,
        building_type: record.building_type,
        construction_year: record.construction_year,
        floor_area: record.floor_area,
        postal_code: record.postal_code,
        city: record.city,
    }
}

/// Converts an area search response, assigning each listing a unique id.
///
/// `search_postal_code` fills in listings the provider returned without a
/// postal code.
#[must_use]
pub(crate) fn normalize_listings(
    raw: Vec<AutosearchListing>,
    search_postal_code: &str,
) -> Vec<AreaListing> {
    let mut seen = HashSet::new();

    raw.into_iter()
        .enumerate()
        .map(|(index, l)| {
            let postal_code = l.postcode.unwrap_or_else(|| search_postal_code.to_owned());
            let house_number = l.housenumber.unwrap_or_default();
            let addition = l.houseaddition;

            let street_part = match (&l.street, &addition) {
                (Some(street), Some(a)) => format!("{street} {house_number}-{a}"),
                (Some(street), None) => format!("{street} {house_number}"),
                (None, Some(a)) => format!("{house_number}-{a}"),
                (None, None) => house_number.clone(),
            };
            let address = l.houseaddress.unwrap_or(street_part);

            let mut id = l.bagid.unwrap_or_else(|| match &addition {
                Some(a) => format!("{postal_code}-{house_number}-{a}"),
                None => format!("{postal_code}-{house_number}"),
            });
            if !seen.insert(id.clone()) {
                id = format!("{id}#{index}");
                seen.insert(id.clone());
            }

            AreaListing {
                id,
                address,
                street: l.street,
                city: l.city,
                province: l.province,
                postal_code,
                house_number,
                addition,
                asking_price: l.asking_price.filter(|p| *p > 0),
                listing_date: l.date_listed,
                status: l.market_status,
                image_url: l.image,
            }
        })
        .collect()
}
