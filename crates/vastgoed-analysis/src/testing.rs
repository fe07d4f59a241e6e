//! In-memory provider stub and sample data for the orchestrator tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use chrono::Utc;
use vastgoed_core::{AreaSubject, IndividualSubject};
use vastgoed_providers::{
    AreaListing, EnergyLabelData, EnergyLabelRequest, LocationData, PropertyDataSource,
    ProviderResult, ReferenceData, ReferenceSummary, WozData, WozValue,
};

use crate::error::SummarizerError;
use crate::summarizer::{extract_valuation, AnalysisReport, FactBundle, Summarizer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Edge {
    Start,
    End,
}

/// A deterministic [`PropertyDataSource`].
///
/// Energy labels are answered per house number from `labels`, falling back to
/// `default_label`. Every label call is recorded with its start and end.
pub(crate) struct StubSource {
    pub location: ProviderResult<LocationData>,
    pub reference: ProviderResult<ReferenceData>,
    pub valuation: ProviderResult<WozData>,
    pub default_label: ProviderResult<EnergyLabelData>,
    pub labels: HashMap<u32, ProviderResult<EnergyLabelData>>,
    pub area: ProviderResult<Vec<AreaListing>>,
    pub label_latency: Duration,
    pub label_calls: AtomicUsize,
    pub area_calls: AtomicUsize,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub events: Mutex<Vec<(u32, Edge, Instant)>>,
}

impl Default for StubSource {
    fn default() -> Self {
        Self {
            location: ProviderResult::Success(sample_location()),
            reference: ProviderResult::Success(sample_reference()),
            valuation: ProviderResult::Success(sample_woz()),
            default_label: ProviderResult::Success(sample_label("B")),
            labels: HashMap::new(),
            area: ProviderResult::Success(Vec::new()),
            label_latency: Duration::from_millis(5),
            label_calls: AtomicUsize::new(0),
            area_calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            events: Mutex::new(Vec::new()),
        }
    }
}

impl StubSource {
    pub(crate) fn events(&self) -> Vec<(u32, Edge, Instant)> {
        self.events.lock().unwrap().clone()
    }
}

impl PropertyDataSource for StubSource {
    async fn fetch_location(&self, _subject: &IndividualSubject) -> ProviderResult<LocationData> {
        self.location.clone()
    }

    async fn fetch_reference(&self, _subject: &IndividualSubject) -> ProviderResult<ReferenceData> {
        self.reference.clone()
    }

    async fn fetch_valuation(&self, _subject: &IndividualSubject) -> ProviderResult<WozData> {
        self.valuation.clone()
    }

    async fn fetch_energy_label(
        &self,
        request: &EnergyLabelRequest,
    ) -> ProviderResult<EnergyLabelData> {
        let number = request.house_number.number;
        self.label_calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.events
            .lock()
            .unwrap()
            .push((number, Edge::Start, Instant::now()));

        tokio::time::sleep(self.label_latency).await;

        self.events
            .lock()
            .unwrap()
            .push((number, Edge::End, Instant::now()));
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        self.labels
            .get(&number)
            .cloned()
            .unwrap_or_else(|| self.default_label.clone())
    }

    async fn fetch_area_listings(&self, _subject: &AreaSubject) -> ProviderResult<Vec<AreaListing>> {
        self.area_calls.fetch_add(1, Ordering::SeqCst);
        self.area.clone()
    }
}

/// Answers with a fixed valuation, or fails when `fail` is set.
#[derive(Default)]
pub(crate) struct StubSummarizer {
    pub fail: bool,
    pub calls: AtomicUsize,
}

impl Summarizer for StubSummarizer {
    async fn summarize(&self, bundle: &FactBundle<'_>) -> Result<AnalysisReport, SummarizerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(SummarizerError::Status {
                status: 503,
                body: "overloaded".into(),
            });
        }
        let raw_text = r#"{"geschat_verkoopbedrag": "€500.000", "zekerheid": "80%", "argumentatie": ["Gewilde buurt"]}"#;
        Ok(AnalysisReport {
            raw_text: raw_text.to_owned(),
            model_id: "stub-model".into(),
            timestamp: Utc::now(),
            sources_used: bundle.sources_used(),
            structured: extract_valuation(raw_text),
            failed: false,
            error: None,
        })
    }
}

pub(crate) fn subject() -> IndividualSubject {
    IndividualSubject::new("Prinsengracht", "72", Some("1"), "Amsterdam", "1015MN").unwrap()
}

pub(crate) fn area_subject() -> AreaSubject {
    AreaSubject::new("1015MN").unwrap()
}

pub(crate) fn sample_location() -> LocationData {
    LocationData {
        bag_id: Some("0363010000758545".into()),
        postal_code: Some("1015MN".into()),
        house_number: Some(72),
        house_addition: Some("1".into()),
        street: Some("Prinsengracht".into()),
        city: Some("Amsterdam".into()),
        house_type: Some("Appartement".into()),
        build_year: Some(1900),
        inner_surface_area: Some(85.0),
        outer_surface_area: None,
        volume: Some(260.0),
        rooms: Some(3),
        coordinates: None,
        energy_label: None,
    }
}

pub(crate) fn sample_reference() -> ReferenceData {
    ReferenceData {
        price_mean: Some("400000-450000".into()),
        price_range: None,
        comparables: Vec::new(),
        summary: ReferenceSummary {
            count: 10,
            mean_distance_m: 350,
            house_types: BTreeMap::new(),
        },
    }
}

pub(crate) fn sample_woz() -> WozData {
    WozData {
        bag_id: None,
        street: None,
        city: None,
        house_type: None,
        build_year: None,
        source_date: None,
        values: vec![
            WozValue {
                year: 2022,
                date: None,
                value: 480_000,
                indexed_value: None,
            },
            WozValue {
                year: 2023,
                date: None,
                value: 520_000,
                indexed_value: None,
            },
        ],
        growth: None,
        average_yearly_growth_pct: None,
    }
}

pub(crate) fn sample_label(class: &str) -> EnergyLabelData {
    EnergyLabelData {
        energy_class: Some(class.into()),
        registration_date: None,
        valid_until: None,
        building_type: None,
        construction_year: Some(1900),
        floor_area: Some(84.0),
        postal_code: Some("1015MN".into()),
        city: None,
        is_valid: true,
        efficiency_score: 7,
    }
}

pub(crate) fn listing(number: u32, price: Option<i64>, status: &str) -> AreaListing {
    AreaListing {
        id: format!("bag-{number}"),
        address: format!("Prinsengracht {number}"),
        street: Some("Prinsengracht".into()),
        city: Some("Amsterdam".into()),
        province: None,
        postal_code: "1015MN".into(),
        house_number: number.to_string(),
        addition: None,
        asking_price: price,
        listing_date: None,
        status: Some(status.into()),
        image_url: None,
    }
}

/// `count` available listings numbered from 1, all priced.
pub(crate) fn listings(count: u32) -> Vec<AreaListing> {
    (1..=count)
        .map(|n| listing(n, Some(400_000 + i64::from(n) * 10_000), "Beschikbaar"))
        .collect()
}
