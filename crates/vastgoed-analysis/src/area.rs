//! Postal-code area analysis: listing search, then batched energy labels.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use vastgoed_core::AreaSubject;
use vastgoed_providers::{
    provider, AreaListing, EnergyLabelData, PriceRange, PropertyDataSource, ProviderResult,
};

use crate::batch::{resolve_energy_labels, BatchScheduler, EnergyLabelBatchResult};

/// Aggregates over the listings of one area.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaStatistics {
    pub total: usize,
    pub with_price: usize,
    pub available: usize,
    pub sold: usize,
    /// Mean asking price over priced listings, rounded to whole euros.
    pub average_price: Option<i64>,
    pub price_range: Option<PriceRange>,
    pub streets: BTreeSet<String>,
}

impl AreaStatistics {
    #[must_use]
    pub fn from_listings(listings: &[AreaListing]) -> Self {
        let prices: Vec<i64> = listings.iter().filter_map(|l| l.asking_price).collect();

        // Upstream prices are unchecked; sum wide so extreme values cannot overflow.
        let average_price = match i128::try_from(prices.len()) {
            Ok(n) if n > 0 => {
                let sum: i128 = prices.iter().copied().map(i128::from).sum();
                i64::try_from((sum + n / 2).div_euclid(n)).ok()
            }
            _ => None,
        };
        let price_range = prices
            .iter()
            .min()
            .zip(prices.iter().max())
            .map(|(&low, &high)| PriceRange { low, high });

        Self {
            total: listings.len(),
            with_price: prices.len(),
            available: listings.iter().filter(|l| l.is_available()).count(),
            sold: listings.iter().filter(|l| l.is_sold()).count(),
            average_price,
            price_range,
            streets: listings
                .iter()
                .filter_map(|l| l.street.as_deref())
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .collect(),
        }
    }
}

/// Everything gathered for one area, shaped to sit beside
/// [`crate::single::PropertyFacts`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AreaFacts {
    pub listings: Vec<AreaListing>,
    pub statistics: AreaStatistics,
    pub energy_labels: EnergyLabelBatchResult,
    /// Set when the listing search itself failed.
    pub search_failure: Option<String>,
}

impl AreaFacts {
    #[must_use]
    pub fn label_for(&self, listing: &AreaListing) -> Option<&ProviderResult<EnergyLabelData>> {
        self.energy_labels.get(&listing.id)
    }

    /// Providers that contributed at least one successful result.
    #[must_use]
    pub fn sources_used(&self) -> BTreeSet<String> {
        let mut used = BTreeSet::new();
        if self.search_failure.is_none() {
            used.insert(provider::AREA_SEARCH.to_owned());
        }
        if self.energy_labels.success_count > 0 {
            used.insert(provider::ENERGY_LABEL.to_owned());
        }
        used
    }

    #[must_use]
    pub fn subject_failed(&self) -> bool {
        self.search_failure.is_some()
    }
}

/// Searches the area, then resolves energy labels for whatever was found.
///
/// The search settles before any label call is issued. A failed search ends
/// the run with empty facts and the failure recorded.
pub async fn run_area<S: PropertyDataSource>(
    source: &S,
    subject: &AreaSubject,
    scheduler: &BatchScheduler,
) -> AreaFacts {
    tracing::info!(postal_code = %subject.postal_code, "starting area analysis");

    let listings = match source.fetch_area_listings(subject).await {
        ProviderResult::Success(listings) => listings,
        ProviderResult::Absent => Vec::new(),
        ProviderResult::Failure(message) => {
            tracing::warn!(
                provider = provider::AREA_SEARCH,
                postal_code = %subject.postal_code,
                error = %message,
                "area search failed, skipping energy labels"
            );
            return AreaFacts {
                search_failure: Some(message),
                ..AreaFacts::default()
            };
        }
    };

    let energy_labels = if listings.is_empty() {
        EnergyLabelBatchResult::default()
    } else {
        tracing::info!(
            listings = listings.len(),
            chunks = scheduler.chunk_count(listings.len()),
            "resolving energy labels"
        );
        resolve_energy_labels(source, &listings, scheduler).await
    };

    AreaFacts {
        statistics: AreaStatistics::from_listings(&listings),
        listings,
        energy_labels,
        search_failure: None,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    use super::*;
    use crate::testing::{area_subject, listing, listings, StubSource};

    fn fast() -> BatchScheduler {
        BatchScheduler::new(3, Duration::from_millis(1))
    }

    #[test]
    fn statistics_over_mixed_listings() {
        let mut items = vec![
            listing(1, Some(400_000), "Beschikbaar"),
            listing(2, Some(500_001), "Verkocht"),
            listing(3, None, "Beschikbaar"),
            listing(4, Some(300_000), "Onder bod"),
        ];
        items[3].street = Some("Keizersgracht".into());

        let stats = AreaStatistics::from_listings(&items);

        assert_eq!(stats.total, 4);
        assert_eq!(stats.with_price, 3);
        assert_eq!(stats.available, 2);
        assert_eq!(stats.sold, 1);
        // 1_200_001 / 3 = 400_000.33
        assert_eq!(stats.average_price, Some(400_000));
        assert_eq!(
            stats.price_range,
            Some(PriceRange {
                low: 300_000,
                high: 500_001
            })
        );
        assert_eq!(stats.streets.len(), 2);
    }

    #[test]
    fn average_rounds_half_up() {
        let items = vec![
            listing(1, Some(1), "Beschikbaar"),
            listing(2, Some(2), "Beschikbaar"),
        ];
        assert_eq!(AreaStatistics::from_listings(&items).average_price, Some(2));
    }

    #[test]
    fn extreme_prices_do_not_overflow_the_average() {
        let items = vec![
            listing(1, Some(i64::MAX), "Beschikbaar"),
            listing(2, Some(i64::MAX), "Beschikbaar"),
            listing(3, Some(i64::MAX - 2), "Beschikbaar"),
        ];
        let stats = AreaStatistics::from_listings(&items);
        assert_eq!(stats.average_price, Some(i64::MAX - 1));
        assert_eq!(
            stats.price_range,
            Some(PriceRange {
                low: i64::MAX - 2,
                high: i64::MAX,
            })
        );
    }

    #[test]
    fn no_prices_means_no_average() {
        let stats = AreaStatistics::from_listings(&[listing(1, None, "Beschikbaar")]);
        assert_eq!(stats.average_price, None);
        assert_eq!(stats.price_range, None);
        assert_eq!(stats.with_price, 0);
    }

    #[tokio::test]
    async fn failed_search_skips_label_resolution() {
        let source = StubSource {
            area: ProviderResult::Failure("HTTP 500: upstream".into()),
            ..StubSource::default()
        };

        let facts = run_area(&source, &area_subject(), &fast()).await;

        assert_eq!(facts.search_failure.as_deref(), Some("HTTP 500: upstream"));
        assert!(facts.listings.is_empty());
        assert_eq!(facts.statistics, AreaStatistics::default());
        assert_eq!(source.label_calls.load(Ordering::SeqCst), 0);
        assert!(facts.subject_failed());
        assert!(facts.sources_used().is_empty());
    }

    #[tokio::test]
    async fn empty_search_issues_no_label_calls() {
        let source = StubSource::default();
        let facts = run_area(&source, &area_subject(), &fast()).await;

        assert!(facts.listings.is_empty());
        assert_eq!(facts.statistics.total, 0);
        assert!(!facts.subject_failed());
        assert_eq!(source.label_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn fifteen_listings_resolve_in_five_chunks() {
        let scheduler = fast();
        let source = StubSource {
            area: ProviderResult::Success(listings(15)),
            ..StubSource::default()
        };

        let facts = run_area(&source, &area_subject(), &scheduler).await;

        assert_eq!(scheduler.chunk_count(facts.listings.len()), 5);
        assert_eq!(source.area_calls.load(Ordering::SeqCst), 1);
        assert_eq!(source.label_calls.load(Ordering::SeqCst), 15);
        assert_eq!(facts.energy_labels.total(), 15);
        assert_eq!(facts.statistics.total, 15);
        assert_eq!(facts.statistics.available, 15);
        assert!(facts.label_for(&facts.listings[0]).unwrap().is_success());
        assert_eq!(facts.sources_used().len(), 2);
    }

    #[tokio::test]
    async fn eight_of_fifteen_failures_warn() {
        let mut source = StubSource {
            area: ProviderResult::Success(listings(15)),
            ..StubSource::default()
        };
        for n in 1..=8 {
            source
                .labels
                .insert(n, ProviderResult::Failure("HTTP 503: busy".into()));
        }

        let facts = run_area(&source, &area_subject(), &fast()).await;
        assert!(facts.energy_labels.warning().is_some());
    }

    #[tokio::test]
    async fn two_of_fifteen_failures_do_not_warn() {
        let mut source = StubSource {
            area: ProviderResult::Success(listings(15)),
            ..StubSource::default()
        };
        source.labels.insert(1, ProviderResult::Failure("HTTP 500".into()));
        source.labels.insert(2, ProviderResult::Failure("HTTP 500".into()));
        for n in 3..=6 {
            source.labels.insert(n, ProviderResult::Absent);
        }

        let facts = run_area(&source, &area_subject(), &fast()).await;
        assert_eq!(facts.energy_labels.absent_count, 4);
        assert!(facts.energy_labels.warning().is_none());
    }
}
